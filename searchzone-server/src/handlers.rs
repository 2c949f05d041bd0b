//! HTTP handlers

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use geo::Point;
use searchzone_core::RoadGraph;
use searchzone_core::pipeline::{
    MandatoryAlgorithm, MandatoryRequest, SearchProfile, SimulationRequest, run_mandatory,
    run_simulation,
};
use searchzone_core::simulation::GoldenTimeConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Simulate,
    Mandatory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    #[default]
    Json,
    Geojson,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(flatten)]
    pub profile: SearchProfile,
    pub lat: f64,
    pub lon: f64,
    pub minutes: u32,
    #[serde(default)]
    pub mode: Mode,
    /// Isochrone service key, required in mandatory mode
    #[serde(default)]
    pub api_key: Option<String>,
    pub seed: Option<u64>,
    pub trials: Option<usize>,
    /// Simulate with the golden time instead of `minutes` when one is found
    #[serde(default)]
    pub golden_time: bool,
    #[serde(default)]
    pub algorithm: MandatoryAlgorithm,
    #[serde(default)]
    pub format: Format,
}

impl SearchRequest {
    fn origin(&self) -> ApiResult<Point<f64>> {
        let valid = self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon);
        if valid {
            Ok(Point::new(self.lon, self.lat))
        } else {
            Err(ApiError::bad_request(format!(
                "Invalid coordinates: lat {}, lon {}",
                self.lat, self.lon
            )))
        }
    }

    fn simulation_request(&self, state: &AppState, origin: Point<f64>) -> SimulationRequest {
        let config = state.config();
        let mut request = SimulationRequest::new(origin, self.profile, self.minutes);
        request.trials = self.trials.unwrap_or(config.simulation.trials);
        request.seed = self.seed.unwrap_or(config.simulation.seed);
        request.golden_time = self
            .golden_time
            .then(|| GoldenTimeConfig::from(config.golden_time));
        request.budget = config.budget.into();
        request.clip_radius = config.clip_radius;
        request
    }

    /// Key of the isochrone service; checked before any graph work
    fn api_key(&self) -> ApiResult<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ApiError::bad_request("api_key is required in mandatory mode"))
    }
}

pub async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> ApiResult<Response> {
    let origin = request.origin()?;
    tracing::info!(
        mode = ?request.mode,
        lat = request.lat,
        lon = request.lon,
        minutes = request.minutes,
        "Search request"
    );

    match request.mode {
        Mode::Simulate => {
            let simulation = request.simulation_request(&state, origin);
            let job = move |graph: &RoadGraph| run_simulation(graph, &simulation);
            let report = run_blocking(&state, job).await?;
            match request.format {
                Format::Json => Ok(Json(report).into_response()),
                Format::Geojson => Ok(Json(report.to_geojson()?).into_response()),
            }
        }
        Mode::Mandatory => {
            let api_key = request.api_key()?;
            if request.minutes == 0 {
                return Err(ApiError::bad_request("minutes must be positive in mandatory mode"));
            }

            let area = state
                .isochrone()
                .reachable_area(origin, request.minutes.saturating_mul(60), api_key)
                .await?;

            let mut mandatory = MandatoryRequest::new(origin, request.minutes, area);
            mandatory.algorithm = request.algorithm;
            mandatory.centrality_threshold = state.config().centrality_threshold;
            mandatory.clip_radius = state.config().clip_radius;

            let job = move |graph: &RoadGraph| run_mandatory(graph, &mandatory);
            let report = run_blocking(&state, job).await?;
            match request.format {
                Format::Json => Ok(Json(report).into_response()),
                Format::Geojson => Ok(Json(report.to_geojson()?).into_response()),
            }
        }
    }
}

/// Runs CPU-bound core work off the async runtime
async fn run_blocking<T, F>(state: &AppState, job: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&RoadGraph) -> Result<T, searchzone_core::Error> + Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || job(state.graph()))
        .await
        .map_err(|e| ApiError::Internal(format!("Worker task failed: {e}")))?
        .map_err(ApiError::from)
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub version: &'static str,
    pub nodes: usize,
    pub edges: usize,
    pub clip_radius: f64,
    pub default_trials: usize,
    pub max_trials: usize,
    pub max_minutes: u32,
}

pub async fn info(State(state): State<AppState>) -> Json<InfoResponse> {
    let config = state.config();
    Json(InfoResponse {
        version: env!("CARGO_PKG_VERSION"),
        nodes: state.graph().node_count(),
        edges: state.graph().edge_count(),
        clip_radius: config.clip_radius,
        default_trials: config.simulation.trials,
        max_trials: config.budget.max_trials,
        max_minutes: config.budget.max_minutes,
    })
}
