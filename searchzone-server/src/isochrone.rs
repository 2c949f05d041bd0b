//! Reachable-area polygons from an external isochrone service

use std::time::Duration;

use async_trait::async_trait;
use geo::{Point, Polygon};
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use searchzone_core::loading::reachable_area_from_geojson;
use serde_json::json;
use thiserror::Error;

use crate::config::IsochroneConfig;

#[derive(Debug, Error)]
pub enum IsochroneError {
    #[error("Isochrone request timed out")]
    Timeout,
    #[error("Isochrone service unreachable: {0}")]
    Transport(String),
    #[error("Isochrone service rejected the API key (status {status})")]
    Rejected { status: u16 },
    #[error("Isochrone service answered with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Invalid isochrone response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for IsochroneError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl IsochroneError {
    /// Whether repeating the same call may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout | Self::Transport(_) => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::Rejected { .. } | Self::InvalidResponse(_) => false,
        }
    }
}

/// Source of the area reachable on foot from an origin
#[async_trait]
pub trait IsochroneProvider: Send + Sync {
    /// Polygon (lon/lat) reachable from `origin` within `seconds`
    async fn reachable_area(
        &self,
        origin: Point<f64>,
        seconds: u32,
        api_key: &str,
    ) -> Result<Polygon<f64>, IsochroneError>;
}

/// OpenRouteService `foot-walking` isochrones
pub struct OpenRouteService {
    client: reqwest::Client,
    endpoint: String,
}

impl OpenRouteService {
    pub fn new(config: &IsochroneConfig) -> Result<Self, IsochroneError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait]
impl IsochroneProvider for OpenRouteService {
    async fn reachable_area(
        &self,
        origin: Point<f64>,
        seconds: u32,
        api_key: &str,
    ) -> Result<Polygon<f64>, IsochroneError> {
        let body = json!({
            "locations": [[origin.x(), origin.y()]],
            "range": [seconds],
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(IsochroneError::Rejected {
                status: status.as_u16(),
            });
        }
        let text = response.text().await?;
        if !status.is_success() {
            return Err(IsochroneError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        tracing::debug!(seconds, bytes = text.len(), "Received isochrone");
        reachable_area_from_geojson(&text)
            .map_err(|e| IsochroneError::InvalidResponse(e.to_string()))
    }
}
