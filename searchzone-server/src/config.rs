//! Server configuration: a TOML file overridden by command line arguments

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use searchzone_core::simulation::{GoldenTimeConfig, TrialBudget};
use searchzone_core::{CENTRALITY_THRESHOLD, DEFAULT_CLIP_RADIUS, DEFAULT_TRIALS};
use serde::Deserialize;
use thiserror::Error;

pub const ORS_ISOCHRONE_ENDPOINT: &str =
    "https://api.openrouteservice.org/v2/isochrones/foot-walking";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("No road graph configured (set `graph_path` or pass --graph)")]
    MissingGraph,
}

/// Search-area estimation HTTP server
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Address to listen on
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// Road graph JSON file
    #[arg(long)]
    pub graph: Option<PathBuf>,
    /// Radius in metres of the road network used around each origin
    #[arg(long)]
    pub clip_radius: Option<f64>,
    /// Isochrone service URL
    #[arg(long)]
    pub isochrone_endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub graph_path: Option<PathBuf>,
    pub clip_radius: f64,
    pub request_timeout_secs: u64,
    pub concurrency_limit: usize,
    pub centrality_threshold: f64,
    pub isochrone: IsochroneConfig,
    pub simulation: SimulationDefaults,
    pub golden_time: GoldenTimeSettings,
    pub budget: BudgetSettings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            graph_path: None,
            clip_radius: DEFAULT_CLIP_RADIUS,
            request_timeout_secs: 120,
            concurrency_limit: 16,
            centrality_threshold: CENTRALITY_THRESHOLD,
            isochrone: IsochroneConfig::default(),
            simulation: SimulationDefaults::default(),
            golden_time: GoldenTimeSettings::default(),
            budget: BudgetSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IsochroneConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for IsochroneConfig {
    fn default() -> Self {
        Self {
            endpoint: ORS_ISOCHRONE_ENDPOINT.to_string(),
            timeout_secs: 20,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SimulationDefaults {
    pub trials: usize,
    pub seed: u64,
}

impl Default for SimulationDefaults {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct GoldenTimeSettings {
    pub searchers: usize,
    pub capacity_per_searcher: usize,
    pub max_minutes: u32,
    pub step_minutes: u32,
    pub batch_trials: usize,
}

impl Default for GoldenTimeSettings {
    fn default() -> Self {
        GoldenTimeConfig::default().into()
    }
}

impl From<GoldenTimeConfig> for GoldenTimeSettings {
    fn from(config: GoldenTimeConfig) -> Self {
        Self {
            searchers: config.searchers,
            capacity_per_searcher: config.capacity_per_searcher,
            max_minutes: config.max_minutes,
            step_minutes: config.step_minutes,
            batch_trials: config.batch_trials,
        }
    }
}

impl From<GoldenTimeSettings> for GoldenTimeConfig {
    fn from(settings: GoldenTimeSettings) -> Self {
        Self {
            searchers: settings.searchers,
            capacity_per_searcher: settings.capacity_per_searcher,
            max_minutes: settings.max_minutes,
            step_minutes: settings.step_minutes,
            batch_trials: settings.batch_trials,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct BudgetSettings {
    pub max_trials: usize,
    pub max_minutes: u32,
}

impl Default for BudgetSettings {
    fn default() -> Self {
        let budget = TrialBudget::default();
        Self {
            max_trials: budget.max_trials,
            max_minutes: budget.max_minutes,
        }
    }
}

impl From<BudgetSettings> for TrialBudget {
    fn from(settings: BudgetSettings) -> Self {
        Self {
            max_trials: settings.max_trials,
            max_minutes: settings.max_minutes,
        }
    }
}

impl ServerConfig {
    /// Reads the configuration file, if any, and applies argument overrides
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply(args);
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    fn apply(&mut self, args: &Args) {
        if let Some(bind) = args.bind {
            self.bind = bind;
        }
        if let Some(graph) = &args.graph {
            self.graph_path = Some(graph.clone());
        }
        if let Some(radius) = args.clip_radius {
            self.clip_radius = radius;
        }
        if let Some(endpoint) = &args.isochrone_endpoint {
            self.isochrone.endpoint.clone_from(endpoint);
        }
    }

    pub fn graph_path(&self) -> Result<&Path, ConfigError> {
        self.graph_path
            .as_deref()
            .ok_or(ConfigError::MissingGraph)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = ServerConfig::from_toml(
            r#"
            graph_path = "data/seoul.json"
            clip_radius = 1500.0

            [golden_time]
            searchers = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.clip_radius, 1500.0);
        assert_eq!(config.graph_path().unwrap(), Path::new("data/seoul.json"));
        assert_eq!(config.golden_time.searchers, 5);
        assert_eq!(config.golden_time.capacity_per_searcher, 20);
        assert_eq!(config.simulation.trials, DEFAULT_TRIALS);
        assert_eq!(config.isochrone.endpoint, ORS_ISOCHRONE_ENDPOINT);
    }

    #[test]
    fn arguments_override_file() {
        let args = Args::parse_from([
            "searchzone-server",
            "--bind",
            "0.0.0.0:9000",
            "--graph",
            "other.json",
        ]);
        let config = ServerConfig::load(&args).unwrap();
        assert_eq!(config.bind.port(), 9000);
        assert_eq!(config.graph_path().unwrap(), Path::new("other.json"));
    }

    #[test]
    fn missing_graph_is_reported() {
        assert!(matches!(
            ServerConfig::default().graph_path(),
            Err(ConfigError::MissingGraph)
        ));
    }

    #[test]
    fn unknown_types_are_rejected() {
        assert!(ServerConfig::from_toml("clip_radius = \"far\"").is_err());
    }
}
