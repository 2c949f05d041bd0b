//! Shared state of the request handlers

use std::sync::Arc;

use searchzone_core::RoadGraph;

use crate::config::ServerConfig;
use crate::isochrone::IsochroneProvider;

/// Cloned into every handler; the road graph is loaded once at startup and
/// only read afterwards.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    graph: RoadGraph,
    config: ServerConfig,
    isochrone: Arc<dyn IsochroneProvider>,
}

impl AppState {
    pub fn new(
        graph: RoadGraph,
        config: ServerConfig,
        isochrone: Arc<dyn IsochroneProvider>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                graph,
                config,
                isochrone,
            }),
        }
    }

    pub fn graph(&self) -> &RoadGraph {
        &self.inner.graph
    }

    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    pub fn isochrone(&self) -> &dyn IsochroneProvider {
        self.inner.isochrone.as_ref()
    }
}
