pub use crate::{CENTRALITY_THRESHOLD, DEFAULT_TRIALS, MAX_CLUSTERS};

// Road network model
pub use crate::loading::{load_reachable_area, load_road_graph, road_graph_from_str};
pub use crate::model::{
    AgeGroup, Demographics, Gender, LocalProjection, Preference, RoadClass, RoadEdge, RoadGraph,
    RoadNode, TransitionWeights,
};

// Simulation
pub use crate::simulation::{
    FrequencyDistribution, GoldenTimeConfig, TrialBudget, WalkParameters, estimate_golden_time,
    run_monte_carlo, simulate_walk,
};

// Spatial partitioning and mandatory paths
pub use crate::algo::mandatory::{
    CriticalNode, CriticalityResult, PathImportance, critical_nodes, path_frequency,
    reachable_nodes,
};
pub use crate::algo::partition::{
    Cell, KMeansConfig, Partition, PartitionConfig, PartitionOutcome, SkippedCell, partition,
};

// Request pipeline and reports
pub use crate::output::{MandatoryReport, SimulationReport};
pub use crate::pipeline::{
    MandatoryAlgorithm, MandatoryRequest, SearchProfile, SimulationRequest, run_mandatory,
    run_simulation,
};

pub use crate::NodeId;
