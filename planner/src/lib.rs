use roversim_structs::{PlannerParams, WorldGrid};

pub mod environment;
pub mod shortest_path;
pub mod speed;
pub mod txgraph;

#[cfg(test)]
mod shortest_path_tests;

pub use environment::{Environment, MapError, ShadowMap, SlopeMap};
pub use shortest_path::{find_path, find_path_with_stats, SearchStats, ACCEPTANCE_RADIUS};
pub use speed::SpeedModel;

/// Everything one planner invocation reads. Borrowed for the duration of the search.
#[derive(Clone, Copy)]
pub struct PlannerConfig<'a> {
    pub environment: &'a Environment,
    pub world: &'a WorldGrid,
    pub speed: &'a dyn SpeedModel,
    pub heuristic_speed_bound: Option<f64>,
    pub max_expansions: Option<usize>,
    pub charge_waits: bool,
}

impl<'a> PlannerConfig<'a> {
    pub fn new(environment: &'a Environment, world: &'a WorldGrid, speed: &'a dyn SpeedModel) -> Self {
        Self { environment, world, speed, heuristic_speed_bound: None, max_expansions: None, charge_waits: false }
    }

    pub fn with_params(self, params: &PlannerParams) -> Self {
        Self {
            heuristic_speed_bound: params.heuristic_speed_bound,
            max_expansions: params.max_expansions,
            charge_waits: params.charge_waits,
            ..self
        }
    }
}
