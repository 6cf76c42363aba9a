use std::path::Path;

use log::info;
use roversim_planner::{Environment, ShadowMap, SlopeMap};
use roversim_structs::MissionDefinition;

pub mod activity;
pub mod error;
pub mod mission;
pub mod telemetry;

pub use activity::{Activity, ARRIVAL_EPSILON};
pub use error::SimError;
pub use mission::{Mission, MissionOutcome, TickResult};
pub use telemetry::{write_csv, write_csv_file, MissionSummary};

/// Loads the map files for a mission. A missing slope map means flat terrain, a missing shadow
/// map means full sun for the whole horizon.
pub fn load_environment(
    definition: &MissionDefinition,
    slope_path: Option<&Path>,
    shadow_path: Option<&Path>,
) -> Result<Environment, SimError> {
    let world = &definition.world;
    let slope = match slope_path {
        Some(path) => {
            info!("Reading slope map {}", path.display());
            SlopeMap::from_file(path)?
        }
        None => SlopeMap::flat(world.width, world.height),
    };
    let shadow = match shadow_path {
        Some(path) => {
            info!("Reading shadow map {}", path.display());
            ShadowMap::from_file(path)?
        }
        None => ShadowMap::lit(world.width, world.height, world.timesteps),
    };
    Ok(Environment::new(slope, shadow, world)?)
}
