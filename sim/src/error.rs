use roversim_planner::MapError;
use roversim_structs::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Map(#[from] MapError),

    #[error("could not write telemetry: {0}")]
    Telemetry(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
