//! Export of the per-tick vehicle history.

use std::{fmt, fs::File, io::Write, path::Path};

use roversim_structs::{VehicleState, WorldGrid};
use serde::Serialize;

use crate::{activity::Activity, SimError};

#[derive(Serialize)]
struct Row {
    x: f64,
    y: f64,
    energy: f64,
    mission_time: f64,
    drill_time: f64,
}

impl From<&VehicleState> for Row {
    fn from(s: &VehicleState) -> Self {
        Row { x: s.position.x, y: s.position.y, energy: s.energy, mission_time: s.mission_time, drill_time: s.drill_time }
    }
}

/// One header line, then one row per recorded state.
pub fn write_csv(history: &[VehicleState], writer: impl Write) -> Result<(), SimError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for state in history.iter() {
        wtr.serialize(Row::from(state))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_csv_file(history: &[VehicleState], path: impl AsRef<Path>) -> Result<(), SimError> {
    write_csv(history, File::create(path)?)
}

#[derive(Debug, Clone, PartialEq)]
pub struct MissionSummary {
    pub ticks: usize,
    pub final_energy: f64,
    pub min_energy: f64,
    /// Metres.
    pub distance: f64,
    pub completed: Vec<String>,
}

impl MissionSummary {
    pub fn from_history(history: &[VehicleState], completed: &[Activity], world: &WorldGrid) -> Self {
        let pixels: f64 = history.windows(2).map(|w| w[0].position.dist(&w[1].position)).sum();
        MissionSummary {
            ticks: history.len().saturating_sub(1),
            final_energy: history.last().map_or(0.0, |s| s.energy),
            min_energy: history.iter().map(|s| s.energy).fold(f64::INFINITY, f64::min),
            distance: pixels * world.meters_per_pixel,
            completed: completed.iter().map(|a| a.describe()).collect(),
        }
    }
}

impl fmt::Display for MissionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ticks:        {}", self.ticks)?;
        writeln!(f, "final energy: {:.1} J", self.final_energy)?;
        writeln!(f, "min energy:   {:.1} J", self.min_energy)?;
        writeln!(f, "distance:     {:.2} m", self.distance)?;
        writeln!(f, "completed activities:")?;
        for (i, c) in self.completed.iter().enumerate() {
            writeln!(f, "  {:>3}. {}", i + 1, c)?;
        }
        Ok(())
    }
}
