use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Position, WorldGrid};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid mission parameter `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("malformed mission definition: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("could not read mission definition: {0}")]
    Io(#[from] std::io::Error),
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field, reason: reason.into() }
}

/// Physical parameters of the rover. Power draws are consumption in watts, the charge rate is
/// inflow in watts.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct VehicleParams {
    pub max_energy: f64,
    pub max_speed: f64,
    pub drive_power: f64,
    pub drill_power: f64,
    pub hibernate_power: f64,
    pub charge_rate: f64,
}

impl Default for VehicleParams {
    fn default() -> Self {
        Self {
            max_energy: 360_000.0, // 100 Wh
            max_speed: 0.1,
            drive_power: 10.0,
            drill_power: 30.0,
            hibernate_power: 1.0,
            charge_rate: 15.0,
        }
    }
}

/// Speed over ground used by the planner for edge costs and the heuristic.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum SpeedProfile {
    Constant { speed: f64 },
    /// Linear derating with slope (degrees), impassable at `max_slope`; full shadow scales the
    /// speed by `shadow_factor`.
    Terrain { max_speed: f64, max_slope: f64, shadow_factor: f64 },
}

impl Default for SpeedProfile {
    fn default() -> Self {
        SpeedProfile::Constant { speed: 1.0 }
    }
}

impl SpeedProfile {
    /// An upper bound on the speed this profile can produce anywhere.
    pub fn upper_bound(&self) -> f64 {
        match self {
            SpeedProfile::Constant { speed } => *speed,
            SpeedProfile::Terrain { max_speed, shadow_factor, .. } => max_speed * shadow_factor.max(1.0),
        }
    }
}

/// What the mission does when the planner finds no route to a goal.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UnreachablePolicy {
    #[default]
    Abort,
    Skip,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(default)]
pub struct PlannerParams {
    /// Divide heuristic distances by this speed instead of the local node speed. The heuristic is
    /// only admissible if this really bounds the speed everywhere.
    pub heuristic_speed_bound: Option<f64>,
    /// Give up (no path) after this many node expansions.
    pub max_expansions: Option<usize>,
    /// Use the speed profile's upper bound as `heuristic_speed_bound` when none is given.
    pub admissible_heuristic: bool,
    /// Charge wait edges the time waited. Off, waiting is free and the planner only minimises
    /// driving time.
    pub charge_waits: bool,
    pub on_unreachable: UnreachablePolicy,
}

impl PlannerParams {
    pub fn effective_speed_bound(&self, speed: &SpeedProfile) -> Option<f64> {
        self.heuristic_speed_bound
            .or_else(|| self.admissible_heuristic.then(|| speed.upper_bound()))
    }
}

/// One entry of the mission's initial activity queue, as written in a mission file.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Task {
    Plan { goal: Position },
    Drive { waypoints: Vec<Position> },
    Drill { duration: f64 },
    Recharge {
        /// Defaults to full capacity.
        #[serde(default)]
        target_energy: Option<f64>,
        #[serde(default)]
        abandon_threshold: f64,
    },
    Hibernate { wakeup_time: f64 },
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct MissionDefinition {
    /// Tick length in seconds.
    pub dt: f64,
    pub start: Position,
    /// Defaults to `vehicle.max_energy`.
    pub initial_energy: Option<f64>,
    pub vehicle: VehicleParams,
    pub world: WorldGrid,
    pub speed: SpeedProfile,
    pub planner: PlannerParams,
    pub tasks: Vec<Task>,
}

impl Default for MissionDefinition {
    fn default() -> Self {
        Self {
            dt: 1.0,
            start: Position::default(),
            initial_energy: None,
            vehicle: VehicleParams::default(),
            world: WorldGrid::default(),
            speed: SpeedProfile::default(),
            planner: PlannerParams::default(),
            tasks: Vec::new(),
        }
    }
}

impl MissionDefinition {
    /// The hard-coded traverse the simulator runs when no mission file is given.
    pub fn demo() -> Self {
        Self {
            tasks: vec![
                Task::Plan { goal: Position::new(0.0, 5.0) },
                Task::Drill { duration: 30.0 }, // 30 W for 30 s, 0.25% of the battery
                Task::Plan { goal: Position::new(1.0, 1.0) },
                Task::Recharge { target_energy: None, abandon_threshold: 0.0 },
                Task::Plan { goal: Position::new(2.0, 12.0) },
                Task::Hibernate { wakeup_time: 2400.0 },
            ],
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let definition: MissionDefinition = serde_json::from_str(json)?;
        definition.validate()?;
        Ok(definition)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn initial_energy(&self) -> f64 {
        self.initial_energy.unwrap_or(self.vehicle.max_energy)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(invalid(field, format!("must be a positive number, got {}", value)))
            }
        }
        fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(invalid(field, format!("must be zero or positive, got {}", value)))
            }
        }

        positive("dt", self.dt)?;

        let v = &self.vehicle;
        positive("vehicle.max_energy", v.max_energy)?;
        positive("vehicle.max_speed", v.max_speed)?;
        positive("vehicle.charge_rate", v.charge_rate)?;
        non_negative("vehicle.drive_power", v.drive_power)?;
        non_negative("vehicle.drill_power", v.drill_power)?;
        non_negative("vehicle.hibernate_power", v.hibernate_power)?;

        let energy = self.initial_energy();
        if !(energy > 0.0 && energy <= v.max_energy) {
            return Err(invalid("initial_energy", format!("must be in (0, {}], got {}", v.max_energy, energy)));
        }

        let w = &self.world;
        if w.width == 0 || w.height == 0 || w.timesteps == 0 {
            return Err(invalid("world", "width, height and timesteps must be non-zero"));
        }
        positive("world.seconds_per_timestep", w.seconds_per_timestep)?;
        positive("world.meters_per_pixel", w.meters_per_pixel)?;
        let start = self.start.floor();
        if !w.in_bounds(start.x as i64, start.y as i64) || !self.start.x.is_finite() || !self.start.y.is_finite()
        {
            return Err(invalid("start", format!("{} is outside the world", self.start)));
        }

        match self.speed {
            SpeedProfile::Constant { speed } => positive("speed.speed", speed)?,
            SpeedProfile::Terrain { max_speed, max_slope, shadow_factor } => {
                positive("speed.max_speed", max_speed)?;
                positive("speed.max_slope", max_slope)?;
                non_negative("speed.shadow_factor", shadow_factor)?;
            }
        }
        if let Some(bound) = self.planner.heuristic_speed_bound {
            positive("planner.heuristic_speed_bound", bound)?;
        }

        for task in self.tasks.iter() {
            match task {
                Task::Plan { .. } => {}
                Task::Drive { waypoints } => {
                    if waypoints.is_empty() {
                        return Err(invalid("tasks.drive.waypoints", "must not be empty"));
                    }
                }
                Task::Drill { duration } => non_negative("tasks.drill.duration", *duration)?,
                Task::Recharge { target_energy, abandon_threshold } => {
                    if let Some(target) = target_energy {
                        positive("tasks.recharge.target_energy", *target)?;
                    }
                    non_negative("tasks.recharge.abandon_threshold", *abandon_threshold)?;
                }
                Task::Hibernate { wakeup_time } => non_negative("tasks.hibernate.wakeup_time", *wakeup_time)?,
            }
        }

        Ok(())
    }
}
