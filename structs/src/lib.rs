use std::ops::{Add, AddAssign, Mul, Sub};

use serde::{Deserialize, Serialize};

pub mod mission;
pub mod world;

pub use mission::{
    ConfigError, MissionDefinition, PlannerParams, SpeedProfile, Task, UnreachablePolicy, VehicleParams,
};
pub use world::{VoxelKey, WorldGrid};

/// A point in world (pixel) coordinates.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn dist(&self, other: &Position) -> f64 {
        (*other - *self).length()
    }

    /// Unit vector in the same direction, or the zero vector for a zero-length input.
    pub fn normalized(&self) -> Position {
        let len = self.length();
        if len == 0.0 {
            return Position::default();
        }
        Position { x: self.x / len, y: self.y / len }
    }

    pub fn floor(&self) -> Position {
        Position { x: self.x.floor(), y: self.y.floor() }
    }

    pub fn eq_within(&self, other: &Position, epsilon: f64) -> bool {
        self.dist(other) < epsilon
    }
}

impl Add for Position {
    type Output = Position;
    fn add(self, rhs: Position) -> Position {
        Position { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl AddAssign for Position {
    fn add_assign(&mut self, rhs: Position) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Position {
    type Output = Position;
    fn sub(self, rhs: Position) -> Position {
        Position { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl Mul<f64> for Position {
    type Output = Position;
    fn mul(self, rhs: f64) -> Position {
        Position { x: self.x * rhs, y: self.y * rhs }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// A place at a specific simulated time (seconds). Vertex of the planner's search graph.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct GraphNode {
    pub position: Position,
    pub time: f64,
}

impl GraphNode {
    pub const fn new(position: Position, time: f64) -> Self {
        Self { position, time }
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct VehicleState {
    pub position: Position,
    /// Joules.
    pub energy: f64,
    /// Seconds since mission start.
    pub mission_time: f64,
    /// Seconds spent on the current drilling activity.
    pub drill_time: f64,
}

impl VehicleState {
    pub fn new(position: Position, energy: f64) -> Self {
        Self { position, energy, mission_time: 0.0, drill_time: 0.0 }
    }
}

pub type VehicleHistory = Vec<VehicleState>;
