use serde::{Deserialize, Serialize};

use crate::GraphNode;

/// Identifies one (x, y, timestep) cell of the space-time grid.
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct VoxelKey(pub u64);

/// Static description of the space-time grid searched by the planner.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct WorldGrid {
    pub width: u32,
    pub height: u32,
    pub timesteps: u32,
    pub meters_per_pixel: f64,
    pub seconds_per_timestep: f64,
}

impl Default for WorldGrid {
    fn default() -> Self {
        Self { width: 256, height: 256, timesteps: 360, meters_per_pixel: 1.0, seconds_per_timestep: 3600.0 }
    }
}

impl WorldGrid {
    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64
    }

    /// Timestep bucket containing `time`, or `None` outside `[0, timesteps)`.
    pub fn timestep_index(&self, time: f64) -> Option<u32> {
        if !time.is_finite() || time < 0.0 {
            return None;
        }
        let t = (time / self.seconds_per_timestep).floor();
        (t < self.timesteps as f64).then_some(t as u32)
    }

    /// Start of the timestep after the one containing `time`.
    pub fn next_timestep_boundary(&self, time: f64) -> f64 {
        let spt = self.seconds_per_timestep;
        (time / spt).floor() * spt + spt
    }

    /// `timestep * width * height + y * width + x`.
    ///
    /// The node's position must lie exactly on a pixel corner inside the world, and its time inside
    /// the horizon; anything else has no key.
    pub fn voxel_key(&self, node: &GraphNode) -> Option<VoxelKey> {
        let (x, y) = (node.position.x, node.position.y);
        if !x.is_finite() || !y.is_finite() || x.fract() != 0.0 || y.fract() != 0.0 {
            return None;
        }
        if !self.in_bounds(x as i64, y as i64) {
            return None;
        }
        let t = self.timestep_index(node.time)? as u64;
        let (w, h) = (self.width as u64, self.height as u64);
        Some(VoxelKey(t * w * h + y as u64 * w + x as u64))
    }
}
