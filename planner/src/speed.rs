use roversim_structs::{GraphNode, SpeedProfile};

use crate::environment::Environment;

/// Achievable speed over ground (pixels per second) at a node. A result that is not a positive
/// finite number makes the node impassable.
pub trait SpeedModel {
    fn speed(&self, node: &GraphNode, env: &Environment) -> f64;
}

impl<F: Fn(&GraphNode, &Environment) -> f64> SpeedModel for F {
    fn speed(&self, node: &GraphNode, env: &Environment) -> f64 {
        self(node, env)
    }
}

impl SpeedModel for SpeedProfile {
    fn speed(&self, node: &GraphNode, env: &Environment) -> f64 {
        match *self {
            SpeedProfile::Constant { speed } => speed,
            SpeedProfile::Terrain { max_speed, max_slope, shadow_factor } => {
                let slope = match env.slope_at(node) {
                    Some(s) => s.abs() as f64,
                    None => return 0.0,
                };
                if slope >= max_slope {
                    return 0.0;
                }
                let shadow = match env.shadow_at(node) {
                    Some(s) => s as f64 / 255.0,
                    None => return 0.0,
                };
                max_speed * (1.0 - slope / max_slope) * (1.0 + shadow * (shadow_factor - 1.0))
            }
        }
    }
}

pub(crate) fn passable(speed: f64) -> bool {
    speed.is_finite() && speed > 0.0
}
