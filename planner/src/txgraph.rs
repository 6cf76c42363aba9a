use roversim_structs::{GraphNode, Position};

use crate::{speed::passable, PlannerConfig};

/// Successors of `current` in the time-expanded grid graph, passed to `f` with their edge cost.
///
/// Spatial successors are the eight adjacent cells inside the world, reached at
/// `current.time + distance / speed(neighbour)`. Speed is evaluated at the neighbour's cell at the
/// departure time. The wait successor stays in place until the next timestep boundary. It is free
/// unless `config.charge_waits` is set, in which case it costs the time waited. Successors outside
/// the time horizon are not produced.
pub fn succ(current: &GraphNode, config: &PlannerConfig<'_>, mut f: impl FnMut(GraphNode, f64)) {
    let world = config.world;
    let x = current.position.x.floor() as i64;
    let y = current.position.y.floor() as i64;

    for dx in -1..=1i64 {
        for dy in -1..=1i64 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let (nx, ny) = (x + dx, y + dy);
            if !world.in_bounds(nx, ny) {
                continue;
            }

            let position = Position::new(nx as f64, ny as f64);
            let speed = config.speed.speed(&GraphNode::new(position, current.time), config.environment);
            if !passable(speed) {
                continue;
            }

            let cost = current.position.dist(&position) / speed;
            let next = GraphNode::new(position, current.time + cost);
            if world.timestep_index(next.time).is_none() {
                continue;
            }
            f(next, cost);
        }
    }

    let wait_until = world.next_timestep_boundary(current.time);
    if world.timestep_index(wait_until).is_some() {
        let cost = if config.charge_waits { wait_until - current.time } else { 0.0 };
        f(GraphNode::new(current.position, wait_until), cost);
    }
}
