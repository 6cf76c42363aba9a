use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashMap},
};

use log::{debug, trace};
use ordered_float::OrderedFloat;
use roversim_structs::{GraphNode, Position, VehicleState, VoxelKey, WorldGrid};
use tinyvec::TinyVec;

use crate::{speed::passable, txgraph::succ, PlannerConfig};

/// A node closer than this to the goal ends the search.
pub const ACCEPTANCE_RADIUS: f64 = 1.0;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SearchStats {
    pub expanded: usize,
    pub pushed: usize,
    pub stale_skipped: usize,
    pub budget_exhausted: bool,
}

fn heuristic(node: &GraphNode, goal: Position, config: &PlannerConfig<'_>) -> f64 {
    let dist = node.position.dist(&goal);
    if dist == 0.0 {
        return 0.0;
    }
    let speed = config
        .heuristic_speed_bound
        .unwrap_or_else(|| config.speed.speed(node, config.environment));
    if passable(speed) {
        dist / speed
    } else {
        f64::INFINITY
    }
}

fn goal_in_world(goal: Position, world: &WorldGrid) -> bool {
    if !goal.x.is_finite() || !goal.y.is_finite() || world.width == 0 || world.height == 0 {
        return false;
    }
    let nearest = Position::new(
        goal.x.clamp(0.0, (world.width - 1) as f64).round(),
        goal.y.clamp(0.0, (world.height - 1) as f64).round(),
    );
    nearest.dist(&goal) < ACCEPTANCE_RADIUS
}

fn reconstruct_path(
    nodes: &HashMap<VoxelKey, GraphNode>,
    came_from: &HashMap<VoxelKey, VoxelKey>,
    mut key: VoxelKey,
) -> Vec<GraphNode> {
    let mut path = vec![nodes[&key]];
    while let Some(prev) = came_from.get(&key) {
        key = *prev;
        path.push(nodes[&key]);
        assert!(path.len() <= nodes.len(), "cycle in predecessor links");
    }
    path.reverse();
    path
}

/// Minimum-time route from the vehicle's cell and mission time to within [`ACCEPTANCE_RADIUS`] of
/// `goal`, start and end inclusive. Empty if the goal cannot be reached inside the world's time
/// horizon or the expansion budget.
pub fn find_path(start: &VehicleState, goal: Position, config: &PlannerConfig<'_>) -> Vec<GraphNode> {
    find_path_with_stats(start, goal, config).0
}

pub fn find_path_with_stats(
    start: &VehicleState,
    goal: Position,
    config: &PlannerConfig<'_>,
) -> (Vec<GraphNode>, SearchStats) {
    #[cfg(feature = "prof")]
    let _p = hprof::enter("find_path");
    let world = config.world;
    let mut stats = SearchStats::default();

    let start_node = GraphNode::new(start.position.floor(), start.mission_time);
    let start_key = match world.voxel_key(&start_node) {
        Some(k) => k,
        None => {
            debug!("Start {:?} is outside the space-time grid", start_node);
            return (Vec::new(), stats);
        }
    };
    if !goal_in_world(goal, world) {
        debug!("Goal {} is outside the world", goal);
        return (Vec::new(), stats);
    }

    debug!("Planning from {} at t={} to {}", start_node.position, start_node.time, goal);

    let mut nodes: HashMap<VoxelKey, GraphNode> = HashMap::from([(start_key, start_node)]);
    let mut came_from: HashMap<VoxelKey, VoxelKey> = Default::default();
    let mut g_score: HashMap<VoxelKey, f64> = HashMap::from([(start_key, 0.0)]);
    let start_f = heuristic(&start_node, goal, config);
    let mut f_score: HashMap<VoxelKey, f64> = HashMap::from([(start_key, start_f)]);

    // Ties between equal f go to the earlier arrival, then to insertion order.
    let mut open: BinaryHeap<Reverse<(OrderedFloat<f64>, OrderedFloat<f64>, u64, VoxelKey)>> = BinaryHeap::new();
    let mut seq: u64 = 0;
    open.push(Reverse((OrderedFloat(start_f), OrderedFloat(start_node.time), seq, start_key)));
    stats.pushed += 1;

    while let Some(Reverse((OrderedFloat(f), _, _, key))) = open.pop() {
        // Entries are never removed when a key's score improves. A popped entry is live only if
        // its priority still matches the key's best f.
        if f > f_score[&key] {
            stats.stale_skipped += 1;
            continue;
        }

        let current = nodes[&key];
        if current.position.dist(&goal) < ACCEPTANCE_RADIUS {
            let path = reconstruct_path(&nodes, &came_from, key);
            debug!(
                "Found path with {} nodes arriving at t={} ({} expanded, {} pushed, {} stale)",
                path.len(),
                current.time,
                stats.expanded,
                stats.pushed,
                stats.stale_skipped
            );
            return (path, stats);
        }

        if config.max_expansions.is_some_and(|max| stats.expanded >= max) {
            debug!("Expansion budget of {} nodes exhausted", stats.expanded);
            stats.budget_exhausted = true;
            return (Vec::new(), stats);
        }
        stats.expanded += 1;
        trace!("Expanding {:?} f={}", current, f);

        let g = g_score[&key];
        let mut successors: TinyVec<[(GraphNode, f64); 9]> = Default::default();
        succ(&current, config, |next, cost| successors.push((next, cost)));

        for (next, cost) in successors {
            let next_key = match world.voxel_key(&next) {
                Some(k) => k,
                None => continue,
            };
            let tentative_g = g + cost;
            if g_score.get(&next_key).map_or(true, |old| tentative_g < *old) {
                let next_f = tentative_g + heuristic(&next, goal, config);
                nodes.insert(next_key, next);
                came_from.insert(next_key, key);
                g_score.insert(next_key, tentative_g);
                f_score.insert(next_key, next_f);
                seq += 1;
                open.push(Reverse((OrderedFloat(next_f), OrderedFloat(next.time), seq, next_key)));
                stats.pushed += 1;
            }
        }
    }

    debug!("No path to {} ({} nodes expanded)", goal, stats.expanded);
    (Vec::new(), stats)
}
