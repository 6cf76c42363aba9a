use roversim_structs::{GraphNode, Position, SpeedProfile, VehicleState, WorldGrid};

use crate::{
    environment::{Environment, ShadowMap, SlopeMap},
    find_path, find_path_with_stats, PlannerConfig,
};

const FLAT: SpeedProfile = SpeedProfile::Constant { speed: 1.0 };

fn world(width: u32, height: u32, timesteps: u32) -> WorldGrid {
    WorldGrid { width, height, timesteps, meters_per_pixel: 1.0, seconds_per_timestep: 1.0 }
}

fn at(x: f64, y: f64) -> VehicleState {
    VehicleState::new(Position::new(x, y), 100.0)
}

fn chebyshev(a: Position, b: Position) -> usize {
    (a.x - b.x).abs().max((a.y - b.y).abs()) as usize
}

fn assert_connected(path: &[GraphNode]) {
    for w in path.windows(2) {
        assert!(chebyshev(w[0].position, w[1].position) <= 1, "jump {:?} -> {:?}", w[0], w[1]);
        assert!(w[1].time > w[0].time, "time does not advance {:?} -> {:?}", w[0], w[1]);
    }
}

#[test]
pub fn straight_line_on_flat_grid() {
    let _ = env_logger::try_init();
    let world = world(10, 10, 100);
    let env = Environment::flat(&world);
    let config = PlannerConfig::new(&env, &world, &FLAT);

    let path = find_path(&at(0.0, 0.0), Position::new(0.0, 5.0), &config);
    assert_eq!(path.len(), 6);
    for (i, node) in path.iter().enumerate() {
        assert_eq!(node.position, Position::new(0.0, i as f64));
        assert_eq!(node.time, i as f64);
    }
}

#[test]
pub fn move_count_matches_chebyshev_distance() {
    let _ = env_logger::try_init();
    let world = world(10, 10, 100);
    let env = Environment::flat(&world);
    let config = PlannerConfig::new(&env, &world, &FLAT);

    for goal in [Position::new(3.0, 5.0), Position::new(7.0, 2.0), Position::new(9.0, 9.0), Position::new(1.0, 0.0)] {
        let path = find_path(&at(0.0, 0.0), goal, &config);
        assert_eq!(path.len(), chebyshev(Position::new(0.0, 0.0), goal) + 1, "goal {}", goal);
        assert_eq!(path.first().unwrap().position, Position::new(0.0, 0.0));
        assert_eq!(path.last().unwrap().position, goal);
        assert_connected(&path);
    }
}

#[test]
pub fn heuristic_speed_bound_gives_same_route_on_flat_grid() {
    let world = world(10, 10, 100);
    let env = Environment::flat(&world);
    let mut config = PlannerConfig::new(&env, &world, &FLAT);
    config.heuristic_speed_bound = Some(1.0);

    let path = find_path(&at(0.0, 0.0), Position::new(0.0, 5.0), &config);
    assert_eq!(path.len(), 6);
}

#[test]
pub fn goal_outside_world_gives_empty_path() {
    let world = world(10, 10, 100);
    let env = Environment::flat(&world);
    let config = PlannerConfig::new(&env, &world, &FLAT);

    assert!(find_path(&at(0.0, 0.0), Position::new(20.0, 20.0), &config).is_empty());
    assert!(find_path(&at(0.0, 0.0), Position::new(-3.0, 0.0), &config).is_empty());
    assert!(find_path(&at(0.0, 0.0), Position::new(f64::NAN, 0.0), &config).is_empty());
}

#[test]
pub fn goal_beyond_time_horizon_gives_empty_path() {
    let _ = env_logger::try_init();
    let world = world(10, 10, 3);
    let env = Environment::flat(&world);
    let config = PlannerConfig::new(&env, &world, &FLAT);

    let (path, stats) = find_path_with_stats(&at(0.0, 0.0), Position::new(0.0, 5.0), &config);
    assert!(path.is_empty());
    assert!(!stats.budget_exhausted);
    assert!(stats.expanded > 0);
}

#[test]
pub fn start_after_horizon_gives_empty_path() {
    let world = world(10, 10, 3);
    let env = Environment::flat(&world);
    let config = PlannerConfig::new(&env, &world, &FLAT);

    let mut start = at(0.0, 0.0);
    start.mission_time = 3.0;
    assert!(find_path(&start, Position::new(0.0, 1.0), &config).is_empty());
}

#[test]
pub fn wall_disconnects_goal() {
    let _ = env_logger::try_init();
    let world = world(10, 10, 40);
    let mut slope = vec![0.0f32; 100];
    for y in 0..10 {
        slope[y * 10 + 3] = 90.0;
    }
    let profile = SpeedProfile::Terrain { max_speed: 1.0, max_slope: 30.0, shadow_factor: 1.0 };

    let env = Environment::new(
        SlopeMap::from_data(10, 10, slope.clone()).unwrap(),
        ShadowMap::lit(10, 10, 40),
        &world,
    )
    .unwrap();
    let config = PlannerConfig::new(&env, &world, &profile);
    assert!(find_path(&at(0.0, 0.0), Position::new(6.0, 5.0), &config).is_empty());

    // Open a gap at the far end of the wall.
    slope[9 * 10 + 3] = 0.0;
    let env = Environment::new(SlopeMap::from_data(10, 10, slope).unwrap(), ShadowMap::lit(10, 10, 40), &world)
        .unwrap();
    let config = PlannerConfig::new(&env, &world, &profile);
    let path = find_path(&at(0.0, 0.0), Position::new(6.0, 5.0), &config);
    assert!(!path.is_empty());
    assert_eq!(path.last().unwrap().position, Position::new(6.0, 5.0));
    assert!(path.iter().any(|n| n.position == Position::new(3.0, 9.0)));
    assert!(path.iter().all(|n| n.position.x != 3.0 || n.position.y == 9.0));
    assert_connected(&path);
}

#[test]
pub fn waits_for_shadow_to_pass() {
    let _ = env_logger::try_init();
    let world = world(5, 1, 20);
    let mut shadow = vec![0u8; 5 * 20];
    for t in 0..3 {
        shadow[t * 5 + 2] = 255;
    }
    let env = Environment::new(
        SlopeMap::flat(5, 1),
        ShadowMap::from_data(5, 1, 20, shadow).unwrap(),
        &world,
    )
    .unwrap();
    // Full shadow stops the rover completely.
    let profile = SpeedProfile::Terrain { max_speed: 1.0, max_slope: 30.0, shadow_factor: 0.0 };
    let config = PlannerConfig::new(&env, &world, &profile);

    let path = find_path(&at(0.0, 0.0), Position::new(4.0, 0.0), &config);
    assert_eq!(path.last().unwrap().position, Position::new(4.0, 0.0));
    assert_eq!(path.last().unwrap().time, 6.0);
    assert!(path.windows(2).any(|w| w[0].position == w[1].position), "expected a wait in {:?}", path);
    assert!(path.iter().filter(|n| n.position.x == 2.0).all(|n| n.time >= 4.0));
    assert_connected(&path);
}

#[test]
pub fn expansion_budget_stops_search() {
    let world = world(10, 10, 100);
    let env = Environment::flat(&world);
    let mut config = PlannerConfig::new(&env, &world, &FLAT);
    config.max_expansions = Some(2);

    let (path, stats) = find_path_with_stats(&at(0.0, 0.0), Position::new(0.0, 5.0), &config);
    assert!(path.is_empty());
    assert!(stats.budget_exhausted);
    assert_eq!(stats.expanded, 2);
}

#[test]
pub fn start_is_floored_and_keeps_mission_time() {
    let world = world(10, 10, 100);
    let env = Environment::flat(&world);
    let config = PlannerConfig::new(&env, &world, &FLAT);

    let mut start = at(0.4, 0.7);
    start.mission_time = 3.5;
    let path = find_path(&start, Position::new(0.0, 2.0), &config);
    assert_eq!(path.len(), 3);
    assert_eq!(path[0], GraphNode::new(Position::new(0.0, 0.0), 3.5));
    assert_eq!(path[2].time, 5.5);
}

#[test]
pub fn goal_at_start_is_a_single_node() {
    let world = world(10, 10, 100);
    let env = Environment::flat(&world);
    let config = PlannerConfig::new(&env, &world, &FLAT);

    let path = find_path(&at(4.0, 4.0), Position::new(4.0, 4.0), &config);
    assert_eq!(path, vec![GraphNode::new(Position::new(4.0, 4.0), 0.0)]);
}

fn half_shaded_corridor() -> (WorldGrid, Environment) {
    let world = world(5, 2, 20);
    let mut shadow = vec![0u8; 5 * 2 * 20];
    for t in 0..3 {
        shadow[t * 10 + 2] = 255;
    }
    let env = Environment::new(SlopeMap::flat(5, 2), ShadowMap::from_data(5, 2, 20, shadow).unwrap(), &world)
        .unwrap();
    (world, env)
}

#[test]
pub fn free_waits_beat_a_longer_detour() {
    let _ = env_logger::try_init();
    let (world, env) = half_shaded_corridor();
    let profile = SpeedProfile::Terrain { max_speed: 1.0, max_slope: 30.0, shadow_factor: 0.0 };
    let config = PlannerConfig::new(&env, &world, &profile);

    let path = find_path(&at(0.0, 0.0), Position::new(4.0, 0.0), &config);
    assert!(path.iter().all(|n| n.position.y == 0.0), "left the row: {:?}", path);
    assert_eq!(path.last().unwrap().position, Position::new(4.0, 0.0));
    assert_eq!(path.last().unwrap().time, 6.0);
    assert_connected(&path);
}

#[test]
pub fn charged_waits_take_the_detour() {
    let _ = env_logger::try_init();
    let (world, env) = half_shaded_corridor();
    let profile = SpeedProfile::Terrain { max_speed: 1.0, max_slope: 30.0, shadow_factor: 0.0 };
    let mut config = PlannerConfig::new(&env, &world, &profile);
    config.charge_waits = true;

    let path = find_path(&at(0.0, 0.0), Position::new(4.0, 0.0), &config);
    assert_eq!(path.last().unwrap().position, Position::new(4.0, 0.0));
    assert!((path.last().unwrap().time - (2.0 + 2.0 * 2f64.sqrt())).abs() < 1e-9);
    assert!(path.iter().any(|n| n.position == Position::new(2.0, 1.0)));
    assert_connected(&path);
}

#[test]
pub fn closure_speed_blocks_a_column() {
    let world = world(10, 10, 100);
    let env = Environment::flat(&world);
    let speed = |node: &GraphNode, _: &Environment| {
        if node.position.x == 2.0 && node.position.y < 4.0 {
            0.0
        } else {
            1.0
        }
    };
    let config = PlannerConfig::new(&env, &world, &speed);

    let path = find_path(&at(0.0, 0.0), Position::new(4.0, 0.0), &config);
    assert_eq!(path.last().unwrap().position, Position::new(4.0, 0.0));
    assert!(path.iter().filter(|n| n.position.x == 2.0).all(|n| n.position.y >= 4.0));
    assert_connected(&path);
}

#[test]
pub fn improved_entries_are_skipped_when_popped() {
    let _ = env_logger::try_init();
    let world = WorldGrid { width: 7, height: 2, timesteps: 3, meters_per_pixel: 1.0, seconds_per_timestep: 1000.0 };
    let env = Environment::flat(&world);
    // (1,0) is cheap enough to be expanded before (1,1) but reaches (2,1) diagonally, so (1,1)
    // improves (2,1) afterwards. The rest of the bottom row is a swamp.
    let speed = |node: &GraphNode, _: &Environment| match (node.position.x as i64, node.position.y as i64) {
        (1, 0) => 0.8,
        (2..=5, 0) => 0.1,
        _ => 1.0,
    };
    let mut config = PlannerConfig::new(&env, &world, &speed);
    config.heuristic_speed_bound = Some(1.0);

    let (path, stats) = find_path_with_stats(&at(0.0, 0.0), Position::new(6.0, 0.0), &config);
    assert!(stats.stale_skipped > 0, "{:?}", stats);
    let positions: Vec<(f64, f64)> = path.iter().map(|n| (n.position.x, n.position.y)).collect();
    assert_eq!(positions, vec![(0.0, 0.0), (1.0, 1.0), (2.0, 1.0), (3.0, 1.0), (4.0, 1.0), (5.0, 1.0), (6.0, 0.0)]);
    assert!((path.last().unwrap().time - (4.0 + 2.0 * 2f64.sqrt())).abs() < 1e-9);
}
