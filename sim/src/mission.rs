use std::{collections::VecDeque, fmt};

use log::{debug, info, warn};
use roversim_planner::{find_path_with_stats, Environment, MapError, PlannerConfig};
use roversim_structs::{
    MissionDefinition, PlannerParams, Position, SpeedProfile, UnreachablePolicy, VehicleHistory, VehicleParams,
    VehicleState, WorldGrid,
};

use crate::{
    activity::{Activity, DriveActivity},
    SimError,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MissionOutcome {
    /// The activity queue ran empty.
    Completed { time: f64 },
    EnergyExhausted { time: f64 },
    Unreachable { goal: Position, time: f64 },
}

impl MissionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, MissionOutcome::Completed { .. })
    }
}

impl fmt::Display for MissionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissionOutcome::Completed { time } => write!(f, "mission completed at t={} s", time),
            MissionOutcome::EnergyExhausted { time } => write!(f, "energy exhausted at t={} s", time),
            MissionOutcome::Unreachable { goal, time } => write!(f, "no route to {} at t={} s", goal, time),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickResult {
    Continue,
    Finished(MissionOutcome),
}

/// Fixed-step simulation of one rover working through its activity queue.
pub struct Mission {
    dt: f64,
    vehicle: VehicleParams,
    world: WorldGrid,
    environment: Environment,
    speed: SpeedProfile,
    planner: PlannerParams,
    state: VehicleState,
    history: VehicleHistory,
    queue: VecDeque<Activity>,
    completed: Vec<Activity>,
    outcome: Option<MissionOutcome>,
}

impl Mission {
    pub fn new(definition: &MissionDefinition, environment: Environment) -> Result<Mission, SimError> {
        definition.validate()?;
        let world = definition.world;
        if environment.slope.width() != world.width as usize
            || environment.slope.height() != world.height as usize
            || environment.shadow.timesteps() < world.timesteps as usize
        {
            return Err(MapError::SizeMismatch {
                map: "environment",
                expected: format!("{}x{}x{}", world.width, world.height, world.timesteps),
                actual: format!(
                    "{}x{}x{}",
                    environment.slope.width(),
                    environment.slope.height(),
                    environment.shadow.timesteps()
                ),
            }
            .into());
        }
        if environment.seconds_per_timestep() != world.seconds_per_timestep {
            return Err(MapError::TimestepMismatch {
                expected: world.seconds_per_timestep,
                actual: environment.seconds_per_timestep(),
            }
            .into());
        }

        let state = VehicleState::new(definition.start, definition.initial_energy());
        let queue = definition.tasks.iter().map(|t| Activity::from_task(t, &definition.vehicle)).collect();
        info!(
            "Mission with {} activities starting at {} with {} J",
            definition.tasks.len(),
            state.position,
            state.energy
        );

        Ok(Mission {
            dt: definition.dt,
            vehicle: definition.vehicle,
            world,
            environment,
            speed: definition.speed,
            planner: PlannerParams {
                heuristic_speed_bound: definition.planner.effective_speed_bound(&definition.speed),
                ..definition.planner
            },
            state,
            history: vec![state],
            queue,
            completed: Vec::new(),
            outcome: None,
        })
    }

    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    pub fn history(&self) -> &VehicleHistory {
        &self.history
    }

    pub fn completed(&self) -> &[Activity] {
        &self.completed
    }

    pub fn pending(&self) -> &VecDeque<Activity> {
        &self.queue
    }

    pub fn world(&self) -> &WorldGrid {
        &self.world
    }

    pub fn outcome(&self) -> Option<MissionOutcome> {
        self.outcome
    }

    fn finish(&mut self, outcome: MissionOutcome) -> TickResult {
        info!("{}", outcome);
        self.outcome = Some(outcome);
        TickResult::Finished(outcome)
    }

    /// Runs the head activity for one tick. Once finished, further calls return the same outcome.
    pub fn tick(&mut self) -> TickResult {
        if let Some(outcome) = self.outcome {
            return TickResult::Finished(outcome);
        }
        let mut activity = match self.queue.pop_front() {
            Some(a) => a,
            None => return self.finish(MissionOutcome::Completed { time: self.state.mission_time }),
        };

        let plan_goal = match &activity {
            Activity::Plan(plan) => Some(plan.goal),
            _ => None,
        };
        if let Some(goal) = plan_goal {
            return self.plan(goal, activity);
        }

        let mut next = self.state;
        next.mission_time += self.dt;
        let done = activity.advance(self.dt, &mut next, &self.vehicle);
        self.history.push(next);
        self.state = next;
        debug!(
            "t={} {} at {} with {:.1} J",
            next.mission_time,
            activity.describe(),
            next.position,
            next.energy
        );

        if next.energy <= 0.0 {
            warn!("Energy exhausted during {}: {} J", activity.describe(), next.energy);
            self.queue.push_front(activity);
            return self.finish(MissionOutcome::EnergyExhausted { time: next.mission_time });
        }

        if done {
            info!("Completed {} at t={}", activity.describe(), next.mission_time);
            self.completed.push(activity);
        } else {
            self.queue.push_front(activity);
        }
        TickResult::Continue
    }

    // Planning takes no simulated time. The unchanged state is still recorded.
    fn plan(&mut self, goal: Position, activity: Activity) -> TickResult {
        let config =
            PlannerConfig::new(&self.environment, &self.world, &self.speed).with_params(&self.planner);
        let (path, stats) = find_path_with_stats(&self.state, goal, &config);
        self.history.push(self.state);

        if path.is_empty() {
            let time = self.state.mission_time;
            if stats.budget_exhausted {
                warn!("Planner gave up on {} after {} expansions", goal, stats.expanded);
            }
            return match self.planner.on_unreachable {
                UnreachablePolicy::Abort => {
                    self.queue.push_front(activity);
                    self.finish(MissionOutcome::Unreachable { goal, time })
                }
                UnreachablePolicy::Skip => {
                    warn!("No route to {}, skipping", goal);
                    self.completed.push(activity);
                    TickResult::Continue
                }
            };
        }

        info!("Planned {} waypoints to {} ({} nodes expanded)", path.len(), goal, stats.expanded);
        self.queue.push_front(Activity::Drive(DriveActivity::new(path, &self.vehicle)));
        self.completed.push(activity);
        TickResult::Continue
    }

    pub fn run(&mut self) -> MissionOutcome {
        loop {
            if let TickResult::Finished(outcome) = self.tick() {
                return outcome;
            }
        }
    }
}
