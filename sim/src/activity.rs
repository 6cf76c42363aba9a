use roversim_structs::{GraphNode, Position, Task, VehicleParams, VehicleState};

/// Waypoints closer than this to the rover count as reached.
pub const ARRIVAL_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub struct PlanActivity {
    pub goal: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DriveActivity {
    pub path: Vec<GraphNode>,
    pub current_waypoint: usize,
    pub max_speed: f64,
    pub power: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrillActivity {
    pub total_duration: f64,
    pub power: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RechargeActivity {
    pub target_energy: f64,
    /// Stop charging once the rover is within this many joules of the target.
    pub abandon_threshold: f64,
    pub charge_rate: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HibernateActivity {
    pub wakeup_time: f64,
    pub power: f64,
}

/// A unit of mission work. Every variant except `Plan` changes the vehicle state once per tick;
/// `Plan` is replaced by a `Drive` before any time passes.
#[derive(Debug, Clone, PartialEq)]
pub enum Activity {
    Plan(PlanActivity),
    Drive(DriveActivity),
    Drill(DrillActivity),
    Recharge(RechargeActivity),
    Hibernate(HibernateActivity),
}

impl Activity {
    pub fn from_task(task: &Task, vehicle: &VehicleParams) -> Activity {
        match task {
            Task::Plan { goal } => Activity::Plan(PlanActivity { goal: *goal }),
            Task::Drive { waypoints } => Activity::Drive(DriveActivity::new(
                waypoints.iter().map(|p| GraphNode::new(*p, 0.0)).collect(),
                vehicle,
            )),
            Task::Drill { duration } => {
                Activity::Drill(DrillActivity { total_duration: *duration, power: vehicle.drill_power })
            }
            Task::Recharge { target_energy, abandon_threshold } => Activity::Recharge(RechargeActivity {
                target_energy: target_energy.unwrap_or(vehicle.max_energy),
                abandon_threshold: *abandon_threshold,
                charge_rate: vehicle.charge_rate,
            }),
            Task::Hibernate { wakeup_time } => {
                Activity::Hibernate(HibernateActivity { wakeup_time: *wakeup_time, power: vehicle.hibernate_power })
            }
        }
    }

    /// Applies one tick of length `dt` to `state` and reports whether the activity is done.
    pub fn advance(&mut self, dt: f64, state: &mut VehicleState, vehicle: &VehicleParams) -> bool {
        match self {
            Activity::Plan(_) => true,
            Activity::Drive(drive) => drive.advance(dt, state),
            Activity::Drill(drill) => drill.advance(dt, state),
            Activity::Recharge(recharge) => recharge.advance(dt, state, vehicle.max_energy),
            Activity::Hibernate(hibernate) => hibernate.advance(dt, state),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Activity::Plan(p) => format!("plan to {}", p.goal),
            Activity::Drive(d) => match d.path.last() {
                Some(last) => format!("drive {} waypoints ending at {}", d.path.len(), last.position),
                None => "drive (empty path)".to_string(),
            },
            Activity::Drill(d) => format!("drill for {} s", d.total_duration),
            Activity::Recharge(r) => format!("recharge to {} J", r.target_energy),
            Activity::Hibernate(h) => format!("hibernate until t={} s", h.wakeup_time),
        }
    }
}

impl DriveActivity {
    pub fn new(path: Vec<GraphNode>, vehicle: &VehicleParams) -> Self {
        Self { path, current_waypoint: 0, max_speed: vehicle.max_speed, power: vehicle.drive_power }
    }

    pub fn is_finished(&self) -> bool {
        self.current_waypoint >= self.path.len()
    }

    // Waypoints the rover already sits on take no time.
    fn skip_reached(&mut self, state: &mut VehicleState) {
        while let Some(waypoint) = self.path.get(self.current_waypoint) {
            if !waypoint.position.eq_within(&state.position, ARRIVAL_EPSILON) {
                break;
            }
            state.position = waypoint.position;
            self.current_waypoint += 1;
        }
    }

    fn advance(&mut self, dt: f64, state: &mut VehicleState) -> bool {
        self.skip_reached(state);

        if let Some(waypoint) = self.path.get(self.current_waypoint) {
            let heading = waypoint.position - state.position;
            let step = self.max_speed * dt;
            if heading.length() <= step {
                // Snap onto the waypoint so position error does not accumulate.
                state.position = waypoint.position;
                self.current_waypoint += 1;
            } else {
                state.position += heading.normalized() * step;
            }
        }
        state.energy -= self.power * dt;

        self.skip_reached(state);
        self.is_finished()
    }
}

impl DrillActivity {
    fn advance(&mut self, dt: f64, state: &mut VehicleState) -> bool {
        state.drill_time += dt;
        state.energy -= self.power * dt;
        if state.drill_time >= self.total_duration {
            state.drill_time = 0.0;
            true
        } else {
            false
        }
    }
}

impl RechargeActivity {
    fn advance(&mut self, dt: f64, state: &mut VehicleState, max_energy: f64) -> bool {
        let charge = self.charge_rate * dt;
        // Never overcharge, even if only part of the tick is used.
        if state.energy + charge >= max_energy {
            state.energy = max_energy;
            return true;
        }
        state.energy += charge;

        let target = self.target_energy.min(max_energy);
        state.energy >= target || target - state.energy <= self.abandon_threshold
    }
}

impl HibernateActivity {
    fn advance(&mut self, dt: f64, state: &mut VehicleState) -> bool {
        state.energy -= self.power * dt;
        state.mission_time >= self.wakeup_time
    }
}
