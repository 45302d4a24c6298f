use crate::core::track::Track;
use crate::core::traffic::{Phase, TrafficLight};
use crate::core::vehicle::{calc_stopping_distance, Controls, VehicleState};
use helpers::geometry::{wrap_to_pi, Vector2d};
use serde::Deserialize;
use tracing::warn;

// speed below which a vehicle is treated as standing still
const V_STANDSTILL: f64 = 0.05;

// safety factor applied to the deceleration that is required to stop at the line
const BRAKE_SAFETY_FACTOR: f64 = 1.1;

/// * `cruise_speed` - (m/s) Target speed on free road
/// * `k_steer` - (1/rad) Steering gain applied to the heading error
/// * `k_speed` - (s/m) Throttle gain applied to the speed error
/// * `slow_dist` - (m) Distance to the end of an open path below which the target speed is
/// reduced proportionally
/// * `k_turn_slow` - (1/rad) Target speed reduction due to the heading error
/// * `arrival_radius` - (m) A waypoint counts as reached once the vehicle is this close
/// * `stop_margin` - (m) Additional distance kept to the stop line
/// * `following_distance` - (m) Gap to a vehicle ahead below which the throttle is reduced
/// * `min_gap` - (m) Gap to a vehicle ahead below which the NPC brakes
/// * `cone_half_width` - (m) Lateral half width of the area ahead that is checked for vehicles
/// * `k_closing` - (s/m) Throttle reduction per closing speed
/// * `reaction_time` - (s) Delay between the reason for a stop clearing and driving off
/// * `queue_delay` - (s) Additional delay per vehicle queued ahead
/// * `queue_radius` - (m) Vehicles ahead within this distance count as queued
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NpcPars {
    pub cruise_speed: f64,
    pub k_steer: f64,
    pub k_speed: f64,
    pub slow_dist: f64,
    pub k_turn_slow: f64,
    pub arrival_radius: f64,
    pub stop_margin: f64,
    pub following_distance: f64,
    pub min_gap: f64,
    pub cone_half_width: f64,
    pub k_closing: f64,
    pub reaction_time: f64,
    pub queue_delay: f64,
    pub queue_radius: f64,
}

impl Default for NpcPars {
    fn default() -> Self {
        NpcPars {
            cruise_speed: 12.0,
            k_steer: 2.0,
            k_speed: 0.5,
            slow_dist: 15.0,
            k_turn_slow: 1.5,
            arrival_radius: 4.0,
            stop_margin: 1.0,
            following_distance: 10.0,
            min_gap: 1.5,
            cone_half_width: 2.0,
            k_closing: 0.15,
            reaction_time: 0.5,
            queue_delay: 0.3,
            queue_radius: 15.0,
        }
    }
}

/// VehicleView contains everything other participants may know about a vehicle.
#[derive(Debug, Clone, Copy)]
pub struct VehicleView {
    pub car_no: u32,
    pub state: VehicleState,
    pub a_brake: f64,
    pub a_drive_max: f64,
    pub bounding_radius: f64,
}

/// WorldView is the read-only snapshot of the world the NPCs decide on. It is created once per
/// time step before any vehicle moves.
#[derive(Debug, Clone, Copy)]
pub struct WorldView<'a> {
    pub track: &'a Track,
    pub lights: &'a [TrafficLight],
    pub vehicles: &'a [VehicleView],
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Driving,
    Stopped,
    Waiting,
}

#[derive(Debug, Clone)]
pub struct NpcController {
    pars: NpcPars,
    target_wp: usize,
    mode: Mode,
    t_wait: f64,
    warned_idle: bool,
}

impl NpcController {
    pub fn new(pars: &NpcPars, start_wp: usize) -> NpcController {
        NpcController {
            pars: pars.to_owned(),
            target_wp: start_wp,
            mode: Mode::Driving,
            t_wait: 0.0,
            warned_idle: false,
        }
    }

    // ---------------------------------------------------------------------------------------------
    // MAIN METHOD ---------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// The method determines the controls of the NPC for the next time step. Execution order:
    /// 1. Fall back to idle controls if the path or the own state is unusable.
    /// 2. Advance the target waypoint if it is reached (wrapping on closed paths).
    /// 3. Determine steering from the heading error towards the target waypoint.
    /// 4. Determine the throttle from the target speed (reduced towards the end of an open path
    /// and with the heading error).
    /// 5. Reduce the throttle if a vehicle ahead is closing in, brake if it is too close.
    /// 6. Brake for red lights (and yellow lights if stopping is still possible).
    /// 7. Hold the vehicle during the reaction delay after a stop.
    pub fn decide(
        &mut self,
        vehicle: &VehicleView,
        world_view: &WorldView,
        timestep_size: f64,
    ) -> Controls {
        let track = world_view.track;
        let state = &vehicle.state;

        if track.no_waypoints() < 2 || !state.is_finite() || self.target_wp >= track.no_waypoints()
        {
            if !self.warned_idle {
                warn!(
                    "NPC car {} cannot follow its path, falling back to idle controls",
                    vehicle.car_no
                );
                self.warned_idle = true;
            }
            return Controls::idle();
        }

        // waypoint advancement
        for _ in 0..track.no_waypoints() {
            if state.position.distance(&track.waypoints[self.target_wp]) > self.pars.arrival_radius
            {
                break;
            }

            match track.next_idx(self.target_wp) {
                Some(idx_next) => self.target_wp = idx_next,
                None => break,
            }
        }

        let target = &track.waypoints[self.target_wp];
        let path_end_reached = !track.closed
            && track.next_idx(self.target_wp).is_none()
            && state.position.distance(target) <= self.pars.arrival_radius;

        // steering
        let heading_des = state.position.vector_to(target).heading();
        let heading_error = wrap_to_pi(heading_des - state.heading);
        let steering = (self.pars.k_steer * heading_error).clamp(-1.0, 1.0);

        // target speed
        let goal_factor = if track.closed {
            1.0
        } else {
            track
                .dist_along_path(&state.position, self.target_wp, track.no_waypoints() - 1)
                .map_or(0.0, |dist| (dist / self.pars.slow_dist).min(1.0))
        };
        let v_target = if path_end_reached {
            0.0
        } else {
            self.pars.cruise_speed * goal_factor / (1.0 + self.pars.k_turn_slow * heading_error.abs())
        };
        let mut throttle = (self.pars.k_speed * (v_target - state.speed)).clamp(-1.0, 1.0);

        // vehicles ahead
        let mut hold = false;

        if let Some((gap, closing_speed)) = self.get_vehicle_ahead(vehicle, world_view.vehicles) {
            if gap < self.pars.min_gap {
                throttle = -1.0;
                hold = true;
            } else if closing_speed > 0.0 {
                throttle = (throttle - self.pars.k_closing * closing_speed).clamp(-1.0, 1.0);
            }
        }

        // traffic lights
        if let Some(throttle_light) = self.calc_light_throttle(vehicle, world_view, timestep_size)
        {
            throttle = throttle.min(throttle_light);
            hold = true;
        }

        // reaction delay
        if hold {
            if state.speed <= V_STANDSTILL {
                self.mode = Mode::Stopped;
            }
        } else {
            if self.mode == Mode::Stopped {
                self.mode = Mode::Waiting;
                self.t_wait = self.pars.reaction_time
                    + self.pars.queue_delay
                        * self.get_no_queued_ahead(vehicle, world_view.vehicles) as f64;
            }

            if self.mode == Mode::Waiting {
                if self.t_wait > 0.0 {
                    self.t_wait -= timestep_size;
                    throttle = throttle.min(0.0);
                } else {
                    self.mode = Mode::Driving;
                }
            }
        }

        // braking at standstill would drive backwards
        if state.speed <= 0.0 {
            throttle = throttle.max(0.0);
        }

        Controls { throttle, steering }
    }

    // ---------------------------------------------------------------------------------------------
    // METHODS (HELPERS) ---------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// calc_light_throttle returns the brake command if the NPC must stop in front of the next
    /// traffic light along its path.
    fn calc_light_throttle(
        &self,
        vehicle: &VehicleView,
        world_view: &WorldView,
        timestep_size: f64,
    ) -> Option<f64> {
        let track = world_view.track;
        let state = &vehicle.state;
        let light = self.get_next_light(track, world_view.lights)?;

        // the stop line lies in front of the area where the waypoint counts as reached
        let d_stop = track.dist_along_path(&state.position, self.target_wp, light.waypoint_idx)?
            - (self.pars.arrival_radius + 0.5);

        if d_stop < 0.0 {
            return None;
        }

        // worst case: full throttle until the next decision
        let speed = state.speed.max(0.0);
        let v_up = speed + vehicle.a_drive_max * timestep_size;
        let d_threshold = v_up * timestep_size
            + calc_stopping_distance(v_up, vehicle.a_brake)
            + self.pars.stop_margin;

        let must_stop = match light.controller.get_phase() {
            Phase::Red => d_stop <= d_threshold,
            // yellow: stop within the same threshold as for red, but only if it is still possible
            Phase::Yellow => {
                d_stop <= d_threshold && calc_stopping_distance(speed, vehicle.a_brake) <= d_stop
            }
            Phase::Green => false,
        };

        if !must_stop {
            return None;
        }

        // deceleration required to stop at the line
        let a_req = speed.powi(2) / (2.0 * d_stop.max(0.1));
        Some(-(BRAKE_SAFETY_FACTOR * a_req / vehicle.a_brake).clamp(0.0, 1.0))
    }

    /// get_next_light returns the first traffic light along the path starting at the current
    /// target waypoint.
    fn get_next_light<'a>(&self, track: &Track, lights: &'a [TrafficLight]) -> Option<&'a TrafficLight> {
        let mut idx = self.target_wp;

        for _ in 0..track.no_waypoints() {
            if let Some(light) = lights.iter().find(|light| light.waypoint_idx == idx) {
                return Some(light);
            }
            idx = track.next_idx(idx)?;
        }

        None
    }

    /// get_vehicle_ahead returns gap and closing speed of the closest vehicle within the forward
    /// cone.
    fn get_vehicle_ahead(&self, vehicle: &VehicleView, vehicles: &[VehicleView]) -> Option<(f64, f64)> {
        let dir = Vector2d::from_heading(vehicle.state.heading);
        let mut closest: Option<(f64, f64)> = None;

        for other in vehicles.iter().filter(|other| other.car_no != vehicle.car_no) {
            let rel = vehicle.state.position.vector_to(&other.state.position);
            let along = rel.dot(&dir);
            let lateral = dir.cross(&rel).abs();

            if along <= 0.0 || lateral > self.pars.cone_half_width {
                continue;
            }

            let gap = along - vehicle.bounding_radius - other.bounding_radius;
            if gap > self.pars.following_distance {
                continue;
            }

            let closing_speed = vehicle.state.speed - other.state.velocity().dot(&dir);

            if closest.map_or(true, |(gap_min, _)| gap < gap_min) {
                closest = Some((gap, closing_speed));
            }
        }

        closest
    }

    /// get_no_queued_ahead returns the number of (almost) standing vehicles queued ahead.
    fn get_no_queued_ahead(&self, vehicle: &VehicleView, vehicles: &[VehicleView]) -> usize {
        let dir = Vector2d::from_heading(vehicle.state.heading);

        vehicles
            .iter()
            .filter(|other| other.car_no != vehicle.car_no)
            .filter(|other| {
                let rel = vehicle.state.position.vector_to(&other.state.position);
                let along = rel.dot(&dir);
                along > 0.0
                    && along <= self.pars.queue_radius
                    && dir.cross(&rel).abs() <= self.pars.cone_half_width
                    && other.state.speed.abs() <= 0.5
            })
            .count()
    }

    pub fn get_target_wp(&self) -> usize {
        self.target_wp
    }
}
