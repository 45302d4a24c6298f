use crate::core::car::{Car, CarPars, Role};
use crate::core::collision::{detect, test_overlap, Body, Entity};
use crate::core::npc::{NpcPars, VehicleView, WorldView};
use crate::core::progress::State;
use crate::core::track::Track;
use crate::core::traffic::TrafficLight;
use crate::core::vehicle::{Controls, VehiclePars};
use crate::interfaces::hud_interface::{LightSnapshot, VehicleSnapshot, WorldSnapshot};
use crate::post::race_result::{CarInfo, RaceResult};
use crate::pre::check_sim_opts_pars::check_sim_pars;
use crate::pre::read_sim_pars::SimPars;
use helpers::general::{argsort, max, SimError, SortOrder};
use helpers::geometry::Point2d;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

// additional distance by which collisions are resolved such that the bodies are separated
const CONTACT_SLOP: f64 = 1e-6;

// free distance required around a spawn point
const SPAWN_CLEARANCE: f64 = 1.0;

/// * `tot_no_laps` - Total number of laps in the race (must be 1 on an open path)
/// * `t_race_max` - (s) Maximum race duration, the race is aborted afterwards
/// * `participants` - List of participants (car numbers) in the current race (the respective car
/// parameters must be available)
#[derive(Debug, Deserialize, Clone)]
pub struct RacePars {
    pub tot_no_laps: u32,
    pub t_race_max: f64,
    pub participants: Vec<u32>,
}

/// * `position` - (m) Spawn position
/// * `heading` - (rad) Spawn heading
/// * `start_wp` - Index of the first waypoint the spawned NPC drives towards
#[derive(Debug, Deserialize, Clone)]
pub struct SpawnPoint {
    pub position: Point2d,
    pub heading: f64,
    pub start_wp: usize,
}

/// * `interval` - (s) Minimum time between two spawns
/// * `max_npcs` - Maximum number of spawned NPCs in the world at the same time
/// * `vehicle` - Key of the vehicle parameters of the spawned NPCs in vehicle_pars_all
/// * `color` - Hex-code of the color of the spawned NPCs
/// * `spawn_points` - Spawn points, used in round-robin order
/// * `npc_pars` - Parameters of the waypoint follower of the spawned NPCs
#[derive(Debug, Deserialize, Clone)]
pub struct SpawnPars {
    pub interval: f64,
    pub max_npcs: u32,
    pub vehicle: String,
    pub color: String,
    pub spawn_points: Vec<SpawnPoint>,
    #[serde(default)]
    pub npc_pars: Option<NpcPars>,
}

/// * `max_timestep` - (s) Largest time step size accepted by the world
/// * `speed_factor_vehicle` - Speed factor applied to both vehicles of a vehicle-vehicle collision
/// * `speed_factor_obstacle` - Speed factor applied to the vehicle of a vehicle-obstacle collision
/// * `bounds` - (m) World bounds [x_min, y_min, x_max, y_max], NPCs outside are removed
/// * `npc_spawn` - NPC traffic that is spawned during the race
#[derive(Debug, Deserialize, Clone)]
pub struct WorldPars {
    pub max_timestep: f64,
    pub speed_factor_vehicle: f64,
    pub speed_factor_obstacle: f64,
    #[serde(default)]
    pub bounds: Option<[f64; 4]>,
    #[serde(default)]
    pub npc_spawn: Option<SpawnPars>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FlagState {
    G, // green
    C, // chequered
}

impl Default for FlagState {
    fn default() -> Self {
        FlagState::G
    }
}

#[derive(Debug, Clone)]
struct Spawner {
    pars: SpawnPars,
    vehicle_pars: VehiclePars,
    t_since_spawn: f64,
    next_point: usize,
    next_car_no: u32,
}

/// RaceWorld owns all cars, the track, and the traffic lights. Racing cars are stored first (sorted
/// by car number) and are never removed, NPC traffic spawned during the race is appended behind
/// them.
#[derive(Debug, Clone)]
pub struct RaceWorld {
    pub cur_racetime: f64,
    pub tot_no_laps: u32,
    t_race_max: f64,
    pub cur_lap_leader: u32,
    pub flag_state: FlagState,
    pub track: Track,
    pub lights: Vec<TrafficLight>,
    pub cars_list: Vec<Car>,
    no_racing_cars: usize,
    pub laptimes: Vec<Vec<f64>>,
    pub racetimes: Vec<Vec<f64>>,
    obstacle_bodies: Vec<Body>,
    substep_dist: f64,
    max_timestep: f64,
    speed_factor_vehicle: f64,
    speed_factor_obstacle: f64,
    bounds: Option<[f64; 4]>,
    spawner: Option<Spawner>,
    player_idx: Option<usize>,
    player_controls: Controls,
    no_collisions: u64,
}

impl RaceWorld {
    pub fn new(sim_pars: &SimPars) -> Result<RaceWorld, SimError> {
        check_sim_pars(sim_pars)?;

        let track = Track::new(&sim_pars.track_pars);
        let lights: Vec<TrafficLight> = sim_pars
            .track_pars
            .traffic_lights
            .iter()
            .map(TrafficLight::new)
            .collect();

        let vehicle_pars_all: HashMap<String, VehiclePars> = sim_pars
            .vehicle_pars_all
            .iter()
            .map(|(key, entry)| (key.to_owned(), entry.get_vehicle_pars()))
            .collect();

        // create cars
        let no_cars = sim_pars.race_pars.participants.len();
        let mut cars_list: Vec<Car> = Vec::with_capacity(no_cars);

        for car_no in sim_pars.race_pars.participants.iter() {
            let car_pars_tmp = sim_pars.car_pars_all.get(car_no).ok_or_else(|| {
                SimError::ConfigurationError(format!("Missing parameters of car {}!", car_no))
            })?;
            let vehicle_pars_tmp = get_vehicle_pars(&vehicle_pars_all, &car_pars_tmp.vehicle)?;

            cars_list.push(Car::new(car_pars_tmp, vehicle_pars_tmp, &track, true)?);
        }

        // sort cars list by car number
        cars_list.sort_by_key(|car| car.car_no);
        let player_idx = cars_list.iter().position(|car| car.role == Role::Player);

        // create spawner for NPC traffic
        let spawner = match &sim_pars.world_pars.npc_spawn {
            Some(spawn_pars) => Some(Spawner {
                pars: spawn_pars.to_owned(),
                vehicle_pars: get_vehicle_pars(&vehicle_pars_all, &spawn_pars.vehicle)?.to_owned(),
                t_since_spawn: 0.0,
                next_point: 0,
                next_car_no: cars_list.iter().map(|car| car.car_no).max().unwrap_or(0) + 1,
            }),
            None => None,
        };

        // the sub-step distance must not exceed the smallest half extent of any collision shape
        let obstacle_bodies = track.get_obstacle_bodies();
        let substep_dist = cars_list
            .iter()
            .map(|car| car.vehicle.get_pars().shape.min_half_extent())
            .chain(
                spawner
                    .iter()
                    .map(|spawner| spawner.vehicle_pars.shape.min_half_extent()),
            )
            .chain(obstacle_bodies.iter().map(|body| body.shape.min_half_extent()))
            .fold(f64::INFINITY, f64::min);

        let tot_no_laps = sim_pars.race_pars.tot_no_laps;

        info!(
            "Created race on track {} with {} cars and {} traffic lights",
            track.name,
            no_cars,
            lights.len()
        );

        Ok(RaceWorld {
            cur_racetime: 0.0,
            tot_no_laps,
            t_race_max: sim_pars.race_pars.t_race_max,
            cur_lap_leader: 1,
            flag_state: FlagState::G,
            track,
            lights,
            cars_list,
            no_racing_cars: no_cars,
            laptimes: vec![vec![0.0; tot_no_laps as usize + 1]; no_cars],
            racetimes: vec![vec![0.0; tot_no_laps as usize + 1]; no_cars],
            obstacle_bodies,
            substep_dist,
            max_timestep: sim_pars.world_pars.max_timestep,
            speed_factor_vehicle: sim_pars.world_pars.speed_factor_vehicle,
            speed_factor_obstacle: sim_pars.world_pars.speed_factor_obstacle,
            bounds: sim_pars.world_pars.bounds,
            spawner,
            player_idx,
            player_controls: Controls::idle(),
            no_collisions: 0,
        })
    }

    // ---------------------------------------------------------------------------------------------
    // MAIN METHOD ---------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// The method simulates one time step. Execution order:
    /// 1. Validate the time step size (the world is not changed if it is invalid).
    /// 2. Increment the discretization variable (cur_racetime).
    /// 3. Determine the controls of every car on the basis of the state after the previous time
    /// step (all NPCs see the same snapshot, player cars use the last accepted controls).
    /// 4. Advance the traffic lights.
    /// 5. Split the time step into sub-steps such that no vehicle travels farther than the
    /// smallest half extent of any collision shape. Within each sub-step, advance the vehicles,
    /// resolve the collisions, and handle the race progress.
    /// 6. Remove NPCs that left the world bounds and spawn new NPC traffic.
    pub fn step(&mut self, timestep_size: f64) -> Result<(), SimError> {
        if !(timestep_size.is_finite() && 0.0 < timestep_size && timestep_size <= self.max_timestep)
        {
            return Err(SimError::InvalidInput(format!(
                "Time step size must be within (0.0, {:.3}]s, but is {}!",
                self.max_timestep, timestep_size
            )));
        }

        // increment discretization variable
        self.cur_racetime += timestep_size;

        // determine controls
        let controls = self.calc_controls(timestep_size);

        // update traffic lights
        for light in self.lights.iter_mut() {
            if let Some(phase) = light.controller.update(timestep_size) {
                debug!("Traffic light {} switched to {:?}", light.id, phase);
            }
        }

        // sub-stepping
        let no_substeps = self.calc_no_substeps(timestep_size);
        let timestep_size_sub = timestep_size / no_substeps as f64;

        for i in 0..no_substeps {
            for (car, car_controls) in self.cars_list.iter_mut().zip(controls.iter()) {
                if car.ph.is_racing() {
                    car.vehicle.step(timestep_size_sub, car_controls)?;
                }
            }

            self.handle_collisions();

            let t_substep_start = self.cur_racetime - timestep_size + i as f64 * timestep_size_sub;
            self.handle_race_progress(t_substep_start, timestep_size_sub);
        }

        // handle NPCs leaving and entering the world
        self.handle_despawn();
        self.handle_spawn(timestep_size)?;

        Ok(())
    }

    // ---------------------------------------------------------------------------------------------
    // METHODS (HELPERS) ---------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// calc_controls creates the pre-step view of the world and lets every car decide on it.
    fn calc_controls(&mut self, timestep_size: f64) -> Vec<Controls> {
        let views: Vec<VehicleView> = self
            .cars_list
            .iter()
            .filter(|car| car.ph.is_racing())
            .map(|car| car.get_view())
            .collect();

        let world_view = WorldView {
            track: &self.track,
            lights: &self.lights,
            vehicles: &views,
        };

        let player_controls = self.player_controls;

        self.cars_list
            .iter_mut()
            .map(|car| {
                if !car.ph.is_racing() {
                    return Controls::idle();
                }

                let view = car.get_view();
                let controls = car.decide(&view, &world_view, timestep_size, &player_controls);

                controls.validated().unwrap_or_else(|err| {
                    warn!(
                        "Car {} produced invalid controls ({}), using idle controls",
                        car.car_no, err
                    );
                    Controls::idle()
                })
            })
            .collect()
    }

    /// calc_no_substeps returns the number of sub-steps that is required such that no vehicle can
    /// travel farther than the sub-step distance within a single sub-step.
    fn calc_no_substeps(&self, timestep_size: f64) -> usize {
        let v_bounds: Vec<f64> = self
            .cars_list
            .iter()
            .filter(|car| car.ph.is_racing())
            .map(|car| {
                let pars = car.vehicle.get_pars();
                let a_bound = car.vehicle.max_drive_accel().max(pars.a_brake);
                (car.vehicle.get_state().speed.abs() + a_bound * timestep_size)
                    .min(pars.v_max.max(pars.v_rev_max))
            })
            .collect();

        if v_bounds.is_empty() || !self.substep_dist.is_finite() {
            return 1;
        }

        ((max(&v_bounds) * timestep_size / self.substep_dist).ceil() as usize).max(1)
    }

    /// handle_collisions detects the collisions after all vehicles were advanced and resolves them
    /// in the order of descending penetration depth. Every pair is tested again before it is
    /// resolved since earlier resolutions may have separated it already.
    fn handle_collisions(&mut self) {
        let active_idxs: Vec<usize> = (0..self.cars_list.len())
            .filter(|&idx| self.cars_list[idx].ph.is_racing())
            .collect();
        let bodies: Vec<Body> = active_idxs
            .iter()
            .map(|&idx| self.cars_list[idx].vehicle.get_body())
            .collect();

        for event in detect(&bodies, &self.obstacle_bodies) {
            match (event.entity_a, event.entity_b) {
                (Entity::Vehicle(a), Entity::Vehicle(b)) => {
                    let (idx_a, idx_b) = (active_idxs[a], active_idxs[b]);
                    let contact = match test_overlap(
                        &self.cars_list[idx_a].vehicle.get_body(),
                        &self.cars_list[idx_b].vehicle.get_body(),
                    ) {
                        Some(contact) => contact,
                        None => continue,
                    };

                    // split the positional correction by inverse mass
                    let w_a = 1.0 / self.cars_list[idx_a].get_mass();
                    let w_b = 1.0 / self.cars_list[idx_b].get_mass();
                    let corr = contact.depth + CONTACT_SLOP;

                    self.cars_list[idx_a].vehicle.apply_collision_response(
                        &contact.normal.mult(-corr * w_a / (w_a + w_b)),
                        self.speed_factor_vehicle,
                    );
                    self.cars_list[idx_b].vehicle.apply_collision_response(
                        &contact.normal.mult(corr * w_b / (w_a + w_b)),
                        self.speed_factor_vehicle,
                    );

                    debug!(
                        "Collision between cars {} and {} (depth {:.3}m) at {:.3}s",
                        self.cars_list[idx_a].car_no,
                        self.cars_list[idx_b].car_no,
                        contact.depth,
                        self.cur_racetime
                    );
                }
                (Entity::Vehicle(a), Entity::Obstacle(k)) => {
                    let idx_a = active_idxs[a];
                    let contact = match test_overlap(
                        &self.cars_list[idx_a].vehicle.get_body(),
                        &self.obstacle_bodies[k],
                    ) {
                        Some(contact) => contact,
                        None => continue,
                    };

                    self.cars_list[idx_a].vehicle.apply_collision_response(
                        &contact.normal.mult(-(contact.depth + CONTACT_SLOP)),
                        self.speed_factor_obstacle,
                    );

                    debug!(
                        "Collision between car {} and obstacle {} (depth {:.3}m) at {:.3}s",
                        self.cars_list[idx_a].car_no, k, contact.depth, self.cur_racetime
                    );
                }
                _ => continue,
            }

            self.no_collisions += 1;
        }
    }

    /// handle_race_progress updates the race progress of all cars and handles the lap transitions
    /// of the racing cars. Once the leader completed the last lap, the chequered flag is shown and
    /// every car finishes when crossing the line the next time.
    fn handle_race_progress(&mut self, t_substep_start: f64, timestep_size_sub: f64) {
        for car in self.cars_list.iter_mut().filter(|car| car.ph.is_racing()) {
            let pos_cur = car.vehicle.get_state().position;
            car.ph.update_race_prog(&self.track, pos_cur);
        }

        // check at first if race was finished by any car such that the chequered flag can be
        // considered in the loop afterwards
        for car in self.cars_list[..self.no_racing_cars].iter() {
            let compl_lap_cur = car.ph.get_compl_lap();

            if compl_lap_cur >= self.cur_lap_leader {
                self.cur_lap_leader = compl_lap_cur + 1
            }
        }

        if self.cur_lap_leader > self.tot_no_laps && self.flag_state != FlagState::C {
            self.flag_state = FlagState::C;
            info!("Chequered flag at {:.3}s", self.cur_racetime);
        }

        for i in 0..self.no_racing_cars {
            let car = &mut self.cars_list[i];

            if !(car.ph.is_racing() && car.ph.get_new_lap()) {
                continue;
            }

            // interpolate the time at which the line was crossed
            let t_cross = t_substep_start + car.ph.get_lap_frac_cross() * timestep_size_sub;
            let compl_lap_cur = car.ph.get_compl_lap() as usize;

            if compl_lap_cur <= self.tot_no_laps as usize {
                self.laptimes[i][compl_lap_cur] = t_cross - self.racetimes[i][compl_lap_cur - 1];
                self.racetimes[i][compl_lap_cur] = t_cross;
            }

            info!(
                "Car {} completed lap {} at {:.3}s",
                car.car_no, compl_lap_cur, t_cross
            );

            // set race finished for current car if it crosses the line after the chequered flag
            // got active
            if self.flag_state == FlagState::C {
                car.ph.set_finished();
                info!("Car {} finished the race", car.car_no);
            }
        }
    }

    /// handle_despawn removes NPC traffic outside the world bounds and retires racing NPCs that
    /// left them.
    fn handle_despawn(&mut self) {
        let bounds = match self.bounds {
            Some(bounds) => bounds,
            None => return,
        };

        let is_outside = |pos: Point2d| {
            !(bounds[0] <= pos.x && pos.x <= bounds[2] && bounds[1] <= pos.y && pos.y <= bounds[3])
        };

        for car in self.cars_list[..self.no_racing_cars].iter_mut() {
            if car.role == Role::Npc
                && car.ph.is_racing()
                && is_outside(car.vehicle.get_state().position)
            {
                car.ph.set_retired();
                warn!("Car {} left the world bounds and retired", car.car_no);
            }
        }

        let no_cars_before = self.cars_list.len();
        let no_racing_cars = self.no_racing_cars;
        let mut idx = 0;

        self.cars_list.retain(|car| {
            let keep = idx < no_racing_cars || !is_outside(car.vehicle.get_state().position);
            idx += 1;
            keep
        });

        if self.cars_list.len() < no_cars_before {
            debug!(
                "Removed {} NPC(s) outside the world bounds",
                no_cars_before - self.cars_list.len()
            );
        }
    }

    /// handle_spawn spawns NPC traffic at the spawn points in round-robin order. Blocked spawn
    /// points are skipped.
    fn handle_spawn(&mut self, timestep_size: f64) -> Result<(), SimError> {
        let spawner = match self.spawner.as_mut() {
            Some(spawner) => spawner,
            None => return Ok(()),
        };

        spawner.t_since_spawn += timestep_size;
        let no_traffic = self.cars_list.len() - self.no_racing_cars;

        if spawner.t_since_spawn < spawner.pars.interval
            || no_traffic >= spawner.pars.max_npcs as usize
            || spawner.pars.spawn_points.is_empty()
        {
            return Ok(());
        }

        let radius_new = spawner.vehicle_pars.shape.bounding_radius();

        for _ in 0..spawner.pars.spawn_points.len() {
            let point = spawner.pars.spawn_points[spawner.next_point].to_owned();
            spawner.next_point = (spawner.next_point + 1) % spawner.pars.spawn_points.len();

            let blocked = self
                .cars_list
                .iter()
                .filter(|car| car.ph.is_racing())
                .any(|car| {
                    car.vehicle.get_state().position.distance(&point.position)
                        < radius_new
                            + car.vehicle.get_pars().shape.bounding_radius()
                            + SPAWN_CLEARANCE
                });

            if blocked {
                debug!(
                    "Spawn point at ({:.1}, {:.1}) is blocked",
                    point.position.x, point.position.y
                );
                continue;
            }

            let car_pars = CarPars {
                car_no: spawner.next_car_no,
                name: format!("Traffic {}", spawner.next_car_no),
                role: Role::Npc,
                vehicle: spawner.pars.vehicle.to_owned(),
                color: spawner.pars.color.to_owned(),
                position: point.position,
                heading: point.heading,
                start_wp: point.start_wp,
                npc_pars: spawner.pars.npc_pars.to_owned(),
            };

            self.cars_list
                .push(Car::new(&car_pars, &spawner.vehicle_pars, &self.track, false)?);
            debug!(
                "Spawned NPC {} at ({:.1}, {:.1})",
                car_pars.car_no, point.position.x, point.position.y
            );

            spawner.next_car_no += 1;
            spawner.t_since_spawn = 0.0;
            break;
        }

        Ok(())
    }

    /// set_player_controls sets the controls of the player car for the following time steps.
    /// Malformed controls are rejected and the previous controls are kept.
    pub fn set_player_controls(&mut self, controls: &Controls) -> Result<(), SimError> {
        if self.player_idx.is_none() {
            return Err(SimError::InvalidInput(
                "There is no player car in the race!".to_owned(),
            ));
        }

        self.player_controls = controls.validated()?;
        Ok(())
    }

    /// enable_player_autopilot lets the waypoint follower drive the player car.
    pub fn enable_player_autopilot(&mut self) -> Result<(), SimError> {
        let player_idx = self.player_idx.ok_or_else(|| {
            SimError::InvalidInput("There is no player car in the race!".to_owned())
        })?;

        self.cars_list[player_idx].enable_autopilot();
        info!("Autopilot enabled for car {}", self.cars_list[player_idx].car_no);
        Ok(())
    }

    /// get_all_finished returns true if no racing car is on track anymore.
    pub fn get_all_finished(&self) -> bool {
        self.cars_list[..self.no_racing_cars]
            .iter()
            .all(|car| !car.ph.is_racing())
    }

    /// is_race_over returns true if all cars finished or the maximum race duration is reached.
    pub fn is_race_over(&self) -> bool {
        self.get_all_finished() || self.cur_racetime >= self.t_race_max
    }

    pub fn get_no_collisions(&self) -> u64 {
        self.no_collisions
    }

    /// get_race_order returns the indices of the racing cars sorted by their race progress.
    pub fn get_race_order(&self) -> Vec<usize> {
        let race_progs: Vec<f64> = self.cars_list[..self.no_racing_cars]
            .iter()
            .map(|car| car.ph.get_race_prog(&self.track))
            .collect();

        argsort(&race_progs, SortOrder::Descending)
    }

    /// snapshot returns the read-only state of the world for rendering and HUD purposes.
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            t_race: self.cur_racetime,
            cur_lap_leader: self.cur_lap_leader,
            chequered: self.flag_state == FlagState::C,
            vehicles: self
                .cars_list
                .iter()
                .map(|car| {
                    let state = car.vehicle.get_state();
                    let gear_info = car.vehicle.get_gear_info();

                    VehicleSnapshot {
                        car_no: car.car_no,
                        name: car.name.to_owned(),
                        kind: car.vehicle.get_pars().kind,
                        role: car.role,
                        color: car.color,
                        x: state.position.x,
                        y: state.position.y,
                        heading: state.heading,
                        speed: state.speed,
                        speed_kmh: state.speed * 3.6,
                        gear: gear_info.map(|(gear, _)| gear),
                        rpm: gear_info.map(|(_, rpm)| rpm),
                        racing: car.racing,
                        compl_laps: car.ph.get_compl_lap(),
                        next_wp: car.ph.get_next_wp(),
                        finished: car.ph.get_state() == State::Finished,
                        retired: car.ph.get_state() == State::Retired,
                        race_prog: car.ph.get_race_prog(&self.track),
                    }
                })
                .collect(),
            lights: self
                .lights
                .iter()
                .map(|light| LightSnapshot {
                    id: light.id,
                    x: light.position.x,
                    y: light.position.y,
                    phase: light.controller.get_phase(),
                })
                .collect(),
        }
    }

    pub fn get_race_result(&self) -> RaceResult {
        RaceResult {
            tot_no_laps: self.tot_no_laps,
            car_infos: self.cars_list[..self.no_racing_cars]
                .iter()
                .map(|car| CarInfo {
                    car_no: car.car_no,
                    name: car.name.to_owned(),
                    compl_laps: car.ph.get_compl_lap().min(self.tot_no_laps),
                    state: car.ph.get_state(),
                })
                .collect(),
            laptimes: self.laptimes.to_owned(),
            racetimes: self.racetimes.to_owned(),
            no_collisions: self.no_collisions,
        }
    }
}

fn get_vehicle_pars<'a>(
    vehicle_pars_all: &'a HashMap<String, VehiclePars>,
    key: &str,
) -> Result<&'a VehiclePars, SimError> {
    vehicle_pars_all.get(key).ok_or_else(|| {
        SimError::ConfigurationError(format!("Missing parameters of vehicle {}!", key))
    })
}
