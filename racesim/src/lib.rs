pub mod core {
    pub mod car;
    pub mod collision;
    pub mod gearbox;
    pub mod handle_race;
    pub mod npc;
    pub mod progress;
    pub mod track;
    pub mod traffic;
    pub mod vehicle;
    pub mod world;
}
pub mod interfaces {
    pub mod hud_interface;
}
pub mod post {
    pub mod race_result;
}
pub mod pre {
    pub mod check_sim_opts_pars;
    pub mod read_sim_pars;
    pub mod sim_opts;
}

#[cfg(test)]
mod test_pars {
    use crate::pre::read_sim_pars::SimPars;
    use serde_json::{json, Value};

    pub const PARS_CITY_LOOP: &str = include_str!("../../input/parameters/pars_city_loop.json");

    pub fn city_loop() -> SimPars {
        serde_json::from_str(PARS_CITY_LOOP).unwrap()
    }

    /// sim_pars creates a minimal parameter set with the inserted track and cars.
    pub fn sim_pars(track_pars: Value, car_pars_all: Value, race_pars: Value) -> SimPars {
        let participants: Vec<u32> = car_pars_all
            .as_object()
            .unwrap()
            .keys()
            .map(|key| key.parse().unwrap())
            .collect();

        let mut race_pars = race_pars;
        race_pars["participants"] = json!(participants);

        serde_json::from_value(json!({
            "race_pars": race_pars,
            "world_pars": {
                "max_timestep": 0.1,
                "speed_factor_vehicle": 0.5,
                "speed_factor_obstacle": 0.0
            },
            "track_pars": track_pars,
            "vehicle_pars_all": {
                "car": {"kind": "car"},
                "motorbike": {"kind": "motorcycle"}
            },
            "car_pars_all": car_pars_all
        }))
        .unwrap()
    }

    pub fn square_track(side: f64) -> Value {
        json!({
            "name": "Square",
            "waypoints": [
                {"x": 0.0, "y": 0.0},
                {"x": side, "y": 0.0},
                {"x": side, "y": side},
                {"x": 0.0, "y": side}
            ],
            "closed": true,
            "gate_half_width": 8.0
        })
    }

    pub fn straight_track(traffic_lights: Value) -> Value {
        json!({
            "name": "Straight",
            "waypoints": [
                {"x": 0.0, "y": 0.0},
                {"x": 100.0, "y": 0.0},
                {"x": 200.0, "y": 0.0}
            ],
            "closed": false,
            "gate_half_width": 8.0,
            "traffic_lights": traffic_lights
        })
    }

    pub fn car(car_no: u32, role: &str, x: f64, y: f64, heading: f64, start_wp: usize) -> Value {
        json!({
            "car_no": car_no,
            "name": format!("Car {}", car_no),
            "role": role,
            "vehicle": "car",
            "color": "#ff0000",
            "position": {"x": x, "y": y},
            "heading": heading,
            "start_wp": start_wp
        })
    }
}

#[cfg(test)]
mod vehicle_tests {
    use crate::core::vehicle::{Controls, VehicleKind, VehicleModel, VehicleParsEntry};
    use approx::assert_ulps_eq;
    use helpers::general::SimError;
    use helpers::geometry::Point2d;
    use std::f64::consts::TAU;

    fn car_model() -> VehicleModel {
        VehicleModel::new(&VehicleKind::Car.default_pars(), Point2d::new(0.0, 0.0), 1.0)
    }

    #[test]
    fn test_speed_and_heading_bounds() {
        let mut model = car_model();
        let pars = model.get_pars().to_owned();

        for (throttle, steering) in [(1.0, 1.0), (-1.0, -1.0), (1.0, -0.3)] {
            for _ in 0..1000 {
                let state = model.step(0.05, &Controls { throttle, steering }).unwrap();
                assert!(-pars.v_rev_max <= state.speed && state.speed <= pars.v_max);
                assert!(0.0 <= state.heading && state.heading < TAU);
            }
        }
    }

    #[test]
    fn test_braking_never_reverses() {
        let mut model = car_model();
        for _ in 0..20 {
            model.step(0.05, &Controls { throttle: 1.0, steering: 0.0 }).unwrap();
        }
        assert!(model.get_state().speed > 1.0);

        // a single long full-brake step ends at standstill instead of driving backwards
        let state = model.step(1.0, &Controls { throttle: -1.0, steering: 0.0 }).unwrap();
        assert_ulps_eq!(state.speed, 0.0);
    }

    #[test]
    fn test_no_pivot_at_standstill() {
        let mut model = car_model();
        let state = model.step(0.05, &Controls { throttle: 0.0, steering: 1.0 }).unwrap();
        assert_ulps_eq!(state.heading, 1.0);
        assert_eq!(state.position, Point2d::new(0.0, 0.0));
    }

    #[test]
    fn test_reverse_inverts_steering() {
        let mut model = car_model();
        let state = model.step(0.05, &Controls { throttle: -1.0, steering: 1.0 }).unwrap();
        assert!(state.speed < 0.0);
        assert!(state.heading < 1.0);
    }

    #[test]
    fn test_controls_are_clamped() {
        let mut model = car_model();
        let state = model.step(0.05, &Controls { throttle: 3.0, steering: -7.0 }).unwrap();
        assert_eq!(state.controls, Controls { throttle: 1.0, steering: -1.0 });
    }

    #[test]
    fn test_invalid_timestep_keeps_state() {
        let mut model = car_model();
        let state_before = *model.get_state();

        for timestep_size in [0.0, -0.1, f64::NAN, f64::INFINITY] {
            let result = model.step(timestep_size, &Controls { throttle: 1.0, steering: 0.0 });
            assert!(matches!(result, Err(SimError::InvalidInput(_))));
        }
        assert_eq!(*model.get_state(), state_before);
    }

    #[test]
    fn test_invalid_controls_keep_state() {
        let mut model = car_model();
        let state_before = *model.get_state();

        let result = model.step(0.05, &Controls { throttle: f64::NAN, steering: 0.0 });
        assert!(matches!(result, Err(SimError::InvalidInput(_))));
        assert_eq!(*model.get_state(), state_before);
    }

    #[test]
    fn test_gear_rises_while_accelerating() {
        let mut model = car_model();
        for _ in 0..200 {
            model.step(0.05, &Controls { throttle: 1.0, steering: 0.0 }).unwrap();
        }
        let (gear, rpm) = model.get_gear_info().unwrap();
        assert!(gear > 1);
        assert!(800.0 <= rpm && rpm <= 5500.0);
    }

    #[test]
    fn test_vehicle_pars_entry_defaults() {
        let entry: VehicleParsEntry =
            serde_json::from_str(r#"{"kind": "motorcycle", "v_max": 40.0}"#).unwrap();
        let pars = entry.get_vehicle_pars();
        let defaults = VehicleKind::Motorcycle.default_pars();

        assert_ulps_eq!(pars.v_max, 40.0);
        assert_ulps_eq!(pars.mass, defaults.mass);
        assert_eq!(pars.shape, defaults.shape);
        assert!(pars.gearbox.is_some());
    }
}

#[cfg(test)]
mod gearbox_tests {
    use crate::core::gearbox::Gearbox;
    use crate::core::vehicle::VehicleKind;
    use approx::assert_ulps_eq;

    fn car_gearbox() -> Gearbox {
        Gearbox::new(&VehicleKind::Car.default_pars().gearbox.unwrap())
    }

    #[test]
    fn test_upshift_reduces_power_while_shifting() {
        let mut gearbox = car_gearbox();
        gearbox.update(0.05, 0.2);
        assert_eq!(gearbox.get_gear(), 2);
        assert!(gearbox.is_shifting());
        assert_ulps_eq!(gearbox.drive_factor(), 1.6 * 0.1);
    }

    #[test]
    fn test_no_shift_while_shifting() {
        let mut gearbox = car_gearbox();
        gearbox.update(0.05, 0.2);
        gearbox.update(0.05, 0.9);
        assert_eq!(gearbox.get_gear(), 2);
    }

    #[test]
    fn test_downshift() {
        let mut gearbox = car_gearbox();
        gearbox.update(0.05, 0.2);
        for _ in 0..20 {
            gearbox.update(0.05, 0.2);
        }
        assert_eq!(gearbox.get_gear(), 2);
        assert!(!gearbox.is_shifting());

        gearbox.update(0.05, 0.05);
        assert_eq!(gearbox.get_gear(), 1);
    }
}


#[cfg(test)]
mod traffic_tests {
    use crate::core::traffic::{Phase, TrafficController, TrafficLight, TrafficLightPars};
    use helpers::geometry::Point2d;

    #[test]
    fn test_exact_cycle() {
        let mut controller = TrafficController::new(5.0, 2.0, 5.0, Phase::Green, 0.0);
        let mut transitions = vec![];

        for i in 1..=24 {
            if let Some(phase) = controller.update(0.5) {
                transitions.push((i, phase));
            }
        }

        assert_eq!(
            transitions,
            vec![(10, Phase::Yellow), (14, Phase::Red), (24, Phase::Green)]
        );
    }

    #[test]
    fn test_dwell_is_kept() {
        let mut controller = TrafficController::new(1.0, 1.0, 1.0, Phase::Green, 0.0);
        let mut no_updates = 0;

        while controller.get_phase() == Phase::Green {
            controller.update(0.3);
            no_updates += 1;
        }

        // the green phase lasted at least its dwell time and the timer restarted
        assert_eq!(no_updates, 4);
        assert_eq!(controller.get_t_phase(), 0.0);
    }

    #[test]
    fn test_no_phase_is_skipped() {
        let mut controller = TrafficController::new(5.0, 2.0, 5.0, Phase::Green, 0.0);
        assert_eq!(controller.update(100.0), Some(Phase::Yellow));
        assert_eq!(controller.update(100.0), Some(Phase::Red));
        assert_eq!(controller.update(100.0), Some(Phase::Green));
    }

    #[test]
    fn test_phase_at() {
        let controller = TrafficController::new(5.0, 2.0, 5.0, Phase::Green, 0.0);
        assert_eq!(controller.phase_at(0.0), Phase::Green);
        assert_eq!(controller.phase_at(4.9), Phase::Green);
        assert_eq!(controller.phase_at(5.5), Phase::Yellow);
        assert_eq!(controller.phase_at(7.5), Phase::Red);
        assert_eq!(controller.phase_at(12.5), Phase::Green);
        assert_eq!(controller.phase_at(30.0), Phase::Yellow);
    }

    #[test]
    fn test_initial_offset() {
        let mut light = TrafficLight::new(&TrafficLightPars {
            id: 1,
            position: Point2d::new(0.0, 0.0),
            waypoint_idx: 0,
            t_green: 8.0,
            t_yellow: 2.0,
            t_red: 6.0,
            initial_phase: Phase::Red,
            t_initial: 2.0,
        });

        for _ in 0..7 {
            light.controller.update(0.5);
        }
        assert_eq!(light.controller.get_phase(), Phase::Red);

        light.controller.update(0.5);
        assert_eq!(light.controller.get_phase(), Phase::Green);
    }
}



#[cfg(test)]
mod world_tests {
    use crate::core::collision::test_overlap;
    use crate::core::progress::State;
    use crate::core::vehicle::Controls;
    use crate::core::world::RaceWorld;
    use crate::test_pars::{car, city_loop, sim_pars, square_track, straight_track};
    use helpers::general::SimError;
    use serde_json::json;
    use std::f64::consts::PI;

    #[test]
    fn test_single_npc_completes_lap() {
        let pars = sim_pars(
            square_track(60.0),
            json!({"1": car(1, "npc", -10.0, 0.0, 0.0, 0)}),
            json!({"tot_no_laps": 1, "t_race_max": 200.0}),
        );
        let mut world = RaceWorld::new(&pars).unwrap();

        while !world.is_race_over() {
            world.step(0.05).unwrap();
        }

        assert!(world.get_all_finished());
        assert!(world.cur_racetime < 120.0);
        assert!(world.laptimes[0][1] > 0.0);

        let result = world.get_race_result();
        assert_eq!(result.car_infos[0].state, State::Finished);
        assert_eq!(result.car_infos[0].compl_laps, 1);
    }

    #[test]
    fn test_npc_starting_on_line_finishes_after_one_loop() {
        let pars = sim_pars(
            square_track(60.0),
            json!({"1": car(1, "npc", 0.0, 0.0, 0.0, 0)}),
            json!({"tot_no_laps": 1, "t_race_max": 200.0}),
        );
        let mut world = RaceWorld::new(&pars).unwrap();
        assert_eq!(world.cars_list[0].ph.get_next_wp(), Some(1));

        while !world.is_race_over() {
            world.step(0.05).unwrap();
        }

        // a single loop of 240m, a second loop would take at least twice as long
        assert!(world.get_all_finished());
        assert!(world.cur_racetime < 40.0);
        assert_eq!(world.get_race_result().car_infos[0].compl_laps, 1);
    }

    #[test]
    fn test_npc_never_runs_red_light() {
        let pars = sim_pars(
            straight_track(json!([{
                "id": 1,
                "position": {"x": 100.0, "y": 4.0},
                "waypoint_idx": 1,
                "t_green": 5.0,
                "t_yellow": 2.0,
                "t_red": 1000.0,
                "initial_phase": "red"
            }])),
            json!({"1": car(1, "npc", 5.0, 0.0, 0.0, 1)}),
            json!({"tot_no_laps": 1, "t_race_max": 100.0}),
        );
        let mut world = RaceWorld::new(&pars).unwrap();

        for _ in 0..1200 {
            world.step(0.05).unwrap();
            assert!(world.cars_list[0].vehicle.get_state().position.x < 95.5);
        }

        // the car approached the light and waits in front of it
        let state = world.cars_list[0].vehicle.get_state();
        assert!(state.position.x > 80.0);
        assert!(state.speed.abs() < 0.1);
    }

    #[test]
    fn test_head_on_collision() {
        let mut npc = car(2, "npc", 0.0, 0.0, 0.0, 1);
        npc["npc_pars"] = json!({"following_distance": 0.0, "min_gap": -100.0});

        let pars = sim_pars(
            straight_track(json!([])),
            json!({"1": car(1, "player", 40.0, 0.0, PI, 1), "2": npc}),
            json!({"tot_no_laps": 1, "t_race_max": 100.0}),
        );
        let mut world = RaceWorld::new(&pars).unwrap();
        world
            .set_player_controls(&Controls {
                throttle: 1.0,
                steering: 0.0,
            })
            .unwrap();

        let mut speeds_prev = (0.0, 0.0);

        for _ in 0..400 {
            world.step(0.05).unwrap();
            let speeds = (
                world.cars_list[0].vehicle.get_state().speed,
                world.cars_list[1].vehicle.get_state().speed,
            );

            if world.get_no_collisions() > 0 {
                assert!(speeds.0 < speeds_prev.0);
                assert!(speeds.1 < speeds_prev.1);
                assert!(test_overlap(
                    &world.cars_list[0].vehicle.get_body(),
                    &world.cars_list[1].vehicle.get_body()
                )
                .is_none());
                return;
            }
            speeds_prev = speeds;
        }

        panic!("Head-on collision was not detected!")
    }

    #[test]
    fn test_determinism() {
        let pars = city_loop();
        let mut world_a = RaceWorld::new(&pars).unwrap();
        let mut world_b = RaceWorld::new(&pars).unwrap();
        world_a.enable_player_autopilot().unwrap();
        world_b.enable_player_autopilot().unwrap();

        for _ in 0..600 {
            world_a.step(0.05).unwrap();
            world_b.step(0.05).unwrap();
            assert_eq!(world_a.snapshot(), world_b.snapshot());
        }
    }

    #[test]
    fn test_npc_spawning() {
        let mut world = RaceWorld::new(&city_loop()).unwrap();
        let no_racing_cars = world.cars_list.len();

        for _ in 0..100 {
            world.step(0.05).unwrap();
        }

        assert_eq!(world.cars_list.len(), no_racing_cars + 1);
        assert!(!world.cars_list[no_racing_cars].racing);
    }

    #[test]
    fn test_npc_despawn_outside_bounds() {
        let mut pars = sim_pars(
            square_track(60.0),
            json!({"1": car(1, "player", -10.0, 0.0, 0.0, 0)}),
            json!({"tot_no_laps": 1, "t_race_max": 100.0}),
        );
        pars.world_pars.bounds = Some([-20.0, -20.0, 80.0, 80.0]);
        pars.world_pars.npc_spawn = Some(
            serde_json::from_value(json!({
                "interval": 0.1,
                "max_npcs": 1,
                "vehicle": "car",
                "color": "#00ff00",
                "spawn_points": [
                    {"position": {"x": 200.0, "y": 0.0}, "heading": 0.0, "start_wp": 1}
                ]
            }))
            .unwrap(),
        );
        let mut world = RaceWorld::new(&pars).unwrap();

        world.step(0.1).unwrap();
        assert_eq!(world.cars_list.len(), 2);

        world.step(0.05).unwrap();
        assert_eq!(world.cars_list.len(), 1);
    }

    #[test]
    fn test_npc_retired_outside_bounds_is_not_finished() {
        let mut pars = sim_pars(
            square_track(60.0),
            json!({"1": car(1, "npc", -10.0, 0.0, 0.0, 0)}),
            json!({"tot_no_laps": 1, "t_race_max": 100.0}),
        );
        pars.world_pars.bounds = Some([-5.0, -20.0, 80.0, 80.0]);
        let mut world = RaceWorld::new(&pars).unwrap();

        world.step(0.05).unwrap();

        assert_eq!(world.get_race_result().car_infos[0].state, State::Retired);
        let snapshot = world.snapshot();
        assert!(!snapshot.vehicles[0].finished);
        assert!(snapshot.vehicles[0].retired);
    }

    #[test]
    fn test_no_tunnelling_through_thin_obstacle() {
        let mut track = straight_track(json!([]));
        track["obstacles"] = json!([{
            "position": {"x": 150.0, "y": 0.0},
            "shape": {"type": "rect", "length": 0.5, "width": 20.0}
        }]);

        let pars = sim_pars(
            track,
            json!({"1": car(1, "player", 0.0, 0.0, 0.0, 1)}),
            json!({"tot_no_laps": 1, "t_race_max": 100.0}),
        );
        let mut world = RaceWorld::new(&pars).unwrap();
        world
            .set_player_controls(&Controls {
                throttle: 1.0,
                steering: 0.0,
            })
            .unwrap();

        let mut speed_prev = 0.0;
        let mut hit = false;

        for _ in 0..300 {
            world.step(0.1).unwrap();
            let state = world.cars_list[0].vehicle.get_state();

            // the front of the car (half length 2m) stays in front of the wall
            assert!(state.position.x + 2.0 <= 149.75 + 1e-3);

            if !hit && world.get_no_collisions() > 0 {
                // the obstacle speed factor is zero
                assert!(speed_prev > 5.0);
                assert!(state.speed < 1.0);
                hit = true;
            }
            speed_prev = state.speed;
        }

        assert!(hit);
    }

    #[test]
    fn test_invalid_timestep() {
        let mut world = RaceWorld::new(&city_loop()).unwrap();

        for timestep_size in [0.0, -0.05, f64::NAN, 0.5] {
            assert!(matches!(
                world.step(timestep_size),
                Err(SimError::InvalidInput(_))
            ));
        }
        assert_eq!(world.cur_racetime, 0.0);
    }

    #[test]
    fn test_player_controls() {
        let mut world = RaceWorld::new(&city_loop()).unwrap();
        assert!(world
            .set_player_controls(&Controls {
                throttle: 2.0,
                steering: 0.0
            })
            .is_ok());
        assert!(matches!(
            world.set_player_controls(&Controls {
                throttle: f64::NAN,
                steering: 0.0
            }),
            Err(SimError::InvalidInput(_))
        ));

        let pars = sim_pars(
            square_track(60.0),
            json!({"1": car(1, "npc", -10.0, 0.0, 0.0, 0)}),
            json!({"tot_no_laps": 1, "t_race_max": 100.0}),
        );
        let mut world = RaceWorld::new(&pars).unwrap();
        assert!(world.set_player_controls(&Controls::idle()).is_err());
    }
}

#[cfg(test)]
mod pre_tests {
    use crate::core::npc::NpcPars;
    use crate::core::world::RaceWorld;
    use crate::pre::check_sim_opts_pars::check_sim_pars;
    use crate::test_pars::{car, city_loop, sim_pars, square_track};
    use helpers::general::SimError;
    use serde_json::json;

    fn race_pars() -> serde_json::Value {
        json!({"tot_no_laps": 1, "t_race_max": 100.0})
    }

    #[test]
    fn test_parameter_file_is_valid() {
        let pars = city_loop();
        assert!(check_sim_pars(&pars).is_ok());
        assert_eq!(pars.track_pars.name, "CityLoop");
    }

    #[test]
    fn test_single_waypoint_is_rejected() {
        let mut track = square_track(60.0);
        track["waypoints"] = json!([{"x": 0.0, "y": 0.0}]);

        let pars = sim_pars(
            track,
            json!({"1": car(1, "npc", -10.0, 0.0, 0.0, 0)}),
            race_pars(),
        );
        assert!(matches!(
            RaceWorld::new(&pars),
            Err(SimError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_degenerate_obstacle_is_rejected() {
        let mut track = square_track(60.0);
        track["obstacles"] = json!([
            {"position": {"x": 30.0, "y": 30.0}, "shape": {"type": "circle", "radius": 0.0}}
        ]);

        let pars = sim_pars(
            track,
            json!({"1": car(1, "npc", -10.0, 0.0, 0.0, 0)}),
            race_pars(),
        );
        assert!(matches!(
            check_sim_pars(&pars),
            Err(SimError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_two_players_are_rejected() {
        let pars = sim_pars(
            square_track(60.0),
            json!({
                "1": car(1, "player", -10.0, 0.0, 0.0, 0),
                "2": car(2, "player", -20.0, 0.0, 0.0, 0)
            }),
            race_pars(),
        );
        assert!(matches!(
            check_sim_pars(&pars),
            Err(SimError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_invalid_color_is_rejected() {
        let mut npc = car(1, "npc", -10.0, 0.0, 0.0, 0);
        npc["color"] = json!("not-a-color");

        let pars = sim_pars(square_track(60.0), json!({ "1": npc }), race_pars());
        assert!(check_sim_pars(&pars).is_err());
    }

    #[test]
    fn test_non_increasing_gear_speed_limits_are_rejected() {
        let mut pars = sim_pars(
            square_track(60.0),
            json!({"1": car(1, "npc", -10.0, 0.0, 0.0, 0)}),
            race_pars(),
        );
        pars.vehicle_pars_all.insert(
            "car".to_owned(),
            serde_json::from_value(json!({
                "kind": "car",
                "gearbox": {
                    "ratios": [2.0, 1.5, 1.0],
                    "speed_limits": [0.4, 0.3, 1.0],
                    "upshift_speeds": [0.3, 0.6],
                    "downshift_speeds": [0.2, 0.5],
                    "t_shift": 0.5,
                    "shift_power_frac": 0.2,
                    "rpm_idle": 800.0,
                    "rpm_max": 6000.0
                }
            }))
            .unwrap(),
        );
        assert!(matches!(
            check_sim_pars(&pars),
            Err(SimError::ConfigurationError(_))
        ));

        // the same gearbox with increasing speed limits is accepted
        pars.vehicle_pars_all.insert(
            "car".to_owned(),
            serde_json::from_value(json!({
                "kind": "car",
                "gearbox": {
                    "ratios": [2.0, 1.5, 1.0],
                    "speed_limits": [0.3, 0.6, 1.0],
                    "upshift_speeds": [0.3, 0.6],
                    "downshift_speeds": [0.2, 0.5],
                    "t_shift": 0.5,
                    "shift_power_frac": 0.2,
                    "rpm_idle": 800.0,
                    "rpm_max": 6000.0
                }
            }))
            .unwrap(),
        );
        assert!(check_sim_pars(&pars).is_ok());
    }

    #[test]
    fn test_invalid_npc_pars_are_rejected() {
        let mut npc = car(1, "npc", -10.0, 0.0, 0.0, 0);
        npc["npc_pars"] = json!({"arrival_radius": -1.0});

        let pars = sim_pars(square_track(60.0), json!({ "1": npc }), race_pars());
        assert!(matches!(
            check_sim_pars(&pars),
            Err(SimError::ConfigurationError(_))
        ));

        let mut pars = sim_pars(
            square_track(60.0),
            json!({"1": car(1, "npc", -10.0, 0.0, 0.0, 0)}),
            race_pars(),
        );
        assert!(check_sim_pars(&pars).is_ok());

        pars.car_pars_all.get_mut(&1).unwrap().npc_pars = Some(NpcPars {
            k_steer: f64::NAN,
            ..NpcPars::default()
        });
        assert!(matches!(
            check_sim_pars(&pars),
            Err(SimError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_laps_on_open_path_are_rejected() {
        let mut track = square_track(60.0);
        track["closed"] = json!(false);

        let pars = sim_pars(
            track,
            json!({"1": car(1, "npc", -10.0, 0.0, 0.0, 0)}),
            json!({"tot_no_laps": 3, "t_race_max": 100.0}),
        );
        assert!(check_sim_pars(&pars).is_err());
    }
}
