use crate::core::car::Role;
use crate::core::npc::NpcPars;
use crate::pre::read_sim_pars::SimPars;
use crate::pre::sim_opts::SimOpts;
use anyhow::Context;
use helpers::general::{is_strictly_increasing, SimError};
use std::collections::HashSet;

/// check_sim_opts_pars assures that the inserted options and parameters are within reasonable
/// limits and raises an error if not.
pub fn check_sim_opts_pars(sim_opts: &SimOpts, sim_pars: &SimPars) -> anyhow::Result<()> {
    // PART 1: SIMULATION OPTIONS
    if !(0.001 <= sim_opts.timestep_size && sim_opts.timestep_size <= 1.0) {
        return Err(config_error(format!(
            "timestep_size is {:.3}s, which is not within the reasonable range of [0.001, 1.0]s!",
            sim_opts.timestep_size
        )))
        .context("Simulation options are invalid!");
    }

    if sim_opts.timestep_size > sim_pars.world_pars.max_timestep {
        return Err(config_error(format!(
            "timestep_size is {:.3}s, which exceeds max_timestep of {:.3}s!",
            sim_opts.timestep_size, sim_pars.world_pars.max_timestep
        )))
        .context("Simulation options are invalid!");
    }

    if sim_opts.no_sim_runs < 1 {
        return Err(config_error(format!(
            "no_sim_runs must be at least equal to one, but is {}!",
            sim_opts.no_sim_runs
        )))
        .context("Simulation options are invalid!");
    }

    if sim_opts.realtime && sim_opts.no_sim_runs != 1 {
        return Err(config_error(
            "If realtime is activated, no_sim_runs must be equal to one!".to_owned(),
        ))
        .context("Simulation options are invalid!");
    }

    if sim_opts.realtime && !(0.1 <= sim_opts.realtime_factor && sim_opts.realtime_factor <= 100.0)
    {
        return Err(config_error(format!(
            "realtime_factor is {:.3}, which is not within the reasonable range of [0.1, 100.0]!",
            sim_opts.realtime_factor
        )))
        .context("Simulation options are invalid!");
    }

    if sim_opts.autopilot
        && !sim_pars
            .car_pars_all
            .values()
            .any(|car_pars| car_pars.role == Role::Player)
    {
        return Err(config_error(
            "autopilot requires a player car in the parameter file!".to_owned(),
        ))
        .context("Simulation options are invalid!");
    }

    // PART 2: SIMULATION PARAMETERS
    check_sim_pars(sim_pars).context("Simulation parameters are invalid!")?;

    Ok(())
}

/// check_sim_pars assures that the simulation parameters describe a valid world. It is executed
/// before every race such that no invalid configuration reaches the simulation.
pub fn check_sim_pars(sim_pars: &SimPars) -> Result<(), SimError> {
    // WORLD ---------------------------------------------------------------------------------------
    let world_pars = &sim_pars.world_pars;

    if !(world_pars.max_timestep.is_finite() && world_pars.max_timestep > 0.0) {
        return Err(config_error(format!(
            "max_timestep must be positive, but is {}!",
            world_pars.max_timestep
        )));
    }

    for (name, factor) in [
        ("speed_factor_vehicle", world_pars.speed_factor_vehicle),
        ("speed_factor_obstacle", world_pars.speed_factor_obstacle),
    ] {
        if !(0.0 <= factor && factor < 1.0) {
            return Err(config_error(format!(
                "{} must be within [0.0, 1.0), but is {}!",
                name, factor
            )));
        }
    }

    if let Some(bounds) = world_pars.bounds {
        if !(bounds[0] < bounds[2] && bounds[1] < bounds[3]) {
            return Err(config_error(
                "World bounds must be given as [x_min, y_min, x_max, y_max]!".to_owned(),
            ));
        }
    }

    // TRACK ---------------------------------------------------------------------------------------
    let track_pars = &sim_pars.track_pars;
    let no_wps = track_pars.waypoints.len();

    if no_wps < 2 {
        return Err(config_error(format!(
            "Track {} must contain at least two waypoints, but contains {}!",
            track_pars.name, no_wps
        )));
    }

    if track_pars.waypoints.iter().any(|wp| !wp.is_finite()) {
        return Err(config_error("All waypoints must be finite!".to_owned()));
    }

    if !(track_pars.gate_half_width > 0.0) {
        return Err(config_error(format!(
            "gate_half_width must be positive, but is {}!",
            track_pars.gate_half_width
        )));
    }

    for (i, obstacle) in track_pars.obstacles.iter().enumerate() {
        if obstacle.shape.is_degenerate() || !obstacle.position.is_finite() {
            return Err(config_error(format!(
                "Obstacle {} has a degenerate shape or an invalid position!",
                i
            )));
        }
    }

    // TRAFFIC LIGHTS ------------------------------------------------------------------------------
    for light_pars in track_pars.traffic_lights.iter() {
        if [light_pars.t_green, light_pars.t_yellow, light_pars.t_red]
            .iter()
            .any(|&t| !(t.is_finite() && t > 0.0))
        {
            return Err(config_error(format!(
                "Dwell times of traffic light {} must be positive!",
                light_pars.id
            )));
        }

        if light_pars.waypoint_idx >= no_wps {
            return Err(config_error(format!(
                "Traffic light {} guards waypoint {}, but the track has {} waypoints!",
                light_pars.id, light_pars.waypoint_idx, no_wps
            )));
        }

        if light_pars.t_initial < 0.0 {
            return Err(config_error(format!(
                "t_initial of traffic light {} must not be negative!",
                light_pars.id
            )));
        }
    }

    // VEHICLES ------------------------------------------------------------------------------------
    for (key, entry) in sim_pars.vehicle_pars_all.iter() {
        let vehicle_pars = entry.get_vehicle_pars();

        if vehicle_pars.shape.is_degenerate() {
            return Err(config_error(format!(
                "Vehicle {} has a degenerate shape!",
                key
            )));
        }

        if [
            vehicle_pars.mass,
            vehicle_pars.v_max,
            vehicle_pars.v_rev_max,
            vehicle_pars.a_max,
            vehicle_pars.a_brake,
            vehicle_pars.turn_rate,
        ]
        .iter()
        .any(|&x| !(x.is_finite() && x > 0.0))
            || vehicle_pars.c_drag < 0.0
            || vehicle_pars.c_corner_drag < 0.0
        {
            return Err(config_error(format!(
                "Vehicle {} has non-positive physical parameters!",
                key
            )));
        }

        let turn_curve_xp: Vec<f64> = vehicle_pars.turn_curve.iter().map(|x| x[0]).collect();

        if turn_curve_xp.is_empty() || !is_strictly_increasing(&turn_curve_xp) {
            return Err(config_error(format!(
                "The turn curve of vehicle {} must contain strictly increasing speed fractions!",
                key
            )));
        }

        if let Some(gearbox_pars) = &vehicle_pars.gearbox {
            let no_gears = gearbox_pars.no_gears();

            if no_gears == 0
                || gearbox_pars.speed_limits.len() != no_gears
                || gearbox_pars.upshift_speeds.len() + 1 != no_gears
                || gearbox_pars.downshift_speeds.len() + 1 != no_gears
            {
                return Err(config_error(format!(
                    "The gearbox of vehicle {} must contain a ratio and speed limit per gear and \
                    a shift speed per gear change!",
                    key
                )));
            }

            if gearbox_pars
                .ratios
                .iter()
                .any(|&x| !(x.is_finite() && x > 0.0))
            {
                return Err(config_error(format!(
                    "The gear ratios of vehicle {} must be positive!",
                    key
                )));
            }

            // speed fractions are relative to v_max
            if gearbox_pars
                .speed_limits
                .iter()
                .chain(gearbox_pars.upshift_speeds.iter())
                .chain(gearbox_pars.downshift_speeds.iter())
                .any(|&x| !(x.is_finite() && 0.0 < x && x <= 1.0))
            {
                return Err(config_error(format!(
                    "The gearbox speed fractions of vehicle {} must be within (0.0, 1.0]!",
                    key
                )));
            }

            if !is_strictly_increasing(&gearbox_pars.speed_limits)
                || !is_strictly_increasing(&gearbox_pars.upshift_speeds)
                || !is_strictly_increasing(&gearbox_pars.downshift_speeds)
            {
                return Err(config_error(format!(
                    "The gearbox speed limits and shift speeds of vehicle {} must be strictly \
                    increasing!",
                    key
                )));
            }

            // a downshift speed at or above the upshift speed lets the automatic oscillate
            if gearbox_pars
                .downshift_speeds
                .iter()
                .zip(gearbox_pars.upshift_speeds.iter())
                .any(|(down, up)| down >= up)
            {
                return Err(config_error(format!(
                    "The downshift speeds of vehicle {} must be below the upshift speeds!",
                    key
                )));
            }

            if !(gearbox_pars.t_shift.is_finite() && gearbox_pars.t_shift >= 0.0)
                || !(0.0..=1.0).contains(&gearbox_pars.shift_power_frac)
                || !(gearbox_pars.rpm_idle > 0.0
                    && gearbox_pars.rpm_idle < gearbox_pars.rpm_max
                    && gearbox_pars.rpm_max.is_finite())
            {
                return Err(config_error(format!(
                    "The gearbox of vehicle {} has an invalid shift time, shift power fraction or \
                    engine speed range!",
                    key
                )));
            }
        }
    }

    // CARS ----------------------------------------------------------------------------------------
    let race_pars = &sim_pars.race_pars;

    if race_pars.tot_no_laps < 1 {
        return Err(config_error("tot_no_laps must be at least one!".to_owned()));
    }

    if !track_pars.closed && race_pars.tot_no_laps != 1 {
        return Err(config_error(
            "tot_no_laps must be equal to one on an open path!".to_owned(),
        ));
    }

    let mut car_nos = HashSet::with_capacity(race_pars.participants.len());
    let mut no_players = 0;

    for car_no in race_pars.participants.iter() {
        if !car_nos.insert(*car_no) {
            return Err(config_error(format!(
                "Car {} participates more than once!",
                car_no
            )));
        }

        let car_pars = sim_pars.car_pars_all.get(car_no).ok_or_else(|| {
            config_error(format!("Missing parameters of participating car {}!", car_no))
        })?;

        if car_pars.car_no != *car_no {
            return Err(config_error(format!(
                "Car parameters stored under key {} belong to car {}!",
                car_no, car_pars.car_no
            )));
        }

        if !sim_pars.vehicle_pars_all.contains_key(&car_pars.vehicle) {
            return Err(config_error(format!(
                "Car {} uses unknown vehicle {}!",
                car_no, car_pars.vehicle
            )));
        }

        if car_pars.start_wp >= no_wps {
            return Err(config_error(format!(
                "Start waypoint {} of car {} does not exist!",
                car_pars.start_wp, car_no
            )));
        }

        if !(car_pars.position.is_finite() && car_pars.heading.is_finite()) {
            return Err(config_error(format!(
                "Start position and heading of car {} must be finite!",
                car_no
            )));
        }

        if car_pars.color.parse::<css_color_parser::Color>().is_err() {
            return Err(config_error(format!(
                "Could not parse color {} of car {}!",
                car_pars.color, car_no
            )));
        }

        if let Some(npc_pars) = &car_pars.npc_pars {
            check_npc_pars(npc_pars, &format!("car {}", car_no))?;
        }

        if car_pars.role == Role::Player {
            no_players += 1;
        }
    }

    if no_players > 1 {
        return Err(config_error(format!(
            "At most one player car is allowed, but {} were found!",
            no_players
        )));
    }

    // SPAWNING ------------------------------------------------------------------------------------
    if let Some(spawn_pars) = &world_pars.npc_spawn {
        if !(spawn_pars.interval > 0.0) {
            return Err(config_error("Spawn interval must be positive!".to_owned()));
        }

        if !sim_pars.vehicle_pars_all.contains_key(&spawn_pars.vehicle) {
            return Err(config_error(format!(
                "Spawned NPCs use unknown vehicle {}!",
                spawn_pars.vehicle
            )));
        }

        if spawn_pars.color.parse::<css_color_parser::Color>().is_err() {
            return Err(config_error(format!(
                "Could not parse color {} of spawned NPCs!",
                spawn_pars.color
            )));
        }

        if spawn_pars
            .spawn_points
            .iter()
            .any(|point| point.start_wp >= no_wps || !point.position.is_finite())
        {
            return Err(config_error(
                "A spawn point has an invalid position or start waypoint!".to_owned(),
            ));
        }

        if let Some(npc_pars) = &spawn_pars.npc_pars {
            check_npc_pars(npc_pars, "spawned NPCs")?;
        }
    }

    Ok(())
}

/// check_npc_pars assures that the NPC tuning is finite and that gains, speeds and distances are
/// not negative. min_gap may be negative, which disables braking for vehicles ahead.
fn check_npc_pars(npc_pars: &NpcPars, owner: &str) -> Result<(), SimError> {
    let positive = [
        ("cruise_speed", npc_pars.cruise_speed),
        ("k_steer", npc_pars.k_steer),
        ("k_speed", npc_pars.k_speed),
        ("slow_dist", npc_pars.slow_dist),
        ("arrival_radius", npc_pars.arrival_radius),
        ("queue_radius", npc_pars.queue_radius),
    ];
    let non_negative = [
        ("k_turn_slow", npc_pars.k_turn_slow),
        ("stop_margin", npc_pars.stop_margin),
        ("following_distance", npc_pars.following_distance),
        ("cone_half_width", npc_pars.cone_half_width),
        ("k_closing", npc_pars.k_closing),
        ("reaction_time", npc_pars.reaction_time),
        ("queue_delay", npc_pars.queue_delay),
    ];

    for (name, x) in positive.iter() {
        if !(x.is_finite() && *x > 0.0) {
            return Err(config_error(format!(
                "NPC parameter {} of {} must be positive, but is {}!",
                name, owner, x
            )));
        }
    }

    for (name, x) in non_negative.iter() {
        if !(x.is_finite() && *x >= 0.0) {
            return Err(config_error(format!(
                "NPC parameter {} of {} must not be negative, but is {}!",
                name, owner, x
            )));
        }
    }

    if !npc_pars.min_gap.is_finite() {
        return Err(config_error(format!(
            "NPC parameter min_gap of {} must be finite!",
            owner
        )));
    }

    Ok(())
}

fn config_error(msg: String) -> SimError {
    SimError::ConfigurationError(msg)
}
