use crate::core::world::RaceWorld;
use crate::interfaces::hud_interface::{WorldSnapshot, MAX_HUD_UPDATE_FREQUENCY};
use crate::post::race_result::RaceResult;
use crate::pre::read_sim_pars::SimPars;
use anyhow::Context;
use flume::Sender;
use std::thread::sleep;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// handle_race creates and simulates a race on the basis of the inserted parameters, and returns
/// the results for post-processing.
pub fn handle_race(
    sim_pars: &SimPars,
    timestep_size: f64,
    print_debug: bool,
    autopilot: bool,
    tx: Option<&Sender<WorldSnapshot>>,
    realtime_factor: f64,
) -> anyhow::Result<RaceResult> {
    // create the race
    let mut world = RaceWorld::new(sim_pars).context("Failed to create the race world!")?;

    if autopilot {
        world
            .enable_player_autopilot()
            .context("Failed to enable the autopilot!")?;
    }

    // simulate the race -> execute simulation steps until race is finished for all cars
    match tx {
        None => {
            // NORMAL SIMULATION -------------------------------------------------------------------
            while !world.is_race_over() {
                // simulate time step
                world
                    .step(timestep_size)
                    .context("Failed to simulate time step!")?;
            }
        }
        Some(tx) => {
            // REAL-TIME SIMULATION ----------------------------------------------------------------
            let mut t_race_update_print = 0.0;
            let mut t_race_update_hud = 0.0;

            while !world.is_race_over() {
                let t_start = Instant::now();

                // simulate time step
                world
                    .step(timestep_size)
                    .context("Failed to simulate time step!")?;

                // log status (with a maximum of 1 Hz)
                if world.cur_racetime > t_race_update_print + 0.9999 {
                    info!(
                        "Simulating... Current race time is {:.3}s, current lap is {}",
                        world.cur_racetime, world.cur_lap_leader
                    );
                    t_race_update_print = world.cur_racetime;
                }

                // update HUD
                if world.cur_racetime > t_race_update_hud + 1.0 / MAX_HUD_UPDATE_FREQUENCY - 0.001 {
                    tx.send(world.snapshot())
                        .context("Failed to send world snapshot to HUD!")?;
                    t_race_update_hud = world.cur_racetime;
                }

                // sleep until time step is finished in real-time as well (calculation in ms)
                let t_sleep = (timestep_size * 1000.0 / realtime_factor) as i64
                    - t_start.elapsed().as_millis() as i64;

                if t_sleep > 0 {
                    sleep(Duration::from_millis(t_sleep as u64));
                } else {
                    warn!("Could not keep up with real-time!")
                }
            }

            // send final state such that the HUD shows the result
            tx.send(world.snapshot())
                .context("Failed to send world snapshot to HUD!")?;
        }
    }

    if !world.get_all_finished() {
        warn!(
            "Race was aborted after {:.3}s before all cars finished",
            world.cur_racetime
        );
    }

    // print debug information if indicated
    if print_debug {
        debug!(
            "Track length {:.1}m, {} collisions, final race order (car indices) {:?}",
            world.track.get_length(),
            world.get_no_collisions(),
            world.get_race_order()
        );
    }

    // return race result
    Ok(world.get_race_result())
}
