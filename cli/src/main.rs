mod hud;

use clap::Parser;
use hud::HudPrinter;
use racesim::core::handle_race::handle_race;
use racesim::post::race_result::RaceResult;
use racesim::pre::check_sim_opts_pars::check_sim_opts_pars;
use racesim::pre::read_sim_pars::read_sim_pars;
use racesim::pre::sim_opts::SimOpts;
use rayon::prelude::*;
use std::cmp::min;
use std::thread;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// set maximum number of concurrently running jobs in case of running more than a single simulation
const MAX_NO_CONCURRENT_JOBS: u32 = 200;

fn main() -> anyhow::Result<()> {
    // PRE-PROCESSING ------------------------------------------------------------------------------
    // get simulation options from the command line arguments
    let sim_opts: SimOpts = SimOpts::parse();

    // initialize logging (RUST_LOG takes precedence over the debug flag)
    let default_level = if sim_opts.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    // read and check simulation parameters
    let sim_pars = read_sim_pars(sim_opts.parfile_path.as_path())?;
    check_sim_opts_pars(&sim_opts, &sim_pars)?;

    // create vector for the race result and simulate race(s)
    let mut race_results: Vec<RaceResult> = Vec::with_capacity(sim_opts.no_sim_runs as usize);

    info!(
        "Simulating {} with {} cars and a time step size of {:.3}s",
        sim_pars.track_pars.name,
        sim_pars.race_pars.participants.len(),
        sim_opts.timestep_size
    );

    // EXECUTION -----------------------------------------------------------------------------------
    if !sim_opts.realtime {
        // NON-REALTIME CASE -----------------------------------------------------------------------
        let t_start = Instant::now();

        if sim_opts.no_sim_runs == 1 {
            // SINGLE THREAD -----------------------------------------------------------------------
            race_results.push(handle_race(
                &sim_pars,
                sim_opts.timestep_size,
                sim_opts.debug,
                sim_opts.autopilot,
                None,
                1.0,
            )?);
        } else {
            // MULTIPLE THREADS --------------------------------------------------------------------
            let mut no_races_left = sim_opts.no_sim_runs;

            while no_races_left > 0 {
                // calculate number of simulation runs to execute in current loop
                let tmp_no_sim_runs = min(no_races_left, MAX_NO_CONCURRENT_JOBS);

                // simulate the races and save the results
                let tmp_race_results: anyhow::Result<Vec<RaceResult>> = (0..tmp_no_sim_runs)
                    .into_par_iter()
                    .map(|_| {
                        handle_race(
                            &sim_pars,
                            sim_opts.timestep_size,
                            false,
                            sim_opts.autopilot,
                            None,
                            1.0,
                        )
                    })
                    .collect();
                race_results.extend(tmp_race_results?);

                // reduce remaining simulation runs
                no_races_left -= tmp_no_sim_runs;
            }
        }

        info!(
            "Execution time (total): {}ms",
            t_start.elapsed().as_millis()
        );
    } else {
        // REALTIME CASE ---------------------------------------------------------------------------
        // create channel for communication between simulation thread and HUD
        let (tx, rx) = flume::unbounded();

        // create a separate thread for the simulation (executed in real-time) -> sim_opts and
        // sim_pars get moved and must therefore be copied to be still available afterwards
        let sim_opts_thread = sim_opts.clone();
        let sim_pars_thread = sim_pars.clone();

        let sim_thread = thread::spawn(move || {
            handle_race(
                &sim_pars_thread,
                sim_opts_thread.timestep_size,
                false,
                sim_opts_thread.autopilot,
                Some(&tx),
                sim_opts_thread.realtime_factor,
            )
        });

        // print HUD in the main thread until the simulation thread drops the sender
        let mut hud = HudPrinter::new(rx, sim_pars.race_pars.tot_no_laps);
        hud.run();

        let race_result = sim_thread
            .join()
            .map_err(|_| anyhow::anyhow!("Simulation thread panicked!"))??;
        race_results.push(race_result);
    }

    // POST-PROCESSING -----------------------------------------------------------------------------
    // the simulation is deterministic, i.e. all runs must yield the same result
    if race_results.len() > 1 {
        let no_deviating = race_results[1..]
            .iter()
            .filter(|race_result| **race_result != race_results[0])
            .count();

        if no_deviating > 0 {
            warn!(
                "{} of {} race results deviate from the first run!",
                no_deviating,
                race_results.len()
            );
        } else {
            info!("All {} race results are identical", race_results.len());
        }
    }

    // print results
    if let Some(race_result) = race_results.first() {
        race_result.print_lap_and_race_times();
        race_result.print_classification();
    }

    Ok(())
}
