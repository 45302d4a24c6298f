use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[clap(
    version = "0.1.0",
    name = "ARCADE-RS",
    about = "An arcade race simulation with waypoint-following NPCs and traffic lights"
)]
pub struct SimOpts {
    // FLAGS ---------------------------------------------------------------------------------------
    /// Activate debug logging (not usable in case real-time simulation is activated)
    #[clap(short, long, conflicts_with = "realtime")]
    pub debug: bool,

    /// Simulate the race in real-time with the inserted real-time factor and print a HUD
    #[clap(short = 'R', long, conflicts_with = "debug")]
    pub realtime: bool,

    /// Let the waypoint follower drive the player car
    #[clap(short, long)]
    pub autopilot: bool,

    // OPTIONS -------------------------------------------------------------------------------------
    /// Set number of simulation runs (must be one in case real-time simulation is activated)
    #[clap(short, long, default_value = "1")]
    pub no_sim_runs: u32,

    /// Set path to the simulation parameter file
    #[clap(parse(from_os_str), short, long)]
    pub parfile_path: PathBuf,

    /// Set real-time factor (only relevant in case real-time simulation is activated)
    #[clap(short, long, default_value = "1.0")]
    pub realtime_factor: f64,

    /// Set simulation timestep size in seconds, should be in the range [0.001, 1.0]
    #[clap(short, long, default_value = "0.05")]
    pub timestep_size: f64,
}
