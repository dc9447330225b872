//! rft8xx - Command line tool for FT80x/FT81x graphics coprocessors
//!
//! Drives an EVE-class graphics chip over a byte-oriented bus: power and
//! clock bring-up through host commands, register configuration through
//! direct memory access, and drawing through the coprocessor's command
//! FIFO.
//!
//! # Architecture
//!
//! The protocol lives in `rft8xx-core`, which only needs a byte transport.
//! Transports are selected at run time with `-t name[:key=value,...]`:
//! - **sim** - in-memory chip emulation, also used by the tests
//! - **linux_spi** - Linux spidev (`/dev/spidevX.Y`)

mod cli;
mod commands;
mod error;
mod session;
mod transports;

use clap::Parser;
use cli::{Cli, Commands};
use session::Session;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    match &cli.command {
        Commands::ListTransports => {
            commands::list_transports();
            Ok(())
        }
        Commands::Probe => {
            let mut session = Session::open(&cli)?;
            commands::run_probe(&mut session)
        }
        Commands::Init { backlight } => {
            let mut session = Session::open(&cli)?;
            commands::run_init(&mut session, *backlight)
        }
        Commands::HostCmd { command } => {
            let mut session = Session::open(&cli)?;
            commands::run_host_cmd(&mut session, *command)
        }
        Commands::Calibrate => {
            let mut session = Session::open(&cli)?;
            commands::run_calibrate(&mut session)
        }
        Commands::Demo { frames } => {
            let mut session = Session::open(&cli)?;
            commands::run_demo(&mut session, *frames)
        }
    }
}
