//! CLI argument parsing

use crate::transports;
use clap::{Parser, Subcommand, ValueEnum};
use rft8xx_core::bringup::{ClockSource, PllFrequency};
use rft8xx_core::host::HostCommand;

/// Generate dynamic help text for the transport argument
fn transport_help() -> String {
    format!(
        "Transport to use [available: {}]",
        transports::transport_names_short()
    )
}

#[derive(Parser)]
#[command(name = "rft8xx")]
#[command(author, version, about = "FT80x/FT81x graphics coprocessor tool", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Transport, optionally with options (name:key=value,...)
    #[arg(short, long, global = true, default_value = "sim", help = transport_help())]
    pub transport: String,

    /// Chip generation (ft800, ft801, ft810, ft811, ft812, ft813)
    #[arg(short, long, global = true, default_value = "ft800")]
    pub chip: String,

    /// Dummy bytes between a read header and the data
    #[arg(long, global = true, default_value_t = 1)]
    pub dummy_bytes: u8,

    /// Drain wait timeout in milliseconds (0 waits forever)
    #[arg(long, global = true)]
    pub timeout_ms: Option<u32>,

    /// System clock source used when waking the chip
    #[arg(long, global = true, value_enum, default_value_t = ClockArg::External)]
    pub clock: ClockArg,

    /// PLL frequency used when waking the chip
    #[arg(long, global = true, value_enum, default_value_t = PllArg::Mhz48)]
    pub pll: PllArg,

    #[command(subcommand)]
    pub command: Commands,
}

/// Clock source selection
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ClockArg {
    /// Internal oscillator
    Internal,
    /// External crystal
    External,
}

impl From<ClockArg> for ClockSource {
    fn from(arg: ClockArg) -> Self {
        match arg {
            ClockArg::Internal => ClockSource::Internal,
            ClockArg::External => ClockSource::External,
        }
    }
}

/// PLL frequency selection
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PllArg {
    /// 36 MHz
    #[value(name = "36")]
    Mhz36,
    /// 48 MHz
    #[value(name = "48")]
    Mhz48,
}

impl From<PllArg> for PllFrequency {
    fn from(arg: PllArg) -> Self {
        match arg {
            PllArg::Mhz36 => PllFrequency::Mhz36,
            PllArg::Mhz48 => PllFrequency::Mhz48,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Wake the chip and check its identification register
    Probe,

    /// Bring up the chip and display (WQVGA timing)
    Init {
        /// Backlight duty cycle to ramp up to (0-128)
        #[arg(long, default_value_t = 100)]
        backlight: u8,
    },

    /// Send a single host command
    HostCmd {
        /// Command name (active, standby, sleep, pwrdown, clkext, clk48m, clk36m, corerst)
        command: HostCommand,
    },

    /// Run touch panel calibration and print the transform matrix
    Calibrate,

    /// Bounce a point around the screen through the command FIFO
    Demo {
        /// Number of frames to draw
        #[arg(long, default_value_t = 100)]
        frames: u32,
    },

    /// List available transports
    ListTransports,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_options() {
        let cli = Cli::try_parse_from([
            "rft8xx", "-vv", "demo", "--frames", "3", "--chip", "ft813", "--pll", "36",
            "--timeout-ms", "50",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.chip, "ft813");
        assert_eq!(cli.pll, PllArg::Mhz36);
        assert_eq!(cli.timeout_ms, Some(50));
        assert!(matches!(cli.command, Commands::Demo { frames: 3 }));
    }

    #[test]
    fn test_host_command_argument() {
        let cli = Cli::try_parse_from(["rft8xx", "host-cmd", "CLKEXT"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::HostCmd {
                command: HostCommand::ClockExternal
            }
        ));
        assert!(Cli::try_parse_from(["rft8xx", "host-cmd", "reboot"]).is_err());
    }
}
