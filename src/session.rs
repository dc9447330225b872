//! Open chip session shared by the commands

use crate::cli::Cli;
use crate::error::CliError;
use crate::transports::{self, BoxedTransport};
use rft8xx_core::access::Accessor;
use rft8xx_core::bringup::{self, ClockSource, PllFrequency};
use rft8xx_core::bus::{Framing, MAX_DUMMY_BYTES};
use rft8xx_core::chip::ChipMap;
use rft8xx_core::fifo::CommandFifo;
use rft8xx_core::sync::{DrainPolicy, DEFAULT_POLL_DELAY_US};

/// Session-wide settings taken from the global options
#[derive(Debug, Clone, Copy)]
pub struct Settings {
    /// Drain timeout override in milliseconds (0 = wait forever)
    pub timeout_ms: Option<u32>,
    /// Clock source for [`Session::wake`]
    pub clock: ClockSource,
    /// PLL frequency for [`Session::wake`]
    pub pll: PllFrequency,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeout_ms: None,
            clock: ClockSource::External,
            pll: PllFrequency::Mhz48,
        }
    }
}

/// An accessor on an open transport plus the chip's layout
pub struct Session {
    pub acc: Accessor<BoxedTransport>,
    pub map: &'static ChipMap,
    pub fifo: CommandFifo,
    settings: Settings,
}

impl Session {
    /// Wrap an already opened transport
    pub fn new(
        transport: BoxedTransport,
        map: &'static ChipMap,
        framing: Framing,
        settings: Settings,
    ) -> Result<Self, CliError> {
        Ok(Self {
            acc: Accessor::with_framing(transport, framing),
            map,
            fifo: CommandFifo::new(map)?,
            settings,
        })
    }

    /// Open the transport and chip selected on the command line
    pub fn open(cli: &Cli) -> Result<Self, Box<dyn std::error::Error>> {
        let map =
            ChipMap::by_name(&cli.chip).ok_or_else(|| CliError::UnknownChip(cli.chip.clone()))?;
        if cli.dummy_bytes > MAX_DUMMY_BYTES {
            log::warn!(
                "Limiting read dummy bytes to {} (requested {})",
                MAX_DUMMY_BYTES,
                cli.dummy_bytes
            );
        }
        let framing = Framing::with_read_dummy_bytes(cli.dummy_bytes);
        let transport = transports::open_transport(&cli.transport, map, framing)?;
        let settings = Settings {
            timeout_ms: cli.timeout_ms,
            clock: cli.clock.into(),
            pll: cli.pll.into(),
        };
        Ok(Self::new(transport, map, framing, settings)?)
    }

    /// Drain policy honouring `--timeout-ms`, else `default_ms`
    ///
    /// `None` (or an explicit 0) waits forever.
    pub fn drain_policy(&self, default_ms: Option<u32>) -> DrainPolicy<'static> {
        let timeout_us = match self.settings.timeout_ms.or(default_ms) {
            None | Some(0) => None,
            Some(ms) => Some(ms.saturating_mul(1000)),
        };
        DrainPolicy {
            poll_delay_us: DEFAULT_POLL_DELAY_US,
            timeout_us,
            cancel: None,
        }
    }

    /// Send the wake-up host command sequence
    pub fn wake(&mut self) -> Result<(), CliError> {
        bringup::wake(&mut self.acc, self.settings.clock, self.settings.pll)?;
        Ok(())
    }
}

#[cfg(all(test, feature = "sim"))]
pub(crate) fn sim_session() -> Session {
    use rft8xx_core::chip::FT800;
    use rft8xx_sim::SimChip;

    Session::new(
        Box::new(SimChip::new_default()),
        &FT800,
        Framing::default(),
        Settings::default(),
    )
    .unwrap()
}
