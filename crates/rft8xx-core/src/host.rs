//! Host commands
//!
//! Host commands move the chip between power and clock states. They are
//! single control bytes sent without a payload and without a response,
//! framed as `[code, 0x00, 0x00]` so that the chip sees a full 3-byte
//! header. The `0b01` tag in the top bits of every code except
//! [`HostCommand::Active`] keeps them apart from memory accesses; `Active`
//! is indistinguishable from a zero-length read of address 0, which is how
//! the chip is woken up.

use core::fmt;
use core::str::FromStr;

/// Power and clock control codes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HostCommand {
    /// Switch from standby/sleep to active mode
    Active = 0x00,
    /// Standby (clock running)
    Standby = 0x41,
    /// Sleep (clock off)
    Sleep = 0x42,
    /// Power down (core off)
    PowerDown = 0x50,
    /// Select external clock source
    ClockExternal = 0x44,
    /// Select 48 MHz PLL output
    Clock48M = 0x62,
    /// Select 36 MHz PLL output
    Clock36M = 0x61,
    /// Reset core, all registers to defaults
    CoreReset = 0x68,
}

impl HostCommand {
    /// Every host command, in code order
    pub const ALL: [HostCommand; 8] = [
        Self::Active,
        Self::Standby,
        Self::Sleep,
        Self::ClockExternal,
        Self::PowerDown,
        Self::Clock36M,
        Self::Clock48M,
        Self::CoreReset,
    ];

    /// The control byte sent on the bus
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// The bytes of the host command transaction
    pub const fn frame(self) -> [u8; 3] {
        [self.code(), 0x00, 0x00]
    }

    /// Decode a control byte
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.code() == code)
    }

    /// Short lowercase name, as accepted by [`FromStr`]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Standby => "standby",
            Self::Sleep => "sleep",
            Self::PowerDown => "pwrdown",
            Self::ClockExternal => "clkext",
            Self::Clock48M => "clk48m",
            Self::Clock36M => "clk36m",
            Self::CoreReset => "corerst",
        }
    }
}

impl fmt::Display for HostCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:02X})", self.name(), self.code())
    }
}

/// Error returned when parsing an unknown host command name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownHostCommand;

impl fmt::Display for UnknownHostCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown host command")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for UnknownHostCommand {}

impl FromStr for HostCommand {
    type Err = UnknownHostCommand;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .ok_or(UnknownHostCommand)
    }
}
