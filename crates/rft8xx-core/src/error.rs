//! Error types for rft8xx-core
//!
//! This module provides a no_std compatible error type that can be used
//! throughout the crate. It is `Copy` so that the accessor can hand back
//! the latched failure as many times as it is asked for it.

use core::fmt;

/// Which transport operation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportFailure {
    /// Sending bytes to the chip failed
    Write,
    /// Receiving bytes from the chip failed
    Read,
    /// The transport returned fewer bytes than requested
    ShortRead {
        /// Number of bytes requested
        expected: usize,
        /// Number of bytes actually received
        got: usize,
    },
    /// Completing the transaction (flushing buffered bytes) failed
    Flush,
    /// Querying the interrupt line failed
    Irq,
    /// Underlying device I/O error (device gone, permissions, ...)
    Io,
}

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Transport errors
    /// A bus transaction failed
    Transport(TransportFailure),

    // Synchronization errors
    /// The coprocessor did not drain the command FIFO in time
    DrainTimeout {
        /// Last observed read pointer
        read: u32,
        /// Read pointer value that was being waited for
        target: u32,
    },
    /// The drain wait was cancelled by the caller
    Cancelled,
    /// The coprocessor reported a fault (read pointer 0xFFF)
    CoprocessorFault,

    // Configuration / contract errors
    /// Command FIFO capacity is not a power of two
    InvalidFifoCapacity(u32),
    /// Text payload does not fit into the command FIFO
    TextTooLong {
        /// Length of the text in bytes
        len: usize,
        /// Largest text the FIFO can hold
        max: usize,
    },
    /// Display list append past the end of display-list memory
    DisplayListOverflow {
        /// Offset the append was attempted at
        offset: u32,
        /// Size of display-list memory
        capacity: u32,
    },

    // Chip errors
    /// Chip identification register does not hold the expected value
    ChipIdMismatch {
        /// Expected identification byte
        expected: u8,
        /// Byte read from the chip
        found: u8,
    },
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Write => write!(f, "bus write failed"),
            Self::Read => write!(f, "bus read failed"),
            Self::ShortRead { expected, got } => {
                write!(f, "short bus read: expected {} bytes, got {}", expected, got)
            }
            Self::Flush => write!(f, "bus flush failed"),
            Self::Irq => write!(f, "interrupt line query failed"),
            Self::Io => write!(f, "transport I/O error"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(failure) => write!(f, "transport failure: {}", failure),
            Self::DrainTimeout { read, target } => write!(
                f,
                "command FIFO drain timed out (read pointer 0x{:03X}, waiting for 0x{:03X})",
                read, target
            ),
            Self::Cancelled => write!(f, "command FIFO wait cancelled"),
            Self::CoprocessorFault => write!(f, "coprocessor fault"),
            Self::InvalidFifoCapacity(capacity) => {
                write!(f, "command FIFO capacity {} is not a power of two", capacity)
            }
            Self::TextTooLong { len, max } => {
                write!(f, "text of {} bytes exceeds the {} byte limit", len, max)
            }
            Self::DisplayListOverflow { offset, capacity } => write!(
                f,
                "display list offset 0x{:04X} exceeds display list size 0x{:04X}",
                offset, capacity
            ),
            Self::ChipIdMismatch { expected, found } => write!(
                f,
                "unexpected chip ID: expected 0x{:02X}, found 0x{:02X}",
                expected, found
            ),
        }
    }
}

impl From<TransportFailure> for Error {
    fn from(failure: TransportFailure) -> Self {
        Error::Transport(failure)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
