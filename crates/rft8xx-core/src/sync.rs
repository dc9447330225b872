//! Waiting for the coprocessor to drain the command FIFO
//!
//! The coprocessor consumes the FIFO asynchronously and only reports
//! progress through its read pointer register, so waiting means polling.
//! The poll loop is the only unbounded wait in the crate; [`DrainPolicy`]
//! bounds it with a timeout and an optional cancellation flag.

use crate::access::Accessor;
use crate::bus::Transport;
use crate::error::{Error, Result};
use crate::fifo::{CommandFifo, FIFO_FAULT};
use core::sync::atomic::{AtomicBool, Ordering};

/// Default delay between read pointer polls
pub const DEFAULT_POLL_DELAY_US: u32 = 100;

/// Default drain timeout
pub const DEFAULT_TIMEOUT_US: u32 = 1_000_000;

/// How far the coprocessor must have drained the FIFO
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainTarget {
    /// Read pointer equals the chip's write pointer register (FIFO empty)
    Empty,
    /// Read pointer equals the given offset
    Offset(u32),
}

/// Timing and cancellation for [`wait_drained`]
#[derive(Debug, Clone, Copy)]
pub struct DrainPolicy<'a> {
    /// Delay between polls in microseconds (0 = poll back to back)
    pub poll_delay_us: u32,
    /// Give up after this many microseconds (`None` = wait forever)
    pub timeout_us: Option<u32>,
    /// Abort the wait when this flag becomes true
    pub cancel: Option<&'a AtomicBool>,
}

impl Default for DrainPolicy<'_> {
    fn default() -> Self {
        Self {
            poll_delay_us: DEFAULT_POLL_DELAY_US,
            timeout_us: Some(DEFAULT_TIMEOUT_US),
            cancel: None,
        }
    }
}

impl<'a> DrainPolicy<'a> {
    /// Poll back to back until the target is reached, however long it takes
    pub const fn unbounded() -> Self {
        Self {
            poll_delay_us: 0,
            timeout_us: None,
            cancel: None,
        }
    }

    /// Poll every `poll_delay_us`, giving up after `timeout_us`
    pub const fn with_timeout(timeout_us: u32, poll_delay_us: u32) -> Self {
        Self {
            poll_delay_us,
            timeout_us: Some(timeout_us),
            cancel: None,
        }
    }

    /// Also stop waiting once `flag` is set
    pub fn cancel_on(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }
}

/// Block until the coprocessor's read pointer reaches `target`
///
/// Returns as soon as a poll observes the read pointer equal to the target
/// and never for any other value. Fails with:
///
/// - the accessor's latched error if a poll fails (or it was already
///   poisoned on entry)
/// - [`Error::CoprocessorFault`] if the chip reports a fault
/// - [`Error::Cancelled`] once the policy's cancel flag is set
/// - [`Error::DrainTimeout`] once the policy's timeout has elapsed
///
/// Without a poll delay each poll counts as one microsecond towards the
/// timeout.
pub fn wait_drained<T: Transport>(
    acc: &mut Accessor<T>,
    fifo: &CommandFifo,
    target: DrainTarget,
    policy: &DrainPolicy<'_>,
) -> Result<()> {
    acc.checkpoint()?;

    let step = core::cmp::max(policy.poll_delay_us, 1) as u64;
    let mut waited: u64 = 0;
    let mut polls: u64 = 0;

    loop {
        if let Some(flag) = policy.cancel {
            if flag.load(Ordering::Acquire) {
                log::debug!("fifo: drain wait cancelled after {} polls", polls);
                return Err(Error::Cancelled);
            }
        }

        let read = fifo.read_pointer(acc);
        let goal = match target {
            DrainTarget::Empty => fifo.write_pointer(acc),
            DrainTarget::Offset(offset) => fifo.wrap(offset),
        };
        acc.checkpoint()?;
        polls += 1;

        log::trace!("fifo: read pointer 0x{:03X}, waiting for 0x{:03X}", read, goal);

        if read == FIFO_FAULT {
            log::error!("fifo: coprocessor fault");
            return Err(Error::CoprocessorFault);
        }
        if read == goal {
            log::debug!("fifo: drained to 0x{:03X} after {} polls", goal, polls);
            return Ok(());
        }

        if let Some(timeout) = policy.timeout_us {
            if waited >= timeout as u64 {
                log::warn!(
                    "fifo: drain timed out after {} us (read 0x{:03X}, target 0x{:03X})",
                    waited,
                    read,
                    goal
                );
                return Err(Error::DrainTimeout { read, target: goal });
            }
        }

        if policy.poll_delay_us > 0 {
            acc.delay_us(policy.poll_delay_us);
        }
        waited += step;
    }
}
