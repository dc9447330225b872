//! Register and memory accessor with a latched error
//!
//! [`Accessor`] owns the transport for a session and provides typed 8/16/32
//! bit reads and writes plus block transfers. Transport failures are not
//! returned from each call. Instead the first failure is latched:
//!
//! - the failing call returns zero (reads) and records the error
//! - every later call returns immediately without touching the bus
//! - [`Accessor::checkpoint`] reports the latched error
//! - [`Accessor::clear_error`] resumes normal operation
//!
//! This lets a caller issue a block of register writes and check for
//! failure once at the end of the block:
//!
//! ```ignore
//! acc.write16(map.reg_hsize, 480);
//! acc.write16(map.reg_vsize, 272);
//! acc.write8(map.reg_pclk, 5);
//! acc.checkpoint()?;
//! ```

use crate::bus::{Framing, Intent, Transport, MAX_DUMMY_BYTES};
use crate::error::{Error, Result, TransportFailure};
use crate::host::HostCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Latch {
    Ok,
    Failed(Error),
}

/// Typed register/memory access over an exclusively owned transport
pub struct Accessor<T: Transport> {
    transport: T,
    framing: Framing,
    latch: Latch,
}

impl<T: Transport> Accessor<T> {
    /// Create an accessor with default framing (one read dummy byte)
    pub fn new(transport: T) -> Self {
        Self::with_framing(transport, Framing::default())
    }

    /// Create an accessor with custom framing
    pub fn with_framing(transport: T, framing: Framing) -> Self {
        Self {
            transport,
            framing,
            latch: Latch::Ok,
        }
    }

    /// Framing parameters in use
    pub fn framing(&self) -> Framing {
        self.framing
    }

    /// Borrow the transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the transport
    ///
    /// Bytes sent directly through the transport bypass the latch.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the accessor and return the transport
    pub fn into_transport(self) -> T {
        self.transport
    }

    // ------------------------------------------------------------------
    // Latch
    // ------------------------------------------------------------------

    /// The latched error, if any
    pub fn error(&self) -> Option<Error> {
        match self.latch {
            Latch::Ok => None,
            Latch::Failed(err) => Some(err),
        }
    }

    /// Returns true once a transport failure has been latched
    pub fn is_poisoned(&self) -> bool {
        self.latch != Latch::Ok
    }

    /// Report the latched error, if any
    pub fn checkpoint(&self) -> Result<()> {
        match self.latch {
            Latch::Ok => Ok(()),
            Latch::Failed(err) => Err(err),
        }
    }

    /// Clear the latched error and return it
    pub fn clear_error(&mut self) -> Option<Error> {
        let err = self.error();
        if let Some(err) = err {
            log::debug!("accessor: clearing latched error: {}", err);
        }
        self.latch = Latch::Ok;
        err
    }

    fn record(&mut self, err: Error) {
        if self.latch == Latch::Ok {
            log::warn!("accessor: {}; suppressing further bus traffic", err);
            self.latch = Latch::Failed(err);
        }
    }

    // ------------------------------------------------------------------
    // Typed access
    // ------------------------------------------------------------------

    /// Read an 8-bit value (0 if the accessor is poisoned)
    pub fn read8(&mut self, address: u32) -> u8 {
        let mut buf = [0u8; 1];
        self.read_bytes(address, &mut buf);
        buf[0]
    }

    /// Read a 16-bit little-endian value (0 if the accessor is poisoned)
    pub fn read16(&mut self, address: u32) -> u16 {
        let mut buf = [0u8; 2];
        self.read_bytes(address, &mut buf);
        u16::from_le_bytes(buf)
    }

    /// Read a 32-bit little-endian value (0 if the accessor is poisoned)
    pub fn read32(&mut self, address: u32) -> u32 {
        let mut buf = [0u8; 4];
        self.read_bytes(address, &mut buf);
        u32::from_le_bytes(buf)
    }

    /// Write an 8-bit value
    pub fn write8(&mut self, address: u32, value: u8) {
        self.write_bytes(address, &[value]);
    }

    /// Write a 16-bit value, least significant byte first
    pub fn write16(&mut self, address: u32, value: u16) {
        self.write_bytes(address, &value.to_le_bytes());
    }

    /// Write a 32-bit value, least significant byte first
    pub fn write32(&mut self, address: u32, value: u32) {
        self.write_bytes(address, &value.to_le_bytes());
    }

    // ------------------------------------------------------------------
    // Block access
    // ------------------------------------------------------------------

    /// Read consecutive bytes starting at `address`
    ///
    /// On failure (or when poisoned) `buf` is zero-filled.
    pub fn read_bytes(&mut self, address: u32, buf: &mut [u8]) {
        if self.is_poisoned() {
            buf.fill(0);
            return;
        }
        if let Err(err) = read_transaction(&mut self.transport, &self.framing, address, buf) {
            buf.fill(0);
            self.record(err);
        }
    }

    /// Write consecutive bytes starting at `address`
    pub fn write_bytes(&mut self, address: u32, data: &[u8]) {
        if self.is_poisoned() {
            return;
        }
        if let Err(err) = write_transaction(&mut self.transport, &self.framing, address, data) {
            self.record(err);
        }
    }

    // ------------------------------------------------------------------
    // Control
    // ------------------------------------------------------------------

    /// Send a host command (fire and forget, no response)
    pub fn host_command(&mut self, cmd: HostCommand) {
        if self.is_poisoned() {
            return;
        }
        log::debug!("accessor: host command {}", cmd);
        let result = self.transport.write(&cmd.frame());
        let result = close_transaction(&mut self.transport, result);
        if let Err(err) = result {
            self.record(err);
        }
    }

    /// Query the interrupt line (false if the accessor is poisoned)
    pub fn irq_asserted(&mut self) -> bool {
        if self.is_poisoned() {
            return false;
        }
        match self.transport.irq_asserted() {
            Ok(asserted) => asserted,
            Err(err) => {
                self.record(err);
                false
            }
        }
    }

    /// Delay for the specified number of microseconds
    pub fn delay_us(&mut self, us: u32) {
        self.transport.delay_us(us);
    }

    /// Let the transport switch to its fast bus clock
    pub fn raise_clock(&mut self) {
        if self.is_poisoned() {
            return;
        }
        if let Err(err) = self.transport.raise_clock() {
            self.record(err);
        }
    }
}

fn read_transaction<T: Transport>(
    transport: &mut T,
    framing: &Framing,
    address: u32,
    buf: &mut [u8],
) -> Result<()> {
    let mut header = [0u8; 3 + MAX_DUMMY_BYTES as usize];
    let len = framing.encode(address, Intent::Read, &mut header);
    let result = transport.write(&header[..len]).and_then(|()| {
        if buf.is_empty() {
            return Ok(());
        }
        let got = transport.read(buf)?;
        if got < buf.len() {
            return Err(Error::Transport(TransportFailure::ShortRead {
                expected: buf.len(),
                got,
            }));
        }
        Ok(())
    });
    close_transaction(transport, result)
}

fn write_transaction<T: Transport>(
    transport: &mut T,
    framing: &Framing,
    address: u32,
    data: &[u8],
) -> Result<()> {
    let mut header = [0u8; 3 + MAX_DUMMY_BYTES as usize];
    let len = framing.encode(address, Intent::Write, &mut header);
    // Small register writes go out as one buffer
    let result = if data.len() <= 4 {
        let mut frame = [0u8; 7];
        frame[..len].copy_from_slice(&header[..len]);
        frame[len..len + data.len()].copy_from_slice(data);
        transport.write(&frame[..len + data.len()])
    } else {
        transport
            .write(&header[..len])
            .and_then(|()| transport.write(data))
    };
    close_transaction(transport, result)
}

/// Flush even when the transaction failed so no stale bytes stay buffered
///
/// The error from the transfer wins over a flush error.
fn close_transaction<T: Transport>(transport: &mut T, result: Result<()>) -> Result<()> {
    let closed = transport.flush();
    result.and(closed)
}
