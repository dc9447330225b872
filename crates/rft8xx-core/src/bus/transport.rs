//! Transport trait definition

use crate::error::Result;

/// Byte-stream transport to the chip (SPI or a bit-banged equivalent)
///
/// A transaction is a sequence of `write`/`read` calls terminated by
/// `flush`. Implementations must deliver bytes in exactly the order they
/// are written, keep the chip selected for the whole transaction and
/// release it in `flush`. Buffering transports push out any pending
/// bytes in `flush`.
///
/// The transport is owned exclusively by one
/// [`Accessor`](crate::access::Accessor) for the session.
///
/// ## Example: minimal implementation
///
/// ```ignore
/// impl Transport for MySpi {
///     fn write(&mut self, bytes: &[u8]) -> Result<()> {
///         self.tx.extend_from_slice(bytes);
///         Ok(())
///     }
///
///     fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
///         self.transfer(&self.tx, buf)?;
///         Ok(buf.len())
///     }
///
///     fn irq_asserted(&mut self) -> Result<bool> {
///         Ok(self.int_pin.is_low())
///     }
///
///     fn flush(&mut self) -> Result<()> {
///         self.finish_transfer()
///     }
///
///     fn delay_us(&mut self, us: u32) {
///         self.timer.delay_us(us)
///     }
/// }
/// ```
pub trait Transport {
    /// Send bytes as part of the current transaction
    fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Receive bytes as part of the current transaction
    ///
    /// Returns the number of bytes received.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Query the chip's interrupt line (active low on the wire)
    fn irq_asserted(&mut self) -> Result<bool>;

    /// Complete the current transaction
    fn flush(&mut self) -> Result<()>;

    /// Delay for the specified number of microseconds
    fn delay_us(&mut self, us: u32);

    /// The chip's system clock (PLL) is now running
    ///
    /// The chip only accepts a slow bus clock until then. Transports that
    /// can go faster switch here; the default does nothing.
    fn raise_clock(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write(bytes)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read(buf)
    }

    fn irq_asserted(&mut self) -> Result<bool> {
        (**self).irq_asserted()
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }

    fn raise_clock(&mut self) -> Result<()> {
        (**self).raise_clock()
    }
}

// Blanket impl for boxed transports to allow trait objects
#[cfg(feature = "alloc")]
impl Transport for alloc::boxed::Box<dyn Transport + Send> {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write(bytes)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read(buf)
    }

    fn irq_asserted(&mut self) -> Result<bool> {
        (**self).irq_asserted()
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }

    fn raise_clock(&mut self) -> Result<()> {
        (**self).raise_clock()
    }
}
