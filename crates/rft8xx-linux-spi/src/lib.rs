//! rft8xx-linux-spi - Linux spidev transport
//!
//! This crate connects an FT80x/FT81x chip through the Linux spidev
//! interface at `/dev/spidevX.Y`.
//!
//! # Overview
//!
//! Every chip transaction (header, dummy bytes, payload) must be clocked
//! out with chip select held low, so the transport buffers the bytes it is
//! given and submits them as one `SPI_IOC_MESSAGE` when the transaction is
//! completed: on [`Transport::read`] (header transfer followed by a
//! receive transfer) or on [`Transport::flush`] (write only).
//!
//! # Example
//!
//! ```no_run
//! use rft8xx_core::access::Accessor;
//! use rft8xx_core::chip::FT800;
//! use rft8xx_linux_spi::{LinuxSpi, LinuxSpiConfig};
//!
//! let config = LinuxSpiConfig::new("/dev/spidev0.0").with_speed(8_000_000);
//! let mut acc = Accessor::new(LinuxSpi::open(&config)?);
//! let id = acc.read8(FT800.reg_id);
//! acc.checkpoint()?;
//! println!("chip id: 0x{:02X}", id);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Usage with the rft8xx CLI
//!
//! ```bash
//! rft8xx probe -t linux_spi:dev=/dev/spidev0.0
//! rft8xx init -t linux_spi:dev=/dev/spidev0.0,spispeed=8000
//! rft8xx demo -t linux_spi:dev=/dev/spidev0.0,fastspeed=20000
//! ```
//!
//! # System Requirements
//!
//! - Linux kernel with spidev support enabled (`CONFIG_SPI_SPIDEV`)
//! - Read/write access to `/dev/spidevX.Y`
//!
//! The chip's power-down and interrupt pins are not driven by spidev; the
//! transport reports the interrupt line as never asserted.

pub mod device;
pub mod error;

// Re-exports
pub use device::{mode, parse_options, LinuxSpi, LinuxSpiConfig};
pub use error::{LinuxSpiError, Result};

use rft8xx_core::bus::Transport;

/// Open a Linux SPI device and return a boxed transport
///
/// # Example Options
///
/// - `dev=/dev/spidev0.0` - Required: device path
/// - `spispeed=8000` - Optional: speed in kHz (default: 2000)
/// - `fastspeed=20000` - Optional: speed in kHz once the chip's PLL runs
/// - `mode=0` - Optional: SPI mode 0-3 (default: 0)
pub fn open_linux_spi(
    options: &[(&str, &str)],
) -> std::result::Result<Box<dyn Transport + Send>, Box<dyn std::error::Error>> {
    let config = parse_options(options)?;
    let spi = LinuxSpi::open(&config)?;
    Ok(Box::new(spi))
}
