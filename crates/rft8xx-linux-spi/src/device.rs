//! Linux SPI device implementation
//!
//! This module provides the `LinuxSpi` struct that implements the
//! `Transport` trait using Linux's spidev interface.

use crate::error::{LinuxSpiError, Result};

use rft8xx_core::bus::Transport;
use rft8xx_core::error::{Error as CoreError, Result as CoreResult, TransportFailure};

use std::fs::{File, OpenOptions};
use std::os::unix::io::AsRawFd;

/// Path to kernel spidev buffer size parameter
const BUF_SIZE_SYSFS: &str = "/sys/module/spidev/parameters/bufsiz";

/// Default SPI clock speed in Hz (2 MHz, safe before the PLL is running)
const DEFAULT_SPEED_HZ: u32 = 2_000_000;

/// SPI mode constants
pub mod mode {
    /// SPI mode 0: CPOL=0, CPHA=0
    pub const MODE_0: u8 = 0;
    /// SPI mode 1: CPOL=0, CPHA=1
    pub const MODE_1: u8 = 1;
    /// SPI mode 2: CPOL=1, CPHA=0
    pub const MODE_2: u8 = 2;
    /// SPI mode 3: CPOL=1, CPHA=1
    pub const MODE_3: u8 = 3;
}

/// Linux spidev ioctl constants
mod ioctl {
    use nix::ioctl_write_ptr;

    // SPI ioctl magic number
    const SPI_IOC_MAGIC: u8 = b'k';

    // SPI ioctl type numbers
    const SPI_IOC_TYPE_MODE: u8 = 1;
    const SPI_IOC_TYPE_BITS_PER_WORD: u8 = 3;
    const SPI_IOC_TYPE_MAX_SPEED_HZ: u8 = 4;

    ioctl_write_ptr!(spi_ioc_wr_mode, SPI_IOC_MAGIC, SPI_IOC_TYPE_MODE, u8);
    ioctl_write_ptr!(
        spi_ioc_wr_bits_per_word,
        SPI_IOC_MAGIC,
        SPI_IOC_TYPE_BITS_PER_WORD,
        u8
    );
    ioctl_write_ptr!(
        spi_ioc_wr_max_speed_hz,
        SPI_IOC_MAGIC,
        SPI_IOC_TYPE_MAX_SPEED_HZ,
        u32
    );

    // SPI_IOC_MESSAGE(n) = _IOW(SPI_IOC_MAGIC, 0, char[n * sizeof(struct spi_ioc_transfer)])

    /// Size of struct spi_ioc_transfer
    pub const SPI_IOC_TRANSFER_SIZE: usize = 32;

    /// Calculate ioctl number for SPI_IOC_MESSAGE(n)
    pub fn spi_ioc_message(n: u8) -> libc::c_ulong {
        let size = (n as usize) * SPI_IOC_TRANSFER_SIZE;
        ((1u32 << 30) | ((size as u32) << 16) | ((SPI_IOC_MAGIC as u32) << 8)) as libc::c_ulong
    }
}

/// SPI transfer structure for ioctl
/// This must match the kernel's struct spi_ioc_transfer layout
#[repr(C)]
#[derive(Debug, Default, Clone)]
struct SpiIocTransfer {
    tx_buf: u64,          // __u64 tx_buf
    rx_buf: u64,          // __u64 rx_buf
    len: u32,             // __u32 len
    speed_hz: u32,        // __u32 speed_hz
    delay_usecs: u16,     // __u16 delay_usecs
    bits_per_word: u8,    // __u8 bits_per_word
    cs_change: u8,        // __u8 cs_change
    tx_nbits: u8,         // __u8 tx_nbits
    rx_nbits: u8,         // __u8 rx_nbits
    word_delay_usecs: u8, // __u8 word_delay_usecs
    _pad: u8,             // padding
}

/// Configuration for opening a Linux SPI device
#[derive(Debug, Clone)]
pub struct LinuxSpiConfig {
    /// Device path (e.g., "/dev/spidev0.0")
    pub device: String,
    /// SPI clock speed in Hz (default: 2 MHz)
    pub speed_hz: u32,
    /// SPI mode (0-3, default: 0)
    pub mode: u8,
    /// Clock speed in Hz to switch to once the chip's PLL is running
    pub fast_speed_hz: Option<u32>,
}

impl Default for LinuxSpiConfig {
    fn default() -> Self {
        Self {
            device: String::new(),
            speed_hz: DEFAULT_SPEED_HZ,
            mode: mode::MODE_0,
            fast_speed_hz: None,
        }
    }
}

impl LinuxSpiConfig {
    /// Create a new configuration with the given device path
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            ..Default::default()
        }
    }

    /// Set the SPI clock speed in Hz
    pub fn with_speed(mut self, speed_hz: u32) -> Self {
        self.speed_hz = speed_hz;
        self
    }

    /// Set the SPI mode (0-3)
    pub fn with_mode(mut self, mode: u8) -> Self {
        self.mode = mode;
        self
    }

    /// Set the clock speed in Hz used after the chip's PLL is running
    pub fn with_fast_speed(mut self, speed_hz: u32) -> Self {
        self.fast_speed_hz = Some(speed_hz);
        self
    }
}

/// Chip transport over a spidev device
///
/// Bytes passed to [`Transport::write`] are buffered until the transaction
/// completes, so that chip select stays asserted for the whole
/// header + payload sequence.
pub struct LinuxSpi {
    /// File handle for spidev device
    file: File,
    /// Maximum kernel buffer size
    max_kernel_buf_size: usize,
    /// Current speed in Hz
    speed_hz: u32,
    /// Speed to switch to in `raise_clock`
    fast_speed_hz: Option<u32>,
    /// Bytes of the transaction in progress
    tx: Vec<u8>,
}

impl LinuxSpi {
    /// Open a Linux SPI device with the given configuration
    pub fn open(config: &LinuxSpiConfig) -> Result<Self> {
        if config.device.is_empty() {
            return Err(LinuxSpiError::NoDevice);
        }

        log::debug!("linux_spi: Opening device {}", config.device);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&config.device)
            .map_err(|e| LinuxSpiError::OpenFailed {
                path: config.device.clone(),
                source: e,
            })?;

        let fd = file.as_raw_fd();

        let mode = config.mode;
        unsafe {
            ioctl::spi_ioc_wr_mode(fd, &mode).map_err(|e| LinuxSpiError::SetModeFailed {
                mode,
                source: std::io::Error::from_raw_os_error(e as i32),
            })?;
        }

        let bits: u8 = 8;
        unsafe {
            ioctl::spi_ioc_wr_bits_per_word(fd, &bits).map_err(|e| {
                LinuxSpiError::SetBitsPerWordFailed {
                    bits,
                    source: std::io::Error::from_raw_os_error(e as i32),
                }
            })?;
        }

        let speed = config.speed_hz;
        unsafe {
            ioctl::spi_ioc_wr_max_speed_hz(fd, &speed).map_err(|e| {
                LinuxSpiError::SetSpeedFailed {
                    speed,
                    source: std::io::Error::from_raw_os_error(e as i32),
                }
            })?;
        }

        log::info!(
            "linux_spi: Opened {} (mode={}, speed={} kHz)",
            config.device,
            mode,
            speed / 1000
        );

        let max_kernel_buf_size = get_max_kernel_buf_size();
        log::debug!(
            "linux_spi: Max kernel buffer size: {} bytes",
            max_kernel_buf_size
        );

        Ok(Self {
            file,
            max_kernel_buf_size,
            speed_hz: speed,
            fast_speed_hz: config.fast_speed_hz,
            tx: Vec::with_capacity(64),
        })
    }

    /// Get current speed setting
    pub fn speed_hz(&self) -> u32 {
        self.speed_hz
    }

    /// Set a new SPI clock speed
    ///
    /// The chip accepts faster clocks once its PLL is running.
    pub fn set_speed(&mut self, speed_hz: u32) -> Result<()> {
        let fd = self.file.as_raw_fd();
        unsafe {
            ioctl::spi_ioc_wr_max_speed_hz(fd, &speed_hz).map_err(|e| {
                LinuxSpiError::SetSpeedFailed {
                    speed: speed_hz,
                    source: std::io::Error::from_raw_os_error(e as i32),
                }
            })?;
        }
        self.speed_hz = speed_hz;
        log::debug!("linux_spi: Set speed to {} Hz", speed_hz);
        Ok(())
    }

    fn transfer_for(&self, tx: &[u8], rx: &mut [u8]) -> SpiIocTransfer {
        SpiIocTransfer {
            tx_buf: if tx.is_empty() { 0 } else { tx.as_ptr() as u64 },
            rx_buf: if rx.is_empty() { 0 } else { rx.as_mut_ptr() as u64 },
            len: (tx.len() + rx.len()) as u32,
            speed_hz: self.speed_hz,
            bits_per_word: 8,
            ..Default::default()
        }
    }

    /// Clock out `write_data`, then clock in `read_buf`, in one message
    fn spi_transfer(&mut self, write_data: &[u8], read_buf: &mut [u8]) -> Result<()> {
        let len = write_data.len() + read_buf.len();
        if len > self.max_kernel_buf_size {
            return Err(LinuxSpiError::TransactionTooLong {
                len,
                max: self.max_kernel_buf_size,
            });
        }

        let mut transfers = vec![self.transfer_for(write_data, &mut [])];
        if !read_buf.is_empty() {
            transfers.push(self.transfer_for(&[], read_buf));
        }

        let ioctl_num = ioctl::spi_ioc_message(transfers.len() as u8);
        let ret = unsafe { libc::ioctl(self.file.as_raw_fd(), ioctl_num, transfers.as_ptr()) };
        if ret < 0 {
            return Err(LinuxSpiError::TransferFailed(
                std::io::Error::last_os_error(),
            ));
        }
        Ok(())
    }
}

impl Transport for LinuxSpi {
    fn write(&mut self, bytes: &[u8]) -> CoreResult<()> {
        self.tx.extend_from_slice(bytes);
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> CoreResult<usize> {
        let tx = std::mem::take(&mut self.tx);
        let result = self.spi_transfer(&tx, buf);
        self.tx = tx;
        self.tx.clear();
        result.map_err(|e| {
            log::error!("linux_spi: {}", e);
            CoreError::Transport(TransportFailure::Read)
        })?;
        Ok(buf.len())
    }

    fn irq_asserted(&mut self) -> CoreResult<bool> {
        Ok(false)
    }

    fn flush(&mut self) -> CoreResult<()> {
        if self.tx.is_empty() {
            return Ok(());
        }
        let tx = std::mem::take(&mut self.tx);
        let result = self.spi_transfer(&tx, &mut []);
        self.tx = tx;
        self.tx.clear();
        result.map_err(|e| {
            log::error!("linux_spi: {}", e);
            CoreError::Transport(TransportFailure::Flush)
        })
    }

    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(std::time::Duration::from_micros(us as u64));
    }

    fn raise_clock(&mut self) -> CoreResult<()> {
        let Some(speed_hz) = self.fast_speed_hz else {
            return Ok(());
        };
        self.set_speed(speed_hz).map_err(|e| {
            log::error!("linux_spi: {}", e);
            CoreError::Transport(TransportFailure::Io)
        })
    }
}

/// Read the maximum kernel buffer size from sysfs, or use page size as fallback
fn get_max_kernel_buf_size() -> usize {
    if let Ok(content) = std::fs::read_to_string(BUF_SIZE_SYSFS) {
        if let Ok(size) = content.trim().parse::<usize>() {
            if size > 0 {
                log::debug!("linux_spi: Using buffer size {} from sysfs", size);
                return size;
            }
        }
        log::warn!("linux_spi: Invalid buffer size in {}", BUF_SIZE_SYSFS);
    } else {
        log::debug!("linux_spi: Cannot read {}, using page size", BUF_SIZE_SYSFS);
    }

    let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) } as usize;
    log::debug!("linux_spi: Using page size {} as buffer size", page_size);
    page_size
}

/// Parse transport options from a list of key-value pairs
pub fn parse_options(options: &[(&str, &str)]) -> Result<LinuxSpiConfig> {
    let mut config = LinuxSpiConfig::default();

    for (key, value) in options {
        match *key {
            "dev" => {
                config.device = value.to_string();
            }
            "spispeed" => {
                config.speed_hz = parse_speed_khz(key, value)?;
            }
            "fastspeed" => {
                config.fast_speed_hz = Some(parse_speed_khz(key, value)?);
            }
            "mode" => {
                let mode: u8 = value.parse().map_err(|_| {
                    LinuxSpiError::InvalidParameter(format!("Invalid mode value: {}", value))
                })?;
                if mode > 3 {
                    return Err(LinuxSpiError::InvalidParameter(format!(
                        "Invalid SPI mode: {} (must be 0-3)",
                        mode
                    )));
                }
                config.mode = mode;
            }
            _ => {
                log::warn!("linux_spi: Unknown option: {}={}", key, value);
            }
        }
    }

    if config.device.is_empty() {
        return Err(LinuxSpiError::NoDevice);
    }

    Ok(config)
}

/// Parse a speed given in kHz into Hz
fn parse_speed_khz(key: &str, value: &str) -> Result<u32> {
    value
        .parse::<u32>()
        .ok()
        .and_then(|khz| khz.checked_mul(1000))
        .filter(|&hz| hz > 0)
        .ok_or_else(|| LinuxSpiError::InvalidParameter(format!("Invalid {} value: {}", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options() {
        let config = parse_options(&[("dev", "/dev/spidev1.0"), ("spispeed", "8000"), ("mode", "3")])
            .unwrap();
        assert_eq!(config.device, "/dev/spidev1.0");
        assert_eq!(config.speed_hz, 8_000_000);
        assert_eq!(config.mode, mode::MODE_3);
    }

    #[test]
    fn test_parse_options_defaults() {
        let config = parse_options(&[("dev", "/dev/spidev0.0")]).unwrap();
        assert_eq!(config.speed_hz, DEFAULT_SPEED_HZ);
        assert_eq!(config.mode, mode::MODE_0);
    }

    #[test]
    fn test_parse_options_errors() {
        assert!(matches!(parse_options(&[]), Err(LinuxSpiError::NoDevice)));
        assert!(matches!(
            parse_options(&[("dev", "/dev/spidev0.0"), ("mode", "4")]),
            Err(LinuxSpiError::InvalidParameter(_))
        ));
        assert!(parse_options(&[("dev", "/dev/spidev0.0"), ("spispeed", "fast")]).is_err());
        assert!(parse_options(&[("dev", "/dev/spidev0.0"), ("spispeed", "0")]).is_err());
    }

    #[test]
    fn test_parse_options_speed_overflow() {
        let err = parse_options(&[("dev", "/dev/spidev0.0"), ("spispeed", "4294968")]).unwrap_err();
        assert!(matches!(err, LinuxSpiError::InvalidParameter(_)));
        assert_eq!(err.to_string(), "Invalid parameter: Invalid spispeed value: 4294968");

        // Largest speed that still fits in Hz
        let config = parse_options(&[("dev", "/dev/spidev0.0"), ("spispeed", "4294967")]).unwrap();
        assert_eq!(config.speed_hz, 4_294_967_000);
    }

    #[test]
    fn test_parse_options_fast_speed() {
        let config =
            parse_options(&[("dev", "/dev/spidev0.0"), ("fastspeed", "20000")]).unwrap();
        assert_eq!(config.speed_hz, DEFAULT_SPEED_HZ);
        assert_eq!(config.fast_speed_hz, Some(20_000_000));

        let config = parse_options(&[("dev", "/dev/spidev0.0")]).unwrap();
        assert_eq!(config.fast_speed_hz, None);
        assert!(parse_options(&[("dev", "/dev/spidev0.0"), ("fastspeed", "99999999")]).is_err());
    }

    #[test]
    fn test_ioctl_message_number() {
        // _IOW('k', 0, char[64])
        assert_eq!(ioctl::spi_ioc_message(2), 0x4040_6B00);
    }
}
