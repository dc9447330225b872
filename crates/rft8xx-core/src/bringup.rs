//! Chip bring-up helpers
//!
//! One-shot startup steps run after the power-down pin has been cycled:
//! clock selection, identification, display timing, the first display list
//! and backlight. Every step issues its whole block of register accesses
//! and then reports the accessor's latched error, if any.

use crate::access::Accessor;
use crate::bus::Transport;
use crate::chip::ChipMap;
use crate::dl::{self, ClearFlags, DisplayList, SwapMode};
use crate::error::{Error, Result};
use crate::fifo::CommandFifo;
use crate::host::HostCommand;

/// Settle time after each host command
pub const HOST_COMMAND_DELAY_US: u32 = 5_000;

/// Delay between backlight duty steps
pub const BACKLIGHT_STEP_DELAY_US: u32 = 5_000;

/// Highest backlight duty the PWM accepts
pub const MAX_BACKLIGHT_DUTY: u8 = 128;

/// GPIO bit driving the panel's DISP line
const GPIO_DISP: u8 = 0x80;

/// Where the system clock comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockSource {
    /// Internal relaxation oscillator
    Internal,
    /// External 12 MHz crystal
    #[default]
    External,
}

/// PLL output frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PllFrequency {
    /// 36 MHz
    Mhz36,
    /// 48 MHz
    #[default]
    Mhz48,
}

impl PllFrequency {
    fn host_command(self) -> HostCommand {
        match self {
            PllFrequency::Mhz36 => HostCommand::Clock36M,
            PllFrequency::Mhz48 => HostCommand::Clock48M,
        }
    }
}

/// Panel timing, in pixel clocks and lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayTiming {
    /// Active width
    pub width: u16,
    /// Active height
    pub height: u16,
    /// Total clocks per line
    pub hcycle: u16,
    /// Start of active line
    pub hoffset: u16,
    /// Start of horizontal sync pulse
    pub hsync0: u16,
    /// End of horizontal sync pulse
    pub hsync1: u16,
    /// Total lines per frame
    pub vcycle: u16,
    /// Start of active screen
    pub voffset: u16,
    /// Start of vertical sync pulse
    pub vsync0: u16,
    /// End of vertical sync pulse
    pub vsync1: u16,
    /// Pixel clock divisor
    pub pclk: u8,
    /// RGB output pin order
    pub swizzle: u8,
    /// Active edge of PCLK
    pub pclk_pol: u8,
}

impl DisplayTiming {
    /// 480x272 panel found on most FT800 evaluation modules
    pub const WQVGA: DisplayTiming = DisplayTiming {
        width: 480,
        height: 272,
        hcycle: 548,
        hoffset: 43,
        hsync0: 0,
        hsync1: 41,
        vcycle: 292,
        voffset: 12,
        vsync0: 0,
        vsync1: 10,
        pclk: 5,
        swizzle: 0,
        pclk_pol: 1,
    };
}

impl Default for DisplayTiming {
    fn default() -> Self {
        Self::WQVGA
    }
}

/// Wake the chip and start its clock
///
/// Sends ACTIVE, then CLKEXT when running from a crystal, then the PLL
/// frequency command, waiting [`HOST_COMMAND_DELAY_US`] after each.
pub fn wake<T: Transport>(
    acc: &mut Accessor<T>,
    clock: ClockSource,
    pll: PllFrequency,
) -> Result<()> {
    log::debug!("bringup: wake ({:?}, {:?})", clock, pll);
    acc.host_command(HostCommand::Active);
    acc.delay_us(HOST_COMMAND_DELAY_US);
    if clock == ClockSource::External {
        acc.host_command(HostCommand::ClockExternal);
        acc.delay_us(HOST_COMMAND_DELAY_US);
    }
    acc.host_command(pll.host_command());
    acc.delay_us(HOST_COMMAND_DELAY_US);
    acc.raise_clock();
    acc.checkpoint()
}

/// Read the identification register and compare it with the map's chip ID
pub fn check_chip_id<T: Transport>(acc: &mut Accessor<T>, map: &ChipMap) -> Result<u8> {
    let id = acc.read8(map.reg_id);
    acc.checkpoint()?;
    if id != map.chip_id {
        return Err(Error::ChipIdMismatch {
            expected: map.chip_id,
            found: id,
        });
    }
    log::info!("Found {} (id 0x{:02X})", map.name, id);
    Ok(id)
}

/// Program display timing with the pixel clock and backlight off
pub fn configure_display<T: Transport>(
    acc: &mut Accessor<T>,
    map: &ChipMap,
    timing: &DisplayTiming,
) -> Result<()> {
    log::debug!(
        "bringup: configure {}x{} display",
        timing.width,
        timing.height
    );
    acc.write8(map.reg_pclk, 0);
    acc.write8(map.reg_pwm_duty, 0);

    acc.write16(map.reg_hsize, timing.width);
    acc.write16(map.reg_hcycle, timing.hcycle);
    acc.write16(map.reg_hoffset, timing.hoffset);
    acc.write16(map.reg_hsync0, timing.hsync0);
    acc.write16(map.reg_hsync1, timing.hsync1);
    acc.write16(map.reg_vsize, timing.height);
    acc.write16(map.reg_vcycle, timing.vcycle);
    acc.write16(map.reg_voffset, timing.voffset);
    acc.write16(map.reg_vsync0, timing.vsync0);
    acc.write16(map.reg_vsync1, timing.vsync1);
    acc.write8(map.reg_swizzle, timing.swizzle);
    acc.write8(map.reg_pclk_pol, timing.pclk_pol);
    acc.checkpoint()
}

/// Write a black screen display list and swap it in
pub fn write_initial_display_list<T: Transport>(
    acc: &mut Accessor<T>,
    map: &ChipMap,
) -> Result<()> {
    let list = DisplayList::new(map);
    list.append_all(
        acc,
        0,
        &[
            dl::clear_color_rgb(0x00_0000),
            dl::clear(ClearFlags::ALL),
            dl::display(),
        ],
    )?;
    list.swap(acc, SwapMode::Frame);
    acc.checkpoint()
}

/// Raise DISP, start the pixel clock and ramp the backlight up to `duty`
///
/// `duty` is clamped to [`MAX_BACKLIGHT_DUTY`].
pub fn enable_output<T: Transport>(
    acc: &mut Accessor<T>,
    map: &ChipMap,
    timing: &DisplayTiming,
    duty: u8,
) -> Result<()> {
    let gpio = acc.read8(map.reg_gpio);
    acc.write8(map.reg_gpio, gpio | GPIO_DISP);
    acc.write8(map.reg_pclk, timing.pclk);
    for step in 0..=duty.min(MAX_BACKLIGHT_DUTY) {
        acc.write8(map.reg_pwm_duty, step);
        acc.delay_us(BACKLIGHT_STEP_DELAY_US);
    }
    acc.checkpoint()
}

/// Touch screen transform matrix (registers A..F, 16.16 fixed point)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TouchTransform(pub [u32; 6]);

impl TouchTransform {
    /// Coefficients as floating point values
    pub fn coefficients(&self) -> [f32; 6] {
        self.0.map(|raw| raw as i32 as f32 / 65536.0)
    }
}

/// Read the result word `CMD_CALIBRATE` leaves in its operand slot
///
/// `end` is the FIFO offset just past the calibrate command, i.e. the
/// offset that was published. Zero means calibration failed.
pub fn read_calibration_result<T: Transport>(
    acc: &mut Accessor<T>,
    fifo: &CommandFifo,
    end: u32,
) -> Result<u32> {
    let result = fifo.read_word(acc, end.wrapping_sub(4));
    acc.checkpoint()?;
    Ok(result)
}

/// Read the six touch transform registers
pub fn read_touch_transform<T: Transport>(
    acc: &mut Accessor<T>,
    map: &ChipMap,
) -> Result<TouchTransform> {
    let mut matrix = [0u32; 6];
    for (index, value) in matrix.iter_mut().enumerate() {
        *value = acc.read32(map.reg_touch_transform(index as u32));
    }
    acc.checkpoint()?;
    Ok(TouchTransform(matrix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::{FT800, FT81X};
    use crate::error::TransportFailure;
    use crate::testing::Recorder;
    use std::vec;
    use std::vec::Vec;

    fn written(rec: &Recorder) -> Vec<Vec<u8>> {
        rec.transactions.iter().map(|t| t.written.clone()).collect()
    }

    #[test]
    fn test_wake_external_clock() {
        let mut acc = Accessor::new(Recorder::new());
        wake(&mut acc, ClockSource::External, PllFrequency::Mhz48).unwrap();
        let rec = acc.into_transport();
        assert_eq!(
            written(&rec),
            vec![vec![0x00, 0, 0], vec![0x44, 0, 0], vec![0x62, 0, 0]]
        );
        assert_eq!(rec.elapsed_us, 3 * HOST_COMMAND_DELAY_US as u64);
        assert_eq!(rec.clock_raises, 1);
    }

    #[test]
    fn test_wake_internal_clock() {
        let mut acc = Accessor::new(Recorder::new());
        wake(&mut acc, ClockSource::Internal, PllFrequency::Mhz36).unwrap();
        let rec = acc.into_transport();
        assert_eq!(written(&rec), vec![vec![0x00, 0, 0], vec![0x61, 0, 0]]);
    }

    #[test]
    fn test_wake_reports_failure() {
        let mut acc = Accessor::new(Recorder::new().fail_writes_after(1));
        let err = wake(&mut acc, ClockSource::External, PllFrequency::Mhz48).unwrap_err();
        assert_eq!(err, Error::Transport(TransportFailure::Write));
        assert_eq!(acc.transport().clock_raises, 0);
    }

    #[test]
    fn test_check_chip_id() {
        let mut acc = Accessor::new(Recorder::new().respond(&[0x7C]));
        assert_eq!(check_chip_id(&mut acc, &FT81X).unwrap(), 0x7C);

        let mut acc = Accessor::new(Recorder::new().respond(&[0x00]));
        assert_eq!(
            check_chip_id(&mut acc, &FT800),
            Err(Error::ChipIdMismatch {
                expected: 0x7C,
                found: 0
            })
        );
    }

    #[test]
    fn test_configure_display_order() {
        let mut acc = Accessor::new(Recorder::new());
        configure_display(&mut acc, &FT800, &DisplayTiming::WQVGA).unwrap();
        let rec = acc.into_transport();
        assert_eq!(rec.transactions.len(), 14);
        // PCLK off first
        assert_eq!(rec.transactions[0].written, vec![0x90, 0x24, 0x6C, 0]);
        // HSIZE = 480
        assert_eq!(rec.transactions[2].written, vec![0x90, 0x24, 0x30, 0xE0, 0x01]);
        // PCLK_POL last
        assert_eq!(rec.transactions[13].written, vec![0x90, 0x24, 0x68, 1]);
    }

    #[test]
    fn test_initial_display_list() {
        let mut acc = Accessor::new(Recorder::new());
        write_initial_display_list(&mut acc, &FT800).unwrap();
        let rec = acc.into_transport();
        assert_eq!(rec.transactions.len(), 4);
        assert_eq!(rec.transactions[1].written, vec![0x90, 0x00, 0x04, 0x07, 0, 0, 0x26]);
        assert_eq!(rec.transactions[3].written, vec![0x90, 0x24, 0x50, 2, 0, 0, 0]);
    }

    #[test]
    fn test_enable_output_ramps_backlight() {
        let mut acc = Accessor::new(Recorder::new().respond(&[0x03]));
        enable_output(&mut acc, &FT800, &DisplayTiming::WQVGA, 200).unwrap();
        let rec = acc.into_transport();
        // GPIO read, GPIO write, PCLK, then 0..=128
        assert_eq!(rec.transactions.len(), 3 + 129);
        assert_eq!(rec.transactions[1].written, vec![0x90, 0x24, 0x90, 0x83]);
        assert_eq!(rec.transactions[2].written, vec![0x90, 0x24, 0x6C, 5]);
        assert_eq!(
            rec.transactions.last().unwrap().written,
            vec![0x90, 0x24, 0xC4, 128]
        );
    }

    #[test]
    fn test_read_touch_transform() {
        let mut bytes = Vec::new();
        for value in [0x0001_0000u32, 0, 0xFFFF_0000, 0, 0x0000_8000, 7] {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        let mut acc = Accessor::new(Recorder::new().respond(&bytes));
        let transform = read_touch_transform(&mut acc, &FT800).unwrap();
        assert_eq!(transform.0[2], 0xFFFF_0000);
        let coefficients = transform.coefficients();
        assert_eq!(coefficients[0], 1.0);
        assert_eq!(coefficients[2], -1.0);
        assert_eq!(coefficients[4], 0.5);

        let rec = acc.into_transport();
        assert_eq!(rec.transactions[5].written, vec![0x10, 0x25, 0x20, 0x00]);
    }

    #[test]
    fn test_calibration_result_wraps() {
        let fifo = CommandFifo::new(&FT800).unwrap();
        let mut acc = Accessor::new(Recorder::new().respond(&[1, 0, 0, 0]));
        assert_eq!(read_calibration_result(&mut acc, &fifo, 0).unwrap(), 1);
        let rec = acc.into_transport();
        // Slot at the last word of the window
        assert_eq!(rec.transactions[0].written, vec![0x10, 0x8F, 0xFC, 0x00]);
    }
}
