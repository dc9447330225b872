//! Calibrate command implementation

use crate::error::CliError;
use crate::session::Session;
use rft8xx_core::bringup::{self, DisplayTiming};
use rft8xx_core::cmd::{self, TextOptions};
use rft8xx_core::dl::{self, ClearFlags};
use rft8xx_core::fifo::CommandStream;

const BLACK: u32 = 0x00_0000;
const WHITE: u32 = 0xFF_FFFF;
const DARK_YELLOW: u32 = 0x88_8800;
const LIGHT_YELLOW: u32 = 0xFF_FF33;

/// Run `CMD_CALIBRATE` and print the resulting touch transform
///
/// The coprocessor only finishes once the user has touched all three
/// targets, so the drain wait is unbounded unless `--timeout-ms` is given.
pub fn run_calibrate(session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
    let timing = DisplayTiming::WQVGA;
    let policy = session.drain_policy(None);

    println!("Touch the dots on the screen to calibrate...");
    let end = {
        let mut stream = CommandStream::resume(&mut session.acc, &session.fifo);
        stream
            .word(cmd::CMD_DLSTART)
            .word(dl::clear_color_rgb(BLACK))
            .word(dl::clear(ClearFlags::ALL))
            .word(dl::color_rgb(WHITE));
        stream.text(
            (timing.width / 2) as i16,
            (timing.height / 2) as i16,
            31,
            TextOptions::CENTER,
            "Touch panel calibration",
        )?;
        stream
            .command(cmd::CMD_BGCOLOR, &[DARK_YELLOW])
            .command(cmd::CMD_FGCOLOR, &[LIGHT_YELLOW])
            .command(cmd::CMD_CALIBRATE, &[0]);
        stream.finish(&policy)?;
        stream.offset()
    };

    let result = bringup::read_calibration_result(&mut session.acc, &session.fifo, end)?;
    if result == 0 {
        return Err(CliError::CalibrationFailed.into());
    }

    let transform = bringup::read_touch_transform(&mut session.acc, session.map)?;
    println!("Calibration OK:");
    for (raw, value) in transform.0.iter().zip(transform.coefficients()) {
        println!("  {:>9.2} (0x{:08X})", value, raw);
    }
    Ok(())
}
