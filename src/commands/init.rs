//! Init command implementation

use crate::session::Session;
use rft8xx_core::bringup::{self, DisplayTiming};

/// Bring up the chip, configure the display and turn on the backlight
pub fn run_init(session: &mut Session, backlight: u8) -> Result<(), Box<dyn std::error::Error>> {
    let timing = DisplayTiming::WQVGA;
    let map = session.map;

    log::info!("Waking chip...");
    session.wake()?;

    let acc = &mut session.acc;
    bringup::check_chip_id(acc, map)?;

    log::info!("Configuring {}x{} display...", timing.width, timing.height);
    bringup::configure_display(acc, map, &timing)?;

    log::info!("Writing initial display list...");
    bringup::write_initial_display_list(acc, map)?;

    log::info!("Enabling output (backlight {})...", backlight);
    bringup::enable_output(acc, map, &timing, backlight)?;

    println!(
        "{} ready: {}x{}, backlight {}",
        map.name, timing.width, timing.height, backlight
    );
    Ok(())
}

#[cfg(all(test, feature = "sim"))]
mod tests {
    use super::*;
    use crate::session::sim_session;

    #[test]
    fn test_init_sim() {
        let mut session = sim_session();
        run_init(&mut session, 64).unwrap();
        assert!(!session.acc.is_poisoned());
    }
}
