//! Probe command implementation

use crate::session::Session;
use rft8xx_core::bringup;

/// Wake the chip and print its identification and memory layout
pub fn run_probe(session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
    session.wake()?;
    let id = bringup::check_chip_id(&mut session.acc, session.map)?;
    let map = session.map;

    println!("Found {} chip:", map.name);
    println!("  Chip ID:  0x{:02X}", id);
    println!(
        "  RAM_DL:   0x{:06X} ({} KiB)",
        map.ram_dl,
        map.ram_dl_size / 1024
    );
    println!(
        "  RAM_CMD:  0x{:06X} ({} KiB FIFO)",
        map.ram_cmd,
        map.cmd_fifo_size / 1024
    );
    println!(
        "  FIFO:     read 0x{:03X}, write 0x{:03X}",
        session.fifo.read_pointer(&mut session.acc),
        session.fifo.write_pointer(&mut session.acc)
    );
    session.acc.checkpoint()?;
    Ok(())
}
