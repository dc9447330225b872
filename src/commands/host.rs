//! Host command implementation

use crate::session::Session;
use rft8xx_core::host::HostCommand;

/// Send one host command
pub fn run_host_cmd(
    session: &mut Session,
    command: HostCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    session.acc.host_command(command);
    session.acc.checkpoint()?;
    println!("Sent host command {}", command);
    Ok(())
}
