//! List command implementation

use crate::transports;

/// List all transports compiled into this binary
pub fn list_transports() {
    println!("{}", transports::transport_help().trim_end());
    println!();
    println!("Usage: rft8xx <command> -t <name>[:key=value,...]");
}
