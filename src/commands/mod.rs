//! CLI command implementations
//!
//! Every command except `list-transports` runs against an open
//! [`Session`](crate::session::Session). Commands issue their register
//! accesses in blocks and check the accessor's latched error at the end of
//! each block.

mod calibrate;
mod demo;
mod host;
mod init;
mod list;
mod probe;

pub use calibrate::run_calibrate;
pub use demo::run_demo;
pub use host::run_host_cmd;
pub use init::run_init;
pub use list::list_transports;
pub use probe::run_probe;
