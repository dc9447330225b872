//! Bus transaction types
//!
//! This module provides the transaction framing used by the chip (a 3-byte
//! address header tagged with the transfer direction) and the transport
//! trait the framed bytes are sent through.

mod framing;
mod transport;

pub use framing::{Framing, Header, Intent, ADDRESS_BITS, MAX_ADDRESS, MAX_DUMMY_BYTES};
pub use transport::Transport;
