//! Coprocessor command FIFO
//!
//! The command FIFO is a fixed-size circular buffer inside the chip. The
//! host appends command words at its own write offset, publishes the new
//! offset to the write pointer register, and the coprocessor consumes words
//! asynchronously, reporting progress through the read pointer register.
//!
//! - [`ring`] holds the single wraparound primitive every appender uses
//! - [`CommandFifo`] appends words, commands and text at caller-tracked
//!   offsets and publishes them
//! - [`CommandStream`] tracks the offset for a session

pub mod ring;
mod stream;
mod writer;

pub use stream::CommandStream;
pub use writer::{CommandFifo, FifoRegion, FIFO_FAULT, MIN_FIFO_CAPACITY, TEXT_HEADER_LEN};
