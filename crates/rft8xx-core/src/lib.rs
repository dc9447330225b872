//! rft8xx-core - Core protocol library for FT80x/FT81x graphics coprocessors
//!
//! This crate drives an EVE-class graphics chip over a byte-oriented serial
//! bus. It covers the two memory-mapped protocols the chip exposes:
//!
//! - direct register/memory access through framed bus transactions
//!   ([`bus`], [`access`])
//! - the circular command FIFO consumed asynchronously by the chip's
//!   coprocessor ([`fifo`], [`sync`])
//!
//! It is `no_std` compatible; the physical transport is supplied by the
//! caller through the [`bus::Transport`] trait.
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc`)
//! - `alloc` - Enable boxed transports (`Box<dyn Transport + Send>`)
//!
//! # Example
//!
//! ```ignore
//! use rft8xx_core::access::Accessor;
//! use rft8xx_core::chip::FT800;
//! use rft8xx_core::fifo::CommandFifo;
//! use rft8xx_core::sync::{DrainPolicy, DrainTarget};
//! use rft8xx_core::cmd;
//!
//! let mut acc = Accessor::new(transport);
//! let fifo = CommandFifo::new(&FT800)?;
//!
//! let mut offset = 0;
//! offset = fifo.append_word(&mut acc, offset, cmd::CMD_DLSTART);
//! offset = fifo.append_word(&mut acc, offset, cmd::CMD_SWAP);
//! fifo.publish(&mut acc, offset);
//! acc.checkpoint()?;
//! fifo.wait_drained(&mut acc, DrainTarget::Offset(offset), &DrainPolicy::default())?;
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod access;
pub mod bringup;
pub mod bus;
pub mod chip;
pub mod cmd;
pub mod dl;
pub mod error;
pub mod fifo;
pub mod host;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Error, Result, TransportFailure};
