//! Command FIFO writer

use super::ring;
use crate::access::Accessor;
use crate::bus::Transport;
use crate::chip::ChipMap;
use crate::cmd::{self, TextOptions};
use crate::error::{Error, Result};
use crate::sync::{self, DrainPolicy, DrainTarget};

/// Read pointer value the coprocessor reports after a fault
pub const FIFO_FAULT: u32 = 0xFFF;

/// Bytes of `CMD_TEXT` before the string: opcode, x/y, font/options
pub const TEXT_HEADER_LEN: usize = 12;

/// Smallest window that holds a text command with an empty string
pub const MIN_FIFO_CAPACITY: u32 = 32;

/// Location and size of the command FIFO window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FifoRegion {
    /// Base address of the window
    pub base: u32,
    /// Size in bytes, must be a power of two
    pub capacity: u32,
    /// Read pointer register
    pub reg_read: u32,
    /// Write pointer register
    pub reg_write: u32,
}

impl From<&ChipMap> for FifoRegion {
    fn from(map: &ChipMap) -> Self {
        Self {
            base: map.ram_cmd,
            capacity: map.cmd_fifo_size,
            reg_read: map.reg_cmd_read,
            reg_write: map.reg_cmd_write,
        }
    }
}

/// Appends command words to the chip's command FIFO
///
/// The writer holds only configuration; the host-side write offset is
/// passed in and returned by every append so that the caller decides when
/// to publish. Offsets are always reduced modulo the capacity.
///
/// Appending more than fits between the published write pointer and the
/// chip's read pointer overwrites commands the chip has not consumed yet.
/// The writer does not check for this: wait with
/// [`CommandFifo::wait_drained`] before reusing buffer space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandFifo {
    region: FifoRegion,
}

impl CommandFifo {
    /// Command FIFO of the given chip
    pub fn new(map: &ChipMap) -> Result<Self> {
        Self::with_region(FifoRegion::from(map))
    }

    /// Command FIFO at an explicit location
    ///
    /// Returns [`Error::InvalidFifoCapacity`] unless the capacity is a
    /// power of two of at least [`MIN_FIFO_CAPACITY`] bytes.
    pub fn with_region(region: FifoRegion) -> Result<Self> {
        if !region.capacity.is_power_of_two() || region.capacity < MIN_FIFO_CAPACITY {
            return Err(Error::InvalidFifoCapacity(region.capacity));
        }
        Ok(Self { region })
    }

    /// The configured window
    pub fn region(&self) -> FifoRegion {
        self.region
    }

    /// Size of the FIFO in bytes
    pub fn capacity(&self) -> u32 {
        self.region.capacity
    }

    /// Reduce an offset modulo the capacity
    pub fn wrap(&self, offset: u32) -> u32 {
        offset & (self.region.capacity - 1)
    }

    /// Longest text [`append_text`](Self::append_text) accepts
    pub fn max_text_len(&self) -> usize {
        // Leave room for the header, the terminator and the one word the
        // chip keeps free to tell a full FIFO from an empty one.
        (self.region.capacity as usize).saturating_sub(TEXT_HEADER_LEN + 4 + 1)
    }

    /// Bytes appended but not yet consumed, given both pointers
    pub fn pending(&self, read: u32, write: u32) -> u32 {
        self.wrap(write.wrapping_sub(read))
    }

    // ------------------------------------------------------------------
    // Appending
    // ------------------------------------------------------------------

    /// Write one 32-bit word at `offset` and return the next offset
    ///
    /// A word starting in the last three bytes of the window is split, with
    /// the remaining bytes written at the start of the window.
    pub fn append_word<T: Transport>(&self, acc: &mut Accessor<T>, offset: u32, word: u32) -> u32 {
        ring::write_wrapped(
            acc,
            self.region.base,
            self.region.capacity,
            offset,
            &word.to_le_bytes(),
        );
        self.wrap(offset.wrapping_add(4))
    }

    /// Write an opcode followed by its operand words
    pub fn append_command<T: Transport>(
        &self,
        acc: &mut Accessor<T>,
        offset: u32,
        opcode: u32,
        operands: &[u32],
    ) -> u32 {
        let mut offset = self.append_word(acc, offset, opcode);
        for &operand in operands {
            offset = self.append_word(acc, offset, operand);
        }
        offset
    }

    /// Write raw bytes, NUL terminated and zero padded to a word boundary
    ///
    /// The offset always advances by a multiple of four.
    pub fn append_string<T: Transport>(
        &self,
        acc: &mut Accessor<T>,
        mut offset: u32,
        bytes: &[u8],
    ) -> u32 {
        // One extra byte for the terminator, rounded up to whole words
        let padded = (bytes.len() + 1 + 3) & !3;
        for start in (0..padded).step_by(4) {
            let mut word = [0u8; 4];
            for (i, byte) in word.iter_mut().enumerate() {
                if let Some(&b) = bytes.get(start + i) {
                    *byte = b;
                }
            }
            offset = self.append_word(acc, offset, u32::from_le_bytes(word));
        }
        offset
    }

    /// Write a `CMD_TEXT` command
    ///
    /// Returns [`Error::TextTooLong`] without touching the bus if the text
    /// cannot fit in the FIFO at all.
    #[allow(clippy::too_many_arguments)]
    pub fn append_text<T: Transport>(
        &self,
        acc: &mut Accessor<T>,
        offset: u32,
        x: i16,
        y: i16,
        font: u16,
        options: TextOptions,
        text: &str,
    ) -> Result<u32> {
        let max = self.max_text_len();
        if text.len() > max {
            return Err(Error::TextTooLong {
                len: text.len(),
                max,
            });
        }
        let offset = self.append_command(
            acc,
            offset,
            cmd::CMD_TEXT,
            &[cmd::pack_xy(x, y), cmd::pack_font_options(font, options)],
        );
        Ok(self.append_string(acc, offset, text.as_bytes()))
    }

    // ------------------------------------------------------------------
    // Chip pointers
    // ------------------------------------------------------------------

    /// Make everything below `offset` visible to the coprocessor
    ///
    /// All words up to `offset` must already have been appended. The
    /// accessor completes each transaction before returning, so calling
    /// this after the appends is enough to order the pointer update behind
    /// the data.
    pub fn publish<T: Transport>(&self, acc: &mut Accessor<T>, offset: u32) {
        let offset = self.wrap(offset);
        debug_assert!(offset % 4 == 0, "unaligned FIFO offset 0x{:X}", offset);
        log::debug!("fifo: publish write pointer 0x{:03X}", offset);
        acc.write16(self.region.reg_write, offset as u16);
    }

    /// Current value of the chip's read pointer register
    pub fn read_pointer<T: Transport>(&self, acc: &mut Accessor<T>) -> u32 {
        acc.read16(self.region.reg_read) as u32
    }

    /// Current value of the chip's write pointer register
    pub fn write_pointer<T: Transport>(&self, acc: &mut Accessor<T>) -> u32 {
        acc.read16(self.region.reg_write) as u32
    }

    /// Read back the word at `offset` (wrapped), e.g. a command result slot
    pub fn read_word<T: Transport>(&self, acc: &mut Accessor<T>, offset: u32) -> u32 {
        let mut buf = [0u8; 4];
        ring::read_wrapped(acc, self.region.base, self.region.capacity, offset, &mut buf);
        u32::from_le_bytes(buf)
    }

    /// Block until the coprocessor has drained the FIFO to `target`
    ///
    /// See [`sync::wait_drained`].
    pub fn wait_drained<T: Transport>(
        &self,
        acc: &mut Accessor<T>,
        target: DrainTarget,
        policy: &DrainPolicy<'_>,
    ) -> Result<()> {
        sync::wait_drained(acc, self, target, policy)
    }
}
