//! Display list opcodes and the display list writer
//!
//! Display list words are opaque 32-bit values as far as the writers are
//! concerned. The encoders here build the common ones; anything else can be
//! passed as a raw word.
//!
//! Display list memory is *not* circular. [`DisplayList::append`] rejects
//! writes past the end of the region instead of wrapping.

use crate::access::Accessor;
use crate::bus::Transport;
use crate::chip::ChipMap;
use crate::error::{Error, Result};
use bitflags::bitflags;

// ============================================================================
// Opcodes
// ============================================================================

/// End of display list
pub const DISPLAY: u32 = 0x00 << 24;
/// Set clear color (low 24 bits RGB)
pub const CLEAR_COLOR_RGB: u32 = 0x02 << 24;
/// Set current color (low 24 bits RGB)
pub const COLOR_RGB: u32 = 0x04 << 24;
/// Set point radius (1/16 pixel units)
pub const POINT_SIZE: u32 = 0x0D << 24;
/// Set line width (1/16 pixel units)
pub const LINE_WIDTH: u32 = 0x0E << 24;
/// Begin drawing a primitive
pub const BEGIN: u32 = 0x1F << 24;
/// End drawing a primitive
pub const END: u32 = 0x21 << 24;
/// Clear buffers
pub const CLEAR: u32 = 0x26 << 24;
/// Vertex with 1/16 pixel precision
pub const VERTEX2F: u32 = 0x1 << 30;
/// Vertex with integer coordinates, bitmap handle and cell
pub const VERTEX2II: u32 = 0x2 << 30;

bitflags! {
    /// Buffers cleared by [`clear`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u32 {
        /// Tag buffer
        const TAG     = 1 << 0;
        /// Stencil buffer
        const STENCIL = 1 << 1;
        /// Color buffer
        const COLOR   = 1 << 2;

        /// Everything
        const ALL = Self::TAG.bits() | Self::STENCIL.bits() | Self::COLOR.bits();
    }
}

/// Graphics primitive for [`begin`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Primitive {
    /// Bitmaps
    Bitmaps = 1,
    /// Anti-aliased points
    Points = 2,
    /// Lines
    Lines = 3,
    /// Connected line strip
    LineStrip = 4,
    /// Rectangles
    Rects = 9,
}

/// `CLEAR_COLOR_RGB`
pub const fn clear_color_rgb(rgb: u32) -> u32 {
    CLEAR_COLOR_RGB | (rgb & 0xFF_FFFF)
}

/// `CLEAR`
pub const fn clear(flags: ClearFlags) -> u32 {
    CLEAR | flags.bits()
}

/// `COLOR_RGB`
pub const fn color_rgb(rgb: u32) -> u32 {
    COLOR_RGB | (rgb & 0xFF_FFFF)
}

/// `POINT_SIZE`, radius in 1/16 pixel
pub const fn point_size(size: u32) -> u32 {
    POINT_SIZE | (size & 0x1FFF)
}

/// `LINE_WIDTH`, width in 1/16 pixel
pub const fn line_width(width: u32) -> u32 {
    LINE_WIDTH | (width & 0xFFF)
}

/// `BEGIN`
pub const fn begin(prim: Primitive) -> u32 {
    BEGIN | prim as u32
}

/// `END`
pub const fn end() -> u32 {
    END
}

/// `DISPLAY`
pub const fn display() -> u32 {
    DISPLAY
}

/// `VERTEX2F`, coordinates in 1/16 pixel (15-bit signed)
pub const fn vertex2f(x: i32, y: i32) -> u32 {
    VERTEX2F | ((x as u32 & 0x7FFF) << 15) | (y as u32 & 0x7FFF)
}

/// `VERTEX2II`
pub const fn vertex2ii(x: u16, y: u16, handle: u8, cell: u8) -> u32 {
    VERTEX2II
        | ((x as u32 & 0x1FF) << 21)
        | ((y as u32 & 0x1FF) << 12)
        | ((handle as u32 & 0x1F) << 7)
        | (cell as u32 & 0x7F)
}

// ============================================================================
// Writer
// ============================================================================

/// Value written to the swap register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SwapMode {
    /// Swap after the current scan line
    Line = 1,
    /// Swap after the current frame
    Frame = 2,
}

/// Direct writer for display list memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayList {
    base: u32,
    capacity: u32,
    reg_dlswap: u32,
}

impl DisplayList {
    /// Display list region of the given chip
    pub fn new(map: &ChipMap) -> Self {
        Self {
            base: map.ram_dl,
            capacity: map.ram_dl_size,
            reg_dlswap: map.reg_dlswap,
        }
    }

    /// Base address of display list memory
    pub fn base(&self) -> u32 {
        self.base
    }

    /// Size of display list memory in bytes
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Write `word` at `offset` and return the offset of the next word
    ///
    /// Returns [`Error::DisplayListOverflow`] without touching the bus if
    /// the word would not fit. Transport failures are latched in the
    /// accessor as usual, so check [`Accessor::checkpoint`] after a batch.
    pub fn append<T: Transport>(
        &self,
        acc: &mut Accessor<T>,
        offset: u32,
        word: u32,
    ) -> Result<u32> {
        match offset.checked_add(4) {
            Some(next) if next <= self.capacity => {
                acc.write32(self.base + offset, word);
                Ok(next)
            }
            _ => Err(Error::DisplayListOverflow {
                offset,
                capacity: self.capacity,
            }),
        }
    }

    /// Append several words starting at `offset`
    pub fn append_all<T: Transport>(
        &self,
        acc: &mut Accessor<T>,
        mut offset: u32,
        words: &[u32],
    ) -> Result<u32> {
        for &word in words {
            offset = self.append(acc, offset, word)?;
        }
        Ok(offset)
    }

    /// Trigger a display list swap
    pub fn swap<T: Transport>(&self, acc: &mut Accessor<T>, mode: SwapMode) {
        acc.write32(self.reg_dlswap, mode as u32);
    }
}
