//! Coprocessor command opcodes
//!
//! Coprocessor commands are written to the command FIFO. Each starts with a
//! 32-bit opcode in the `0xFFFFFFxx` range, followed by operand words.

use bitflags::bitflags;

/// Start a new display list
pub const CMD_DLSTART: u32 = 0xFFFF_FF00;
/// Swap the current display list
pub const CMD_SWAP: u32 = 0xFFFF_FF01;
/// Trigger interrupt CMDFLAG (operand: delay ms)
pub const CMD_INTERRUPT: u32 = 0xFFFF_FF02;
/// Set widget background color (operand: rgb)
pub const CMD_BGCOLOR: u32 = 0xFFFF_FF09;
/// Set widget foreground color (operand: rgb)
pub const CMD_FGCOLOR: u32 = 0xFFFF_FF0A;
/// Draw text (operands: x/y, font/options, string)
pub const CMD_TEXT: u32 = 0xFFFF_FF0C;
/// Run touch screen calibration (operand: result slot)
pub const CMD_CALIBRATE: u32 = 0xFFFF_FF15;
/// Start an animated spinner
pub const CMD_SPINNER: u32 = 0xFFFF_FF16;
/// Stop spinner/sketch/screensaver
pub const CMD_STOP: u32 = 0xFFFF_FF17;
/// Reset coprocessor state to defaults
pub const CMD_COLDSTART: u32 = 0xFFFF_FF32;

/// Number of fixed operand words following each known opcode
///
/// `CMD_TEXT` is followed by a variable-length string after its two fixed
/// operands. Returns `None` for words that are not coprocessor opcodes
/// (plain display list words, which have no operands).
pub const fn operand_words(opcode: u32) -> Option<usize> {
    match opcode {
        CMD_DLSTART | CMD_SWAP | CMD_STOP | CMD_COLDSTART => Some(0),
        CMD_INTERRUPT | CMD_BGCOLOR | CMD_FGCOLOR | CMD_CALIBRATE => Some(1),
        CMD_TEXT | CMD_SPINNER => Some(2),
        _ => None,
    }
}

bitflags! {
    /// Options for `CMD_TEXT` and other widgets
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextOptions: u16 {
        /// Flat (no 3D effect) widgets
        const FLAT    = 256;
        /// Center horizontally
        const CENTERX = 512;
        /// Center vertically
        const CENTERY = 1024;
        /// Right-justify
        const RIGHTX  = 2048;

        /// Center both ways
        const CENTER = Self::CENTERX.bits() | Self::CENTERY.bits();
    }
}

impl Default for TextOptions {
    fn default() -> Self {
        TextOptions::empty()
    }
}

/// Pack two signed 16-bit coordinates into one operand word (x low)
pub const fn pack_xy(x: i16, y: i16) -> u32 {
    (x as u16 as u32) | ((y as u16 as u32) << 16)
}

/// Pack font handle and options into one operand word (font low)
pub const fn pack_font_options(font: u16, options: TextOptions) -> u32 {
    (font as u32) | ((options.bits() as u32) << 16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_xy() {
        assert_eq!(pack_xy(240, 136), 0x0088_00F0);
        assert_eq!(pack_xy(-1, 2), 0x0002_FFFF);
    }

    #[test]
    fn test_pack_font_options() {
        assert_eq!(pack_font_options(31, TextOptions::CENTER), 0x0600_001F);
    }

    #[test]
    fn test_operand_words() {
        assert_eq!(operand_words(CMD_DLSTART), Some(0));
        assert_eq!(operand_words(CMD_CALIBRATE), Some(1));
        assert_eq!(operand_words(CMD_TEXT), Some(2));
        assert_eq!(operand_words(0x0400_0000), None);
    }
}
