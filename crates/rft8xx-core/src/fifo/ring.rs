//! Circular memory access
//!
//! All offset arithmetic for the command FIFO lives here. Writes that cross
//! the end of the window are split so that the trailing bytes land at the
//! start of the window, not past its end.

use crate::access::Accessor;
use crate::bus::Transport;

/// Write `bytes` into the circular window `[base, base + capacity)`
/// starting at `offset` (taken modulo `capacity`)
///
/// `capacity` must be a power of two and `bytes` no longer than `capacity`.
pub fn write_wrapped<T: Transport>(
    acc: &mut Accessor<T>,
    base: u32,
    capacity: u32,
    offset: u32,
    bytes: &[u8],
) {
    debug_assert!(capacity.is_power_of_two());
    debug_assert!(bytes.len() <= capacity as usize);

    let start = offset & (capacity - 1);
    let tail = core::cmp::min(bytes.len(), (capacity - start) as usize);
    acc.write_bytes(base + start, &bytes[..tail]);
    if tail < bytes.len() {
        acc.write_bytes(base, &bytes[tail..]);
    }
}

/// Read `buf.len()` bytes from the circular window starting at `offset`
pub fn read_wrapped<T: Transport>(
    acc: &mut Accessor<T>,
    base: u32,
    capacity: u32,
    offset: u32,
    buf: &mut [u8],
) {
    debug_assert!(capacity.is_power_of_two());
    debug_assert!(buf.len() <= capacity as usize);

    let start = offset & (capacity - 1);
    let tail = core::cmp::min(buf.len(), (capacity - start) as usize);
    let (first, rest) = buf.split_at_mut(tail);
    acc.read_bytes(base + start, first);
    if !rest.is_empty() {
        acc.read_bytes(base, rest);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Recorder;
    use std::vec;

    #[test]
    fn test_write_split_at_end() {
        let mut acc = Accessor::new(Recorder::new());
        write_wrapped(&mut acc, 0x10_8000, 4096, 4094, &[0x11, 0x22, 0x33, 0x44]);

        let rec = acc.into_transport();
        assert_eq!(rec.transactions.len(), 2);
        assert_eq!(rec.transactions[0].written, vec![0x90, 0x8F, 0xFE, 0x11, 0x22]);
        assert_eq!(rec.transactions[1].written, vec![0x90, 0x80, 0x00, 0x33, 0x44]);
    }

    #[test]
    fn test_write_no_split() {
        let mut acc = Accessor::new(Recorder::new());
        // Offset beyond capacity is reduced first
        write_wrapped(&mut acc, 0x10_8000, 4096, 4096 + 8, &[1, 2, 3, 4]);
        let rec = acc.into_transport();
        assert_eq!(rec.transactions.len(), 1);
        assert_eq!(rec.transactions[0].written, vec![0x90, 0x80, 0x08, 1, 2, 3, 4]);
    }

    #[test]
    fn test_read_split_at_end() {
        let mut acc = Accessor::new(Recorder::new().respond(&[0xAA, 0xBB, 0xCC, 0xDD]));
        let mut buf = [0u8; 4];
        read_wrapped(&mut acc, 0x10_8000, 4096, 4093, &mut buf);
        assert_eq!(buf, [0xAA, 0xBB, 0xCC, 0xDD]);

        let rec = acc.into_transport();
        assert_eq!(rec.transactions[0].written, vec![0x10, 0x8F, 0xFD, 0x00]);
        assert_eq!(rec.transactions[0].read_len, 3);
        assert_eq!(rec.transactions[1].written, vec![0x10, 0x80, 0x00, 0x00]);
        assert_eq!(rec.transactions[1].read_len, 1);
    }
}
