//! Transaction framing
//!
//! Every memory or register access starts with a 3-byte header:
//!
//! ```text
//!   byte 0: [ intent:2 | address[21:16] ]
//!   byte 1: [ address[15:8] ]
//!   byte 2: [ address[7:0] ]
//! ```
//!
//! Read transactions are followed by one or more dummy bytes before the
//! chip starts driving valid data. Payload bytes follow, least significant
//! byte first for multi-byte values.

/// Width of a device address in bits
pub const ADDRESS_BITS: u32 = 22;

/// Highest valid device address
pub const MAX_ADDRESS: u32 = (1 << ADDRESS_BITS) - 1;

/// Upper bound for [`Framing::read_dummy_bytes`]
pub const MAX_DUMMY_BYTES: u8 = 4;

/// Transfer direction encoded in the top two bits of the header
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Intent {
    /// Memory read (`0b00`)
    Read,
    /// Memory write (`0b10`)
    Write,
}

impl Intent {
    /// The two-bit tag placed in header bits 7..6
    pub const fn bits(self) -> u8 {
        match self {
            Self::Read => 0b00,
            Self::Write => 0b10,
        }
    }

    /// Decode the two-bit tag. `0b01` and `0b11` are not memory accesses
    /// (host commands use `0b01`).
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits & 0b11 {
            0b00 => Some(Self::Read),
            0b10 => Some(Self::Write),
            _ => None,
        }
    }
}

/// Encoded 3-byte transaction header
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Header([u8; 3]);

impl Header {
    /// Encode `address` and `intent` into a header
    ///
    /// # Panics
    ///
    /// Panics if `address` does not fit in 22 bits. Register and memory
    /// addresses are constants supplied by the caller, so an out of range
    /// address is a programming error rather than a runtime condition.
    pub fn new(address: u32, intent: Intent) -> Self {
        assert!(
            address <= MAX_ADDRESS,
            "device address 0x{:X} exceeds {} bits",
            address,
            ADDRESS_BITS
        );
        Self([
            (intent.bits() << 6) | ((address >> 16) as u8 & 0x3F),
            (address >> 8) as u8,
            address as u8,
        ])
    }

    /// Raw header bytes, in transmission order
    pub const fn bytes(&self) -> [u8; 3] {
        self.0
    }

    /// Decode a received header back into address and intent
    ///
    /// Returns `None` for headers whose tag is not a memory access.
    pub fn decode(bytes: [u8; 3]) -> Option<(u32, Intent)> {
        let intent = Intent::from_bits(bytes[0] >> 6)?;
        let address =
            (((bytes[0] & 0x3F) as u32) << 16) | ((bytes[1] as u32) << 8) | bytes[2] as u32;
        Some((address, intent))
    }
}

/// Framing parameters for a particular chip/bus combination
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Framing {
    /// Dummy bytes clocked out after a read header before valid data
    pub read_dummy_bytes: u8,
}

impl Default for Framing {
    fn default() -> Self {
        Self {
            read_dummy_bytes: 1,
        }
    }
}

impl Framing {
    /// Create framing with a custom read pipeline delay
    ///
    /// The count is clamped to [`MAX_DUMMY_BYTES`].
    pub fn with_read_dummy_bytes(count: u8) -> Self {
        Self {
            read_dummy_bytes: count.min(MAX_DUMMY_BYTES),
        }
    }

    /// Number of bytes sent before the payload for the given intent
    pub fn header_len(&self, intent: Intent) -> usize {
        match intent {
            Intent::Read => 3 + self.read_dummy_bytes as usize,
            Intent::Write => 3,
        }
    }

    /// Encode the header (and dummy bytes for reads) into `buf`
    ///
    /// Returns the number of bytes written. `buf` must hold at least
    /// `3 + MAX_DUMMY_BYTES` bytes.
    pub fn encode(&self, address: u32, intent: Intent, buf: &mut [u8]) -> usize {
        let len = self.header_len(intent);
        buf[..3].copy_from_slice(&Header::new(address, intent).bytes());
        for byte in &mut buf[3..len] {
            *byte = 0;
        }
        len
    }
}
