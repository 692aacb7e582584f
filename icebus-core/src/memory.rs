//! In-device memory pointer encoding
//!
//! Register and memory transfers prefix the data with the target memory
//! address (the "pointer"). Devices take either a one-byte or a two-byte
//! pointer; two-byte pointers go out big-endian.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum data bytes in a single memory write (SMBus block limit)
pub const MAX_MEM_DATA: usize = 32;

/// Width of the in-device memory address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MemAddrWidth {
    /// One pointer byte (registers 0x00-0xFF)
    #[default]
    Bits8,
    /// Two pointer bytes, sent big-endian
    Bits16,
}

impl MemAddrWidth {
    /// Pointer width in bits
    pub const fn bits(self) -> u8 {
        match self {
            MemAddrWidth::Bits8 => 8,
            MemAddrWidth::Bits16 => 16,
        }
    }

    /// Pointer width in bytes on the wire
    pub const fn len(self) -> usize {
        match self {
            MemAddrWidth::Bits8 => 1,
            MemAddrWidth::Bits16 => 2,
        }
    }

    /// Encode `memaddr` at this width
    ///
    /// Returns `None` when the address does not fit (an 8-bit pointer
    /// cannot carry a value above 0xFF). Never truncates.
    pub fn encode(self, memaddr: u16) -> Option<Pointer> {
        match self {
            MemAddrWidth::Bits8 => {
                if memaddr > 0xFF {
                    return None;
                }
                Some(Pointer {
                    bytes: [memaddr as u8, 0],
                    len: 1,
                })
            }
            MemAddrWidth::Bits16 => Some(Pointer {
                bytes: memaddr.to_be_bytes(),
                len: 2,
            }),
        }
    }
}

/// An encoded memory pointer, ready to lead a transfer frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pointer {
    bytes: [u8; 2],
    len: usize,
}

impl Pointer {
    /// The pointer bytes in wire order
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}
