//! Flat 64 KiB memory model.

/// Wrapping byte and big-endian word accessors.
pub mod access;

pub use access::{read_u16_be, read_u8, write_u16_be, write_u8, WORD_ACCESS_BYTES};

/// Size in bytes of the flat architectural address space (64 KiB).
pub const ADDRESS_SPACE_BYTES: usize = u16::MAX as usize + 1;

/// Allocates a canonical zeroed 64 KiB address-space backing store.
#[must_use]
pub fn new_address_space() -> Box<[u8]> {
    vec![0; ADDRESS_SPACE_BYTES].into_boxed_slice()
}
