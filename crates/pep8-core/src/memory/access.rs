//! Memory accessors over the 64 KiB backing store.
//!
//! Every accessor takes a 16-bit address, so an access can never leave the
//! address space. The second byte of a word access at `0xFFFF` wraps to
//! `0x0000`.

/// Canonical byte width for architectural 16-bit accesses.
pub const WORD_ACCESS_BYTES: u8 = 2;

/// Reads one byte.
#[must_use]
pub fn read_u8(memory: &[u8], addr: u16) -> u8 {
    memory[usize::from(addr)]
}

/// Writes one byte.
pub fn write_u8(memory: &mut [u8], addr: u16, value: u8) {
    memory[usize::from(addr)] = value;
}

/// Reads a big-endian word (high byte at `addr`).
#[must_use]
pub fn read_u16_be(memory: &[u8], addr: u16) -> u16 {
    let hi = memory[usize::from(addr)];
    let lo = memory[usize::from(addr.wrapping_add(1))];
    u16::from_be_bytes([hi, lo])
}

/// Writes a big-endian word (high byte at `addr`).
pub fn write_u16_be(memory: &mut [u8], addr: u16, value: u16) {
    let [hi, lo] = value.to_be_bytes();
    memory[usize::from(addr)] = hi;
    memory[usize::from(addr.wrapping_add(1))] = lo;
}
