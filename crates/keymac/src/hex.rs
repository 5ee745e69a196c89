//! Constant time hexadecimal encoding.
//!
//! MAC tags are secret-derived, so even their display path
//! avoids table lookups indexed by secret data.

#![forbid(unsafe_code)]

use alloc::string::String;
use core::fmt;

/// Displays `T` as lowercase hexadecimal, encoded in constant
/// time.
#[derive(Copy, Clone)]
pub struct Hex<T>(T);

impl<T> Hex<T> {
    /// Creates a new `Hex`.
    pub const fn new(value: T) -> Self {
        Self(value)
    }
}

impl<T> fmt::Display for Hex<T>
where
    T: AsRef<[u8]>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(self, f)
    }
}

impl<T> fmt::Debug for Hex<T>
where
    T: AsRef<[u8]>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(self, f)
    }
}

impl<T> fmt::LowerHex for Hex<T>
where
    T: AsRef<[u8]>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ct_write_lower(f, self.0.as_ref())
    }
}

/// Encodes `data` as a lowercase hexadecimal string in constant
/// time.
pub fn to_hex(data: &[u8]) -> String {
    let mut s = String::with_capacity(data.len().saturating_mul(2));
    for v in data {
        s.push(enc_nibble_lower(v >> 4) as char);
        s.push(enc_nibble_lower(v & 0x0f) as char);
    }
    s
}

/// Encodes `src` to `dst` as lowercase hexadecimal in constant
/// time.
pub fn ct_write_lower<W>(dst: &mut W, src: &[u8]) -> Result<(), fmt::Error>
where
    W: fmt::Write,
{
    for v in src {
        dst.write_char(enc_nibble_lower(v >> 4) as char)?;
        dst.write_char(enc_nibble_lower(v & 0x0f) as char)?;
    }
    Ok(())
}

/// Encodes a nibble as lowercase hexadecimal.
///
/// The implementation is taken from
/// https://github.com/ericlagergren/subtle/blob/890d697da01053c79157a7fdfbed548317eeb0a6/hex/constant_time.go
#[inline(always)]
const fn enc_nibble_lower(c: u8) -> u8 {
    let c = c as u16;
    c.wrapping_add(87)
        .wrapping_add((c.wrapping_sub(10) >> 8) & !38) as u8
}
