//! SipHash-2-4 and HalfSipHash-2-4 pseudo-random functions.
//!
//! These are keyed PRFs for short inputs (hash tables, network
//! probes), not cryptographic MACs in the HMAC/KMAC sense. The
//! 64-bit (SipHash) and 32-bit (HalfSipHash) tags are far too
//! short for authentication of attacker-controlled data.

#![forbid(unsafe_code)]

use alloc::{boxed::Box, vec::Vec};
use core::fmt;

use zeroize::{Zeroize, Zeroizing};

use crate::{error::MacError, mac::Mac};

/// SipHash-2-4's key size in bytes.
pub const SIPHASH_KEY_SIZE: usize = 16;
/// HalfSipHash-2-4's key size in bytes.
pub const HALF_SIPHASH_KEY_SIZE: usize = 8;

/// SipHash-2-4's tag size in bytes.
pub const SIPHASH_TAG_SIZE: usize = 8;
/// HalfSipHash-2-4's tag size in bytes.
pub const HALF_SIPHASH_TAG_SIZE: usize = 4;

/// The key words for either variant; wiped on drop.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
enum Keys {
    Sip { k0: u64, k1: u64 },
    Half { k0: u32, k1: u32 },
}

/// SipHash-2-4 (16-byte key, 8-byte tag) or HalfSipHash-2-4
/// (8-byte key, 4-byte tag), selected by the key length.
///
/// The permutation needs the total message length up front, so
/// input is buffered until finalization rather than compressed
/// incrementally.
#[derive(Clone)]
pub struct SipHash {
    keys: Keys,
    buf: Zeroizing<Vec<u8>>,
}

impl SipHash {
    /// Creates the PRF. The key must be exactly
    /// [`SIPHASH_KEY_SIZE`] or [`HALF_SIPHASH_KEY_SIZE`] bytes;
    /// the length selects the variant.
    pub fn new(key: &[u8]) -> Result<Self, MacError> {
        Ok(Self {
            keys: Self::keys_from(key)?,
            buf: Zeroizing::new(Vec::new()),
        })
    }

    /// Computes the single-shot tag over `data`.
    pub fn mac(key: &[u8], data: &[u8]) -> Result<Vec<u8>, MacError> {
        let mut mac = Self::new(key)?;
        Mac::update(&mut mac, data);
        Ok(Mac::finalize(&mut mac))
    }

    fn keys_from(key: &[u8]) -> Result<Keys, MacError> {
        match key.len() {
            SIPHASH_KEY_SIZE => Ok(Keys::Sip {
                k0: u64::from_le_bytes([
                    key[0], key[1], key[2], key[3], key[4], key[5], key[6], key[7],
                ]),
                k1: u64::from_le_bytes([
                    key[8], key[9], key[10], key[11], key[12], key[13], key[14], key[15],
                ]),
            }),
            HALF_SIPHASH_KEY_SIZE => Ok(Keys::Half {
                k0: u32::from_le_bytes([key[0], key[1], key[2], key[3]]),
                k1: u32::from_le_bytes([key[4], key[5], key[6], key[7]]),
            }),
            _ => Err(MacError::InvalidKey("SipHash key must be 16 or 8 bytes")),
        }
    }
}

impl Mac for SipHash {
    fn algorithm(&self) -> &'static str {
        match self.keys {
            Keys::Sip { .. } => "SipHash",
            Keys::Half { .. } => "HalfSipHash",
        }
    }

    fn mac_len(&self) -> usize {
        match self.keys {
            Keys::Sip { .. } => SIPHASH_TAG_SIZE,
            Keys::Half { .. } => HALF_SIPHASH_TAG_SIZE,
        }
    }

    fn update(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    fn finalize_into(&mut self, dest: &mut [u8]) -> Result<(), MacError> {
        let n = self.mac_len();
        let Some(dest) = dest.get_mut(..n) else {
            return Err(MacError::InvalidArgument(
                "output buffer shorter than the tag",
            ));
        };
        match self.keys {
            Keys::Sip { k0, k1 } => {
                dest.copy_from_slice(&siphash24(k0, k1, &self.buf));
            }
            Keys::Half { k0, k1 } => {
                dest.copy_from_slice(&half_siphash24(k0, k1, &self.buf));
            }
        }
        self.buf.zeroize();
        Ok(())
    }

    fn reset(&mut self) {
        self.buf.zeroize();
    }

    /// The new key must be the same length as the original: the
    /// key length selects the variant and the variant (and thus
    /// the tag size) is fixed at construction.
    fn rekey(&mut self, new_key: &[u8]) -> Result<(), MacError> {
        let keys = Self::keys_from(new_key)?;
        if core::mem::discriminant(&keys) != core::mem::discriminant(&self.keys) {
            return Err(MacError::InvalidKey(
                "rekey cannot switch SipHash variants",
            ));
        }
        self.keys = keys;
        self.reset();
        Ok(())
    }

    fn clone_boxed(&self) -> Box<dyn Mac> {
        Box::new(self.clone())
    }
}

impl fmt::Debug for SipHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SipHash")
            .field("algorithm", &self.algorithm())
            .finish_non_exhaustive()
    }
}

macro_rules! sip_round {
    ($v0:ident, $v1:ident, $v2:ident, $v3:ident, $r0:literal, $r1:literal, $r2:literal, $r3:literal, $r4:literal, $r5:literal) => {
        $v0 = $v0.wrapping_add($v1);
        $v1 = $v1.rotate_left($r0);
        $v1 ^= $v0;
        $v0 = $v0.rotate_left($r1);
        $v2 = $v2.wrapping_add($v3);
        $v3 = $v3.rotate_left($r2);
        $v3 ^= $v2;
        $v0 = $v0.wrapping_add($v3);
        $v3 = $v3.rotate_left($r3);
        $v3 ^= $v0;
        $v2 = $v2.wrapping_add($v1);
        $v1 = $v1.rotate_left($r4);
        $v1 ^= $v2;
        $v2 = $v2.rotate_left($r5);
    };
}

fn siphash24(k0: u64, k1: u64, msg: &[u8]) -> [u8; SIPHASH_TAG_SIZE] {
    let mut v0 = 0x736f6d6570736575u64 ^ k0;
    let mut v1 = 0x646f72616e646f6du64 ^ k1;
    let mut v2 = 0x6c7967656e657261u64 ^ k0;
    let mut v3 = 0x7465646279746573u64 ^ k1;

    let mut chunks = msg.chunks_exact(8);
    for chunk in &mut chunks {
        let m = u64::from_le_bytes([
            chunk[0], chunk[1], chunk[2], chunk[3], chunk[4], chunk[5], chunk[6], chunk[7],
        ]);
        v3 ^= m;
        sip_round!(v0, v1, v2, v3, 13, 32, 16, 21, 17, 32);
        sip_round!(v0, v1, v2, v3, 13, 32, 16, 21, 17, 32);
        v0 ^= m;
    }

    // Final block: remaining bytes, little endian, with the low
    // byte of the total length in the top byte.
    let mut m = (msg.len() as u64 & 0xff) << 56;
    for (i, &b) in chunks.remainder().iter().enumerate() {
        m |= u64::from(b) << (8 * i);
    }
    v3 ^= m;
    sip_round!(v0, v1, v2, v3, 13, 32, 16, 21, 17, 32);
    sip_round!(v0, v1, v2, v3, 13, 32, 16, 21, 17, 32);
    v0 ^= m;

    v2 ^= 0xff;
    for _ in 0..4 {
        sip_round!(v0, v1, v2, v3, 13, 32, 16, 21, 17, 32);
    }

    (v0 ^ v1 ^ v2 ^ v3).to_le_bytes()
}

fn half_siphash24(k0: u32, k1: u32, msg: &[u8]) -> [u8; HALF_SIPHASH_TAG_SIZE] {
    let mut v0 = k0;
    let mut v1 = k1;
    let mut v2 = 0x6c796765u32 ^ k0;
    let mut v3 = 0x74656462u32 ^ k1;

    let mut chunks = msg.chunks_exact(4);
    for chunk in &mut chunks {
        let m = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        v3 ^= m;
        sip_round!(v0, v1, v2, v3, 5, 16, 8, 7, 13, 16);
        sip_round!(v0, v1, v2, v3, 5, 16, 8, 7, 13, 16);
        v0 ^= m;
    }

    let mut m = (msg.len() as u32 & 0xff) << 24;
    for (i, &b) in chunks.remainder().iter().enumerate() {
        m |= u32::from(b) << (8 * i);
    }
    v3 ^= m;
    sip_round!(v0, v1, v2, v3, 5, 16, 8, 7, 13, 16);
    sip_round!(v0, v1, v2, v3, 5, 16, 8, 7, 13, 16);
    v0 ^= m;

    v2 ^= 0xff;
    for _ in 0..4 {
        sip_round!(v0, v1, v2, v3, 5, 16, 8, 7, 13, 16);
    }

    (v1 ^ v3).to_le_bytes()
}

#[cfg(test)]
#[allow(clippy::wildcard_imports, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{hex::to_hex, test_util::test_mac};

    test_mac!(mod siphash, SipHash, SIPHASH_KEY_SIZE, |key: &[u8]| {
        SipHash::new(key).expect("should create the MAC")
    });
    test_mac!(mod half_siphash, SipHash, HALF_SIPHASH_KEY_SIZE, |key: &[u8]| {
        SipHash::new(key).expect("should create the MAC")
    });

    /// Reference vectors from the SipHash paper's test program:
    /// key `00 01 .. 0f`, messages `[]`, `[0]`, `[0, 1]`, ...
    #[test]
    fn siphash24_reference_vectors() {
        const EXPECT: [&str; 16] = [
            "310e0edd47db6f72",
            "fd67dc93c539f874",
            "5a4fa9d909806c0d",
            "2d7efbd796666785",
            "b7877127e09427cf",
            "8da699cd64557618",
            "cee3fe586e46c9cb",
            "37d1018bf50002ab",
            "6224939a79f5f593",
            "b0e4a90bdf82009e",
            "f3b9dd94c5bb5d7a",
            "a7ad6b22462fb3f4",
            "fbe50e86bc8f1e75",
            "903d84c02756ea14",
            "eef27a8e90ca23f7",
            "e545be4961ca29a1",
        ];
        let key: Vec<u8> = (0..16).collect();
        let msg: Vec<u8> = (0..16).collect();
        for (len, expect) in EXPECT.iter().enumerate() {
            let tag = SipHash::mac(&key, &msg[..len]).unwrap();
            assert_eq!(to_hex(&tag), *expect, "len={len}");
        }
    }

    /// Reference vectors from the HalfSipHash test program: key
    /// `00 01 .. 07`, the same message prefixes.
    #[test]
    fn half_siphash24_reference_vectors() {
        const EXPECT: [&str; 16] = [
            "a9359f5b", "27475ab8", "fa62a603", "8afee704", "2a6e4689", "c5fab669", "5863fc23",
            "8bcf63c5", "d0b8848f", "f806e779", "94b07934", "08083050", "57f0872f", "77e663ff",
            "d6fff87c", "74fe2b97",
        ];
        let key: Vec<u8> = (0..8).collect();
        let msg: Vec<u8> = (0..16).collect();
        for (len, expect) in EXPECT.iter().enumerate() {
            let tag = SipHash::mac(&key, &msg[..len]).unwrap();
            assert_eq!(to_hex(&tag), *expect, "len={len}");
        }
    }

    #[test]
    fn incremental_matches_one_shot() {
        let key: Vec<u8> = (0..16).collect();
        let mut mac = SipHash::new(&key).unwrap();
        mac.update(b"hello, ");
        mac.update(b"world!");
        assert_eq!(to_hex(&mac.finalize()), "e032cf1017cda97d");
        assert_eq!(
            mac.finalize(),
            SipHash::mac(&key, b"").unwrap(),
            "finalize must leave the engine primed for an empty message",
        );
    }

    #[test]
    fn variant_selection_and_sizes() {
        let sip = SipHash::new(&[0u8; 16]).unwrap();
        assert_eq!(sip.algorithm(), "SipHash");
        assert_eq!(sip.mac_len(), SIPHASH_TAG_SIZE);

        let half = SipHash::new(&[0u8; 8]).unwrap();
        assert_eq!(half.algorithm(), "HalfSipHash");
        assert_eq!(half.mac_len(), HALF_SIPHASH_TAG_SIZE);
    }

    #[test]
    fn invalid_key_lengths_rejected() {
        for len in [0usize, 7, 9, 15, 17, 32] {
            assert!(
                SipHash::new(&vec![0u8; len]).is_err(),
                "key length {len} must be rejected",
            );
        }
    }

    #[test]
    fn rekey_cannot_switch_variants() {
        let mut mac = SipHash::new(&[0u8; 16]).unwrap();
        assert_eq!(
            mac.rekey(&[0u8; 8]).unwrap_err(),
            MacError::InvalidKey("rekey cannot switch SipHash variants"),
        );
        // The failed rekey left the engine usable.
        assert_eq!(mac.algorithm(), "SipHash");

        let key2: Vec<u8> = (0..16).collect();
        mac.update(b"stale");
        mac.rekey(&key2).unwrap();
        assert_eq!(to_hex(&mac.finalize()), "310e0edd47db6f72");
    }

    #[test]
    fn reset_discards_pending_input() {
        let key: Vec<u8> = (0..16).collect();
        let mut mac = SipHash::new(&key).unwrap();
        mac.update(b"discarded");
        mac.reset();
        assert_eq!(to_hex(&mac.finalize()), "310e0edd47db6f72");
    }
}
