//! KMAC per NIST [SP 800-185].
//!
//! [SP 800-185]: https://nvlpubs.nist.gov/nistpubs/SpecialPublications/NIST.SP.800-185.pdf

#![forbid(unsafe_code)]

use alloc::{boxed::Box, vec::Vec};
use core::fmt;

use digest::{ExtendableOutputReset, Reset, Update};
use sha3::{CShake128, CShake128Core, CShake128Reader, CShake256, CShake256Core, CShake256Reader};
use zeroize::Zeroizing;

use crate::{error::MacError, mac::Mac, xof};

/// The cSHAKE function name `N` for KMAC.
const FUNCTION_NAME: &[u8] = b"KMAC";

/// cSHAKE128's rate in bytes.
const CSHAKE128_BLOCK_SIZE: usize = 168;
/// cSHAKE256's rate in bytes.
const CSHAKE256_BLOCK_SIZE: usize = 136;

/// NIST SP 800-185 `left_encode`/`right_encode` output: at most
/// eight value bytes plus the length byte.
struct Encoded {
    bytes: [u8; 9],
    len: usize,
}

impl Encoded {
    fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

/// The number of bytes needed to represent `v`, at least 1.
fn value_len(v: u64) -> usize {
    let used = 8usize.saturating_sub(v.leading_zeros() as usize / 8);
    core::cmp::max(used, 1)
}

/// `left_encode(v)`: big-endian value bytes prefixed with their
/// count.
fn left_encode(v: u64) -> Encoded {
    let n = value_len(v);
    let mut bytes = [0u8; 9];
    bytes[0] = n as u8;
    for i in 0..n {
        bytes[n.wrapping_sub(i)] = (v >> (8 * i)) as u8;
    }
    Encoded { bytes, len: n + 1 }
}

/// `right_encode(v)`: big-endian value bytes suffixed with their
/// count.
fn right_encode(v: u64) -> Encoded {
    let n = value_len(v);
    let mut bytes = [0u8; 9];
    bytes[n] = n as u8;
    for i in 0..n {
        bytes[n.wrapping_sub(i).wrapping_sub(1)] = (v >> (8 * i)) as u8;
    }
    Encoded { bytes, len: n + 1 }
}

/// The cSHAKE primitive backing a KMAC engine, selected once at
/// construction.
#[derive(Clone)]
enum CShake {
    S128(CShake128),
    S256(CShake256),
}

impl CShake {
    fn new(bit_strength: BitStrength, customization: &[u8]) -> Self {
        match bit_strength {
            BitStrength::B128 => Self::S128(CShake128::from_core(
                CShake128Core::new_with_function_name(FUNCTION_NAME, customization),
            )),
            BitStrength::B256 => Self::S256(CShake256::from_core(
                CShake256Core::new_with_function_name(FUNCTION_NAME, customization),
            )),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::S128(s) => Update::update(s, data),
            Self::S256(s) => Update::update(s, data),
        }
    }

    fn reset(&mut self) {
        match self {
            Self::S128(s) => Reset::reset(s),
            Self::S256(s) => Reset::reset(s),
        }
    }

    /// Finalizes into a reader and resets back to the seeded
    /// (function-name + customization) state.
    fn finalize_reset(&mut self) -> ReaderInner {
        match self {
            Self::S128(s) => ReaderInner::S128(s.finalize_xof_reset()),
            Self::S256(s) => ReaderInner::S256(s.finalize_xof_reset()),
        }
    }
}

/// cSHAKE security strength, which fixes the rate (block size).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum BitStrength {
    B128,
    B256,
}

impl BitStrength {
    const fn block_size(self) -> usize {
        match self {
            Self::B128 => CSHAKE128_BLOCK_SIZE,
            Self::B256 => CSHAKE256_BLOCK_SIZE,
        }
    }
}

/// Combines the inputs for `bytepad(encode_string(K), w)` into a
/// single buffer: `left_encode(w) ‖ left_encode(|K| * 8) ‖ K`.
fn new_init_block(key: &[u8], block_size: usize) -> Zeroizing<Vec<u8>> {
    let enc_w = left_encode(block_size as u64);
    let enc_k = left_encode((key.len() as u64) * 8);
    let mut block = Zeroizing::new(Vec::with_capacity(
        enc_w.len + enc_k.len + key.len(),
    ));
    block.extend_from_slice(enc_w.as_slice());
    block.extend_from_slice(enc_k.as_slice());
    block.extend_from_slice(key);
    block
}

/// The state shared by both KMAC output modes.
#[derive(Clone)]
struct Engine {
    shake: CShake,
    block_size: usize,
    /// Encoded key material pending `bytepad`; wiped on drop and
    /// on rekey.
    init_block: Zeroizing<Vec<u8>>,
}

impl Engine {
    fn new(bit_strength: BitStrength, key: &[u8], customization: &[u8]) -> Self {
        let block_size = bit_strength.block_size();
        let mut engine = Self {
            shake: CShake::new(bit_strength, customization),
            block_size,
            init_block: new_init_block(key, block_size),
        };
        engine.bytepad();
        engine
    }

    /// Feeds `bytepad(encode_string(K), blockSize)`: the init
    /// block, then zero padding up to a multiple of the rate.
    fn bytepad(&mut self) {
        self.shake.update(&self.init_block);

        let rem = self.init_block.len() % self.block_size;
        if rem != 0 {
            const ZEROS: [u8; CSHAKE128_BLOCK_SIZE] = [0; CSHAKE128_BLOCK_SIZE];
            self.shake.update(&ZEROS[..self.block_size - rem]);
        }
    }

    fn update(&mut self, data: &[u8]) {
        self.shake.update(data);
    }

    fn reset(&mut self) {
        self.shake.reset();
        self.bytepad();
    }

    fn rekey(&mut self, new_key: &[u8]) {
        // The old init block is wiped when the `Zeroizing` is
        // dropped by the assignment.
        self.init_block = new_init_block(new_key, self.block_size);
        self.reset();
    }

    /// Appends `right_encode(bits)`, squeezes `dest.len()`
    /// bytes, and re-primes for the next message.
    fn finalize_into(&mut self, bits: u64, dest: &mut [u8]) {
        self.shake.update(right_encode(bits).as_slice());
        let mut reader = self.shake.finalize_reset();
        reader.read(dest);
        self.bytepad();
    }
}

/// Squeezed KMAC XOF output.
///
/// Obtained from [`KmacXof128`]/[`KmacXof256`]; may be read from
/// repeatedly, in chunks of any size. Dropping the reader (and
/// the engine it was built from) wipes the engine's key-derived
/// state.
#[derive(Clone)]
pub struct KmacReader(ReaderInner);

#[derive(Clone)]
enum ReaderInner {
    S128(CShake128Reader),
    S256(CShake256Reader),
}

impl ReaderInner {
    fn read(&mut self, out: &mut [u8]) {
        match self {
            Self::S128(r) => digest::XofReader::read(r, out),
            Self::S256(r) => digest::XofReader::read(r, out),
        }
    }
}

impl xof::XofReader for KmacReader {
    fn read(&mut self, out: &mut [u8]) {
        self.0.read(out);
    }
}

impl fmt::Debug for KmacReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KmacReader").finish_non_exhaustive()
    }
}

macro_rules! kmac_impl {
    (
        $name:ident,
        $xof_name:ident,
        $alg:literal,
        $bit_strength:expr,
        $default_len:literal,
        $doc:expr $(,)?
    ) => {
        #[doc = concat!($doc, " in fixed-output (MAC) mode.")]
        ///
        /// Zero-length keys are permitted, per SP 800-185.
        #[derive(Clone)]
        pub struct $name {
            engine: Engine,
            mac_len: usize,
        }

        impl $name {
            #[doc = concat!("The default tag size in bytes (", stringify!($default_len), ").")]
            pub const MAC_LENGTH: usize = $default_len;

            /// Creates the MAC with an empty customization
            /// string and the default tag size.
            pub fn new(key: &[u8]) -> Result<Self, MacError> {
                Self::with_params(key, &[], Self::MAC_LENGTH)
            }

            /// Creates the MAC with a customization string `s`
            /// and the default tag size.
            pub fn with_customization(key: &[u8], s: &[u8]) -> Result<Self, MacError> {
                Self::with_params(key, s, Self::MAC_LENGTH)
            }

            /// Creates the MAC with a customization string `s`
            /// and a caller-chosen tag size.
            ///
            /// Returns [`MacError::InvalidParameter`] if
            /// `mac_len` is zero (arbitrary-length output is the
            /// XOF mode's job; see
            #[doc = concat!("[`", stringify!($xof_name), "`]).")]
            pub fn with_params(key: &[u8], s: &[u8], mac_len: usize) -> Result<Self, MacError> {
                if mac_len == 0 {
                    return Err(MacError::InvalidParameter(
                        "KMAC output length must be non-zero",
                    ));
                }
                Ok(Self {
                    engine: Engine::new($bit_strength, key, s),
                    mac_len,
                })
            }

            /// Computes the single-shot tag over `data` using
            /// `key` and an empty customization string.
            pub fn mac(key: &[u8], data: &[u8]) -> Result<Vec<u8>, MacError> {
                let mut mac = Self::new(key)?;
                Mac::update(&mut mac, data);
                Ok(Mac::finalize(&mut mac))
            }
        }

        impl Mac for $name {
            fn algorithm(&self) -> &'static str {
                $alg
            }

            fn mac_len(&self) -> usize {
                self.mac_len
            }

            fn update(&mut self, data: &[u8]) {
                self.engine.update(data);
            }

            fn finalize_into(&mut self, dest: &mut [u8]) -> Result<(), MacError> {
                let Some(dest) = dest.get_mut(..self.mac_len) else {
                    return Err(MacError::InvalidArgument(
                        "output buffer shorter than the tag",
                    ));
                };
                self.engine.finalize_into((self.mac_len as u64) * 8, dest);
                Ok(())
            }

            fn reset(&mut self) {
                self.engine.reset();
            }

            fn rekey(&mut self, new_key: &[u8]) -> Result<(), MacError> {
                self.engine.rekey(new_key);
                Ok(())
            }

            fn clone_boxed(&self) -> Box<dyn Mac> {
                Box::new(self.clone())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("mac_len", &self.mac_len)
                    .finish_non_exhaustive()
            }
        }

        #[doc = concat!($doc, " in arbitrary-output (XOF) mode.")]
        ///
        /// Unlike the fixed-output mode, the tag length is not
        /// part of the keyed state: the output bit length is
        /// encoded as zero and any number of bytes may be
        /// squeezed from the [`KmacReader`].
        #[derive(Clone)]
        pub struct $xof_name {
            engine: Engine,
        }

        impl $xof_name {
            /// Creates the XOF with an empty customization
            /// string.
            pub fn new(key: &[u8]) -> Self {
                Self::with_customization(key, &[])
            }

            /// Creates the XOF with a customization string `s`.
            pub fn with_customization(key: &[u8], s: &[u8]) -> Self {
                Self {
                    engine: Engine::new($bit_strength, key, s),
                }
            }

            /// Appends `data` to the pending message.
            pub fn update(&mut self, data: &[u8]) {
                self.engine.update(data);
            }

            /// Discards all pending input.
            pub fn reset(&mut self) {
                self.engine.reset();
            }

            /// Re-derives the keyed state for `new_key`, wiping
            /// the old key material, then resets.
            pub fn rekey(&mut self, new_key: &[u8]) {
                self.engine.rekey(new_key);
            }

            /// Finalizes the XOF over all pending input,
            /// consuming the engine (and wiping its key-derived
            /// state) and returning the output reader.
            ///
            /// To keep the engine alive for further messages,
            /// read from a clone:
            /// `engine.clone().into_reader()` (or
            #[doc = concat!("[`", stringify!($xof_name), "::to_reader`]).")]
            pub fn into_reader(mut self) -> KmacReader {
                self.engine.update(right_encode(0).as_slice());
                KmacReader(self.engine.shake.finalize_reset())
            }

            /// Finalizes a deep copy of the engine, leaving
            /// `self` untouched.
            pub fn to_reader(&self) -> KmacReader {
                self.clone().into_reader()
            }
        }

        impl xof::Xof for $xof_name {
            type Reader = KmacReader;

            fn update(&mut self, data: &[u8]) {
                $xof_name::update(self, data);
            }

            fn finalize_xof(self) -> KmacReader {
                self.into_reader()
            }
        }

        impl fmt::Debug for $xof_name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($xof_name)).finish_non_exhaustive()
            }
        }
    };
}

kmac_impl!(Kmac128, KmacXof128, "KMAC128", BitStrength::B128, 32, "KMAC128");
kmac_impl!(Kmac256, KmacXof256, "KMAC256", BitStrength::B256, 64, "KMAC256");

#[cfg(test)]
#[allow(clippy::wildcard_imports, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{
        hex::to_hex,
        test_util::{test_mac, KEY_SMALL},
        xof::XofReader as _,
    };

    test_mac!(mod kmac128, Kmac128);
    test_mac!(mod kmac256, Kmac256);

    /// The 32-byte key 0x40..0x60 used by the NIST SP 800-185
    /// sample vectors.
    fn nist_key() -> Vec<u8> {
        (0x40..0x60).collect()
    }

    /// The 200-byte message 0x00..0xC8 used by the NIST samples.
    fn nist_long_msg() -> Vec<u8> {
        (0..200).map(|b| b as u8).collect()
    }

    const CUSTOM: &[u8] = b"My Tagged Application";

    #[test]
    fn left_right_encode() {
        assert_eq!(left_encode(0).as_slice(), [1, 0]);
        assert_eq!(left_encode(168).as_slice(), [1, 168]);
        assert_eq!(left_encode(256).as_slice(), [2, 1, 0]);
        assert_eq!(left_encode(65536).as_slice(), [3, 1, 0, 0]);
        assert_eq!(right_encode(0).as_slice(), [0, 1]);
        assert_eq!(right_encode(256).as_slice(), [1, 0, 2]);
        assert_eq!(right_encode(4000).as_slice(), [15, 160, 2]);
    }

    /// NIST SP 800-185 KMAC128 samples 1-3.
    #[test]
    fn kmac128_nist_samples() {
        let key = nist_key();
        assert_eq!(
            to_hex(&Kmac128::mac(&key, &[0, 1, 2, 3]).unwrap()),
            "e5780b0d3ea6f7d3a429c5706aa43a00fadbd7d49628839e3187243f456ee14e",
        );

        let mut mac = Kmac128::with_customization(&key, CUSTOM).unwrap();
        mac.update(&[0, 1, 2, 3]);
        assert_eq!(
            to_hex(&mac.finalize()),
            "3b1fba963cd8b0b59e8c1a6d71888b7143651af8ba0a7070c0979e2811324aa5",
        );

        // The engine re-primes after finalize: sample 3 on the
        // same instance.
        mac.update(&nist_long_msg());
        assert_eq!(
            to_hex(&mac.finalize()),
            "1f5b4e6cca02209e0dcb5ca635b89a15e271ecc760071dfd805faa38f9729230",
        );
    }

    /// NIST SP 800-185 KMAC256 samples 4-6.
    #[test]
    fn kmac256_nist_samples() {
        let key = nist_key();
        let mut mac = Kmac256::with_customization(&key, CUSTOM).unwrap();
        mac.update(&[0, 1, 2, 3]);
        assert_eq!(
            to_hex(&mac.finalize()),
            "20c570c31346f703c9ac36c61c03cb64c3970d0cfc787e9b79599d273a68d2f7\
             f69d4cc3de9d104a351689f27cf6f5951f0103f33f4f24871024d9c27773a8dd",
        );

        assert_eq!(
            to_hex(&Kmac256::mac(&key, &nist_long_msg()).unwrap()),
            "75358cf39e41494e949707927cee0af20a3ff553904c86b08f21cc414bcfd691\
             589d27cf5e15369cbbff8b9a4c2eb17800855d0235ff635da82533ec6b759b69",
        );

        mac.update(&nist_long_msg());
        assert_eq!(
            to_hex(&mac.finalize()),
            "b58618f71f92e1d56c1b8c55ddd7cd188b97b4ca4d99831eb2699a837da2e4d9\
             70fbacfde50033aea585f1a2708510c32d07880801bd182898fe476876fc8965",
        );
    }

    /// NIST SP 800-185 KMACXOF samples.
    #[test]
    fn kmac_xof_nist_samples() {
        let key = nist_key();

        let mut xof = KmacXof128::new(&key);
        xof.update(&[0, 1, 2, 3]);
        let out: [u8; 32] = xof.into_reader().read_fixed();
        assert_eq!(
            to_hex(&out),
            "cd83740bbd92ccc8cf032b1481a0f4460e7ca9dd12b08a0c4031178bacd6ec35",
        );

        let mut xof = KmacXof128::with_customization(&key, CUSTOM);
        xof.update(&nist_long_msg());
        let out: [u8; 32] = xof.into_reader().read_fixed();
        assert_eq!(
            to_hex(&out),
            "47026c7cd793084aa0283c253ef658490c0db61438b8326fe9bddf281b83ae0f",
        );

        let mut xof = KmacXof256::with_customization(&key, CUSTOM);
        xof.update(&[0, 1, 2, 3]);
        let out: [u8; 64] = xof.into_reader().read_fixed();
        assert_eq!(
            to_hex(&out),
            "1755133f1534752aad0748f2c706fb5c784512cab835cd15676b16c0c6647fa9\
             6faa7af634a0bf8ff6df39374fa00fad9a39e322a7c92065a64eb1fb0801eb2b",
        );

        let mut xof = KmacXof256::new(&key);
        xof.update(&nist_long_msg());
        let out: [u8; 64] = xof.into_reader().read_fixed();
        assert_eq!(
            to_hex(&out),
            "ff7b171f1e8a2b24683eed37830ee797538ba8dc563f6da1e667391a75edc02c\
             a633079f81ce12a25f45615ec89972031d18337331d24ceb8f8ca8e6a19fd98b",
        );
    }

    /// The concatenation of arbitrarily sized reads equals one
    /// big read, across the squeeze block boundary.
    #[test]
    fn xof_reader_chunked_reads() {
        let mut xof = KmacXof128::new(&nist_key());
        xof.update(&[0, 1, 2, 3]);

        let mut out = [0u8; 200];
        let mut reader = xof.to_reader();
        let mut off = 0;
        for n in [1usize, 7, 31, 100, 53, 8] {
            reader.read(&mut out[off..off + n]);
            off += n;
        }
        assert_eq!(off, 200);
        assert_eq!(
            to_hex(&out),
            "cd83740bbd92ccc8cf032b1481a0f4460e7ca9dd12b08a0c4031178bacd6ec35\
             8560e17d2d2c2f845fc07526e6f1027e890014fc4f4a9dd7d0d9578b5bb7929b\
             3b8fa06f4366a3a9bad9a6ccc768baa4d51411f1e73da5cbd5e7560ab48fd9f5\
             e2228aaf0fa1fff9e211a2c6aba07f3aab037b5794d26314fef15806c12e6e02\
             2948650a71bdb1903f29910e5da0cf19bb788f7fd142cf21af6e9339a39a545f\
             e8bea37dde0c5cbb5963a87144545bdc1c60eda58492ad022eb0c19814c10483\
             e0ecb89410713c1a",
        );

        // `to_reader` left the engine intact including its
        // pending input.
        let out2: [u8; 32] = xof.into_reader().read_fixed();
        assert_eq!(out[..32], out2[..]);
    }

    /// KMAC128 over the fixed 20-byte key, empty customization,
    /// empty message.
    #[test]
    fn kmac128_empty_message() {
        let mut mac = Kmac128::new(KEY_SMALL).unwrap();
        assert_eq!(
            to_hex(&mac.finalize()),
            "149fbd170acf039146689ca60c01466c8a07c5fa583624fcad89268a36e0415c",
        );
    }

    #[test]
    fn rekey_matches_fresh_engine() {
        let mut mac = Kmac128::new(&nist_key()).unwrap();
        mac.update(b"garbage");
        let key2: Vec<u8> = (0x60..0x80).collect();
        mac.rekey(&key2).unwrap();
        mac.update(&[0, 1, 2, 3]);
        assert_eq!(
            to_hex(&mac.finalize()),
            "c1b892c1d127ab60cf792a1906c8906c2e430510c1a42ecb4cf1f41fd17e8154",
        );
    }

    /// SP 800-185 permits zero-length KMAC keys.
    #[test]
    fn zero_length_key_permitted() {
        let mut mac = Kmac128::new(&[]).unwrap();
        mac.update(b"data");
        assert_eq!(mac.finalize().len(), Kmac128::MAC_LENGTH);
    }

    #[test]
    fn zero_output_length_rejected() {
        assert_eq!(
            Kmac128::with_params(b"key", &[], 0).unwrap_err(),
            MacError::InvalidParameter("KMAC output length must be non-zero"),
        );
    }

    /// A non-default output length changes the tag entirely (the
    /// length is encoded into the MAC input).
    #[test]
    fn output_length_is_domain_separating() {
        let long = Kmac128::with_params(b"key", &[], 64).unwrap().finalize();
        let short = Kmac128::with_params(b"key", &[], 32).unwrap().finalize();
        assert_eq!(long.len(), 64);
        assert_ne!(long[..32], short[..]);
    }
}
