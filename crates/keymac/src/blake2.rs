//! Keyed BLAKE2b and BLAKE2s per [RFC 7693].
//!
//! BLAKE2's keyed mode is a MAC on its own; no HMAC construction
//! is needed. Both variants support an optional 8-byte (BLAKE2s)
//! or 16-byte (BLAKE2b) personalization string for domain
//! separation.
//!
//! [RFC 7693]: https://www.rfc-editor.org/rfc/rfc7693

#![forbid(unsafe_code)]

use alloc::{boxed::Box, vec::Vec};
use core::fmt;

use blake2::{Blake2bMac, Blake2sMac};
use digest::{
    consts::{U16, U20, U28, U32, U48, U64},
    FixedOutput, Update,
};

use crate::{error::MacError, mac::Mac};

/// BLAKE2b's maximum key size in bytes.
pub const BLAKE2B_MAX_KEY_SIZE: usize = 64;
/// BLAKE2s's maximum key size in bytes.
pub const BLAKE2S_MAX_KEY_SIZE: usize = 32;

/// BLAKE2b's personalization size in bytes.
pub const BLAKE2B_PERSONAL_SIZE: usize = 16;
/// BLAKE2s's personalization size in bytes.
pub const BLAKE2S_PERSONAL_SIZE: usize = 8;

/// Pads `persona` with trailing zeros to `N` bytes.
fn pad_personal<const N: usize>(persona: &[u8]) -> Result<[u8; N], MacError> {
    let mut out = [0u8; N];
    let Some(dest) = out.get_mut(..persona.len()) else {
        return Err(MacError::InvalidParameter("personalization too long"));
    };
    dest.copy_from_slice(persona);
    Ok(out)
}

macro_rules! blake2_impl {
    (
        $name:ident,
        $inner:ident,
        $state:ident,
        $alg_prefix:literal,
        $max_key:expr,
        $persona_size:expr,
        $doc:expr,
        { $($strength:literal => $variant:ident, $size:ty, $bytes:literal),+ $(,)? }
    ) => {
        #[doc = concat!("Keyed ", $doc, ".")]
        ///
        /// The digest (= tag) size is chosen at construction
        /// from the standard bit strengths
        #[doc = concat!("(", stringify!($($strength),+), ").")]
        #[derive(Clone)]
        pub struct $name {
            state: $state,
            /// Pristine keyed state; finalization clones this
            /// back in so the engine stays primed.
            initial: $state,
            persona: [u8; $persona_size],
        }

        #[derive(Clone)]
        enum $state {
            $($variant($inner<$size>),)+
        }

        impl $state {
            fn new(bit_strength: usize, key: &[u8], persona: &[u8; $persona_size]) -> Result<Self, MacError> {
                let state = match bit_strength {
                    $($strength => Self::$variant(
                        $inner::new_with_salt_and_personal(key, &[], persona)
                            .map_err(|_| MacError::InvalidKey("key too long"))?,
                    ),)+
                    _ => {
                        return Err(MacError::InvalidParameter(
                            "unsupported digest bit strength",
                        ))
                    }
                };
                Ok(state)
            }

            fn update(&mut self, data: &[u8]) {
                match self {
                    $(Self::$variant(m) => Update::update(m, data),)+
                }
            }

            /// Consumes the state, writing the tag to the front
            /// of `dest`.
            fn finalize_into(self, dest: &mut [u8]) {
                match self {
                    $(Self::$variant(m) => {
                        dest.copy_from_slice(&FixedOutput::finalize_fixed(m));
                    })+
                }
            }

            fn mac_len(&self) -> usize {
                match self {
                    $(Self::$variant(_) => $bytes,)+
                }
            }

            fn algorithm(&self) -> &'static str {
                match self {
                    $(Self::$variant(_) => concat!($alg_prefix, "-", stringify!($strength)),)+
                }
            }
        }

        impl $name {
            /// Creates the MAC with no personalization.
            ///
            /// `bit_strength` selects the digest size and must
            /// be one of the standard strengths; the key must be
            #[doc = concat!("1..=", stringify!($max_key), " bytes.")]
            pub fn new(key: &[u8], bit_strength: usize) -> Result<Self, MacError> {
                Self::with_personal(key, bit_strength, &[])
            }

            /// Creates the MAC with a personalization string of
            /// up to
            #[doc = concat!(stringify!($persona_size), " bytes, zero-padded.")]
            pub fn with_personal(
                key: &[u8],
                bit_strength: usize,
                persona: &[u8],
            ) -> Result<Self, MacError> {
                if key.is_empty() {
                    return Err(MacError::InvalidKey("key must not be empty"));
                }
                if key.len() > $max_key {
                    return Err(MacError::InvalidKey("key too long"));
                }
                let persona = pad_personal::<{ $persona_size }>(persona)?;
                let initial = $state::new(bit_strength, key, &persona)?;
                Ok(Self {
                    state: initial.clone(),
                    initial,
                    persona,
                })
            }

            /// Computes the single-shot tag over `data` at the
            /// given bit strength.
            pub fn mac(key: &[u8], bit_strength: usize, data: &[u8]) -> Result<Vec<u8>, MacError> {
                let mut mac = Self::new(key, bit_strength)?;
                Mac::update(&mut mac, data);
                Ok(Mac::finalize(&mut mac))
            }
        }

        impl Mac for $name {
            fn algorithm(&self) -> &'static str {
                self.state.algorithm()
            }

            fn mac_len(&self) -> usize {
                self.state.mac_len()
            }

            fn update(&mut self, data: &[u8]) {
                self.state.update(data);
            }

            fn finalize_into(&mut self, dest: &mut [u8]) -> Result<(), MacError> {
                let n = self.mac_len();
                let Some(dest) = dest.get_mut(..n) else {
                    return Err(MacError::InvalidArgument(
                        "output buffer shorter than the tag",
                    ));
                };
                let state = core::mem::replace(&mut self.state, self.initial.clone());
                state.finalize_into(dest);
                Ok(())
            }

            fn reset(&mut self) {
                self.state = self.initial.clone();
            }

            fn rekey(&mut self, new_key: &[u8]) -> Result<(), MacError> {
                if new_key.is_empty() {
                    return Err(MacError::InvalidKey("key must not be empty"));
                }
                if new_key.len() > $max_key {
                    return Err(MacError::InvalidKey("key too long"));
                }
                // Same bit strength as before; only the key
                // schedule changes.
                let bits = self.mac_len() * 8;
                self.initial = $state::new(bits, new_key, &self.persona)?;
                self.state = self.initial.clone();
                Ok(())
            }

            fn clone_boxed(&self) -> Box<dyn Mac> {
                Box::new(self.clone())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("algorithm", &self.algorithm())
                    .finish_non_exhaustive()
            }
        }
    };
}

blake2_impl!(
    Blake2b,
    Blake2bMac,
    Blake2bState,
    "BLAKE2b",
    BLAKE2B_MAX_KEY_SIZE,
    BLAKE2B_PERSONAL_SIZE,
    "BLAKE2b (64-bit platforms, up to a 512-bit digest)",
    {
        160 => B160, U20, 20,
        256 => B256, U32, 32,
        384 => B384, U48, 48,
        512 => B512, U64, 64,
    }
);

blake2_impl!(
    Blake2s,
    Blake2sMac,
    Blake2sState,
    "BLAKE2s",
    BLAKE2S_MAX_KEY_SIZE,
    BLAKE2S_PERSONAL_SIZE,
    "BLAKE2s (8-to-32-bit platforms, up to a 256-bit digest)",
    {
        128 => B128, U16, 16,
        160 => B160, U20, 20,
        224 => B224, U28, 28,
        256 => B256, U32, 32,
    }
);

#[cfg(test)]
#[allow(clippy::wildcard_imports, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{hex::to_hex, test_util::test_mac};

    test_mac!(mod blake2b_512, Blake2b, 32, |key: &[u8]| {
        Blake2b::new(key, 512).expect("should create the MAC")
    });
    test_mac!(mod blake2s_256, Blake2s, 16, |key: &[u8]| {
        Blake2s::new(key, 256).expect("should create the MAC")
    });

    fn key_b() -> Vec<u8> {
        (1..=32).collect()
    }

    fn key_s() -> Vec<u8> {
        (1..=16).collect()
    }

    #[test]
    fn blake2b_512_keyed() {
        assert_eq!(
            to_hex(&Blake2b::mac(&key_b(), 512, b"").unwrap()),
            "da6b37732835fce46fe6359537992d69c70020d72f6a076891aa102567dd36f8\
             b6f4e4cf7bd8dc4b64a5fa232c7841bb7a96d68eaa288b4ebbd1f0940693cd62",
        );
        assert_eq!(
            to_hex(&Blake2b::mac(&key_b(), 512, b"abc").unwrap()),
            "d640a4e02600b99b206c70da1edae39083b36997b508924226af35cca4237f73\
             a05f93784ac56081a21b531a968249caec54e7097236ea898d49604f27b554f4",
        );
    }

    #[test]
    fn blake2b_256_keyed() {
        let mut mac = Blake2b::new(&key_b(), 256).unwrap();
        assert_eq!(mac.algorithm(), "BLAKE2b-256");
        assert_eq!(mac.mac_len(), 32);
        mac.update(b"abc");
        assert_eq!(
            to_hex(&mac.finalize()),
            "280776135edcd561b55edb7abec985333c3995dda3d493de3d29ee5bc45fb333",
        );
    }

    #[test]
    fn blake2s_keyed() {
        assert_eq!(
            to_hex(&Blake2s::mac(&key_s(), 256, b"abc").unwrap()),
            "6654860c208a5b12a46b201b464c8d4adb1d33cc682befd5ec15e00bf1cc4866",
        );
        assert_eq!(
            to_hex(&Blake2s::mac(&key_s(), 128, b"abc").unwrap()),
            "83008e064b7b5573648b04fdd3200aeb",
        );
    }

    #[test]
    fn personalization_separates_domains() {
        let mut mac = Blake2b::with_personal(&key_b(), 512, b"app-v1").unwrap();
        mac.update(b"abc");
        assert_eq!(
            to_hex(&mac.finalize()),
            "33bc1dc8ecc1dc7b0987bcd225adac87f21e75216cea4e48196418e7c01f213b\
             7e3bd88f71b04d107890566a3973b8e774cbc2a470342cfa79c0b2c3091cfde8",
        );

        let mut mac = Blake2s::with_personal(&key_s(), 256, b"app-v1").unwrap();
        mac.update(b"abc");
        assert_eq!(
            to_hex(&mac.finalize()),
            "47b567bff0e42b76b7e5075ba15ef86dd94fde45384c2a690bbc4a87111e1dd6",
        );

        assert!(Blake2b::with_personal(&key_b(), 512, &[0u8; 17]).is_err());
        assert!(Blake2s::with_personal(&key_s(), 256, &[0u8; 9]).is_err());
    }

    #[test]
    fn max_length_key() {
        let k64: Vec<u8> = (0..64).collect();
        let mut mac = Blake2b::new(&k64, 512).unwrap();
        mac.update(&[0, 1, 2]);
        assert_eq!(
            to_hex(&mac.finalize()),
            "33d0825dddf7ada99b0e7e307104ad07ca9cfd9692214f1561356315e784f3e5\
             a17e364ae9dbb14cb2036df932b77f4b292761365fb328de7afdc6d8998f5fc1",
        );
    }

    #[test]
    fn key_bounds_rejected() {
        assert!(Blake2b::new(&[], 512).is_err());
        assert!(Blake2b::new(&[0u8; 65], 512).is_err());
        assert!(Blake2s::new(&[], 256).is_err());
        assert!(Blake2s::new(&[0u8; 33], 256).is_err());
    }

    #[test]
    fn nonstandard_strength_rejected() {
        for bits in [0usize, 8, 200, 257, 448, 1024] {
            assert_eq!(
                Blake2b::new(&[1], bits).unwrap_err(),
                MacError::InvalidParameter("unsupported digest bit strength"),
            );
        }
        assert!(Blake2s::new(&[1], 512).is_err());
    }

    #[test]
    fn finalize_primes_next_message() {
        let mut mac = Blake2b::new(&key_b(), 256).unwrap();
        mac.update(b"abc");
        let first = mac.finalize();
        // Engine is back at the keyed initial state.
        mac.update(b"abc");
        assert_eq!(mac.finalize(), first);
    }

    #[test]
    fn rekey_matches_fresh_engine() {
        let mut mac = Blake2b::new(&[7u8; 16], 512).unwrap();
        mac.update(b"stale");
        mac.rekey(&key_b()).unwrap();
        mac.update(b"abc");
        assert_eq!(mac.finalize(), Blake2b::mac(&key_b(), 512, b"abc").unwrap());
    }
}
