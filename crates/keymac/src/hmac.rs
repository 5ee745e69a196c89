//! HMAC per [FIPS PUB 198-1]
//!
//! [FIPS PUB 198-1]: https://nvlpubs.nist.gov/nistpubs/FIPS/NIST.FIPS.198-1.pdf

#![forbid(unsafe_code)]

use alloc::{boxed::Box, vec, vec::Vec};
use core::fmt;

use zeroize::Zeroizing;

use crate::{error::MacError, hash::Digest, mac::Mac};

const I_PAD: u8 = 0x36;
const O_PAD: u8 = 0x5c;

/// HMAC per [FIPS PUB 198-1] for some digest `D`.
///
/// Most callers want one of the concrete types generated by
/// [`hmac_impl!`] ([`HmacSha256`], [`HmacSha3_256`], ...); this
/// type exists for HMAC over any other [`Digest`].
///
/// [FIPS PUB 198-1]: https://nvlpubs.nist.gov/nistpubs/FIPS/NIST.FIPS.198-1.pdf
#[derive(Clone)]
pub struct Hmac<D> {
    algorithm: &'static str,
    /// K_0 ^ ipad, block sized.
    ikey: Zeroizing<Vec<u8>>,
    /// K_0 ^ opad, block sized.
    okey: Zeroizing<Vec<u8>>,
    /// Always primed with `ikey`.
    digest: D,
}

impl<D: Digest + Default> Hmac<D> {
    /// Creates an HMAC using the provided `key`.
    ///
    /// `key` may be any length: keys longer than the digest's
    /// block size are hashed down first, shorter keys are
    /// zero-padded. An empty `key` is rejected with
    /// [`MacError::InvalidKey`].
    pub fn new(algorithm: &'static str, key: &[u8]) -> Result<Self, MacError> {
        if key.is_empty() {
            return Err(MacError::InvalidKey("HMAC key must not be empty"));
        }
        let mut digest = D::default();
        let block = digest.block_size();
        let mut ikey = Zeroizing::new(vec![0u8; block]);
        let mut okey = Zeroizing::new(vec![0u8; block]);
        derive_keys(&mut digest, key, &mut ikey, &mut okey);
        // Step 5: prime with K_0 ^ ipad.
        digest.update(&ikey);
        Ok(Self {
            algorithm,
            ikey,
            okey,
            digest,
        })
    }
}

/// Derives `ikey`/`okey` from `key`.
///
/// `digest` must be in its initial state and is returned to it.
fn derive_keys<D: Digest>(digest: &mut D, key: &[u8], ikey: &mut [u8], okey: &mut [u8]) {
    let block = digest.block_size();
    // Copy so the sized key can always be wiped after the pads
    // are derived, and so undersized keys are zero-padded.
    let mut sized = Zeroizing::new(vec![0u8; block]);
    if key.len() > block {
        // Steps 1 and 2: K_0 = H(K), zero-padded to the block.
        digest.update(key);
        let n = digest.digest_size();
        digest.finalize_reset_into(&mut sized[..n]);
    } else {
        // Step 3.
        sized[..key.len()].copy_from_slice(key);
    }

    // Steps 4 and 7: K_0 ^ ipad (0x36), K_0 ^ opad (0x5c).
    for i in 0..block {
        ikey[i] = sized[i] ^ I_PAD;
        okey[i] = sized[i] ^ O_PAD;
    }
}

impl<D: Digest + Default + 'static> Mac for Hmac<D> {
    fn algorithm(&self) -> &'static str {
        self.algorithm
    }

    fn mac_len(&self) -> usize {
        self.digest.digest_size()
    }

    fn update(&mut self, data: &[u8]) {
        self.digest.update(data);
    }

    fn finalize_into(&mut self, dest: &mut [u8]) -> Result<(), MacError> {
        let n = self.mac_len();
        let Some(dest) = dest.get_mut(..n) else {
            return Err(MacError::InvalidArgument("output buffer shorter than the tag"));
        };
        // Step 6: inner = H((K_0 ^ ipad) || text).
        let mut inner = Zeroizing::new(vec![0u8; n]);
        self.digest.finalize_reset_into(&mut inner);
        // Steps 8 and 9: H((K_0 ^ opad) || inner).
        self.digest.update(&self.okey);
        self.digest.update(&inner);
        self.digest.finalize_reset_into(dest);
        // Re-prime for the next message.
        self.digest.update(&self.ikey);
        Ok(())
    }

    fn reset(&mut self) {
        self.digest.reset();
        self.digest.update(&self.ikey);
    }

    fn rekey(&mut self, new_key: &[u8]) -> Result<(), MacError> {
        if new_key.is_empty() {
            return Err(MacError::InvalidKey("HMAC key must not be empty"));
        }
        self.digest.reset();
        derive_keys(&mut self.digest, new_key, &mut self.ikey, &mut self.okey);
        self.digest.update(&self.ikey);
        Ok(())
    }

    fn clone_boxed(&self) -> Box<dyn Mac> {
        Box::new(self.clone())
    }
}

impl<D> fmt::Debug for Hmac<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Hmac").field(&self.algorithm).finish()
    }
}

/// Generates a concrete [`Hmac`] type for a digest.
///
/// # Example
///
/// ```rust
/// # extern crate alloc;
/// use keymac::{hmac_impl, Mac};
///
/// hmac_impl!(
///     HmacBlake2s256,
///     "HmacBLAKE2s-256",
///     blake2::Blake2s256,
///     "HMAC-BLAKE2s-256"
/// );
///
/// let tag = HmacBlake2s256::mac(b"key", b"data")?;
/// assert_eq!(tag.len(), 32);
/// # Ok::<(), keymac::MacError>(())
/// ```
#[macro_export]
macro_rules! hmac_impl {
    ($name:ident, $alg:literal, $hash:ty, $doc:expr $(,)?) => {
        #[doc = concat!($doc, ".")]
        #[derive(Clone, Debug)]
        pub struct $name($crate::hmac::Hmac<$hash>);

        impl $name {
            /// Creates the MAC using the provided `key`.
            pub fn new(key: &[u8]) -> ::core::result::Result<Self, $crate::MacError> {
                Ok(Self($crate::hmac::Hmac::new($alg, key)?))
            }

            /// Computes the single-shot tag over `data` using
            /// `key`.
            pub fn mac(
                key: &[u8],
                data: &[u8],
            ) -> ::core::result::Result<::alloc::vec::Vec<u8>, $crate::MacError> {
                let mut mac = Self::new(key)?;
                $crate::Mac::update(&mut mac, data);
                Ok($crate::Mac::finalize(&mut mac))
            }
        }

        impl $crate::Mac for $name {
            #[inline]
            fn algorithm(&self) -> &'static str {
                self.0.algorithm()
            }

            #[inline]
            fn mac_len(&self) -> usize {
                self.0.mac_len()
            }

            #[inline]
            fn update(&mut self, data: &[u8]) {
                self.0.update(data)
            }

            #[inline]
            fn finalize_into(
                &mut self,
                dest: &mut [u8],
            ) -> ::core::result::Result<(), $crate::MacError> {
                self.0.finalize_into(dest)
            }

            #[inline]
            fn reset(&mut self) {
                self.0.reset()
            }

            #[inline]
            fn rekey(&mut self, new_key: &[u8]) -> ::core::result::Result<(), $crate::MacError> {
                self.0.rekey(new_key)
            }

            fn clone_boxed(&self) -> ::alloc::boxed::Box<dyn $crate::Mac> {
                ::alloc::boxed::Box::new(self.clone())
            }
        }
    };
}
pub use hmac_impl;

hmac_impl!(HmacSha224, "HmacSHA224", sha2::Sha224, "HMAC-SHA-224");
hmac_impl!(HmacSha256, "HmacSHA256", sha2::Sha256, "HMAC-SHA-256");
hmac_impl!(HmacSha384, "HmacSHA384", sha2::Sha384, "HMAC-SHA-384");
hmac_impl!(HmacSha512, "HmacSHA512", sha2::Sha512, "HMAC-SHA-512");
hmac_impl!(
    HmacSha512_224,
    "HmacSHA512/224",
    sha2::Sha512_224,
    "HMAC-SHA-512/224"
);
hmac_impl!(
    HmacSha512_256,
    "HmacSHA512/256",
    sha2::Sha512_256,
    "HMAC-SHA-512/256"
);
hmac_impl!(HmacSha3_224, "HmacSHA3-224", sha3::Sha3_224, "HMAC-SHA3-224");
hmac_impl!(HmacSha3_256, "HmacSHA3-256", sha3::Sha3_256, "HMAC-SHA3-256");
hmac_impl!(HmacSha3_384, "HmacSHA3-384", sha3::Sha3_384, "HMAC-SHA3-384");
hmac_impl!(HmacSha3_512, "HmacSHA3-512", sha3::Sha3_512, "HMAC-SHA3-512");
hmac_impl!(
    HmacKeccak224,
    "HmacKeccak-224",
    sha3::Keccak224,
    "HMAC over pre-standard Keccak-224"
);
hmac_impl!(
    HmacKeccak256,
    "HmacKeccak-256",
    sha3::Keccak256,
    "HMAC over pre-standard Keccak-256"
);
hmac_impl!(
    HmacKeccak384,
    "HmacKeccak-384",
    sha3::Keccak384,
    "HMAC over pre-standard Keccak-384"
);
hmac_impl!(
    HmacKeccak512,
    "HmacKeccak-512",
    sha3::Keccak512,
    "HMAC over pre-standard Keccak-512"
);
