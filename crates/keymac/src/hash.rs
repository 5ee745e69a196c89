//! The digest collaborator seam.

#![forbid(unsafe_code)]

use digest::{core_api::BlockSizeUser, FixedOutputReset, OutputSizeUser, Reset, Update};
use typenum::Unsigned;

/// A resettable, incrementally updatable hash with a fixed block
/// size and digest length.
///
/// This is the primitive that [`Hmac`][crate::hmac::Hmac] is
/// built on. It is implemented for every [RustCrypto] digest
/// (`sha2`, `sha3`, ...) via the blanket impl below, so any of
/// those types can back an HMAC directly.
///
/// [RustCrypto]: https://github.com/RustCrypto
pub trait Digest: Clone {
    /// The digest's block size in bytes.
    fn block_size(&self) -> usize;

    /// The digest's output size in bytes.
    fn digest_size(&self) -> usize;

    /// Writes `data` to the running hash.
    fn update(&mut self, data: &[u8]);

    /// Finalizes the hash into `out` and resets to the initial
    /// state.
    ///
    /// `out` must be exactly [`digest_size`][Self::digest_size]
    /// bytes.
    fn finalize_reset_into(&mut self, out: &mut [u8]);

    /// Discards all input, restoring the initial state.
    fn reset(&mut self);
}

impl<D> Digest for D
where
    D: Update + FixedOutputReset + BlockSizeUser + Clone,
{
    #[inline]
    fn block_size(&self) -> usize {
        <D as BlockSizeUser>::BlockSize::USIZE
    }

    #[inline]
    fn digest_size(&self) -> usize {
        <D as OutputSizeUser>::OutputSize::USIZE
    }

    #[inline]
    fn update(&mut self, data: &[u8]) {
        Update::update(self, data);
    }

    #[inline]
    fn finalize_reset_into(&mut self, out: &mut [u8]) {
        let digest = FixedOutputReset::finalize_fixed_reset(self);
        out.copy_from_slice(&digest);
    }

    #[inline]
    fn reset(&mut self) {
        Reset::reset(self);
    }
}

#[cfg(test)]
mod tests {
    use super::Digest;

    #[test]
    fn blanket_impl_sizes() {
        assert_eq!(sha2::Sha256::default().block_size(), 64);
        assert_eq!(sha2::Sha256::default().digest_size(), 32);
        assert_eq!(sha2::Sha512::default().block_size(), 128);
        assert_eq!(sha2::Sha512::default().digest_size(), 64);
        assert_eq!(sha3::Sha3_256::default().block_size(), 136);
        assert_eq!(sha3::Sha3_512::default().block_size(), 72);
    }

    #[test]
    fn finalize_reset_matches_one_shot() {
        let mut d = sha2::Sha256::default();
        Digest::update(&mut d, b"hello, ");
        Digest::update(&mut d, b"world!");
        let mut out = [0u8; 32];
        d.finalize_reset_into(&mut out);

        let expect = <sha2::Sha256 as digest::Digest>::digest(b"hello, world!");
        assert_eq!(out[..], expect[..]);

        // The reset half: hashing again must start from scratch.
        Digest::update(&mut d, b"hello, world!");
        let mut again = [0u8; 32];
        d.finalize_reset_into(&mut again);
        assert_eq!(again, out);
    }
}
