//! Message Authentication Codes.

#![forbid(unsafe_code)]

use alloc::{boxed::Box, vec, vec::Vec};

use subtle::ConstantTimeEq;

use crate::error::MacError;

/// A keyed Message Authentication Code engine.
///
/// An engine owns all state needed to incrementally compute one
/// MAC value: feed input with [`update`][Self::update], then
/// produce the tag with [`finalize`][Self::finalize] or
/// [`finalize_into`][Self::finalize_into]. Finalizing covers
/// exactly the bytes written since construction, the last
/// [`reset`][Self::reset], or the previous finalize, and leaves
/// the engine primed to immediately begin a fresh message under
/// the same key.
///
/// Engines are not safe for concurrent mutation; cloning (every
/// concrete engine is [`Clone`], and `Box<dyn Mac>` clones via
/// [`clone_boxed`][Self::clone_boxed]) is the sanctioned way to
/// branch a computation, e.g. MACing a common prefix once and
/// then many suffixes independently. Clones are deep: mutating
/// one never affects the other.
///
/// # Example
///
/// ```
/// use keymac::{hmac::HmacSha256, Mac};
///
/// let mut mac = HmacSha256::new(b"my secret key")?;
/// mac.update(b"hello, ");
/// mac.update(b"world!");
/// let tag = mac.finalize();
/// assert_eq!(tag.len(), mac.mac_len());
///
/// // The engine is already primed for the next message.
/// mac.update(b"hello, world!");
/// assert_eq!(mac.finalize(), tag);
/// # Ok::<(), keymac::MacError>(())
/// ```
pub trait Mac {
    /// The canonical algorithm name, e.g. `"HmacSHA256"`,
    /// `"KMAC128"`, or `"SipHash"`.
    fn algorithm(&self) -> &'static str;

    /// The tag size in bytes produced by
    /// [`finalize`][Self::finalize].
    fn mac_len(&self) -> usize;

    /// Appends `data` to the pending message.
    fn update(&mut self, data: &[u8]);

    /// Finalizes the MAC over all pending input and returns the
    /// tag, re-priming the engine for a fresh message under the
    /// same key.
    fn finalize(&mut self) -> Vec<u8> {
        let mut out = vec![0u8; self.mac_len()];
        // `out` is exactly `mac_len` bytes, so this cannot fail.
        let _ = self.finalize_into(&mut out);
        out
    }

    /// Like [`finalize`][Self::finalize], but writes the tag
    /// into the front of `dest` without allocating.
    ///
    /// Exactly [`mac_len`][Self::mac_len] bytes are written; the
    /// rest of `dest` is untouched. To write at an offset, pass
    /// `&mut dest[offset..]`. Returns
    /// [`MacError::InvalidArgument`] (leaving all pending input
    /// intact) if `dest` is shorter than the tag.
    fn finalize_into(&mut self, dest: &mut [u8]) -> Result<(), MacError>;

    /// Discards all pending input, re-priming the engine for a
    /// new message under the same key.
    fn reset(&mut self);

    /// Re-derives all key-dependent state for `new_key`, keeping
    /// the algorithm parameters, then resets.
    ///
    /// Returns [`MacError::InvalidKey`] if `new_key` violates
    /// the algorithm's key-size constraints; the engine is left
    /// unchanged in that case.
    fn rekey(&mut self, new_key: &[u8]) -> Result<(), MacError>;

    /// Finalizes the MAC and compares it to `expect` in constant
    /// time.
    ///
    /// Like [`finalize`][Self::finalize], this consumes the
    /// pending input and re-primes the engine.
    fn verify(&mut self, expect: &[u8]) -> Result<(), MacError> {
        let tag = self.finalize();
        if bool::from(tag.ct_eq(expect)) {
            Ok(())
        } else {
            Err(MacError::Verification)
        }
    }

    /// Returns an independent deep clone of this engine behind
    /// `dyn Mac`.
    fn clone_boxed(&self) -> Box<dyn Mac>;
}

impl Clone for Box<dyn Mac> {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}
