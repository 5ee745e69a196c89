//! Incremental Message Authentication Codes.
//!
//! This crate implements a family of keyed MAC algorithms behind
//! one incremental [`Mac`][mac::Mac] contract:
//!
//! - [`Hmac`][hmac::Hmac] per [FIPS PUB 198-1], generic over any
//!   block-based digest.
//! - [`Kmac128`][kmac::Kmac128]/[`Kmac256`][kmac::Kmac256] per
//!   NIST [SP 800-185], including the arbitrary-output XOF mode.
//! - [`SipHash`][siphash::SipHash] and HalfSipHash, the ARX
//!   short-input PRFs by Aumasson and Bernstein.
//! - [`Blake2b`][blake2::Blake2b]/[`Blake2s`][blake2::Blake2s]
//!   keyed hashing per [RFC 7693].
//!
//! Every engine can be fed incrementally, finalized repeatedly
//! (each finalize re-primes the engine for a fresh message under
//! the same key), reset, rekeyed, and deeply cloned. Transient
//! key material is zeroed as soon as it is no longer needed.
//!
//! [FIPS PUB 198-1]: https://nvlpubs.nist.gov/nistpubs/FIPS/NIST.FIPS.198-1.pdf
//! [SP 800-185]: https://nvlpubs.nist.gov/nistpubs/SpecialPublications/NIST.SP.800-185.pdf
//! [RFC 7693]: https://www.rfc-editor.org/rfc/rfc7693

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(not(any(test, doctest, feature = "std")), no_std)]
#![deny(clippy::string_slice)]

extern crate alloc;

pub mod blake2;
pub mod error;
pub mod hash;
pub mod hex;
pub mod hmac;
pub mod kmac;
pub mod mac;
pub mod siphash;
pub mod test_util;
pub mod xof;

pub use error::MacError;
pub use mac::Mac;

/// The `digest` traits that collaborator hashes implement.
pub use digest;
pub use subtle;
pub use zeroize;
