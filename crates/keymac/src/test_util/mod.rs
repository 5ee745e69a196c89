//! Utilities for testing MAC implementations.
//!
//! If you implement [`Mac`][crate::mac::Mac] it is **very
//! highly** recommended that you use these tests.

#![forbid(unsafe_code)]
#![allow(clippy::arithmetic_side_effects)]
#![allow(clippy::panic)]
#![cfg(any(test, feature = "test_util"))]
#![cfg_attr(docsrs, doc(cfg(feature = "test_util")))]

pub mod mac;

pub use mac::test_mac;

use alloc::vec::Vec;

/// A fixed 20-byte key shared by conformance vectors across the
/// crate's test suites.
pub const KEY_SMALL: &[u8] = &[
    0xd5, 0x25, 0x11, 0xa6, 0x6b, 0x9f, 0x25, 0x7e, 0xd1, 0x94, 0x49, 0xe4, 0xf7, 0x3a, 0x0b,
    0xa3, 0x65, 0x30, 0x2e, 0xdf,
];

/// Generates a deterministic `key_len`-byte test key; different
/// seeds give keys that differ at every byte.
pub fn test_key(key_len: usize, seed: u8) -> Vec<u8> {
    (0..key_len)
        .map(|i| (i as u8).wrapping_mul(197).wrapping_add(seed))
        .collect()
}

#[macro_export]
#[doc(hidden)]
macro_rules! __apply {
    ($callback:ident, $($tt:tt),* $(,)?) => {
        $(
            $callback!($tt);
        )*
    };
}
pub use __apply;

/// Like [`assert_eq!`], but for [`Choice`][subtle::Choice].
#[macro_export]
macro_rules! assert_ct_eq {
    ($lhs:expr, $rhs:expr) => {
        assert!(bool::from(::subtle::ConstantTimeEq::ct_eq(&$lhs, &$rhs)))
    };
    ($lhs:expr, $rhs:expr, ) => {
        $crate::assert_ct_eq!($lhs, $rhs)
    };
    ($lhs:expr, $rhs:expr, $($args:tt)+) => {
        assert!(bool::from(::subtle::ConstantTimeEq::ct_eq(&$lhs, &$rhs)), $($args)+)
    };
}
pub use assert_ct_eq;

/// Like [`assert_ne!`], but for [`Choice`][subtle::Choice].
#[macro_export]
macro_rules! assert_ct_ne {
    ($lhs:expr, $rhs:expr) => {
        assert!(bool::from(::subtle::ConstantTimeEq::ct_ne(&$lhs, &$rhs)))
    };
    ($lhs:expr, $rhs:expr, ) => {
        $crate::assert_ct_ne!($lhs, $rhs)
    };
    ($lhs:expr, $rhs:expr, $($args:tt)+) => {
        assert!(bool::from(::subtle::ConstantTimeEq::ct_ne(&$lhs, &$rhs)), $($args)+)
    };
}
pub use assert_ct_ne;
