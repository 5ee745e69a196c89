//! [`Mac`] tests.

use alloc::{boxed::Box, vec};

use crate::{
    mac::Mac,
    test_util::{assert_ct_eq, assert_ct_ne, test_key},
};

/// Invokes `callback` for each MAC test.
///
/// # Example
///
/// ```
/// use keymac::hmac::HmacSha256;
///
/// macro_rules! run_test {
///     ($test:ident) => {
///         keymac::test_util::mac::$test::<HmacSha256>(20, |key| {
///             HmacSha256::new(key).expect("should create the MAC")
///         });
///     }
/// }
/// keymac::for_each_mac_test!(run_test);
/// ```
#[macro_export]
macro_rules! for_each_mac_test {
    ($callback:ident) => {
        $crate::__apply! {
            $callback,
            test_determinism,
            test_incremental_update,
            test_finalize_reprimes,
            test_reset,
            test_clone_independence,
            test_finalize_into,
            test_verify,
            test_rekey,
            test_different_keys,
            test_different_data,
            test_boxed_clone,
        }
    };
}

/// Performs MAC tests.
///
/// This macro expands into a bunch of individual `#[test]`
/// functions. The two-argument form constructs the MAC with
/// `<$mac>::new(key)` and 20-byte keys; engines with other
/// constructors supply a key length and a builder closure.
///
/// # Example
///
/// ```
/// use keymac::{test_mac, hmac::HmacSha256, siphash::SipHash};
///
/// test_mac!(mod hmac_sha256, HmacSha256);
/// test_mac!(mod siphash, SipHash, 16, |key: &[u8]| {
///     SipHash::new(key).expect("should create the MAC")
/// });
/// ```
#[macro_export]
macro_rules! test_mac {
    (mod $name:ident, $mac:ty) => {
        $crate::test_mac!(mod $name, $mac, 20, |key: &[u8]| {
            <$mac>::new(key).expect("should create the MAC")
        });
    };
    (mod $name:ident, $mac:ty, $key_len:expr, $new:expr) => {
        mod $name {
            #[allow(unused_imports)]
            use super::*;

            macro_rules! __mac_test {
                ($test:ident) => {
                    #[test]
                    fn $test() {
                        $crate::test_util::mac::$test::<$mac>($key_len, $new);
                    }
                };
            }
            $crate::for_each_mac_test!(__mac_test);
        }
    };
}
pub use test_mac;

const DATA: &[u8] = b"hello, world!";

/// Basic positive test: the same key and data produce the same
/// tag.
pub fn test_determinism<T: Mac>(key_len: usize, new: impl Fn(&[u8]) -> T) {
    let key = test_key(key_len, 1);
    let mut m1 = new(&key);
    let mut m2 = new(&key);
    m1.update(DATA);
    m2.update(DATA);
    let (tag1, tag2) = (m1.finalize(), m2.finalize());
    assert_eq!(tag1.len(), m1.mac_len());
    assert_ct_eq!(tag1[..], tag2[..], "tags should be the same");
}

/// Feeding the message one byte at a time matches a single
/// [`Mac::update`].
pub fn test_incremental_update<T: Mac>(key_len: usize, new: impl Fn(&[u8]) -> T) {
    let key = test_key(key_len, 1);
    let mut m1 = new(&key);
    m1.update(DATA);
    let mut m2 = new(&key);
    for c in DATA {
        m2.update(&[*c]);
    }
    assert_ct_eq!(m1.finalize()[..], m2.finalize()[..], "tags should be the same");
}

/// [`Mac::finalize`] leaves the engine primed for the next
/// message: a second finalize is the tag of the empty message.
pub fn test_finalize_reprimes<T: Mac>(key_len: usize, new: impl Fn(&[u8]) -> T) {
    let key = test_key(key_len, 1);
    let mut m = new(&key);
    m.update(DATA);
    let _ = m.finalize();
    let empty = new(&key).finalize();
    assert_ct_eq!(
        m.finalize()[..],
        empty[..],
        "finalize should re-prime for an empty message",
    );
}

/// [`Mac::reset`] discards pending input but keeps the key.
pub fn test_reset<T: Mac>(key_len: usize, new: impl Fn(&[u8]) -> T) {
    let key = test_key(key_len, 1);
    let mut m = new(&key);
    m.update(b"discarded");
    m.reset();
    m.update(DATA);
    let mut want = new(&key);
    want.update(DATA);
    assert_ct_eq!(m.finalize()[..], want.finalize()[..], "tags should be the same");
}

/// A cloned engine is an independent snapshot of key and pending
/// input.
pub fn test_clone_independence<T: Mac>(key_len: usize, new: impl Fn(&[u8]) -> T) {
    let key = test_key(key_len, 1);
    let mut m = new(&key);
    m.update(b"hello, ");
    let mut copy = m.clone_boxed();

    m.update(b"world!");
    copy.update(b"WORLD!");
    assert_ct_ne!(m.finalize()[..], copy.finalize()[..], "tags should differ");

    // Both engines are re-primed; they agree again.
    m.update(DATA);
    copy.update(DATA);
    assert_ct_eq!(m.finalize()[..], copy.finalize()[..], "tags should be the same");
}

/// [`Mac::finalize_into`] writes exactly `mac_len` bytes to the
/// front of the buffer and rejects short buffers without
/// disturbing the engine.
pub fn test_finalize_into<T: Mac>(key_len: usize, new: impl Fn(&[u8]) -> T) {
    let key = test_key(key_len, 1);
    let mut m = new(&key);
    let n = m.mac_len();
    m.update(DATA);

    let mut short = vec![0u8; n - 1];
    m.finalize_into(&mut short)
        .expect_err("a short buffer should be rejected");

    let mut dest = vec![0xaau8; n + 4];
    m.finalize_into(&mut dest)
        .expect("finalize_into should succeed");
    assert_eq!(&dest[n..], &[0xaa; 4], "bytes past the tag must be untouched");

    let mut want = new(&key);
    want.update(DATA);
    assert_ct_eq!(dest[..n], want.finalize()[..], "tags should be the same");
}

/// Tests [`Mac::verify`].
pub fn test_verify<T: Mac>(key_len: usize, new: impl Fn(&[u8]) -> T) {
    let key = test_key(key_len, 1);
    let mut m = new(&key);
    m.update(DATA);
    let tag = m.finalize();

    m.update(DATA);
    m.verify(&tag).expect("tags should be the same");

    m.update(DATA);
    m.verify(&tag[..tag.len() - 1])
        .expect_err("a truncated tag should not verify");

    let mut bad = tag.clone();
    bad[0] ^= 1;
    m.update(DATA);
    m.verify(&bad).expect_err("a corrupted tag should not verify");
}

/// [`Mac::rekey`] matches a freshly constructed engine.
pub fn test_rekey<T: Mac>(key_len: usize, new: impl Fn(&[u8]) -> T) {
    let key1 = test_key(key_len, 1);
    let key2 = test_key(key_len, 2);
    let mut m = new(&key1);
    m.update(b"stale");
    m.rekey(&key2).expect("rekey should succeed");
    m.update(DATA);
    let mut want = new(&key2);
    want.update(DATA);
    assert_ct_eq!(m.finalize()[..], want.finalize()[..], "tags should be the same");
}

/// Negative test for different keys.
pub fn test_different_keys<T: Mac>(key_len: usize, new: impl Fn(&[u8]) -> T) {
    let key1 = test_key(key_len, 1);
    let key2 = test_key(key_len, 2);
    let mut m1 = new(&key1);
    let mut m2 = new(&key2);
    m1.update(DATA);
    m2.update(DATA);
    assert_ct_ne!(m1.finalize()[..], m2.finalize()[..], "tags should differ");
}

/// Negative test for MACs of different data.
pub fn test_different_data<T: Mac>(key_len: usize, new: impl Fn(&[u8]) -> T) {
    let key = test_key(key_len, 1);
    let mut m1 = new(&key);
    let mut m2 = new(&key);
    m1.update(b"hello");
    m2.update(b"world");
    assert_ct_ne!(m1.finalize()[..], m2.finalize()[..], "tags should differ");
}

/// The object-safe surface behaves like the concrete type.
pub fn test_boxed_clone<T: Mac>(key_len: usize, new: impl Fn(&[u8]) -> T) {
    let key = test_key(key_len, 1);
    let mut m = new(&key);
    let mut boxed: Box<dyn Mac> = m.clone_boxed();
    assert_eq!(boxed.algorithm(), m.algorithm());
    assert_eq!(boxed.mac_len(), m.mac_len());

    let mut boxed2 = boxed.clone();
    m.update(DATA);
    boxed.update(DATA);
    boxed2.update(DATA);
    let want = m.finalize();
    assert_ct_eq!(boxed.finalize()[..], want[..], "tags should be the same");
    assert_ct_eq!(boxed2.finalize()[..], want[..], "tags should be the same");
}
