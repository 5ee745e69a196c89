//! eXtendable Output Function ([XOF]) seams.
//!
//! [XOF]: https://csrc.nist.gov/glossary/term/extendable_output_function

#![forbid(unsafe_code)]

/// An extendable output function.
///
/// Unlike a [`Digest`][crate::hash::Digest], an XOF can squeeze
/// an arbitrary number of output bytes. The KMAC XOF types
/// ([`KmacXof128`][crate::kmac::KmacXof128],
/// [`KmacXof256`][crate::kmac::KmacXof256]) implement this
/// trait.
pub trait Xof: Clone {
    /// Reads output bytes.
    type Reader: XofReader;

    /// Updates the running state with `data`.
    fn update(&mut self, data: &[u8]);

    /// Finalizes the XOF, returning its output reader.
    fn finalize_xof(self) -> Self::Reader;

    /// Writes `out.len()` bytes of XOF output to `out`.
    fn finalize_xof_into(self, out: &mut [u8]) {
        self.finalize_xof().read(out);
    }
}

/// Output bytes from an [`Xof`].
///
/// Readers may be read from repeatedly, in chunks of any size;
/// the concatenation of all reads is the XOF's output stream.
pub trait XofReader {
    /// Fills `out` with the next `out.len()` output bytes.
    fn read(&mut self, out: &mut [u8]);

    /// Reads the next `N` output bytes.
    fn read_fixed<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        self.read(&mut out);
        out
    }
}
