//! Methods to convert read handles to and from byte slices.
//!
//! A [`PagesRef`] presents as four slices: the extras count `k` as one `usize`,
//! then the offsets, the counts, and the backing store as `u32` words. Reading them
//! back borrows the bytes in place, and checks that every record lies in bounds.

use crate::errors::{PagesError, Result};
use crate::pages::{validate, PagesRef};

pub trait AsBytes {
    /// Presents `self` as a sequence of byte slices, with their required alignment.
    fn as_bytes(&self) -> impl Iterator<Item=(usize, &[u8])>;
}

pub trait FromBytes<'a> : Sized {
    /// Reconstructs `self` from a sequence of correctly aligned and sized bytes slices.
    ///
    /// The implementation consumes exactly the slices it needs from the iterator,
    /// which may go on to be used by other implementations of `FromBytes`.
    fn from_bytes(bytes: &mut impl Iterator<Item=&'a [u8]>) -> Result<Self>;
}

impl<'a> AsBytes for PagesRef<'a> {
    fn as_bytes(&self) -> impl Iterator<Item=(usize, &[u8])> {
        let align = std::mem::align_of::<u32>();
        [
            (std::mem::align_of::<usize>(), bytemuck::bytes_of(&self.extras)),
            (align, bytemuck::cast_slice(self.offset)),
            (align, bytemuck::cast_slice(self.count)),
            (align, bytemuck::cast_slice(self.data)),
        ].into_iter()
    }
}

impl<'a> FromBytes<'a> for PagesRef<'a> {
    fn from_bytes(bytes: &mut impl Iterator<Item=&'a [u8]>) -> Result<Self> {
        let header = bytes.next().ok_or_else(|| PagesError::decode("missing header"))?;
        let extras: usize = bytemuck::try_pod_read_unaligned(header)
            .map_err(|e| PagesError::decode(format!("header: {e}")))?;
        let view = PagesRef {
            offset: words(bytes, "offsets")?,
            count: words(bytes, "counts")?,
            data: words(bytes, "data")?,
            extras,
        };
        validate(&view)?;
        Ok(view)
    }
}

fn words<'a>(bytes: &mut impl Iterator<Item=&'a [u8]>, name: &str) -> Result<&'a [u32]> {
    let slice = bytes.next().ok_or_else(|| PagesError::decode(format!("missing {name}")))?;
    bytemuck::try_cast_slice(slice).map_err(|e| PagesError::decode(format!("{name}: {e}")))
}
