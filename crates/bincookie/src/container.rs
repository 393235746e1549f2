//! Container (whole file) codec.
//!
//! ```text
//! Off      Size    Field
//! 0        4       "cook"
//! 4        4       page count n (BE)
//! 8        4*n     page sizes (BE)
//! 8+4n     ...     page data, back to back
//! eof-8    8       checksum (opaque)
//! ```
//!
//! The checksum algorithm is unknown. It is carried through unchanged and
//! never recomputed, so writing a file requires a checksum from the caller.

use std::fmt;
use std::ops::Range;

use byteorder::BigEndian;
use tracing::debug;

use crate::error::{CodecError, Result};
use crate::primitive::{Reader, Writer};

/// Magic bytes at the start of every binary cookie file.
pub const FILE_MAGIC: [u8; 4] = *b"cook";

/// Size of the trailing checksum.
pub const CHECKSUM_BYTES: usize = 8;

/// The opaque trailing checksum of a binary cookie file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Checksum(pub [u8; CHECKSUM_BYTES]);

impl Checksum {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; CHECKSUM_BYTES]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; CHECKSUM_BYTES] {
        &self.0
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

/// The container layer of a decoded file: page spans plus checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    /// Absolute byte span of every page, in file order.
    pub pages: Vec<Range<usize>>,
    pub checksum: Checksum,
}

/// Decodes the file header and trailer.
///
/// The input must be consumed exactly: trailing bytes after the checksum are
/// an error.
///
/// # Errors
///
/// - [`CodecError::FileMagicMismatch`] if the file does not start with
///   [`FILE_MAGIC`].
/// - [`CodecError::SanityBoundExceeded`] if the page count exceeds the
///   input length.
/// - [`CodecError::OutOfInput`] if the page table, a page, or the checksum
///   runs past the input.
/// - [`CodecError::IncompleteParse`] if bytes remain after the checksum.
pub fn decode_container(buf: &[u8]) -> Result<Container> {
    let mut r = Reader::new(buf);

    let magic = r.read_array::<4>()?;
    if magic != FILE_MAGIC {
        return Err(CodecError::FileMagicMismatch { found: magic });
    }

    let count = r.read_u32::<BigEndian>()?;
    // There can't be more pages than bytes of data.
    if count as usize > buf.len() {
        return Err(CodecError::SanityBoundExceeded {
            count,
            limit: buf.len(),
        });
    }

    let mut sizes = Vec::with_capacity(count as usize);
    for _ in 0..count {
        sizes.push(r.read_u32::<BigEndian>()? as usize);
    }

    let mut pos = r.position();
    let mut pages = Vec::with_capacity(sizes.len());
    for size in sizes {
        let end = pos.checked_add(size).ok_or(CodecError::OutOfInput {
            position: pos,
            wanted: size,
            available: buf.len().saturating_sub(pos),
        })?;
        pages.push(pos..end);
        pos = end;
    }

    let mut r = Reader::at(buf, pos);
    let checksum = Checksum(r.read_array::<CHECKSUM_BYTES>()?);
    if !r.is_at_end() {
        return Err(CodecError::IncompleteParse {
            position: r.position(),
            len: buf.len(),
        });
    }

    debug!(pages = pages.len(), bytes = buf.len(), %checksum, "decoded container");
    Ok(Container { pages, checksum })
}

/// Writes a complete file from already-encoded pages and a caller-supplied
/// checksum.
pub fn assemble_container<T: AsRef<[u8]>>(pages: &[T], checksum: Checksum) -> Result<Vec<u8>> {
    let body_len: usize = pages.iter().map(|p| p.as_ref().len()).sum();
    let mut w = Writer::with_capacity(8 + 4 * pages.len() + body_len + CHECKSUM_BYTES);

    w.put_bytes(&FILE_MAGIC);
    w.put_len::<BigEndian>(pages.len())?;
    for page in pages {
        w.put_len::<BigEndian>(page.as_ref().len())?;
    }
    for page in pages {
        w.put_bytes(page.as_ref());
    }
    w.put_bytes(checksum.as_bytes());

    debug!(pages = pages.len(), bytes = w.len(), "encoded container");
    Ok(w.into_inner())
}
