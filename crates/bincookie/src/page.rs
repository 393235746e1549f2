//! Page codec.
//!
//! ```text
//! Off      Size  Field
//! 0        4     page marker 0x00000100 (LE)
//! 4        4     record count n (LE)
//! 8        4*n   record offsets, relative to page start (LE)
//! 8+4n     4     sentinel, always 0
//! 12+4n    ...   record data
//! ```

use std::ops::Range;

use byteorder::LittleEndian;
use tracing::trace;

use crate::error::{CodecError, Result};
use crate::primitive::{Reader, Writer};

/// Marker at the start of every page.
pub const PAGE_MAGIC: u32 = 0x0000_0100;

/// Length of a page header holding `records` offsets plus the sentinel.
#[must_use]
pub const fn page_header_len(records: usize) -> usize {
    8 + 4 * (records + 1)
}

/// Decodes a page header and returns the absolute byte span of every record.
///
/// `size` is the page length; `0` means the page runs to the end of `buf`.
/// Spans are returned in ascending offset order and partition the record
/// area of the page.
///
/// # Errors
///
/// - [`CodecError::PageMagicMismatch`] if the marker is not [`PAGE_MAGIC`].
/// - [`CodecError::OutOfInput`] if the header runs past the page.
/// - [`CodecError::SentinelViolation`] if the offset list is not followed by
///   a zero.
/// - [`CodecError::RecordOffsetOutOfRange`] if an offset points past the
///   page end.
pub fn decode_page(buf: &[u8], start: usize, size: usize) -> Result<Vec<Range<usize>>> {
    let page_len = if size == 0 {
        buf.len().saturating_sub(start)
    } else {
        size
    };

    let mut r = Reader::at(buf, start);
    let magic = r.read_u32::<LittleEndian>()?;
    if magic != PAGE_MAGIC {
        return Err(CodecError::PageMagicMismatch { found: magic });
    }

    let count = r.read_u32::<LittleEndian>()? as usize;
    // Each offset takes 4 bytes, so a corrupt count cannot force a large
    // allocation before the reads start failing.
    let mut bounds = Vec::with_capacity(count.min(r.remaining() / 4) + 1);
    for _ in 0..count {
        bounds.push(r.read_u32::<LittleEndian>()?);
    }

    let sentinel = r.read_u32::<LittleEndian>()?;
    if sentinel != 0 {
        return Err(CodecError::SentinelViolation { found: sentinel });
    }

    if let Some(&offset) = bounds.iter().find(|&&o| o as usize > page_len) {
        return Err(CodecError::RecordOffsetOutOfRange { offset, page_len });
    }

    let mut bounds: Vec<usize> = bounds.into_iter().map(|o| o as usize).collect();
    bounds.push(page_len);
    // Some producers emit offsets out of order.
    bounds.sort_unstable();

    let spans: Vec<Range<usize>> = bounds
        .windows(2)
        .map(|w| start + w[0]..start + w[1])
        .collect();
    trace!(start, page_len, records = spans.len(), "decoded page header");
    Ok(spans)
}

/// Lays out already-encoded records behind a page header.
pub fn assemble_page<T: AsRef<[u8]>>(records: &[T]) -> Result<Vec<u8>> {
    let header_len = page_header_len(records.len());
    let body_len: usize = records.iter().map(|r| r.as_ref().len()).sum();

    let mut w = Writer::with_capacity(header_len + body_len);
    w.put_u32::<LittleEndian>(i64::from(PAGE_MAGIC))?;
    w.put_len::<LittleEndian>(records.len())?;

    let mut offset = header_len;
    for rec in records {
        w.put_len::<LittleEndian>(offset)?;
        offset += rec.as_ref().len();
    }
    w.put_len::<LittleEndian>(0)?;

    for rec in records {
        w.put_bytes(rec.as_ref());
    }
    Ok(w.into_inner())
}
