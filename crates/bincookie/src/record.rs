//! Cookie record codec.
//!
//! ```text
//! Off  Size  Field
//! 0    4     total size (LE)
//! 4    12    reserved
//! 16   4     domain offset (LE)
//! 20   4     name offset (LE)
//! 24   4     path offset (LE)
//! 28   4     value offset (LE)
//! 32   8     reserved
//! 40   8     expires (f64 LE)
//! 48   8     created (f64 LE)
//! 56   ...   zero-terminated strings addressed by the offsets above
//! ```
//!
//! String offsets are relative to the start of the record and must resolve
//! to a terminated string inside the record's own bytes.

use byteorder::LittleEndian;
use tracing::debug;

use crate::error::{CodecError, Field, Result};
use crate::primitive::{encode_cstr, Reader, Timestamp, Writer, TIMESTAMP_BYTES};

/// Reserved bytes between the size field and the string offsets.
const RESERVED_AFTER_SIZE: usize = 12;
/// Reserved bytes between the string offsets and the timestamps.
const RESERVED_AFTER_OFFSETS: usize = 8;

/// Size of the fixed record header: 4 + 12 + 4*4 + 8 + 8*2.
pub const RECORD_HEADER_BYTES: usize =
    4 + RESERVED_AFTER_SIZE + 4 * 4 + RESERVED_AFTER_OFFSETS + 2 * TIMESTAMP_BYTES;

/// A single decoded cookie.
#[derive(Debug, Clone, PartialEq)]
pub struct CookieRecord {
    pub domain: String,
    pub name: String,
    pub path: String,
    pub value: String,
    pub created: Timestamp,
    pub expires: Timestamp,
}

impl CookieRecord {
    /// Returns the string stored in `field`.
    #[must_use]
    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Domain => &self.domain,
            Field::Name => &self.name,
            Field::Path => &self.path,
            Field::Value => &self.value,
        }
    }

    /// Size of this record once encoded, terminators included.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        RECORD_HEADER_BYTES
            + Field::ALL
                .iter()
                .map(|&f| self.field(f).len() + 1)
                .sum::<usize>()
    }
}

/// Decodes one record starting at `start`.
///
/// `size` is the record length implied by the enclosing page; `0` means the
/// record runs to the end of `buf`. The record's own size field must match
/// it exactly.
///
/// # Errors
///
/// - [`CodecError::OutOfInput`] if the header or a string lies past the
///   record's bytes.
/// - [`CodecError::SizeMismatch`] if the size field disagrees with `size`.
/// - [`CodecError::UnterminatedString`] or [`CodecError::InvalidUtf8`] for a
///   string with no zero byte before the record end, or with invalid UTF-8.
pub fn decode_record(buf: &[u8], start: usize, size: usize) -> Result<CookieRecord> {
    let expected = if size == 0 {
        buf.len().saturating_sub(start)
    } else {
        size
    };

    let declared = Reader::at(buf, start).read_u32::<LittleEndian>()?;
    if declared as usize != expected {
        return Err(CodecError::SizeMismatch { declared, expected });
    }

    let mut outer = Reader::at(buf, start);
    let rec = outer.read_bytes(expected)?;

    let mut r = Reader::at(rec, 4);
    r.skip(RESERVED_AFTER_SIZE)?;
    let mut offsets = [0u32; 4];
    for off in offsets.iter_mut() {
        *off = r.read_u32::<LittleEndian>()?;
    }
    r.skip(RESERVED_AFTER_OFFSETS)?;
    let expires = r.read_timestamp()?;
    let created = r.read_timestamp()?;

    Ok(CookieRecord {
        domain: read_field(rec, offsets[0], Field::Domain)?,
        name: read_field(rec, offsets[1], Field::Name)?,
        path: read_field(rec, offsets[2], Field::Path)?,
        value: read_field(rec, offsets[3], Field::Value)?,
        created,
        expires,
    })
}

fn read_field(rec: &[u8], offset: u32, field: Field) -> Result<String> {
    let s = Reader::at(rec, offset as usize).read_cstr()?;
    if !s.terminated {
        return Err(CodecError::UnterminatedString { field });
    }
    std::str::from_utf8(s.bytes)
        .map(str::to_owned)
        .map_err(|_| CodecError::InvalidUtf8 { field })
}

/// Encodes one record.
///
/// Strings are packed right after the header in domain, name, path, value
/// order. Timestamps are written expires first, matching the decode order.
pub fn encode_record(record: &CookieRecord) -> Result<Vec<u8>> {
    let mut strings = Vec::with_capacity(Field::ALL.len());
    for field in Field::ALL {
        let bytes = encode_cstr(record.field(field)).inspect_err(|e| {
            debug!(%field, error = %e, "cannot encode cookie string");
        })?;
        strings.push(bytes);
    }

    let size = RECORD_HEADER_BYTES + strings.iter().map(Vec::len).sum::<usize>();
    let mut w = Writer::with_capacity(size);
    w.put_len::<LittleEndian>(size)?;
    w.put_padding(RESERVED_AFTER_SIZE);

    let mut offset = RECORD_HEADER_BYTES;
    for s in &strings {
        w.put_len::<LittleEndian>(offset)?;
        offset += s.len();
    }

    w.put_padding(RESERVED_AFTER_OFFSETS);
    w.put_timestamp(record.expires);
    w.put_timestamp(record.created);
    for s in &strings {
        w.put_bytes(s);
    }

    debug_assert_eq!(w.len(), size);
    Ok(w.into_inner())
}
