//! Fixed-width primitives shared by every layer of the format.
//!
//! ```text
//! u32        4 bytes, big-endian in the file header, little-endian elsewhere
//! timestamp  8 bytes, little-endian f64, seconds since 2001-01-01 (native epoch)
//! string     bytes followed by a single 0x00 terminator
//! ```
//!
//! Decoding goes through [`Reader`], a bounds-checked cursor that owns the
//! current offset. Encoding goes through [`Writer`], an append-only buffer.

use std::fmt;

use byteorder::ByteOrder;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::error::{CodecError, Result};

/// Seconds between the Unix epoch and the format's native timestamp epoch.
pub const EPOCH_OFFSET: f64 = 978_336_000.0;

/// Size in bytes of an encoded timestamp.
pub const TIMESTAMP_BYTES: usize = 8;

/// A point in time, held as seconds since the format's native epoch.
///
/// The stored value is exactly the f64 found on disk, so a decoded timestamp
/// re-encodes to the same bytes. Unix time is derived on request by adding
/// [`EPOCH_OFFSET`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Timestamp(f64);

impl Timestamp {
    /// Builds a timestamp from Unix seconds.
    #[must_use]
    pub fn from_unix_seconds(seconds: f64) -> Self {
        Self(seconds - EPOCH_OFFSET)
    }

    /// Wraps a timestamp expressed in native (format epoch) seconds.
    #[must_use]
    pub const fn from_native_seconds(seconds: f64) -> Self {
        Self(seconds)
    }

    /// Seconds since the Unix epoch.
    #[must_use]
    pub fn unix_seconds(self) -> f64 {
        self.0 + EPOCH_OFFSET
    }

    /// Seconds since the format's native epoch, as stored on disk.
    #[must_use]
    pub const fn native_seconds(self) -> f64 {
        self.0
    }

    /// Converts to a UTC datetime. Returns `None` for non-finite values and
    /// values outside the range `time` can represent.
    #[must_use]
    pub fn to_datetime(self) -> Option<OffsetDateTime> {
        let unix = self.unix_seconds();
        if !unix.is_finite() {
            return None;
        }
        let nanos = (unix * 1e9).round() as i128;
        OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime().and_then(|dt| dt.format(&Rfc3339).ok()) {
            Some(text) => f.write_str(&text),
            None => write!(f, "{}s", self.unix_seconds()),
        }
    }
}

/// A zero-terminated byte string located by [`Reader::read_cstr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZeroTerminated<'a> {
    /// String bytes, excluding the terminator.
    pub bytes: &'a [u8],
    /// `false` when the scan hit the end of the buffer before a zero byte.
    pub terminated: bool,
}

/// Bounds-checked forward cursor over an immutable byte buffer.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Creates a reader positioned at the start of `buf`.
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Creates a reader positioned at `pos`. The position may lie beyond the
    /// end of `buf`, in which case every read fails with `OutOfInput`.
    #[must_use]
    pub fn at(buf: &'a [u8], pos: usize) -> Self {
        Self { buf, pos }
    }

    /// Current absolute offset into the buffer.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Total length of the underlying buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if the underlying buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Bytes left between the cursor and the end of the buffer.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    /// Returns `true` once the cursor sits exactly at the end of the buffer.
    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.pos == self.buf.len()
    }

    fn out_of_input(&self, wanted: usize) -> CodecError {
        CodecError::OutOfInput {
            position: self.pos,
            wanted,
            available: self.remaining(),
        }
    }

    /// Reads exactly `n` bytes and advances past them.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.buf.len())
            .ok_or_else(|| self.out_of_input(n))?;
        let bytes = &self.buf[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    /// Reads exactly `N` bytes into an array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Skips `n` reserved bytes.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.read_bytes(n).map(|_| ())
    }

    /// Reads a 4-byte unsigned integer in byte order `B`.
    pub fn read_u32<B: ByteOrder>(&mut self) -> Result<u32> {
        Ok(B::read_u32(self.read_bytes(4)?))
    }

    /// Reads an 8-byte little-endian double holding native epoch seconds.
    pub fn read_timestamp(&mut self) -> Result<Timestamp> {
        let raw = byteorder::LittleEndian::read_f64(self.read_bytes(TIMESTAMP_BYTES)?);
        Ok(Timestamp::from_native_seconds(raw))
    }

    /// Scans forward to the next zero byte or the end of the buffer.
    ///
    /// When a terminator is found the cursor moves just past it; otherwise it
    /// moves to the end of the buffer.
    pub fn read_cstr(&mut self) -> Result<ZeroTerminated<'a>> {
        if self.pos > self.buf.len() {
            return Err(self.out_of_input(1));
        }
        let rest = &self.buf[self.pos..];
        match rest.iter().position(|&b| b == 0) {
            Some(nul) => {
                self.pos += nul + 1;
                Ok(ZeroTerminated {
                    bytes: &rest[..nul],
                    terminated: true,
                })
            }
            None => {
                self.pos = self.buf.len();
                Ok(ZeroTerminated {
                    bytes: rest,
                    terminated: false,
                })
            }
        }
    }
}

/// Encodes `value` as a 4-byte unsigned integer in byte order `B`.
pub fn encode_u32<B: ByteOrder>(value: i64) -> Result<[u8; 4]> {
    if value < 0 {
        return Err(CodecError::NegativeValue { value });
    }
    let value = u32::try_from(value).map_err(|_| CodecError::ValueOverflow {
        value: value as u64,
    })?;
    let mut out = [0u8; 4];
    B::write_u32(&mut out, value);
    Ok(out)
}

/// Encodes `value` followed by a zero terminator.
pub fn encode_cstr(value: &str) -> Result<Vec<u8>> {
    if let Some(index) = value.bytes().position(|b| b == 0) {
        return Err(CodecError::EmbeddedTerminator { index });
    }
    let mut out = Vec::with_capacity(value.len() + 1);
    out.extend_from_slice(value.as_bytes());
    out.push(0);
    Ok(out)
}

/// Encodes a timestamp as a little-endian double in native epoch seconds.
#[must_use]
pub fn encode_timestamp(ts: Timestamp) -> [u8; TIMESTAMP_BYTES] {
    let mut out = [0u8; TIMESTAMP_BYTES];
    byteorder::LittleEndian::write_f64(&mut out, ts.native_seconds());
    out
}

/// Append-only output buffer.
#[derive(Debug, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    /// Writes a 4-byte unsigned integer in byte order `B`.
    pub fn put_u32<B: ByteOrder>(&mut self, value: i64) -> Result<()> {
        let bytes = encode_u32::<B>(value)?;
        self.buf.extend_from_slice(&bytes);
        Ok(())
    }

    /// Writes a length or offset as a 4-byte unsigned integer.
    pub fn put_len<B: ByteOrder>(&mut self, value: usize) -> Result<()> {
        let value = i64::try_from(value).map_err(|_| CodecError::ValueOverflow {
            value: value as u64,
        })?;
        self.put_u32::<B>(value)
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Writes `n` zero bytes.
    pub fn put_padding(&mut self, n: usize) {
        self.buf.resize(self.buf.len() + n, 0);
    }

    pub fn put_timestamp(&mut self, ts: Timestamp) {
        self.buf.extend_from_slice(&encode_timestamp(ts));
    }
}
