//! Error type shared by every codec layer.
//!
//! All variants are terminal: a failure aborts the unit being decoded or
//! encoded (record, page, or whole file) and is propagated to the caller
//! unchanged. No layer returns partial results.

use std::fmt;

use thiserror::Error;

/// One of the four offset-addressed string fields of a cookie record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Domain,
    Name,
    Path,
    Value,
}

impl Field {
    /// Fields in on-disk order.
    pub const ALL: [Field; 4] = [Field::Domain, Field::Name, Field::Path, Field::Value];
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Domain => "domain",
            Field::Name => "name",
            Field::Path => "path",
            Field::Value => "value",
        };
        f.write_str(name)
    }
}

/// Errors produced while decoding or encoding a binary cookie file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The file does not start with the `cook` magic.
    #[error("incorrect file magic: {found:02x?}")]
    FileMagicMismatch { found: [u8; 4] },

    /// The declared page count is larger than the whole input.
    #[error("page counter too large: {count} exceeds input length {limit}")]
    SanityBoundExceeded { count: u32, limit: usize },

    /// Decoding finished before consuming the whole input.
    #[error("incomplete parse at {position} != {len}")]
    IncompleteParse { position: usize, len: usize },

    /// A page does not start with the `0x00000100` marker.
    #[error("incorrect page magic number: {found:#010x}")]
    PageMagicMismatch { found: u32 },

    /// The page offset table is not terminated by a zero sentinel.
    #[error("incorrect page sentinel: {found:#010x}")]
    SentinelViolation { found: u32 },

    /// A page offset points past the end of its page.
    #[error("record offset {offset} outside page of {page_len} bytes")]
    RecordOffsetOutOfRange { offset: u32, page_len: usize },

    /// A record's size field disagrees with the size of its enclosing span.
    #[error("cookie size mismatch: {declared} != {expected}")]
    SizeMismatch { declared: u32, expected: usize },

    /// A fixed-width read ran past the end of the input.
    #[error("out of input at {position}: wanted {wanted} bytes, {available} available")]
    OutOfInput {
        position: usize,
        wanted: usize,
        available: usize,
    },

    /// A negative value was handed to an unsigned field encoder.
    #[error("negative value: {value}")]
    NegativeValue { value: i64 },

    /// A value does not fit in a 32-bit field.
    #[error("value {value} does not fit in 32 bits")]
    ValueOverflow { value: u64 },

    /// A string to be encoded contains a zero byte.
    #[error("string contains NUL at index {index}")]
    EmbeddedTerminator { index: usize },

    /// A string field runs to the end of its record without a terminator.
    #[error("unterminated {field} string")]
    UnterminatedString { field: Field },

    /// A string field is not valid UTF-8.
    #[error("{field} string is not valid UTF-8")]
    InvalidUtf8 { field: Field },
}

/// Result alias used throughout the codec.
pub type Result<T> = std::result::Result<T, CodecError>;
