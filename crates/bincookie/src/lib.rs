//! # bincookie - binary cookie file codec
//!
//! Decodes and encodes the `Cookies.binarycookies` container used by Safari
//! and other WebKit-based browsers. The codec is pure: it works on byte
//! buffers, performs no I/O and holds no state between calls.
//!
//! ## File layout
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │ FILE HEADER (big-endian)                                      │
//! │ "cook" | page_count (u32) | page_size (u32) * page_count      │
//! ├───────────────────────────────────────────────────────────────┤
//! │ PAGE (little-endian), repeated page_count times               │
//! │ 0x00000100 | record_count | offset * record_count | 0         │
//! │                                                               │
//! │   RECORD (little-endian), repeated record_count times         │
//! │   size | reserved(12) | 4 string offsets | reserved(8)        │
//! │   expires (f64) | created (f64) | zero-terminated strings     │
//! ├───────────────────────────────────────────────────────────────┤
//! │ CHECKSUM (8 bytes, opaque)                                    │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Timestamps are stored as seconds relative to an epoch
//! [`EPOCH_OFFSET`] seconds after the Unix epoch. [`Timestamp`] keeps the
//! stored value untouched and converts to Unix seconds on request, so
//! decoding and re-encoding never changes timestamp bytes.
//!
//! The trailing checksum algorithm is unknown. It is decoded as an opaque
//! [`Checksum`] and must be supplied by the caller when encoding.
//!
//! ## Example
//!
//! ```rust,no_run
//! let bytes = std::fs::read("Cookies.binarycookies").unwrap();
//! let file = bincookie::decode(&bytes).unwrap();
//! for c in &file.records {
//!     println!("{} {}={}", c.domain, c.name, c.value);
//! }
//! let out = bincookie::encode(&file.records, file.checksum).unwrap();
//! ```

mod container;
mod error;
mod file;
mod page;
mod primitive;
mod record;

pub use container::{assemble_container, decode_container, Checksum, Container, CHECKSUM_BYTES, FILE_MAGIC};
pub use error::{CodecError, Field, Result};
pub use file::{
    decode, decode_pages, encode, encode_pages, encode_with, raw_pages, raw_records, CookieFile,
    CookiePages, EncodeOptions, DEFAULT_PAGE_BUDGET,
};
pub use page::{assemble_page, decode_page, page_header_len, PAGE_MAGIC};
pub use primitive::{
    encode_cstr, encode_timestamp, encode_u32, Reader, Timestamp, Writer, ZeroTerminated,
    EPOCH_OFFSET, TIMESTAMP_BYTES,
};
pub use record::{decode_record, encode_record, CookieRecord, RECORD_HEADER_BYTES};

#[cfg(test)]
mod tests;
