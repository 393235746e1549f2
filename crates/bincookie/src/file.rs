//! Whole-file decode and encode built on the container, page and record
//! layers.

use std::collections::HashSet;

use tracing::debug;

use crate::container::{assemble_container, decode_container, Checksum};
use crate::error::Result;
use crate::page::{assemble_page, decode_page, page_header_len};
use crate::record::{decode_record, encode_record, CookieRecord};

/// Default byte budget for a page produced by [`encode`].
pub const DEFAULT_PAGE_BUDGET: usize = 4096;

/// All cookies of a file, flattened across pages, plus the file checksum.
///
/// `modified` is false for a freshly decoded file and becomes true once
/// records are removed through [`CookieFile::without`]. The checksum covers
/// the records as they were decoded, so it no longer matches a modified
/// file. Code that edits `records` directly must set the flag itself.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CookieFile {
    pub records: Vec<CookieRecord>,
    pub checksum: Checksum,
    pub modified: bool,
}

impl CookieFile {
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns a copy with the records at `indices` removed. Duplicate and
    /// out-of-range indices are ignored.
    #[must_use]
    pub fn without(&self, indices: &[usize]) -> CookieFile {
        let drop: HashSet<usize> = indices.iter().copied().collect();
        let records: Vec<CookieRecord> = self
            .records
            .iter()
            .enumerate()
            .filter(|(i, _)| !drop.contains(i))
            .map(|(_, r)| r.clone())
            .collect();
        let removed_any = records.len() != self.records.len();
        CookieFile {
            records,
            checksum: self.checksum,
            modified: self.modified || removed_any,
        }
    }
}

/// Cookies grouped by the page they were stored in.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CookiePages {
    pub pages: Vec<Vec<CookieRecord>>,
    pub checksum: Checksum,
}

impl CookiePages {
    /// Flattens the pages into a single record list, preserving order.
    #[must_use]
    pub fn flatten(self) -> CookieFile {
        CookieFile {
            records: self.pages.into_iter().flatten().collect(),
            checksum: self.checksum,
            modified: false,
        }
    }
}

/// Options for [`encode_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Upper bound on the size of a page in bytes. A record that does not fit
    /// in an empty page gets a page of its own.
    pub page_budget: usize,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            page_budget: DEFAULT_PAGE_BUDGET,
        }
    }
}

/// Decodes a binary cookie file into its records and checksum.
///
/// # Errors
///
/// Returns the first [`CodecError`](crate::CodecError) hit while decoding
/// the container, any page, or any record. Nothing is returned for a file
/// that fails anywhere.
pub fn decode(bytes: &[u8]) -> Result<CookieFile> {
    decode_pages(bytes).map(CookiePages::flatten)
}

/// Decodes a binary cookie file, keeping the page grouping.
pub fn decode_pages(bytes: &[u8]) -> Result<CookiePages> {
    let container = decode_container(bytes)?;
    let mut pages = Vec::with_capacity(container.pages.len());
    for page in &container.pages {
        let window = &bytes[..page.end];
        let mut records = Vec::new();
        for span in decode_page(window, page.start, page.len())? {
            records.push(decode_record(&window[..span.end], span.start, span.len())?);
        }
        pages.push(records);
    }
    debug!(
        pages = pages.len(),
        records = pages.iter().map(Vec::len).sum::<usize>(),
        "decoded cookie file"
    );
    Ok(CookiePages {
        pages,
        checksum: container.checksum,
    })
}

/// Returns the raw bytes of every page plus the checksum.
pub fn raw_pages(bytes: &[u8]) -> Result<(Vec<&[u8]>, Checksum)> {
    let container = decode_container(bytes)?;
    let pages = container.pages.iter().map(|p| &bytes[p.clone()]).collect();
    Ok((pages, container.checksum))
}

/// Returns the raw bytes of every record plus the checksum. Records are not
/// decoded.
pub fn raw_records(bytes: &[u8]) -> Result<(Vec<&[u8]>, Checksum)> {
    let container = decode_container(bytes)?;
    let mut records = Vec::new();
    for page in &container.pages {
        let window = &bytes[..page.end];
        for span in decode_page(window, page.start, page.len())? {
            records.push(&window[span]);
        }
    }
    Ok((records, container.checksum))
}

/// Encodes `records` with the default page budget.
pub fn encode(records: &[CookieRecord], checksum: Checksum) -> Result<Vec<u8>> {
    encode_with(records, checksum, &EncodeOptions::default())
}

/// Encodes `records`, packing them greedily into pages of at most
/// `options.page_budget` bytes.
///
/// # Errors
///
/// Returns [`CodecError::EmbeddedTerminator`](crate::CodecError::EmbeddedTerminator)
/// when a record string contains a zero byte, and
/// [`CodecError::ValueOverflow`](crate::CodecError::ValueOverflow) when a
/// record, page, or page count does not fit in a `u32`.
pub fn encode_with(
    records: &[CookieRecord],
    checksum: Checksum,
    options: &EncodeOptions,
) -> Result<Vec<u8>> {
    let mut pages: Vec<Vec<u8>> = Vec::new();
    let mut current: Vec<Vec<u8>> = Vec::new();
    let mut current_len = 0usize;

    for record in records {
        let encoded = encode_record(record)?;
        let grown = page_header_len(current.len() + 1) + current_len + encoded.len();
        if !current.is_empty() && grown > options.page_budget {
            pages.push(assemble_page(&current)?);
            current.clear();
            current_len = 0;
        }
        current_len += encoded.len();
        current.push(encoded);
    }
    if !current.is_empty() {
        pages.push(assemble_page(&current)?);
    }

    debug!(
        records = records.len(),
        pages = pages.len(),
        budget = options.page_budget,
        "encoding cookie file"
    );
    assemble_container(&pages, checksum)
}

/// Encodes records with an explicit page grouping, one page per entry.
pub fn encode_pages(pages: &CookiePages) -> Result<Vec<u8>> {
    let mut encoded = Vec::with_capacity(pages.pages.len());
    for page in &pages.pages {
        let records = page
            .iter()
            .map(encode_record)
            .collect::<Result<Vec<_>>>()?;
        encoded.push(assemble_page(&records)?);
    }
    assemble_container(&encoded, pages.checksum)
}
