//! # Store - persistence and filtering collaborators
//!
//! The [`bincookie`] codec is pure. This crate connects it to the outside
//! world:
//!
//! - [`CookieStore`] supplies raw cookies to the codec and persists the
//!   re-encoded result. [`BinaryCookieFile`] implements it over a file.
//! - [`CookieFilter`] inspects decoded records and picks the ones to remove.
//!   Any `Fn(&CookieRecord) -> bool` predicate is a filter.
//! - [`purge`] ties the two together: load, select, rewrite.
//!
//! ## Example
//!
//! ```rust,no_run
//! use store::{purge, BinaryCookieFile};
//!
//! let file = BinaryCookieFile::new("Cookies.binarycookies");
//! let removed = purge(&file, &|c: &bincookie::CookieRecord| c.domain.ends_with(".ads.example")).unwrap();
//! println!("removed {removed} cookies");
//! ```

use anyhow::{bail, Context, Result};
use bincookie::{decode, encode_with, CookieFile, CookieRecord, EncodeOptions};
use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Source and sink of a cookie file.
pub trait CookieStore {
    /// Reads and decodes every cookie in the store.
    fn load(&self) -> Result<CookieFile>;

    /// Encodes `file` and replaces the store's contents with it.
    fn save(&self, file: &CookieFile) -> Result<()>;
}

/// Picks records to remove from a decoded cookie list.
pub trait CookieFilter {
    /// Returns the indices of the records to remove.
    fn select(&self, records: &[CookieRecord]) -> Vec<usize>;
}

impl<F> CookieFilter for F
where
    F: Fn(&CookieRecord) -> bool,
{
    fn select(&self, records: &[CookieRecord]) -> Vec<usize> {
        records
            .iter()
            .enumerate()
            .filter(|(_, r)| self(r))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Loads `store`, removes every record chosen by `filter`, and saves the
/// result. The store is left untouched when nothing is selected.
///
/// Returns the number of records removed.
pub fn purge<S, F>(store: &S, filter: &F) -> Result<usize>
where
    S: CookieStore + ?Sized,
    F: CookieFilter + ?Sized,
{
    let file = store.load()?;
    let selected = filter.select(&file.records);
    if selected.is_empty() {
        debug!(records = file.len(), "nothing to purge");
        return Ok(0);
    }
    let kept = file.without(&selected);
    let removed = file.len() - kept.len();
    store.save(&kept)?;
    info!(removed, kept = kept.len(), "purged cookies");
    Ok(removed)
}

/// A binary cookie file on disk.
///
/// Saving is crash-safe: the encoded file is written to `<path>.tmp`,
/// fsynced, and atomically renamed over `path`. With backups enabled the
/// previous file is first copied to `<path>.bak`.
///
/// The file checksum cannot be recomputed, so a [`CookieFile`] whose records
/// were changed after decoding is refused unless the store was built with
/// [`with_untrusted_checksum(true)`](Self::with_untrusted_checksum). In that
/// case the stale checksum is written as is.
#[derive(Debug, Clone)]
pub struct BinaryCookieFile {
    path: PathBuf,
    options: EncodeOptions,
    backup: bool,
    untrusted_checksum: bool,
}

impl BinaryCookieFile {
    /// Creates a store for `path` with default encode options and no backup.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            options: EncodeOptions::default(),
            backup: false,
            untrusted_checksum: false,
        }
    }

    #[must_use]
    pub fn with_encode_options(mut self, options: EncodeOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_backup(mut self, backup: bool) -> Self {
        self.backup = backup;
        self
    }

    /// Allows saving modified files with the checksum they were loaded with.
    #[must_use]
    pub fn with_untrusted_checksum(mut self, allow: bool) -> Self {
        self.untrusted_checksum = allow;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the backup copy written before an overwrite.
    #[must_use]
    pub fn backup_path(&self) -> PathBuf {
        self.sibling(".bak")
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(suffix);
        PathBuf::from(name)
    }

    /// Reads the raw bytes of the file.
    pub fn read_bytes(&self) -> Result<Vec<u8>> {
        fs::read(&self.path).with_context(|| format!("reading {}", self.path.display()))
    }
}

impl CookieStore for BinaryCookieFile {
    fn load(&self) -> Result<CookieFile> {
        let bytes = self.read_bytes()?;
        let file = decode(&bytes)
            .inspect_err(|e| warn!(path = %self.path.display(), error = %e, "cannot decode cookie file"))
            .with_context(|| format!("decoding {}", self.path.display()))?;
        debug!(path = %self.path.display(), records = file.len(), "loaded cookie file");
        Ok(file)
    }

    fn save(&self, file: &CookieFile) -> Result<()> {
        if file.modified {
            if !self.untrusted_checksum {
                bail!(
                    "refusing to save {}: records changed and the checksum cannot be recomputed",
                    self.path.display()
                );
            }
            warn!(path = %self.path.display(), checksum = %file.checksum, "saving modified file with stale checksum");
        }

        let bytes = encode_with(&file.records, file.checksum, &self.options)
            .with_context(|| format!("encoding {}", self.path.display()))?;

        let tmp_path = self.sibling(".tmp");
        {
            let mut tmp = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&tmp_path)
                .with_context(|| format!("creating {}", tmp_path.display()))?;
            tmp.write_all(&bytes)?;
            tmp.flush()?;
            tmp.sync_all()?;
        }

        if self.backup && self.path.exists() {
            let backup = self.backup_path();
            fs::copy(&self.path, &backup)
                .with_context(|| format!("backing up to {}", backup.display()))?;
        }

        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e).with_context(|| format!("replacing {}", self.path.display()));
        }

        // Make the rename durable.
        if let Ok(dir) = fs::File::open(parent_dir(&self.path)) {
            let _ = dir.sync_all();
        }

        debug!(path = %self.path.display(), records = file.len(), bytes = bytes.len(), "saved cookie file");
        Ok(())
    }
}

/// Directory holding `path`. A bare file name lives in the current directory.
fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
