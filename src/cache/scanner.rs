//! # Cache Scanner
//!
//! Walks a cache buffer from its signature to its last record and builds the
//! [`ArtistIndex`]. With a [`LibrarySet`] attached, records whose path is not
//! in the library are skipped.
//!
//! ## Corrupt records
//!
//! - [`ScanPolicy::FailFast`] (default): the first malformed record aborts
//!   the scan and nothing indexed so far is returned.
//! - [`ScanPolicy::SkipMalformed`]: a record with a bad string table is
//!   logged and skipped. Broken framing still aborts, because the next
//!   record boundary is unknown.

use std::fs::File;
use std::path::Path;

use log::{debug, warn};
use memmap2::Mmap;
use serde::{Deserialize, Serialize};

use crate::cache::layout::{CacheLayout, CACHE_SIGNATURE, FILE_HEADER_SIZE};
use crate::cache::record::{decode_frame, decode_strings, ByteCursor, CacheRecord};
use crate::error::CacheError;
use crate::index::ArtistIndex;
use crate::library::LibrarySet;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanPolicy {
    #[default]
    FailFast,
    SkipMalformed,
}

/// Check the 8-byte file header.
///
/// # Errors
///
/// Returns [`CacheError::Signature`] for buffers shorter than the header or
/// not starting with `"CTC\x02"`.
pub fn check_signature(buf: &[u8]) -> Result<(), CacheError> {
    if buf.len() < FILE_HEADER_SIZE || buf[..CACHE_SIGNATURE.len()] != CACHE_SIGNATURE {
        return Err(CacheError::Signature);
    }
    Ok(())
}

/// Iterator over the records after the file header, yielding each record's
/// start offset with its decoding result.
///
/// Stops after the first framing error. String-table errors are yielded and
/// iteration continues with the next record. The final record may end the
/// buffer without its padding.
#[derive(Debug, Clone)]
pub struct Records<'a> {
    cursor: ByteCursor<'a>,
    layout: CacheLayout,
    offset: usize,
    done: bool,
}

impl<'a> Records<'a> {
    /// Records of `buf`. The signature is not checked here.
    #[must_use]
    pub fn new(buf: &'a [u8], layout: CacheLayout) -> Self {
        Self {
            cursor: ByteCursor::new(buf, layout),
            layout,
            offset: FILE_HEADER_SIZE,
            done: false,
        }
    }
}

impl Iterator for Records<'_> {
    type Item = (usize, Result<CacheRecord, CacheError>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.offset >= self.cursor.len() {
            return None;
        }
        let offset = self.offset;

        let frame = match decode_frame(&self.cursor, offset) {
            Ok(frame) => frame,
            Err(e) => {
                self.done = true;
                return Some((offset, Err(e)));
            }
        };

        // cmus pads before each record, so the last one may end the file
        // unpadded; an offset at or past the end stops the next call.
        self.offset = frame.next_offset(&self.layout);

        Some((offset, decode_strings(&self.cursor, &frame)))
    }
}

/// Turns a cache buffer into an [`ArtistIndex`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheScanner<'lib> {
    layout: CacheLayout,
    policy: ScanPolicy,
    restrict_to: Option<&'lib LibrarySet>,
}

impl<'lib> CacheScanner<'lib> {
    #[must_use]
    pub fn new(layout: CacheLayout) -> Self {
        Self {
            layout,
            policy: ScanPolicy::default(),
            restrict_to: None,
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: ScanPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Only index records whose path is in `library`. `None` indexes every
    /// record.
    #[must_use]
    pub fn restrict_to(mut self, library: Option<&'lib LibrarySet>) -> Self {
        self.restrict_to = library;
        self
    }

    #[must_use]
    pub fn layout(&self) -> CacheLayout {
        self.layout
    }

    /// Scan a whole cache buffer.
    ///
    /// # Errors
    ///
    /// - [`CacheError::Signature`] if the header is invalid.
    /// - [`CacheError::Framing`] / [`CacheError::Record`] for the first
    ///   malformed record, subject to the scan policy.
    pub fn scan(&self, buf: &[u8]) -> Result<ArtistIndex, CacheError> {
        check_signature(buf)?;

        let mut index = ArtistIndex::new();
        let mut skipped = 0_usize;
        for (offset, record) in Records::new(buf, self.layout) {
            let record = match record {
                Ok(record) => record,
                Err(e) if e.is_record_local() && self.policy == ScanPolicy::SkipMalformed => {
                    warn!("skipping malformed cache record at offset {offset}: {e}");
                    skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            if let Some(library) = self.restrict_to {
                if !library.contains(&record.path) {
                    continue;
                }
            }
            index.insert_record(&record);
        }

        debug!(
            "indexed {} artists ({} tracks) from {} cache bytes, {skipped} records skipped",
            index.len(),
            index.track_count(),
            buf.len()
        );
        Ok(index)
    }

    /// Map the cache file read-only and scan it. The mapping and file handle
    /// are released before this returns, on success or failure.
    ///
    /// # Errors
    ///
    /// [`CacheError::Io`] if the file cannot be opened or mapped, otherwise
    /// whatever [`CacheScanner::scan`] reports.
    pub fn scan_file(&self, path: &Path) -> Result<ArtistIndex, CacheError> {
        let io_err = |source| CacheError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(io_err)?;
        if file.metadata().map_err(io_err)?.len() == 0 {
            return self.scan(&[]);
        }

        // Safety: read-only mapping. cmus only rewrites the cache on exit
        // and does so by renaming a new file over it, so the mapped inode is
        // never truncated underneath us.
        let map = unsafe { Mmap::map(&file) }.map_err(io_err)?;
        self.scan(&map)
    }
}
