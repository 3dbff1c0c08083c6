//! Encoder for synthetic cmus cache files.
//!
//! Produces the same layout cmus writes, for fixtures and benchmarks: each
//! record starts on a word boundary and the padding goes before it, so the
//! last record ends the file unpadded. It can also emit raw string tables so
//! callers can build deliberately broken records.

use std::fs;
use std::io;
use std::path::Path;

use crate::cache::layout::{ByteOrder, CacheLayout, WordSize, CACHE_SIGNATURE, FILE_HEADER_SIZE};

#[derive(Debug, Clone)]
pub struct CacheWriter {
    layout: CacheLayout,
    buf: Vec<u8>,
}

impl CacheWriter {
    /// Start a cache with a valid signature.
    #[must_use]
    pub fn new(layout: CacheLayout) -> Self {
        let mut buf = Vec::with_capacity(4096);
        buf.extend_from_slice(&CACHE_SIGNATURE);
        buf.resize(FILE_HEADER_SIZE, 0);
        Self { layout, buf }
    }

    /// Append a well-formed record for `path` with the given tags.
    pub fn push_track(&mut self, path: &str, duration: i32, mtime: i64, tags: &[(&str, &str)]) -> &mut Self {
        let mut strings: Vec<&[u8]> = Vec::with_capacity(1 + tags.len() * 2);
        strings.push(path.as_bytes());
        for (key, value) in tags {
            strings.push(key.as_bytes());
            strings.push(value.as_bytes());
        }
        self.push_strings(duration, mtime, &strings)
    }

    /// Append a record whose string table is `strings`, each NUL-terminated,
    /// with no validation.
    pub fn push_strings(&mut self, duration: i32, mtime: i64, strings: &[&[u8]]) -> &mut Self {
        let header_size = self.layout.record_header_size();
        let table_len: usize = strings.iter().map(|s| s.len() + 1).sum();
        let entry_size = u32::try_from(header_size + table_len).unwrap_or(u32::MAX);

        let start = self.start_record();
        self.put_u32(entry_size);
        self.put_i32(duration);
        self.buf.resize(start + self.layout.mtime_offset(), 0);
        self.put_long(mtime);
        for s in strings {
            self.buf.extend_from_slice(s);
            self.buf.push(0);
        }
        self
    }

    /// Append raw bytes at the next record boundary, e.g. a truncated
    /// trailing record.
    pub fn push_raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.start_record();
        self.buf.extend_from_slice(bytes);
        self
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// # Errors
    ///
    /// Propagates the failure of writing `path`.
    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        fs::write(path, &self.buf)
    }

    /// Pad the previous record out to a word boundary and return where the
    /// next one starts. The file header is already aligned.
    fn start_record(&mut self) -> usize {
        let start = self.layout.align(self.buf.len());
        self.buf.resize(start, 0);
        start
    }

    fn put_u32(&mut self, v: u32) {
        let bytes = match self.layout.byte_order() {
            ByteOrder::Little => v.to_le_bytes(),
            ByteOrder::Big => v.to_be_bytes(),
        };
        self.buf.extend_from_slice(&bytes);
    }

    fn put_i32(&mut self, v: i32) {
        let bytes = match self.layout.byte_order() {
            ByteOrder::Little => v.to_le_bytes(),
            ByteOrder::Big => v.to_be_bytes(),
        };
        self.buf.extend_from_slice(&bytes);
    }

    fn put_long(&mut self, v: i64) {
        match self.layout.word_size() {
            // Narrowing mirrors a 32-bit `long`.
            #[allow(clippy::cast_possible_truncation)]
            WordSize::Four => self.put_i32(v as i32),
            WordSize::Eight => {
                let bytes = match self.layout.byte_order() {
                    ByteOrder::Little => v.to_le_bytes(),
                    ByteOrder::Big => v.to_be_bytes(),
                };
                self.buf.extend_from_slice(&bytes);
            }
        }
    }
}
