//! # Cache Record Decoder
//!
//! A record is a fixed header followed by a NUL-separated string table:
//!
//! ```text
//! +------------+----------+-----+---------+-----------------------------------+-----+
//! | entry_size | duration | pad |  mtime  | path\0 key\0 value\0 key\0 value\0 | pad |
//! |    u32     |   i32    |     |  long   |                                   |     |
//! +------------+----------+-----+---------+-----------------------------------+-----+
//! ^ offset                                              offset + entry_size ^
//! ```
//!
//! `entry_size` covers the header and the string table but not the trailing
//! padding; the next record starts at `offset + align(entry_size)`.

use crate::cache::layout::{ByteOrder, CacheLayout, WordSize};
use crate::error::CacheError;

/// Bounds-checked reads over a byte buffer. Every out-of-range access is a
/// framing error instead of a panic.
#[derive(Debug, Clone, Copy)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    layout: CacheLayout,
}

impl<'a> ByteCursor<'a> {
    #[must_use]
    pub fn new(buf: &'a [u8], layout: CacheLayout) -> Self {
        Self { buf, layout }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Bytes in `start..end`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Framing`] if the range is inverted or runs past
    /// the end of the buffer.
    pub fn range(&self, start: usize, end: usize) -> Result<&'a [u8], CacheError> {
        self.buf.get(start..end).ok_or_else(|| {
            CacheError::framing(
                start,
                format!("byte range {start}..{end} outside buffer of {} bytes", self.buf.len()),
            )
        })
    }

    fn array<const N: usize>(&self, at: usize) -> Result<[u8; N], CacheError> {
        let end = at
            .checked_add(N)
            .ok_or_else(|| CacheError::framing(at, "offset overflow"))?;
        let mut out = [0_u8; N];
        out.copy_from_slice(self.range(at, end)?);
        Ok(out)
    }

    /// # Errors
    ///
    /// Returns [`CacheError::Framing`] if fewer than 4 bytes remain at `at`.
    pub fn read_u32_at(&self, at: usize) -> Result<u32, CacheError> {
        let bytes = self.array::<4>(at)?;
        Ok(match self.layout.byte_order() {
            ByteOrder::Little => u32::from_le_bytes(bytes),
            ByteOrder::Big => u32::from_be_bytes(bytes),
        })
    }

    /// # Errors
    ///
    /// Returns [`CacheError::Framing`] if fewer than 4 bytes remain at `at`.
    pub fn read_i32_at(&self, at: usize) -> Result<i32, CacheError> {
        let bytes = self.array::<4>(at)?;
        Ok(match self.layout.byte_order() {
            ByteOrder::Little => i32::from_le_bytes(bytes),
            ByteOrder::Big => i32::from_be_bytes(bytes),
        })
    }

    /// Read a signed platform `long`, widened to `i64`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Framing`] if fewer than a word's bytes remain.
    pub fn read_long_at(&self, at: usize) -> Result<i64, CacheError> {
        match self.layout.word_size() {
            WordSize::Four => self.read_i32_at(at).map(i64::from),
            WordSize::Eight => {
                let bytes = self.array::<8>(at)?;
                Ok(match self.layout.byte_order() {
                    ByteOrder::Little => i64::from_le_bytes(bytes),
                    ByteOrder::Big => i64::from_be_bytes(bytes),
                })
            }
        }
    }
}

/// Fixed header of one record, decoded and bounds-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordFrame {
    pub offset: usize,
    pub entry_size: u32,
    pub duration: i32,
    pub mtime: i64,
}

impl RecordFrame {
    /// Offset one past the record's string table.
    #[must_use]
    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.entry_size as usize)
    }

    /// Offset where the following record starts.
    #[must_use]
    pub fn next_offset(&self, layout: &CacheLayout) -> usize {
        self.offset.saturating_add(layout.align(self.entry_size as usize))
    }
}

/// One cached track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRecord {
    pub entry_size: u32,
    /// Seconds.
    pub duration: i32,
    pub mtime: i64,
    /// Absolute file path, exactly as cmus stored it.
    pub path: String,
    /// Tag key/value pairs in file order.
    pub tags: Vec<(String, String)>,
}

impl CacheRecord {
    /// Value of tag `key`. A key repeated in the record resolves to its last
    /// occurrence.
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn artist(&self) -> Option<&str> {
        self.tag("artist")
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.tag("title")
    }
}

/// Decode and bounds-check the fixed header of the record at `offset`.
///
/// # Errors
///
/// Returns [`CacheError::Framing`] when the header is truncated, when
/// `entry_size` is smaller than the header, or when the record runs past the
/// end of the buffer.
pub fn decode_frame(cursor: &ByteCursor<'_>, offset: usize) -> Result<RecordFrame, CacheError> {
    let layout = cursor.layout;
    let header_size = layout.record_header_size();
    if cursor.len().saturating_sub(offset) < header_size {
        return Err(CacheError::framing(
            offset,
            format!("truncated record header ({} bytes left)", cursor.len().saturating_sub(offset)),
        ));
    }

    let entry_size = cursor.read_u32_at(offset)?;
    let duration = cursor.read_i32_at(offset + 4)?;
    let mtime = cursor.read_long_at(offset + layout.mtime_offset())?;

    if (entry_size as usize) < header_size {
        return Err(CacheError::framing(
            offset,
            format!("entry size {entry_size} smaller than {header_size}-byte header"),
        ));
    }

    let frame = RecordFrame {
        offset,
        entry_size,
        duration,
        mtime,
    };
    if frame.end() > cursor.len() {
        return Err(CacheError::framing(
            offset,
            format!("entry size {entry_size} runs past end of cache"),
        ));
    }
    Ok(frame)
}

/// Split the string table of an already framed record.
///
/// # Errors
///
/// Returns [`CacheError::Record`] for invalid UTF-8, a missing file path, or
/// an odd number of key/value strings.
pub fn decode_strings(cursor: &ByteCursor<'_>, frame: &RecordFrame) -> Result<CacheRecord, CacheError> {
    let offset = frame.offset;
    let table = cursor.range(offset + cursor.layout.record_header_size(), frame.end())?;

    let mut segments: Vec<&[u8]> = table.split(|b| *b == 0).collect();
    // The terminator after the last string leaves one segment behind.
    segments.pop();

    let mut strings = segments.into_iter().map(|raw| {
        std::str::from_utf8(raw)
            .map(str::to_owned)
            .map_err(|e| CacheError::record(offset, format!("string table holds invalid UTF-8: {e}")))
    });

    let path = strings
        .next()
        .ok_or_else(|| CacheError::record(offset, "string table has no file path"))??;
    let rest = strings.collect::<Result<Vec<_>, _>>()?;
    if rest.len() % 2 != 0 {
        return Err(CacheError::record(
            offset,
            format!("string table has odd key/value count ({})", rest.len()),
        ));
    }

    let mut rest = rest.into_iter();
    let mut tags = Vec::with_capacity(rest.len() / 2);
    while let (Some(key), Some(value)) = (rest.next(), rest.next()) {
        tags.push((key, value));
    }

    Ok(CacheRecord {
        entry_size: frame.entry_size,
        duration: frame.duration,
        mtime: frame.mtime,
        path,
        tags,
    })
}

/// Decode exactly one record starting at `offset`.
///
/// The caller advances by `layout.align(record.entry_size)`.
///
/// # Errors
///
/// Any [`decode_frame`] or [`decode_strings`] failure.
pub fn decode_record(buf: &[u8], offset: usize, layout: CacheLayout) -> Result<CacheRecord, CacheError> {
    let cursor = ByteCursor::new(buf, layout);
    let frame = decode_frame(&cursor, offset)?;
    decode_strings(&cursor, &frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::writer::CacheWriter;
    use crate::cache::FILE_HEADER_SIZE;

    fn layouts() -> Vec<CacheLayout> {
        vec![
            CacheLayout::new(WordSize::Four, ByteOrder::Little),
            CacheLayout::new(WordSize::Eight, ByteOrder::Little),
            CacheLayout::new(WordSize::Eight, ByteOrder::Big),
        ]
    }

    #[test]
    fn test_decode_record_fields() {
        for layout in layouts() {
            let mut writer = CacheWriter::new(layout);
            writer.push_track(
                "/music/a.flac",
                215,
                1_700_000_000,
                &[("artist", "Autechre"), ("title", "Gantz Graf")],
            );
            let buf = writer.into_bytes();

            let record = decode_record(&buf, FILE_HEADER_SIZE, layout).unwrap();
            assert_eq!(record.path, "/music/a.flac");
            assert_eq!(record.duration, 215);
            assert_eq!(record.mtime, 1_700_000_000);
            assert_eq!(record.artist(), Some("Autechre"));
            assert_eq!(record.title(), Some("Gantz Graf"));
            assert_eq!(FILE_HEADER_SIZE + record.entry_size as usize, buf.len());
        }
    }

    #[test]
    fn test_negative_mtime_with_four_byte_words() {
        let layout = CacheLayout::new(WordSize::Four, ByteOrder::Little);
        let mut writer = CacheWriter::new(layout);
        writer.push_track("/m.ogg", -1, -42, &[]);
        let record = decode_record(writer.as_bytes(), FILE_HEADER_SIZE, layout).unwrap();
        assert_eq!(record.duration, -1);
        assert_eq!(record.mtime, -42);
        assert!(record.tags.is_empty());
    }

    #[test]
    fn test_repeated_tag_resolves_to_last() {
        let layout = CacheLayout::native();
        let mut writer = CacheWriter::new(layout);
        writer.push_track("/x.mp3", 1, 1, &[("artist", "First"), ("artist", "Second")]);
        let record = decode_record(writer.as_bytes(), FILE_HEADER_SIZE, layout).unwrap();
        assert_eq!(record.artist(), Some("Second"));
    }

    #[test]
    fn test_odd_key_value_count_is_record_error() {
        let layout = CacheLayout::native();
        let mut writer = CacheWriter::new(layout);
        writer.push_strings(1, 1, &[b"/x.mp3", b"artist"]);
        let err = decode_record(writer.as_bytes(), FILE_HEADER_SIZE, layout).unwrap_err();
        assert!(err.is_record_local(), "{err}");
    }

    #[test]
    fn test_invalid_utf8_is_record_error() {
        let layout = CacheLayout::native();
        let mut writer = CacheWriter::new(layout);
        writer.push_strings(1, 1, &[b"/x.mp3", b"artist", b"\xff\xfe"]);
        writer.push_strings(1, 1, &[b"/y.mp3", b"title"]);
        let err = decode_record(writer.as_bytes(), FILE_HEADER_SIZE, layout).unwrap_err();
        assert!(matches!(err, CacheError::Record { offset: FILE_HEADER_SIZE, .. }));
    }

    #[test]
    fn test_empty_string_table_has_no_path() {
        let layout = CacheLayout::native();
        let mut writer = CacheWriter::new(layout);
        writer.push_strings(0, 0, &[]);
        let err = decode_record(writer.as_bytes(), FILE_HEADER_SIZE, layout).unwrap_err();
        assert!(err.to_string().contains("no file path"));
    }

    #[test]
    fn test_entry_size_smaller_than_header() {
        let layout = CacheLayout::new(WordSize::Eight, ByteOrder::Little);
        let mut buf = CacheWriter::new(layout).into_bytes();
        buf.extend_from_slice(&4_u32.to_le_bytes());
        buf.extend_from_slice(&[0; 12]);
        let err = decode_record(&buf, FILE_HEADER_SIZE, layout).unwrap_err();
        assert!(matches!(err, CacheError::Framing { .. }));
    }

    #[test]
    fn test_entry_size_past_end_of_buffer() {
        let layout = CacheLayout::new(WordSize::Eight, ByteOrder::Little);
        let mut buf = CacheWriter::new(layout).into_bytes();
        buf.extend_from_slice(&4096_u32.to_le_bytes());
        buf.extend_from_slice(&[0; 12]);
        buf.extend_from_slice(b"/x.mp3\0");
        let err = decode_record(&buf, FILE_HEADER_SIZE, layout).unwrap_err();
        assert!(err.to_string().contains("past end"), "{err}");
    }

    #[test]
    fn test_truncated_header() {
        let layout = CacheLayout::native();
        let buf = [0_u8; FILE_HEADER_SIZE + 3];
        let err = decode_record(&buf, FILE_HEADER_SIZE, layout).unwrap_err();
        assert!(matches!(err, CacheError::Framing { .. }));
    }

    #[test]
    fn test_cursor_rejects_out_of_range_reads() {
        let layout = CacheLayout::new(WordSize::Eight, ByteOrder::Little);
        let buf = [1_u8, 0, 0, 0, 2, 0];
        let cursor = ByteCursor::new(&buf, layout);
        assert_eq!(cursor.read_u32_at(0).unwrap(), 1);
        assert!(cursor.read_u32_at(4).is_err());
        assert!(cursor.read_long_at(0).is_err());
        assert!(cursor.range(4, 2).is_err());
        assert!(cursor.read_u32_at(usize::MAX - 1).is_err());
    }
}
