//! # cmus Cache Reader
//!
//! Read-only access to `~/.cmus/cache`, the binary file in which cmus keeps
//! the duration, mtime and tags of every file it has seen.
//!
//! ```text
//! "CTC" 0x02 | 4 bytes | record | pad | record | pad | ...
//! ```
//!
//! - [`layout`] - word size, byte order and alignment
//! - [`record`] - decoding a single record
//! - [`scanner`] - walking the file and building the [`ArtistIndex`](crate::index::ArtistIndex)
//! - [`writer`] - encoding synthetic caches
//!
//! Only format version 2 is understood.

pub mod layout;
pub mod record;
pub mod scanner;
pub mod writer;

pub use layout::{ByteOrder, CacheLayout, WordSize, CACHE_SIGNATURE, FILE_HEADER_SIZE};
pub use record::{decode_record, ByteCursor, CacheRecord, RecordFrame};
pub use scanner::{check_signature, CacheScanner, Records, ScanPolicy};
pub use writer::CacheWriter;
