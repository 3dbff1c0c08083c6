//! On-disk geometry of the cmus cache file.
//!
//! cmus writes its `struct cache_entry` header with the compiler's native
//! alignment and byte order, so the reader has to know the word size
//! (`sizeof(long)`) and endianness of the machine that wrote the file.

use std::mem::size_of;

/// File signature: `"CTC"` followed by format version `0x02`.
pub const CACHE_SIGNATURE: [u8; 4] = *b"CTC\x02";

/// The signature plus four bytes the reader ignores.
pub const FILE_HEADER_SIZE: usize = 8;

/// Width of the platform `long` that holds `mtime`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordSize {
    Four = 4,
    Eight = 8,
}

impl WordSize {
    #[must_use]
    pub fn native() -> Self {
        match size_of::<libc::c_long>() {
            4 => Self::Four,
            _ => Self::Eight,
        }
    }

    #[must_use]
    pub const fn bytes(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    #[must_use]
    pub const fn native() -> Self {
        if cfg!(target_endian = "big") {
            Self::Big
        } else {
            Self::Little
        }
    }
}

/// Word size and byte order used to decode record headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheLayout {
    word_size: WordSize,
    byte_order: ByteOrder,
}

impl Default for CacheLayout {
    fn default() -> Self {
        Self::native()
    }
}

impl CacheLayout {
    #[must_use]
    pub const fn new(word_size: WordSize, byte_order: ByteOrder) -> Self {
        Self {
            word_size,
            byte_order,
        }
    }

    /// The layout cmus on this machine writes.
    #[must_use]
    pub fn native() -> Self {
        Self::new(WordSize::native(), ByteOrder::native())
    }

    #[must_use]
    pub const fn word_size(&self) -> WordSize {
        self.word_size
    }

    #[must_use]
    pub const fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Round `n` up to the next multiple of the word size.
    ///
    /// ```
    /// use cmus_autoadd::cache::{ByteOrder, CacheLayout, WordSize};
    ///
    /// let layout = CacheLayout::new(WordSize::Eight, ByteOrder::Little);
    /// assert_eq!(layout.align(13), 16);
    /// assert_eq!(layout.align(16), 16);
    /// ```
    #[must_use]
    pub const fn align(&self, n: usize) -> usize {
        let mask = self.word_size.bytes() - 1;
        (n + mask) & !mask
    }

    /// Offset of `mtime` inside a record: after `entry_size: u32` and
    /// `duration: i32`, aligned for a `long`.
    #[must_use]
    pub const fn mtime_offset(&self) -> usize {
        self.align(size_of::<u32>() + size_of::<i32>())
    }

    /// Size of the fixed `entry_size`/`duration`/`mtime` header. Always 12
    /// or 16 bytes.
    #[must_use]
    pub const fn record_header_size(&self) -> usize {
        self.mtime_offset() + self.word_size.bytes()
    }
}
