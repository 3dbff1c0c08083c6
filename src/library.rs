//! # Library Set Loader
//!
//! cmus keeps the paths of its library in `lib.pl`, one absolute path per
//! line. With library restriction on, only cache entries whose path appears
//! here verbatim are indexed.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LibrarySet {
    paths: HashSet<String>,
}

impl LibrarySet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read newline-separated paths. Only the `\n` is stripped; anything else
    /// on the line, including a `\r`, is part of the path.
    ///
    /// # Errors
    ///
    /// Propagates read failures from `reader`.
    pub fn from_reader<R: BufRead>(reader: R) -> io::Result<Self> {
        let mut paths = HashSet::new();
        for line in reader.split(b'\n') {
            paths.insert(String::from_utf8_lossy(&line?).into_owned());
        }
        Ok(Self { paths })
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for LibrarySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Load `lib.pl`.
///
/// # Errors
///
/// Returns the I/O error if the file cannot be opened or read. Callers treat
/// this as an empty library.
pub fn load_library(path: &Path) -> io::Result<LibrarySet> {
    let file = File::open(path)?;
    LibrarySet::from_reader(BufReader::new(file))
}
