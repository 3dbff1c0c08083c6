//! The track cmus just started, as handed over by the status hook.
//!
//! cmus calls its `status_display_program` with alternating keys and values:
//!
//! ```text
//! status playing file /music/a.flac artist Portishead title Roads ...
//! ```

use std::collections::HashMap;

use crate::error::{AutoaddError, Result};

const USAGE: &str = "expected key/value pairs, one key should be \"artist\"";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentTrack {
    fields: HashMap<String, String>,
}

impl CurrentTrack {
    /// Pair up `args` as `key value key value ...`.
    ///
    /// A repeated key keeps its last value.
    ///
    /// # Errors
    ///
    /// [`AutoaddError::Config`] if `args` is empty, has an odd length, or
    /// carries no non-empty `artist`.
    pub fn from_pairs<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        if args.is_empty() || args.len() % 2 != 0 {
            return Err(AutoaddError::Config(USAGE.to_owned()));
        }

        let fields: HashMap<String, String> = args
            .chunks_exact(2)
            .map(|pair| (pair[0].as_ref().to_owned(), pair[1].as_ref().to_owned()))
            .collect();

        match fields.get("artist") {
            Some(artist) if !artist.is_empty() => Ok(Self { fields }),
            _ => Err(AutoaddError::Config("no artist given".to_owned())),
        }
    }

    #[must_use]
    pub fn artist(&self) -> &str {
        self.fields.get("artist").map_or("", String::as_str)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }
}
