//! # Error Taxonomy
//!
//! Typed errors for every failure the autoadd run can hit. Each top-level
//! variant maps to one single-line diagnostic printed by the binary before it
//! exits with a non-zero status.
//!
//! | Variant | Fatal? | Raised by |
//! |---|---|---|
//! | [`AutoaddError::Config`] | yes | argument / config file validation |
//! | [`AutoaddError::PlayerUnavailable`] | yes | `cmus-remote -C` liveness check |
//! | [`AutoaddError::NoArtists`] | yes | empty index after cache + library load |
//! | [`AutoaddError::ArtistNotFound`] | yes | similarity service lookup |
//! | [`AutoaddError::NoTrackFound`] | yes | selector exhausted every candidate |
//! | [`AutoaddError::Similarity`] | yes | any other similarity service failure |
//! | [`AutoaddError::Enqueue`] | yes | `cmus-remote` refusing the chosen file |
//!
//! Cache signature, format and I/O problems are [`CacheError`]s; they are
//! logged and degrade to an empty index rather than aborting the run.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading the cmus metadata cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The 8-byte header does not start with `"CTC"` + `0x02`.
    #[error("cache signature is not valid")]
    Signature,

    /// Record framing is broken (`entry_size` too small or past the end of
    /// the buffer). The next record boundary is unknown.
    #[error("cache is not valid: {reason} (record at offset {offset})")]
    Framing { offset: usize, reason: String },

    /// The record's string table is malformed but its framing is intact.
    #[error("cache is not valid: {reason} (record at offset {offset})")]
    Record { offset: usize, reason: String },

    #[error("could not open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CacheError {
    pub(crate) fn framing(offset: usize, reason: impl Into<String>) -> Self {
        Self::Framing {
            offset,
            reason: reason.into(),
        }
    }

    pub(crate) fn record(offset: usize, reason: impl Into<String>) -> Self {
        Self::Record {
            offset,
            reason: reason.into(),
        }
    }

    /// Any decoding failure, framing or string table.
    #[must_use]
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Framing { .. } | Self::Record { .. })
    }

    /// Whether the scan could continue past the failing record.
    #[must_use]
    pub fn is_record_local(&self) -> bool {
        matches!(self, Self::Record { .. })
    }
}

/// Failures of a similar-artist lookup.
#[derive(Debug, Error)]
pub enum SimilarityError {
    /// The service does not know the queried artist.
    #[error("artist \"{0}\" not found")]
    ArtistNotFound(String),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    Response(String),
}

/// Top-level failures of an autoadd run.
#[derive(Debug, Error)]
pub enum AutoaddError {
    #[error("{0}")]
    Config(String),

    #[error("cmus not running or cmus-remote not working")]
    PlayerUnavailable,

    #[error("no artists in library / cache")]
    NoArtists,

    #[error("could not find artist \"{0}\" on last.fm")]
    ArtistNotFound(String),

    #[error("similar artist lookup failed: {0}")]
    Similarity(String),

    #[error("no existing track found to add")]
    NoTrackFound,

    #[error("could not add \"{}\": {reason}", path.display())]
    Enqueue { path: PathBuf, reason: String },
}

impl From<SimilarityError> for AutoaddError {
    fn from(err: SimilarityError) -> Self {
        match err {
            SimilarityError::ArtistNotFound(artist) => Self::ArtistNotFound(artist),
            other => Self::Similarity(other.to_string()),
        }
    }
}

pub type Result<T, E = AutoaddError> = std::result::Result<T, E>;
