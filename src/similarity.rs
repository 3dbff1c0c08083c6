//! # Similar-Artist Lookup
//!
//! The selector only needs an ordered list of names. Where it comes from is
//! behind [`SimilarityService`]; [`crate::lastfm::LastFm`] is the production
//! implementation.

use crate::error::SimilarityError;

/// Answer of a similar-artist lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimilarArtists {
    /// The service's spelling of the queried artist.
    pub artist: String,
    /// Most similar first.
    pub similar: Vec<String>,
}

pub trait SimilarityService {
    /// Look up artists similar to `artist`.
    ///
    /// # Errors
    ///
    /// [`SimilarityError::ArtistNotFound`] when the service does not know the
    /// artist, other variants for transport or decoding problems.
    fn similar_artists(&self, artist: &str) -> Result<SimilarArtists, SimilarityError>;
}

impl<T: SimilarityService + ?Sized> SimilarityService for &T {
    fn similar_artists(&self, artist: &str) -> Result<SimilarArtists, SimilarityError> {
        (**self).similar_artists(artist)
    }
}

impl<T: SimilarityService + ?Sized> SimilarityService for Box<T> {
    fn similar_artists(&self, artist: &str) -> Result<SimilarArtists, SimilarityError> {
        (**self).similar_artists(artist)
    }
}
