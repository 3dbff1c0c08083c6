//! # Last.fm Similar Artists
//!
//! Calls `artist.getSimilar` on the Last.fm web service and turns the JSON
//! answer into [`SimilarArtists`].
//!
//! ```text
//! GET https://ws.audioscrobbler.com/2.0/?method=artist.getsimilar
//!     &artist=<name>&autocorrect=1&api_key=<key>&format=json[&limit=<n>]
//! ```
//!
//! Last.fm reports errors in the body as `{"error": <code>, "message": ...}`.
//! Code 6 ("invalid parameters") is what it answers for unknown artists.

use log::debug;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::error::SimilarityError;
use crate::similarity::{SimilarArtists, SimilarityService};

pub const API_ROOT: &str = "https://ws.audioscrobbler.com/2.0/";

const ERROR_INVALID_PARAMETERS: u32 = 6;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiResponse {
    Error { error: u32, message: String },
    Similar { similarartists: SimilarArtistsBody },
}

#[derive(Debug, Deserialize)]
struct SimilarArtistsBody {
    #[serde(default)]
    artist: OneOrMany,
    #[serde(rename = "@attr")]
    attr: Option<QueryAttr>,
}

/// Last.fm collapses single-element arrays into objects.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<ArtistEntry>),
    One(ArtistEntry),
}

impl Default for OneOrMany {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

#[derive(Debug, Deserialize)]
struct ArtistEntry {
    name: String,
}

#[derive(Debug, Deserialize)]
struct QueryAttr {
    artist: String,
}

/// Parse an `artist.getSimilar` response body for `queried`.
///
/// # Errors
///
/// [`SimilarityError::ArtistNotFound`] for Last.fm error 6, `Response` for
/// other API errors and undecodable bodies.
pub fn parse_similar_response(queried: &str, body: &str) -> Result<SimilarArtists, SimilarityError> {
    let response: ApiResponse = serde_json::from_str(body)
        .map_err(|e| SimilarityError::Response(format!("invalid JSON from last.fm: {e}")))?;

    match response {
        ApiResponse::Error { error, .. } if error == ERROR_INVALID_PARAMETERS => {
            Err(SimilarityError::ArtistNotFound(queried.to_owned()))
        }
        ApiResponse::Error { error, message } => Err(SimilarityError::Response(format!(
            "last.fm error {error}: {message}"
        ))),
        ApiResponse::Similar { similarartists } => {
            let similar = match similarartists.artist {
                OneOrMany::Many(list) => list.into_iter().map(|a| a.name).collect(),
                OneOrMany::One(one) => vec![one.name],
            };
            let artist = similarartists
                .attr
                .map_or_else(|| queried.to_owned(), |attr| attr.artist);
            Ok(SimilarArtists { artist, similar })
        }
    }
}

/// Blocking Last.fm client.
#[derive(Debug, Clone)]
pub struct LastFm {
    client: Client,
    api_key: String,
    api_root: String,
    limit: Option<u32>,
}

impl LastFm {
    /// # Errors
    ///
    /// [`SimilarityError::Transport`] if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>) -> Result<Self, SimilarityError> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SimilarityError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            api_root: API_ROOT.to_owned(),
            limit: None,
        })
    }

    /// Ask for at most `limit` similar artists. Last.fm defaults to 100.
    #[must_use]
    pub fn with_limit(mut self, limit: Option<u32>) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn with_api_root(mut self, api_root: impl Into<String>) -> Self {
        self.api_root = api_root.into();
        self
    }
}

impl SimilarityService for LastFm {
    fn similar_artists(&self, artist: &str) -> Result<SimilarArtists, SimilarityError> {
        debug!("requesting artist.getsimilar for \"{artist}\"");

        let mut query = vec![
            ("method", "artist.getsimilar".to_owned()),
            ("artist", artist.to_owned()),
            ("autocorrect", "1".to_owned()),
            ("api_key", self.api_key.clone()),
            ("format", "json".to_owned()),
        ];
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }

        let response = self
            .client
            .get(&self.api_root)
            .query(&query)
            .send()
            .map_err(|e| SimilarityError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|e| SimilarityError::Transport(e.to_string()))?;

        match parse_similar_response(artist, &body) {
            Err(SimilarityError::Response(_)) if !status.is_success() => {
                Err(SimilarityError::Transport(format!("last.fm answered HTTP {status}")))
            }
            result => result,
        }
    }
}
