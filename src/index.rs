//! # Artist Index
//!
//! `artist -> title -> path`, built from cache records. The index is the
//! selector's only view of the local collection.
//!
//! Records without an `artist` tag are dropped. Records with an artist but no
//! `title` keep their path in [`ArtistTracks::untitled`] so the artist is
//! still playable. A repeated `(artist, title)` keeps the last path seen.

use std::collections::BTreeMap;

use crate::cache::CacheRecord;

/// Files known for one artist.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ArtistTracks {
    titled: BTreeMap<String, String>,
    untitled: Vec<String>,
}

impl ArtistTracks {
    /// Title to path, for records that carried a title.
    #[must_use]
    pub fn titles(&self) -> &BTreeMap<String, String> {
        &self.titled
    }

    /// Paths of records without a title.
    #[must_use]
    pub fn untitled(&self) -> &[String] {
        &self.untitled
    }

    /// Every playable path: titled tracks in title order, then untitled ones.
    pub fn files(&self) -> impl Iterator<Item = &str> + '_ {
        self.titled
            .values()
            .chain(self.untitled.iter())
            .map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.titled.len() + self.untitled.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ArtistIndex {
    artists: BTreeMap<String, ArtistTracks>,
}

impl ArtistIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path` under `artist`, keyed by `title` when there is one.
    pub fn insert(&mut self, artist: &str, title: Option<&str>, path: &str) {
        let tracks = self.artists.entry(artist.to_owned()).or_default();
        match title {
            Some(title) => {
                tracks.titled.insert(title.to_owned(), path.to_owned());
            }
            None => tracks.untitled.push(path.to_owned()),
        }
    }

    /// Index a decoded cache record. Returns `false` if the record has no
    /// artist tag and was dropped.
    pub fn insert_record(&mut self, record: &CacheRecord) -> bool {
        match record.artist() {
            Some(artist) => {
                self.insert(artist, record.title(), &record.path);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn get(&self, artist: &str) -> Option<&ArtistTracks> {
        self.artists.get(artist)
    }

    #[must_use]
    pub fn contains(&self, artist: &str) -> bool {
        self.artists.contains_key(artist)
    }

    /// The index's own copy of `artist`, borrowed for as long as the index.
    #[must_use]
    pub fn artist_name(&self, artist: &str) -> Option<&str> {
        self.artists.get_key_value(artist).map(|(name, _)| name.as_str())
    }

    /// Artist names in sorted order.
    pub fn artists(&self) -> impl Iterator<Item = &str> + '_ {
        self.artists.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArtistTracks)> + '_ {
        self.artists.iter().map(|(name, tracks)| (name.as_str(), tracks))
    }

    /// Number of artists.
    #[must_use]
    pub fn len(&self) -> usize {
        self.artists.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.artists.is_empty()
    }

    #[must_use]
    pub fn track_count(&self) -> usize {
        self.artists.values().map(ArtistTracks::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(path: &str, tags: &[(&str, &str)]) -> CacheRecord {
        CacheRecord {
            entry_size: 0,
            duration: 0,
            mtime: 0,
            path: path.to_string(),
            tags: tags
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_records_without_artist_are_dropped() {
        let mut index = ArtistIndex::new();
        assert!(!index.insert_record(&record("/a.flac", &[("title", "Song")])));
        assert!(index.is_empty());
    }

    #[test]
    fn test_duplicate_title_last_wins() {
        let mut index = ArtistIndex::new();
        index.insert_record(&record("/old.flac", &[("artist", "A"), ("title", "T")]));
        index.insert_record(&record("/new.flac", &[("artist", "A"), ("title", "T")]));

        let tracks = index.get("A").unwrap();
        assert_eq!(tracks.titles().get("T").map(String::as_str), Some("/new.flac"));
        assert_eq!(tracks.len(), 1);
    }

    #[test]
    fn test_untitled_tracks_stay_playable() {
        let mut index = ArtistIndex::new();
        index.insert_record(&record("/x.flac", &[("artist", "A")]));
        index.insert_record(&record("/y.flac", &[("artist", "A"), ("title", "Y")]));

        let tracks = index.get("A").unwrap();
        assert!(tracks.titles().get("").is_none());
        assert_eq!(tracks.untitled(), ["/x.flac".to_string()]);
        assert_eq!(tracks.files().collect::<Vec<_>>(), vec!["/y.flac", "/x.flac"]);
        assert_eq!(index.track_count(), 2);
    }

    #[test]
    fn test_artist_lookup_borrows_index_key() {
        let mut index = ArtistIndex::new();
        index.insert("Boards of Canada", Some("Roygbiv"), "/boc.flac");
        let query = String::from("Boards of Canada");
        let name = index.artist_name(&query).unwrap();
        drop(query);
        assert_eq!(name, "Boards of Canada");
        assert!(index.artist_name("boards of canada").is_none());
    }
}
