//! # Autoadd Run
//!
//! Ties the pieces together for one invocation:
//!
//! 1. load `lib.pl` (when restricting to the library) and scan the cache
//!    into an [`ArtistIndex`]
//! 2. ask the [`SimilarityService`] for artists similar to the one playing
//! 3. let the [`Selector`] choose an existing file
//! 4. hand that file to the [`PlayerRemote`]
//!
//! Collaborators are injected, so tests drive a whole run against scratch
//! files with mock services.

use std::path::Path;

use log::{debug, warn};
use rand::Rng;

use crate::cache::{CacheLayout, CacheScanner};
use crate::cmus_client::{ensure_running, PlayerRemote};
use crate::config::{AutoaddConfig, CmusPaths};
use crate::error::{AutoaddError, Result};
use crate::index::ArtistIndex;
use crate::library::{load_library, LibrarySet};
use crate::selector::{PathProbe, Selection, Selector};
use crate::similarity::SimilarityService;

pub struct Autoadd<S, P> {
    config: AutoaddConfig,
    paths: CmusPaths,
    layout: CacheLayout,
    similarity: S,
    remote: P,
}

impl<S: SimilarityService, P: PlayerRemote> Autoadd<S, P> {
    pub fn new(config: AutoaddConfig, paths: CmusPaths, similarity: S, remote: P) -> Self {
        Self {
            config,
            paths,
            layout: CacheLayout::native(),
            similarity,
            remote,
        }
    }

    /// Read the cache with a layout other than this machine's.
    #[must_use]
    pub fn with_layout(mut self, layout: CacheLayout) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub fn config(&self) -> &AutoaddConfig {
        &self.config
    }

    #[must_use]
    pub fn paths(&self) -> &CmusPaths {
        &self.paths
    }

    /// Build the artist index from the cmus files.
    ///
    /// Never fails: an unreadable library counts as empty, and any cache
    /// problem is logged and leaves the index empty.
    #[must_use]
    pub fn load_index(&self) -> ArtistIndex {
        let library = if self.config.only_tracks_in_library {
            match load_library(&self.paths.library) {
                Ok(library) => {
                    debug!("{} paths in {}", library.len(), self.paths.library.display());
                    library
                }
                Err(e) => {
                    warn!("could not open {}: {e}", self.paths.library.display());
                    LibrarySet::new()
                }
            }
        } else {
            LibrarySet::new()
        };

        let scanner = CacheScanner::new(self.layout)
            .with_policy(self.config.scan_policy)
            .restrict_to(self.config.only_tracks_in_library.then_some(&library));

        match scanner.scan_file(&self.paths.cache) {
            Ok(index) => index,
            Err(e) => {
                warn!("{e}");
                ArtistIndex::new()
            }
        }
    }

    /// Choose a track to follow `artist`.
    ///
    /// # Errors
    ///
    /// - [`AutoaddError::NoArtists`] if the index is empty. The similarity
    ///   service is not consulted in that case.
    /// - [`AutoaddError::ArtistNotFound`] / [`AutoaddError::Similarity`] from
    ///   the lookup.
    /// - [`AutoaddError::NoTrackFound`] if no candidate file exists.
    pub fn choose_track<R: Rng + ?Sized, Q: PathProbe + ?Sized>(
        &self,
        artist: &str,
        index: &ArtistIndex,
        rng: &mut R,
        probe: &Q,
    ) -> Result<Selection> {
        if index.is_empty() {
            return Err(AutoaddError::NoArtists);
        }

        let similar = self.similarity.similar_artists(artist)?;
        debug!("searching for similar artists to \"{}\"", similar.artist);

        Selector::new(self.config.selector_config()).select(&similar.similar, index, rng, probe)
    }

    /// Load the index, choose a track and enqueue it. With `dry_run` the
    /// player is left alone.
    ///
    /// # Errors
    ///
    /// Everything [`Autoadd::choose_track`] returns, plus
    /// [`AutoaddError::Enqueue`].
    pub fn autoadd<R: Rng + ?Sized, Q: PathProbe + ?Sized>(
        &self,
        artist: &str,
        rng: &mut R,
        probe: &Q,
        dry_run: bool,
    ) -> Result<Selection> {
        let index = self.load_index();
        let selection = self.choose_track(artist, &index, rng, probe)?;

        if dry_run {
            debug!("dry run, not adding \"{}\"", selection.path);
        } else {
            self.remote.enqueue(Path::new(&selection.path), self.config.add_to)?;
        }
        debug!("add file \"{}\" to {}", selection.path, self.config.add_to);
        Ok(selection)
    }

    /// [`Autoadd::autoadd`] after checking that cmus answers.
    ///
    /// # Arguments
    ///
    /// * `artist` - The artist playing now.
    /// * `rng` - Drives the selection.
    /// * `probe` - Decides which indexed paths still exist.
    /// * `dry_run` - Choose a track without enqueueing it.
    ///
    /// # Returns
    ///
    /// * `Ok(Selection)` - The track that was added, or would have been.
    ///
    /// # Errors
    ///
    /// [`AutoaddError::PlayerUnavailable`], then as [`Autoadd::autoadd`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use cmus_autoadd::app::Autoadd;
    /// use cmus_autoadd::cmus_client::CmusRemote;
    /// use cmus_autoadd::config::{AutoaddConfig, CmusPaths};
    /// use cmus_autoadd::lastfm::LastFm;
    /// use cmus_autoadd::selector::FsProbe;
    ///
    /// let config = AutoaddConfig::load(None)?;
    /// let paths = CmusPaths::from_env(&config)?;
    /// let lastfm = LastFm::new("0123456789abcdef")?;
    /// let app = Autoadd::new(config, paths, lastfm, CmusRemote::default());
    ///
    /// let selection = app.run("Portishead", &mut rand::thread_rng(), &FsProbe, true)?;
    /// println!("would add {}", selection.path);
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn run<R: Rng + ?Sized, Q: PathProbe + ?Sized>(
        &self,
        artist: &str,
        rng: &mut R,
        probe: &Q,
        dry_run: bool,
    ) -> Result<Selection> {
        ensure_running(&self.remote)?;
        self.autoadd(artist, rng, probe, dry_run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheWriter;
    use crate::cmus_client::AddTarget;
    use crate::error::SimilarityError;
    use crate::similarity::SimilarArtists;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::{Cell, RefCell};
    use std::path::PathBuf;

    struct FixedSimilar {
        similar: Vec<&'static str>,
        calls: Cell<usize>,
    }

    impl SimilarityService for FixedSimilar {
        fn similar_artists(&self, artist: &str) -> Result<SimilarArtists, SimilarityError> {
            self.calls.set(self.calls.get() + 1);
            Ok(SimilarArtists {
                artist: artist.to_owned(),
                similar: self.similar.iter().map(|s| (*s).to_owned()).collect(),
            })
        }
    }

    #[derive(Default)]
    struct RecordingRemote {
        added: RefCell<Vec<(PathBuf, AddTarget)>>,
    }

    impl PlayerRemote for RecordingRemote {
        fn is_running(&self) -> bool {
            true
        }

        fn enqueue(&self, path: &Path, target: AddTarget) -> Result<()> {
            self.added.borrow_mut().push((path.to_path_buf(), target));
            Ok(())
        }
    }

    fn fixture(dir: &Path) -> CmusPaths {
        let mut writer = CacheWriter::new(CacheLayout::native());
        writer
            .push_track("/m/a.flac", 100, 1, &[("artist", "A"), ("title", "One")])
            .push_track("/m/b.flac", 100, 1, &[("artist", "B"), ("title", "Two")]);
        writer.write_to(&dir.join("cache")).unwrap();
        std::fs::write(dir.join("lib.pl"), "/m/b.flac\n").unwrap();
        CmusPaths::new(dir.to_path_buf())
    }

    #[test]
    fn test_library_restriction_applies() {
        let dir = tempfile::tempdir().unwrap();
        let app = Autoadd::new(
            AutoaddConfig::default(),
            fixture(dir.path()),
            FixedSimilar { similar: vec!["A", "B"], calls: Cell::new(0) },
            RecordingRemote::default(),
        );
        let index = app.load_index();
        assert_eq!(index.artists().collect::<Vec<_>>(), vec!["B"]);
    }

    #[test]
    fn test_all_tracks_ignores_library() {
        let dir = tempfile::tempdir().unwrap();
        let config = AutoaddConfig {
            only_tracks_in_library: false,
            ..AutoaddConfig::default()
        };
        let app = Autoadd::new(
            config,
            fixture(dir.path()),
            FixedSimilar { similar: vec![], calls: Cell::new(0) },
            RecordingRemote::default(),
        );
        assert_eq!(app.load_index().len(), 2);
    }

    #[test]
    fn test_empty_index_skips_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let app = Autoadd::new(
            AutoaddConfig::default(),
            CmusPaths::new(dir.path().to_path_buf()),
            FixedSimilar { similar: vec!["A"], calls: Cell::new(0) },
            RecordingRemote::default(),
        );
        let mut rng = StdRng::seed_from_u64(1);
        let err = app.autoadd("X", &mut rng, &|_: &Path| true, false).unwrap_err();
        assert!(matches!(err, AutoaddError::NoArtists));
        assert_eq!(app.similarity.calls.get(), 0);
    }

    #[test]
    fn test_run_enqueues_to_configured_target() {
        let dir = tempfile::tempdir().unwrap();
        let config = AutoaddConfig {
            add_to: AddTarget::Playlist,
            ..AutoaddConfig::default()
        };
        let app = Autoadd::new(
            config,
            fixture(dir.path()),
            FixedSimilar { similar: vec!["A", "B"], calls: Cell::new(0) },
            RecordingRemote::default(),
        );
        let mut rng = StdRng::seed_from_u64(7);
        let selection = app.run("X", &mut rng, &|_: &Path| true, false).unwrap();
        assert_eq!(selection.path, "/m/b.flac");
        assert_eq!(
            *app.remote.added.borrow(),
            vec![(PathBuf::from("/m/b.flac"), AddTarget::Playlist)]
        );
    }

    #[test]
    fn test_foreign_layout_cache() {
        use crate::cache::{ByteOrder, WordSize};

        let dir = tempfile::tempdir().unwrap();
        let layout = CacheLayout::new(WordSize::Four, ByteOrder::Big);
        let mut writer = CacheWriter::new(layout);
        writer.push_track("/m/be.flac", 100, 1, &[("artist", "Big"), ("title", "Endian")]);
        writer.write_to(&dir.path().join("cache")).unwrap();

        let config = AutoaddConfig {
            only_tracks_in_library: false,
            ..AutoaddConfig::default()
        };
        let app = Autoadd::new(
            config,
            CmusPaths::new(dir.path().to_path_buf()),
            FixedSimilar { similar: vec![], calls: Cell::new(0) },
            RecordingRemote::default(),
        )
        .with_layout(layout);
        assert_eq!(app.load_index().artists().collect::<Vec<_>>(), vec!["Big"]);
    }

    #[test]
    fn test_dry_run_leaves_player_alone() {
        let dir = tempfile::tempdir().unwrap();
        let app = Autoadd::new(
            AutoaddConfig::default(),
            fixture(dir.path()),
            FixedSimilar { similar: vec!["B"], calls: Cell::new(0) },
            RecordingRemote::default(),
        );
        let mut rng = StdRng::seed_from_u64(3);
        let selection = app.autoadd("X", &mut rng, &|_: &Path| true, true).unwrap();
        assert_eq!(selection.artist, "B");
        assert!(app.remote.added.borrow().is_empty());
    }
}
