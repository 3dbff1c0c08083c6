//! # Similarity-Weighted Selector
//!
//! Picks the next track from the artists a similarity service ranked against
//! the current one, using epsilon-greedy bucketing:
//!
//! 1. Keep only the ranked artists present in the local index.
//! 2. With probability `jumpout_epsilon`, or when none are present, try every
//!    indexed artist in random order.
//! 3. Otherwise split the ranking at `floor(len * most_similar_fraction)`,
//!    shuffle both halves, and try the most similar half first, or with
//!    probability `epsilon` the lesser similar half first.
//! 4. For each candidate artist, shuffle its files and take the first one
//!    that exists on disk.
//!
//! All randomness comes from the caller's generator, so a seeded
//! [`StdRng`](rand::rngs::StdRng) reproduces a run exactly.
//!
//! The existence check and the later enqueue are not atomic; a file deleted
//! in between is left for the player to reject.

use std::path::Path;

use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{AutoaddError, Result};
use crate::index::ArtistIndex;

/// Tuning for the epsilon-greedy draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Share of the ranking treated as "most similar".
    pub most_similar_fraction: f64,
    /// Probability of trying the lesser similar artists first.
    pub epsilon: f64,
    /// Probability of ignoring similarity and choosing among all artists.
    pub jumpout_epsilon: f64,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            most_similar_fraction: 0.33,
            epsilon: 0.1,
            jumpout_epsilon: 0.0,
        }
    }
}

impl SelectorConfig {
    /// # Errors
    ///
    /// [`AutoaddError::Config`] if any value is not a finite number in `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("most_similar", self.most_similar_fraction),
            ("epsilon", self.epsilon),
            ("jumpout_epsilon", self.jumpout_epsilon),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(AutoaddError::Config(format!(
                    "{name} must be between 0 and 1, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// How the candidate order was built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    MostSimilarFirst,
    LesserSimilarFirst,
    /// The jump-out draw fired; similarity was ignored.
    JumpOut,
    /// No ranked artist is in the index; similarity could not be used.
    NoSimilarArtists,
}

impl Route {
    /// Whether candidates are every indexed artist in random order.
    #[must_use]
    pub fn is_fallback(self) -> bool {
        matches!(self, Self::JumpOut | Self::NoSimilarArtists)
    }
}

/// Ordered candidate artists for one selection.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidatePlan<'a> {
    pub route: Route,
    pub order: Vec<&'a str>,
    /// Ranked artists present in the index.
    pub known_similar: usize,
    /// Size of the most-similar bucket. Zero on fallback routes.
    pub most_similar_len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub artist: String,
    pub path: String,
    pub route: Route,
}

/// Decides whether a candidate path is playable.
pub trait PathProbe {
    fn exists(&self, path: &Path) -> bool;
}

/// Asks the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProbe;

impl PathProbe for FsProbe {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

impl<F: Fn(&Path) -> bool> PathProbe for F {
    fn exists(&self, path: &Path) -> bool {
        self(path)
    }
}

/// Index at which a ranking of `len` artists is split into the
/// most-similar head and the lesser-similar tail.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn split_point(len: usize, fraction: f64) -> usize {
    ((len as f64 * fraction).floor() as usize).min(len)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Selector {
    config: SelectorConfig,
}

impl Selector {
    #[must_use]
    pub fn new(config: SelectorConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Order the candidate artists. Steps 1-3 of the module docs.
    ///
    /// # Arguments
    ///
    /// * `ranking` - Similar artists, most similar first, spelled as in the
    ///   index.
    /// * `index` - Artists available locally.
    /// * `rng` - Source of every coin flip and shuffle.
    ///
    /// # Returns
    ///
    /// A [`CandidatePlan`] borrowing artist names from `index`. Its `order`
    /// holds every indexed artist on the fallback routes, otherwise only the
    /// known similar ones.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmus_autoadd::index::ArtistIndex;
    /// use cmus_autoadd::selector::{Selector, SelectorConfig};
    /// use rand::rngs::StdRng;
    /// use rand::SeedableRng;
    ///
    /// let mut index = ArtistIndex::new();
    /// index.insert("Portishead", Some("Roads"), "/music/roads.flac");
    /// index.insert("Massive Attack", Some("Teardrop"), "/music/teardrop.flac");
    ///
    /// let ranking = vec!["Massive Attack".to_owned(), "Tricky".to_owned()];
    /// let plan = Selector::new(SelectorConfig::default())
    ///     .plan(&ranking, &index, &mut StdRng::seed_from_u64(1));
    /// assert_eq!(plan.known_similar, 1);
    /// assert!(plan.order.contains(&"Massive Attack"));
    /// ```
    pub fn plan<'a, R: Rng + ?Sized>(
        &self,
        ranking: &[String],
        index: &'a ArtistIndex,
        rng: &mut R,
    ) -> CandidatePlan<'a> {
        let known: Vec<&'a str> = ranking
            .iter()
            .filter_map(|name| index.artist_name(name))
            .collect();
        debug!("you have {} of {} similar artists", known.len(), ranking.len());

        let jump_out = rng.gen::<f64>() < self.config.jumpout_epsilon;
        if jump_out || known.is_empty() {
            let route = if known.is_empty() {
                warn!("no similar artist found, choosing completely randomly");
                Route::NoSimilarArtists
            } else {
                debug!(
                    "{}% jump-out probability hit, ignoring similar artists",
                    100.0 * self.config.jumpout_epsilon
                );
                Route::JumpOut
            };
            let mut order: Vec<&'a str> = index.artists().collect();
            order.shuffle(rng);
            return CandidatePlan {
                route,
                order,
                known_similar: known.len(),
                most_similar_len: 0,
            };
        }

        let head = split_point(known.len(), self.config.most_similar_fraction);
        let mut most = known[..head].to_vec();
        let mut lesser = known[head..].to_vec();
        most.shuffle(rng);
        lesser.shuffle(rng);

        let (route, order) = if rng.gen::<f64>() < self.config.epsilon {
            debug!(
                "choosing from the {}% (= {}) lesser similar artists",
                100.0 * (1.0 - self.config.most_similar_fraction),
                lesser.len()
            );
            lesser.extend(most);
            (Route::LesserSimilarFirst, lesser)
        } else {
            debug!(
                "choosing from the {}% (= {}) most similar artists",
                100.0 * self.config.most_similar_fraction,
                most.len()
            );
            most.extend(lesser);
            (Route::MostSimilarFirst, most)
        };

        CandidatePlan {
            route,
            order,
            known_similar: known.len(),
            most_similar_len: head,
        }
    }

    /// Walk a plan and return the first existing file. Step 4.
    pub fn pick<R: Rng + ?Sized, P: PathProbe + ?Sized>(
        &self,
        plan: &CandidatePlan<'_>,
        index: &ArtistIndex,
        rng: &mut R,
        probe: &P,
    ) -> Option<Selection> {
        for &artist in &plan.order {
            let Some(tracks) = index.get(artist) else {
                continue;
            };
            if tracks.is_empty() {
                continue;
            }

            let mut files: Vec<&str> = tracks.files().collect();
            files.shuffle(rng);
            for file in files {
                if probe.exists(Path::new(file)) {
                    return Some(Selection {
                        artist: artist.to_owned(),
                        path: file.to_owned(),
                        route: plan.route,
                    });
                }
                debug!("path \"{file}\" does not exist, continuing...");
            }
        }
        None
    }

    /// Plan and pick in one go.
    ///
    /// # Arguments
    ///
    /// * `ranking` - Similar artists, most similar first.
    /// * `index` - Artists available locally.
    /// * `rng` - Drives the plan and the per-artist file shuffle.
    /// * `probe` - Decides which indexed paths still exist. [`FsProbe`]
    ///   asks the filesystem.
    ///
    /// # Returns
    ///
    /// * `Ok(Selection)` - The chosen file with its artist and the route
    ///   that led to it.
    ///
    /// # Errors
    ///
    /// [`AutoaddError::NoTrackFound`] if no candidate artist has a file that
    /// exists.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    ///
    /// use cmus_autoadd::index::ArtistIndex;
    /// use cmus_autoadd::selector::{Selector, SelectorConfig};
    /// use rand::rngs::StdRng;
    /// use rand::SeedableRng;
    ///
    /// let mut index = ArtistIndex::new();
    /// index.insert("Boards of Canada", Some("Roygbiv"), "/music/roygbiv.flac");
    ///
    /// let ranking = vec!["Boards of Canada".to_owned()];
    /// let selection = Selector::new(SelectorConfig::default()).select(
    ///     &ranking,
    ///     &index,
    ///     &mut StdRng::seed_from_u64(7),
    ///     &|_: &Path| true,
    /// )?;
    /// assert_eq!(selection.path, "/music/roygbiv.flac");
    /// # Ok::<(), cmus_autoadd::error::AutoaddError>(())
    /// ```
    pub fn select<R: Rng + ?Sized, P: PathProbe + ?Sized>(
        &self,
        ranking: &[String],
        index: &ArtistIndex,
        rng: &mut R,
        probe: &P,
    ) -> Result<Selection> {
        let plan = self.plan(ranking, index, rng);
        self.pick(&plan, index, rng, probe)
            .ok_or(AutoaddError::NoTrackFound)
    }
}
