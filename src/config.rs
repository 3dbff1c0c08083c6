//! # Configuration Module
//!
//! cmus starts its `status_display_program` with a fixed argument list, so
//! every tunable lives in a JSON file instead:
//!
//! - Linux: `~/.config/cmus-autoadd/config.json`
//! - macOS: `~/Library/Application Support/cmus-autoadd/config.json`
//!
//! Every key is optional. Command-line flags, when given, take precedence
//! over the file (see [`ConfigOverrides`]).
//!
//! ```json
//! {
//!   "add_to": "playlist",
//!   "most_similar": 0.25,
//!   "epsilon": 0.2,
//!   "lastfm_api_key": "0123456789abcdef"
//! }
//! ```
//!
//! This module also locates the cmus configuration directory, which holds
//! the `cache` and `lib.pl` files.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;
use path_absolutize::Absolutize;
use serde::{Deserialize, Serialize};

use crate::cache::ScanPolicy;
use crate::cmus_client::AddTarget;
use crate::error::AutoaddError;
use crate::selector::SelectorConfig;

/// Environment variable consulted when the file carries no API key.
pub const API_KEY_ENV: &str = "LASTFM_API_KEY";

/// Everything an autoadd run can be tuned with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AutoaddConfig {
    /// Only consider tracks listed in `lib.pl`.
    pub only_tracks_in_library: bool,
    pub add_to: AddTarget,
    /// Fraction of the similar-artist ranking treated as "most similar".
    pub most_similar: f64,
    /// Probability of starting with the less similar artists.
    pub epsilon: f64,
    /// Probability of ignoring similarity and picking any artist.
    pub jumpout_epsilon: f64,
    pub scan_policy: ScanPolicy,
    /// cmus configuration directory. Resolved from the environment if unset.
    pub cmus_dir: Option<PathBuf>,
    /// `cmus-remote` command line, program first.
    pub remote_command: Vec<String>,
    pub lastfm_api_key: Option<String>,
    /// Cap on the number of similar artists requested.
    pub similar_limit: Option<u32>,
    pub debug: bool,
}

impl Default for AutoaddConfig {
    fn default() -> Self {
        let selector = SelectorConfig::default();
        Self {
            only_tracks_in_library: true,
            add_to: AddTarget::Queue,
            most_similar: selector.most_similar_fraction,
            epsilon: selector.epsilon,
            jumpout_epsilon: selector.jumpout_epsilon,
            scan_policy: ScanPolicy::FailFast,
            cmus_dir: None,
            remote_command: vec!["cmus-remote".to_owned()],
            lastfm_api_key: None,
            similar_limit: None,
            debug: false,
        }
    }
}

/// Values given on the command line. `None` / `false` leaves the file's
/// value alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub epsilon: Option<f64>,
    pub most_similar: Option<f64>,
    pub jumpout_epsilon: Option<f64>,
    pub add_to: Option<AddTarget>,
    pub all_tracks: bool,
    pub cmus_dir: Option<PathBuf>,
    pub debug: bool,
}

impl AutoaddConfig {
    /// Load the configuration.
    ///
    /// # Arguments
    ///
    /// * `explicit` - A file given with `--config`. When set, that file must
    ///   exist. Otherwise the default location from [`get_config_path`] is
    ///   tried.
    ///
    /// # Returns
    ///
    /// * `Ok(AutoaddConfig)` - The parsed file, or [`AutoaddConfig::default`]
    ///   when no file was named and none exists at the default location.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - An explicit file is missing or cannot be read
    /// - The file is not valid JSON for this structure (unknown keys included)
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::path::Path;
    ///
    /// use cmus_autoadd::config::AutoaddConfig;
    ///
    /// let config = AutoaddConfig::load(Some(Path::new("autoadd.json")))?;
    /// config.validate()?;
    /// println!("adding to the {}", config.add_to);
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match get_config_path() {
                Some(path) if path.exists() => path,
                _ => {
                    debug!("no config file, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_json_str(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse a JSON document.
    ///
    /// # Errors
    ///
    /// Any `serde_json` error.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(epsilon) = overrides.epsilon {
            self.epsilon = epsilon;
        }
        if let Some(most_similar) = overrides.most_similar {
            self.most_similar = most_similar;
        }
        if let Some(jumpout) = overrides.jumpout_epsilon {
            self.jumpout_epsilon = jumpout;
        }
        if let Some(add_to) = overrides.add_to {
            self.add_to = add_to;
        }
        if overrides.all_tracks {
            self.only_tracks_in_library = false;
        }
        if let Some(dir) = &overrides.cmus_dir {
            self.cmus_dir = Some(dir.clone());
        }
        self.debug |= overrides.debug;
    }

    #[must_use]
    pub fn selector_config(&self) -> SelectorConfig {
        SelectorConfig {
            most_similar_fraction: self.most_similar,
            epsilon: self.epsilon,
            jumpout_epsilon: self.jumpout_epsilon,
        }
    }

    /// # Errors
    ///
    /// [`AutoaddError::Config`] for a probability outside `[0, 1]` or an
    /// empty `remote_command`.
    pub fn validate(&self) -> Result<(), AutoaddError> {
        self.selector_config().validate()?;
        if self.remote_command.is_empty() {
            return Err(AutoaddError::Config("remote_command must not be empty".to_owned()));
        }
        Ok(())
    }

    /// API key from the file, else from `LASTFM_API_KEY`.
    #[must_use]
    pub fn lastfm_api_key(&self) -> Option<String> {
        self.lastfm_api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.is_empty())
    }
}

/// Default location of the configuration file, if the platform has a
/// configuration directory.
#[must_use]
pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("cmus-autoadd").join("config.json"))
}

/// Pick the cmus configuration directory.
///
/// In order: `configured`, then `$CMUS_HOME/.cmus` when `cmus_home` is an
/// absolute path, then `~/.cmus`. The result is made absolute.
///
/// # Errors
///
/// Fails when nothing is configured and the home directory is unknown.
pub fn resolve_cmus_dir(configured: Option<&Path>, cmus_home: Option<&OsStr>, home: Option<&Path>) -> Result<PathBuf> {
    let dir = match (configured, cmus_home.map(Path::new)) {
        (Some(dir), _) => dir.to_path_buf(),
        (None, Some(cmus_home)) if cmus_home.is_absolute() => cmus_home.join(".cmus"),
        _ => home
            .context("Could not determine home directory to locate ~/.cmus")?
            .join(".cmus"),
    };

    let absolute = dir
        .absolutize()
        .with_context(|| format!("Failed to make {} absolute", dir.display()))?;
    Ok(absolute.into_owned())
}

/// The cmus files an autoadd run reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmusPaths {
    pub dir: PathBuf,
    pub cache: PathBuf,
    pub library: PathBuf,
}

impl CmusPaths {
    #[must_use]
    pub fn new(dir: PathBuf) -> Self {
        Self {
            cache: dir.join("cache"),
            library: dir.join("lib.pl"),
            dir,
        }
    }

    /// Resolve from `config` and the process environment.
    ///
    /// # Errors
    ///
    /// See [`resolve_cmus_dir`].
    pub fn from_env(config: &AutoaddConfig) -> Result<Self> {
        let cmus_home = std::env::var_os("CMUS_HOME");
        let home = dirs::home_dir();
        let dir = resolve_cmus_dir(config.cmus_dir.as_deref(), cmus_home.as_deref(), home.as_deref())?;
        Ok(Self::new(dir))
    }
}
