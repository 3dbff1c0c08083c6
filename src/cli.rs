//! # Command-Line Interface Module
//!
//! cmus runs its `status_display_program` with the status of the new track
//! as alternating keys and values. Options are only practical when the hook
//! is a wrapper script:
//!
//! ```bash
//! # ~/.cmus/autoadd.sh
//! exec cmus-autoadd --epsilon 0.2 --playlist "$@"
//! ```
//!
//! ```text
//! :set status_display_program=~/.cmus/autoadd.sh
//! ```

use std::path::PathBuf;

use clap::{ArgGroup, Parser, ValueEnum};

use crate::cmus_client::AddTarget;
use crate::config::ConfigOverrides;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

/// Application arguments.
#[derive(Parser, Debug)]
#[command(name = "cmus-autoadd")]
#[command(about = "Add a track by a similar artist to cmus whenever playback changes")]
#[command(version)]
#[command(group(ArgGroup::new("target").args(["queue", "playlist"])))]
pub struct Args {
    /// Configuration file (default: <config dir>/cmus-autoadd/config.json)
    #[arg(long, value_name = "FILE", env = "CMUS_AUTOADD_CONFIG")]
    pub config: Option<PathBuf>,

    /// cmus configuration directory holding `cache` and `lib.pl`
    #[arg(long, value_name = "DIR")]
    pub cmus_dir: Option<PathBuf>,

    /// Probability of choosing among the less similar artists first
    #[arg(long, value_name = "P")]
    pub epsilon: Option<f64>,

    /// Fraction of the similar artists counted as "most similar"
    #[arg(long, value_name = "FRACTION")]
    pub most_similar: Option<f64>,

    /// Probability of ignoring similar artists altogether
    #[arg(long, value_name = "P")]
    pub jumpout_epsilon: Option<f64>,

    /// Add to the play queue (default)
    #[arg(long)]
    pub queue: bool,

    /// Add to the playlist instead of the queue
    #[arg(long)]
    pub playlist: bool,

    /// Consider every cached track, not only those in the library
    #[arg(long)]
    pub all_tracks: bool,

    /// Stay in the foreground instead of returning to cmus immediately
    #[arg(long)]
    pub no_detach: bool,

    /// Print the chosen file instead of adding it
    #[arg(long)]
    pub dry_run: bool,

    /// Log debug output to stderr
    #[arg(long)]
    pub debug: bool,

    /// Print a completion script for SHELL and exit
    #[arg(long, value_name = "SHELL")]
    pub completions: Option<Shell>,

    /// Status of the new track, as `key value` pairs; one key must be `artist`
    #[arg(
        value_name = "KEY VALUE",
        required_unless_present = "completions",
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub pairs: Vec<String>,
}

impl Args {
    #[must_use]
    pub fn add_to(&self) -> Option<AddTarget> {
        if self.playlist {
            Some(AddTarget::Playlist)
        } else if self.queue {
            Some(AddTarget::Queue)
        } else {
            None
        }
    }

    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            epsilon: self.epsilon,
            most_similar: self.most_similar,
            jumpout_epsilon: self.jumpout_epsilon,
            add_to: self.add_to(),
            all_tracks: self.all_tracks,
            cmus_dir: self.cmus_dir.clone(),
            debug: self.debug,
        }
    }
}
