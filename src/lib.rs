//! Queue a track by a similar artist whenever cmus changes tracks.
//!
//! cmus hands the status of every new track to its `status_display_program`.
//! Pointed at `cmus-autoadd`, each change looks up artists similar to the one
//! playing and adds a file by one of them to the queue or playlist.
//!
//! Core modules:
//! - [`cache`] - Reader for cmus' binary metadata cache
//! - [`index`] - Artist → title → path index built from the cache
//! - [`library`] - `lib.pl` path set used to restrict the index
//! - [`selector`] - Epsilon-greedy choice among similar artists
//! - [`similarity`] / [`lastfm`] - Similar-artist lookup
//! - [`cmus_client`] - `cmus-remote` driver
//! - [`app`] - One complete autoadd run
//!
//! ### Supporting Modules
//!
//! - [`config`] - Configuration file and cmus directory resolution
//! - [`cli`] - Command-line interface definitions with clap integration
//! - [`completion`] - Shell completion generation
//! - [`daemon`] - Detaching from cmus
//! - [`track`] - Parsing the status key/value pairs
//! - [`error`] - Error types
//!
//! ## Quick Start Example
//!
//! ```no_run
//! use cmus_autoadd::app::Autoadd;
//! use cmus_autoadd::cmus_client::CmusRemote;
//! use cmus_autoadd::config::{AutoaddConfig, CmusPaths};
//! use cmus_autoadd::lastfm::LastFm;
//! use cmus_autoadd::selector::FsProbe;
//!
//! let config = AutoaddConfig::load(None)?;
//! let paths = CmusPaths::from_env(&config)?;
//! let remote = CmusRemote::new(&config.remote_command)?;
//! let lastfm = LastFm::new("api-key")?;
//!
//! let app = Autoadd::new(config, paths, lastfm, remote);
//! let chosen = app.run("Portishead", &mut rand::thread_rng(), &FsProbe, false)?;
//! println!("added {}", chosen.path);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod app;
pub mod cache;
pub mod cli;
pub mod cmus_client;
pub mod completion;
pub mod config;
pub mod daemon;
pub mod error;
pub mod index;
pub mod lastfm;
pub mod library;
pub mod selector;
pub mod similarity;
pub mod track;
