//! # cmus-autoadd
//!
//! Entry point for cmus' `status_display_program`.
//!
//! ## Usage
//!
//! ```bash
//! # what cmus runs on every track change
//! cmus-autoadd status playing file /music/a.flac artist Portishead title Roads
//!
//! # see what would be added, without touching cmus
//! cmus-autoadd --dry-run --no-detach artist Portishead
//! ```
//!
//! Set `RUST_LOG` (or pass `--debug`) for more output on stderr.

use std::io;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use log::{debug, LevelFilter};

use cmus_autoadd::app::Autoadd;
use cmus_autoadd::cli::Args;
use cmus_autoadd::cmus_client::{self, CmusRemote};
use cmus_autoadd::completion::{generate_completions, shell_to_completion_shell};
use cmus_autoadd::config::{AutoaddConfig, CmusPaths, API_KEY_ENV};
use cmus_autoadd::daemon::{self, Detached};
use cmus_autoadd::error::AutoaddError;
use cmus_autoadd::lastfm::LastFm;
use cmus_autoadd::selector::FsProbe;
use cmus_autoadd::track::CurrentTrack;

fn main() {
    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("cmus-autoadd: {e:#}");
        std::process::exit(1);
    }
}

/// Warnings are always shown, like the diagnostics cmus users expect on
/// stderr. `--debug` raises this crate to debug level.
fn init_logging(debug: bool) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if debug {
        builder.filter_module("cmus_autoadd", LevelFilter::Debug);
    }
    builder.init();
}

fn run(args: &Args) -> Result<()> {
    if let Some(shell) = args.completions {
        generate_completions(shell_to_completion_shell(shell), &mut Args::command(), &mut io::stdout());
        return Ok(());
    }

    let mut config = AutoaddConfig::load(args.config.as_deref())?;
    config.apply_overrides(&args.overrides());
    init_logging(config.debug);
    config.validate()?;

    let track = CurrentTrack::from_pairs(&args.pairs)?;
    let paths = CmusPaths::from_env(&config)?;
    let remote = CmusRemote::new(&config.remote_command)?;
    cmus_client::ensure_running(&remote)?;

    let api_key = config.lastfm_api_key().ok_or_else(|| {
        AutoaddError::Config(format!(
            "no last.fm API key, set \"lastfm_api_key\" in the config file or {API_KEY_ENV}"
        ))
    })?;

    // The HTTP client starts threads, so it must be built after the fork.
    let detached = if args.no_detach || args.dry_run {
        Detached::Foreground
    } else {
        daemon::detach()
    };
    if detached.blocks_player() {
        debug!("running in the foreground, cmus waits until this exits");
    }
    let lastfm = LastFm::new(api_key)
        .context("Failed to set up the last.fm client")?
        .with_limit(config.similar_limit);

    debug!("cmus directory {}", paths.dir.display());
    let app = Autoadd::new(config, paths, lastfm, remote);
    let selection = app.autoadd(track.artist(), &mut rand::thread_rng(), &FsProbe, args.dry_run)?;

    if args.dry_run {
        println!("{}", selection.path);
    }
    Ok(())
}
