//! # cmus Remote Control
//!
//! Talks to a running cmus through the `cmus-remote` command-line client,
//! the same way one would from a shell:
//!
//! ```bash
//! cmus-remote -C            # exits non-zero if cmus is not reachable
//! cmus-remote -q FILE       # append FILE to the play queue
//! cmus-remote -P FILE       # append FILE to the playlist
//! ```
//!
//! [`PlayerRemote`] is the seam the rest of the crate depends on.

use std::path::Path;
use std::process::{Command, Stdio};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{AutoaddError, Result};

/// Where the chosen track is added.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddTarget {
    #[default]
    Queue,
    Playlist,
}

impl AddTarget {
    /// `cmus-remote` flag selecting this target.
    #[must_use]
    pub const fn remote_flag(self) -> &'static str {
        match self {
            Self::Queue => "-q",
            Self::Playlist => "-P",
        }
    }
}

impl std::fmt::Display for AddTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Queue => "queue",
            Self::Playlist => "playlist",
        })
    }
}

pub trait PlayerRemote {
    /// Whether the player answers at all.
    fn is_running(&self) -> bool;

    /// Add one file to the player.
    ///
    /// # Errors
    ///
    /// [`AutoaddError::Enqueue`] if the player refused or could not be asked.
    fn enqueue(&self, path: &Path, target: AddTarget) -> Result<()>;
}

impl<T: PlayerRemote + ?Sized> PlayerRemote for &T {
    fn is_running(&self) -> bool {
        (**self).is_running()
    }

    fn enqueue(&self, path: &Path, target: AddTarget) -> Result<()> {
        (**self).enqueue(path, target)
    }
}

/// Fail with [`AutoaddError::PlayerUnavailable`] unless `remote` answers.
///
/// # Errors
///
/// See above.
pub fn ensure_running<P: PlayerRemote + ?Sized>(remote: &P) -> Result<()> {
    if remote.is_running() {
        Ok(())
    } else {
        Err(AutoaddError::PlayerUnavailable)
    }
}

/// `cmus-remote` driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmusRemote {
    program: String,
    args: Vec<String>,
}

impl Default for CmusRemote {
    fn default() -> Self {
        Self {
            program: "cmus-remote".to_owned(),
            args: Vec::new(),
        }
    }
}

impl CmusRemote {
    /// Build from a command line such as `["cmus-remote", "--server", "/tmp/s"]`.
    ///
    /// # Errors
    ///
    /// [`AutoaddError::Config`] for an empty command.
    pub fn new(command: &[String]) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| AutoaddError::Config("remote_command must not be empty".to_owned()))?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).stdin(Stdio::null());
        cmd
    }
}

impl PlayerRemote for CmusRemote {
    fn is_running(&self) -> bool {
        match self.command().arg("-C").stdout(Stdio::null()).status() {
            Ok(status) => status.success(),
            Err(e) => {
                debug!("could not run {}: {e}", self.program);
                false
            }
        }
    }

    fn enqueue(&self, path: &Path, target: AddTarget) -> Result<()> {
        let output = self
            .command()
            .arg(target.remote_flag())
            .arg(path)
            .output()
            .map_err(|e| AutoaddError::Enqueue {
                path: path.to_path_buf(),
                reason: format!("failed to execute {}: {e}", self.program),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AutoaddError::Enqueue {
                path: path.to_path_buf(),
                reason: format!("{} exited with {}: {}", self.program, output.status, stderr.trim()),
            });
        }

        info!("added \"{}\" to {target}", path.display());
        Ok(())
    }
}
