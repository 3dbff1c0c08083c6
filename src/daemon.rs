//! # Detaching From cmus
//!
//! cmus waits for its `status_display_program` to exit before it carries on,
//! and a similar-artist lookup can take a few seconds. After the liveness
//! check the process therefore forks: the parent exits straight away and the
//! child does the slow part in the background.
//!
//! Fork before creating any threads (the HTTP client spawns some).

use log::{debug, warn};

/// Which side of [`detach`] the caller is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detached {
    /// Running in the forked child.
    Child,
    /// Fork failed or is unsupported; still in the original process.
    Foreground,
}

impl Detached {
    /// Whether cmus is still waiting for this process to exit.
    #[must_use]
    pub const fn blocks_player(self) -> bool {
        matches!(self, Self::Foreground)
    }
}

/// Fork and let the parent exit with status 0.
///
/// Only the child (or the original process, if forking failed) returns.
#[cfg(unix)]
pub fn detach() -> Detached {
    // Safety: called while the process is still single-threaded; the parent
    // leaves through `_exit` without running destructors or atexit hooks.
    match unsafe { libc::fork() } {
        0 => {
            debug!("detached from cmus, continuing in pid {}", std::process::id());
            Detached::Child
        }
        pid if pid > 0 => unsafe { libc::_exit(0) },
        _ => {
            warn!("fork failed, continuing in the foreground: {}", std::io::Error::last_os_error());
            Detached::Foreground
        }
    }
}

#[cfg(not(unix))]
pub fn detach() -> Detached {
    debug!("detaching is not supported on this platform");
    Detached::Foreground
}
