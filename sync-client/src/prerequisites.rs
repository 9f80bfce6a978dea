//! Locating the external programs scratch-sync drives.
//!
//! Both the overlay client and the sync daemon are found through an explicit
//! path from configuration, then `PATH`, then a few well-known install
//! locations. Missing prerequisites are the only fatal condition of a
//! pairing run and are checked once, before any probing.

use crate::command::Program;
use crate::error::{ClientError, Result};
use crate::membership::{MembershipSource, TailscaleCli};
use directories::BaseDirs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Sync daemon binary name.
pub const SYNCTHING: &str = "syncthing";

/// Overlay client binary name.
pub const TAILSCALE: &str = "tailscale";

fn common_locations(name: &str) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if cfg!(windows) {
        if let Some(local) = std::env::var_os("LOCALAPPDATA") {
            paths.push(
                PathBuf::from(local)
                    .join("Programs")
                    .join(name)
                    .join(format!("{}.exe", name)),
            );
        }
        paths.push(PathBuf::from(format!("C:/Program Files/{0}/{0}.exe", name)));
        return paths;
    }
    if let Some(dirs) = BaseDirs::new() {
        paths.push(dirs.home_dir().join(".local").join("bin").join(name));
    }
    paths.push(Path::new("/usr/local/bin").join(name));
    paths.push(Path::new("/opt/homebrew/bin").join(name));
    if name == TAILSCALE {
        paths.push(PathBuf::from("/Applications/Tailscale.app/Contents/MacOS/Tailscale"));
    }
    paths
}

/// Find `name`, preferring `explicit` when given.
///
/// An explicit path that does not exist is not replaced by a search.
pub fn locate(name: &str, explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }
    if let Ok(path) = which::which(name) {
        return Some(path);
    }
    common_locations(name).into_iter().find(|p| p.is_file())
}

/// Explicit binary paths; `None` means search.
#[derive(Debug, Clone, Default)]
pub struct Prerequisites {
    /// Sync daemon binary.
    pub syncthing: Option<PathBuf>,
    /// Overlay client binary.
    pub tailscale: Option<PathBuf>,
    /// Bound on each external command.
    pub command_timeout: Duration,
}

/// Programs found by [`Prerequisites::check`].
#[derive(Debug, Clone)]
pub struct Toolchain {
    /// Sync daemon.
    pub syncthing: Program,
    /// Overlay client.
    pub tailscale: Program,
}

impl Prerequisites {
    /// The sync daemon, or [`ClientError::MissingPrerequisite`].
    pub fn syncthing(&self) -> Result<Program> {
        locate(SYNCTHING, self.syncthing.as_deref())
            .map(|path| Program::new(path, self.command_timeout))
            .ok_or_else(|| ClientError::MissingPrerequisite("Syncthing not installed".into()))
    }

    /// The overlay client, or [`ClientError::MissingPrerequisite`].
    pub fn tailscale(&self) -> Result<Program> {
        locate(TAILSCALE, self.tailscale.as_deref())
            .map(|path| Program::new(path, self.command_timeout))
            .ok_or_else(|| ClientError::MissingPrerequisite("Tailscale not installed".into()))
    }

    /// Everything a pairing run needs: a running overlay and a daemon binary.
    pub async fn check(&self) -> Result<Toolchain> {
        let tailscale = self.tailscale()?;
        if !TailscaleCli::new(tailscale.clone()).is_running().await {
            return Err(ClientError::MissingPrerequisite("Tailscale is not running".into()));
        }
        let syncthing = self.syncthing()?;
        tracing::debug!(
            "using {} and {}",
            syncthing.path().display(),
            tailscale.path().display()
        );
        Ok(Toolchain {
            syncthing,
            tailscale,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("my-syncthing");
        std::fs::write(&bin, "").unwrap();
        assert_eq!(locate(SYNCTHING, Some(&bin)), Some(bin));
    }

    #[test]
    fn missing_explicit_path_is_not_searched_around() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("absent");
        assert_eq!(locate("sh", Some(&bin)), None);
    }

    #[test]
    fn missing_daemon_is_a_prerequisite_error() {
        let dir = tempfile::tempdir().unwrap();
        let prereqs = Prerequisites {
            syncthing: Some(dir.path().join("nope")),
            tailscale: None,
            command_timeout: Duration::from_secs(1),
        };
        let err = prereqs.syncthing().unwrap_err();
        assert!(matches!(err, ClientError::MissingPrerequisite(_)));
        assert_eq!(err.to_string(), "Syncthing not installed");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stopped_overlay_fails_check() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let tailscale = dir.path().join("tailscale");
        std::fs::write(&tailscale, "#!/bin/sh\nexit 1\n").unwrap();
        std::fs::set_permissions(&tailscale, std::fs::Permissions::from_mode(0o755)).unwrap();
        let syncthing = dir.path().join("syncthing");
        std::fs::write(&syncthing, "").unwrap();

        let prereqs = Prerequisites {
            syncthing: Some(syncthing),
            tailscale: Some(tailscale),
            command_timeout: Duration::from_secs(5),
        };
        let err = prereqs.check().await.unwrap_err();
        assert_eq!(err.to_string(), "Tailscale is not running");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn running_overlay_and_daemon_pass_check() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let tailscale = dir.path().join("tailscale");
        std::fs::write(&tailscale, "#!/bin/sh\nexit 0\n").unwrap();
        std::fs::set_permissions(&tailscale, std::fs::Permissions::from_mode(0o755)).unwrap();
        let syncthing = dir.path().join("syncthing");
        std::fs::write(&syncthing, "").unwrap();

        let prereqs = Prerequisites {
            syncthing: Some(syncthing.clone()),
            tailscale: Some(tailscale),
            command_timeout: Duration::from_secs(5),
        };
        let toolchain = prereqs.check().await.unwrap();
        assert_eq!(toolchain.syncthing.path(), syncthing.as_path());
    }
}
