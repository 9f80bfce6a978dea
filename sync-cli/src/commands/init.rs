//! Register a repository's scratch/ folder with Syncthing.

use anyhow::{Context, Result};
use scratch_sync_client::{locate, DaemonConfig, Program};
use scratch_sync_core::{managed_folder_id, repo_name_from_remote};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::templates::{ensure_gitignore, ensure_stignore, GitignoreChange};

/// The enclosing git repository root, if any.
pub fn repo_root(path: &Path) -> Option<PathBuf> {
    path.ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

/// Name a repository: origin remote name, else the root directory's name.
///
/// `None` outside a git repository.
pub async fn repo_name(path: &Path, git: Option<&Program>) -> Option<String> {
    let root = repo_root(path)?;
    if let (Some(git), Some(root_str)) = (git, root.to_str()) {
        let args = ["-C", root_str, "remote", "get-url", "origin"];
        match git.exec_ok(&args).await {
            Ok(out) => {
                if let Some(name) = repo_name_from_remote(out.stdout.trim()) {
                    return Some(name);
                }
            }
            Err(e) => tracing::debug!("no origin remote: {}", e),
        }
    }
    root.file_name().map(|n| n.to_string_lossy().to_string())
}

/// Add `folder_id` at `scratch` and share it with every known remote device.
///
/// Returns the devices it was shared with.
pub async fn register_folder<D: DaemonConfig>(
    daemon: &D,
    folder_id: &str,
    scratch: &Path,
) -> Result<Vec<String>> {
    let existing = daemon
        .list_folders()
        .await
        .context("Failed to list Syncthing folders")?;
    if existing.iter().any(|f| f == folder_id) {
        anyhow::bail!(
            "Folder '{}' already exists in Syncthing config.\nTo remove: syncthing cli config folders remove --id {}",
            folder_id,
            folder_id
        );
    }

    daemon
        .add_folder(folder_id, scratch)
        .await
        .context("Failed to add folder")?;

    let local = daemon.local_device_id().await?;
    let mut shared = Vec::new();
    for device_id in daemon.list_devices().await? {
        if device_id == local {
            continue;
        }
        match daemon.add_device_to_folder(folder_id, &device_id).await {
            Ok(()) => shared.push(device_id),
            Err(e) => tracing::warn!("could not share {} with {}: {}", folder_id, device_id, e),
        }
    }
    Ok(shared)
}

/// Run the init command.
pub async fn run(config: &Config, path: Option<&Path>, name: Option<&str>) -> Result<()> {
    let daemon = super::syncthing(config)?;

    let path = match path {
        Some(p) => p.to_path_buf(),
        None => std::env::current_dir().context("Cannot determine current directory")?,
    };
    let path = path
        .canonicalize()
        .with_context(|| format!("No such directory: {}", path.display()))?;

    let scratch = path.join("scratch");
    if !scratch.exists() {
        println!("Creating scratch directory: {}", scratch.display());
        std::fs::create_dir_all(&scratch)
            .with_context(|| format!("Failed to create {}", scratch.display()))?;
    }

    let name = match name {
        Some(n) => n.to_string(),
        None => {
            let git = locate("git", None).map(|p| Program::new(p, config.command_timeout()));
            match repo_name(&path, git.as_ref()).await {
                Some(n) => n,
                None => path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
            }
        }
    };
    let folder_id = managed_folder_id(&config.folders.prefix, &name);
    if folder_id == config.folders.prefix {
        anyhow::bail!("Cannot derive a folder id from {:?}; pass --name", name);
    }

    println!("Adding folder to Syncthing:");
    println!("  ID:   {}", folder_id);
    println!("  Path: {}", scratch.display());

    for device_id in register_folder(&daemon, &folder_id, &scratch).await? {
        println!("  Added device: {}...", short(&device_id));
    }

    if ensure_stignore(&scratch).context("Failed to write .stignore")? {
        println!("Created default .stignore");
    }
    match ensure_gitignore(&path).context("Failed to update .gitignore")? {
        GitignoreChange::Created => println!("Created .gitignore with scratch/"),
        GitignoreChange::Appended => println!("Added scratch/ to .gitignore"),
        GitignoreChange::Unchanged => {}
    }

    println!();
    println!("Done!");
    println!();
    println!("Next steps:");
    println!("  1. Run 'scratch-sync pair' to discover and pair with other devices");
    println!("  2. On other devices, run 'scratch-sync init' in the same repo");
    Ok(())
}

fn short(device_id: &str) -> &str {
    device_id.get(..7).unwrap_or(device_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scratch_sync_client::MockDaemon;
    use tempfile::tempdir;

    #[tokio::test]
    async fn register_shares_with_known_remote_devices() {
        let daemon = MockDaemon::new("LOCAL");
        daemon.add_device("PEER-1", Some("one")).await.unwrap();
        daemon.add_device("PEER-2", None).await.unwrap();

        let shared = register_folder(&daemon, "scratch-repo", Path::new("/r/scratch"))
            .await
            .unwrap();
        assert_eq!(shared, vec!["PEER-1", "PEER-2"]);
        assert_eq!(
            daemon.shared_with("scratch-repo"),
            vec!["LOCAL", "PEER-1", "PEER-2"]
        );
    }

    #[tokio::test]
    async fn register_refuses_existing_folder() {
        let daemon = MockDaemon::new("LOCAL").with_folder("scratch-repo", "/r/scratch");
        let err = register_folder(&daemon, "scratch-repo", Path::new("/r/scratch"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn repo_name_without_git_uses_root_dir() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("My Project");
        std::fs::create_dir_all(root.join(".git")).unwrap();
        std::fs::create_dir_all(root.join("src/deep")).unwrap();

        let name = repo_name(&root.join("src/deep"), None).await;
        assert_eq!(name.as_deref(), Some("My Project"));
    }

    #[test]
    fn short_handles_short_ids() {
        assert_eq!(short("ABCDEFGHIJ"), "ABCDEFG");
        assert_eq!(short("AB"), "AB");
    }
}
