//! Files `init` drops into a repository.

use std::io;
use std::path::Path;

/// Default `.stignore` for a scratch folder.
pub const STIGNORE_TEMPLATE: &str = "\
// Syncthing ignore patterns for scratch folders
// This file is NOT synced between devices

// Python
__pycache__
*.pyc
*.pyo
*.egg-info
.eggs
*.egg
.mypy_cache
.pytest_cache
.ipynb_checkpoints

// Build artifacts
*.so
*.o
*.a
build/
dist/

// Editor/IDE
*.swp
*.swo
*~
.idea/
.vscode/
*.sublime-*

// OS junk
(?d).DS_Store
(?d)Thumbs.db
(?d)desktop.ini
(?d)._*

// Temporary files
*.tmp
*.temp
*.bak
*.log
";

const GITIGNORE_ENTRY: &str = "# Local scratch folder (synced via scratch-sync)\nscratch/\n";

/// What [`ensure_gitignore`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitignoreChange {
    /// Wrote a new `.gitignore`.
    Created,
    /// Appended the entry.
    Appended,
    /// Already ignored.
    Unchanged,
}

/// Write the default `.stignore` unless one exists. Returns whether it wrote.
pub fn ensure_stignore(scratch: &Path) -> io::Result<bool> {
    let path = scratch.join(".stignore");
    if path.exists() {
        return Ok(false);
    }
    std::fs::write(path, STIGNORE_TEMPLATE)?;
    Ok(true)
}

/// Make sure the repository's `.gitignore` ignores `scratch/`.
pub fn ensure_gitignore(repo: &Path) -> io::Result<GitignoreChange> {
    let path = repo.join(".gitignore");
    if !path.exists() {
        std::fs::write(&path, GITIGNORE_ENTRY)?;
        return Ok(GitignoreChange::Created);
    }

    let content = std::fs::read_to_string(&path)?;
    if content.contains("scratch/") || content.contains("/scratch") {
        return Ok(GitignoreChange::Unchanged);
    }
    let mut appended = content;
    if !appended.is_empty() && !appended.ends_with('\n') {
        appended.push('\n');
    }
    appended.push('\n');
    appended.push_str(GITIGNORE_ENTRY);
    std::fs::write(&path, appended)?;
    Ok(GitignoreChange::Appended)
}
