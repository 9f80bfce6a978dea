//! Managed folder ids.

/// Sanitize a name for use in a folder id.
///
/// Lower-cases, replaces anything outside `[a-z0-9_-]` with `-`, collapses
/// runs of `-`, and trims leading/trailing `-`.
pub fn sanitize_folder_id(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.to_lowercase().chars() {
        let c = if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            c
        } else {
            '-'
        };
        if c == '-' && out.ends_with('-') {
            continue;
        }
        out.push(c);
    }
    out.trim_matches('-').to_string()
}

/// Folder id for a repository name, e.g. `scratch-my-repo`.
pub fn managed_folder_id(prefix: &str, name: &str) -> String {
    format!("{}{}", prefix, sanitize_folder_id(name))
}

/// Whether a folder id belongs to scratch-sync.
pub fn is_managed(folder_id: &str, prefix: &str) -> bool {
    folder_id.starts_with(prefix)
}

/// Repository name from a git remote URL.
///
/// Handles `git@host:user/repo.git` and `https://host/user/repo(.git)`.
pub fn repo_name_from_remote(url: &str) -> Option<String> {
    let url = url.trim().trim_end_matches('/');
    let tail = url.rsplit(['/', ':']).next()?;
    let name = tail.strip_suffix(".git").unwrap_or(tail);
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_and_collapses() {
        assert_eq!(sanitize_folder_id("My Repo"), "my-repo");
        assert_eq!(sanitize_folder_id("foo..bar//baz"), "foo-bar-baz");
        assert_eq!(sanitize_folder_id("--edge--"), "edge");
        assert_eq!(sanitize_folder_id("snake_case-ok"), "snake_case-ok");
        assert_eq!(sanitize_folder_id("ünïcode"), "n-code");
    }

    #[test]
    fn managed_id_uses_prefix() {
        assert_eq!(managed_folder_id("scratch-", "Data Tools"), "scratch-data-tools");
        assert!(is_managed("scratch-data-tools", "scratch-"));
        assert!(!is_managed("default", "scratch-"));
    }

    #[test]
    fn repo_name_from_common_remotes() {
        assert_eq!(
            repo_name_from_remote("git@github.com:user/repo.git").as_deref(),
            Some("repo")
        );
        assert_eq!(
            repo_name_from_remote("https://github.com/user/repo.git").as_deref(),
            Some("repo")
        );
        assert_eq!(
            repo_name_from_remote("https://github.com/user/repo/").as_deref(),
            Some("repo")
        );
        assert_eq!(repo_name_from_remote(""), None);
    }
}
