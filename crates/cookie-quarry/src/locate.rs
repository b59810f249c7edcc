//! Store discovery: a bounded recursive walk under each browser root,
//! matching the store file by basename. Unreadable directories are
//! skipped, symlinks are never followed, and enumeration order is
//! deterministic (name order within each directory).

use std::path::{Path, PathBuf};

use tracing::debug;

pub const DEFAULT_MAX_DEPTH: usize = 3;

/// Every file named `store_name` under the given roots, up to
/// `max_depth` directory levels below each root.
pub fn find_stores(roots: &[PathBuf], store_name: &str, max_depth: usize) -> Vec<PathBuf> {
    let mut found = Vec::new();
    for root in roots {
        walk(root, store_name, max_depth, &mut found);
    }
    found
}

fn walk(dir: &Path, store_name: &str, depth_left: usize, found: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!(dir = %dir.display(), %err, "skipping unreadable directory");
            return;
        }
    };

    let mut entries: Vec<_> = entries.filter_map(|e| e.ok()).collect();
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        // DirEntry::file_type does not traverse symlinks, so links are
        // classified as symlinks here and skipped.
        if file_type.is_file() {
            if entry.file_name().to_str() == Some(store_name) {
                found.push(entry.path());
            }
        } else if file_type.is_dir() && depth_left > 0 {
            walk(&entry.path(), store_name, depth_left - 1, found);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"").unwrap();
    }

    #[test]
    fn finds_stores_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        touch(&root.join("Profile 1/Cookies"));
        touch(&root.join("Default/Cookies"));
        touch(&root.join("Default/Network/Cookies"));
        touch(&root.join("Default/History"));

        let found = find_stores(&[root.clone()], "Cookies", DEFAULT_MAX_DEPTH);
        assert_eq!(
            found,
            vec![
                root.join("Default/Cookies"),
                root.join("Default/Network/Cookies"),
                root.join("Profile 1/Cookies"),
            ]
        );
    }

    #[test]
    fn respects_depth_limit() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        touch(&root.join("a/b/c/Cookies"));
        touch(&root.join("a/b/c/d/Cookies"));

        let found = find_stores(&[root.clone()], "Cookies", 3);
        assert_eq!(found, vec![root.join("a/b/c/Cookies")]);
    }

    #[test]
    fn missing_root_yields_empty() {
        let found = find_stores(
            &[PathBuf::from("/nonexistent/cookie-quarry-root")],
            "Cookies",
            DEFAULT_MAX_DEPTH,
        );
        assert!(found.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn does_not_follow_symlinked_directories() {
        let outside = tempfile::tempdir().unwrap();
        touch(&outside.path().join("profile/Cookies"));

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        touch(&root.join("Default/Cookies"));
        std::os::unix::fs::symlink(outside.path(), root.join("escape")).unwrap();

        let found = find_stores(&[root.clone()], "Cookies", DEFAULT_MAX_DEPTH);
        assert_eq!(found, vec![root.join("Default/Cookies")]);
    }
}
