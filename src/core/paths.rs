//! Path normalization utilities
//!
//! All paths in rendered output use '/' as separator and are relative to
//! the scan root.

use std::path::Path;

/// Normalize a path to use '/' as separator (for cross-platform consistency)
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Make a path relative to the root directory
pub fn make_relative(path: &Path, root: &Path) -> Option<String> {
    path.strip_prefix(root).ok().map(normalize_path)
}

/// Validate that a path resolves inside the root directory.
///
/// Both sides are canonicalized, so a symlink pointing outside the root
/// fails this check even when its own location is inside. Resolution
/// failures count as outside.
pub fn is_within_root(path: &Path, root: &Path) -> bool {
    path.canonicalize()
        .ok()
        .and_then(|p| root.canonicalize().ok().map(|r| p.starts_with(r)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("src/main.rs")), "src/main.rs");
    }

    #[test]
    fn test_make_relative() {
        let root = Path::new("/project");
        let path = PathBuf::from("/project/src/main.rs");
        assert_eq!(make_relative(&path, root), Some("src/main.rs".to_string()));
    }

    #[test]
    fn test_make_relative_not_under_root() {
        let root = Path::new("/project");
        assert_eq!(make_relative(Path::new("/other/file.rs"), root), None);
    }

    #[test]
    fn test_is_within_root() {
        let temp = tempfile::tempdir().unwrap();
        let subdir = temp.path().join("subdir");
        std::fs::create_dir(&subdir).unwrap();
        let file = subdir.join("file.txt");
        std::fs::write(&file, "test").unwrap();
        assert!(is_within_root(&file, temp.path()));
    }

    #[test]
    fn test_is_within_root_outside() {
        let temp1 = tempfile::tempdir().unwrap();
        let temp2 = tempfile::tempdir().unwrap();
        let file = temp1.path().join("file.txt");
        std::fs::write(&file, "test").unwrap();
        assert!(!is_within_root(&file, temp2.path()));
    }
}
