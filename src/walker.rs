//! Directory tree walker
//!
//! Depth-first traversal with an explicit work stack: no recursion (deep
//! trees cannot blow the call stack) and counter mutation happens on a
//! single accumulator passed in by the caller, never through captured
//! closures.
//!
//! Entries within a directory are sorted directories-first, then
//! case-insensitively by name. Excluded entries are pruned before descent,
//! so an ignored dependency cache is never listed. Tree lines use the
//! `|--`/`` `-- `` branch markers and are stable across runs on identical
//! input.

use crate::core::model::Stats;
use crate::core::paths::{is_within_root, make_relative};
use crate::filter::globs::PathFilters;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Result of one traversal: candidate file paths in visit order plus the
/// printable tree.
#[derive(Debug)]
pub struct WalkOutcome {
    pub files: Vec<PathBuf>,
    pub tree_lines: Vec<String>,
}

struct Frame {
    path: PathBuf,
    prefix: String,
    last: bool,
    is_dir: bool,
    is_symlink: bool,
}

/// Walk `root`, producing the file list and tree while updating `stats`.
///
/// Directories failing to list (permission denied) are counted but their
/// subtree is skipped; the walk continues.
pub fn walk(
    root: &Path,
    filters: &PathFilters,
    follow_symlinks: bool,
    stats: &mut Stats,
) -> WalkOutcome {
    let mut tree_lines = vec![root.display().to_string()];
    let mut files: Vec<PathBuf> = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    expand_dir(root, root, "", filters, stats, &mut stack);

    while let Some(frame) = stack.pop() {
        let name = frame
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let joint = if frame.last { "`-- " } else { "|-- " };
        tree_lines.push(format!("{}{}{}", frame.prefix, joint, name));

        if frame.is_dir {
            if frame.is_symlink && !follow_symlinks {
                continue;
            }
            let child_prefix = format!(
                "{}{}",
                frame.prefix,
                if frame.last { "    " } else { "|   " }
            );
            expand_dir(&frame.path, root, &child_prefix, filters, stats, &mut stack);
        } else if !frame.is_symlink || follow_symlinks {
            files.push(frame.path);
        }
    }

    WalkOutcome { files, tree_lines }
}

/// List one directory and push its surviving entries in emit order.
fn expand_dir(
    dir: &Path,
    root: &Path,
    prefix: &str,
    filters: &PathFilters,
    stats: &mut Stats,
    stack: &mut Vec<Frame>,
) {
    stats.total_dirs += 1;

    let entries = match fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(err) => {
            debug!(path = %dir.display(), error = %err, "cannot list directory, skipping subtree");
            return;
        }
    };

    let mut children: Vec<(PathBuf, bool, bool)> = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        let is_dir = path.is_dir();
        let is_symlink = path.is_symlink();
        // Symlinks resolving outside the root never appear, anywhere
        if is_symlink && !is_within_root(&path, root) {
            continue;
        }
        let rel = match make_relative(&path, root) {
            Some(r) => r,
            None => continue,
        };
        if filters.is_excluded(&rel, is_dir) {
            continue;
        }
        children.push((path, is_dir, is_symlink));
    }

    // Directories first, then case-insensitive by name
    children.sort_by_key(|(path, is_dir, _)| {
        (
            !is_dir,
            path.file_name()
                .map(|n| n.to_string_lossy().to_lowercase())
                .unwrap_or_default(),
        )
    });

    // Pushed in reverse so the stack pops in sorted order, keeping each
    // subtree's lines directly below its parent entry
    let count = children.len();
    for (i, (path, is_dir, is_symlink)) in children.into_iter().enumerate().rev() {
        stack.push(Frame {
            path,
            prefix: prefix.to_string(),
            last: i == count - 1,
            is_dir,
            is_symlink,
        });
    }
}
