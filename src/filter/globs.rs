//! Include/exclude/omit pattern matching
//!
//! Patterns are taken literally, gitignore-style: a bare `name` matches only
//! root-level entries, `**/name` matches at any depth, and `dir/**` matches
//! everything under `dir`. No automatic recursive expansion is performed.
//!
//! Three independent sets exist per run: *include* (when non-empty, only
//! matching files are eligible for content), *exclude* (matching entries are
//! pruned from traversal entirely) and *omit* (matching files appear in the
//! tree but never get content). Rules from `.gitignore` files, when enabled,
//! merge into the exclude predicate scoped to the directory holding each
//! file.

use crate::core::paths::make_relative;
use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::gitignore::Gitignore;
use std::path::Path;
use tracing::warn;
use walkdir::WalkDir;

/// A compiled glob pattern set over root-relative paths.
#[derive(Debug)]
pub struct PatternSet {
    set: GlobSet,
    has_patterns: bool,
}

impl PatternSet {
    /// Compile a list of gitignore-syntax patterns.
    ///
    /// Duplicate and empty patterns are dropped. A set containing a
    /// malformed pattern degrades to "matches nothing" with a logged
    /// warning rather than failing the run.
    pub fn compile(patterns: &[String]) -> Self {
        let mut normalized: Vec<String> = Vec::new();
        for raw in patterns {
            let p = raw.replace('\\', "/");
            if p.is_empty() || normalized.contains(&p) {
                continue;
            }
            normalized.push(p);
        }
        if normalized.is_empty() {
            return Self {
                set: GlobSet::empty(),
                has_patterns: false,
            };
        }

        let mut builder = GlobSetBuilder::new();
        for pattern in &normalized {
            match compile_glob(pattern) {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(err) => {
                    warn!(pattern = %pattern, error = %err, "malformed glob pattern, disabling set");
                    return Self {
                        set: GlobSet::empty(),
                        has_patterns: true,
                    };
                }
            }
        }
        let set = builder.build().unwrap_or_else(|err| {
            warn!(error = %err, "failed to build glob set, disabling set");
            GlobSet::empty()
        });
        Self {
            set,
            has_patterns: true,
        }
    }

    /// Whether the set was built from zero patterns
    pub fn is_empty(&self) -> bool {
        !self.has_patterns
    }

    /// Match a root-relative, '/'-separated path against the set.
    pub fn matches(&self, rel_path: &str) -> bool {
        if rel_path.is_empty() {
            return false;
        }
        self.set.is_match(rel_path)
    }
}

fn compile_glob(pattern: &str) -> Result<Glob, globset::Error> {
    // literal_separator keeps `*` from crossing '/' so bare names stay
    // root-level, matching gitwildmatch semantics for anchored patterns
    GlobBuilder::new(pattern.trim_start_matches('/'))
        .literal_separator(true)
        .build()
}

/// One `.gitignore`'s rules, applying only below the directory that holds
/// the file.
struct ScopedGitignore {
    /// Directory of the `.gitignore`, relative to root; "" at the root
    prefix: String,
    matcher: Gitignore,
}

/// Every `.gitignore` found under the root, each scoped to its own
/// directory. Scopes are consulted deepest-first so nested rules take
/// precedence the way git resolves them.
pub struct GitignoreChain {
    scopes: Vec<ScopedGitignore>,
}

impl GitignoreChain {
    /// Match a root-relative, '/'-separated path against the chain.
    ///
    /// A scope only sees paths under its own directory, rewritten relative
    /// to that directory. A whitelist rule (`!pattern`) in a deeper scope
    /// stops the chain.
    pub fn is_ignored(&self, rel_path: &str, is_dir: bool) -> bool {
        for scope in &self.scopes {
            let sub = if scope.prefix.is_empty() {
                rel_path
            } else {
                match rel_path
                    .strip_prefix(scope.prefix.as_str())
                    .and_then(|rest| rest.strip_prefix('/'))
                {
                    Some(rest) if !rest.is_empty() => rest,
                    _ => continue,
                }
            };
            let matched = scope.matcher.matched(sub, is_dir);
            if matched.is_ignore() {
                return true;
            }
            if matched.is_whitelist() {
                return false;
            }
        }
        false
    }
}

/// Collect every `.gitignore` under `root`, one matcher per file.
///
/// Each matcher is rooted at the directory containing its `.gitignore`, so
/// subdirectory rules never reach entries outside that subtree. Unreadable
/// files are skipped with a diagnostic. Returns `None` when no usable
/// rules exist.
pub fn build_gitignore(root: &Path) -> Option<GitignoreChain> {
    let mut scopes: Vec<ScopedGitignore> = Vec::new();
    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !(entry.file_type().is_file() && entry.file_name() == ".gitignore") {
            continue;
        }
        // Gitignore::new roots the matcher at the file's parent directory
        let (matcher, err) = Gitignore::new(entry.path());
        if let Some(err) = err {
            warn!(path = %entry.path().display(), error = %err, "problem reading .gitignore");
        }
        if matcher.is_empty() {
            continue;
        }
        let prefix = entry
            .path()
            .parent()
            .and_then(|dir| make_relative(dir, root))
            .unwrap_or_default();
        scopes.push(ScopedGitignore { prefix, matcher });
    }
    if scopes.is_empty() {
        return None;
    }
    scopes.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
    Some(GitignoreChain { scopes })
}

/// Combined traversal and content-eligibility predicates for one run.
pub struct PathFilters {
    include: PatternSet,
    exclude: PatternSet,
    omit: PatternSet,
    gitignore: Option<GitignoreChain>,
}

impl PathFilters {
    pub fn new(
        include: &[String],
        exclude: &[String],
        omit: &[String],
        gitignore: Option<GitignoreChain>,
    ) -> Self {
        Self {
            include: PatternSet::compile(include),
            exclude: PatternSet::compile(exclude),
            omit: PatternSet::compile(omit),
            gitignore,
        }
    }

    /// Entries matching this are pruned from traversal before recursion.
    pub fn is_excluded(&self, rel_path: &str, is_dir: bool) -> bool {
        if rel_path.is_empty() {
            return false;
        }
        if let Some(gi) = &self.gitignore {
            if gi.is_ignored(rel_path, is_dir) {
                return true;
            }
        }
        self.exclude.matches(rel_path)
    }

    /// Omitted files stay in the tree but never get content.
    pub fn is_omitted(&self, rel_path: &str) -> bool {
        self.omit.matches(rel_path)
    }

    /// With a non-empty include set, only matching files are eligible.
    pub fn is_included(&self, rel_path: &str) -> bool {
        if self.include.is_empty() {
            return true;
        }
        self.include.matches(rel_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(patterns: &[&str]) -> PatternSet {
        PatternSet::compile(&patterns.iter().map(|s| s.to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn test_bare_name_matches_root_level_only() {
        let s = set(&["main.py"]);
        assert!(s.matches("main.py"));
        assert!(!s.matches("src/main.py"));
    }

    #[test]
    fn test_recursive_prefix_matches_any_depth() {
        let s = set(&["**/node_modules"]);
        assert!(s.matches("node_modules"));
        assert!(s.matches("web/node_modules"));
        assert!(s.matches("a/b/c/node_modules"));
    }

    #[test]
    fn test_dir_slash_doublestar_matches_subtree() {
        let s = set(&["vendor/**"]);
        assert!(s.matches("vendor/lib.rs"));
        assert!(s.matches("vendor/a/b/c.txt"));
        assert!(!s.matches("vendor"));
        assert!(!s.matches("src/vendor/x"));
    }

    #[test]
    fn test_include_scenario_src_python() {
        let s = set(&["src/**/*.py"]);
        assert!(s.matches("src/a.py"));
        assert!(s.matches("src/utils/b.py"));
        assert!(!s.matches("main.py"));
    }

    #[test]
    fn test_star_does_not_cross_separator() {
        let s = set(&["*.pyc"]);
        assert!(s.matches("cached.pyc"));
        assert!(!s.matches("pkg/cached.pyc"));
    }

    #[test]
    fn test_malformed_pattern_disables_set() {
        let s = set(&["src/**/*.py", "bad[pattern"]);
        assert!(!s.matches("src/a.py"));
        assert!(!s.is_empty());
    }

    #[test]
    fn test_empty_set_matches_nothing() {
        let s = set(&[]);
        assert!(s.is_empty());
        assert!(!s.matches("anything"));
    }

    #[test]
    fn test_empty_include_means_everything_eligible() {
        let filters = PathFilters::new(&[], &[], &[], None);
        assert!(filters.is_included("any/path.rs"));
    }

    #[test]
    fn test_gitignore_scoped_to_subdirectory() {
        let temp = tempfile::tempdir().unwrap();
        let sub = temp.path().join("sub");
        std::fs::create_dir(&sub).unwrap();
        std::fs::write(sub.join(".gitignore"), "*.log\n").unwrap();
        std::fs::write(temp.path().join(".gitignore"), "top.txt\n").unwrap();

        let chain = build_gitignore(temp.path()).unwrap();
        assert!(chain.is_ignored("sub/debug.log", false));
        assert!(!chain.is_ignored("debug.log", false));
        assert!(chain.is_ignored("top.txt", false));
    }

    #[test]
    fn test_gitignore_root_rules_reach_subdirectories() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::create_dir(temp.path().join("sub")).unwrap();
        std::fs::write(temp.path().join(".gitignore"), "*.log\n").unwrap();

        let chain = build_gitignore(temp.path()).unwrap();
        assert!(chain.is_ignored("debug.log", false));
        assert!(chain.is_ignored("sub/debug.log", false));
        assert!(!chain.is_ignored("sub/app.rs", false));
    }

    #[test]
    fn test_gitignore_nested_whitelist_overrides_parent() {
        let temp = tempfile::tempdir().unwrap();
        let sub = temp.path().join("sub");
        std::fs::create_dir(&sub).unwrap();
        std::fs::write(temp.path().join(".gitignore"), "*.log\n").unwrap();
        std::fs::write(sub.join(".gitignore"), "!keep.log\n").unwrap();

        let chain = build_gitignore(temp.path()).unwrap();
        assert!(!chain.is_ignored("sub/keep.log", false));
        assert!(chain.is_ignored("sub/other.log", false));
    }
}
