//! Structural summarization
//!
//! Produces a compact representation of a file for summary mode. Each file
//! maps to one of a closed set of content shapes; new shapes are added by
//! extending the variant, not by open-ended extension checks scattered
//! through the code. Extraction is intentionally shallow: top-level
//! symbols for code, headings for markup, leading lines for everything
//! else.

use std::path::Path;

/// Symbol list cap in characters per category line
const SYMBOL_LINE_CAP: usize = 200;
/// Maximum heading lines extracted from markup
const MAX_HEADINGS: usize = 10;

/// How a file's content should be summarized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentShape {
    /// Source code with import/class/function structure
    StructuredCode,
    /// Heading-oriented markup such as Markdown
    LightweightMarkup,
    /// Anything else
    GenericText,
}

impl ContentShape {
    /// Classify a path by extension.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "py" | "rs" | "go" | "js" | "jsx" | "ts" | "tsx" | "java" | "rb" | "c" | "cc"
            | "cpp" | "h" | "hpp" => ContentShape::StructuredCode,
            "md" | "markdown" | "rst" => ContentShape::LightweightMarkup,
            _ => ContentShape::GenericText,
        }
    }
}

/// Summarize `text` according to the shape derived from `path`.
///
/// Structured extraction falls back to generic leading-line extraction
/// when no symbols (or headings) are found.
pub fn summarize(path: &Path, text: &str, max_lines: usize) -> String {
    match ContentShape::from_path(path) {
        ContentShape::StructuredCode => {
            summarize_code(text).unwrap_or_else(|| first_lines(text, max_lines))
        }
        ContentShape::LightweightMarkup => {
            summarize_markup(text).unwrap_or_else(|| first_lines(text, max_lines))
        }
        ContentShape::GenericText => first_lines(text, max_lines),
    }
}

fn summarize_code(text: &str) -> Option<String> {
    let mut imports: Vec<&str> = Vec::new();
    let mut classes: Vec<&str> = Vec::new();
    let mut functions: Vec<&str> = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim_start();
        // Only top-level declarations: indented lines are skipped for
        // languages where indentation implies nesting
        let top_level = trimmed.len() == line.len();

        if let Some(name) = import_name(trimmed) {
            imports.push(name);
        } else if top_level {
            if let Some(name) = declaration_name(
                trimmed,
                &["class ", "struct ", "enum ", "trait ", "interface "],
            ) {
                classes.push(name);
            } else if let Some(name) =
                declaration_name(trimmed, &["def ", "fn ", "pub fn ", "func ", "function "])
            {
                functions.push(name);
            }
        }
    }

    if imports.is_empty() && classes.is_empty() && functions.is_empty() {
        return None;
    }
    let mut lines: Vec<String> = Vec::new();
    if !imports.is_empty() {
        lines.push(format!("- imports: {}", join_capped(&imports)));
    }
    if !classes.is_empty() {
        lines.push(format!("- classes: {}", join_capped(&classes)));
    }
    if !functions.is_empty() {
        lines.push(format!("- functions: {}", join_capped(&functions)));
    }
    Some(lines.join("\n"))
}

fn import_name(line: &str) -> Option<&str> {
    for prefix in ["import ", "from ", "use ", "#include "] {
        if let Some(rest) = line.strip_prefix(prefix) {
            let name = rest
                .split([' ', ';', '(', '<', '"'])
                .next()
                .unwrap_or("")
                .trim_end_matches(':');
            if !name.is_empty() {
                return Some(name);
            }
        }
    }
    None
}

fn declaration_name<'a>(line: &'a str, keywords: &[&str]) -> Option<&'a str> {
    for keyword in keywords {
        if let Some(rest) = line.strip_prefix(keyword) {
            let name = rest
                .split(['(', ':', '{', '<', ';', ' '])
                .next()
                .unwrap_or("")
                .trim();
            if !name.is_empty() {
                return Some(name);
            }
        }
    }
    None
}

fn join_capped(names: &[&str]) -> String {
    let joined = names.join(", ");
    if joined.len() > SYMBOL_LINE_CAP {
        let mut end = SYMBOL_LINE_CAP;
        while end > 0 && !joined.is_char_boundary(end) {
            end -= 1;
        }
        joined[..end].to_string()
    } else {
        joined
    }
}

fn summarize_markup(text: &str) -> Option<String> {
    let heads: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|l| l.starts_with('#'))
        .take(MAX_HEADINGS)
        .map(|h| format!("- {}", h))
        .collect();
    if heads.is_empty() {
        None
    } else {
        Some(heads.join("\n"))
    }
}

fn first_lines(text: &str, max_lines: usize) -> String {
    text.lines()
        .take(max_lines)
        .filter(|l| !l.trim().is_empty())
        .map(|l| format!("- {}", l))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_classification() {
        assert_eq!(
            ContentShape::from_path(Path::new("a.py")),
            ContentShape::StructuredCode
        );
        assert_eq!(
            ContentShape::from_path(Path::new("README.md")),
            ContentShape::LightweightMarkup
        );
        assert_eq!(
            ContentShape::from_path(Path::new("notes.txt")),
            ContentShape::GenericText
        );
        assert_eq!(
            ContentShape::from_path(Path::new("Makefile")),
            ContentShape::GenericText
        );
    }

    #[test]
    fn test_python_symbols_extracted() {
        let text = "import os\nfrom sys import path\n\nclass A: pass\n\ndef foo():\n    return 42\n";
        let summary = summarize(Path::new("a.py"), text, 40);
        assert!(summary.contains("- imports: os, sys"));
        assert!(summary.contains("- classes: A"));
        assert!(summary.contains("- functions: foo"));
    }

    #[test]
    fn test_rust_symbols_extracted() {
        let text = "use std::io;\n\nstruct Walker;\n\nfn walk() {}\n\npub fn run() {}\n";
        let summary = summarize(Path::new("walker.rs"), text, 40);
        assert!(summary.contains("- imports: std::io"));
        assert!(summary.contains("- classes: Walker"));
        assert!(summary.contains("walk"));
        assert!(summary.contains("run"));
    }

    #[test]
    fn test_markup_headings() {
        let text = "# Title\n\nprose\n\n## Section\nmore prose\n";
        let summary = summarize(Path::new("README.md"), text, 40);
        assert_eq!(summary, "- # Title\n- ## Section");
    }

    #[test]
    fn test_markup_without_headings_falls_back() {
        let text = "just prose\n\nmore prose\n";
        let summary = summarize(Path::new("README.md"), text, 40);
        assert_eq!(summary, "- just prose\n- more prose");
    }

    #[test]
    fn test_code_without_symbols_falls_back() {
        let text = "x = 1\ny = 2\n";
        let summary = summarize(Path::new("a.py"), text, 40);
        assert_eq!(summary, "- x = 1\n- y = 2");
    }

    #[test]
    fn test_generic_skips_blank_lines_and_caps() {
        let text = "one\n\ntwo\nthree\n";
        let summary = summarize(Path::new("notes.txt"), text, 3);
        assert_eq!(summary, "- one\n- two");
    }

    #[test]
    fn test_indented_defs_not_top_level() {
        let text = "class A:\n    def method(self): pass\n\ndef top(): pass\n";
        let summary = summarize(Path::new("a.py"), text, 40);
        assert!(summary.contains("- functions: top"));
        assert!(!summary.contains("method"));
    }
}
