//! Side manifest
//!
//! A JSON record of exactly what was selected and its content hashes, for
//! provenance and auditing. Written as a sibling of the main output, only
//! when manifest emission is enabled.

use crate::core::model::{SelectionEntry, Stats};
use crate::error::{Error, Result};
use crate::filter::masking::{active_rule_names, MaskingMode};
use crate::risk::RiskBundle;
use serde_json::{json, Value};
use std::path::Path;

/// Assemble the manifest document.
///
/// Besides the selection record, the manifest carries the masking mode and
/// the built-in rules that were active, so an audit can tell which secret
/// shapes the run was protected against.
pub fn build_manifest(
    stats: &Stats,
    entries: &[SelectionEntry],
    risk: Option<&RiskBundle>,
    masking_mode: MaskingMode,
) -> Value {
    let files: Vec<Value> = entries
        .iter()
        .map(|entry| {
            let mut item = json!({
                "path": entry.path,
                "mode": entry.mode,
                "sha256": entry.sha256,
            });
            let obj = item.as_object_mut().expect("item is an object");
            if entry.match_score > 0 {
                obj.insert("match_score".into(), json!(entry.match_score));
            }
            if !entry.snippet.is_empty() {
                obj.insert("snippet".into(), json!(entry.snippet));
            }
            item
        })
        .collect();

    let mut manifest = json!({
        "stats": stats,
        "files": files,
        "masking": {
            "mode": masking_mode,
            "rules": active_rule_names(masking_mode),
        },
    });
    if let Some(bundle) = risk {
        manifest
            .as_object_mut()
            .expect("manifest is an object")
            .insert("spicy".into(), json!(bundle));
    }
    manifest
}

/// Write a manifest document to disk, pretty-printed.
pub fn write_manifest(manifest: &Value, path: &Path) -> Result<()> {
    let text = serde_json::to_string_pretty(manifest)?;
    std::fs::write(path, text).map_err(|e| Error::io(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, score: usize) -> SelectionEntry {
        SelectionEntry {
            path: path.to_string(),
            mode: "summary".to_string(),
            lang: "markdown".to_string(),
            sha256: "abc123".to_string(),
            match_score: score,
            snippet: String::new(),
            content: json!("- body"),
        }
    }

    #[test]
    fn test_manifest_shape() {
        let stats = Stats {
            total_dirs: 1,
            total_files_in_tree: 2,
            total_omitted: 1,
            total_with_contents: 1,
            est_tokens_prompt: 9,
        };
        let manifest = build_manifest(&stats, &[entry("a.py", 0)], None, MaskingMode::Basic);
        assert_eq!(manifest["stats"]["total_dirs"], 1);
        assert_eq!(manifest["files"][0]["path"], "a.py");
        assert_eq!(manifest["files"][0]["sha256"], "abc123");
        assert!(manifest["files"][0].get("match_score").is_none());
        assert!(manifest.get("spicy").is_none());
    }

    #[test]
    fn test_manifest_records_masking_provenance() {
        let basic = build_manifest(&Stats::default(), &[], None, MaskingMode::Basic);
        assert_eq!(basic["masking"]["mode"], "basic");
        assert_eq!(basic["masking"]["rules"][0], "AWS_ACCESS_KEY_ID");

        let off = build_manifest(&Stats::default(), &[], None, MaskingMode::Off);
        assert_eq!(off["masking"]["mode"], "off");
        assert!(off["masking"]["rules"].as_array().unwrap().is_empty());

        let advanced = build_manifest(&Stats::default(), &[], None, MaskingMode::Advanced);
        let n_basic = basic["masking"]["rules"].as_array().unwrap().len();
        let n_adv = advanced["masking"]["rules"].as_array().unwrap().len();
        assert!(n_adv > n_basic);
    }

    #[test]
    fn test_manifest_includes_match_metadata_and_risk() {
        let bundle = RiskBundle {
            score: 5,
            counts: Default::default(),
            findings: Vec::new(),
        };
        let manifest = build_manifest(&Stats::default(), &[entry("a.py", 3)], Some(&bundle), MaskingMode::Basic);
        assert_eq!(manifest["files"][0]["match_score"], 3);
        assert_eq!(manifest["spicy"]["score"], 5);
    }

    #[test]
    fn test_write_manifest_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("OUT.manifest.json");
        let manifest = build_manifest(&Stats::default(), &[], None, MaskingMode::Basic);
        write_manifest(&manifest, &path).unwrap();
        let read: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(read, manifest);
    }
}
