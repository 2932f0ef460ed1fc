//! Collecting `uses:` values from a repository's workflow files.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{PolicyError, Result};

/// One `uses:` occurrence: where it was found and what it says.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UsesEntry {
    /// Best-effort YAML path, e.g. `jobs.build.steps[2].uses`.
    pub yaml_path: String,
    /// The raw `uses:` value.
    pub value: String,
}

/// Workflow and composite-action YAML files under a repository's `.github`
/// directory: direct children of any `workflows` directory, and anything
/// below an `actions` directory. Sorted for stable scan order.
pub fn workflow_files(github_dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(github_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("yml") | Some("yaml")
            )
        })
        .filter(|path| {
            let in_workflows = path
                .parent()
                .and_then(|p| p.file_name())
                .is_some_and(|n| n == "workflows");
            let under_actions = path
                .strip_prefix(github_dir)
                .ok()
                .map(|rel| rel.components().any(|c| c.as_os_str() == "actions"))
                .unwrap_or(false);
            in_workflows || under_actions
        })
        .collect();
    files.sort();
    files
}

/// Parse a workflow file and collect every `uses:` value at any depth.
pub fn collect_uses(path: &Path) -> Result<Vec<UsesEntry>> {
    let text = std::fs::read_to_string(path)?;
    let value: serde_yaml::Value =
        serde_yaml::from_str(&text).map_err(|source| PolicyError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;

    let mut uses = Vec::new();
    walk_node(&value, "", &mut uses);
    Ok(uses)
}

/// Walk the whole YAML structure and record every value whose mapping key is
/// exactly `uses`.
fn walk_node(node: &serde_yaml::Value, yaml_path: &str, out: &mut Vec<UsesEntry>) {
    match node {
        serde_yaml::Value::Mapping(map) => {
            for (key, value) in map {
                let key_text = match key {
                    serde_yaml::Value::String(s) => s.clone(),
                    other => format!("{other:?}"),
                };
                let next_path = if yaml_path.is_empty() {
                    key_text.clone()
                } else {
                    format!("{yaml_path}.{key_text}")
                };
                if key_text == "uses" {
                    if let serde_yaml::Value::String(text) = value {
                        out.push(UsesEntry {
                            yaml_path: next_path.clone(),
                            value: text.clone(),
                        });
                    }
                }
                walk_node(value, &next_path, out);
            }
        }
        serde_yaml::Value::Sequence(items) => {
            for (index, item) in items.iter().enumerate() {
                walk_node(item, &format!("{yaml_path}[{index}]"), out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn collects_nested_uses_with_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ci.yml");
        fs::write(
            &path,
            "\
jobs:
  build:
    steps:
      - uses: actions/checkout@abc1234
      - run: make
      - uses: octo/action@def5678
  reusable:
    uses: octo/workflows/.github/workflows/ci.yml@fff0000
",
        )
        .unwrap();

        let uses = collect_uses(&path).unwrap();
        assert_eq!(
            uses,
            vec![
                UsesEntry {
                    yaml_path: "jobs.build.steps[0].uses".into(),
                    value: "actions/checkout@abc1234".into(),
                },
                UsesEntry {
                    yaml_path: "jobs.build.steps[2].uses".into(),
                    value: "octo/action@def5678".into(),
                },
                UsesEntry {
                    yaml_path: "jobs.reusable.uses".into(),
                    value: "octo/workflows/.github/workflows/ci.yml@fff0000".into(),
                },
            ]
        );
    }

    #[test]
    fn non_string_uses_values_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("odd.yml");
        fs::write(&path, "uses:\n  nested: true\n").unwrap();
        assert!(collect_uses(&path).unwrap().is_empty());
    }

    #[test]
    fn finds_workflow_and_action_files_only() {
        let dir = tempfile::tempdir().unwrap();
        let github = dir.path().join(".github");
        fs::create_dir_all(github.join("workflows")).unwrap();
        fs::create_dir_all(github.join("actions/my-action")).unwrap();
        fs::write(github.join("workflows/ci.yml"), "{}").unwrap();
        fs::write(github.join("workflows/release.yaml"), "{}").unwrap();
        fs::write(github.join("workflows/README.md"), "").unwrap();
        fs::write(github.join("actions/my-action/action.yml"), "{}").unwrap();
        fs::write(github.join("dependabot.yml"), "{}").unwrap();

        let files = workflow_files(&github);
        let names: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(&github).unwrap().display().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "actions/my-action/action.yml",
                "workflows/ci.yml",
                "workflows/release.yaml",
            ]
        );
    }
}
