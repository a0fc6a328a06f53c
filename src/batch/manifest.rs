use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{MorphError, MorphResult};

/// Ordered image lists keyed by group name, as stored in `manifest.json`.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    groups: BTreeMap<String, Vec<String>>,
}

/// One group ready to render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupJob {
    /// Group name as requested.
    pub name: String,
    /// Source images in loop order.
    pub images: Vec<PathBuf>,
    /// Requested output path.
    pub out_path: PathBuf,
}

/// Jobs for the requested groups plus the names that had nothing to render.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchPlan {
    /// Groups with at least one listed image.
    pub jobs: Vec<GroupJob>,
    /// Requested groups that are absent or empty.
    pub missing: Vec<String>,
}

impl Manifest {
    /// Build a manifest in memory.
    pub fn from_groups(groups: impl IntoIterator<Item = (String, Vec<String>)>) -> Self {
        Self {
            groups: groups.into_iter().collect(),
        }
    }

    /// Read a manifest JSON file.
    pub fn from_path(path: &Path) -> MorphResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read manifest '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Parse manifest JSON: an object mapping group names to arrays of paths.
    pub fn from_json_str(text: &str) -> MorphResult<Self> {
        serde_json::from_str(text).map_err(|e| MorphError::serde(format!("manifest: {e}")))
    }

    /// Group names in sorted order.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Image list for `key`, trying the key as given, then lowercase, then capitalized.
    /// Empty lists count as absent.
    pub fn lookup(&self, key: &str) -> Option<&[String]> {
        key_variants(key)
            .into_iter()
            .filter_map(|k| self.groups.get(&k))
            .find(|list| !list.is_empty())
            .map(Vec::as_slice)
    }

    /// Plan the requested groups (every group when `keys` is empty).
    ///
    /// Relative image paths resolve against `root`; outputs land in `out_dir` as
    /// `<lowercase key>.mp4`.
    pub fn plan(&self, keys: &[String], root: &Path, out_dir: &Path) -> BatchPlan {
        let keys: Vec<String> = if keys.is_empty() {
            self.groups.keys().cloned().collect()
        } else {
            keys.to_vec()
        };

        let mut plan = BatchPlan::default();
        for key in keys {
            match self.lookup(&key) {
                Some(list) => plan.jobs.push(GroupJob {
                    images: list.iter().map(|p| resolve(root, p)).collect(),
                    out_path: out_dir.join(output_file_name(&key)),
                    name: key,
                }),
                None => plan.missing.push(key),
            }
        }
        plan
    }
}

/// Output file name for a group key.
pub fn output_file_name(key: &str) -> String {
    format!("{}.mp4", key.to_lowercase())
}

fn key_variants(key: &str) -> Vec<String> {
    let mut out = vec![key.to_string()];
    for v in [key.to_lowercase(), capitalize(key)] {
        if !out.contains(&v) {
            out.push(v);
        }
    }
    out
}

fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => {
            let rest = chars.as_str().to_lowercase();
            first.to_uppercase().chain(rest.chars()).collect()
        }
        None => String::new(),
    }
}

fn resolve(root: &Path, entry: &str) -> PathBuf {
    let p = Path::new(entry);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        root.join(p)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/batch/manifest.rs"]
mod tests;
