//! Run manifests
//!
//! Every command that writes a file also drops `run-<uuid>.json` beside it,
//! recording what ran, with which parameters, and how it ended.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Failure,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: Uuid,
    /// Subcommand path, e.g. `fill negative`.
    pub command: String,
    pub version: String,
    pub finished_at: DateTime<Utc>,
    pub output: PathBuf,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    pub status: RunStatus,
    pub duration_ms: u64,
}

impl RunManifest {
    pub fn new(command: &str, output: &Path, params: &[(&str, &str)]) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            command: command.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            finished_at: Utc::now(),
            output: output.to_path_buf(),
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            status: RunStatus::Success,
            duration_ms: 0,
        }
    }

    /// Where the manifest goes: the output's directory.
    pub fn path(&self) -> PathBuf {
        let dir = match self.output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        dir.join(format!("run-{}.json", self.run_id))
    }

    pub fn write(&self) -> Result<PathBuf> {
        let path = self.path();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }
}

pub fn read_manifest(path: &Path) -> Result<RunManifest> {
    let json =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("parsing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_lands_next_to_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("matched.csv");
        let mut manifest = RunManifest::new("match", &output, &[("window_days", "6")]);
        manifest.status = RunStatus::Failure;
        manifest.duration_ms = 12;
        let path = manifest.write().unwrap();
        assert_eq!(path.parent(), Some(dir.path()));

        let back = read_manifest(&path).unwrap();
        assert_eq!(back.run_id, manifest.run_id);
        assert_eq!(back.command, "match");
        assert_eq!(back.status, RunStatus::Failure);
        assert_eq!(back.duration_ms, 12);
        assert_eq!(back.params["window_days"], "6");
        assert_eq!(back.output, output);
    }

    #[test]
    fn bare_file_name_goes_to_current_dir() {
        let manifest = RunManifest::new("learn study", Path::new("study.csv"), &[]);
        assert_eq!(manifest.path().parent(), Some(Path::new(".")));
    }

    #[test]
    fn status_is_lowercase_in_json() {
        let json = serde_json::to_string(&RunStatus::Success).unwrap();
        assert_eq!(json, "\"success\"");
    }
}
