// ============================================================
// Layer 6 — Editor Configuration
// ============================================================
// Settings that outlive one editing session, kept as a small
// JSON file (default: ./squad2-editor.json):
//
//   {
//     "data_dir": "data",
//     "group_questions": false,
//     "export": { "qa_train_ratio": 0.8,
//                 "classification_train_ratio": 0.9 }
//   }
//
// Every field has a default, so a partial file (or no file
// at all) is fine.
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            serde documentation (#[serde(default)])

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::export::ExportConfig;
use crate::state::Strategy;

/// Default settings file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "squad2-editor.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Where new datasets are created.
    pub data_dir: PathBuf,

    /// Open datasets in the grouped layout.
    pub group_questions: bool,

    pub export: ExportConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            data_dir:        PathBuf::from("data"),
            group_questions: false,
            export:          ExportConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Read the settings at `path`, or the defaults if there is no file.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("No config at '{}', using defaults", path.display());
            return Ok(Self::default());
        }

        let json = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config from '{}'", path.display()))?;
        let cfg = serde_json::from_str(&json)
            .with_context(|| format!("Invalid config in '{}'", path.display()))?;

        tracing::debug!("Loaded config from '{}'", path.display());
        Ok(cfg)
    }

    pub fn strategy(&self) -> Strategy {
        Strategy::from_grouping(self.group_questions)
    }
}
