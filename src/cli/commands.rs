// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands: `new`, `inspect` and `export`
// and all their configurable flags.
//
// Flags left out fall back to the settings file (--config),
// and settings left out fall back to built-in defaults.
//
// Reference: Rust Book §12 (Building a CLI Program)

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::data::export::ExportConfig;
use crate::state::Strategy;

/// The top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new, empty dataset file
    New(NewArgs),

    /// Print counts and validation errors for a dataset
    Inspect(InspectArgs),

    /// Re-save a dataset and write its train/test exports
    Export(ExportArgs),
}

/// Arguments for the `new` command
#[derive(Args, Debug)]
pub struct NewArgs {
    /// Dataset name; the file becomes <dir>/<name>.json
    #[arg(long)]
    pub name: String,

    /// Target directory (default: data_dir from the settings file)
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

/// Arguments for the `inspect` command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path to a SQuAD2.0 JSON file
    pub path: PathBuf,

    /// Show questions grouped by shared answer
    #[arg(long)]
    pub grouped: bool,
}

impl InspectArgs {
    pub fn strategy(&self, configured: Strategy) -> Strategy {
        if self.grouped {
            Strategy::Grouped
        } else {
            configured
        }
    }
}

/// Arguments for the `export` command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Path to a SQuAD2.0 JSON file
    pub path: PathBuf,

    /// Share of answerable questions in the QA training split
    #[arg(long)]
    pub qa_ratio: Option<f64>,

    /// Share of questions in the classification training split
    #[arg(long)]
    pub classification_ratio: Option<f64>,
}

impl ExportArgs {
    /// Settings-file ratios with the command-line overrides applied.
    pub fn export_config(&self, base: ExportConfig) -> ExportConfig {
        ExportConfig {
            qa_train_ratio:             self.qa_ratio.unwrap_or(base.qa_train_ratio),
            classification_train_ratio: self
                .classification_ratio
                .unwrap_or(base.classification_train_ratio),
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_overrides() {
        let args = ExportArgs { path: "d.json".into(), qa_ratio: Some(0.5), classification_ratio: None };
        let cfg  = args.export_config(ExportConfig::default());
        assert_eq!(cfg.qa_train_ratio, 0.5);
        assert_eq!(cfg.classification_train_ratio, 0.9);
    }

    #[test]
    fn test_grouped_flag_wins() {
        let args = InspectArgs { path: "d.json".into(), grouped: true };
        assert_eq!(args.strategy(Strategy::Plain), Strategy::Grouped);
        let args = InspectArgs { path: "d.json".into(), grouped: false };
        assert_eq!(args.strategy(Strategy::Grouped), Strategy::Grouped);
    }
}
