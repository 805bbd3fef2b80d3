// ============================================================
// Layer 3 — Collaborator Traits
// ============================================================
// The editing core never touches a window, a file dialog or
// the disk directly. It talks to the outside world through
// these traits, which a presentation layer (or a test) supplies:
//
//   - Storage    → read/write bytes at a path
//   - FilePicker → "open file" dialog
//   - Prompter   → message boxes and text-input dialogs
//
// Reference: Rust Book §10 (Traits), §17 (Trait Objects)

use std::path::{Path, PathBuf};

use crate::error::Result;

// ─── Storage ──────────────────────────────────────────────────────────────────
/// Byte-level persistence for datasets and their exports.
///
/// Implementations:
///   - FileStorage   → local disk, atomic per-file writes
///   - MemoryStorage → in-process map, for previews and tests
///
/// `Send + Sync` so a save can run on a worker thread.
pub trait Storage: Send + Sync {
    /// Read the whole file at `path`.
    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Replace the file at `path` with `bytes`.
    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()>;

    /// Make sure `dir` exists, creating parents as needed.
    fn ensure_dir(&self, dir: &Path) -> Result<()>;
}

// ─── FilePicker ───────────────────────────────────────────────────────────────
/// An "open file" dialog. `None` means the user dismissed it.
pub trait FilePicker {
    fn pick_file(&self) -> Option<PathBuf>;
}

// ─── Alert ────────────────────────────────────────────────────────────────────
/// A modal prompt the core asks the presentation layer to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    /// Informational message with a single dismiss action.
    Message { title: String, message: String },

    /// Single-line text input; the entered value goes back to the core.
    TextInput { title: String, hint: String },
}

impl Alert {
    pub fn message(title: impl Into<String>, message: impl Into<String>) -> Self {
        Alert::Message {
            title:   title.into(),
            message: message.into(),
        }
    }

    pub fn text_input(title: impl Into<String>, hint: impl Into<String>) -> Self {
        Alert::TextInput {
            title: title.into(),
            hint:  hint.into(),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Alert::Message { title, .. } | Alert::TextInput { title, .. } => title,
        }
    }
}

// ─── Prompter ─────────────────────────────────────────────────────────────────
/// Shows alerts and collects text input.
pub trait Prompter {
    /// Show an informational alert and wait for it to be dismissed.
    fn show(&self, alert: &Alert);

    /// Show a text-input alert. `None` means the user cancelled.
    fn text_input(&self, alert: &Alert) -> Option<String>;
}
