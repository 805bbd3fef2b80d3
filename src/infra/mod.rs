// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Concrete implementations of the outside world the editing
// core talks to, plus the editor's own settings file:
//
//   storage.rs — Storage implementations
//                FileStorage writes every file through a
//                temp file in the same directory and renames
//                it into place, so a crash mid-save never
//                leaves a half-written document behind.
//                MemoryStorage keeps files in a map, for
//                dry runs and tests.
//
//   config.rs  — Editor settings
//                Data directory, default annotation layout
//                and export split ratios, stored as JSON.
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            tempfile crate documentation

/// Disk and in-memory `Storage` implementations
pub mod storage;

/// Editor settings, loaded from and saved to JSON
pub mod config;
