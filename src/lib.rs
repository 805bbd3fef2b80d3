// ============================================================
// squad2-editor — crate root
// ============================================================
// Editing core for SQuAD2.0-style question-answering datasets.
//
// The crate is split into layers, outermost first:
//
//   cli          — Layer 1: command line front end (clap)
//   application  — Layer 2: editing session, open/create flows
//   domain       — Layer 3: schema types and collaborator traits
//   data         — Layer 4: load/encode, splitting, export
//   state        — Layer 5: editable tree, strategies, validation
//   infra        — Layer 6: storage and configuration
//
// A presentation layer (desktop UI, TUI, web) only needs the
// application and state layers; everything else is plumbing.

pub mod application;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod infra;
pub mod state;

pub use error::{Error, Result};
