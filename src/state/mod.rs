// ============================================================
// Layer 5 — Editable State Tree
// ============================================================
// The in-memory, editable mirror of a Dataset. A presentation
// layer reads and mutates this tree; saving turns it back into
// an immutable Dataset snapshot.
//
//   Dataset ── Article ── Paragraph ─┬─ Question ── Answer          (plain)
//                                    └─ Group ─┬─ Answer (shared)   (grouped)
//                                              └─ GroupQuestion
//
// Nodes live in an arena owned by `EditorTree`; children are
// referenced by `NodeId` and every node knows its parent's id.
// Ownership therefore only points downwards, and walking up
// (for `save`) is an index lookup.
//
// Reference: Rust Book §15 (Smart Pointers)

/// Committed text + draft + edit flag + error, per node
pub mod row;

/// Node ids and node kinds
pub mod node;

/// The arena and all per-node operations
pub mod tree;

/// Plain vs. grouped paragraph layouts behind one trait
pub mod strategy;

/// Per-question answers
pub mod plain;

/// Answers shared across groups of question variants
pub mod grouped;

/// Answer-in-context rules and error messages
pub mod validate;

pub use node::{AnswerRole, NodeId, NodeKind};
pub use row::EditableText;
pub use strategy::{Annotation, ParagraphView, Strategy};
pub use tree::{Added, EditorTree};
