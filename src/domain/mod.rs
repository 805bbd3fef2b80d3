// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs and traits that define what a SQuAD2.0
// dataset IS, independent of how it is edited or stored.
//
// Rules for this layer:
//   - NO file I/O
//   - NO editing state (that lives in Layer 5, `state`)
//   - Only serde-derived records and collaborator traits
//
// Reference: SQuAD2.0 format (Rajpurkar et al., 2018)

// The serialisable document: Dataset → Article → Paragraph → Question → Answer
pub mod schema;

// Collaborators the core consumes (storage, file picker, prompts)
pub mod traits;
