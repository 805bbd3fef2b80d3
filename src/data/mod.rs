// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between bytes on disk and the schema types, and
// from the schema types to the derived training files:
//
//   .json bytes
//       │
//       ▼
//   loader      → decode / encode / open / create a Dataset
//       │
//       ▼
//   (editing happens in Layer 5)
//       │
//       ▼
//   export      → canonical JSON + QA JSON-Lines + label CSV
//       │
//       ▼
//   splitter    → seeded shuffle, contiguous train/test split
//
// Reference: SQuAD2.0 format, Hugging Face `datasets` QA layout

/// Decodes and encodes dataset documents, opens and creates files
pub mod loader;

/// Writes the canonical document and its train/test exports
pub mod export;

/// Shuffles and splits records into train/test sets
pub mod splitter;
