// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer wires the editing core to its collaborators for
// a specific goal (opening a dataset, saving it).
//
// Rules for this layer:
//   - No tree manipulation rules here (that's Layer 5)
//   - No UI or printing here (that's Layer 1)
//   - No direct file access (that's Layer 4 and 6)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// The editing session and its save pipeline
pub mod session;

// Open-existing and create-new flows
pub mod startup;
