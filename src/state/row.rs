// ============================================================
// Layer 5 — Editable Text Row
// ============================================================
// The edit/commit/cancel unit shared by every text-bearing node.
//
// State machine:
//
//   Committed ──begin_edit──▶ Editing ──accept──▶ Committed
//                               │  ▲
//                        reject │  │ (error set, still editing)
//                               ▼  │
//                             Editing ──cancel──▶ Committed (reverted)
//
// The row itself knows nothing about validation; the tree runs
// the rule for the node kind and then calls accept() or reject().

/// Committed value, pending draft, edit flag and error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditableText {
    committed: String,
    draft:     String,
    editing:   bool,
    error:     Option<String>,
}

impl EditableText {
    /// A committed row holding `value`.
    pub fn new(value: impl Into<String>) -> Self {
        let committed = value.into();
        Self {
            draft: committed.clone(),
            committed,
            editing: false,
            error: None,
        }
    }

    /// An empty row that starts in edit mode (freshly added child).
    pub fn editing() -> Self {
        Self {
            editing: true,
            ..Self::default()
        }
    }

    /// The last committed value; this is what gets saved.
    pub fn committed(&self) -> &str {
        &self.committed
    }

    /// The value currently shown: the draft while editing,
    /// otherwise equal to the committed value.
    pub fn current(&self) -> &str {
        &self.draft
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Added but never committed or rejected. Validation leaves such a
    /// row alone until its first commit.
    pub fn is_fresh(&self) -> bool {
        self.editing && self.committed.is_empty() && self.error.is_none()
    }

    /// Enter edit mode with the draft reset to the committed value.
    /// Does nothing if already editing, so the draft is kept.
    pub fn begin_edit(&mut self) {
        if !self.editing {
            self.draft = self.committed.clone();
            self.editing = true;
        }
    }

    /// Replace the draft. Enters edit mode if needed.
    pub fn update_draft(&mut self, text: impl Into<String>) {
        self.begin_edit();
        self.draft = text.into();
    }

    /// Draft passed validation: make it the committed value.
    pub fn accept(&mut self) {
        self.committed = self.draft.clone();
        self.editing = false;
        self.error = None;
    }

    /// Draft failed validation: keep editing and show `message`.
    pub fn reject(&mut self, message: impl Into<String>) {
        self.editing = true;
        self.error = Some(message.into());
    }

    /// Throw the draft away.
    pub fn cancel(&mut self) {
        self.draft = self.committed.clone();
        self.editing = false;
        self.error = None;
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }
}
