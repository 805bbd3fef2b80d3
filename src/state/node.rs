// ============================================================
// Layer 5 — Tree Nodes
// ============================================================
// One node kind per schema level, plus the two kinds that only
// exist in the grouped layout (Group, GroupQuestion).
//
// The parent link is an arena index, never an owning pointer:
// the arena owns every node and a parent owns the *order* of its
// children through its `children` list.

use std::fmt;

use super::row::EditableText;

/// Index of a node in its `EditorTree` arena.
///
/// Ids are never reused within a tree, so a removed node's id
/// stays invalid instead of silently pointing at something else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How an answer relates to its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerRole {
    /// Belongs to one question; must be non-blank and in context.
    Independent,
    /// Shared by every question of a group; blank means "no answer".
    Shared,
}

/// What a node represents, plus the non-text state of that level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Root. Text is the document's file path.
    Dataset,
    /// Text is the article title.
    Article,
    /// Text is the context passage.
    Paragraph,
    /// Plain layout question. Text is the question.
    Question { id: String, is_impossible: bool },
    /// Grouped layout: one shared answer for many question variants.
    /// Has no text of its own.
    Group { answer: NodeId },
    /// Grouped layout question variant. Text is the question.
    GroupQuestion { id: String, is_impossible: bool },
    /// Text is the answer span.
    Answer(AnswerRole),
}

impl NodeKind {
    /// Every kind except `Group` can be edited.
    pub fn is_text_bearing(&self) -> bool {
        !matches!(self, NodeKind::Group { .. })
    }

    /// Short label for logs and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Dataset => "dataset",
            NodeKind::Article => "article",
            NodeKind::Paragraph => "paragraph",
            NodeKind::Question { .. } => "question",
            NodeKind::Group { .. } => "question group",
            NodeKind::GroupQuestion { .. } => "group question",
            NodeKind::Answer(_) => "answer",
        }
    }
}

/// One slot of the arena.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) parent:   Option<NodeId>,
    pub(crate) kind:     NodeKind,
    pub(crate) row:      EditableText,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub(crate) fn new(parent: Option<NodeId>, kind: NodeKind, row: EditableText) -> Self {
        Self {
            parent,
            kind,
            row,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn row(&self) -> &EditableText {
        &self.row
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}
