// ============================================================
// Layer 5 — Annotation Strategy
// ============================================================
// Two ways to organise the questions of a paragraph:
//
//   Plain   — every question owns its own answers
//   Grouped — question variants that share one answer form a
//             group; the group owns that single answer
//
// The layout is chosen once for the whole tree. Both layouts
// answer the same three questions through `Annotation`, and the
// tree hands out a `ParagraphView` tagged with the layout so
// callers dispatch on the tag, not on runtime type checks.

use serde::{Deserialize, Serialize};

use super::grouped::GroupedParagraph;
use super::node::NodeId;
use super::plain::PlainParagraph;
use super::tree::EditorTree;
use crate::domain::schema::Question;

/// Paragraph layout for a whole tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Plain,
    Grouped,
}

impl Strategy {
    pub fn from_grouping(group_questions: bool) -> Self {
        if group_questions {
            Strategy::Grouped
        } else {
            Strategy::Plain
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Strategy::Plain => Strategy::Grouped,
            Strategy::Grouped => Strategy::Plain,
        }
    }
}

/// What every paragraph layout can do.
pub trait Annotation {
    /// Expand the committed state into schema questions.
    fn to_questions(&self) -> Vec<Question>;

    /// Whether every answer under the paragraph matches its context.
    fn is_valid(&self) -> bool;

    /// Question counts for display.
    fn summary(&self) -> String;
}

/// A paragraph, tagged with the layout of its tree.
#[derive(Debug, Clone, Copy)]
pub enum ParagraphView<'a> {
    Plain(PlainParagraph<'a>),
    Grouped(GroupedParagraph<'a>),
}

impl<'a> ParagraphView<'a> {
    pub(super) fn new(tree: &'a EditorTree, id: NodeId) -> Self {
        match tree.strategy() {
            Strategy::Plain => ParagraphView::Plain(PlainParagraph::new(tree, id)),
            Strategy::Grouped => ParagraphView::Grouped(GroupedParagraph::new(tree, id)),
        }
    }

    pub fn id(&self) -> NodeId {
        match self {
            ParagraphView::Plain(p) => p.id(),
            ParagraphView::Grouped(p) => p.id(),
        }
    }
}

impl Annotation for ParagraphView<'_> {
    fn to_questions(&self) -> Vec<Question> {
        match self {
            ParagraphView::Plain(p) => p.to_questions(),
            ParagraphView::Grouped(p) => p.to_questions(),
        }
    }

    fn is_valid(&self) -> bool {
        match self {
            ParagraphView::Plain(p) => p.is_valid(),
            ParagraphView::Grouped(p) => p.is_valid(),
        }
    }

    fn summary(&self) -> String {
        match self {
            ParagraphView::Plain(p) => p.summary(),
            ParagraphView::Grouped(p) => p.summary(),
        }
    }
}

/// "Questions: q, Answerable: n" for a list of materialised questions.
pub(super) fn question_counts(questions: &[Question]) -> String {
    let answerable = questions.iter().filter(|q| q.is_answerable()).count();
    format!("Questions: {}, Answerable: {}", questions.len(), answerable)
}
