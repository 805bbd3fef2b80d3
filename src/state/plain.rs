// ============================================================
// Layer 5 — Plain Layout
// ============================================================
// Paragraph → Question → Answer*, one answer list per question.
//
// An impossible question keeps its annotated spans too; they are
// written to `plausible_answers` instead of `answers`.

use super::node::{AnswerRole, NodeId, NodeKind};
use super::row::EditableText;
use super::strategy::{question_counts, Annotation};
use super::tree::{ensure_question_id, EditorTree};
use crate::domain::schema::{Answer, Question};

/// A paragraph of a plain-layout tree.
#[derive(Debug, Clone, Copy)]
pub struct PlainParagraph<'a> {
    tree: &'a EditorTree,
    id:   NodeId,
}

impl<'a> PlainParagraph<'a> {
    pub(super) fn new(tree: &'a EditorTree, id: NodeId) -> Self {
        Self { tree, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Question nodes in display order.
    pub fn questions(&self) -> &'a [NodeId] {
        self.tree.kids(self.id)
    }

    /// The committed schema question for one question node.
    pub fn to_question(&self, question: NodeId) -> Option<Question> {
        let node = self.tree.node(question).ok()?;
        let NodeKind::Question { id, is_impossible } = &node.kind else {
            return None;
        };
        let context = self.tree.row(self.id).ok()?.committed();

        let spans: Vec<Answer> = node
            .children()
            .iter()
            .filter_map(|&a| self.tree.row(a).ok())
            .map(EditableText::committed)
            .filter(|text| !text.trim().is_empty())
            .map(|text| Answer::locate(context, text))
            .collect();

        let (answers, plausible_answers) = if *is_impossible {
            (Vec::new(), spans)
        } else {
            (spans, Vec::new())
        };

        Some(Question {
            id: id.clone(),
            text: node.row().committed().to_string(),
            is_impossible: *is_impossible,
            answers,
            plausible_answers,
        })
    }
}

impl Annotation for PlainParagraph<'_> {
    fn to_questions(&self) -> Vec<Question> {
        self.questions()
            .iter()
            .filter_map(|&q| self.to_question(q))
            .collect()
    }

    fn is_valid(&self) -> bool {
        // judged against the paragraph's own pending text
        let context = self.tree.row(self.id).map(EditableText::current).unwrap_or("");
        self.questions()
            .iter()
            .all(|&q| self.tree.check(q, Some(context)).unwrap_or(true))
    }

    fn summary(&self) -> String {
        question_counts(&self.to_questions())
    }
}

/// Lay out `questions` under `paragraph`, one node per question.
pub(super) fn build(tree: &mut EditorTree, paragraph: NodeId, questions: &[Question]) {
    for q in questions {
        let question = tree.alloc(
            Some(paragraph),
            NodeKind::Question {
                id:            ensure_question_id(&q.id),
                is_impossible: q.is_impossible,
            },
            EditableText::new(&q.text),
        );
        for answer in q.annotated_answers() {
            tree.alloc(
                Some(question),
                NodeKind::Answer(AnswerRole::Independent),
                EditableText::new(&answer.text),
            );
        }
    }
}
