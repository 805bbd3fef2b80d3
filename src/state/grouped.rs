// ============================================================
// Layer 5 — Grouped Layout
// ============================================================
// Paragraph → Group → { shared Answer, GroupQuestion* }
//
// When a paragraph is loaded, its questions are partitioned by
// the text of their first answer. Questions without an answer
// (or with a blank one) all land in a single "no answer" group.
// Groups keep the order in which their key first appeared, and
// questions keep their order inside a group.
//
// Expanding a group gives one schema question per variant, all
// pointing at the same answer span. Each variant keeps its own
// `is_impossible` flag, so an impossible variant files the
// shared span under `plausible_answers`.
//
// Only the first answer of a question takes part in grouping;
// additional answers are not represented in this layout.

use super::node::{NodeId, NodeKind};
use super::row::EditableText;
use super::strategy::{question_counts, Annotation};
use super::tree::{ensure_question_id, EditorTree};
use crate::domain::schema::{Answer, Question};

/// A paragraph of a grouped-layout tree.
#[derive(Debug, Clone, Copy)]
pub struct GroupedParagraph<'a> {
    tree: &'a EditorTree,
    id:   NodeId,
}

impl<'a> GroupedParagraph<'a> {
    pub(super) fn new(tree: &'a EditorTree, id: NodeId) -> Self {
        Self { tree, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Group nodes in display order.
    pub fn groups(&self) -> &'a [NodeId] {
        self.tree.kids(self.id)
    }

    /// Expand one group into its committed schema questions.
    pub fn group_questions(&self, group: NodeId) -> Vec<Question> {
        let Ok(answer) = self.tree.shared_answer(group) else {
            return Vec::new();
        };
        let context = self.tree.row(self.id).map(EditableText::committed).unwrap_or("");
        let shared = self.tree.row(answer).map(EditableText::committed).unwrap_or("");
        let span = (!shared.trim().is_empty()).then(|| Answer::locate(context, shared));

        self.tree
            .kids(group)
            .iter()
            .filter_map(|&member| {
                let node = self.tree.node(member).ok()?;
                let NodeKind::GroupQuestion { id, is_impossible } = &node.kind else {
                    return None;
                };
                let spans: Vec<Answer> = span.iter().cloned().collect();
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
            })
            .collect()
    }
}

impl Annotation for GroupedParagraph<'_> {
    fn to_questions(&self) -> Vec<Question> {
        self.groups()
            .iter()
            .flat_map(|&g| self.group_questions(g))
            .collect()
    }

    fn is_valid(&self) -> bool {
        let context = self.tree.row(self.id).map(EditableText::current).unwrap_or("");
        self.groups()
            .iter()
            .all(|&g| self.tree.check(g, Some(context)).unwrap_or(true))
    }

    fn summary(&self) -> String {
        format!(
            "{}, Groups: {}",
            question_counts(&self.to_questions()),
            self.groups().len()
        )
    }
}

/// Partition `questions` by first answer text and lay the groups out
/// under `paragraph`.
pub(super) fn build(tree: &mut EditorTree, paragraph: NodeId, questions: &[Question]) {
    // partition by first answer text, keeping first-seen order;
    // questions with no usable answer share the `None` bucket
    let mut groups: Vec<(Option<&str>, Vec<&Question>)> = Vec::new();

    for q in questions {
        let key = q
            .annotated_answers()
            .first()
            .map(|a| a.text.as_str())
            .filter(|text| !text.trim().is_empty());

        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(q),
            None => groups.push((key, vec![q])),
        }
    }

    // one group per bucket; the key becomes the shared answer
    for (key, members) in groups {
        let group = tree.alloc_group(paragraph, key.unwrap_or(""));
        for q in members {
            tree.alloc(
                Some(group),
                NodeKind::GroupQuestion {
                    id:            ensure_question_id(&q.id),
                    is_impossible: q.is_impossible,
                },
                EditableText::new(&q.text),
            );
        }
    }
}
