// ============================================================
// Layer 5 — Validator
// ============================================================
// One rule, applied at different levels:
//
//   Answer (independent) — non-blank AND a literal substring of
//                          the paragraph context
//   Answer (shared)      — blank (= unanswerable group) OR a
//                          literal substring of the context
//   Question / Group     — all of its answers are valid
//   Paragraph            — all of its questions / groups are valid
//   Article / Dataset    — always valid
//
// Matching is case-sensitive: "paris" is not in "Paris is ...".
//
// Answers are matched against the *committed* context of their
// paragraph: that is the text that gets saved. Only when a
// paragraph itself is being checked does its pending draft stand
// in for the context, so a context edit that would orphan an
// answer fails on the paragraph instead.
//
// Rows that were just added and never committed are skipped by
// the bulk passes; they are checked on their first commit.

use super::node::{AnswerRole, NodeId, NodeKind};
use super::row::EditableText;
use super::tree::EditorTree;
use crate::error::Result;

pub const ANSWER_ERROR: &str = "Answer is not part of the context.";
pub const QUESTION_ERROR: &str = "Some answer of this question does not match the context";
pub const GROUP_ERROR: &str = "Answer of this group does not match the context";
pub const PARAGRAPH_ERROR: &str = "Some answers do not match this context";
const GENERIC_ERROR: &str = "Incorrect Value";

/// The answer rule, independent of any tree.
pub fn answer_matches(role: AnswerRole, text: &str, context: &str) -> bool {
    let blank = text.trim().is_empty();
    match role {
        AnswerRole::Independent => !blank && context.contains(text),
        AnswerRole::Shared => blank || context.contains(text),
    }
}

/// The fixed error message shown on a node of this kind.
pub fn message_for(kind: &NodeKind) -> &'static str {
    match kind {
        NodeKind::Answer(_) => ANSWER_ERROR,
        NodeKind::Question { .. } => QUESTION_ERROR,
        NodeKind::Group { .. } => GROUP_ERROR,
        NodeKind::Paragraph => PARAGRAPH_ERROR,
        _ => GENERIC_ERROR,
    }
}

impl EditorTree {
    /// Check a node against its rule without touching its error state.
    pub fn is_valid(&self, id: NodeId) -> Result<bool> {
        self.check(id, None)
    }

    /// `context` overrides the text answers are matched against;
    /// `None` means the owning paragraph's committed text.
    pub(super) fn check(&self, id: NodeId, context: Option<&str>) -> Result<bool> {
        let node = self.node(id)?;
        let valid = match &node.kind {
            NodeKind::Answer(role) => {
                let context = context.unwrap_or_else(|| self.context_of(id));
                answer_matches(*role, node.row.current(), context)
            }
            NodeKind::Question { .. } => node
                .children
                .iter()
                // an answer nobody has committed yet does not count against its question
                .filter(|&&answer| !self.row(answer).is_ok_and(EditableText::is_fresh))
                .all(|&answer| self.check(answer, context).unwrap_or(true)),
            NodeKind::Group { answer } => self.check(*answer, context)?,
            NodeKind::Paragraph => {
                use super::strategy::Annotation;
                self.paragraph(id)?.is_valid()
            }
            NodeKind::Dataset | NodeKind::Article | NodeKind::GroupQuestion { .. } => true,
        };
        Ok(valid)
    }

    /// Check a node and set or clear its error message accordingly.
    /// Edit mode is left alone.
    pub fn validate(&mut self, id: NodeId) -> Result<bool> {
        let valid = self.is_valid(id)?;
        let message = message_for(self.kind(id)?);
        self.node_mut(id)?
            .row
            .set_error((!valid).then(|| message.to_string()));
        Ok(valid)
    }

    /// Validate every node and return how many failed. Runs once when
    /// a tree is built, so bad data already in the file shows up
    /// without being touched, and again before each save.
    pub fn validate_all(&mut self) -> usize {
        let ids: Vec<NodeId> = self.live_ids().collect();
        let mut invalid = 0;
        for id in ids {
            if self.is_fresh(id) {
                continue;
            }
            if let Ok(false) = self.validate(id) {
                invalid += 1;
            }
        }
        invalid
    }

    /// Re-validate the paragraph that owns `around` and everything in
    /// it, except `skip`. No-op above paragraph level.
    pub(super) fn refresh_paragraph(&mut self, around: NodeId, skip: Option<NodeId>) {
        let Some(paragraph) = self.paragraph_of(around) else {
            return;
        };
        for id in self.subtree_ids(paragraph) {
            if Some(id) != skip && !self.is_fresh(id) {
                let _ = self.validate(id);
            }
        }
    }

    fn is_fresh(&self, id: NodeId) -> bool {
        self.row(id).is_ok_and(EditableText::is_fresh)
    }
}
