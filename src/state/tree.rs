// ============================================================
// Layer 5 — EditorTree
// ============================================================
// The arena that owns every node of an editable dataset and
// exposes the per-node operations a presentation layer calls:
//
//   begin_edit / update_draft / commit / cancel   — text editing
//   add_child / remove_child                      — structure
//   set_impossible                                — question flag
//   summary / note / errors                       — read-only views
//   root_of + to_dataset                          — the save cascade
//
// Every mutation bumps `revision`, so a UI can poll for changes
// instead of depending on a particular reactivity framework.
//
// Reference: Rust Book §8 (Vectors), §15 (Ownership of trees)

use std::path::PathBuf;

use uuid::Uuid;

use super::grouped;
use super::node::{AnswerRole, Node, NodeId, NodeKind};
use super::plain;
use super::row::EditableText;
use super::strategy::{Annotation, ParagraphView, Strategy};
use super::validate;
use crate::domain::schema::{Article, Dataset, Paragraph, DEFAULT_VERSION};
use crate::error::{Error, Result};

/// Result of `add_child`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Added {
    /// The new child.
    pub node: NodeId,
    /// Its position in the parent's list; a UI scrolls here.
    pub index: usize,
    /// The node that was put in edit mode. Same as `node` except for
    /// a new question group, where it is the group's first question.
    pub editing: NodeId,
}

/// Editable, arena-backed mirror of a `Dataset`.
#[derive(Debug, Clone)]
pub struct EditorTree {
    nodes:          Vec<Option<Node>>,
    root:           NodeId,
    strategy:       Strategy,
    schema_version: String,
    revision:       u64,
}

impl EditorTree {
    /// An empty tree with no file path.
    pub fn new(strategy: Strategy) -> Self {
        Self::from_dataset(&Dataset::default(), strategy)
    }

    /// Build the tree for `dataset`, laying paragraphs out with
    /// `strategy`, then validate everything once.
    pub fn from_dataset(dataset: &Dataset, strategy: Strategy) -> Self {
        let mut tree = Self {
            nodes:          Vec::new(),
            root:           NodeId(0),
            strategy,
            schema_version: dataset.version.clone(),
            revision:       0,
        };

        // the root row carries the file path as its text
        let root = tree.alloc(
            None,
            NodeKind::Dataset,
            EditableText::new(dataset.source_path.to_string_lossy()),
        );
        tree.root = root;

        for article in &dataset.articles {
            let a = tree.alloc(Some(root), NodeKind::Article, EditableText::new(&article.title));
            for paragraph in &article.paragraphs {
                let p = tree.alloc(
                    Some(a),
                    NodeKind::Paragraph,
                    EditableText::new(&paragraph.context),
                );
                // below the paragraph the layout decides the shape
                match strategy {
                    Strategy::Plain => plain::build(&mut tree, p, &paragraph.qas),
                    Strategy::Grouped => grouped::build(&mut tree, p, &paragraph.qas),
                }
            }
        }

        // flag bad spans already in the file before anyone edits them
        let invalid = tree.validate_all();
        if invalid > 0 {
            tracing::warn!("{} node(s) failed validation on load", invalid);
        }
        tracing::debug!(
            "Built {:?} tree with {} nodes from '{}'",
            strategy,
            tree.live_ids().count(),
            dataset.source_path.display()
        );
        tree
    }

    /// Rebuild from this tree's committed snapshot with another layout.
    /// Drafts that were never committed are not carried over.
    pub fn with_strategy(&self, strategy: Strategy) -> Self {
        Self::from_dataset(&self.to_dataset(), strategy)
    }

    // ─── Read access ─────────────────────────────────────────────────────────

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn schema_version(&self) -> &str {
        &self.schema_version
    }

    /// Bumped on every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The committed file path stored on the root.
    pub fn source_path(&self) -> PathBuf {
        PathBuf::from(self.row_of(self.root).map(|r| r.committed()).unwrap_or(""))
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(Error::UnknownNode(id))
    }

    pub(super) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(Error::UnknownNode(id))
    }

    pub fn kind(&self, id: NodeId) -> Result<&NodeKind> {
        Ok(&self.node(id)?.kind)
    }

    pub fn row(&self, id: NodeId) -> Result<&EditableText> {
        Ok(&self.node(id)?.row)
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId]> {
        Ok(&self.node(id)?.children)
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    /// The shared answer of a question group.
    pub fn shared_answer(&self, group: NodeId) -> Result<NodeId> {
        match self.kind(group)? {
            NodeKind::Group { answer } => Ok(*answer),
            other => Err(Error::invalid_operation(format!(
                "{group} is a {}, not a question group",
                other.label()
            ))),
        }
    }

    /// A paragraph seen through its annotation strategy.
    pub fn paragraph(&self, id: NodeId) -> Result<ParagraphView<'_>> {
        match self.kind(id)? {
            NodeKind::Paragraph => Ok(ParagraphView::new(self, id)),
            other => Err(Error::invalid_operation(format!(
                "{id} is a {}, not a paragraph",
                other.label()
            ))),
        }
    }

    /// Walk parent links up to the root. This is the path `save`
    /// takes from any node.
    pub fn root_of(&self, id: NodeId) -> Result<NodeId> {
        let mut current = id;
        while let Some(parent) = self.node(current)?.parent {
            current = parent;
        }
        Ok(current)
    }

    /// The nearest paragraph at or above `id`.
    pub fn paragraph_of(&self, id: NodeId) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(cur) = current {
            let node = self.node(cur).ok()?;
            if node.kind == NodeKind::Paragraph {
                return Some(cur);
            }
            current = node.parent;
        }
        None
    }

    /// The committed context text answers under `id` are checked against.
    pub fn context_of(&self, id: NodeId) -> &str {
        self.paragraph_of(id)
            .and_then(|p| self.row_of(p))
            .map(|r| r.committed())
            .unwrap_or("")
    }

    /// Every node currently showing a validation error.
    pub fn errors(&self) -> Vec<(NodeId, String)> {
        self.live_ids()
            .filter_map(|id| {
                let error = self.row_of(id)?.error()?;
                Some((id, error.to_string()))
            })
            .collect()
    }

    // ─── Editing ─────────────────────────────────────────────────────────────

    pub fn begin_edit(&mut self, id: NodeId) -> Result<()> {
        self.editable_row_mut(id)?.begin_edit();
        self.touch();
        Ok(())
    }

    pub fn update_draft(&mut self, id: NodeId, text: impl Into<String>) -> Result<()> {
        self.editable_row_mut(id)?.update_draft(text);
        self.touch();
        Ok(())
    }

    /// Validate the draft and commit it if it passes.
    ///
    /// Returns `Ok(false)` on a validation failure: the node keeps its
    /// draft, stays in edit mode and carries the level's message.
    pub fn commit(&mut self, id: NodeId) -> Result<bool> {
        // fail early on groups and dead ids, before anything is checked
        self.editable_row_mut(id)?;
        let valid = self.is_valid(id)?;
        let message = validate::message_for(self.kind(id)?);

        let row = self.editable_row_mut(id)?;
        if valid {
            row.accept();
        } else {
            row.reject(message);
            tracing::debug!("Commit of {} rejected: {}", id, message);
        }

        // the node's own error is settled above; the rest of the
        // paragraph may have changed with it (a new context, a fixed answer)
        self.refresh_paragraph(id, Some(id));
        self.touch();
        Ok(valid)
    }

    /// Drop the draft and any error on this node.
    pub fn cancel(&mut self, id: NodeId) -> Result<()> {
        self.editable_row_mut(id)?.cancel();
        self.refresh_paragraph(id, Some(id));
        self.touch();
        Ok(())
    }

    /// Commit every node still in edit mode. Returns the ones whose
    /// commit failed; they keep their error message.
    pub fn commit_pending(&mut self) -> Vec<NodeId> {
        // Arena order is creation order, so a paragraph is committed
        // before answers added under it, and those answers are then
        // matched against whatever context that commit left behind.
        let editing: Vec<NodeId> = self
            .live_ids()
            .filter(|&id| self.row_of(id).is_some_and(EditableText::is_editing))
            .collect();

        editing
            .into_iter()
            .filter(|&id| !matches!(self.commit(id), Ok(true)))
            .collect()
    }

    pub fn is_impossible(&self, id: NodeId) -> Result<bool> {
        match self.kind(id)? {
            NodeKind::Question { is_impossible, .. }
            | NodeKind::GroupQuestion { is_impossible, .. } => Ok(*is_impossible),
            NodeKind::Group { .. } => match self.children(id)?.first() {
                Some(&first) => self.is_impossible(first),
                None => Ok(false),
            },
            other => Err(Error::invalid_operation(format!(
                "a {} has no impossibility flag",
                other.label()
            ))),
        }
    }

    /// Mark a question (or every question of a group) impossible.
    pub fn set_impossible(&mut self, id: NodeId, value: bool) -> Result<()> {
        if let NodeKind::Group { .. } = self.kind(id)? {
            for member in self.children(id)?.to_vec() {
                self.set_impossible(member, value)?;
            }
            return Ok(());
        }

        match &mut self.node_mut(id)?.kind {
            NodeKind::Question { is_impossible, .. }
            | NodeKind::GroupQuestion { is_impossible, .. } => *is_impossible = value,
            other => {
                return Err(Error::invalid_operation(format!(
                    "a {} has no impossibility flag",
                    other.label()
                )))
            }
        }
        self.touch();
        Ok(())
    }

    // ─── Structure ───────────────────────────────────────────────────────────

    /// Append a new, empty child in edit mode.
    ///
    /// Siblings still being edited are committed first (best effort;
    /// a failing sibling keeps its error and stays in edit mode).
    pub fn add_child(&mut self, parent: NodeId) -> Result<Added> {
        let kind = self.kind(parent)?.clone();

        // only one sibling is edited at a time: settle the others first
        for sibling in self.children(parent)?.to_vec() {
            if self.row_of(sibling).is_some_and(EditableText::is_editing)
                && self.kind(sibling)?.is_text_bearing()
            {
                self.commit(sibling)?;
            }
        }

        let (node, editing) = match kind {
            NodeKind::Dataset => self.alloc_editing(parent, NodeKind::Article),
            NodeKind::Article => self.alloc_editing(parent, NodeKind::Paragraph),
            NodeKind::Paragraph => match self.strategy {
                Strategy::Plain => self.alloc_editing(
                    parent,
                    NodeKind::Question { id: new_question_id(), is_impossible: false },
                ),
                Strategy::Grouped => {
                    let group = self.alloc_group(parent, "");
                    let (first, _) = self.alloc_editing(
                        group,
                        NodeKind::GroupQuestion { id: new_question_id(), is_impossible: false },
                    );
                    (group, first)
                }
            },
            NodeKind::Question { .. } => {
                self.alloc_editing(parent, NodeKind::Answer(AnswerRole::Independent))
            }
            NodeKind::Group { .. } => self.alloc_editing(
                parent,
                NodeKind::GroupQuestion { id: new_question_id(), is_impossible: false },
            ),
            NodeKind::GroupQuestion { .. } | NodeKind::Answer(_) => {
                return Err(Error::invalid_operation(format!(
                    "a {} cannot have children",
                    kind.label()
                )))
            }
        };

        let index = self.children(parent)?.len().saturating_sub(1);
        self.touch();
        Ok(Added { node, index, editing })
    }

    /// Detach `child` from `parent` and drop its whole subtree.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let position = self
            .children(parent)?
            .iter()
            .position(|&c| c == child)
            .ok_or_else(|| {
                Error::invalid_operation(format!("{child} is not a child of {parent}"))
            })?;

        self.node_mut(parent)?.children.remove(position);
        self.free_subtree(child);
        self.refresh_paragraph(parent, None);
        self.touch();
        Ok(())
    }

    // ─── Views ───────────────────────────────────────────────────────────────

    /// Counts for the node, computed from committed data on every call.
    pub fn summary(&self, id: NodeId) -> Result<String> {
        let node = self.node(id)?;
        let summary = match &node.kind {
            NodeKind::Dataset => {
                let ds = self.to_dataset();
                format!(
                    "Articles: {}, Paragraphs: {}, Questions: {}, Answerable: {}",
                    ds.articles.len(),
                    ds.paragraph_count(),
                    ds.question_count(),
                    ds.answerable_count()
                )
            }
            NodeKind::Article => {
                let article = self.article_snapshot(id)?;
                let questions: usize = article.paragraphs.iter().map(|p| p.qas.len()).sum();
                let answerable: usize = article
                    .paragraphs
                    .iter()
                    .flat_map(|p| &p.qas)
                    .filter(|q| q.is_answerable())
                    .count();
                format!(
                    "Paragraphs: {}, Questions: {}, Answerable: {}",
                    article.paragraphs.len(),
                    questions,
                    answerable
                )
            }
            NodeKind::Paragraph => self.paragraph(id)?.summary(),
            NodeKind::Question { .. } => format!("Answers: {}", node.children.len()),
            NodeKind::Group { answer } => {
                let text = self.row(*answer)?.committed();
                let answer = if text.trim().is_empty() { "none" } else { text };
                format!("Questions: {}, Answer: {}", node.children.len(), answer)
            }
            NodeKind::GroupQuestion { .. } | NodeKind::Answer(_) => {
                node.row.committed().to_string()
            }
        };
        Ok(summary)
    }

    /// Short badge text shown next to a row, if any.
    pub fn note(&self, id: NodeId) -> Result<Option<String>> {
        let node = self.node(id)?;
        let note = match &node.kind {
            NodeKind::Question { .. } if node.children.is_empty() => Some("No Answer".to_string()),
            NodeKind::Group { answer } => {
                let count = node.children.len();
                if self.row(*answer)?.committed().trim().is_empty() {
                    Some(format!("{count} with No Answer"))
                } else {
                    Some(count.to_string())
                }
            }
            _ => None,
        };
        Ok(note)
    }

    // ─── Snapshot ────────────────────────────────────────────────────────────

    /// Materialise the committed state as an immutable `Dataset`.
    pub fn to_dataset(&self) -> Dataset {
        let version = if self.schema_version.is_empty() {
            DEFAULT_VERSION.to_string()
        } else {
            self.schema_version.clone()
        };
        Dataset {
            articles: self
                .kids(self.root)
                .iter()
                .filter_map(|&a| self.article_snapshot(a).ok())
                .collect(),
            version,
            source_path: self.source_path(),
        }
    }

    fn article_snapshot(&self, id: NodeId) -> Result<Article> {
        Ok(Article {
            title: self.row(id)?.committed().to_string(),
            paragraphs: self
                .kids(id)
                .iter()
                .filter_map(|&p| self.paragraph_snapshot(p).ok())
                .collect(),
        })
    }

    fn paragraph_snapshot(&self, id: NodeId) -> Result<Paragraph> {
        Ok(Paragraph {
            context: self.row(id)?.committed().to_string(),
            qas:     self.paragraph(id)?.to_questions(),
        })
    }

    // ─── Arena plumbing ──────────────────────────────────────────────────────

    /// Children of `id`, or nothing if the id is dead.
    pub(super) fn kids(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    fn row_of(&self, id: NodeId) -> Option<&EditableText> {
        self.node(id).ok().map(|n| &n.row)
    }

    pub(super) fn live_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(i, _)| NodeId(i))
    }

    /// `id` and everything below it, group answers included.
    pub(super) fn subtree_ids(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            let Ok(node) = self.node(cur) else { continue };
            out.push(cur);
            if let NodeKind::Group { answer } = node.kind {
                stack.push(answer);
            }
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// Add a node and append it to its parent's children.
    pub(super) fn alloc(&mut self, parent: Option<NodeId>, kind: NodeKind, row: EditableText) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(Node::new(parent, kind, row)));
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(p.0)).and_then(Option::as_mut) {
            parent.children.push(id);
        }
        id
    }

    /// Add a question group under `paragraph` together with its shared
    /// answer. The answer points at the group but is not in its children.
    pub(super) fn alloc_group(&mut self, paragraph: NodeId, answer_text: &str) -> NodeId {
        let group = NodeId(self.nodes.len());
        let answer = NodeId(group.0 + 1);
        self.alloc(Some(paragraph), NodeKind::Group { answer }, EditableText::default());
        self.nodes.push(Some(Node::new(
            Some(group),
            NodeKind::Answer(AnswerRole::Shared),
            EditableText::new(answer_text),
        )));
        group
    }

    fn alloc_editing(&mut self, parent: NodeId, kind: NodeKind) -> (NodeId, NodeId) {
        let id = self.alloc(Some(parent), kind, EditableText::editing());
        (id, id)
    }

    fn free_subtree(&mut self, id: NodeId) {
        for dead in self.subtree_ids(id) {
            if let Some(slot) = self.nodes.get_mut(dead.0) {
                *slot = None;
            }
        }
    }

    fn editable_row_mut(&mut self, id: NodeId) -> Result<&mut EditableText> {
        let node = self.node_mut(id)?;
        if !node.kind.is_text_bearing() {
            return Err(Error::NotEditable(id));
        }
        Ok(&mut node.row)
    }

    fn touch(&mut self) {
        self.revision += 1;
    }
}

/// A fresh question id.
pub(super) fn new_question_id() -> String {
    Uuid::new_v4().to_string()
}

/// Keep `id` if present, otherwise mint one. Legacy files may carry
/// questions without ids; repairing beats refusing to open them.
pub(super) fn ensure_question_id(id: &str) -> String {
    if id.trim().is_empty() {
        let fresh = new_question_id();
        tracing::debug!("Question without id, assigned {}", fresh);
        fresh
    } else {
        id.to_string()
    }
}
