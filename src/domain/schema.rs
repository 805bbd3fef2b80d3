// ============================================================
// Layer 3 — Dataset Schema
// ============================================================
// The canonical, serialisable shape of a SQuAD2.0 document:
//
//   Dataset  { data: [Article], version }
//     └── Article   { title, paragraphs }
//           └── Paragraph { context, qas }
//                 └── Question  { id, question, is_impossible,
//                                 answers, plausible_answers }
//                       └── Answer { text, answer_start }
//
// Field names follow the published SQuAD2.0 JSON. Older files
// are accepted too: `plausible_answers` may be missing,
// `is_impossible` may be spelled `isImpossible`, and the
// question list may be called `questions`. On write the
// canonical names are always used.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Version tag written when a document does not carry one.
pub const DEFAULT_VERSION: &str = "v2.0";

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

/// Top-level document containing all articles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(rename = "data")]
    pub articles: Vec<Article>,

    #[serde(default = "default_version")]
    pub version: String,

    /// Where the document is loaded from and saved to.
    /// Not part of the JSON; empty for an in-memory dataset.
    #[serde(skip)]
    pub source_path: PathBuf,
}

impl Dataset {
    /// An empty dataset that will be saved at `source_path`.
    pub fn empty(source_path: impl Into<PathBuf>) -> Self {
        Self {
            articles:    Vec::new(),
            version:     default_version(),
            source_path: source_path.into(),
        }
    }

    /// Every question in document order, paired with its article and paragraph.
    pub fn questions(&self) -> impl Iterator<Item = (&Article, &Paragraph, &Question)> {
        self.articles.iter().flat_map(|a| {
            a.paragraphs
                .iter()
                .flat_map(move |p| p.qas.iter().map(move |q| (a, p, q)))
        })
    }

    pub fn paragraph_count(&self) -> usize {
        self.articles.iter().map(|a| a.paragraphs.len()).sum()
    }

    pub fn question_count(&self) -> usize {
        self.questions().count()
    }

    /// Questions with at least one (non-plausible) answer.
    pub fn answerable_count(&self) -> usize {
        self.questions().filter(|(_, _, q)| q.is_answerable()).count()
    }
}

impl Default for Dataset {
    fn default() -> Self {
        Self::empty(PathBuf::new())
    }
}

/// A titled collection of paragraphs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub paragraphs: Vec<Paragraph>,
}

/// A context passage plus the questions asked about it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub context: String,

    #[serde(alias = "questions")]
    pub qas: Vec<Question>,
}

/// One question with its answer spans.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// UUID; legacy files may omit it, the editor then assigns one.
    #[serde(default)]
    pub id: String,

    #[serde(rename = "question")]
    pub text: String,

    #[serde(rename = "is_impossible", alias = "isImpossible", default)]
    pub is_impossible: bool,

    #[serde(default)]
    pub answers: Vec<Answer>,

    #[serde(default)]
    pub plausible_answers: Vec<Answer>,
}

impl Question {
    /// True when the question is answerable and has an answer span.
    pub fn is_answerable(&self) -> bool {
        !self.is_impossible && !self.answers.is_empty()
    }

    /// The spans annotated on this question, wherever they are filed.
    /// Impossible questions keep theirs in `plausible_answers`.
    pub fn annotated_answers(&self) -> &[Answer] {
        if self.answers.is_empty() {
            &self.plausible_answers
        } else {
            &self.answers
        }
    }
}

/// An answer span: text plus its character offset in the context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,

    /// Character offset of `text` in the paragraph context, -1 if absent.
    #[serde(rename = "answer_start")]
    pub start_offset: i64,
}

impl Answer {
    /// Build an answer whose offset is looked up in `context`.
    pub fn locate(context: &str, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            start_offset: start_offset(context, &text),
            text,
        }
    }
}

/// Character index of the first occurrence of `text` in `context`.
///
/// Offsets count Unicode scalar values, the unit SQuAD tooling uses
/// for `answer_start`. Empty text and missing matches give -1.
pub fn start_offset(context: &str, text: &str) -> i64 {
    if text.is_empty() {
        return -1;
    }
    match context.find(text) {
        Some(byte_idx) => context[..byte_idx].chars().count() as i64,
        None => -1,
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_at_start() {
        assert_eq!(start_offset("Paris is the capital of France.", "Paris"), 0);
    }

    #[test]
    fn test_offset_is_case_sensitive() {
        assert_eq!(start_offset("Paris is the capital of France.", "paris"), -1);
    }

    #[test]
    fn test_offset_counts_characters_not_bytes() {
        // "é" is two bytes in UTF-8 but one character
        assert_eq!(start_offset("café au lait", "au"), 5);
    }

    #[test]
    fn test_offset_of_empty_text() {
        assert_eq!(start_offset("anything", ""), -1);
    }

    #[test]
    fn test_answerable_requires_answer_and_possible() {
        let mut q = Question {
            id:   "1".into(),
            text: "Q".into(),
            answers: vec![Answer::locate("abc", "b")],
            ..Default::default()
        };
        assert!(q.is_answerable());

        q.is_impossible = true;
        assert!(!q.is_answerable());
    }

    #[test]
    fn test_annotated_answers_falls_back_to_plausible() {
        let q = Question {
            is_impossible:     true,
            plausible_answers: vec![Answer::locate("abc", "c")],
            ..Default::default()
        };
        assert_eq!(q.annotated_answers()[0].text, "c");
    }

    #[test]
    fn test_counts() {
        let ds = Dataset {
            articles: vec![Article {
                title: "T".into(),
                paragraphs: vec![Paragraph {
                    context: "abc".into(),
                    qas: vec![
                        Question {
                            text: "a?".into(),
                            answers: vec![Answer::locate("abc", "a")],
                            ..Default::default()
                        },
                        Question {
                            text: "z?".into(),
                            is_impossible: true,
                            ..Default::default()
                        },
                    ],
                }],
            }],
            ..Default::default()
        };
        assert_eq!(ds.paragraph_count(), 1);
        assert_eq!(ds.question_count(), 2);
        assert_eq!(ds.answerable_count(), 1);
    }
}
