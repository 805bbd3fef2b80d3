// ============================================================
// Layer 4 — Exporter
// ============================================================
// Runs after every root save. For a document at dir/name.json
// it writes five files:
//
//   name.json        → canonical dataset JSON
//   name_train.jsonl → answerable QA pairs, training split
//   name_test.jsonl  → answerable QA pairs, test split
//   name_train.csv   → question / article-title pairs, training
//   name_test.csv    → question / article-title pairs, test
//
// QA records (one JSON object per line, Hugging Face layout):
//   {"context": "...", "question": "...",
//    "answers": ["..."], "answer_starts": [17]}
//
// Classification rows (pandas-style, leading row index):
//   ,sentence,label
//   0,What is the capital of France?,geography
//
// Shuffling is seeded from the SHA-256 of the canonical JSON,
// so the same document always exports the same splits. Each
// file goes through `Storage::write`, which is atomic per file.
//
// Reference: Hugging Face `datasets` SQuAD loader
//            rand crate documentation (SeedableRng)

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::loader::encode;
use super::splitter::split_train_test;
use crate::domain::schema::Dataset;
use crate::domain::traits::Storage;
use crate::error::{Error, Result};

/// Header row of the classification CSV files.
pub const CSV_HEADER: &str = ",sentence,label";

// ─── Records ──────────────────────────────────────────────────────────────────
/// One answerable question in extractive-QA training form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaRecord {
    pub context:       String,
    pub question:      String,
    pub answers:       Vec<String>,
    /// Character offsets, parallel to `answers`.
    pub answer_starts: Vec<i64>,
}

/// A question labelled with the (lower-cased) title of its article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelledSentence {
    pub sentence: String,
    pub label:    String,
}

// ─── Configuration ────────────────────────────────────────────────────────────
/// Train fractions for the two derived splits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Share of QA records that go to `_train.jsonl`.
    pub qa_train_ratio: f64,

    /// Share of labelled sentences that go to `_train.csv`.
    pub classification_train_ratio: f64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            qa_train_ratio:             0.8,
            classification_train_ratio: 0.9,
        }
    }
}

// ─── Paths ────────────────────────────────────────────────────────────────────
/// Where each artifact of one document lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub document:             PathBuf,
    pub qa_train:             PathBuf,
    pub qa_test:              PathBuf,
    pub classification_train: PathBuf,
    pub classification_test:  PathBuf,
}

impl ExportPaths {
    /// Sibling paths derived from the document's stem.
    pub fn for_document(document: &Path) -> Self {
        let dir  = document.parent().unwrap_or_else(|| Path::new(""));
        let stem = document
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let sibling = |suffix: &str| dir.join(format!("{stem}{suffix}"));

        Self {
            document:             document.to_path_buf(),
            qa_train:             sibling("_train.jsonl"),
            qa_test:              sibling("_test.jsonl"),
            classification_train: sibling("_train.csv"),
            classification_test:  sibling("_test.csv"),
        }
    }
}

// ─── Bundle ───────────────────────────────────────────────────────────────────
/// Everything one export produces, before it is written anywhere.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportBundle {
    pub document:             Vec<u8>,
    pub qa_train:             Vec<QaRecord>,
    pub qa_test:              Vec<QaRecord>,
    pub classification_train: Vec<LabelledSentence>,
    pub classification_test:  Vec<LabelledSentence>,
}

// ─── Exporter ─────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    config: ExportConfig,
}

impl Exporter {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Answerable questions in document order.
    pub fn qa_records(dataset: &Dataset) -> Vec<QaRecord> {
        dataset
            .questions()
            .filter(|(_, _, q)| q.is_answerable())
            .map(|(_, p, q)| QaRecord {
                context:       p.context.clone(),
                question:      q.text.clone(),
                answers:       q.answers.iter().map(|a| a.text.clone()).collect(),
                answer_starts: q.answers.iter().map(|a| a.start_offset).collect(),
            })
            .collect()
    }

    /// Every question, labelled with its article title.
    pub fn labelled_sentences(dataset: &Dataset) -> Vec<LabelledSentence> {
        dataset
            .questions()
            .map(|(a, _, q)| LabelledSentence {
                sentence: q.text.clone(),
                label:    a.title.to_lowercase(),
            })
            .collect()
    }

    /// Shuffle seed for a canonical document: first 8 bytes of its SHA-256.
    pub fn content_seed(canonical: &[u8]) -> u64 {
        // seed = first 8 digest bytes read as a little-endian u64
        let digest = Sha256::digest(canonical);
        let mut seed = [0u8; 8];
        seed.copy_from_slice(&digest[..8]);
        u64::from_le_bytes(seed)
    }

    /// Build the bundle with a generator seeded from the document content.
    pub fn build(&self, dataset: &Dataset) -> Result<ExportBundle> {
        // hash the exact bytes that get written, so equal files give equal splits
        let document = encode(dataset)?;
        let mut rng = StdRng::seed_from_u64(Self::content_seed(&document));
        Ok(self.split(document, dataset, &mut rng))
    }

    /// Build the bundle with a caller-supplied generator.
    pub fn build_with_rng<R: Rng + ?Sized>(&self, dataset: &Dataset, rng: &mut R) -> Result<ExportBundle> {
        let document = encode(dataset)?;
        Ok(self.split(document, dataset, rng))
    }

    fn split<R: Rng + ?Sized>(&self, document: Vec<u8>, dataset: &Dataset, rng: &mut R) -> ExportBundle {
        // QA first, then classification: both draw from the same rng,
        // so this order is part of the output
        let (qa_train, qa_test) =
            split_train_test(Self::qa_records(dataset), self.config.qa_train_ratio, rng);
        let (classification_train, classification_test) = split_train_test(
            Self::labelled_sentences(dataset),
            self.config.classification_train_ratio,
            rng,
        );

        ExportBundle { document, qa_train, qa_test, classification_train, classification_test }
    }

    /// Write the canonical document and all four splits next to it.
    ///
    /// Returns the paths written, document first.
    pub fn write_all(&self, dataset: &Dataset, storage: &dyn Storage) -> Result<Vec<PathBuf>> {
        if dataset.source_path.as_os_str().is_empty() {
            return Err(Error::invalid_operation("dataset has no file path"));
        }
        let paths  = ExportPaths::for_document(&dataset.source_path);
        let bundle = self.build(dataset)?;

        // encode everything before the first write
        let files = [
            (paths.document,             bundle.document),
            (paths.qa_train,             to_jsonl(&bundle.qa_train)?),
            (paths.qa_test,              to_jsonl(&bundle.qa_test)?),
            (paths.classification_train, to_csv(&bundle.classification_train)),
            (paths.classification_test,  to_csv(&bundle.classification_test)),
        ];

        let mut written = Vec::with_capacity(files.len());
        for (path, bytes) in files {
            storage.write(&path, &bytes)?;
            tracing::debug!("Wrote '{}' ({} bytes)", path.display(), bytes.len());
            written.push(path);
        }

        tracing::info!(
            "Exported '{}': {}/{} QA records, {}/{} labelled sentences",
            dataset.source_path.display(),
            bundle.qa_train.len(),
            bundle.qa_test.len(),
            bundle.classification_train.len(),
            bundle.classification_test.len(),
        );
        Ok(written)
    }
}

// ─── Encoders ─────────────────────────────────────────────────────────────────
/// One compact JSON object per line.
pub fn to_jsonl(records: &[QaRecord]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for record in records {
        serde_json::to_writer(&mut out, record).map_err(Error::Encode)?;
        out.push(b'\n');
    }
    Ok(out)
}

/// Header plus one indexed row per sentence.
pub fn to_csv(rows: &[LabelledSentence]) -> Vec<u8> {
    let mut out = String::new();
    out.push_str(CSV_HEADER);
    out.push('\n');
    for (i, row) in rows.iter().enumerate() {
        // writing to a String cannot fail
        let _ = writeln!(out, "{},{},{}", i, csv_field(&row.sentence), csv_field(&row.label));
    }
    out.into_bytes()
}

/// Quote a field when it holds a separator, a quote or a line break.
fn csv_field(value: &str) -> std::borrow::Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\"")).into()
    } else {
        value.into()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::{Answer, Article, Paragraph, Question};
    use crate::infra::storage::MemoryStorage;
    use pretty_assertions::assert_eq;

    const CONTEXT: &str = "Paris is the capital of France.";

    fn question(i: usize, answerable: bool) -> Question {
        Question {
            id:            format!("q{i}"),
            text:          format!("Question number {i}?"),
            is_impossible: !answerable,
            answers:       if answerable { vec![Answer::locate(CONTEXT, "Paris")] } else { vec![] },
            ..Default::default()
        }
    }

    fn dataset(answerable: usize, impossible: usize) -> Dataset {
        let qas = (0..answerable)
            .map(|i| question(i, true))
            .chain((answerable..answerable + impossible).map(|i| question(i, false)))
            .collect();
        Dataset {
            articles: vec![Article {
                title: "Geography".into(),
                paragraphs: vec![Paragraph { context: CONTEXT.into(), qas }],
            }],
            source_path: PathBuf::from("out/geo.json"),
            ..Default::default()
        }
    }

    #[test]
    fn test_paths_follow_document_stem() {
        let paths = ExportPaths::for_document(Path::new("out/geo.json"));
        assert_eq!(paths.qa_train, PathBuf::from("out/geo_train.jsonl"));
        assert_eq!(paths.qa_test, PathBuf::from("out/geo_test.jsonl"));
        assert_eq!(paths.classification_train, PathBuf::from("out/geo_train.csv"));
        assert_eq!(paths.classification_test, PathBuf::from("out/geo_test.csv"));
    }

    #[test]
    fn test_only_answerable_questions_become_qa_records() {
        let records = Exporter::qa_records(&dataset(3, 2));
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].answers, vec!["Paris".to_string()]);
        assert_eq!(records[0].answer_starts, vec![0]);
        assert_eq!(records[0].context, CONTEXT);
    }

    #[test]
    fn test_impossible_question_with_answers_is_excluded() {
        let mut ds = dataset(1, 0);
        ds.articles[0].paragraphs[0].qas[0].is_impossible = true;
        assert!(Exporter::qa_records(&ds).is_empty());
    }

    #[test]
    fn test_eighty_twenty_split() {
        let bundle = Exporter::default().build(&dataset(100, 0)).unwrap();
        assert_eq!(bundle.qa_train.len(), 80);
        assert_eq!(bundle.qa_test.len(), 20);
    }

    #[test]
    fn test_splits_are_complete_and_disjoint() {
        let bundle = Exporter::default().build(&dataset(40, 10)).unwrap();
        let mut questions: Vec<&str> = bundle
            .qa_train
            .iter()
            .chain(&bundle.qa_test)
            .map(|r| r.question.as_str())
            .collect();
        questions.sort_unstable();
        questions.dedup();
        assert_eq!(questions.len(), 40);

        assert_eq!(
            bundle.classification_train.len() + bundle.classification_test.len(),
            50
        );
        assert_eq!(bundle.classification_train.len(), 45);
    }

    #[test]
    fn test_same_content_same_split() {
        let exporter = Exporter::default();
        let a = exporter.build(&dataset(30, 5)).unwrap();
        let b = exporter.build(&dataset(30, 5)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_injected_rng_controls_split() {
        let exporter = Exporter::default();
        let ds = dataset(20, 0);
        let a = exporter.build_with_rng(&ds, &mut StdRng::seed_from_u64(1)).unwrap();
        let b = exporter.build_with_rng(&ds, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(a.qa_train, b.qa_train);
    }

    #[test]
    fn test_labels_are_lowercased_titles() {
        let sentences = Exporter::labelled_sentences(&dataset(1, 1));
        assert_eq!(sentences.len(), 2);
        assert!(sentences.iter().all(|s| s.label == "geography"));
    }

    #[test]
    fn test_csv_layout() {
        let rows = vec![
            LabelledSentence { sentence: "Where is it?".into(), label: "geo".into() },
            LabelledSentence { sentence: "Paris, or \"Lyon\"?".into(), label: "geo".into() },
        ];
        let csv = String::from_utf8(to_csv(&rows)).unwrap();
        assert_eq!(
            csv,
            ",sentence,label\n0,Where is it?,geo\n1,\"Paris, or \"\"Lyon\"\"?\",geo\n"
        );
    }

    #[test]
    fn test_jsonl_layout() {
        let records = Exporter::qa_records(&dataset(2, 0));
        let text = String::from_utf8(to_jsonl(&records).unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: QaRecord = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first, records[0]);
        assert!(lines[0].contains("\"answer_starts\":[0]"));
    }

    #[test]
    fn test_write_all_writes_five_files() {
        let storage = MemoryStorage::new();
        let written = Exporter::default().write_all(&dataset(10, 2), &storage).unwrap();
        assert_eq!(written.len(), 5);
        assert_eq!(written[0], PathBuf::from("out/geo.json"));

        let csv = String::from_utf8(storage.read(Path::new("out/geo_test.csv")).unwrap()).unwrap();
        assert!(csv.starts_with(CSV_HEADER));
        assert_eq!(csv.lines().count(), 1 + 1);
    }

    #[test]
    fn test_write_all_needs_a_path() {
        let mut ds = dataset(1, 0);
        ds.source_path = PathBuf::new();
        let err = Exporter::default().write_all(&ds, &MemoryStorage::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidOperation(_)));
    }
}
