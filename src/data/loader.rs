// ============================================================
// Layer 4 — Dataset Loader
// ============================================================
// Turns bytes into a Dataset and back, and resolves where a
// dataset lives on disk.
//
//   load(bytes)        → Dataset, or Error::Decode on bad JSON
//   encode(dataset)    → canonical pretty-printed JSON
//   DatasetLoader
//     .open(path)      → read through Storage + load, remembers path
//     .create(name)    → empty dataset at <dir>/<name>.json
//
// `create` makes sure the directory exists but writes nothing;
// the file appears on the first save.
//
// Reference: serde_json documentation

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::schema::Dataset;
use crate::domain::traits::Storage;
use crate::error::{Error, Result};

/// Parse a SQuAD2.0 JSON document.
pub fn load(bytes: &[u8]) -> Result<Dataset> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Serialise a dataset in its canonical form.
pub fn encode(dataset: &Dataset) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(dataset).map_err(Error::Encode)
}

/// Opens and creates datasets through a `Storage` collaborator.
pub struct DatasetLoader {
    storage: Arc<dyn Storage>,
}

impl DatasetLoader {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Read and decode the document at `path`.
    pub fn open(&self, path: impl AsRef<Path>) -> Result<Dataset> {
        let path = path.as_ref();
        let bytes = self.storage.read(path)?;
        let mut dataset = load(&bytes)?;
        dataset.source_path = path.to_path_buf();

        tracing::info!(
            "Opened '{}' ({} articles, {} questions)",
            path.display(),
            dataset.articles.len(),
            dataset.question_count()
        );
        Ok(dataset)
    }

    /// A new, empty dataset that will be saved as `<dir>/<name>.json`.
    pub fn create(&self, name: &str, dir: impl AsRef<Path>) -> Result<Dataset> {
        let dir = dir.as_ref();
        let path = document_path(name, dir)?;
        self.storage.ensure_dir(dir)?;

        tracing::info!("Created new dataset '{}'", path.display());
        Ok(Dataset::empty(path))
    }
}

/// `<dir>/<name>.json`, without doubling an extension the user typed.
pub fn document_path(name: &str, dir: &Path) -> Result<PathBuf> {
    // "faq", " faq ", and "faq.json" all name the same file
    let name = name.trim();
    let stem = name.strip_suffix(".json").unwrap_or(name);

    // a name must stay inside `dir`

    if stem.trim().is_empty() || stem.contains(['/', '\\']) {
        return Err(Error::InvalidName(name.to_string()));
    }
    Ok(dir.join(format!("{stem}.json")))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::{Answer, Article, Paragraph, Question, DEFAULT_VERSION};
    use crate::infra::storage::MemoryStorage;
    use pretty_assertions::assert_eq;

    const SQUAD: &str = r#"{
        "version": "v2.0",
        "data": [{
            "title": "Normans",
            "paragraphs": [{
                "context": "The Normans were the people who in the 10th and 11th centuries gave their name to Normandy.",
                "qas": [
                    {
                        "id": "56ddde6b9a695914005b9628",
                        "question": "In what country is Normandy located?",
                        "is_impossible": false,
                        "answers": [{"text": "Normandy", "answer_start": 83}]
                    },
                    {
                        "id": "5ad39d53604f3c001a3fe8d1",
                        "question": "Who gave their name to Normandy in the 1000's?",
                        "is_impossible": true,
                        "answers": [],
                        "plausible_answers": [{"text": "Normans", "answer_start": 4}]
                    }
                ]
            }]
        }]
    }"#;

    #[test]
    fn test_load_squad_document() {
        let ds = load(SQUAD.as_bytes()).unwrap();
        assert_eq!(ds.version, "v2.0");
        assert_eq!(ds.articles[0].title, "Normans");
        let qas = &ds.articles[0].paragraphs[0].qas;
        assert_eq!(qas[0].answers[0].start_offset, 83);
        assert!(qas[1].is_impossible);
        assert_eq!(qas[1].plausible_answers[0].text, "Normans");
    }

    #[test]
    fn test_legacy_field_names() {
        let legacy = r#"{
            "data": [{
                "title": "t",
                "paragraphs": [{
                    "context": "abc",
                    "questions": [{
                        "id": "1",
                        "question": "q?",
                        "isImpossible": true,
                        "answers": []
                    }]
                }]
            }]
        }"#;
        let ds = load(legacy.as_bytes()).unwrap();
        assert_eq!(ds.version, DEFAULT_VERSION);
        let q = &ds.articles[0].paragraphs[0].qas[0];
        assert!(q.is_impossible);
        assert!(q.plausible_answers.is_empty());

        // written back with canonical names only
        let out = String::from_utf8(encode(&ds).unwrap()).unwrap();
        assert!(out.contains("\"is_impossible\""));
        assert!(out.contains("\"qas\""));
        assert!(!out.contains("isImpossible"));
        assert!(!out.contains("\"questions\""));
    }

    #[test]
    fn test_malformed_json_is_decode_error() {
        assert!(matches!(load(b"{ not json"), Err(Error::Decode(_))));
    }

    #[test]
    fn test_wrong_shape_is_decode_error() {
        assert!(matches!(load(br#"{"data": 5}"#), Err(Error::Decode(_))));
        assert!(matches!(load(br#"{"version": "v2.0"}"#), Err(Error::Decode(_))));
    }

    #[test]
    fn test_encode_then_load_is_identity() {
        let ctx = "Paris is the capital of France.";
        let ds = Dataset {
            articles: vec![Article {
                title: "Geo".into(),
                paragraphs: vec![Paragraph {
                    context: ctx.into(),
                    qas: vec![Question {
                        id: "a1".into(),
                        text: "Capital?".into(),
                        answers: vec![Answer::locate(ctx, "Paris")],
                        ..Default::default()
                    }],
                }],
            }],
            version: "v2.0".into(),
            source_path: PathBuf::new(),
        };
        assert_eq!(load(&encode(&ds).unwrap()).unwrap(), ds);
    }

    #[test]
    fn test_open_records_path() {
        let storage = Arc::new(MemoryStorage::new());
        storage.write(Path::new("d/squad.json"), SQUAD.as_bytes()).unwrap();

        let loader = DatasetLoader::new(storage);
        let ds = loader.open("d/squad.json").unwrap();
        assert_eq!(ds.source_path, PathBuf::from("d/squad.json"));
    }

    #[test]
    fn test_open_missing_file_is_io_error() {
        let loader = DatasetLoader::new(Arc::new(MemoryStorage::new()));
        assert!(loader.open("nope.json").unwrap_err().is_io());
    }

    #[test]
    fn test_create_builds_path_and_writes_nothing() {
        let storage = Arc::new(MemoryStorage::new());
        let loader = DatasetLoader::new(storage.clone());

        let ds = loader.create("faq", "out").unwrap();
        assert_eq!(ds.source_path, PathBuf::from("out/faq.json"));
        assert_eq!(ds.version, DEFAULT_VERSION);
        assert!(ds.articles.is_empty());
        assert!(storage.paths().is_empty());
    }

    #[test]
    fn test_document_path_rules() {
        let dir = Path::new("data");
        assert_eq!(document_path("faq.json", dir).unwrap(), PathBuf::from("data/faq.json"));
        assert!(matches!(document_path("  ", dir), Err(Error::InvalidName(_))));
        assert!(matches!(document_path(".json", dir), Err(Error::InvalidName(_))));
        assert!(matches!(document_path("a/b", dir), Err(Error::InvalidName(_))));
    }
}
