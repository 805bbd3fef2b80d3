// ============================================================
// Layer 2 — Editing Session
// ============================================================
// Owns one EditorTree plus everything needed to persist it.
//
// Save flow (from any node, the request climbs to the root):
//
//   begin_save(node)
//     1. refuse if another save of this session is running
//     2. force-commit every node still being edited
//        (failures stay on the node as validation errors)
//     3. re-validate the tree against the committed text
//     4. snapshot the committed tree into a Dataset
//     5. hand back a SaveJob (Send)
//
//   SaveJob::run()            ← may run on a worker thread
//     6. write dataset JSON + the four export files
//     7. release the busy flag
//
// The tree is never rolled back when a write fails, so the
// user can fix the problem and save again.
//
// Reference: Rust Book §16 (Fearless Concurrency)
//            std::sync::atomic documentation

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::data::export::{ExportConfig, Exporter};
use crate::data::loader::DatasetLoader;
use crate::domain::schema::Dataset;
use crate::domain::traits::Storage;
use crate::error::{Error, Result};
use crate::state::{EditorTree, NodeId, Strategy};

/// Outcome of a finished save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    /// Nodes whose pending edit could not be committed.
    pub failed_commits: Vec<NodeId>,

    /// Files written, dataset document first.
    pub written: Vec<PathBuf>,
}

pub struct EditorSession {
    tree:      EditorTree,
    storage:   Arc<dyn Storage>,
    exporter:  Exporter,
    in_flight: Arc<AtomicBool>,
}

impl EditorSession {
    pub fn new(dataset: &Dataset, strategy: Strategy, storage: Arc<dyn Storage>, export: ExportConfig) -> Self {
        Self {
            tree:      EditorTree::from_dataset(dataset, strategy),
            storage,
            exporter:  Exporter::new(export),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Open the dataset stored at `path`.
    pub fn open(
        path:     impl AsRef<Path>,
        strategy: Strategy,
        storage:  Arc<dyn Storage>,
        export:   ExportConfig,
    ) -> Result<Self> {
        let dataset = DatasetLoader::new(storage.clone()).open(path)?;
        Ok(Self::new(&dataset, strategy, storage, export))
    }

    /// Start a new, empty dataset that will be saved as `<dir>/<name>.json`.
    pub fn create(
        name:     &str,
        dir:      impl AsRef<Path>,
        strategy: Strategy,
        storage:  Arc<dyn Storage>,
        export:   ExportConfig,
    ) -> Result<Self> {
        let dataset = DatasetLoader::new(storage.clone()).create(name, dir)?;
        Ok(Self::new(&dataset, strategy, storage, export))
    }

    pub fn tree(&self) -> &EditorTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut EditorTree {
        &mut self.tree
    }

    /// True while a `SaveJob` of this session is alive.
    pub fn is_saving(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Capture a snapshot for saving. `from` may be any live node.
    pub fn begin_save(&mut self, from: NodeId) -> Result<SaveJob> {
        // claim the session; whoever holds the flag owns the only save
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::SaveInProgress);
        }
        // released on every early return below, and when the job ends
        let guard = BusyGuard(self.in_flight.clone());

        let root = self.tree.root_of(from)?;
        tracing::debug!("Save requested from {} (root {})", from, root);

        let failed_commits = self.tree.commit_pending();
        if !failed_commits.is_empty() {
            tracing::warn!("{} pending edit(s) failed validation before save", failed_commits.len());
        }

        // Re-check the whole tree against what is about to be written,
        // so a span that no longer matches its saved context shows up.
        let invalid = self.tree.validate_all();
        if invalid > 0 {
            tracing::warn!("Saving with {} node(s) that fail validation", invalid);
        }

        let dataset = self.tree.to_dataset();
        if dataset.source_path.as_os_str().is_empty() {
            return Err(Error::invalid_operation("dataset has no file path"));
        }

        Ok(SaveJob {
            dataset,
            storage: self.storage.clone(),
            exporter: self.exporter.clone(),
            failed_commits,
            _guard: guard,
        })
    }

    /// Save and export on the calling thread.
    pub fn save(&mut self, from: NodeId) -> Result<SaveReport> {
        self.begin_save(from)?.run()
    }

    /// Save, then rebuild the tree with another paragraph layout.
    pub fn switch_strategy(&mut self, strategy: Strategy) -> Result<SaveReport> {
        // the rebuild reads committed text only, so persist first
        let report = self.save(self.tree.root())?;
        self.tree = self.tree.with_strategy(strategy);
        tracing::info!("Switched to {:?} layout", strategy);
        Ok(report)
    }
}

// ─── Save job ─────────────────────────────────────────────────────────────────
/// A captured snapshot waiting to be written.
pub struct SaveJob {
    dataset:        Dataset,
    storage:        Arc<dyn Storage>,
    exporter:       Exporter,
    failed_commits: Vec<NodeId>,
    _guard:         BusyGuard,
}

impl SaveJob {
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Write the document and its exports.
    pub fn run(self) -> Result<SaveReport> {
        let written = self.exporter.write_all(&self.dataset, self.storage.as_ref())?;
        tracing::info!("Saved '{}'", self.dataset.source_path.display());

        Ok(SaveReport { failed_commits: self.failed_commits, written })
    }
}

struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load;
    use crate::infra::storage::MemoryStorage;
    use crate::state::validate::{ANSWER_ERROR, PARAGRAPH_ERROR};

    const CONTEXT: &str = "Paris is the capital of France.";

    /// In-memory storage whose writes fail while `failing` is set.
    struct FlakyStorage {
        inner:   MemoryStorage,
        failing: AtomicBool,
    }

    impl FlakyStorage {
        fn failing() -> Self {
            Self { inner: MemoryStorage::new(), failing: AtomicBool::new(true) }
        }
    }

    impl Storage for FlakyStorage {
        fn read(&self, path: &Path) -> Result<Vec<u8>> {
            self.inner.read(path)
        }

        fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(Error::io(path, std::io::Error::new(std::io::ErrorKind::Other, "disk full")));
            }
            self.inner.write(path, bytes)
        }

        fn ensure_dir(&self, dir: &Path) -> Result<()> {
            self.inner.ensure_dir(dir)
        }
    }

    /// Session over an in-memory store with one article and paragraph.
    fn session() -> (EditorSession, Arc<MemoryStorage>, NodeId) {
        let storage = Arc::new(MemoryStorage::new());
        let mut s = EditorSession::create(
            "geo",
            "out",
            Strategy::Plain,
            storage.clone(),
            ExportConfig::default(),
        )
        .unwrap();

        let tree = s.tree_mut();
        let article = tree.add_child(tree.root()).unwrap().node;
        tree.update_draft(article, "Geography").unwrap();
        tree.commit(article).unwrap();
        let paragraph = tree.add_child(article).unwrap().node;
        tree.update_draft(paragraph, CONTEXT).unwrap();
        tree.commit(paragraph).unwrap();
        (s, storage, paragraph)
    }

    #[test]
    fn test_save_writes_document_and_exports() {
        let (mut s, storage, paragraph) = session();
        let report = s.save(paragraph).unwrap();

        assert!(report.failed_commits.is_empty());
        assert_eq!(report.written.len(), 5);
        assert_eq!(storage.paths().len(), 5);

        let saved = load(&storage.read(Path::new("out/geo.json")).unwrap()).unwrap();
        assert_eq!(saved.articles[0].title, "Geography");
        assert_eq!(saved.articles[0].paragraphs[0].context, CONTEXT);
        assert!(!s.is_saving());
    }

    #[test]
    fn test_save_commits_pending_edits() {
        let (mut s, storage, paragraph) = session();
        let tree = s.tree_mut();
        let question = tree.add_child(paragraph).unwrap().node;
        tree.update_draft(question, "What is the capital?").unwrap();
        let answer = tree.add_child(question).unwrap().node;
        tree.update_draft(answer, "Paris").unwrap();

        let report = s.save(s.tree().root()).unwrap();
        assert!(report.failed_commits.is_empty());

        let saved = load(&storage.read(Path::new("out/geo.json")).unwrap()).unwrap();
        let q = &saved.articles[0].paragraphs[0].qas[0];
        assert_eq!(q.text, "What is the capital?");
        assert_eq!(q.answers[0].start_offset, 0);
    }

    #[test]
    fn test_failed_pending_commit_does_not_fail_save() {
        let (mut s, _storage, paragraph) = session();
        let tree = s.tree_mut();
        let question = tree.add_child(paragraph).unwrap().node;
        tree.update_draft(question, "Largest city?").unwrap();
        tree.commit(question).unwrap();
        let answer = tree.add_child(question).unwrap().node;
        tree.update_draft(answer, "Lyon").unwrap();

        let report = s.save(answer).unwrap();
        assert_eq!(report.failed_commits, vec![answer]);
        assert_eq!(s.tree().row(answer).unwrap().error(), Some(ANSWER_ERROR));
    }

    #[test]
    fn test_answer_outside_saved_context_is_not_written() {
        let (mut s, storage, paragraph) = session();
        let tree = s.tree_mut();

        let q1 = tree.add_child(paragraph).unwrap().node;
        tree.update_draft(q1, "Capital of France?").unwrap();
        let a1 = tree.add_child(q1).unwrap().node;
        tree.update_draft(a1, "Paris").unwrap();
        assert!(tree.commit(a1).unwrap());
        assert!(tree.commit(q1).unwrap());

        // this context would orphan "Paris", so it stays a draft
        tree.update_draft(paragraph, "Lyon is a city in France.").unwrap();
        assert!(!tree.commit(paragraph).unwrap());

        let q2 = tree.add_child(paragraph).unwrap().node;
        tree.update_draft(q2, "Which city?").unwrap();
        assert!(tree.commit(q2).unwrap());
        let a2 = tree.add_child(q2).unwrap().node;
        tree.update_draft(a2, "Lyon").unwrap();
        assert!(!tree.commit(a2).unwrap());

        let report = s.save(paragraph).unwrap();
        assert_eq!(report.failed_commits, vec![paragraph, a2]);
        assert_eq!(s.tree().row(a2).unwrap().error(), Some(ANSWER_ERROR));
        assert_eq!(s.tree().row(paragraph).unwrap().error(), Some(PARAGRAPH_ERROR));

        let saved = load(&storage.read(Path::new("out/geo.json")).unwrap()).unwrap();
        let written = &saved.articles[0].paragraphs[0];
        assert_eq!(written.context, CONTEXT);
        assert!(written.qas[1].answers.is_empty());
        assert!(written
            .qas
            .iter()
            .flat_map(|q| &q.answers)
            .all(|a| a.start_offset >= 0));
    }

    #[test]
    fn test_failed_write_keeps_tree_and_allows_retry() {
        let storage = Arc::new(FlakyStorage::failing());
        let mut s = EditorSession::create(
            "geo",
            "out",
            Strategy::Plain,
            storage.clone(),
            ExportConfig::default(),
        )
        .unwrap();
        let tree = s.tree_mut();
        let article = tree.add_child(tree.root()).unwrap().node;
        tree.update_draft(article, "Geography").unwrap();

        let err = s.save(article).unwrap_err();
        assert!(err.is_io());
        assert!(!s.is_saving());
        // the pending edit was committed and stays committed
        let row = s.tree().row(article).unwrap();
        assert_eq!(row.committed(), "Geography");
        assert!(!row.is_editing());

        storage.failing.store(false, Ordering::SeqCst);
        let report = s.save(article).unwrap();
        assert_eq!(report.written.len(), 5);
        let saved = load(&storage.read(Path::new("out/geo.json")).unwrap()).unwrap();
        assert_eq!(saved.articles[0].title, "Geography");
    }

    #[test]
    fn test_second_save_is_rejected_while_busy() {
        let (mut s, _storage, _) = session();
        let root = s.tree().root();

        let job = s.begin_save(root).unwrap();
        assert!(s.is_saving());
        assert!(matches!(s.begin_save(root), Err(Error::SaveInProgress)));

        drop(job);
        assert!(!s.is_saving());
        assert!(s.begin_save(root).is_ok());
    }

    #[test]
    fn test_job_runs_on_worker_thread() {
        fn assert_send<T: Send>() {}
        assert_send::<SaveJob>();

        let (mut s, storage, _) = session();
        let job = s.begin_save(s.tree().root()).unwrap();
        let report = std::thread::spawn(move || job.run()).join().unwrap().unwrap();

        assert_eq!(report.written.len(), 5);
        assert!(storage.paths().contains(&PathBuf::from("out/geo_train.csv")));
        assert!(!s.is_saving());
    }

    #[test]
    fn test_unknown_node_releases_busy_flag() {
        let (mut s, _storage, paragraph) = session();
        let tree = s.tree_mut();
        let article = tree.parent(paragraph).unwrap().unwrap();
        tree.remove_child(article, paragraph).unwrap();

        assert!(matches!(s.begin_save(paragraph), Err(Error::UnknownNode(_))));
        assert!(!s.is_saving());
    }

    #[test]
    fn test_in_memory_tree_cannot_be_saved() {
        let mut s = EditorSession::new(
            &Dataset::default(),
            Strategy::Plain,
            Arc::new(MemoryStorage::new()),
            ExportConfig::default(),
        );
        let root = s.tree().root();
        assert!(matches!(s.save(root), Err(Error::InvalidOperation(_))));
        assert!(!s.is_saving());
    }

    #[test]
    fn test_switch_strategy_saves_and_rebuilds() {
        let (mut s, storage, paragraph) = session();
        let tree = s.tree_mut();
        for text in ["Capital of France?", "France's capital city?"] {
            let q = tree.add_child(paragraph).unwrap().node;
            tree.update_draft(q, text).unwrap();
            let a = tree.add_child(q).unwrap().node;
            tree.update_draft(a, "Paris").unwrap();
            tree.commit(a).unwrap();
        }

        s.switch_strategy(Strategy::Grouped).unwrap();
        assert_eq!(s.tree().strategy(), Strategy::Grouped);
        assert!(storage.paths().contains(&PathBuf::from("out/geo.json")));

        let article = s.tree().children(s.tree().root()).unwrap()[0];
        let paragraph = s.tree().children(article).unwrap()[0];
        assert_eq!(s.tree().children(paragraph).unwrap().len(), 1);
    }

    #[test]
    fn test_open_reads_saved_file() {
        let (mut s, storage, _) = session();
        s.save(s.tree().root()).unwrap();

        let reopened = EditorSession::open(
            "out/geo.json",
            Strategy::Plain,
            storage,
            ExportConfig::default(),
        )
        .unwrap();
        assert_eq!(reopened.tree().summary(reopened.tree().root()).unwrap(),
            "Articles: 1, Paragraphs: 1, Questions: 0, Answerable: 0");
    }
}
