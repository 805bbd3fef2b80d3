// ============================================================
// Layer 2 — Startup Flows
// ============================================================
// The two ways into the editor, wired to the UI collaborators:
//
//   open_existing: FilePicker → path → EditorSession
//                  decode/read failure → "Bad file" alert,
//                  caller keeps whatever it had before
//
//   create_new:    Prompter "New Data Name" → name →
//                  empty EditorSession under data_dir
//
// Both return None when the user backs out or the attempt
// failed; failures have already been shown as an alert.

use std::path::PathBuf;
use std::sync::Arc;

use crate::application::session::EditorSession;
use crate::domain::traits::{Alert, FilePicker, Prompter, Storage};
use crate::error::Error;
use crate::infra::config::EditorConfig;

pub const BAD_FILE_TITLE: &str = "Bad file";
pub const BAD_FILE_MESSAGE: &str = "Could not open this file. Please try another file.";
pub const NEW_DATA_TITLE: &str = "New Data Name";
pub const NEW_DATA_HINT: &str = "Enter Name";

pub struct StartupUseCase {
    config:  EditorConfig,
    storage: Arc<dyn Storage>,
}

impl StartupUseCase {
    pub fn new(config: EditorConfig, storage: Arc<dyn Storage>) -> Self {
        Self { config, storage }
    }

    /// Ask for a file and open it.
    pub fn open_existing(&self, picker: &dyn FilePicker, prompter: &dyn Prompter) -> Option<EditorSession> {
        let path = picker.pick_file()?;
        match self.open_path(path.clone()) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!("Could not open '{}': {}", path.display(), e);
                prompter.show(&Alert::message(BAD_FILE_TITLE, BAD_FILE_MESSAGE));
                None
            }
        }
    }

    /// Ask for a name and start an empty dataset.
    pub fn create_new(&self, prompter: &dyn Prompter) -> Option<EditorSession> {
        let name = prompter.text_input(&Alert::text_input(NEW_DATA_TITLE, NEW_DATA_HINT))?;
        match EditorSession::create(
            &name,
            &self.config.data_dir,
            self.config.strategy(),
            self.storage.clone(),
            self.config.export,
        ) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!("Could not create dataset {:?}: {}", name, e);
                let message = match e {
                    Error::InvalidName(_) => "Please enter a valid file name.".to_string(),
                    other => other.to_string(),
                };
                prompter.show(&Alert::message(NEW_DATA_TITLE, message));
                None
            }
        }
    }

    fn open_path(&self, path: PathBuf) -> crate::Result<EditorSession> {
        EditorSession::open(path, self.config.strategy(), self.storage.clone(), self.config.export)
    }
}
