use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::config_directory;
use crate::domain::TicketDraft;
use crate::error::{AppError, AppResult};

const DRAFT_FILE_NAME: &str = "draft.json";

#[derive(Default, Serialize, Deserialize)]
struct DraftFile {
    draft: Option<TicketDraft>,
}

/// The last unsubmitted form draft, kept on disk so `create --resume` can
/// pick up where a rejected or failed submission left off.
pub struct DraftStore {
    file_path: PathBuf,
    file: DraftFile,
}

impl DraftStore {
    pub fn load() -> AppResult<Self> {
        Self::load_from(config_directory()?.join(DRAFT_FILE_NAME))
    }

    fn load_from(path: PathBuf) -> AppResult<Self> {
        let file = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str::<DraftFile>(&contents)
                .map_err(|err| AppError::Configuration(format!("invalid draft file: {err}")))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => DraftFile::default(),
            Err(err) => return Err(AppError::Io(err)),
        };

        Ok(Self {
            file_path: path,
            file,
        })
    }

    pub fn get(&self) -> Option<&TicketDraft> {
        self.file.draft.as_ref()
    }

    pub fn retain(&mut self, draft: &TicketDraft) {
        self.file.draft = (!draft.is_empty()).then(|| draft.clone());
    }

    pub fn clear(&mut self) {
        self.file.draft = None;
    }

    pub fn save(&self) -> AppResult<()> {
        if self.file.draft.is_none() {
            return match fs::remove_file(&self.file_path) {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(err) => Err(AppError::Io(err)),
            };
        }
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(&self.file)
            .map_err(|err| AppError::Configuration(format!("failed to write draft: {err}")))?;
        fs::write(&self.file_path, data)?;
        debug!(path = %self.file_path.display(), "draft retained");
        Ok(())
    }

    /// Fills the fields `draft` leaves empty from the retained draft.
    pub fn fill_missing(&self, draft: &mut TicketDraft) {
        let Some(saved) = self.get() else {
            return;
        };
        if draft.title.is_empty() {
            draft.title = saved.title.clone();
        }
        if draft.description.is_empty() {
            draft.description = saved.description.clone();
        }
        draft.category = draft.category.or(saved.category);
        draft.priority = draft.priority.or(saved.priority);
    }
}
