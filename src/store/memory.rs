//! In-process store for tests and embedding

use chrono::Utc;
use log::info;

use super::{
    next_project_id, sort_newest_first, LedgerStore, ProjectDraft, ProjectStore, SavedProject, StoreConfig,
    StoreError,
};
use crate::ledger::FundLedger;

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    config: StoreConfig,
    projects: Vec<SavedProject>,
    ledger: Option<FundLedger>,
}

impl MemoryStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            projects: Vec::new(),
            ledger: None,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }
}

impl ProjectStore for MemoryStore {
    fn save(&mut self, draft: &ProjectDraft) -> Result<SavedProject, StoreError> {
        let id = next_project_id(&self.projects);
        let doc = SavedProject::from_draft(draft, id, &self.config, Utc::now())?;
        self.projects.push(doc.clone());
        info!("Saved project {id} ({})", doc.project_name());
        Ok(doc)
    }

    fn list(&self) -> Result<Vec<SavedProject>, StoreError> {
        let mut projects = self.projects.clone();
        sort_newest_first(&mut projects);
        Ok(projects)
    }

    fn delete(&mut self, id: u64) -> Result<(), StoreError> {
        let before = self.projects.len();
        self.projects.retain(|p| p.id != id);
        if self.projects.len() == before {
            return Err(StoreError::NotFound(id));
        }
        info!("Deleted project {id}");
        Ok(())
    }
}

impl LedgerStore for MemoryStore {
    fn load_ledger(&self) -> Result<FundLedger, StoreError> {
        Ok(self.ledger.clone().unwrap_or_default())
    }

    fn save_ledger(&mut self, ledger: &FundLedger) -> Result<(), StoreError> {
        self.ledger = Some(ledger.clone());
        Ok(())
    }
}
