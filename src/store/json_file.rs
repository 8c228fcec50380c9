//! File-backed store: one directory per user holding `projects.json` and
//! `ledger.json`.

use std::fs;
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{
    next_project_id, sort_newest_first, LedgerStore, ProjectDraft, ProjectStore, SavedProject, StoreConfig,
    StoreError,
};
use crate::ledger::FundLedger;

const PROJECTS_FILE: &str = "projects.json";
const LEDGER_FILE: &str = "ledger.json";

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    config: StoreConfig,
}

impl JsonFileStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn projects_path(&self) -> PathBuf {
        self.config.user_dir().join(PROJECTS_FILE)
    }

    fn ledger_path(&self) -> PathBuf {
        self.config.user_dir().join(LEDGER_FILE)
    }

    fn read_projects(&self) -> Result<Vec<SavedProject>, StoreError> {
        Ok(read_document(&self.projects_path())?.unwrap_or_default())
    }

    fn write_projects(&self, projects: &[SavedProject]) -> Result<(), StoreError> {
        write_document(&self.projects_path(), projects)
    }
}

/// `Ok(None)` when the file does not exist yet
fn read_document<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let file = match fs::File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("{} not found, starting empty", path.display());
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_reader(BufReader::new(file))?))
}

/// Write via a temp file and rename so a failed write keeps the old document
fn write_document<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_vec_pretty(value)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

impl ProjectStore for JsonFileStore {
    fn save(&mut self, draft: &ProjectDraft) -> Result<SavedProject, StoreError> {
        let mut projects = self.read_projects()?;
        let id = next_project_id(&projects);
        let doc = SavedProject::from_draft(draft, id, &self.config, Utc::now())?;
        projects.push(doc.clone());
        self.write_projects(&projects)?;

        info!(
            "Saved project {id} ({}) to {}",
            doc.project_name(),
            self.projects_path().display()
        );
        Ok(doc)
    }

    fn list(&self) -> Result<Vec<SavedProject>, StoreError> {
        let mut projects = self.read_projects()?;
        sort_newest_first(&mut projects);
        Ok(projects)
    }

    fn delete(&mut self, id: u64) -> Result<(), StoreError> {
        let mut projects = self.read_projects()?;
        let before = projects.len();
        projects.retain(|p| p.id != id);
        if projects.len() == before {
            return Err(StoreError::NotFound(id));
        }
        self.write_projects(&projects)?;
        info!("Deleted project {id}");
        Ok(())
    }
}

impl LedgerStore for JsonFileStore {
    fn load_ledger(&self) -> Result<FundLedger, StoreError> {
        Ok(read_document(&self.ledger_path())?.unwrap_or_default())
    }

    fn save_ledger(&mut self, ledger: &FundLedger) -> Result<(), StoreError> {
        write_document(&self.ledger_path(), ledger)?;
        info!("Saved fund ledger to {}", self.ledger_path().display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ProjectParameters, YearMonth};
    use crate::projection::{OverrideField, OverrideMap, ProjectionEngine};

    fn temp_root(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("lease_roi_store_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_projects_persist_across_instances() {
        let root = temp_root("projects");
        let config = StoreConfig::new(&root, "alice");

        let parameters = ProjectParameters::default();
        let mut overrides = OverrideMap::new();
        overrides.apply(0, OverrideField::Expense, "9000");
        let result = ProjectionEngine::default().project(&parameters, &overrides);

        let mut store = JsonFileStore::new(config.clone());
        let saved = store.save(&ProjectDraft::new(parameters.clone(), overrides.clone(), &result)).unwrap();
        assert!(root.join("alice").join(PROJECTS_FILE).exists());

        let reopened = JsonFileStore::new(config);
        let loaded = reopened.get(saved.id).unwrap();
        let (restored_params, restored_overrides) = loaded.restore();
        assert_eq!(restored_params, parameters);
        assert_eq!(restored_overrides, overrides);
        assert_eq!(loaded.summary, result.summary());

        // Other users see nothing
        let bob = JsonFileStore::new(StoreConfig::new(&root, "bob"));
        assert!(bob.list().unwrap().is_empty());

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_ledger_persists() {
        let root = temp_root("ledger");
        let mut store = JsonFileStore::new(StoreConfig::new(&root, "carol"));
        assert_eq!(store.load_ledger().unwrap(), FundLedger::new());

        let mut ledger = FundLedger::new();
        ledger.set_initial_capital(10_000.0);
        ledger.add_entry(YearMonth::default(), 500.0, 200.0);
        ledger.add_bucket("Reserve", 25.0).unwrap();
        store.save_ledger(&ledger).unwrap();

        let loaded = JsonFileStore::new(StoreConfig::new(&root, "carol")).load_ledger().unwrap();
        assert_eq!(loaded, ledger);

        let _ = fs::remove_dir_all(&root);
    }
}
