//! Project persistence
//!
//! Saved projects are user-scoped documents holding the flattened parameter
//! fields, the override map serialized as a JSON string, and the headline
//! figures for listings. Stores are constructed from an explicit
//! [`StoreConfig`]; the projection engine never touches them.

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ledger::FundLedger;
use crate::params::{ProjectParameters, RawParameters};
use crate::projection::{OverrideMap, ProjectionResult, ProjectionSummary};

pub const DEFAULT_STORE_DIR: &str = ".lease_roi";
pub const DEFAULT_USER_ID: &str = "local";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("no saved project with id {0}")]
    NotFound(u64),
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed store document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where and as whom projects are persisted
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    pub root: PathBuf,
    pub user_id: String,
    /// Display name recorded on saved projects; falls back to the user id
    pub author_name: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_STORE_DIR),
            user_id: DEFAULT_USER_ID.to_string(),
            author_name: None,
        }
    }
}

impl StoreConfig {
    pub fn new(root: impl Into<PathBuf>, user_id: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            user_id: user_id.into(),
            author_name: None,
        }
    }

    pub fn with_author(mut self, author_name: impl Into<String>) -> Self {
        self.author_name = Some(author_name.into());
        self
    }

    pub fn author(&self) -> &str {
        self.author_name.as_deref().unwrap_or(&self.user_id)
    }

    /// Per-user directory; the user id is reduced to a safe path component
    pub fn user_dir(&self) -> PathBuf {
        let safe: String = self
            .user_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        let safe = if safe.is_empty() { DEFAULT_USER_ID.to_string() } else { safe };
        self.root.join(safe)
    }
}

/// What the caller hands to [`ProjectStore::save`]
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDraft {
    pub parameters: ProjectParameters,
    pub overrides: OverrideMap,
    pub summary: ProjectionSummary,
}

impl ProjectDraft {
    pub fn new(parameters: ProjectParameters, overrides: OverrideMap, result: &ProjectionResult) -> Self {
        Self {
            parameters,
            overrides,
            summary: result.summary(),
        }
    }
}

/// A stored project document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedProject {
    pub id: u64,
    pub user_id: String,
    pub author_name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_overrides: Option<String>,
    #[serde(default)]
    pub summary: ProjectionSummary,
    #[serde(flatten)]
    pub parameters: RawParameters,
}

impl SavedProject {
    /// Build the document for a draft; the store supplies identity fields
    pub fn from_draft(
        draft: &ProjectDraft,
        id: u64,
        config: &StoreConfig,
        created_at: DateTime<Utc>,
    ) -> Result<Self, StoreError> {
        let monthly_overrides = if draft.overrides.is_empty() {
            None
        } else {
            Some(draft.overrides.to_json_string()?)
        };
        Ok(Self {
            id,
            user_id: config.user_id.clone(),
            author_name: config.author().to_string(),
            created_at,
            monthly_overrides,
            summary: draft.summary,
            parameters: RawParameters::from(&draft.parameters),
        })
    }

    pub fn project_name(&self) -> &str {
        self.parameters.project_name.as_deref().unwrap_or("")
    }

    pub fn has_overrides(&self) -> bool {
        self.monthly_overrides.as_deref().is_some_and(|s| !s.trim().is_empty())
    }

    /// Re-hydrate parameters and overrides for editing.
    ///
    /// Store-assigned fields are dropped. Overrides that fail to decode come
    /// back empty.
    pub fn restore(&self) -> (ProjectParameters, OverrideMap) {
        let parameters = self.parameters.sanitize();
        let overrides = match self.monthly_overrides.as_deref() {
            Some(raw) if !raw.trim().is_empty() => OverrideMap::from_json_str(raw).unwrap_or_else(|e| {
                warn!("project {}: discarding undecodable overrides: {e}", self.id);
                OverrideMap::new()
            }),
            _ => OverrideMap::new(),
        };
        (parameters, overrides)
    }
}

/// Newest first; equal timestamps fall back to the larger id
pub(crate) fn sort_newest_first(projects: &mut [SavedProject]) {
    projects.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

pub(crate) fn next_project_id(projects: &[SavedProject]) -> u64 {
    projects.iter().map(|p| p.id).max().unwrap_or(0) + 1
}

/// User-scoped project collection
pub trait ProjectStore {
    fn save(&mut self, draft: &ProjectDraft) -> Result<SavedProject, StoreError>;

    /// All of the user's projects, newest first
    fn list(&self) -> Result<Vec<SavedProject>, StoreError>;

    fn get(&self, id: u64) -> Result<SavedProject, StoreError> {
        self.list()?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    fn delete(&mut self, id: u64) -> Result<(), StoreError>;
}

/// Per-user fund ledger document
pub trait LedgerStore {
    /// The stored ledger, or an empty one if none was saved yet
    fn load_ledger(&self) -> Result<FundLedger, StoreError>;

    fn save_ledger(&mut self, ledger: &FundLedger) -> Result<(), StoreError>;
}
