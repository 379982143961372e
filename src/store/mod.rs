//! # Folder store module
//!
//! Module dedicated to the local record of provisioned folders. The
//! main entities are [`FolderRecord`], one row per remote folder, and
//! the [`FolderStore`] capability trait.
//!
//! The store is a cache with explicit staleness marking, never an
//! authority: records are soft-deleted when a reconciliation pass no
//! longer observes them remotely, and never hard-deleted, so
//! historical routing decisions stay auditable.

mod error;

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

#[doc(inline)]
pub use self::error::{Error, Result};
use crate::{profile::BusinessProfileId, provider::Provider, schema::PATH_SEPARATOR};

/// Alias for the provider-assigned folder identifier.
pub type LabelId = String;

/// The folder record structure.
///
/// One record per remote folder, owned by a business profile. The
/// `(provider, label_id)` pair is unique.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FolderRecord {
    /// The provider-assigned identifier. Opaque: a short token for
    /// flat-label providers, a long GUID-like token for hierarchical
    /// ones.
    pub label_id: LabelId,

    /// The provider this record belongs to.
    pub provider: Provider,

    /// The business profile owning this record.
    pub business_profile_id: BusinessProfileId,

    /// The full logical path of the folder, provider truth at last
    /// sync.
    pub label_name: String,

    /// The optional folder color.
    #[serde(default)]
    pub color: Option<String>,

    /// When the folder was last confirmed present remotely.
    pub synced_at: DateTime<Utc>,

    /// Soft marker set when the last reconciliation could not find
    /// this identifier remotely.
    #[serde(default)]
    pub is_deleted: bool,
}

impl FolderRecord {
    pub fn new(
        provider: Provider,
        business_profile_id: impl ToString,
        label_id: impl ToString,
        label_name: impl ToString,
        synced_at: DateTime<Utc>,
    ) -> Self {
        Self {
            label_id: label_id.to_string(),
            provider,
            business_profile_id: business_profile_id.to_string(),
            label_name: label_name.to_string(),
            color: None,
            synced_at,
            is_deleted: false,
        }
    }

    /// Return the top-level segment of the recorded path.
    pub fn top_level_name(&self) -> &str {
        self.label_name
            .split(PATH_SEPARATOR)
            .next()
            .unwrap_or(&self.label_name)
    }

    /// Return the last segment of the recorded path.
    pub fn leaf_name(&self) -> &str {
        self.label_name
            .rsplit(PATH_SEPARATOR)
            .next()
            .unwrap_or(&self.label_name)
    }
}

/// The folder store capability.
///
/// The provisioning orchestrator and the reconciliation service are
/// the only writers. Writes are upserts keyed by `(provider,
/// label_id)`, so concurrent writers for the same identifier stay
/// safe by last-write-wins on `synced_at`.
#[async_trait]
pub trait FolderStore: Send + Sync {
    /// Insert or update the record matching `(provider, label_id)`.
    /// An update carrying an older `synced_at` than the stored one is
    /// discarded.
    async fn upsert_folder(&self, record: FolderRecord) -> Result<()>;

    /// Find the record matching the given provider and identifier.
    async fn find_folder(&self, provider: Provider, label_id: &str)
        -> Result<Option<FolderRecord>>;

    /// List every record of the given business profile, soft-deleted
    /// ones included.
    async fn list_folders(&self, business_profile_id: &str) -> Result<Vec<FolderRecord>>;

    /// Set the soft-delete marker on the record matching the given
    /// provider and identifier.
    async fn mark_folder_deleted(&self, provider: Provider, label_id: &str) -> Result<()>;
}

/// The in-memory reference implementation of the folder store.
///
/// Production deployments implement [`FolderStore`] over their own
/// persistence stack; this one backs the tests and small setups.
#[derive(Debug, Default)]
pub struct MemoryFolderStore {
    records: RwLock<HashMap<(Provider, LabelId), FolderRecord>>,
}

impl MemoryFolderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FolderStore for MemoryFolderStore {
    async fn upsert_folder(&self, record: FolderRecord) -> Result<()> {
        let mut records = self.records.write().await;
        let key = (record.provider, record.label_id.clone());

        match records.get(&key) {
            Some(existing) if existing.synced_at > record.synced_at => Ok(()),
            _ => {
                records.insert(key, record);
                Ok(())
            }
        }
    }

    async fn find_folder(
        &self,
        provider: Provider,
        label_id: &str,
    ) -> Result<Option<FolderRecord>> {
        let records = self.records.read().await;
        Ok(records.get(&(provider, label_id.to_owned())).cloned())
    }

    async fn list_folders(&self, business_profile_id: &str) -> Result<Vec<FolderRecord>> {
        let records = self.records.read().await;

        let mut records: Vec<FolderRecord> = records
            .values()
            .filter(|record| record.business_profile_id == business_profile_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.label_name.cmp(&b.label_name));

        Ok(records)
    }

    async fn mark_folder_deleted(&self, provider: Provider, label_id: &str) -> Result<()> {
        let mut records = self.records.write().await;

        match records.get_mut(&(provider, label_id.to_owned())) {
            Some(record) => {
                record.is_deleted = true;
                Ok(())
            }
            None => Err(Error::FindFolderRecordError(provider, label_id.to_owned())),
        }
    }
}
