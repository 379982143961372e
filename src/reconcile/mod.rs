//! # Reconciliation module
//!
//! Module dedicated to the reconciliation service, the mechanism that
//! keeps the local folder records truthful. The remote listing is the
//! authority: every observed folder is upserted (known ones
//! refreshed, unknown ones discovered, even when this system never
//! created them), and every known record no longer observed is
//! soft-deleted.
//!
//! Running a pass right before provisioning guarantees the
//! orchestrator's conflict handling is exercised deliberately rather
//! than accidentally.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use tracing::{debug, info};

use crate::{
    provider::ProviderAdapter,
    store::{FolderRecord, FolderStore},
    Result,
};

/// The reconciliation report.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    /// The paths of remote folders that had no record yet.
    pub discovered: Vec<String>,

    /// The paths of remote folders whose record has been refreshed.
    pub refreshed: Vec<String>,

    /// The paths of records soft-deleted because their identifier was
    /// absent from the remote listing.
    pub soft_deleted: Vec<String>,
}

/// Refresh the local records of the given business profile against
/// the observed remote state.
pub async fn reconcile(
    adapter: &dyn ProviderAdapter,
    store: &dyn FolderStore,
    business_profile_id: &str,
) -> Result<ReconcileReport> {
    let provider = adapter.provider();

    info!("reconciling {provider} folder records of profile {business_profile_id}");

    let remote = adapter.list_folders().await?;

    let records = store.list_folders(business_profile_id).await?;
    let known: HashMap<&str, &FolderRecord> = records
        .iter()
        .filter(|record| record.provider == provider)
        .map(|record| (record.label_id.as_str(), record))
        .collect();

    let now = Utc::now();
    let mut report = ReconcileReport::default();
    let mut seen: HashSet<&str> = HashSet::new();

    for folder in remote.iter() {
        let id = folder.folder.id.as_str();
        let path = folder.folder.path.clone();
        let previously_known = known.contains_key(id);

        let mut record =
            FolderRecord::new(provider, business_profile_id, id, &path, now);
        record.color = folder.color.clone();
        store.upsert_folder(record).await?;

        if previously_known {
            report.refreshed.push(path);
        } else {
            debug!("discovered remote folder {path} with no local record");
            report.discovered.push(path);
        }
    }

    seen.extend(remote.iter().map(|folder| folder.folder.id.as_str()));

    for (id, record) in known {
        if !record.is_deleted && !seen.contains(id) {
            debug!("folder {} ({id}) no longer observed remotely", record.label_name);
            store.mark_folder_deleted(provider, id).await?;
            report.soft_deleted.push(record.label_name.clone());
        }
    }

    info!(
        "reconciliation done: {} discovered, {} refreshed, {} soft-deleted",
        report.discovered.len(),
        report.refreshed.len(),
        report.soft_deleted.len(),
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use super::*;
    use crate::{
        provider::{CreateOutcome, FolderRef, Provider, RemoteFolder, RemoteFolders},
        store::MemoryFolderStore,
    };

    /// A canned remote listing.
    struct StaticAdapter(Mutex<Vec<(String, String)>>);

    impl StaticAdapter {
        fn new(folders: &[(&str, &str)]) -> Arc<Self> {
            let folders = folders
                .iter()
                .map(|(id, path)| (id.to_string(), path.to_string()))
                .collect();
            Arc::new(Self(Mutex::new(folders)))
        }
    }

    #[async_trait]
    impl ProviderAdapter for StaticAdapter {
        fn provider(&self) -> Provider {
            Provider::Gmail
        }

        async fn create_folder(
            &self,
            _name: &str,
            _parent: Option<&FolderRef>,
        ) -> crate::provider::Result<CreateOutcome> {
            unreachable!("reconciliation never creates folders")
        }

        async fn list_folders(&self) -> crate::provider::Result<RemoteFolders> {
            let folders = self.0.lock().await;
            Ok(folders
                .iter()
                .map(|(id, path)| {
                    let folder = FolderRef::new(id, path);
                    let name = folder.leaf_name().to_owned();
                    RemoteFolder {
                        folder,
                        name,
                        color: None,
                    }
                })
                .collect())
        }

        async fn resolve_folder(
            &self,
            _name: &str,
            _parent: Option<&FolderRef>,
        ) -> crate::provider::Result<Option<FolderRef>> {
            Ok(None)
        }
    }

    #[test_log::test(tokio::test)]
    async fn reconciliation_converges_on_remote_state() {
        let store = MemoryFolderStore::new();

        // a record the remote no longer has
        store
            .upsert_folder(FolderRecord::new(
                Provider::Gmail,
                "profile-1",
                "Label_gone",
                "PROMOTIONS",
                Utc::now(),
            ))
            .await
            .unwrap();

        let adapter = StaticAdapter::new(&[
            ("Label_1", "SALES"),
            ("Label_2", "SALES/Quotes"),
            ("Label_3", "MISC"),
        ]);

        let report = reconcile(adapter.as_ref(), &store, "profile-1")
            .await
            .unwrap();

        assert_eq!(report.discovered.len(), 3);
        assert!(report.refreshed.is_empty());
        assert_eq!(report.soft_deleted, ["PROMOTIONS"]);

        let records = store.list_folders("profile-1").await.unwrap();
        assert_eq!(records.len(), 4);

        let misc = records.iter().find(|r| r.label_name == "MISC").unwrap();
        assert!(!misc.is_deleted);

        let gone = records.iter().find(|r| r.label_id == "Label_gone").unwrap();
        assert!(gone.is_deleted);
    }

    #[test_log::test(tokio::test)]
    async fn second_pass_refreshes_instead_of_discovering() {
        let store = MemoryFolderStore::new();
        let adapter = StaticAdapter::new(&[("Label_1", "SALES")]);

        reconcile(adapter.as_ref(), &store, "profile-1").await.unwrap();
        let report = reconcile(adapter.as_ref(), &store, "profile-1")
            .await
            .unwrap();

        assert!(report.discovered.is_empty());
        assert_eq!(report.refreshed, ["SALES"]);
        assert!(report.soft_deleted.is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn rediscovered_folders_are_undeleted() {
        let store = MemoryFolderStore::new();

        let mut record = FolderRecord::new(
            Provider::Gmail,
            "profile-1",
            "Label_1",
            "SALES",
            Utc::now(),
        );
        record.is_deleted = true;
        store.upsert_folder(record).await.unwrap();

        let adapter = StaticAdapter::new(&[("Label_1", "SALES")]);
        let report = reconcile(adapter.as_ref(), &store, "profile-1")
            .await
            .unwrap();

        assert_eq!(report.refreshed, ["SALES"]);

        let records = store.list_folders("profile-1").await.unwrap();
        assert!(!records[0].is_deleted);
    }
}
