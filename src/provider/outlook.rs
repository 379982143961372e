//! # Outlook adapter
//!
//! Module dedicated to the hierarchical-folder variant of the
//! provider adapter. Outlook exposes true parent/child identifiers,
//! so creations go through the resolved parent id and listings come
//! back flattened: this adapter reconstructs the full logical path of
//! every folder by walking parent chains.

use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use tracing::{debug, info};

use super::{
    api::{ApiError, MailFolderApi, RemoteMailFolder},
    join_path,
    retry::{with_retry, RetryPolicy},
    AccessToken, CreateOutcome, Error, FolderRef, Provider, ProviderAdapter, RemoteFolder,
    RemoteFolders, Result, DEFAULT_CALL_TIMEOUT,
};
use crate::schema::PATH_SEPARATOR;

/// The hierarchical-folder provider adapter.
pub struct OutlookAdapter {
    api: Arc<dyn MailFolderApi>,
    token: AccessToken,
    policy: RetryPolicy,
    call_timeout: Duration,
}

impl OutlookAdapter {
    pub fn new(api: Arc<dyn MailFolderApi>, token: AccessToken) -> Self {
        Self {
            api,
            token,
            policy: RetryPolicy::for_provider(Provider::Outlook),
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    async fn list_raw_folders(&self, operation: &str) -> Result<Vec<RemoteMailFolder>> {
        with_retry(
            Provider::Outlook,
            operation,
            &self.policy,
            self.call_timeout,
            || self.api.list_folders(&self.token),
        )
        .await
        .map_err(|err| Error::from_api(Provider::Outlook, operation, &self.policy, err))
    }
}

/// Rebuild the full logical path of one folder by walking its parent
/// chain. A parent missing from the listing (or a cyclic chain) stops
/// the walk, leaving the folder rooted at the last known segment.
fn logical_path(by_id: &HashMap<&str, &RemoteMailFolder>, folder: &RemoteMailFolder) -> String {
    let mut segments = vec![folder.display_name.as_str()];
    let mut parent_id = folder.parent_id.as_deref();

    while let Some(id) = parent_id {
        match by_id.get(id) {
            Some(parent) if segments.len() < by_id.len() => {
                segments.push(parent.display_name.as_str());
                parent_id = parent.parent_id.as_deref();
            }
            _ => break,
        }
    }

    segments.reverse();
    segments.join(&PATH_SEPARATOR.to_string())
}

#[async_trait]
impl ProviderAdapter for OutlookAdapter {
    fn provider(&self) -> Provider {
        Provider::Outlook
    }

    async fn create_folder(
        &self,
        name: &str,
        parent: Option<&FolderRef>,
    ) -> Result<CreateOutcome> {
        let path = join_path(parent, name);
        let parent_id = parent.map(|parent| parent.id.clone());

        info!("creating outlook folder {path}");

        let outcome = with_retry(
            Provider::Outlook,
            "create folder",
            &self.policy,
            self.call_timeout,
            || self.api.create_folder(&self.token, parent_id.as_deref(), name),
        )
        .await;

        match outcome {
            Ok(folder) => {
                debug!("created outlook folder {path} as {}", folder.id);
                Ok(CreateOutcome::Created(FolderRef::new(folder.id, &path)))
            }
            Err(ApiError::Conflict { existing_id }) => {
                info!("outlook folder {path} already exists");
                Ok(CreateOutcome::AlreadyExists(
                    existing_id.map(|id| FolderRef::new(id, &path)),
                ))
            }
            Err(err) => Err(Error::from_api(
                Provider::Outlook,
                "create folder",
                &self.policy,
                err,
            )),
        }
    }

    async fn list_folders(&self) -> Result<RemoteFolders> {
        debug!("listing outlook folders");

        let raw = self.list_raw_folders("list folders").await?;
        let by_id: HashMap<&str, &RemoteMailFolder> =
            raw.iter().map(|folder| (folder.id.as_str(), folder)).collect();

        let folders = raw
            .iter()
            .map(|folder| RemoteFolder {
                folder: FolderRef::new(&folder.id, logical_path(&by_id, folder)),
                name: folder.display_name.clone(),
                color: None,
            })
            .collect();

        Ok(folders)
    }

    async fn resolve_folder(
        &self,
        name: &str,
        parent: Option<&FolderRef>,
    ) -> Result<Option<FolderRef>> {
        debug!("resolving outlook folder {name} under {parent:?}");

        let raw = self.list_raw_folders("resolve folder").await?;
        let parent_id = parent.map(|parent| parent.id.as_str());

        Ok(raw
            .iter()
            .find(|folder| {
                folder.display_name.eq_ignore_ascii_case(name)
                    && folder.parent_id.as_deref() == parent_id
            })
            .map(|folder| FolderRef::new(&folder.id, join_path(parent, &folder.display_name))))
    }
}
