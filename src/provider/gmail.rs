//! # Gmail adapter
//!
//! Module dedicated to the flat-label variant of the provider
//! adapter. Gmail has no true parent/child link: the full logical
//! path goes into the label name, separators included, and the
//! hierarchy only exists as a display convention.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tracing::{debug, info};

use super::{
    api::{ApiError, LabelApi},
    join_path,
    retry::{with_retry, RetryPolicy},
    AccessToken, CreateOutcome, Error, FolderRef, Provider, ProviderAdapter, RemoteFolder,
    RemoteFolders, Result, DEFAULT_CALL_TIMEOUT,
};

/// The flat-label provider adapter.
pub struct GmailAdapter {
    api: Arc<dyn LabelApi>,
    token: AccessToken,
    policy: RetryPolicy,
    call_timeout: Duration,
}

impl GmailAdapter {
    pub fn new(api: Arc<dyn LabelApi>, token: AccessToken) -> Self {
        Self {
            api,
            token,
            policy: RetryPolicy::for_provider(Provider::Gmail),
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
}

#[async_trait]
impl ProviderAdapter for GmailAdapter {
    fn provider(&self) -> Provider {
        Provider::Gmail
    }

    async fn create_folder(
        &self,
        name: &str,
        parent: Option<&FolderRef>,
    ) -> Result<CreateOutcome> {
        let path = join_path(parent, name);

        info!("creating gmail label {path}");

        let outcome = with_retry(
            Provider::Gmail,
            "create label",
            &self.policy,
            self.call_timeout,
            || self.api.create_label(&self.token, &path),
        )
        .await;

        match outcome {
            Ok(label) => {
                debug!("created gmail label {path} as {}", label.id);
                Ok(CreateOutcome::Created(FolderRef::new(label.id, label.name)))
            }
            Err(ApiError::Conflict { existing_id }) => {
                info!("gmail label {path} already exists");
                Ok(CreateOutcome::AlreadyExists(
                    existing_id.map(|id| FolderRef::new(id, &path)),
                ))
            }
            Err(err) => Err(Error::from_api(
                Provider::Gmail,
                "create label",
                &self.policy,
                err,
            )),
        }
    }

    async fn list_folders(&self) -> Result<RemoteFolders> {
        debug!("listing gmail labels");

        let labels = with_retry(
            Provider::Gmail,
            "list labels",
            &self.policy,
            self.call_timeout,
            || self.api.list_labels(&self.token),
        )
        .await
        .map_err(|err| Error::from_api(Provider::Gmail, "list labels", &self.policy, err))?;

        let folders = labels
            .into_iter()
            .map(|label| {
                let folder = FolderRef::new(&label.id, &label.name);
                let name = folder.leaf_name().to_owned();
                RemoteFolder {
                    folder,
                    name,
                    color: label.color,
                }
            })
            .collect();

        Ok(folders)
    }

    async fn resolve_folder(
        &self,
        name: &str,
        parent: Option<&FolderRef>,
    ) -> Result<Option<FolderRef>> {
        let path = join_path(parent, name);

        debug!("resolving gmail label {path}");

        let folders = self.list_folders().await?;

        Ok(folders
            .into_iter()
            .find(|folder| folder.folder.path.eq_ignore_ascii_case(&path))
            .map(|folder| folder.folder))
    }
}
