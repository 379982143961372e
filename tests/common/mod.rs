//! Shared fixtures of the integration tests: in-memory wire APIs with
//! failure injection, plus static token and profile sources.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use taxonomy::{
    engine::{TaxonomyEngine, TaxonomyEngineBuilder},
    profile::{BusinessProfile, ProfileSource},
    provider::{
        api::{ApiError, ApiResult, LabelApi, MailFolderApi, RemoteLabel, RemoteMailFolder},
        AccessToken, Provider, RetryPolicy, TokenSource,
    },
    store::MemoryFolderStore,
};
use tokio::sync::Mutex;

/// A flat-label wire API backed by a vector.
#[derive(Default)]
pub struct FakeLabelApi {
    labels: Mutex<Vec<RemoteLabel>>,
    next_id: AtomicUsize,
    hide_conflict_ids: AtomicBool,
    reject_tokens: AtomicBool,
    fail_creates: Mutex<HashMap<String, ApiError>>,
    create_calls: AtomicUsize,
}

impl FakeLabelApi {
    pub fn new() -> Arc<Self> {
        Arc::default()
    }

    /// Pre-create a label, as if the user made it by hand before
    /// onboarding. Returns its identifier.
    pub async fn seed(&self, name: &str) -> String {
        let id = format!("Label_{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.labels.lock().await.push(RemoteLabel {
            id: id.clone(),
            name: name.to_owned(),
            color: None,
        });
        id
    }

    /// Delete a label remotely, as if the user removed it from their
    /// mailbox.
    pub async fn remove(&self, name: &str) {
        self.labels
            .lock()
            .await
            .retain(|label| !label.name.eq_ignore_ascii_case(name));
    }

    pub async fn labels(&self) -> Vec<RemoteLabel> {
        self.labels.lock().await.clone()
    }

    /// Make conflict responses omit the existing identifier, forcing
    /// callers through the resolve-by-name path.
    pub fn hide_conflict_ids(&self) {
        self.hide_conflict_ids.store(true, Ordering::SeqCst);
    }

    /// Reject every call with an auth error.
    pub fn reject_tokens(&self) {
        self.reject_tokens.store(true, Ordering::SeqCst);
    }

    /// Make creations of the given name keep failing transiently.
    pub async fn fail_create(&self, name: &str, err: ApiError) {
        self.fail_creates.lock().await.insert(name.to_owned(), err);
    }

    /// Lift every injected creation failure.
    pub async fn clear_failures(&self) {
        self.fail_creates.lock().await.clear();
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    fn check_token(&self) -> ApiResult<()> {
        if self.reject_tokens.load(Ordering::SeqCst) {
            Err(ApiError::Auth("token expired".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl LabelApi for FakeLabelApi {
    async fn create_label(&self, _token: &AccessToken, name: &str) -> ApiResult<RemoteLabel> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.check_token()?;

        if let Some(err) = self.fail_creates.lock().await.get(name) {
            return Err(err.clone());
        }

        let mut labels = self.labels.lock().await;

        if let Some(existing) = labels.iter().find(|l| l.name.eq_ignore_ascii_case(name)) {
            let existing_id = if self.hide_conflict_ids.load(Ordering::SeqCst) {
                None
            } else {
                Some(existing.id.clone())
            };
            return Err(ApiError::Conflict { existing_id });
        }

        let label = RemoteLabel {
            id: format!("Label_{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
            name: name.to_owned(),
            color: None,
        };
        labels.push(label.clone());

        Ok(label)
    }

    async fn list_labels(&self, _token: &AccessToken) -> ApiResult<Vec<RemoteLabel>> {
        self.check_token()?;
        Ok(self.labels.lock().await.clone())
    }
}

/// A hierarchical-folder wire API backed by a vector.
#[derive(Default)]
pub struct FakeMailFolderApi {
    folders: Mutex<Vec<RemoteMailFolder>>,
    next_id: AtomicUsize,
    reject_tokens: AtomicBool,
}

impl FakeMailFolderApi {
    pub fn new() -> Arc<Self> {
        Arc::default()
    }

    pub async fn folders(&self) -> Vec<RemoteMailFolder> {
        self.folders.lock().await.clone()
    }

    pub fn reject_tokens(&self) {
        self.reject_tokens.store(true, Ordering::SeqCst);
    }

    fn check_token(&self) -> ApiResult<()> {
        if self.reject_tokens.load(Ordering::SeqCst) {
            Err(ApiError::Auth("token expired".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl MailFolderApi for FakeMailFolderApi {
    async fn create_folder(
        &self,
        _token: &AccessToken,
        parent_id: Option<&str>,
        display_name: &str,
    ) -> ApiResult<RemoteMailFolder> {
        self.check_token()?;

        let mut folders = self.folders.lock().await;

        let duplicate = folders.iter().find(|f| {
            f.display_name.eq_ignore_ascii_case(display_name)
                && f.parent_id.as_deref() == parent_id
        });
        if let Some(existing) = duplicate {
            return Err(ApiError::Conflict {
                existing_id: Some(existing.id.clone()),
            });
        }

        let folder = RemoteMailFolder {
            id: format!(
                "AAMkAD{:08}AAA=",
                self.next_id.fetch_add(1, Ordering::SeqCst) + 1
            ),
            display_name: display_name.to_owned(),
            parent_id: parent_id.map(ToOwned::to_owned),
        };
        folders.push(folder.clone());

        Ok(folder)
    }

    async fn list_folders(&self, _token: &AccessToken) -> ApiResult<Vec<RemoteMailFolder>> {
        self.check_token()?;
        Ok(self.folders.lock().await.clone())
    }
}

/// A token source handing out the same static bearer.
pub struct StaticTokenSource;

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn access_token(
        &self,
        _business_profile_id: &str,
        _provider: Provider,
    ) -> taxonomy::Result<AccessToken> {
        Ok(AccessToken::new("test-token"))
    }
}

/// A profile source backed by a map, updatable mid-test to simulate
/// the tenant saving team or supplier data.
#[derive(Default)]
pub struct StaticProfileSource {
    profiles: Mutex<HashMap<String, BusinessProfile>>,
}

impl StaticProfileSource {
    pub fn new() -> Arc<Self> {
        Arc::default()
    }

    pub async fn save(&self, profile: BusinessProfile) {
        self.profiles.lock().await.insert(profile.id.clone(), profile);
    }
}

#[async_trait]
impl ProfileSource for StaticProfileSource {
    async fn business_profile(&self, id: &str) -> taxonomy::Result<BusinessProfile> {
        let profiles = self.profiles.lock().await;
        Ok(profiles.get(id).expect("unknown business profile").clone())
    }
}

/// A retry policy short enough for failure-injection tests.
pub fn fast_retries() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 2,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(2),
    }
}

pub fn gmail_engine(
    api: Arc<FakeLabelApi>,
    store: Arc<MemoryFolderStore>,
    profiles: Arc<StaticProfileSource>,
) -> TaxonomyEngine {
    TaxonomyEngineBuilder::new()
        .with_folder_store(store)
        .with_token_source(Arc::new(StaticTokenSource))
        .with_profile_source(profiles)
        .with_label_api(api)
        .with_retry_policy(Provider::Gmail, fast_retries())
        .build()
        .expect("cannot build taxonomy engine")
}

pub fn outlook_engine(
    api: Arc<FakeMailFolderApi>,
    store: Arc<MemoryFolderStore>,
    profiles: Arc<StaticProfileSource>,
) -> TaxonomyEngine {
    TaxonomyEngineBuilder::new()
        .with_folder_store(store)
        .with_token_source(Arc::new(StaticTokenSource))
        .with_profile_source(profiles)
        .with_mail_folder_api(api)
        .with_retry_policy(Provider::Outlook, fast_retries())
        .build()
        .expect("cannot build taxonomy engine")
}
