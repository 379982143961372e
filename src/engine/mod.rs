//! # Engine module
//!
//! Module dedicated to the taxonomy engine, the exposed surface of
//! the library. The main structures are the [`TaxonomyEngineBuilder`]
//! which wires the collaborator capabilities together, and the
//! [`TaxonomyEngine`] which exposes the four operations consumed by
//! the onboarding UI and the workflow engine.
//!
//! Per profile, provisioning and reconciliation form a single logical
//! unit of work: every operation takes the profile's async lock, so
//! two phases never interleave for a given tenant while different
//! tenants proceed in parallel with no coordination.

mod error;

use std::{collections::HashMap, sync::Arc, time::Duration};

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

#[doc(inline)]
pub use self::error::{Error, Result};
use crate::{
    coverage::{self, CoverageReport, ExpectedCategories},
    profile::{BusinessProfile, ProfileSource},
    provider::{
        api::{LabelApi, MailFolderApi},
        GmailAdapter, OutlookAdapter, Provider, ProviderAdapter, RetryPolicy, TokenSource,
        DEFAULT_CALL_TIMEOUT,
    },
    provision::{ProvisionReport, Provisioner, DEFAULT_POOL_SIZE},
    reconcile,
    routing::{self, RoutingConfig, RoutingTable},
    schema,
    store::{FolderRecord, FolderStore},
};

/// The health report of one business profile.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct HealthReport {
    /// The share of the resolved folder tree backed by a non-deleted
    /// record, in percent.
    pub folder_health_percentage: f64,

    /// The classifier coverage of the recorded folders.
    pub classifier_coverage: CoverageReport,
}

/// The taxonomy engine builder.
#[derive(Default)]
pub struct TaxonomyEngineBuilder {
    store: Option<Arc<dyn FolderStore>>,
    token_source: Option<Arc<dyn TokenSource>>,
    profile_source: Option<Arc<dyn ProfileSource>>,
    label_api: Option<Arc<dyn LabelApi>>,
    mail_folder_api: Option<Arc<dyn MailFolderApi>>,
    pool_size: Option<usize>,
    call_timeout: Option<Duration>,
    retry_policies: HashMap<Provider, RetryPolicy>,
    routing_config: Option<RoutingConfig>,
}

impl TaxonomyEngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_folder_store(mut self, store: Arc<dyn FolderStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_token_source(mut self, token_source: Arc<dyn TokenSource>) -> Self {
        self.token_source = Some(token_source);
        self
    }

    pub fn with_profile_source(mut self, profile_source: Arc<dyn ProfileSource>) -> Self {
        self.profile_source = Some(profile_source);
        self
    }

    pub fn with_label_api(mut self, api: Arc<dyn LabelApi>) -> Self {
        self.label_api = Some(api);
        self
    }

    pub fn with_mail_folder_api(mut self, api: Arc<dyn MailFolderApi>) -> Self {
        self.mail_folder_api = Some(api);
        self
    }

    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = Some(pool_size);
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    /// Override the default retry policy of the given provider.
    pub fn with_retry_policy(mut self, provider: Provider, policy: RetryPolicy) -> Self {
        self.retry_policies.insert(provider, policy);
        self
    }

    pub fn with_routing_config(mut self, config: RoutingConfig) -> Self {
        self.routing_config = Some(config);
        self
    }

    /// Build the taxonomy engine.
    pub fn build(self) -> Result<TaxonomyEngine> {
        Ok(TaxonomyEngine {
            store: self.store.ok_or(Error::BuildEngineMissingStoreError)?,
            token_source: self
                .token_source
                .ok_or(Error::BuildEngineMissingTokenSourceError)?,
            profile_source: self
                .profile_source
                .ok_or(Error::BuildEngineMissingProfileSourceError)?,
            label_api: self.label_api,
            mail_folder_api: self.mail_folder_api,
            pool_size: self.pool_size.unwrap_or(DEFAULT_POOL_SIZE),
            call_timeout: self.call_timeout.unwrap_or(DEFAULT_CALL_TIMEOUT),
            retry_policies: self.retry_policies,
            routing_config: self.routing_config.unwrap_or_default(),
            locks: Mutex::new(HashMap::new()),
        })
    }
}

/// The taxonomy engine.
pub struct TaxonomyEngine {
    store: Arc<dyn FolderStore>,
    token_source: Arc<dyn TokenSource>,
    profile_source: Arc<dyn ProfileSource>,
    label_api: Option<Arc<dyn LabelApi>>,
    mail_folder_api: Option<Arc<dyn MailFolderApi>>,
    pool_size: usize,
    call_timeout: Duration,
    retry_policies: HashMap<Provider, RetryPolicy>,
    routing_config: RoutingConfig,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl TaxonomyEngine {
    /// Return the async lock of the given profile, creating it on
    /// first use.
    async fn profile_lock(&self, business_profile_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(business_profile_id.to_owned())
            .or_default()
            .clone()
    }

    /// Build the adapter matching the profile's provider.
    ///
    /// This is the only place the provider enum is matched: callers
    /// never branch on the provider again.
    async fn adapter(&self, profile: &BusinessProfile) -> crate::Result<Arc<dyn ProviderAdapter>> {
        let token = self
            .token_source
            .access_token(&profile.id, profile.provider)
            .await?;

        let policy = self.retry_policies.get(&profile.provider).copied();

        let adapter: Arc<dyn ProviderAdapter> = match profile.provider {
            Provider::Gmail => {
                let api = self
                    .label_api
                    .clone()
                    .ok_or(Error::MissingApiClientError(Provider::Gmail))?;
                let mut adapter =
                    GmailAdapter::new(api, token).with_call_timeout(self.call_timeout);
                if let Some(policy) = policy {
                    adapter = adapter.with_retry_policy(policy);
                }
                Arc::new(adapter)
            }
            Provider::Outlook => {
                let api = self
                    .mail_folder_api
                    .clone()
                    .ok_or(Error::MissingApiClientError(Provider::Outlook))?;
                let mut adapter =
                    OutlookAdapter::new(api, token).with_call_timeout(self.call_timeout);
                if let Some(policy) = policy {
                    adapter = adapter.with_retry_policy(policy);
                }
                Arc::new(adapter)
            }
        };

        Ok(adapter)
    }

    fn provisioner(&self, adapter: Arc<dyn ProviderAdapter>, profile_id: &str) -> Provisioner {
        Provisioner::new(adapter, self.store.clone(), profile_id)
            .with_pool_size(self.pool_size)
    }

    /// Provision the core folder skeleton of the given business type.
    ///
    /// Phase A of the two-phase orchestration: the tree is resolved
    /// with no team or supplier data, dynamic nodes limited to the
    /// always-present `Unassigned`.
    pub async fn provision_skeleton(
        &self,
        business_profile_id: &str,
        business_type: &str,
    ) -> crate::Result<ProvisionReport> {
        let lock = self.profile_lock(business_profile_id).await;
        let _guard = lock.lock().await;

        info!("provisioning {business_type} skeleton for profile {business_profile_id}");

        let tree = schema::resolve(&[business_type.to_owned()], &[], &[])?;
        let profile = self.profile_source.business_profile(business_profile_id).await?;
        let adapter = self.adapter(&profile).await?;

        reconcile::reconcile(adapter.as_ref(), self.store.as_ref(), &profile.id).await?;

        let report = self.provisioner(adapter, &profile.id).provision(&tree).await?;

        Ok(report)
    }

    /// Provision the dynamic team and supplier folders of the given
    /// profile.
    ///
    /// Phase B of the two-phase orchestration: the tree is
    /// re-resolved with the current team/supplier data and only the
    /// newly-introduced nodes are created, everything else is left
    /// untouched.
    pub async fn inject_team_folders(
        &self,
        business_profile_id: &str,
    ) -> crate::Result<ProvisionReport> {
        let lock = self.profile_lock(business_profile_id).await;
        let _guard = lock.lock().await;

        info!("injecting team folders for profile {business_profile_id}");

        let profile = self.profile_source.business_profile(business_profile_id).await?;
        let tree = schema::resolve(
            &profile.business_types,
            &profile.team_members,
            &profile.suppliers,
        )?;
        let adapter = self.adapter(&profile).await?;

        reconcile::reconcile(adapter.as_ref(), self.store.as_ref(), &profile.id).await?;

        let report = self.provisioner(adapter, &profile.id).provision(&tree).await?;

        Ok(report)
    }

    /// Measure the folder health and classifier coverage of the given
    /// profile.
    pub async fn check_health(&self, business_profile_id: &str) -> crate::Result<HealthReport> {
        let lock = self.profile_lock(business_profile_id).await;
        let _guard = lock.lock().await;

        info!("checking folder health of profile {business_profile_id}");

        let profile = self.profile_source.business_profile(business_profile_id).await?;
        let tree = schema::resolve(
            &profile.business_types,
            &profile.team_members,
            &profile.suppliers,
        )?;
        let adapter = self.adapter(&profile).await?;

        reconcile::reconcile(adapter.as_ref(), self.store.as_ref(), &profile.id).await?;

        let records = self.store.list_folders(&profile.id).await?;
        let active: Vec<&FolderRecord> = records
            .iter()
            .filter(|record| !record.is_deleted && record.provider == profile.provider)
            .collect();

        let paths = tree.paths();
        let provisioned = paths
            .iter()
            .filter(|path| {
                active
                    .iter()
                    .any(|record| record.label_name.eq_ignore_ascii_case(path))
            })
            .count();
        let folder_health_percentage = if paths.is_empty() {
            100.0
        } else {
            provisioned as f64 * 100.0 / paths.len() as f64
        };

        let expected = ExpectedCategories::from_tree(&tree);
        let classifier_coverage = coverage::validate(&records, &expected);

        debug!(
            "profile {business_profile_id}: {provisioned}/{} specs provisioned, {}% coverage",
            paths.len(),
            classifier_coverage.coverage_percentage,
        );

        Ok(HealthReport {
            folder_health_percentage,
            classifier_coverage,
        })
    }

    /// Build the routing table of the given profile.
    ///
    /// The table is projected from reconciled records, so its keys
    /// stay stable across runs as long as folder names are unchanged.
    pub async fn build_routing_table(
        &self,
        business_profile_id: &str,
    ) -> crate::Result<RoutingTable> {
        let lock = self.profile_lock(business_profile_id).await;
        let _guard = lock.lock().await;

        info!("building routing table of profile {business_profile_id}");

        let profile = self.profile_source.business_profile(business_profile_id).await?;
        let adapter = self.adapter(&profile).await?;

        reconcile::reconcile(adapter.as_ref(), self.store.as_ref(), &profile.id).await?;

        let records = self.store.list_folders(&profile.id).await?;
        let table = routing::build(&profile.id, profile.provider, &records, &self.routing_config)?;

        Ok(table)
    }
}
