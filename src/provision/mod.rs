//! # Provisioning module
//!
//! Module dedicated to the provisioning orchestrator. The main
//! structure is the [`Provisioner`], which walks the branches of a
//! resolved folder tree and ensures every spec exists remotely.
//!
//! Branches are independent and processed concurrently, bounded by a
//! small pool to respect provider rate limits. Nodes within a branch
//! run sequentially, parents first. Every operation is
//! create-or-resolve, never create-or-fail, so a run can be repeated
//! at any time.

mod error;
pub mod plan;
mod report;

use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use futures::{stream, StreamExt, TryStreamExt};
use tracing::{debug, info, warn};

#[doc(inline)]
pub use self::{
    error::{Error, Result},
    plan::{build_plan, PlannedAction, PlannedNode},
    report::ProvisionReport,
};
use crate::{
    provider::{CreateOutcome, FolderRef, ProviderAdapter},
    schema::FolderTree,
    store::{FolderRecord, FolderStore},
};

/// The default size of the concurrent branch pool.
pub const DEFAULT_POOL_SIZE: usize = 4;

enum NodeOutcome {
    Created(FolderRef),
    AlreadyExisted(FolderRef),
}

/// The provisioning orchestrator.
pub struct Provisioner {
    adapter: Arc<dyn ProviderAdapter>,
    store: Arc<dyn FolderStore>,
    business_profile_id: String,
    pool_size: usize,
}

impl Provisioner {
    pub fn new(
        adapter: Arc<dyn ProviderAdapter>,
        store: Arc<dyn FolderStore>,
        business_profile_id: impl ToString,
    ) -> Self {
        Self {
            adapter,
            store,
            business_profile_id: business_profile_id.to_string(),
            pool_size: DEFAULT_POOL_SIZE,
        }
    }

    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size.max(1);
        self
    }

    /// Ensure every spec of the given tree exists remotely and is
    /// recorded locally.
    ///
    /// A node that keeps failing after retries is reported and its
    /// descendants are skipped, but sibling branches carry on. Only a
    /// credential rejection aborts the run.
    pub async fn provision(&self, tree: &FolderTree) -> Result<ProvisionReport> {
        let provider = self.adapter.provider();

        let known: Vec<FolderRecord> = self
            .store
            .list_folders(&self.business_profile_id)
            .await?
            .into_iter()
            .filter(|record| record.provider == provider)
            .collect();

        let branches = build_plan(tree, &known);

        info!(
            "provisioning {} folders over {} branches on {provider}",
            tree.node_count(),
            branches.len(),
        );

        let report = stream::iter(branches)
            .map(|branch| self.process_branch(branch))
            .buffer_unordered(self.pool_size)
            .try_fold(ProvisionReport::default(), |mut acc, report| async move {
                acc.merge(report);
                Ok::<_, Error>(acc)
            })
            .await?;

        info!("provisioning done: {}", report.summary());

        Ok(report)
    }

    /// Process the nodes of one branch, parents first.
    ///
    /// Returns `Err` only on credential rejection; every other
    /// failure lands in the report.
    async fn process_branch(&self, branch: Vec<PlannedNode>) -> Result<ProvisionReport> {
        let mut report = ProvisionReport::default();
        let mut resolved: HashMap<String, FolderRef> = HashMap::new();

        for node in branch {
            let parent = match &node.parent_path {
                Some(parent_path) => match resolved.get(parent_path) {
                    Some(parent) => Some(parent.clone()),
                    None => {
                        // the parent failed earlier in this branch
                        report.failed.push((
                            node.path.clone(),
                            Error::ParentUnavailableError(node.path, parent_path.clone()),
                        ));
                        continue;
                    }
                },
                None => None,
            };

            match self.process_node(&node, parent.as_ref()).await {
                Ok(NodeOutcome::Created(folder)) => {
                    resolved.insert(node.path.clone(), folder);
                    report.created.push(node.path);
                }
                Ok(NodeOutcome::AlreadyExisted(folder)) => {
                    resolved.insert(node.path.clone(), folder);
                    report.already_existed.push(node.path);
                }
                Err(err) if is_auth(&err) => return Err(err),
                Err(err) => {
                    warn!("cannot provision folder {}: {err}", node.path);
                    report.failed.push((node.path, err));
                }
            }
        }

        Ok(report)
    }

    async fn process_node(
        &self,
        node: &PlannedNode,
        parent: Option<&FolderRef>,
    ) -> Result<NodeOutcome> {
        if let PlannedAction::Confirm(label_id) = &node.action {
            debug!("folder {} already recorded as {label_id}", node.path);
            return Ok(NodeOutcome::AlreadyExisted(FolderRef::new(
                label_id, &node.path,
            )));
        }

        let (folder, created) = match self.adapter.create_folder(&node.name, parent).await? {
            CreateOutcome::Created(folder) => (folder, true),
            CreateOutcome::AlreadyExists(Some(folder)) => (folder, false),
            CreateOutcome::AlreadyExists(None) => {
                // the conflict response did not expose the existing
                // id: resolve it by name, never fabricate one
                let folder = self
                    .adapter
                    .resolve_folder(&node.name, parent)
                    .await?
                    .ok_or_else(|| {
                        crate::provider::Error::ResolveConflictedFolderError(
                            self.adapter.provider(),
                            node.path.clone(),
                        )
                    })?;
                (folder, false)
            }
        };

        let record = FolderRecord::new(
            self.adapter.provider(),
            &self.business_profile_id,
            &folder.id,
            &folder.path,
            Utc::now(),
        );
        self.store.upsert_folder(record).await?;

        Ok(if created {
            NodeOutcome::Created(folder)
        } else {
            NodeOutcome::AlreadyExisted(folder)
        })
    }
}

fn is_auth(err: &Error) -> bool {
    matches!(err, Error::ProviderError(err) if err.is_auth())
}
