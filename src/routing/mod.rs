//! # Routing module
//!
//! Module dedicated to the routing table builder, the projection of
//! the local folder records into the category to identifiers mapping
//! consumed by the external workflow engine.
//!
//! Keys are lowercased, alias-folded top-level category names. Only
//! leaf folders are routable destinations: a folder with recorded
//! subfolders is a grouping, not a place to file email into. Keys
//! stay stable across reconciliation runs as long as folder names are
//! unchanged.

mod error;

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

#[doc(inline)]
pub use self::error::{Error, Result};
use crate::{provider::Provider, schema::PATH_SEPARATOR, store::FolderRecord};

/// The routing table builder configuration.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RoutingConfig {
    /// Category aliases folded into a single routing key. The source
    /// material names some categories inconsistently across layers,
    /// so the canonical list is configuration rather than a constant.
    #[serde(default = "default_aliases")]
    pub aliases: HashMap<String, String>,
}

fn default_aliases() -> HashMap<String, String> {
    HashMap::from_iter([
        ("formsub".to_owned(), "forms".to_owned()),
        ("vendors".to_owned(), "suppliers".to_owned()),
    ])
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            aliases: default_aliases(),
        }
    }
}

impl RoutingConfig {
    /// Fold the given lowercased name through the alias table.
    fn fold(&self, name: &str) -> String {
        match self.aliases.get(name) {
            Some(canonical) => canonical.clone(),
            None => name.to_owned(),
        }
    }
}

/// The routing table, the sole contract the downstream classification
/// workflow depends on.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RoutingTable {
    /// The provider the identifiers belong to.
    pub provider: Provider,

    /// The provider folder identifiers under each top-level category.
    pub categories: BTreeMap<String, Vec<String>>,
}

/// Project the given records into the routing table of the given
/// business profile.
pub fn build(
    business_profile_id: &str,
    provider: Provider,
    records: &[FolderRecord],
    config: &RoutingConfig,
) -> Result<RoutingTable> {
    let active: Vec<&FolderRecord> = records
        .iter()
        .filter(|record| !record.is_deleted && record.provider == provider)
        .collect();

    if active.is_empty() {
        return Err(Error::NotProvisionedError(business_profile_id.to_owned()));
    }

    let mut categories: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for record in &active {
        if !is_leaf(record, &active) {
            continue;
        }

        let key = config.fold(&record.top_level_name().to_lowercase());
        categories.entry(key).or_default().push(record.label_id.clone());
    }

    // sorted identifier lists keep the table stable across runs
    for ids in categories.values_mut() {
        ids.sort();
    }

    debug!(
        "routing table of profile {business_profile_id}: {} categories",
        categories.len(),
    );

    Ok(RoutingTable { provider, categories })
}

/// Return `true` when no other active record nests under the given
/// one.
fn is_leaf(record: &FolderRecord, active: &[&FolderRecord]) -> bool {
    let prefix = format!("{}{PATH_SEPARATOR}", record.label_name.to_lowercase());

    !active
        .iter()
        .any(|other| other.label_name.to_lowercase().starts_with(&prefix))
}
