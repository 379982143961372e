//! # Business profile module
//!
//! Module dedicated to the business profile, the per-tenant entity
//! that owns the provisioned folder records. Profiles are read-only
//! inputs here: they are produced and maintained by the onboarding
//! collaborator and only consumed by the schema resolver and the
//! engine.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::provider::Provider;

/// Alias for the business profile identifier.
pub type BusinessProfileId = String;

/// The business profile structure.
///
/// One profile per tenant. The profile carries everything the schema
/// resolver needs: the selected business type keys, the current team
/// members and the current suppliers.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BusinessProfile {
    /// The profile identifier.
    pub id: BusinessProfileId,

    /// The mail provider the tenant connected during onboarding.
    pub provider: Provider,

    /// The selected business type keys.
    #[serde(default)]
    pub business_types: Vec<String>,

    /// The current team members.
    #[serde(default)]
    pub team_members: Vec<TeamMember>,

    /// The current suppliers.
    #[serde(default)]
    pub suppliers: Vec<Supplier>,
}

impl BusinessProfile {
    pub fn new(id: impl ToString, provider: Provider) -> Self {
        Self {
            id: id.to_string(),
            provider,
            business_types: Vec::new(),
            team_members: Vec::new(),
            suppliers: Vec::new(),
        }
    }
}

/// A team member, source of one dynamic folder under `MANAGER`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TeamMember {
    /// The display name, used as-is as the folder name.
    pub name: String,

    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub email: Option<String>,
}

impl TeamMember {
    pub fn new(name: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            role: None,
            email: None,
        }
    }
}

/// A supplier, source of one dynamic folder under `SUPPLIERS`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Supplier {
    /// The display name, used as-is as the folder name.
    pub name: String,

    /// The email domains this supplier sends from.
    #[serde(default)]
    pub domains: Vec<String>,
}

impl Supplier {
    pub fn new(name: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            domains: Vec::new(),
        }
    }
}

/// Capability to load business profiles.
///
/// Implemented by the business-profile collaborator (database, HTTP
/// service, in-memory fixture in tests).
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// Load the business profile matching the given identifier.
    async fn business_profile(&self, id: &str) -> crate::Result<BusinessProfile>;
}
