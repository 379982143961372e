//! Rust library to provision and reconcile mailbox folder taxonomies.
//!
//! The main purpose of this library is to keep a tenant's logical
//! email taxonomy (a tree of folders or labels organized by business
//! vertical, plus per-team-member and per-supplier subfolders) in
//! sync with the physical folder structures exposed by heterogeneous
//! mail providers.
//!
//! This goal is achieved by exposing a
//! [`TaxonomyEngine`](crate::engine::TaxonomyEngine) struct which
//! wires the capabilities together, and a
//! [`TaxonomyEngineBuilder`](crate::engine::TaxonomyEngineBuilder)
//! which helps you to build a custom engine.
//!
//! ## Capabilities
//!
//! ### Schema
//!
//! - [`resolve`](crate::schema::resolve): merge the base taxonomy,
//!   business type extensions and team/supplier data into one
//!   canonical [`FolderTree`](crate::schema::FolderTree)
//!
//! ### Provider
//!
//! - [`ProviderAdapter`](crate::provider::ProviderAdapter): create,
//!   list and resolve remote folders, one implementation per provider
//!
//! ### Provisioning
//!
//! - [`Provisioner`](crate::provision::Provisioner): ensure every
//!   spec of a tree exists remotely, create-or-resolve, never
//!   create-or-fail
//!
//! ### Reconciliation
//!
//! - [`reconcile`](crate::reconcile::reconcile): refresh the local
//!   records against the observed remote state
//!
//! ### Projections
//!
//! - [`validate`](crate::coverage::validate): measure how much of the
//!   mailbox the downstream classifier can route into
//! - [`build`](crate::routing::build): project the records into the
//!   category to identifiers mapping consumed by the workflow engine
//!
//! See examples in the /tests folder.

pub mod coverage;
pub mod engine;
mod error;
pub mod profile;
pub mod provider;
pub mod provision;
pub mod reconcile;
pub mod routing;
pub mod schema;
pub mod store;

#[doc(inline)]
pub use self::error::{Error, Result};
