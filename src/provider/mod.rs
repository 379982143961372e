//! # Provider module
//!
//! Module dedicated to the provider adapters, the normalization layer
//! over heterogeneous mail provider APIs. The main entities are the
//! [`Provider`] enumeration, the [`ProviderAdapter`] capability trait
//! and its two variants: [`GmailAdapter`] for the flat label
//! namespace and [`OutlookAdapter`] for true nested folders.
//!
//! Whatever the provider, adapters expose the same contract: logical
//! paths with `/` separators, opaque identifiers, and "already
//! exists" reported as a successful [`CreateOutcome`], never as an
//! error.

pub mod api;
mod error;
pub mod gmail;
pub mod outlook;
pub mod retry;

use std::{
    fmt,
    ops::{Deref, DerefMut},
    time::Duration,
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[doc(inline)]
pub use self::error::{Error, Result};
pub use self::{gmail::GmailAdapter, outlook::OutlookAdapter, retry::RetryPolicy};
use crate::schema::PATH_SEPARATOR;

/// The default per-call timeout of remote operations.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// The mail provider enumeration.
///
/// The provider is matched exactly once, when the engine builds the
/// adapter; everything downstream goes through [`ProviderAdapter`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provider {
    /// Flat label namespace. Hierarchy is a display convention: `/`
    /// in the label name, no true parent/child link. Identifiers are
    /// short opaque tokens.
    Gmail,

    /// True nested folders with parent identifiers. Identifiers are
    /// long GUID-like tokens.
    Outlook,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Gmail => write!(f, "gmail"),
            Self::Outlook => write!(f, "outlook"),
        }
    }
}

/// The opaque bearer credential of one `(profile, provider)` pair.
///
/// Acquired and refreshed by the OAuth collaborator; this crate only
/// carries it to the wire.
#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(raw: impl ToString) -> Self {
        Self(raw.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // keep the bearer out of logs
        write!(f, "AccessToken(<redacted>)")
    }
}

/// Capability to supply access tokens.
///
/// Implemented by the OAuth collaborator. A returned token is
/// expected valid and non-expired; rejections surface as
/// [`Error::InvalidCredentialError`] and abort the run.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(
        &self,
        business_profile_id: &str,
        provider: Provider,
    ) -> crate::Result<AccessToken>;
}

/// A reference to one remote folder: its provider-assigned identifier
/// and its full logical path.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FolderRef {
    /// The provider-assigned identifier. Opaque: never parsed, never
    /// fabricated.
    pub id: String,

    /// The full logical path, `/`-separated.
    pub path: String,
}

impl FolderRef {
    pub fn new(id: impl ToString, path: impl ToString) -> Self {
        Self {
            id: id.to_string(),
            path: path.to_string(),
        }
    }

    /// Return the last segment of the path.
    pub fn leaf_name(&self) -> &str {
        self.path
            .rsplit(PATH_SEPARATOR)
            .next()
            .unwrap_or(&self.path)
    }
}

impl fmt::Display for FolderRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.path, self.id)
    }
}

/// One folder as observed remotely, normalized.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RemoteFolder {
    /// The identifier and reconstructed logical path.
    pub folder: FolderRef,

    /// The display name of this folder alone.
    pub name: String,

    /// The optional folder color.
    pub color: Option<String>,
}

/// The list of remote folders.
///
/// This structure is just a convenient wrapper used to implement
/// custom mappers for adapters.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RemoteFolders(Vec<RemoteFolder>);

impl Deref for RemoteFolders {
    type Target = Vec<RemoteFolder>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for RemoteFolders {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl IntoIterator for RemoteFolders {
    type Item = RemoteFolder;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<RemoteFolder> for RemoteFolders {
    fn from_iter<T: IntoIterator<Item = RemoteFolder>>(iter: T) -> Self {
        let mut folders = RemoteFolders::default();
        folders.extend(iter);
        folders
    }
}

/// The outcome of a remote folder creation.
///
/// "Already exists" is a successful, idempotent outcome: it carries
/// the existing identifier when the remote response exposes it,
/// otherwise the caller resolves it by name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CreateOutcome {
    /// The folder has been created remotely.
    Created(FolderRef),

    /// The folder already existed remotely.
    AlreadyExists(Option<FolderRef>),
}

impl CreateOutcome {
    /// Return `true` when the folder pre-existed the call.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::AlreadyExists(_))
    }
}

/// The provider adapter capability.
///
/// One implementation per provider, selected by the [`Provider`] enum
/// at construction time. Callers never branch on the provider again.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Return the provider behind the adapter.
    fn provider(&self) -> Provider;

    /// Ensure a folder carrying the given name exists under the
    /// optional parent. Transient failures are retried per the
    /// provider policy; a pre-existing name is an outcome, not an
    /// error.
    async fn create_folder(&self, name: &str, parent: Option<&FolderRef>)
        -> Result<CreateOutcome>;

    /// List every remote folder with reconstructed logical paths.
    async fn list_folders(&self) -> Result<RemoteFolders>;

    /// Resolve the canonical identifier of the folder carrying the
    /// given name under the optional parent.
    async fn resolve_folder(
        &self,
        name: &str,
        parent: Option<&FolderRef>,
    ) -> Result<Option<FolderRef>>;
}

/// Join a parent path and a leaf name into a logical path.
pub(crate) fn join_path(parent: Option<&FolderRef>, name: &str) -> String {
    match parent {
        Some(parent) => format!("{}{PATH_SEPARATOR}{name}", parent.path),
        None => name.to_owned(),
    }
}
