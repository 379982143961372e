//! # Provider wire API
//!
//! Module dedicated to the raw provider boundary. The two traits
//! below mirror the shape of the remote endpoints (flat labels on one
//! side, nested mail folders on the other) without committing to any
//! HTTP client: production implementations live next to the transport
//! stack, tests use in-memory fakes.

use async_trait::async_trait;
use thiserror::Error;

use super::AccessToken;

/// The `Result` alias of the wire API.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// The normalized wire failure.
///
/// Implementations map whatever status code their provider uses onto
/// these three cases; everything downstream (retry, conflict
/// resolution, auth abort) dispatches on them.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ApiError {
    /// The name is already taken remotely. The existing identifier is
    /// attached when the remote response carries it.
    #[error("folder name already taken remotely")]
    Conflict { existing_id: Option<String> },

    /// The credential was rejected. Never retried here: the caller
    /// owns token refresh.
    #[error("credential rejected by the provider: {0}")]
    Auth(String),

    /// A network failure, 5xx or rate-limit response. Safe to retry.
    #[error("transient provider failure (status {status:?}): {message}")]
    Transient {
        status: Option<u16>,
        message: String,
    },
}

impl ApiError {
    /// Return `true` when retrying the call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

/// One label of a flat-namespace provider.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RemoteLabel {
    /// The provider-assigned identifier, a short opaque token.
    pub id: String,

    /// The label name. Carries the full logical path, separators
    /// included: the provider has no true parent/child link.
    pub name: String,

    /// The optional label color.
    pub color: Option<String>,
}

/// One folder of a hierarchical provider.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RemoteMailFolder {
    /// The provider-assigned identifier, a long GUID-like token.
    pub id: String,

    /// The display name of this folder alone, parents excluded.
    pub display_name: String,

    /// The identifier of the parent folder, if nested.
    pub parent_id: Option<String>,
}

/// The wire API of flat-label providers.
#[async_trait]
pub trait LabelApi: Send + Sync {
    /// Create a label carrying the given full name.
    async fn create_label(&self, token: &AccessToken, name: &str) -> ApiResult<RemoteLabel>;

    /// List every label of the mailbox.
    async fn list_labels(&self, token: &AccessToken) -> ApiResult<Vec<RemoteLabel>>;
}

/// The wire API of hierarchical-folder providers.
#[async_trait]
pub trait MailFolderApi: Send + Sync {
    /// Create a folder under the given parent, or at the mailbox root
    /// when no parent is given.
    async fn create_folder(
        &self,
        token: &AccessToken,
        parent_id: Option<&str>,
        display_name: &str,
    ) -> ApiResult<RemoteMailFolder>;

    /// List every folder of the mailbox, nesting flattened.
    async fn list_folders(&self, token: &AccessToken) -> ApiResult<Vec<RemoteMailFolder>>;
}
