use thiserror::Error;

use super::{api::ApiError, retry::RetryPolicy, Provider};

/// The global `Result` alias of the module.
pub type Result<T> = std::result::Result<T, Error>;

/// The global `Error` enum of the module.
#[derive(Debug, Error)]
pub enum Error {
    /// Fatal for the whole run: the caller must refresh the
    /// credential and re-invoke. This crate never refreshes tokens
    /// itself.
    #[error("invalid or expired credential for {0}: {1}")]
    InvalidCredentialError(Provider, String),

    #[error("cannot {2} on {1}: transient failures persisted after {3} attempts")]
    RetriesExhaustedError(#[source] ApiError, Provider, String, u8),

    #[error("cannot resolve folder {1} on {0} after conflict")]
    ResolveConflictedFolderError(Provider, String),
}

impl Error {
    /// Return `true` when the error means the credential was rejected
    /// by the provider.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::InvalidCredentialError(_, _))
    }

    /// Map a terminal wire failure onto the module error. Conflicts
    /// never reach this point: adapters turn them into
    /// [`super::CreateOutcome::AlreadyExists`] beforehand.
    pub(crate) fn from_api(
        provider: Provider,
        operation: &str,
        policy: &RetryPolicy,
        err: ApiError,
    ) -> Self {
        match err {
            ApiError::Auth(msg) => Self::InvalidCredentialError(provider, msg),
            err => Self::RetriesExhaustedError(
                err,
                provider,
                operation.to_owned(),
                policy.max_attempts,
            ),
        }
    }
}
