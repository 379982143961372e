use thiserror::Error;

/// The global `Result` alias of the library.
pub type Result<T> = std::result::Result<T, Error>;

/// The global `Error` enum of the library.
///
/// Every module owns its own error type; this enum only aggregates
/// them so that callers can match on a single type at the crate
/// boundary.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    SchemaError(#[from] crate::schema::Error),
    #[error(transparent)]
    ProviderError(#[from] crate::provider::Error),
    #[error(transparent)]
    StoreError(#[from] crate::store::Error),
    #[error(transparent)]
    ProvisionError(#[from] crate::provision::Error),
    #[error(transparent)]
    RoutingError(#[from] crate::routing::Error),
    #[error(transparent)]
    EngineError(#[from] crate::engine::Error),
}

impl Error {
    /// Return `true` when the error means the credential was rejected
    /// by the provider. The run cannot be retried as-is: the caller
    /// must obtain a fresh credential and re-invoke.
    pub fn is_auth(&self) -> bool {
        match self {
            Self::ProviderError(err) => err.is_auth(),
            Self::ProvisionError(crate::provision::Error::ProviderError(err)) => err.is_auth(),
            _ => false,
        }
    }
}
