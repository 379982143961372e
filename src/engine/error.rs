use thiserror::Error;

use crate::provider::Provider;

/// The global `Result` alias of the module.
pub type Result<T> = std::result::Result<T, Error>;

/// The global `Error` enum of the module.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot build taxonomy engine: missing folder store")]
    BuildEngineMissingStoreError,
    #[error("cannot build taxonomy engine: missing token source")]
    BuildEngineMissingTokenSourceError,
    #[error("cannot build taxonomy engine: missing profile source")]
    BuildEngineMissingProfileSourceError,

    #[error("cannot build adapter for {0}: no API client registered")]
    MissingApiClientError(Provider),
}
