use thiserror::Error;

/// The global `Result` alias of the module.
pub type Result<T> = std::result::Result<T, Error>;

/// The global `Error` enum of the module.
///
/// Node-level failures end up in the
/// [`ProvisionReport`](super::ProvisionReport) rather than aborting
/// the run; only credential rejections escape it.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot provision folder {0}: parent folder {1} unavailable")]
    ParentUnavailableError(String, String),

    #[error(transparent)]
    ProviderError(#[from] crate::provider::Error),
    #[error(transparent)]
    StoreError(#[from] crate::store::Error),
}
