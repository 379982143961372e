use thiserror::Error;

use crate::provider::Provider;

/// The global `Result` alias of the module.
pub type Result<T> = std::result::Result<T, Error>;

/// The global `Error` enum of the module.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot find folder record {1} for {0}")]
    FindFolderRecordError(Provider, String),
}
