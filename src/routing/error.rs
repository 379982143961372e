use thiserror::Error;

/// The global `Result` alias of the module.
pub type Result<T> = std::result::Result<T, Error>;

/// The global `Error` enum of the module.
#[derive(Debug, Error)]
pub enum Error {
    /// An empty routing table is never emitted silently: zero
    /// non-deleted folders means the tenant was not provisioned.
    #[error("cannot build routing table for profile {0}: no folders provisioned")]
    NotProvisionedError(String),
}
