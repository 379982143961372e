use thiserror::Error;

/// The global `Result` alias of the module.
pub type Result<T> = std::result::Result<T, Error>;

/// The global `Error` enum of the module.
///
/// Schema errors are always fatal: they are raised before any
/// network call is attempted.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot resolve folder schema: unknown business type {0}")]
    UnknownBusinessTypeError(String),
    #[error("cannot resolve folder schema: missing business type")]
    MissingBusinessTypeError,
    #[error("cannot use folder name {1} twice under {0}")]
    DuplicateSiblingNameError(String, String),
}
