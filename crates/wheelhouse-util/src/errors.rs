use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all Wheelhouse operations.
#[derive(Debug, Error, Diagnostic)]
pub enum WheelhouseError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The root requirements file could not be located or read.
    ///
    /// This is the only process-fatal condition; everything below it is
    /// recovered locally and reported as a skip.
    #[error("Requirements error: {message}")]
    #[diagnostic(help("Pass --requirements-path or place requirements.txt in the current or parent directory"))]
    Requirements { message: String },

    /// Network request or download failed.
    #[error("Network error: {message}")]
    Network { message: String },

    /// A fetched payload could not be decoded (registry JSON, wheel archive).
    #[error("Decode error: {message}")]
    Decode { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

/// Convenience alias for `miette::Result<T>`.
pub type WheelhouseResult<T> = miette::Result<T>;
