//! Library error type.
//!
//! Every validation failure is reported before any session state changes,
//! so a caller that receives `InvalidArgument` can keep using the session.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A command argument failed validation. No state was modified.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An export could not be written.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }
}
