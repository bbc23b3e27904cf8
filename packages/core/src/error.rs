//! Error taxonomy for the resource layer.

use std::io;

/// Errors surfaced by resource operations.
///
/// The core performs no retries and no local recovery: every failure
/// surfaces synchronously at the failing operation. Stale-alias failures
/// surface lazily, when the alias is used, never at removal time.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The URL string does not match the `protocol://path` grammar.
    #[error("malformed url '{url}': {message}")]
    MalformedUrl { url: String, message: String },

    /// No handler factory is registered for the protocol.
    #[error("no handler registered for protocol '{protocol}'")]
    UnsupportedProtocol { protocol: String },

    /// The operation targets a backing item that does not exist.
    #[error("resource not found: {url}")]
    NotFound { url: String },

    /// A create/add targets an existing item with overwrite disabled.
    #[error("already exists: {url}")]
    AlreadyExists { url: String },

    /// Any other backing-store failure, carrying the underlying error.
    #[error("i/o failure on '{url}': {source}")]
    Io {
        url: String,
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Map an OS-level error onto the taxonomy for the given URL.
    ///
    /// `NotFound` kinds become [`Error::NotFound`]; everything else is
    /// wrapped as [`Error::Io`] with the source preserved.
    pub fn from_io(url: impl Into<String>, source: io::Error) -> Self {
        let url = url.into();
        if source.kind() == io::ErrorKind::NotFound {
            Error::NotFound { url }
        } else {
            Error::Io { url, source }
        }
    }

    /// Build an [`Error::Io`] from a bare message.
    pub fn io_message(url: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Io {
            url: url.into(),
            source: io::Error::other(message.into()),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}
