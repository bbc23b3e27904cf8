//! URL type with the `protocol://path` grammar.

use std::fmt;

use crate::Error;

/// A parsed resource URL.
///
/// The grammar is exactly `protocol "://" path`. The path is an opaque
/// string interpreted by the handler bound to the protocol; it may itself
/// carry a host component (`ssh://host/abs/path`). Both halves are kept
/// verbatim, so the `Display` form reproduces the input byte-for-byte.
///
/// # Examples
///
/// ```rust
/// use anywhere_core::Url;
///
/// let url = Url::parse("file:///tmp/report.txt").unwrap();
/// assert_eq!(url.protocol(), "file");
/// assert_eq!(url.path(), "/tmp/report.txt");
/// assert_eq!(url.name(), "report.txt");
/// assert_eq!(url.to_string(), "file:///tmp/report.txt");
/// ```
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct Url {
    protocol: String,
    path: String,
}

impl Url {
    /// Parse a URL string.
    ///
    /// Fails with [`Error::MalformedUrl`] when the `://` separator is
    /// missing or the protocol segment is empty or contains characters
    /// outside `[A-Za-z0-9+.-]`. The path is not validated here: whether
    /// it names anything is a backing-store concern, checked lazily by
    /// operations.
    pub fn parse(s: &str) -> Result<Self, Error> {
        let (protocol, path) = s.split_once("://").ok_or_else(|| Error::MalformedUrl {
            url: s.to_string(),
            message: "missing '://' separator".to_string(),
        })?;

        if protocol.is_empty() {
            return Err(Error::MalformedUrl {
                url: s.to_string(),
                message: "empty protocol segment".to_string(),
            });
        }

        if let Some(c) = protocol
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')))
        {
            return Err(Error::MalformedUrl {
                url: s.to_string(),
                message: format!("invalid character '{}' in protocol segment", c),
            });
        }

        Ok(Url {
            protocol: protocol.to_string(),
            path: path.to_string(),
        })
    }

    /// The protocol segment, without the `://` separator.
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// The path segment. Never includes the protocol prefix.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The final path segment, ignoring a trailing slash.
    pub fn name(&self) -> &str {
        let trimmed = self.path.trim_end_matches('/');
        trimmed.rsplit('/').next().unwrap_or(trimmed)
    }

    /// Whether the path carries a trailing-slash directory hint.
    ///
    /// Only consulted when the backing item does not exist yet; an
    /// existing item's stored kind always wins.
    pub fn has_dir_hint(&self) -> bool {
        self.path.ends_with('/')
    }

    /// A sibling URL under the same protocol with a different path.
    pub fn with_path(&self, path: impl Into<String>) -> Url {
        Url {
            protocol: self.protocol.clone(),
            path: path.into(),
        }
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.protocol, self.path)
    }
}
