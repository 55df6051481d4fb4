use std::fmt;

/// The location of a table backend.
#[non_exhaustive] // future-proofing for options like a local Postgres socket
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Location {
    /// An in-process table store. This is useful for tests and short-lived data.
    InMemory,
    /// A hosted backend reachable over HTTP.
    Remote {
        /// The base URL of the project, without the `/rest/v1` suffix.
        url: String,
        /// The access key sent with every request.
        key: String,
    },
}

impl Location {
    /// A hosted backend at the given URL, authenticated with the given access key.
    #[inline]
    pub fn remote(url: impl Into<String>, key: impl Into<String>) -> Self {
        Self::Remote {
            url: url.into(),
            key: key.into(),
        }
    }
}

// The access key must never end up in logs.
impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InMemory => f.write_str("InMemory"),
            Self::Remote { url, .. } => f
                .debug_struct("Remote")
                .field("url", url)
                .field("key", &"<redacted>")
                .finish(),
        }
    }
}
