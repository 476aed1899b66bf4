//! Entry-level decoding errors

/// A search entry that cannot be turned into output rows.
#[derive(Debug)]
pub enum MalformedEntry {
    /// Entry has no `resource` object
    MissingResource,
    /// Resource has no `id` but one is needed for the row
    MissingId,
    /// Entry fields have unexpected JSON types
    Decode(serde_json::Error),
}

impl std::fmt::Display for MalformedEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingResource => write!(f, "malformed record: entry has no resource"),
            Self::MissingId => write!(f, "malformed record: resource has no id"),
            Self::Decode(e) => write!(f, "malformed record: {e}"),
        }
    }
}

impl std::error::Error for MalformedEntry {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for MalformedEntry {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e)
    }
}
