// Session identity and engine binding generations

use std::fmt;

/// Correlation id for a playback request
///
/// Derived from the source URI: the trailing path segment with its extension
/// stripped. Not unique; two plays of the same URI share an id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn from_uri(uri: &str) -> Self {
        // Query string and fragment are not part of the path
        let path = uri.split(|c: char| c == '?' || c == '#').next().unwrap_or(uri);

        let segment = path
            .rsplit(|c: char| c == '/' || c == '\\')
            .find(|s| !s.is_empty())
            .unwrap_or(path);

        let stem = match segment.rsplit_once('.') {
            Some((stem, _ext)) if !stem.is_empty() => stem,
            _ => segment,
        };

        SessionId(stem.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Monotonically increasing tag for engine bindings
///
/// Every `load` gets a fresh generation; events are applied only when their
/// tag matches the controller's current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    pub const INITIAL: Generation = Generation(0);

    pub fn next(self) -> Self {
        Generation(self.0.wrapping_add(1))
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "gen#{}", self.0)
    }
}

/// The live (or most recent) playback request
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: SessionId,
    pub source_uri: String,
    pub generation: Generation,
}

impl Session {
    pub fn new(source_uri: &str, generation: Generation) -> Self {
        Self {
            id: SessionId::from_uri(source_uri),
            source_uri: source_uri.to_string(),
            generation,
        }
    }
}
