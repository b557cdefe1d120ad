use serde::{Deserialize, Serialize};

/// Persisted row ids are assigned by the storage layer.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Durations (rest, timed efforts) are whole seconds.
pub type Secs = u32;

/// Opaque identifier of an exercise in the external catalog.
pub type ExerciseId = String;

/// Opaque identifier of the user owning a log.
pub type UserId = String;

/// Stable identity of a circuit, minted once when the circuit is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    /// Mint a fresh, time-ordered group id.
    pub fn mint() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for GroupId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for GroupId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
