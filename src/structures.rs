use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{self, Display};

/// Status of a build step as reported by the build service.
///
/// The service treats status as an open string, so anything outside the
/// known vocabulary is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Success,
    Working,
    Queued,
    InternalError,
    Cancelled,
    Timeout,
    Failure,
    Other(String),
}

impl Status {
    pub fn as_str(&self) -> &str {
        match self {
            Status::Success => "SUCCESS",
            Status::Working => "WORKING",
            Status::Queued => "QUEUED",
            Status::InternalError => "INTERNAL_ERROR",
            Status::Cancelled => "CANCELLED",
            Status::Timeout => "TIMEOUT",
            Status::Failure => "FAILURE",
            Status::Other(raw) => raw,
        }
    }

    /// Compares the literal wire spelling, so a hand-built `Other("SUCCESS")`
    /// also counts.
    pub fn is_success(&self) -> bool {
        self.as_str() == "SUCCESS"
    }
}

impl From<&str> for Status {
    fn from(raw: &str) -> Self {
        match raw {
            "SUCCESS" => Status::Success,
            "WORKING" => Status::Working,
            "QUEUED" => Status::Queued,
            "INTERNAL_ERROR" => Status::InternalError,
            "CANCELLED" => Status::Cancelled,
            "TIMEOUT" => Status::Timeout,
            "FAILURE" => Status::Failure,
            other => Status::Other(other.to_string()),
        }
    }
}

impl From<String> for Status {
    fn from(raw: String) -> Self {
        match Status::from(raw.as_str()) {
            Status::Other(_) => Status::Other(raw),
            known => known,
        }
    }
}

impl Default for Status {
    // Steps that never ran come back without a status field.
    fn default() -> Self {
        Status::Other(String::new())
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Status::from(raw))
    }
}

// Treats an explicit `null` the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One raw step entry of a build description.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildStep {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: Status,
    /// `KEY=VALUE` strings, unordered.
    #[serde(default, deserialize_with = "null_as_default")]
    pub env: Vec<String>,
}

/// Build description as returned by the build service. Only the fields
/// the report needs are decoded; everything else is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildDescription {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub steps: Vec<BuildStep>,
}

/// Normalized state of one build step, ready for ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub name: String,
    pub tag: String,
    pub build_id: String,
    pub status: Status,
}
