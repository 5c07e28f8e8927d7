//! ReportJob - Asynchronous CSV report generation

use serde::{Deserialize, Deserializer, Serialize};

/// Job identifier as returned by the report service.
///
/// The service may send it as a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ReportJobId(String);

impl ReportJobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for ReportJobId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => Self(s),
            RawId::Number(n) => Self(n.to_string()),
        })
    }
}

impl std::fmt::Display for ReportJobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    Ready,
}

/// A report job and, once ready, where its CSV can be fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportJob {
    pub id: ReportJobId,
    pub status: ReportStatus,
    /// Present only when `status` is `Ready`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl ReportJob {
    pub fn pending(id: ReportJobId) -> Self {
        Self {
            id,
            status: ReportStatus::Pending,
            location: None,
        }
    }

    pub fn ready(id: ReportJobId, location: impl Into<String>) -> Self {
        Self {
            id,
            status: ReportStatus::Ready,
            location: Some(location.into()),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == ReportStatus::Ready
    }
}
