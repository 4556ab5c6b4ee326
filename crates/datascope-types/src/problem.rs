use serde::{Deserialize, Serialize};
use std::fmt;

/// Error payload returned by every backend call, in the problem-details
/// shape (`{title, detail, status}`). Surfaced to the user as-is.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    #[serde(default)]
    pub status: u16,
    pub title: String,
    #[serde(default)]
    pub detail: String,
}

impl Problem {
    pub fn new(status: u16, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            status,
            title: title.into(),
            detail: detail.into(),
        }
    }

    /// A problem for failures that never reached the backend (transport
    /// errors, decode errors).
    pub fn transport(detail: impl Into<String>) -> Self {
        Self {
            status: 0,
            title: "Request Failed".to_string(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.detail.is_empty() {
            write!(f, "{}", self.title)
        } else {
            write!(f, "{}: {}", self.title, self.detail)
        }
    }
}

impl std::error::Error for Problem {}
