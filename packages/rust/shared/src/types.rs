//! Core domain types for Q&A collections.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Column names of the tabular input, in order.
pub const TABULAR_COLUMNS: [&str; 5] = ["question", "answer", "category", "source", "priority"];

/// Provenance tag carried by operator-authored records.
pub const MANUAL_SOURCE: &str = "manual";

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

/// Triage label attached to each record.
///
/// Purely informational: the merge never orders or filters by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Lowercase label as stored on disk.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a priority label is not `high`, `medium` or `low`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPriority(pub String);

impl fmt::Display for UnknownPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown priority '{}': expected high, medium, or low",
            self.0
        )
    }
}

impl std::error::Error for UnknownPriority {}

impl FromStr for Priority {
    type Err = UnknownPriority;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(UnknownPriority(s.to_string())),
        }
    }
}

impl TryFrom<String> for Priority {
    type Error = UnknownPriority;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Priority> for String {
    fn from(p: Priority) -> Self {
        p.as_str().to_string()
    }
}

// ---------------------------------------------------------------------------
// QaRecord
// ---------------------------------------------------------------------------

/// One question/answer pair with its metadata.
///
/// Field order here is the field order on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaRecord {
    pub question: String,
    pub answer: String,
    pub category: String,
    /// Provenance tag, e.g. `manual` or `scraped`.
    pub source: String,
    pub priority: Priority,
}

impl QaRecord {
    /// Whether this record was authored by an operator.
    pub fn is_manual(&self) -> bool {
        self.source.trim().eq_ignore_ascii_case(MANUAL_SOURCE)
    }
}
