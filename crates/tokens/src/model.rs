use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Serialize;
use support_console_io::LoadError;

/// Display format for known timestamps (always UTC).
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Default marker rendered for tokens whose time could not be resolved.
pub const UNKNOWN_MARKER: &str = "Unknown";

// ---------------------------------------------------------------------------
// Timestamp
// ---------------------------------------------------------------------------

/// A normalized point in time, or "unknown".
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", content = "seconds", rename_all = "snake_case")]
pub enum Timestamp {
    /// Seconds since the Unix epoch.
    Known(f64),
    Unknown,
}

impl Timestamp {
    /// Non-finite input (NaN, infinities) and instants outside the calendar
    /// range that can be rendered are unknown.
    pub fn from_seconds(seconds: f64) -> Self {
        let renderable =
            seconds.is_finite() && DateTime::<Utc>::from_timestamp(seconds.floor() as i64, 0).is_some();
        if renderable {
            Self::Known(seconds)
        } else {
            Self::Unknown
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    pub fn seconds(&self) -> Option<f64> {
        match self {
            Self::Known(s) => Some(*s),
            Self::Unknown => None,
        }
    }

    /// Recency ranking: later is greater, unknown is below every known time.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Known(a), Self::Known(b)) => a.total_cmp(b),
            (Self::Known(_), Self::Unknown) => Ordering::Greater,
            (Self::Unknown, Self::Known(_)) => Ordering::Less,
            (Self::Unknown, Self::Unknown) => Ordering::Equal,
        }
    }

    /// Whole-second UTC instant, truncating any fraction.
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        let seconds = self.seconds()?;
        DateTime::<Utc>::from_timestamp(seconds.floor() as i64, 0)
    }

    /// `YYYY-MM-DD HH:MM:SS` in UTC, or `unknown_marker`.
    pub fn display(&self, unknown_marker: &str) -> String {
        match self.to_utc() {
            Some(dt) => dt.format(TIME_FORMAT).to_string(),
            None => unknown_marker.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Extraction output
// ---------------------------------------------------------------------------

/// One distinct token in an extraction result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedToken {
    pub token: String,
    /// Most recent known time of any occurrence. `None` when time was not requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
    /// Rendered time (or the unknown marker). `None` when time was not requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

/// A document that was skipped, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentWarning {
    pub document: String,
    pub message: String,
}

impl From<LoadError> for DocumentWarning {
    fn from(err: LoadError) -> Self {
        Self {
            document: err.document().to_string(),
            message: err.to_string(),
        }
    }
}

/// Result of one extraction run.
///
/// "Nothing matched" is an empty `tokens` list; "some documents failed" is a
/// non-empty `warnings` list. Neither is an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extraction {
    pub tokens: Vec<ExtractedToken>,
    pub include_time: bool,
    pub documents_scanned: usize,
    /// Matches before deduplication.
    pub occurrences: usize,
    pub warnings: Vec<DocumentWarning>,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn failed_documents(&self) -> usize {
        self.warnings.len()
    }

    pub fn token_strings(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(|t| t.token.as_str())
    }

    /// Case-insensitive substring filter on the token string. An empty (or
    /// blank) query keeps everything.
    pub fn filtered(&self, query: &str) -> Extraction {
        let needle = query.trim().to_lowercase();
        let tokens = if needle.is_empty() {
            self.tokens.clone()
        } else {
            self.tokens
                .iter()
                .filter(|t| t.token.to_lowercase().contains(&needle))
                .cloned()
                .collect()
        };
        Extraction {
            tokens,
            ..self.clone()
        }
    }
}
