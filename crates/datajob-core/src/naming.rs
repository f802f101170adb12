//! Unique resource names bounded by a character budget.
//!
//! AWS services cap resource name lengths (SageMaker job names at 63 chars,
//! for instance). Names are made unique by appending a timestamp that is
//! captured once per stack, so every resource declared in one assembly run
//! sees the same suffix.

use chrono::{DateTime, Utc};
use tracing::debug;

/// Default character budget, matching the SageMaker job-name limit.
pub const DEFAULT_MAX_CHARS: usize = 63;

/// Default rendering of the timestamp suffix, e.g. `20230101T000000`.
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Generates unique names of the form `{name}-{timestamp}`.
///
/// When the combined length would exceed the budget, the name is truncated
/// from the end so the result fills the budget exactly. The timestamp and the
/// joining hyphen are never truncated.
#[derive(Debug, Clone)]
pub struct UniqueNameGenerator {
    timestamp: DateTime<Utc>,
    datetime_format: String,
    max_chars: usize,
}

impl UniqueNameGenerator {
    /// Create a generator with the default format and budget.
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            datetime_format: DEFAULT_DATETIME_FORMAT.to_string(),
            max_chars: DEFAULT_MAX_CHARS,
        }
    }

    /// Override the timestamp rendering format.
    pub fn with_datetime_format(mut self, format: impl Into<String>) -> Self {
        self.datetime_format = format.into();
        self
    }

    /// Override the character budget.
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    /// The fixed point in time this generator renders.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Generate a unique name by appending the rendered timestamp.
    pub fn generate(&self, name: &str) -> String {
        let rendered = self.timestamp.format(&self.datetime_format).to_string();
        let suffix_len = rendered.chars().count() + 1;
        let name_len = name.chars().count();

        if name_len + suffix_len > self.max_chars {
            let keep = self.max_chars.saturating_sub(suffix_len);
            debug!(
                name = %name,
                total = name_len + suffix_len,
                max_chars = self.max_chars,
                "truncating name to fit the character budget"
            );
            let truncated: String = name.chars().take(keep).collect();
            return format!("{truncated}-{rendered}");
        }

        format!("{name}-{rendered}")
    }
}
