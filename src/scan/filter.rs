//! Item filters: recency window and keyword matching.

use chrono::{DateTime, Duration, Utc};

use crate::{Result, ScoutError};

/// Age bound for items worth considering.
///
/// An item is in the window when `now - created_at <= window`; the boundary
/// is inclusive. Items stamped in the future are in the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecencyWindow {
    window: Duration,
}

impl RecencyWindow {
    /// Create a window of `secs` seconds.
    pub fn from_secs(secs: u64) -> Self {
        let secs = i64::try_from(secs).unwrap_or(i64::MAX).min(i64::MAX / 1000);
        Self {
            window: Duration::seconds(secs),
        }
    }

    /// Window length.
    pub fn duration(&self) -> Duration {
        self.window
    }

    /// Whether an item created at `created_at` is recent enough at `now`.
    pub fn contains(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(created_at) <= self.window
    }
}

/// Case-insensitive substring matcher over a fixed keyword list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordMatcher {
    keywords: Vec<String>,
}

impl KeywordMatcher {
    /// Create a matcher. Keywords are case-folded; empty keywords are rejected.
    pub fn new<I, S>(keywords: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| {
                let k = k.as_ref().trim();
                if k.is_empty() {
                    Err(ScoutError::Validation(
                        "keywords must not be empty".to_string(),
                    ))
                } else {
                    Ok(k.to_lowercase())
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { keywords })
    }

    /// Case-folded keywords.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// True iff any keyword is a substring of the case-folded title.
    pub fn matches(&self, title: &str) -> bool {
        self.first_match(title).is_some()
    }

    /// The first keyword found in the title, if any.
    pub fn first_match(&self, title: &str) -> Option<&str> {
        let title = title.to_lowercase();
        self.keywords
            .iter()
            .find(|k| title.contains(k.as_str()))
            .map(String::as_str)
    }
}

/// True iff any keyword (case-folded) is a substring of the case-folded title.
///
/// Empty keywords never match here; configuration rejects them.
pub fn matches<S: AsRef<str>>(title: &str, keywords: &[S]) -> bool {
    let title = title.to_lowercase();
    keywords.iter().any(|k| {
        let k = k.as_ref();
        !k.is_empty() && title.contains(&k.to_lowercase())
    })
}
