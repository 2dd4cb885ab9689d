use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// 單一 ISBN 的查詢結果，建立後不再變動
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub isbn: String,
    #[serde(rename = "match")]
    pub found: bool,
}

impl MatchResult {
    pub fn new(isbn: impl Into<String>, found: bool) -> Self {
        Self {
            isbn: isbn.into(),
            found,
        }
    }

    pub fn not_found(isbn: impl Into<String>) -> Self {
        Self::new(isbn, false)
    }
}

/// A catalog search address. Built per lookup and never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery(String);

impl CatalogQuery {
    pub(crate) fn new(url: String) -> Self {
        Self(url)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CatalogQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a single catalog fetch is guarded.
///
/// The default has no timeout and no retries, so a failing fetch aborts the batch
/// on the first attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchPolicy {
    pub timeout: Option<Duration>,
    pub retry_attempts: u32,
    pub retry_delay: Duration,
}
