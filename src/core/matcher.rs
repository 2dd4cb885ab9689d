use crate::core::MatchStrategy;
use crate::utils::error::Result;
use regex::Regex;
use std::sync::OnceLock;

pub const DEFAULT_NO_RESULTS_MARKER: &str = "No records found";

/// Not found iff the page text contains the catalog's "zero hits" phrase.
#[derive(Debug, Clone)]
pub struct MarkerMatch {
    marker: String,
}

impl MarkerMatch {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }
}

impl Default for MarkerMatch {
    fn default() -> Self {
        Self::new(DEFAULT_NO_RESULTS_MARKER)
    }
}

impl MatchStrategy for MarkerMatch {
    fn is_found(&self, page_text: &str) -> bool {
        !page_text.contains(&self.marker)
    }
}

/// Reads the hit count from the first capture group of `pattern`.
///
/// A page where the pattern does not match counts as zero hits.
#[derive(Debug, Clone)]
pub struct HitCountMatch {
    pattern: Regex,
}

impl HitCountMatch {
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    pub fn hit_count(&self, page_text: &str) -> Option<u64> {
        let caps = self.pattern.captures(page_text)?;
        // 目錄常用千分位，例如 "1,204 results"
        let digits: String = caps
            .get(1)?
            .as_str()
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect();
        if digits.is_empty() {
            return None;
        }
        // 超出 u64 的數字一律視為最大值
        Some(digits.parse().unwrap_or(u64::MAX))
    }
}

impl MatchStrategy for HitCountMatch {
    fn is_found(&self, page_text: &str) -> bool {
        self.hit_count(page_text).is_some_and(|count| count > 0)
    }
}

/// Picks the strategy from the config: a hit count pattern wins over the marker.
pub fn strategy_from(marker: &str, hit_count_pattern: Option<&str>) -> Result<Box<dyn MatchStrategy>> {
    match hit_count_pattern {
        Some(pattern) => Ok(Box::new(HitCountMatch::new(pattern)?)),
        None => Ok(Box::new(MarkerMatch::new(marker))),
    }
}

fn html_patterns() -> &'static (Regex, Regex, Regex) {
    static PATTERNS: OnceLock<(Regex, Regex, Regex)> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        (
            Regex::new(r"(?is)<(script|style|noscript)\b.*?</(script|style|noscript)\s*>")
                .expect("static regex"),
            Regex::new(r"(?s)<!--.*?-->|<[^>]*>").expect("static regex"),
            Regex::new(r"\s+").expect("static regex"),
        )
    })
}

/// Renders an HTML page to the text a reader would see.
pub fn html_to_text(html: &str) -> String {
    let (blocks, tags, spaces) = html_patterns();

    let without_blocks = blocks.replace_all(html, " ");
    let without_tags = tags.replace_all(&without_blocks, " ");
    let decoded = without_tags
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    spaces.replace_all(&decoded, " ").trim().to_string()
}
