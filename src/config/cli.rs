use crate::config::{validate_provider, DEFAULT_RETRY_DELAY_MS, DEFAULT_SETTLE_DELAY_MS};
use crate::core::matcher::DEFAULT_NO_RESULTS_MARKER;
use crate::core::{ConfigProvider, FetchPolicy};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "isbn-checker")]
#[command(about = "Check a list of ISBNs against a library catalog search")]
pub struct CliConfig {
    /// Search URL prefix, the ISBN is appended to it
    #[arg(long)]
    pub catalog_url: String,

    /// Plaintext file with one ISBN per line
    #[arg(short, long, default_value = "isbns.txt")]
    pub input: String,

    /// CSV output file, `{timestamp}` is expanded
    #[arg(short, long, default_value = "results.csv")]
    pub output: String,

    #[arg(long, default_value = DEFAULT_NO_RESULTS_MARKER)]
    pub no_results_marker: String,

    /// Regex whose first group is the hit count, replaces the marker check
    #[arg(long)]
    pub hit_count_pattern: Option<String>,

    #[arg(long, default_value_t = DEFAULT_SETTLE_DELAY_MS)]
    pub settle_delay_ms: u64,

    #[arg(long, default_value = "1")]
    pub concurrent_requests: usize,

    #[arg(long)]
    pub timeout_secs: Option<u64>,

    #[arg(long, default_value = "0")]
    pub retry_attempts: u32,

    #[arg(long, default_value_t = DEFAULT_RETRY_DELAY_MS)]
    pub retry_delay_ms: u64,

    #[arg(long)]
    pub user_agent: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

impl ConfigProvider for CliConfig {
    fn catalog_url(&self) -> &str {
        &self.catalog_url
    }

    fn no_results_marker(&self) -> &str {
        &self.no_results_marker
    }

    fn hit_count_pattern(&self) -> Option<&str> {
        self.hit_count_pattern.as_deref()
    }

    fn input_path(&self) -> &str {
        &self.input
    }

    fn output_path(&self) -> &str {
        &self.output
    }

    fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    fn concurrent_requests(&self) -> usize {
        self.concurrent_requests
    }

    fn fetch_policy(&self) -> FetchPolicy {
        FetchPolicy {
            timeout: self.timeout_secs.map(Duration::from_secs),
            retry_attempts: self.retry_attempts,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }

    fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}
