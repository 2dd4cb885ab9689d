#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use toml_config::TomlConfig;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation;

pub const DEFAULT_SETTLE_DELAY_MS: u64 = 3000;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

/// Checks shared by every config source.
pub fn validate_provider<C: ConfigProvider + ?Sized>(config: &C) -> Result<()> {
    validation::validate_url("catalog_url", config.catalog_url())?;
    validation::validate_path("input", config.input_path())?;
    validation::validate_path("output", config.output_path())?;
    validation::validate_positive_number("concurrent_requests", config.concurrent_requests(), 1)?;
    if let Some(timeout) = config.fetch_policy().timeout {
        validation::validate_positive_number("timeout", timeout.as_millis() as usize, 1)?;
    }

    match config.hit_count_pattern() {
        Some(pattern) => validation::validate_hit_count_pattern("hit_count_pattern", pattern)?,
        None => validation::validate_non_empty_string("no_results_marker", config.no_results_marker())?,
    }

    Ok(())
}

/// 將輸出路徑中的 `{timestamp}` 換成 UTC 時間
pub fn resolve_output_path(path: &str) -> String {
    if path.contains("{timestamp}") {
        path.replace(
            "{timestamp}",
            &chrono::Utc::now().format("%Y%m%d_%H%M%S").to_string(),
        )
    } else {
        path.to_string()
    }
}
