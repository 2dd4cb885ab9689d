use crate::config::{validate_provider, DEFAULT_RETRY_DELAY_MS, DEFAULT_SETTLE_DELAY_MS};
use crate::core::matcher::DEFAULT_NO_RESULTS_MARKER;
use crate::core::{ConfigProvider, FetchPolicy};
use crate::utils::error::{CheckError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub catalog: CatalogConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
    pub fetch: Option<FetchConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub url: String,
    pub no_results_marker: Option<String>,
    pub hit_count_pattern: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchConfig {
    pub settle_delay_ms: Option<u64>,
    pub concurrent_requests: Option<usize>,
    pub timeout_seconds: Option<u64>,
    pub retry_attempts: Option<u32>,
    pub retry_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub verbose: Option<bool>,
    pub json: Option<bool>,
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static regex"))
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);

        toml::from_str(&processed).map_err(|e| CheckError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CATALOG_URL})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    fn fetch(&self) -> FetchConfig {
        self.fetch.clone().unwrap_or_default()
    }

    pub fn verbose(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.verbose).unwrap_or(false)
    }

    pub fn log_json(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn catalog_url(&self) -> &str {
        &self.catalog.url
    }

    fn no_results_marker(&self) -> &str {
        self.catalog
            .no_results_marker
            .as_deref()
            .unwrap_or(DEFAULT_NO_RESULTS_MARKER)
    }

    fn hit_count_pattern(&self) -> Option<&str> {
        self.catalog.hit_count_pattern.as_deref()
    }

    fn input_path(&self) -> &str {
        &self.input.path
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.fetch().settle_delay_ms.unwrap_or(DEFAULT_SETTLE_DELAY_MS))
    }

    fn concurrent_requests(&self) -> usize {
        self.fetch().concurrent_requests.unwrap_or(1)
    }

    fn fetch_policy(&self) -> FetchPolicy {
        let fetch = self.fetch();
        FetchPolicy {
            timeout: fetch.timeout_seconds.map(Duration::from_secs),
            retry_attempts: fetch.retry_attempts.unwrap_or(0),
            retry_delay: Duration::from_millis(fetch.retry_delay_ms.unwrap_or(DEFAULT_RETRY_DELAY_MS)),
        }
    }

    fn user_agent(&self) -> Option<&str> {
        self.catalog.user_agent.as_deref()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}
