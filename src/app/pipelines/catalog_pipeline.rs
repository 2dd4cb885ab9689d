use crate::config::resolve_output_path;
use crate::core::batch::BatchRunner;
use crate::core::matcher::strategy_from;
use crate::core::report::write_results;
use crate::core::{ConfigProvider, MatchResult, Pipeline, SessionFactory, Storage};
use crate::utils::error::Result;

/// Input file → catalog lookups → CSV report.
pub struct CatalogPipeline<S: Storage, C: ConfigProvider, F: SessionFactory> {
    storage: S,
    config: C,
    factory: F,
    runner: BatchRunner,
}

impl<S: Storage, C: ConfigProvider, F: SessionFactory> CatalogPipeline<S, C, F> {
    pub fn new(storage: S, config: C, factory: F) -> Result<Self> {
        let matcher = strategy_from(config.no_results_marker(), config.hit_count_pattern())?;
        let runner = BatchRunner::new(config.catalog_url(), matcher)
            .with_settle_delay(config.settle_delay())
            .with_policy(config.fetch_policy())
            .with_concurrency(config.concurrent_requests());

        Ok(Self {
            storage,
            config,
            factory,
            runner,
        })
    }
}

/// One ISBN per line. Surrounding whitespace is trimmed, blank lines and `#`
/// comments are skipped.
pub fn parse_isbn_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, F: SessionFactory> Pipeline for CatalogPipeline<S, C, F> {
    async fn extract(&self) -> Result<Vec<String>> {
        let path = self.config.input_path();
        tracing::debug!("Reading ISBN list from {}", path);

        let data = self.storage.read_file(path).await?;
        // 容忍 BOM 與非 UTF-8 的舊檔
        let content = String::from_utf8_lossy(&data);
        Ok(parse_isbn_list(content.trim_start_matches('\u{feff}')))
    }

    async fn transform(&self, isbns: Vec<String>) -> Result<Vec<MatchResult>> {
        self.runner.run_scoped(&self.factory, &isbns).await
    }

    async fn load(&self, results: Vec<MatchResult>) -> Result<String> {
        let output_path = resolve_output_path(self.config.output_path());
        let data = write_results(&results)?;

        tracing::debug!("Writing {} results ({} bytes) to {}", results.len(), data.len(), output_path);
        self.storage.write_file(&output_path, &data).await?;
        Ok(output_path)
    }
}
