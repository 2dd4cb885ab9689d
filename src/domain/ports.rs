use crate::domain::model::{CatalogQuery, FetchPolicy, MatchResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn catalog_url(&self) -> &str;
    fn no_results_marker(&self) -> &str;
    /// When set, the hit count regex replaces the marker check.
    fn hit_count_pattern(&self) -> Option<&str>;
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn settle_delay(&self) -> Duration;
    fn concurrent_requests(&self) -> usize;
    fn fetch_policy(&self) -> FetchPolicy;
    fn user_agent(&self) -> Option<&str>;
}

/// An open connection to the catalog, shared by every lookup of one batch.
#[async_trait]
pub trait CatalogSession: Send + Sync {
    /// Navigates to `query` and returns the rendered page text.
    async fn fetch_page(&self, query: &CatalogQuery) -> Result<String>;

    /// Releases the session. Called exactly once, after the last lookup.
    async fn close(&self) -> Result<()>;
}

#[async_trait]
pub trait SessionFactory: Send + Sync {
    type Session: CatalogSession + 'static;

    async fn open(&self) -> Result<Self::Session>;
}

/// Decides from the fetched text whether the catalog holds the book.
pub trait MatchStrategy: Send + Sync {
    fn is_found(&self, page_text: &str) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<String>>;
    async fn transform(&self, isbns: Vec<String>) -> Result<Vec<MatchResult>>;
    async fn load(&self, results: Vec<MatchResult>) -> Result<String>;
}
