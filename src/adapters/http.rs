use crate::core::matcher::html_to_text;
use crate::core::{CatalogQuery, CatalogSession, SessionFactory};
use crate::utils::error::{CheckError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = concat!("isbn-checker/", env!("CARGO_PKG_VERSION"));

/// Opens HTTP sessions against the catalog web search.
#[derive(Debug, Clone)]
pub struct HttpSessionFactory {
    user_agent: String,
    connect_timeout: Option<Duration>,
}

impl HttpSessionFactory {
    pub fn new() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout: None,
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

impl Default for HttpSessionFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionFactory for HttpSessionFactory {
    type Session = HttpCatalogSession;

    async fn open(&self) -> Result<HttpCatalogSession> {
        // cookie 由同一個 client 保存，整批查詢共用
        let mut builder = Client::builder().user_agent(&self.user_agent);
        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let client = builder.build()?;

        Ok(HttpCatalogSession {
            client,
            closed: AtomicBool::new(false),
        })
    }
}

pub struct HttpCatalogSession {
    client: Client,
    closed: AtomicBool,
}

#[async_trait]
impl CatalogSession for HttpCatalogSession {
    async fn fetch_page(&self, query: &CatalogQuery) -> Result<String> {
        if self.closed.load(Ordering::Acquire) {
            return Err(CheckError::SessionError {
                message: "session already closed".to_string(),
            });
        }

        tracing::debug!("Making catalog request to: {}", query);
        let response = self.client.get(query.as_str()).send().await?;
        tracing::debug!("Catalog response status: {}", response.status());

        let html = response.error_for_status()?.text().await?;
        Ok(html_to_text(&html))
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}
