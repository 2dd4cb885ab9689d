use crate::core::pool::LookupPool;
use crate::core::query::build_query;
use crate::core::{CatalogSession, FetchPolicy, MatchResult, MatchStrategy, SessionFactory};
use crate::domain::isbn;
use crate::utils::error::{CheckError, Result};
use std::sync::Arc;
use std::time::Duration;

/// Per-lookup settings shared by the sequential loop and the pool.
#[derive(Clone)]
pub struct LookupContext {
    pub(crate) base_url: String,
    pub(crate) matcher: Arc<dyn MatchStrategy>,
    pub(crate) settle_delay: Duration,
    pub(crate) policy: FetchPolicy,
}

impl LookupContext {
    /// Checks one raw ISBN against the catalog.
    ///
    /// Only the raw input is checksum-validated. Input that fails both checksums is
    /// recorded as not found, under its padded form, without touching the session.
    /// Padding never makes an input searchable: `123456789` pads to `0123456789`,
    /// which is itself a valid ISBN-10, but it is still skipped (DESIGN.md, open
    /// question decision 1).
    pub async fn lookup<S: CatalogSession + ?Sized>(&self, session: &S, raw: &str) -> Result<MatchResult> {
        let normalized = isbn::normalize(raw);

        if !isbn::validate(raw) {
            tracing::debug!("⏭️ {} is not a valid ISBN, skipping catalog search", raw);
            return Ok(MatchResult::not_found(normalized));
        }

        let query = build_query(&self.base_url, &normalized);
        let page_text = self.fetch_with_policy(session, &normalized, &query).await?;

        // 等待頁面穩定後再判斷
        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }

        let found = self.matcher.is_found(&page_text);
        tracing::debug!("🔎 {} -> {}", normalized, if found { "found" } else { "not found" });
        Ok(MatchResult::new(normalized, found))
    }

    async fn fetch_with_policy<S: CatalogSession + ?Sized>(
        &self,
        session: &S,
        isbn: &str,
        query: &crate::core::CatalogQuery,
    ) -> Result<String> {
        let mut attempt = 0u32;
        loop {
            let result = match self.policy.timeout {
                Some(limit) => match tokio::time::timeout(limit, session.fetch_page(query)).await {
                    Ok(inner) => inner,
                    Err(_) => Err(CheckError::TimeoutError {
                        isbn: isbn.to_string(),
                        timeout: limit,
                    }),
                },
                None => session.fetch_page(query).await,
            };

            match result {
                Err(e) if e.is_retryable() && attempt < self.policy.retry_attempts => {
                    attempt += 1;
                    tracing::warn!(
                        "🔁 Fetch for {} failed ({}), retry {}/{}",
                        isbn,
                        e,
                        attempt,
                        self.policy.retry_attempts
                    );
                    tokio::time::sleep(self.policy.retry_delay).await;
                }
                other => return other,
            }
        }
    }
}

pub struct BatchRunner {
    context: LookupContext,
    concurrent_requests: usize,
}

impl BatchRunner {
    pub fn new(base_url: impl Into<String>, matcher: Box<dyn MatchStrategy>) -> Self {
        Self {
            context: LookupContext {
                base_url: base_url.into(),
                matcher: Arc::from(matcher),
                settle_delay: Duration::ZERO,
                policy: FetchPolicy::default(),
            },
            concurrent_requests: 1,
        }
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.context.settle_delay = delay;
        self
    }

    pub fn with_policy(mut self, policy: FetchPolicy) -> Self {
        self.context.policy = policy;
        self
    }

    pub fn with_concurrency(mut self, concurrent_requests: usize) -> Self {
        self.concurrent_requests = concurrent_requests.max(1);
        self
    }

    /// Runs every ISBN against an already open session. Results keep input order.
    pub async fn run<S: CatalogSession + 'static>(
        &self,
        session: Arc<S>,
        isbns: &[String],
    ) -> Result<Vec<MatchResult>> {
        tracing::info!(
            "📚 Checking {} ISBNs ({} concurrent)",
            isbns.len(),
            self.concurrent_requests
        );

        if self.concurrent_requests > 1 {
            let pool = LookupPool::new(self.concurrent_requests);
            return pool.run(Arc::new(self.context.clone()), session, isbns).await;
        }

        let mut results = Vec::with_capacity(isbns.len());
        for (index, raw) in isbns.iter().enumerate() {
            tracing::debug!("[{}/{}] {}", index + 1, isbns.len(), raw);
            results.push(self.context.lookup(session.as_ref(), raw).await?);
        }
        Ok(results)
    }

    /// Opens a session, runs the batch and closes the session on every path.
    pub async fn run_scoped<F: SessionFactory>(
        &self,
        factory: &F,
        isbns: &[String],
    ) -> Result<Vec<MatchResult>> {
        let session = Arc::new(factory.open().await?);
        tracing::debug!("🌐 Catalog session opened");

        let outcome = self.run(Arc::clone(&session), isbns).await;
        let closed = session.close().await;
        tracing::debug!("🌐 Catalog session closed");

        match (outcome, closed) {
            (Ok(results), Ok(())) => Ok(results),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(close_err)) => {
                tracing::warn!("Closing the catalog session also failed: {}", close_err);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::matcher::MarkerMatch;
    use crate::core::CatalogQuery;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const BASE: &str = "https://catalog.test/search?isbn=";

    #[derive(Default)]
    struct MockSession {
        pages: Vec<(String, String)>,
        visited: Mutex<Vec<String>>,
        fail_on: Option<String>,
        transient_failures: AtomicUsize,
        closed: AtomicUsize,
    }

    impl MockSession {
        fn with_page(mut self, isbn: &str, text: &str) -> Self {
            self.pages.push((isbn.to_string(), text.to_string()));
            self
        }

        fn visited(&self) -> Vec<String> {
            self.visited.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CatalogSession for MockSession {
        async fn fetch_page(&self, query: &CatalogQuery) -> Result<String> {
            self.visited.lock().unwrap().push(query.to_string());

            if self.transient_failures.load(Ordering::SeqCst) > 0 {
                self.transient_failures.fetch_sub(1, Ordering::SeqCst);
                return Err(CheckError::TimeoutError {
                    isbn: query.to_string(),
                    timeout: Duration::ZERO,
                });
            }
            if let Some(bad) = &self.fail_on {
                if query.as_str().ends_with(bad.as_str()) {
                    return Err(CheckError::SessionError {
                        message: "browser crashed".to_string(),
                    });
                }
            }

            Ok(self
                .pages
                .iter()
                .find(|(isbn, _)| query.as_str().ends_with(isbn.as_str()))
                .map(|(_, text)| text.clone())
                .unwrap_or_else(|| "Catalog record: Some Title".to_string()))
        }

        async fn close(&self) -> Result<()> {
            self.closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// 前 `hangs` 次查詢永遠不回應
    struct HangingSession {
        hangs: AtomicUsize,
        calls: AtomicUsize,
    }

    impl HangingSession {
        fn new(hangs: usize) -> Self {
            Self {
                hangs: AtomicUsize::new(hangs),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CatalogSession for HangingSession {
        async fn fetch_page(&self, _query: &CatalogQuery) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.hangs.load(Ordering::SeqCst) > 0 {
                self.hangs.fetch_sub(1, Ordering::SeqCst);
                std::future::pending::<()>().await;
            }
            Ok("Catalog record: Some Title".to_string())
        }

        async fn close(&self) -> Result<()> {
            Ok(())
        }
    }

    struct MockFactory {
        session: Arc<MockSession>,
    }

    struct SharedSession(Arc<MockSession>);

    #[async_trait]
    impl CatalogSession for SharedSession {
        async fn fetch_page(&self, query: &CatalogQuery) -> Result<String> {
            self.0.fetch_page(query).await
        }

        async fn close(&self) -> Result<()> {
            self.0.close().await
        }
    }

    #[async_trait]
    impl SessionFactory for MockFactory {
        type Session = SharedSession;

        async fn open(&self) -> Result<SharedSession> {
            Ok(SharedSession(Arc::clone(&self.session)))
        }
    }

    fn runner() -> BatchRunner {
        BatchRunner::new(BASE, Box::new(MarkerMatch::default()))
    }

    fn isbns(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_two_valid_isbn13_are_found_in_order() {
        let session = Arc::new(MockSession::default());
        let results = runner()
            .run(Arc::clone(&session), &isbns(&["9785990589834", "9785446904327"]))
            .await
            .unwrap();

        assert_eq!(
            results,
            vec![
                MatchResult::new("9785990589834", true),
                MatchResult::new("9785446904327", true),
            ]
        );
        assert_eq!(
            session.visited(),
            vec![
                format!("{}9785990589834", BASE),
                format!("{}9785446904327", BASE)
            ]
        );
    }

    #[tokio::test]
    async fn test_short_invalid_isbn_skips_fetch() {
        let session = Arc::new(MockSession::default());
        let results = runner()
            .run(Arc::clone(&session), &isbns(&["123456789"]))
            .await
            .unwrap();

        assert_eq!(results, vec![MatchResult::new("0123456789", false)]);
        assert!(session.visited().is_empty());
    }

    #[tokio::test]
    async fn test_marker_page_is_not_found() {
        let session = Arc::new(MockSession::default().with_page("9781781792834", "No records found"));
        let results = runner()
            .run(session, &isbns(&["9781781792834", "0306406152"]))
            .await
            .unwrap();

        assert_eq!(
            results,
            vec![
                MatchResult::new("9781781792834", false),
                MatchResult::new("0306406152", true),
            ]
        );
    }

    #[tokio::test]
    async fn test_lowercase_check_digit_is_searched_uppercase() {
        let session = Arc::new(MockSession::default());
        let results = runner()
            .run(Arc::clone(&session), &isbns(&["080442957x"]))
            .await
            .unwrap();

        assert_eq!(results, vec![MatchResult::new("080442957X", true)]);
        assert_eq!(session.visited(), vec![format!("{}080442957X", BASE)]);
    }

    #[tokio::test]
    async fn test_session_failure_halts_batch() {
        let session = Arc::new(MockSession {
            fail_on: Some("9785446904327".to_string()),
            ..Default::default()
        });
        let result = runner()
            .run(
                Arc::clone(&session),
                &isbns(&["9785990589834", "9785446904327", "9781781792834"]),
            )
            .await;

        assert!(matches!(result, Err(CheckError::SessionError { .. })));
        // 第三筆不應被查詢
        assert_eq!(session.visited().len(), 2);
    }

    #[tokio::test]
    async fn test_retry_recovers_transient_failure() {
        let session = Arc::new(MockSession {
            transient_failures: AtomicUsize::new(2),
            ..Default::default()
        });
        let policy = FetchPolicy {
            timeout: None,
            retry_attempts: 2,
            retry_delay: Duration::from_millis(1),
        };
        let results = runner()
            .with_policy(policy)
            .run(Arc::clone(&session), &isbns(&["9785990589834"]))
            .await
            .unwrap();

        assert_eq!(results, vec![MatchResult::new("9785990589834", true)]);
        assert_eq!(session.visited().len(), 3);
    }

    #[tokio::test]
    async fn test_without_retries_first_failure_is_fatal() {
        let session = Arc::new(MockSession {
            transient_failures: AtomicUsize::new(1),
            ..Default::default()
        });
        let result = runner()
            .run(Arc::clone(&session), &isbns(&["9785990589834"]))
            .await;

        assert!(matches!(result, Err(CheckError::TimeoutError { .. })));
        assert_eq!(session.visited().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_fetch_times_out_with_sub_second_limit() {
        let session = Arc::new(HangingSession::new(1));
        let policy = FetchPolicy {
            timeout: Some(Duration::from_millis(500)),
            ..Default::default()
        };
        let result = runner()
            .with_policy(policy)
            .run(Arc::clone(&session), &isbns(&["9785990589834"]))
            .await;

        match result {
            Err(err @ CheckError::TimeoutError { .. }) => {
                assert!(err.to_string().contains("500ms"), "{}", err);
            }
            other => panic!("expected a timeout, got {:?}", other),
        }
        assert_eq!(session.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_then_retry_succeeds() {
        let session = Arc::new(HangingSession::new(1));
        let policy = FetchPolicy {
            timeout: Some(Duration::from_millis(500)),
            retry_attempts: 1,
            retry_delay: Duration::from_millis(100),
        };
        let results = runner()
            .with_policy(policy)
            .run(Arc::clone(&session), &isbns(&["9785990589834"]))
            .await
            .unwrap();

        assert_eq!(results, vec![MatchResult::new("9785990589834", true)]);
        assert_eq!(session.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_padding_does_not_make_invalid_input_searchable() {
        let session = Arc::new(MockSession::default());
        // 80442957X 補零後是合法的 080442957X，但原始輸入未通過檢查碼
        let results = runner()
            .run(Arc::clone(&session), &isbns(&["80442957x", "080442957x"]))
            .await
            .unwrap();

        assert_eq!(
            results,
            vec![
                MatchResult::new("080442957X", false),
                MatchResult::new("080442957X", true),
            ]
        );
        assert_eq!(session.visited(), vec![format!("{}080442957X", BASE)]);
    }

    #[tokio::test]
    async fn test_run_scoped_closes_session_on_success_and_error() {
        let session = Arc::new(MockSession::default());
        let factory = MockFactory {
            session: Arc::clone(&session),
        };
        runner()
            .run_scoped(&factory, &isbns(&["9785990589834"]))
            .await
            .unwrap();
        assert_eq!(session.closed.load(Ordering::SeqCst), 1);

        let failing = Arc::new(MockSession {
            fail_on: Some("9785990589834".to_string()),
            ..Default::default()
        });
        let factory = MockFactory {
            session: Arc::clone(&failing),
        };
        let result = runner()
            .run_scoped(&factory, &isbns(&["9785990589834"]))
            .await;
        assert!(result.is_err());
        assert_eq!(failing.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_delay_is_applied_per_fetch() {
        let session = Arc::new(MockSession::default());
        let start = tokio::time::Instant::now();
        runner()
            .with_settle_delay(Duration::from_secs(3))
            .run(session, &isbns(&["9785990589834", "123", "9785446904327"]))
            .await
            .unwrap();

        // 無效的 ISBN 不等待
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(6) && elapsed < Duration::from_secs(7));
    }
}
