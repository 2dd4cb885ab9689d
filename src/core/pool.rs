use crate::core::batch::LookupContext;
use crate::core::{CatalogSession, MatchResult};
use crate::utils::error::{CheckError, Result};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Bounded-concurrency lookups over one shared session.
///
/// Each task writes into the slot of its input index, so the output order never
/// depends on which fetch finishes first.
pub struct LookupPool {
    concurrent_requests: usize,
}

impl LookupPool {
    pub fn new(concurrent_requests: usize) -> Self {
        Self {
            concurrent_requests: concurrent_requests.max(1),
        }
    }

    pub async fn run<S: CatalogSession + 'static>(
        &self,
        context: Arc<LookupContext>,
        session: Arc<S>,
        isbns: &[String],
    ) -> Result<Vec<MatchResult>> {
        let permits = Arc::new(Semaphore::new(self.concurrent_requests));
        let mut tasks = JoinSet::new();

        for (index, raw) in isbns.iter().enumerate() {
            let context = Arc::clone(&context);
            let session = Arc::clone(&session);
            let permits = Arc::clone(&permits);
            let raw = raw.clone();

            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await.map_err(|e| CheckError::SessionError {
                    message: format!("lookup pool closed: {}", e),
                })?;
                let result = context.lookup(session.as_ref(), &raw).await?;
                Ok::<_, CheckError>((index, result))
            });
        }

        let mut slots: Vec<Option<MatchResult>> = vec![None; isbns.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined? {
                Ok((index, result)) => slots[index] = Some(result),
                Err(e) => {
                    // 任一查詢失敗即中止整批
                    tasks.abort_all();
                    return Err(e);
                }
            }
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| CheckError::SessionError {
                    message: format!("no result recorded for input #{}", index + 1),
                })
            })
            .collect()
    }
}
