pub mod pipelines;

use crate::adapters::{HttpSessionFactory, LocalStorage};
use crate::core::engine::CheckEngine;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use pipelines::catalog_pipeline::CatalogPipeline;

/// Wires the local file storage and the HTTP catalog session to `config` and runs
/// one batch. Returns the path of the written CSV.
pub async fn run_check<C: ConfigProvider>(config: C) -> Result<String> {
    let mut factory = HttpSessionFactory::new().with_connect_timeout(config.fetch_policy().timeout);
    if let Some(user_agent) = config.user_agent() {
        factory = factory.with_user_agent(user_agent);
    }

    let pipeline = CatalogPipeline::new(LocalStorage::default(), config, factory)?;
    CheckEngine::new(pipeline).run().await
}
