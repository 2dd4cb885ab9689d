use crate::core::Pipeline;
use crate::utils::error::Result;

pub struct CheckEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> CheckEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting catalog check");

        let isbns = self.pipeline.extract().await?;
        tracing::info!("📥 Read {} ISBNs", isbns.len());

        let results = self.pipeline.transform(isbns).await?;
        let found = results.iter().filter(|r| r.found).count();
        tracing::info!("📊 {} of {} ISBNs found in the catalog", found, results.len());

        let output_path = self.pipeline.load(results).await?;
        tracing::info!("📁 Results saved to: {}", output_path);

        Ok(output_path)
    }
}
