pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::{HttpSessionFactory, LocalStorage};
pub use app::pipelines::catalog_pipeline::CatalogPipeline;
pub use app::run_check;
pub use crate::core::{batch::BatchRunner, engine::CheckEngine};
pub use domain::model::MatchResult;
pub use utils::error::{CheckError, Result};
