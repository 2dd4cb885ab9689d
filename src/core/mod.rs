pub mod batch;
pub mod engine;
pub mod matcher;
pub mod pool;
pub mod query;
pub mod report;

pub use crate::domain::model::{CatalogQuery, FetchPolicy, MatchResult};
pub use crate::domain::ports::{
    CatalogSession, ConfigProvider, MatchStrategy, Pipeline, SessionFactory, Storage,
};
pub use crate::utils::error::Result;
