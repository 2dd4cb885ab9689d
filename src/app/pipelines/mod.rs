pub mod catalog_pipeline;
