use crate::core::CatalogQuery;

/// Appends the ISBN to the configured search prefix as is. Nothing is escaped.
pub fn build_query(base: &str, isbn: &str) -> CatalogQuery {
    CatalogQuery::new(format!("{}{}", base, isbn))
}
