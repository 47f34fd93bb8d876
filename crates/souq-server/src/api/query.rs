//! Query string parameters shared by the catalog routes.

use serde::Deserialize;
use validator::Validate;

fn default_limit() -> i64 {
    10
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    20
}

#[derive(Debug, Deserialize)]
pub struct RandomQuery {
    pub category: String,
    pub category_type: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ListingQuery {
    pub category: Option<String>,
    pub category_type: Option<String>,
    pub search: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    #[serde(default)]
    pub in_stock: bool,
    #[serde(default = "default_page")]
    #[validate(range(min = 1))]
    pub page: i64,
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 100))]
    pub limit: i64,
}

#[derive(Debug, Deserialize)]
pub struct CategoryTypeQuery {
    #[serde(rename = "type")]
    pub category_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub category: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(query: &str) -> ListingQuery {
        serde_json::from_str(query).unwrap()
    }

    #[test]
    fn test_listing_defaults() {
        let query = listing("{}");
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 20);
        assert!(!query.in_stock);
        assert!(query.category.is_none());
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_listing_rejects_bad_pagination() {
        assert!(listing(r#"{"page": 0}"#).validate().is_err());
        assert!(listing(r#"{"limit": 101}"#).validate().is_err());
        assert!(listing(r#"{"page": 3, "limit": 100}"#).validate().is_ok());
    }

    #[test]
    fn test_category_type_rename() {
        let query: CategoryTypeQuery = serde_json::from_str(r#"{"type": "low"}"#).unwrap();
        assert_eq!(query.category_type.as_deref(), Some("low"));
    }
}
