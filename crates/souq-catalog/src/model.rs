//! Catalog response models.
//!
//! Field names follow the JSON contract the storefront consumes, which is
//! camelCase for product payloads and snake_case for the analytics ones.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One shop's offer on a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopPrice {
    pub shop: String,
    pub price: f64,
    pub old_price: Option<f64>,
    pub available: bool,
    pub url: Option<String>,
}

/// A product with offers aggregated across shops.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub best_price: f64,
    pub original_price: Option<f64>,
    pub image: String,
    pub description: String,
    pub in_stock: bool,
    /// Empty when no category field is present on the source document.
    #[serde(default)]
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_category: Option<String>,
    pub shop_prices: Vec<ShopPrice>,
    pub specifications: Option<serde_json::Map<String, Value>>,
}

/// One page of a filtered product listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

/// Compact product shape returned by autocomplete search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub best_price: f64,
    pub image: String,
    pub in_stock: bool,
}

impl From<&Product> for SearchResult {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            brand: product.brand.clone(),
            best_price: product.best_price,
            image: product.image.clone(),
            in_stock: product.in_stock,
        }
    }
}

/// Price position of one shop within a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopRanking {
    pub shop: String,
    pub avg_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub product_count: i64,
}

/// Precomputed cheapest-shop analytics for one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryAnalytics {
    pub category: String,
    pub cheapest_shop: String,
    pub cheapest_avg_price: f64,
    pub shop_rankings: Vec<ShopRanking>,
    pub only_available: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_serializes_camel_case() {
        let product = Product {
            id: "abc".to_string(),
            name: "Laptop".to_string(),
            brand: "ASUS".to_string(),
            best_price: 2499.0,
            original_price: Some(2799.0),
            image: "/img.jpg".to_string(),
            description: "Laptop".to_string(),
            in_stock: true,
            category: "Informatique".to_string(),
            top_category: None,
            shop_prices: vec![],
            specifications: None,
        };

        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["bestPrice"], 2499.0);
        assert_eq!(json["originalPrice"], 2799.0);
        assert_eq!(json["inStock"], true);
        assert_eq!(json["category"], "Informatique");
        assert!(json.get("topCategory").is_none());
        assert!(json["shopPrices"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_search_result_from_product() {
        let product = Product {
            id: "abc".to_string(),
            name: "Serum".to_string(),
            brand: "AVENE".to_string(),
            best_price: 54.9,
            original_price: None,
            image: "/img.jpg".to_string(),
            description: "Serum".to_string(),
            in_stock: false,
            category: String::new(),
            top_category: Some("Visage".to_string()),
            shop_prices: vec![],
            specifications: None,
        };

        let result = SearchResult::from(&product);
        assert_eq!(result.id, "abc");
        assert_eq!(result.best_price, 54.9);
        assert!(!result.in_stock);
    }

    #[test]
    fn test_shop_ranking_snake_case() {
        let ranking = ShopRanking {
            shop: "mytek".to_string(),
            avg_price: 100.0,
            min_price: 50.0,
            max_price: 150.0,
            product_count: 12,
        };
        let json = serde_json::to_value(&ranking).unwrap();
        assert_eq!(json["avg_price"], 100.0);
        assert_eq!(json["product_count"], 12);
    }
}
