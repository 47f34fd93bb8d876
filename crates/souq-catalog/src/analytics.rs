//! Cross-market shop analytics.
//!
//! Each market database carries a single `merged_analytics` document
//! written by the offline merge job. The shape drifted over time: the
//! `analytics.shops` entry is an array in older documents and a map keyed
//! by shop name in newer ones, so both are accepted. A market whose
//! document cannot be fetched is logged and skipped rather than failing
//! the whole response.

use mongodb::Client;
use mongodb::bson::{Bson, Document, doc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

use crate::market::{MarketProfile, PARA, RETAIL};
use crate::parse;

const MERGED_ANALYTICS: &str = "merged_analytics";

/// Average price of one shop across its whole catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopAverage {
    pub name: String,
    pub average_price: f64,
    pub logo_url: Option<String>,
}

/// Per-shop product totals from the last merge run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeStats {
    pub shop_totals: HashMap<String, i64>,
    pub common_products: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeStatsResponse {
    pub para: Option<MergeStats>,
    pub retails: Option<MergeStats>,
}

/// Full per-shop statistics from the last merge run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopDetailedStats {
    pub name: String,
    pub product_count: i64,
    pub available_count: i64,
    pub total_price: f64,
    pub average_price: f64,
    pub cheapest_product_count: i64,
    pub discount_count: i64,
    pub total_discount_value: f64,
    pub average_discount_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedAnalyticsResponse {
    pub para_shops: Vec<ShopDetailedStats>,
    pub retails_shops: Vec<ShopDetailedStats>,
}

#[derive(Clone)]
pub struct AnalyticsService {
    client: Client,
}

impl AnalyticsService {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn market_doc(&self, profile: &MarketProfile) -> Option<Document> {
        let result = self
            .client
            .database(profile.db_name)
            .collection::<Document>(MERGED_ANALYTICS)
            .find_one(doc! {})
            .await;

        match result {
            Ok(doc) => doc,
            Err(e) => {
                warn!("Failed to fetch {} analytics: {}", profile.name, e);
                None
            }
        }
    }

    /// Average prices of every shop across both markets, retail first.
    pub async fn shop_prices(&self) -> Vec<ShopAverage> {
        let mut shops = Vec::new();
        for profile in [&RETAIL, &PARA] {
            if let Some(doc) = self.market_doc(profile).await {
                shops.extend(parse_shop_averages(&doc));
            }
        }
        shops
    }

    /// Merge totals for both markets; a missing document yields `None`
    /// for that market.
    pub async fn merge_stats(&self) -> MergeStatsResponse {
        MergeStatsResponse {
            para: self
                .market_doc(&PARA)
                .await
                .as_ref()
                .and_then(parse_merge_stats),
            retails: self
                .market_doc(&RETAIL)
                .await
                .as_ref()
                .and_then(parse_merge_stats),
        }
    }

    /// Detailed per-shop statistics for both markets.
    pub async fn shop_details(&self) -> DetailedAnalyticsResponse {
        DetailedAnalyticsResponse {
            para_shops: self
                .market_doc(&PARA)
                .await
                .map(|doc| parse_shop_details(&doc))
                .unwrap_or_default(),
            retails_shops: self
                .market_doc(&RETAIL)
                .await
                .map(|doc| parse_shop_details(&doc))
                .unwrap_or_default(),
        }
    }
}

fn analytics_shops(doc: &Document) -> Option<&Bson> {
    doc.get_document("analytics").ok()?.get("shops")
}

fn parse_shop_averages(doc: &Document) -> Vec<ShopAverage> {
    let mut averages = Vec::new();
    match analytics_shops(doc) {
        Some(Bson::Array(shops)) => {
            for shop in shops.iter().filter_map(Bson::as_document) {
                let name = shop
                    .get_str("shop_name")
                    .or_else(|_| shop.get_str("name"))
                    .unwrap_or("Unknown");
                averages.push(ShopAverage {
                    name: name.to_string(),
                    average_price: numeric(shop, "average_price"),
                    logo_url: None,
                });
            }
        }
        Some(Bson::Document(shops)) => {
            for (name, data) in shops {
                if let Some(data) = data.as_document() {
                    averages.push(ShopAverage {
                        name: name.clone(),
                        average_price: numeric(data, "average_price"),
                        logo_url: None,
                    });
                }
            }
        }
        _ => {}
    }
    averages
}

fn parse_merge_stats(doc: &Document) -> Option<MergeStats> {
    let merge_stats = doc.get_document("merge_stats").ok()?;

    let shop_totals = merge_stats
        .iter()
        .filter(|(key, _)| key.ends_with("_total"))
        .filter_map(|(key, value)| parse::bson_i64(value).map(|v| (key.clone(), v)))
        .collect();

    Some(MergeStats {
        shop_totals,
        common_products: merge_stats
            .get("common_products")
            .and_then(parse::bson_i64)
            .unwrap_or(0),
    })
}

fn parse_shop_details(doc: &Document) -> Vec<ShopDetailedStats> {
    let Some(Bson::Document(shops)) = analytics_shops(doc) else {
        return Vec::new();
    };

    shops
        .iter()
        .filter_map(|(name, data)| {
            let data = data.as_document()?;
            Some(ShopDetailedStats {
                name: name.clone(),
                product_count: integer(data, "product_count"),
                available_count: integer(data, "available_count"),
                total_price: numeric(data, "total_price"),
                average_price: numeric(data, "average_price"),
                cheapest_product_count: integer(data, "cheapest_product_count"),
                discount_count: integer(data, "discount_count"),
                total_discount_value: numeric(data, "total_discount_value"),
                average_discount_percent: numeric(data, "average_discount_percent"),
            })
        })
        .collect()
}

fn numeric(doc: &Document, key: &str) -> f64 {
    doc.get(key).and_then(parse::bson_f64).unwrap_or(0.0)
}

fn integer(doc: &Document, key: &str) -> i64 {
    doc.get(key).and_then(parse::bson_i64).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shop_averages_array_shape() {
        let raw = doc! {
            "analytics": {
                "shops": [
                    { "shop_name": "mytek", "average_price": 870.5 },
                    { "name": "spacenet", "average_price": 912_i32 },
                    { "average_price": 100.0 },
                ]
            }
        };

        let averages = parse_shop_averages(&raw);
        assert_eq!(averages.len(), 3);
        assert_eq!(averages[0].name, "mytek");
        assert_eq!(averages[0].average_price, 870.5);
        assert_eq!(averages[1].name, "spacenet");
        assert_eq!(averages[1].average_price, 912.0);
        assert_eq!(averages[2].name, "Unknown");
        assert!(averages.iter().all(|a| a.logo_url.is_none()));
    }

    #[test]
    fn test_parse_shop_averages_map_shape() {
        let raw = doc! {
            "analytics": {
                "shops": {
                    "parashop": { "average_price": 42.3 },
                    "parafendri": { "average_price": 38.9 },
                }
            }
        };

        let averages = parse_shop_averages(&raw);
        assert_eq!(averages.len(), 2);
        assert!(averages.iter().any(|a| a.name == "parashop"));
    }

    #[test]
    fn test_parse_merge_stats_extracts_totals() {
        let raw = doc! {
            "merge_stats": {
                "parashop_total": 4571_i32,
                "pharma_shop_total": 2995_i64,
                "common_products": 812_i32,
                "duration_seconds": 93.5,
            }
        };

        let stats = parse_merge_stats(&raw).unwrap();
        assert_eq!(stats.shop_totals.len(), 2);
        assert_eq!(stats.shop_totals["parashop_total"], 4571);
        assert_eq!(stats.shop_totals["pharma_shop_total"], 2995);
        assert_eq!(stats.common_products, 812);
    }

    #[test]
    fn test_parse_merge_stats_missing_section() {
        assert!(parse_merge_stats(&doc! { "analytics": {} }).is_none());
    }

    #[test]
    fn test_parse_shop_details() {
        let raw = doc! {
            "analytics": {
                "shops": {
                    "mytek": {
                        "product_count": 12000_i32,
                        "available_count": 9000_i32,
                        "total_price": 1.2e7,
                        "average_price": 1000.0,
                        "cheapest_product_count": 4000_i32,
                        "discount_count": 800_i32,
                        "total_discount_value": 52000.0,
                        "average_discount_percent": 6.5,
                    }
                }
            }
        };

        let details = parse_shop_details(&raw);
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].name, "mytek");
        assert_eq!(details[0].product_count, 12000);
        assert_eq!(details[0].average_discount_percent, 6.5);
    }
}
