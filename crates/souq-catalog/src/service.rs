//! Market-agnostic catalog queries.

use std::collections::HashSet;

use futures::TryStreamExt;
use mongodb::bson::{Bson, Document, doc, oid::ObjectId};
use mongodb::{Client, Collection, Database};

use crate::market::{CategoryField, MarketProfile};
use crate::model::{CategoryAnalytics, Product, ProductPage, SearchResult, ShopRanking};
use crate::parse::{self, parse_merged_product, parse_shop_product};
use crate::pipeline::{self, ListingFilter};

const MERGED_PRODUCTS: &str = "merged_products";
const CATEGORY_ANALYTICS: &str = "analytics_cheapest_by_category";

/// Most results a random sample may return.
pub const MAX_RANDOM_LIMIT: i64 = 10;

/// Autocomplete queries shorter than this return nothing.
pub const MIN_SEARCH_LENGTH: usize = 2;

/// Catalog queries for one market.
#[derive(Clone)]
pub struct CatalogService {
    db: Database,
    profile: &'static MarketProfile,
}

impl CatalogService {
    pub fn new(client: &Client, profile: &'static MarketProfile) -> Self {
        Self {
            db: client.database(profile.db_name),
            profile,
        }
    }

    pub fn profile(&self) -> &'static MarketProfile {
        self.profile
    }

    fn merged(&self) -> Collection<Document> {
        self.db.collection(MERGED_PRODUCTS)
    }

    /// Distinct non-empty values of a category field, sorted.
    pub async fn categories(&self, field: CategoryField) -> anyhow::Result<Vec<String>> {
        let values = self.merged().distinct(field.as_str(), doc! {}).await?;
        let mut categories: Vec<String> = values
            .into_iter()
            .filter_map(|v| match v {
                Bson::String(s) if !s.is_empty() => Some(s),
                _ => None,
            })
            .collect();
        categories.sort();
        Ok(categories)
    }

    /// Random products in one category.
    pub async fn random(
        &self,
        category: &str,
        category_type: Option<&str>,
        limit: i64,
    ) -> anyhow::Result<Vec<Product>> {
        let field = self.profile.resolve_field(category_type.unwrap_or_default());
        let limit = sample_size(limit);

        let mut cursor = self
            .merged()
            .aggregate(pipeline::random_pipeline(field, category, limit))
            .await?;

        let mut products = Vec::new();
        while let Some(raw) = cursor.try_next().await? {
            products.push(parse_merged_product(&raw, self.profile, Some(category), false));
        }
        Ok(products)
    }

    /// Look up a product by its id, falling back to the per-shop
    /// collections for products that were never merged.
    pub async fn by_id(&self, product_id: &str) -> anyhow::Result<Option<Product>> {
        let Ok(oid) = ObjectId::parse_str(product_id) else {
            return Ok(None);
        };
        self.find_product(doc! { "_id": oid }).await
    }

    /// Look up a product by SKU, same fallback as [`Self::by_id`].
    pub async fn by_sku(&self, sku: &str) -> anyhow::Result<Option<Product>> {
        self.find_product(doc! { "sku": sku }).await
    }

    async fn find_product(&self, filter: Document) -> anyhow::Result<Option<Product>> {
        if let Some(raw) = self.merged().find_one(filter.clone()).await? {
            return Ok(Some(parse_merged_product(&raw, self.profile, None, true)));
        }

        for (shop, collection_name) in self.profile.detail_collections() {
            let collection: Collection<Document> = self.db.collection(&collection_name);
            if let Some(raw) = collection.find_one(filter.clone()).await? {
                return Ok(Some(parse_shop_product(&raw, shop, self.profile)));
            }
        }

        Ok(None)
    }

    /// Title-or-SKU autocomplete. Merged products are preferred; per-shop
    /// collections only fill the remainder, deduplicated by SKU.
    pub async fn search(&self, query: &str, limit: i64) -> anyhow::Result<Vec<SearchResult>> {
        if below_min_search_length(query) {
            return Ok(Vec::new());
        }

        let filter = pipeline::search_filter(query);
        let mut results: Vec<SearchResult> = Vec::new();
        let mut seen_skus: HashSet<String> = HashSet::new();

        let mut cursor = self.merged().find(filter.clone()).limit(limit).await?;
        while let Some(raw) = cursor.try_next().await? {
            if let Some(sku) = raw.get_str("sku").ok().filter(|s| !s.is_empty())
                && seen_skus.insert(sku.to_string())
            {
                let product = parse_merged_product(&raw, self.profile, None, false);
                results.push(SearchResult::from(&product));
            }
        }

        for (shop, collection_name) in self.profile.detail_collections() {
            let remaining = limit - results.len() as i64;
            if remaining <= 0 {
                break;
            }

            let collection: Collection<Document> = self.db.collection(&collection_name);
            let mut cursor = collection.find(filter.clone()).limit(remaining).await?;
            while let Some(raw) = cursor.try_next().await? {
                if let Some(sku) = raw.get_str("sku").ok().filter(|s| !s.is_empty())
                    && seen_skus.insert(sku.to_string())
                {
                    let product = parse_shop_product(&raw, shop, self.profile);
                    results.push(SearchResult::from(&product));
                    if results.len() as i64 >= limit {
                        break;
                    }
                }
            }
        }

        results.truncate(limit.max(0) as usize);
        Ok(results)
    }

    /// Filtered, paginated listing.
    #[allow(clippy::too_many_arguments)]
    pub async fn listing(
        &self,
        category: Option<&str>,
        category_type: Option<&str>,
        search: Option<&str>,
        min_price: Option<f64>,
        max_price: Option<f64>,
        in_stock_only: bool,
        page: i64,
        limit: i64,
    ) -> anyhow::Result<ProductPage> {
        let filter = ListingFilter {
            category: category.map(|c| {
                (
                    self.profile.resolve_field(category_type.unwrap_or_default()),
                    c.to_string(),
                )
            }),
            search: search.map(String::from),
            min_price,
            max_price,
            in_stock_only,
            page,
            limit,
        };

        let mut cursor = self
            .merged()
            .aggregate(pipeline::listing_pipeline(&filter))
            .await?;

        // $facet always yields exactly one document
        let facet = cursor.try_next().await?.unwrap_or_default();

        let total = facet
            .get_array("metadata")
            .ok()
            .and_then(|metadata| metadata.first())
            .and_then(Bson::as_document)
            .and_then(|m| m.get("total"))
            .and_then(parse::bson_i64)
            .unwrap_or(0);

        let products = facet
            .get_array("products")
            .map(|raw| {
                raw.iter()
                    .filter_map(Bson::as_document)
                    .map(|p| parse_merged_product(p, self.profile, None, false))
                    .collect()
            })
            .unwrap_or_default();

        let total_pages = if total > 0 { (total + limit - 1) / limit } else { 1 };

        Ok(ProductPage {
            products,
            total,
            page,
            limit,
            total_pages,
        })
    }

    /// Categories with precomputed cheapest-shop analytics.
    pub async fn analytics_categories(&self) -> anyhow::Result<Vec<String>> {
        let collection: Collection<Document> = self.db.collection(CATEGORY_ANALYTICS);
        let values = collection.distinct("category", doc! {}).await?;
        let mut categories: Vec<String> = values
            .into_iter()
            .filter_map(|v| match v {
                Bson::String(s) => Some(s),
                _ => None,
            })
            .collect();
        categories.sort();
        Ok(categories)
    }

    /// Shop rankings for one category, if analytics were computed for it.
    pub async fn category_analytics(
        &self,
        category: &str,
    ) -> anyhow::Result<Option<CategoryAnalytics>> {
        let collection: Collection<Document> = self.db.collection(CATEGORY_ANALYTICS);
        let Some(raw) = collection.find_one(doc! { "category": category }).await? else {
            return Ok(None);
        };

        let shop_rankings = raw
            .get_array("shop_rankings")
            .map(|rankings| {
                rankings
                    .iter()
                    .filter_map(Bson::as_document)
                    .map(|r| ShopRanking {
                        shop: r.get_str("shop").unwrap_or_default().to_string(),
                        avg_price: round2(numeric(r, "avg_price")),
                        min_price: round2(numeric(r, "min_price")),
                        max_price: round2(numeric(r, "max_price")),
                        product_count: r.get("product_count").and_then(parse::bson_i64).unwrap_or(0),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(Some(CategoryAnalytics {
            category: raw.get_str("category").unwrap_or_default().to_string(),
            cheapest_shop: raw.get_str("cheapest_shop").unwrap_or_default().to_string(),
            cheapest_avg_price: round2(numeric(&raw, "cheapest_avg_price")),
            shop_rankings,
            only_available: raw.get_bool("only_available").unwrap_or(true),
        }))
    }
}

/// Characters, not bytes, so accented queries are measured correctly.
fn below_min_search_length(query: &str) -> bool {
    query.chars().count() < MIN_SEARCH_LENGTH
}

/// `$sample` size for a requested limit; zero stays zero.
fn sample_size(limit: i64) -> i64 {
    limit.clamp(0, MAX_RANDOM_LIMIT)
}

fn numeric(doc: &Document, key: &str) -> f64 {
    doc.get(key).and_then(parse::bson_f64).unwrap_or(0.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_below_min_search_length_counts_chars() {
        assert!(below_min_search_length(""));
        assert!(below_min_search_length("a"));
        // One accented character is still one character
        assert!(below_min_search_length("é"));
        assert!(!below_min_search_length("ab"));
        assert!(!below_min_search_length("ét"));
    }

    #[test]
    fn test_sample_size_bounds() {
        assert_eq!(sample_size(0), 0);
        assert_eq!(sample_size(-3), 0);
        assert_eq!(sample_size(5), 5);
        assert_eq!(sample_size(50), MAX_RANDOM_LIMIT);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(12.345), 12.35);
        assert_eq!(round2(12.344), 12.34);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn test_numeric_lenient() {
        let raw = doc! { "a": 1.5, "b": 2_i32, "c": "3.5", "d": Bson::Null };
        assert_eq!(numeric(&raw, "a"), 1.5);
        assert_eq!(numeric(&raw, "b"), 2.0);
        assert_eq!(numeric(&raw, "c"), 3.5);
        assert_eq!(numeric(&raw, "d"), 0.0);
        assert_eq!(numeric(&raw, "missing"), 0.0);
    }
}
