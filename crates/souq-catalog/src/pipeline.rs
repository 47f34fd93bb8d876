//! Aggregation pipelines over `merged_products`.

use mongodb::bson::{Document, doc};

use crate::market::CategoryField;

/// Sentinel used when a shop entry has no usable price. Keeps priceless
/// products out of `max_price` filters without dropping them from the
/// unfiltered listing.
pub const MISSING_PRICE_SENTINEL: i64 = 9_999_999;

/// Listing filters, already resolved against a market profile.
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    pub category: Option<(CategoryField, String)>,
    pub search: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub in_stock_only: bool,
    pub page: i64,
    pub limit: i64,
}

fn regex_filter(pattern: &str) -> Document {
    doc! { "$regex": pattern, "$options": "i" }
}

/// Case-insensitive title-or-sku match.
pub fn search_filter(query: &str) -> Document {
    doc! {
        "$or": [
            { "title": regex_filter(query) },
            { "sku": regex_filter(query) },
        ]
    }
}

/// Random sample of products in one category.
pub fn random_pipeline(field: CategoryField, category: &str, limit: i64) -> Vec<Document> {
    vec![
        doc! { "$match": { field.as_str(): category } },
        doc! { "$sample": { "size": limit } },
    ]
}

/// Filtered, paginated listing with a total count in a single round trip.
///
/// Best price and stock are derived per document from the `shops` map so
/// price filters apply to the cheapest offer rather than any one shop.
pub fn listing_pipeline(filter: &ListingFilter) -> Vec<Document> {
    let mut match_stage = Document::new();
    if let Some((field, category)) = &filter.category {
        match_stage.insert(field.as_str(), category.as_str());
    }
    if let Some(search) = &filter.search {
        match_stage.insert(
            "$or",
            vec![
                doc! { "title": regex_filter(search) },
                doc! { "sku": regex_filter(search) },
            ],
        );
    }

    let mut pipeline = vec![
        doc! { "$match": match_stage },
        doc! {
            "$addFields": {
                "shops_array": { "$objectToArray": "$shops" }
            }
        },
        doc! {
            "$addFields": {
                "derived_best_price": {
                    "$min": {
                        "$map": {
                            "input": "$shops_array",
                            "as": "shop",
                            "in": {
                                "$convert": {
                                    "input": "$$shop.v.price",
                                    "to": "double",
                                    "onError": MISSING_PRICE_SENTINEL,
                                    "onNull": MISSING_PRICE_SENTINEL,
                                }
                            }
                        }
                    }
                },
                "derived_in_stock": {
                    "$anyElementTrue": {
                        "$map": {
                            "input": "$shops_array",
                            "as": "shop",
                            "in": "$$shop.v.available",
                        }
                    }
                },
            }
        },
    ];

    let mut filter_stage = Document::new();
    let mut price_range = Document::new();
    if let Some(min_price) = filter.min_price {
        price_range.insert("$gte", min_price);
    }
    if let Some(max_price) = filter.max_price {
        price_range.insert("$lte", max_price);
    }
    if !price_range.is_empty() {
        filter_stage.insert("derived_best_price", price_range);
    }
    if filter.in_stock_only {
        filter_stage.insert("derived_in_stock", true);
    }
    if !filter_stage.is_empty() {
        pipeline.push(doc! { "$match": filter_stage });
    }

    let skip = (filter.page - 1) * filter.limit;
    pipeline.push(doc! {
        "$facet": {
            "metadata": [ { "$count": "total" } ],
            "products": [ { "$skip": skip }, { "$limit": filter.limit } ],
        }
    });

    pipeline
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_pipeline_shape() {
        let pipeline = random_pipeline(CategoryField::Subcategory, "Claviers", 5);
        assert_eq!(pipeline.len(), 2);
        assert_eq!(
            pipeline[0],
            doc! { "$match": { "subcategory": "Claviers" } }
        );
        assert_eq!(pipeline[1], doc! { "$sample": { "size": 5_i64 } });
    }

    #[test]
    fn test_listing_pipeline_unfiltered() {
        let filter = ListingFilter {
            page: 1,
            limit: 20,
            ..Default::default()
        };
        let pipeline = listing_pipeline(&filter);

        // match, two addFields, facet; no filter stage
        assert_eq!(pipeline.len(), 4);
        assert_eq!(pipeline[0], doc! { "$match": {} });
        assert!(pipeline[3].contains_key("$facet"));

        let facet = pipeline[3].get_document("$facet").unwrap();
        let products = facet.get_array("products").unwrap();
        assert_eq!(products[0].as_document().unwrap(), &doc! { "$skip": 0_i64 });
        assert_eq!(products[1].as_document().unwrap(), &doc! { "$limit": 20_i64 });
    }

    #[test]
    fn test_listing_pipeline_filters() {
        let filter = ListingFilter {
            category: Some((CategoryField::LowCategory, "Souris".to_string())),
            search: Some("logitech".to_string()),
            min_price: Some(50.0),
            max_price: Some(300.0),
            in_stock_only: true,
            page: 3,
            limit: 10,
        };
        let pipeline = listing_pipeline(&filter);
        assert_eq!(pipeline.len(), 5);

        let match_stage = pipeline[0].get_document("$match").unwrap();
        assert_eq!(match_stage.get_str("low_category").unwrap(), "Souris");
        assert!(match_stage.contains_key("$or"));

        let filter_stage = pipeline[3].get_document("$match").unwrap();
        assert_eq!(
            filter_stage.get_document("derived_best_price").unwrap(),
            &doc! { "$gte": 50.0, "$lte": 300.0 }
        );
        assert!(filter_stage.get_bool("derived_in_stock").unwrap());

        let facet = pipeline[4].get_document("$facet").unwrap();
        let products = facet.get_array("products").unwrap();
        assert_eq!(products[0].as_document().unwrap(), &doc! { "$skip": 20_i64 });
    }
}
