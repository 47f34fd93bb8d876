//! Conversion of raw MongoDB documents into catalog models.
//!
//! The scraped collections are loosely typed: prices arrive as doubles,
//! ints, decimals, or strings depending on which scraper wrote them, and
//! availability flags are whatever the source site exposed. Everything
//! here is lenient on read.

use mongodb::bson::{Bson, Document};
use serde_json::Value;

use crate::market::MarketProfile;
use crate::model::{Product, ShopPrice};

/// Numeric value from any of the shapes the scrapers produce.
pub(crate) fn bson_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Double(v) => Some(*v),
        Bson::Int32(v) => Some(*v as f64),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Decimal128(v) => v.to_string().parse().ok(),
        Bson::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn bson_i64(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(v) => Some(*v as i64),
        Bson::Int64(v) => Some(*v),
        Bson::Double(v) => Some(*v as i64),
        Bson::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Truthiness of an availability flag.
pub(crate) fn bson_bool(value: &Bson) -> bool {
    match value {
        Bson::Boolean(v) => *v,
        Bson::Int32(v) => *v != 0,
        Bson::Int64(v) => *v != 0,
        Bson::Double(v) => *v != 0.0,
        Bson::String(s) => !s.is_empty(),
        _ => false,
    }
}

/// Positive price or nothing; zero means the scraper found no price.
fn price_field(doc: &Document, key: &str) -> Option<f64> {
    doc.get(key).and_then(bson_f64).filter(|v| *v > 0.0)
}

/// Stringified `_id`, hex for ObjectIds.
pub(crate) fn document_id(doc: &Document) -> String {
    match doc.get("_id") {
        Some(Bson::ObjectId(oid)) => oid.to_hex(),
        Some(Bson::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "unknown".to_string(),
    }
}

fn specifications_map(doc: &Document) -> serde_json::Map<String, Value> {
    doc.iter()
        .map(|(k, v)| (k.clone(), v.clone().into_relaxed_extjson()))
        .collect()
}

fn first_image(images: &[Bson], skip_marker: Option<&str>) -> Option<String> {
    images.iter().find_map(|img| match img {
        Bson::String(url) if skip_marker.is_none_or(|marker| !url.contains(marker)) => {
            Some(url.clone())
        }
        _ => None,
    })
}

fn non_empty_str(doc: &Document, key: &str) -> Option<String> {
    doc.get_str(key)
        .ok()
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Parse a `merged_products` document.
pub fn parse_merged_product(
    doc: &Document,
    profile: &MarketProfile,
    default_category: Option<&str>,
    include_specs: bool,
) -> Product {
    let empty = Document::new();
    let shops = doc.get_document("shops").unwrap_or(&empty);

    let mut shop_prices: Vec<ShopPrice> = profile
        .shops
        .iter()
        .filter_map(|shop| {
            let shop_doc = shops.get_document(shop).ok()?;
            let price = price_field(shop_doc, "price")?;
            Some(ShopPrice {
                shop: profile.shop_label(shop),
                price: profile.round_price(price),
                old_price: price_field(shop_doc, "old_price"),
                available: shop_doc.get("available").is_some_and(bson_bool),
                url: non_empty_str(shop_doc, "url"),
            })
        })
        .collect();

    // Cheapest offer first
    shop_prices.sort_by(|a, b| a.price.total_cmp(&b.price));

    let best_price = shop_prices.first().map(|sp| sp.price).unwrap_or(0.0);
    let original_price = shop_prices
        .iter()
        .filter_map(|sp| sp.old_price)
        .fold(None::<f64>, |min, v| Some(min.map_or(v, |m| m.min(v))))
        .map(|v| profile.round_price(v));

    let image = profile
        .image_shop_order
        .iter()
        .find_map(|shop| {
            let images = shops.get_document(shop).ok()?.get_array("images").ok()?;
            first_image(images, profile.skip_image_marker)
        })
        .unwrap_or_else(|| "/placeholder.svg".to_string());

    let brand = profile
        .shops
        .iter()
        .find_map(|shop| non_empty_str(shops.get_document(shop).ok()?, "brand"))
        .map(|b| b.to_uppercase())
        .unwrap_or_else(|| "Generic".to_string());

    let in_stock = shop_prices.iter().any(|sp| sp.available);

    let category = profile
        .category_fallback
        .iter()
        .find_map(|field| non_empty_str(doc, field.as_str()))
        .or_else(|| default_category.map(String::from))
        .unwrap_or_default();

    let top_category = profile
        .exposes_top_category
        .then(|| non_empty_str(doc, "top_category"))
        .flatten();

    let specifications = include_specs.then(|| {
        // First shop to define a key wins
        let mut merged = serde_json::Map::new();
        for shop in profile.shops {
            if let Ok(shop_doc) = shops.get_document(shop)
                && let Ok(specs) = shop_doc.get_document("specifications")
            {
                for (key, value) in specifications_map(specs) {
                    merged.entry(key).or_insert(value);
                }
            }
        }
        merged
    });

    Product {
        id: document_id(doc),
        name: doc.get_str("title").unwrap_or("Unknown Product").to_string(),
        brand,
        best_price,
        original_price,
        image,
        description: doc.get_str("title").unwrap_or_default().to_string(),
        in_stock,
        category,
        top_category,
        shop_prices,
        specifications,
    }
}

/// Parse a `<shop>_details` document for a product that was never merged.
pub fn parse_shop_product(doc: &Document, shop: &str, profile: &MarketProfile) -> Product {
    let price = profile.round_price(doc.get("price").and_then(bson_f64).unwrap_or(0.0));
    let old_price = price_field(doc, "old_price").map(|v| profile.round_price(v));
    let available = doc.get("available").is_some_and(bson_bool);

    let shop_prices = vec![ShopPrice {
        shop: profile.shop_label(shop),
        price,
        old_price,
        available,
        url: non_empty_str(doc, "url"),
    }];

    let image = doc
        .get_array("images")
        .ok()
        .and_then(|images| first_image(images, profile.skip_image_marker))
        .unwrap_or_else(|| "/placeholder.svg".to_string());

    let brand = non_empty_str(doc, "brand")
        .map(|b| b.to_uppercase())
        .unwrap_or_else(|| "Generic".to_string());

    let title = doc.get_str("title").unwrap_or("Unknown Product");

    Product {
        id: document_id(doc),
        name: title.to_string(),
        brand,
        best_price: price,
        original_price: old_price,
        image,
        description: non_empty_str(doc, profile.single_description_field)
            .unwrap_or_else(|| title.to_string()),
        in_stock: available,
        category: profile
            .category_fallback
            .iter()
            .find_map(|field| non_empty_str(doc, field.as_str()))
            .unwrap_or_default(),
        top_category: profile
            .exposes_top_category
            .then(|| non_empty_str(doc, "top_category"))
            .flatten(),
        shop_prices,
        specifications: doc
            .get_document("specifications")
            .ok()
            .map(specifications_map),
    }
}

#[cfg(test)]
mod tests {
    use mongodb::bson::{doc, oid::ObjectId};

    use super::*;
    use crate::market::{PARA, RETAIL};

    #[test]
    fn test_bson_f64_shapes() {
        assert_eq!(bson_f64(&Bson::Double(1.5)), Some(1.5));
        assert_eq!(bson_f64(&Bson::Int32(3)), Some(3.0));
        assert_eq!(bson_f64(&Bson::Int64(4)), Some(4.0));
        assert_eq!(bson_f64(&Bson::String("12.990".to_string())), Some(12.99));
        assert_eq!(bson_f64(&Bson::String("n/a".to_string())), None);
        assert_eq!(bson_f64(&Bson::Null), None);
    }

    #[test]
    fn test_bson_bool_shapes() {
        assert!(bson_bool(&Bson::Boolean(true)));
        assert!(bson_bool(&Bson::Int32(1)));
        assert!(bson_bool(&Bson::String("yes".to_string())));
        assert!(!bson_bool(&Bson::Boolean(false)));
        assert!(!bson_bool(&Bson::Int64(0)));
        assert!(!bson_bool(&Bson::String(String::new())));
        assert!(!bson_bool(&Bson::Null));
    }

    #[test]
    fn test_document_id() {
        let oid = ObjectId::new();
        assert_eq!(document_id(&doc! { "_id": oid }), oid.to_hex());
        assert_eq!(document_id(&doc! { "_id": "custom" }), "custom");
        assert_eq!(document_id(&doc! {}), "unknown");
    }

    #[test]
    fn test_parse_merged_retail_product() {
        let raw = doc! {
            "_id": ObjectId::new(),
            "title": "PC Portable ASUS",
            "sku": "PC-123",
            "subcategory": "Ordinateurs Portables",
            "shops": {
                "mytek": {
                    "price": 2599.0,
                    "old_price": 2799.0,
                    "available": true,
                    "url": "https://mytek.tn/pc-123",
                    "brand": "Asus",
                    "images": ["https://mytek.tn/pc.jpg"],
                },
                "spacenet": {
                    "price": "2549.000",
                    "available": false,
                    "images": ["https://spacenet.tn/livraison-gratuite.png"],
                },
            },
        };

        let product = parse_merged_product(&raw, &RETAIL, None, false);

        // Cheapest shop first, string price parsed
        assert_eq!(product.shop_prices.len(), 2);
        assert_eq!(product.shop_prices[0].shop, "Spacenet");
        assert_eq!(product.shop_prices[0].price, 2549.0);
        assert_eq!(product.best_price, 2549.0);
        assert_eq!(product.original_price, Some(2799.0));
        assert_eq!(product.brand, "ASUS");
        assert!(product.in_stock);
        assert_eq!(product.category, "Ordinateurs Portables");
        assert!(product.top_category.is_none());
        // Delivery banner image is skipped
        assert_eq!(product.image, "https://mytek.tn/pc.jpg");
        assert!(product.specifications.is_none());
    }

    #[test]
    fn test_parse_merged_product_without_prices() {
        let raw = doc! {
            "title": "Ghost product",
            "shops": { "mytek": { "price": 0 } },
        };

        let product = parse_merged_product(&raw, &RETAIL, Some("Accessoires"), false);
        assert!(product.shop_prices.is_empty());
        assert_eq!(product.best_price, 0.0);
        assert!(!product.in_stock);
        assert_eq!(product.image, "/placeholder.svg");
        assert_eq!(product.brand, "Generic");
        assert_eq!(product.category, "Accessoires");
    }

    #[test]
    fn test_parse_merged_product_category_defaults_to_empty() {
        let raw = doc! { "title": "Sans rayon", "shops": {} };
        let product = parse_merged_product(&raw, &RETAIL, None, false);
        assert_eq!(product.category, "");
    }

    #[test]
    fn test_parse_merged_para_rounding_and_top_category() {
        let raw = doc! {
            "title": "Creme solaire",
            "top_category": "Solaire",
            "low_category": "Protection",
            "shops": {
                "pharma-shop": { "price": 45.5678, "available": true },
            },
        };

        let product = parse_merged_product(&raw, &PARA, None, false);
        assert_eq!(product.shop_prices[0].shop, "Pharma Shop");
        assert_eq!(product.best_price, 45.568);
        assert_eq!(product.category, "Protection");
        assert_eq!(product.top_category.as_deref(), Some("Solaire"));
    }

    #[test]
    fn test_parse_merged_specifications_first_key_wins() {
        let raw = doc! {
            "title": "Souris",
            "shops": {
                "mytek": {
                    "price": 89.0,
                    "specifications": { "Couleur": "Noir" },
                },
                "spacenet": {
                    "price": 95.0,
                    "specifications": { "Couleur": "Blanc", "Garantie": "1 an" },
                },
            },
        };

        let product = parse_merged_product(&raw, &RETAIL, None, true);
        let specs = product.specifications.unwrap();
        assert_eq!(specs["Couleur"], "Noir");
        assert_eq!(specs["Garantie"], "1 an");
    }

    #[test]
    fn test_parse_shop_product() {
        let raw = doc! {
            "_id": ObjectId::new(),
            "title": "Clavier mecanique",
            "price": 249.0,
            "old_price": 299.0,
            "available": true,
            "brand": "redragon",
            "overview": "Clavier gamer RGB",
            "subcategory": "Claviers",
            "images": ["https://tunisianet.com.tn/clavier.jpg"],
        };

        let product = parse_shop_product(&raw, "tunisianet", &RETAIL);
        assert_eq!(product.shop_prices.len(), 1);
        assert_eq!(product.shop_prices[0].shop, "Tunisianet");
        assert_eq!(product.best_price, 249.0);
        assert_eq!(product.original_price, Some(299.0));
        assert_eq!(product.brand, "REDRAGON");
        assert_eq!(product.description, "Clavier gamer RGB");
        assert_eq!(product.category, "Claviers");
        assert!(product.in_stock);
    }
}
