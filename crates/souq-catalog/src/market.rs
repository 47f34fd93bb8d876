//! Market profiles
//!
//! Everything that differs between the retail and parapharmacy markets
//! lives here: database and shop names, which category fields exist,
//! how shop names are displayed, and price formatting.

/// Category fields present on merged product documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryField {
    TopCategory,
    Subcategory,
    LowCategory,
}

impl CategoryField {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryField::TopCategory => "top_category",
            CategoryField::Subcategory => "subcategory",
            CategoryField::LowCategory => "low_category",
        }
    }
}

/// How a raw shop key is turned into a display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShopLabelStyle {
    /// "mytek" -> "Mytek"
    Capitalize,
    /// "pharma-shop" -> "Pharma Shop"
    TitleCaseWords,
}

/// Static description of one market.
pub struct MarketProfile {
    pub name: &'static str,
    pub db_name: &'static str,
    /// Shop keys in the order prices and brands are collected.
    pub shops: &'static [&'static str],
    /// Shop order used when picking a product image.
    pub image_shop_order: &'static [&'static str],
    /// Images whose URL contains this marker are skipped.
    pub skip_image_marker: Option<&'static str>,
    /// Accepted `category_type` query values and the fields they map to.
    pub category_aliases: &'static [(&'static str, CategoryField)],
    pub default_category_field: CategoryField,
    /// Fields tried in order when deriving a merged product's category.
    pub category_fallback: &'static [CategoryField],
    /// Decimal places prices are rounded to, if any.
    pub price_decimals: Option<u32>,
    pub shop_label_style: ShopLabelStyle,
    /// Whether merged products carry a top-level category worth exposing.
    pub exposes_top_category: bool,
    /// Field holding the long description on single-shop documents.
    pub single_description_field: &'static str,
}

pub static RETAIL: MarketProfile = MarketProfile {
    name: "retail",
    db_name: "Retails",
    shops: &["mytek", "spacenet", "tunisianet"],
    image_shop_order: &["mytek", "tunisianet", "spacenet"],
    skip_image_marker: Some("livraison-gratuite"),
    category_aliases: &[
        ("subcategory", CategoryField::Subcategory),
        ("low_category", CategoryField::LowCategory),
    ],
    default_category_field: CategoryField::Subcategory,
    category_fallback: &[CategoryField::Subcategory, CategoryField::LowCategory],
    price_decimals: None,
    shop_label_style: ShopLabelStyle::Capitalize,
    exposes_top_category: false,
    single_description_field: "overview",
};

pub static PARA: MarketProfile = MarketProfile {
    name: "para",
    db_name: "PARA",
    shops: &["parashop", "pharma-shop", "parafendri"],
    image_shop_order: &["parashop", "pharma-shop", "parafendri"],
    skip_image_marker: None,
    category_aliases: &[
        ("top", CategoryField::TopCategory),
        ("low", CategoryField::LowCategory),
        ("top_category", CategoryField::TopCategory),
        ("low_category", CategoryField::LowCategory),
        ("subcategory", CategoryField::Subcategory),
    ],
    default_category_field: CategoryField::TopCategory,
    category_fallback: &[CategoryField::LowCategory, CategoryField::Subcategory],
    price_decimals: Some(3),
    shop_label_style: ShopLabelStyle::TitleCaseWords,
    exposes_top_category: true,
    single_description_field: "description",
};

impl MarketProfile {
    /// Map a `category_type` query value to a field, falling back to the
    /// market's default for unknown values.
    pub fn resolve_field(&self, category_type: &str) -> CategoryField {
        self.category_aliases
            .iter()
            .find(|(alias, _)| *alias == category_type)
            .map(|(_, field)| *field)
            .unwrap_or(self.default_category_field)
    }

    /// Display label for a raw shop key.
    pub fn shop_label(&self, shop: &str) -> String {
        match self.shop_label_style {
            ShopLabelStyle::Capitalize => capitalize(shop),
            ShopLabelStyle::TitleCaseWords => shop
                .split('-')
                .map(capitalize)
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// Round a price to the market's precision.
    pub fn round_price(&self, value: f64) -> f64 {
        match self.price_decimals {
            Some(decimals) => {
                let factor = 10f64.powi(decimals as i32);
                (value * factor).round() / factor
            }
            None => value,
        }
    }

    /// Per-shop detail collections, in shop order.
    pub fn detail_collections(&self) -> impl Iterator<Item = (&'static str, String)> {
        self.shops
            .iter()
            .map(|shop| (*shop, format!("{}_details", shop)))
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_field_retail() {
        assert_eq!(RETAIL.resolve_field("subcategory"), CategoryField::Subcategory);
        assert_eq!(RETAIL.resolve_field("low_category"), CategoryField::LowCategory);
        // Unknown values fall back to the market default
        assert_eq!(RETAIL.resolve_field("top"), CategoryField::Subcategory);
        assert_eq!(RETAIL.resolve_field(""), CategoryField::Subcategory);
    }

    #[test]
    fn test_resolve_field_para() {
        assert_eq!(PARA.resolve_field("top"), CategoryField::TopCategory);
        assert_eq!(PARA.resolve_field("low"), CategoryField::LowCategory);
        assert_eq!(PARA.resolve_field("subcategory"), CategoryField::Subcategory);
        assert_eq!(PARA.resolve_field("bogus"), CategoryField::TopCategory);
    }

    #[test]
    fn test_shop_labels() {
        assert_eq!(RETAIL.shop_label("mytek"), "Mytek");
        assert_eq!(RETAIL.shop_label("tunisianet"), "Tunisianet");
        assert_eq!(PARA.shop_label("parashop"), "Parashop");
        assert_eq!(PARA.shop_label("pharma-shop"), "Pharma Shop");
    }

    #[test]
    fn test_round_price() {
        assert_eq!(PARA.round_price(12.3456789), 12.346);
        assert_eq!(RETAIL.round_price(12.3456789), 12.3456789);
    }

    #[test]
    fn test_detail_collections() {
        let collections: Vec<_> = RETAIL.detail_collections().collect();
        assert_eq!(
            collections,
            vec![
                ("mytek", "mytek_details".to_string()),
                ("spacenet", "spacenet_details".to_string()),
                ("tunisianet", "tunisianet_details".to_string()),
            ]
        );
    }
}
