//! Product catalog for the Souq price comparison service.
//!
//! Two markets are served from the same code: electronics retail and
//! parapharmacy. Each market has its own MongoDB database with a
//! `merged_products` collection (one document per product, prices from
//! every shop that carries it) plus per-shop `<shop>_details` collections
//! for products that were never matched across shops. A [`MarketProfile`]
//! captures everything that differs between the two markets so the
//! services themselves stay market-agnostic.

pub mod analytics;
pub mod market;
pub mod model;
mod parse;
pub mod pipeline;
pub mod service;

pub use analytics::AnalyticsService;
pub use market::{CategoryField, MarketProfile, PARA, RETAIL};
pub use service::CatalogService;
