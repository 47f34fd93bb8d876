//! Shared handler bodies for the per-market catalog routes.
//!
//! The retail and para route modules are thin wrappers around these
//! functions; the market itself is carried by the [`CatalogService`].

use actix_web::HttpResponse;
use tracing::error;
use validator::Validate;

use souq_catalog::{CatalogService, CategoryField};

use crate::api::query::{ListingQuery, RandomQuery, SearchQuery};
use crate::model::response;

const PRODUCT_NOT_FOUND: &str = "Product not found";

fn handle_error(context: &str, e: anyhow::Error) -> HttpResponse {
    error!("{}: {}", context, e);
    response::internal_error(e.to_string())
}

pub async fn categories(service: &CatalogService, field: CategoryField) -> HttpResponse {
    match service.categories(field).await {
        Ok(categories) => HttpResponse::Ok().json(categories),
        Err(e) => handle_error("Failed to fetch categories", e),
    }
}

pub async fn random(service: &CatalogService, query: &RandomQuery) -> HttpResponse {
    match service
        .random(&query.category, query.category_type.as_deref(), query.limit)
        .await
    {
        Ok(products) => HttpResponse::Ok().json(products),
        Err(e) => handle_error("Failed to fetch random products", e),
    }
}

pub async fn by_id(service: &CatalogService, product_id: &str) -> HttpResponse {
    match service.by_id(product_id).await {
        Ok(Some(product)) => HttpResponse::Ok().json(product),
        Ok(None) => response::not_found(PRODUCT_NOT_FOUND),
        Err(e) => handle_error("Failed to fetch product", e),
    }
}

pub async fn by_sku(service: &CatalogService, sku: &str) -> HttpResponse {
    match service.by_sku(sku).await {
        Ok(Some(product)) => HttpResponse::Ok().json(product),
        Ok(None) => response::not_found(PRODUCT_NOT_FOUND),
        Err(e) => handle_error("Failed to fetch product", e),
    }
}

pub async fn search(service: &CatalogService, query: &SearchQuery) -> HttpResponse {
    match service.search(&query.q, query.limit).await {
        Ok(results) => HttpResponse::Ok().json(results),
        Err(e) => handle_error("Search failed", e),
    }
}

pub async fn listing(service: &CatalogService, query: &ListingQuery) -> HttpResponse {
    if let Err(e) = query.validate() {
        return response::bad_request(e.to_string());
    }

    match service
        .listing(
            query.category.as_deref(),
            query.category_type.as_deref(),
            query.search.as_deref(),
            query.min_price,
            query.max_price,
            query.in_stock,
            query.page,
            query.limit,
        )
        .await
    {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(e) => handle_error("Listing aggregation failed", e),
    }
}

pub async fn analytics_categories(service: &CatalogService) -> HttpResponse {
    match service.analytics_categories().await {
        Ok(categories) => HttpResponse::Ok().json(categories),
        Err(e) => handle_error("Failed to fetch analytics categories", e),
    }
}

pub async fn category_analytics(service: &CatalogService, category: &str) -> HttpResponse {
    match service.category_analytics(category).await {
        Ok(Some(analytics)) => HttpResponse::Ok().json(analytics),
        Ok(None) => response::not_found(format!("No analytics found for category: {}", category)),
        Err(e) => handle_error("Failed to fetch category analytics", e),
    }
}
