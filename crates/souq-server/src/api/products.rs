//! Retail market routes under `/products`.

use actix_web::{HttpResponse, Scope, get, web};

use souq_catalog::CategoryField;

use crate::api::market;
use crate::api::query::{CategoryQuery, ListingQuery, RandomQuery, SearchQuery};
use crate::model::AppState;

pub fn routes() -> Scope {
    // Static segments must register before the catch-all {product_id}
    web::scope("/products")
        .service(random)
        .service(by_sku)
        .service(categories)
        .service(low_categories)
        .service(search)
        .service(listing)
        .service(analytics_categories)
        .service(category_analytics)
        .service(by_id)
}

#[get("/random")]
async fn random(data: web::Data<AppState>, query: web::Query<RandomQuery>) -> HttpResponse {
    market::random(&data.retail, &query).await
}

#[get("/by-sku/{sku}")]
async fn by_sku(data: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    market::by_sku(&data.retail, &path).await
}

#[get("/categories")]
async fn categories(data: web::Data<AppState>) -> HttpResponse {
    market::categories(&data.retail, CategoryField::Subcategory).await
}

#[get("/low-categories")]
async fn low_categories(data: web::Data<AppState>) -> HttpResponse {
    market::categories(&data.retail, CategoryField::LowCategory).await
}

#[get("/search")]
async fn search(data: web::Data<AppState>, query: web::Query<SearchQuery>) -> HttpResponse {
    market::search(&data.retail, &query).await
}

#[get("/listing")]
async fn listing(data: web::Data<AppState>, query: web::Query<ListingQuery>) -> HttpResponse {
    market::listing(&data.retail, &query).await
}

#[get("/analytics/categories")]
async fn analytics_categories(data: web::Data<AppState>) -> HttpResponse {
    market::analytics_categories(&data.retail).await
}

#[get("/analytics/by-category")]
async fn category_analytics(
    data: web::Data<AppState>,
    query: web::Query<CategoryQuery>,
) -> HttpResponse {
    market::category_analytics(&data.retail, &query.category).await
}

#[get("/{product_id}")]
async fn by_id(data: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    market::by_id(&data.retail, &path).await
}
