//! Parapharmacy market routes under `/para`.

use actix_web::{HttpResponse, Scope, get, web};

use crate::api::market;
use crate::api::query::{
    CategoryQuery, CategoryTypeQuery, ListingQuery, RandomQuery, SearchQuery,
};
use crate::model::AppState;

pub fn routes() -> Scope {
    // Static segments must register before the catch-all {product_id}
    web::scope("/para")
        .service(random)
        .service(by_sku)
        .service(categories)
        .service(search)
        .service(listing)
        .service(analytics_categories)
        .service(category_analytics)
        .service(by_id)
}

#[get("/random")]
async fn random(data: web::Data<AppState>, query: web::Query<RandomQuery>) -> HttpResponse {
    market::random(&data.para, &query).await
}

#[get("/by-sku/{sku}")]
async fn by_sku(data: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    market::by_sku(&data.para, &path).await
}

#[get("/categories")]
async fn categories(data: web::Data<AppState>, query: web::Query<CategoryTypeQuery>) -> HttpResponse {
    let profile = data.para.profile();
    let field = profile.resolve_field(query.category_type.as_deref().unwrap_or_default());
    market::categories(&data.para, field).await
}

#[get("/search")]
async fn search(data: web::Data<AppState>, query: web::Query<SearchQuery>) -> HttpResponse {
    market::search(&data.para, &query).await
}

#[get("/listing")]
async fn listing(data: web::Data<AppState>, query: web::Query<ListingQuery>) -> HttpResponse {
    market::listing(&data.para, &query).await
}

#[get("/analytics/categories")]
async fn analytics_categories(data: web::Data<AppState>) -> HttpResponse {
    market::analytics_categories(&data.para).await
}

#[get("/analytics/by-category")]
async fn category_analytics(
    data: web::Data<AppState>,
    query: web::Query<CategoryQuery>,
) -> HttpResponse {
    market::category_analytics(&data.para, &query.category).await
}

#[get("/{product_id}")]
async fn by_id(data: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    market::by_id(&data.para, &path).await
}
