//! Cross-market analytics routes under `/analytics`.

use actix_web::{HttpResponse, Scope, get, web};

use crate::model::AppState;

pub fn routes() -> Scope {
    web::scope("/analytics")
        .service(prices)
        .service(merge_stats)
        .service(shop_details)
}

#[get("/prices")]
async fn prices(data: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(data.analytics.shop_prices().await)
}

#[get("/merge-stats")]
async fn merge_stats(data: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(data.analytics.merge_stats().await)
}

#[get("/shop-details")]
async fn shop_details(data: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(data.analytics.shop_details().await)
}
