use actix_web::{Responder, get, web};

use super::model::HealthStatus;

#[get("/health")]
pub async fn health() -> impl Responder {
    web::Json(HealthStatus { status: "UP" })
}
