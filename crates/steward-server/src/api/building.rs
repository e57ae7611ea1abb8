//! Building API handlers

use actix_web::{HttpRequest, Responder, get, web};

use crate::model::{AppState, response::json_response};

/// Buildings known to the MDM, as the upstream lists them
#[get("/buildings")]
pub async fn list_buildings(req: HttpRequest, data: web::Data<AppState>) -> impl Responder {
    json_response(&req, data.locator.buildings().await)
}
