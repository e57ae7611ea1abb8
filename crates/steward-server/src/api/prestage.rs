//! Prestage API handlers
//!
//! - GET    /api/prestages
//! - POST   /api/add-to-prestage
//! - POST   /api/remove-from-prestage
//! - POST   /api/change-prestage/{prestageId}/{serial}
//! - DELETE /api/change-prestage/{prestageId}/{serial}

use actix_web::{HttpRequest, Responder, delete, get, post, web};
use tracing::info;

use steward_core::PrestageRef;

use crate::model::{AppState, response::json_response};

use super::model::{AddToPrestageRequest, PrestageView, RemoveFromPrestageRequest, parse_id};

#[get("/prestages")]
pub async fn list_prestages(req: HttpRequest, data: web::Data<AppState>) -> impl Responder {
    let result = data
        .locator
        .prestages()
        .await
        .map(|prestages| prestages.into_iter().map(PrestageView::from).collect::<Vec<_>>());
    json_response(&req, result)
}

/// Move a device to the requested prestage, leaving its current one first
#[post("/add-to-prestage")]
pub async fn add_to_prestage(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Json<AddToPrestageRequest>,
) -> impl Responder {
    info!(
        serial_number = %body.serial_number,
        prestage_id = body.prestage_id,
        "Adding device to prestage"
    );
    let result = data
        .prestage
        .reassign(&body.serial_number, body.prestage_id)
        .await;
    json_response(&req, result)
}

#[post("/remove-from-prestage")]
pub async fn remove_from_prestage(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Json<RemoveFromPrestageRequest>,
) -> impl Responder {
    info!(
        serial_number = %body.serial_number,
        prestage = %body.current_prestage,
        "Removing device from prestage"
    );
    let body = body.into_inner();
    let result = data
        .prestage
        .remove_from_prestage(&body.serial_number, PrestageRef::Name(body.current_prestage))
        .await;
    json_response(&req, result)
}

#[post("/change-prestage/{prestage_id}/{serial_number}")]
pub async fn change_prestage(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let (prestage_id, serial_number) = path.into_inner();
    let result = match parse_id(&prestage_id, "prestageId") {
        Ok(prestage_id) => data.prestage.reassign(&serial_number, prestage_id).await,
        Err(e) => Err(e),
    };
    json_response(&req, result)
}

#[delete("/change-prestage/{prestage_id}/{serial_number}")]
pub async fn leave_prestage(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let (prestage_id, serial_number) = path.into_inner();
    let result = match parse_id(&prestage_id, "prestageId") {
        Ok(prestage_id) => {
            data.prestage
                .remove_from_prestage(&serial_number, PrestageRef::Id(prestage_id))
                .await
        }
        Err(e) => Err(e),
    };
    json_response(&req, result)
}
