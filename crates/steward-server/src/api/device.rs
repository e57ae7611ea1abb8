//! Device API handlers
//!
//! - GET    /api/data/{search}
//! - PUT    /api/update-preload/{preloadId}/{computerId}
//! - DELETE /api/wipedevice/{computerId}
//! - DELETE /api/retiredevice/{computerId}/{serial}[/{mac}[/{altMac}]]

use actix_web::{HttpRequest, HttpResponse, HttpResponseBuilder, Responder, delete, get, put, web};
use tracing::{info, warn};

use steward_common::Result;
use steward_core::{RetirementOutcome, RetirementStatus};

use crate::model::{
    AppState,
    response::{ErrorResult, json_response, status_of},
};

use super::model::{UpdatePreloadRequest, parse_id, parse_optional_id};

#[get("/data/{search}")]
pub async fn search(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let term = path.into_inner();
    json_response(&req, data.query.search_devices(&term).await)
}

/// Save technician edits to the preload record and the enrolled computer
#[put("/update-preload/{preload_id}/{computer_id}")]
pub async fn update_preload(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<(String, String)>,
    body: web::Json<UpdatePreloadRequest>,
) -> impl Responder {
    let (preload_id, computer_id) = path.into_inner();
    let ids = parse_optional_id(&preload_id, "preloadId")
        .and_then(|p| parse_optional_id(&computer_id, "computerId").map(|c| (p, c)));
    let result = match ids {
        Ok((preload_id, computer_id)) => {
            info!(?preload_id, ?computer_id, "Updating preload and inventory");
            data.inventory
                .update_device_info(preload_id, computer_id, &body.into_inner().into())
                .await
        }
        Err(e) => Err(e),
    };
    json_response(&req, result)
}

#[delete("/wipedevice/{computer_id}")]
pub async fn wipe_device(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let result = match parse_id(&path.into_inner(), "computerId") {
        Ok(computer_id) => {
            info!(computer_id, "Wiping device");
            data.retirement.wipe_device(computer_id).await
        }
        Err(e) => Err(e),
    };
    json_response(&req, result)
}

#[delete("/retiredevice/{computer_id}/{serial_number}")]
pub async fn retire_device(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let (computer_id, serial_number) = path.into_inner();
    retire(&req, &data, &computer_id, &serial_number, Vec::new()).await
}

#[delete("/retiredevice/{computer_id}/{serial_number}/{mac}")]
pub async fn retire_device_with_mac(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<(String, String, String)>,
) -> impl Responder {
    let (computer_id, serial_number, mac) = path.into_inner();
    retire(&req, &data, &computer_id, &serial_number, vec![mac]).await
}

#[delete("/retiredevice/{computer_id}/{serial_number}/{mac}/{alt_mac}")]
pub async fn retire_device_with_macs(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<(String, String, String, String)>,
) -> impl Responder {
    let (computer_id, serial_number, mac, alt_mac) = path.into_inner();
    retire(&req, &data, &computer_id, &serial_number, vec![mac, alt_mac]).await
}

async fn retire(
    req: &HttpRequest,
    data: &AppState,
    computer_id: &str,
    serial_number: &str,
    mac_addresses: Vec<String>,
) -> HttpResponse {
    let outcome: Result<RetirementOutcome> = match parse_id(computer_id, "computerId") {
        Ok(computer_id) => {
            info!(computer_id, serial_number, "Retiring device");
            data.retirement
                .retire_device(computer_id, serial_number, &mac_addresses)
                .await
        }
        Err(e) => Err(e),
    };

    match outcome {
        Ok(outcome) => outcome_response(outcome),
        Err(e) => ErrorResult::http_response(&e, req.path()),
    }
}

/// An aborted saga answers with the failing step's status; the body is the
/// full outcome either way
fn outcome_response(outcome: RetirementOutcome) -> HttpResponse {
    match (outcome.status, outcome.abort_error()) {
        (RetirementStatus::Aborted, Some(error)) => {
            warn!(
                computer_id = outcome.computer_id,
                "Retirement aborted: {}", error
            );
            HttpResponseBuilder::new(status_of(error)).json(&outcome)
        }
        _ => HttpResponse::Ok().json(&outcome),
    }
}
