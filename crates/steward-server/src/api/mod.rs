//! HTTP API module
//!
//! Every route lives under the `/api` scope.

pub mod building;
pub mod device;
pub mod health;
pub mod model;
pub mod prestage;

use actix_web::{Scope, web};

pub fn routes() -> Scope {
    web::scope("/api")
        .service(health::health)
        .service(device::search)
        .service(device::update_preload)
        .service(device::wipe_device)
        .service(device::retire_device)
        .service(device::retire_device_with_mac)
        .service(device::retire_device_with_macs)
        .service(building::list_buildings)
        .service(prestage::list_prestages)
        .service(prestage::add_to_prestage)
        .service(prestage::remove_from_prestage)
        .service(prestage::change_prestage)
        .service(prestage::leave_prestage)
}
