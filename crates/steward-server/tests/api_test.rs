// HTTP API tests
//
// Every route runs against the in-memory gateways, so these exercise the
// handlers, status mapping and CORS behavior without a network.

use std::sync::Arc;
use std::time::Duration;

use actix_web::{App, http::StatusCode, test, web};
use serde_json::{Value, json};

use steward_client::VersionLock;
use steward_core::OrchestrationConfig;
use steward_core::testing::{AssetCall, MdmCall, MdmOp, MockAsset, MockMdm, MockNac};
use steward_server::{
    api,
    model::{AppState, Gateways},
    startup::{cors_headers, fallback},
};

const ORIGIN: &str = "https://steward.example.edu";

struct Upstreams {
    mdm: Arc<MockMdm>,
    asset: Arc<MockAsset>,
    nac: Arc<MockNac>,
}

impl Upstreams {
    fn new() -> Self {
        Self {
            mdm: Arc::new(MockMdm::new()),
            asset: Arc::new(MockAsset::new()),
            nac: Arc::new(MockNac::new()),
        }
    }

    fn state(&self) -> Arc<AppState> {
        let gateways = Gateways {
            mdm: self.mdm.clone(),
            asset: Some(self.asset.clone()),
            nac: self.nac.clone(),
        };
        let config = OrchestrationConfig::default()
            .with_operation_timeout(Duration::from_secs(10))
            .with_retired_state_id(4);
        Arc::new(AppState::new(gateways, &config))
    }
}

macro_rules! app {
    ($upstreams:expr) => {
        test::init_service(
            App::new()
                .wrap(cors_headers(ORIGIN))
                .app_data(web::Data::from($upstreams.state()))
                .service(api::routes())
                .default_service(web::to(fallback)),
        )
        .await
    };
}

// ============== Health & CORS ==============

#[actix_web::test]
async fn test_health() {
    let upstreams = Upstreams::new();
    let app = app!(upstreams);

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body, json!({"status": "UP"}));
}

#[actix_web::test]
async fn test_preflight_answers_no_content_with_cors_headers() {
    let upstreams = Upstreams::new();
    let app = app!(upstreams);

    let req = test::TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri("/api/change-prestage/7/ABC123")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let headers = resp.headers();
    assert_eq!(
        headers.get("access-control-allow-origin").unwrap(),
        ORIGIN
    );
    assert_eq!(
        headers.get("access-control-allow-methods").unwrap(),
        "GET, POST, PUT, PATCH, DELETE, OPTIONS"
    );
}

#[actix_web::test]
async fn test_unknown_route_is_not_found() {
    let upstreams = Upstreams::new();
    let app = app!(upstreams);

    let req = test::TestRequest::get().uri("/api/nothing-here").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ============== Prestage Operations ==============

#[actix_web::test]
async fn test_list_prestages_shows_missing_lock_as_placeholder() {
    let upstreams = Upstreams::new();
    upstreams.mdm.add_prestage(7, "Staff", None).await;
    upstreams
        .mdm
        .add_prestage(3, "Lab", Some(VersionLock::Number(5)))
        .await;
    let app = app!(upstreams);

    let req = test::TestRequest::get().uri("/api/prestages").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(
        body,
        json!([
            {"id": 7, "displayName": "Staff", "versionLock": "N/A"},
            {"id": 3, "displayName": "Lab", "versionLock": "5"}
        ])
    );
}

#[actix_web::test]
async fn test_add_to_prestage_moves_device() {
    let upstreams = Upstreams::new();
    upstreams
        .mdm
        .add_prestage(3, "Lab", Some(VersionLock::Number(5)))
        .await;
    upstreams
        .mdm
        .add_prestage(7, "Staff", Some(VersionLock::from("v1")))
        .await;
    upstreams.mdm.set_scope("XYZ999", 3).await;
    let app = app!(upstreams);

    let req = test::TestRequest::post()
        .uri("/api/add-to-prestage")
        .set_json(json!({"serialNumber": "XYZ999", "prestageId": "7"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["prestageId"], 7);
    assert_eq!(body["priorScope"]["status"], "removed");
    assert_eq!(upstreams.mdm.scope_of("XYZ999").await, Some(7));

    let mutations = upstreams.mdm.mutations().await;
    assert!(matches!(
        mutations[0],
        MdmCall::RemoveFromScope { prestage_id: 3, .. }
    ));
    assert!(matches!(
        mutations[1],
        MdmCall::AddToScope { prestage_id: 7, .. }
    ));
}

#[actix_web::test]
async fn test_add_to_unknown_prestage_is_not_found() {
    let upstreams = Upstreams::new();
    upstreams.mdm.add_prestage(7, "Staff", None).await;
    let app = app!(upstreams);

    let req = test::TestRequest::post()
        .uri("/api/add-to-prestage")
        .set_json(json!({"serialNumber": "ABC123", "prestageId": 11}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Prestage not found");
    assert_eq!(body["path"], "/api/add-to-prestage");
    assert!(upstreams.mdm.mutations().await.is_empty());
}

#[actix_web::test]
async fn test_scope_add_rejection_is_conflict() {
    let upstreams = Upstreams::new();
    upstreams.mdm.add_prestage(7, "Staff", None).await;
    upstreams.mdm.fail(MdmOp::AddToScope, 400, "").await;
    let app = app!(upstreams);

    let req = test::TestRequest::post()
        .uri("/api/change-prestage/7/ABC123")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["message"],
        "Please remove from current prestage before adding"
    );
}

#[actix_web::test]
async fn test_remove_from_prestage_by_name() {
    let upstreams = Upstreams::new();
    upstreams
        .mdm
        .add_prestage(3, "Lab", Some(VersionLock::Number(5)))
        .await;
    upstreams.mdm.set_scope("XYZ999", 3).await;
    let app = app!(upstreams);

    let req = test::TestRequest::post()
        .uri("/api/remove-from-prestage")
        .set_json(json!({"serialNumber": "XYZ999", "currentPrestage": "Lab"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(upstreams.mdm.scope_of("XYZ999").await, None);
}

#[actix_web::test]
async fn test_leave_prestage_by_id() {
    let upstreams = Upstreams::new();
    upstreams.mdm.add_prestage(3, "Lab", None).await;
    upstreams.mdm.set_scope("XYZ999", 3).await;
    let app = app!(upstreams);

    let req = test::TestRequest::delete()
        .uri("/api/change-prestage/3/XYZ999")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(upstreams.mdm.count(MdmOp::RemoveFromScope).await, 1);
}

#[actix_web::test]
async fn test_non_numeric_prestage_id_is_bad_request() {
    let upstreams = Upstreams::new();
    let app = app!(upstreams);

    let req = test::TestRequest::post()
        .uri("/api/change-prestage/staff/ABC123")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(upstreams.mdm.calls().await.is_empty());
}

#[actix_web::test]
async fn test_list_buildings() {
    let upstreams = Upstreams::new();
    upstreams.mdm.add_building(1, "Main Hall").await;
    upstreams.mdm.add_building(2, "Library").await;
    let app = app!(upstreams);

    let req = test::TestRequest::get().uri("/api/buildings").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(
        body,
        json!([{"id": 1, "name": "Main Hall"}, {"id": 2, "name": "Library"}])
    );
}

#[actix_web::test]
async fn test_buildings_upstream_failure_mirrors_status() {
    let upstreams = Upstreams::new();
    upstreams.mdm.fail(MdmOp::Buildings, 503, "maintenance").await;
    let app = app!(upstreams);

    let req = test::TestRequest::get().uri("/api/buildings").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// ============== Device Operations ==============

#[actix_web::test]
async fn test_search_returns_flat_records() {
    let upstreams = Upstreams::new();
    upstreams.mdm.add_computer(42, "ABC123", "lab-01").await;
    let app = app!(upstreams);

    let req = test::TestRequest::get().uri("/api/data/ABC").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body[0]["computerId"], 42);
    assert_eq!(body[0]["name"], "lab-01");
    assert_eq!(body[0]["currentPrestage"], "Unassigned");
}

#[actix_web::test]
async fn test_search_without_results_is_not_found() {
    let upstreams = Upstreams::new();
    let app = app!(upstreams);

    let req = test::TestRequest::get().uri("/api/data/NOPE").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "No computers found");
}

#[actix_web::test]
async fn test_update_preload_with_placeholder_ids_creates_record() {
    let upstreams = Upstreams::new();
    let app = app!(upstreams);

    let req = test::TestRequest::put()
        .uri("/api/update-preload/null/undefined")
        .set_json(json!({"serialNumber": "NEW001", "username": "jdoe"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["computer"], Value::Null);
    assert!(body.get("error").is_none());
    assert_eq!(upstreams.mdm.count(MdmOp::CreatePreload).await, 1);
    assert_eq!(upstreams.mdm.count(MdmOp::UpdateInventoryDetail).await, 0);
}

#[actix_web::test]
async fn test_update_preload_patch_failure_is_advisory() {
    let upstreams = Upstreams::new();
    upstreams
        .mdm
        .fail(MdmOp::UpdateInventoryDetail, 500, "boom")
        .await;
    let app = app!(upstreams);

    let req = test::TestRequest::put()
        .uri("/api/update-preload/9/42")
        .set_json(json!({"serialNumber": "ABC123", "buildingId": 3}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Failed to update computer information");
}

#[actix_web::test]
async fn test_wipe_device() {
    let upstreams = Upstreams::new();
    let app = app!(upstreams);

    let req = test::TestRequest::delete()
        .uri("/api/wipedevice/42")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["computerId"], 42);
    assert_eq!(upstreams.mdm.count(MdmOp::EraseComputer).await, 1);
}

// ============== Retirement ==============

#[actix_web::test]
async fn test_retire_with_two_macs() {
    let upstreams = Upstreams::new();
    upstreams.mdm.add_computer(42, "ABC123", "lab-01").await;
    upstreams.asset.add_record(15, "ABC123").await;
    upstreams.nac.fail_mac("aa:bb", 404, "Endpoint not found").await;
    let app = app!(upstreams);

    let req = test::TestRequest::delete()
        .uri("/api/retiredevice/42/ABC123/aa:bb/cc:dd")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "partialFailure");
    assert_eq!(upstreams.nac.calls().await.len(), 2);
    assert_eq!(upstreams.asset.state_of(15).await, Some(4));
    assert!(upstreams.asset.calls().await.contains(&AssetCall::KillSession));
}

#[actix_web::test]
async fn test_retire_aborts_on_wipe_failure() {
    let upstreams = Upstreams::new();
    upstreams
        .mdm
        .fail(MdmOp::EraseComputer, 500, "erase rejected")
        .await;
    let app = app!(upstreams);

    let req = test::TestRequest::delete()
        .uri("/api/retiredevice/42/ABC123/aa:bb/cc:dd")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "aborted");
    assert_eq!(body["steps"][0]["step"], "wipe");
    assert!(
        body["steps"][0]["message"]
            .as_str()
            .unwrap()
            .contains("Device wipe failed")
    );
    assert_eq!(upstreams.mdm.count(MdmOp::DeleteComputer).await, 0);
    assert!(upstreams.nac.calls().await.is_empty());
}

#[actix_web::test]
async fn test_retire_ignores_placeholder_mac() {
    let upstreams = Upstreams::new();
    let app = app!(upstreams);

    let req = test::TestRequest::delete()
        .uri("/api/retiredevice/42/ABC123/undefined")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(upstreams.nac.calls().await.is_empty());
}

#[actix_web::test]
async fn test_retire_without_macs() {
    let upstreams = Upstreams::new();
    let app = app!(upstreams);

    let req = test::TestRequest::delete()
        .uri("/api/retiredevice/42/ABC123")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let nac: Vec<&Value> = body["steps"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|s| s["step"] == "nacCleanup")
        .collect();
    assert_eq!(nac.len(), 1);
    assert_eq!(nac[0]["status"], "skipped");
}
