//! MDM client tests against a fake upstream

use serde_json::json;
use steward_client::{ClientError, MdmClient, MdmClientConfig, ScopeMutation, VersionLock};
use wiremock::matchers::{
    body_json, body_string_contains, header, method, path, query_param,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/oauth/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "mdm-token", "expires_in": 60})),
        )
        .mount(server)
        .await;
}

fn client(server: &MockServer) -> MdmClient {
    MdmClient::new(
        MdmClientConfig::new(&server.uri())
            .with_credentials("steward", "secret")
            .with_timeouts(1000, 2000),
    )
    .unwrap()
}

// ============== Token Acquisition Tests ==============

#[tokio::test]
async fn test_token_sent_as_form_grant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/oauth/token"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("client_id=steward"))
        .and(body_string_contains("client_secret=secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "t"})))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(client(&server).access_token().await.unwrap(), "t");
}

#[tokio::test]
async fn test_token_rejection_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/oauth/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid_client"))
        .mount(&server)
        .await;

    let err = client(&server).prestages().await.unwrap_err();
    assert!(matches!(err, ClientError::Auth(ref msg) if msg.contains("invalid_client")));
}

#[tokio::test]
async fn test_token_missing_from_body_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token_type": "bearer"})))
        .mount(&server)
        .await;

    let err = client(&server).access_token().await.unwrap_err();
    assert!(matches!(err, ClientError::Auth(_)));
}

// ============== Lookup Tests ==============

#[tokio::test]
async fn test_match_computers() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/JSSResource/computers/match/ABC"))
        .and(header("authorization", "Bearer mdm-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "computers": [
                {"id": 42, "name": "lab-01", "serial_number": "ABC123"},
                {"id": 43, "name": "lab-02", "serial_number": "ABC124"}
            ]
        })))
        .mount(&server)
        .await;

    let matches = client(&server).match_computers("ABC").await.unwrap();
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].id, 42);
    assert_eq!(matches[1].serial_number, "ABC124");
}

#[tokio::test]
async fn test_prestages_listing_query() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/v3/computer-prestages"))
        .and(query_param("page", "0"))
        .and(query_param("page-size", "100"))
        .and(query_param("sort", "id:desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalCount": 2,
            "results": [
                {"id": "7", "displayName": "Staff", "versionLock": 1},
                {"id": "3", "displayName": "Lab"}
            ]
        })))
        .mount(&server)
        .await;

    let prestages = client(&server).prestages().await.unwrap();
    assert_eq!(prestages.len(), 2);
    assert_eq!(prestages[0].id, 7);
    assert_eq!(prestages[0].version_lock, Some(VersionLock::Number(1)));
    assert!(prestages[1].usable_version_lock().is_none());
}

#[tokio::test]
async fn test_inventory_requests_general_and_hardware() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/computers-inventory/42"))
        .and(query_param("section", "GENERAL"))
        .and(query_param("section", "HARDWARE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "42",
            "general": {"name": "lab-01", "assetTag": "A-1"},
            "hardware": {"macAddress": "AA:BB", "altMacAddress": "CC:DD"}
        })))
        .mount(&server)
        .await;

    let inventory = client(&server).computer_inventory(42).await.unwrap();
    assert_eq!(inventory.id, 42);
    assert_eq!(
        inventory.hardware.unwrap().alt_mac_address.as_deref(),
        Some("CC:DD")
    );
}

#[tokio::test]
async fn test_preload_record_filters_by_serial() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/v2/inventory-preload/records"))
        .and(query_param("filter", "serialNumber==\"ABC123\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalCount": 1,
            "results": [{"id": "9", "serialNumber": "ABC123", "username": "jdoe"}]
        })))
        .mount(&server)
        .await;

    let record = client(&server).preload_record("ABC123").await.unwrap().unwrap();
    assert_eq!(record.id, 9);
    assert_eq!(record.username.as_deref(), Some("jdoe"));
}

#[tokio::test]
async fn test_preload_record_absent() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/v2/inventory-preload/records"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"totalCount": 0, "results": []})),
        )
        .mount(&server)
        .await;

    assert!(client(&server).preload_record("NONE").await.unwrap().is_none());
}

// ============== Mutation Tests ==============

#[tokio::test]
async fn test_scope_add_body() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/v2/computer-prestages/7/scope"))
        .and(body_json(json!({"serialNumbers": ["ABC123"], "versionLock": "v1"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"prestageId": "7", "assignments": [], "versionLock": 2})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mutation = ScopeMutation {
        serial_numbers: vec!["ABC123".to_string()],
        version_lock: Some("v1".into()),
    };
    let body = client(&server)
        .add_to_prestage_scope(7, &mutation)
        .await
        .unwrap();
    assert_eq!(body["versionLock"], 2);
}

#[tokio::test]
async fn test_scope_add_conflict_keeps_status() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/v2/computer-prestages/7/scope"))
        .respond_with(ResponseTemplate::new(400).set_body_string("already scoped"))
        .mount(&server)
        .await;

    let mutation = ScopeMutation {
        serial_numbers: vec!["ABC123".to_string()],
        version_lock: None,
    };
    let err = client(&server)
        .add_to_prestage_scope(7, &mutation)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.upstream_message(), "already scoped");
}

#[tokio::test]
async fn test_scope_remove_path() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/v2/computer-prestages/3/scope/delete-multiple"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"prestageId": "3"})))
        .expect(1)
        .mount(&server)
        .await;

    let mutation = ScopeMutation {
        serial_numbers: vec!["XYZ999".to_string()],
        version_lock: Some(VersionLock::Number(4)),
    };
    client(&server)
        .remove_from_prestage_scope(3, &mutation)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_erase_sends_pin() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/computer-inventory/42/erase"))
        .and(body_json(json!({"pin": "123456"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"deviceId": "42"})))
        .expect(1)
        .mount(&server)
        .await;

    let body = client(&server).erase_computer(42).await.unwrap();
    assert_eq!(body["deviceId"], "42");
}

#[tokio::test]
async fn test_erase_requires_200() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/computer-inventory/42/erase"))
        .respond_with(ResponseTemplate::new(202))
        .mount(&server)
        .await;

    let err = client(&server).erase_computer(42).await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::UnexpectedStatus {
            status: 202,
            expected: 200
        }
    ));
}

#[tokio::test]
async fn test_delete_requires_204() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/computers-inventory/42"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let err = client(&server).delete_computer(42).await.unwrap_err();
    assert_eq!(err.status(), Some(200));
}

#[tokio::test]
async fn test_delete_accepts_204() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/computers-inventory/42"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client(&server).delete_computer(42).await.unwrap();
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/buildings"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"results": []}))
                .set_delay(std::time::Duration::from_millis(3000)),
        )
        .mount(&server)
        .await;

    let err = client(&server).buildings().await.unwrap_err();
    assert!(matches!(err, ClientError::Timeout));
}
