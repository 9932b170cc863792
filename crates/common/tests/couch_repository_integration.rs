use common::{
    CouchClient, CouchConfig, CouchDeviceRepository, CouchUserRepository, DeviceDraft,
    DeviceRepository, DomainError, UserRepository,
};
use serde_json::json;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn couch_client(server: &MockServer) -> CouchClient {
    CouchClient::new(CouchConfig {
        url: server.uri(),
        username: "admin".to_string(),
        password: "secret".to_string(),
        retry_attempts: 1,
        retry_backoff_ms: 1,
    })
    .unwrap()
}

fn sample_draft() -> DeviceDraft {
    DeviceDraft {
        name: "Device 1".to_string(),
        current_temperature: 20.5,
        serial_id: "OTRV-abcdef1234".to_string(),
        active: true,
        schedules: vec![],
        metadata: serde_json::Map::new(),
    }
}

#[tokio::test]
async fn create_device_assigns_a_server_side_identifier() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/devices"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path_regex("^/devices/.+$"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let repository = CouchDeviceRepository::new(couch_client(&server));
    let device = repository.create_device(sample_draft()).await.unwrap();

    assert!(!device.id.is_empty());
    assert_eq!(device.name, "Device 1");
    assert_eq!(device.serial_id, "OTRV-abcdef1234");
}

#[tokio::test]
async fn failed_initialization_is_sticky() {
    let server = MockServer::start().await;

    // Database creation fails once; it must not be attempted again
    Mock::given(method("PUT"))
        .and(path("/devices"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let repository = CouchDeviceRepository::new(couch_client(&server));

    let first = repository.create_device(sample_draft()).await;
    assert!(matches!(first, Err(DomainError::Initialization(_))));

    let second = repository.list_devices().await;
    assert!(matches!(second, Err(DomainError::Initialization(_))));

    server.verify().await;
}

fn stored_user_json(id: &str, email: &str) -> serde_json::Value {
    json!({
        "_id": id,
        "_rev": "1-a",
        "id": id,
        "email": email,
        "name": "Test User",
        "passwordHash": "$argon2$fake"
    })
}

#[tokio::test]
async fn user_lookup_by_email_scans_the_collection() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users/_all_docs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "rows": [
                {"id": "u1", "doc": stored_user_json("u1", "one@example.com")},
                {"id": "u2", "doc": stored_user_json("u2", "two@example.com")},
            ]
        })))
        .mount(&server)
        .await;

    let repository = CouchUserRepository::new(couch_client(&server));

    let found = repository
        .get_user_by_email("two@example.com")
        .await
        .unwrap();
    assert_eq!(found.map(|user| user.id), Some("u2".to_string()));

    let missing = repository
        .get_user_by_email("nobody@example.com")
        .await
        .unwrap();
    assert!(missing.is_none());
}
