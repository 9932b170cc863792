use common::{Device, DomainError, GatewayClient, GatewayConfig, HttpGatewayClient};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway(server: &MockServer) -> HttpGatewayClient {
    HttpGatewayClient::new(GatewayConfig { url: server.uri() }).unwrap()
}

fn sample_device() -> Device {
    Device {
        id: "dev1".to_string(),
        name: "Hallway".to_string(),
        current_temperature: 18.5,
        serial_id: "OTRV-zzzzzzzzzz".to_string(),
        active: true,
        schedules: vec![],
        metadata: serde_json::Map::new(),
    }
}

#[tokio::test]
async fn list_devices_distinguishes_persisted_from_unpersisted() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/trv"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "dev1",
                "name": "Hallway",
                "currentTemperature": 18.5,
                "serialId": "OTRV-zzzzzzzzzz",
                "active": true
            },
            {
                "name": "Device 2",
                "currentTemperature": 22.0,
                "serialId": "OTRV-aaaaaaaaaa",
                "active": true
            }
        ])))
        .mount(&server)
        .await;

    let devices = gateway(&server).list_devices().await.unwrap();
    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].id.as_deref(), Some("dev1"));
    assert!(devices[1].id.is_none());
    assert!(devices[0].schedules.is_empty());
}

#[tokio::test]
async fn create_device_posts_the_full_record() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/trv"))
        .and(body_partial_json(json!({"id": "dev1", "serialId": "OTRV-zzzzzzzzzz"})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    gateway(&server).create_device(&sample_device()).await.unwrap();
}

#[tokio::test]
async fn update_and_delete_target_the_device_path() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/trv/dev1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/trv/dev1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = gateway(&server);
    client.update_device(&sample_device()).await.unwrap();
    client.delete_device("dev1").await.unwrap();
}

#[tokio::test]
async fn gateway_error_status_is_upstream() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/trv"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = gateway(&server).list_devices().await;
    assert!(matches!(result, Err(DomainError::Upstream(_))));
}

#[tokio::test]
async fn unreachable_gateway_is_upstream() {
    let client = HttpGatewayClient::new(GatewayConfig {
        url: "http://127.0.0.1:1".to_string(),
    })
    .unwrap();

    let result = client.list_devices().await;
    assert!(matches!(result, Err(DomainError::Upstream(_))));
}
