use crate::domain::{Device, DiscoveredDevice, DomainError, DomainResult, GatewayClient};
use crate::gateway::config::GatewayConfig;
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use tracing::{debug, instrument};

/// HTTP implementation of GatewayClient, speaking the gateway's `/trv`
/// protocol. Failures map to Upstream and propagate unchanged; discovery
/// and the device service add no retries on top.
pub struct HttpGatewayClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpGatewayClient {
    pub fn new(config: GatewayConfig) -> DomainResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|err| DomainError::Upstream(format!("building gateway client failed: {}", err)))?;

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}/{}", self.base_url, path))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> DomainResult<reqwest::Response> {
        let response = request
            .send()
            .await
            .map_err(|err| DomainError::Upstream(format!("gateway unreachable: {}", err)))?;

        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::NOT_FOUND => Err(DomainError::NotFound(
                "device not known to the gateway".to_string(),
            )),
            status => Err(DomainError::Upstream(format!(
                "gateway returned {}",
                status
            ))),
        }
    }
}

#[async_trait]
impl GatewayClient for HttpGatewayClient {
    #[instrument(skip(self))]
    async fn list_devices(&self) -> DomainResult<Vec<DiscoveredDevice>> {
        let response = self.send(self.request(Method::GET, "trv")).await?;
        let devices: Vec<DiscoveredDevice> = response
            .json()
            .await
            .map_err(|err| DomainError::Upstream(format!("invalid gateway response: {}", err)))?;
        debug!(count = devices.len(), "gateway reported devices");
        Ok(devices)
    }

    #[instrument(skip(self, device), fields(device_id = %device.id))]
    async fn create_device(&self, device: &Device) -> DomainResult<()> {
        self.send(self.request(Method::POST, "trv").json(device))
            .await?;
        Ok(())
    }

    #[instrument(skip(self, device), fields(device_id = %device.id))]
    async fn update_device(&self, device: &Device) -> DomainResult<()> {
        self.send(
            self.request(Method::PUT, &format!("trv/{}", device.id))
                .json(device),
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_device(&self, device_id: &str) -> DomainResult<()> {
        self.send(self.request(Method::DELETE, &format!("trv/{}", device_id)))
            .await?;
        Ok(())
    }
}
