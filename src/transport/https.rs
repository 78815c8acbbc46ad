//! HTTPS implementation of the hub transport

use crate::config::ClientConfig;
use crate::error::{Result, UploadError};
use crate::message::FileUploadHttpsMessage;
use crate::status::HubStatusCode;
use crate::transport::{HttpsMethod, HubTransport, ResponseMessage};
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;

/// Hub transport backed by a blocking reqwest client
///
/// The HTTP client is created on [`open`](HubTransport::open) and dropped on
/// [`close`](HubTransport::close).
pub struct HttpsHubTransport {
    config: ClientConfig,
    client: Option<Client>,
}

impl HttpsHubTransport {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            client: None,
        })
    }

    /// Full request URL for a device-relative path such as `/files`
    pub fn request_url(&self, path: &str) -> String {
        format!(
            "https://{}/devices/{}{}?api-version={}",
            self.config.hostname,
            urlencoding::encode(&self.config.device_id),
            path,
            self.config.api_version
        )
    }

    pub fn is_open(&self) -> bool {
        self.client.is_some()
    }
}

impl HubTransport for HttpsHubTransport {
    fn open(&mut self) -> Result<()> {
        if self.client.is_some() {
            return Ok(());
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .user_agent(self.config.user_agent.clone())
            .build()
            .map_err(|e| UploadError::transport_error("open", e.to_string()))?;

        self.client = Some(client);
        Ok(())
    }

    fn send(
        &mut self,
        message: &FileUploadHttpsMessage,
        method: HttpsMethod,
        path: &str,
    ) -> Result<ResponseMessage> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| UploadError::transport_error("send", "Transport is not open"))?;

        let url = self.request_url(path);
        log::debug!("{} {}", method, url);

        let mut request = client
            .request(method.into(), &url)
            .header(AUTHORIZATION, self.config.sas_token.as_str())
            .header(CONTENT_TYPE, message.content_type());

        for property in message.properties() {
            request = request.header(property.name(), property.value());
        }

        let response = request
            .body(message.body())
            .send()
            .map_err(|e| UploadError::transport_error("send", e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .map_err(|e| UploadError::transport_error("receive", e.to_string()))?;

        log::debug!("{} {} -> HTTP {}", method, path, status);
        Ok(ResponseMessage::new(
            body.to_vec(),
            HubStatusCode::from_http_status(status),
        ))
    }

    fn close(&mut self) -> Result<()> {
        self.client = None;
        Ok(())
    }
}
