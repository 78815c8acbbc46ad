//! Block blob upload over plain HTTPS with a SAS-authorized URI

use crate::blob::{BlobClientFactory, BlockBlobClient, Payload};
use crate::error::{Result, UploadError};
use bytesize::ByteSize;
use reqwest::blocking::{Body, Client};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::Url;
use std::time::{Duration, Instant};

const BLOB_TYPE_HEADER: &str = "x-ms-blob-type";
const BLOCK_BLOB: &str = "BlockBlob";
const BLOB_CONTENT_TYPE: &str = "application/octet-stream";

/// Uploads a whole payload with a single `PUT` to the blob URI
pub struct HttpBlockBlobClient {
    client: Client,
    blob_uri: Url,
}

impl HttpBlockBlobClient {
    pub fn new(client: Client, blob_uri: &str) -> Result<Self> {
        let blob_uri = Url::parse(blob_uri)
            .map_err(|e| UploadError::invalid_parameter("blob_uri", e.to_string()))?;

        if blob_uri.scheme() != "https" {
            return Err(UploadError::invalid_parameter(
                "blob_uri",
                "Blob URI must use https",
            ));
        }

        Ok(Self { client, blob_uri })
    }

    /// Destination without the SAS query, safe to log
    pub fn redacted_uri(&self) -> String {
        let mut uri = self.blob_uri.clone();
        uri.set_query(None);
        uri.to_string()
    }
}

impl BlockBlobClient for HttpBlockBlobClient {
    fn upload(&self, payload: Payload, length: u64) -> Result<()> {
        let start = Instant::now();

        let response = self
            .client
            .put(self.blob_uri.clone())
            .header(BLOB_TYPE_HEADER, BLOCK_BLOB)
            .header(CONTENT_TYPE, BLOB_CONTENT_TYPE)
            .header(CONTENT_LENGTH, length)
            .body(Body::sized(payload, length))
            .send()
            .map_err(|e| UploadError::storage_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(UploadError::storage_error(format!(
                "PUT {} failed with HTTP {}: {}",
                self.redacted_uri(),
                status,
                body
            )));
        }

        log::info!(
            "Uploaded {} to {} in {} ms",
            ByteSize(length),
            self.redacted_uri(),
            start.elapsed().as_millis()
        );
        Ok(())
    }
}

/// Factory sharing one HTTP connection pool across blob clients
#[derive(Clone)]
pub struct HttpBlobClientFactory {
    client: Client,
}

impl HttpBlobClientFactory {
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent.to_string())
            .build()
            .map_err(|e| UploadError::config_error(e.to_string()))?;
        Ok(Self { client })
    }
}

impl BlobClientFactory for HttpBlobClientFactory {
    fn client_for(&self, blob_uri: &str) -> Result<Box<dyn BlockBlobClient>> {
        Ok(Box::new(HttpBlockBlobClient::new(
            self.client.clone(),
            blob_uri,
        )?))
    }
}
