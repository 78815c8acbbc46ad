use crate::blob::Payload;
use crate::callback::{StatusCallback, UserContext};
use crate::error::{Result, UploadError};
use crate::status::HubStatusCode;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::sync::Arc;

pub(crate) const UPLOAD_SUCCEEDED_DESCRIPTION: &str = "Succeed to upload to storage.";
pub(crate) const UPLOAD_FAILED_DESCRIPTION: &str = "Failed to upload to storage.";

/// Body of the destination request sent to the hub
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUploadRequest {
    #[serde(rename = "blobName")]
    pub blob_name: String,
}

impl FileUploadRequest {
    pub fn new(blob_name: impl Into<String>) -> Self {
        Self {
            blob_name: blob_name.into(),
        }
    }
}

/// Storage destination issued by the hub
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobDestination {
    #[serde(rename = "correlationId")]
    pub correlation_id: String,
    #[serde(rename = "hostname")]
    pub host_name: String,
    #[serde(rename = "containerName")]
    pub container_name: String,
    /// Name chosen by the hub; may differ from the requested one
    #[serde(rename = "blobName")]
    pub blob_name: String,
    /// Already carries its leading `?`
    #[serde(rename = "sasToken")]
    pub sas_token: String,
}

impl BlobDestination {
    /// Parse and validate a hub response body
    pub fn from_json(body: &[u8]) -> Result<Self> {
        if body.is_empty() {
            return Err(UploadError::malformed_response("Response body is empty"));
        }

        let destination: Self = serde_json::from_slice(body)?;

        for (field, value) in [
            ("correlationId", &destination.correlation_id),
            ("hostname", &destination.host_name),
            ("containerName", &destination.container_name),
            ("blobName", &destination.blob_name),
        ] {
            if value.is_empty() {
                return Err(UploadError::malformed_response(format!(
                    "Field {} cannot be empty",
                    field
                )));
            }
        }

        Ok(destination)
    }

    /// `https://{host}/{container}/{percent-encoded blob name}{sas token}`
    pub fn blob_uri(&self) -> String {
        format!(
            "https://{}/{}/{}{}",
            self.host_name,
            self.container_name,
            urlencoding::encode(&self.blob_name),
            self.sas_token
        )
    }
}

/// Result of the storage phase, reported back to the hub
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadOutcome {
    #[serde(rename = "correlationId")]
    pub correlation_id: String,
    #[serde(rename = "isSuccess")]
    pub is_success: bool,
    #[serde(rename = "statusCode")]
    pub status_code: i32,
    #[serde(rename = "statusDescription")]
    pub status_description: String,
}

impl UploadOutcome {
    pub fn succeeded(correlation_id: impl Into<String>) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            is_success: true,
            status_code: 0,
            status_description: UPLOAD_SUCCEEDED_DESCRIPTION.to_string(),
        }
    }

    pub fn failed(correlation_id: impl Into<String>) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            is_success: false,
            status_code: -1,
            status_description: UPLOAD_FAILED_DESCRIPTION.to_string(),
        }
    }
}

/// Everything a single upload needs, validated and owned by its task
pub struct UploadRequest {
    pub(crate) blob_name: String,
    pub(crate) payload: Payload,
    pub(crate) length: u64,
    pub(crate) callback: Arc<dyn StatusCallback>,
    pub(crate) context: Option<UserContext>,
}

impl UploadRequest {
    pub fn builder() -> UploadRequestBuilder {
        UploadRequestBuilder::default()
    }

    pub fn blob_name(&self) -> &str {
        &self.blob_name
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    /// Deliver a status to the user callback together with the original context
    pub(crate) fn notify(&self, status: HubStatusCode) {
        self.callback.execute(status, self.context.as_ref());
    }
}

impl std::fmt::Debug for UploadRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadRequest")
            .field("blob_name", &self.blob_name)
            .field("length", &self.length)
            .field("context", &self.context.is_some())
            .finish()
    }
}

/// Builder for [`UploadRequest`]
///
/// Missing pieces are reported by [`build`](UploadRequestBuilder::build)
/// rather than at compile time, so callers that assemble requests from
/// optional inputs get a uniform `InvalidParameter` error.
#[derive(Default)]
pub struct UploadRequestBuilder {
    blob_name: Option<String>,
    payload: Option<Payload>,
    length: u64,
    callback: Option<Arc<dyn StatusCallback>>,
    context: Option<UserContext>,
}

impl UploadRequestBuilder {
    pub fn blob_name(mut self, blob_name: impl Into<String>) -> Self {
        self.blob_name = Some(blob_name.into());
        self
    }

    pub fn payload<R: Read + Send + 'static>(mut self, payload: R) -> Self {
        self.payload = Some(Box::new(payload));
        self
    }

    pub fn boxed_payload(mut self, payload: Option<Payload>) -> Self {
        self.payload = payload;
        self
    }

    pub fn length(mut self, length: u64) -> Self {
        self.length = length;
        self
    }

    pub fn on_status<F>(mut self, callback: F) -> Self
    where
        F: Fn(HubStatusCode, Option<&UserContext>) + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(callback));
        self
    }

    pub fn callback(mut self, callback: Option<Arc<dyn StatusCallback>>) -> Self {
        self.callback = callback;
        self
    }

    pub fn context(mut self, context: Option<UserContext>) -> Self {
        self.context = context;
        self
    }

    pub fn build(self) -> Result<UploadRequest> {
        let blob_name = match self.blob_name {
            Some(name) if !name.is_empty() => name,
            _ => {
                return Err(UploadError::invalid_parameter(
                    "blob_name",
                    "Blob name cannot be null or empty",
                ))
            }
        };

        let payload = self.payload.ok_or_else(|| {
            UploadError::invalid_parameter("payload", "Payload stream cannot be null")
        })?;

        let callback = self.callback.ok_or_else(|| {
            UploadError::invalid_parameter("callback", "Status callback cannot be null")
        })?;

        Ok(UploadRequest {
            blob_name,
            payload,
            length: self.length,
            callback,
            context: self.context,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn ignore(_: HubStatusCode, _: Option<&UserContext>) {}

    #[test]
    fn test_blob_uri_encodes_blob_name() {
        let destination = BlobDestination {
            correlation_id: "somecorrelationid".to_string(),
            host_name: "contoso.azure-devices.net".to_string(),
            container_name: "testcontainer".to_string(),
            blob_name: "test-device1/image.jpg".to_string(),
            sas_token: "?se=2017-01-01T00%3A00%3A00Z&sig=abc".to_string(),
        };

        assert_eq!(
            destination.blob_uri(),
            "https://contoso.azure-devices.net/testcontainer/test-device1%2Fimage.jpg?se=2017-01-01T00%3A00%3A00Z&sig=abc"
        );
    }

    #[test]
    fn test_blob_uri_encodes_utf8_and_spaces() {
        let destination = BlobDestination {
            correlation_id: "c".to_string(),
            host_name: "h".to_string(),
            container_name: "k".to_string(),
            blob_name: "dir/é file.txt".to_string(),
            sas_token: "?s".to_string(),
        };
        assert_eq!(destination.blob_uri(), "https://h/k/dir%2F%C3%A9%20file.txt?s");
    }

    #[test]
    fn test_destination_from_json() {
        let body = br#"{
            "correlationId": "somecorrelationid",
            "hostname": "contoso.azure-devices.net",
            "containerName": "testcontainer",
            "blobName": "test-device1/image.jpg",
            "sasToken": "?se=x"
        }"#;
        let destination = BlobDestination::from_json(body).unwrap();
        assert_eq!(destination.correlation_id, "somecorrelationid");
        assert_eq!(destination.host_name, "contoso.azure-devices.net");
        assert_eq!(destination.sas_token, "?se=x");
    }

    #[test]
    fn test_destination_from_bad_json() {
        assert!(BlobDestination::from_json(b"").is_err());
        assert!(BlobDestination::from_json(b"{not json").is_err());
        assert!(BlobDestination::from_json(br#"{"correlationId":"c"}"#).is_err());

        let empty_id = br#"{"correlationId":"","hostname":"h","containerName":"c","blobName":"b","sasToken":"?s"}"#;
        assert!(matches!(
            BlobDestination::from_json(empty_id),
            Err(UploadError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_wire_field_names() {
        let request = serde_json::to_value(FileUploadRequest::new("image.jpg")).unwrap();
        assert_eq!(request, serde_json::json!({ "blobName": "image.jpg" }));

        let outcome = serde_json::to_value(UploadOutcome::failed("abc")).unwrap();
        assert_eq!(
            outcome,
            serde_json::json!({
                "correlationId": "abc",
                "isSuccess": false,
                "statusCode": -1,
                "statusDescription": "Failed to upload to storage."
            })
        );

        let outcome = UploadOutcome::succeeded("abc");
        assert!(outcome.is_success);
        assert_eq!(outcome.status_code, 0);
    }

    #[test]
    fn test_builder_validation() {
        let missing_name = UploadRequest::builder()
            .payload(Cursor::new(vec![1u8]))
            .on_status(ignore)
            .build();
        match missing_name.unwrap_err() {
            UploadError::InvalidParameter { parameter, .. } => assert_eq!(parameter, "blob_name"),
            other => panic!("Expected InvalidParameter error, got: {:?}", other),
        }

        let empty_name = UploadRequest::builder()
            .blob_name("")
            .payload(Cursor::new(vec![1u8]))
            .on_status(ignore)
            .build();
        assert!(empty_name.is_err());

        let missing_payload = UploadRequest::builder()
            .blob_name("a.txt")
            .on_status(ignore)
            .build();
        match missing_payload.unwrap_err() {
            UploadError::InvalidParameter { parameter, .. } => assert_eq!(parameter, "payload"),
            other => panic!("Expected InvalidParameter error, got: {:?}", other),
        }

        let missing_callback = UploadRequest::builder()
            .blob_name("a.txt")
            .payload(Cursor::new(vec![1u8]))
            .build();
        match missing_callback.unwrap_err() {
            UploadError::InvalidParameter { parameter, .. } => assert_eq!(parameter, "callback"),
            other => panic!("Expected InvalidParameter error, got: {:?}", other),
        }
    }

    #[test]
    fn test_builder_success() {
        let request = UploadRequest::builder()
            .blob_name("a.txt")
            .payload(Cursor::new(vec![1u8, 2, 3]))
            .length(3)
            .on_status(ignore)
            .build()
            .unwrap();

        assert_eq!(request.blob_name(), "a.txt");
        assert_eq!(request.length(), 3);
    }
}
