//! The three-phase upload state machine
//!
//! One [`UploadTask`] drives one upload: it asks the hub for a destination,
//! streams the payload to blob storage, and reports the outcome back to the
//! hub. Every failure along the way is folded into a single
//! [`HubStatusCode`] that is handed to the user callback exactly once.

use crate::blob::{BlobClientFactory, Payload};
use crate::error::{Result, UploadError};
use crate::message::{FileUploadHttpsMessage, Message};
use crate::status::HubStatusCode;
use crate::transport::{HttpsMethod, ResponseMessage, TransportGuard};
use crate::upload::types::{BlobDestination, FileUploadRequest, UploadOutcome, UploadRequest};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Hub path that hands out blob destinations
pub const FILE_UPLOAD_PATH: &str = "/files";

/// Hub path that receives upload outcomes
pub const NOTIFICATION_PATH: &str = "/notifications";

/// Phases of a single upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    Requesting,
    Uploading,
    Notifying,
    Done,
    Aborted,
}

/// Why an upload did not end with the hub's notification status
#[derive(Debug)]
enum TaskFailure {
    /// Hub declined the destination request
    Rejected(HubStatusCode),
    /// Transport, serialization or response parsing failed
    Internal(UploadError),
    /// Storage upload failed; the hub was still notified
    Storage,
}

impl TaskFailure {
    fn status(&self) -> HubStatusCode {
        match self {
            TaskFailure::Rejected(status) => *status,
            TaskFailure::Internal(_) | TaskFailure::Storage => HubStatusCode::Error,
        }
    }
}

impl From<UploadError> for TaskFailure {
    fn from(error: UploadError) -> Self {
        TaskFailure::Internal(error)
    }
}

/// Executes one upload from destination request to hub notification
pub struct UploadTask {
    request: UploadRequest,
    transport: TransportGuard,
    blob_factory: Arc<dyn BlobClientFactory>,
    state: UploadState,
}

impl UploadTask {
    pub fn new(
        request: UploadRequest,
        transport: TransportGuard,
        blob_factory: Arc<dyn BlobClientFactory>,
    ) -> Result<Self> {
        if request.blob_name.is_empty() {
            return Err(UploadError::invalid_parameter(
                "blob_name",
                "Blob name cannot be null or empty",
            ));
        }

        Ok(Self {
            request,
            transport,
            blob_factory,
            state: UploadState::Requesting,
        })
    }

    pub fn state(&self) -> UploadState {
        self.state
    }

    /// Run all phases and invoke the user callback with the terminal status
    ///
    /// A panic inside a collaborator is reported as `Error` like any other
    /// internal failure.
    pub fn run(mut self) -> HubStatusCode {
        log::info!(
            "Starting upload of {} ({} bytes)",
            self.request.blob_name,
            self.request.length
        );

        let executed = panic::catch_unwind(AssertUnwindSafe(|| self.execute()))
            .unwrap_or_else(|payload| {
                Err(TaskFailure::Internal(UploadError::worker_error(
                    panic_message(payload.as_ref()),
                )))
            });

        let status = match executed {
            Ok(status) => status,
            Err(failure) => {
                match &failure {
                    TaskFailure::Rejected(status) => log::warn!(
                        "Hub rejected upload request for {}: {}",
                        self.request.blob_name,
                        status
                    ),
                    TaskFailure::Internal(error) => log::error!(
                        "File upload of {} failed: {}",
                        self.request.blob_name,
                        error
                    ),
                    TaskFailure::Storage => log::error!(
                        "File upload of {} failed to reach storage",
                        self.request.blob_name
                    ),
                }
                failure.status()
            }
        };

        log::info!(
            "Upload of {} finished in state {:?} with status {}",
            self.request.blob_name,
            self.state,
            status
        );
        self.request.notify(status);
        status
    }

    fn execute(&mut self) -> std::result::Result<HubStatusCode, TaskFailure> {
        let destination = match self.request_destination() {
            Ok(destination) => destination,
            Err(failure) => {
                self.transition(UploadState::Aborted);
                return Err(failure);
            }
        };

        self.transition(UploadState::Uploading);
        let outcome = self.upload_to_blob(&destination);

        self.transition(UploadState::Notifying);
        let notified = self.send_notification(&outcome);
        self.transition(UploadState::Done);

        let status = notified?;
        if !outcome.is_success {
            return Err(TaskFailure::Storage);
        }
        Ok(status)
    }

    fn transition(&mut self, next: UploadState) {
        log::debug!(
            "Upload of {}: {:?} -> {:?}",
            self.request.blob_name,
            self.state,
            next
        );
        self.state = next;
    }

    fn request_destination(&self) -> std::result::Result<BlobDestination, TaskFailure> {
        let body = serde_json::to_vec(&FileUploadRequest::new(self.request.blob_name.as_str()))
            .map_err(UploadError::from)?;
        let response = self.send_to_hub(body, FILE_UPLOAD_PATH)?;

        match response.status() {
            HubStatusCode::Ok => {
                let destination = BlobDestination::from_json(response.bytes())?;
                log::debug!(
                    "Hub assigned {}/{}/{} (correlation id {})",
                    destination.host_name,
                    destination.container_name,
                    destination.blob_name,
                    destination.correlation_id
                );
                Ok(destination)
            }
            HubStatusCode::OkEmpty => Err(TaskFailure::Rejected(HubStatusCode::BadFormat)),
            other => Err(TaskFailure::Rejected(other)),
        }
    }

    fn upload_to_blob(&mut self, destination: &BlobDestination) -> UploadOutcome {
        let payload: Payload =
            std::mem::replace(&mut self.request.payload, Box::new(std::io::empty()));
        let length = self.request.length;

        let uploaded = self
            .blob_factory
            .client_for(&destination.blob_uri())
            .and_then(|client| client.upload(payload, length));

        match uploaded {
            Ok(()) => UploadOutcome::succeeded(destination.correlation_id.as_str()),
            Err(e) => {
                log::error!(
                    "File upload failed to upload the stream to the blob {}: {}",
                    destination.blob_name,
                    e
                );
                UploadOutcome::failed(destination.correlation_id.as_str())
            }
        }
    }

    fn send_notification(
        &self,
        outcome: &UploadOutcome,
    ) -> std::result::Result<HubStatusCode, TaskFailure> {
        let body = serde_json::to_vec(outcome).map_err(UploadError::from)?;
        let response = self.send_to_hub(body, NOTIFICATION_PATH).map_err(|e| {
            log::error!("File upload failed to report status to the hub: {}", e);
            TaskFailure::Internal(e)
        })?;
        Ok(response.status())
    }

    fn send_to_hub(&self, body: Vec<u8>, path: &str) -> Result<ResponseMessage> {
        let message = Message::new(body);
        let https_message = FileUploadHttpsMessage::parse_https_message(Some(&message))?;
        self.transport.round_trip(&https_message, HttpsMethod::Post, path)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("Upload panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("Upload panicked: {}", message)
    } else {
        "Upload panicked".to_string()
    }
}
