//! Entry point for device file uploads
//!
//! [`FileUpload`] validates the caller's input and hands each upload to its own
//! background worker. The caller never waits on the network; the outcome
//! arrives through the status callback (and, optionally, the returned
//! [`UploadHandle`]).

use crate::blob::{BlobClientFactory, HttpBlobClientFactory, Payload};
use crate::callback::{StatusCallback, UserContext};
use crate::config::ClientConfig;
use crate::error::{Result, UploadError};
use crate::status::HubStatusCode;
use crate::transport::{HttpsHubTransport, HubTransport, TransportGuard};
use crate::upload::task::UploadTask;
use crate::upload::types::UploadRequest;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Coordinates uploads that share one hub transport
///
/// All uploads submitted through the same `FileUpload` (or its clones) share
/// one [`TransportGuard`], so their hub round trips are serialized while
/// their storage uploads run in parallel.
#[derive(Clone)]
pub struct FileUpload {
    transport: TransportGuard,
    blob_factory: Arc<dyn BlobClientFactory>,
    next_upload_id: Arc<AtomicU64>,
}

impl FileUpload {
    /// Create a coordinator talking HTTPS to the hub and to blob storage
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let blob_factory = HttpBlobClientFactory::new(config.timeout_secs, &config.user_agent)?;
        let transport = HttpsHubTransport::new(config)?;
        log::info!("FileUpload object is created successfully");
        Ok(Self::with_collaborators(transport, blob_factory))
    }

    /// Create a coordinator over caller-provided collaborators
    pub fn with_collaborators<T, F>(transport: T, blob_factory: F) -> Self
    where
        T: HubTransport + 'static,
        F: BlobClientFactory + 'static,
    {
        Self {
            transport: TransportGuard::new(transport),
            blob_factory: Arc::new(blob_factory),
            next_upload_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Start uploading `payload` as `blob_name` in the background
    ///
    /// Fails with `InvalidParameter` if the blob name is empty or the payload
    /// or callback is missing; nothing is scheduled in that case.
    pub fn submit(
        &self,
        blob_name: &str,
        payload: Option<Payload>,
        length: u64,
        callback: Option<Arc<dyn StatusCallback>>,
        context: Option<UserContext>,
    ) -> Result<UploadHandle> {
        let request = UploadRequest::builder()
            .blob_name(blob_name)
            .boxed_payload(payload)
            .length(length)
            .callback(callback)
            .context(context)
            .build()?;
        self.submit_request(request)
    }

    /// Start a prepared upload in the background
    pub fn submit_request(&self, request: UploadRequest) -> Result<UploadHandle> {
        let blob_name = request.blob_name().to_string();
        let task = self.task(request)?;
        let id = self.next_upload_id.fetch_add(1, Ordering::SeqCst);

        let handle = thread::Builder::new()
            .name(format!("file-upload-{}", id))
            .spawn(move || task.run())?;

        log::debug!("Scheduled upload {} of {}", id, blob_name);
        Ok(UploadHandle { blob_name, handle })
    }

    /// Run an upload on the tokio blocking pool and await its terminal status
    ///
    /// The request's callback is still invoked before the future resolves.
    #[cfg(feature = "tokio")]
    pub async fn upload(&self, request: UploadRequest) -> Result<HubStatusCode> {
        let task = self.task(request)?;

        tokio::task::spawn_blocking(move || task.run())
            .await
            .map_err(|e| UploadError::worker_error(e.to_string()))
    }

    fn task(&self, request: UploadRequest) -> Result<UploadTask> {
        UploadTask::new(request, self.transport.clone(), self.blob_factory.clone())
    }
}

impl std::fmt::Debug for FileUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileUpload")
            .field("transport", &self.transport)
            .field(
                "submitted",
                &(self.next_upload_id.load(Ordering::SeqCst) - 1),
            )
            .finish()
    }
}

/// Handle to an upload running in the background
///
/// Dropping the handle detaches the upload; it still runs to completion.
#[derive(Debug)]
pub struct UploadHandle {
    blob_name: String,
    handle: JoinHandle<HubStatusCode>,
}

impl UploadHandle {
    pub fn blob_name(&self) -> &str {
        &self.blob_name
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the upload finishes and return its terminal status
    pub fn join(self) -> Result<HubStatusCode> {
        self.handle.join().map_err(|_| {
            UploadError::worker_error(format!("Upload of {} panicked", self.blob_name))
        })
    }
}
