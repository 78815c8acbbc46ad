//! File upload orchestration
//!
//! This module provides the coordinator that accepts uploads, the task that
//! runs the request/upload/notify handshake, and the wire payload types.

pub mod coordinator;
pub mod task;
pub mod types;

pub use coordinator::{FileUpload, UploadHandle};
pub use task::{UploadState, UploadTask, FILE_UPLOAD_PATH, NOTIFICATION_PATH};
pub use types::{
    BlobDestination, FileUploadRequest, UploadOutcome, UploadRequest, UploadRequestBuilder,
};
