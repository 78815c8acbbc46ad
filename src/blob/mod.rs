//! Blob storage collaborators
//!
//! Each upload builds its own [`BlockBlobClient`] scoped to the destination
//! URI the hub handed out, so storage clients are never shared between uploads.

pub mod http;

pub use http::{HttpBlobClientFactory, HttpBlockBlobClient};

use crate::error::Result;
use std::io::Read;

/// Readable payload streamed to storage
pub type Payload = Box<dyn Read + Send>;

/// Client bound to a single destination blob
pub trait BlockBlobClient: Send {
    /// Upload exactly `length` bytes read from `payload`
    fn upload(&self, payload: Payload, length: u64) -> Result<()>;
}

/// Builds a [`BlockBlobClient`] for a destination URI
pub trait BlobClientFactory: Send + Sync {
    fn client_for(&self, blob_uri: &str) -> Result<Box<dyn BlockBlobClient>>;
}
