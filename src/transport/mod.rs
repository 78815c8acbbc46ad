//! Hub transport and the lock that serializes access to it
//!
//! The transport is a request/response channel to the hub. One transport
//! instance is shared by every upload spawned from the same
//! [`FileUpload`](crate::FileUpload), and each open/send/close sequence runs
//! under a single [`TransportGuard`] so sequences from different uploads never
//! interleave.

pub mod https;

pub use https::HttpsHubTransport;

use crate::error::Result;
use crate::message::FileUploadHttpsMessage;
use crate::status::HubStatusCode;
use std::sync::{Arc, Mutex, PoisonError};

/// HTTP method used for a hub request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpsMethod {
    Post,
}

impl std::fmt::Display for HttpsMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpsMethod::Post => write!(f, "POST"),
        }
    }
}

impl From<HttpsMethod> for reqwest::Method {
    fn from(method: HttpsMethod) -> Self {
        match method {
            HttpsMethod::Post => reqwest::Method::POST,
        }
    }
}

/// Response received from the hub
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMessage {
    body: Vec<u8>,
    status: HubStatusCode,
}

impl ResponseMessage {
    pub fn new(body: impl Into<Vec<u8>>, status: HubStatusCode) -> Self {
        Self {
            body: body.into(),
            status,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    pub fn status(&self) -> HubStatusCode {
        self.status
    }
}

/// Request/response channel to the hub
pub trait HubTransport: Send {
    /// Prepare the channel for a send; opening an open transport is a no-op
    fn open(&mut self) -> Result<()>;

    /// Send one request and wait for its response
    fn send(
        &mut self,
        message: &FileUploadHttpsMessage,
        method: HttpsMethod,
        path: &str,
    ) -> Result<ResponseMessage>;

    /// Release the channel
    fn close(&mut self) -> Result<()>;
}

/// Shared, lock-protected handle to a [`HubTransport`]
///
/// Cloning the guard shares the same transport and the same lock.
#[derive(Clone)]
pub struct TransportGuard {
    transport: Arc<Mutex<Box<dyn HubTransport>>>,
}

impl TransportGuard {
    pub fn new<T: HubTransport + 'static>(transport: T) -> Self {
        Self {
            transport: Arc::new(Mutex::new(Box::new(transport))),
        }
    }

    /// Run one open/send/close sequence while holding the lock
    ///
    /// The transport is closed even when the send fails; a send error takes
    /// precedence over a close error. A lock poisoned by a panicking upload is
    /// taken over, since every sequence starts with a fresh `open`.
    pub fn round_trip(
        &self,
        message: &FileUploadHttpsMessage,
        method: HttpsMethod,
        path: &str,
    ) -> Result<ResponseMessage> {
        let mut transport = self
            .transport
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        transport.open()?;
        let response = transport.send(message, method, path);
        let closed = transport.close();

        let response = response?;
        closed?;
        Ok(response)
    }
}

impl std::fmt::Debug for TransportGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportGuard")
            .field("shared_by", &Arc::strong_count(&self.transport))
            .finish()
    }
}
