//! In-memory hub and storage fakes shared by the integration tests

#![allow(dead_code)]

use hub_file_upload::{
    BlobClientFactory, BlockBlobClient, FileUploadHttpsMessage, HttpsMethod, HubStatusCode,
    HubTransport, Payload, ResponseMessage, Result, StatusCallback, UploadError, UserContext,
};
use std::io::Read;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const HOST: &str = "contoso.azure-devices.net";
pub const CONTAINER: &str = "testcontainer";
pub const SAS: &str = "?sv=2016-05-31&sr=b&sig=abc%3D&se=2017-01-01T00%3A00%3A00Z&sp=rw";

pub fn destination_json(correlation_id: &str, blob_name: &str) -> String {
    serde_json::json!({
        "correlationId": correlation_id,
        "hostname": HOST,
        "containerName": CONTAINER,
        "blobName": blob_name,
        "sasToken": SAS,
    })
    .to_string()
}

/// One request seen by the fake hub
#[derive(Debug, Clone)]
pub struct HubCall {
    pub path: String,
    pub body: serde_json::Value,
    pub content_type: String,
}

/// Shared view of everything the fake hub observed
#[derive(Clone, Default)]
pub struct HubRecorder {
    pub calls: Arc<Mutex<Vec<HubCall>>>,
    pub events: Arc<Mutex<Vec<&'static str>>>,
}

impl HubRecorder {
    pub fn calls(&self) -> Vec<HubCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.path).collect()
    }

    pub fn events(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().clone()
    }
}

/// Hub that issues a destination for every `/files` request
pub struct FakeHub {
    recorder: HubRecorder,
    request_status: HubStatusCode,
    request_body: Option<String>,
    notify_status: HubStatusCode,
    fail_notify: bool,
    send_delay: Duration,
    gate: Option<Receiver<()>>,
    opened: bool,
    issued: usize,
}

impl FakeHub {
    pub fn new() -> (Self, HubRecorder) {
        let recorder = HubRecorder::default();
        let hub = Self {
            recorder: recorder.clone(),
            request_status: HubStatusCode::Ok,
            request_body: None,
            notify_status: HubStatusCode::OkEmpty,
            fail_notify: false,
            send_delay: Duration::ZERO,
            gate: None,
            opened: false,
            issued: 0,
        };
        (hub, recorder)
    }

    pub fn request_status(mut self, status: HubStatusCode) -> Self {
        self.request_status = status;
        self
    }

    pub fn request_body(mut self, body: impl Into<String>) -> Self {
        self.request_body = Some(body.into());
        self
    }

    pub fn notify_status(mut self, status: HubStatusCode) -> Self {
        self.notify_status = status;
        self
    }

    pub fn fail_notify(mut self) -> Self {
        self.fail_notify = true;
        self
    }

    pub fn send_delay(mut self, delay: Duration) -> Self {
        self.send_delay = delay;
        self
    }

    /// Block every `open` until the returned sender releases it
    pub fn gated(mut self) -> (Self, mpsc::Sender<()>) {
        let (tx, rx) = mpsc::channel();
        self.gate = Some(rx);
        (self, tx)
    }
}

impl HubTransport for FakeHub {
    fn open(&mut self) -> Result<()> {
        if let Some(gate) = &self.gate {
            gate.recv_timeout(Duration::from_secs(10))
                .map_err(|e| UploadError::transport_error("open", e.to_string()))?;
        }
        assert!(!self.opened, "transport opened twice without close");
        self.opened = true;
        self.recorder.events.lock().unwrap().push("open");
        Ok(())
    }

    fn send(
        &mut self,
        message: &FileUploadHttpsMessage,
        method: HttpsMethod,
        path: &str,
    ) -> Result<ResponseMessage> {
        assert!(self.opened, "send on a closed transport");
        assert_eq!(method, HttpsMethod::Post);
        self.recorder.events.lock().unwrap().push("send");

        let body: serde_json::Value = serde_json::from_slice(&message.body())?;
        self.recorder.calls.lock().unwrap().push(HubCall {
            path: path.to_string(),
            body: body.clone(),
            content_type: message.content_type().to_string(),
        });

        if !self.send_delay.is_zero() {
            std::thread::sleep(self.send_delay);
        }

        match path {
            "/files" => {
                self.issued += 1;
                let blob_name = body["blobName"].as_str().unwrap_or_default().to_string();
                let response_body = self.request_body.clone().unwrap_or_else(|| {
                    destination_json(&format!("correlation-{}", self.issued), &blob_name)
                });
                Ok(ResponseMessage::new(response_body, self.request_status))
            }
            "/notifications" if self.fail_notify => {
                Err(UploadError::transport_error("send", "connection reset by peer"))
            }
            "/notifications" => Ok(ResponseMessage::new(Vec::new(), self.notify_status)),
            other => panic!("unexpected hub path {}", other),
        }
    }

    fn close(&mut self) -> Result<()> {
        assert!(self.opened, "close without open");
        self.opened = false;
        self.recorder.events.lock().unwrap().push("close");
        Ok(())
    }
}

/// Shared view of everything the fake storage observed
#[derive(Clone, Default)]
pub struct StorageRecorder {
    pub uploads: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
    pub in_flight: Arc<AtomicUsize>,
    pub max_in_flight: Arc<AtomicUsize>,
}

impl StorageRecorder {
    pub fn uris(&self) -> Vec<String> {
        self.uploads
            .lock()
            .unwrap()
            .iter()
            .map(|(uri, _)| uri.clone())
            .collect()
    }

    pub fn uploads(&self) -> Vec<(String, Vec<u8>)> {
        self.uploads.lock().unwrap().clone()
    }
}

pub struct FakeStorage {
    recorder: StorageRecorder,
    fail: bool,
    delay: Duration,
}

impl FakeStorage {
    pub fn new() -> (Self, StorageRecorder) {
        let recorder = StorageRecorder::default();
        let storage = Self {
            recorder: recorder.clone(),
            fail: false,
            delay: Duration::ZERO,
        };
        (storage, recorder)
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

struct FakeBlobClient {
    uri: String,
    recorder: StorageRecorder,
    fail: bool,
    delay: Duration,
}

impl BlockBlobClient for FakeBlobClient {
    fn upload(&self, mut payload: Payload, length: u64) -> Result<()> {
        let now = self.recorder.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.recorder.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let mut data = Vec::new();
        let read = payload.read_to_end(&mut data);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        self.recorder.in_flight.fetch_sub(1, Ordering::SeqCst);
        read?;

        if self.fail {
            return Err(UploadError::storage_error("The specified container does not exist"));
        }
        if data.len() as u64 != length {
            return Err(UploadError::storage_error("length mismatch"));
        }

        self.recorder
            .uploads
            .lock()
            .unwrap()
            .push((self.uri.clone(), data));
        Ok(())
    }
}

impl BlobClientFactory for FakeStorage {
    fn client_for(&self, blob_uri: &str) -> Result<Box<dyn BlockBlobClient>> {
        if self.fail {
            self.recorder
                .uploads
                .lock()
                .unwrap()
                .push((blob_uri.to_string(), Vec::new()));
        }
        Ok(Box::new(FakeBlobClient {
            uri: blob_uri.to_string(),
            recorder: self.recorder.clone(),
            fail: self.fail,
            delay: self.delay,
        }))
    }
}

/// Callback that forwards every status (and a string context, if any) to a channel
pub fn status_channel() -> (
    Arc<dyn StatusCallback>,
    Receiver<(HubStatusCode, Option<String>)>,
) {
    let (tx, rx) = mpsc::channel();
    let tx = Mutex::new(tx);
    let callback = move |status: HubStatusCode, context: Option<&UserContext>| {
        let context = context.and_then(|c| c.downcast_ref::<String>()).cloned();
        let _ = tx.lock().unwrap().send((status, context));
    };
    let callback: Arc<dyn StatusCallback> = Arc::new(callback);
    (callback, rx)
}

/// Wait for the next callback, failing the test if none arrives
pub fn next_status(
    rx: &Receiver<(HubStatusCode, Option<String>)>,
) -> (HubStatusCode, Option<String>) {
    rx.recv_timeout(Duration::from_secs(10))
        .expect("callback was not invoked")
}
