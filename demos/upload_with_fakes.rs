//! Upload walkthrough against an in-memory hub and storage account
//!
//! This example runs the full request/upload/notify exchange without network
//! access, printing each hub request and the blob that storage received.

use hub_file_upload::{
    BlobClientFactory, BlockBlobClient, FileUpload, FileUploadHttpsMessage, HttpsMethod,
    HubStatusCode, HubTransport, Payload, ResponseMessage, Result, UploadError, UploadRequest,
    UserContext,
};
use std::fs::File;
use std::io::{Read, Write};
use tempfile::tempdir;

/// Hub that hands out one fixed destination and accepts every notification
struct InMemoryHub;

impl HubTransport for InMemoryHub {
    fn open(&mut self) -> Result<()> {
        Ok(())
    }

    fn send(
        &mut self,
        message: &FileUploadHttpsMessage,
        method: HttpsMethod,
        path: &str,
    ) -> Result<ResponseMessage> {
        println!(
            "  hub <- {} {} {}",
            method,
            path,
            String::from_utf8_lossy(&message.body())
        );

        match path {
            "/files" => {
                let request: serde_json::Value = serde_json::from_slice(&message.body())?;
                let blob_name = request["blobName"].as_str().unwrap_or_default();
                let destination = serde_json::json!({
                    "correlationId": "demo-correlation",
                    "hostname": "demo.blob.core.windows.net",
                    "containerName": "uploads",
                    "blobName": format!("demo-device/{}", blob_name),
                    "sasToken": "?sv=2016-05-31&sig=demo",
                });
                Ok(ResponseMessage::new(serde_json::to_vec(&destination)?, HubStatusCode::Ok))
            }
            "/notifications" => Ok(ResponseMessage::new(Vec::new(), HubStatusCode::OkEmpty)),
            other => Err(UploadError::transport_error("send", format!("unknown path {}", other))),
        }
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

struct InMemoryStorage;

struct InMemoryBlob {
    uri: String,
}

impl BlockBlobClient for InMemoryBlob {
    fn upload(&self, mut payload: Payload, length: u64) -> Result<()> {
        let mut data = Vec::new();
        payload.read_to_end(&mut data)?;
        println!("  storage <- PUT {} ({} of {} bytes)", self.uri, data.len(), length);
        Ok(())
    }
}

impl BlobClientFactory for InMemoryStorage {
    fn client_for(&self, blob_uri: &str) -> Result<Box<dyn BlockBlobClient>> {
        Ok(Box::new(InMemoryBlob {
            uri: blob_uri.to_string(),
        }))
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("Hub File Upload - In-Memory Walkthrough");
    println!("=======================================");

    let temp_dir = tempdir()?;
    let file_path = temp_dir.path().join("reading.json");
    let mut file = File::create(&file_path)?;
    file.write_all(br#"{"temperature": 21.5, "humidity": 40}"#)?;
    file.sync_all()?;
    println!("Created {}", file_path.display());

    let file = File::open(&file_path)?;
    let length = file.metadata()?.len();

    let file_upload = FileUpload::with_collaborators(InMemoryHub, InMemoryStorage);
    let request = UploadRequest::builder()
        .blob_name("reading.json")
        .payload(file)
        .length(length)
        .on_status(|status: HubStatusCode, _ctx: Option<&UserContext>| {
            println!("Callback received {}", status);
        })
        .build()?;

    let status = file_upload.upload(request).await?;
    println!("✓ Upload finished with {}", status);

    Ok(())
}
