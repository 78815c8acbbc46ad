pub mod blob;
pub mod callback;
pub mod config;
pub mod error;
pub mod message;
pub mod status;
pub mod transport;
pub mod upload;

pub use blob::{BlobClientFactory, BlockBlobClient, HttpBlobClientFactory, Payload};

pub use callback::{user_context, StatusCallback, UserContext};

pub use config::ClientConfig;

pub use error::{Result, UploadError};

pub use message::{FileUploadHttpsMessage, Message, MessageProperty};

pub use status::HubStatusCode;

pub use transport::{HttpsHubTransport, HttpsMethod, HubTransport, ResponseMessage, TransportGuard};

pub use upload::{
    BlobDestination, FileUpload, UploadHandle, UploadOutcome, UploadRequest, UploadState,
};
