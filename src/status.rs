//! Status codes reported by the hub and delivered to user callbacks

use serde::{Deserialize, Serialize};

/// Status of a hub operation as seen by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HubStatusCode {
    Ok,
    OkEmpty,
    BadFormat,
    Unauthorized,
    TooManyDevices,
    HubOrDeviceIdNotFound,
    PreconditionFailed,
    RequestEntityTooLarge,
    Throttled,
    InternalServerError,
    ServerBusy,
    Error,
    MessageExpired,
    #[serde(rename = "MESSAGE_CANCELLED_ONCLOSE")]
    MessageCancelledOnClose,
}

impl HubStatusCode {
    /// Map an HTTP response status onto the hub taxonomy
    ///
    /// Anything not explicitly known to the hub protocol collapses to [`HubStatusCode::Error`].
    pub fn from_http_status(status: u16) -> Self {
        match status {
            200 => HubStatusCode::Ok,
            204 => HubStatusCode::OkEmpty,
            400 => HubStatusCode::BadFormat,
            401 => HubStatusCode::Unauthorized,
            403 => HubStatusCode::TooManyDevices,
            404 => HubStatusCode::HubOrDeviceIdNotFound,
            412 => HubStatusCode::PreconditionFailed,
            413 => HubStatusCode::RequestEntityTooLarge,
            429 => HubStatusCode::Throttled,
            500 => HubStatusCode::InternalServerError,
            503 => HubStatusCode::ServerBusy,
            _ => HubStatusCode::Error,
        }
    }

    /// Whether the status reports a completed operation
    pub fn is_success(&self) -> bool {
        matches!(self, HubStatusCode::Ok | HubStatusCode::OkEmpty)
    }
}

impl std::fmt::Display for HubStatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            HubStatusCode::Ok => "OK",
            HubStatusCode::OkEmpty => "OK_EMPTY",
            HubStatusCode::BadFormat => "BAD_FORMAT",
            HubStatusCode::Unauthorized => "UNAUTHORIZED",
            HubStatusCode::TooManyDevices => "TOO_MANY_DEVICES",
            HubStatusCode::HubOrDeviceIdNotFound => "HUB_OR_DEVICE_ID_NOT_FOUND",
            HubStatusCode::PreconditionFailed => "PRECONDITION_FAILED",
            HubStatusCode::RequestEntityTooLarge => "REQUEST_ENTITY_TOO_LARGE",
            HubStatusCode::Throttled => "THROTTLED",
            HubStatusCode::InternalServerError => "INTERNAL_SERVER_ERROR",
            HubStatusCode::ServerBusy => "SERVER_BUSY",
            HubStatusCode::Error => "ERROR",
            HubStatusCode::MessageExpired => "MESSAGE_EXPIRED",
            HubStatusCode::MessageCancelledOnClose => "MESSAGE_CANCELLED_ONCLOSE",
        };
        write!(f, "{}", name)
    }
}
