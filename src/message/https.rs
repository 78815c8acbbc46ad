//! HTTPS wire form of file upload messages

use crate::error::{Result, UploadError};
use crate::message::{Message, MessageProperty};

/// Prefix applied to every application property on the wire
pub const HTTPS_APP_PROPERTY_PREFIX: &str = "iothub-app-";

/// Prefix applied to system properties on the wire
pub const HTTPS_SYSTEM_PROPERTY_PREFIX: &str = "iothub-";

const SYSTEM_PROPERTY_MESSAGE_ID: &str = "messageid";

const HTTPS_SINGLE_MESSAGE_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Request or notification envelope sent to the hub
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUploadHttpsMessage {
    body: Vec<u8>,
    properties: Vec<MessageProperty>,
}

impl FileUploadHttpsMessage {
    /// Convert an application message into its wire form
    ///
    /// Application properties are renamed with [`HTTPS_APP_PROPERTY_PREFIX`];
    /// a message id, when present, is appended as the `iothub-messageid`
    /// system property.
    pub fn parse_https_message(message: Option<&Message>) -> Result<Self> {
        let message =
            message.ok_or_else(|| UploadError::invalid_parameter("message", "Null message"))?;

        let system_properties = usize::from(message.get_message_id().is_some());
        let mut properties = Vec::with_capacity(message.properties().len() + system_properties);

        properties.extend(message.properties().iter().map(|property| {
            MessageProperty::unchecked(
                format!("{}{}", HTTPS_APP_PROPERTY_PREFIX, property.name()),
                property.value().to_string(),
            )
        }));

        if let Some(message_id) = message.get_message_id() {
            properties.push(MessageProperty::unchecked(
                format!("{}{}", HTTPS_SYSTEM_PROPERTY_PREFIX, SYSTEM_PROPERTY_MESSAGE_ID),
                message_id.to_string(),
            ));
        }

        Ok(Self {
            body: message.bytes().to_vec(),
            properties,
        })
    }

    /// A copy of the message body
    pub fn body(&self) -> Vec<u8> {
        self.body.clone()
    }

    pub fn content_type(&self) -> &'static str {
        HTTPS_SINGLE_MESSAGE_CONTENT_TYPE
    }

    /// A copy of the wire properties
    pub fn properties(&self) -> Vec<MessageProperty> {
        self.properties.clone()
    }
}
