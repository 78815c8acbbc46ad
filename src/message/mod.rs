//! Application messages and their HTTPS wire form
//!
//! A [`Message`] is what the upload task builds for each hub round trip; the
//! [`FileUploadHttpsMessage`] adapter turns it into the envelope the HTTPS
//! transport puts on the wire.

pub mod https;
pub mod property;

pub use https::{FileUploadHttpsMessage, HTTPS_APP_PROPERTY_PREFIX, HTTPS_SYSTEM_PROPERTY_PREFIX};
pub use property::MessageProperty;

use crate::error::Result;

/// An application-level message exchanged with the hub
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    body: Vec<u8>,
    properties: Vec<MessageProperty>,
    message_id: Option<String>,
}

impl Message {
    /// Create a message carrying the given body
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: body.into(),
            properties: Vec::new(),
            message_id: None,
        }
    }

    /// Append an application property, validating name and value
    pub fn set_property(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<()> {
        self.properties.push(MessageProperty::new(name, value)?);
        Ok(())
    }

    /// Set the message identifier
    pub fn message_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = Some(id.into());
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    pub fn properties(&self) -> &[MessageProperty] {
        &self.properties
    }

    pub fn get_message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }
}
