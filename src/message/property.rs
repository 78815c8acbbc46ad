//! Name/value properties attached to hub messages

use crate::error::{Result, UploadError};

/// A single message property
///
/// Properties travel as HTTP headers, so names and values are restricted to
/// visible ASCII; names additionally may not contain spaces or separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageProperty {
    name: String,
    value: String,
}

impl MessageProperty {
    /// Create a validated property
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let value = value.into();

        if name.is_empty() {
            return Err(UploadError::invalid_parameter(
                "name",
                "Property name cannot be empty",
            ));
        }

        if !name.chars().all(is_token_char) {
            return Err(UploadError::invalid_parameter(
                "name",
                format!("Property name '{}' contains characters not allowed in a header", name),
            ));
        }

        if !value.chars().all(|c| c == ' ' || c.is_ascii_graphic()) {
            return Err(UploadError::invalid_parameter(
                "value",
                format!("Value of property '{}' must be printable ASCII", name),
            ));
        }

        Ok(Self { name, value })
    }

    /// Create a property without validation, for names produced by this crate
    pub(crate) fn unchecked(name: String, value: String) -> Self {
        Self { name, value }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c)
}
