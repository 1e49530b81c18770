//! The JSON envelope used by every JSON endpoint.

use serde::{Deserialize, Serialize};

/// The response envelope for JSON endpoints.
///
/// Successful responses carry `data` (and `count` for lists), failures carry
/// a human readable `message`. Fields that are not set are omitted from the
/// serialized output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request succeeded.
    pub success: bool,

    /// The response payload, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// The number of items in `data`, set for list responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,

    /// A human readable message, set for errors and acknowledgements.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// A successful response wrapping `data`.
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            count: None,
            message: None,
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// A successful list response with `count` set to the list length.
    pub fn list(items: Vec<T>) -> Self {
        Self {
            success: true,
            count: Some(items.len()),
            data: Some(items),
            message: None,
        }
    }
}

impl ApiResponse<()> {
    /// A successful response carrying only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            count: None,
            message: Some(message.into()),
        }
    }

    /// A failed response carrying an error message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            count: None,
            message: Some(message.into()),
        }
    }
}
