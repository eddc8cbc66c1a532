//! Storehub error types

use thiserror::Error;

/// Storehub error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// One or more required fields of a draft are empty
    #[error("Validation error: {entity} is missing {}", .fields.join(", "))]
    Validation {
        entity: &'static str,
        fields: Vec<&'static str>,
    },

    /// Update or lookup of an id that is not in the collection
    #[error("Not found: {entity} '{id}'")]
    NotFound { entity: &'static str, id: String },

    /// Image input exceeds the attachment size cap
    #[error("Image too large: {size} bytes (max {limit} bytes)")]
    ImageTooLarge { size: usize, limit: usize },

    /// Image input could not be decoded
    #[error("Unreadable image: {0}")]
    ImageUnreadable(String),

    /// Durable store write rejected
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Text generation failed
    #[error("Augmentation error: {0}")]
    Augmentation(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Short machine-readable code used in API error envelopes
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::ImageTooLarge { .. } => "IMAGE_TOO_LARGE",
            Self::ImageUnreadable(_) => "IMAGE_UNREADABLE",
            Self::Persistence(_) => "PERSISTENCE_FAILURE",
            Self::Augmentation(_) => "AUGMENTATION_FAILURE",
            _ => "INTERNAL_ERROR",
        }
    }
}

/// Result type alias for Storehub operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_lists_fields() {
        let err = Error::Validation {
            entity: "team member",
            fields: vec!["name", "image"],
        };
        assert_eq!(
            err.to_string(),
            "Validation error: team member is missing name, image"
        );
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_codes() {
        let err = Error::ImageTooLarge {
            size: 3 * 1024 * 1024,
            limit: 2 * 1024 * 1024,
        };
        assert_eq!(err.code(), "IMAGE_TOO_LARGE");
        assert_eq!(Error::Internal("x".into()).code(), "INTERNAL_ERROR");
    }
}
