use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read {path}: {source}")]
    ReadInput {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("Invalid record #{index}: {reason}")]
    InvalidRecord { index: usize, reason: String },

    #[error("Unsupported file layout: {0}")]
    UnsupportedLayout(String),

    #[error("Invalid document id {0:?}")]
    InvalidDocumentId(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Database error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected database response: {0}")]
    UnexpectedResponse(String),

    #[error("No subject id given")]
    MissingSubjectId,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CatalogError {
    pub(crate) fn invalid_record(index: usize, reason: impl Into<String>) -> Self {
        CatalogError::InvalidRecord {
            index,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CatalogError::invalid_record(3, "missing \"name\"");
        assert_eq!(format!("{}", err), "Invalid record #3: missing \"name\"");
    }

    #[test]
    fn test_api_error_display() {
        let err = CatalogError::Api {
            status: 403,
            message: "Missing or insufficient permissions.".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "Database error (403): Missing or insufficient permissions."
        );
    }
}
