//! Error types for backend calls and form validation
//!
//! Terminal setup and config I/O use `anyhow` like the rest of the binary;
//! these enums cover the failures the wizard has to turn into user messages.

use thiserror::Error;

/// Failure of a single backend request
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection refused, timeout, TLS failure, truncated body...
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response; `body` is kept so a readable message can be extracted
    #[error("server returned HTTP {status}")]
    Status { status: u16, body: String },

    /// Body was not the JSON envelope the endpoint promises
    #[error("unexpected response body: {0}")]
    Decode(String),

    /// Payload arrived but could not be written to the download directory
    #[error("failed to save download: {0}")]
    Io(#[from] std::io::Error),
}

/// A required form field is missing
///
/// The `Display` text is shown to the user verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("请填写数据库连接信息")]
    MissingConnection,
    #[error("请选择数据库")]
    MissingDatabase,
    #[error("请选择表")]
    MissingTable,
    #[error("请填写包名")]
    MissingPackage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages_are_user_facing() {
        assert_eq!(ValidationError::MissingDatabase.to_string(), "请选择数据库");
        assert_eq!(ValidationError::MissingTable.to_string(), "请选择表");
        assert_eq!(ValidationError::MissingPackage.to_string(), "请填写包名");
    }

    #[test]
    fn test_status_error_display_omits_body() {
        let err = ApiError::Status {
            status: 500,
            body: "secret stack trace".to_string(),
        };
        assert_eq!(err.to_string(), "server returned HTTP 500");
    }
}
