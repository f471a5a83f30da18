//! エラー型定義
//!
//! 統一エラー型（thiserror使用）

use thiserror::Error;

/// Common layer error type
#[derive(Debug, Error)]
pub enum CommonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// インベントリクライアント/ストアのエラー型
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Common layer error
    #[error(transparent)]
    Common(#[from] CommonError),

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    Http(String),

    /// Timeout error
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Non-success status returned by the server
    #[error("Server returned HTTP {status} for {path}: {body}")]
    Status {
        /// Request path
        path: String,
        /// HTTP status code
        status: u16,
        /// Response body (truncated)
        body: String,
    },

    /// Response body did not match the expected shape
    #[error("Failed to decode response from {path}: {source}")]
    Decode {
        /// Request path
        path: String,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// Stored OpenAPI content is not valid JSON
    #[error("Invalid content document: {0}")]
    InvalidContent(String),
}

impl InventoryError {
    /// サーバーが返したHTTPステータス（該当する場合）
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// インベントリ処理の結果型
pub type InventoryResult<T> = Result<T, InventoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_only_for_status_errors() {
        let err = InventoryError::Status {
            path: "/api/getAllCollections".to_string(),
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.status_code(), Some(500));

        let err = InventoryError::Timeout("30s".to_string());
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn test_common_error_is_transparent() {
        let err: InventoryError = CommonError::Config("missing base url".to_string()).into();
        assert_eq!(err.to_string(), "Configuration error: missing base url");
    }
}
