//! API Response types
//!
//! Envelope used by the backend REST endpoints this component consumes.

use serde::{Deserialize, Serialize};

/// Standard API response code
pub const API_CODE_SUCCESS: &str = "E0000";

/// Unified API response structure
///
/// ```json
/// {
///     "code": "E0000",
///     "message": "Success",
///     "data": [ ... ]
/// }
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Response code (E0000 = success, others = error codes)
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Response data (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn ok(data: T) -> Self {
        Self {
            code: API_CODE_SUCCESS.to_string(),
            message: "Success".to_string(),
            data: Some(data),
        }
    }

    /// Create an error response
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            data: None,
        }
    }

    /// Whether the response carries a success code
    pub fn is_success(&self) -> bool {
        self.code == API_CODE_SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_response() {
        let res = ApiResponse::ok(vec![1, 2, 3]);
        assert!(res.is_success());
        assert_eq!(res.data.unwrap().len(), 3);
    }

    #[test]
    fn test_error_response() {
        let res: ApiResponse<()> = ApiResponse::error("E1001", "Bad query");
        assert!(!res.is_success());
        assert!(res.data.is_none());
    }
}
