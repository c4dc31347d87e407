/// Result type for remote service calls
pub type ApiResult<T> = Result<T, ApiError>;

/// Failure of a remote call. Never retried by the callers in this workspace.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unauthorized - please login again")]
    Unauthorized,

    /// Non-success HTTP status. `message` is the server-provided message, or
    /// `API error: <status>` when the body carried none.
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Deserialization failed: {0}")]
    Decode(String),

    /// The service answered but reported `success: false`.
    #[error("Request rejected: {0}")]
    Rejected(String),
}

impl ApiError {
    pub fn status(status: u16, message: Option<String>) -> Self {
        ApiError::Status {
            status,
            message: message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| format!("API error: {status}")),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_falls_back_to_generic_message() {
        assert_eq!(ApiError::status(502, None).to_string(), "API error: 502");
        assert_eq!(
            ApiError::status(400, Some(String::new())).to_string(),
            "API error: 400"
        );
        assert_eq!(
            ApiError::status(409, Some("Name taken".into())).to_string(),
            "Name taken"
        );
        assert!(ApiError::status(404, None).is_not_found());
    }
}
