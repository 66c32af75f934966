use thiserror::Error;

/// Errors talking to the Gemini API
#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("Gemini API error: {message}")]
    Api {
        message: String,
        status_code: Option<u16>,
    },

    #[error("Gemini rate limited, retry after {retry_after:?}s")]
    RateLimited { retry_after: Option<u64> },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl GeminiError {
    /// HTTP status returned by the API, when there was one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            GeminiError::Api { status_code, .. } => *status_code,
            GeminiError::RateLimited { .. } => Some(429),
            GeminiError::Http(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

/// Result type alias for Gemini operations
pub type GeminiResult<T> = Result<T, GeminiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code() {
        let err = GeminiError::Api {
            message: "API key not valid".to_string(),
            status_code: Some(400),
        };
        assert_eq!(err.status_code(), Some(400));
        assert_eq!(
            GeminiError::RateLimited { retry_after: None }.status_code(),
            Some(429)
        );
        assert_eq!(
            GeminiError::Api {
                message: "no status".to_string(),
                status_code: None,
            }
            .status_code(),
            None
        );
    }
}
