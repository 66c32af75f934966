use gemini::GeminiError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which of the two query operations an error or flag belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    Search,
    Compare,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Compare => "compare",
        }
    }

    /// The single message shown to the user for any failure of this kind.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Search => {
                "An error occurred while fetching college data. The AI may have returned an invalid response. Please try a different query."
            }
            Self::Compare => {
                "An error occurred during the comparison. The AI may have returned an invalid response."
            }
        }
    }
}

impl std::fmt::Display for QueryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Received empty response from the completion service")]
    EmptyResponse,

    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    #[error("Completion request failed: {0}")]
    Transport(#[from] GeminiError),

    #[error("Invalid response schema: {0}")]
    Schema(String),
}

impl QueryError {
    pub fn invalid_format(reason: impl Into<String>) -> Self {
        Self::InvalidFormat(reason.into())
    }

    /// Failures caused by what the service returned, as opposed to reaching it
    pub fn is_decode_failure(&self) -> bool {
        matches!(self, Self::EmptyResponse | Self::InvalidFormat(_))
    }
}

pub type Result<T> = std::result::Result<T, QueryError>;
