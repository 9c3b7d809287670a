use std::time::Duration;

use thiserror::Error;

/// Why a catalog fetch failed.
///
/// All variants trigger the same cache fallback; they stay distinct so the
/// failure can be logged and shown accurately.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Server returned HTTP {status}")]
    Http { status: u16 },

    #[error("Invalid catalog: {0}")]
    Decode(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

/// Maximum length for error details kept in messages
const MAX_ERROR_DETAIL_LENGTH: usize = 500;

impl FetchError {
    /// Truncate error details to avoid logging excessive data
    fn truncate_detail(detail: &str) -> String {
        if detail.len() <= MAX_ERROR_DETAIL_LENGTH {
            detail.to_string()
        } else {
            let mut end = MAX_ERROR_DETAIL_LENGTH;
            while !detail.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &detail[..end], detail.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode) -> Self {
        FetchError::Http {
            status: status.as_u16(),
        }
    }

    pub fn decode(err: impl std::fmt::Display) -> Self {
        FetchError::Decode(Self::truncate_detail(&err.to_string()))
    }

    /// HTTP status code, when the server answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            FetchError::Http { status } => Some(*status),
            _ => None,
        }
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, FetchError::Decode(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            FetchError::from_status(status)
        } else if err.is_decode() {
            FetchError::decode(err)
        } else {
            FetchError::Transport(Self::truncate_detail(&err.to_string()))
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::decode(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        let err = FetchError::from_status(reqwest::StatusCode::NOT_FOUND);
        assert_eq!(err, FetchError::Http { status: 404 });
        assert_eq!(err.status_code(), Some(404));
        assert_eq!(err.to_string(), "Server returned HTTP 404");
    }

    #[test]
    fn test_decode_detail_is_truncated() {
        let long = "x".repeat(2000);
        let err = FetchError::decode(&long);
        let FetchError::Decode(detail) = &err else {
            panic!("expected decode error");
        };
        assert!(detail.starts_with(&"x".repeat(MAX_ERROR_DETAIL_LENGTH)));
        assert!(detail.ends_with("(truncated, 2000 total bytes)"));
        assert!(err.is_decode());
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn test_timeout_keeps_sub_second_precision() {
        let err = FetchError::Timeout(Duration::from_millis(250));
        assert_eq!(err.to_string(), "Request timed out after 250ms");
        assert_eq!(FetchError::Timeout(Duration::from_secs(30)).to_string(), "Request timed out after 30s");
    }

    #[test]
    fn test_from_serde_error() {
        let err: FetchError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(err.is_decode());
    }
}
