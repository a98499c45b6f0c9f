//! Gateway error types.

/// Errors from the bike-share API gateway.
///
/// Every failure is one of two kinds: the request didn't produce a usable
/// 2xx response (`Network`), or it did but the payload had the wrong shape
/// (`Validation`).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// Timeout, connection failure, or non-2xx response.
    #[error("{}", network_display(.message, .status))]
    Network { message: String, status: Option<u16> },

    /// Response arrived but was malformed or reported failure.
    #[error("invalid response: {message}")]
    Validation { message: String },
}

fn network_display(message: &str, status: &Option<u16>) -> String {
    match status {
        Some(status) => format!("network error (HTTP {status}): {message}"),
        None => format!("network error: {message}"),
    }
}

impl ApiError {
    pub fn network(message: impl Into<String>) -> Self {
        ApiError::Network {
            message: message.into(),
            status: None,
        }
    }

    pub fn http(status: u16, message: impl Into<String>) -> Self {
        ApiError::Network {
            message: message.into(),
            status: Some(status),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
        }
    }

    /// HTTP status of a non-2xx response, if that is what failed.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ApiError::Network { status, .. } => *status,
            ApiError::Validation { .. } => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            format!("connection failed: {err}")
        } else {
            err.to_string()
        };
        ApiError::Network {
            message,
            status: err.status().map(|s| s.as_u16()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ApiError::network("request timed out");
        assert_eq!(err.to_string(), "network error: request timed out");

        let err = ApiError::http(503, "Service Unavailable");
        assert_eq!(
            err.to_string(),
            "network error (HTTP 503): Service Unavailable"
        );
        assert_eq!(err.http_status(), Some(503));

        let err = ApiError::validation("missing data");
        assert_eq!(err.to_string(), "invalid response: missing data");
        assert_eq!(err.http_status(), None);
    }
}
