//! Backend client errors.

use thiserror::Error;

/// Fallback message for HTTP 429 when the server sends none.
pub const RATE_LIMIT_FALLBACK: &str =
    "تعداد درخواست‌های شما از حد مجاز بیشتر است. لطفاً کمی صبر کنید.";

/// Message shown to visitors whenever the backend rate-limits them.
pub const RATE_LIMIT_NOTICE: &str =
    "تعداد درخواست‌های شما زیاد است. لطفاً چند لحظه صبر کنید و دوباره تلاش کنید.";

/// Generic failure message for errors without a server-provided text.
pub const GENERIC_FAILURE: &str = "خطا در ارتباط با سرور";

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP 429.
    #[error("{message}")]
    RateLimited { message: String },

    /// Any other non-2xx response.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The backend could not be reached (connect failure or timeout).
    #[error("{message}")]
    Network {
        message: String,
        #[source]
        source: reqwest::Error,
    },

    /// HTTP request failed for another reason.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body did not have the expected shape.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A 2xx envelope with `success: false` (or no data).
    #[error("{0}")]
    Rejected(String),
}

impl ApiError {
    /// HTTP status carried by the error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::RateLimited { .. } => Some(429),
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }

    /// Text suitable for a flash message.
    ///
    /// Rate limiting gets its own wording; transport and parse failures are
    /// hidden behind a generic message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::RateLimited { .. } => RATE_LIMIT_NOTICE.to_owned(),
            Self::Status { message, .. } | Self::Network { message, .. } => message.clone(),
            Self::Rejected(message) if !message.is_empty() => message.clone(),
            Self::Http(_) | Self::Parse(_) | Self::Rejected(_) => GENERIC_FAILURE.to_owned(),
        }
    }

    /// Message to show, preferring `fallback` over transport details.
    #[must_use]
    pub fn user_message_or(&self, fallback: &str) -> String {
        match self {
            Self::Http(_) | Self::Parse(_) => fallback.to_owned(),
            Self::Rejected(message) if message.is_empty() => fallback.to_owned(),
            _ => self.user_message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let limited = ApiError::RateLimited {
            message: "slow down".into(),
        };
        assert_eq!(limited.status(), Some(429));
        assert!(limited.is_rate_limited());
        assert_eq!(limited.user_message(), RATE_LIMIT_NOTICE);
        assert_eq!(limited.to_string(), "slow down");

        let forbidden = ApiError::Status {
            status: 403,
            message: "Forbidden".into(),
        };
        assert!(forbidden.is_unauthorized());
        assert!(!forbidden.is_not_found());
        assert_eq!(forbidden.user_message(), "Forbidden");
    }

    #[test]
    fn test_rejected_fallbacks() {
        assert_eq!(ApiError::Rejected(String::new()).user_message(), GENERIC_FAILURE);
        assert_eq!(
            ApiError::Rejected(String::new()).user_message_or("خطا در ایجاد محصول"),
            "خطا در ایجاد محصول"
        );
        assert_eq!(ApiError::Rejected("نامعتبر".into()).user_message_or("x"), "نامعتبر");
    }
}
