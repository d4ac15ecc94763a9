use chrono::{DateTime, Utc};
use core::fmt::{Display, Formatter};
use reqwest::StatusCode;
use std::sync::Arc;

/// Rate limit information from response headers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitInfo {
    pub remaining: usize,
    pub reset_at: DateTime<Utc>,
}

/// Why a single read against a remote API produced no data.
#[derive(Debug, Clone)]
pub enum FetchError {
    /// The requested resource does not exist (404).
    NotFound,

    /// The API refused the request because a rate limit was hit (403/429).
    RateLimited(RateLimitInfo),

    /// Any other non-success HTTP status.
    Status(u16),

    /// The request could not be completed or its body could not be decoded.
    Failed(Arc<ohno::AppError>),
}

/// Outcome of a single read against a remote API.
pub type FetchResult<T> = Result<T, FetchError>;

impl FetchError {
    /// Classify a non-success HTTP status.
    ///
    /// A rate-limited response without usable headers is assumed to reset one hour after `now`.
    #[must_use]
    pub fn from_status(status: StatusCode, rate_limit: Option<RateLimitInfo>, now: DateTime<Utc>) -> Self {
        match status.as_u16() {
            403 | 429 => Self::RateLimited(rate_limit.unwrap_or(RateLimitInfo {
                remaining: 0,
                reset_at: now + chrono::Duration::hours(1),
            })),
            404 => Self::NotFound,
            code => Self::Status(code),
        }
    }

    #[must_use]
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }
}

impl From<ohno::AppError> for FetchError {
    fn from(e: ohno::AppError) -> Self {
        Self::Failed(Arc::new(e))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        Self::Failed(Arc::new(e.into()))
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::RateLimited(info) => write!(
                f,
                "rate limited until {}",
                info.reset_at.with_timezone(&chrono::Local).format("%T")
            ),
            Self::Status(code) => write!(f, "unexpected HTTP status {code}"),
            Self::Failed(e) => write!(f, "{e:#}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ohno::app_err;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_704_067_200, 0).unwrap()
    }

    #[test]
    fn test_from_status_not_found() {
        assert!(matches!(FetchError::from_status(StatusCode::NOT_FOUND, None, now()), FetchError::NotFound));
    }

    #[test]
    fn test_from_status_rate_limited_uses_headers() {
        let info = RateLimitInfo {
            remaining: 0,
            reset_at: now() + chrono::Duration::minutes(5),
        };
        match FetchError::from_status(StatusCode::FORBIDDEN, Some(info), now()) {
            FetchError::RateLimited(got) => assert_eq!(got, info),
            other => panic!("expected RateLimited, got {other:?}"),
        }
    }

    #[test]
    fn test_from_status_rate_limited_defaults_to_one_hour() {
        match FetchError::from_status(StatusCode::TOO_MANY_REQUESTS, None, now()) {
            FetchError::RateLimited(got) => {
                assert_eq!(got.remaining, 0);
                assert_eq!(got.reset_at, now() + chrono::Duration::hours(1));
            }
            other => panic!("expected RateLimited, got {other:?}"),
        }
    }

    #[test]
    fn test_from_status_other() {
        assert!(matches!(
            FetchError::from_status(StatusCode::INTERNAL_SERVER_ERROR, None, now()),
            FetchError::Status(500)
        ));
        assert!(matches!(FetchError::from_status(StatusCode::GONE, None, now()), FetchError::Status(410)));
    }

    #[test]
    fn test_is_rate_limited() {
        assert!(FetchError::from_status(StatusCode::TOO_MANY_REQUESTS, None, now()).is_rate_limited());
        assert!(!FetchError::NotFound.is_rate_limited());
    }

    #[test]
    fn test_display() {
        assert_eq!(FetchError::NotFound.to_string(), "not found");
        assert_eq!(FetchError::Status(502).to_string(), "unexpected HTTP status 502");
        assert!(FetchError::from(app_err!("boom")).to_string().contains("boom"));
    }
}
