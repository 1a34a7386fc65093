use thiserror::Error;

/// Errors that can occur while planning recipes or managing favorites.
///
/// The `Display` output of every variant is the message shown to the user.
#[derive(Error, Debug)]
pub enum PlannerError {
    /// Input rejected locally before any request was dispatched
    #[error("{0}")]
    Validation(String),

    /// The request did not settle before the deadline
    #[error("The request is taking too long (over {secs}s). Try again in a moment.")]
    Timeout { secs: u64 },

    /// The response body could not be decoded as JSON, even after fence stripping
    #[error("The backend returned a payload that could not be decoded.")]
    MalformedPayload,

    /// The backend answered with an `{error, detail}` envelope
    #[error("{0}")]
    Application(String),

    /// Transport-level failure already rendered to a message
    #[error("{0}")]
    Transport(String),

    /// Non-2xx response with a normalized message
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// A 2xx status other than 200
    #[error("Unexpected response ({0}).")]
    UnexpectedResponse(u16),

    /// Failed to send the request or read the response
    #[error("{0}")]
    Request(#[from] reqwest::Error),

    /// The API base URL or an endpoint path could not be built
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// Session lookup failed
    #[error("Session error: {0}")]
    Session(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_mentions_seconds() {
        let err = PlannerError::Timeout { secs: 30 };
        assert_eq!(
            err.to_string(),
            "The request is taking too long (over 30s). Try again in a moment."
        );
    }

    #[test]
    fn test_http_message_is_prefixed_with_status() {
        let err = PlannerError::Http {
            status: 401,
            message: "UNAUTHENTICATED".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 401: UNAUTHENTICATED");
    }

    #[test]
    fn test_validation_and_application_pass_through() {
        assert_eq!(
            PlannerError::Validation("pick something".to_string()).to_string(),
            "pick something"
        );
        assert_eq!(
            PlannerError::Application("Server error: boom".to_string()).to_string(),
            "Server error: boom"
        );
        assert_eq!(
            PlannerError::UnexpectedResponse(204).to_string(),
            "Unexpected response (204)."
        );
    }
}
