//! Error Types

use thiserror::Error;

/// Result type alias for checkout operations
pub type Result<T> = std::result::Result<T, CheckoutError>;

/// Checkout error types
#[derive(Error, Debug)]
pub enum CheckoutError {
    /// Billing form or cart rejected before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Payment-intent request failed or returned a malformed body
    #[error("Payment initialization failed: {0}")]
    Initialization(String),

    /// Provider declined or errored while confirming the charge
    #[error("{0}")]
    Confirmation(String),

    /// Post-charge purchase recording failed
    #[error("Recording error: {0}")]
    Recording(String),

    /// A submission is already in flight for this attempt
    #[error("Payment already in progress")]
    InProgress,

    /// The attempt already succeeded and must be closed first
    #[error("Payment already completed")]
    AlreadyCompleted,

    /// The attempt was closed while a request was outstanding
    #[error("Payment attempt abandoned")]
    Abandoned,

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CheckoutError {
    /// Check if the user can simply resubmit
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Initialization(_) | Self::Confirmation(_) | Self::Http(_)
        )
    }

    /// Convert to a message suitable for inline display
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) | Self::Confirmation(msg) => msg.clone(),
            Self::Initialization(_) | Self::Http(_) => {
                "Payment initialization failed. Please try again.".into()
            }
            Self::InProgress => "Your payment is already being processed.".into(),
            Self::AlreadyCompleted => "This order has already been paid.".into(),
            Self::Abandoned => "The payment was cancelled.".into(),
            Self::Recording(_) | Self::Json(_) => "Payment failed. Try again.".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmation_message_is_verbatim() {
        let err = CheckoutError::Confirmation("Your card was declined.".into());
        assert_eq!(err.user_message(), "Your card was declined.");
        assert_eq!(err.to_string(), "Your card was declined.");
        assert!(err.is_retryable());
    }

    #[test]
    fn test_initialization_message_is_generic() {
        let err = CheckoutError::Initialization("HTTP 502".into());
        assert_eq!(
            err.user_message(),
            "Payment initialization failed. Please try again."
        );
        assert!(!CheckoutError::Validation("x".into()).is_retryable());
    }
}
