use thiserror::Error;

use crate::api::PaymentMethod;

pub const RETURN_SURFACE_SETUP_URL: &str =
    "https://developer.paypal.com/braintree/docs/guides/client-sdk/setup/android/v4#browser-switch-setup";

/// Unified error across initiation, resume and tokenization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandoffError {
    #[error("{reason}")]
    InvalidRequest { reason: String },

    #[error("{method} is not enabled. See {} for more information.", .method.docs_url())]
    FeatureDisabled { method: PaymentMethod },

    #[error(
        "return surface for scheme '{scheme}' is missing, incorrectly configured or claimed by another app. See {} for the correct configuration: {reason}",
        RETURN_SURFACE_SETUP_URL
    )]
    CallbackSurfaceMisconfigured { scheme: String, reason: String },

    #[error("approval request failed: {reason}")]
    Backend { reason: String },

    #[error("tokenization failed: {reason}")]
    Tokenization { reason: String },

    #[error("malformed resume: {reason}")]
    MalformedResume { reason: String },

    #[error("{reason}")]
    Authorization { reason: String },

    #[error("challenge sdk error: {reason}")]
    Challenge { reason: String },

    #[error("configuration error: {reason}")]
    Configuration { reason: String },
}

/// Coarse classification used by callers to decide what to do with a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidRequest,
    FeatureDisabled,
    CallbackSurfaceMisconfigured,
    BackendError,
    TokenizationError,
    MalformedResume,
    AuthorizationError,
    ChallengeError,
    ConfigurationError,
}

impl ErrorKind {
    /// Only remote-call failures are worth retrying, and only by restarting the whole flow.
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::BackendError | ErrorKind::TokenizationError)
    }
}

impl HandoffError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HandoffError::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            HandoffError::FeatureDisabled { .. } => ErrorKind::FeatureDisabled,
            HandoffError::CallbackSurfaceMisconfigured { .. } => {
                ErrorKind::CallbackSurfaceMisconfigured
            }
            HandoffError::Backend { .. } => ErrorKind::BackendError,
            HandoffError::Tokenization { .. } => ErrorKind::TokenizationError,
            HandoffError::MalformedResume { .. } => ErrorKind::MalformedResume,
            HandoffError::Authorization { .. } => ErrorKind::AuthorizationError,
            HandoffError::Challenge { .. } => ErrorKind::ChallengeError,
            HandoffError::Configuration { .. } => ErrorKind::ConfigurationError,
        }
    }

    pub fn invalid_request(reason: impl Into<String>) -> Self {
        HandoffError::InvalidRequest {
            reason: reason.into(),
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        HandoffError::MalformedResume {
            reason: reason.into(),
        }
    }

    /// Collaborators may report any variant; the approval step only surfaces `Backend`.
    pub(crate) fn into_backend(self) -> Self {
        match self {
            HandoffError::Backend { .. } => self,
            other => HandoffError::Backend {
                reason: other.to_string(),
            },
        }
    }

    pub(crate) fn into_tokenization(self) -> Self {
        match self {
            HandoffError::Tokenization { .. } => self,
            other => HandoffError::Tokenization {
                reason: other.to_string(),
            },
        }
    }
}

/// Result alias for handoff operations.
pub type GResult<T> = Result<T, HandoffError>;
