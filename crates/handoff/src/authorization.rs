use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{GResult, HandoffError};

pub const CLIENT_SDK_SETUP_URL: &str =
    "https://developer.paypal.com/braintree/docs/guides/client-sdk/setup/android/v4#initialization";

/// Credential used by the backend collaborators to sign their requests.
#[derive(Clone, PartialEq, Eq)]
pub enum Authorization {
    /// `<environment>_<segment>_<merchant>`.
    TokenizationKey(String),
    ClientToken(String),
}

impl Authorization {
    pub fn parse(raw: &str) -> GResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(HandoffError::Authorization {
                reason: "authorization string is empty".into(),
            });
        }
        if is_tokenization_key(raw) {
            Ok(Authorization::TokenizationKey(raw.to_string()))
        } else {
            Ok(Authorization::ClientToken(raw.to_string()))
        }
    }

    pub fn is_tokenization_key(&self) -> bool {
        matches!(self, Authorization::TokenizationKey(_))
    }
}

impl fmt::Debug for Authorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Authorization::TokenizationKey(_) => f.write_str("TokenizationKey(***)"),
            Authorization::ClientToken(_) => f.write_str("ClientToken(***)"),
        }
    }
}

fn is_tokenization_key(raw: &str) -> bool {
    let mut parts = raw.splitn(3, '_');
    let segments = [parts.next(), parts.next(), parts.next()];
    segments.iter().all(|segment| {
        segment.is_some_and(|value| {
            !value.is_empty()
                && value
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
    })
}

#[async_trait]
pub trait AuthorizationProvider: Send + Sync {
    async fn client_token(&self) -> GResult<String>;
}

/// Returns a cached authorization, fetching a client token on first use when none was supplied.
#[derive(Default)]
pub struct AuthorizationLoader {
    cached: RwLock<Option<Authorization>>,
    provider: Option<Arc<dyn AuthorizationProvider>>,
}

impl AuthorizationLoader {
    pub fn new(
        initial: Option<&str>,
        provider: Option<Arc<dyn AuthorizationProvider>>,
    ) -> GResult<Self> {
        let cached = initial.map(Authorization::parse).transpose()?;
        Ok(Self {
            cached: RwLock::new(cached),
            provider,
        })
    }

    pub fn with_authorization(authorization: Authorization) -> Self {
        Self {
            cached: RwLock::new(Some(authorization)),
            provider: None,
        }
    }

    pub fn with_provider(provider: Arc<dyn AuthorizationProvider>) -> Self {
        Self {
            cached: RwLock::new(None),
            provider: Some(provider),
        }
    }

    pub fn cached(&self) -> Option<Authorization> {
        self.cached.read().clone()
    }

    pub async fn load(&self) -> GResult<Authorization> {
        if let Some(authorization) = self.cached() {
            return Ok(authorization);
        }
        let Some(provider) = self.provider.as_ref() else {
            return Err(HandoffError::Authorization {
                reason: format!(
                    "Authorization required. See {CLIENT_SDK_SETUP_URL} for more info."
                ),
            });
        };
        let token = provider.client_token().await.map_err(|err| match err {
            HandoffError::Authorization { .. } => err,
            other => HandoffError::Authorization {
                reason: other.to_string(),
            },
        })?;
        let authorization = Authorization::parse(&token)?;
        tracing::debug!(
            tokenization_key = authorization.is_tokenization_key(),
            "authorization fetched"
        );
        *self.cached.write() = Some(authorization.clone());
        Ok(authorization)
    }
}
