use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_yaml_bw as serde_yaml;

use crate::api::PaymentMethod;
use crate::authorization::AuthorizationLoader;
use crate::builder::ClientSettings;
use crate::challenge::{ChallengeParameters, ChallengeRequest, RenderType, UiType};
use crate::shims::StaticCapabilities;

pub const ENVIRONMENT_OVERRIDE_VAR: &str = "CHECKOUT_HANDOFF_ENVIRONMENT";

#[derive(Debug, Clone, Deserialize)]
pub struct HandoffConfig {
    pub return_url_scheme: String,
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default = "default_enabled_methods")]
    pub enabled_methods: Vec<PaymentMethod>,
    #[serde(default = "default_cancel_marker")]
    pub cancel_marker: String,
    #[serde(default = "default_analytics_prefix")]
    pub analytics_prefix: String,
    /// Tokenization key or client token.
    #[serde(default)]
    pub authorization: Option<String>,
    #[serde(default)]
    pub challenge: Option<ChallengeConfig>,
    /// Schemes the host has actually registered. Defaults to `return_url_scheme`.
    #[serde(default)]
    pub registered_schemes: Option<Vec<String>>,
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChallengeConfig {
    #[serde(default)]
    pub ui_type: UiType,
    #[serde(default)]
    pub render_types: Option<Vec<RenderType>>,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl HandoffConfig {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read handoff config {:?}", path))?;
        let mut config = Self::from_yaml_str(&content)
            .with_context(|| format!("failed to parse handoff config {:?}", path))?;
        config.source_path = Some(path.to_path_buf());
        Ok(config.with_environment_override(env::var(ENVIRONMENT_OVERRIDE_VAR).ok()))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: HandoffConfig =
            serde_yaml::from_str(content).context("invalid handoff configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_environment_override(mut self, environment: Option<String>) -> Self {
        if let Some(environment) = environment.filter(|value| !value.trim().is_empty()) {
            tracing::debug!(%environment, "environment overridden");
            self.environment = environment;
        }
        self
    }

    fn validate(&self) -> Result<()> {
        let scheme = self.return_url_scheme.trim();
        if scheme.is_empty() {
            bail!("return_url_scheme must not be empty");
        }
        if scheme.contains("://") {
            bail!("return_url_scheme must be a bare scheme, got {scheme:?}");
        }
        if self.cancel_marker.trim().is_empty() {
            bail!("cancel_marker must not be empty");
        }
        Ok(())
    }

    pub fn is_enabled(&self, method: PaymentMethod) -> bool {
        self.enabled_methods.contains(&method)
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            return_url_scheme: self.return_url_scheme.clone(),
            cancel_marker: self.cancel_marker.clone(),
            analytics_prefix: self.analytics_prefix.clone(),
        }
    }

    /// Capability registry reflecting this config.
    pub fn capabilities(&self) -> StaticCapabilities {
        let schemes = match &self.registered_schemes {
            Some(schemes) => schemes.clone(),
            None => vec![self.return_url_scheme.clone()],
        };
        let caps = schemes
            .into_iter()
            .fold(StaticCapabilities::new(), |caps, scheme| caps.register_scheme(scheme));
        self.enabled_methods
            .iter()
            .fold(caps, |caps, method| caps.enable(*method))
    }

    pub fn authorization_loader(&self) -> Result<AuthorizationLoader> {
        AuthorizationLoader::new(self.authorization.as_deref(), None)
            .context("invalid authorization in handoff config")
    }

    pub fn challenge_parameters(&self) -> Option<ChallengeParameters> {
        self.challenge.as_ref().map(|challenge| {
            let request = ChallengeRequest {
                ui_type: challenge.ui_type,
                render_types: challenge.render_types.clone(),
            };
            ChallengeParameters::build(
                &self.environment,
                &request,
                Duration::from_millis(challenge.request_timeout_ms),
            )
        })
    }
}

fn default_environment() -> String {
    "sandbox".to_string()
}

fn default_enabled_methods() -> Vec<PaymentMethod> {
    vec![PaymentMethod::PayPal]
}

fn default_cancel_marker() -> String {
    crate::resume::DEFAULT_CANCEL_MARKER.to_string()
}

fn default_analytics_prefix() -> String {
    crate::telemetry::DEFAULT_ANALYTICS_PREFIX.to_string()
}

fn default_request_timeout_ms() -> u64 {
    8000
}
