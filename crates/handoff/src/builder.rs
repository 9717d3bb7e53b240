use std::sync::Arc;

use crate::authorization::AuthorizationLoader;
use crate::client::CheckoutClient;
use crate::dispatch::OutcomeDispatcher;
use crate::error::{GResult, HandoffError};
use crate::host::HostBundle;
use crate::initiator::{FlowInitiator, InitiatorSettings};
use crate::resume::{CancelDiscriminator, PathSegmentDiscriminator, ResumeInterpreter};
use crate::telemetry::{DEFAULT_ANALYTICS_PREFIX, EventNames};

#[derive(Clone, Debug)]
pub struct ClientSettings {
    pub return_url_scheme: String,
    pub cancel_marker: String,
    pub analytics_prefix: String,
}

impl ClientSettings {
    pub fn new(return_url_scheme: impl Into<String>) -> Self {
        let initiator = InitiatorSettings::new(return_url_scheme);
        Self {
            return_url_scheme: initiator.return_url_scheme,
            cancel_marker: initiator.cancel_marker,
            analytics_prefix: DEFAULT_ANALYTICS_PREFIX.to_string(),
        }
    }
}

#[derive(Default)]
pub struct ClientBuilder {
    host: Option<HostBundle>,
    settings: Option<ClientSettings>,
    authorization: Option<Arc<AuthorizationLoader>>,
    discriminator: Option<Arc<dyn CancelDiscriminator>>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host: HostBundle) -> Self {
        self.host = Some(host);
        self
    }

    pub fn with_settings(mut self, settings: ClientSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn with_authorization(mut self, loader: AuthorizationLoader) -> Self {
        self.authorization = Some(Arc::new(loader));
        self
    }

    /// Replaces the default terminal-path-segment cancel detection.
    pub fn with_discriminator(mut self, discriminator: Arc<dyn CancelDiscriminator>) -> Self {
        self.discriminator = Some(discriminator);
        self
    }

    pub fn build(self) -> GResult<CheckoutClient> {
        let host = Arc::new(self.host.ok_or_else(|| HandoffError::Configuration {
            reason: "host bundle missing".into(),
        })?);
        let settings = self.settings.ok_or_else(|| HandoffError::Configuration {
            reason: "client settings missing".into(),
        })?;
        if settings.return_url_scheme.trim().is_empty() {
            return Err(HandoffError::Configuration {
                reason: "return url scheme is empty".into(),
            });
        }
        let authorization = self.authorization.unwrap_or_default();
        let discriminator = self.discriminator.unwrap_or_else(|| {
            Arc::new(PathSegmentDiscriminator::new(settings.cancel_marker.clone()))
        });
        let events = EventNames::new(settings.analytics_prefix.clone());

        let initiator = FlowInitiator::new(
            host.clone(),
            authorization.clone(),
            InitiatorSettings {
                return_url_scheme: settings.return_url_scheme.clone(),
                cancel_marker: settings.cancel_marker.clone(),
            },
            events.clone(),
        );
        let dispatcher = OutcomeDispatcher::new(
            host.tokenizer.clone(),
            host.telemetry.clone(),
            authorization,
            events.clone(),
        );
        let interpreter =
            ResumeInterpreter::new(discriminator, dispatcher, host.telemetry.clone(), events);
        Ok(CheckoutClient::new(initiator, interpreter))
    }
}
