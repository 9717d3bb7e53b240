//! Configuration wrapper for the challenge (3-D Secure) SDK authentication mode.
//!
//! The SDK itself sits behind [`ChallengeSdk`]; this module only owns parameter
//! mapping and the consumer-session bookkeeping around `init`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::PaymentMethod;
use crate::error::{GResult, HandoffError};
use crate::host::CapabilityRegistry;
use crate::preflight;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(8000);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UiType {
    Native,
    Html,
    #[default]
    Both,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderType {
    Otp,
    SingleSelect,
    MultiSelect,
    Oob,
    Html,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SdkEnvironment {
    Staging,
    Production,
}

impl SdkEnvironment {
    pub fn from_config(environment: &str) -> Self {
        if environment.eq_ignore_ascii_case("production") {
            SdkEnvironment::Production
        } else {
            SdkEnvironment::Staging
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SdkUiType {
    Native,
    Html,
    Both,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SdkRenderType {
    Otp,
    SingleSelect,
    MultiSelect,
    Oob,
    Html,
}

impl From<UiType> for SdkUiType {
    fn from(value: UiType) -> Self {
        match value {
            UiType::Native => SdkUiType::Native,
            UiType::Html => SdkUiType::Html,
            UiType::Both => SdkUiType::Both,
        }
    }
}

impl From<RenderType> for SdkRenderType {
    fn from(value: RenderType) -> Self {
        match value {
            RenderType::Otp => SdkRenderType::Otp,
            RenderType::SingleSelect => SdkRenderType::SingleSelect,
            RenderType::MultiSelect => SdkRenderType::MultiSelect,
            RenderType::Oob => SdkRenderType::Oob,
            RenderType::Html => SdkRenderType::Html,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeRequest {
    #[serde(default)]
    pub ui_type: UiType,
    #[serde(default)]
    pub render_types: Option<Vec<RenderType>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChallengeParameters {
    pub environment: SdkEnvironment,
    pub request_timeout: Duration,
    pub enable_df_sync: bool,
    pub ui_type: SdkUiType,
    pub render_types: Option<Vec<SdkRenderType>>,
}

impl ChallengeParameters {
    pub fn build(environment: &str, request: &ChallengeRequest, timeout: Duration) -> Self {
        Self {
            environment: SdkEnvironment::from_config(environment),
            request_timeout: timeout,
            enable_df_sync: true,
            ui_type: request.ui_type.into(),
            render_types: request
                .render_types
                .as_ref()
                .map(|types| types.iter().copied().map(SdkRenderType::from).collect()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InitEvent {
    SetupCompleted { session_id: String },
    Validated { server_jwt: Option<String> },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChallengeLookup {
    pub transaction_id: String,
    pub pareq: String,
}

/// Narrow view of the vendor SDK handle.
pub trait ChallengeSdk: Send + Sync {
    fn configure(&self, parameters: &ChallengeParameters) -> Result<(), String>;
    fn init(&self, jwt: &str) -> Result<InitEvent, String>;
    fn continue_challenge(&self, transaction_id: &str, pareq: &str) -> Result<(), String>;
    fn cleanup(&self);
}

pub struct ChallengeClient<S> {
    sdk: S,
    consumer_session_id: Option<String>,
}

impl<S: ChallengeSdk> ChallengeClient<S> {
    pub fn new(sdk: S) -> Self {
        Self {
            sdk,
            consumer_session_id: None,
        }
    }

    pub fn preflight(registry: &dyn CapabilityRegistry) -> GResult<()> {
        preflight::check_method(
            PaymentMethod::ThreeDSecure,
            registry.is_enabled(PaymentMethod::ThreeDSecure),
        )
    }

    pub fn configure(&self, parameters: &ChallengeParameters) -> GResult<()> {
        self.sdk
            .configure(parameters)
            .map_err(|reason| challenge_error("challenge SDK configure error", reason))
    }

    pub fn initialize(&mut self, parameters: &ChallengeParameters, jwt: &str) -> GResult<String> {
        self.configure(parameters)?;
        let event = self
            .sdk
            .init(jwt)
            .map_err(|reason| challenge_error("challenge SDK init error", reason))?;
        match event {
            InitEvent::SetupCompleted { session_id } => {
                tracing::debug!("challenge session established");
                self.consumer_session_id = Some(session_id.clone());
                Ok(session_id)
            }
            InitEvent::Validated { .. } => {
                self.consumer_session_id
                    .clone()
                    .ok_or_else(|| HandoffError::Challenge {
                        reason: "consumer session id not available".into(),
                    })
            }
        }
    }

    pub fn continue_lookup(&self, lookup: &ChallengeLookup) -> GResult<()> {
        self.sdk
            .continue_challenge(&lookup.transaction_id, &lookup.pareq)
            .map_err(|reason| challenge_error("challenge SDK continue error", reason))
    }

    pub fn consumer_session_id(&self) -> Option<&str> {
        self.consumer_session_id.as_deref()
    }

    pub fn cleanup(&mut self) {
        self.sdk.cleanup();
        self.consumer_session_id = None;
    }
}

fn challenge_error(context: &str, reason: String) -> HandoffError {
    HandoffError::Challenge {
        reason: format!("{context}: {reason}"),
    }
}
