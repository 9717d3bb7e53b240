use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::api::{FlowKind, FlowRequest, PaymentCredential, PaymentMethod};
use crate::authorization::Authorization;
use crate::context::RequestContext;
use crate::error::GResult;
use crate::payload::TokenizationPayload;

/// What the approval backend receives for one initiation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApprovalRequest {
    pub kind: FlowKind,
    pub request: FlowRequest,
    pub correlation_id: String,
    pub return_url: String,
    pub cancel_url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalResponse {
    pub approval_url: String,
    pub success_url: String,
    pub client_metadata_id: String,
    pub merchant_account_id: String,
    pub intent: String,
}

#[async_trait]
pub trait ApprovalBackend: Send + Sync {
    async fn send(
        &self,
        authorization: &Authorization,
        request: &ApprovalRequest,
    ) -> GResult<ApprovalResponse>;
}

#[async_trait]
pub trait Tokenizer: Send + Sync {
    async fn tokenize(
        &self,
        authorization: &Authorization,
        payload: &TokenizationPayload,
    ) -> GResult<PaymentCredential>;
}

pub trait CapabilityRegistry: Send + Sync {
    fn is_enabled(&self, method: PaymentMethod) -> bool;
    fn is_callback_surface_registered(&self, return_url_scheme: &str) -> bool;
}

/// The browser (or SDK) that owns the flow between handoff and resume.
pub trait ExternalAuthority: Send + Sync {
    fn start(&self, target: &Url, context: &RequestContext) -> GResult<()>;
}

/// Analytics sink. Emission never blocks or fails a flow.
pub trait TelemetrySink: Send + Sync {
    fn emit(&self, event: &str);
}

pub struct HostBundle {
    pub approval: Arc<dyn ApprovalBackend>,
    pub tokenizer: Arc<dyn Tokenizer>,
    pub capabilities: Arc<dyn CapabilityRegistry>,
    pub authority: Arc<dyn ExternalAuthority>,
    pub telemetry: Arc<dyn TelemetrySink>,
}

impl HostBundle {
    pub fn new(
        approval: Arc<dyn ApprovalBackend>,
        tokenizer: Arc<dyn Tokenizer>,
        capabilities: Arc<dyn CapabilityRegistry>,
        authority: Arc<dyn ExternalAuthority>,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> Self {
        Self {
            approval,
            tokenizer,
            capabilities,
            authority,
            telemetry,
        }
    }
}
