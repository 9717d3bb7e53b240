use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::Instrument;
use url::Url;
use uuid::Uuid;

use crate::api::{FlowKind, FlowRequest};
use crate::authorization::AuthorizationLoader;
use crate::context::RequestContext;
use crate::error::{GResult, HandoffError};
use crate::host::{ApprovalRequest, HostBundle};
use crate::preflight;
use crate::resume::DEFAULT_CANCEL_MARKER;
use crate::telemetry::{self, EventNames, FlowSpanAttributes};

const RETURN_HOST: &str = "onetouch";
const RETURN_VERSION: &str = "v1";
const SUCCESS_SEGMENT: &str = "success";

/// The suspended flow. Callers may persist it; nothing in it is needed to resume.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PendingHandoff {
    pub handoff_id: String,
    pub kind: FlowKind,
    pub target: Url,
    pub context: RequestContext,
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
}

#[derive(Clone, Debug)]
pub struct InitiatorSettings {
    pub return_url_scheme: String,
    pub cancel_marker: String,
}

impl InitiatorSettings {
    pub fn new(return_url_scheme: impl Into<String>) -> Self {
        Self {
            return_url_scheme: return_url_scheme.into(),
            cancel_marker: DEFAULT_CANCEL_MARKER.to_string(),
        }
    }

    pub fn return_url(&self) -> String {
        self.redirect_url(SUCCESS_SEGMENT)
    }

    pub fn cancel_url(&self) -> String {
        self.redirect_url(&self.cancel_marker)
    }

    fn redirect_url(&self, segment: &str) -> String {
        format!(
            "{}://{RETURN_HOST}/{RETURN_VERSION}/{segment}",
            self.return_url_scheme
        )
    }
}

pub struct FlowInitiator {
    host: Arc<HostBundle>,
    authorization: Arc<AuthorizationLoader>,
    settings: InitiatorSettings,
    events: EventNames,
}

impl FlowInitiator {
    pub fn new(
        host: Arc<HostBundle>,
        authorization: Arc<AuthorizationLoader>,
        settings: InitiatorSettings,
        events: EventNames,
    ) -> Self {
        Self {
            host,
            authorization,
            settings,
            events,
        }
    }

    /// Validates, runs preflight, obtains an approval target and hands off.
    ///
    /// Not idempotent: every call allocates a fresh correlation id.
    pub async fn initiate(&self, kind: FlowKind, request: &FlowRequest) -> GResult<PendingHandoff> {
        let handoff_id = Uuid::new_v4().to_string();
        let span = telemetry::flow_span("initiate");
        telemetry::annotate_span(
            &span,
            &FlowSpanAttributes {
                payment_type: Some(kind.payment_type()),
                handoff_id: Some(&handoff_id),
                correlation_id: None,
            },
        );
        let result = self
            .run(kind, request, handoff_id)
            .instrument(span)
            .await;
        if let Err(err) = &result {
            tracing::warn!(%kind, error = %err, "initiation failed");
        }
        result
    }

    async fn run(
        &self,
        kind: FlowKind,
        request: &FlowRequest,
        handoff_id: String,
    ) -> GResult<PendingHandoff> {
        validate(kind, request)?;
        preflight::check_with(
            self.host.capabilities.as_ref(),
            kind,
            &self.settings.return_url_scheme,
        )?;
        tracing::debug!("preflight passed");

        let sink = self.host.telemetry.as_ref();
        telemetry::emit(sink, &self.events.selected(kind));
        if request.offer_credit {
            telemetry::emit(sink, &self.events.credit_offered(kind));
        }

        let authorization = self.authorization.load().await?;
        let approval = ApprovalRequest {
            kind,
            request: request.clone(),
            correlation_id: Uuid::new_v4().to_string(),
            return_url: self.settings.return_url(),
            cancel_url: self.settings.cancel_url(),
        };
        tracing::debug!(correlation_id = %approval.correlation_id, "requesting approval target");
        let response = self
            .host
            .approval
            .send(&authorization, &approval)
            .await
            .map_err(HandoffError::into_backend)?;

        let target = Url::parse(&response.approval_url).map_err(|err| HandoffError::Backend {
            reason: format!("approval url '{}' is invalid: {err}", response.approval_url),
        })?;
        let context = RequestContext::from_approval(kind, &response);

        self.host
            .authority
            .start(&target, &context)
            .map_err(|err| match err {
                HandoffError::CallbackSurfaceMisconfigured { .. } => err,
                other => HandoffError::CallbackSurfaceMisconfigured {
                    scheme: self.settings.return_url_scheme.clone(),
                    reason: other.to_string(),
                },
            })?;
        telemetry::emit(sink, &self.events.browser_switch_started(kind));
        tracing::info!(
            correlation_id = %context.client_metadata_id,
            target = %target,
            "handoff suspended"
        );

        Ok(PendingHandoff {
            handoff_id,
            kind,
            target,
            context,
            started_at: OffsetDateTime::now_utc(),
        })
    }
}

/// Parameter rules per flow kind.
pub fn validate(kind: FlowKind, request: &FlowRequest) -> GResult<()> {
    match (kind, request.amount.is_some()) {
        (FlowKind::BillingAgreement, true) => Err(HandoffError::invalid_request(
            "There must be no amount specified for the Billing Agreement flow",
        )),
        (FlowKind::OneTimePayment, false) => Err(HandoffError::invalid_request(
            "An amount must be specified for the Single Payment flow.",
        )),
        _ => Ok(()),
    }
}
