use crate::api::{FlowKind, FlowOutcome, FlowRequest};
use crate::error::GResult;
use crate::initiator::{FlowInitiator, PendingHandoff};
use crate::resume::{HandoffResult, ResumeInterpreter};

/// Entry point for applications: start a flow, later feed back what the authority reported.
pub struct CheckoutClient {
    initiator: FlowInitiator,
    interpreter: ResumeInterpreter,
}

impl CheckoutClient {
    pub(crate) fn new(initiator: FlowInitiator, interpreter: ResumeInterpreter) -> Self {
        Self {
            initiator,
            interpreter,
        }
    }

    pub async fn request_billing_agreement(
        &self,
        request: &FlowRequest,
    ) -> GResult<PendingHandoff> {
        self.initiate(FlowKind::BillingAgreement, request).await
    }

    pub async fn request_one_time_payment(
        &self,
        request: &FlowRequest,
    ) -> GResult<PendingHandoff> {
        self.initiate(FlowKind::OneTimePayment, request).await
    }

    pub async fn initiate(&self, kind: FlowKind, request: &FlowRequest) -> GResult<PendingHandoff> {
        self.initiator.initiate(kind, request).await
    }

    /// Consumes the authority's report. Call exactly once per handoff.
    pub async fn resume(&self, result: HandoffResult) -> FlowOutcome {
        self.interpreter.resume(result).await
    }
}
