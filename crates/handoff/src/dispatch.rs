use std::sync::Arc;

use crate::api::{FlowKind, FlowOutcome};
use crate::authorization::AuthorizationLoader;
use crate::host::{TelemetrySink, Tokenizer};
use crate::payload::TokenizationPayload;
use crate::telemetry::{self, EventNames};

/// Exchanges a rebuilt payload for a credential and relays the result.
#[derive(Clone)]
pub struct OutcomeDispatcher {
    tokenizer: Arc<dyn Tokenizer>,
    telemetry: Arc<dyn TelemetrySink>,
    authorization: Arc<AuthorizationLoader>,
    events: EventNames,
}

impl OutcomeDispatcher {
    pub fn new(
        tokenizer: Arc<dyn Tokenizer>,
        telemetry: Arc<dyn TelemetrySink>,
        authorization: Arc<AuthorizationLoader>,
        events: EventNames,
    ) -> Self {
        Self {
            tokenizer,
            telemetry,
            authorization,
            events,
        }
    }

    /// `kind` only selects the analytics event name; the payload itself does not carry it.
    pub async fn dispatch(
        &self,
        payload: TokenizationPayload,
        kind: Option<FlowKind>,
    ) -> FlowOutcome {
        let authorization = match self.authorization.load().await {
            Ok(authorization) => authorization,
            Err(err) => {
                tracing::warn!(error = %err, "authorization unavailable for tokenization");
                return FlowOutcome::Failed(err);
            }
        };

        let credential = match self.tokenizer.tokenize(&authorization, &payload).await {
            Ok(credential) => credential,
            Err(err) => {
                let err = err.into_tokenization();
                tracing::warn!(
                    correlation_id = %payload.paypal_account.correlation_id,
                    error = %err,
                    "tokenization failed"
                );
                return FlowOutcome::Failed(err);
            }
        };

        if credential.credit_financing.is_some() {
            telemetry::emit(self.telemetry.as_ref(), &self.events.credit_accepted());
        }
        telemetry::emit(
            self.telemetry.as_ref(),
            &self.events.browser_switch_succeeded(kind),
        );
        tracing::info!(
            correlation_id = %payload.paypal_account.correlation_id,
            "payment credential tokenized"
        );
        FlowOutcome::Tokenized(credential)
    }
}
