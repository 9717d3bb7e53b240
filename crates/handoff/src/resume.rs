//! Interprets the single report-back from an external authority.
//!
//! Resume is a function of [`HandoffResult`] alone: it may run after a process
//! restart, so nothing here reads state captured at initiation time.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::Instrument;
use url::Url;

use crate::api::{CancelReason, FlowKind, FlowOutcome};
use crate::context::{self, ContextMap, ResumeFields};
use crate::dispatch::OutcomeDispatcher;
use crate::error::HandoffError;
use crate::host::TelemetrySink;
use crate::payload::TokenizationPayload;
use crate::telemetry::{self, EventNames, FlowSpanAttributes};

pub const DEFAULT_CANCEL_MARKER: &str = "cancel";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandoffStatus {
    Completed,
    UserCanceled,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffResult {
    pub status: HandoffStatus,
    #[serde(default)]
    pub returned_uri: Option<String>,
    #[serde(default)]
    pub context: ContextMap,
}

impl HandoffResult {
    pub fn completed(returned_uri: impl Into<String>, context: ContextMap) -> Self {
        Self {
            status: HandoffStatus::Completed,
            returned_uri: Some(returned_uri.into()),
            context,
        }
    }

    pub fn user_canceled(context: ContextMap) -> Self {
        Self {
            status: HandoffStatus::UserCanceled,
            returned_uri: None,
            context,
        }
    }
}

/// Decides whether a structurally successful return is a semantic cancellation.
pub trait CancelDiscriminator: Send + Sync {
    fn is_cancel(&self, returned_uri: &str) -> bool;
}

/// Matches the terminal path segment of the returned URI against a marker.
#[derive(Clone, Debug)]
pub struct PathSegmentDiscriminator {
    marker: String,
}

impl Default for PathSegmentDiscriminator {
    fn default() -> Self {
        Self::new(DEFAULT_CANCEL_MARKER)
    }
}

impl PathSegmentDiscriminator {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }
}

impl CancelDiscriminator for PathSegmentDiscriminator {
    fn is_cancel(&self, returned_uri: &str) -> bool {
        terminal_segment(returned_uri).is_some_and(|segment| segment == self.marker)
    }
}

fn terminal_segment(uri: &str) -> Option<String> {
    if let Ok(parsed) = Url::parse(uri) {
        if let Some(segment) = parsed
            .path_segments()
            .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
        {
            return Some(segment.to_string());
        }
        // `scheme://cancel` puts the marker in the host position.
        return parsed.host_str().map(str::to_string);
    }
    let path = uri.split(['?', '#']).next().unwrap_or_default();
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

/// Result of the pure decision step, before any backend call.
#[derive(Clone, Debug, PartialEq)]
pub enum Interpretation {
    Canceled {
        reason: CancelReason,
        kind: Option<FlowKind>,
    },
    Tokenize {
        payload: TokenizationPayload,
        kind: Option<FlowKind>,
    },
    Malformed(HandoffError),
}

pub fn interpret(
    result: &HandoffResult,
    discriminator: &dyn CancelDiscriminator,
) -> Interpretation {
    let kind = context::kind_hint(&result.context);
    if result.status == HandoffStatus::UserCanceled {
        return Interpretation::Canceled {
            reason: CancelReason::UserCanceled,
            kind,
        };
    }

    let Some(returned_uri) = result.returned_uri.as_deref() else {
        return Interpretation::Malformed(HandoffError::malformed(
            "completed handoff did not report a returned uri",
        ));
    };

    if discriminator.is_cancel(returned_uri) {
        return Interpretation::Canceled {
            reason: CancelReason::RedirectCanceled,
            kind,
        };
    }

    match ResumeFields::from_map(&result.context) {
        Ok(fields) => Interpretation::Tokenize {
            payload: TokenizationPayload::from_resume(&fields, returned_uri),
            kind: fields.kind,
        },
        Err(err) => Interpretation::Malformed(err),
    }
}

pub struct ResumeInterpreter {
    discriminator: Arc<dyn CancelDiscriminator>,
    dispatcher: OutcomeDispatcher,
    telemetry: Arc<dyn TelemetrySink>,
    events: EventNames,
}

impl ResumeInterpreter {
    pub fn new(
        discriminator: Arc<dyn CancelDiscriminator>,
        dispatcher: OutcomeDispatcher,
        telemetry: Arc<dyn TelemetrySink>,
        events: EventNames,
    ) -> Self {
        Self {
            discriminator,
            dispatcher,
            telemetry,
            events,
        }
    }

    pub async fn resume(&self, result: HandoffResult) -> FlowOutcome {
        let span = telemetry::flow_span("resume");
        telemetry::annotate_span(
            &span,
            &FlowSpanAttributes {
                payment_type: result
                    .context
                    .get(context::PAYMENT_TYPE_KEY)
                    .map(String::as_str),
                handoff_id: None,
                correlation_id: result
                    .context
                    .get(context::CLIENT_METADATA_ID_KEY)
                    .map(String::as_str),
            },
        );
        self.resume_inner(result).instrument(span).await
    }

    async fn resume_inner(&self, result: HandoffResult) -> FlowOutcome {
        match interpret(&result, self.discriminator.as_ref()) {
            Interpretation::Canceled { reason, kind } => {
                telemetry::emit(
                    self.telemetry.as_ref(),
                    &self.events.browser_switch_canceled(kind),
                );
                tracing::info!(%reason, "handoff canceled");
                FlowOutcome::Canceled(reason)
            }
            Interpretation::Malformed(err) => {
                tracing::warn!(error = %err, "handoff result rejected");
                FlowOutcome::Failed(err)
            }
            Interpretation::Tokenize { payload, kind } => {
                self.dispatcher.dispatch(payload, kind).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> ContextMap {
        [
            ("client-metadata-id", "cmid-1"),
            ("merchant-account-id", "ma-1"),
            ("intent", "authorize"),
            ("payment-type", "single-payment"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn terminal_segment_handles_custom_schemes_and_relative_uris() {
        assert_eq!(
            terminal_segment("sample-scheme://onetouch/v1/cancel").as_deref(),
            Some("cancel")
        );
        assert_eq!(
            terminal_segment("sample-scheme://onetouch/v1/success?token=EC-1").as_deref(),
            Some("success")
        );
        assert_eq!(
            terminal_segment(".../success?token=EC-1").as_deref(),
            Some("success")
        );
        assert_eq!(terminal_segment("https://example.com/cancel/").as_deref(), Some("cancel"));
        assert_eq!(terminal_segment("sample-scheme://cancel").as_deref(), Some("cancel"));
    }

    #[test]
    fn cancel_marker_only_matches_terminal_segment() {
        let discriminator = PathSegmentDiscriminator::default();
        assert!(discriminator.is_cancel("sample-scheme://onetouch/v1/cancel"));
        assert!(!discriminator.is_cancel("sample-scheme://onetouch/cancel/success"));
        assert!(!discriminator.is_cancel("sample-scheme://onetouch/v1/success?next=cancel"));
    }

    #[test]
    fn custom_marker_is_honoured() {
        let discriminator = PathSegmentDiscriminator::new("abort");
        assert!(discriminator.is_cancel("https://example.com/checkout/abort"));
        assert!(!discriminator.is_cancel("https://example.com/checkout/cancel"));
    }

    #[test]
    fn user_cancel_wins_over_everything() {
        let result = HandoffResult {
            status: HandoffStatus::UserCanceled,
            returned_uri: Some("sample-scheme://onetouch/v1/success".into()),
            context: ContextMap::new(),
        };
        assert_eq!(
            interpret(&result, &PathSegmentDiscriminator::default()),
            Interpretation::Canceled {
                reason: CancelReason::UserCanceled,
                kind: None
            }
        );
    }

    #[test]
    fn completed_redirect_to_cancel_is_a_cancellation() {
        let result = HandoffResult::completed("sample-scheme://onetouch/v1/cancel", context());
        assert_eq!(
            interpret(&result, &PathSegmentDiscriminator::default()),
            Interpretation::Canceled {
                reason: CancelReason::RedirectCanceled,
                kind: Some(FlowKind::OneTimePayment)
            }
        );
    }

    #[test]
    fn completed_without_uri_is_malformed() {
        let result = HandoffResult {
            status: HandoffStatus::Completed,
            returned_uri: None,
            context: context(),
        };
        assert!(matches!(
            interpret(&result, &PathSegmentDiscriminator::default()),
            Interpretation::Malformed(HandoffError::MalformedResume { .. })
        ));
    }

    #[test]
    fn completed_with_empty_context_is_malformed() {
        let result =
            HandoffResult::completed("sample-scheme://onetouch/v1/success", ContextMap::new());
        assert!(matches!(
            interpret(&result, &PathSegmentDiscriminator::default()),
            Interpretation::Malformed(_)
        ));
    }

    #[test]
    fn success_rebuilds_payload_from_context() {
        let uri = ".../success?token=EC-1";
        let result = HandoffResult::completed(uri, context());
        let Interpretation::Tokenize { payload, kind } =
            interpret(&result, &PathSegmentDiscriminator::default())
        else {
            panic!("expected tokenize");
        };
        assert_eq!(kind, Some(FlowKind::OneTimePayment));
        assert_eq!(payload.merchant_account_id, "ma-1");
        assert_eq!(payload.paypal_account.correlation_id, "cmid-1");
        assert_eq!(payload.paypal_account.response.web_url, uri);
    }

    #[test]
    fn handoff_result_deserializes_without_context() {
        let result: HandoffResult =
            serde_json::from_str(r#"{"status":"user_canceled"}"#).unwrap();
        assert_eq!(result, HandoffResult::user_canceled(ContextMap::new()));
    }
}
