use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use checkout_handoff::api::{CreditFinancing, PaymentMethod};
use checkout_handoff::glue::FnApprovalBackend;
use checkout_handoff::shims::{InMemoryAuthority, RecordingTelemetry, StaticCapabilities};
use checkout_handoff::{
    ApprovalResponse, Authorization, AuthorizationLoader, CancelReason, CheckoutClient,
    ClientBuilder, ClientSettings, ContextMap, ErrorKind, FlowOutcome, FlowRequest, GResult,
    HandoffError, HandoffResult, HostBundle, PaymentCredential, TokenizationPayload, Tokenizer,
};
use parking_lot::Mutex;
use serde_json::json;

const SCHEME: &str = "sample-scheme";

#[derive(Default)]
struct MockTokenizer {
    payloads: Mutex<Vec<TokenizationPayload>>,
    with_financing: bool,
    fail: bool,
}

impl MockTokenizer {
    fn call_count(&self) -> usize {
        self.payloads.lock().len()
    }
}

#[async_trait]
impl Tokenizer for MockTokenizer {
    async fn tokenize(
        &self,
        _authorization: &Authorization,
        payload: &TokenizationPayload,
    ) -> GResult<PaymentCredential> {
        self.payloads.lock().push(payload.clone());
        if self.fail {
            return Err(HandoffError::Backend {
                reason: "503 service unavailable".into(),
            });
        }
        let credential = PaymentCredential::new("fake-nonce");
        if self.with_financing {
            return Ok(credential.with_credit_financing(CreditFinancing {
                card_amount_immutable: true,
                payer_acceptance: true,
                term: 18,
                monthly_payment: None,
                total_cost: None,
                total_interest: None,
            }));
        }
        Ok(credential)
    }
}

struct Harness {
    client: CheckoutClient,
    tokenizer: Arc<MockTokenizer>,
    authority: Arc<InMemoryAuthority>,
    telemetry: Arc<RecordingTelemetry>,
}

fn harness(tokenizer: MockTokenizer) -> Harness {
    let tokenizer = Arc::new(tokenizer);
    let authority = Arc::new(InMemoryAuthority::new());
    let telemetry = Arc::new(RecordingTelemetry::new());
    let approval = FnApprovalBackend::new(|_auth, request| async move {
        Ok::<_, HandoffError>(ApprovalResponse {
            approval_url: "https://checkout.paypal.com/one-touch-login-sandbox".into(),
            success_url: request.return_url,
            client_metadata_id: request.correlation_id,
            merchant_account_id: "sample-merchant-account-id".into(),
            intent: "authorize".into(),
        })
    });
    let host = HostBundle::new(
        Arc::new(approval),
        tokenizer.clone(),
        Arc::new(
            StaticCapabilities::new()
                .enable(PaymentMethod::PayPal)
                .register_scheme(SCHEME),
        ),
        authority.clone(),
        telemetry.clone(),
    );
    let client = ClientBuilder::new()
        .with_host(host)
        .with_settings(ClientSettings::new(SCHEME))
        .with_authorization(AuthorizationLoader::with_authorization(
            Authorization::parse("sandbox_tokenization_key").unwrap(),
        ))
        .build()
        .unwrap();
    Harness {
        client,
        tokenizer,
        authority,
        telemetry,
    }
}

fn sample_context() -> ContextMap {
    BTreeMap::from([
        ("client-metadata-id".to_string(), "sample-client-metadata-id".to_string()),
        ("merchant-account-id".to_string(), "sample-merchant-account-id".to_string()),
        ("intent".to_string(), "authorize".to_string()),
        ("payment-type".to_string(), "single-payment".to_string()),
    ])
}

#[tokio::test]
async fn success_builds_the_documented_payload() {
    let h = harness(MockTokenizer::default());
    let outcome = h
        .client
        .resume(HandoffResult::completed(
            "sample-scheme://onetouch/v1/success",
            sample_context(),
        ))
        .await;

    assert_eq!(outcome.credential().map(|c| c.nonce.as_str()), Some("fake-nonce"));
    let payload = h.tokenizer.payloads.lock()[0].clone();
    assert_eq!(
        payload.to_value(),
        json!({
            "merchant_account_id": "sample-merchant-account-id",
            "paypalAccount": {
                "correlationId": "sample-client-metadata-id",
                "client": {},
                "response": {"webURL": "sample-scheme://onetouch/v1/success"},
                "intent": "authorize",
                "response_type": "web"
            }
        })
    );
    assert_eq!(
        h.telemetry.events(),
        vec!["paypal.single-payment.browser-switch.succeeded".to_string()]
    );
}

#[tokio::test]
async fn user_cancel_never_tokenizes() {
    let h = harness(MockTokenizer::default());
    let outcome = h
        .client
        .resume(HandoffResult::user_canceled(sample_context()))
        .await;
    assert_eq!(outcome, FlowOutcome::Canceled(CancelReason::UserCanceled));
    assert_eq!(h.tokenizer.call_count(), 0);
    assert!(h.telemetry.contains("paypal.single-payment.browser-switch.canceled"));
}

#[tokio::test]
async fn cancel_with_empty_context_uses_generic_event() {
    let h = harness(MockTokenizer::default());
    let outcome = h
        .client
        .resume(HandoffResult::user_canceled(ContextMap::new()))
        .await;
    assert!(outcome.is_canceled());
    assert_eq!(
        h.telemetry.events(),
        vec!["paypal.browser-switch.canceled".to_string()]
    );
}

#[tokio::test]
async fn redirect_to_cancel_path_is_a_cancellation() {
    let h = harness(MockTokenizer::default());
    let outcome = h
        .client
        .resume(HandoffResult::completed(
            "sample-scheme://onetouch/v1/cancel",
            sample_context(),
        ))
        .await;
    assert_eq!(outcome, FlowOutcome::Canceled(CancelReason::RedirectCanceled));
    assert_eq!(outcome_reason(&outcome), "user cancelled during redirect");
    assert_eq!(h.tokenizer.call_count(), 0);
}

fn outcome_reason(outcome: &FlowOutcome) -> String {
    match outcome {
        FlowOutcome::Canceled(reason) => reason.to_string(),
        other => panic!("expected cancel, got {other:?}"),
    }
}

#[tokio::test]
async fn completed_with_missing_context_is_malformed() {
    let h = harness(MockTokenizer::default());
    let outcome = h
        .client
        .resume(HandoffResult::completed(
            "sample-scheme://onetouch/v1/success",
            ContextMap::new(),
        ))
        .await;
    assert_eq!(outcome.error_kind(), Some(ErrorKind::MalformedResume));
    assert_eq!(h.tokenizer.call_count(), 0);
}

#[tokio::test]
async fn foreign_source_is_rejected() {
    let h = harness(MockTokenizer::default());
    let mut context = sample_context();
    context.insert("source".into(), "venmo-app".into());
    let outcome = h
        .client
        .resume(HandoffResult::completed(
            "sample-scheme://onetouch/v1/success",
            context,
        ))
        .await;
    assert_eq!(outcome.error_kind(), Some(ErrorKind::MalformedResume));
}

#[tokio::test]
async fn accepted_credit_is_reported_once() {
    let h = harness(MockTokenizer {
        with_financing: true,
        ..MockTokenizer::default()
    });
    let outcome = h
        .client
        .resume(HandoffResult::completed(
            "sample-scheme://onetouch/v1/success",
            sample_context(),
        ))
        .await;
    assert!(outcome.credential().is_some());
    assert_eq!(h.telemetry.count("paypal.credit.accepted"), 1);
    assert_eq!(
        h.telemetry
            .count("paypal.single-payment.browser-switch.succeeded"),
        1
    );
}

#[tokio::test]
async fn tokenization_failure_is_reported_not_retried() {
    let h = harness(MockTokenizer {
        fail: true,
        ..MockTokenizer::default()
    });
    let outcome = h
        .client
        .resume(HandoffResult::completed(
            "sample-scheme://onetouch/v1/success",
            sample_context(),
        ))
        .await;
    assert_eq!(outcome.error_kind(), Some(ErrorKind::TokenizationError));
    assert_eq!(h.tokenizer.call_count(), 1);
    assert!(
        !h.telemetry
            .contains("paypal.single-payment.browser-switch.succeeded")
    );
}

#[tokio::test]
async fn initiate_then_resume_round_trip() {
    let h = harness(MockTokenizer::default());
    let pending = h
        .client
        .request_billing_agreement(&FlowRequest::new())
        .await
        .unwrap();

    let result = h
        .authority
        .complete(
            &pending.context.client_metadata_id,
            "sample-scheme://onetouch/v1/success?token=BA-1",
        )
        .expect("authority holds the pending handoff");
    let outcome = h.client.resume(result).await;

    assert!(outcome.credential().is_some());
    let payload = h.tokenizer.payloads.lock()[0].clone();
    assert_eq!(
        payload.paypal_account.correlation_id,
        pending.context.client_metadata_id
    );
    assert!(
        h.telemetry
            .contains("paypal.billing-agreement.browser-switch.succeeded")
    );
    assert_eq!(h.authority.pending_count(), 0);
}
