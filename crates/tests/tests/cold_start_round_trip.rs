use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use checkout_handoff::shims::{InMemoryAuthority, RecordingTelemetry};
use checkout_handoff::{
    ApprovalBackend, ApprovalRequest, ApprovalResponse, Authorization, CancelReason,
    CheckoutClient, ClientBuilder, FlowKind, FlowOutcome, FlowRequest, GResult, HandoffConfig,
    HandoffResult, HostBundle, PaymentCredential, PendingHandoff, TokenizationPayload, Tokenizer,
};
use parking_lot::Mutex;

const CONFIG: &str = r#"
return_url_scheme: com.example.shop.payments
environment: sandbox
authorization: sandbox_abcd1234_merchant
analytics_prefix: shop
"#;

struct StubApproval;

#[async_trait]
impl ApprovalBackend for StubApproval {
    async fn send(
        &self,
        _authorization: &Authorization,
        request: &ApprovalRequest,
    ) -> GResult<ApprovalResponse> {
        Ok(ApprovalResponse {
            approval_url: format!(
                "https://www.sandbox.paypal.com/checkoutnow?token=EC-{}",
                request.correlation_id
            ),
            success_url: request.return_url.clone(),
            client_metadata_id: request.correlation_id.clone(),
            merchant_account_id: "shop-merchant".into(),
            intent: "sale".into(),
        })
    }
}

#[derive(Default)]
struct RecordingTokenizer {
    payloads: Mutex<Vec<TokenizationPayload>>,
}

#[async_trait]
impl Tokenizer for RecordingTokenizer {
    async fn tokenize(
        &self,
        authorization: &Authorization,
        payload: &TokenizationPayload,
    ) -> GResult<PaymentCredential> {
        assert!(authorization.is_tokenization_key());
        self.payloads.lock().push(payload.clone());
        Ok(PaymentCredential::new(format!(
            "nonce-{}",
            payload.paypal_account.correlation_id
        )))
    }
}

fn write_config(dir: &Path) -> Result<HandoffConfig> {
    let path = dir.join("handoff.yaml");
    fs::write(&path, CONFIG)?;
    HandoffConfig::load_from_path(&path)
}

/// A fresh process: nothing but config and the external authority survives.
fn boot(
    config: &HandoffConfig,
    authority: Arc<InMemoryAuthority>,
    tokenizer: Arc<RecordingTokenizer>,
    telemetry: Arc<RecordingTelemetry>,
) -> Result<CheckoutClient> {
    let host = HostBundle::new(
        Arc::new(StubApproval),
        tokenizer,
        Arc::new(config.capabilities()),
        authority,
        telemetry,
    );
    let client = ClientBuilder::new()
        .with_host(host)
        .with_settings(config.client_settings())
        .with_authorization(config.authorization_loader()?)
        .build()?;
    Ok(client)
}

#[tokio::test]
async fn resumes_after_restart_from_persisted_state() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = write_config(dir.path())?;
    let authority = Arc::new(InMemoryAuthority::new());
    let tokenizer = Arc::new(RecordingTokenizer::default());
    let telemetry = Arc::new(RecordingTelemetry::new());

    let state_path = dir.path().join("pending.json");
    {
        let client = boot(&config, authority.clone(), tokenizer.clone(), telemetry.clone())?;
        let pending = client
            .request_one_time_payment(&FlowRequest::new().amount("12.50").currency_code("EUR"))
            .await?;
        fs::write(&state_path, serde_json::to_string(&pending)?)?;
    }

    let pending: PendingHandoff = serde_json::from_str(&fs::read_to_string(&state_path)?)?;
    assert_eq!(pending.kind, FlowKind::OneTimePayment);

    let result = authority
        .complete(
            &pending.context.client_metadata_id,
            "com.example.shop.payments://onetouch/v1/success?token=EC-1",
        )
        .expect("authority reports back");
    let result_path = dir.path().join("result.json");
    fs::write(&result_path, serde_json::to_string(&result)?)?;
    let result: HandoffResult = serde_json::from_str(&fs::read_to_string(&result_path)?)?;

    let client = boot(&config, authority.clone(), tokenizer.clone(), telemetry.clone())?;
    let outcome = client.resume(result).await;

    let expected_nonce = format!("nonce-{}", pending.context.client_metadata_id);
    assert_eq!(
        outcome.credential().map(|c| c.nonce.clone()),
        Some(expected_nonce)
    );
    let payload = tokenizer.payloads.lock()[0].clone();
    assert_eq!(payload.merchant_account_id, "shop-merchant");
    assert_eq!(payload.paypal_account.intent, "sale");
    assert_eq!(
        telemetry.events(),
        vec![
            "shop.single-payment.selected".to_string(),
            "shop.single-payment.browser-switch.started".to_string(),
            "shop.single-payment.browser-switch.succeeded".to_string(),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn dismissed_before_persisting_context_is_canceled() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = write_config(dir.path())?;
    let authority = Arc::new(InMemoryAuthority::new());
    let tokenizer = Arc::new(RecordingTokenizer::default());
    let telemetry = Arc::new(RecordingTelemetry::new());

    let client = boot(&config, authority.clone(), tokenizer.clone(), telemetry.clone())?;
    let pending = client
        .request_billing_agreement(&FlowRequest::new())
        .await?;
    drop(client);

    let result = authority
        .dismiss(&pending.context.client_metadata_id)
        .expect("authority reports back");
    let client = boot(&config, authority.clone(), tokenizer.clone(), telemetry.clone())?;
    let outcome = client.resume(result).await;

    assert_eq!(outcome, FlowOutcome::Canceled(CancelReason::UserCanceled));
    assert!(tokenizer.payloads.lock().is_empty());
    assert!(telemetry.contains("shop.browser-switch.canceled"));
    assert!(
        authority
            .complete(&pending.context.client_metadata_id, "ignored")
            .is_none()
    );
    Ok(())
}
