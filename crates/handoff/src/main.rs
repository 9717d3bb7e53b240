use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use checkout_handoff::api::{CreditFinancing, MoneyAmount};
use checkout_handoff::glue::{
    FnApprovalBackend, FnAuthorizationProvider, FnTelemetrySink, FnTokenizer,
};
use checkout_handoff::preflight;
use checkout_handoff::shims::{InMemoryAuthority, StaticCapabilities};
use checkout_handoff::{
    ApprovalResponse, AuthorizationLoader, AuthorizationProvider, CheckoutClient, ClientBuilder,
    FlowKind, FlowOutcome, FlowRequest, HandoffConfig, HandoffError, HandoffResult, HostBundle,
    PaymentCredential, PendingHandoff,
};

#[derive(Debug, Parser)]
#[command(name = "checkout-handoff")]
struct Cli {
    /// Handoff configuration yaml
    #[arg(long)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run one flow end to end against in-memory collaborators
    Simulate {
        #[arg(long, value_enum)]
        kind: KindArg,

        #[arg(long)]
        amount: Option<String>,

        #[arg(long)]
        offer_credit: bool,

        #[arg(long, value_enum, default_value = "success")]
        finish: FinishArg,

        /// Attach credit financing terms to the tokenized credential
        #[arg(long)]
        credit_financing: bool,

        /// Where the pending handoff is persisted between phases
        #[arg(long)]
        state: Option<PathBuf>,
    },
    /// Run preflight for both flow kinds against the configured capabilities
    Check,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    BillingAgreement,
    SinglePayment,
}

impl From<KindArg> for FlowKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::BillingAgreement => FlowKind::BillingAgreement,
            KindArg::SinglePayment => FlowKind::OneTimePayment,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FinishArg {
    Success,
    RedirectCancel,
    Dismiss,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run().await {
        tracing::error!(error = %err, "checkout-handoff failed");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config =
        HandoffConfig::load_from_path(&cli.config).context("failed to load handoff config")?;
    tracing::info!(
        scheme = %config.return_url_scheme,
        environment = %config.environment,
        enabled = ?config.enabled_methods,
        "loaded handoff configuration"
    );

    match cli.command {
        Command::Check => check(&config),
        Command::Simulate {
            kind,
            amount,
            offer_credit,
            finish,
            credit_financing,
            state,
        } => {
            let mut request = FlowRequest::new().offer_credit(offer_credit);
            if let Some(amount) = amount {
                request = request.amount(amount).currency_code("USD");
            }
            let state = state.unwrap_or_else(|| {
                std::env::temp_dir().join(format!("checkout-handoff-{}.json", Uuid::new_v4()))
            });
            simulate(
                &config,
                kind.into(),
                &request,
                finish,
                credit_financing,
                &state,
            )
            .await
        }
    }
}

fn check(config: &HandoffConfig) -> anyhow::Result<()> {
    let capabilities = config.capabilities();
    let mut failed = false;
    for kind in [FlowKind::BillingAgreement, FlowKind::OneTimePayment] {
        match preflight::check_with(&capabilities, kind, &config.return_url_scheme) {
            Ok(()) => println!("{kind}: ok"),
            Err(err) => {
                failed = true;
                println!("{kind}: {err}");
            }
        }
    }
    if failed {
        bail!("preflight failed");
    }
    Ok(())
}

async fn simulate(
    config: &HandoffConfig,
    kind: FlowKind,
    request: &FlowRequest,
    finish: FinishArg,
    credit_financing: bool,
    state: &Path,
) -> anyhow::Result<()> {
    let authority = Arc::new(InMemoryAuthority::new());
    let capabilities = Arc::new(config.capabilities());

    let pending = {
        let client = build_client(config, authority.clone(), capabilities.clone(), false)?;
        client.initiate(kind, request).await?
    };
    let encoded = serde_json::to_string_pretty(&pending)?;
    fs::write(state, encoded)
        .with_context(|| format!("failed to persist pending handoff {:?}", state))?;
    tracing::info!(handoff_id = %pending.handoff_id, state = %state.display(), "handoff suspended");

    let raw = fs::read_to_string(state)
        .with_context(|| format!("failed to read pending handoff {:?}", state))?;
    let pending: PendingHandoff =
        serde_json::from_str(&raw).context("pending handoff is not valid json")?;
    let cmid = pending.context.client_metadata_id.clone();
    let result = finish_handoff(&authority, config, &cmid, finish)
        .with_context(|| format!("no pending handoff for {cmid}"))?;

    let client = build_client(config, authority, capabilities, credit_financing)?;
    let outcome = client.resume(result).await;
    report(&outcome);
    if let Err(err) = fs::remove_file(state) {
        tracing::warn!(error = %err, "failed to remove pending handoff file");
    }
    match outcome {
        FlowOutcome::Failed(err) => Err(err.into()),
        _ => Ok(()),
    }
}

fn finish_handoff(
    authority: &InMemoryAuthority,
    config: &HandoffConfig,
    cmid: &str,
    finish: FinishArg,
) -> Option<HandoffResult> {
    match finish {
        FinishArg::Success => authority.complete(
            cmid,
            &format!(
                "{}://onetouch/v1/success?token=EC-{}",
                config.return_url_scheme, cmid
            ),
        ),
        FinishArg::RedirectCancel => authority.complete(
            cmid,
            &format!(
                "{}://onetouch/v1/{}",
                config.return_url_scheme, config.cancel_marker
            ),
        ),
        FinishArg::Dismiss => authority.dismiss(cmid),
    }
}

fn build_client(
    config: &HandoffConfig,
    authority: Arc<InMemoryAuthority>,
    capabilities: Arc<StaticCapabilities>,
    credit_financing: bool,
) -> anyhow::Result<CheckoutClient> {
    let approval = FnApprovalBackend::new(|_auth, request| async move {
        let token = Uuid::new_v4().simple().to_string();
        Ok::<_, HandoffError>(ApprovalResponse {
            approval_url: format!("https://www.sandbox.paypal.com/checkoutnow?token=EC-{token}"),
            success_url: request.return_url,
            client_metadata_id: request.correlation_id,
            merchant_account_id: request
                .request
                .merchant_account_id
                .unwrap_or_else(|| "sandbox-merchant".to_string()),
            intent: request.request.intent.unwrap_or_else(|| "authorize".to_string()),
        })
    });
    let tokenizer = FnTokenizer::new(move |_auth, payload| async move {
        let mut credential = PaymentCredential::new(Uuid::new_v4().to_string());
        credential.description = Some("PayPal".to_string());
        credential.payer_id = Some(payload.paypal_account.correlation_id);
        if credit_financing {
            credential = credential.with_credit_financing(CreditFinancing {
                card_amount_immutable: false,
                payer_acceptance: true,
                term: 12,
                monthly_payment: Some(MoneyAmount {
                    currency: "USD".into(),
                    value: "8.33".into(),
                }),
                total_cost: None,
                total_interest: None,
            });
        }
        Ok::<_, HandoffError>(credential)
    });
    let host = HostBundle::new(
        Arc::new(approval),
        Arc::new(tokenizer),
        capabilities,
        authority,
        Arc::new(FnTelemetrySink::logging()),
    );
    let sandbox_tokens: Arc<dyn AuthorizationProvider> =
        Arc::new(FnAuthorizationProvider::new(|| async {
            Ok::<_, HandoffError>(format!("sandbox-client-token-{}", Uuid::new_v4().simple()))
        }));
    let authorization =
        AuthorizationLoader::new(config.authorization.as_deref(), Some(sandbox_tokens))?;
    let client = ClientBuilder::new()
        .with_host(host)
        .with_settings(config.client_settings())
        .with_authorization(authorization)
        .build()?;
    Ok(client)
}

fn report(outcome: &FlowOutcome) {
    let status = outcome.status();
    match outcome {
        FlowOutcome::Tokenized(credential) => {
            println!("{status}: nonce={}", credential.nonce);
            if credential.credit_financing.is_some() {
                println!("credit financing accepted");
            }
        }
        FlowOutcome::Canceled(reason) => println!("{status}: {reason}"),
        FlowOutcome::Failed(err) => println!("{status}: {err}"),
    }
}
