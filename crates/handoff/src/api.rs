use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ErrorKind, HandoffError};
use crate::line_item::LineItem;

/// The two authorization flows a checkout can hand off to the browser.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowKind {
    /// Amount-less, produces a reusable payment method.
    #[serde(rename = "billing-agreement")]
    BillingAgreement,
    /// Amount-bound, produces a single-use authorization.
    #[serde(rename = "single-payment")]
    OneTimePayment,
}

impl FlowKind {
    /// Wire value stored under `payment-type` in the request context.
    pub fn payment_type(self) -> &'static str {
        match self {
            FlowKind::BillingAgreement => "billing-agreement",
            FlowKind::OneTimePayment => "single-payment",
        }
    }

    pub fn from_payment_type(value: &str) -> Option<Self> {
        match value {
            "billing-agreement" => Some(FlowKind::BillingAgreement),
            "single-payment" => Some(FlowKind::OneTimePayment),
            _ => None,
        }
    }

    pub fn method(self) -> PaymentMethod {
        PaymentMethod::PayPal
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.payment_type())
    }
}

/// Payment methods whose availability is governed by remote configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    #[serde(rename = "paypal")]
    PayPal,
    ThreeDSecure,
}

impl PaymentMethod {
    pub fn docs_url(self) -> &'static str {
        match self {
            PaymentMethod::PayPal => {
                "https://developers.braintreepayments.com/guides/paypal/overview/android/"
            }
            PaymentMethod::ThreeDSecure => {
                "https://developers.braintreepayments.com/guides/3d-secure/overview"
            }
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::PayPal => f.write_str("PayPal"),
            PaymentMethod::ThreeDSecure => f.write_str("3D Secure"),
        }
    }
}

/// Caller input for a single initiation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowRequest {
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub offer_credit: bool,
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub merchant_account_id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub options: Map<String, Value>,
}

impl FlowRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    pub fn currency_code(mut self, currency: impl Into<String>) -> Self {
        self.currency_code = Some(currency.into());
        self
    }

    pub fn offer_credit(mut self, offer: bool) -> Self {
        self.offer_credit = offer;
        self
    }

    pub fn intent(mut self, intent: impl Into<String>) -> Self {
        self.intent = Some(intent.into());
        self
    }

    pub fn merchant_account_id(mut self, id: impl Into<String>) -> Self {
        self.merchant_account_id = Some(id.into());
        self
    }

    /// Brand name shown on the approval page in place of the merchant's account name.
    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn line_item(mut self, item: LineItem) -> Self {
        self.line_items.push(item);
        self
    }

    pub fn option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoneyAmount {
    pub currency: String,
    pub value: String,
}

/// Financing terms attached to a credential when the payer accepted a credit offer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditFinancing {
    #[serde(default)]
    pub card_amount_immutable: bool,
    #[serde(default)]
    pub payer_acceptance: bool,
    #[serde(default)]
    pub term: u32,
    #[serde(default)]
    pub monthly_payment: Option<MoneyAmount>,
    #[serde(default)]
    pub total_cost: Option<MoneyAmount>,
    #[serde(default)]
    pub total_interest: Option<MoneyAmount>,
}

/// Permanent payment-method handle returned by the tokenization backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCredential {
    pub nonce: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub payer_id: Option<String>,
    #[serde(default)]
    pub credit_financing: Option<CreditFinancing>,
}

impl PaymentCredential {
    pub fn new(nonce: impl Into<String>) -> Self {
        Self {
            nonce: nonce.into(),
            description: None,
            is_default: false,
            email: None,
            payer_id: None,
            credit_financing: None,
        }
    }

    pub fn with_credit_financing(mut self, financing: CreditFinancing) -> Self {
        self.credit_financing = Some(financing);
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CancelReason {
    /// The platform reported that the user dismissed the authority.
    UserCanceled,
    /// The authority redirected back to its cancel path.
    RedirectCanceled,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::UserCanceled => f.write_str("user canceled PayPal"),
            CancelReason::RedirectCanceled => f.write_str("user cancelled during redirect"),
        }
    }
}

/// Terminal result of one initiation → resume cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlowOutcome {
    Tokenized(PaymentCredential),
    Canceled(CancelReason),
    Failed(HandoffError),
}

impl FlowOutcome {
    pub fn is_canceled(&self) -> bool {
        matches!(self, FlowOutcome::Canceled(_))
    }

    pub fn credential(&self) -> Option<&PaymentCredential> {
        match self {
            FlowOutcome::Tokenized(credential) => Some(credential),
            _ => None,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            FlowOutcome::Failed(err) => Some(err.kind()),
            _ => None,
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            FlowOutcome::Tokenized(_) => "tokenized",
            FlowOutcome::Canceled(_) => "canceled",
            FlowOutcome::Failed(_) => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_type_round_trips_through_wire_value() {
        for kind in [FlowKind::BillingAgreement, FlowKind::OneTimePayment] {
            assert_eq!(FlowKind::from_payment_type(kind.payment_type()), Some(kind));
        }
        assert_eq!(FlowKind::from_payment_type("vault"), None);
    }

    #[test]
    fn flow_kind_serializes_as_payment_type() {
        let value = serde_json::to_value(FlowKind::OneTimePayment).unwrap();
        assert_eq!(value, serde_json::json!("single-payment"));
    }

    #[test]
    fn cancel_reasons_have_distinct_messages() {
        assert_ne!(
            CancelReason::UserCanceled.to_string(),
            CancelReason::RedirectCanceled.to_string()
        );
        assert_eq!(
            CancelReason::RedirectCanceled.to_string(),
            "user cancelled during redirect"
        );
    }

    #[test]
    fn outcome_status_names_the_terminal_state() {
        assert_eq!(
            FlowOutcome::Canceled(CancelReason::UserCanceled).status(),
            "canceled"
        );
        assert_eq!(
            FlowOutcome::Failed(HandoffError::malformed("no uri")).status(),
            "failed"
        );
    }
}
