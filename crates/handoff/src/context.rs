//! Correlation metadata carried across the handoff.
//!
//! The context is the only state that survives the suspend point. It travels as a
//! flat string map; decoding reads the known keys and ignores everything else.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::api::FlowKind;
use crate::error::{GResult, HandoffError};
use crate::host::ApprovalResponse;

pub const APPROVAL_URL_KEY: &str = "approval-url";
pub const SUCCESS_URL_KEY: &str = "success-url";
pub const CLIENT_METADATA_ID_KEY: &str = "client-metadata-id";
pub const MERCHANT_ACCOUNT_ID_KEY: &str = "merchant-account-id";
pub const INTENT_KEY: &str = "intent";
pub const PAYMENT_TYPE_KEY: &str = "payment-type";
pub const SOURCE_KEY: &str = "source";

/// `source` value identifying the browser handoff channel.
pub const BROWSER_SOURCE: &str = "paypal-browser";

pub type ContextMap = BTreeMap<String, String>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub approval_url: String,
    pub success_url: String,
    pub client_metadata_id: String,
    pub merchant_account_id: String,
    pub intent: String,
    pub kind: FlowKind,
    pub source: String,
}

impl RequestContext {
    pub fn from_approval(kind: FlowKind, response: &ApprovalResponse) -> Self {
        Self {
            approval_url: response.approval_url.clone(),
            success_url: response.success_url.clone(),
            client_metadata_id: response.client_metadata_id.clone(),
            merchant_account_id: response.merchant_account_id.clone(),
            intent: response.intent.clone(),
            kind,
            source: BROWSER_SOURCE.to_string(),
        }
    }

    pub fn to_map(&self) -> ContextMap {
        let mut map = ContextMap::new();
        map.insert(APPROVAL_URL_KEY.into(), self.approval_url.clone());
        map.insert(SUCCESS_URL_KEY.into(), self.success_url.clone());
        map.insert(CLIENT_METADATA_ID_KEY.into(), self.client_metadata_id.clone());
        map.insert(MERCHANT_ACCOUNT_ID_KEY.into(), self.merchant_account_id.clone());
        map.insert(INTENT_KEY.into(), self.intent.clone());
        map.insert(PAYMENT_TYPE_KEY.into(), self.kind.payment_type().into());
        map.insert(SOURCE_KEY.into(), self.source.clone());
        map
    }

    /// Strict decode: every key written by [`RequestContext::to_map`] must be present.
    pub fn from_map(map: &ContextMap) -> GResult<Self> {
        let kind = decode_kind(map)?.ok_or_else(|| missing(PAYMENT_TYPE_KEY))?;
        Ok(Self {
            approval_url: required(map, APPROVAL_URL_KEY)?,
            success_url: required(map, SUCCESS_URL_KEY)?,
            client_metadata_id: required(map, CLIENT_METADATA_ID_KEY)?,
            merchant_account_id: required(map, MERCHANT_ACCOUNT_ID_KEY)?,
            intent: required(map, INTENT_KEY)?,
            kind,
            source: required(map, SOURCE_KEY)?,
        })
    }

    pub fn to_json(&self) -> GResult<String> {
        serde_json::to_string(&self.to_map()).map_err(|err| HandoffError::Configuration {
            reason: format!("failed to encode request context: {err}"),
        })
    }

    pub fn from_json(raw: &str) -> GResult<Self> {
        let map: ContextMap = serde_json::from_str(raw)
            .map_err(|err| HandoffError::malformed(format!("context is not a string map: {err}")))?;
        Self::from_map(&map)
    }
}

/// The subset of the context a resume needs to rebuild a tokenization payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResumeFields {
    pub client_metadata_id: String,
    pub merchant_account_id: String,
    pub intent: String,
    pub kind: Option<FlowKind>,
}

impl ResumeFields {
    /// A context echoed by a different channel is rejected rather than trusted.
    pub fn from_map(map: &ContextMap) -> GResult<Self> {
        if let Some(source) = map.get(SOURCE_KEY)
            && source != BROWSER_SOURCE
        {
            return Err(HandoffError::malformed(format!(
                "context was issued by source '{source}'"
            )));
        }
        Ok(Self {
            client_metadata_id: required(map, CLIENT_METADATA_ID_KEY)?,
            merchant_account_id: required(map, MERCHANT_ACCOUNT_ID_KEY)?,
            intent: required(map, INTENT_KEY)?,
            kind: decode_kind(map)?,
        })
    }
}

/// Best-effort payment type lookup; tolerates empty or partial contexts.
pub fn kind_hint(map: &ContextMap) -> Option<FlowKind> {
    map.get(PAYMENT_TYPE_KEY)
        .and_then(|value| FlowKind::from_payment_type(value))
}

fn decode_kind(map: &ContextMap) -> GResult<Option<FlowKind>> {
    match map.get(PAYMENT_TYPE_KEY) {
        None => Ok(None),
        Some(value) => FlowKind::from_payment_type(value)
            .map(Some)
            .ok_or_else(|| HandoffError::malformed(format!("unknown payment type '{value}'"))),
    }
}

fn required(map: &ContextMap, key: &str) -> GResult<String> {
    map.get(key).cloned().ok_or_else(|| missing(key))
}

fn missing(key: &str) -> HandoffError {
    HandoffError::malformed(format!("context is missing '{key}'"))
}
