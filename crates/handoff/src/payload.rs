use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::context::ResumeFields;

pub const WEB_RESPONSE_TYPE: &str = "web";

/// Body sent to the tokenization backend after a successful resume.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenizationPayload {
    pub merchant_account_id: String,
    #[serde(rename = "paypalAccount")]
    pub paypal_account: AccountPayload,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccountPayload {
    #[serde(rename = "correlationId")]
    pub correlation_id: String,
    pub client: Map<String, Value>,
    pub response: WebResponse,
    pub intent: String,
    pub response_type: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebResponse {
    #[serde(rename = "webURL")]
    pub web_url: String,
}

impl TokenizationPayload {
    pub fn from_resume(fields: &ResumeFields, returned_uri: &str) -> Self {
        Self {
            merchant_account_id: fields.merchant_account_id.clone(),
            paypal_account: AccountPayload {
                correlation_id: fields.client_metadata_id.clone(),
                client: Map::new(),
                response: WebResponse {
                    web_url: returned_uri.to_string(),
                },
                intent: fields.intent.clone(),
                response_type: WEB_RESPONSE_TYPE.to_string(),
            },
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
