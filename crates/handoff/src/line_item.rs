use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LineItemKind {
    Credit,
    Debit,
}

/// A single line shown to the payer on the approval page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(rename = "type")]
    pub kind: LineItemKind,
    pub name: String,
    pub quantity: u32,
    pub unit_amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_tax_amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl LineItem {
    pub fn new(
        kind: LineItemKind,
        name: impl Into<String>,
        quantity: u32,
        unit_amount: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            quantity,
            unit_amount: unit_amount.into(),
            description: None,
            product_code: None,
            unit_tax_amount: None,
            url: None,
        }
    }

    /// Maximum 127 characters on the approval page; longer values are truncated by the backend.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn product_code(mut self, code: impl Into<String>) -> Self {
        self.product_code = Some(code.into());
        self
    }

    pub fn unit_tax_amount(mut self, amount: impl Into<String>) -> Self {
        self.unit_tax_amount = Some(amount.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}
