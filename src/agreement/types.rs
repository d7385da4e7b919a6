//! Agreement drafts, generated transactions and stored records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Property fields copied into a draft when it is opened.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySnapshot {
    /// The property's house ID, or its document key when it has none.
    pub property_id: String,
    pub title: String,
    pub price: f64,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub image: String,
    pub description: String,
}

/// Server-held purchase agreement being filled in by both parties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgreementDraft {
    pub id: String,
    pub property_key: String,
    pub property: PropertySnapshot,
    pub seller_name: String,
    pub seller_email: String,
    pub seller_address: String,
    pub buyer_name: String,
    pub buyer_email: String,
    pub buyer_address: String,
    /// `YYYY-MM-DD`, the day the draft was opened.
    pub agreement_date: String,
    pub closing_date: String,
    pub agreement_price: String,
    pub down_payment: String,
    pub financing_details: String,
    pub special_conditions: String,
    pub seller_signed: bool,
    pub buyer_signed: bool,
    pub transaction: Option<GeneratedTransaction>,
    pub created_at: DateTime<Utc>,
}

/// Partial update of a draft. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftPatch {
    pub seller_name: Option<String>,
    pub seller_email: Option<String>,
    pub seller_address: Option<String>,
    pub buyer_name: Option<String>,
    pub buyer_email: Option<String>,
    pub buyer_address: Option<String>,
    pub closing_date: Option<String>,
    pub agreement_price: Option<String>,
    pub down_payment: Option<String>,
    pub financing_details: Option<String>,
    pub special_conditions: Option<String>,
}

impl DraftPatch {
    pub fn touches_seller(&self) -> bool {
        self.seller_name.is_some() || self.seller_email.is_some() || self.seller_address.is_some()
    }

    pub fn touches_buyer(&self) -> bool {
        self.buyer_name.is_some() || self.buyer_email.is_some() || self.buyer_address.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Party {
    Seller,
    Buyer,
}

/// Result of anchoring an agreement, on-chain or simulated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedTransaction {
    pub transaction_id: String,
    pub agreement_id: String,
    /// RFC 3339 timestamp of the block, or of generation when simulated.
    pub timestamp: String,
    pub status: String,
    pub block_number: u64,
    pub network: String,
    pub simulated: bool,
}

/// Document stored in the `agreements` collection, keyed by agreement id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgreementRecord {
    pub property_id: String,
    pub transaction_hash: String,
    pub agreement_id: String,
    pub seller_name: String,
    pub seller_email: String,
    pub buyer_name: String,
    pub buyer_email: String,
    pub price: f64,
    pub down_payment: f64,
    pub closing_date: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub simulated: bool,
    pub network: String,
}

/// Outcome of re-checking a transaction on chain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmations: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_used: Option<String>,
}

impl VerificationResult {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            verified: false,
            reason: Some(reason.into()),
            ..Self::default()
        }
    }
}

/// Parse a user-entered amount. Blank or non-finite input yields `None`.
pub fn parse_amount(input: &str) -> Option<f64> {
    let value: f64 = input.trim().parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// Render an amount without a trailing `.0` for whole numbers.
pub fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
