//! Agreement drafts and their anchoring.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use dashmap::DashMap;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::agreement::document::render_document;
use crate::agreement::hashing::{address_from_email, agreement_hash, price_to_wei};
use crate::agreement::ledger::{AgreementLedger, LedgerSubmission, TransactionLookup};
use crate::agreement::simulate::{is_simulated_id, simulate_transaction};
use crate::agreement::types::{
    format_amount, parse_amount, AgreementDraft, AgreementRecord, DraftPatch,
    GeneratedTransaction, Party, PropertySnapshot, VerificationResult,
};
use crate::blockchain::BlockchainError;
use crate::listings::find_property;
use crate::observability::metrics;
use crate::store::{
    collections, field_f64, field_str, to_document, DocumentStore, ExpiringMap, StoreError,
    StoredDocument,
};

pub const MSG_MISSING_PROPERTY: &str = "Property ID is missing. Please select a property first.";
pub const MSG_SELLER_INCOMPLETE: &str = "Please fill in all seller information before signing.";
pub const MSG_BUYER_INCOMPLETE: &str = "Please fill in all buyer information before signing.";
pub const MSG_REQUIRED_FIELDS: &str = "Please fill in all required fields.";
pub const MSG_NOT_SIGNED: &str = "Both parties must sign before generating the agreement.";
pub const MSG_SELLER_LOCKED: &str = "Seller information cannot be changed after signing.";
pub const MSG_BUYER_LOCKED: &str = "Buyer information cannot be changed after signing.";
pub const MSG_GENERATED: &str = "The agreement has already been generated.";
pub const MSG_NOT_GENERATED: &str = "The agreement has not been generated yet.";

#[derive(Debug, Error)]
pub enum AgreementError {
    /// Validation failure with its user-facing message.
    #[error("{0}")]
    Invalid(&'static str),

    #[error("Agreement draft not found")]
    DraftNotFound,

    #[error("Property not found. Please try again.")]
    PropertyNotFound,

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Chain(#[from] BlockchainError),

    #[error("Failed to encode agreement: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Open drafts, kept in memory until they expire.
///
/// Generation of a draft holds a per-draft async lock so that concurrent
/// calls anchor once and share the result.
#[derive(Debug)]
pub struct DraftRegistry {
    drafts: ExpiringMap<AgreementDraft>,
    generating: DashMap<String, Arc<Mutex<()>>>,
}

impl DraftRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            drafts: ExpiringMap::new(ttl),
            generating: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    /// Drop expired drafts and their generation locks.
    pub fn purge_expired(&self) -> usize {
        let purged = self.drafts.purge_expired();
        self.generating.retain(|id, _| self.drafts.contains_key(id));
        purged
    }

    fn get(&self, id: &str) -> Result<AgreementDraft, AgreementError> {
        self.drafts.get(id).ok_or(AgreementError::DraftNotFound)
    }

    fn insert(&self, draft: AgreementDraft) {
        self.drafts.insert(draft.id.clone(), draft);
    }

    fn modify<F>(&self, id: &str, f: F) -> Result<AgreementDraft, AgreementError>
    where
        F: FnOnce(&mut AgreementDraft) -> Result<(), AgreementError>,
    {
        self.drafts
            .modify(id, |draft| f(draft).map(|()| draft.clone()))
            .ok_or(AgreementError::DraftNotFound)?
    }

    fn generation_lock(&self, id: &str) -> Arc<Mutex<()>> {
        self.generating.entry(id.to_string()).or_default().value().clone()
    }
}

/// Fields that go into the agreement digest.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HashPayload<'a> {
    property: &'a PropertySnapshot,
    seller_name: &'a str,
    seller_email: &'a str,
    seller_address: &'a str,
    buyer_name: &'a str,
    buyer_email: &'a str,
    buyer_address: &'a str,
    agreement_date: &'a str,
    closing_date: &'a str,
    agreement_price: &'a str,
    down_payment: &'a str,
    financing_details: &'a str,
    special_conditions: &'a str,
}

impl<'a> From<&'a AgreementDraft> for HashPayload<'a> {
    fn from(d: &'a AgreementDraft) -> Self {
        Self {
            property: &d.property,
            seller_name: &d.seller_name,
            seller_email: &d.seller_email,
            seller_address: &d.seller_address,
            buyer_name: &d.buyer_name,
            buyer_email: &d.buyer_email,
            buyer_address: &d.buyer_address,
            agreement_date: &d.agreement_date,
            closing_date: &d.closing_date,
            agreement_price: &d.agreement_price,
            down_payment: &d.down_payment,
            financing_details: &d.financing_details,
            special_conditions: &d.special_conditions,
        }
    }
}

fn iso(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn snapshot(doc: &StoredDocument) -> PropertySnapshot {
    let text = |field: &str| field_str(&doc.data, field).unwrap_or_default();
    let property_id = Some(text("id"))
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| doc.key.clone());

    PropertySnapshot {
        property_id,
        title: text("title"),
        price: field_f64(&doc.data, "price").unwrap_or(0.0),
        address: text("address"),
        city: text("city"),
        state: text("state"),
        zip_code: text("zipCode"),
        image: text("image"),
        description: text("description"),
    }
}

#[derive(Clone)]
pub struct AgreementService {
    store: Arc<dyn DocumentStore>,
    drafts: Arc<DraftRegistry>,
    ledger: Option<Arc<dyn AgreementLedger>>,
    usd_per_eth: u64,
}

impl AgreementService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        drafts: Arc<DraftRegistry>,
        ledger: Option<Arc<dyn AgreementLedger>>,
        usd_per_eth: u64,
    ) -> Self {
        Self {
            store,
            drafts,
            ledger,
            usd_per_eth,
        }
    }

    /// Start a draft for a property, pre-filling the price and a 20% down payment.
    pub async fn open_draft(&self, property_key: Option<&str>) -> Result<AgreementDraft, AgreementError> {
        let key = property_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(AgreementError::Invalid(MSG_MISSING_PROPERTY))?;

        let doc = find_property(self.store.as_ref(), key)
            .await?
            .ok_or(AgreementError::PropertyNotFound)?;
        let property = snapshot(&doc);
        let now = Utc::now();

        let draft = AgreementDraft {
            id: uuid::Uuid::new_v4().to_string(),
            property_key: doc.key.clone(),
            agreement_price: format_amount(property.price),
            down_payment: format_amount(property.price * 0.2),
            property,
            seller_name: String::new(),
            seller_email: String::new(),
            seller_address: String::new(),
            buyer_name: String::new(),
            buyer_email: String::new(),
            buyer_address: String::new(),
            agreement_date: now.format("%Y-%m-%d").to_string(),
            closing_date: String::new(),
            financing_details: String::new(),
            special_conditions: String::new(),
            seller_signed: false,
            buyer_signed: false,
            transaction: None,
            created_at: now,
        };
        self.drafts.insert(draft.clone());

        tracing::debug!(draft_id = %draft.id, property_key = %draft.property_key, "Agreement draft opened");
        Ok(draft)
    }

    pub fn get_draft(&self, id: &str) -> Result<AgreementDraft, AgreementError> {
        self.drafts.get(id)
    }

    /// Apply a patch. Each party's fields lock once that party signed, and
    /// the whole draft locks once generated.
    pub fn update_draft(&self, id: &str, patch: DraftPatch) -> Result<AgreementDraft, AgreementError> {
        self.drafts.modify(id, |draft| {
            if draft.transaction.is_some() {
                return Err(AgreementError::Invalid(MSG_GENERATED));
            }
            if draft.seller_signed && patch.touches_seller() {
                return Err(AgreementError::Invalid(MSG_SELLER_LOCKED));
            }
            if draft.buyer_signed && patch.touches_buyer() {
                return Err(AgreementError::Invalid(MSG_BUYER_LOCKED));
            }

            let DraftPatch {
                seller_name,
                seller_email,
                seller_address,
                buyer_name,
                buyer_email,
                buyer_address,
                closing_date,
                agreement_price,
                down_payment,
                financing_details,
                special_conditions,
            } = patch;
            let updates = [
                (seller_name, &mut draft.seller_name),
                (seller_email, &mut draft.seller_email),
                (seller_address, &mut draft.seller_address),
                (buyer_name, &mut draft.buyer_name),
                (buyer_email, &mut draft.buyer_email),
                (buyer_address, &mut draft.buyer_address),
                (closing_date, &mut draft.closing_date),
                (agreement_price, &mut draft.agreement_price),
                (down_payment, &mut draft.down_payment),
                (financing_details, &mut draft.financing_details),
                (special_conditions, &mut draft.special_conditions),
            ];
            for (value, slot) in updates {
                if let Some(value) = value {
                    *slot = value;
                }
            }
            Ok(())
        })
    }

    /// Mark a party as signed. Only presence of name and e-mail is checked.
    pub fn sign(&self, id: &str, party: Party) -> Result<AgreementDraft, AgreementError> {
        self.drafts.modify(id, |draft| {
            match party {
                Party::Seller => {
                    if blank(&draft.seller_name) || blank(&draft.seller_email) {
                        return Err(AgreementError::Invalid(MSG_SELLER_INCOMPLETE));
                    }
                    draft.seller_signed = true;
                }
                Party::Buyer => {
                    if blank(&draft.buyer_name) || blank(&draft.buyer_email) {
                        return Err(AgreementError::Invalid(MSG_BUYER_INCOMPLETE));
                    }
                    draft.buyer_signed = true;
                }
            }
            tracing::info!(draft_id = %draft.id, party = ?party, "Agreement signed");
            Ok(())
        })
    }

    /// Anchor a fully signed draft. A draft that was already generated
    /// returns its existing transaction.
    pub async fn generate(&self, id: &str) -> Result<GeneratedTransaction, AgreementError> {
        self.drafts.get(id)?;
        let lock = self.drafts.generation_lock(id);
        let _guard = lock.lock().await;

        let draft = self.drafts.get(id)?;
        if let Some(existing) = draft.transaction {
            return Ok(existing);
        }
        if !(draft.seller_signed && draft.buyer_signed) {
            return Err(AgreementError::Invalid(MSG_NOT_SIGNED));
        }
        let required = [
            &draft.seller_name,
            &draft.seller_email,
            &draft.buyer_name,
            &draft.buyer_email,
            &draft.closing_date,
        ];
        if required.iter().any(|v| blank(v))
            || parse_amount(&draft.agreement_price).is_none()
            || parse_amount(&draft.down_payment).is_none()
        {
            return Err(AgreementError::Invalid(MSG_REQUIRED_FIELDS));
        }

        let transaction = self.generate_blockchain_transaction(&draft).await;

        let draft = self.drafts.modify(id, |d| {
            if d.transaction.is_none() {
                d.transaction = Some(transaction.clone());
            }
            Ok(())
        })?;
        Ok(draft.transaction.unwrap_or(transaction))
    }

    /// Anchor on the ledger when one is configured; on any failure fall back
    /// to a simulated transaction.
    pub async fn generate_blockchain_transaction(&self, draft: &AgreementDraft) -> GeneratedTransaction {
        if let Some(ledger) = &self.ledger {
            match self.anchor(ledger.as_ref(), draft).await {
                Ok(transaction) => {
                    metrics::record_agreement(false);
                    return transaction;
                }
                Err(e) => tracing::warn!(
                    draft_id = %draft.id,
                    error = %e,
                    "Blockchain transaction failed, falling back to simulation"
                ),
            }
        }

        let transaction = simulate_transaction();
        if let Err(e) = self.save_record(draft, &transaction).await {
            tracing::error!(
                agreement_id = %transaction.agreement_id,
                error = %e,
                "Failed to save simulated agreement"
            );
        }
        metrics::record_agreement(true);
        tracing::info!(
            draft_id = %draft.id,
            transaction_id = %transaction.transaction_id,
            "Simulated agreement transaction"
        );
        transaction
    }

    async fn anchor(
        &self,
        ledger: &dyn AgreementLedger,
        draft: &AgreementDraft,
    ) -> Result<GeneratedTransaction, AgreementError> {
        let submission = LedgerSubmission {
            property_id: draft.property.property_id.clone(),
            agreement_hash: agreement_hash(&HashPayload::from(draft))?,
            seller: address_from_email(&draft.seller_email),
            buyer: address_from_email(&draft.buyer_email),
            price_wei: price_to_wei(
                parse_amount(&draft.agreement_price).unwrap_or_default(),
                self.usd_per_eth,
            ),
        };

        let receipt = ledger.create_agreement(&submission).await?;
        let transaction = GeneratedTransaction {
            transaction_id: receipt.transaction_hash,
            agreement_id: receipt.agreement_id,
            timestamp: iso(receipt.timestamp),
            status: "confirmed".to_string(),
            block_number: receipt.block_number,
            network: ledger.network(),
            simulated: false,
        };
        self.save_record(draft, &transaction).await?;

        tracing::info!(
            draft_id = %draft.id,
            transaction_id = %transaction.transaction_id,
            agreement_id = %transaction.agreement_id,
            "Agreement anchored on chain"
        );
        Ok(transaction)
    }

    async fn save_record(
        &self,
        draft: &AgreementDraft,
        transaction: &GeneratedTransaction,
    ) -> Result<(), AgreementError> {
        let record = AgreementRecord {
            property_id: draft.property.property_id.clone(),
            transaction_hash: transaction.transaction_id.clone(),
            agreement_id: transaction.agreement_id.clone(),
            seller_name: draft.seller_name.clone(),
            seller_email: draft.seller_email.clone(),
            buyer_name: draft.buyer_name.clone(),
            buyer_email: draft.buyer_email.clone(),
            price: parse_amount(&draft.agreement_price).unwrap_or_default(),
            down_payment: parse_amount(&draft.down_payment).unwrap_or_default(),
            closing_date: draft.closing_date.clone(),
            status: "active".to_string(),
            created_at: Utc::now(),
            simulated: transaction.simulated,
            network: transaction.network.clone(),
        };
        self.store
            .set(collections::AGREEMENTS, &record.agreement_id, to_document(&record)?)
            .await?;
        Ok(())
    }

    /// Re-check a transaction. Never fails; problems become `verified: false`.
    pub async fn verify(&self, transaction_id: &str) -> VerificationResult {
        let transaction_id = transaction_id.trim();
        if transaction_id.is_empty() {
            return VerificationResult::rejected("No transaction ID to verify.");
        }
        if is_simulated_id(transaction_id) {
            return VerificationResult::rejected(
                "Simulated transactions are not recorded on a blockchain",
            );
        }
        let Some(ledger) = &self.ledger else {
            return VerificationResult::rejected("Blockchain verification is not configured");
        };

        match ledger.lookup(transaction_id).await {
            Ok(TransactionLookup::NotFound) => {
                VerificationResult::rejected("Transaction not found on blockchain")
            }
            Ok(TransactionLookup::Reverted) => {
                VerificationResult::rejected("Transaction failed on blockchain")
            }
            Ok(TransactionLookup::Confirmed(tx)) => VerificationResult {
                verified: true,
                reason: None,
                block_number: Some(tx.block_number),
                timestamp: Some(iso(tx.timestamp)),
                confirmations: Some(tx.confirmations),
                from: Some(tx.from.to_string()),
                to: tx.to.map(|a| a.to_string()),
                gas: tx.gas_limit.map(|g| g.to_string()),
                gas_used: Some(tx.gas_used.to_string()),
            },
            Err(e) => {
                tracing::warn!(transaction_id, error = %e, "Verification failed");
                VerificationResult::rejected(e.to_string())
            }
        }
    }

    /// Plain-text agreement for a generated draft.
    pub fn render_document(&self, id: &str) -> Result<(AgreementDraft, String), AgreementError> {
        let draft = self.drafts.get(id)?;
        if draft.transaction.is_none() {
            return Err(AgreementError::Invalid(MSG_NOT_GENERATED));
        }
        let text = render_document(&draft);
        Ok((draft, text))
    }
}
