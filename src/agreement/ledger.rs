//! Agreement anchoring seam and its EVM implementation.

use std::time::Duration;

use alloy::consensus::Transaction as _;
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::sol;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::blockchain::{BlockchainClient, BlockchainError, BlockchainResult, Wallet};
use crate::config::BlockchainConfig;

sol! {
    #[sol(rpc)]
    contract AgreementRegistry {
        event AgreementCreated(
            uint256 indexed agreementId,
            string propertyId,
            address indexed seller,
            address indexed buyer,
            uint256 price,
            uint256 timestamp
        );

        function createAgreement(
            string propertyId,
            string agreementHash,
            address seller,
            address buyer,
            uint256 price
        ) public returns (uint256);
    }
}

/// Arguments of `createAgreement`.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSubmission {
    pub property_id: String,
    pub agreement_hash: String,
    pub seller: Address,
    pub buyer: Address,
    pub price_wei: U256,
}

/// A mined agreement transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerReceipt {
    pub transaction_hash: String,
    pub agreement_id: String,
    pub block_number: u64,
    pub timestamp: DateTime<Utc>,
}

/// Details of a successful transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmedTransaction {
    pub block_number: u64,
    pub timestamp: DateTime<Utc>,
    pub confirmations: u64,
    pub from: Address,
    pub to: Option<Address>,
    pub gas_limit: Option<u64>,
    pub gas_used: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransactionLookup {
    NotFound,
    Reverted,
    Confirmed(ConfirmedTransaction),
}

/// Where agreements are anchored.
#[async_trait]
pub trait AgreementLedger: Send + Sync {
    /// Network name reported with generated transactions.
    fn network(&self) -> String;

    /// Submit `createAgreement` and wait for its receipt.
    async fn create_agreement(&self, submission: &LedgerSubmission) -> BlockchainResult<LedgerReceipt>;

    /// Re-query a transaction by hash.
    async fn lookup(&self, transaction_hash: &str) -> BlockchainResult<TransactionLookup>;
}

/// Ledger backed by the agreement registry contract.
pub struct ChainLedger {
    client: BlockchainClient,
    provider: DynProvider,
    contract_address: Address,
    confirmations: u64,
    receipt_timeout: Duration,
}

impl ChainLedger {
    /// Build a signing provider for `wallet` and a read client with failover.
    pub async fn connect(config: &BlockchainConfig, wallet: Wallet) -> BlockchainResult<Self> {
        let contract_address: Address = config.contract_address.parse().map_err(|e| {
            BlockchainError::NotAvailable(format!("Invalid contract address: {e}"))
        })?;
        if contract_address == Address::ZERO {
            return Err(BlockchainError::NotAvailable(
                "Agreement contract address not configured".to_string(),
            ));
        }

        let rpc_url: url::Url = config.rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        let provider = ProviderBuilder::new()
            .wallet(wallet.network_wallet())
            .connect_http(rpc_url)
            .erased();

        let client = BlockchainClient::new(config.clone()).await?;

        tracing::info!(
            contract = %contract_address,
            signer = %wallet.address(),
            network = %client.network(),
            "Agreement ledger connected"
        );

        Ok(Self {
            client,
            provider,
            contract_address,
            confirmations: u64::from(config.confirmation_blocks.max(1)),
            receipt_timeout: Duration::from_secs(config.receipt_timeout_secs),
        })
    }
}

fn block_time(seconds: u64) -> BlockchainResult<DateTime<Utc>> {
    i64::try_from(seconds)
        .ok()
        .and_then(|s| DateTime::from_timestamp(s, 0))
        .ok_or_else(|| BlockchainError::Rpc(format!("Invalid block timestamp {seconds}")))
}

#[async_trait]
impl AgreementLedger for ChainLedger {
    fn network(&self) -> String {
        self.client.network()
    }

    async fn create_agreement(&self, submission: &LedgerSubmission) -> BlockchainResult<LedgerReceipt> {
        let contract = AgreementRegistry::new(self.contract_address, self.provider.clone());

        let pending = contract
            .createAgreement(
                submission.property_id.clone(),
                submission.agreement_hash.clone(),
                submission.seller,
                submission.buyer,
                submission.price_wei,
            )
            .send()
            .await
            .map_err(|e| BlockchainError::Rpc(e.to_string()))?;
        let tx_hash = *pending.tx_hash();
        tracing::info!(tx_hash = %tx_hash, property_id = %submission.property_id, "Agreement transaction sent");

        let receipt = tokio::time::timeout(
            self.receipt_timeout,
            pending
                .with_required_confirmations(self.confirmations)
                .get_receipt(),
        )
        .await
        .map_err(|_| BlockchainError::ConfirmationTimeout(self.receipt_timeout.as_secs()))?
        .map_err(|e| BlockchainError::Rpc(e.to_string()))?;

        if !receipt.status() {
            return Err(BlockchainError::Reverted(tx_hash.to_string()));
        }

        let event = receipt
            .inner
            .logs()
            .iter()
            .find_map(|log| log.log_decode::<AgreementRegistry::AgreementCreated>().ok())
            .ok_or_else(|| {
                BlockchainError::Rpc("AgreementCreated event missing from receipt".to_string())
            })?;
        let block_number = receipt
            .block_number
            .ok_or_else(|| BlockchainError::Rpc("Receipt has no block number".to_string()))?;
        let timestamp = block_time(self.client.get_block_timestamp(block_number).await?)?;

        Ok(LedgerReceipt {
            transaction_hash: tx_hash.to_string(),
            agreement_id: event.inner.data.agreementId.to_string(),
            block_number,
            timestamp,
        })
    }

    async fn lookup(&self, transaction_hash: &str) -> BlockchainResult<TransactionLookup> {
        let tx_hash: TxHash = transaction_hash
            .parse()
            .map_err(|e| BlockchainError::Rpc(format!("Invalid transaction hash: {e}")))?;

        let Some(receipt) = self.client.get_transaction_receipt(tx_hash).await? else {
            return Ok(TransactionLookup::NotFound);
        };
        if !receipt.status() {
            return Ok(TransactionLookup::Reverted);
        }

        let block_number = receipt
            .block_number
            .ok_or_else(|| BlockchainError::Rpc("Receipt has no block number".to_string()))?;
        let transaction = self.client.get_transaction(tx_hash).await?;
        let timestamp = block_time(self.client.get_block_timestamp(block_number).await?)?;
        let head = self.client.get_block_number().await?;

        Ok(TransactionLookup::Confirmed(ConfirmedTransaction {
            block_number,
            timestamp,
            confirmations: head.saturating_sub(block_number),
            from: receipt.from,
            to: receipt.to,
            gas_limit: transaction.map(|tx| tx.gas_limit()),
            gas_used: receipt.gas_used,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::sol_types::SolEvent;

    #[test]
    fn test_event_signature() {
        assert_eq!(
            AgreementRegistry::AgreementCreated::SIGNATURE,
            "AgreementCreated(uint256,string,address,address,uint256,uint256)"
        );
    }

    #[test]
    fn test_block_time() {
        assert_eq!(block_time(0).unwrap().timestamp(), 0);
        assert!(block_time(u64::MAX).is_err());
    }

    #[tokio::test]
    async fn test_connect_requires_contract_address() {
        let wallet = Wallet::from_private_key(
            "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
            31337,
        )
        .unwrap();
        let config = BlockchainConfig::default();

        let err = ChainLedger::connect(&config, wallet).await.err().unwrap();
        assert!(matches!(err, BlockchainError::NotAvailable(_)));
    }
}
