//! Startup orchestration.
//!
//! Builds the long-lived components that survive configuration reloads:
//! the stores, the open verification sessions and agreement drafts, and
//! the agreement ledger.
//!
//! # Design Decisions
//! - Fail fast: a persistence file that cannot be read is fatal
//! - A missing wallet or unreachable chain only disables the ledger

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::agreement::{AgreementLedger, ChainLedger, DraftRegistry};
use crate::blockchain::Wallet;
use crate::config::{AppConfig, BlockchainConfig, RetentionConfig};
use crate::identity::SessionRegistry;
use crate::store::{BlobStore, DocumentStore, FsBlobStore, MemoryStore, StoreError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Failed to open document store: {0}")]
    Store(#[from] StoreError),
}

/// Components shared by every generation of the service layer.
#[derive(Clone)]
pub struct Components {
    pub store: Arc<dyn DocumentStore>,
    pub blobs: Arc<dyn BlobStore>,
    /// Directory served under the public media URL.
    pub media_root: PathBuf,
    pub sessions: Arc<SessionRegistry>,
    pub drafts: Arc<DraftRegistry>,
    pub ledger: Option<Arc<dyn AgreementLedger>>,
}

impl Components {
    /// In-memory components without a ledger, using default retention.
    pub fn in_memory(media_root: impl Into<PathBuf>, public_media_url: &str) -> Self {
        let media_root = media_root.into();
        let (sessions, drafts) = registries(&RetentionConfig::default());
        Self {
            store: Arc::new(MemoryStore::new()),
            blobs: Arc::new(FsBlobStore::new(media_root.clone(), public_media_url)),
            media_root,
            sessions,
            drafts,
            ledger: None,
        }
    }
}

fn registries(retention: &RetentionConfig) -> (Arc<SessionRegistry>, Arc<DraftRegistry>) {
    (
        Arc::new(SessionRegistry::new(Duration::from_secs(retention.session_ttl_secs))),
        Arc::new(DraftRegistry::new(Duration::from_secs(retention.draft_ttl_secs))),
    )
}

/// Build the components for `config`.
pub async fn build_components(config: &AppConfig) -> Result<Components, StartupError> {
    let store = match &config.store.persistence_path {
        Some(path) => MemoryStore::open(path)?,
        None => {
            tracing::warn!("No persistence path configured; documents live in memory only");
            MemoryStore::new()
        }
    };

    let media_root = PathBuf::from(&config.store.media_root);
    let blobs = FsBlobStore::new(media_root.clone(), &config.store.public_media_url);
    let (sessions, drafts) = registries(&config.retention);

    Ok(Components {
        store: Arc::new(store),
        blobs: Arc::new(blobs),
        media_root,
        sessions,
        drafts,
        ledger: connect_ledger(&config.blockchain).await,
    })
}

/// The agreement ledger, when enabled and reachable.
pub async fn connect_ledger(config: &BlockchainConfig) -> Option<Arc<dyn AgreementLedger>> {
    if !config.enabled {
        tracing::info!("Blockchain integration disabled; agreements will be simulated");
        return None;
    }

    let wallet = match Wallet::from_env(config.chain_id) {
        Ok(wallet) => wallet,
        Err(e) => {
            tracing::warn!(error = %e, "No agreement wallet; agreements will be simulated");
            return None;
        }
    };

    match ChainLedger::connect(config, wallet).await {
        Ok(ledger) => Some(Arc::new(ledger)),
        Err(e) => {
            tracing::warn!(error = %e, "Agreement ledger unavailable; agreements will be simulated");
            None
        }
    }
}
