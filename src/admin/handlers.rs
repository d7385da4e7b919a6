use axum::{extract::State, Json};
use serde::Serialize;

use crate::blockchain::network_name;
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::store::collections;

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Integrations {
    pub mail_delivery: bool,
    pub ledger: bool,
    pub network: String,
    pub payment_gateway: bool,
    pub prediction_endpoint: String,
    pub offline_prediction: bool,
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub integrations: Integrations,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub collections: Vec<CollectionCount>,
    pub open_sessions: usize,
    pub open_drafts: usize,
}

#[derive(Debug, Serialize)]
pub struct CollectionCount {
    pub name: &'static str,
    pub documents: usize,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    let services = state.services();
    let config = &services.config;

    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        integrations: Integrations {
            mail_delivery: config.mail.enabled,
            ledger: state.components.ledger.is_some(),
            network: match &state.components.ledger {
                Some(ledger) => ledger.network(),
                None => network_name(config.blockchain.chain_id),
            },
            payment_gateway: config.payments.gateway_key.is_some(),
            prediction_endpoint: config.prediction.endpoint.clone(),
            offline_prediction: config.prediction.offline_fallback,
        },
    })
}

pub async fn get_stats(State(state): State<AppState>) -> Result<Json<StoreStats>, ApiError> {
    let mut counts = Vec::with_capacity(collections::ALL.len());
    for name in collections::ALL {
        let documents = state
            .components
            .store
            .count(name)
            .await
            .map_err(|e| ApiError::upstream("Failed to read document store", e))?;
        counts.push(CollectionCount { name, documents });
    }

    Ok(Json(StoreStats {
        collections: counts,
        open_sessions: state.components.sessions.len(),
        open_drafts: state.components.drafts.len(),
    }))
}
