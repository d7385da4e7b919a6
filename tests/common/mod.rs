//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router};
use estate_market::config::AppConfig;
use estate_market::lifecycle::{Components, Shutdown};
use estate_market::store::collections;
use estate_market::HttpServer;
use estate_sdk::client::{ImageFile, MarketClient};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// A running server on an ephemeral port. Shuts down when dropped.
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: MarketClient,
    pub components: Components,
    shutdown: Shutdown,
    _media: TempDir,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the API with `config` and in-memory components.
pub async fn start_server(mut config: AppConfig) -> TestServer {
    let media = tempfile::tempdir().unwrap();
    config.listener.bind_address = "127.0.0.1:0".into();
    let components = Components::in_memory(media.path(), &config.store.public_media_url);

    let server = HttpServer::new(config, components.clone()).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let (_, config_updates) = mpsc::unbounded_channel();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });

    TestServer {
        addr,
        client: MarketClient::new(&format!("http://{addr}")),
        components,
        shutdown,
        _media: media,
    }
}

/// Insert a listing straight into the store and return its document key.
pub async fn seed_property(components: &Components, house_id: &str, owner_email: &str) -> String {
    let doc = json!({
        "id": house_id,
        "title": "Modern Loft",
        "status": "FOR SALE",
        "price": 450000,
        "address": "12 Harbour Road",
        "city": "Springfield",
        "state": "IL",
        "zipCode": "62701",
        "beds": 2,
        "baths": 1,
        "sqft": 900,
        "description": "Bright corner loft with harbour views and a renovated kitchen.",
        "image": "/media/properties/1700000000000-loft.png",
        "ownerEmail": owner_email,
        "createdAt": "2024-01-01T00:00:00.000Z",
    });
    components
        .store
        .insert(collections::PROPERTIES, doc.as_object().cloned().unwrap())
        .await
        .unwrap()
}

/// Text fields of a valid listing form.
pub fn listing_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("title", "Garden Cottage"),
        ("status", "FOR RENT"),
        ("price", "1800"),
        ("address", "4 Elm Street"),
        ("city", "Portland"),
        ("state", "OR"),
        ("zipCode", "97201"),
        ("beds", "3"),
        ("baths", "2"),
        ("sqft", "1400"),
        (
            "description",
            "Quiet cottage with a fenced garden, new roof and a detached workshop.",
        ),
        ("ownerEmail", "owner@example.com"),
    ]
}

pub fn png(bytes: usize) -> ImageFile {
    ImageFile {
        file_name: "front.png".into(),
        content_type: "image/png".into(),
        bytes: vec![0x89; bytes],
    }
}

/// Requests received by a mock backend.
#[derive(Clone, Default)]
pub struct Recorded(Arc<Mutex<Vec<Value>>>);

impl Recorded {
    pub fn bodies(&self) -> Vec<Value> {
        self.0.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

/// Start a programmable JSON backend on an ephemeral port.
///
/// Every POST body is recorded and answered with `f(body)`.
pub async fn start_programmable_backend<F>(f: F) -> (SocketAddr, Recorded)
where
    F: Fn(&Value) -> (u16, Value) + Send + Sync + 'static,
{
    let recorded = Recorded::default();
    let handler = Arc::new(f);

    let app = Router::new()
        .fallback(
            |State((recorded, handler)): State<(Recorded, Arc<F>)>, Json(body): Json<Value>| async move {
                let (status, reply) = handler(&body);
                recorded.0.lock().unwrap().push(body);
                (
                    StatusCode::from_u16(status).unwrap_or(StatusCode::OK),
                    Json(reply),
                )
            },
        )
        .with_state((recorded.clone(), handler));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, recorded)
}

/// A backend that always answers with the same status and body.
pub async fn start_mock_backend(status: u16, body: Value) -> (SocketAddr, Recorded) {
    start_programmable_backend(move |_| (status, body.clone())).await
}
