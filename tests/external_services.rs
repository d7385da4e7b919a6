//! Behaviour against the mail API and the model server, including failures.

use estate_market::config::AppConfig;
use serde_json::{json, Value};

mod common;

fn prediction_form() -> Value {
    json!({
        "Area": "1800",
        "Bedrooms": "3",
        "Bathrooms": "2",
        "Floors": "2",
        "YearBuilt": "2005",
        "Location": "Suburban",
        "Condition": "Good",
        "Garage": "1"
    })
}

fn owner_email_payload() -> Value {
    json!({
        "houseId": "LOFT0001",
        "tenantName": "Dana",
        "issueCategory": "plumbing",
        "issue": "Dripping tap",
        "urgency": "low",
        "entryPermission": "no",
        "tenant_email": "dana@example.com",
        "owner_email": "owner@example.com",
    })
}

fn mail_config(api: std::net::SocketAddr) -> AppConfig {
    let mut config = AppConfig::default();
    config.mail.enabled = true;
    config.mail.api_url = format!("http://{api}/send");
    config
}

#[tokio::test]
async fn test_owner_email_route_success() {
    let (mail_addr, mail) = common::start_mock_backend(200, json!({"id": "msg-1"})).await;
    let mut config = mail_config(mail_addr);
    config.mail.send_tenant_copy = true;
    let server = common::start_server(config).await;

    let res = server.client.send_owner_email(&owner_email_payload()).await.unwrap();
    assert_eq!(res.status, 200);
    assert_eq!(res.message(), Some("Email sent successfully"));

    let sent = mail.bodies();
    assert_eq!(sent[0]["to"], "owner@example.com");
    assert_eq!(sent[0]["from"], "dana@example.com");
    // Tenant acknowledgement copy.
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1]["to"], "dana@example.com");
}

#[tokio::test]
async fn test_owner_email_route_reports_mail_failure() {
    let (mail_addr, _) = common::start_mock_backend(503, json!({"error": "quota"})).await;
    let server = common::start_server(mail_config(mail_addr)).await;

    let res = server.client.send_owner_email(&owner_email_payload()).await.unwrap();
    assert_eq!(res.status, 500);
    assert_eq!(res.message(), Some("Failed to send email"));
    assert!(res.body["error"].as_str().unwrap().contains("503"));
}

#[tokio::test]
async fn test_mail_failure_keeps_maintenance_request() {
    let (mail_addr, _) = common::start_mock_backend(500, json!({})).await;
    let server = common::start_server(mail_config(mail_addr)).await;
    common::seed_property(&server.components, "LOFT0001", "owner@example.com").await;

    let res = server
        .client
        .submit_maintenance(&json!({
            "houseId": "LOFT0001",
            "categories": ["electrical"],
            "issue": "Hallway light flickers",
        }))
        .await
        .unwrap();
    assert_eq!(res.status, 201);
    assert_eq!(res.body["ownerNotified"], false);

    let listed = server.client.maintenance_for_house("LOFT0001").await.unwrap();
    assert_eq!(listed.body["requests"].as_array().unwrap().len(), 1);
    assert_eq!(listed.body["requests"][0]["urgency"], "medium");
}

#[tokio::test]
async fn test_prediction_uses_model_server() {
    let (model_addr, model) =
        common::start_mock_backend(200, json!({"predicted_price": "412345.5"})).await;
    let mut config = AppConfig::default();
    config.prediction.endpoint = format!("http://{model_addr}/predict/");
    let server = common::start_server(config).await;

    let res = server.client.predict(&prediction_form()).await.unwrap();
    assert_eq!(res.status, 200, "{:?}", res.body);
    assert_eq!(res.body["predicted_price"], 412345.5);
    assert_eq!(res.body["source"], "model");

    let features = &model.bodies()[0];
    assert_eq!(features["Area"], 1800);
    assert_eq!(features["Location"], "Suburban");
}

#[tokio::test]
async fn test_prediction_validation_and_server_errors() {
    let (model_addr, model) = common::start_mock_backend(500, json!({"detail": "boom"})).await;
    let mut config = AppConfig::default();
    config.prediction.endpoint = format!("http://{model_addr}/predict/");
    let server = common::start_server(config).await;

    let mut form = prediction_form();
    form["Garage"] = json!("");
    let res = server.client.predict(&form).await.unwrap();
    assert_eq!(res.status, 400);
    assert_eq!(res.message(), Some("Please fill in all fields"));

    form["Garage"] = json!("one");
    let res = server.client.predict(&form).await.unwrap();
    assert_eq!(res.message(), Some("Garage must contain digits only"));
    assert_eq!(model.len(), 0);

    let res = server.client.predict(&prediction_form()).await.unwrap();
    assert_eq!(res.status, 502);
    assert!(res.body["error"].as_str().unwrap().contains("Server error (500)"));
}

#[tokio::test]
async fn test_prediction_falls_back_when_model_unreachable() {
    let mut config = AppConfig::default();
    config.prediction.endpoint = "http://127.0.0.1:9/predict/".into();
    config.prediction.offline_fallback = true;
    let server = common::start_server(config).await;

    let res = server.client.predict(&prediction_form()).await.unwrap();
    assert_eq!(res.status, 200, "{:?}", res.body);
    assert_eq!(res.body["source"], "heuristic");
    assert!(res.body["predicted_price"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn test_predict_passthrough_relays_status_and_body() {
    let (model_addr, model) =
        common::start_mock_backend(422, json!({"detail": "Area missing"})).await;
    let mut config = AppConfig::default();
    config.prediction.endpoint = format!("http://{model_addr}/predict/");
    let server = common::start_server(config).await;

    let res = server.client.predict_raw(&json!({"Bedrooms": 3})).await.unwrap();
    assert_eq!(res.status, 422);
    assert_eq!(res.body, json!({"detail": "Area missing"}));
    assert_eq!(model.bodies(), vec![json!({"Bedrooms": 3})]);
}
