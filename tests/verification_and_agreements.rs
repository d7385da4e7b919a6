//! Identity verification and purchase agreement flows over HTTP.

use estate_market::config::AppConfig;
use estate_market::store::collections;
use estate_sdk::Party;
use serde_json::json;

mod common;

fn instant_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.identity.phone_send_delay_ms = 0;
    config.identity.id_send_delay_ms = 0;
    config.identity.verify_delay_ms = 0;
    config
}

#[tokio::test]
async fn test_verification_creates_user_once() {
    let server = common::start_server(instant_config()).await;
    let client = &server.client;

    let session = client.start_verification().await.unwrap();
    assert_eq!(session.status, 201);
    let id = session.body["sessionId"].as_str().unwrap().to_string();
    assert_eq!(session.body["phoneVerified"], false);

    let res = client.send_phone_otp(&id, "98765-43210").await.unwrap();
    assert_eq!(res.status, 200, "{:?}", res.body);
    assert_eq!(res.body["phoneOtpSent"], true);
    assert!(res.body.get("phoneNumber").is_none());

    let res = client.verify_phone_otp(&id, "000000").await.unwrap();
    assert_eq!(res.status, 400);
    assert_eq!(res.message(), Some("Invalid OTP. Please try again."));

    let res = client.verify_phone_otp(&id, "123456").await.unwrap();
    assert_eq!(res.body["phoneVerified"], true);

    let res = client.complete_verification(&id, "Asha Rao").await.unwrap();
    assert_eq!(res.status, 400);
    assert_eq!(res.message(), Some("Please verify your ID number"));

    client.send_id_otp(&id, "1234 5678 9012").await.unwrap();
    let res = client.verify_id_otp(&id, "654321").await.unwrap();
    assert_eq!(res.body["idVerified"], true);

    let res = client.complete_verification(&id, "Asha Rao").await.unwrap();
    assert_eq!(res.status, 200, "{:?}", res.body);
    assert_eq!(res.body["created"], true);
    let user_id = res.body["userId"].as_str().unwrap().to_string();

    // The session is closed once completed.
    let res = client.send_phone_otp(&id, "9876543210").await.unwrap();
    assert_eq!(res.status, 404);

    // Same ID number again resolves to the existing user.
    let again = client.start_verification().await.unwrap();
    let again = again.body["sessionId"].as_str().unwrap().to_string();
    client.send_phone_otp(&again, "9876543210").await.unwrap();
    client.verify_phone_otp(&again, "123456").await.unwrap();
    client.send_id_otp(&again, "123456789012").await.unwrap();
    client.verify_id_otp(&again, "654321").await.unwrap();
    let res = client.complete_verification(&again, "Asha Rao").await.unwrap();
    assert_eq!(res.body["created"], false);
    assert_eq!(res.body["userId"], user_id.as_str());

    assert_eq!(server.components.store.count(collections::USERS).await.unwrap(), 1);
}

#[tokio::test]
async fn test_verification_rejects_malformed_numbers() {
    let server = common::start_server(instant_config()).await;
    let session = server.client.start_verification().await.unwrap();
    let id = session.body["sessionId"].as_str().unwrap();

    let res = server.client.send_phone_otp(id, "12345").await.unwrap();
    assert_eq!(res.status, 400);
    assert_eq!(res.message(), Some("Please enter a valid 10-digit phone number"));

    let res = server.client.send_id_otp(id, "1234").await.unwrap();
    assert_eq!(res.message(), Some("Please enter a valid 12-digit ID number"));

    let res = server.client.verify_id_otp(id, "654321").await.unwrap();
    assert_eq!(res.message(), Some("Please request an OTP first"));
}

#[tokio::test]
async fn test_simulated_agreement_flow() {
    let server = common::start_server(AppConfig::default()).await;
    let key = common::seed_property(&server.components, "LOFT0001", "owner@example.com").await;
    let client = &server.client;

    let res = client.open_draft("").await.unwrap();
    assert_eq!(res.status, 400);
    assert_eq!(
        res.message(),
        Some("Property ID is missing. Please select a property first.")
    );
    let res = client.open_draft("missing").await.unwrap();
    assert_eq!(res.status, 404);

    let draft = client.open_draft(&key).await.unwrap();
    assert_eq!(draft.status, 201);
    assert_eq!(draft.body["agreementPrice"], "450000");
    assert_eq!(draft.body["downPayment"], "90000");
    assert_eq!(draft.body["property"]["propertyId"], "LOFT0001");
    let id = draft.body["id"].as_str().unwrap().to_string();

    let res = client.sign(&id, Party::Seller).await.unwrap();
    assert_eq!(
        res.message(),
        Some("Please fill in all seller information before signing.")
    );

    let res = client
        .update_draft(
            &id,
            &json!({
                "sellerName": "Sam Seller",
                "sellerEmail": "sam@example.com",
                "buyerName": "Jordan Buyer",
                "buyerEmail": "jordan@example.com",
                "closingDate": "2024-09-30",
            }),
        )
        .await
        .unwrap();
    assert_eq!(res.status, 200, "{:?}", res.body);

    let res = client.generate(&id).await.unwrap();
    assert_eq!(
        res.message(),
        Some("Both parties must sign before generating the agreement.")
    );

    client.sign(&id, Party::Seller).await.unwrap();
    let res = client
        .update_draft(&id, &json!({ "sellerName": "Someone Else" }))
        .await
        .unwrap();
    assert_eq!(
        res.message(),
        Some("Seller information cannot be changed after signing.")
    );
    client.sign(&id, Party::Buyer).await.unwrap();

    let generated = client.generate(&id).await.unwrap();
    assert_eq!(generated.status, 200, "{:?}", generated.body);
    assert_eq!(generated.body["simulated"], true);
    assert_eq!(generated.body["network"], "development");
    let tx = generated.body["transactionId"].as_str().unwrap().to_string();
    assert!(tx.starts_with("tx_"));

    let repeated = client.generate(&id).await.unwrap();
    assert_eq!(repeated.body["transactionId"], tx.as_str());
    assert_eq!(
        server.components.store.count(collections::AGREEMENTS).await.unwrap(),
        1
    );

    let (status, text) = client.agreement_document(&id).await.unwrap();
    assert_eq!(status, 200);
    assert!(text.starts_with("REAL ESTATE PURCHASE AGREEMENT"));
    assert!(text.contains(&format!("TRANSACTION ID: {tx}")));
    assert!(text.contains("BUYER SIGNATURE: Jordan Buyer (Signed electronically)"));

    let verified = client.verify_transaction(&tx).await.unwrap();
    assert_eq!(verified.body["verified"], false);
    assert_eq!(
        verified.body["reason"],
        "Simulated transactions are not recorded on a blockchain"
    );

    let res = client
        .update_draft(&id, &json!({ "specialConditions": "None" }))
        .await
        .unwrap();
    assert_eq!(res.message(), Some("The agreement has already been generated."));
}

#[tokio::test]
async fn test_document_requires_generation() {
    let server = common::start_server(AppConfig::default()).await;
    let key = common::seed_property(&server.components, "LOFT0002", "owner@example.com").await;

    let draft = server.client.open_draft(&key).await.unwrap();
    let id = draft.body["id"].as_str().unwrap();
    let (status, _) = server.client.agreement_document(id).await.unwrap();
    assert_eq!(status, 400);
}
