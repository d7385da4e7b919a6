use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Status and JSON body of an API call. Error bodies carry `message`
/// and, for failed external calls, `error`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn message(&self) -> Option<&str> {
        self.body.get("message").and_then(Value::as_str)
    }
}

/// Image part of a listing submission.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Party {
    Seller,
    Buyer,
}

pub struct MarketClient {
    client: Client,
    base_url: String,
}

impl MarketClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::builder()
                .no_proxy()
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<ApiResponse, reqwest::Error> {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
        Ok(ApiResponse { status, body })
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<ApiResponse, reqwest::Error> {
        self.send(self.client.post(self.url(path)).json(body)).await
    }

    async fn get(&self, path: &str) -> Result<ApiResponse, reqwest::Error> {
        self.send(self.client.get(self.url(path))).await
    }

    pub async fn health(&self) -> Result<ApiResponse, reqwest::Error> {
        self.get("/health").await
    }

    // Listings

    pub async fn list_properties(&self, status: Option<&str>) -> Result<ApiResponse, reqwest::Error> {
        let mut request = self.client.get(self.url("/api/properties"));
        if let Some(status) = status {
            request = request.query(&[("status", status)]);
        }
        self.send(request).await
    }

    pub async fn get_property(&self, key: &str) -> Result<ApiResponse, reqwest::Error> {
        self.get(&format!("/api/properties/{key}")).await
    }

    /// Submit the listing form. `fields` are sent as text parts.
    pub async fn submit_property(
        &self,
        fields: &[(&str, &str)],
        image: Option<ImageFile>,
    ) -> Result<ApiResponse, reqwest::Error> {
        let mut form = Form::new();
        for (name, value) in fields {
            form = form.text(name.to_string(), value.to_string());
        }
        if let Some(image) = image {
            let part = Part::bytes(image.bytes)
                .file_name(image.file_name)
                .mime_str(&image.content_type)?;
            form = form.part("image", part);
        }
        self.send(self.client.post(self.url("/api/properties")).multipart(form))
            .await
    }

    // Identity verification

    pub async fn start_verification(&self) -> Result<ApiResponse, reqwest::Error> {
        self.post_json("/api/verification/sessions", &json!({})).await
    }

    pub async fn send_phone_otp(&self, session: &str, phone: &str) -> Result<ApiResponse, reqwest::Error> {
        self.post_json(
            &format!("/api/verification/sessions/{session}/phone/otp"),
            &json!({ "phoneNumber": phone }),
        )
        .await
    }

    pub async fn verify_phone_otp(&self, session: &str, otp: &str) -> Result<ApiResponse, reqwest::Error> {
        self.post_json(
            &format!("/api/verification/sessions/{session}/phone/verify"),
            &json!({ "otp": otp }),
        )
        .await
    }

    pub async fn send_id_otp(&self, session: &str, id_number: &str) -> Result<ApiResponse, reqwest::Error> {
        self.post_json(
            &format!("/api/verification/sessions/{session}/national-id/otp"),
            &json!({ "idNumber": id_number }),
        )
        .await
    }

    pub async fn verify_id_otp(&self, session: &str, otp: &str) -> Result<ApiResponse, reqwest::Error> {
        self.post_json(
            &format!("/api/verification/sessions/{session}/national-id/verify"),
            &json!({ "otp": otp }),
        )
        .await
    }

    pub async fn complete_verification(
        &self,
        session: &str,
        full_name: &str,
    ) -> Result<ApiResponse, reqwest::Error> {
        self.post_json(
            &format!("/api/verification/sessions/{session}/complete"),
            &json!({ "fullName": full_name }),
        )
        .await
    }

    // Maintenance

    pub async fn submit_maintenance(&self, request: &Value) -> Result<ApiResponse, reqwest::Error> {
        self.post_json("/api/maintenance/requests", request).await
    }

    pub async fn maintenance_for_house(&self, house_id: &str) -> Result<ApiResponse, reqwest::Error> {
        self.get(&format!("/api/maintenance/houses/{house_id}/requests"))
            .await
    }

    pub async fn complete_maintenance(&self, request_id: &str) -> Result<ApiResponse, reqwest::Error> {
        self.post_json(
            &format!("/api/maintenance/requests/{request_id}/complete"),
            &json!({}),
        )
        .await
    }

    pub async fn send_owner_email(&self, payload: &Value) -> Result<ApiResponse, reqwest::Error> {
        self.post_json("/api/send-mtnc-to-owner", payload).await
    }

    // Agreements

    pub async fn open_draft(&self, property_id: &str) -> Result<ApiResponse, reqwest::Error> {
        self.post_json("/api/agreements/drafts", &json!({ "propertyId": property_id }))
            .await
    }

    pub async fn update_draft(&self, draft_id: &str, patch: &Value) -> Result<ApiResponse, reqwest::Error> {
        self.send(
            self.client
                .patch(self.url(&format!("/api/agreements/drafts/{draft_id}")))
                .json(patch),
        )
        .await
    }

    pub async fn sign(&self, draft_id: &str, party: Party) -> Result<ApiResponse, reqwest::Error> {
        self.post_json(
            &format!("/api/agreements/drafts/{draft_id}/sign"),
            &json!({ "party": party }),
        )
        .await
    }

    pub async fn generate(&self, draft_id: &str) -> Result<ApiResponse, reqwest::Error> {
        self.post_json(&format!("/api/agreements/drafts/{draft_id}/generate"), &json!({}))
            .await
    }

    /// The agreement download as plain text.
    pub async fn agreement_document(&self, draft_id: &str) -> Result<(u16, String), reqwest::Error> {
        let response = self
            .client
            .get(self.url(&format!("/api/agreements/drafts/{draft_id}/document")))
            .send()
            .await?;
        let status = response.status().as_u16();
        Ok((status, response.text().await?))
    }

    pub async fn verify_transaction(&self, transaction_id: &str) -> Result<ApiResponse, reqwest::Error> {
        self.post_json(
            "/api/agreements/verify",
            &json!({ "transactionId": transaction_id }),
        )
        .await
    }

    // Prediction

    pub async fn predict(&self, form: &Value) -> Result<ApiResponse, reqwest::Error> {
        self.post_json("/api/predict", form).await
    }

    /// Raw passthrough to the model server.
    pub async fn predict_raw(&self, body: &Value) -> Result<ApiResponse, reqwest::Error> {
        self.post_json("/predict", body).await
    }

    // Admin

    pub async fn admin_status(&self, key: &str) -> Result<ApiResponse, reqwest::Error> {
        self.send(self.client.get(self.url("/admin/status")).bearer_auth(key))
            .await
    }

    pub async fn admin_stats(&self, key: &str) -> Result<ApiResponse, reqwest::Error> {
        self.send(self.client.get(self.url("/admin/stats")).bearer_auth(key))
            .await
    }
}
