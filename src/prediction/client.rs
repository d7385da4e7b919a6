//! Model server client.

use std::time::Duration;

use axum::body::Bytes;
use serde_json::Value;

use crate::config::PredictionConfig;
use crate::observability::metrics;
use crate::prediction::heuristic::{estimate_price, random_factor};
use crate::prediction::types::{Prediction, PredictionForm, PredictionSource};
use crate::prediction::PredictionError;

/// Raw upstream response for the passthrough route.
#[derive(Debug, Clone)]
pub struct ForwardedResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

/// Read `predicted_price` whether the server sent a number or a numeric string.
pub fn parse_predicted_price(body: &Value) -> Result<f64, PredictionError> {
    let price = match body.get("predicted_price") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    price
        .filter(|p: &f64| p.is_finite())
        .ok_or_else(|| PredictionError::InvalidResponse(body.to_string()))
}

#[derive(Debug, Clone)]
pub struct PredictionClient {
    client: reqwest::Client,
    endpoint: String,
    offline_fallback: bool,
}

impl PredictionClient {
    pub fn new(config: &PredictionConfig, timeout: Duration) -> Result<Self, PredictionError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            offline_fallback: config.offline_fallback,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn predict(&self, form: &PredictionForm) -> Result<Prediction, PredictionError> {
        let features = form.validate()?;

        let result = async {
            let response = self.client.post(&self.endpoint).json(&features).send().await?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(PredictionError::Server {
                    status: status.as_u16(),
                    body,
                });
            }
            let body: Value = response.json().await?;
            parse_predicted_price(&body)
        }
        .await;
        metrics::record_external_call("prediction", result.is_ok());

        match result {
            Ok(price) => {
                tracing::debug!(predicted_price = price, "Model prediction received");
                Ok(Prediction {
                    predicted_price: price,
                    source: PredictionSource::Model,
                })
            }
            Err(PredictionError::Transport(e))
                if self.offline_fallback && (e.is_connect() || e.is_timeout()) =>
            {
                tracing::warn!(error = %e, "Model server unreachable, using offline estimate");
                Ok(Prediction {
                    predicted_price: estimate_price(&features, random_factor()),
                    source: PredictionSource::Heuristic,
                })
            }
            Err(e) => {
                tracing::error!(endpoint = %self.endpoint, error = %e, "Prediction failed");
                Err(e)
            }
        }
    }

    /// Forward a raw request body and hand back the upstream status and body.
    pub async fn forward(
        &self,
        body: Bytes,
        content_type: Option<&str>,
    ) -> Result<ForwardedResponse, PredictionError> {
        let mut request = self.client.post(&self.endpoint).body(body);
        if let Some(ct) = content_type {
            request = request.header(reqwest::header::CONTENT_TYPE, ct);
        }

        let result = async {
            let response = request.send().await?;
            let status = response.status().as_u16();
            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(String::from);
            let body = response.bytes().await?;
            Ok::<_, PredictionError>(ForwardedResponse {
                status,
                content_type,
                body,
            })
        }
        .await;
        metrics::record_external_call("prediction", result.is_ok());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_price_as_string_or_number() {
        assert_eq!(
            parse_predicted_price(&json!({"predicted_price": "412345.5"})).unwrap(),
            412345.5
        );
        assert_eq!(parse_predicted_price(&json!({"predicted_price": 250000})).unwrap(), 250000.0);
        assert!(parse_predicted_price(&json!({"error": "boom"})).is_err());
        assert!(parse_predicted_price(&json!({"predicted_price": "NaN"})).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_server_uses_heuristic_when_enabled() {
        let config = PredictionConfig {
            endpoint: "http://127.0.0.1:9/predict/".into(),
            offline_fallback: true,
        };
        let client = PredictionClient::new(&config, Duration::from_secs(2)).unwrap();
        let form = PredictionForm {
            area: Some("1000".into()),
            bedrooms: Some("2".into()),
            bathrooms: Some("1".into()),
            floors: Some("1".into()),
            year_built: Some("1990".into()),
            location: Some("Rural".into()),
            condition: Some("Fair".into()),
            garage: Some("0".into()),
        };

        let prediction = client.predict(&form).await.unwrap();
        assert_eq!(prediction.source, PredictionSource::Heuristic);
        assert!((301_500.0..=368_500.0).contains(&prediction.predicted_price));
    }

    #[tokio::test]
    async fn test_validation_happens_before_any_call() {
        let client = PredictionClient::new(&PredictionConfig::default(), Duration::from_secs(1)).unwrap();
        let err = client.predict(&PredictionForm::default()).await.unwrap_err();
        assert!(matches!(err, PredictionError::Invalid(_)));
    }
}
