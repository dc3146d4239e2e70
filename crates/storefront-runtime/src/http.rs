//! Storefront HTTP Backend
//!
//! Implementation of `PaymentBackend` over the storefront's JSON API.

use storefront_core::{
    error::{CheckoutError, Result},
    gateway::{ClientSecret, IntentRequest, IntentResponse, PaymentBackend, PurchaseRecord},
};

use crate::config::RuntimeConfig;

/// JSON client for `payment-intent` and `save-payment`
#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a backend client rooted at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Create from configuration
    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self::new(config.backend_url.clone())
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        Self::from_config(&RuntimeConfig::from_env())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.trim_end_matches('/'))
    }
}

impl PaymentBackend for HttpBackend {
    async fn create_payment_intent(&self, total_cents: i64) -> Result<ClientSecret> {
        let response = self
            .client
            .post(self.endpoint("payment-intent"))
            .json(&IntentRequest::from_cents(total_cents))
            .send()
            .await
            .map_err(|e| CheckoutError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "Payment intent request rejected");
            return Err(CheckoutError::Initialization(format!("HTTP {status}")));
        }

        let body: IntentResponse = response
            .json()
            .await
            .map_err(|e| CheckoutError::Initialization(format!("malformed response: {e}")))?;

        if body.client_secret.trim().is_empty() {
            return Err(CheckoutError::Initialization("empty client secret".into()));
        }

        Ok(ClientSecret::new(body.client_secret))
    }

    async fn record_purchase(&self, record: &PurchaseRecord) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint("save-payment"))
            .json(record)
            .send()
            .await
            .map_err(|e| CheckoutError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CheckoutError::Recording(format!("HTTP {status}")));
        }

        tracing::debug!(product_id = %record.product_id, "Purchase recorded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::StatusCode, routing::post};
    use serde_json::{Value, json};
    use storefront_core::{BillingDetails, CartLine};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/api/v1/payment")
    }

    fn record() -> PurchaseRecord {
        let line = CartLine {
            item_id: "coaches".into(),
            title: "Coaches and Consultants".into(),
            unit_price_cents: 3900,
            quantity: 1,
            lead_count: "~500K".into(),
        };
        PurchaseRecord::for_line(&line, "pi_1", &BillingDetails::new("Jo", "jo@example.com"), "card")
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let backend = HttpBackend::new("http://localhost:5000/api/v1/payment/");
        assert_eq!(
            backend.endpoint("payment-intent"),
            "http://localhost:5000/api/v1/payment/payment-intent"
        );
    }

    #[tokio::test]
    async fn test_intent_round_trip() {
        let app = Router::new().route(
            "/api/v1/payment/payment-intent",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body, json!({ "totalPrice": 39.0 }));
                Json(json!({ "clientSecret": "pi_9_secret_z" }))
            }),
        );
        let backend = HttpBackend::new(serve(app).await);

        let secret = backend.create_payment_intent(3900).await.unwrap();
        assert_eq!(secret.as_str(), "pi_9_secret_z");
    }

    #[tokio::test]
    async fn test_non_success_is_initialization_failure() {
        let app = Router::new().route(
            "/api/v1/payment/payment-intent",
            post(|| async { StatusCode::BAD_GATEWAY }),
        );
        let backend = HttpBackend::new(serve(app).await);

        let err = backend.create_payment_intent(3900).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Initialization(_)));
    }

    #[tokio::test]
    async fn test_malformed_body_is_initialization_failure() {
        let app = Router::new().route(
            "/api/v1/payment/payment-intent",
            post(|| async { Json(json!({ "data": { "client_secret": "pi_1_secret_x" } })) }),
        );
        let backend = HttpBackend::new(serve(app).await);

        let err = backend.create_payment_intent(3900).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Initialization(_)));
    }

    #[tokio::test]
    async fn test_record_purchase() {
        let app = Router::new().route(
            "/api/v1/payment/save-payment",
            post(|Json(body): Json<Value>| async move {
                if body["productId"] == "coaches" {
                    StatusCode::CREATED
                } else {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
            }),
        );
        let backend = HttpBackend::new(serve(app).await);

        backend.record_purchase(&record()).await.unwrap();

        let mut other = record();
        other.product_id = "legal".into();
        let err = backend.record_purchase(&other).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Recording(_)));
    }
}
