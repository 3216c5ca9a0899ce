use anyhow::Context;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::{GatewayError, PaymentGateway};
use crate::schema::{PaymentRequest, TransactionRecord, VerificationResult};

pub const VERIFY_ADDRESS_PATH: &str = "/api/upi/verify-vpa";
pub const PAYMENTS_PATH: &str = "/api/upi/payments";

#[derive(Serialize)]
struct VerifyBody<'a> {
    address: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    transaction: Option<TransactionRecord>,
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Transport(err.to_string())
    }
}

/// Talks to a running portal over HTTP.
///
/// No request timeout is configured: a slow portal leaves the caller waiting.
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let user_agent = format!("tutor-portal/{}", env!("CARGO_PKG_VERSION"));
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(HttpGateway {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turns a non-success response into the matching error.
    async fn failure(response: reqwest::Response) -> GatewayError {
        let status = response.status();
        let body = response.json::<ErrorBody>().await.ok();

        match (status, body) {
            (StatusCode::BAD_REQUEST, Some(ErrorBody { transaction: Some(tx), .. })) => {
                GatewayError::Declined {
                    transaction: Box::new(tx),
                }
            }
            (s, Some(ErrorBody { error, .. })) if s.is_client_error() => GatewayError::Rejected(error),
            (s, body) => GatewayError::Transport(format!(
                "portal answered {s}{}",
                body.map(|b| format!(": {}", b.error)).unwrap_or_default()
            )),
        }
    }
}

#[async_trait]
impl PaymentGateway for HttpGateway {
    async fn verify_address(&self, address: &str) -> Result<VerificationResult, GatewayError> {
        let response = self
            .client
            .post(self.url(VERIFY_ADDRESS_PATH))
            .json(&VerifyBody { address })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::failure(response).await);
        }
        Ok(response.json().await?)
    }

    async fn initiate_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<TransactionRecord, GatewayError> {
        let response = self
            .client
            .post(self.url(PAYMENTS_PATH))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::failure(response).await);
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalised() {
        let gateway = HttpGateway::new("http://127.0.0.1:8080/").unwrap();
        assert_eq!(
            gateway.url(VERIFY_ADDRESS_PATH),
            "http://127.0.0.1:8080/api/upi/verify-vpa"
        );
    }

    #[tokio::test]
    async fn unreachable_portal_is_a_transport_failure() {
        let gateway = HttpGateway::new("http://127.0.0.1:9").unwrap();
        let err = gateway.verify_address("teacher@paytm").await.unwrap_err();
        assert!(matches!(err, GatewayError::Transport(_)));
    }
}
