mod http;
mod simulated;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::schema::{PaymentRequest, TransactionRecord, VerificationResult};

pub use http::HttpGateway;
pub use simulated::{DECLINE_REASON, DISPLAY_NAMES, Latency, SimulatedGateway, SimulationRates};

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The network refused the payment. The record carries the reason.
    #[error("{}", .transaction.failure_reason.as_deref().unwrap_or("Payment declined"))]
    Declined { transaction: Box<TransactionRecord> },
    /// The request was malformed and never reached the network.
    #[error("{0}")]
    Rejected(String),
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Payment network port used by the wizard and the portal.
///
/// Implementations must be `Send + Sync`; one instance is shared by every
/// request the portal serves.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Looks up `address` and reports whether it can receive money.
    async fn verify_address(&self, address: &str) -> Result<VerificationResult, GatewayError>;

    /// Sends one payment. Never retried by the implementation.
    async fn initiate_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<TransactionRecord, GatewayError>;
}

#[async_trait]
impl<G: PaymentGateway + ?Sized> PaymentGateway for Arc<G> {
    async fn verify_address(&self, address: &str) -> Result<VerificationResult, GatewayError> {
        (**self).verify_address(address).await
    }

    async fn initiate_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<TransactionRecord, GatewayError> {
        (**self).initiate_payment(request).await
    }
}
