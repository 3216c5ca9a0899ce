use std::time::Duration;

use anyhow::bail;
use async_trait::async_trait;
use rand::Rng;

use super::{GatewayError, PaymentGateway};
use crate::helpers::{format_amount, mask_address};
use crate::schema::{PaymentRequest, TransactionRecord, VerificationResult};
use crate::validation::is_valid_vpa;

pub const DECLINE_REASON: &str = "Transaction declined by bank";

pub const DISPLAY_NAMES: [&str; 8] = [
    "Sarah Johnson",
    "Michael Chen",
    "Emily Rodriguez",
    "David Wilson",
    "Jessica Thompson",
    "Robert Kumar",
    "Lisa Patel",
    "James Anderson",
];

/// Artificial response delay, drawn uniformly from `min..=max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latency {
    min: Duration,
    max: Duration,
}

impl Latency {
    pub fn new(min: Duration, max: Duration) -> anyhow::Result<Self> {
        if min > max {
            bail!(
                "Minimum delay {}ms exceeds maximum delay {}ms",
                min.as_millis(),
                max.as_millis()
            );
        }
        Ok(Latency { min, max })
    }

    pub fn from_millis(min: u64, max: u64) -> anyhow::Result<Self> {
        Self::new(Duration::from_millis(min), Duration::from_millis(max))
    }

    pub fn none() -> Self {
        Latency {
            min: Duration::ZERO,
            max: Duration::ZERO,
        }
    }

    pub fn sample(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        Duration::from_millis(rand::rng().random_range(min..=max))
    }

    pub async fn pause(&self) {
        let wait = self.sample();
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }
}

impl Default for Latency {
    fn default() -> Self {
        Latency {
            min: Duration::from_millis(250),
            max: Duration::from_millis(2000),
        }
    }
}

/// Probabilities the simulated network answers favourably.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationRates {
    verification: f64,
    payment: f64,
}

impl SimulationRates {
    pub fn new(verification: f64, payment: f64) -> anyhow::Result<Self> {
        for (name, rate) in [("verification", verification), ("payment", payment)] {
            if !(0.0..=1.0).contains(&rate) {
                bail!("The {name} success rate must be between 0 and 1, got {rate}");
            }
        }
        Ok(SimulationRates {
            verification,
            payment,
        })
    }

    pub fn verification(&self) -> f64 {
        self.verification
    }

    pub fn payment(&self) -> f64 {
        self.payment
    }
}

impl Default for SimulationRates {
    fn default() -> Self {
        SimulationRates {
            verification: 0.85,
            payment: 0.90,
        }
    }
}

/// Stand-in for a real UPI network: every answer is a coin flip.
pub struct SimulatedGateway {
    from_address: String,
    rates: SimulationRates,
    latency: Latency,
}

impl SimulatedGateway {
    pub fn new(from_address: impl Into<String>, rates: SimulationRates, latency: Latency) -> Self {
        SimulatedGateway {
            from_address: from_address.into(),
            rates,
            latency,
        }
    }

    pub fn from_address(&self) -> &str {
        &self.from_address
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn verify_address(&self, address: &str) -> Result<VerificationResult, GatewayError> {
        self.latency.pause().await;

        if !is_valid_vpa(address) {
            log::debug!("Rejecting malformed address {}", mask_address(address));
            return Ok(VerificationResult::invalid());
        }

        let result = {
            let mut rng = rand::rng();
            if rng.random_bool(self.rates.verification) {
                VerificationResult::valid(DISPLAY_NAMES[rng.random_range(0..DISPLAY_NAMES.len())])
            } else {
                VerificationResult::invalid()
            }
        };

        log::info!(
            "Verified {}: valid={}",
            mask_address(address),
            result.is_valid
        );
        Ok(result)
    }

    async fn initiate_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<TransactionRecord, GatewayError> {
        request
            .validate()
            .map_err(|errors| GatewayError::Rejected(errors.to_string()))?;

        self.latency.pause().await;

        let settled = rand::rng().random_bool(self.rates.payment);
        if settled {
            let record = TransactionRecord::settled(&self.from_address, request);
            log::info!(
                "Payment {} of {} to {} settled",
                record.transaction_id,
                format_amount(record.amount),
                mask_address(&record.to_address)
            );
            Ok(record)
        } else {
            let record = TransactionRecord::declined(&self.from_address, request, DECLINE_REASON);
            log::warn!(
                "Payment {} of {} to {} declined",
                record.transaction_id,
                format_amount(record.amount),
                mask_address(&record.to_address)
            );
            Err(GatewayError::Declined {
                transaction: Box::new(record),
            })
        }
    }
}
