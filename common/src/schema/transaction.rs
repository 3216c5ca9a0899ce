use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const CURRENCY: &str = "INR";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Salary,
    CourseFee,
    Refund,
    #[default]
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Salary => "salary",
            Category::CourseFee => "course_fee",
            Category::Refund => "refund",
            Category::Other => "other",
        }
    }

    /// Human readable label, as shown on the confirmation recap.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Salary => "Salary Payment",
            Category::CourseFee => "Course Fee",
            Category::Refund => "Refund",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "salary" => Ok(Category::Salary),
            "course_fee" => Ok(Category::CourseFee),
            "refund" => Ok(Category::Refund),
            "other" => Ok(Category::Other),
            other => Err(format!(
                "unknown category `{other}`, expected one of: salary, course_fee, refund, other"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Processing,
    Success,
    Failed,
    Cancelled,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Send,
    Receive,
    Request,
}

/// A payment as submitted by the wizard. Never stored.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    #[serde(alias = "toVPA")]
    pub to_address: String,
    pub amount: f64,
    pub description: String,
    pub category: Category,
    #[serde(alias = "pin")]
    pub authorization_code: String,
}

// The authorization code must never end up in logs.
impl fmt::Debug for PaymentRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentRequest")
            .field("to_address", &self.to_address)
            .field("amount", &self.amount)
            .field("description", &self.description)
            .field("category", &self.category)
            .field("authorization_code", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub is_valid: bool,
    #[serde(default, alias = "name", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl VerificationResult {
    pub fn valid(display_name: impl Into<String>) -> Self {
        VerificationResult {
            is_valid: true,
            display_name: Some(display_name.into()),
        }
    }

    pub fn invalid() -> Self {
        VerificationResult {
            is_valid: false,
            display_name: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub id: String,
    pub transaction_id: String,
    #[serde(alias = "upiRef")]
    pub reference_number: String,
    #[serde(alias = "fromVPA")]
    pub from_address: String,
    #[serde(alias = "toVPA")]
    pub to_address: String,
    pub amount: f64,
    pub currency: String,
    pub description: String,
    pub status: TransactionStatus,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: Category,
    #[serde(alias = "timestamp")]
    pub created_timestamp: DateTime<Utc>,
    #[serde(
        default,
        alias = "completedAt",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl TransactionRecord {
    fn outgoing(from_address: &str, request: &PaymentRequest, status: TransactionStatus) -> Self {
        let now = Utc::now();
        let millis = now.timestamp_millis();
        let reference: u64 = rand::rng().random_range(0..1_000_000_000_000);

        TransactionRecord {
            id: format!("txn_{millis}"),
            transaction_id: format!("UPI{millis}"),
            reference_number: format!("{reference:012}"),
            from_address: from_address.to_string(),
            to_address: request.to_address.clone(),
            amount: request.amount,
            currency: CURRENCY.to_string(),
            description: request.description.clone(),
            status,
            kind: TransactionType::Send,
            category: request.category,
            created_timestamp: now,
            completed_timestamp: None,
            failure_reason: None,
        }
    }

    /// A freshly settled outgoing payment.
    pub fn settled(from_address: &str, request: &PaymentRequest) -> Self {
        let mut record = Self::outgoing(from_address, request, TransactionStatus::Success);
        record.completed_timestamp = Some(Utc::now());
        record
    }

    /// An outgoing payment the network refused.
    pub fn declined(from_address: &str, request: &PaymentRequest, reason: impl Into<String>) -> Self {
        let mut record = Self::outgoing(from_address, request, TransactionStatus::Failed);
        record.failure_reason = Some(reason.into());
        record
    }

    /// `completed_timestamp` iff success, `failure_reason` iff failed.
    pub fn is_consistent(&self) -> bool {
        let settled = self.status == TransactionStatus::Success;
        let failed = self.status == TransactionStatus::Failed;
        settled == self.completed_timestamp.is_some() && failed == self.failure_reason.is_some()
    }
}
