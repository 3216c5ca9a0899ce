use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_SALARY_AMOUNT: f64 = 100_000.0;
pub const MAX_COURSE_AMOUNT: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethodKind {
    CreditCard,
    DebitCard,
    BankTransfer,
    Paypal,
    Stripe,
}

impl FromStr for PaymentMethodKind {
    type Err = PaymentFormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit_card" => Ok(PaymentMethodKind::CreditCard),
            "debit_card" => Ok(PaymentMethodKind::DebitCard),
            "bank_transfer" => Ok(PaymentMethodKind::BankTransfer),
            "paypal" => Ok(PaymentMethodKind::Paypal),
            "stripe" => Ok(PaymentMethodKind::Stripe),
            other => Err(PaymentFormError::UnknownMethod(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: PaymentMethodKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last4: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_month: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_year: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder_name: Option<String>,
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryPayment {
    pub id: String,
    pub teacher_id: String,
    pub teacher_name: String,
    pub amount: f64,
    pub currency: String,
    pub payment_date: NaiveDate,
    pub payment_method: String,
    pub status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub reference: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePayment {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub course_id: String,
    pub course_name: String,
    pub teacher_id: String,
    pub teacher_name: String,
    pub amount: f64,
    pub currency: String,
    pub payment_date: NaiveDate,
    pub payment_method: PaymentMethod,
    pub status: PaymentStatus,
    pub reference: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStats {
    pub total_salary_payments: u32,
    pub total_course_payments: u32,
    pub pending_payments: u32,
    pub completed_payments: u32,
    pub failed_payments: u32,
    pub monthly_revenue: f64,
    pub monthly_expenses: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpiStats {
    pub total_transactions: u32,
    pub successful_transactions: u32,
    pub failed_transactions: u32,
    pub total_amount_sent: f64,
    pub total_amount_received: f64,
    pub monthly_transactions: u32,
    pub average_transaction_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PaymentFormError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("Amount must be greater than 0 and cannot exceed {max}")]
    AmountOutOfRange { max: f64 },
    #[error("Unknown payment method `{0}`")]
    UnknownMethod(String),
}

fn required(value: &Option<String>, name: &'static str) -> Result<String, PaymentFormError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(PaymentFormError::Missing(name)),
    }
}

fn amount_within(amount: Option<f64>, max: f64) -> Result<f64, PaymentFormError> {
    let amount = amount.ok_or(PaymentFormError::Missing("amount"))?;
    if !amount.is_finite() || amount < 0.01 || amount > max {
        return Err(PaymentFormError::AmountOutOfRange { max });
    }
    Ok(amount)
}

/// `<prefix>-<year>-<last three digits of the epoch millis>`
fn reference(prefix: &str, now: DateTime<Utc>) -> String {
    format!("{prefix}-{}-{:03}", now.year(), now.timestamp_millis().rem_euclid(1000))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryPaymentForm {
    pub teacher_id: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub description: Option<String>,
    pub payment_method: Option<String>,
}

impl SalaryPaymentForm {
    /// Builds the pending payment the portal hands back; nothing is stored.
    pub fn into_pending(self) -> Result<SalaryPayment, PaymentFormError> {
        let teacher_id = required(&self.teacher_id, "teacherId")?;
        let amount = amount_within(self.amount, MAX_SALARY_AMOUNT)?;
        let currency = required(&self.currency, "currency")?;
        let payment_method = required(&self.payment_method, "paymentMethod")?;
        let now = Utc::now();

        Ok(SalaryPayment {
            id: format!("sal_{}", now.timestamp_millis()),
            teacher_id,
            teacher_name: "Selected Teacher".to_string(),
            amount,
            currency,
            payment_date: now.date_naive(),
            payment_method,
            status: PaymentStatus::Pending,
            description: self.description.filter(|d| !d.trim().is_empty()),
            reference: reference("SAL", now),
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePaymentForm {
    pub student_id: Option<String>,
    pub course_id: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub description: Option<String>,
    pub payment_method: Option<String>,
}

impl CoursePaymentForm {
    pub fn into_pending(self) -> Result<CoursePayment, PaymentFormError> {
        let student_id = required(&self.student_id, "studentId")?;
        let course_id = required(&self.course_id, "courseId")?;
        let amount = amount_within(self.amount, MAX_COURSE_AMOUNT)?;
        let currency = required(&self.currency, "currency")?;
        let kind: PaymentMethodKind = required(&self.payment_method, "paymentMethod")?.parse()?;
        let now = Utc::now();

        Ok(CoursePayment {
            id: format!("crs_{}", now.timestamp_millis()),
            student_id,
            student_name: "Selected Student".to_string(),
            course_id,
            course_name: "Selected Course".to_string(),
            teacher_id: "teacher_id".to_string(),
            teacher_name: "Course Teacher".to_string(),
            amount,
            currency,
            payment_date: now.date_naive(),
            payment_method: PaymentMethod {
                id: format!("pm_{}", now.timestamp_millis()),
                kind,
                last4: None,
                brand: None,
                expiry_month: None,
                expiry_year: None,
                holder_name: Some("Payment Holder".to_string()),
                is_default: false,
            },
            status: PaymentStatus::Pending,
            reference: reference("CRS", now),
            created_at: now,
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn salary_form() -> SalaryPaymentForm {
        SalaryPaymentForm {
            teacher_id: Some("1".to_string()),
            amount: Some(3200.0),
            currency: Some("USD".to_string()),
            description: Some("Monthly salary".to_string()),
            payment_method: Some("bank_transfer".to_string()),
        }
    }

    #[test]
    fn salary_form_becomes_pending_payment() {
        let payment = salary_form().into_pending().unwrap();
        assert_eq!(payment.status, PaymentStatus::Pending);
        assert!(payment.id.starts_with("sal_"));
        assert!(payment.reference.starts_with("SAL-"));
        assert_eq!(payment.reference.rsplit('-').next().map(str::len), Some(3));
    }

    #[test]
    fn salary_form_requires_teacher() {
        let form = SalaryPaymentForm {
            teacher_id: Some("  ".to_string()),
            ..salary_form()
        };
        assert_eq!(form.into_pending(), Err(PaymentFormError::Missing("teacherId")));
    }

    #[test]
    fn course_amount_is_capped_lower_than_salary() {
        let form = CoursePaymentForm {
            student_id: Some("1".to_string()),
            course_id: Some("1".to_string()),
            amount: Some(10_000.01),
            currency: Some("USD".to_string()),
            description: None,
            payment_method: Some("credit_card".to_string()),
        };
        assert_eq!(
            form.into_pending(),
            Err(PaymentFormError::AmountOutOfRange { max: MAX_COURSE_AMOUNT })
        );
    }

    #[test]
    fn course_form_rejects_unknown_method() {
        let form = CoursePaymentForm {
            student_id: Some("1".to_string()),
            course_id: Some("1".to_string()),
            amount: Some(480.0),
            currency: Some("USD".to_string()),
            description: None,
            payment_method: Some("cash".to_string()),
        };
        assert!(matches!(form.into_pending(), Err(PaymentFormError::UnknownMethod(m)) if m == "cash"));
    }
}
