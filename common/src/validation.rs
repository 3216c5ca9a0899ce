use std::fmt;

use fancy_regex::Regex;
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::schema::PaymentRequest;

pub const MAX_ADDRESS_LEN: usize = 50;
pub const MIN_AMOUNT: f64 = 1.0;
pub const MAX_AMOUNT: f64 = 100_000.0;
pub const MAX_DESCRIPTION_LEN: usize = 100;
pub const MIN_CODE_LEN: usize = 4;
pub const MAX_CODE_LEN: usize = 6;

/// Returns true iff `address` looks like `localpart@domain`.
pub fn is_valid_vpa(address: &str) -> bool {
    static RE: Lazy<Option<Regex>> =
        Lazy::new(|| Regex::new(r"^[A-Za-z0-9._-]+@[A-Za-z0-9.-]+$").ok());
    match &*RE {
        Some(re) => matches!(re.is_match(address), Ok(true)),
        None => {
            log::error!("VPA regex failed to compile. Rejecting all addresses.");
            false
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentField {
    Recipient,
    Amount,
    Description,
    AuthorizationCode,
}

impl fmt::Display for PaymentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PaymentField::Recipient => "recipient",
            PaymentField::Amount => "amount",
            PaymentField::Description => "description",
            PaymentField::AuthorizationCode => "authorization code",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: PaymentField,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for FieldError {}

/// Per-field messages collected from one validation pass, at most one per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    fn check(&mut self, field: PaymentField, outcome: Result<(), &'static str>) {
        if let Err(message) = outcome {
            self.0.push(FieldError {
                field,
                message: message.to_string(),
            });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: PaymentField) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl From<FieldError> for FieldErrors {
    fn from(error: FieldError) -> Self {
        FieldErrors(vec![error])
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

fn check_recipient(address: &str) -> Result<(), &'static str> {
    if address.is_empty() {
        return Err("UPI ID is required");
    }
    if !is_valid_vpa(address) {
        return Err("Enter a valid UPI ID (e.g. user@paytm)");
    }
    if address.chars().count() > MAX_ADDRESS_LEN {
        return Err("UPI ID is too long");
    }
    Ok(())
}

fn check_amount(amount: Option<f64>) -> Result<(), &'static str> {
    let Some(amount) = amount else {
        return Err("Amount is required");
    };
    if amount.is_nan() || amount < MIN_AMOUNT {
        return Err("Amount must be at least ₹1");
    }
    if amount > MAX_AMOUNT {
        return Err("Amount cannot exceed ₹1,00,000");
    }
    let paise = amount * 100.0;
    if (paise - paise.round()).abs() > 1e-6 {
        return Err("Amount can have at most 2 decimal places");
    }
    Ok(())
}

fn check_description(description: &str) -> Result<(), &'static str> {
    if description.trim().is_empty() {
        return Err("Description is required");
    }
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err("Description cannot exceed 100 characters");
    }
    Ok(())
}

fn check_code(code: &str) -> Result<(), &'static str> {
    if !(MIN_CODE_LEN..=MAX_CODE_LEN).contains(&code.chars().count()) {
        return Err("UPI PIN must be 4-6 digits");
    }
    if !code.chars().all(|c| c.is_ascii_digit()) {
        return Err("UPI PIN must contain only numbers");
    }
    Ok(())
}

/// Validates everything the details step collects.
pub fn validate_details(
    recipient: &str,
    amount: Option<f64>,
    description: &str,
) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    errors.check(PaymentField::Recipient, check_recipient(recipient));
    errors.check(PaymentField::Amount, check_amount(amount));
    errors.check(PaymentField::Description, check_description(description));
    errors.into_result()
}

pub fn validate_authorization_code(code: &str) -> Result<(), FieldError> {
    check_code(code).map_err(|message| FieldError {
        field: PaymentField::AuthorizationCode,
        message: message.to_string(),
    })
}

impl PaymentRequest {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        errors.check(PaymentField::Recipient, check_recipient(&self.to_address));
        errors.check(PaymentField::Amount, check_amount(Some(self.amount)));
        errors.check(PaymentField::Description, check_description(&self.description));
        errors.check(PaymentField::AuthorizationCode, check_code(&self.authorization_code));
        errors.into_result()
    }
}
