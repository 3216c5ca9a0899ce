//! The UPI "send money" flow as a state machine.
//!
//! ```text
//! details --advance--> confirm --advance--> pin --submit--> processing --> success
//!    ^                    |  ^               |                   |
//!    +-------back---------+  +-----back------+  <---- failure ----+
//! ```
//!
//! The wizard owns its form state and talks to the network only through a
//! [`PaymentGateway`]. Every operation takes `&mut self`, so a wizard never
//! has more than one submission in flight.

use std::fmt;

use thiserror::Error;

use crate::gateway::{GatewayError, PaymentGateway};
use crate::helpers::{format_amount, mask_address};
use crate::schema::{Category, PaymentRequest, TransactionRecord, VerificationResult};
use crate::validation::{
    FieldErrors, is_valid_vpa, validate_authorization_code, validate_details,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Details,
    Confirm,
    Pin,
    Processing,
    Success,
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WizardStep::Details => "details",
            WizardStep::Confirm => "confirm",
            WizardStep::Pin => "pin",
            WizardStep::Processing => "processing",
            WizardStep::Success => "success",
        };
        f.write_str(name)
    }
}

/// What the details step collects. `Default` is the empty form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentDraft {
    pub recipient: String,
    pub amount: Option<f64>,
    pub category: Category,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Destructive,
}

/// A message for the user, queued until the caller drains it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub description: String,
}

impl Notice {
    fn success(title: &str, description: String) -> Self {
        Notice {
            kind: NoticeKind::Success,
            title: title.to_string(),
            description,
        }
    }

    fn destructive(title: &str, description: String) -> Self {
        Notice {
            kind: NoticeKind::Destructive,
            title: title.to_string(),
            description,
        }
    }
}

/// Handed out when a verification starts; only the latest ticket is honoured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationTicket {
    generation: u64,
    address: String,
}

impl VerificationTicket {
    pub fn address(&self) -> &str {
        &self.address
    }
}

/// Read-only recap shown on the confirm and pin steps.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentSummary {
    pub recipient: String,
    pub display_name: Option<String>,
    pub amount: String,
    pub category: &'static str,
    pub description: String,
}

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("cannot {action} during the {step} step")]
    WrongStep {
        action: &'static str,
        step: WizardStep,
    },
    #[error("{0}")]
    InvalidFields(FieldErrors),
    #[error("the recipient's UPI ID has not been verified")]
    RecipientNotVerified,
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

struct Verified {
    address: String,
    result: VerificationResult,
}

// Puts the wizard in `processing` for as long as it lives. Dropping it
// without settling (the submission future was dropped) returns to `pin`.
struct InFlight<'a> {
    step: &'a mut WizardStep,
}

impl<'a> InFlight<'a> {
    fn enter(step: &'a mut WizardStep) -> Self {
        *step = WizardStep::Processing;
        InFlight { step }
    }

    fn settle(self, next: WizardStep) {
        *self.step = next;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if *self.step == WizardStep::Processing {
            *self.step = WizardStep::Pin;
        }
    }
}

type CancelCallback = Box<dyn FnMut() + Send>;
type SuccessCallback = Box<dyn FnMut(&TransactionRecord) + Send>;

/// Notices accumulate until [`PaymentWizard::take_notices`] drains them, so
/// callers must drain after each operation.
pub struct PaymentWizard<G> {
    gateway: G,
    initial: PaymentDraft,
    draft: PaymentDraft,
    authorization_code: String,
    step: WizardStep,
    verified: Option<Verified>,
    generation: u64,
    pending_verification: Option<u64>,
    transaction: Option<TransactionRecord>,
    notices: Vec<Notice>,
    on_cancel: Option<CancelCallback>,
    on_success: Option<SuccessCallback>,
}

impl<G: PaymentGateway> PaymentWizard<G> {
    pub fn new(gateway: G) -> Self {
        Self::with_draft(gateway, PaymentDraft::default())
    }

    /// Starts from a prefilled form. Resets return to this draft.
    pub fn with_draft(gateway: G, draft: PaymentDraft) -> Self {
        PaymentWizard {
            gateway,
            initial: draft.clone(),
            draft,
            authorization_code: String::new(),
            step: WizardStep::Details,
            verified: None,
            generation: 0,
            pending_verification: None,
            transaction: None,
            notices: Vec::new(),
            on_cancel: None,
            on_success: None,
        }
    }

    /// Called once every time the flow is cancelled.
    pub fn on_cancel(mut self, callback: impl FnMut() + Send + 'static) -> Self {
        self.on_cancel = Some(Box::new(callback));
        self
    }

    /// Called with the settled transaction when the caller finishes the flow.
    pub fn on_success(mut self, callback: impl FnMut(&TransactionRecord) + Send + 'static) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn draft(&self) -> &PaymentDraft {
        &self.draft
    }

    pub fn has_authorization_code(&self) -> bool {
        !self.authorization_code.is_empty()
    }

    /// Latest verification outcome for the address currently entered.
    pub fn verification(&self) -> Option<&VerificationResult> {
        self.verified
            .as_ref()
            .filter(|v| v.address == self.draft.recipient)
            .map(|v| &v.result)
    }

    pub fn is_verifying(&self) -> bool {
        self.pending_verification == Some(self.generation)
    }

    pub fn transaction(&self) -> Option<&TransactionRecord> {
        self.transaction.as_ref()
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn require(&self, step: WizardStep, action: &'static str) -> Result<(), WizardError> {
        if self.step == step {
            Ok(())
        } else {
            Err(WizardError::WrongStep {
                action,
                step: self.step,
            })
        }
    }

    // Invalidates any in-flight verification.
    fn supersede(&mut self) {
        self.generation += 1;
        self.pending_verification = None;
    }

    pub fn set_recipient(&mut self, recipient: impl Into<String>) -> Result<(), WizardError> {
        self.require(WizardStep::Details, "edit the recipient")?;
        let recipient = recipient.into();
        if recipient != self.draft.recipient {
            self.draft.recipient = recipient;
            self.verified = None;
            self.supersede();
        }
        Ok(())
    }

    pub fn set_amount(&mut self, amount: f64) -> Result<(), WizardError> {
        self.require(WizardStep::Details, "edit the amount")?;
        self.draft.amount = Some(amount);
        Ok(())
    }

    pub fn set_category(&mut self, category: Category) -> Result<(), WizardError> {
        self.require(WizardStep::Details, "edit the category")?;
        self.draft.category = category;
        Ok(())
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> Result<(), WizardError> {
        self.require(WizardStep::Details, "edit the description")?;
        self.draft.description = description.into();
        Ok(())
    }

    pub fn set_authorization_code(&mut self, code: impl Into<String>) -> Result<(), WizardError> {
        self.require(WizardStep::Pin, "enter the UPI PIN")?;
        self.authorization_code = code.into();
        Ok(())
    }

    /// Inline errors for the details step as currently filled in.
    pub fn field_errors(&self) -> FieldErrors {
        validate_details(
            &self.draft.recipient,
            self.draft.amount,
            &self.draft.description,
        )
        .err()
        .unwrap_or_default()
    }

    /// Starts verifying the entered recipient.
    ///
    /// Returns `None` without contacting anyone when the address is malformed
    /// (clearing any earlier result) or when the wizard is past `details`.
    /// The ticket supersedes every ticket handed out before it.
    pub fn begin_verification(&mut self) -> Option<VerificationTicket> {
        if self.step != WizardStep::Details {
            return None;
        }

        self.supersede();
        if !is_valid_vpa(&self.draft.recipient) {
            self.verified = None;
            return None;
        }

        self.pending_verification = Some(self.generation);
        Some(VerificationTicket {
            generation: self.generation,
            address: self.draft.recipient.clone(),
        })
    }

    /// Applies a verification outcome. Returns false, changing nothing, when
    /// the ticket has been superseded.
    pub fn complete_verification(
        &mut self,
        ticket: VerificationTicket,
        outcome: Result<VerificationResult, GatewayError>,
    ) -> bool {
        if ticket.generation != self.generation || self.step != WizardStep::Details {
            log::debug!(
                "Discarding stale verification for {}",
                mask_address(&ticket.address)
            );
            return false;
        }
        self.pending_verification = None;

        match outcome {
            Ok(result) => {
                if !result.is_valid {
                    self.notices.push(Notice::destructive(
                        "Invalid UPI ID",
                        "The UPI ID you entered is not valid or doesn't exist.".to_string(),
                    ));
                }
                self.verified = Some(Verified {
                    address: ticket.address,
                    result,
                });
            }
            Err(err) => {
                log::warn!(
                    "Verification of {} failed: {}",
                    mask_address(&ticket.address),
                    err
                );
                self.verified = None;
            }
        }
        true
    }

    /// Verifies the entered recipient (what leaving the address field does).
    pub async fn verify_recipient(&mut self) -> Option<&VerificationResult> {
        let ticket = self.begin_verification()?;
        let outcome = self.gateway.verify_address(ticket.address()).await;
        self.complete_verification(ticket, outcome);
        self.verification()
    }

    /// Moves `details -> confirm` or `confirm -> pin`.
    pub fn advance(&mut self) -> Result<WizardStep, WizardError> {
        match self.step {
            WizardStep::Details => {
                validate_details(
                    &self.draft.recipient,
                    self.draft.amount,
                    &self.draft.description,
                )
                .map_err(WizardError::InvalidFields)?;
                if !self.verification().is_some_and(|v| v.is_valid) {
                    return Err(WizardError::RecipientNotVerified);
                }
                self.step = WizardStep::Confirm;
            }
            WizardStep::Confirm => self.step = WizardStep::Pin,
            step => {
                return Err(WizardError::WrongStep {
                    action: "advance",
                    step,
                });
            }
        }
        log::debug!("Payment wizard moved to {}", self.step);
        Ok(self.step)
    }

    /// Moves `confirm -> details` or `pin -> confirm`. Verification is kept.
    pub fn back(&mut self) -> Result<WizardStep, WizardError> {
        self.step = match self.step {
            WizardStep::Confirm => WizardStep::Details,
            WizardStep::Pin => WizardStep::Confirm,
            step => {
                return Err(WizardError::WrongStep {
                    action: "go back",
                    step,
                });
            }
        };
        Ok(self.step)
    }

    pub fn summary(&self) -> Option<PaymentSummary> {
        if self.step == WizardStep::Details {
            return None;
        }
        Some(PaymentSummary {
            recipient: self.draft.recipient.clone(),
            display_name: self.verification().and_then(|v| v.display_name.clone()),
            amount: format_amount(self.draft.amount.unwrap_or_default()),
            category: self.draft.category.label(),
            description: self.draft.description.clone(),
        })
    }

    /// Sends the payment with the entered code.
    ///
    /// On success the wizard rests in `success`. On any failure it returns to
    /// `pin` with the code cleared and a notice describing what went wrong.
    pub async fn submit(&mut self) -> Result<&TransactionRecord, WizardError> {
        self.require(WizardStep::Pin, "submit")?;
        validate_authorization_code(&self.authorization_code)
            .map_err(|e| WizardError::InvalidFields(e.into()))?;
        let request = self.request()?;

        let in_flight = InFlight::enter(&mut self.step);
        let outcome = self.gateway.initiate_payment(&request).await;

        match outcome {
            Ok(transaction) => {
                in_flight.settle(WizardStep::Success);
                self.notices.push(Notice::success(
                    "Payment Successful!",
                    format!(
                        "{} sent to {}",
                        format_amount(transaction.amount),
                        transaction.to_address
                    ),
                ));
                Ok(&*self.transaction.insert(transaction))
            }
            Err(err) => {
                in_flight.settle(WizardStep::Pin);
                self.authorization_code.clear();
                let description = match &err {
                    GatewayError::Declined { .. } | GatewayError::Rejected(_) => err.to_string(),
                    GatewayError::Transport(_) => {
                        "Something went wrong. Please try again.".to_string()
                    }
                };
                log::warn!(
                    "Payment to {} failed: {}",
                    mask_address(&request.to_address),
                    err
                );
                self.notices
                    .push(Notice::destructive("Payment Failed", description));
                Err(err.into())
            }
        }
    }

    fn request(&self) -> Result<PaymentRequest, WizardError> {
        validate_details(
            &self.draft.recipient,
            self.draft.amount,
            &self.draft.description,
        )
        .map_err(WizardError::InvalidFields)?;

        Ok(PaymentRequest {
            to_address: self.draft.recipient.clone(),
            amount: self.draft.amount.unwrap_or_default(),
            description: self.draft.description.clone(),
            category: self.draft.category,
            authorization_code: self.authorization_code.clone(),
        })
    }

    /// Leaves the flow from any step except `processing`.
    pub fn cancel(&mut self) -> Result<(), WizardError> {
        if self.step == WizardStep::Processing {
            return Err(WizardError::WrongStep {
                action: "cancel",
                step: self.step,
            });
        }
        self.reset();
        if let Some(callback) = self.on_cancel.as_mut() {
            callback();
        }
        Ok(())
    }

    /// Closes a successful flow: hands the transaction to the success
    /// callback, resets the form and returns the transaction.
    pub fn finish(&mut self) -> Result<TransactionRecord, WizardError> {
        self.require(WizardStep::Success, "finish")?;
        let transaction = self
            .transaction
            .take()
            .ok_or(WizardError::WrongStep {
                action: "finish",
                step: self.step,
            })?;
        if let Some(callback) = self.on_success.as_mut() {
            callback(&transaction);
        }
        self.reset();
        Ok(transaction)
    }

    fn reset(&mut self) {
        self.draft = self.initial.clone();
        self.authorization_code.clear();
        self.step = WizardStep::Details;
        self.verified = None;
        self.transaction = None;
        self.supersede();
    }
}
