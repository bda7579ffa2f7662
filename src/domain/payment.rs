//! Fee gate and mock payment state machine.
//!
//! No real processor is integrated: a validated submission always settles
//! as succeeded. The state machine exists so the transition rules (cancel
//! legality, validation bounce, single registration per success) hold in
//! one place instead of being re-derived by every caller.

use chrono::{DateTime, Duration, Utc};

use crate::models::Game;

/// How long a submitted payment may sit unresolved before it fails.
pub const PROCESSING_TIMEOUT_SECS: i64 = 30;

/// Which path a registration attempt must take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationPath {
    /// Free game (or zero fee): register directly, participant paid.
    ImmediateRegister,
    /// Fee game: the payment flow must succeed before registration.
    RequirePayment,
}

/// Decide the registration path for a game.
pub fn registration_path(game: &Game) -> RegistrationPath {
    if !game.has_fee || game.fee <= 0.0 {
        RegistrationPath::ImmediateRegister
    } else {
        RegistrationPath::RequirePayment
    }
}

/// Supported payment methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Credit,
    Paypal,
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Credit
    }
}

/// Payment form fields as submitted by the actor.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct PaymentForm {
    #[serde(default)]
    pub method: PaymentMethod,
    #[serde(default)]
    pub card_number: String,
    #[serde(default)]
    pub card_name: String,
    #[serde(default)]
    pub card_expiry: String,
    #[serde(default)]
    pub card_cvc: String,
}

/// States of one payment attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentState {
    Idle,
    CollectingDetails,
    Processing { started_at: DateTime<Utc> },
    Succeeded,
    Failed,
}

/// Errors raised by illegal transitions or form validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentError {
    /// The requested transition is not legal from the current state.
    InvalidState,
    /// A form field failed validation; the attempt returns to
    /// `CollectingDetails` so the actor can correct and resubmit.
    Validation(String),
    /// Cancellation is rejected while the attempt is processing.
    CancelWhileProcessing,
}

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentError::InvalidState => write!(f, "transition not allowed in current state"),
            PaymentError::Validation(msg) => write!(f, "{}", msg),
            PaymentError::CancelWhileProcessing => {
                write!(f, "cannot cancel while payment is processing")
            }
        }
    }
}

impl std::error::Error for PaymentError {}

/// One registration attempt's payment lifecycle.
#[derive(Debug, Clone)]
pub struct PaymentAttempt {
    state: PaymentState,
}

impl Default for PaymentAttempt {
    fn default() -> Self {
        Self::new()
    }
}

impl PaymentAttempt {
    pub fn new() -> Self {
        Self {
            state: PaymentState::Idle,
        }
    }

    pub fn state(&self) -> &PaymentState {
        &self.state
    }

    /// Open the payment form. Legal from `Idle` and, for retries, `Failed`.
    pub fn open_form(&mut self) -> Result<(), PaymentError> {
        match self.state {
            PaymentState::Idle | PaymentState::Failed => {
                self.state = PaymentState::CollectingDetails;
                Ok(())
            }
            _ => Err(PaymentError::InvalidState),
        }
    }

    /// Submit the form. Validation failures keep the attempt in
    /// `CollectingDetails`; a valid form enters `Processing`.
    pub fn submit(&mut self, form: &PaymentForm, now: DateTime<Utc>) -> Result<(), PaymentError> {
        if self.state != PaymentState::CollectingDetails {
            return Err(PaymentError::InvalidState);
        }
        validate_form(form)?;
        self.state = PaymentState::Processing { started_at: now };
        Ok(())
    }

    /// Resolve a processing attempt. Settlement is unconditional success
    /// unless the attempt outlived the processing deadline.
    pub fn resolve(&mut self, now: DateTime<Utc>) -> Result<&PaymentState, PaymentError> {
        match self.state {
            PaymentState::Processing { started_at } => {
                if now - started_at > Duration::seconds(PROCESSING_TIMEOUT_SECS) {
                    self.state = PaymentState::Failed;
                } else {
                    self.state = PaymentState::Succeeded;
                }
                Ok(&self.state)
            }
            _ => Err(PaymentError::InvalidState),
        }
    }

    /// Cancel the attempt. Legal only before submission.
    pub fn cancel(&mut self) -> Result<(), PaymentError> {
        match self.state {
            PaymentState::Idle | PaymentState::CollectingDetails => {
                self.state = PaymentState::Idle;
                Ok(())
            }
            PaymentState::Processing { .. } => Err(PaymentError::CancelWhileProcessing),
            _ => Err(PaymentError::InvalidState),
        }
    }
}

/// Validate the submitted form against the payment dialog's field rules.
fn validate_form(form: &PaymentForm) -> Result<(), PaymentError> {
    // The alternate method hands off to an external flow; no card fields.
    if form.method == PaymentMethod::Paypal {
        return Ok(());
    }

    let digits: String = form.card_number.chars().filter(|c| !c.is_whitespace()).collect();

    if digits.is_empty()
        || form.card_name.trim().is_empty()
        || form.card_expiry.is_empty()
        || form.card_cvc.is_empty()
    {
        return Err(PaymentError::Validation("All fields are required".to_string()));
    }
    if digits.len() < 15 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(PaymentError::Validation("Invalid card number".to_string()));
    }
    if form.card_expiry.len() != 5 {
        return Err(PaymentError::Validation(
            "Invalid expiration date".to_string(),
        ));
    }
    if form.card_cvc.len() < 3 {
        return Err(PaymentError::Validation("Invalid security code".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Game, GameStatus};

    fn game(has_fee: bool, fee: f64) -> Game {
        Game {
            id: "g1".to_string(),
            name: "Soccer Game at Park A".to_string(),
            date: "2025-06-01".to_string(),
            time: "10:00 AM".to_string(),
            sport: "soccer".to_string(),
            location: "Park A".to_string(),
            players: 10,
            status: GameStatus::Upcoming,
            is_public: true,
            has_fee,
            fee,
            notes: None,
            joined_players: Vec::new(),
            created_by: "manager@example.com".to_string(),
            created_at: "2025-05-25T00:00:00Z".to_string(),
            updated_at: "2025-05-25T00:00:00Z".to_string(),
            version: 1,
        }
    }

    fn valid_form() -> PaymentForm {
        PaymentForm {
            method: PaymentMethod::Credit,
            card_number: "4111 1111 1111 1111".to_string(),
            card_name: "Alice".to_string(),
            card_expiry: "12/26".to_string(),
            card_cvc: "123".to_string(),
        }
    }

    #[test]
    fn free_games_register_immediately() {
        assert_eq!(
            registration_path(&game(false, 0.0)),
            RegistrationPath::ImmediateRegister
        );
        // A fee flag with a zero fee is treated as free.
        assert_eq!(
            registration_path(&game(true, 0.0)),
            RegistrationPath::ImmediateRegister
        );
    }

    #[test]
    fn fee_games_require_payment() {
        assert_eq!(
            registration_path(&game(true, 10.0)),
            RegistrationPath::RequirePayment
        );
    }

    #[test]
    fn happy_path_reaches_succeeded() {
        // Scenario B: Idle -> CollectingDetails -> Processing -> Succeeded.
        let now = Utc::now();
        let mut attempt = PaymentAttempt::new();
        assert_eq!(*attempt.state(), PaymentState::Idle);

        attempt.open_form().unwrap();
        assert_eq!(*attempt.state(), PaymentState::CollectingDetails);

        attempt.submit(&valid_form(), now).unwrap();
        assert!(matches!(attempt.state(), PaymentState::Processing { .. }));

        let state = attempt.resolve(now).unwrap();
        assert_eq!(*state, PaymentState::Succeeded);
    }

    #[test]
    fn short_card_number_bounces_to_collecting() {
        let mut attempt = PaymentAttempt::new();
        attempt.open_form().unwrap();

        let mut form = valid_form();
        form.card_number = "4111 1111".to_string();
        let err = attempt.submit(&form, Utc::now()).unwrap_err();
        assert_eq!(err, PaymentError::Validation("Invalid card number".to_string()));
        assert_eq!(*attempt.state(), PaymentState::CollectingDetails);
    }

    #[test]
    fn missing_fields_rejected() {
        let mut attempt = PaymentAttempt::new();
        attempt.open_form().unwrap();

        let mut form = valid_form();
        form.card_name = "  ".to_string();
        let err = attempt.submit(&form, Utc::now()).unwrap_err();
        assert_eq!(
            err,
            PaymentError::Validation("All fields are required".to_string())
        );
    }

    #[test]
    fn malformed_expiry_and_cvc_rejected() {
        let mut attempt = PaymentAttempt::new();
        attempt.open_form().unwrap();

        let mut form = valid_form();
        form.card_expiry = "12/2026".to_string();
        assert_eq!(
            attempt.submit(&form, Utc::now()).unwrap_err(),
            PaymentError::Validation("Invalid expiration date".to_string())
        );

        let mut form = valid_form();
        form.card_cvc = "12".to_string();
        assert_eq!(
            attempt.submit(&form, Utc::now()).unwrap_err(),
            PaymentError::Validation("Invalid security code".to_string())
        );
    }

    #[test]
    fn paypal_skips_card_validation() {
        let mut attempt = PaymentAttempt::new();
        attempt.open_form().unwrap();

        let form = PaymentForm {
            method: PaymentMethod::Paypal,
            ..PaymentForm::default()
        };
        attempt.submit(&form, Utc::now()).unwrap();
        assert_eq!(*attempt.resolve(Utc::now()).unwrap(), PaymentState::Succeeded);
    }

    #[test]
    fn cancel_allowed_only_before_submission() {
        let mut attempt = PaymentAttempt::new();
        attempt.cancel().unwrap();

        attempt.open_form().unwrap();
        attempt.cancel().unwrap();
        assert_eq!(*attempt.state(), PaymentState::Idle);

        attempt.open_form().unwrap();
        attempt.submit(&valid_form(), Utc::now()).unwrap();
        assert_eq!(
            attempt.cancel().unwrap_err(),
            PaymentError::CancelWhileProcessing
        );
    }

    #[test]
    fn stale_processing_attempt_fails() {
        let started = Utc::now();
        let mut attempt = PaymentAttempt::new();
        attempt.open_form().unwrap();
        attempt.submit(&valid_form(), started).unwrap();

        let late = started + Duration::seconds(PROCESSING_TIMEOUT_SECS + 1);
        assert_eq!(*attempt.resolve(late).unwrap(), PaymentState::Failed);
    }

    #[test]
    fn failed_attempt_can_retry() {
        let started = Utc::now();
        let mut attempt = PaymentAttempt::new();
        attempt.open_form().unwrap();
        attempt.submit(&valid_form(), started).unwrap();
        let late = started + Duration::seconds(PROCESSING_TIMEOUT_SECS + 1);
        attempt.resolve(late).unwrap();
        assert_eq!(*attempt.state(), PaymentState::Failed);

        attempt.open_form().unwrap();
        assert_eq!(*attempt.state(), PaymentState::CollectingDetails);
        attempt.submit(&valid_form(), Utc::now()).unwrap();
        assert_eq!(*attempt.resolve(Utc::now()).unwrap(), PaymentState::Succeeded);
    }

    #[test]
    fn submit_illegal_outside_collecting() {
        let mut attempt = PaymentAttempt::new();
        assert_eq!(
            attempt.submit(&valid_form(), Utc::now()).unwrap_err(),
            PaymentError::InvalidState
        );

        attempt.open_form().unwrap();
        attempt.submit(&valid_form(), Utc::now()).unwrap();
        attempt.resolve(Utc::now()).unwrap();
        assert_eq!(
            attempt.submit(&valid_form(), Utc::now()).unwrap_err(),
            PaymentError::InvalidState
        );
    }
}
