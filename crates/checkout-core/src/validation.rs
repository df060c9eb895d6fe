//! Field Validation
//!
//! Each form field maps to one pure rule. Steps group fields (see [`Step::fields`]),
//! and a step may only be left forward once all of its fields pass.

use std::fmt;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::card;
use crate::error::{ValidationError, ValidationErrors};
use crate::model::{DURATION_OPTIONS, FormState, OrderPayload, STORAGE_OPTIONS};
use crate::stepper::Step;

/// Checkout form fields, in display order
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Duration,
    Storage,
    UpFront,
    CardNumber,
    ExpirationDate,
    Cvv,
    Email,
    TermsAgreement,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::Duration,
        Field::Storage,
        Field::UpFront,
        Field::CardNumber,
        Field::ExpirationDate,
        Field::Cvv,
        Field::Email,
        Field::TermsAgreement,
    ];

    /// Wire name, as used in the order payload
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Duration => "duration",
            Field::Storage => "storage",
            Field::UpFront => "upFront",
            Field::CardNumber => "cardNumber",
            Field::ExpirationDate => "expirationDate",
            Field::Cvv => "cvv",
            Field::Email => "email",
            Field::TermsAgreement => "termsAgreement",
        }
    }

    /// Label shown to the user
    pub fn label(&self) -> &'static str {
        match self {
            Field::Duration => "Duration of subscription",
            Field::Storage => "Amount of cloud storage (GB)",
            Field::UpFront => "Do you wish to pay upfront?",
            Field::CardNumber => "Card number",
            Field::ExpirationDate => "Expiry date",
            Field::Cvv => "Security code (CVV)",
            Field::Email => "Email address",
            Field::TermsAgreement => "I have read and agreed with the terms and conditions.",
        }
    }

    pub fn help(&self) -> Option<&'static str> {
        match self {
            Field::Duration => Some("The longer the duration, the lower the price"),
            Field::Storage => Some("With larger storage, you get more space to use backup features"),
            Field::UpFront => Some("We currently offer a 10% discount for upfront payment."),
            Field::ExpirationDate => Some("MM/YY"),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type Rule = fn(&FormState, NaiveDate) -> Result<(), ValidationError>;

/// Field → rule mapping
fn rule(field: Field) -> Rule {
    match field {
        Field::Duration => check_duration,
        Field::Storage => check_storage,
        Field::UpFront => check_up_front,
        Field::CardNumber => check_card_number,
        Field::ExpirationDate => check_expiration_date,
        Field::Cvv => check_cvv,
        Field::Email => check_email,
        Field::TermsAgreement => check_terms,
    }
}

fn check_duration(form: &FormState, _: NaiveDate) -> Result<(), ValidationError> {
    match form.duration {
        None => Err(ValidationError::Required(Field::Duration)),
        Some(months) if DURATION_OPTIONS.contains(&months) => Ok(()),
        Some(months) => Err(ValidationError::InvalidDuration(months)),
    }
}

fn check_storage(form: &FormState, _: NaiveDate) -> Result<(), ValidationError> {
    match form.storage {
        None => Err(ValidationError::Required(Field::Storage)),
        Some(gb) if STORAGE_OPTIONS.contains(&gb) => Ok(()),
        Some(gb) => Err(ValidationError::InvalidStorage(gb)),
    }
}

fn check_up_front(form: &FormState, _: NaiveDate) -> Result<(), ValidationError> {
    form.up_front
        .map(|_| ())
        .ok_or(ValidationError::Required(Field::UpFront))
}

fn check_card_number(form: &FormState, _: NaiveDate) -> Result<(), ValidationError> {
    card::validate_number(&form.card_number).map(|_| ())
}

fn check_expiration_date(form: &FormState, today: NaiveDate) -> Result<(), ValidationError> {
    card::validate_expiry(&form.expiration_date, today)
}

fn check_cvv(form: &FormState, _: NaiveDate) -> Result<(), ValidationError> {
    card::validate_cvv(&form.cvv, card::card_brand(&form.card_number))
}

fn check_email(form: &FormState, _: NaiveDate) -> Result<(), ValidationError> {
    let email = form.email.trim();
    if email.is_empty() {
        return Err(ValidationError::Required(Field::Email));
    }
    if validator::validate_email(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

fn check_terms(form: &FormState, _: NaiveDate) -> Result<(), ValidationError> {
    if form.terms_agreement {
        Ok(())
    } else {
        Err(ValidationError::TermsNotAccepted)
    }
}

/// Evaluates field rules against a form
///
/// Holds the reference date for card expiry so every rule stays a pure function
/// of its inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Validator {
    today: NaiveDate,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Validator for the current local date
    pub fn new() -> Self {
        Self::at(Local::now().date_naive())
    }

    /// Validator pinned to a given date
    pub fn at(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Run one field's rule
    pub fn check(&self, field: Field, form: &FormState) -> Result<(), ValidationError> {
        rule(field)(form, self.today)
    }

    /// Run the rules for a set of fields, collecting every failure
    pub fn check_fields(&self, fields: &[Field], form: &FormState) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        for &field in fields {
            if let Err(error) = self.check(field, form) {
                errors.insert(field, error);
            }
        }
        errors
    }

    /// Failures among the fields owned by a step
    pub fn check_step(&self, step: Step, form: &FormState) -> ValidationErrors {
        self.check_fields(step.fields(), form)
    }

    pub fn check_all(&self, form: &FormState) -> ValidationErrors {
        self.check_fields(&Field::ALL, form)
    }

    /// Turn a fully valid form into the order payload
    pub fn order(&self, form: &FormState) -> Result<OrderPayload, ValidationErrors> {
        let errors = self.check_all(form);
        match (form.duration, form.storage, form.up_front) {
            (Some(duration), Some(storage), Some(up_front)) if errors.is_empty() => {
                Ok(OrderPayload {
                    duration,
                    storage,
                    up_front,
                    card_number: card::normalize_number(&form.card_number).unwrap_or_default(),
                    expiration_date: form.expiration_date.trim().to_string(),
                    cvv: form.cvv.trim().to_string(),
                    email: form.email.trim().to_string(),
                    terms_agreement: form.terms_agreement,
                })
            }
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> Validator {
        Validator::at(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap())
    }

    fn complete_form() -> FormState {
        FormState {
            card_number: "4111 1111 1111 1111".into(),
            expiration_date: "12/28".into(),
            cvv: "123".into(),
            email: "jane@example.com".into(),
            terms_agreement: true,
            ..FormState::default()
        }
    }

    #[test]
    fn test_complete_form_is_valid() {
        let errors = validator().check_all(&complete_form());
        assert!(errors.is_empty(), "unexpected errors: {errors}");
    }

    #[test]
    fn test_default_form_fails_only_text_fields() {
        let errors = validator().check_all(&FormState::default());
        assert!(!errors.contains(Field::Duration));
        assert!(!errors.contains(Field::Storage));
        assert!(!errors.contains(Field::UpFront));
        assert_eq!(errors.get(Field::CardNumber), Some(&ValidationError::InvalidCardNumber));
        assert_eq!(errors.get(Field::ExpirationDate), Some(&ValidationError::InvalidExpiry));
        assert_eq!(errors.get(Field::Cvv), Some(&ValidationError::InvalidCvv));
        assert_eq!(errors.get(Field::Email), Some(&ValidationError::Required(Field::Email)));
        assert_eq!(
            errors.get(Field::TermsAgreement),
            Some(&ValidationError::TermsNotAccepted)
        );
    }

    #[test]
    fn test_select_fields_must_be_offered_values() {
        let v = validator();
        let mut form = complete_form();

        form.duration = Some(24);
        assert_eq!(v.check(Field::Duration, &form), Err(ValidationError::InvalidDuration(24)));
        form.duration = None;
        assert_eq!(
            v.check(Field::Duration, &form),
            Err(ValidationError::Required(Field::Duration))
        );

        form.storage = Some(20);
        assert_eq!(v.check(Field::Storage, &form), Err(ValidationError::InvalidStorage(20)));

        form.up_front = None;
        assert_eq!(
            v.check(Field::UpFront, &form),
            Err(ValidationError::Required(Field::UpFront))
        );
    }

    #[test]
    fn test_card_fields() {
        let v = validator();
        let mut form = complete_form();

        form.card_number = "1234".into();
        assert_eq!(v.check(Field::CardNumber, &form), Err(ValidationError::InvalidCardNumber));

        form.card_number = "378282246310005".into();
        assert_eq!(v.check(Field::Cvv, &form), Err(ValidationError::InvalidCvv));
        form.cvv = "1234".into();
        assert!(v.check(Field::Cvv, &form).is_ok());

        form.expiration_date = "09/26".into();
        assert_eq!(v.check(Field::ExpirationDate, &form), Err(ValidationError::InvalidExpiry));
    }

    #[test]
    fn test_email_grammar() {
        let v = validator();
        let mut form = complete_form();

        form.email = "not-an-email".into();
        assert_eq!(v.check(Field::Email, &form), Err(ValidationError::InvalidEmail));
        form.email = "  jane@example.com ".into();
        assert!(v.check(Field::Email, &form).is_ok());
    }

    #[test]
    fn test_step_grouping() {
        let v = validator();
        let form = FormState::default();

        assert!(v.check_step(Step::Subscription, &form).is_empty());
        let payment = v.check_step(Step::Payment, &form);
        assert_eq!(payment.len(), 3);
        assert!(!payment.contains(Field::Email));
        let review = v.check_step(Step::Review, &form);
        assert_eq!(review.len(), 2);
    }

    #[test]
    fn test_order_payload() {
        let mut form = complete_form();
        form.up_front = Some(true);

        let order = validator().order(&form).unwrap();
        assert_eq!(order.card_number, "4111111111111111");
        assert!(order.up_front);

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["upFront"], serde_json::json!(true));
        assert_eq!(json["duration"], serde_json::json!(12));
        assert_eq!(json["termsAgreement"], serde_json::json!(true));
        assert_eq!(json["expirationDate"], serde_json::json!("12/28"));
    }

    #[test]
    fn test_order_rejects_invalid_form() {
        let errors = validator().order(&FormState::default()).unwrap_err();
        assert_eq!(errors.len(), 5);
    }
}
