//! Error Types for the checkout domain

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::stepper::Step;
use crate::validation::Field;

/// Result type alias
pub type Result<T> = std::result::Result<T, CheckoutError>;

/// Top-level error for checkout-core operations
#[derive(Error, Debug)]
pub enum CheckoutError {
    /// Plan catalog payload could not be parsed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Field-level validation failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A select field has no value
    #[error("{0} is required")]
    Required(Field),

    #[error("invalid duration: {0} months")]
    InvalidDuration(u32),

    #[error("invalid storage: {0} GB")]
    InvalidStorage(u32),

    #[error("terms not accepted")]
    TermsNotAccepted,

    #[error("invalid card number")]
    InvalidCardNumber,

    #[error("invalid expiry")]
    InvalidExpiry,

    #[error("invalid cvv")]
    InvalidCvv,

    #[error("invalid email")]
    InvalidEmail,
}

impl ValidationError {
    /// Get the message shown next to the offending field
    pub fn user_message(&self) -> &str {
        match self {
            ValidationError::Required(Field::Email) => "Email address is required",
            ValidationError::Required(_) => "This field is required",
            ValidationError::InvalidDuration(_) => "Choose a 3, 6 or 12 month subscription",
            ValidationError::InvalidStorage(_) => "Choose 5, 10 or 50 GB of storage",
            ValidationError::TermsNotAccepted => {
                "You must accept the terms and conditions to proceed"
            }
            ValidationError::InvalidCardNumber => "Credit Card number is invalid",
            ValidationError::InvalidExpiry => "Credit Card expiry date is invalid",
            ValidationError::InvalidCvv => "Credit Card security code is invalid",
            ValidationError::InvalidEmail => "Email address is not valid",
        }
    }
}

/// Validation failures keyed by field, in field order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<Field, ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: Field, error: ValidationError) {
        self.errors.insert(field, error);
    }

    /// Error recorded for a field, if any
    pub fn get(&self, field: Field) -> Option<&ValidationError> {
        self.errors.get(&field)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.errors.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &ValidationError)> {
        self.errors.iter().map(|(field, error)| (*field, error))
    }

    /// Keep only errors whose field satisfies the predicate
    pub fn retain(&mut self, mut keep: impl FnMut(Field) -> bool) {
        self.errors.retain(|field, _| keep(*field));
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, error) in &self.errors {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {error}")?;
            first = false;
        }
        Ok(())
    }
}

/// Rejected step transition. The checkout state is left untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StepError {
    #[error("already at the first step")]
    AtFirstStep,

    #[error("checkout is complete; reset to start a new subscription")]
    Finished,

    #[error("reset is only available once the order is confirmed")]
    NotFinished,

    /// Fields of the current step do not validate
    #[error("{step} has invalid fields: {errors}")]
    Invalid { step: Step, errors: ValidationErrors },

    #[error("an order submission is already in progress")]
    SubmissionInFlight,

    #[error("no order submission is in progress")]
    NoPendingSubmission,
}
