//! Step Controller
//!
//! The checkout is an explicit state object driven by [`Checkout::dispatch`].
//! Stages move by one at a time: three form steps, then the terminal `Done`
//! confirmation. Leaving a step forward requires its fields to validate; the
//! last step hands the order to the caller and only completes once the caller
//! reports the submission outcome.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{StepError, ValidationErrors};
use crate::model::{FieldValue, FormState, OrderPayload};
use crate::validation::{Field, Validator};

/// Number of form steps before the confirmation stage
pub const STEP_COUNT: usize = 3;

/// One screen of the checkout
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Subscription,
    Payment,
    Review,
}

impl Step {
    pub const ALL: [Step; STEP_COUNT] = [Step::Subscription, Step::Payment, Step::Review];

    pub fn index(self) -> usize {
        match self {
            Step::Subscription => 0,
            Step::Payment => 1,
            Step::Review => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            Step::Subscription => "Subscription Options",
            Step::Payment => "Payment Information",
            Step::Review => "Order Summary",
        }
    }

    /// Fields owned by this step
    pub fn fields(self) -> &'static [Field] {
        match self {
            Step::Subscription => &[Field::Duration, Field::Storage, Field::UpFront],
            Step::Payment => &[Field::CardNumber, Field::ExpirationDate, Field::Cvv],
            Step::Review => &[Field::Email, Field::TermsAgreement],
        }
    }

    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub fn previous(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    /// Whether moving forward from here submits the order
    pub fn is_last(self) -> bool {
        self.next().is_none()
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Position in the checkout
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Active(Step),
    /// Order confirmed
    Done,
}

impl Stage {
    /// Step index in `0..=STEP_COUNT`; `STEP_COUNT` is the confirmation stage
    pub fn index(self) -> usize {
        match self {
            Stage::Active(step) => step.index(),
            Stage::Done => STEP_COUNT,
        }
    }

    pub fn step(self) -> Option<Step> {
        match self {
            Stage::Active(step) => Some(step),
            Stage::Done => None,
        }
    }
}

/// Order submission progress
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum Submission {
    #[default]
    Idle,
    /// Order handed to the caller, outcome not yet reported
    InFlight,
    /// Last attempt failed; the user stays on the review step
    Failed(String),
}

/// Inputs to the reducer
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Edit(FieldValue),
    Next,
    Back,
    SubmissionSucceeded,
    SubmissionFailed(String),
    /// Start a new subscription from the confirmation stage
    Reset,
}

/// What a successful dispatch did
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    Edited(Field),
    Moved(Stage),
    /// The caller must submit this order and report back
    SubmitRequested(OrderPayload),
    SubmissionFailed,
    Reset,
}

/// Checkout state: stage, form values and submission progress
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Checkout {
    stage: Stage,
    form: FormState,
    touched: BTreeSet<Field>,
    submission: Submission,
}

impl Default for Checkout {
    fn default() -> Self {
        Self::new()
    }
}

impl Checkout {
    pub fn new() -> Self {
        Self::with_form(FormState::default())
    }

    /// Start on the first step with pre-filled values
    pub fn with_form(form: FormState) -> Self {
        Self {
            stage: Stage::Active(Step::Subscription),
            form,
            touched: BTreeSet::new(),
            submission: Submission::Idle,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    pub fn is_touched(&self, field: Field) -> bool {
        self.touched.contains(&field)
    }

    pub fn is_done(&self) -> bool {
        self.stage == Stage::Done
    }

    /// Whether `Next` would be accepted right now
    pub fn can_next(&self, validator: &Validator) -> bool {
        match self.stage {
            Stage::Active(step) => {
                self.submission != Submission::InFlight
                    && validator.check_step(step, &self.form).is_empty()
            }
            Stage::Done => false,
        }
    }

    pub fn can_back(&self) -> bool {
        self.stage
            .step()
            .is_some_and(|step| step.previous().is_some())
    }

    pub fn can_reset(&self) -> bool {
        self.is_done()
    }

    /// Failures among the current step's fields
    pub fn current_errors(&self, validator: &Validator) -> ValidationErrors {
        match self.stage {
            Stage::Active(step) => validator.check_step(step, &self.form),
            Stage::Done => ValidationErrors::new(),
        }
    }

    /// Current step failures for fields the user has already edited
    pub fn visible_errors(&self, validator: &Validator) -> ValidationErrors {
        let mut errors = self.current_errors(validator);
        errors.retain(|field| self.touched.contains(&field));
        errors
    }

    /// Apply an action. On error the state is unchanged.
    pub fn dispatch(
        &mut self,
        action: Action,
        validator: &Validator,
    ) -> Result<Transition, StepError> {
        match action {
            Action::Edit(value) => self.edit(value),
            Action::Next => self.next(validator),
            Action::Back => self.back(),
            Action::SubmissionSucceeded => self.complete(),
            Action::SubmissionFailed(message) => self.fail(message),
            Action::Reset => self.reset(),
        }
    }

    fn active_step(&self) -> Result<Step, StepError> {
        self.stage.step().ok_or(StepError::Finished)
    }

    fn edit(&mut self, value: FieldValue) -> Result<Transition, StepError> {
        self.active_step()?;
        if self.submission == Submission::InFlight {
            return Err(StepError::SubmissionInFlight);
        }

        let field = value.field();
        self.form.apply(value);
        self.touched.insert(field);
        tracing::debug!(field = %field, "Field edited");

        Ok(Transition::Edited(field))
    }

    fn next(&mut self, validator: &Validator) -> Result<Transition, StepError> {
        let step = self.active_step()?;
        if self.submission == Submission::InFlight {
            return Err(StepError::SubmissionInFlight);
        }

        let errors = validator.check_step(step, &self.form);
        if !errors.is_empty() {
            return Err(StepError::Invalid { step, errors });
        }

        match step.next() {
            Some(next) => {
                self.stage = Stage::Active(next);
                tracing::info!(from = %step, to = %next, "Advanced checkout step");
                Ok(Transition::Moved(self.stage))
            }
            None => {
                let order = validator
                    .order(&self.form)
                    .map_err(|errors| StepError::Invalid { step, errors })?;
                self.submission = Submission::InFlight;
                tracing::info!(step = %step, "Order ready for submission");
                Ok(Transition::SubmitRequested(order))
            }
        }
    }

    fn back(&mut self) -> Result<Transition, StepError> {
        let step = self.active_step()?;
        let previous = step.previous().ok_or(StepError::AtFirstStep)?;

        if self.submission == Submission::InFlight {
            tracing::warn!("Leaving review step with a submission outstanding; abandoning it");
        }
        self.submission = Submission::Idle;
        self.stage = Stage::Active(previous);
        tracing::info!(from = %step, to = %previous, "Went back a checkout step");

        Ok(Transition::Moved(self.stage))
    }

    fn complete(&mut self) -> Result<Transition, StepError> {
        if self.submission != Submission::InFlight {
            return Err(StepError::NoPendingSubmission);
        }

        self.stage = Stage::Done;
        self.form = FormState::default();
        self.touched.clear();
        self.submission = Submission::Idle;
        tracing::info!("Order confirmed");

        Ok(Transition::Moved(Stage::Done))
    }

    fn fail(&mut self, message: String) -> Result<Transition, StepError> {
        if self.submission != Submission::InFlight {
            return Err(StepError::NoPendingSubmission);
        }

        tracing::warn!(error = %message, "Order submission failed");
        self.submission = Submission::Failed(message);

        Ok(Transition::SubmissionFailed)
    }

    fn reset(&mut self) -> Result<Transition, StepError> {
        if !self.is_done() {
            return Err(StepError::NotFinished);
        }

        *self = Self::new();
        tracing::info!("Checkout reset for a new subscription");

        Ok(Transition::Reset)
    }
}
