//! Checkout Sessions
//!
//! A [`CheckoutSession`] owns one [`Checkout`] together with the plans it is
//! priced against and the sink its order goes to. Moving past the review step
//! submits the order and feeds the outcome back into the step controller.

use std::sync::Arc;

use checkout_core::{
    Action, Checkout, FieldValue, FormState, PlanCatalog, Quote, Stage, Transition,
    ValidationErrors, Validator,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::submit::{OrderReceipt, OrderSink};

/// Unique session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One user's pass through the checkout
pub struct CheckoutSession {
    id: SessionId,
    checkout: Checkout,
    catalog: PlanCatalog,
    validator: Validator,
    orders: Arc<dyn OrderSink>,
    last_receipt: Option<OrderReceipt>,
}

impl CheckoutSession {
    /// Start a session with no plans loaded yet
    pub fn new(orders: Arc<dyn OrderSink>) -> Self {
        Self {
            id: SessionId::new(),
            checkout: Checkout::new(),
            catalog: PlanCatalog::empty(),
            validator: Validator::new(),
            orders,
            last_receipt: None,
        }
    }

    /// Validate expiry dates against a fixed day
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_catalog(mut self, catalog: PlanCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Swap in freshly loaded plans
    pub fn set_catalog(&mut self, catalog: PlanCatalog) {
        tracing::debug!(session = %self.id, plans = catalog.len(), "Plan catalog set");
        self.catalog = catalog;
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn checkout(&self) -> &Checkout {
        &self.checkout
    }

    pub fn form(&self) -> &FormState {
        self.checkout.form()
    }

    pub fn stage(&self) -> Stage {
        self.checkout.stage()
    }

    pub fn catalog(&self) -> &PlanCatalog {
        &self.catalog
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Receipt of the most recent accepted order
    pub fn last_receipt(&self) -> Option<&OrderReceipt> {
        self.last_receipt.as_ref()
    }

    /// Price of the current selection
    pub fn quote(&self) -> Quote {
        Quote::for_form(&self.catalog, self.checkout.form())
    }

    pub fn current_errors(&self) -> ValidationErrors {
        self.checkout.current_errors(&self.validator)
    }

    pub fn visible_errors(&self) -> ValidationErrors {
        self.checkout.visible_errors(&self.validator)
    }

    pub fn can_next(&self) -> bool {
        self.checkout.can_next(&self.validator)
    }

    pub fn can_back(&self) -> bool {
        self.checkout.can_back()
    }

    pub fn can_reset(&self) -> bool {
        self.checkout.can_reset()
    }

    pub fn edit(&mut self, value: FieldValue) -> Result<()> {
        self.checkout.dispatch(Action::Edit(value), &self.validator)?;
        Ok(())
    }

    /// Advance one step. On the review step this submits the order and
    /// returns only once the outcome is known.
    #[tracing::instrument(skip(self), fields(session = %self.id))]
    pub async fn next(&mut self) -> Result<Stage> {
        let transition = self.checkout.dispatch(Action::Next, &self.validator)?;

        let Transition::SubmitRequested(order) = transition else {
            return Ok(self.checkout.stage());
        };

        tracing::info!(sink = self.orders.name(), "Submitting order");
        match self.orders.submit(&order).await {
            Ok(receipt) => {
                self.checkout
                    .dispatch(Action::SubmissionSucceeded, &self.validator)?;
                tracing::info!(request_id = %receipt.request_id, "Checkout complete");
                self.last_receipt = Some(receipt);
                Ok(self.checkout.stage())
            }
            Err(e) => {
                self.checkout
                    .dispatch(Action::SubmissionFailed(e.user_message()), &self.validator)?;
                Err(e)
            }
        }
    }

    pub fn back(&mut self) -> Result<Stage> {
        self.checkout.dispatch(Action::Back, &self.validator)?;
        Ok(self.checkout.stage())
    }

    /// Start a new subscription after a completed order
    pub fn reset(&mut self) -> Result<Stage> {
        self.checkout.dispatch(Action::Reset, &self.validator)?;
        self.last_receipt = None;
        Ok(self.checkout.stage())
    }
}
