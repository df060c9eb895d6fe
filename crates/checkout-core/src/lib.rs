//! # checkout-core
//!
//! Domain logic for the cloud-storage subscription checkout: plans, form state,
//! field validation, pricing, and the step controller.
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────────────┐   ┌──────────────────────┐   ┌──────────────────────┐
//! │ Subscription Options │──▶│ Payment Information  │──▶│    Order Summary     │──▶ Done
//! │ duration/storage/    │◀──│ card/expiry/cvv      │◀──│ email/terms          │
//! │ up-front             │   │                      │   │ (submits the order)  │
//! └──────────────────────┘   └──────────────────────┘   └──────────────────────┘
//! ```
//!
//! Everything here is synchronous and free of I/O. The order itself is sent by
//! `checkout-client`, which reports the outcome back into [`Checkout`].
//!
//! ## Usage
//!
//! ```rust
//! use checkout_core::{Action, Checkout, FieldValue, Plan, PlanCatalog, Quote, Validator};
//! use rust_decimal_macros::dec;
//!
//! let catalog = PlanCatalog::new(vec![Plan::new(12, dec!(0.10))]);
//! let validator = Validator::new();
//! let mut checkout = Checkout::new();
//!
//! checkout.dispatch(Action::Edit(FieldValue::Storage(10)), &validator).unwrap();
//! checkout.dispatch(Action::Edit(FieldValue::UpFront(true)), &validator).unwrap();
//!
//! let quote = Quote::for_form(&catalog, checkout.form());
//! assert_eq!(quote.total, dec!(10.80));
//! ```

pub mod card;
pub mod error;
pub mod model;
pub mod pricing;
pub mod stepper;
pub mod validation;

pub use card::CardBrand;
pub use error::{CheckoutError, Result, StepError, ValidationError, ValidationErrors};
pub use model::{FieldValue, FormState, OrderPayload, Plan, PlanCatalog};
pub use pricing::{Quote, format_usd};
pub use stepper::{Action, Checkout, Stage, Step, Submission, Transition};
pub use validation::{Field, Validator};
