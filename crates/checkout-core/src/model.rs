//! Domain Models
//!
//! Plans offered by the storage service and the checkout form they are sold through.
//! Prices use `rust_decimal`; never use f64 for money.

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::validation::Field;

/// Subscription lengths a plan can be sold for
pub const DURATION_OPTIONS: [u32; 3] = [3, 6, 12];

/// Storage sizes (GB) a subscription can be sold with
pub const STORAGE_OPTIONS: [u32; 3] = [5, 10, 50];

/// Highest per-GB monthly price a plan may carry
pub const MAX_PRICE_USD_PER_GB: Decimal = dec!(1000000);

/// A priced offering, keyed by subscription length
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// Subscription length in months
    pub duration_months: u32,

    /// Monthly price per GB of storage
    pub price_usd_per_gb: Decimal,
}

impl Plan {
    pub fn new(duration_months: u32, price_usd_per_gb: Decimal) -> Self {
        Self {
            duration_months,
            price_usd_per_gb,
        }
    }

    /// Whether the plan can be offered at all
    pub fn is_well_formed(&self) -> bool {
        DURATION_OPTIONS.contains(&self.duration_months)
            && self.price_usd_per_gb > Decimal::ZERO
            && self.price_usd_per_gb <= MAX_PRICE_USD_PER_GB
    }
}

/// Plans available for this session, in the order the service returned them
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PlanCatalog {
    #[serde(rename = "subscription_plans")]
    plans: Vec<Plan>,
}

/// Plans endpoint body, records left unparsed so one bad entry cannot sink the rest
#[derive(Deserialize)]
struct RawCatalog {
    #[serde(default)]
    subscription_plans: Vec<serde_json::Value>,
}

impl PlanCatalog {
    /// Build a catalog, dropping plans with an unknown duration or an out-of-range price
    pub fn new(plans: Vec<Plan>) -> Self {
        let plans = plans
            .into_iter()
            .filter(|plan| {
                let keep = plan.is_well_formed();
                if !keep {
                    tracing::warn!(
                        duration_months = plan.duration_months,
                        price = %plan.price_usd_per_gb,
                        "Dropping malformed plan"
                    );
                }
                keep
            })
            .collect();
        Self { plans }
    }

    /// Parse the `{ "subscription_plans": [...] }` body served by the plans endpoint
    pub fn from_json(body: &str) -> Result<Self> {
        let raw: RawCatalog = serde_json::from_str(body)?;
        let plans = raw
            .subscription_plans
            .into_iter()
            .filter_map(|record| match serde_json::from_value::<Plan>(record) {
                Ok(plan) => Some(plan),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable plan record");
                    None
                }
            })
            .collect();
        Ok(Self::new(plans))
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// First plan sold for the given duration
    pub fn find(&self, duration_months: u32) -> Option<&Plan> {
        self.plans
            .iter()
            .find(|plan| plan.duration_months == duration_months)
    }

    /// Durations offered, in catalog order
    pub fn durations(&self) -> Vec<u32> {
        let mut durations = Vec::with_capacity(self.plans.len());
        for plan in &self.plans {
            if !durations.contains(&plan.duration_months) {
                durations.push(plan.duration_months);
            }
        }
        durations
    }

    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }
}

/// Values entered into the checkout form
///
/// Select fields are optional so a missing choice can be represented and rejected.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    pub duration: Option<u32>,
    pub storage: Option<u32>,
    pub up_front: Option<bool>,
    pub card_number: String,
    pub expiration_date: String,
    pub cvv: String,
    pub email: String,
    pub terms_agreement: bool,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            duration: Some(12),
            storage: Some(5),
            up_front: Some(false),
            card_number: String::new(),
            expiration_date: String::new(),
            cvv: String::new(),
            email: String::new(),
            terms_agreement: false,
        }
    }
}

impl FormState {
    /// Write a single field
    pub fn apply(&mut self, value: FieldValue) {
        match value {
            FieldValue::Duration(months) => self.duration = Some(months),
            FieldValue::Storage(gb) => self.storage = Some(gb),
            FieldValue::UpFront(up_front) => self.up_front = Some(up_front),
            FieldValue::CardNumber(number) => self.card_number = number,
            FieldValue::ExpirationDate(expiry) => self.expiration_date = expiry,
            FieldValue::Cvv(cvv) => self.cvv = cvv,
            FieldValue::Email(email) => self.email = email,
            FieldValue::TermsAgreement(agreed) => self.terms_agreement = agreed,
        }
    }

    /// Up-front flag as a strict boolean; a missing choice counts as instalments
    pub fn pays_up_front(&self) -> bool {
        self.up_front.unwrap_or(false)
    }
}

// Card data stays out of logs.
impl fmt::Debug for FormState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormState")
            .field("duration", &self.duration)
            .field("storage", &self.storage)
            .field("up_front", &self.up_front)
            .field("card_number", &redact(&self.card_number))
            .field("expiration_date", &self.expiration_date)
            .field("cvv", &redact(&self.cvv))
            .field("email", &self.email)
            .field("terms_agreement", &self.terms_agreement)
            .finish()
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() { "" } else { "<redacted>" }
}

/// A single user edit
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValue {
    Duration(u32),
    Storage(u32),
    UpFront(bool),
    CardNumber(String),
    ExpirationDate(String),
    Cvv(String),
    Email(String),
    TermsAgreement(bool),
}

impl FieldValue {
    /// Field this edit writes to
    pub fn field(&self) -> Field {
        match self {
            FieldValue::Duration(_) => Field::Duration,
            FieldValue::Storage(_) => Field::Storage,
            FieldValue::UpFront(_) => Field::UpFront,
            FieldValue::CardNumber(_) => Field::CardNumber,
            FieldValue::ExpirationDate(_) => Field::ExpirationDate,
            FieldValue::Cvv(_) => Field::Cvv,
            FieldValue::Email(_) => Field::Email,
            FieldValue::TermsAgreement(_) => Field::TermsAgreement,
        }
    }
}

/// Validated order, as posted to the order endpoint
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub duration: u32,
    pub storage: u32,
    pub up_front: bool,
    pub card_number: String,
    pub expiration_date: String,
    pub cvv: String,
    pub email: String,
    pub terms_agreement: bool,
}

impl fmt::Debug for OrderPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderPayload")
            .field("duration", &self.duration)
            .field("storage", &self.storage)
            .field("up_front", &self.up_front)
            .field("card_number", &redact(&self.card_number))
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_catalog_from_json() {
        let body = r#"{"subscription_plans":[
            {"duration_months":3,"price_usd_per_gb":3},
            {"duration_months":6,"price_usd_per_gb":2.5},
            {"duration_months":12,"price_usd_per_gb":0.10}
        ]}"#;

        let catalog = PlanCatalog::from_json(body).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.durations(), vec![3, 6, 12]);
        assert_eq!(catalog.find(12).unwrap().price_usd_per_gb, dec!(0.10));
        assert_eq!(catalog.find(6).unwrap().price_usd_per_gb, dec!(2.5));
        assert!(catalog.find(24).is_none());
    }

    #[test]
    fn test_catalog_drops_malformed_plans() {
        let body = r#"{"subscription_plans":[
            {"duration_months":24,"price_usd_per_gb":1},
            {"duration_months":6,"price_usd_per_gb":0},
            {"duration_months":3,"price_usd_per_gb":2}
        ]}"#;

        let catalog = PlanCatalog::from_json(body).unwrap();
        assert_eq!(catalog.plans(), &[Plan::new(3, dec!(2))]);
    }

    #[test]
    fn test_catalog_keeps_good_plans_next_to_bad_records() {
        let body = r#"{"subscription_plans":[
            {"duration_months":12,"price_usd_per_gb":0.1},
            {"duration_months":6,"price_usd_per_gb":null},
            {"duration_months":6.5,"price_usd_per_gb":1},
            {"duration_months":-3,"price_usd_per_gb":1},
            {"duration_months":"3","price_usd_per_gb":1},
            "not a plan"
        ]}"#;

        let catalog = PlanCatalog::from_json(body).unwrap();
        assert_eq!(catalog.plans(), &[Plan::new(12, dec!(0.1))]);
    }

    #[test]
    fn test_catalog_drops_absurd_prices() {
        let body = r#"{"subscription_plans":[
            {"duration_months":12,"price_usd_per_gb":1e27},
            {"duration_months":3,"price_usd_per_gb":1000000}
        ]}"#;

        let catalog = PlanCatalog::from_json(body).unwrap();
        assert_eq!(catalog.durations(), vec![3]);
    }

    #[test]
    fn test_catalog_missing_list_is_empty() {
        let catalog = PlanCatalog::from_json("{}").unwrap();
        assert!(catalog.is_empty());
        assert!(PlanCatalog::from_json("not json").is_err());
    }

    #[test]
    fn test_form_defaults() {
        let form = FormState::default();
        assert_eq!(form.duration, Some(12));
        assert_eq!(form.storage, Some(5));
        assert_eq!(form.up_front, Some(false));
        assert!(form.card_number.is_empty());
        assert!(form.email.is_empty());
        assert!(!form.terms_agreement);
    }

    #[test]
    fn test_debug_redacts_card_data() {
        let mut form = FormState::default();
        form.apply(FieldValue::CardNumber("4111111111111111".into()));
        form.apply(FieldValue::Cvv("123".into()));

        let debug = format!("{form:?}");
        assert!(!debug.contains("4111"));
        assert!(!debug.contains("123"));
        assert!(debug.contains("<redacted>"));
    }
}
