//! Pricing Calculator
//!
//! `subtotal = storage × price per GB × duration`; paying up front takes a flat
//! 10% off. A selection with no matching plan prices at zero.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::model::{FormState, Plan, PlanCatalog};

/// Discount granted for paying the whole subscription up front
pub const UP_FRONT_DISCOUNT: Decimal = dec!(0.10);

/// Cost preview for the current selection. Derived on demand, never stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Plan matched to the selected duration
    pub plan: Option<Plan>,

    pub storage_gb: u32,

    pub up_front: bool,

    pub subtotal: Decimal,

    /// Amount taken off the subtotal
    pub discount: Decimal,

    pub total: Decimal,
}

impl Quote {
    /// Price a selection against an optional plan. An amount too large for
    /// `Decimal` prices at zero, like a missing plan.
    pub fn compute(plan: Option<&Plan>, storage_gb: u32, duration_months: u32, up_front: bool) -> Self {
        let Some(plan) = plan else {
            return Self::zero(storage_gb, up_front);
        };

        match Self::amounts(plan, storage_gb, duration_months, up_front) {
            Some((subtotal, discount, total)) => Self {
                plan: Some(plan.clone()),
                storage_gb,
                up_front,
                subtotal,
                discount,
                total,
            },
            None => {
                tracing::warn!(
                    duration_months,
                    storage_gb,
                    price = %plan.price_usd_per_gb,
                    "Quote overflowed, pricing at zero"
                );
                Self::zero(storage_gb, up_front)
            }
        }
    }

    /// (subtotal, discount, total), or `None` on overflow
    fn amounts(
        plan: &Plan,
        storage_gb: u32,
        duration_months: u32,
        up_front: bool,
    ) -> Option<(Decimal, Decimal, Decimal)> {
        let subtotal = Decimal::from(storage_gb)
            .checked_mul(plan.price_usd_per_gb)?
            .checked_mul(Decimal::from(duration_months))?;
        let discount = if up_front {
            subtotal.checked_mul(UP_FRONT_DISCOUNT)?
        } else {
            Decimal::ZERO
        };
        Some((subtotal, discount, subtotal.checked_sub(discount)?))
    }

    fn zero(storage_gb: u32, up_front: bool) -> Self {
        Self {
            plan: None,
            storage_gb,
            up_front,
            subtotal: Decimal::ZERO,
            discount: Decimal::ZERO,
            total: Decimal::ZERO,
        }
    }

    /// Price the form's current selection against the catalog
    pub fn for_form(catalog: &PlanCatalog, form: &FormState) -> Self {
        let plan = form.duration.and_then(|months| catalog.find(months));
        match (plan, form.storage) {
            (Some(plan), Some(storage)) => {
                Self::compute(Some(plan), storage, plan.duration_months, form.pays_up_front())
            }
            _ => Self::compute(None, form.storage.unwrap_or(0), 0, form.pays_up_front()),
        }
    }

    /// Summary rows as (label, value), in display order
    pub fn lines(&self) -> Vec<(&'static str, String)> {
        let mut lines = Vec::new();

        let selected = match &self.plan {
            Some(plan) => format!(
                "{} / GB for {} months",
                format_usd(plan.price_usd_per_gb),
                plan.duration_months
            ),
            None => "No plan available".to_string(),
        };
        lines.push(("Selected plan", selected));

        if self.up_front {
            lines.push(("Discount", "10% OFF".to_string()));
            lines.push(("Subtotal", format_usd(self.subtotal)));
        }
        lines.push(("Total", format_usd(self.total)));

        lines
    }
}

/// Format an amount as en-US dollars, e.g. `$1,234.50`
pub fn format_usd(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{sign}${grouped}.{cents}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldValue;

    fn catalog() -> PlanCatalog {
        PlanCatalog::new(vec![
            Plan::new(3, dec!(3)),
            Plan::new(6, dec!(2.5)),
            Plan::new(12, dec!(0.10)),
        ])
    }

    #[test]
    fn test_instalment_pricing() {
        let plan = Plan::new(12, dec!(0.10));
        let quote = Quote::compute(Some(&plan), 10, 12, false);
        assert_eq!(quote.subtotal, dec!(12.00));
        assert_eq!(quote.total, dec!(12.00));
        assert_eq!(quote.discount, Decimal::ZERO);
    }

    #[test]
    fn test_up_front_discount() {
        let plan = Plan::new(12, dec!(0.10));
        let quote = Quote::compute(Some(&plan), 10, 12, true);
        assert_eq!(quote.subtotal, dec!(12.00));
        assert_eq!(quote.total, dec!(10.80));
        assert_eq!(format_usd(quote.total), "$10.80");
    }

    #[test]
    fn test_pricing_formula_across_options() {
        for plan in catalog().plans() {
            for storage in crate::model::STORAGE_OPTIONS {
                let expected = Decimal::from(storage) * plan.price_usd_per_gb
                    * Decimal::from(plan.duration_months);

                let instalments = Quote::compute(Some(plan), storage, plan.duration_months, false);
                assert_eq!(instalments.total, expected);

                let up_front = Quote::compute(Some(plan), storage, plan.duration_months, true);
                assert_eq!(up_front.subtotal, expected);
                assert_eq!(up_front.total, expected * dec!(0.9));
            }
        }
    }

    #[test]
    fn test_missing_plan_prices_at_zero() {
        let catalog = PlanCatalog::new(vec![Plan::new(12, dec!(0.10))]);
        let mut form = FormState::default();
        form.apply(FieldValue::Duration(6));
        form.apply(FieldValue::UpFront(true));

        let quote = Quote::for_form(&catalog, &form);
        assert!(quote.plan.is_none());
        assert_eq!(quote.subtotal, Decimal::ZERO);
        assert_eq!(quote.total, Decimal::ZERO);

        let empty = Quote::for_form(&PlanCatalog::empty(), &FormState::default());
        assert_eq!(empty.total, Decimal::ZERO);
    }

    #[test]
    fn test_overflowing_price_quotes_zero() {
        let plan = Plan::new(12, Decimal::from_scientific("1e27").unwrap());

        let quote = Quote::compute(Some(&plan), 50, 12, true);
        assert!(quote.plan.is_none());
        assert_eq!(quote.total, Decimal::ZERO);
        assert_eq!(quote.lines()[0].1, "No plan available");

        let body = r#"{"subscription_plans":[{"duration_months":12,"price_usd_per_gb":1e27}]}"#;
        let mut form = FormState::default();
        form.apply(FieldValue::Storage(50));
        let quote = Quote::for_form(&PlanCatalog::from_json(body).unwrap(), &form);
        assert_eq!(quote.total, Decimal::ZERO);

        let largest = Plan::new(12, crate::model::MAX_PRICE_USD_PER_GB);
        let quote = Quote::compute(Some(&largest), u32::MAX, 12, true);
        assert!(quote.total > Decimal::ZERO);
    }

    #[test]
    fn test_quote_follows_form() {
        let mut form = FormState::default();
        form.apply(FieldValue::Storage(50));
        form.apply(FieldValue::Duration(6));

        let quote = Quote::for_form(&catalog(), &form);
        assert_eq!(quote.total, dec!(750));
    }

    #[test]
    fn test_summary_lines() {
        let plan = Plan::new(12, dec!(0.10));

        let lines = Quote::compute(Some(&plan), 10, 12, true).lines();
        assert_eq!(
            lines,
            vec![
                ("Selected plan", "$0.10 / GB for 12 months".to_string()),
                ("Discount", "10% OFF".to_string()),
                ("Subtotal", "$12.00".to_string()),
                ("Total", "$10.80".to_string()),
            ]
        );

        let lines = Quote::compute(Some(&plan), 10, 12, false).lines();
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(Decimal::ZERO), "$0.00");
        assert_eq!(format_usd(dec!(0.125)), "$0.13");
        assert_eq!(format_usd(dec!(1234.5)), "$1,234.50");
        assert_eq!(format_usd(dec!(1000000)), "$1,000,000.00");
        assert_eq!(format_usd(dec!(-12.3)), "-$12.30");
    }
}
