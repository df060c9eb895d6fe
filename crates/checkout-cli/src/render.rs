//! Text rendering for the terminal checkout

use std::fmt::Write;

use checkout_core::card::{card_brand, mask_number};
use checkout_core::model::{DURATION_OPTIONS, STORAGE_OPTIONS};
use checkout_core::stepper::STEP_COUNT;
use checkout_core::{Field, FormState, PlanCatalog, Quote, Step, ValidationErrors};

pub const THANK_YOU: &str = "Thank you for your purchase!";
pub const ADD_NEW_SUBSCRIPTION: &str = "ADD NEW SUBSCRIPTION";

pub fn step_header(step: Step) -> String {
    format!("\n== [{}/{}] {} ==", step.index() + 1, STEP_COUNT, step.label())
}

fn yes_no(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

/// Current value of a field as shown in its prompt
pub fn current_value(field: Field, form: &FormState) -> String {
    match field {
        Field::Duration => form
            .duration
            .map(|months| format!("{months} months"))
            .unwrap_or_default(),
        Field::Storage => form.storage.map(|gb| format!("{gb} GB")).unwrap_or_default(),
        Field::UpFront => yes_no(form.pays_up_front()).to_string(),
        Field::CardNumber if form.card_number.trim().is_empty() => String::new(),
        Field::CardNumber => match card_brand(&form.card_number) {
            Some(brand) => format!("{brand} {}", mask_number(&form.card_number)),
            None => mask_number(&form.card_number),
        },
        Field::ExpirationDate => form.expiration_date.clone(),
        Field::Cvv => "•".repeat(form.cvv.trim().chars().count()),
        Field::Email => form.email.clone(),
        Field::TermsAgreement => yes_no(form.terms_agreement).to_string(),
    }
}

/// Label, help text, choices and current value for one field
pub fn field_prompt(field: Field, form: &FormState, catalog: &PlanCatalog) -> String {
    let mut out = String::new();
    let _ = write!(out, "{}", field.label());

    match field {
        Field::Duration => {
            let durations = catalog.durations();
            if durations.is_empty() {
                let _ = write!(out, " (no plans available)");
            } else {
                let months: Vec<String> = DURATION_OPTIONS
                    .iter()
                    .filter(|months| durations.contains(months))
                    .map(ToString::to_string)
                    .collect();
                let _ = write!(out, " ({} months)", months.join(", "));
            }
        }
        Field::Storage => {
            let sizes: Vec<String> = STORAGE_OPTIONS.iter().map(ToString::to_string).collect();
            let _ = write!(out, " ({} GB)", sizes.join(", "));
        }
        Field::UpFront | Field::TermsAgreement => {
            let _ = write!(out, " (yes/no)");
        }
        _ => {}
    }

    let current = current_value(field, form);
    if !current.is_empty() {
        let _ = write!(out, " [{current}]");
    }
    if let Some(help) = field.help() {
        let _ = write!(out, "\n  {help}");
    }
    out.push_str("\n> ");
    out
}

/// Cost summary box
pub fn summary(quote: &Quote) -> String {
    let mut out = String::from("-- Summary --\n");
    for (label, value) in quote.lines() {
        let _ = writeln!(out, "{label:<14}{value}");
    }
    out
}

/// Review of the subscription options before the order is placed
pub fn review(form: &FormState) -> String {
    let mut out = String::from("Kindly review the information you've provided\n");

    if let Some(months) = form.duration {
        let _ = writeln!(out, "Subscription duration - {months} months");
        let _ = writeln!(out, "  Your subscription will be renewed every {months} months.");
    }
    if let Some(gb) = form.storage {
        let _ = writeln!(out, "Amount of storage - {gb}GB");
        let _ = writeln!(out, "  {gb}GB for all your storage needs.");
    }

    let up_front = form.pays_up_front();
    let _ = writeln!(out, "Upfront payment - {}", yes_no(up_front));
    let _ = writeln!(
        out,
        "  {}",
        if up_front {
            "You will get a 10% discount off the total cost of your subscription"
        } else {
            "You selected the instalment payment plan"
        }
    );

    out
}

/// One line per failing field
pub fn errors(errors: &ValidationErrors) -> String {
    let mut out = String::new();
    for (field, error) in errors.iter() {
        let _ = writeln!(out, "  ! {}: {}", field.label(), error.user_message());
    }
    out
}

pub fn done() -> String {
    format!("\n{THANK_YOU}\nPress Enter to {ADD_NEW_SUBSCRIPTION}, or type quit to exit\n> ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkout_core::{FieldValue, Plan, ValidationError};
    use rust_decimal_macros::dec;

    #[test]
    fn test_step_header() {
        assert_eq!(step_header(Step::Payment), "\n== [2/3] Payment Information ==");
    }

    #[test]
    fn test_card_value_masked() {
        let mut form = FormState::default();
        assert_eq!(current_value(Field::CardNumber, &form), "");

        form.apply(FieldValue::CardNumber("4111 1111 1111 1111".into()));
        form.apply(FieldValue::Cvv("123".into()));
        assert_eq!(current_value(Field::CardNumber, &form), "Visa •••• 1111");
        assert_eq!(current_value(Field::Cvv, &form), "•••");
    }

    #[test]
    fn test_duration_prompt_lists_catalog() {
        let form = FormState::default();
        let catalog = PlanCatalog::new(vec![Plan::new(3, dec!(3)), Plan::new(12, dec!(2))]);

        let prompt = field_prompt(Field::Duration, &form, &catalog);
        assert!(prompt.starts_with("Duration of subscription (3, 12 months) [12 months]"));
        assert!(prompt.contains("The longer the duration, the lower the price"));

        let empty = field_prompt(Field::Duration, &form, &PlanCatalog::empty());
        assert!(empty.contains("(no plans available)"));
    }

    #[test]
    fn test_summary_lines() {
        let quote = Quote::compute(Some(&Plan::new(12, dec!(0.10))), 10, 12, true);
        let text = summary(&quote);
        assert!(text.contains("Selected plan $0.10 / GB for 12 months"));
        assert!(text.contains("Discount      10% OFF"));
        assert!(text.contains("Subtotal      $12.00"));
        assert!(text.contains("Total         $10.80"));
    }

    #[test]
    fn test_review_text() {
        let text = review(&FormState::default());
        assert!(text.contains("Subscription duration - 12 months"));
        assert!(text.contains("Your subscription will be renewed every 12 months."));
        assert!(text.contains("Amount of storage - 5GB"));
        assert!(text.contains("Upfront payment - No"));
        assert!(text.contains("You selected the instalment payment plan"));
    }

    #[test]
    fn test_errors_use_friendly_text() {
        let mut failing = ValidationErrors::new();
        failing.insert(Field::Email, ValidationError::InvalidEmail);
        assert_eq!(errors(&failing), "  ! Email address: Email address is not valid\n");
    }
}
