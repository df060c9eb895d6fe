//! Prompt input parsing

use checkout_core::{Field, FieldValue};

/// How a prompt was answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResponse {
    /// User typed something
    Value(String),
    /// Blank line: keep the current value
    Keep,
    /// Go back to the previous step
    Back,
    /// Leave the checkout
    Quit,
}

impl PromptResponse {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "" => PromptResponse::Keep,
            "back" | ":b" => PromptResponse::Back,
            "quit" | "exit" | ":q" => PromptResponse::Quit,
            _ => PromptResponse::Value(trimmed.to_string()),
        }
    }
}

/// Turn typed text into an edit for `field`
pub fn parse_field(field: Field, input: &str) -> Result<FieldValue, String> {
    let input = input.trim();
    match field {
        Field::Duration => parse_number(input, "months").map(FieldValue::Duration),
        Field::Storage => {
            let lowered = input.to_ascii_lowercase();
            parse_number(lowered.trim_end_matches("gb").trim(), "GB").map(FieldValue::Storage)
        }
        Field::UpFront => parse_yes_no(input).map(FieldValue::UpFront),
        Field::TermsAgreement => parse_yes_no(input).map(FieldValue::TermsAgreement),
        Field::CardNumber => Ok(FieldValue::CardNumber(input.to_string())),
        Field::ExpirationDate => Ok(FieldValue::ExpirationDate(input.to_string())),
        Field::Cvv => Ok(FieldValue::Cvv(input.to_string())),
        Field::Email => Ok(FieldValue::Email(input.to_string())),
    }
}

fn parse_number(input: &str, unit: &str) -> Result<u32, String> {
    input
        .parse()
        .map_err(|_| format!("Enter a whole number of {unit}"))
}

fn parse_yes_no(input: &str) -> Result<bool, String> {
    match input.to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" | "1" => Ok(true),
        "n" | "no" | "false" | "0" => Ok(false),
        _ => Err("Answer yes or no".into()),
    }
}
