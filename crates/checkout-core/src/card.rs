//! Payment Card Checks
//!
//! Brand detection, Luhn checksum, expiry and security-code rules for card fields.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Expiry dates further ahead than this are treated as typos
const MAX_YEARS_AHEAD: i32 = 19;

/// Card networks recognised from the number prefix
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CardBrand {
    Visa,
    Mastercard,
    AmericanExpress,
    DinersClub,
    Discover,
    Jcb,
    UnionPay,
    Maestro,
    Mir,
    Elo,
    Hiper,
    Hipercard,
}

/// (brand, inclusive prefix ranges). The longest matching prefix wins; on a tie,
/// the earlier entry.
const PREFIXES: &[(CardBrand, &[(u32, u32)])] = &[
    (CardBrand::Visa, &[(4, 4)]),
    (CardBrand::Mastercard, &[(51, 55), (2221, 2720)]),
    (CardBrand::AmericanExpress, &[(34, 34), (37, 37)]),
    (CardBrand::DinersClub, &[(300, 305), (36, 36), (38, 39)]),
    (CardBrand::Discover, &[(6011, 6011), (644, 649), (65, 65)]),
    (CardBrand::Jcb, &[(2131, 2131), (1800, 1800), (3528, 3589)]),
    (CardBrand::UnionPay, &[(62, 62), (81, 81)]),
    (CardBrand::Maestro, &[(50, 50), (56, 59), (63, 63), (67, 67)]),
    (CardBrand::Mir, &[(2200, 2204)]),
    (
        CardBrand::Elo,
        &[
            (401_178, 401_179),
            (438_935, 438_935),
            (457_631, 457_632),
            (431_274, 431_274),
            (451_416, 451_416),
            (457_393, 457_393),
            (504_175, 504_175),
            (506_699, 506_778),
            (509_000, 509_999),
            (627_780, 627_780),
            (636_297, 636_297),
            (636_368, 636_368),
            (650_031, 650_033),
            (650_035, 650_051),
            (650_405, 650_439),
            (650_485, 650_538),
            (650_541, 650_598),
            (650_700, 650_718),
            (650_720, 650_727),
            (650_901, 650_978),
            (651_652, 651_679),
            (655_000, 655_019),
            (655_021, 655_058),
        ],
    ),
    (
        CardBrand::Hiper,
        &[
            (637_095, 637_095),
            (63_737_423, 63_737_423),
            (63_743_358, 63_743_358),
            (637_568, 637_568),
            (637_599, 637_599),
            (637_609, 637_609),
            (637_612, 637_612),
        ],
    ),
    (CardBrand::Hipercard, &[(606_282, 606_282)]),
];

impl CardBrand {
    /// Detect the brand from the leading digits
    pub fn detect(digits: &str) -> Option<Self> {
        let mut best: Option<(usize, CardBrand)> = None;
        for &(brand, ranges) in PREFIXES {
            for &(lo, hi) in ranges {
                let width = prefix_width(lo);
                if prefix_in_range(digits, lo, hi) && best.is_none_or(|(longest, _)| width > longest) {
                    best = Some((width, brand));
                }
            }
        }
        best.map(|(_, brand)| brand)
    }

    /// Allowed number lengths
    pub fn lengths(self) -> &'static [usize] {
        match self {
            CardBrand::Visa => &[16, 18, 19],
            CardBrand::Mastercard => &[16],
            CardBrand::AmericanExpress => &[15],
            CardBrand::DinersClub => &[14, 16, 19],
            CardBrand::Discover => &[16, 19],
            CardBrand::Jcb => &[16, 17, 18, 19],
            CardBrand::UnionPay => &[14, 15, 16, 17, 18, 19],
            CardBrand::Maestro => &[12, 13, 14, 15, 16, 17, 18, 19],
            CardBrand::Mir => &[16, 17, 18, 19],
            CardBrand::Elo | CardBrand::Hiper | CardBrand::Hipercard => &[16],
        }
    }

    /// Security code length printed on the card
    pub fn cvv_length(self) -> usize {
        match self {
            CardBrand::AmericanExpress => 4,
            _ => 3,
        }
    }

    /// UnionPay numbers are not always Luhn-valid
    pub fn requires_luhn(self) -> bool {
        !matches!(self, CardBrand::UnionPay)
    }

    pub fn name(self) -> &'static str {
        match self {
            CardBrand::Visa => "Visa",
            CardBrand::Mastercard => "Mastercard",
            CardBrand::AmericanExpress => "American Express",
            CardBrand::DinersClub => "Diners Club",
            CardBrand::Discover => "Discover",
            CardBrand::Jcb => "JCB",
            CardBrand::UnionPay => "UnionPay",
            CardBrand::Maestro => "Maestro",
            CardBrand::Mir => "Mir",
            CardBrand::Elo => "Elo",
            CardBrand::Hiper => "Hiper",
            CardBrand::Hipercard => "Hipercard",
        }
    }
}

impl fmt::Display for CardBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn prefix_width(lo: u32) -> usize {
    lo.to_string().len()
}

fn prefix_in_range(digits: &str, lo: u32, hi: u32) -> bool {
    digits
        .get(..prefix_width(lo))
        .and_then(|prefix| prefix.parse::<u32>().ok())
        .is_some_and(|prefix| (lo..=hi).contains(&prefix))
}

/// Strip the grouping the card field mask inserts; `None` if anything else is present
pub fn normalize_number(input: &str) -> Option<String> {
    let digits: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    (!digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())).then_some(digits)
}

/// Brand of a possibly partial card number, for display next to the field
pub fn card_brand(input: &str) -> Option<CardBrand> {
    normalize_number(input).and_then(|digits| CardBrand::detect(&digits))
}

/// Luhn (mod 10) checksum over ASCII digits
pub fn luhn(digits: &str) -> bool {
    let mut sum = 0;
    for (i, b) in digits.bytes().rev().enumerate() {
        if !b.is_ascii_digit() {
            return false;
        }
        let mut d = u32::from(b - b'0');
        if i % 2 == 1 {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
    }
    !digits.is_empty() && sum % 10 == 0
}

/// Check a card number and return its brand
pub fn validate_number(input: &str) -> Result<CardBrand, ValidationError> {
    let digits = normalize_number(input).ok_or(ValidationError::InvalidCardNumber)?;
    let brand = CardBrand::detect(&digits).ok_or(ValidationError::InvalidCardNumber)?;

    if !brand.lengths().contains(&digits.len()) {
        return Err(ValidationError::InvalidCardNumber);
    }
    if brand.requires_luhn() && !luhn(&digits) {
        return Err(ValidationError::InvalidCardNumber);
    }
    Ok(brand)
}

/// Parse `MM/YY`, `MM/YYYY`, `MMYY` or `MMYYYY` into (month, year)
pub fn parse_expiry(input: &str) -> Option<(u32, i32)> {
    let input = input.trim();
    let (month, year) = match input.split_once('/') {
        Some((month, year)) => (month.trim(), year.trim()),
        None if input.is_ascii() && (input.len() == 4 || input.len() == 6) => input.split_at(2),
        None => return None,
    };

    if month.is_empty() || month.len() > 2 || !month.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let month: u32 = month.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }

    let year: i32 = match year.len() {
        2 => 2000 + year.parse::<i32>().ok()?,
        4 => year.parse().ok()?,
        _ => return None,
    };

    Some((month, year))
}

/// Check an expiry date against `today`; a card is valid through its expiry month
pub fn validate_expiry(input: &str, today: NaiveDate) -> Result<(), ValidationError> {
    let (month, year) = parse_expiry(input).ok_or(ValidationError::InvalidExpiry)?;

    if (year, month) < (today.year(), today.month()) {
        return Err(ValidationError::InvalidExpiry);
    }
    if year > today.year() + MAX_YEARS_AHEAD {
        return Err(ValidationError::InvalidExpiry);
    }
    Ok(())
}

/// Check a security code; the expected length follows the brand, 3 digits when unknown
pub fn validate_cvv(input: &str, brand: Option<CardBrand>) -> Result<(), ValidationError> {
    let expected = brand.map_or(3, CardBrand::cvv_length);
    let input = input.trim();

    if input.len() == expected && input.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidCvv)
    }
}

/// Show only the last four digits, e.g. `•••• 1111`
pub fn mask_number(input: &str) -> String {
    let digits = normalize_number(input).unwrap_or_default();
    let tail = digits.len().saturating_sub(4);
    format!("•••• {}", &digits[tail..])
}
