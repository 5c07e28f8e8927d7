//! Cpf - Brazilian individual taxpayer identifier

use serde::{Deserialize, Serialize};

/// CPF in canonical digits-only form
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cpf(String);

impl Cpf {
    /// Number of digits in a complete CPF
    pub const LENGTH: usize = 11;

    /// Parse a user-entered value, accepting punctuation.
    ///
    /// Returns `None` unless the value contains exactly 11 digits.
    pub fn parse(raw: &str) -> Option<Self> {
        let digits = Self::normalize(raw);
        (digits.len() == Self::LENGTH).then_some(Self(digits))
    }

    /// Strip everything that is not an ASCII digit
    pub fn normalize(raw: &str) -> String {
        raw.chars().filter(char::is_ascii_digit).collect()
    }

    /// Render with progressive punctuation (`000.000.000-00`).
    ///
    /// Partial values are punctuated as far as they go, so this can be
    /// applied while the user is still typing. Digits beyond the eleventh
    /// are dropped.
    pub fn format(raw: &str) -> String {
        let digits = Self::normalize(raw);
        let len = digits.len();

        match len {
            0..=3 => digits,
            4..=6 => format!("{}.{}", &digits[..3], &digits[3..]),
            7..=9 => format!("{}.{}.{}", &digits[..3], &digits[3..6], &digits[6..]),
            _ => format!(
                "{}.{}.{}-{}",
                &digits[..3],
                &digits[3..6],
                &digits[6..9],
                &digits[9..len.min(Self::LENGTH)]
            ),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Cpf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", Self::format(&self.0))
    }
}

impl std::str::FromStr for Cpf {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("CPF must have 11 digits: {}", s))
    }
}
