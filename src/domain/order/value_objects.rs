use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::MoneyParseError;

// ============================================================================
// Order Value Objects
// ============================================================================

/// Signed monetary amount held as minor units (two decimal places).
///
/// Serialized as decimal text (`"150.00"`); deserializes from decimal text or
/// a JSON integer of whole units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "MoneyRepr", into = "String")]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn from_units(units: i64) -> Self {
        Self(units * 100)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Strictly greater than zero.
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl FromStr for Money {
    type Err = MoneyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };

        let (units, fraction) = digits.split_once('.').unwrap_or((digits, ""));
        if units.is_empty() && fraction.is_empty() {
            return Err(MoneyParseError::Empty);
        }
        if !units.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(MoneyParseError::InvalidDigits(s.to_string()));
        }
        if fraction.len() > 2 {
            return Err(MoneyParseError::TooPrecise(s.to_string()));
        }

        let overflow = || MoneyParseError::Overflow(s.to_string());
        let whole: i64 = if units.is_empty() {
            0
        } else {
            units.parse().map_err(|_| overflow())?
        };
        let cents: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| overflow())? * 10,
            _ => fraction.parse().map_err(|_| overflow())?,
        };

        let total = whole
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or_else(overflow)?;

        Ok(Money(if negative { -total } else { total }))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MoneyRepr {
    Units(i64),
    Text(String),
}

impl TryFrom<MoneyRepr> for Money {
    type Error = MoneyParseError;

    fn try_from(repr: MoneyRepr) -> Result<Self, Self::Error> {
        match repr {
            MoneyRepr::Units(units) => units
                .checked_mul(100)
                .map(Money)
                .ok_or_else(|| MoneyParseError::Overflow(units.to_string())),
            MoneyRepr::Text(text) => text.parse(),
        }
    }
}

impl From<Money> for String {
    fn from(money: Money) -> Self {
        money.to_string()
    }
}

/// The unit of work handed to the order processor.
///
/// Owned by the caller; the processor only flips `is_processed`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Order {
    /// Assigned by persistence; 0 until then.
    #[serde(default)]
    pub id: i64,
    pub customer_email: String,
    pub total_amount: Money,
    #[serde(default)]
    pub is_processed: bool,
}

impl Order {
    pub fn new(id: i64, customer_email: impl Into<String>, total_amount: Money) -> Self {
        Self {
            id,
            customer_email: customer_email.into(),
            total_amount,
            is_processed: false,
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
