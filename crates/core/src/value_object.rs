//! Value objects: equality by value, not identity.
//!
//! Value objects have **no identity** - they are defined entirely by their
//! attribute values. Report totals are built from them.

use serde::{Deserialize, Serialize};

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" a
/// value object, create a new one.
///
/// ## Value Object vs Entity
///
/// - **Value Object**: `Money { amount: 100, currency: "USD" }`
/// - **Entity**: an invoice with its own `InvoiceId`
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

/// ISO 4217 currency code as reported by the host (e.g. `GTQ`, `USD`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_ascii_uppercase())
    }

    /// Guatemalan quetzal.
    pub fn gtq() -> Self {
        Self("GTQ".to_string())
    }

    /// United States dollar.
    pub fn usd() -> Self {
        Self("USD".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl ValueObject for CurrencyCode {}

/// Monetary amount in the smallest currency unit (e.g. cents).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    pub amount: i64,
    pub currency: CurrencyCode,
}

impl Money {
    pub fn new(amount: i64, currency: CurrencyCode) -> Self {
        Self { amount, currency }
    }

    /// Adds two amounts of the same currency.
    ///
    /// Returns `None` on currency mismatch or overflow.
    pub fn checked_add(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        let amount = self.amount.checked_add(other.amount)?;
        Some(Money::new(amount, self.currency.clone()))
    }

    /// Sums every amount denominated in `currency`, ignoring the rest.
    ///
    /// Saturates instead of overflowing; report totals never fail.
    pub fn sum_in<'a>(currency: &CurrencyCode, amounts: impl IntoIterator<Item = &'a Money>) -> Money {
        let amount = amounts
            .into_iter()
            .filter(|m| &m.currency == currency)
            .fold(0i64, |acc, m| acc.saturating_add(m.amount));
        Money::new(amount, currency.clone())
    }
}

impl ValueObject for Money {}
