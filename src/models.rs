// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

pub type HoldingId = u64;

/// Upper bound (exclusive) for generated holding ids.
pub const ID_SPACE: u64 = 1_000_000_000;

/// Stored in place of an id that could not be read; never drawn for a holding.
pub const UNASSIGNED_ID: HoldingId = 0;

/// Largest amount a holding can carry. Larger inputs are clamped to it.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// Fixed set of holding categories, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Category {
    MutualFunds,
    FixedDeposits,
    Lic,
    Ulip,
    Ppf,
    Ssy,
    Gold,
    Bonds,
    Stocks,
    RealEstate,
    Nps,
    Epf,
    ReitInvit,
    Etf,
    Sgb,
    #[default]
    Others,
}

impl Category {
    pub const ALL: [Category; 16] = [
        Category::MutualFunds,
        Category::FixedDeposits,
        Category::Lic,
        Category::Ulip,
        Category::Ppf,
        Category::Ssy,
        Category::Gold,
        Category::Bonds,
        Category::Stocks,
        Category::RealEstate,
        Category::Nps,
        Category::Epf,
        Category::ReitInvit,
        Category::Etf,
        Category::Sgb,
        Category::Others,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::MutualFunds => "Mutual Funds",
            Category::FixedDeposits => "Fixed Deposits",
            Category::Lic => "LIC",
            Category::Ulip => "ULIP",
            Category::Ppf => "PPF",
            Category::Ssy => "SSY",
            Category::Gold => "Gold",
            Category::Bonds => "Bonds",
            Category::Stocks => "Stocks",
            Category::RealEstate => "Real Estate",
            Category::Nps => "NPS",
            Category::Epf => "EPF",
            Category::ReitInvit => "REIT/INVIT",
            Category::Etf => "ETF",
            Category::Sgb => "SGB",
            Category::Others => "Others",
        }
    }

    /// Case-insensitive lookup by label.
    pub fn from_label(s: &str) -> Option<Category> {
        let s = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::from_label(s).ok_or_else(|| {
            let known: Vec<&str> = Category::ALL.iter().map(|c| c.label()).collect();
            format!("Unknown category '{}' (expected one of: {})", s.trim(), known.join(", "))
        })
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let v = Value::deserialize(deserializer)?;
        Ok(v.as_str()
            .and_then(Category::from_label)
            .unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: HoldingId,
    #[serde(default, deserialize_with = "lenient_name")]
    pub name: String,
    #[serde(default)]
    pub category: Category,
    #[serde(
        default,
        serialize_with = "amount_as_number",
        deserialize_with = "lenient_amount"
    )]
    pub invested: Decimal,
    #[serde(
        default,
        serialize_with = "amount_as_number",
        deserialize_with = "lenient_amount"
    )]
    pub current: Decimal,
}

/// A holding before it has been assigned an id.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewHolding {
    pub name: String,
    pub category: Category,
    pub invested: Decimal,
    pub current: Decimal,
}

impl NewHolding {
    pub fn with_id(self, id: HoldingId) -> Holding {
        Holding {
            id,
            name: self.name,
            category: self.category,
            invested: self.invested,
            current: self.current,
        }
    }
}

/// Field-wise update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HoldingPatch {
    pub name: Option<String>,
    pub category: Option<Category>,
    pub invested: Option<Decimal>,
    pub current: Option<Decimal>,
}

impl HoldingPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.invested.is_none()
            && self.current.is_none()
    }

    pub fn apply(&self, h: &mut Holding) {
        if let Some(name) = &self.name {
            h.name = name.clone();
        }
        if let Some(category) = self.category {
            h.category = category;
        }
        if let Some(invested) = self.invested {
            h.invested = invested;
        }
        if let Some(current) = self.current {
            h.current = current;
        }
    }
}

/// Coerce an arbitrary value into an amount in `0..=MAX_AMOUNT`; anything unusable is zero.
pub fn amount_from_value(v: &Value) -> Decimal {
    let d = match v {
        Value::Number(n) => parse_amount_str(&n.to_string()),
        Value::String(s) => parse_amount_str(s),
        _ => None,
    };
    match d {
        Some(d) if d > MAX_AMOUNT => MAX_AMOUNT,
        Some(d) if d.is_sign_positive() => d.normalize(),
        _ => Decimal::ZERO,
    }
}

fn parse_amount_str(s: &str) -> Option<Decimal> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// Lenient amount parsing for user input: invalid or negative values become zero.
pub fn coerce_amount(s: &str) -> Decimal {
    amount_from_value(&Value::String(s.to_string()))
}

fn lenient_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
    let v = Value::deserialize(deserializer)?;
    Ok(amount_from_value(&v))
}

fn lenient_name<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let v = Value::deserialize(deserializer)?;
    Ok(match v {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Unusable ids (missing, negative, fractional, zero) read as [`UNASSIGNED_ID`].
fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<HoldingId, D::Error> {
    let v = Value::deserialize(deserializer)?;
    let id = match &v {
        Value::Number(n) => n.as_u64().or_else(|| {
            Decimal::from_str(&n.to_string())
                .ok()
                .filter(|d| d.is_sign_positive() && d.fract().is_zero())
                .and_then(|d| d.to_u64())
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    Ok(id.unwrap_or(UNASSIGNED_ID))
}

/// Write the exact decimal text as a JSON number (`100000`, `156600.5`).
fn amount_as_number<S: Serializer>(d: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
    use serde::ser::Error;
    let n = serde_json::Number::from_str(&d.normalize().to_string()).map_err(S::Error::custom)?;
    n.serialize(serializer)
}
