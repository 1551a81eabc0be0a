// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Category, Holding};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// `gain / base * 100`, or zero when `base` is zero. Saturates instead of overflowing.
pub fn pct(gain: Decimal, base: Decimal) -> Decimal {
    if base.is_zero() || gain.is_zero() {
        return Decimal::ZERO;
    }
    gain.checked_div(base)
        .and_then(|q| q.checked_mul(HUNDRED))
        .unwrap_or(if gain.is_sign_negative() == base.is_sign_negative() {
            Decimal::MAX
        } else {
            Decimal::MIN
        })
}

/// Return on a single holding, in percent.
pub fn return_pct(h: &Holding) -> Decimal {
    pct(h.current.saturating_sub(h.invested), h.invested)
}

/// One-decimal percentage for display.
pub fn fmt_pct(p: Decimal) -> String {
    format!("{:.1}%", p.round_dp(1))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub invested: Decimal,
    pub current: Decimal,
    pub profit: Decimal,
    pub profit_pct: Decimal,
}

pub fn totals(items: &[Holding]) -> Totals {
    let (invested, current) = items
        .iter()
        .fold((Decimal::ZERO, Decimal::ZERO), |(i, c), h| {
            (i.saturating_add(h.invested), c.saturating_add(h.current))
        });
    let profit = current.saturating_sub(invested);
    Totals {
        invested,
        current,
        profit,
        profit_pct: pct(profit, invested),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryAggregate {
    pub category: Category,
    pub invested: Decimal,
    pub current: Decimal,
}

impl CategoryAggregate {
    /// Current value if any, else the invested amount.
    pub fn value(&self) -> Decimal {
        if !self.current.is_zero() {
            self.current
        } else {
            self.invested
        }
    }
}

/// Group holdings by category, in the fixed category order.
pub fn by_category(items: &[Holding]) -> Vec<CategoryAggregate> {
    let mut groups: BTreeMap<Category, (Decimal, Decimal)> = BTreeMap::new();
    for h in items {
        let entry = groups.entry(h.category).or_default();
        entry.0 = entry.0.saturating_add(h.invested);
        entry.1 = entry.1.saturating_add(h.current);
    }
    groups
        .into_iter()
        .map(|(category, (invested, current))| CategoryAggregate {
            category,
            invested,
            current,
        })
        .collect()
}

/// Category filter: either every category or exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryTab {
    #[default]
    All,
    Only(Category),
}

impl CategoryTab {
    pub fn admits(self, c: Category) -> bool {
        match self {
            CategoryTab::All => true,
            CategoryTab::Only(tab) => tab == c,
        }
    }
}

impl FromStr for CategoryTab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(CategoryTab::All)
        } else {
            s.parse::<Category>().map(CategoryTab::Only)
        }
    }
}

impl fmt::Display for CategoryTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryTab::All => f.write_str("All"),
            CategoryTab::Only(c) => c.fmt(f),
        }
    }
}

pub fn matches(h: &Holding, tab: CategoryTab, query: &str) -> bool {
    if !tab.admits(h.category) {
        return false;
    }
    let q = query.trim().to_lowercase();
    q.is_empty()
        || h.name.to_lowercase().contains(&q)
        || h.category.label().to_lowercase().contains(&q)
}

pub fn filter<'a>(items: &'a [Holding], tab: CategoryTab, query: &str) -> Vec<&'a Holding> {
    items.iter().filter(|h| matches(h, tab, query)).collect()
}
