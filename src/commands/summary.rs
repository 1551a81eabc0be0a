// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::allocation;
use crate::analytics::{CategoryAggregate, Totals, by_category, fmt_pct, pct, totals};
use crate::db::kv_updated_at;
use crate::store::{HoldingStore, STORAGE_KEY};
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CategoryRow {
    pub category: String,
    pub invested: Decimal,
    pub current: Decimal,
    pub value: Decimal,
    pub return_pct: Decimal,
}

impl From<&CategoryAggregate> for CategoryRow {
    fn from(a: &CategoryAggregate) -> Self {
        Self {
            category: a.category.label().to_string(),
            invested: a.invested,
            current: a.current,
            value: a.value(),
            return_pct: pct(a.current - a.invested, a.invested),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub items: usize,
    pub totals: Totals,
    pub categories: Vec<CategoryRow>,
    pub last_saved: Option<String>,
}

pub fn summarize(conn: &Connection) -> Result<Summary> {
    let store = HoldingStore::load(conn)?;
    let items = store.list();
    Ok(Summary {
        items: items.len(),
        totals: totals(items),
        categories: by_category(items).iter().map(CategoryRow::from).collect(),
        last_saved: kv_updated_at(conn, STORAGE_KEY)?,
    })
}

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let s = summarize(conn)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
        return Ok(());
    }

    let t = &s.totals;
    let sign = if t.profit.is_sign_negative() { "" } else { "+" };
    println!(
        "{}",
        pretty_table(
            &["Total Invested", "Current Value", "Profit / Loss"],
            vec![vec![
                fmt_money(&t.invested),
                fmt_money(&t.current),
                format!("{}{} ({})", sign, fmt_money(&t.profit), fmt_pct(t.profit_pct)),
            ]],
        )
    );

    if !s.categories.is_empty() {
        let rows = s
            .categories
            .iter()
            .map(|c| {
                vec![
                    c.category.clone(),
                    fmt_money(&c.invested),
                    fmt_money(&c.current),
                    fmt_money(&c.value),
                    fmt_pct(c.return_pct),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Category", "Invested", "Current", "Value", "Return %"],
                rows
            )
        );
    }
    println!("Items: {}", s.items);
    if let Some(ts) = &s.last_saved {
        println!("Last saved: {}", ts);
    }
    Ok(())
}

pub fn handle_allocation(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let store = HoldingStore::load(conn)?;
    let segments = allocation::segments(&by_category(store.list()));
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &segments)? {
        return Ok(());
    }
    println!("{}", allocation::render(&segments));
    Ok(())
}
