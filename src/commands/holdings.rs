// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::analytics::{CategoryTab, filter, fmt_pct, return_pct};
use crate::models::{Category, Holding, HoldingPatch, NewHolding, coerce_amount};
use crate::store::HoldingStore;
use crate::utils::{confirm, fmt_money, maybe_print_json, parse_id, pretty_table};
use anyhow::{Result, anyhow, bail};
use rusqlite::Connection;

pub const EMPTY_LIST: &str = "No investments yet - import CAS or add manually.";

pub fn handle(conn: &Connection, name: &str, sub: &clap::ArgMatches) -> Result<()> {
    let mut store = HoldingStore::load(conn)?;
    match name {
        "add" => add(&mut store, sub)?,
        "list" => list(&store, sub)?,
        "rename" => rename(&mut store, sub)?,
        "update" => update(&mut store, sub)?,
        "rm" => remove(&mut store, sub)?,
        "clear" => clear(&mut store, sub)?,
        "samples" => {
            let n = store.add_samples()?;
            println!("Added {} sample holdings", n);
        }
        _ => {}
    }
    Ok(())
}

fn parse_category(raw: &str) -> Result<Category> {
    raw.parse::<Category>().map_err(|e| anyhow!(e))
}

fn add(store: &mut HoldingStore<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub
        .get_one::<String>("name")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .unwrap_or("Untitled")
        .to_string();
    let category = match sub.get_one::<String>("category") {
        Some(raw) => parse_category(raw)?,
        None => Category::default(),
    };
    let invested = sub
        .get_one::<String>("invested")
        .map(|s| coerce_amount(s))
        .unwrap_or_default();
    let current = sub
        .get_one::<String>("current")
        .map(|s| coerce_amount(s))
        .unwrap_or_default();

    let h = store.add(NewHolding {
        name,
        category,
        invested,
        current,
    })?;
    println!(
        "Added {} '{}' ({}, invested {}, current {})",
        h.id,
        h.name,
        h.category,
        fmt_money(&h.invested),
        fmt_money(&h.current)
    );
    Ok(())
}

pub fn holding_row(h: &Holding) -> Vec<String> {
    vec![
        h.id.to_string(),
        h.name.clone(),
        h.category.to_string(),
        fmt_money(&h.invested),
        fmt_money(&h.current),
        fmt_pct(return_pct(h)),
    ]
}

fn list(store: &HoldingStore<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let tab = match sub.get_one::<String>("tab") {
        Some(raw) => raw.parse::<CategoryTab>().map_err(|e| anyhow!(e))?,
        None => CategoryTab::All,
    };
    let query = sub.get_one::<String>("query").map(String::as_str).unwrap_or("");
    let shown = filter(store.list(), tab, query);

    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &shown)? {
        return Ok(());
    }
    if shown.is_empty() {
        println!("{}", EMPTY_LIST);
    } else {
        let rows = shown.iter().map(|h| holding_row(h)).collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Name", "Category", "Invested", "Current", "Return %"],
                rows
            )
        );
    }
    println!("Items: {}", shown.len());
    Ok(())
}

fn rename(store: &mut HoldingStore<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let id = parse_id(sub.get_one::<String>("id").unwrap())?;
    let name = sub.get_one::<String>("name").unwrap().trim();
    if name.is_empty() {
        println!("Empty name; nothing changed");
        return Ok(());
    }
    if store.rename(id, name)? {
        println!("Renamed {} to '{}'", id, name);
    } else {
        println!("No holding with id {}; nothing changed", id);
    }
    Ok(())
}

fn update(store: &mut HoldingStore<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let id = parse_id(sub.get_one::<String>("id").unwrap())?;
    let patch = HoldingPatch {
        name: sub
            .get_one::<String>("name")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        category: sub
            .get_one::<String>("category")
            .map(|s| parse_category(s))
            .transpose()?,
        invested: sub.get_one::<String>("invested").map(|s| coerce_amount(s)),
        current: sub.get_one::<String>("current").map(|s| coerce_amount(s)),
    };
    if patch.is_empty() {
        bail!("Nothing to update: pass --current, --invested, --category or --name");
    }
    if store.update(id, &patch)? {
        if let Some(h) = store.get(id) {
            println!(
                "Updated {} '{}': invested {}, current {}",
                h.id,
                h.name,
                fmt_money(&h.invested),
                fmt_money(&h.current)
            );
        }
    } else {
        println!("No holding with id {}; nothing changed", id);
    }
    Ok(())
}

fn remove(store: &mut HoldingStore<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let id = parse_id(sub.get_one::<String>("id").unwrap())?;
    let Some(name) = store.get(id).map(|h| h.name.clone()) else {
        println!("No holding with id {}; nothing changed", id);
        return Ok(());
    };
    if !confirm(&format!("Delete '{}'?", name), sub.get_flag("yes"))? {
        println!("Cancelled");
        return Ok(());
    }
    store.remove(id)?;
    println!("Removed {} '{}'", id, name);
    Ok(())
}

fn clear(store: &mut HoldingStore<'_>, sub: &clap::ArgMatches) -> Result<()> {
    if !confirm("Clear portfolio?", sub.get_flag("yes"))? {
        println!("Cancelled");
        return Ok(());
    }
    store.clear()?;
    println!("Portfolio cleared");
    Ok(())
}
