// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Holding;
use crate::store::HoldingStore;
use anyhow::{Result, bail};
use csv::{QuoteStyle, WriterBuilder};
use rusqlite::Connection;

pub const CSV_HEADER: &str = "id,name,category,invested,current";

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("holdings", sub)) => export_holdings(conn, sub),
        _ => Ok(()),
    }
}

fn quoted(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

/// CSV with an unquoted header; name and category are always double-quoted.
pub fn holdings_csv(items: &[Holding]) -> Result<String> {
    let mut buf = CSV_HEADER.as_bytes().to_vec();
    buf.push(b'\n');
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Never)
        .from_writer(buf);
    for h in items {
        wtr.write_record([
            h.id.to_string(),
            quoted(&h.name),
            quoted(h.category.label()),
            h.invested.normalize().to_string(),
            h.current.normalize().to_string(),
        ])?;
    }
    let bytes = wtr.into_inner().map_err(|e| anyhow::anyhow!(e.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

pub fn holdings_json(items: &[Holding]) -> Result<String> {
    Ok(serde_json::to_string_pretty(items)?)
}

fn export_holdings(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub
        .get_one::<String>("format")
        .map(|s| s.trim().to_lowercase())
        .unwrap_or_else(|| "csv".to_string());
    let store = HoldingStore::load(conn)?;

    let body = match fmt.as_str() {
        "csv" => holdings_csv(store.list())?,
        "json" => holdings_json(store.list())?,
        _ => bail!("Unknown format: {} (use csv|json)", fmt),
    };

    match sub.get_one::<String>("out").map(|s| s.trim()) {
        Some(out) if !out.is_empty() => {
            std::fs::write(out, &body)?;
            eprintln!("Exported {} holdings to {}", store.len(), out);
        }
        _ => print!("{}", body),
    }
    Ok(())
}
