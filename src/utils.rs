// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::HoldingId;
use anyhow::{Context, Result};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use std::io::{BufRead, Write};

const UA: &str = concat!("mc360/", env!("CARGO_PKG_VERSION"));

/// Environment override for the CAS parser base URL.
pub const CAS_API_ENV: &str = "MC360_CAS_API";
const CAS_API_KEY: &str = "cas_api";

pub fn http_client() -> Result<reqwest::blocking::Client> {
    let c = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(60))
        .user_agent(UA)
        .build()?;
    Ok(c)
}

pub fn parse_id(s: &str) -> Result<HoldingId> {
    s.trim()
        .parse::<HoldingId>()
        .with_context(|| format!("Invalid holding id '{}'", s))
}

pub fn fmt_money(d: &Decimal) -> String {
    format!("₹{}", d.round_dp(2).normalize())
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(v)
}

fn normalize_base_url(raw: &str) -> Option<String> {
    let v = raw.trim().trim_end_matches('/');
    (!v.is_empty()).then(|| v.to_string())
}

/// Configured CAS parser base URL: environment first, then the settings table.
pub fn get_cas_api(conn: &Connection) -> Result<Option<String>> {
    if let Some(v) = std::env::var(CAS_API_ENV).ok().and_then(|v| normalize_base_url(&v)) {
        return Ok(Some(v));
    }
    Ok(get_setting(conn, CAS_API_KEY)?.and_then(|v| normalize_base_url(&v)))
}

pub fn set_cas_api(conn: &Connection, url: &str) -> Result<()> {
    let url = normalize_base_url(url).context("Base URL must not be empty")?;
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![CAS_API_KEY, url],
    )?;
    Ok(())
}

pub fn clear_cas_api(conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM settings WHERE key=?1", params![CAS_API_KEY])?;
    Ok(())
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

/// Ask a yes/no question. Anything but y/yes (or EOF) is a no.
pub fn confirm_with<R: BufRead, W: Write>(prompt: &str, input: &mut R, out: &mut W) -> Result<bool> {
    write!(out, "{} [y/N] ", prompt)?;
    out.flush()?;
    let mut answer = String::new();
    if input.read_line(&mut answer)? == 0 {
        return Ok(false);
    }
    let a = answer.trim();
    Ok(a.eq_ignore_ascii_case("y") || a.eq_ignore_ascii_case("yes"))
}

pub fn confirm(prompt: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    let stdin = std::io::stdin();
    confirm_with(prompt, &mut stdin.lock(), &mut std::io::stdout())
}
