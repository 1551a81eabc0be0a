// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::db_path;
use crate::utils::{CAS_API_ENV, clear_cas_api, get_cas_api, pretty_table, set_cas_api};
use anyhow::{Result, bail};
use rusqlite::Connection;

pub fn is_http_url(url: &str) -> bool {
    let lower = url.trim().to_ascii_lowercase();
    ["http://", "https://"]
        .iter()
        .any(|p| lower.starts_with(p) && lower.len() > p.len())
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set-api", sub)) => {
            let url = sub.get_one::<String>("url").unwrap().trim();
            if !is_http_url(url) {
                bail!("CAS parser URL must start with http:// or https:// (got '{}')", url);
            }
            set_cas_api(conn, url)?;
            println!("CAS parser set to {}", url.trim_end_matches('/'));
        }
        Some(("clear-api", _)) => {
            clear_cas_api(conn)?;
            println!("CAS parser cleared; imports will use the local preview");
        }
        Some(("show", _)) => {
            let api = get_cas_api(conn)?;
            let source = if std::env::var(CAS_API_ENV).is_ok_and(|v| !v.trim().is_empty()) {
                CAS_API_ENV
            } else {
                "settings"
            };
            let rows = vec![
                vec!["database".to_string(), db_path()?.display().to_string()],
                vec![
                    "cas_api".to_string(),
                    match api {
                        Some(url) => format!("{} ({})", url, source),
                        None => "(not configured)".to_string(),
                    },
                ],
            ];
            println!("{}", pretty_table(&["Setting", "Value"], rows));
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::is_http_url;

    #[test]
    fn only_http_schemes_pass() {
        assert!(is_http_url("https://cas.example.com"));
        assert!(is_http_url("HTTP://localhost:8000"));
        assert!(!is_http_url("https://"));
        assert!(!is_http_url("ftp://cas.example.com"));
        assert!(!is_http_url("cas.example.com"));
    }
}
