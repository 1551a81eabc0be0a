// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::config::is_http_url;
use crate::db::kv_get;
use crate::models::UNASSIGNED_ID;
use crate::store::{STORAGE_KEY, decode};
use crate::utils::{get_cas_api, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use std::collections::HashSet;

/// Collect (issue, detail) pairs for the stored portfolio and settings.
pub fn diagnose(conn: &Connection) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();

    if let Some(raw) = kv_get(conn, STORAGE_KEY)? {
        match decode(&raw) {
            Err(e) => rows.push(vec!["undecodable_store".into(), e.to_string()]),
            Ok(decoded) => {
                for index in &decoded.skipped {
                    rows.push(vec!["skipped_record".into(), format!("element #{}", index)]);
                }
                let mut seen = HashSet::new();
                for h in &decoded.items {
                    if h.id == UNASSIGNED_ID {
                        rows.push(vec!["missing_id".into(), h.name.clone()]);
                    } else if !seen.insert(h.id) {
                        rows.push(vec!["duplicate_id".into(), h.id.to_string()]);
                    }
                    if h.name.trim().is_empty() {
                        rows.push(vec!["empty_name".into(), h.id.to_string()]);
                    }
                }
            }
        }
    }

    if let Some(url) = get_cas_api(conn)? {
        if !is_http_url(&url) {
            rows.push(vec!["invalid_cas_api".into(), url]);
        }
    }
    Ok(rows)
}

pub fn handle(conn: &Connection) -> Result<()> {
    let rows = diagnose(conn)?;
    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
