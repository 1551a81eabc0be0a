// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::cas::{CasEntry, CasParser, ImportSession, MockParser, RemoteParser};
use crate::store::HoldingStore;
use crate::utils::{confirm, fmt_money, get_cas_api, http_client, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use std::path::Path;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    handle_with(conn, m, &MockParser::default())
}

/// Same as [`handle`] with an explicit preview parser.
pub fn handle_with(conn: &Connection, m: &clap::ArgMatches, previewer: &dyn CasParser) -> Result<()> {
    match m.subcommand() {
        Some(("preview", sub)) => preview(sub, previewer),
        Some(("import", sub)) => import(conn, sub, previewer),
        _ => Ok(()),
    }
}

fn select(sub: &clap::ArgMatches) -> Result<ImportSession> {
    let path = sub.get_one::<String>("file").unwrap().trim();
    let password = sub.get_one::<String>("password").cloned();
    let mut session = ImportSession::new();
    session.select(Path::new(path), password)?;
    Ok(session)
}

fn print_entries(entries: &[CasEntry]) {
    if entries.is_empty() {
        println!("No preview - the statement produced no entries");
        return;
    }
    let rows = entries
        .iter()
        .enumerate()
        .map(|(i, e)| {
            vec![
                (i + 1).to_string(),
                e.display_name().to_string(),
                e.folio_label(),
                fmt_money(&e.current_amount()),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["#", "Scheme", "Folio", "Current"], rows));
}

fn preview(sub: &clap::ArgMatches, previewer: &dyn CasParser) -> Result<()> {
    let mut session = select(sub)?;
    println!("Parsing...");
    let entries = session.run_preview(previewer)?;
    print_entries(entries);
    Ok(())
}

fn import(conn: &Connection, sub: &clap::ArgMatches, previewer: &dyn CasParser) -> Result<()> {
    let mut store = HoldingStore::load(conn)?;
    let mut session = select(sub)?;
    let pick: Vec<usize> = sub
        .get_many::<usize>("pick")
        .map(|v| v.copied().collect())
        .unwrap_or_default();
    let assume_yes = sub.get_flag("yes");

    let remote = match get_cas_api(conn)? {
        Some(base) => Some(RemoteParser::new(http_client()?, &base)),
        None => None,
    };

    let mut batch = match &remote {
        Some(parser) => {
            let prompt = format!("Upload statement to {}?", parser.endpoint());
            if !confirm(&prompt, assume_yes)? {
                println!("Cancelled");
                return Ok(());
            }
            println!("Importing...");
            session.run_import(Some(parser as &dyn CasParser), &pick)?
        }
        None => {
            println!("Parsing...");
            let entries = session.run_preview(previewer)?;
            print_entries(entries);
            let count = if pick.is_empty() { entries.len() } else { pick.len() };
            if count == 0 {
                return Ok(());
            }
            if !confirm(&format!("Import {} entries?", count), assume_yes)? {
                println!("Cancelled");
                return Ok(());
            }
            session.run_import(None, &pick)?
        }
    };

    let n = store.merge_imported(&mut batch)?;
    println!("Imported {} holdings", n);
    Ok(())
}
