// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use mycapital360::commands::{config, doctor, summary};
use mycapital360::db::{init_schema, kv_set};
use mycapital360::store::{HoldingStore, STORAGE_KEY};
use mycapital360::{cli, utils};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;

fn base_conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    init_schema(&conn).unwrap();
    conn
}

#[test]
fn clean_store_has_no_issues() {
    let conn = base_conn();
    HoldingStore::load(&conn).unwrap().add_samples().unwrap();
    assert!(doctor::diagnose(&conn).unwrap().is_empty());
}

#[test]
fn doctor_flags_duplicates_blank_names_and_bad_blobs() {
    let conn = base_conn();
    kv_set(
        &conn,
        STORAGE_KEY,
        r#"[{"id":1,"name":"a"},{"id":1,"name":" "}]"#,
    )
    .unwrap();
    let issues: Vec<String> = doctor::diagnose(&conn)
        .unwrap()
        .into_iter()
        .map(|r| r[0].clone())
        .collect();
    assert_eq!(issues, ["duplicate_id", "empty_name"]);

    kv_set(&conn, STORAGE_KEY, "[{").unwrap();
    let issues = doctor::diagnose(&conn).unwrap();
    assert_eq!(issues[0][0], "undecodable_store");
}

#[test]
fn doctor_flags_records_without_ids_and_non_records() {
    let conn = base_conn();
    kv_set(
        &conn,
        STORAGE_KEY,
        r#"[{"id":1,"name":"ok"},{"id":1.5,"name":"odd id"},42]"#,
    )
    .unwrap();
    let issues = doctor::diagnose(&conn).unwrap();
    assert_eq!(
        issues,
        vec![
            vec!["skipped_record".to_string(), "element #2".to_string()],
            vec!["missing_id".to_string(), "odd id".to_string()],
        ]
    );

    // Opening the store assigns the id and rewrites the blob without the stray element.
    assert_eq!(HoldingStore::load(&conn).unwrap().len(), 2);
    assert!(doctor::diagnose(&conn).unwrap().is_empty());
}

#[test]
fn doctor_flags_non_http_backend() {
    let conn = base_conn();
    conn.execute(
        "INSERT INTO settings(key, value) VALUES('cas_api', ?1)",
        params!["cas.internal:9000"],
    )
    .unwrap();
    let issues = doctor::diagnose(&conn).unwrap();
    assert_eq!(issues, vec![vec!["invalid_cas_api".to_string(), "cas.internal:9000".to_string()]]);
}

#[test]
fn set_api_validates_and_trims() {
    let conn = base_conn();
    let matches = cli::build_cli().get_matches_from([
        "mc360", "config", "set-api", "--url", "ftp://cas.example.com",
    ]);
    let Some(("config", config_m)) = matches.subcommand() else {
        panic!("no config subcommand");
    };
    assert!(config::handle(&conn, config_m).is_err());

    let matches = cli::build_cli().get_matches_from([
        "mc360", "config", "set-api", "--url", "https://cas.example.com/",
    ]);
    let Some(("config", config_m)) = matches.subcommand() else {
        panic!("no config subcommand");
    };
    config::handle(&conn, config_m).unwrap();
    let stored: String = conn
        .query_row("SELECT value FROM settings WHERE key='cas_api'", [], |r| r.get(0))
        .unwrap();
    assert_eq!(stored, "https://cas.example.com");

    utils::clear_cas_api(&conn).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM settings WHERE key='cas_api'", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn summary_reports_totals_and_categories() {
    let conn = base_conn();
    kv_set(
        &conn,
        STORAGE_KEY,
        r#"[{"id":1,"name":"HDFC MF","category":"Mutual Funds","invested":100000,"current":156600},
            {"id":2,"name":"Bank FD","category":"Fixed Deposits","invested":200000,"current":222600}]"#,
    )
    .unwrap();

    let s = summary::summarize(&conn).unwrap();
    assert_eq!(s.items, 2);
    assert_eq!(s.totals.invested, Decimal::from(300000));
    assert_eq!(s.totals.current, Decimal::from(379200));
    assert_eq!(s.totals.profit, Decimal::from(79200));
    assert_eq!(s.totals.profit_pct.round_dp(1), Decimal::new(264, 1));
    assert_eq!(s.categories.len(), 2);
    assert_eq!(s.categories[0].category, "Mutual Funds");
    assert_eq!(s.categories[1].value, Decimal::from(222600));
    assert!(s.last_saved.is_some());
}
