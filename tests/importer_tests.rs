// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use mockito::{Matcher, Server};
use mycapital360::cas::{CasFile, CasParser, MockParser, RemoteParser};
use mycapital360::db::init_schema;
use mycapital360::error::CasError;
use mycapital360::models::Category;
use mycapital360::store::HoldingStore;
use mycapital360::utils::set_cas_api;
use mycapital360::{cli, commands::importer};
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::io::Write;
use tempfile::NamedTempFile;

fn base_conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    init_schema(&conn).unwrap();
    conn
}

fn statement() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"%PDF-1.7\n% fake statement\n").unwrap();
    file.flush().unwrap();
    file
}

fn run(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["mc360", "cas"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("cas", cas_m)) = matches.subcommand() {
        importer::handle_with(conn, cas_m, &MockParser::instant())
    } else {
        panic!("no cas subcommand");
    }
}

fn remote_for(server: &Server) -> RemoteParser {
    RemoteParser::new(reqwest::blocking::Client::new(), &format!("{}/", server.url()))
}

#[test]
fn import_without_backend_uses_preview_entries() {
    let conn = base_conn();
    let mut store = HoldingStore::load(&conn).unwrap();
    store.add_samples().unwrap();

    let file = statement();
    let path = file.path().to_str().unwrap().to_string();
    run(&conn, &["import", "--file", &path, "--yes"]).unwrap();

    let store = HoldingStore::load(&conn).unwrap();
    let names: Vec<&str> = store.list().iter().map(|h| h.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "HDFC Midcap Opportunities",
            "SBI Bluechip Fund",
            "LIC Policy",
            "Sukanya Samriddhi"
        ]
    );
    let first = &store.list()[0];
    assert_eq!(first.category, Category::MutualFunds);
    assert_eq!(first.invested, Decimal::ZERO);
    assert_eq!(first.current, Decimal::from(125000));
}

#[test]
fn import_pick_adds_single_entry() {
    let conn = base_conn();
    let file = statement();
    let path = file.path().to_str().unwrap().to_string();
    run(&conn, &["import", "--file", &path, "--pick", "2", "--yes"]).unwrap();

    let store = HoldingStore::load(&conn).unwrap();
    assert_eq!(store.len(), 1);
    assert_eq!(store.list()[0].name, "SBI Bluechip Fund");
    assert_eq!(store.list()[0].current, Decimal::from(86000));
}

#[test]
fn preview_does_not_touch_the_portfolio() {
    let conn = base_conn();
    let file = statement();
    let path = file.path().to_str().unwrap().to_string();
    run(&conn, &["preview", "--file", &path, "--password", "ABCDE1234F"]).unwrap();
    assert!(HoldingStore::load(&conn).unwrap().is_empty());
}

#[test]
fn missing_statement_is_reported() {
    let conn = base_conn();
    let err = run(&conn, &["import", "--file", "/no/such/cas.pdf", "--yes"]).unwrap_err();
    assert!(err.to_string().contains("/no/such/cas.pdf"));
}

#[test]
fn remote_parser_posts_multipart_and_maps_fields() {
    let mut server = Server::new();
    let m = server
        .mock("POST", "/parse_cas")
        .match_header(
            "content-type",
            Matcher::Regex("^multipart/form-data; boundary=".into()),
        )
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="file""#.into()),
            Matcher::Regex(r#"name="password""#.into()),
            Matcher::Regex("s3cret".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"status":"ok","data":[
                {"scheme":"Axis Bluechip","folio":"99/12","current_value":45250.75,"isin":"INF846K01164"},
                {"name":"Nippon Gold BeES","current":"1200","invested":1000,"category":"Gold"}
            ]}"#,
        )
        .create();

    let file = statement();
    let parser = remote_for(&server);
    assert_eq!(parser.endpoint(), format!("{}/parse_cas", server.url()));
    let entries = parser
        .parse(&CasFile {
            path: file.path().to_path_buf(),
            password: Some("s3cret".into()),
        })
        .unwrap();
    m.assert();

    assert_eq!(entries.len(), 2);
    let a = entries[0].to_holding().unwrap();
    assert_eq!(a.name, "Axis Bluechip");
    assert_eq!(a.current, Decimal::new(4525075, 2));
    assert_eq!(a.category, Category::MutualFunds);
    assert_eq!(entries[0].folio_label(), "99/12");

    let b = entries[1].to_holding().unwrap();
    assert_eq!(b.name, "Nippon Gold BeES");
    assert_eq!(b.current, Decimal::from(1200));
    assert_eq!(b.invested, Decimal::from(1000));
    assert_eq!(b.category, Category::Gold);
}

#[test]
fn remote_parser_surfaces_server_message() {
    let mut server = Server::new();
    let _m = server
        .mock("POST", "/parse_cas")
        .with_status(200)
        .with_body(r#"{"status":"error","message":"Incorrect PDF password"}"#)
        .create();

    let file = statement();
    let err = remote_for(&server)
        .parse(&CasFile {
            path: file.path().to_path_buf(),
            password: None,
        })
        .unwrap_err();
    assert!(matches!(err, CasError::Rejected(_)));
    assert_eq!(err.to_string(), "Parsing failed: Incorrect PDF password");
}

#[test]
fn remote_parser_echoes_body_without_message() {
    let mut server = Server::new();
    let body = r#"{"status":"busy"}"#;
    let _m = server
        .mock("POST", "/parse_cas")
        .with_status(200)
        .with_body(body)
        .create();

    let file = statement();
    let err = remote_for(&server)
        .parse(&CasFile {
            path: file.path().to_path_buf(),
            password: None,
        })
        .unwrap_err();
    assert_eq!(err.to_string(), format!("Parsing failed: {}", body));
}

#[test]
fn remote_parser_reports_http_failure() {
    let mut server = Server::new();
    let _m = server
        .mock("POST", "/parse_cas")
        .with_status(502)
        .with_body("<html>bad gateway</html>")
        .create();

    let file = statement();
    let err = remote_for(&server)
        .parse(&CasFile {
            path: file.path().to_path_buf(),
            password: None,
        })
        .unwrap_err();
    assert!(matches!(err, CasError::Network(_)));
    assert!(err.to_string().contains("502"));
}

#[test]
fn configured_backend_is_used_for_import() {
    let mut server = Server::new();
    let m = server
        .mock("POST", "/parse_cas")
        .with_status(200)
        .with_body(r#"{"status":"ok","data":[{"scheme":"UTI Nifty 50 Index","current_value":51000}]}"#)
        .create();

    let conn = base_conn();
    set_cas_api(&conn, &server.url()).unwrap();
    let file = statement();
    let path = file.path().to_str().unwrap().to_string();
    run(&conn, &["import", "--file", &path, "--yes"]).unwrap();
    m.assert();

    let store = HoldingStore::load(&conn).unwrap();
    assert_eq!(store.len(), 1);
    assert_eq!(store.list()[0].name, "UTI Nifty 50 Index");
    assert_eq!(store.list()[0].current, Decimal::from(51000));
}

#[test]
fn failed_backend_import_changes_nothing() {
    let mut server = Server::new();
    let _m = server
        .mock("POST", "/parse_cas")
        .with_status(200)
        .with_body(r#"{"status":"error","message":"Unsupported statement"}"#)
        .create();

    let conn = base_conn();
    HoldingStore::load(&conn).unwrap().add_samples().unwrap();
    set_cas_api(&conn, &server.url()).unwrap();
    let file = statement();
    let path = file.path().to_str().unwrap().to_string();

    let err = run(&conn, &["import", "--file", &path, "--yes"]).unwrap_err();
    assert!(err.to_string().contains("Unsupported statement"));
    assert_eq!(HoldingStore::load(&conn).unwrap().len(), 2);
}
