// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use mycapital360::{cli, commands, db, logging};

fn main() -> Result<()> {
    logging::init_logging(&logging::LoggingConfig::from_env())?;

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let conn = db::open_or_init()?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path()?.display());
        }
        Some((
            name @ ("add" | "list" | "rename" | "update" | "rm" | "clear" | "samples"),
            sub,
        )) => commands::holdings::handle(&conn, name, sub)?,
        Some(("summary", sub)) => commands::summary::handle(&conn, sub)?,
        Some(("allocation", sub)) => commands::summary::handle_allocation(&conn, sub)?,
        Some(("cas", sub)) => commands::importer::handle(&conn, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, sub)?,
        Some(("config", sub)) => commands::config::handle(&conn, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&conn)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
