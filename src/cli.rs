// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version};

fn id_arg() -> Arg {
    Arg::new("id")
        .long("id")
        .required(true)
        .help("Holding id (see `mc360 list`)")
}

/// Amounts are coerced later, so accept anything including negatives.
fn amount_arg(name: &'static str) -> Arg {
    Arg::new(name).long(name).allow_negative_numbers(true)
}

fn yes_arg() -> Arg {
    Arg::new("yes")
        .long("yes")
        .short('y')
        .action(ArgAction::SetTrue)
        .help("Do not ask for confirmation")
}

fn json_args() -> [Arg; 2] {
    [
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .conflicts_with("jsonl")
            .help("Print as pretty JSON"),
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print one JSON object per line"),
    ]
}

fn file_args() -> [Arg; 2] {
    [
        Arg::new("file")
            .long("file")
            .required(true)
            .help("CAS statement (PDF)"),
        Arg::new("password")
            .long("password")
            .help("PDF password, if the statement is protected"),
    ]
}

pub fn build_cli() -> Command {
    Command::new("mc360")
        .version(crate_version!())
        .about("MyCapital360: track holdings, profit/loss and allocation; import CAS statements")
        .subcommand(Command::new("init").about("Create the local database"))
        .subcommand(
            Command::new("add")
                .about("Add a holding")
                .arg(Arg::new("name").long("name").default_value(""))
                .arg(
                    Arg::new("category")
                        .long("category")
                        .default_value("Mutual Funds"),
                )
                .arg(amount_arg("invested").default_value("0"))
                .arg(amount_arg("current").default_value("0")),
        )
        .subcommand(
            Command::new("list")
                .about("List holdings, optionally filtered")
                .arg(
                    Arg::new("tab")
                        .long("tab")
                        .default_value("All")
                        .help("Category to show, or All"),
                )
                .arg(
                    Arg::new("query")
                        .long("query")
                        .short('q')
                        .default_value("")
                        .help("Case-insensitive text matched against name or category"),
                )
                .args(json_args()),
        )
        .subcommand(
            Command::new("rename")
                .about("Rename a holding")
                .arg(id_arg())
                .arg(Arg::new("name").long("name").required(true)),
        )
        .subcommand(
            Command::new("update")
                .about("Update fields of a holding")
                .arg(id_arg())
                .arg(amount_arg("current"))
                .arg(amount_arg("invested"))
                .arg(Arg::new("category").long("category"))
                .arg(Arg::new("name").long("name")),
        )
        .subcommand(
            Command::new("rm")
                .about("Delete a holding")
                .arg(id_arg())
                .arg(yes_arg()),
        )
        .subcommand(
            Command::new("clear")
                .about("Delete every holding")
                .arg(yes_arg()),
        )
        .subcommand(Command::new("samples").about("Add LIC / SSY sample holdings"))
        .subcommand(
            Command::new("summary")
                .about("Totals, profit/loss and category breakdown")
                .args(json_args()),
        )
        .subcommand(
            Command::new("allocation")
                .about("Allocation chart by category")
                .args(json_args()),
        )
        .subcommand(
            Command::new("cas")
                .about("Import holdings from a Consolidated Account Statement")
                .subcommand(
                    Command::new("preview")
                        .about("Show what a statement would import")
                        .args(file_args()),
                )
                .subcommand(
                    Command::new("import")
                        .about("Preview, confirm and import a statement")
                        .args(file_args())
                        .arg(
                            Arg::new("pick")
                                .long("pick")
                                .value_delimiter(',')
                                .value_parser(clap::value_parser!(usize))
                                .help("Only import these entries (1-based, comma separated)"),
                        )
                        .arg(yes_arg()),
                ),
        )
        .subcommand(
            Command::new("export").about("Export data").subcommand(
                Command::new("holdings")
                    .about("Export holdings as CSV or JSON")
                    .arg(
                        Arg::new("format")
                            .long("format")
                            .default_value("csv")
                            .help("csv or json"),
                    )
                    .arg(
                        Arg::new("out")
                            .long("out")
                            .help("Output file (stdout when omitted)"),
                    ),
            ),
        )
        .subcommand(
            Command::new("config")
                .about("CAS parser backend settings")
                .subcommand(
                    Command::new("set-api")
                        .about("Set the CAS parser base URL")
                        .arg(Arg::new("url").long("url").required(true)),
                )
                .subcommand(Command::new("clear-api").about("Forget the CAS parser base URL"))
                .subcommand(Command::new("show").about("Show effective settings")),
        )
        .subcommand(Command::new("doctor").about("Check stored data and settings"))
}
