mod cli;
mod commands;

use std::process::ExitCode;

fn main() -> ExitCode {
    let matches = cli::build_cli().get_matches();

    match matches.subcommand() {
        Some(("info", m)) => commands::run_info(m),
        Some(("parse", m)) => commands::run_parse(m),
        _ => unreachable!("clap should have caught this"),
    }
}
