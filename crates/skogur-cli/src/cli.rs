//! Command-line definition.
//!
//! Shared argument builders keep the same arg reusable across commands.

use std::path::PathBuf;

use clap::{Arg, ArgAction, Command, value_parser};

pub fn build_cli() -> Command {
    Command::new("skogur")
        .about("Earley-Scott parsing over binary skogur grammars")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("info")
                .about("Summarise a binary grammar file")
                .arg(grammar_arg())
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("parse")
                .about("Parse a token sequence and report the forest")
                .arg(grammar_arg())
                .arg(tokens_arg())
                .arg(start_arg())
                .arg(dump_arg())
                .arg(trace_arg()),
        )
}

/// Binary grammar file (positional).
fn grammar_arg() -> Arg {
    Arg::new("grammar")
        .value_name("GRAMMAR")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Binary grammar file")
}

/// JSON output (--json).
fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Emit the summary as JSON")
}

/// Token id list (--tokens).
fn tokens_arg() -> Arg {
    Arg::new("tokens")
        .long("tokens")
        .value_name("LIST")
        .required(true)
        .help("Comma-separated token ids, matched by identity")
}

/// Start nonterminal (--start).
fn start_arg() -> Arg {
    Arg::new("start")
        .long("start")
        .value_name("NT")
        .allow_hyphen_values(true)
        .value_parser(value_parser!(i32))
        .help("Start nonterminal id (defaults to the grammar root)")
}

/// Print the forest (--dump).
fn dump_arg() -> Arg {
    Arg::new("dump")
        .long("dump")
        .action(ArgAction::SetTrue)
        .help("Print the forest after a successful parse")
}

/// Trace the parse (--trace).
fn trace_arg() -> Arg {
    Arg::new("trace")
        .long("trace")
        .action(ArgAction::SetTrue)
        .help("Narrate the parse to stderr")
}
