//! Command implementations.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgMatches;
use serde::Serialize;
use skogur_core::Grammar;
use skogur_engine::{IdentityMatcher, Parser, PrintTracer, dump_forest, num_combinations};

fn load_grammar(matches: &ArgMatches) -> Result<Grammar, ExitCode> {
    let path = matches
        .get_one::<PathBuf>("grammar")
        .expect("grammar arg is required");
    Grammar::from_path(path).map_err(|err| {
        eprintln!("error: {}: {err}", path.display());
        ExitCode::FAILURE
    })
}

pub fn run_info(matches: &ArgMatches) -> ExitCode {
    let grammar = match load_grammar(matches) {
        Ok(grammar) => grammar,
        Err(code) => return code,
    };

    if matches.get_flag("json") {
        #[derive(Serialize)]
        struct Info {
            terminals: u32,
            nonterminals: u32,
            productions: u32,
            root: Option<i32>,
        }
        let info = Info {
            terminals: grammar.num_terminals(),
            nonterminals: grammar.num_nonterminals(),
            productions: grammar.num_productions(),
            root: grammar.root(),
        };
        match serde_json::to_string_pretty(&info) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("error: {err}");
                return ExitCode::FAILURE;
            }
        }
        return ExitCode::SUCCESS;
    }

    println!("terminals:    {}", grammar.num_terminals());
    println!("nonterminals: {}", grammar.num_nonterminals());
    println!("productions:  {}", grammar.num_productions());
    match grammar.root() {
        Some(root) => println!("root:         {}", grammar.name_of(root)),
        None => println!("root:         <none>"),
    }
    for k in 1..=grammar.num_nonterminals() {
        let nt = -(k as i32);
        let count = grammar.productions_of(nt).count();
        println!("  {}: {count} productions", grammar.name_of(nt));
    }
    ExitCode::SUCCESS
}

pub fn run_parse(matches: &ArgMatches) -> ExitCode {
    let grammar = match load_grammar(matches) {
        Ok(grammar) => grammar,
        Err(code) => return code,
    };

    let list = matches
        .get_one::<String>("tokens")
        .expect("tokens arg is required");
    let tokens: Vec<u32> = match list.split(',').map(|t| t.trim().parse()).collect() {
        Ok(tokens) => tokens,
        Err(err) => {
            eprintln!("error: bad token list {list:?}: {err}");
            return ExitCode::FAILURE;
        }
    };

    let start = match matches.get_one::<i32>("start") {
        Some(&start) => start,
        None => match grammar.root() {
            Some(root) => root,
            None => {
                eprintln!("error: grammar has no root; pass --start");
                return ExitCode::FAILURE;
            }
        },
    };

    let mut parser = Parser::new(&grammar, IdentityMatcher);
    let result = if matches.get_flag("trace") {
        parser.parse_with(0, start, &tokens, &mut PrintTracer)
    } else {
        parser.parse(0, start, &tokens)
    };

    match result {
        Ok(root) => {
            println!(
                "ok: {} tokens, {} combinations",
                tokens.len(),
                num_combinations(&root)
            );
            if matches.get_flag("dump") {
                print!("{}", dump_forest(&root, &grammar));
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err} (token offset {})", err.error_token());
            ExitCode::FAILURE
        }
    }
}
