//! Command-line interface for linedef
//! This binary compiles a grammar file and runs it over an input file,
//! printing the parsed value as JSON.
//!
//! Usage:
//!   linedef parse `<grammar>` `<input>` [--format `<format>`]  - Parse an input file
//!   linedef check `<grammar>`                                - Compile a grammar only
//!   linedef functions                                       - List builtin scalar functions

use clap::{Arg, Command};
use linedef::linedef::{Definition, Input, ReaderSource, Registry};
use std::fs;
use std::io::BufReader;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("linedef")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A declarative parser for line-oriented text formats")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("parse")
                .about("Compile a grammar and parse an input file")
                .arg(
                    Arg::new("grammar")
                        .help("Path to the grammar file")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("input")
                        .help("Path to the input file to parse")
                        .required(true)
                        .index(2),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format ('json' or 'pretty')")
                        .default_value("pretty"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Compile a grammar without parsing anything")
                .arg(
                    Arg::new("grammar")
                        .help("Path to the grammar file")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(Command::new("functions").about("List builtin scalar functions"))
        .get_matches();

    match matches.subcommand() {
        Some(("parse", parse_matches)) => {
            let grammar = parse_matches.get_one::<String>("grammar").unwrap();
            let input = parse_matches.get_one::<String>("input").unwrap();
            let format = parse_matches.get_one::<String>("format").unwrap();
            handle_parse_command(grammar, input, format);
        }
        Some(("check", check_matches)) => {
            let grammar = check_matches.get_one::<String>("grammar").unwrap();
            handle_check_command(grammar);
        }
        Some(("functions", _)) => {
            handle_functions_command();
        }
        _ => unreachable!(),
    }
}

fn read_file(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {}", path, e);
        std::process::exit(1);
    })
}

fn compile_grammar(path: &str) -> Definition {
    let grammar = read_file(path);
    Definition::from_grammar(&grammar, Registry::new()).unwrap_or_else(|e| {
        eprintln!("Grammar error: {}", e);
        std::process::exit(1);
    })
}

/// Handle the parse command
fn handle_parse_command(grammar_path: &str, input_path: &str, format: &str) {
    let definition = compile_grammar(grammar_path);

    let file = fs::File::open(input_path).unwrap_or_else(|e| {
        eprintln!("Error opening {}: {}", input_path, e);
        std::process::exit(1);
    });
    let mut input = Input::new(&definition, ReaderSource::new(BufReader::new(file)));

    let value = input.parse().unwrap_or_else(|e| {
        eprintln!("Parse error: {}", e);
        std::process::exit(1);
    });

    let rendered = match (format, &value) {
        ("json", Some(value)) => serde_json::to_string(value),
        ("pretty", Some(value)) => serde_json::to_string_pretty(value),
        (_, None) => Ok("null".to_string()),
        (other, _) => {
            eprintln!("Unknown format: {}", other);
            std::process::exit(1);
        }
    }
    .unwrap_or_else(|e| {
        eprintln!("Serialization error: {}", e);
        std::process::exit(1);
    });

    println!("{}", rendered);
}

/// Handle the check command
fn handle_check_command(grammar_path: &str) {
    let definition = compile_grammar(grammar_path);
    println!(
        "OK: {} top-level builder{}",
        definition.builders().len(),
        if definition.builders().len() == 1 { "" } else { "s" }
    );
}

/// Handle the functions command
fn handle_functions_command() {
    println!("Builtin scalar functions:\n");
    for name in Registry::new().names() {
        println!("  {}", name);
    }
    println!("\nRegister more with Registry::put / Registry::put_text before compiling.");
}
