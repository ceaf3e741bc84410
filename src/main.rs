use std::process;

use clap::Parser;
use colored::Colorize;
use serde_json::Value;
use tracing::Level;

use reg_deriv::{Matcher, RegexFlags, RegexGraph};

/// Match whole strings against a pattern using Brzozowski derivatives
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Pattern in the textual syntax, or a JSON description with --json
    #[arg(value_name = "PATTERN")]
    pattern: String,

    /// Strings to match against the pattern
    #[arg(value_name = "SUBJECT")]
    subjects: Vec<String>,

    /// Read PATTERN as a JSON pattern description
    #[arg(long)]
    json: bool,

    /// Print the compiled graph as Graphviz Dot code and exit
    #[arg(long)]
    dot: bool,

    /// Compare literals ignoring ASCII case
    #[arg(short = 'i', long)]
    ignore_case: bool,

    /// Keep deriving after the pattern is spent
    #[arg(long)]
    no_early_exit: bool,

    /// Log compilation (-v) and every derivation step (-vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let mut flags = RegexFlags::NO_FLAG;
    if args.ignore_case {
        flags |= RegexFlags::IGNORECASE;
    }
    if args.no_early_exit {
        flags |= RegexFlags::NO_EARLY_EXIT;
    }

    let compiled = if args.json {
        let description: Value = serde_json::from_str(&args.pattern).unwrap_or_else(|err| {
            eprintln!("{} invalid JSON pattern: {}", "error:".red().bold(), err);
            process::exit(2);
        });
        RegexGraph::with_flags(&description, flags)
    } else {
        RegexGraph::parse_with_flags(&args.pattern, flags)
    };
    let regex = compiled.unwrap_or_else(|err| {
        eprintln!("{}", err.render());
        process::exit(2);
    });

    if args.dot {
        println!("{}", regex.to_dot());
        return;
    }

    let mut all_matched = true;
    for subject in &args.subjects {
        if regex.is_match(subject) {
            println!("{:?}: {}", subject, "match".green());
        } else {
            all_matched = false;
            println!("{:?}: {}", subject, "no match".red());
        }
    }
    if !all_matched {
        process::exit(1);
    }
}
