use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

use anyhow::{Result, bail};
use clap::Parser;
use itertools::Itertools;

use btregex::{Flags, Regex};

#[derive(Parser, Debug)]
#[command(author, version, about = "Search lines with a backtracking regex engine", long_about = None)]
struct Args {
    /// Pattern to search for
    pattern: String,

    /// File to search; stdin when omitted
    #[arg(value_name = "FILE")]
    file: Option<String>,

    /// Case-insensitive matching
    #[arg(short = 'i', long)]
    ignore_case: bool,

    /// Multiline mode: ^ matches at line starts
    #[arg(short = 'm', long)]
    multiline: bool,

    /// Let . match newlines too
    #[arg(short = 's', long)]
    dot_all: bool,

    /// Quantifiers are lazy by default
    #[arg(short = 'U', long)]
    ungreedy: bool,

    /// Prefix each line with its line number
    #[arg(short = 'n', long)]
    line_number: bool,

    /// Print only the number of matching lines
    #[arg(short = 'c', long)]
    count: bool,

    /// Show capture groups for each matching line
    #[arg(short = 'g', long)]
    groups: bool,

    /// Print every line with matches replaced by this template
    #[arg(short = 'r', long, value_name = "TEMPLATE")]
    replace: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("btgrep: {err}");
            ExitCode::from(2)
        }
    }
}

/// Returns whether anything matched.
fn run(args: &Args) -> Result<bool> {
    let flags = Flags {
        case_insensitive: args.ignore_case,
        multiline: args.multiline,
        dot_matches_nl: args.dot_all,
        ungreedy: args.ungreedy,
    };
    let re = match Regex::with_flags(&args.pattern, flags) {
        Ok(re) => re,
        Err(err) => bail!("invalid pattern: {err}"),
    };

    let input = read_input(args.file.as_deref())?;
    let mut matched_lines = 0usize;

    for (idx, line) in input.lines().enumerate() {
        if let Some(template) = &args.replace {
            if re.is_match(line) {
                matched_lines += 1;
            }
            println!("{}", re.replace_all(line, template));
            continue;
        }

        let caps = match re.captures(line) {
            Some(caps) => caps,
            None => continue,
        };
        matched_lines += 1;
        if args.count {
            continue;
        }

        let mut out = String::new();
        if args.line_number {
            out.push_str(&format!("{}:", idx + 1));
        }
        out.push_str(line);
        if args.groups && re.num_captures() > 0 {
            let groups = (1..=re.num_captures())
                .map(|i| match caps.get(i) {
                    Some(m) => format!("${i}={:?}", m.as_str()),
                    None => format!("${i}=<unset>"),
                })
                .join(" ");
            out.push_str(&format!("  [{groups}]"));
        }
        println!("{out}");
    }

    if args.count {
        println!("{matched_lines}");
    }
    Ok(matched_lines > 0)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => match fs::read_to_string(path) {
            Ok(contents) => Ok(contents),
            Err(err) => bail!("failed to read {path}: {err}"),
        },
        None => {
            let mut contents = String::new();
            io::stdin().read_to_string(&mut contents)?;
            Ok(contents)
        }
    }
}
