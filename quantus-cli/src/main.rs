//! quantus - command-line unit conversion calculator
//!
//! With `have` and `want` arguments it performs one conversion and exits;
//! with only `have` it shows the definition or fully reduced form; with
//! neither it enters the interactive "You have:" / "You want:" dialog.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::warn;

use quantus_core::{convert, render, Catalog, CatalogBuilder, Options, Quantity, Verbosity};
use quantus_files::Loader;

const DEFAULT_UNITS: &str = include_str!("../data/default.units");
const DEFAULT_UNITS_NAME: &str = "default.units";

const HELP: &str = "\
Type the measure you want to convert at the 'You have:' prompt and the
desired units at the 'You want:' prompt.

Press return at 'You want:' to see the measure reduced to primitive units.
Type '?' at 'You want:' to list conformable units.
At either prompt, 'help unit' explores the database around a definition and
'search text' lists unit names containing the text. 'quit' exits.

Examples:

  You have: 6 ft + 7 in
  You want: m
          * 2.0066

  You have: 2 m
  You want: ft;in;1|8 in;;
          6 ft + 6 in + 6|8 in (rounded up to nearest 1|8 in)

  You have: tempF(75)
  You want: tempC
          23.888889";

#[derive(Parser)]
#[command(name = "quantus")]
#[command(about = "Unit conversion calculator", long_about = None)]
struct Cli {
    /// Units definition file (repeatable; an empty value loads the
    /// built-in database)
    #[arg(short = 'f', long = "file")]
    files: Vec<String>,

    /// Locale for !locale sections of the database
    #[arg(short = 'l', long = "locale", default_value = "en_US")]
    locale: String,

    /// Slightly more verbose output
    #[arg(short = 'v', long = "verbose", conflicts_with = "compact")]
    verbose: bool,

    /// Compact output: bare numbers only
    #[arg(short = 'c', long = "compact")]
    compact: bool,

    /// Suppress prompting and statistics
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,

    /// Print only one line of output
    #[arg(short = '1', long = "one-line")]
    one_line: bool,

    /// Round the last element of unit-list output to an integer
    #[arg(short = 'r', long = "round")]
    round: bool,

    /// Suppress reciprocal unit conversion (e.g. Hz <-> s)
    #[arg(short = 's', long = "strict")]
    strict: bool,

    /// Terse output (same as -c -q -s -1)
    #[arg(short = 't', long = "terse", conflicts_with = "verbose")]
    terse: bool,

    /// Check that all units reduce to primitive units, then exit
    #[arg(short = 'C', long = "check")]
    check: bool,

    /// Describe this build and its units database, then exit
    #[arg(short = 'V', long = "version-info")]
    version_info: bool,

    /// Expression to convert from
    have: Option<String>,

    /// Unit, function name, or unit list to convert to
    want: Option<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let options = Options {
        verbosity: if cli.verbose {
            Verbosity::Verbose
        } else if cli.compact || cli.terse {
            Verbosity::Terse
        } else {
            Verbosity::Normal
        },
        one_line: cli.one_line || cli.terse,
        strict: cli.strict || cli.terse,
        round_last: cli.round,
    };
    let quiet = cli.quiet || cli.terse;

    let mut builder = CatalogBuilder::new();
    {
        let mut loader = Loader::new(&mut builder, &cli.locale);
        let files = if cli.files.is_empty() {
            vec![String::new()]
        } else {
            cli.files.clone()
        };
        for file in &files {
            if file.is_empty() {
                loader.load_text(DEFAULT_UNITS_NAME, DEFAULT_UNITS);
            } else if let Err(e) = loader.load_path(Path::new(file)) {
                eprintln!("quantus: cannot read '{}': {}", file, e);
                return ExitCode::FAILURE;
            }
        }
    }
    let (catalog, diagnostics) = builder.finish();
    for d in &diagnostics {
        warn!("{}", d);
    }

    if cli.version_info {
        println!("quantus {}", env!("CARGO_PKG_VERSION"));
        if cli.files.is_empty() {
            println!("Units database: {} (built in)", DEFAULT_UNITS_NAME);
        } else {
            println!("Units database: {}", cli.files.join(", "));
        }
        println!("containing {}", catalog.stat());
        println!("Locale: {}", cli.locale);
        return ExitCode::SUCCESS;
    }

    if cli.check {
        for d in catalog.check_all() {
            println!("{}", d);
        }
        return ExitCode::SUCCESS;
    }

    match &cli.have {
        Some(have) => noninteractive(have, cli.want.as_deref(), &catalog, &options),
        None => {
            interactive(&catalog, &options, quiet);
            ExitCode::SUCCESS
        }
    }
}

fn noninteractive(
    have_expr: &str,
    want: Option<&str>,
    catalog: &Catalog,
    options: &Options,
) -> ExitCode {
    let have_expr = have_expr.trim();
    match want.map(str::trim).filter(|w| !w.is_empty()) {
        None => {
            if let Some(def) = catalog.show_definition(have_expr, true) {
                print_definition(&def, options);
                return ExitCode::SUCCESS;
            }
            match reduce_expression(have_expr, catalog) {
                Ok(v) => {
                    print_reduced(have_expr, &v, options);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    println!("{}", e);
                    ExitCode::FAILURE
                }
            }
        }
        Some(want) => {
            let have = match Quantity::parse(have_expr, catalog) {
                Ok(v) => v,
                Err(e) => {
                    println!("{}", e);
                    return ExitCode::FAILURE;
                }
            };
            match convert(have_expr, &have, want, catalog, options) {
                Ok(outcome) => {
                    print!("{}", render(&outcome, options));
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    println!("{}", e);
                    ExitCode::FAILURE
                }
            }
        }
    }
}

fn interactive(catalog: &Catalog, options: &Options, quiet: bool) {
    if !quiet {
        println!("{}", catalog.stat());
    }
    'main: loop {
        let have_expr = match prompt("You have: ", quiet) {
            Some(line) => line,
            None => break,
        };
        if have_expr.is_empty() || have_expr == "quit" {
            break;
        }
        if help_query(&have_expr, catalog) {
            continue;
        }
        if let Some(def) = catalog.show_definition(&have_expr, false) {
            print_definition(&def, options);
            continue;
        }
        let have = match Quantity::parse(&have_expr, catalog) {
            Ok(v) => v,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        loop {
            let want = match prompt("You want: ", quiet) {
                Some(line) => line,
                None => break 'main,
            };
            if want == "quit" {
                break 'main;
            }
            if want.is_empty() {
                if let Some(def) = catalog.show_definition(&have_expr, true) {
                    print_definition(&def, options);
                } else {
                    match reduce_expression(&have_expr, catalog) {
                        Ok(v) => print_reduced(&have_expr, &v, options),
                        Err(e) => println!("{}", e),
                    }
                }
                break;
            }
            if want == "?" {
                match reduce_expression(&have_expr, catalog) {
                    Ok(v) => {
                        println!("Units conformable to {}", have_expr);
                        for row in catalog.conformable(&v) {
                            println!("  {}", row);
                        }
                    }
                    Err(e) => println!("{}", e),
                }
                continue;
            }
            if help_query(&want, catalog) {
                continue;
            }
            match convert(&have_expr, &have, &want, catalog, options) {
                Ok(outcome) => print!("{}", render(&outcome, options)),
                Err(e) => println!("{}", e),
            }
            break;
        }
    }
}

fn reduce_expression(expr: &str, catalog: &Catalog) -> quantus_core::Result<Quantity> {
    let mut v = Quantity::parse(expr, catalog)?;
    v.complete_reduce(catalog)?;
    Ok(v)
}

fn print_reduced(expr: &str, value: &Quantity, options: &Options) {
    if options.verbosity == Verbosity::Terse {
        println!("{}", value);
    } else {
        println!("\t{} = {}", expr, value);
    }
}

fn print_definition(def: &str, options: &Options) {
    if options.verbosity == Verbosity::Terse {
        println!("\t{}", def);
    } else {
        println!("\tDefinition: {}", def);
    }
}

fn help_query(input: &str, catalog: &Catalog) -> bool {
    if input == "help" {
        println!("{}", HELP);
        return true;
    }
    if let Some(name) = input.strip_prefix("help ") {
        let name = name.trim();
        match catalog.show_definition(name, true) {
            Some(def) => println!("\t{}", def),
            None => println!(
                "'{}' is not the name of a unit, function, or unit list.",
                name
            ),
        }
        return true;
    }
    if input == "search" {
        println!("Type 'search text' to see a list of all unit names containing 'text'.");
        return true;
    }
    if let Some(text) = input.strip_prefix("search ") {
        for row in catalog.matching(text.trim()) {
            println!("  {}", row);
        }
        return true;
    }
    false
}

fn prompt(text: &str, quiet: bool) -> Option<String> {
    if !quiet {
        print!("{}", text);
        io::stdout().flush().ok();
    }
    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) => None,
        Ok(_) => Some(line.trim().to_string()),
        Err(_) => None,
    }
}
