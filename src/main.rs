// File: src/main.rs
//
// Main entry point for the Lox interpreter.
// Handles command-line argument parsing and dispatches to the appropriate
// subcommand (run, repl, or test).

use clap::{ArgAction, Parser as ClapParser, Subcommand};
use colored::Colorize;
use lox::errors::{Diagnostic, LoxError};
use lox::interpreter::Interpreter;
use lox::repl::Repl;
use lox::source::strip_comments;
use lox::{logger, snapshot};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

const EXIT_DATA_ERR: i32 = 65;
const EXIT_SOFTWARE: i32 = 70;
const EXIT_IO_ERR: i32 = 74;

#[derive(ClapParser)]
#[command(
    name = "lox",
    about = "Lox: a small dynamically typed scripting language",
    version = env!("CARGO_PKG_VERSION"),
    long_about = None
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
#[command(arg_required_else_help = true)]
enum Commands {
    /// Run a Lox script file
    Run {
        /// Path to the .lox file
        file: PathBuf,
    },

    /// Launch interactive Lox REPL
    Repl,

    /// Run every .lox script in a directory against its .out snapshot
    Test {
        /// Directory holding the test scripts
        #[arg(default_value = "tests/scripts")]
        dir: PathBuf,

        /// Regenerate all .out files based on actual output
        #[arg(long)]
        update: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }
    logger::init(logger::level_for_verbosity(cli.verbose));

    match cli.command {
        Commands::Run { file } => run_file(&file),

        Commands::Repl => {
            let result = Repl::new().and_then(|mut repl| repl.run());
            if let Err(e) = result {
                eprintln!("{} {}", "Error:".bright_red(), e);
                process::exit(EXIT_IO_ERR);
            }
        }

        Commands::Test { dir, update } => match snapshot::run_all(&dir, update) {
            Ok(report) => {
                snapshot::print_report(&report);
                if !report.all_passed() {
                    process::exit(1);
                }
            }
            Err(e) => {
                eprintln!("{} cannot read {}: {}", "Error:".bright_red(), dir.display(), e);
                process::exit(EXIT_IO_ERR);
            }
        },
    }
}

fn run_file(file: &Path) {
    let code = match fs::read_to_string(file) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} cannot read {}: {}", "Error:".bright_red(), file.display(), e);
            process::exit(EXIT_IO_ERR);
        }
    };
    log::info!("running {}", file.display());

    let source = strip_comments(&code);
    let mut interpreter = Interpreter::with_natives();
    if let Err(err) = lox::run_source(&source, &mut interpreter) {
        let diagnostic = Diagnostic::new(&err).with_file(file.display().to_string()).with_source(&source);
        eprint!("{}", diagnostic);
        let code = match err {
            LoxError::Lex(_) | LoxError::Parse(_) => EXIT_DATA_ERR,
            LoxError::Runtime(_) => EXIT_SOFTWARE,
        };
        process::exit(code);
    }
}
