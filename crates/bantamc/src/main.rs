//! Bantam Compiler - front end for the Bantam object language
//!
//! Usage: bantamc [OPTIONS] <input>

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use bantam_compiler::{DiagnosticReporter, Session, SessionConfig};
use clap::{Parser as ClapParser, ValueEnum};

/// How far to run the front end
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Default)]
enum Mode {
    /// Tokenize only
    Scan,
    /// Tokenize and parse
    Parse,
    /// Parse and run semantic analysis
    #[default]
    Check,
}

#[derive(ClapParser, Debug)]
#[command(name = "bantamc")]
#[command(author = "Bantam Tools Team")]
#[command(version)]
#[command(about = "Lexer, parser and semantic checker for Bantam programs", long_about = None)]
struct Args {
    /// Input source file (.btm)
    #[arg(required = true)]
    input: PathBuf,

    /// Stage to stop after
    #[arg(short, long, value_enum, default_value = "check")]
    mode: Mode,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Dump tokens (for debugging)
    #[arg(long)]
    dump_tokens: bool,

    /// Dump AST (for debugging)
    #[arg(long)]
    dump_ast: bool,

    /// Dump the class hierarchy (for debugging)
    #[arg(long)]
    dump_hierarchy: bool,

    /// Print diagnostics as "<message> (<file>:<line>)" lines
    #[arg(long)]
    plain: bool,
}

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(&args) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("error: {:#}", e);
            process::exit(2);
        }
    }
}

/// Returns whether the run finished without diagnostics
fn run(args: &Args) -> anyhow::Result<bool> {
    let config = SessionConfig {
        dump_tokens: args.dump_tokens,
        dump_ast: args.dump_ast,
        dump_hierarchy: args.dump_hierarchy,
        verbose: args.verbose,
    };
    let mut session = Session::from_path(&args.input)
        .with_context(|| format!("cannot read {}", args.input.display()))?
        .with_config(config);

    match args.mode {
        Mode::Scan => {
            let tokens = session.scan();
            if !args.dump_tokens {
                print!("{}", bantam_compiler::driver::dump_tokens(&tokens));
            }
        }
        Mode::Parse => {
            // Syntax errors are already in the session diagnostics
            let _ = session.parse();
        }
        Mode::Check => {
            if let Ok(analysis) = session.check() {
                log::info!("{} class(es) checked", analysis.program.classes.len());
            }
        }
    }

    let diagnostics = session.diagnostics();
    if args.plain {
        for diagnostic in diagnostics {
            eprintln!("{}", diagnostic);
        }
    } else {
        let mut reporter = DiagnosticReporter::new();
        let file_id = reporter.add_file(session.file(), session.source());
        reporter.report_all(file_id, diagnostics);
    }

    if diagnostics.has_errors() {
        eprintln!("{} error(s) found", diagnostics.count());
        return Ok(false);
    }

    if args.verbose {
        eprintln!("{}: no errors", session.file());
    }
    Ok(true)
}
