//! The Berry compiler front end.
//!
//! - `berryc check <files...>` - Lex, parse and check the files as one module
//!
//! Options:
//! - `--module` - Module name shown in diagnostics (default `main`)
//! - `--json` - Output diagnostics as JSON (one object per line)
//! - `--no-color` - Disable colorized output
//! - `--plain` - One-line `[module] path:line:col: message` diagnostics
//! - `--dump-types` - Print the checked type of every surviving definition
//! - `-v, --verbose` - Debug logging to stderr (`RUST_LOG` takes precedence)

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use berry_common::diagnostic::Reporter;
use berry_common::source::SourceFile;
use berry_parser::ast::{Def, Stmt};
use berry_parser::symbol::SymbolId;
use berry_parser::Module;
use berry_typeck::diagnostics::{render_diagnostic, render_plain, DiagnosticOptions};

#[derive(Parser)]
#[command(name = "berryc", version, about = "The Berry compiler front end")]
struct Cli {
    /// Log compiler internals to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check source files as a single module
    Check {
        /// Source files, in module order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Module name reported in diagnostics
        #[arg(long, default_value = "main")]
        module: String,

        /// Output diagnostics as JSON (one object per line) instead of human-readable format
        #[arg(long)]
        json: bool,

        /// Disable colorized output
        #[arg(long = "no-color")]
        no_color: bool,

        /// One line per diagnostic, without source excerpts
        #[arg(long, conflicts_with = "json")]
        plain: bool,

        /// Print the type of every definition that checked cleanly
        #[arg(long = "dump-types")]
        dump_types: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Check {
            files,
            module,
            json,
            no_color,
            plain,
            dump_types,
        } => {
            let diag_opts = DiagnosticOptions {
                color: !no_color && !json,
                json,
            };
            let output = Output {
                diag_opts,
                plain,
                dump_types,
            };
            if !check(&files, &module, &output) {
                process::exit(1);
            }
        }
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

struct Output {
    diag_opts: DiagnosticOptions,
    plain: bool,
    dump_types: bool,
}

/// Run the pipeline: read -> parse -> check -> report. Returns true when
/// every file was read and no diagnostic was produced.
fn check(paths: &[PathBuf], module_name: &str, output: &Output) -> bool {
    let reporter = Reporter::new();
    let mut module = Module::new(module_name);
    let mut all_read = true;

    for path in paths {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                report_read_error(path, &err, output);
                all_read = false;
                continue;
            }
        };
        let file = SourceFile::new(module.next_file_id(), path.display().to_string(), text);
        // A fatal parse error has already been reported; the definitions
        // before it are still checked.
        let _ = berry_parser::parse_file(&mut module, file, &reporter);
    }

    let result = berry_typeck::check(&mut module, &reporter);
    tracing::debug!(
        errors = reporter.error_count(),
        aborted = result.aborted.len(),
        "check finished"
    );

    report_diagnostics(&module, &reporter, output);
    if output.dump_types {
        dump_types(&module, &result.aborted);
    }

    all_read && !reporter.has_errors()
}

/// Write every diagnostic to stderr in the selected format.
fn report_diagnostics(module: &Module, reporter: &Reporter, output: &Output) {
    for diag in reporter.diagnostics() {
        if output.plain {
            eprintln!("{}", render_plain(&diag));
            continue;
        }
        let source = module
            .files
            .iter()
            .find(|f| f.display_path == diag.path)
            .map(|f| f.text.as_str())
            .unwrap_or_default();
        let rendered = render_diagnostic(&diag, source, &output.diag_opts);
        if output.diag_opts.json {
            eprintln!("{rendered}");
        } else {
            eprint!("{rendered}");
        }
    }
}

fn report_read_error(path: &Path, err: &std::io::Error, output: &Output) {
    if output.diag_opts.json {
        let msg = serde_json::json!({
            "code": "C0001",
            "severity": "error",
            "message": format!("cannot read file: {err}"),
            "file": path.display().to_string(),
            "spans": [],
        });
        eprintln!("{msg}");
    } else {
        eprintln!("error: cannot read '{}': {err}", path.display());
    }
}

/// Print `name: type` for each definition that survived checking, with the
/// parameters and locals of functions indented below.
fn dump_types(module: &Module, aborted: &[SymbolId]) {
    let describe = |id: SymbolId| {
        let symbol = &module.symbols[id];
        let ty = symbol
            .ty
            .as_ref()
            .map_or_else(|| "?".to_string(), |ty| ty.to_string());
        format!("{}: {ty}", symbol.name)
    };

    for def in &module.defs {
        let id = def.symbol();
        if aborted.contains(&id) {
            continue;
        }
        match def {
            Def::Func(func) => {
                println!("func {}", describe(id));
                let locals = func
                    .body
                    .iter()
                    .flat_map(|body| &body.stmts)
                    .filter_map(|stmt| match stmt {
                        Stmt::Let(var) => Some(var.symbol),
                        Stmt::Expr(_) => None,
                    });
                for local in func.params.iter().copied().chain(locals) {
                    println!("    {}", describe(local));
                }
            }
            Def::GlobalVar(_) => println!("let {}", describe(id)),
        }
    }
}
