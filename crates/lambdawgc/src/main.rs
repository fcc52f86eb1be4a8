//! The Lambdawg compiler CLI.
//!
//! - `lambdawgc build <file>` compiles a source file to JavaScript
//! - `lambdawgc check <file>` runs all validation stages without emitting

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use lambdawg_common::span::LineIndex;
use lambdawgc::render::render_diagnostic;
use lambdawgc::{check, compile, CompileOptions, CompileResult};

#[derive(Parser)]
#[command(name = "lambdawgc", version, about = "The Lambdawg compiler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a Lambdawg source file to JavaScript
    Build {
        /// Path to the source file
        file: PathBuf,

        /// Output path for the emitted JavaScript (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip type checking
        #[arg(long = "skip-typecheck")]
        skip_typecheck: bool,
    },
    /// Run all validation stages without emitting
    Check {
        /// Path to the source file
        file: PathBuf,

        /// Print diagnostics as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let status = match cli.command {
        Commands::Build {
            file,
            output,
            skip_typecheck,
        } => build(&file, output.as_deref(), skip_typecheck),
        Commands::Check { file, json } => check_file(&file, json),
    };

    if let Err(message) = status {
        eprintln!("error: {message}");
        process::exit(1);
    }
}

fn read_source(file: &Path) -> Result<(String, CompileOptions), String> {
    let source = std::fs::read_to_string(file)
        .map_err(|e| format!("failed to read '{}': {e}", file.display()))?;
    let options = CompileOptions {
        filename: Some(file.display().to_string()),
        ..Default::default()
    };
    Ok((source, options))
}

fn build(file: &Path, output: Option<&Path>, skip_typecheck: bool) -> Result<(), String> {
    let (source, mut options) = read_source(file)?;
    options.skip_type_check = skip_typecheck;

    let result = compile(&source, &options);
    report(&result);
    if !result.success {
        return Err("compilation failed".to_string());
    }

    let code = result.code.expect("successful compile carries code");
    match output {
        Some(path) => std::fs::write(path, code)
            .map_err(|e| format!("failed to write '{}': {e}", path.display()))?,
        None => print!("{code}"),
    }
    Ok(())
}

fn check_file(file: &Path, json: bool) -> Result<(), String> {
    let (source, options) = read_source(file)?;
    let result = check(&source, &options);

    if json {
        let index = LineIndex::new(&source);
        let diagnostics: Vec<serde_json::Value> = result
            .errors
            .iter()
            .chain(&result.warnings)
            .map(|d| {
                let position = index.position(d.span.start);
                serde_json::json!({
                    "severity": d.severity,
                    "code": d.code,
                    "message": d.message,
                    "span": d.span,
                    "line": position.line,
                    "column": position.column,
                    "hints": d.hints,
                })
            })
            .collect();
        let rendered = serde_json::to_string_pretty(&diagnostics)
            .map_err(|e| format!("failed to serialize diagnostics: {e}"))?;
        println!("{rendered}");
    } else {
        report(&result);
    }

    if result.success {
        Ok(())
    } else {
        Err("check failed".to_string())
    }
}

fn report(result: &CompileResult) {
    for diag in result.errors.iter().chain(&result.warnings) {
        eprint!("{}", render_diagnostic(diag));
    }
}
