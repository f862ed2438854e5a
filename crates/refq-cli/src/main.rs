use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

mod refactor_apply;

use refactor_apply::{ApplySummary, ConfigCheck, PreviewSummary};

#[derive(Parser)]
#[command(
    name = "refq",
    version,
    about = "Apply refactor plans (renames, parameter-list changes) to source files"
)]
struct Cli {
    /// Config file to use instead of discovering `refq.toml` in the project root
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute a plan's edits and write the changed files
    Apply(ApplyArgs),
    /// Show the unified diff a plan would produce, without writing
    Preview(PreviewArgs),
    /// Inspect the configuration file
    Config(ConfigArgs),
}

#[derive(Args)]
struct ApplyArgs {
    /// Refactor plan (JSON) produced by the query engine
    plan: PathBuf,
    /// Project root that plan file ids are relative to
    #[arg(long, default_value = ".")]
    root: PathBuf,
    /// Compute and report edits without writing any file
    #[arg(long)]
    dry_run: bool,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct PreviewArgs {
    /// Refactor plan (JSON) produced by the query engine
    plan: PathBuf,
    /// Project root that plan file ids are relative to
    #[arg(long, default_value = ".")]
    root: PathBuf,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the JSON schema of `refq.toml`
    Schema,
    /// Load the configuration and report unknown keys, warnings and errors
    Check {
        /// Project root to discover `refq.toml` in
        #[arg(long, default_value = ".")]
        root: PathBuf,
        /// Emit JSON suitable for CI
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            2
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Apply(args) => {
            let session = refactor_apply::Session::open(&args.root, cli.config.as_deref())?;
            let summary = session.apply(&args.plan, args.dry_run)?;
            print_output(&summary, args.json)?;
            Ok(summary.exit_code())
        }
        Command::Preview(args) => {
            let session = refactor_apply::Session::open(&args.root, cli.config.as_deref())?;
            let summary = session.preview(&args.plan)?;
            print_output(&summary, args.json)?;
            Ok(summary.exit_code())
        }
        Command::Config(args) => match args.command {
            ConfigCommand::Schema => {
                print_output(&refq_config::json_schema(), true)?;
                Ok(0)
            }
            ConfigCommand::Check { root, json } => {
                let check = refactor_apply::check_config(&root, cli.config.as_deref())?;
                print_output(&check, json)?;
                Ok(if check.errors.is_empty() { 0 } else { 1 })
            }
        },
    }
}

fn print_output<T: Serialize + 'static>(value: &T, json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(value)?;
        println!("{out}");
        return Ok(());
    }

    // Human output for key types. Everything else falls back to pretty JSON.
    let any = value as &dyn std::any::Any;
    if let Some(summary) = any.downcast_ref::<ApplySummary>() {
        for preview in &summary.previews {
            println!("{}:{}: {}", preview.file, preview.line, preview.text.trim());
        }
        print_failures(&summary.failures);
        println!(
            "{}: {} edit(s) in {} file(s){}",
            summary.directive,
            summary.edits,
            summary.files_changed.len(),
            if summary.dry_run { " (dry run)" } else { "" }
        );
    } else if let Some(summary) = any.downcast_ref::<PreviewSummary>() {
        for file in &summary.files {
            print!("{}", file.diff);
        }
        print_failures(&summary.failures);
    } else if let Some(check) = any.downcast_ref::<ConfigCheck>() {
        match &check.path {
            Some(path) => println!("config: {}", path.display()),
            None => println!("config: (defaults, no refq.toml found)"),
        }
        for key in &check.unknown_keys {
            println!("warning: unknown key `{key}`");
        }
        for warning in &check.warnings {
            println!("warning: {warning}");
        }
        for error in &check.errors {
            println!("error: {error}");
        }
    } else {
        let out = serde_json::to_string_pretty(value)?;
        println!("{out}");
    }
    Ok(())
}

fn print_failures(failures: &[refactor_apply::FailureReport]) {
    for failure in failures {
        match failure.line {
            Some(line) => eprintln!("error: {}:{}: {}", failure.file, line, failure.error),
            None => eprintln!("error: {}: {}", failure.file, failure.error),
        }
    }
}
