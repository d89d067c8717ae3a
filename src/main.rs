//! fw-build CLI
//!
//! Entry point for the `fw-build` command-line tool.

use clap::{Args, Parser, Subcommand};
use fw_build::config::EffectiveSettings;
use fw_build::invoke::configure_command;
use fw_build::pipeline::{self, BuildError};
use fw_build::{BoardProfile, BuildSummary, ExitCode, Pipeline, ProcessRunner};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Environment variable controlling log verbosity (EnvFilter syntax)
const LOG_ENV: &str = "FW_BUILD_LOG";

#[derive(Parser)]
#[command(name = "fw-build")]
#[command(about = "Board-aware OpenTX firmware build front-end", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ResolveArgs {
    /// Target board (default: $BOARD_NAME)
    #[arg(long, short = 'b')]
    board: Option<String>,

    /// Space-separated NAME=VALUE cmake overrides (default: $CMAKE_FLAGS)
    #[arg(long, short = 'f', allow_hyphen_values = true)]
    flags: Option<String>,

    /// Path to settings file (default: fw-build.toml if present)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve options, run cmake + make and validate the firmware
    Build {
        #[command(flatten)]
        resolve: ResolveArgs,

        /// Mounted firmware source tree
        #[arg(long)]
        source_dir: Option<PathBuf>,

        /// Scratch copy of the source tree
        #[arg(long)]
        work_dir: Option<PathBuf>,

        /// Out-of-tree build directory
        #[arg(long)]
        build_dir: Option<PathBuf>,

        /// Directory receiving the renamed firmware
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Parallel make jobs
        #[arg(long, short = 'j')]
        jobs: Option<u32>,

        /// Skip `make clean`
        #[arg(long)]
        no_clean: bool,

        /// Write a JSON build summary to this path
        #[arg(long)]
        summary: Option<PathBuf>,
    },

    /// Resolve options and print the cmake invocation without building
    Resolve {
        #[command(flatten)]
        resolve: ResolveArgs,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// List known boards
    Boards {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            resolve,
            source_dir,
            work_dir,
            build_dir,
            output_dir,
            jobs,
            no_clean,
            summary,
        } => {
            let clean = no_clean.then_some(false);
            let overlay = json!({
                "board": resolve.board,
                "flags": resolve.flags,
                "paths": {
                    "source_dir": source_dir,
                    "work_dir": work_dir,
                    "build_dir": build_dir,
                    "output_dir": output_dir
                },
                "build": {
                    "jobs": jobs,
                    "clean": clean
                }
            });
            run_build(resolve.config, overlay, summary);
        }
        Commands::Resolve { resolve, json } => {
            let overlay = json!({"board": resolve.board, "flags": resolve.flags});
            run_resolve(resolve.config, overlay, json);
        }
        Commands::Boards { json } => run_boards(json),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_settings(config: Option<PathBuf>, overlay: Value) -> Result<EffectiveSettings, BuildError> {
    let path = EffectiveSettings::locate_config(config)?;
    let effective =
        EffectiveSettings::build(path.as_deref(), |k| std::env::var(k).ok(), Some(overlay))?;
    Ok(effective)
}

fn run_build(config: Option<PathBuf>, overlay: Value, summary_path: Option<PathBuf>) {
    let start = Instant::now();

    let mut resolution = None;
    let result = load_settings(config, overlay).and_then(|effective| {
        let resolved = pipeline::resolve(&effective.settings)?;
        resolution = Some(resolved.clone());
        Pipeline::new(effective.settings, ProcessRunner).build(resolved)
    });

    let summary = match &result {
        Ok(report) => report.to_summary(),
        Err(e) => {
            error!("{}: {}", e.failure_kind().description(), e);
            e.to_summary(resolution.as_ref(), pipeline::duration_ms(start.elapsed()))
        }
    };

    if let Some(path) = summary_path {
        write_summary(&summary, &path);
    }

    process::exit(summary.exit_code().as_i32());
}

fn write_summary(summary: &BuildSummary, path: &Path) {
    match summary.write_to_file(path) {
        Ok(()) => info!(path = %path.display(), "wrote build summary"),
        Err(e) => error!(path = %path.display(), "failed to write build summary: {}", e),
    }
}

fn run_resolve(config: Option<PathBuf>, overlay: Value, json: bool) {
    let outcome = load_settings(config, overlay).and_then(|effective| {
        let resolution = pipeline::resolve(&effective.settings)?;
        Ok((effective, resolution))
    });

    let (effective, resolution) = match outcome {
        Ok(v) => v,
        Err(e) => {
            error!("{}: {}", e.failure_kind().description(), e);
            process::exit(e.exit_code().as_i32());
        }
    };

    let command = configure_command(&effective.settings, &resolution);

    if json {
        let output = json!({
            "resolution": resolution,
            "board_label": resolution.board_label(),
            "configure_command": std::iter::once(command.program.clone())
                .chain(command.args.iter().cloned())
                .collect::<Vec<_>>(),
            "sources": effective.sources,
        });
        match serde_json::to_string_pretty(&output) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(ExitCode::Io.as_i32());
            }
        }
    } else {
        println!("Board: {}", resolution.board);
        if let Some(ref pcb) = resolution.merged.effective_board {
            match resolution.merged.effective_board_revision {
                Some(ref rev) => println!("Effective board: {} (rev {})", pcb, rev),
                None => println!("Effective board: {}", pcb),
            }
        }
        if let Some(language) = resolution.translation_language() {
            println!("Language: {}", language);
        }
        match resolution.size_budget_bytes {
            Some(budget) => println!("Size budget: {} bytes", budget),
            None => println!("Size budget: unknown"),
        }
        println!();
        println!("{}", command.display_line());
    }

    process::exit(ExitCode::Success.as_i32());
}

fn run_boards(json: bool) {
    let boards: Vec<BoardProfile> = BoardProfile::all().collect();

    if json {
        match serde_json::to_string_pretty(&boards) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(ExitCode::Io.as_i32());
            }
        }
        return;
    }

    println!("{:<12} {:<8} {:<8} {:>10}", "BOARD", "PCB", "PCBREV", "BUDGET");
    for board in &boards {
        let budget = board
            .size_budget_bytes
            .map(|b| format!("{}K", b / 1024))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<12} {:<8} {:<8} {:>10}",
            board.board_id,
            board.pcb().unwrap_or("-"),
            board.pcbrev().unwrap_or("-"),
            budget
        );
    }
}
