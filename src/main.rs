use std::path::{PathBuf, MAIN_SEPARATOR};

use anyhow::Result;
use clap::{Parser, Subcommand};

use netcov::cli;

/// netcov: import and merge .NET code coverage reports.
#[derive(Parser)]
#[command(name = "netcov", version, about)]
struct Cli {
    /// Log debug details (same as RUST_LOG=debug).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate the configured reports and show per-file line coverage.
    Import {
        /// TOML settings file holding the report path keys.
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Set a settings key, e.g. -D sonar.cs.opencover.reportsPaths=*.xml
        #[arg(short = 'D', value_name = "KEY=VALUE")]
        define: Vec<String>,

        /// Directory report patterns and source paths are relative to.
        #[arg(long, default_value = ".")]
        base_dir: PathBuf,

        /// Path separator used in report patterns.
        #[arg(long, default_value_t = MAIN_SEPARATOR)]
        separator: char,

        /// Languages to import, one pass each.
        #[arg(long = "language", default_values = ["cs", "vbnet"])]
        languages: Vec<String>,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Parse a single report and show its line hits.
    Parse {
        /// Path to the report file.
        file: PathBuf,

        /// Override kind detection (ncover3, opencover, dotcover, visualstudio).
        #[arg(long)]
        kind: Option<String>,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .init();

    let output = match cli.command {
        Commands::Import {
            settings,
            define,
            base_dir,
            separator,
            languages,
            json,
        } => cli::cmd_import(&cli::ImportOptions {
            settings_file: settings,
            overrides: define,
            base_dir,
            separator,
            languages,
            json,
        })?,
        Commands::Parse { file, kind, json } => cli::cmd_parse(&file, kind.as_deref(), json)?,
    };
    print!("{output}");
    Ok(())
}
