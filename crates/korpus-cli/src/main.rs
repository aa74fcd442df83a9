use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use korpus_ingest::adder::{Adder, Destination};
use korpus_model::CorpusConfig;

#[derive(Parser)]
#[command(name = "korpus")]
#[command(about = "Corpus working-copy management for a linguistic text archive")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_HASH"), ")"))]
struct Cli {
    /// Log level: error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "info", value_enum)]
    log_level: LogLevel,

    /// Use UTC timestamps instead of local time
    #[arg(long, global = true)]
    utc: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Subcommand)]
enum Commands {
    /// Add files, directories or URLs to a corpus tree.
    ///
    /// Filenames are converted to ascii-only names and a metadata file
    /// recording the original name, the language, the genre and any
    /// parallel files is written next to each added file.
    Add {
        /// The original files, urls or directories where the original
        /// files reside (not the corpus working copy)
        #[arg(required = true)]
        origs: Vec<String>,

        /// Name the file should get in the corpus. Files fetched from
        /// the net often have names that are not human friendly; use
        /// this to guard against that.
        #[arg(long)]
        name: Option<String>,

        /// Corpus directory where the origs should be placed
        #[arg(short, long)]
        directory: Option<PathBuf>,

        /// Existing corpus file the orig about to be added is parallel to
        #[arg(short, long)]
        parallel: Option<PathBuf>,

        /// Language of the file to be added (together with --parallel)
        #[arg(short, long)]
        lang: Option<String>,

        /// Directory holding the per-language corpus trees
        #[arg(long, default_value = ".")]
        corpus_root: PathBuf,

        /// Fail on name collisions instead of appending a numeric suffix
        #[arg(long)]
        no_rename: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let level = match cli.log_level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // Timestamp format: 2026-02-14 19:44:09.123 -08:00
    let time_format = "%Y-%m-%d %H:%M:%S%.3f %:z";

    if cli.utc {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_timer(tracing_subscriber::fmt::time::ChronoUtc::new(time_format.to_string()))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_timer(tracing_subscriber::fmt::time::ChronoLocal::new(time_format.to_string()))
            .init();
    }

    match cli.command {
        Commands::Add {
            origs,
            name,
            directory,
            parallel,
            lang,
            corpus_root,
            no_rename,
        } => {
            let destination = Destination::from_options(directory, parallel, lang)?;
            let mut config = CorpusConfig::new(corpus_root);
            if no_rename {
                config = config.no_disambiguation();
            }

            let adder = Adder::new(config, destination);
            let report = adder.add(&origs, name.as_deref()).await?;

            // The Added/error lines are the command's output contract
            for file in &report.added {
                println!("Added {}", file.path);
            }
            for failure in &report.failures {
                eprintln!("Failed to add {}: {}", failure.reference, failure.error);
            }

            tracing::info!(
                added = report.added.len(),
                failed = report.failures.len(),
                "Done"
            );

            Ok(if report.all_ok() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}
