//! Onco CSQ Worker main executable

pub mod common;
pub mod csq;
pub mod hotspots;
pub mod oncogenicity;
pub mod predictions;
pub mod record;
pub mod refs;
pub mod summarise;

use clap::{Args, Parser, Subcommand};
use console::{Emoji, Term};

/// CLI parser based on clap.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Summarise consequence annotations of somatic variants",
    long_about = "This tool turns VEP/vcfanno annotated VCF files into per-variant summaries"
)]
struct Cli {
    /// Commonly used arguments
    #[command(flatten)]
    common: common::Args,

    /// The sub command to run
    #[command(subcommand)]
    command: Commands,
}

/// Enum supporting the parsing of top-level commands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Consequence-related commands.
    Csq(Csq),
}

/// Parsing of "csq *" sub commands.
#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
struct Csq {
    /// The sub command to run
    #[command(subcommand)]
    command: CsqCommands,
}

/// Enum supporting the parsing of "csq *" sub commands.
#[derive(Debug, Subcommand)]
enum CsqCommands {
    Summarise(summarise::Args),
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Build a tracing subscriber according to the configuration in `cli.common`.
    let collector = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(match cli.common.verbose.log_level() {
            Some(level) => match level {
                log::Level::Error => tracing::Level::ERROR,
                log::Level::Warn => tracing::Level::WARN,
                log::Level::Info => tracing::Level::INFO,
                log::Level::Debug => tracing::Level::DEBUG,
                log::Level::Trace => tracing::Level::TRACE,
            },
            None => tracing::Level::INFO,
        })
        .compact()
        .finish();

    // Install collector and go into sub commands.
    let term = Term::stderr();
    tracing::subscriber::with_default(collector, || {
        match &cli.command {
            Commands::Csq(csq) => match &csq.command {
                CsqCommands::Summarise(args) => {
                    summarise::run(&cli.common, args)?;
                }
            },
        }

        Ok::<(), anyhow::Error>(())
    })?;
    term.write_line(&format!("All done. Have a nice day!{}", Emoji(" 😃", "")))?;

    Ok(())
}
