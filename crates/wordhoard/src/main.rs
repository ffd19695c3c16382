// SPDX-FileCopyrightText: 2026 Wordhoard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wordhoard - vocabulary study from the command line.
//!
//! This is the binary entry point. Each subcommand lives in its own module
//! and talks to the storage core only through [`StudyStore`].

mod doctor;
mod lifecycle;
mod progress;
mod status;
mod study;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use wordhoard_config::WordhoardConfig;
use wordhoard_core::{StudyStore, WordId, WordhoardError};
use wordhoard_srs::SqliteStudyStore;

/// Wordhoard - vocabulary study with spaced repetition.
#[derive(Parser, Debug)]
#[command(name = "wordhoard", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Install the seed database and bring the schema up to date.
    Init,
    /// Show lifecycle state and word counts.
    Status {
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Print a study set.
    Study(StudyArgs),
    /// Record an answer for one word.
    Answer(AnswerArgs),
    /// Show study statistics.
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Show every sense and example of one word.
    Show {
        word_id: i64,
    },
    /// Mark a word mastered, or clear the mark with --unset.
    Master {
        word_id: i64,
        #[arg(long)]
        unset: bool,
    },
    /// Delete learning progress for every word, or for one.
    ResetProgress {
        /// Only reset this word.
        #[arg(long, value_name = "ID")]
        word: Option<i64>,
        /// Confirm the reset.
        #[arg(long)]
        yes: bool,
    },
    /// Drop the connection and pending work, then initialize again.
    Recover,
    /// Diagnose configuration and database problems.
    Doctor {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
}

/// Which pool a study set is drawn from.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum StudyMode {
    Review,
    New,
    Mixed,
}

#[derive(Args, Debug)]
struct StudyArgs {
    #[arg(value_enum)]
    mode: StudyMode,
    /// Cards to select (defaults to `study.default_limit`).
    #[arg(long)]
    limit: Option<u32>,
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct AnswerArgs {
    word_id: i64,
    #[arg(long, conflicts_with = "incorrect", required_unless_present = "incorrect")]
    correct: bool,
    #[arg(long)]
    incorrect: bool,
}

fn load_config(path: Option<&PathBuf>) -> Result<WordhoardConfig, ExitCode> {
    let loaded = match path {
        Some(path) => wordhoard_config::load_and_validate_path(path),
        None => wordhoard_config::load_and_validate(),
    };
    loaded.map_err(|errors| {
        wordhoard_config::render_errors(&errors);
        ExitCode::FAILURE
    })
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("wordhoard={log_level},warn")));

    // Logs go to stderr so `--json` output stays parseable.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

fn report(err: &WordhoardError) {
    eprintln!("error: {err}");
    if err.is_lock_related() || matches!(err, WordhoardError::Initialization { .. }) {
        eprintln!("hint: run `wordhoard recover` to reset the connection and retry");
    }
}

async fn dispatch(
    command: Commands,
    config: &WordhoardConfig,
    config_path: Option<&PathBuf>,
) -> Result<(), WordhoardError> {
    let store = SqliteStudyStore::new(config);
    let outcome = match command {
        Commands::Init => lifecycle::run_init(&store).await,
        Commands::Recover => lifecycle::run_recover(&store).await,
        Commands::Status { json } => status::run_status(&store, config, json).await,
        Commands::Study(args) => {
            store.initialize().await?;
            let limit = args.limit.unwrap_or(config.study.default_limit);
            study::run_study(&store, args.mode, limit, args.json).await
        }
        Commands::Answer(args) => {
            store.initialize().await?;
            study::run_answer(&store, WordId(args.word_id), args.correct).await
        }
        Commands::Show { word_id } => {
            store.initialize().await?;
            study::run_show(&store, WordId(word_id)).await
        }
        Commands::Stats { json } => {
            store.initialize().await?;
            progress::run_stats(&store, json).await
        }
        Commands::Master { word_id, unset } => {
            store.initialize().await?;
            progress::run_master(&store, WordId(word_id), !unset).await
        }
        Commands::ResetProgress { word, yes } => {
            if !yes {
                return Err(WordhoardError::Config(
                    "reset-progress deletes learning history; pass --yes to confirm".into(),
                ));
            }
            store.initialize().await?;
            progress::run_reset_progress(&store, word.map(WordId)).await
        }
        Commands::Doctor { plain } => doctor::run_doctor(config, config_path, plain).await,
    };

    if store.is_ready() {
        store.shutdown().await?;
    }
    outcome
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(code) => return code,
    };
    init_tracing(&config.logging.log_level);

    match dispatch(cli.command, &config, cli.config.as_ref()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn answer_requires_exactly_one_outcome() {
        assert!(Cli::try_parse_from(["wordhoard", "answer", "3"]).is_err());
        assert!(
            Cli::try_parse_from(["wordhoard", "answer", "3", "--correct", "--incorrect"]).is_err()
        );
        let cli = Cli::try_parse_from(["wordhoard", "answer", "3", "--incorrect"]).unwrap();
        match cli.command {
            Commands::Answer(args) => {
                assert_eq!(args.word_id, 3);
                assert!(!args.correct);
                assert!(args.incorrect);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn study_parses_mode_and_limit() {
        let cli =
            Cli::try_parse_from(["wordhoard", "--config", "w.toml", "study", "mixed", "--limit", "15"])
                .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("w.toml")));
        match cli.command {
            Commands::Study(args) => {
                assert_eq!(args.mode, StudyMode::Mixed);
                assert_eq!(args.limit, Some(15));
                assert!(!args.json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn reset_progress_accepts_word_filter() {
        let cli =
            Cli::try_parse_from(["wordhoard", "reset-progress", "--word", "7", "--yes"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::ResetProgress {
                word: Some(7),
                yes: true
            }
        ));
    }
}
