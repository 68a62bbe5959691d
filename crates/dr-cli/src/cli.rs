//! Argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Diminishing returns meter (stop/ship signal, not confidence).
#[derive(Debug, Parser)]
#[command(name = "dr", version, about)]
pub struct Cli {
    /// Log level used when RUST_LOG is unset (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// TOML file overriding scoring thresholds and weights.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Score a transcript and print the full result as key-sorted JSON.
    Score {
        /// Transcript file (.json or .jsonl).
        path: PathBuf,
    },
    /// Print a short Signal / Why / Next action report.
    Stop {
        /// Transcript file (.json or .jsonl).
        path: PathBuf,
    },
}

impl Command {
    /// Transcript path named by the subcommand.
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Score { path } | Self::Stop { path } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_score_with_defaults() {
        let cli = Cli::try_parse_from(["dr", "score", "meeting.json"]).unwrap();
        assert_eq!(cli.log_level, "warn");
        assert!(cli.config.is_none());
        assert!(matches!(cli.command, Command::Score { .. }));
        assert_eq!(cli.command.path(), &PathBuf::from("meeting.json"));
    }

    #[test]
    fn test_parse_stop_with_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "dr",
            "stop",
            "trace.jsonl",
            "--log-level",
            "debug",
            "--config",
            "dr.toml",
        ])
        .unwrap();
        assert_eq!(cli.log_level, "debug");
        assert_eq!(cli.config, Some(PathBuf::from("dr.toml")));
        assert!(matches!(cli.command, Command::Stop { .. }));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["dr"]).is_err());
        assert!(Cli::try_parse_from(["dr", "score"]).is_err());
    }
}
