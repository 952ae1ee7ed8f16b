//! # Command-Line Configuration
//!
//! Argument definitions for the `stagewise` binary.

use clap::{Args, Parser, Subcommand};
use stagewise_core::SessionConfig;
use stagewise_core::config::DEFAULT_NAMESPACE;
use std::path::PathBuf;

/// Organizational stage assessment toolkit.
#[derive(Debug, Parser)]
#[command(name = "stagewise", version, about)]
pub struct Cli {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Score a complete answer file
    Score {
        /// Assessment definition (questions + weights)
        #[arg(long)]
        definition: PathBuf,
        /// Answers as a JSON object: question id -> option index
        #[arg(long)]
        answers: PathBuf,
    },

    /// Compare a current distribution against a target
    Gap {
        #[arg(long)]
        current: PathBuf,
        #[arg(long)]
        target: PathBuf,
    },

    /// Aggregate results per department and organization-wide
    Rollup {
        /// JSON list of {"department", "distribution"} records
        #[arg(long)]
        results: PathBuf,
    },

    /// Take an assessment interactively on stdin
    Take {
        #[arg(long)]
        definition: PathBuf,
        #[command(flatten)]
        store: StoreArgs,
        /// Continue from the persisted question instead of the first one
        #[arg(long)]
        resume: bool,
    },

    /// Show or clear the persisted question pointer
    Position {
        #[command(flatten)]
        store: StoreArgs,
        /// Delete the stored pointer
        #[arg(long)]
        clear: bool,
        /// List every stored pointer
        #[arg(long, conflicts_with = "clear")]
        all: bool,
    },
}

/// Where and under which key the question pointer is persisted.
#[derive(Debug, Clone, Args)]
pub struct StoreArgs {
    /// Position database (redb)
    #[arg(long)]
    pub db: PathBuf,

    /// Respondent identity; anonymous when omitted
    #[arg(long)]
    pub user: Option<String>,

    /// Key namespace
    #[arg(long, default_value = DEFAULT_NAMESPACE)]
    pub namespace: String,
}

impl StoreArgs {
    #[must_use]
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::default().with_namespace(self.namespace.clone())
    }

    /// The store key these arguments select.
    #[must_use]
    pub fn key(&self) -> String {
        self.session_config().key_for(self.user.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_take_with_defaults() {
        let cli = Cli::try_parse_from([
            "stagewise",
            "take",
            "--definition",
            "def.json",
            "--db",
            "pos.redb",
        ])
        .expect("take should parse");

        assert_eq!(cli.log_level, "warn");
        let take = match cli.command {
            Command::Take { store, resume, .. } => Some((store.key(), resume)),
            _ => None,
        };
        assert_eq!(take, Some(("assessment_page_anonymous".to_string(), false)));
    }

    #[test]
    fn position_clear_conflicts_with_all() {
        let cli = Cli::try_parse_from([
            "stagewise", "position", "--db", "pos.redb", "--clear", "--all",
        ]);
        assert!(cli.is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "stagewise",
            "gap",
            "--current",
            "a.json",
            "--target",
            "b.json",
            "--json",
        ]);
        assert!(cli.map(|c| c.json).unwrap_or(false));
    }
}
