//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for seqferry using clap.

pub mod commands;

use crate::domain::errors::{RegistryError, SeqferryError, StoreError};
use clap::{Parser, Subcommand};

/// Process exit codes
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const PARTIAL: i32 = 1;
    pub const CONFIGURATION: i32 = 2;
    pub const CONNECTION: i32 = 4;
    pub const FATAL: i32 = 5;
}

/// Seqferry - Sequencing output publisher
#[derive(Parser, Debug)]
#[command(name = "seqferry")]
#[command(version, about, long_about = None)]
#[command(author = "Seqferry Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "seqferry.toml", env = "SEQFERRY_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "SEQFERRY_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Publish one secondary analysis to the object store
    Publish(commands::publish::PublishArgs),

    /// Bundle a run folder's logs and publish the archive
    ArchiveLogs(commands::archive::ArchiveArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

/// Exit code for an error that ended a command
pub fn exit_code_for(error: &SeqferryError) -> i32 {
    match error {
        SeqferryError::Configuration(_) => exit_code::CONFIGURATION,
        SeqferryError::Store(StoreError::ConnectionFailed(_))
        | SeqferryError::Registry(RegistryError::Unavailable(_)) => exit_code::CONNECTION,
        _ => exit_code::FATAL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_cli_parse_publish() {
        let cli = Cli::parse_from([
            "seqferry",
            "publish",
            "--analysis-dir",
            "/data/r1/1_A01/0000021",
            "--runfolder",
            "/data/r1",
            "--analysis-id",
            "0000021",
        ]);
        assert_eq!(cli.config, "seqferry.toml");
        match cli.command {
            Commands::Publish(args) => {
                assert_eq!(args.analysis_dir, PathBuf::from("/data/r1/1_A01/0000021"));
                assert_eq!(args.analysis_id, "0000021");
                assert!(args.metadata_xml.is_none());
                assert!(!args.dry_run);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["seqferry", "--config", "custom.toml", "validate-config"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["seqferry", "--log-level", "debug", "validate-config"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_archive_logs() {
        let cli = Cli::parse_from([
            "seqferry",
            "archive-logs",
            "--source-dir",
            "/runs/150910_HS40_17550_A_C75BCANXX",
            "--run-id",
            "999",
        ]);
        match cli.command {
            Commands::ArchiveLogs(args) => {
                assert_eq!(args.run_id, Some(999));
                assert!(args.dest.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["seqferry", "init", "--force"]);
        assert!(matches!(cli.command, Commands::Init(ref args) if args.force));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            exit_code_for(&SeqferryError::Configuration("x".into())),
            exit_code::CONFIGURATION
        );
        assert_eq!(
            exit_code_for(&StoreError::ConnectionFailed("x".into()).into()),
            exit_code::CONNECTION
        );
        assert_eq!(
            exit_code_for(&RegistryError::Unavailable("x".into()).into()),
            exit_code::CONNECTION
        );
        assert_eq!(exit_code_for(&SeqferryError::Sidecar("x".into())), exit_code::FATAL);
        assert_eq!(exit_code_for(&SeqferryError::Io("x".into())), exit_code::FATAL);
    }
}
