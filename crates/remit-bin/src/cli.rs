// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.
//!
//! - `run`: Start the portals (default)
//! - `validate`: Validate configuration file
//! - `version`: Show version information
//! - `hash-password`: Produce a bcrypt hash for an employee seed entry

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// =============================================================================
// Main CLI Structure
// =============================================================================

/// remit - international payments portal
///
/// Serves the customer payments portal and the employee review portal over a
/// shared transaction store.
#[derive(Parser, Debug)]
#[command(
    name = "remit",
    author = "Sylvex <contact@sylvex.io>",
    version = remit_core::VERSION,
    about = "International payments portal with employee review",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        default_value = "remit.yaml",
        env = "REMIT_CONFIG",
        global = true
    )]
    pub config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short,
        long,
        default_value = "info",
        env = "REMIT_LOG_LEVEL",
        global = true
    )]
    pub log_level: String,

    /// Log format (text, json, compact)
    #[arg(long, default_value = "text", env = "REMIT_LOG_FORMAT", global = true)]
    pub log_format: LogFormat,

    /// Enable quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands for the remit CLI.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the portal servers
    ///
    /// This is the default command when no subcommand is specified.
    Run(RunArgs),

    /// Validate the configuration file
    ///
    /// Parses and validates the configuration file without starting anything.
    Validate(ValidateArgs),

    /// Show detailed version information
    Version,

    /// Hash an employee password
    ///
    /// Checks the password against the employee password policy and prints a
    /// bcrypt hash for `seed.employees[].password_hash`.
    #[command(name = "hash-password")]
    HashPassword(HashPasswordArgs),
}

// =============================================================================
// Command Arguments
// =============================================================================

/// Arguments for the `run` command.
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Which portal(s) to serve
    #[arg(short, long, default_value = "all")]
    pub portal: PortalSelection,
}

/// Arguments for the `validate` command.
#[derive(Args, Debug, Default, Clone)]
pub struct ValidateArgs {
    /// Show parsed configuration after validation
    #[arg(short, long)]
    pub show_config: bool,

    /// Output format for validation results
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Strict mode: treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the `hash-password` command.
#[derive(Args, Debug, Default, Clone)]
pub struct HashPasswordArgs {
    /// Password to hash
    #[arg(required_unless_present = "stdin")]
    pub password: Option<String>,

    /// Read the password from stdin
    #[arg(long)]
    pub stdin: bool,

    /// bcrypt cost (defaults to the configured cost, or 12)
    #[arg(long)]
    pub cost: Option<u32>,
}

// =============================================================================
// Enums
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for structured logging
    Json,
    /// Compact format for minimal output
    Compact,
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for programmatic parsing
    Json,
}

/// Portals started by `run`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum PortalSelection {
    /// Customer payments portal only
    Payments,
    /// Employee review portal only
    Employee,
    /// Every portal enabled in the configuration
    #[default]
    All,
}

impl PortalSelection {
    /// Returns `true` if the payments portal is selected.
    pub fn includes_payments(&self) -> bool {
        matches!(self, Self::Payments | Self::All)
    }

    /// Returns `true` if the employee portal is selected.
    pub fn includes_employee(&self) -> bool {
        matches!(self, Self::Employee | Self::All)
    }
}

// =============================================================================
// Helper Methods
// =============================================================================

impl Cli {
    /// Parse CLI arguments from the command line.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective command, defaulting to `Run` if none specified.
    pub fn effective_command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or_else(|| Commands::Run(RunArgs::default()))
    }

    /// Check if verbose logging is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose && !self.quiet
    }

    /// Get the effective log level based on flags.
    pub fn effective_log_level(&self) -> &str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            &self.log_level
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command() {
        let cli = Cli::parse_from(["remit"]);
        assert!(cli.command.is_none());
        match cli.effective_command() {
            Commands::Run(args) => assert_eq!(args.portal, PortalSelection::All),
            other => panic!("Expected Run command, got {:?}", other),
        }
    }

    #[test]
    fn test_run_single_portal() {
        let cli = Cli::parse_from(["remit", "run", "--portal", "employee"]);
        if let Some(Commands::Run(args)) = cli.command {
            assert!(args.portal.includes_employee());
            assert!(!args.portal.includes_payments());
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn test_validate_command() {
        let cli = Cli::parse_from(["remit", "validate", "--show-config", "--strict"]);
        if let Some(Commands::Validate(args)) = cli.command {
            assert!(args.show_config);
            assert!(args.strict);
            assert_eq!(args.format, OutputFormat::Text);
        } else {
            panic!("Expected Validate command");
        }
    }

    #[test]
    fn test_config_path() {
        let cli = Cli::parse_from(["remit", "-c", "/etc/remit/remit.yaml"]);
        assert_eq!(cli.config, PathBuf::from("/etc/remit/remit.yaml"));
    }

    #[test]
    fn test_quiet_and_verbose() {
        let cli = Cli::parse_from(["remit", "-q"]);
        assert_eq!(cli.effective_log_level(), "warn");

        let cli = Cli::parse_from(["remit", "-v"]);
        assert!(cli.is_verbose());
        assert_eq!(cli.effective_log_level(), "debug");
    }

    #[test]
    fn test_hash_password_command() {
        let cli = Cli::parse_from(["remit", "hash-password", "Secur3!Pass", "--cost", "10"]);
        if let Some(Commands::HashPassword(args)) = cli.command {
            assert_eq!(args.password.as_deref(), Some("Secur3!Pass"));
            assert_eq!(args.cost, Some(10));
            assert!(!args.stdin);
        } else {
            panic!("Expected HashPassword command");
        }
    }

    #[test]
    fn test_hash_password_requires_input() {
        assert!(Cli::try_parse_from(["remit", "hash-password"]).is_err());
        assert!(Cli::try_parse_from(["remit", "hash-password", "--stdin"]).is_ok());
    }
}
