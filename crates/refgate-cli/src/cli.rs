use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "refgate",
    about = "Manage and verify the ledger of pinned GitHub Actions references",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Verify ledger pins against live GitHub tag and commit data
    Verify(VerifyArgs),
    /// Check a repository's workflows against the approved patterns
    Check(CheckArgs),
    /// Remove expired references from the ledger
    Clean(CleanArgs),
    /// Regenerate the approved-pattern file from the ledger
    Patterns(PatternsArgs),
    /// Regenerate the dummy auto-update workflow from the ledger
    Workflow(WorkflowArgs),
    /// Fold refs from a dummy workflow back into the ledger
    Update(UpdateArgs),
}

#[derive(Args)]
pub struct VerifyArgs {
    /// Path to the actions ledger file
    pub actions: PathBuf,
    /// Evaluation date for expiry checks (defaults to today)
    #[arg(long)]
    pub today: Option<NaiveDate>,
    /// Record results without echoing every log line
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Repository root to check (defaults to the current directory)
    pub root: Option<PathBuf>,
    /// Path to the approved patterns file
    #[arg(long, default_value = "approved_patterns.yml")]
    pub patterns: PathBuf,
}

#[derive(Args)]
pub struct CleanArgs {
    /// Path to the actions ledger file
    pub actions: PathBuf,
}

#[derive(Args)]
pub struct PatternsArgs {
    /// Path to the actions ledger file
    pub actions: PathBuf,
    /// Path to write the approved patterns file
    pub output: PathBuf,
}

#[derive(Args)]
pub struct WorkflowArgs {
    /// Path to the actions ledger file
    pub actions: PathBuf,
    /// Path to write the dummy workflow file
    pub output: PathBuf,
}

#[derive(Args)]
pub struct UpdateArgs {
    /// Path to the dummy workflow file
    pub workflow: PathBuf,
    /// Path to the actions ledger file
    pub actions: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_verify() {
        let cli = Cli::try_parse_from(["refgate", "verify", "actions.yml"]).unwrap();
        if let Command::Verify(args) = cli.command {
            assert_eq!(args.actions, PathBuf::from("actions.yml"));
            assert!(args.today.is_none());
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_verify_with_today() {
        let cli =
            Cli::try_parse_from(["refgate", "verify", "actions.yml", "--today", "2026-02-28"])
                .unwrap();
        if let Command::Verify(args) = cli.command {
            assert_eq!(args.today, NaiveDate::from_ymd_opt(2026, 2, 28));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_verify_rejects_bad_date() {
        assert!(
            Cli::try_parse_from(["refgate", "verify", "actions.yml", "--today", "tomorrow"])
                .is_err()
        );
    }

    #[test]
    fn parse_check_defaults() {
        let cli = Cli::try_parse_from(["refgate", "check"]).unwrap();
        if let Command::Check(args) = cli.command {
            assert!(args.root.is_none());
            assert_eq!(args.patterns, PathBuf::from("approved_patterns.yml"));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_check_with_root_and_patterns() {
        let cli = Cli::try_parse_from([
            "refgate", "check", "/repo", "--patterns", "allow.yml",
        ])
        .unwrap();
        if let Command::Check(args) = cli.command {
            assert_eq!(args.root, Some(PathBuf::from("/repo")));
            assert_eq!(args.patterns, PathBuf::from("allow.yml"));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_clean() {
        let cli = Cli::try_parse_from(["refgate", "clean", "actions.yml"]).unwrap();
        assert!(matches!(cli.command, Command::Clean(_)));
    }

    #[test]
    fn parse_patterns() {
        let cli =
            Cli::try_parse_from(["refgate", "patterns", "actions.yml", "allow.yml"]).unwrap();
        if let Command::Patterns(args) = cli.command {
            assert_eq!(args.output, PathBuf::from("allow.yml"));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_workflow() {
        let cli =
            Cli::try_parse_from(["refgate", "workflow", "actions.yml", "dummy.yml"]).unwrap();
        assert!(matches!(cli.command, Command::Workflow(_)));
    }

    #[test]
    fn parse_update() {
        let cli = Cli::try_parse_from(["refgate", "update", "dummy.yml", "actions.yml"]).unwrap();
        if let Command::Update(args) = cli.command {
            assert_eq!(args.workflow, PathBuf::from("dummy.yml"));
            assert_eq!(args.actions, PathBuf::from("actions.yml"));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["refgate", "--verbose", "check"]).unwrap();
        assert!(cli.verbose);
    }
}
