use anyhow::{bail, Context};
use chrono::NaiveDate;
use colored::Colorize;

use refgate_github::{token_from_env, HttpGithubApi, TOKEN_ENV};
use refgate_ledger::ActionLedger;
use refgate_policy::{check_repository_actions, PatternSet};
use refgate_verify::{verify_actions, VerifyOptions};

use crate::cli::*;
use crate::gha;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Verify(args) => cmd_verify(args),
        Command::Check(args) => cmd_check(args),
        Command::Clean(args) => cmd_clean(args),
        Command::Patterns(args) => cmd_patterns(args),
        Command::Workflow(args) => cmd_workflow(args),
        Command::Update(args) => cmd_update(args),
    }
}

fn today_or(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| chrono::Local::now().date_naive())
}

fn cmd_verify(args: VerifyArgs) -> anyhow::Result<()> {
    if gha::on_gha() {
        gha::begin_group("Verify GitHub Actions");
        if token_from_env().is_none() {
            bail!("{TOKEN_ENV} environment variable is not set or empty");
        }
    }

    let ledger = ActionLedger::load(&args.actions)
        .with_context(|| format!("loading {}", args.actions.display()))?;
    let api = HttpGithubApi::from_env()?;
    let options = VerifyOptions {
        today: today_or(args.today),
        echo: !args.quiet || gha::on_gha(),
    };

    let report = verify_actions(&ledger, &api, &options)?;

    if gha::on_gha() {
        if report.has_failures() || report.has_warnings() {
            gha::append_step_summary(&report.to_step_summary_markdown())?;
        }
        gha::end_group();
    }

    if report.has_failures() || report.has_warnings() {
        print!("{report}");
    }
    if report.has_failures() {
        bail!(
            "{} action reference(s) failed verification",
            report.failures.len()
        );
    }
    println!("{} All action references verified", "✓".green().bold());
    Ok(())
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let root = args
        .root
        .map(Ok)
        .unwrap_or_else(std::env::current_dir)?;
    let patterns = PatternSet::load(&args.patterns)
        .with_context(|| format!("loading {}", args.patterns.display()))?;

    let report = check_repository_actions(&root, &patterns, true)?;

    if gha::on_gha() {
        gha::append_step_summary(&report.to_step_summary_markdown())?;
    }

    if report.has_failures() {
        bail!(
            "One or more action references are not approved or explicitly blocked:\n{}",
            report.failures.join("\n")
        );
    }
    println!(
        "{} All action usages in {} file(s) match the approved patterns",
        "✓".green().bold(),
        report.checked_files
    );
    Ok(())
}

fn cmd_clean(args: CleanArgs) -> anyhow::Result<()> {
    let mut ledger = ActionLedger::load(&args.actions)
        .with_context(|| format!("loading {}", args.actions.display()))?;
    let before = ledger.iter().map(|(_, refs)| refs.len()).sum::<usize>();

    refgate_ledger::remove_expired_refs(&mut ledger, today_or(None));

    let after = ledger.iter().map(|(_, refs)| refs.len()).sum::<usize>();
    gha::group_print("Cleaned Actions", &ledger.to_yaml_string()?);
    ledger.store(&args.actions)?;
    println!(
        "{} Removed {} expired reference(s)",
        "✓".green(),
        before - after
    );
    Ok(())
}

fn cmd_patterns(args: PatternsArgs) -> anyhow::Result<()> {
    let ledger = ActionLedger::load(&args.actions)
        .with_context(|| format!("loading {}", args.actions.display()))?;
    let patterns = refgate_ledger::create_pattern(&ledger, today_or(None));

    let header = format!(
        "# This file was generated from {} by refgate. DO NOT UPDATE MANUALLY.\n",
        args.actions.display()
    );
    let content = format!("{header}{}", serde_yaml::to_string(&patterns)?);
    gha::group_print("Generated Patterns", &content);
    std::fs::write(&args.output, content)?;
    println!(
        "{} Wrote {} pattern(s) to {}",
        "✓".green(),
        patterns.len(),
        args.output.display()
    );
    Ok(())
}

fn cmd_workflow(args: WorkflowArgs) -> anyhow::Result<()> {
    let ledger = ActionLedger::load(&args.actions)
        .with_context(|| format!("loading {}", args.actions.display()))?;
    let workflow = refgate_ledger::generate_workflow(&ledger)?;
    gha::group_print("Generated Workflow", &workflow);
    std::fs::write(&args.output, workflow)?;
    println!("{} Wrote dummy workflow to {}", "✓".green(), args.output.display());
    Ok(())
}

fn cmd_update(args: UpdateArgs) -> anyhow::Result<()> {
    let workflow = std::fs::read_to_string(&args.workflow)
        .with_context(|| format!("loading {}", args.workflow.display()))?;
    let uses = refgate_ledger::parse_workflow_uses(&workflow)?;

    let mut ledger = ActionLedger::load(&args.actions)
        .with_context(|| format!("loading {}", args.actions.display()))?;
    refgate_ledger::update_refs(&mut ledger, &uses, today_or(None));

    gha::group_print("Generated List", &ledger.to_yaml_string()?);
    ledger.store(&args.actions)?;
    println!(
        "{} Updated {} from {} workflow step(s)",
        "✓".green(),
        args.actions.display(),
        uses.len()
    );
    Ok(())
}
