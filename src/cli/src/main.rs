//! CLI for gitlab-copy.
//!
//! Copies or moves issues, labels, milestones and notes from one GitLab
//! project to another. Without `-y` nothing is changed: the tool prints
//! source statistics and the actions it would perform.

use clap::Parser;
use gitlab_copy::{Config, Project, ProjectStats, RunMode, RunSummary, Runner, RunnerError};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// gitlab-copy - Copy or move issues between GitLab projects.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the YAML configuration file.
    config: PathBuf,

    /// Apply the migration. Without it only statistics are shown.
    #[arg(short = 'y', long = "apply")]
    apply: bool,

    /// Skip TLS certificate verification.
    #[arg(long)]
    insecure: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match run(args).await {
        Ok(Some(summary)) => {
            print_summary(&summary);
            ExitCode::SUCCESS
        }
        Ok(None) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Critical failure");
            ExitCode::from(1)
        }
    }
}

/// Initializes tracing with environment filter support.
///
/// Sets up the global tracing subscriber with:
/// - Compact log formatting (single-line output)
/// - Log level filtering via `RUST_LOG` env var (defaults to "info")
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Main execution logic. Returns `None` for a dry run.
async fn run(args: Args) -> Result<Option<RunSummary>, RunnerError> {
    let config = Config::load(&args.config)?;

    if !args.apply {
        println!("DRY RUN: nothing will be changed (statistics only)\n--");
    }

    let runner = Runner::new(config, args.insecure)?;
    runner.check_user_tokens().await?;

    let (source, destination) = runner.resolve_projects().await?;
    let config = runner.config();
    println!(
        "source: {} at {}",
        source.path_with_namespace, config.source.server_url
    );
    println!(
        "target: {} at {}",
        destination.path_with_namespace, config.destination.server_url
    );
    println!("--");

    let count_notes = config.mode() != RunMode::LabelsOnly;
    let stats = runner.source_stats(&source, count_notes).await?;
    print_stats(&source, &stats, count_notes);
    println!("--");

    if !args.apply {
        print_plan(config);
        return Ok(None);
    }

    runner.run().await.map(Some)
}

fn print_stats(project: &Project, stats: &ProjectStats, with_notes: bool) {
    println!("source: {} has {stats}", project.path_with_namespace);
    if !stats.milestones.is_empty() {
        println!(
            "source: {} milestone(s): {}",
            stats.milestones.len(),
            join_keys(stats.milestones.keys())
        );
    }
    if !stats.labels.is_empty() {
        println!(
            "source: {} label(s): {}",
            stats.labels.len(),
            join_keys(stats.labels.keys())
        );
    }
    if with_notes {
        println!("source: {} notes", stats.notes);
    }
}

fn join_keys<'a>(keys: impl Iterator<Item = &'a String>) -> String {
    keys.map(String::as_str).collect::<Vec<_>>().join(", ")
}

/// Prints what `-y` would do.
fn print_plan(config: &Config) {
    let source = &config.source;
    match config.mode() {
        RunMode::LabelsOnly => println!("Will copy labels only."),
        RunMode::MilestonesOnly => println!("Will copy labels and milestones only."),
        RunMode::Issues => {
            let action = if source.move_issues { "Move" } else { "Copy" };
            println!("Those actions will be performed:");
            println!("- Copy all source labels on target");
            println!("- Copy milestones if not existing on target");
            println!(
                "- {action} all issues (or those specified) if not existing on target (by title)"
            );
            println!("- Copy closed status on issues, if any");
            println!("- Set issue's assignee (if user exists) and milestone, if any");
            println!("- Copy notes (attached to issues)");
            if source.auto_close_issues {
                println!("- Auto-close source issues");
            }
            if source.link_to_target_issue {
                println!("- Add a note with a link to new issue");
                println!(
                    "- Use the link text template: {}",
                    source.link_to_target_issue_text
                );
            }
        }
    }
    println!("\nNow use the -y flag if that looks good to start the migration.");
}

/// Prints the final run summary.
fn print_summary(summary: &RunSummary) {
    println!("\nSummary:");
    println!("  Labels created: {}", summary.labels_created);

    match summary.mode {
        RunMode::LabelsOnly => {}
        RunMode::MilestonesOnly => {
            println!("  Milestones created: {}", summary.milestones_created);
        }
        RunMode::Issues => {
            println!("  Issues processed: {}", summary.issues_processed);
            println!("  Issues migrated: {}", summary.issues_migrated);
            println!("  Issues skipped: {}", summary.issues_skipped);
            println!("  Issues failed: {}", summary.issues_failed);
            println!("  Notes copied: {}", summary.notes_copied);
            if summary.sources_deleted > 0 || summary.delete_failures > 0 {
                println!("  Source issues deleted: {}", summary.sources_deleted);
                println!("  Source deletions failed: {}", summary.delete_failures);
            }
        }
    }
}
