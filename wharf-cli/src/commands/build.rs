//! Build command
//!
//! Runs the worker task list against a repository and prints the
//! collected logs sorted by descending severity.

use std::path::PathBuf;

use anyhow::{Context as AnyhowContext, Result, anyhow};
use clap::{Args, ValueEnum};
use colored::*;
use uuid::Uuid;

use wharf_core::domain::context::{BuildType, Context};
use wharf_core::domain::log::LogRecord;
use wharf_core::domain::result::Package;
use wharf_worker::task::build_tasks;
use wharf_worker::{Config, FailurePolicy, Worker, rdnn};

#[derive(Clone, Copy, ValueEnum)]
enum TypeArg {
    App,
    SystemApp,
    Library,
}

impl From<TypeArg> for BuildType {
    fn from(arg: TypeArg) -> Self {
        match arg {
            TypeArg::App => BuildType::App,
            TypeArg::SystemApp => BuildType::SystemApp,
            TypeArg::Library => BuildType::Library,
        }
    }
}

#[derive(Args)]
pub struct BuildArgs {
    /// Full repository URL
    repo: String,

    /// Semver version to build for
    #[arg(default_value = "0.0.1")]
    version: String,

    /// The type of project
    #[arg(long = "type", value_enum, default_value = "app")]
    build_type: TypeArg,

    /// Developer's name
    #[arg(long)]
    name_developer: Option<String>,

    /// Reverse Domain Name Notation identifier
    #[arg(long, short = 'n')]
    name_domain: Option<String>,

    /// Human readable name
    #[arg(long)]
    name_human: Option<String>,

    /// References to pull
    #[arg(long, num_args = 1..)]
    references: Vec<String>,

    /// Base directory for job workspaces
    #[arg(long, env = "WHARF_WORKSPACE_BASE")]
    workspace: Option<PathBuf>,
}

pub async fn handle(args: BuildArgs) -> Result<()> {
    let config = match &args.workspace {
        Some(base) => Config::new(base.clone()),
        None => Config::default(),
    };
    config.validate()?;

    let domain = args
        .name_domain
        .map(|d| rdnn::sanitize(&d, '-'))
        .unwrap_or_else(|| rdnn::from_repository(&args.repo));

    let mut context = Context::new(args.build_type.into(), &domain, &args.version)
        .with_context(|| format!("`{}` is not a valid semver version", args.version))?;

    if let Some(developer) = args.name_developer {
        context = context.with_developer(developer);
    }
    if let Some(human) = args.name_human {
        context = context.with_human_name(human);
    }
    context = context.with_references(args.references);

    let job_id = Uuid::new_v4().to_string();
    let mut worker = Worker::new(
        config,
        &job_id,
        context,
        build_tasks(),
        FailurePolicy::FailFast,
    );

    println!(
        "Running build for {} version {}",
        args.repo.bold(),
        args.version.bold()
    );

    worker.setup().await?;
    worker.run().await?;

    let failed = worker.fails();
    let result = worker
        .result()
        .cloned()
        .ok_or_else(|| anyhow!("worker finished without a result"))?;

    // Copy produced packages next to the invoker before the job
    // workspace is disposed.
    let copied = copy_packages(&result.packages).await;
    worker
        .teardown()
        .await
        .context("failed to dispose the job workspace")?;
    copied?;

    if failed {
        eprintln!(
            "{}",
            format!(
                "Error while running build for {} for {}",
                args.repo, args.version
            )
            .red()
        );
        print_logs(&result.logs);
        std::process::exit(1);
    }

    println!(
        "{}",
        format!("Built {} for version {}", args.repo, args.version).green()
    );
    print_logs(&result.logs);

    Ok(())
}

async fn copy_packages(packages: &[Package]) -> Result<()> {
    let target_dir = std::env::current_dir()?;

    for package in packages {
        if !package.path.exists() {
            continue;
        }
        if let Some(file_name) = package.path.file_name() {
            tokio::fs::copy(&package.path, target_dir.join(file_name))
                .await
                .with_context(|| format!("failed to copy {}", package.path.display()))?;
        }
    }

    Ok(())
}

/// Prints all logs, highest severity first.
fn print_logs(logs: &[LogRecord]) {
    let mut sorted = logs.to_vec();
    sorted.sort_by(|a, b| b.level.cmp(&a.level));

    for log in &sorted {
        spacer();
        println!("{log}");
    }
    spacer();
}

fn spacer() {
    println!();
    println!("{}", "=".repeat(80));
    println!();
}
