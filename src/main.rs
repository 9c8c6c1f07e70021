use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use gitlab_gateway::{GitLabClient, ProviderConfig};
use squawk::checks::default_catalog;
use squawk::config::{EnvResolver, EnvSnapshot, PipelineTrigger, job_variables};
use squawk::job::{JobInputs, JobOptions, run_squawk_job};
use squawk::telemetry;
use tracing::info;

/// Pipeline events the squawk job runs on; `local` is always accepted.
const ALLOWED_TRIGGERS: &[PipelineTrigger] =
    &[PipelineTrigger::MergeRequestEvent, PipelineTrigger::Push];

#[derive(Debug, Parser)]
#[command(
    name = "squawk-job",
    version,
    about = "Run squawk approval checks and publish them into the merge request description"
)]
struct Cli {
    /// Pipeline event that triggered this run (merge-request-event, push, local).
    #[arg(long, env = "SQUAWK_TRIGGER")]
    trigger: Option<PipelineTrigger>,

    /// Render the results table without updating the merge request.
    #[arg(long)]
    dry_run: bool,

    /// Debug-level logging (overridden by RUST_LOG).
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Local runs keep credentials in .env; pipelines inject variables directly.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    telemetry::init(cli.verbose);

    match run(cli).await {
        Ok(()) => {
            println!("{}", "squawk checks passed".green().bold());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{} {err:#}", "squawk checks failed:".red().bold());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let env = EnvSnapshot::from_process();
    let trigger = PipelineTrigger::resolve(&env, cli.trigger, ALLOWED_TRIGGERS)?;
    info!(trigger = %trigger, "squawk job starting");

    // The trigger, not `CI`, decides between local and pipeline sources.
    let resolver = EnvResolver::new(trigger.context(), env, job_variables());
    let mut names = vec!["GITLAB_TOKEN", "CI_API_V4_URL"];
    names.extend_from_slice(JobInputs::VARIABLES);
    let vars = resolver.request(&names)?;

    let client = GitLabClient::from_config(ProviderConfig {
        base_api: vars.get("CI_API_V4_URL").await?,
        token: vars.get("GITLAB_TOKEN").await?,
    })
    .context("building GitLab client")?;

    let inputs = JobInputs::from_vars(&vars).await?;
    let options = JobOptions {
        dry_run: cli.dry_run,
    };

    let report = run_squawk_job(&client, &inputs, &default_catalog(), options)
        .await?
        .into_result()?;

    info!(
        iid = report.merge_request.iid,
        published = report.published,
        "squawk job finished"
    );
    Ok(())
}
