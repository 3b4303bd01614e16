//! `shopcheck run`

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use shopcheck_common::{report, Filter, Project, SuiteConfig, SuiteRunner, TestCase};

use crate::output::{print_info, print_list, print_suite, CaseRow, OutputFormat};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Only run one project (chromium, api, local-api)
    #[arg(short, long)]
    pub project: Option<Project>,

    /// Only run tests carrying any of these tags (repeatable)
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,

    /// Only run tests whose title contains this text
    #[arg(short, long)]
    pub grep: Option<String>,

    /// Parallel workers
    #[arg(short, long, env = "WORKERS")]
    pub workers: Option<usize>,

    /// Directory for reports and artifacts
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// TOML configuration file [default: shopcheck.toml when present]
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// List the matching tests without running them
    #[arg(long)]
    pub list: bool,
}

impl RunArgs {
    pub fn filter(&self) -> Filter {
        Filter {
            tags: self.tags.clone(),
            project: self.project,
            grep: self.grep.clone(),
        }
    }
}

/// Every registered case, UI first
pub fn collect_cases() -> Result<Vec<TestCase>> {
    let mut cases = shopcheck_e2e::scenarios::all().context("failed to register storefront tests")?;
    cases.extend(shopcheck_api::scenarios::all());
    Ok(cases)
}

/// Runs the selected tests; `Ok(false)` when any of them failed
pub async fn execute(args: RunArgs, format: OutputFormat) -> Result<bool> {
    let mut config =
        SuiteConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    if let Some(workers) = args.workers {
        config.run.workers = workers.max(1);
    }
    if let Some(output) = &args.output {
        config.run.output_dir = output.clone();
    }

    let filter = args.filter();
    let cases = collect_cases()?;

    if args.list {
        let rows: Vec<CaseRow> = cases
            .iter()
            .filter(|c| filter.matches(c))
            .map(|c| CaseRow {
                project: c.project.to_string(),
                title: c.title(),
                tags: c.tags.join(" "),
                skipped: c.skip,
            })
            .collect();
        print_list(&rows, format);
        return Ok(true);
    }

    let config = Arc::new(config);
    info!(
        "Retry strategy: {} (CI: {})",
        config.retry_strategy().as_str(),
        config.run.is_ci
    );

    let result = SuiteRunner::new(Arc::clone(&config)).run(cases, &filter).await;
    print_suite(&result, format);

    let paths =
        report::write_all(&result, &config.run.output_dir).context("failed to write reports")?;
    print_info(&format!(
        "Reports: {}, {}, {}",
        paths.html.display(),
        paths.junit.display(),
        paths.json.display()
    ));

    Ok(result.success())
}
