//! `shopcheck load` and `shopcheck scripts`

use anyhow::{Context, Result};
use clap::Args;
use std::time::Duration;

use shopcheck_load::{parse_duration, scripts, LoadProfile, LoadRunner, LoadScript};

use crate::output::{print_list, print_load_report, OutputFormat, ScriptRow};

#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Script name (see `shopcheck scripts`)
    pub script: String,

    /// Target a different host
    #[arg(long)]
    pub base_url: Option<String>,

    /// Replace the profile with this many constant VUs (requires --duration)
    #[arg(long, requires = "duration")]
    pub vus: Option<usize>,

    /// Duration of the constant profile, e.g. 30s, 2m, 1m30s
    #[arg(long, requires = "vus")]
    pub duration: Option<String>,

    /// Pause after each request, in milliseconds
    #[arg(long)]
    pub think_time_ms: Option<u64>,
}

impl LoadArgs {
    /// The named script with command-line overrides applied
    pub fn script(&self) -> Result<LoadScript> {
        let mut script = scripts::by_name(&self.script)?;

        if let Some(base_url) = &self.base_url {
            script = script.with_base_url(base_url);
        }
        if let (Some(vus), Some(duration)) = (self.vus, &self.duration) {
            let duration = parse_duration(duration)?;
            script = script.with_profile(LoadProfile::constant(vus, duration));
        }
        if let Some(ms) = self.think_time_ms {
            script = script.with_think_time(Duration::from_millis(ms));
        }
        Ok(script)
    }
}

/// Runs one script; `Ok(false)` when a threshold was crossed
pub async fn execute(args: LoadArgs, format: OutputFormat) -> Result<bool> {
    let script = args.script()?;

    let runner = LoadRunner::new().context("failed to build HTTP client")?;
    let report = runner.run(&script).await?;
    print_load_report(&report, format);
    Ok(report.passed())
}

pub fn list(format: OutputFormat) {
    let rows: Vec<ScriptRow> = scripts::all().iter().map(ScriptRow::from).collect();
    print_list(&rows, format);
}
