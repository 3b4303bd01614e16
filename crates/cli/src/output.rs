//! Output formatting for CLI

use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

use shopcheck_common::{SuiteResult, TestResult, TestStatus};
use shopcheck_load::{LoadReport, LoadScript};

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Trait for items that can be displayed in a table
pub trait TableDisplay {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

/// Print a list of items
pub fn print_list<T: Serialize + TableDisplay>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No items found.");
                return;
            }
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic);

            table.set_header(T::headers());
            for item in items {
                table.add_row(item.row());
            }

            println!("{table}");
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(items).unwrap_or_default());
        }
    }
}

/// A registered test, for `run --list`
#[derive(Serialize)]
pub struct CaseRow {
    pub project: String,
    pub title: String,
    pub tags: String,
    pub skipped: bool,
}

impl TableDisplay for CaseRow {
    fn headers() -> Vec<&'static str> {
        vec!["Project", "Test", "Tags", "Skipped"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.project.clone(),
            self.title.clone(),
            self.tags.clone(),
            if self.skipped { "yes" } else { "" }.to_string(),
        ]
    }
}

impl TableDisplay for TestResult {
    fn headers() -> Vec<&'static str> {
        vec!["Status", "Project", "Test", "Attempts", "Duration"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            status_label(self.status),
            self.project.to_string(),
            self.title(),
            self.attempts.to_string(),
            format!("{}ms", self.duration_ms),
        ]
    }
}

fn status_label(status: TestStatus) -> String {
    match status {
        TestStatus::Passed => "✓ passed".green().to_string(),
        TestStatus::Flaky => "↻ flaky".yellow().to_string(),
        TestStatus::Failed => "✗ failed".red().to_string(),
        TestStatus::Skipped => "- skipped".dimmed().to_string(),
    }
}

/// A bundled load script, for `scripts`
#[derive(Serialize)]
pub struct ScriptRow {
    pub name: String,
    pub max_vus: usize,
    pub duration: String,
    pub base_url: String,
    pub description: String,
}

impl From<&LoadScript> for ScriptRow {
    fn from(script: &LoadScript) -> Self {
        Self {
            name: script.name.to_string(),
            max_vus: script.profile.max_vus(),
            duration: format!("{:?}", script.profile.total_duration()),
            base_url: script.base_url.clone(),
            description: script.description.to_string(),
        }
    }
}

impl TableDisplay for ScriptRow {
    fn headers() -> Vec<&'static str> {
        vec!["Script", "Max VUs", "Duration", "Target", "Description"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.max_vus.to_string(),
            self.duration.clone(),
            self.base_url.clone(),
            self.description.clone(),
        ]
    }
}

/// Results table plus totals and the failure details
pub fn print_suite(result: &SuiteResult, format: OutputFormat) {
    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(result).unwrap_or_default());
        return;
    }

    print_list(&result.results, format);

    for failed in result.results.iter().filter(|r| r.status == TestStatus::Failed) {
        println!();
        println!("{} {}", "✗".red(), failed.title().bold());
        if let Some(step) = &failed.failed_step {
            println!("    step:  {}", step);
        }
        if let Some(error) = &failed.error {
            println!("    error: {}", error);
        }
    }

    println!();
    let totals = format!(
        "{} passed, {} flaky, {} failed, {} skipped of {} ({} ms)",
        result.passed, result.flaky, result.failed, result.skipped, result.total, result.duration_ms
    );
    if result.success() {
        println!("{} {}", "✅".green(), totals);
    } else {
        println!("{} {}", "❌".red(), totals);
    }
}

pub fn print_load_report(report: &LoadReport, format: OutputFormat) {
    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(report).unwrap_or_default());
        return;
    }

    let s = &report.summary;
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec![
        "http_reqs".to_string(),
        format!("{} ({:.2}/s)", s.requests, s.requests_per_second),
    ]);
    table.add_row(vec![
        "http_req_failed".to_string(),
        format!("{:.2}%", s.failure_rate * 100.0),
    ]);
    table.add_row(vec![
        "http_req_duration".to_string(),
        format!(
            "avg={:.1}ms min={:.1}ms p(50)={:.1}ms p(90)={:.1}ms \
             p(95)={:.1}ms p(99)={:.1}ms max={:.1}ms",
            s.avg_ms, s.min_ms, s.p50_ms, s.p90_ms, s.p95_ms, s.p99_ms, s.max_ms
        ),
    ]);
    table.add_row(vec!["iterations".to_string(), s.iterations.to_string()]);
    table.add_row(vec!["data_received".to_string(), format!("{} B", s.bytes_received)]);
    table.add_row(vec!["vus_max".to_string(), report.max_vus.to_string()]);
    println!("{} {} against {}", "Load script".bold(), report.script, report.base_url);
    println!("{table}");

    for check in &s.checks {
        let mark = if check.fails == 0 { "✓".green() } else { "✗".red() };
        println!(
            "  {} {} ({:.1}% of {})",
            mark,
            check.name,
            check.pass_rate() * 100.0,
            check.passes + check.fails
        );
    }

    for violation in &report.violations {
        print_error(&format!("threshold crossed: {}", violation));
    }
    if report.passed() {
        print_success("all thresholds met");
    }
}

/// Print success message
pub fn print_success(message: &str) {
    println!("✅ {}", message);
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("❌ {}", message);
}

/// Print info message
pub fn print_info(message: &str) {
    println!("ℹ️  {}", message);
}
