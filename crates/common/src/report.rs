//! Run reports
//!
//! Three renderings of a [`SuiteResult`]: machine-readable JSON, JUnit XML
//! for CI systems, and a single-page HTML summary.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::collections::BTreeMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{CheckError, CheckResult};
use crate::suite::{SuiteResult, TestResult, TestStatus};

/// Paths of the written reports
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub json: PathBuf,
    pub junit: PathBuf,
    pub html: PathBuf,
}

/// Write every report format under `output_dir`
pub fn write_all(result: &SuiteResult, output_dir: &Path) -> CheckResult<ReportPaths> {
    Ok(ReportPaths {
        json: write_json(result, output_dir)?,
        junit: write_junit(result, output_dir)?,
        html: write_html(result, output_dir)?,
    })
}

pub fn write_json(result: &SuiteResult, output_dir: &Path) -> CheckResult<PathBuf> {
    std::fs::create_dir_all(output_dir)?;

    let path = output_dir.join("results.json");
    let json = serde_json::to_string_pretty(result)?;
    std::fs::write(&path, json)?;

    info!("Results written to: {}", path.display());
    Ok(path)
}

pub fn write_junit(result: &SuiteResult, output_dir: &Path) -> CheckResult<PathBuf> {
    std::fs::create_dir_all(output_dir)?;

    let path = output_dir.join("results.xml");
    std::fs::write(&path, render_junit(result)?)?;

    info!("JUnit report written to: {}", path.display());
    Ok(path)
}

pub fn write_html(result: &SuiteResult, output_dir: &Path) -> CheckResult<PathBuf> {
    let dir = output_dir.join("report");
    std::fs::create_dir_all(&dir)?;

    let path = dir.join("index.html");
    std::fs::write(&path, render_html(result))?;

    info!("HTML report written to: {}", path.display());
    Ok(path)
}

fn xml_err(e: impl std::fmt::Display) -> CheckError {
    CheckError::Report(e.to_string())
}

fn seconds(ms: u64) -> String {
    format!("{:.3}", ms as f64 / 1000.0)
}

/// Render JUnit XML, one `<testsuite>` per describe block
pub fn render_junit(result: &SuiteResult) -> CheckResult<String> {
    let mut suites: BTreeMap<&str, Vec<&TestResult>> = BTreeMap::new();
    for test in &result.results {
        suites.entry(test.suite.as_str()).or_default().push(test);
    }

    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_err)?;

    let total = result.total.to_string();
    let failures = result.failed.to_string();
    let skipped = result.skipped.to_string();
    let time = seconds(result.duration_ms);
    writer
        .write_event(Event::Start(BytesStart::new("testsuites").with_attributes([
            ("name", "shopcheck"),
            ("tests", total.as_str()),
            ("failures", failures.as_str()),
            ("skipped", skipped.as_str()),
            ("time", time.as_str()),
        ])))
        .map_err(xml_err)?;

    for (name, tests) in suites {
        let count = tests.len().to_string();
        let failed = tests
            .iter()
            .filter(|t| t.status == TestStatus::Failed)
            .count()
            .to_string();
        let skipped = tests
            .iter()
            .filter(|t| t.status == TestStatus::Skipped)
            .count()
            .to_string();
        let time = seconds(tests.iter().map(|t| t.duration_ms).sum());

        writer
            .write_event(Event::Start(BytesStart::new("testsuite").with_attributes([
                ("name", name),
                ("tests", count.as_str()),
                ("failures", failed.as_str()),
                ("skipped", skipped.as_str()),
                ("time", time.as_str()),
            ])))
            .map_err(xml_err)?;

        for test in tests {
            write_testcase(&mut writer, test)?;
        }

        writer
            .write_event(Event::End(BytesEnd::new("testsuite")))
            .map_err(xml_err)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("testsuites")))
        .map_err(xml_err)?;

    String::from_utf8(writer.into_inner().into_inner()).map_err(xml_err)
}

fn write_testcase(writer: &mut Writer<Cursor<Vec<u8>>>, test: &TestResult) -> CheckResult<()> {
    let time = seconds(test.duration_ms);
    let case = BytesStart::new("testcase").with_attributes([
        ("name", test.name.as_str()),
        ("classname", test.project.as_str()),
        ("time", time.as_str()),
    ]);

    match test.status {
        TestStatus::Passed => {
            writer.write_event(Event::Empty(case)).map_err(xml_err)?;
        }
        TestStatus::Flaky => {
            writer.write_event(Event::Start(case)).map_err(xml_err)?;
            let note = format!("passed after {} attempts", test.attempts);
            writer
                .write_event(Event::Start(BytesStart::new("system-out")))
                .map_err(xml_err)?;
            writer
                .write_event(Event::Text(BytesText::new(&note)))
                .map_err(xml_err)?;
            writer
                .write_event(Event::End(BytesEnd::new("system-out")))
                .map_err(xml_err)?;
            writer
                .write_event(Event::End(BytesEnd::new("testcase")))
                .map_err(xml_err)?;
        }
        TestStatus::Skipped => {
            writer.write_event(Event::Start(case)).map_err(xml_err)?;
            writer
                .write_event(Event::Empty(BytesStart::new("skipped")))
                .map_err(xml_err)?;
            writer
                .write_event(Event::End(BytesEnd::new("testcase")))
                .map_err(xml_err)?;
        }
        TestStatus::Failed => {
            writer.write_event(Event::Start(case)).map_err(xml_err)?;
            let message = test.error.clone().unwrap_or_default();
            let body = match &test.failed_step {
                Some(step) => format!("step: {}\n{}", step, message),
                None => message.clone(),
            };
            writer
                .write_event(Event::Start(
                    BytesStart::new("failure").with_attributes([("message", message.as_str())]),
                ))
                .map_err(xml_err)?;
            writer
                .write_event(Event::Text(BytesText::new(&body)))
                .map_err(xml_err)?;
            writer
                .write_event(Event::End(BytesEnd::new("failure")))
                .map_err(xml_err)?;
            writer
                .write_event(Event::End(BytesEnd::new("testcase")))
                .map_err(xml_err)?;
        }
    }
    Ok(())
}

/// Render the HTML summary page
pub fn render_html(result: &SuiteResult) -> String {
    let esc = |text: &str| quick_xml::escape::escape(text).into_owned();

    let mut rows = String::new();
    for test in &result.results {
        let (class, label) = match test.status {
            TestStatus::Passed => ("passed", "passed"),
            TestStatus::Flaky => ("flaky", "flaky"),
            TestStatus::Failed => ("failed", "failed"),
            TestStatus::Skipped => ("skipped", "skipped"),
        };

        let mut detail = String::new();
        if let Some(step) = &test.failed_step {
            detail.push_str(&format!("<div class=\"step\">{}</div>", esc(step)));
        }
        if let Some(error) = &test.error {
            detail.push_str(&format!("<pre>{}</pre>", esc(error)));
        }

        rows.push_str(&format!(
            "<tr class=\"{class}\"><td>{project}</td><td>{suite}</td><td>{name}</td>\
             <td>{label}</td><td>{attempts}</td><td>{ms} ms</td><td>{detail}</td></tr>\n",
            class = class,
            project = test.project,
            suite = esc(&test.suite),
            name = esc(&test.name),
            label = label,
            attempts = test.attempts,
            ms = test.duration_ms,
            detail = detail,
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>shopcheck report</title>
<style>
body {{ font-family: sans-serif; margin: 2rem; }}
table {{ border-collapse: collapse; width: 100%; }}
td, th {{ border: 1px solid #ddd; padding: 4px 8px; text-align: left; vertical-align: top; }}
tr.passed td:nth-child(4) {{ color: #1a7f37; }}
tr.flaky td:nth-child(4) {{ color: #9a6700; }}
tr.failed td:nth-child(4) {{ color: #cf222e; font-weight: bold; }}
tr.skipped td:nth-child(4) {{ color: #6e7781; }}
pre {{ white-space: pre-wrap; margin: 0; }}
.step {{ font-style: italic; }}
</style>
</head>
<body>
<h1>shopcheck report</h1>
<p>{total} tests: {passed} passed, {flaky} flaky, {failed} failed, {skipped} skipped in {duration} s</p>
<table>
<tr><th>Project</th><th>Suite</th><th>Test</th><th>Status</th><th>Attempts</th><th>Duration</th><th>Details</th></tr>
{rows}</table>
</body>
</html>
"#,
        total = result.total,
        passed = result.passed,
        flaky = result.flaky,
        failed = result.failed,
        skipped = result.skipped,
        duration = seconds(result.duration_ms),
        rows = rows,
    )
}
