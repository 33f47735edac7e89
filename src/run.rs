use crate::cli::OutputFormat;
use crate::config::ReportConfig;
use crate::normalize::normalize;
use crate::report::{FailedBuild, Report};
use crate::source::BuildSource;
use anyhow::Result;
use std::io::Write;
use std::time::Instant;
use tracing::{info, warn};

/// Queries every build in order, pools the records and prints the sorted
/// report. A build that cannot be described is reported and skipped.
pub fn run_report<W: Write>(
    config: &ReportConfig,
    source: &dyn BuildSource,
    out: &mut W,
) -> Result<Report> {
    let mut pool = Vec::new();
    let mut failed = Vec::new();

    for build_id in &config.build_ids {
        let start = Instant::now();
        match source.describe(build_id) {
            Ok(build) => {
                let records = normalize(&build, &config.tag_key);
                info!(
                    build_id=%build_id,
                    steps = build.steps.len(),
                    records = records.len(),
                    elapsed_ms = start.elapsed().as_millis(),
                    "described build"
                );
                pool.extend(records);
            }
            Err(e) => {
                warn!(build_id=%build_id, error=%format!("{:#}", e), "failed to describe build");
                if config.format == OutputFormat::Text {
                    writeln!(out, "Error: {}: {:#}", build_id, e)?;
                }
                failed.push(FailedBuild {
                    build_id: build_id.clone(),
                    error: format!("{:#}", e),
                });
            }
        }
    }

    let report = Report::new(pool, failed, config.ranking);
    match config.format {
        OutputFormat::Text => report.write_text(out, config.name_width, config.color)?,
        OutputFormat::Json => report.write_json(out)?,
    }

    info!(
        records = report.records.len(),
        failed_builds = report.failed_builds.len(),
        success = report.success(),
        "report complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceConfig;
    use crate::report::RankingScheme;
    use crate::structures::{BuildDescription, BuildStep, Status};
    use anyhow::anyhow;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::path::PathBuf;

    #[derive(Default)]
    struct FakeSource {
        builds: HashMap<String, BuildDescription>,
        calls: RefCell<Vec<String>>,
    }

    fn step(id: &str, status: &str, env: &[&str]) -> BuildStep {
        BuildStep {
            id: id.to_string(),
            status: Status::from(status),
            env: env.iter().map(|e| e.to_string()).collect(),
        }
    }

    impl FakeSource {
        fn with(mut self, id: &str, steps: Vec<BuildStep>) -> Self {
            self.builds.insert(
                id.to_string(),
                BuildDescription {
                    id: id.to_string(),
                    steps,
                },
            );
            self
        }
    }

    impl BuildSource for FakeSource {
        fn describe(&self, build_id: &str) -> Result<BuildDescription> {
            self.calls.borrow_mut().push(build_id.to_string());
            self.builds
                .get(build_id)
                .cloned()
                .ok_or_else(|| anyhow!("build not found"))
        }
    }

    fn config(ids: &[&str]) -> ReportConfig {
        ReportConfig {
            build_ids: ids.iter().map(|s| s.to_string()).collect(),
            source: SourceConfig::Dir {
                dir: PathBuf::from("unused"),
            },
            ranking: RankingScheme::Detailed,
            exit_on_failure: true,
            tag_key: "REMOTE_TAG_NAME".to_string(),
            name_width: 24,
            format: OutputFormat::Text,
            color: false,
        }
    }

    #[test]
    fn failed_query_is_attributed_and_run_continues() {
        let source = FakeSource::default().with("good", vec![step("deploy", "SUCCESS", &[])]);
        let mut out = Vec::new();
        let report = run_report(&config(&["bad", "good"]), &source, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Error: bad: build not found");
        assert_eq!(lines[1], format!("{:<24}  good SUCCESS", "deploy"));
        assert!(report.success());
        assert_eq!(report.failed_builds.len(), 1);
        assert_eq!(*source.calls.borrow(), vec!["bad", "good"]);
    }

    #[test]
    fn pools_all_builds_before_sorting() {
        let source = FakeSource::default()
            .with(
                "b1",
                vec![step("prolog", "SUCCESS", &[]), step("test", "FAILURE", &[])],
            )
            .with(
                "b2",
                vec![
                    step("build", "SUCCESS", &["REMOTE_TAG_NAME=v1"]),
                    step("test", "WORKING", &[]),
                ],
            );
        let mut out = Vec::new();
        let report = run_report(&config(&["b1", "b2"]), &source, &mut out).unwrap();

        let order: Vec<(&str, &str, &str)> = report
            .records
            .iter()
            .map(|r| (r.name.as_str(), r.build_id.as_str(), r.status.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("build", "b2", "SUCCESS"),
                ("test", "b2", "WORKING"),
                ("test", "b1", "FAILURE"),
            ]
        );
        assert!(!report.success());
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 3);
    }

    #[test]
    fn json_format_keeps_errors_out_of_text_stream() {
        let source = FakeSource::default().with("good", vec![step("deploy", "SUCCESS", &[])]);
        let mut cfg = config(&["bad", "good"]);
        cfg.format = OutputFormat::Json;
        let mut out = Vec::new();
        run_report(&cfg, &source, &mut out).unwrap();

        let doc: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(doc["failed_builds"][0]["build_id"], "bad");
        assert_eq!(doc["failed_builds"][0]["error"], "build not found");
        assert_eq!(doc["records"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn no_builds_described_is_an_empty_successful_report() {
        let source = FakeSource::default();
        let mut out = Vec::new();
        let report = run_report(&config(&["gone"]), &source, &mut out).unwrap();
        assert!(report.records.is_empty());
        assert!(report.success());
    }
}
