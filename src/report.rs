use crate::structures::{Status, StepRecord};
use anyhow::{Context, Result};
use chrono::Utc;
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use std::cmp::Ordering;
use std::io::Write;

/// How statuses are bucketed for ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RankingScheme {
    /// One bucket per known status, unknown statuses just before FAILURE.
    #[default]
    Detailed,
    /// SUCCESS first, FAILURE last, everything else in between.
    Coarse,
}

/// Rank used only for ordering; lower sorts first.
pub fn severity(status: &Status, scheme: RankingScheme) -> u8 {
    match (scheme, status) {
        (_, Status::Success) => 0,
        (_, Status::Failure) => 100,
        (RankingScheme::Detailed, Status::Working) => 1,
        (RankingScheme::Detailed, Status::Queued) => 2,
        (RankingScheme::Detailed, Status::InternalError) => 3,
        (RankingScheme::Detailed, Status::Cancelled) => 4,
        (RankingScheme::Detailed, Status::Timeout) => 5,
        (RankingScheme::Detailed, Status::Other(_)) => 90,
        (RankingScheme::Coarse, _) => 90,
    }
}

/// Severity, then name, then build id ascending; tag breaks the last tie
/// in descending order.
pub fn compare(a: &StepRecord, b: &StepRecord, scheme: RankingScheme) -> Ordering {
    severity(&a.status, scheme)
        .cmp(&severity(&b.status, scheme))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.build_id.cmp(&b.build_id))
        .then_with(|| b.tag.cmp(&a.tag))
}

/// Stable sort of the pooled records.
pub fn sort_records(records: &mut [StepRecord], scheme: RankingScheme) {
    records.sort_by(|a, b| compare(a, b, scheme));
}

/// True when every record's status is exactly SUCCESS.
pub fn verdict(records: &[StepRecord]) -> bool {
    records.iter().all(|r| r.status.is_success())
}

pub fn render_line(record: &StepRecord, name_width: usize, color: bool) -> String {
    let status = if color {
        colorize_status(&record.status)
    } else {
        record.status.to_string()
    };
    format!(
        "{:<width$} {} {} {}",
        record.name,
        record.tag,
        record.build_id,
        status,
        width = name_width
    )
}

fn colorize_status(status: &Status) -> String {
    let s = status.as_str();
    match status {
        Status::Success => s.green().to_string(),
        Status::Working | Status::Queued => s.yellow().to_string(),
        Status::InternalError | Status::Cancelled | Status::Timeout | Status::Failure => {
            s.red().bold().to_string()
        }
        Status::Other(_) => s.magenta().to_string(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedBuild {
    pub build_id: String,
    pub error: String,
}

/// Sorted pool plus the builds that could not be queried.
#[derive(Debug, Default)]
pub struct Report {
    pub records: Vec<StepRecord>,
    pub failed_builds: Vec<FailedBuild>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    success: bool,
    failed_builds: &'a [FailedBuild],
    records: &'a [StepRecord],
}

impl Report {
    pub fn new(
        mut records: Vec<StepRecord>,
        failed_builds: Vec<FailedBuild>,
        scheme: RankingScheme,
    ) -> Self {
        sort_records(&mut records, scheme);
        Self {
            records,
            failed_builds,
        }
    }

    pub fn success(&self) -> bool {
        verdict(&self.records)
    }

    pub fn write_text<W: Write>(&self, out: &mut W, name_width: usize, color: bool) -> Result<()> {
        for r in &self.records {
            writeln!(out, "{}", render_line(r, name_width, color))
                .context("Failed to write report")?;
        }
        Ok(())
    }

    pub fn write_json<W: Write>(&self, out: &mut W) -> Result<()> {
        let doc = JsonReport {
            generated_at: Utc::now().to_rfc3339(),
            success: self.success(),
            failed_builds: &self.failed_builds,
            records: &self.records,
        };
        serde_json::to_writer_pretty(&mut *out, &doc).context("Failed to write JSON report")?;
        writeln!(out)?;
        Ok(())
    }
}
