//! Results reporting and formatting.

use crate::config::TestConfig;
use crate::metrics::StatsReport;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use serde::Serialize;
use std::io::Write;

/// Report format written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    /// JSON and CSV output must be the only thing on stdout.
    pub fn is_machine_readable(self) -> bool {
        !matches!(self, OutputFormat::Table)
    }
}

/// Formats test results for output.
pub struct ResultsReport;

#[derive(Serialize)]
struct JsonReport<'a> {
    timestamp: String,
    config: &'a TestConfig,
    results: &'a StatsReport,
}

impl ResultsReport {
    /// Run parameters shown before dispatch starts.
    pub fn format_preamble(config: &TestConfig) -> String {
        format!(
            "Starting load test: {} requests with {} concurrent workers\n\
             Target: {}:{}\n\
             Observation: {}x{}x{}\n\
             {}",
            config.requests,
            config.concurrency,
            config.host,
            config.port,
            config.observation.channels,
            config.observation.height,
            config.observation.width,
            "-".repeat(60)
        )
    }

    /// Write the preamble to `stdout` for the table, to `stderr` otherwise.
    pub fn write_preamble(
        config: &TestConfig,
        format: OutputFormat,
        stdout: &mut impl Write,
        stderr: &mut impl Write,
    ) -> std::io::Result<()> {
        let preamble = Self::format_preamble(config);
        if format.is_machine_readable() {
            writeln!(stderr, "{}", preamble)
        } else {
            writeln!(stdout, "{}", preamble)
        }
    }

    /// Full report text for `format`, as printed to stdout.
    pub fn render(
        config: &TestConfig,
        stats: &StatsReport,
        format: OutputFormat,
    ) -> anyhow::Result<String> {
        Ok(match format {
            OutputFormat::Table => Self::format_table(config, stats),
            OutputFormat::Json => Self::format_json(config, stats)?,
            OutputFormat::Csv => format!(
                "{}\n{}",
                Self::csv_header(),
                Self::format_csv(config, stats)
            ),
        })
    }

    /// Format results as a console table.
    pub fn format_table(config: &TestConfig, stats: &StatsReport) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec![format!("Load Test Results: {}", config.name)]);

        table.add_row(vec!["Target:", &format!("{}:{}", config.host, config.port)]);
        table.add_row(vec!["Concurrency:", &config.concurrency.to_string()]);

        table.add_row(vec!["", ""]);
        table.add_row(vec!["Total Requests:", &stats.total_requests.to_string()]);
        table.add_row(vec![
            "Successful:",
            &format!(
                "{} ({:.1}%)",
                stats.successful_requests, stats.success_rate
            ),
        ]);
        table.add_row(vec![
            "Failed:",
            &format!("{} ({:.1}%)", stats.failed_requests, stats.failure_rate),
        ]);
        table.add_row(vec!["Total Time:", &format!("{:.2}s", stats.duration_secs)]);
        table.add_row(vec![
            "Throughput:",
            &format!("{:.1} req/s", stats.requests_per_second),
        ]);

        if let Some(latency) = &stats.latency {
            table.add_row(vec!["", ""]);
            table.add_row(vec!["Latency (ms)", "min / max / mean / median / std dev"]);
            table.add_row(vec![
                "",
                &format!(
                    "{:.2} / {:.2} / {:.2} / {:.2} / {}",
                    latency.min,
                    latency.max,
                    latency.mean,
                    latency.median,
                    format_optional(latency.std_dev)
                ),
            ]);

            table.add_row(vec!["", ""]);
            table.add_row(vec!["Percentiles (ms)", "p50 / p90 / p95 / p99"]);
            table.add_row(vec![
                "",
                &format!(
                    "{:.2} / {:.2} / {:.2} / {:.2}",
                    latency.p50, latency.p90, latency.p95, latency.p99
                ),
            ]);

            if !latency.histogram.is_empty() {
                table.add_row(vec!["", ""]);
                table.add_row(vec!["Distribution (ms)", "count"]);
                for bucket in &latency.histogram {
                    table.add_row(vec![
                        format!("<= {:.0}", bucket.upper_ms),
                        bucket.count.to_string(),
                    ]);
                }
            }
        } else {
            table.add_row(vec!["", ""]);
            table.add_row(vec!["Latency (ms)", "N/A (no successful requests)"]);
        }

        if !stats.error_samples.is_empty() {
            table.add_row(vec!["", ""]);
            table.add_row(vec!["Sample Errors", ""]);
            for error in &stats.error_samples {
                table.add_row(vec!["-", error.as_str()]);
            }
        }

        table.to_string()
    }

    /// Format results as JSON.
    pub fn format_json(config: &TestConfig, stats: &StatsReport) -> anyhow::Result<String> {
        let report = JsonReport {
            timestamp: chrono::Utc::now().to_rfc3339(),
            config,
            results: stats,
        };
        Ok(serde_json::to_string_pretty(&report)?)
    }

    /// Format results as CSV row.
    pub fn format_csv(config: &TestConfig, stats: &StatsReport) -> String {
        let percentiles = match &stats.latency {
            Some(l) => format!(
                "{:.2},{:.2},{:.2},{:.2},{:.2}",
                l.mean, l.p50, l.p90, l.p95, l.p99
            ),
            None => ",,,,".to_string(),
        };

        format!(
            "{},{},{},{},{},{:.2},{:.1},{:.1},{}",
            chrono::Utc::now().to_rfc3339(),
            csv_field(&config.name),
            csv_field(&format!("{}:{}", config.host, config.port)),
            stats.total_requests,
            config.concurrency,
            stats.duration_secs,
            stats.requests_per_second,
            stats.success_rate,
            percentiles
        )
    }

    /// CSV header row.
    pub fn csv_header() -> &'static str {
        "timestamp,config,target,requests,concurrency,duration,rps,success_rate,mean,p50,p90,p95,p99"
    }
}

/// Quote a CSV field when it contains a delimiter, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn format_optional(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "N/A".to_string())
}
