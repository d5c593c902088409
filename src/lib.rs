//! Counts the redirects served by nginx per configured redirect rule, split
//! up by the kind of visitor that followed them.

use crate::sources::LogSource;
use anyhow::Context;
use chrono::{Local, NaiveDate};
use redirect_report_logs::{Summary, count_redirects, format_report};
use std::io::Write;
use tracing::{debug, info, instrument};

pub mod config;
pub mod email;
pub mod rule_files;
pub mod sources;
pub mod util;

pub use crate::config::Config;
pub use crate::email::Emails;

const REPORT_SUBJECT: &str = "Redirects Report";

#[derive(clap::Parser, Debug)]
#[command(
    name = "redirect-report",
    about = "Counts redirected requests in nginx access logs per redirect rule.",
    after_help = "Redirect rules are read from the files matching $REDIRECT_RULES_GLOB."
)]
pub struct Opts {
    /// Access log files to read. Use `-` for stdin. Files ending in `.gz`
    /// or `.zst` are decompressed.
    #[arg(value_name = "LOG_FILE")]
    pub log_files: Vec<String>,

    /// Mail the report to ADDRESS instead of printing it.
    #[arg(short, long, value_name = "ADDRESS")]
    pub mail: Option<String>,
}

/// Loads the redirect rules, counts the redirects in all log sources and
/// either prints the report to `stdout` or mails it.
///
/// If mailing the report fails it is printed to `stdout` instead, but the
/// error is still returned.
#[instrument(skip_all)]
pub async fn run(
    opts: Opts,
    config: &Config,
    emails: &Emails,
    stdout: &mut impl Write,
) -> anyhow::Result<()> {
    let mut rules = rule_files::load_rules(&config.rules_glob)
        .await
        .context("Failed to load redirect rules")?;

    info!(num_rules = rules.len(), "Loaded redirect rules");

    let mut summary = Summary::new();
    for argument in &opts.log_files {
        let source = LogSource::from_argument(argument);
        let reader = source.open().await?;

        let source_summary = count_redirects(reader, &mut rules)
            .await
            .with_context(|| format!("Failed to read {source}"))?;

        debug!(%source, ?source_summary, "Processed log source");
        summary += source_summary;
    }

    info!(
        lines = summary.lines,
        skipped = summary.skipped,
        redirects = summary.redirects,
        counted = summary.counted,
        "Processed access logs"
    );

    let Some(address) = opts.mail else {
        stdout.write_all(format_report(rules.values(), "\t").as_bytes())?;
        return Ok(());
    };

    let report = format_report(rules.values(), ",");
    let filename = report_filename(Local::now().date_naive());

    if let Err(error) = emails.send_report(&address, REPORT_SUBJECT, &filename, &report) {
        stdout.write_all(report.as_bytes())?;
        return Err(error).with_context(|| format!("Failed to mail report to {address}"));
    }

    info!(%address, %filename, "Mailed report");
    Ok(())
}

fn report_filename(date: NaiveDate) -> String {
    format!("{REPORT_SUBJECT} {date}.csv")
}
