pub mod classify;
mod compression;
pub mod log_line;
pub mod report;
pub mod rules;
mod summary;
#[cfg(test)]
mod test_utils;

pub use crate::classify::{Category, classify};
pub use crate::compression::{Compression, Decompressor};
pub use crate::log_line::{ParseError, RequestRecord};
pub use crate::report::format_report;
pub use crate::rules::{RedirectRule, RedirectRules, RuleCounts, RuleError, RuleLine};
pub use crate::summary::{Outcome, Summary};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug_span, instrument, warn};

/// Counts a single request against the redirect rules.
///
/// Only redirect responses are considered. Excluded requests and requests
/// without a matching rule leave all counters untouched, otherwise exactly
/// one counter of the first matching rule is incremented.
pub fn process(record: &RequestRecord, rules: &mut RedirectRules) -> Outcome {
    if !record.is_redirect() {
        return Outcome::NotRedirect;
    }

    let Some(category) = classify(record) else {
        return Outcome::Excluded;
    };

    let Some(rule) = rules.find_match_mut(&record.path) else {
        return Outcome::Unmatched;
    };

    rule.count(category);
    Outcome::Counted(category)
}

/// Reads access log lines until the end of the stream and counts the
/// redirects against the given rules.
///
/// Lines that can not be parsed are skipped. Invalid UTF-8 is replaced
/// rather than rejected.
#[instrument(skip_all)]
pub async fn count_redirects<R>(mut reader: R, rules: &mut RedirectRules) -> anyhow::Result<Summary>
where
    R: AsyncBufRead + Unpin,
{
    let mut summary = Summary::new();

    let mut buffer = Vec::new();
    loop {
        buffer.clear();
        if reader.read_until(b'\n', &mut buffer).await? == 0 {
            break;
        }

        let line = String::from_utf8_lossy(&buffer);

        let span = debug_span!("process_line");
        let _guard = span.enter();

        match RequestRecord::parse(&line) {
            Ok(record) => summary.record(process(&record, rules)),
            Err(error) => {
                warn!("Skipping log line: {error}");
                summary.record_skipped();
            }
        }
    }

    Ok(summary)
}
