//! # Access log line parsing
//!
//! The nginx access logs come in two flavours. Lines written directly by a
//! web server look like this:
//!
//! ```text
//! 5.148.140.228 - - [16/Feb/2015:15:39:36 +0000] "GET /article/ HTTP/1.1" 302 178 "-" "-" 0.000 0.000 [-] [-]
//! ```
//!
//! Lines collected on the central syslog server carry an additional
//! `<month> <day> <time> <host> <tag>:` prefix. All request fields are
//! therefore located relative to the first standalone `-` token (the ident
//! field of the combined log format), which works for both flavours.
//!
//! The user agent is the exception: it is read from a fixed absolute token
//! index, regardless of any prefix.

use tracing::instrument;

/// Token marking the ident field of the combined log format.
const ANCHOR: &str = "-";

const SOURCE_IP_OFFSET: isize = -1;
const PATH_OFFSET: isize = 5;
const STATUS_OFFSET: isize = 7;

/// Absolute (0-based) token index at which the user agent starts.
const USER_AGENT_INDEX: usize = 12;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("missing `-` field in log line: {line}")]
    MissingAnchor { line: String },
    #[error("log line is too short to contain a {field}: {line}")]
    MissingField { field: &'static str, line: String },
}

/// The parts of a single access log line that are relevant for the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRecord {
    pub source_ip: String,
    /// Request path without the query string.
    pub path: String,
    pub user_agent: String,
    /// HTTP response status, or `0` if the status field is not a number.
    pub status: u16,
}

impl RequestRecord {
    #[instrument(level = "trace")]
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let tokens = line.split_whitespace().collect::<Vec<_>>();

        let anchor = tokens
            .iter()
            .position(|token| *token == ANCHOR)
            .ok_or_else(|| ParseError::MissingAnchor { line: line.into() })?;

        let field = |offset: isize, field: &'static str| {
            anchor
                .checked_add_signed(offset)
                .and_then(|index| tokens.get(index))
                .copied()
                .ok_or_else(|| ParseError::MissingField {
                    field,
                    line: line.into(),
                })
        };

        let source_ip = field(SOURCE_IP_OFFSET, "source IP")?;
        let path = field(PATH_OFFSET, "path")?;
        let status = field(STATUS_OFFSET, "status")?;

        let user_agent = tokens
            .get(USER_AGENT_INDEX..)
            .map(|tokens| tokens.join(" "))
            .unwrap_or_default();

        Ok(Self {
            source_ip: source_ip.into(),
            path: strip_query(path).into(),
            user_agent,
            status: status.parse().unwrap_or(0),
        })
    }

    /// Returns `true` for all `3xx` responses up to and including
    /// `308 Permanent Redirect`.
    pub fn is_redirect(&self) -> bool {
        (300..=308).contains(&self.status)
    }
}

fn strip_query(path: &str) -> &str {
    path.split_once('?').map_or(path, |(path, _query)| path)
}
