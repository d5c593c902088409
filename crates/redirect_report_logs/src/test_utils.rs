use crate::RequestRecord;
use tracing::dispatcher::DefaultGuard;
use tracing::subscriber;
use tracing_subscriber::fmt;

/// Enable tracing output for tests.
///
/// The tracing test output is only enabled as long as the returned guard
/// is not dropped.
pub fn enable_tracing_output() -> DefaultGuard {
    subscriber::set_default(fmt().compact().with_test_writer().finish())
}

/// Builds a `302` request record.
pub fn record(source_ip: &str, path: &str, user_agent: &str) -> RequestRecord {
    RequestRecord {
        source_ip: source_ip.into(),
        path: path.into(),
        user_agent: user_agent.into(),
        status: 302,
    }
}

/// Builds a raw access log line in the format written by the web servers.
pub fn log_line(source_ip: &str, path: &str, status: u16, user_agent: &str) -> String {
    format!(
        r#"{source_ip} - - [16/Feb/2015:15:39:36 +0000] "GET {path} HTTP/1.1" {status} 178 "-" "{user_agent}" 0.000 0.000 [-] [-]"#
    )
}
