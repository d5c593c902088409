use crate::RequestRecord;
use std::fmt;

/// Internal monitoring host whose health checks are never counted.
const MONITORING_IP: &str = "10.50.6.148";

/// The syndication partner fetching our content.
const SYNDICATION_IP: &str = "66.235.132.38";

const GOOGLE_BOT: &str = "Googlebot";
const BING_BOT: &str = "bingbot";

/// The kind of visitor that followed a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Public,
    Syndication,
    Google,
    Bing,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Public,
        Category::Syndication,
        Category::Google,
        Category::Bing,
    ];

    /// Column name of the category in the report.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Public => "public",
            Category::Syndication => "syndication",
            Category::Google => "google",
            Category::Bing => "bing",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Determines which visitor category a request should be counted for.
///
/// Returns `None` if the request should not be counted at all, which is the
/// case for requests to the root path and for requests from the internal
/// monitoring host.
pub fn classify(record: &RequestRecord) -> Option<Category> {
    if record.path == "/" || record.source_ip == MONITORING_IP {
        return None;
    }

    let category = if record.source_ip == SYNDICATION_IP {
        Category::Syndication
    } else if record.user_agent.contains(GOOGLE_BOT) {
        Category::Google
    } else if record.user_agent.contains(BING_BOT) {
        Category::Bing
    } else {
        Category::Public
    };

    Some(category)
}
