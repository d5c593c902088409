//! Configuration options read from the environment
//!
//! - `REDIRECT_RULES_GLOB`: Glob of the nginx redirect map files.
//!   Defaults to `/etc/nginx/conf.d/*redirects.map`.
//! - `REPORT_MAIL_FROM`: Sender address of mailed reports.
//!
//! The mail transport settings are read by [`Emails::from_environment`].
//!
//! [`Emails::from_environment`]: crate::email::Emails::from_environment

const DEFAULT_RULES_GLOB: &str = "/etc/nginx/conf.d/*redirects.map";
const DEFAULT_MAIL_FROM: &str = "development.team@moneyadviceservice.org.uk";

#[derive(Debug, Clone)]
pub struct Config {
    pub rules_glob: String,
    pub mail_from: String,
}

impl Config {
    pub fn from_environment() -> anyhow::Result<Self> {
        let rules_glob = var("REDIRECT_RULES_GLOB")?.unwrap_or_else(|| DEFAULT_RULES_GLOB.into());
        let mail_from = var("REPORT_MAIL_FROM")?.unwrap_or_else(|| DEFAULT_MAIL_FROM.into());

        Ok(Self {
            rules_glob,
            mail_from,
        })
    }
}

/// Reads an environment variable for the current process.
///
/// Compared to [std::env::var] this loads the `.env` file from the current
/// or parent directories first, and returns `Ok(None)` (instead of `Err`) if
/// the variable wasn't set.
#[track_caller]
pub fn var(key: &str) -> anyhow::Result<Option<String>> {
    match dotenvy::var(key) {
        Ok(content) => Ok(Some(content)),
        Err(dotenvy::Error::EnvVar(std::env::VarError::NotPresent)) => Ok(None),
        Err(error) => Err(error.into()),
    }
}
