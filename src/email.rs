use crate::config::var;
use lettre::address::AddressError;
use lettre::message::header::{ContentType, ContentTypeErr};
use lettre::message::{Attachment, MultiPart, SinglePart};
use lettre::transport::file::FileTransport;
use lettre::transport::smtp::SmtpTransport;
use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::{Message, Transport};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{info, instrument};

const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("invalid email address")]
    Address(#[from] AddressError),
    #[error("invalid attachment content type")]
    ContentType(#[from] ContentTypeErr),
    #[error("failed to build email")]
    Message(#[from] lettre::error::Error),
    #[error("failed to send email via SMTP")]
    Smtp(#[from] lettre::transport::smtp::Error),
    #[error("failed to write email file")]
    File(#[from] lettre::transport::file::Error),
}

#[derive(Debug)]
pub struct Emails {
    backend: EmailBackend,
    from: String,
}

impl Emails {
    /// Create a new instance detecting the backend from the environment. This will either connect
    /// to a SMTP server or store the emails on the local filesystem.
    ///
    /// - `SMTP_SERVER`, `SMTP_LOGIN`, `SMTP_PASSWORD`: SMTP relay and its credentials.
    /// - `REPORT_MAIL_DIR`: Directory for `.eml` files if no SMTP server is configured.
    pub fn from_environment(from: impl Into<String>) -> anyhow::Result<Self> {
        let backend = match (
            var("SMTP_SERVER")?,
            var("SMTP_LOGIN")?,
            var("SMTP_PASSWORD")?,
        ) {
            (Some(server), Some(login), Some(password)) => EmailBackend::Smtp {
                server,
                login,
                password,
            },
            _ => EmailBackend::FileSystem {
                path: var("REPORT_MAIL_DIR")?.unwrap_or_else(|| "/tmp".into()).into(),
            },
        };

        Ok(Self {
            backend,
            from: from.into(),
        })
    }

    /// Create a new test backend that stores all the outgoing emails in memory, allowing for tests
    /// to later assert the mails were sent.
    pub fn new_in_memory() -> Self {
        Self {
            backend: EmailBackend::Memory {
                mails: Mutex::new(Vec::new()),
            },
            from: "test@localhost".into(),
        }
    }

    /// Sends a report as a file attachment.
    #[instrument(skip(self, contents))]
    pub fn send_report(
        &self,
        recipient: &str,
        subject: &str,
        filename: &str,
        contents: &str,
    ) -> Result<(), EmailError> {
        let body = format!("Please find the {subject} attached.");

        let attachment = Attachment::new(filename.to_string())
            .body(contents.to_string(), ContentType::parse(CSV_CONTENT_TYPE)?);

        let email = Message::builder()
            .to(recipient.parse()?)
            .from(self.from.parse()?)
            .subject(subject)
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(body.clone()))
                    .singlepart(attachment),
            )?;

        match &self.backend {
            EmailBackend::Smtp {
                server,
                login,
                password,
            } => {
                SmtpTransport::relay(server)?
                    .credentials(Credentials::new(login.clone(), password.clone()))
                    .authentication(vec![Mechanism::Plain])
                    .build()
                    .send(&email)?;
            }
            EmailBackend::FileSystem { path } => {
                let id = FileTransport::new(path).send(&email)?;
                info!(path = %path.display(), %id, "Stored email on the file system");
            }
            EmailBackend::Memory { mails } => mails.lock().unwrap().push(StoredEmail {
                to: recipient.into(),
                subject: subject.into(),
                body,
                attachment_name: filename.into(),
                attachment: contents.into(),
            }),
        }

        Ok(())
    }

    /// This is supposed to be used only during tests, to retrieve the messages stored in the
    /// "memory" backend.
    pub fn mails_in_memory(&self) -> Option<Vec<StoredEmail>> {
        if let EmailBackend::Memory { mails } = &self.backend {
            Some(mails.lock().unwrap().clone())
        } else {
            None
        }
    }
}

enum EmailBackend {
    /// Backend used in production to send mails using SMTP.
    Smtp {
        server: String,
        login: String,
        password: String,
    },
    /// Backend used locally, will store the emails in the provided directory.
    FileSystem { path: PathBuf },
    /// Backend used during tests, will keep messages in memory to allow tests to retrieve them.
    Memory { mails: Mutex<Vec<StoredEmail>> },
}

// Custom Debug implementation to avoid showing the SMTP password.
impl std::fmt::Debug for EmailBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmailBackend::Smtp { server, login, .. } => {
                // The password field is *intentionally* not included
                f.debug_struct("Smtp")
                    .field("server", server)
                    .field("login", login)
                    .finish()?;
            }
            EmailBackend::FileSystem { path } => {
                f.debug_struct("FileSystem").field("path", path).finish()?;
            }
            EmailBackend::Memory { .. } => f.write_str("Memory")?,
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct StoredEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachment_name: String,
    pub attachment: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::ENV_MUTEX;
    use claims::{assert_err, assert_matches, assert_ok, assert_some};

    #[test]
    fn sending_to_invalid_email_fails() {
        let emails = Emails::new_in_memory();

        let error = assert_err!(emails.send_report(
            "String.Format(\"{0}.{1}@live.com\", FirstName, LastName)",
            "Redirects Report",
            "report.csv",
            "public\n",
        ));
        assert_matches!(error, EmailError::Address(_));

        assert_eq!(assert_some!(emails.mails_in_memory()).len(), 0);
    }

    #[test]
    fn sending_to_valid_email_succeeds() {
        let emails = Emails::new_in_memory();

        assert_ok!(emails.send_report(
            "someone@example.com",
            "Redirects Report",
            "Redirects Report 2015-02-16.csv",
            "public,syndication,google,bing,path\n",
        ));

        let mails = assert_some!(emails.mails_in_memory());
        assert_eq!(mails.len(), 1);
        assert_eq!(mails[0].to, "someone@example.com");
        assert_eq!(mails[0].subject, "Redirects Report");
        assert_eq!(mails[0].attachment_name, "Redirects Report 2015-02-16.csv");
        assert_eq!(mails[0].attachment, "public,syndication,google,bing,path\n");
    }

    #[test]
    fn file_system_backend_writes_eml_file() {
        let _guard = ENV_MUTEX.lock().unwrap();

        let dir = assert_ok!(tempfile::tempdir());
        unsafe { std::env::remove_var("SMTP_SERVER") };
        unsafe { std::env::set_var("REPORT_MAIL_DIR", dir.path()) };

        let emails = assert_ok!(Emails::from_environment("reports@example.com"));
        unsafe { std::env::remove_var("REPORT_MAIL_DIR") };

        assert_matches!(&emails.backend, EmailBackend::FileSystem { .. });
        assert_ok!(emails.send_report(
            "someone@example.com",
            "Redirects Report",
            "Redirects Report 2015-02-16.csv",
            "public,syndication,google,bing,path\n",
        ));

        let files = assert_ok!(std::fs::read_dir(dir.path())).count();
        assert_eq!(files, 1);
    }

    #[test]
    fn smtp_password_is_not_printed() {
        let emails = Emails {
            backend: EmailBackend::Smtp {
                server: "smtp.example.com".into(),
                login: "reports".into(),
                password: "hunter2".into(),
            },
            from: "reports@example.com".into(),
        };

        let debug = format!("{emails:?}");
        assert!(debug.contains("smtp.example.com"));
        assert!(!debug.contains("hunter2"));
    }
}
