use anyhow::Context;
use redirect_report_logs::{Compression, Decompressor};
use std::fmt;
use std::path::PathBuf;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, BufReader};

const STDIN_ARGUMENT: &str = "-";

/// A source of access log lines, as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSource {
    Stdin,
    File {
        path: PathBuf,
        compression: Option<Compression>,
    },
}

impl LogSource {
    pub fn from_argument(argument: &str) -> Self {
        if argument == STDIN_ARGUMENT {
            return LogSource::Stdin;
        }

        let path = PathBuf::from(argument);
        let compression = Compression::from_path(&path);
        LogSource::File { path, compression }
    }

    /// Opens the source for line-by-line reading, decompressing it if
    /// necessary.
    pub async fn open(&self) -> anyhow::Result<Box<dyn AsyncBufRead + Unpin + Send>> {
        let LogSource::File { path, compression } = self else {
            return Ok(Box::new(BufReader::new(tokio::io::stdin())));
        };

        let file = File::open(path)
            .await
            .with_context(|| format!("Failed to open {}", path.display()))?;

        let reader = BufReader::new(file);

        Ok(match compression {
            Some(compression) => Box::new(BufReader::new(Decompressor::new(reader, *compression))),
            None => Box::new(reader),
        })
    }
}

impl fmt::Display for LogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogSource::Stdin => f.write_str("<stdin>"),
            LogSource::File { path, .. } => write!(f, "{}", path.display()),
        }
    }
}
