use std::path::PathBuf;

/// Errors that can occur in ruSV.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid parameter: {0}")]
    Parameter(String),

    #[error("I/O error: {source} ({})", path.display())]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("invalid evidence: {0}")]
    InvalidEvidence(String),

    #[error("not implemented: {0}")]
    NotImplemented(String),

    #[error("BAM parsing error: {0}")]
    Bam(String),

    #[error("call table error: {0}")]
    CallTable(String),
}

impl Error {
    /// Convenience for wrapping an `io::Error` with a path context.
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            source,
            path: path.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            source: err,
            path: PathBuf::from("<unknown>"),
        }
    }
}
