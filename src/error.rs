use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// Operational errors. Missing corpora, empty queries and unmatched
/// questions are not errors; they are reported through `Answer::Refused`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings file {path}: {source}")]
    Settings {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid file pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Invalid stop-word list at line {line}: '{content}'")]
    StopWords { line: usize, content: String },

    #[error("Failed to extract text from {path}: {message}")]
    Extract { path: String, message: String },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn extract(path: impl Into<String>, message: impl ToString) -> Self {
        Error::Extract {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
