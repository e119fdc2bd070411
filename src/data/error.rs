use std::path::PathBuf;

/// Failures while locating or reading data files.
///
/// A missing file or directory is never reported here; lookups treat it as
/// "no data" and return an empty result.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}:{line}: {message}")]
    Malformed {
        path: PathBuf,
        line: usize,
        message: String,
    },
    #[error("invalid filename pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

impl DataError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DataError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        DataError::Malformed {
            path: path.into(),
            line,
            message: message.into(),
        }
    }
}

/// Rejected form input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("unknown element '{0}'")]
    UnknownElement(String),
    #[error("mass number missing in '{0}'")]
    MissingMass(String),
    #[error("mass number out of range in '{0}'")]
    MassOutOfRange(String),
    #[error("unknown reaction '{0}'")]
    UnknownReaction(String),
    #[error("malformed residual product code '{0}'")]
    BadResidualCode(String),
}
