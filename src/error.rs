use camino::Utf8PathBuf;
use thiserror::Error;

/// Fatal session errors. Anything recoverable (a file that fails to
/// tokenize, a mutant whose suite cannot run) is a value, not an error.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Bad inputs, caught before scanning begins.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// The unmutated suite does not pass; mutant results would be meaningless.
    #[error("baseline test run failed:\n{output}")]
    BaselineFailure { output: String },

    /// Restoring original source after a mutant failed. The working tree
    /// can no longer be trusted, so the session must stop.
    #[error("failed to restore original content of {}: {source}", path)]
    RevertFailure {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("i/o error on {}: {source}", path)]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SessionError {
    pub fn config(message: impl Into<String>) -> Self {
        SessionError::Configuration {
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        SessionError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
