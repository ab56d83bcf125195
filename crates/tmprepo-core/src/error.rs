//! Error types for tmprepo-core.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Core error type for temporary repository operations.
#[derive(Error, Diagnostic, Debug)]
pub enum TmpRepoError {
    #[error("Error while {action}")]
    #[diagnostic(code(tmprepo::io), help("Check file permissions and disk space"))]
    IoError {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid URL: {url}")]
    #[diagnostic(code(tmprepo::invalid_url))]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to retrieve `{url}`")]
    #[diagnostic(
        code(tmprepo::fetch),
        help("Check your internet connection and the repository URL")
    )]
    FetchFailed {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    #[error("HTTP {status} while retrieving `{url}`")]
    #[diagnostic(code(tmprepo::http_error))]
    HttpStatus { status: u16, url: String },

    #[error("Failed to find directory `{0}`")]
    #[diagnostic(code(tmprepo::missing_directory))]
    MissingDirectory(PathBuf),

    #[error("Metadata generation failed for `{path}`: {reason}")]
    #[diagnostic(
        code(tmprepo::metadata),
        help("Check that the metadata tool is installed and the directory is readable")
    )]
    MetadataGeneration { path: PathBuf, reason: String },

    #[error(transparent)]
    #[diagnostic(code(tmprepo::toml), help("Check your configuration syntax"))]
    TomlError(#[from] toml::de::Error),

    #[error("{0}")]
    #[diagnostic(code(tmprepo::error))]
    Custom(String),
}

/// Trait for adding context to IO errors.
pub trait ErrorContext<T> {
    fn with_context<C>(self, context: C) -> std::result::Result<T, TmpRepoError>
    where
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<C>(self, context: C) -> std::result::Result<T, TmpRepoError>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| TmpRepoError::IoError {
            action: context(),
            source: err,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_context() {
        let result: std::io::Result<()> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));
        let err = result
            .with_context(|| "reading descriptor".to_string())
            .unwrap_err();
        assert_eq!(err.to_string(), "Error while reading descriptor");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_missing_directory_display() {
        let err = TmpRepoError::MissingDirectory(PathBuf::from("/srv/pkgs"));
        assert_eq!(err.to_string(), "Failed to find directory `/srv/pkgs`");
    }

    #[test]
    fn test_http_status_display() {
        let err = TmpRepoError::HttpStatus {
            status: 404,
            url: "http://example.com/foo.repo".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("HTTP 404"));
        assert!(msg.contains("http://example.com/foo.repo"));
    }
}
