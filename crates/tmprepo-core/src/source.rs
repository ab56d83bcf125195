//! Source-reference classification.

use std::path::PathBuf;

/// A classified repository source reference.
///
/// Classification happens once per source, up front; nothing downstream
/// re-inspects the raw string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoSource {
    /// Local directory of packages; metadata is generated on the fly.
    Directory(PathBuf),
    /// Local descriptor file, used as-is.
    LocalFile(PathBuf),
    /// Remote descriptor URL.
    Remote(String),
}

impl RepoSource {
    /// Classifies a raw source reference.
    ///
    /// Bare absolute paths are assumed to be file references. A file
    /// reference ending in a path separator names a directory of packages;
    /// everything that is not a file reference is treated as remote.
    pub fn classify(raw: &str) -> Self {
        let normalized = if raw.starts_with('/') {
            format!("file:{raw}")
        } else {
            raw.to_string()
        };

        if let Some(rest) = normalized.strip_prefix("file:") {
            // Accept both file:/path and file:///path spellings.
            let path = if rest.starts_with("///") {
                &rest[2..]
            } else {
                rest
            };
            if path.ends_with('/') {
                Self::Directory(PathBuf::from(path))
            } else {
                Self::LocalFile(PathBuf::from(path))
            }
        } else {
            Self::Remote(normalized)
        }
    }

    /// Local sources are gated by the local signing policy, everything else
    /// by the remote one.
    pub fn is_local(&self) -> bool {
        !matches!(self, Self::Remote(_))
    }
}
