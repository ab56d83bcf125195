//! The package-manager side of repository registration.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{
    error::ErrorContext,
    policy::PolicyValidator,
    repofile::{self, RepoDescriptor},
    TmpRepoResult,
};

/// Registration interface the plugin drives. The host parses the descriptor
/// file itself and applies the validator to every block before accepting it;
/// only fatal I/O problems are surfaced as errors.
pub trait RepoHost {
    /// Root of the host cache. Generated repositories get a subdirectory
    /// keyed by their identifier.
    fn cache_dir(&self) -> PathBuf;

    /// Registers every acceptable repository block of `repo_file`.
    fn register(&mut self, repo_file: &Path, validate: &PolicyValidator) -> TmpRepoResult<()>;
}

/// Host implementation backing the command-line frontend. Accepted
/// descriptors are held in memory and their cache directories are created
/// eagerly, matching the side effect the tracker later cleans up.
pub struct StandardHost {
    cache_dir: PathBuf,
    repos: Vec<RepoDescriptor>,
}

impl StandardHost {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            repos: Vec::new(),
        }
    }

    pub fn repos(&self) -> &[RepoDescriptor] {
        &self.repos
    }
}

impl RepoHost for StandardHost {
    fn cache_dir(&self) -> PathBuf {
        self.cache_dir.clone()
    }

    fn register(&mut self, repo_file: &Path, validate: &PolicyValidator) -> TmpRepoResult<()> {
        for repo in repofile::parse_repo_file(repo_file)? {
            if !validate.validate(&repo) {
                // The validator already logged the reason.
                continue;
            }
            let cache = self.cache_dir.join(&repo.id);
            fs::create_dir_all(&cache)
                .with_context(|| format!("creating cache directory {}", cache.display()))?;
            debug!("registered repository {}", repo.id);
            self.repos.push(repo);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_register_applies_validator_per_block() {
        let cache = tempdir().unwrap();
        let dir = tempdir().unwrap();
        let repo_file = dir.path().join("mixed.repo");
        fs::write(
            &repo_file,
            "[good]\nname=Good\nbaseurl=http://example.com\ngpgcheck=repo\n\
             [bad]\nname=Bad\nbaseurl=http://example.com\ngpgcheck=none\n",
        )
        .unwrap();

        let mut host = StandardHost::new(cache.path());
        let validator = PolicyValidator::new("repo");
        host.register(&repo_file, &validator).unwrap();

        assert_eq!(host.repos().len(), 1);
        assert_eq!(host.repos()[0].id, "good");
        assert!(cache.path().join("good").is_dir());
        assert!(!cache.path().join("bad").exists());
    }

    #[test]
    fn test_register_missing_file_is_fatal() {
        let cache = tempdir().unwrap();
        let mut host = StandardHost::new(cache.path());
        let validator = PolicyValidator::new("repo");
        assert!(host
            .register(Path::new("/nonexistent/x.repo"), &validator)
            .is_err());
    }
}
