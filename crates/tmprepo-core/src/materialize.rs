//! Materialization: turning a source reference into a local descriptor file.

use std::{
    fs,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
    process::Command,
};

use tempfile::{Builder, NamedTempFile};
use tracing::{debug, info};

use crate::{
    cleanup::TempTracker,
    error::{ErrorContext, TmpRepoError},
    repofile::{self, RepoDescriptor, GENERATED_REPO_COST},
    TmpRepoResult,
};

/// A descriptor file ready for host registration, together with the state
/// that has to stay alive until registration is done.
#[derive(Debug)]
pub enum Materialized {
    /// Generated from a local package directory. The file lives in a working
    /// directory whose cleanup is the tracker's concern.
    Generated { repo_file: PathBuf, persisted: bool },
    /// Fetched or copied descriptor; removed when the handle drops.
    Fetched { file: NamedTempFile },
}

impl Materialized {
    pub fn repo_file(&self) -> &Path {
        match self {
            Self::Generated { repo_file, .. } => repo_file,
            Self::Fetched { file } => file.path(),
        }
    }
}

/// Generates repository metadata for a local package directory and writes a
/// descriptor file pointing at it.
///
/// The working directory is created under the system temp location and
/// tracked for cleanup unless the caller asked for persistence. The host-side
/// cache directory keyed by the synthesized identifier is tracked as well,
/// since the host populates it as a side effect of registration.
pub fn add_dir_repo(
    source: &Path,
    base_url: &str,
    cache_dir: &Path,
    tool: &str,
    keep_created: bool,
    seq: u32,
    tracker: &mut TempTracker,
) -> TmpRepoResult<Materialized> {
    if !source.is_dir() {
        return Err(TmpRepoError::MissingDirectory(source.to_path_buf()));
    }

    let workdir = Builder::new()
        .prefix("tmprepo-")
        .tempdir()
        .with_context(|| "creating temporary working directory".to_string())?
        .keep();

    if keep_created {
        // Persisted metadata should be readable by whoever picks it up later.
        let perms = fs::Permissions::from_mode(0o755);
        fs::set_permissions(&workdir, perms)
            .with_context(|| format!("adjusting permissions on {}", workdir.display()))?;
    } else {
        tracker.track(&workdir);
    }

    let basename = source
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("repo");
    let id = repofile::synthesize_repo_id(basename, seq);

    generate_metadata(tool, source, base_url, &workdir)?;

    let repo = RepoDescriptor {
        id: id.clone(),
        name: format!("Temporary repo for {}", source.display()),
        baseurl: base_url.to_string(),
        enabled: true,
        gpgcheck: "packages".to_string(),
        gpgkey: Vec::new(),
        metadata_expire: Some(0),
        cost: Some(GENERATED_REPO_COST),
    };
    let repo_file = workdir.join(format!("tmp-{basename}.repo"));
    repofile::write_repo_file(&repo, &repo_file)?;

    if keep_created {
        info!("Creating saved repodata for {}", source.display());
        info!("    result is saved at {}", repo_file.display());
    } else {
        info!("Creating temporary repodata for {}", source.display());
    }

    // The host fills this in during registration; it is transient either way.
    tracker.track(cache_dir.join(&id));

    Ok(Materialized::Generated {
        repo_file,
        persisted: keep_created,
    })
}

fn generate_metadata(
    tool: &str,
    source: &Path,
    base_url: &str,
    outdir: &Path,
) -> TmpRepoResult<()> {
    debug!("running {tool} for {}", source.display());
    let status = Command::new(tool)
        .arg("--database")
        .arg("--baseurl")
        .arg(base_url)
        .arg("--outputdir")
        .arg(outdir)
        .arg(source)
        .status()
        .map_err(|err| TmpRepoError::MetadataGeneration {
            path: source.to_path_buf(),
            reason: err.to_string(),
        })?;

    if !status.success() {
        return Err(TmpRepoError::MetadataGeneration {
            path: source.to_path_buf(),
            reason: format!("{tool} exited with {status}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn workdir_of(materialized: &Materialized) -> PathBuf {
        materialized.repo_file().parent().unwrap().to_path_buf()
    }

    #[test]
    fn test_generated_descriptor_fields() {
        let source = tempdir().unwrap();
        let cache = tempdir().unwrap();
        let mut tracker = TempTracker::new();

        let materialized = add_dir_repo(
            source.path(),
            "file:/srv/pkgs/",
            cache.path(),
            "true",
            false,
            1,
            &mut tracker,
        )
        .unwrap();

        let repos = repofile::parse_repo_file(materialized.repo_file()).unwrap();
        assert_eq!(repos.len(), 1);
        let repo = &repos[0];
        assert!(repo.enabled);
        assert_eq!(repo.gpgcheck, "packages");
        assert_eq!(repo.metadata_expire, Some(0));
        assert_eq!(repo.cost, Some(GENERATED_REPO_COST));
        assert_eq!(repo.baseurl, "file:/srv/pkgs/");
        assert!(repo.id.starts_with("t1-"));

        // Both the working directory and the host cache directory are
        // scheduled for removal.
        let workdir = workdir_of(&materialized);
        assert!(tracker.tracked().contains(&workdir));
        assert_eq!(tracker.tracked().len(), 2);

        tracker.cleanup_all();
        assert!(!workdir.exists());
    }

    #[test]
    fn test_keep_created_leaves_workdir_untracked() {
        let source = tempdir().unwrap();
        let cache = tempdir().unwrap();
        let mut tracker = TempTracker::new();

        let materialized = add_dir_repo(
            source.path(),
            "file:/srv/pkgs/",
            cache.path(),
            "true",
            true,
            1,
            &mut tracker,
        )
        .unwrap();

        let workdir = workdir_of(&materialized);
        assert!(!tracker.tracked().contains(&workdir));
        // The cache directory is still transient.
        assert_eq!(tracker.tracked().len(), 1);

        tracker.cleanup_all();
        assert!(workdir.exists());
        fs::remove_dir_all(workdir).unwrap();
    }

    #[test]
    fn test_missing_source_directory() {
        let cache = tempdir().unwrap();
        let mut tracker = TempTracker::new();
        let err = add_dir_repo(
            Path::new("/nonexistent/pkgs/"),
            "file:/nonexistent/pkgs/",
            cache.path(),
            "true",
            false,
            1,
            &mut tracker,
        )
        .unwrap_err();
        assert!(matches!(err, TmpRepoError::MissingDirectory(_)));
        assert!(tracker.tracked().is_empty());
    }

    #[test]
    fn test_failed_metadata_generation_is_surfaced() {
        let source = tempdir().unwrap();
        let cache = tempdir().unwrap();
        let mut tracker = TempTracker::new();

        let err = add_dir_repo(
            source.path(),
            "file:/srv/pkgs/",
            cache.path(),
            "false",
            false,
            1,
            &mut tracker,
        )
        .unwrap_err();
        assert!(matches!(err, TmpRepoError::MetadataGeneration { .. }));
        tracker.cleanup_all();
    }
}
