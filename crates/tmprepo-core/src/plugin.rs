//! Orchestration of the temporary-repository pass.

use std::{path::Path, time::Duration};

use tracing::{debug, warn};

use crate::{
    cleanup::TempTracker,
    config::PluginConfig,
    fetch::{self, Fetcher},
    host::RepoHost,
    materialize::{self, Materialized},
    policy::PolicyValidator,
    source::RepoSource,
    TmpRepoResult,
};

/// Owns the run state for one plugin activation: configuration, the tracked
/// transient directories, and the run-once guard.
pub struct TmpRepoPlugin {
    config: PluginConfig,
    tracker: TempTracker,
    fetcher: Fetcher,
    done: bool,
    seq: u32,
}

impl TmpRepoPlugin {
    pub fn new(config: PluginConfig) -> Self {
        let fetcher = Fetcher::new(Duration::from_secs(config.fetch_timeout_secs));
        Self {
            config,
            tracker: TempTracker::new(),
            fetcher,
            done: false,
            seq: 0,
        }
    }

    /// Materializes and registers every requested source.
    ///
    /// The host may dispatch this hook more than once per run; only the first
    /// invocation performs work. A source that cannot be materialized is
    /// skipped with a warning; the batch never aborts because one source
    /// failed. Host-side registration failures are fatal and propagate.
    pub fn pre_repo_setup<H: RepoHost>(
        &mut self,
        host: &mut H,
        sources: &[String],
        keep_created: bool,
    ) -> TmpRepoResult<()> {
        if self.done {
            debug!("temporary repositories already processed");
            return Ok(());
        }
        self.done = true;

        if sources.is_empty() {
            return Ok(());
        }

        let keep = keep_created || self.config.keep_created;
        let remote_validator = PolicyValidator::new(&self.config.remote_gpgcheck);
        let local_validator = PolicyValidator::new(&self.config.local_gpgcheck);
        let cache_dir = host.cache_dir();

        for raw in sources {
            let source = RepoSource::classify(raw);
            let validator = if source.is_local() {
                &local_validator
            } else {
                &remote_validator
            };

            let materialized = match self.materialize(&source, &cache_dir, keep) {
                Ok(materialized) => materialized,
                Err(err) => {
                    warn!("Failed to add temporary repository {raw}: {err}");
                    continue;
                }
            };

            host.register(materialized.repo_file(), validator)?;
        }

        Ok(())
    }

    fn materialize(
        &mut self,
        source: &RepoSource,
        cache_dir: &Path,
        keep: bool,
    ) -> TmpRepoResult<Materialized> {
        match source {
            RepoSource::Directory(path) => {
                self.seq += 1;
                let base_url = format!("file:{}", path.display());
                materialize::add_dir_repo(
                    path,
                    &base_url,
                    cache_dir,
                    &self.config.createrepo_command,
                    keep,
                    self.seq,
                    &mut self.tracker,
                )
            }
            RepoSource::LocalFile(path) => {
                fetch::copy_local(path).map(|file| Materialized::Fetched { file })
            }
            RepoSource::Remote(url) => self
                .fetcher
                .fetch_to_temp(url)
                .map(|file| Materialized::Fetched { file }),
        }
    }

    pub fn tracker(&self) -> &TempTracker {
        &self.tracker
    }

    /// Shutdown hook: removes every tracked directory, best-effort. Safe to
    /// run after failures; meant to be invoked exactly once, as late as
    /// possible.
    pub fn close(&mut self) {
        self.tracker.cleanup_all();
    }
}
