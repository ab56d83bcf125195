//! Retrieval of descriptor files from remote URLs and local files.

use std::{fs, io, path::Path, time::Duration};

use tempfile::NamedTempFile;
use ureq::Agent;
use url::Url;

use crate::{
    error::{ErrorContext, TmpRepoError},
    TmpRepoResult,
};

/// Downloads remote descriptor files with an explicit global timeout, so a
/// hanging mirror cannot stall the whole batch indefinitely.
pub struct Fetcher {
    agent: Agent,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent }
    }

    /// Downloads `url` into a fresh temporary file. The file is removed when
    /// the returned handle is dropped, so it only has to outlive
    /// registration.
    pub fn fetch_to_temp(&self, url: &str) -> TmpRepoResult<NamedTempFile> {
        let parsed = Url::parse(url).map_err(|source| TmpRepoError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let mut response =
            self.agent
                .get(parsed.as_str())
                .call()
                .map_err(|err| TmpRepoError::FetchFailed {
                    url: url.to_string(),
                    source: Box::new(err),
                })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TmpRepoError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let mut file = NamedTempFile::new()
            .with_context(|| "creating temporary descriptor file".to_string())?;
        io::copy(&mut response.body_mut().as_reader(), file.as_file_mut())
            .with_context(|| format!("writing descriptor fetched from {url}"))?;
        Ok(file)
    }
}

/// Copies a local descriptor file into a temporary file, mirroring the remote
/// path so registration always consumes a transient copy.
pub fn copy_local(path: &Path) -> TmpRepoResult<NamedTempFile> {
    let mut source = fs::File::open(path)
        .with_context(|| format!("opening descriptor file {}", path.display()))?;
    let mut file =
        NamedTempFile::new().with_context(|| "creating temporary descriptor file".to_string())?;
    io::copy(&mut source, file.as_file_mut())
        .with_context(|| format!("copying descriptor file {}", path.display()))?;
    Ok(file)
}
