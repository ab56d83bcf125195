//! Ad-hoc temporary package repositories: classify a source reference,
//! materialize a descriptor file, gate it through the signing policy,
//! register it with the host, and tear down everything transient at exit.

pub mod cleanup;
pub mod config;
pub mod error;
pub mod fetch;
pub mod host;
pub mod materialize;
pub mod plugin;
pub mod policy;
pub mod repofile;
pub mod source;

use error::TmpRepoError;

pub type TmpRepoResult<T> = std::result::Result<T, TmpRepoError>;
