//! Descriptor file model: one INI-style block per repository.

use std::{
    fmt::Write as _,
    fs,
    path::Path,
    time::{SystemTime, UNIX_EPOCH},
};

use tracing::warn;

use crate::{error::ErrorContext, TmpRepoResult};

/// Cost assigned to generated directory repositories. Kept low so the host
/// prefers the local source over configured remotes.
pub const GENERATED_REPO_COST: u32 = 500;

/// One repository block of a descriptor file.
///
/// `gpgcheck` stays a raw string: descriptor files may carry values outside
/// the known policy set, and the validator is the one that decides what to do
/// with them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoDescriptor {
    pub id: String,
    pub name: String,
    pub baseurl: String,
    pub enabled: bool,
    pub gpgcheck: String,
    pub gpgkey: Vec<String>,
    pub metadata_expire: Option<u64>,
    pub cost: Option<u32>,
}

/// Synthesizes a repository identifier from the source basename, the current
/// time, and a per-run sequence number. The sequence keeps identifiers unique
/// even when two sources share a basename within the same second.
pub fn synthesize_repo_id(basename: &str, seq: u32) -> String {
    let prefix: String = basename.chars().take(4).collect();
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("t{seq}-{prefix}-{secs:x}")
}

/// Writes a single-block descriptor file.
pub fn write_repo_file(repo: &RepoDescriptor, path: &Path) -> TmpRepoResult<()> {
    let mut out = String::new();
    let _ = writeln!(out, "[{}]", repo.id);
    let _ = writeln!(out, "name={}", repo.name);
    let _ = writeln!(out, "baseurl={}", repo.baseurl);
    let _ = writeln!(out, "enabled={}", u8::from(repo.enabled));
    let _ = writeln!(out, "gpgcheck={}", repo.gpgcheck);
    if !repo.gpgkey.is_empty() {
        let _ = writeln!(out, "gpgkey={}", repo.gpgkey.join(" "));
    }
    if let Some(expire) = repo.metadata_expire {
        let _ = writeln!(out, "metadata_expire={expire}");
    }
    if let Some(cost) = repo.cost {
        let _ = writeln!(out, "cost={cost}");
    }

    fs::write(path, out).with_context(|| format!("writing repo file {}", path.display()))
}

/// Parses a descriptor file into its repository blocks.
///
/// Lenient on content: unknown keys and junk lines are skipped with a
/// warning, and malformed field values fall back to defaults so the policy
/// validator gets to reject the block instead of the parser. Only I/O
/// failures are errors.
pub fn parse_repo_file(path: &Path) -> TmpRepoResult<Vec<RepoDescriptor>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading repo file {}", path.display()))?;

    let mut repos = Vec::new();
    let mut current: Option<RepoDescriptor> = None;

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(id) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            if let Some(repo) = current.take() {
                repos.push(repo);
            }
            current = Some(empty_descriptor(id));
            continue;
        }

        let Some(repo) = current.as_mut() else {
            warn!("Ignoring line outside any repository block: {line}");
            continue;
        };

        let Some((key, value)) = line.split_once('=') else {
            warn!("Ignoring malformed line in {}: {line}", path.display());
            continue;
        };
        let value = value.trim();

        match key.trim() {
            "name" => repo.name = value.to_string(),
            "baseurl" => repo.baseurl = value.to_string(),
            "enabled" => repo.enabled = matches!(value, "1" | "true" | "yes"),
            "gpgcheck" => repo.gpgcheck = value.to_string(),
            "gpgkey" => {
                repo.gpgkey = value.split_whitespace().map(String::from).collect();
            }
            "metadata_expire" => repo.metadata_expire = value.parse().ok(),
            "cost" => repo.cost = value.parse().ok(),
            other => warn!("Ignoring unknown key `{other}` in {}", path.display()),
        }
    }

    if let Some(repo) = current.take() {
        repos.push(repo);
    }

    Ok(repos)
}

fn empty_descriptor(id: &str) -> RepoDescriptor {
    RepoDescriptor {
        id: id.to_string(),
        name: String::new(),
        baseurl: String::new(),
        enabled: true,
        gpgcheck: String::new(),
        gpgkey: Vec::new(),
        metadata_expire: None,
        cost: None,
    }
}
