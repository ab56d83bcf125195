//! Signing-policy validation for temporary repositories.

use std::fmt;

use tracing::warn;

use crate::repofile::RepoDescriptor;

/// Signing-policy strictness level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpgCheck {
    None,
    Packages,
    All,
    Repo,
}

impl GpgCheck {
    /// Parses a policy value, tolerating case and the usual aliases.
    /// Returns `None` for anything outside the known set.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "none" | "0" | "no" | "false" => Some(Self::None),
            "all" | "1" | "yes" | "true" => Some(Self::All),
            "packages" | "pkgs" => Some(Self::Packages),
            "repo" | "repository" => Some(Self::Repo),
            _ => None,
        }
    }
}

impl fmt::Display for GpgCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Self::None => "none",
            Self::Packages => "packages",
            Self::All => "all",
            Self::Repo => "repo",
        };
        f.write_str(value)
    }
}

/// Registration-time gate applied to every descriptor block before the host
/// accepts it. One instance is bound to the remote policy value, one to the
/// local policy value.
pub struct PolicyValidator {
    policy: Option<GpgCheck>,
    raw: String,
}

impl PolicyValidator {
    pub fn new(configured: &str) -> Self {
        Self {
            policy: GpgCheck::parse(configured),
            raw: configured.to_string(),
        }
    }

    /// Decides whether the descriptor may be accepted under the configured
    /// policy. Rejections are logged, never raised.
    pub fn validate(&self, repo: &RepoDescriptor) -> bool {
        let Some(policy) = self.policy else {
            warn!("GPGcheck set to unknown value: {}", self.raw);
            return false;
        };

        if policy == GpgCheck::None {
            return true;
        }

        let Some(repo_check) = GpgCheck::parse(&repo.gpgcheck) else {
            warn!(
                "Repo {} GPGcheck set to unknown value: {}",
                repo.id, repo.gpgcheck
            );
            return false;
        };

        // A descriptor is never permitted to disable signing checks.
        if repo_check == GpgCheck::None {
            warn!("Repo {} tried to set gpgcheck=none", repo.id);
            return false;
        }

        if matches!(policy, GpgCheck::Packages | GpgCheck::All) && repo_check == GpgCheck::Repo {
            warn!("Repo {} tried to set gpgcheck=repository", repo.id);
            return false;
        }
        if matches!(policy, GpgCheck::Repo | GpgCheck::All) && repo_check == GpgCheck::Packages {
            warn!("Repo {} tried to set gpgcheck=packages", repo.id);
            return false;
        }

        // Signing keys must come from the local filesystem.
        for key in &repo.gpgkey {
            if !key.starts_with("file:/") {
                warn!("Repo {} tried to set gpgkey to {}", repo.id, key);
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(gpgcheck: &str, gpgkey: Vec<&str>) -> RepoDescriptor {
        RepoDescriptor {
            id: "t1-test-abc".to_string(),
            name: "Test repo".to_string(),
            baseurl: "file:/srv/pkgs/".to_string(),
            enabled: true,
            gpgcheck: gpgcheck.to_string(),
            gpgkey: gpgkey.into_iter().map(String::from).collect(),
            metadata_expire: Some(0),
            cost: Some(500),
        }
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!(GpgCheck::parse("none"), Some(GpgCheck::None));
        assert_eq!(GpgCheck::parse("0"), Some(GpgCheck::None));
        assert_eq!(GpgCheck::parse("no"), Some(GpgCheck::None));
        assert_eq!(GpgCheck::parse("false"), Some(GpgCheck::None));
        assert_eq!(GpgCheck::parse("all"), Some(GpgCheck::All));
        assert_eq!(GpgCheck::parse("YES"), Some(GpgCheck::All));
        assert_eq!(GpgCheck::parse("true"), Some(GpgCheck::All));
        assert_eq!(GpgCheck::parse("pkgs"), Some(GpgCheck::Packages));
        assert_eq!(GpgCheck::parse("Repository"), Some(GpgCheck::Repo));
        assert_eq!(GpgCheck::parse("bogus"), None);
    }

    #[test]
    fn test_unknown_configured_policy_rejects_everything() {
        let validator = PolicyValidator::new("bogus");
        assert!(!validator.validate(&descriptor("packages", vec![])));
        assert!(!validator.validate(&descriptor("all", vec![])));
        assert!(!validator.validate(&descriptor("none", vec![])));
    }

    #[test]
    fn test_policy_none_accepts_unconditionally() {
        let validator = PolicyValidator::new("none");
        assert!(validator.validate(&descriptor("none", vec![])));
        assert!(validator.validate(&descriptor("bogus", vec!["http://x/key"])));
    }

    #[test]
    fn test_descriptor_none_always_rejected() {
        for policy in ["packages", "all", "repo"] {
            let validator = PolicyValidator::new(policy);
            assert!(!validator.validate(&descriptor("none", vec![])));
        }
    }

    #[test]
    fn test_unknown_descriptor_value_rejected() {
        let validator = PolicyValidator::new("all");
        assert!(!validator.validate(&descriptor("sometimes", vec![])));
    }

    #[test]
    fn test_no_trust_scope_escalation() {
        // Per-package policies may not be widened to repository scope.
        assert!(!PolicyValidator::new("packages").validate(&descriptor("repo", vec![])));
        assert!(!PolicyValidator::new("all").validate(&descriptor("repo", vec![])));
        // And the symmetric restriction.
        assert!(!PolicyValidator::new("repo").validate(&descriptor("packages", vec![])));
        assert!(!PolicyValidator::new("all").validate(&descriptor("packages", vec![])));
    }

    #[test]
    fn test_matching_policies_accepted() {
        assert!(PolicyValidator::new("all").validate(&descriptor("all", vec![])));
        assert!(PolicyValidator::new("packages").validate(&descriptor("packages", vec![])));
        assert!(PolicyValidator::new("repo").validate(&descriptor("repo", vec![])));
    }

    #[test]
    fn test_local_keys_accepted_remote_keys_rejected() {
        let validator = PolicyValidator::new("all");
        assert!(validator.validate(&descriptor("all", vec!["file:/etc/pki/key.gpg"])));
        assert!(!validator.validate(&descriptor("all", vec!["http://example.com/key.gpg"])));
        assert!(!validator.validate(&descriptor(
            "all",
            vec!["file:/etc/pki/key.gpg", "https://example.com/key.gpg"]
        )));
    }
}
