//! Parsing of SSH-style git remote URLs into owner and repository names.

use crate::error::{ConfigError, ConfigResult};

/// Owner and repository pair extracted from a git remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRepo {
    /// Account or organisation owning the repository.
    pub owner: String,
    /// Repository name without its `.git` extension.
    pub repo: String,
}

/// Split a remote of the shape `host:owner/repo.git` into its owner and repo.
///
/// The URL is split on the first `:`, the remainder on the first `/`, and the
/// trailing extension is stripped from the repository segment.
///
/// # Errors
///
/// Returns [`ConfigError::RemoteUrlMalformed`] when the colon or slash is
/// missing, or when either component is empty.
pub fn parse_remote_url(url: &str) -> ConfigResult<RemoteRepo> {
    let url = url.trim();
    let malformed = |reason| ConfigError::RemoteUrlMalformed {
        url: url.to_string(),
        reason,
    };

    let (_, path) = url.split_once(':').ok_or_else(|| malformed("missing ':'"))?;
    let (owner, repo) = path.split_once('/').ok_or_else(|| malformed("missing '/'"))?;
    let repo = repo.rsplit_once('.').map_or(repo, |(stem, _)| stem);

    if owner.is_empty() {
        return Err(malformed("empty owner"));
    }
    if repo.is_empty() {
        return Err(malformed("empty repository"));
    }

    Ok(RemoteRepo {
        owner: owner.to_string(),
        repo: repo.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ssh_remote() {
        let parsed = parse_remote_url("git@github.com:alice/myapp.git").expect("parse");
        assert_eq!(
            parsed,
            RemoteRepo {
                owner: "alice".into(),
                repo: "myapp".into(),
            }
        );
    }

    #[test]
    fn keeps_repo_without_extension() {
        let parsed = parse_remote_url("git@github.com:alice/myapp\n").expect("parse");
        assert_eq!(parsed.repo, "myapp");
    }

    #[test]
    fn strips_only_last_extension() {
        let parsed = parse_remote_url("git@github.com:acme/site.io.git").expect("parse");
        assert_eq!(parsed.owner, "acme");
        assert_eq!(parsed.repo, "site.io");
    }

    #[test]
    fn rejects_missing_colon() {
        let err = parse_remote_url("github.com/alice/myapp.git").expect_err("no colon");
        assert!(matches!(
            err,
            ConfigError::RemoteUrlMalformed {
                reason: "missing ':'",
                ..
            }
        ));
    }

    #[test]
    fn rejects_missing_slash() {
        let err = parse_remote_url("git@github.com:myapp.git").expect_err("no slash");
        assert!(matches!(
            err,
            ConfigError::RemoteUrlMalformed {
                reason: "missing '/'",
                ..
            }
        ));
    }

    #[test]
    fn rejects_empty_segments() {
        assert!(parse_remote_url("git@github.com:/myapp.git").is_err());
        assert!(parse_remote_url("git@github.com:alice/.git").is_err());
    }
}
