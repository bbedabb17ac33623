//! Minimal reader for netrc-style credential files.
//!
//! Supports `machine`, `default`, `login`, `password`, `account` and `macdef`
//! blocks. Tokens are whitespace separated. A token starting with `#` in
//! keyword position comments out the rest of its line; values are taken as-is,
//! so passwords may contain or start with `#`.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};

/// Credentials recorded for one machine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetrcEntry {
    /// Login name, if present.
    pub login: Option<String>,
    /// Account name, if present.
    pub account: Option<String>,
    /// Password or token, if present.
    pub password: Option<String>,
}

/// Parsed credential file.
#[derive(Debug, Clone, Default)]
pub struct Netrc {
    hosts: HashMap<String, NetrcEntry>,
    default: Option<NetrcEntry>,
}

impl Netrc {
    /// Read and parse the credential file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or is malformed.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::NetrcRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Parse credential file contents.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NetrcParse`] when a keyword is missing its value.
    pub fn parse(contents: &str) -> ConfigResult<Self> {
        let mut netrc = Self::default();
        let mut current: Option<(Option<String>, NetrcEntry)> = None;
        let mut lines = contents.lines();

        while let Some(line) = lines.next() {
            let mut tokens = line.split_whitespace();

            while let Some(token) = tokens.next() {
                match token {
                    "machine" => {
                        let host = next_value(&mut tokens, token)?;
                        netrc.commit(current.take());
                        current = Some((Some(host), NetrcEntry::default()));
                    }
                    "default" => {
                        netrc.commit(current.take());
                        current = Some((None, NetrcEntry::default()));
                    }
                    "login" | "password" | "account" => {
                        let value = next_value(&mut tokens, token)?;
                        if let Some((_, entry)) = current.as_mut() {
                            match token {
                                "login" => entry.login = Some(value),
                                "password" => entry.password = Some(value),
                                _ => entry.account = Some(value),
                            }
                        }
                    }
                    "macdef" => {
                        next_value(&mut tokens, token)?;
                        // Macro bodies run until the next blank line.
                        for body in lines.by_ref() {
                            if body.trim().is_empty() {
                                break;
                            }
                        }
                        break;
                    }
                    comment if comment.starts_with('#') => break,
                    _ => {}
                }
            }
        }

        netrc.commit(current);
        Ok(netrc)
    }

    /// Credentials for `host`, falling back to the `default` entry.
    #[must_use]
    pub fn entry(&self, host: &str) -> Option<&NetrcEntry> {
        self.hosts.get(host).or(self.default.as_ref())
    }

    /// Password/token recorded for `host`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NetrcHostMissing`] when the host has no entry and
    /// [`ConfigError::NetrcPasswordMissing`] when the entry lacks a password.
    pub fn password_for(&self, host: &str, path: &Path) -> ConfigResult<&str> {
        let entry = self.entry(host).ok_or_else(|| ConfigError::NetrcHostMissing {
            host: host.to_string(),
            path: path.to_path_buf(),
        })?;
        entry
            .password
            .as_deref()
            .ok_or_else(|| ConfigError::NetrcPasswordMissing {
                host: host.to_string(),
            })
    }

    fn commit(&mut self, pending: Option<(Option<String>, NetrcEntry)>) {
        match pending {
            Some((Some(host), entry)) => {
                // The first entry for a host wins.
                self.hosts.entry(host).or_insert(entry);
            }
            Some((None, entry)) => self.default = Some(entry),
            None => {}
        }
    }
}

fn next_value<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    keyword: &str,
) -> ConfigResult<String> {
    tokens
        .next()
        .map(str::to_string)
        .ok_or_else(|| ConfigError::NetrcParse {
            token: keyword.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# heroku credentials
machine api.heroku.com
  login user@example.com
  password 01234567-89ab
machine git.heroku.com login user@example.com password other-token
";

    #[test]
    fn reads_multi_line_and_inline_entries() {
        let netrc = Netrc::parse(SAMPLE).expect("parse");
        let api = netrc.entry("api.heroku.com").expect("api entry");
        assert_eq!(api.login.as_deref(), Some("user@example.com"));
        assert_eq!(api.password.as_deref(), Some("01234567-89ab"));
        let git = netrc.entry("git.heroku.com").expect("git entry");
        assert_eq!(git.password.as_deref(), Some("other-token"));
    }

    #[test]
    fn falls_back_to_default_entry() {
        let netrc = Netrc::parse("default login anon password fallback").expect("parse");
        let token = netrc
            .password_for("api.heroku.com", Path::new("/tmp/netrc"))
            .expect("default password");
        assert_eq!(token, "fallback");
    }

    #[test]
    fn missing_host_is_reported() {
        let netrc = Netrc::parse("machine example.com password x").expect("parse");
        let err = netrc
            .password_for("api.heroku.com", Path::new("/tmp/netrc"))
            .expect_err("missing host");
        assert!(matches!(err, ConfigError::NetrcHostMissing { host, .. } if host == "api.heroku.com"));
    }

    #[test]
    fn entry_without_password_is_reported() {
        let netrc = Netrc::parse("machine api.heroku.com login someone").expect("parse");
        let err = netrc
            .password_for("api.heroku.com", Path::new("/tmp/netrc"))
            .expect_err("no password");
        assert!(matches!(err, ConfigError::NetrcPasswordMissing { .. }));
    }

    #[test]
    fn macro_bodies_are_skipped() {
        let contents = "\
macdef init
machine evil.example.com password nope

machine api.heroku.com password real
";
        let netrc = Netrc::parse(contents).expect("parse");
        assert!(netrc.entry("evil.example.com").is_none());
        assert_eq!(
            netrc.entry("api.heroku.com").and_then(|e| e.password.as_deref()),
            Some("real")
        );
    }

    #[test]
    fn hash_inside_value_is_kept() {
        let netrc =
            Netrc::parse("machine api.heroku.com login me password ab#cd").expect("parse");
        let token = netrc
            .password_for("api.heroku.com", Path::new("/tmp/netrc"))
            .expect("password");
        assert_eq!(token, "ab#cd");
    }

    #[test]
    fn value_may_start_with_hash() {
        let netrc = Netrc::parse("machine api.heroku.com password #secret").expect("parse");
        assert_eq!(
            netrc.entry("api.heroku.com").and_then(|e| e.password.as_deref()),
            Some("#secret")
        );
    }

    #[test]
    fn trailing_comment_in_keyword_position_is_ignored() {
        let contents = "\
machine api.heroku.com password real # rotated 2024
  # login ignored
machine other.example.com password x#y
";
        let netrc = Netrc::parse(contents).expect("parse");
        let api = netrc.entry("api.heroku.com").expect("api entry");
        assert_eq!(api.password.as_deref(), Some("real"));
        assert_eq!(api.login, None);
        assert_eq!(
            netrc.entry("other.example.com").and_then(|e| e.password.as_deref()),
            Some("x#y")
        );
    }

    #[test]
    fn dangling_keyword_is_malformed() {
        let err = Netrc::parse("machine api.heroku.com password").expect_err("dangling");
        assert!(matches!(err, ConfigError::NetrcParse { token } if token == "password"));
    }
}
