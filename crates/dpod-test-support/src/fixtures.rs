//! Disposable git repositories and credential files for tests.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

/// Commit id written to HEAD when simulating a detached checkout.
pub const DETACHED_SHA: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

/// Temporary git repository with a configured remote.
pub struct GitFixture {
    dir: TempDir,
}

impl GitFixture {
    /// Create a repository whose `origin` points at `remote_url` and whose
    /// HEAD names `branch`.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository cannot be initialised or written.
    pub fn new(remote_url: &str, branch: &str) -> Result<Self> {
        let fixture = Self::init()?;
        fixture.add_remote("origin", remote_url)?;
        fixture.write_head(&format!("ref: refs/heads/{branch}"))?;
        Ok(fixture)
    }

    /// Create a repository whose HEAD points directly at a commit.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository cannot be initialised or written.
    pub fn detached(remote_url: &str) -> Result<Self> {
        let fixture = Self::init()?;
        fixture.add_remote("origin", remote_url)?;
        fixture.write_head(DETACHED_SHA)?;
        Ok(fixture)
    }

    /// Create a repository with no remotes configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository cannot be initialised.
    pub fn without_remote() -> Result<Self> {
        Self::init()
    }

    /// Working tree root of the repository.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Add a named remote to the repository configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be written.
    pub fn add_remote(&self, name: &str, url: &str) -> Result<()> {
        let config = self.git_dir().join("config");
        let mut file = OpenOptions::new()
            .append(true)
            .open(&config)
            .with_context(|| format!("failed to open {}", config.display()))?;
        writeln!(file, "[remote \"{name}\"]\n\turl = {url}")
            .with_context(|| format!("failed to write {}", config.display()))?;
        Ok(())
    }

    fn init() -> Result<Self> {
        let dir = tempfile::tempdir().context("failed to create temp dir")?;
        gix::init(dir.path()).context("failed to initialise repository")?;
        Ok(Self { dir })
    }

    fn write_head(&self, contents: &str) -> Result<()> {
        let head = self.git_dir().join("HEAD");
        fs::write(&head, format!("{contents}\n"))
            .with_context(|| format!("failed to write {}", head.display()))
    }

    fn git_dir(&self) -> PathBuf {
        self.dir.path().join(".git")
    }
}

/// Temporary netrc file.
pub struct NetrcFixture {
    dir: TempDir,
}

impl NetrcFixture {
    /// Write `contents` to a fresh netrc file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn new(contents: &str) -> Result<Self> {
        let dir = tempfile::tempdir().context("failed to create temp dir")?;
        fs::write(dir.path().join(".netrc"), contents).context("failed to write netrc")?;
        Ok(Self { dir })
    }

    /// Netrc containing a Heroku API entry with `token` as the password.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn heroku(token: &str) -> Result<Self> {
        Self::new(&format!(
            "machine api.heroku.com\n  login user@example.com\n  password {token}\n"
        ))
    }

    /// Location of the netrc file.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.path().join(".netrc")
    }
}
