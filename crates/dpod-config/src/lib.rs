#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Configuration records for a dpod deployment, resolved once at startup.
//!
//! Layout: `model.rs` (immutable config records), `remote.rs` (git remote
//! parsing), `netrc.rs` (credential file parsing), `loader.rs` (resolution from
//! explicit sources), `defaults.rs` (constants shared across the workspace).

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod netrc;
pub mod remote;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigSources, RepositoryMetadata, read_repository_metadata};
pub use model::{
    DeployConfig, ObjectStoreConfig, PlatformConfig, PollPolicy, SourceHostConfig, parse_api_url,
};
pub use netrc::{Netrc, NetrcEntry};
pub use remote::{RemoteRepo, parse_remote_url};
