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
#![allow(clippy::redundant_pub_crate)]

//! Deployment pipeline: fetch a branch tarball, stage it behind a signed URL,
//! and drive a Heroku app setup to completion.
//!
//! Layout:
//! - `archive.rs`: GitHub tarball download
//! - `storage/`: object store abstraction, S3 and in-memory backends, staging
//! - `platform.rs`: Heroku app-setup client
//! - `poll.rs`: bounded app-setup status polling
//! - `pipeline.rs`: the four stages wired in order
//! - `http.rs`: shared HTTP client construction and response checks

pub mod archive;
pub mod error;
pub mod http;
pub mod pipeline;
pub mod platform;
pub mod poll;
pub mod storage;

pub use archive::ArchiveFetcher;
pub use error::{DeployError, DeployResult, StoreError, StoreResult};
pub use http::build_client;
pub use pipeline::Deployer;
pub use platform::{AppSetup, AppUrl, HerokuClient, SetupStatus, SetupStatusSource};
pub use poll::{PollOutcome, poll_setup};
pub use storage::{
    BucketStatus, LifecyclePolicy, ObjectHandle, ObjectStore, Stager, memory::MemoryObjectStore,
    s3::S3ObjectStore,
};
