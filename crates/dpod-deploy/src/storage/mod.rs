//! Object store staging of the archive behind a signed URL.
//!
//! # Design
//! - Provider calls sit behind [`ObjectStore`] so staging logic is backend agnostic.
//! - Bucket creation reports a tagged [`BucketStatus`]; only "already exists"
//!   is tolerated, every other failure propagates.
//! - The lifecycle policy is applied whether or not the bucket was just created.

pub mod memory;
pub mod s3;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use dpod_config::ObjectStoreConfig;
use dpod_config::defaults::{ARCHIVE_RETENTION_DAYS, LIFECYCLE_RULE_ID, SIGNED_URL_TTL};
use tracing::{info, warn};

use crate::error::StoreResult;

/// Outcome of a bucket creation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketStatus {
    /// The bucket was created by this call.
    Created,
    /// The bucket already existed and is owned by this account.
    AlreadyExists,
}

/// Expiration rule attached to the staging bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecyclePolicy {
    /// Rule identifier.
    pub rule_id: String,
    /// Key prefix the rule applies to; empty matches every key.
    pub prefix: String,
    /// Whether the rule is active.
    pub enabled: bool,
    /// Days after which objects expire.
    pub expiration_days: i32,
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        Self {
            rule_id: LIFECYCLE_RULE_ID.to_string(),
            prefix: String::new(),
            enabled: true,
            expiration_days: ARCHIVE_RETENTION_DAYS,
        }
    }
}

/// Location of an uploaded object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectHandle {
    /// Bucket holding the object.
    pub bucket: String,
    /// Object key.
    pub key: String,
}

/// Storage backend operations needed to stage an archive.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Identifier of the account the backend is connected as.
    fn account_id(&self) -> &str;

    /// Create `bucket`, reporting whether it already existed.
    async fn create_bucket(&self, bucket: &str) -> StoreResult<BucketStatus>;

    /// Replace the lifecycle configuration of `bucket` with `policy`.
    async fn configure_lifecycle(&self, bucket: &str, policy: &LifecyclePolicy)
    -> StoreResult<()>;

    /// Write `body` as the full content of `key`.
    async fn put_object(&self, bucket: &str, key: &str, body: Bytes) -> StoreResult<ObjectHandle>;

    /// Generate a download URL for `object` valid for `ttl`.
    async fn presign_get(&self, object: &ObjectHandle, ttl: Duration) -> StoreResult<String>;
}

/// Stages archives in the account's lifecycle-managed bucket.
#[derive(Clone)]
pub struct Stager {
    store: Arc<dyn ObjectStore>,
    config: ObjectStoreConfig,
    policy: LifecyclePolicy,
}

impl Stager {
    /// Create a stager targeting the bucket derived from the store's account.
    #[must_use]
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        let config = ObjectStoreConfig::for_account(store.account_id());
        Self {
            store,
            config,
            policy: LifecyclePolicy::default(),
        }
    }

    /// Staging location in use.
    #[must_use]
    pub const fn config(&self) -> &ObjectStoreConfig {
        &self.config
    }

    /// Make sure the bucket exists and carries the expiration rule.
    ///
    /// # Errors
    ///
    /// Returns an error when creation fails for any reason other than the
    /// bucket already existing, or when the lifecycle rule cannot be applied.
    pub async fn ensure_bucket(&self) -> StoreResult<BucketStatus> {
        let bucket = &self.config.bucket;
        let status = self.store.create_bucket(bucket).await?;
        if status == BucketStatus::AlreadyExists {
            warn!(bucket = %bucket, "bucket already exists; reusing it");
        }

        self.store.configure_lifecycle(bucket, &self.policy).await?;
        info!(bucket = %bucket, status = ?status, "bucket ready");
        Ok(status)
    }

    /// Upload the archive to the fixed key.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend rejects the write.
    pub async fn upload(&self, archive: Bytes) -> StoreResult<ObjectHandle> {
        let size = archive.len();
        let handle = self
            .store
            .put_object(&self.config.bucket, &self.config.key, archive)
            .await?;
        info!(bucket = %handle.bucket, key = %handle.key, size, "archive uploaded");
        Ok(handle)
    }

    /// Signed download URL for an uploaded archive, valid for sixty seconds.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot sign the request.
    pub async fn signed_url(&self, handle: &ObjectHandle) -> StoreResult<String> {
        self.store.presign_get(handle, SIGNED_URL_TTL).await
    }
}
