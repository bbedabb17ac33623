//! In-process object store used by tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use super::{BucketStatus, LifecyclePolicy, ObjectHandle, ObjectStore};
use crate::error::{StoreError, StoreResult};

#[derive(Default)]
struct Bucket {
    lifecycle: Option<LifecyclePolicy>,
    lifecycle_applications: usize,
    objects: HashMap<String, Bytes>,
}

#[derive(Default)]
struct State {
    buckets: HashMap<String, Bucket>,
    last_signed_ttl: Option<Duration>,
}

/// Object store keeping buckets and objects in memory.
pub struct MemoryObjectStore {
    account_id: String,
    foreign_buckets: HashSet<String>,
    signed_url: Option<String>,
    state: Mutex<State>,
}

impl MemoryObjectStore {
    /// Create an empty store connected as `account_id`.
    #[must_use]
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            foreign_buckets: HashSet::new(),
            signed_url: None,
            state: Mutex::new(State::default()),
        }
    }

    /// Treat `bucket` as owned by another account; creating it fails.
    #[must_use]
    pub fn with_foreign_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.foreign_buckets.insert(bucket.into());
        self
    }

    /// Return `url` from every signing request instead of a generated one.
    #[must_use]
    pub fn with_signed_url(mut self, url: impl Into<String>) -> Self {
        self.signed_url = Some(url.into());
        self
    }

    /// Lifecycle policy currently attached to `bucket`.
    #[must_use]
    pub fn lifecycle(&self, bucket: &str) -> Option<LifecyclePolicy> {
        self.lock()
            .ok()?
            .buckets
            .get(bucket)
            .and_then(|entry| entry.lifecycle.clone())
    }

    /// Number of times a lifecycle policy was applied to `bucket`.
    #[must_use]
    pub fn lifecycle_applications(&self, bucket: &str) -> usize {
        self.lock()
            .ok()
            .and_then(|state| {
                state
                    .buckets
                    .get(bucket)
                    .map(|entry| entry.lifecycle_applications)
            })
            .unwrap_or(0)
    }

    /// Content stored at `key` in `bucket`.
    #[must_use]
    pub fn object(&self, bucket: &str, key: &str) -> Option<Bytes> {
        self.lock()
            .ok()?
            .buckets
            .get(bucket)
            .and_then(|entry| entry.objects.get(key).cloned())
    }

    /// Validity window requested by the most recent signing call.
    #[must_use]
    pub fn last_signed_ttl(&self) -> Option<Duration> {
        self.lock().ok()?.last_signed_ttl
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, State>> {
        self.state.lock().map_err(|_| StoreError::Unavailable {
            detail: "memory store lock poisoned".to_string(),
        })
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn account_id(&self) -> &str {
        &self.account_id
    }

    async fn create_bucket(&self, bucket: &str) -> StoreResult<BucketStatus> {
        if self.foreign_buckets.contains(bucket) {
            return Err(StoreError::BucketCreate {
                bucket: bucket.to_string(),
                detail: "BucketAlreadyExists: owned by another account".to_string(),
            });
        }

        let mut state = self.lock()?;
        if state.buckets.contains_key(bucket) {
            return Ok(BucketStatus::AlreadyExists);
        }
        state.buckets.insert(bucket.to_string(), Bucket::default());
        Ok(BucketStatus::Created)
    }

    async fn configure_lifecycle(
        &self,
        bucket: &str,
        policy: &LifecyclePolicy,
    ) -> StoreResult<()> {
        let mut state = self.lock()?;
        let entry = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| StoreError::Lifecycle {
                bucket: bucket.to_string(),
                detail: "NoSuchBucket".to_string(),
            })?;
        entry.lifecycle = Some(policy.clone());
        entry.lifecycle_applications += 1;
        Ok(())
    }

    async fn put_object(&self, bucket: &str, key: &str, body: Bytes) -> StoreResult<ObjectHandle> {
        let mut state = self.lock()?;
        let entry = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| StoreError::Upload {
                bucket: bucket.to_string(),
                key: key.to_string(),
                detail: "NoSuchBucket".to_string(),
            })?;
        entry.objects.insert(key.to_string(), body);
        Ok(ObjectHandle {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }

    async fn presign_get(&self, object: &ObjectHandle, ttl: Duration) -> StoreResult<String> {
        let mut state = self.lock()?;
        let exists = state
            .buckets
            .get(&object.bucket)
            .is_some_and(|entry| entry.objects.contains_key(&object.key));
        if !exists {
            return Err(StoreError::Presign {
                bucket: object.bucket.clone(),
                key: object.key.clone(),
                detail: "NoSuchKey".to_string(),
            });
        }
        state.last_signed_ttl = Some(ttl);

        Ok(self.signed_url.clone().unwrap_or_else(|| {
            format!(
                "memory://{}/{}?expires_in={}",
                object.bucket,
                object.key,
                ttl.as_secs()
            )
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn second_create_reports_existing_bucket() {
        let store = MemoryObjectStore::new("acct");
        assert_eq!(
            store.create_bucket("b").await.expect("create"),
            BucketStatus::Created
        );
        assert_eq!(
            store.create_bucket("b").await.expect("create again"),
            BucketStatus::AlreadyExists
        );
    }

    #[tokio::test]
    async fn signed_url_override_is_returned() {
        let store = MemoryObjectStore::new("acct").with_signed_url("https://store/app.tgz?sig=X");
        store.create_bucket("b").await.expect("create");
        let handle = store
            .put_object("b", "app.tgz", Bytes::from_static(b"data"))
            .await
            .expect("put");
        let url = store
            .presign_get(&handle, Duration::from_secs(60))
            .await
            .expect("sign");
        assert_eq!(url, "https://store/app.tgz?sig=X");
    }

    #[tokio::test]
    async fn signing_missing_object_fails() {
        let store = MemoryObjectStore::new("acct");
        let handle = ObjectHandle {
            bucket: "b".into(),
            key: "app.tgz".into(),
        };
        let err = store
            .presign_get(&handle, Duration::from_secs(60))
            .await
            .expect_err("missing object");
        assert!(matches!(err, StoreError::Presign { .. }));
    }
}
