//! Amazon S3 backend built on the AWS SDK.
//!
//! Credentials and region come from the standard AWS provider chain
//! (environment, shared profile, instance metadata), resolved once in
//! [`S3ObjectStore::connect`].

use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::operation::create_bucket::CreateBucketError;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    BucketLifecycleConfiguration, BucketLocationConstraint, CreateBucketConfiguration,
    ExpirationStatus, LifecycleExpiration, LifecycleRule, LifecycleRuleFilter,
};
use bytes::Bytes;
use tracing::debug;

use super::{BucketStatus, LifecyclePolicy, ObjectHandle, ObjectStore};
use crate::error::{StoreError, StoreResult};

/// Region where buckets are created without a location constraint.
const DEFAULT_REGION: &str = "us-east-1";

/// S3 connection bound to one set of credentials.
pub struct S3ObjectStore {
    client: Client,
    account_id: String,
    region: Option<String>,
}

impl S3ObjectStore {
    /// Load the ambient AWS configuration and resolve its credentials.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Credentials`] when no credentials can be resolved.
    pub async fn connect() -> StoreResult<Self> {
        let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        let provider = config
            .credentials_provider()
            .ok_or_else(|| StoreError::Credentials {
                detail: "no credentials provider configured".to_string(),
            })?;
        let credentials =
            provider
                .provide_credentials()
                .await
                .map_err(|err| StoreError::Credentials {
                    detail: DisplayErrorContext(&err).to_string(),
                })?;

        let region = config.region().map(ToString::to_string);
        debug!(region = ?region, "connected to object storage");

        Ok(Self {
            client: Client::new(&config),
            account_id: credentials.access_key_id().to_string(),
            region,
        })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn account_id(&self) -> &str {
        &self.account_id
    }

    async fn create_bucket(&self, bucket: &str) -> StoreResult<BucketStatus> {
        let result = self
            .client
            .create_bucket()
            .bucket(bucket)
            .set_create_bucket_configuration(bucket_configuration(self.region.as_deref()))
            .send()
            .await;

        match result {
            Ok(_) => Ok(BucketStatus::Created),
            Err(err) => classify_create_error(
                bucket,
                err.as_service_error(),
                DisplayErrorContext(&err).to_string(),
            ),
        }
    }

    async fn configure_lifecycle(
        &self,
        bucket: &str,
        policy: &LifecyclePolicy,
    ) -> StoreResult<()> {
        let configuration = lifecycle_configuration(bucket, policy)?;

        self.client
            .put_bucket_lifecycle_configuration()
            .bucket(bucket)
            .lifecycle_configuration(configuration)
            .send()
            .await
            .map_err(|err| StoreError::Lifecycle {
                bucket: bucket.to_string(),
                detail: DisplayErrorContext(&err).to_string(),
            })?;
        Ok(())
    }

    async fn put_object(&self, bucket: &str, key: &str, body: Bytes) -> StoreResult<ObjectHandle> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|err| StoreError::Upload {
                bucket: bucket.to_string(),
                key: key.to_string(),
                detail: DisplayErrorContext(&err).to_string(),
            })?;

        Ok(ObjectHandle {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }

    async fn presign_get(&self, object: &ObjectHandle, ttl: Duration) -> StoreResult<String> {
        let presign_error = |detail: String| StoreError::Presign {
            bucket: object.bucket.clone(),
            key: object.key.clone(),
            detail,
        };

        let presigning =
            PresigningConfig::expires_in(ttl).map_err(|err| presign_error(err.to_string()))?;
        let request = self
            .client
            .get_object()
            .bucket(&object.bucket)
            .key(&object.key)
            .presigned(presigning)
            .await
            .map_err(|err| presign_error(DisplayErrorContext(&err).to_string()))?;

        Ok(request.uri().to_string())
    }
}

/// Location constraint for bucket creation; `us-east-1` takes none.
fn bucket_configuration(region: Option<&str>) -> Option<CreateBucketConfiguration> {
    region
        .filter(|region| *region != DEFAULT_REGION)
        .map(|region| {
            CreateBucketConfiguration::builder()
                .location_constraint(BucketLocationConstraint::from(region))
                .build()
        })
}

/// Only a bucket this account already owns counts as existing.
fn classify_create_error(
    bucket: &str,
    service: Option<&CreateBucketError>,
    detail: String,
) -> StoreResult<BucketStatus> {
    if service.is_some_and(CreateBucketError::is_bucket_already_owned_by_you) {
        return Ok(BucketStatus::AlreadyExists);
    }
    Err(StoreError::BucketCreate {
        bucket: bucket.to_string(),
        detail,
    })
}

fn lifecycle_configuration(
    bucket: &str,
    policy: &LifecyclePolicy,
) -> StoreResult<BucketLifecycleConfiguration> {
    let lifecycle_error = |detail: String| StoreError::Lifecycle {
        bucket: bucket.to_string(),
        detail,
    };

    let status = if policy.enabled {
        ExpirationStatus::Enabled
    } else {
        ExpirationStatus::Disabled
    };
    let rule = LifecycleRule::builder()
        .id(&policy.rule_id)
        .filter(LifecycleRuleFilter::builder().prefix(&policy.prefix).build())
        .status(status)
        .expiration(
            LifecycleExpiration::builder()
                .days(policy.expiration_days)
                .build(),
        )
        .build()
        .map_err(|err| lifecycle_error(err.to_string()))?;
    BucketLifecycleConfiguration::builder()
        .rules(rule)
        .build()
        .map_err(|err| lifecycle_error(err.to_string()))
}
