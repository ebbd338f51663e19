//! S3 backend built on `aws-sdk-s3`.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::primitives::ByteStream;
use tracing::debug;

use super::{ObjectBackend, unsupported};
use crate::core::config::StorageConfig;
use crate::core::models::Location;
use crate::errors::StorageError;

pub struct S3Backend {
    client: Client,
}

impl S3Backend {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Loads the shared AWS configuration and applies the overrides in `config`.
    pub async fn from_config(config: &StorageConfig) -> Self {
        let mut loader = aws_config::from_env();
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let shared = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(config.force_path_style)
            .build();
        Self::new(Client::from_conf(s3_config))
    }
}

fn bucket_and_key(location: &Location) -> Result<(&str, &str), StorageError> {
    match location {
        Location::Remote { bucket, key } => Ok((bucket, key)),
        Location::Local(_) => Err(unsupported("s3", location)),
    }
}

#[async_trait]
impl ObjectBackend for S3Backend {
    async fn read_bytes(&self, location: &Location) -> Result<Vec<u8>, StorageError> {
        let (bucket, key) = bucket_and_key(location)?;
        let resp = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await;

        match resp {
            Ok(output) => {
                let data = output
                    .body
                    .collect()
                    .await
                    .map_err(|e| StorageError::Backend(format!("{location}: {e}")))?;
                let buf = data.into_bytes().to_vec();
                debug!(bucket, key, bytes = buf.len(), "read s3 object");
                Ok(buf)
            }
            Err(e) if e.as_service_error().is_some_and(GetObjectError::is_no_such_key) => {
                Err(StorageError::NotFound(location.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write_bytes(
        &self,
        location: &Location,
        body: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        let (bucket, key) = bucket_and_key(location)?;
        let size = body.len();
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .set_content_type(content_type.map(str::to_string))
            .body(ByteStream::from(body))
            .send()
            .await?;
        debug!(bucket, key, bytes = size, "wrote s3 object");
        Ok(())
    }

    async fn list(&self, prefix: &Location) -> Result<Vec<Location>, StorageError> {
        let (bucket, prefix) = bucket_and_key(prefix)?;
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .into_paginator()
            .send();

        let mut found = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page?;
            found.extend(
                page.contents()
                    .iter()
                    .filter_map(|object| object.key())
                    .map(|key| Location::remote(bucket, key)),
            );
        }
        debug!(bucket, prefix, count = found.len(), "listed s3 objects");
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::error::ErrorMetadata;
    use aws_sdk_s3::operation::get_object::GetObjectOutput;
    use aws_sdk_s3::operation::list_objects_v2::ListObjectsV2Output;
    use aws_sdk_s3::operation::put_object::PutObjectOutput;
    use aws_sdk_s3::types::Object;
    use aws_sdk_s3::types::error::NoSuchKey;
    use aws_smithy_mocks::{RuleMode, mock, mock_client};

    #[tokio::test]
    async fn reads_object_body() {
        let rule = mock!(Client::get_object)
            .match_requests(|req| req.bucket() == Some("bucket") && req.key() == Some("a.json"))
            .then_output(|| {
                GetObjectOutput::builder()
                    .body(ByteStream::from_static(b"{}"))
                    .build()
            });
        let backend = S3Backend::new(mock_client!(aws_sdk_s3, [&rule]));

        let body = backend
            .read_bytes(&Location::remote("bucket", "a.json"))
            .await
            .unwrap();
        assert_eq!(body, b"{}");
    }

    #[tokio::test]
    async fn missing_key_is_not_found() {
        let rule = mock!(Client::get_object)
            .then_error(|| GetObjectError::NoSuchKey(NoSuchKey::builder().build()));
        let backend = S3Backend::new(mock_client!(aws_sdk_s3, [&rule]));

        let err = backend
            .read_bytes(&Location::remote("bucket", "absent.json"))
            .await
            .unwrap_err();
        match err {
            StorageError::NotFound(message) => assert_eq!(message, "s3://bucket/absent.json"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn other_service_errors_are_backend_failures() {
        let rule = mock!(Client::get_object).then_error(|| {
            GetObjectError::generic(ErrorMetadata::builder().code("AccessDenied").build())
        });
        let backend = S3Backend::new(mock_client!(aws_sdk_s3, [&rule]));

        let err = backend
            .read_bytes(&Location::remote("bucket", "secret.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Backend(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn write_sends_content_type() {
        let rule = mock!(Client::put_object)
            .match_requests(|req| {
                req.bucket() == Some("bucket")
                    && req.key() == Some("plots/fig.png")
                    && req.content_type() == Some("image/png")
            })
            .then_output(|| PutObjectOutput::builder().build());
        let backend = S3Backend::new(mock_client!(aws_sdk_s3, [&rule]));

        backend
            .write_bytes(
                &Location::remote("bucket", "plots/fig.png"),
                vec![0x89, b'P', b'N', b'G'],
                Some("image/png"),
            )
            .await
            .unwrap();
        assert_eq!(rule.num_calls(), 1);
    }

    #[tokio::test]
    async fn list_follows_continuation_tokens() {
        let first = mock!(Client::list_objects_v2)
            .match_requests(|req| req.continuation_token().is_none())
            .then_output(|| {
                ListObjectsV2Output::builder()
                    .contents(Object::builder().key("day=1/a.parquet").build())
                    .contents(Object::builder().key("day=1/a.csv").build())
                    .is_truncated(true)
                    .next_continuation_token("page-2")
                    .build()
            });
        let second = mock!(Client::list_objects_v2)
            .match_requests(|req| req.continuation_token() == Some("page-2"))
            .then_output(|| {
                ListObjectsV2Output::builder()
                    .contents(Object::builder().key("day=1/b/c.parquet").build())
                    .is_truncated(false)
                    .build()
            });
        let backend = S3Backend::new(mock_client!(aws_sdk_s3, RuleMode::MatchAny, [&first, &second]));

        let listed = backend
            .list(&Location::remote("bucket", "day=1"))
            .await
            .unwrap();
        assert_eq!(
            listed,
            vec![
                Location::remote("bucket", "day=1/a.parquet"),
                Location::remote("bucket", "day=1/a.csv"),
                Location::remote("bucket", "day=1/b/c.parquet"),
            ]
        );
        assert_eq!(second.num_calls(), 1);
    }

    #[tokio::test]
    async fn rejects_local_locations() {
        let rule = mock!(Client::get_object).then_output(|| GetObjectOutput::builder().build());
        let backend = S3Backend::new(mock_client!(aws_sdk_s3, [&rule]));

        let err = backend
            .read_bytes(&Location::local("a.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Precondition(_)));
        assert_eq!(rule.num_calls(), 0);
    }
}
