//! AWS adapters.

pub mod s3;

pub use s3::S3Publisher;

use aws_config::{BehaviorVersion, Region};

/// Build an S3 client for `region` from the default credential chain.
pub async fn s3_client(region: &str) -> aws_sdk_s3::Client {
    let config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .load()
        .await;
    aws_sdk_s3::Client::new(&config)
}

/// Publisher for `bucket`, with references under `public_base_url`.
pub async fn s3_publisher(bucket: &str, region: &str, public_base_url: String) -> S3Publisher {
    S3Publisher::new(s3_client(region).await, bucket.to_string(), public_base_url)
}
