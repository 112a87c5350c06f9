//! Shared AWS SDK configuration.

use std::time::Duration;

use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use tracing::info;

use turnip_core::config::AwsConfig;

/// Load an `SdkConfig` for both clients.
///
/// Region and endpoint fall back to the SDK's default provider chain when
/// unset. Every operation is capped at `call_timeout` and never retried.
pub async fn load_sdk_config(aws: &AwsConfig, call_timeout: Duration) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .retry_config(RetryConfig::disabled())
        .timeout_config(
            TimeoutConfig::builder()
                .operation_timeout(call_timeout)
                .build(),
        );

    if let Some(region) = &aws.region {
        loader = loader.region(Region::new(region.clone()));
    }
    if let Some(endpoint_url) = &aws.endpoint_url {
        loader = loader.endpoint_url(endpoint_url.clone());
    }

    let config = loader.load().await;
    info!(
        region = ?config.region().map(|r| r.to_string()),
        endpoint_url = ?aws.endpoint_url,
        call_timeout_ms = call_timeout.as_millis() as u64,
        "aws sdk configured"
    );
    config
}
