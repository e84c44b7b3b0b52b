//! AWS SDK integration: Transfer Family client wrapper and caller identity.

/// Transfer Family access mapping calls
pub mod transfer_client;

/// sts calls
pub mod sts;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// AWS Errors from AWS SDK calls
pub enum AwsError {
    #[error("AWS configuration error: {0}")]
    /// config error
    ConfigError(String),
    #[error("Transfer client error: {0}")]
    /// errors from calls to AWS Transfer Family
    TransferError(String),
    #[error("AWS SDK error: {0}")]
    /// errors from SDK output
    SdkError(String),
}

/// Type of AWS Result extending Result
pub type AwsResult<T> = Result<T, AwsError>;

/// Load the shared SDK configuration from the standard credential provider chain.
///
/// `region` overrides whatever the environment or profile would select.
pub async fn load_sdk_config(region: Option<String>) -> aws_config::SdkConfig {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
    if let Some(region) = region {
        loader = loader.region(aws_config::Region::new(region));
    }
    loader.load().await
}
