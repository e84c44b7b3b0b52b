use aws_sdk_sts::Client as StsClient;

use crate::aws::{AwsError, AwsResult};

/// Identity of the credentials the harness runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    /// Account ID
    pub account: String,
    /// Principal ARN
    pub arn: String,
}

/// Resolve the caller identity with STS GetCallerIdentity.
///
/// The acceptance pre-check calls this to fail fast when no usable
/// credentials are configured.
///
/// # Arguments
///
/// * `client` - STS client to use for the API call
pub async fn caller_identity(client: &StsClient) -> AwsResult<CallerIdentity> {
    let out = client
        .get_caller_identity()
        .send()
        .await
        .map_err(|e| AwsError::SdkError(format!("STS GetCallerIdentity failed: {}", e)))?;

    let account = out
        .account()
        .map(ToString::to_string)
        .ok_or_else(|| AwsError::SdkError("STS GetCallerIdentity missing Account".to_string()))?;
    let arn = out
        .arn()
        .map(ToString::to_string)
        .ok_or_else(|| AwsError::SdkError("STS GetCallerIdentity missing Arn".to_string()))?;

    Ok(CallerIdentity { account, arn })
}
