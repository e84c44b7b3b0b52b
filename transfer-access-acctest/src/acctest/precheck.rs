//! Conditions checked before a test case touches any infrastructure.

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_sts::Client as StsClient;
use log::info;

use crate::acctest::config::AccTestConfig;
use crate::acctest::runner::PreCheck;
use crate::aws::sts::caller_identity;
use crate::aws::transfer_client::TransferAccessClient;
use crate::errors::{AccTestError, Result};

/// `TF_ACC` must be set.
pub struct AccEnabled(pub AccTestConfig);

#[async_trait]
impl PreCheck for AccEnabled {
    async fn pre_check(&self) -> Result<()> {
        self.0.require_enabled()
    }
}

/// Credentials resolve to a caller identity.
pub struct CallerIdentityAvailable(pub StsClient);

#[async_trait]
impl PreCheck for CallerIdentityAvailable {
    async fn pre_check(&self) -> Result<()> {
        let identity = caller_identity(&self.0)
            .await
            .map_err(|e| AccTestError::pre_check(e.to_string()))?;
        info!("Running as {} in account {}", identity.arn, identity.account);
        Ok(())
    }
}

/// Transfer Family answers in the configured region; otherwise the case is skipped.
pub struct TransferAvailable(pub Arc<TransferAccessClient>);

#[async_trait]
impl PreCheck for TransferAvailable {
    async fn pre_check(&self) -> Result<()> {
        self.0
            .probe()
            .await
            .map_err(|e| AccTestError::skipped(format!("skipping acceptance testing: {e}")))
    }
}

/// Pre-checks every live case runs, in order.
pub fn live_pre_checks(
    config: &AccTestConfig,
    sts: StsClient,
    transfer: Arc<TransferAccessClient>,
) -> Vec<Arc<dyn PreCheck>> {
    vec![
        Arc::new(AccEnabled(config.clone())),
        Arc::new(CallerIdentityAvailable(sts)),
        Arc::new(TransferAvailable(transfer)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_acc_enabled() {
        let err = AccEnabled(AccTestConfig::default())
            .pre_check()
            .await
            .unwrap_err();
        assert!(err.is_skip());

        AccEnabled(AccTestConfig {
            enabled: true,
            ..AccTestConfig::default()
        })
        .pre_check()
        .await
        .unwrap();
    }
}
