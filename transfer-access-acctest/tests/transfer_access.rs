//! Live acceptance tests for `aws_transfer_access`.
//!
//! These create real Transfer servers, directories and access mappings and
//! only run when `TF_ACC` is set:
//! ```bash
//! TF_ACC=1 AWS_DEFAULT_REGION=us-west-2 \
//! cargo test --package transfer-access-acctest --test transfer_access
//! ```
//! `TF_ACC_TERRAFORM_PATH` selects the terraform binary and
//! `TF_ACC_KEEP_WORKDIR=1` leaves working directories behind for debugging.

use std::sync::Arc;

use log::warn;
use serial_test::serial;
use transfer_access_acctest::acctest::fixtures::{random_with_prefix, RESOURCE_PREFIX};
use transfer_access_acctest::acctest::{
    access_slot, live_pre_checks, AccTestConfig, AccessScenarios, TerraformCli, TestCase,
};
use transfer_access_acctest::{load_sdk_config, TransferAccessClient};

/// Build scenarios against the live service, or `None` when acceptance tests are off.
async fn live_scenarios() -> Option<(AccTestConfig, AccessScenarios)> {
    let config = AccTestConfig::from_env().unwrap();
    if let Err(e) = config.require_enabled() {
        warn!("{e}");
        return None;
    }

    let sdk_config = load_sdk_config(config.region.clone()).await;
    let transfer = Arc::new(TransferAccessClient::from_conf(&sdk_config));
    let sts = aws_sdk_sts::Client::new(&sdk_config);

    let scenarios = AccessScenarios::new(
        transfer.clone(),
        transfer.clone(),
        live_pre_checks(&config, sts, transfer),
    );
    Some((config, scenarios))
}

async fn run_case(config: &AccTestConfig, case: TestCase) {
    let mut driver = TerraformCli::new(config).unwrap();
    match case.run(&mut driver).await {
        Ok(()) => {}
        Err(e) if e.is_skip() => warn!("{e}"),
        Err(e) => panic!("{e}"),
    }
}

#[test_log::test(tokio::test)]
#[serial]
async fn test_access_s3_basic() {
    let Some((config, scenarios)) = live_scenarios().await else {
        return;
    };
    let name = random_with_prefix(RESOURCE_PREFIX);
    let slot = access_slot();

    run_case(&config, scenarios.s3_basic(&name, &slot)).await;
}

#[test_log::test(tokio::test)]
#[serial]
async fn test_access_efs_basic() {
    let Some((config, scenarios)) = live_scenarios().await else {
        return;
    };
    let name = random_with_prefix(RESOURCE_PREFIX);
    let slot = access_slot();

    run_case(&config, scenarios.efs_basic(&name, &slot)).await;
}

#[test_log::test(tokio::test)]
#[serial]
async fn test_access_disappears() {
    let Some((config, scenarios)) = live_scenarios().await else {
        return;
    };
    let name = random_with_prefix(RESOURCE_PREFIX);
    let slot = access_slot();

    run_case(&config, scenarios.disappears(&name, &slot)).await;
}

#[test_log::test(tokio::test)]
#[serial]
async fn test_access_s3_policy() {
    let Some((config, scenarios)) = live_scenarios().await else {
        return;
    };
    let name = random_with_prefix(RESOURCE_PREFIX);
    let slot = access_slot();

    run_case(&config, scenarios.s3_policy(&name, &slot)).await;
}
