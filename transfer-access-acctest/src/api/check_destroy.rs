use anyhow::{Context, Result};
use log::info;
use std::path::Path;

use crate::acctest::check::{check_access_destroy, ACCESS_RESOURCE_TYPE};
use crate::acctest::state::State;
use crate::aws::load_sdk_config;
use crate::aws::transfer_client::TransferAccessClient;
use crate::finder::AccessFinder;

use super::get_terraform_state;

/// Confirm every access mapping recorded in `state` is gone remotely.
///
/// Returns how many mappings were checked.
pub async fn verify_destroyed(state: &State, finder: &dyn AccessFinder) -> Result<usize> {
    let count = state.resources_of_type(ACCESS_RESOURCE_TYPE).count();
    check_access_destroy(state, finder).await?;
    info!("Verified {count} Transfer Access mappings are destroyed");
    Ok(count)
}

/// Run destroy verification against the state of a terraform working directory.
pub async fn check_destroy(
    terraform_bin: &str,
    terraform_dir: &Path,
    region: Option<String>,
) -> Result<usize> {
    let state = get_terraform_state(terraform_bin, terraform_dir).await?;
    let config = load_sdk_config(region).await;
    let client = TransferAccessClient::from_conf(&config);

    verify_destroyed(&state, &client)
        .await
        .context("destroy verification failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acctest::check::tests::{access_id, FakeTransfer};
    use crate::acctest::state::tests::access_show_json;

    #[tokio::test]
    async fn test_verify_destroyed() {
        let id = access_id();
        let state = State::from_show_json(&access_show_json(&id.to_string())).unwrap();

        assert_eq!(
            verify_destroyed(&state, &FakeTransfer::default()).await.unwrap(),
            1
        );

        let err = verify_destroyed(&state, &FakeTransfer::with_access(&id))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), format!("Transfer Access {id} still exists"));
    }

    #[tokio::test]
    async fn test_verify_destroyed_empty_state() {
        let count = verify_destroyed(&State::default(), &FakeTransfer::default())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
