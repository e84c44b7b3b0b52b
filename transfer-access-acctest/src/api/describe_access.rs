use anyhow::{Context, Result};

use crate::aws::load_sdk_config;
use crate::aws::transfer_client::TransferAccessClient;
use crate::finder::AccessFinder;
use crate::model::AccessRecord;

use super::parse_access_id;

/// Look an access mapping up by its composite ID.
pub async fn describe_access(id: &str, region: Option<String>) -> Result<AccessRecord> {
    let id = parse_access_id(id)?;
    let config = load_sdk_config(region).await;
    let client = TransferAccessClient::from_conf(&config);

    client
        .find_access_by_id(&id)
        .await
        .with_context(|| format!("error reading Transfer Access ({id})"))
}
