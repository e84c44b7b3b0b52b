use async_trait::async_trait;
use aws_sdk_transfer::error::{DisplayErrorContext, SdkError};
use aws_sdk_transfer::operation::delete_access::DeleteAccessError;
use aws_sdk_transfer::operation::describe_access::{DescribeAccessError, DescribeAccessOutput};
use aws_sdk_transfer::operation::update_access::UpdateAccessError;
use aws_sdk_transfer::types::{
    DescribedAccess, HomeDirectoryMapEntry, HomeDirectoryType as SdkHomeDirectoryType,
    PosixProfile as SdkPosixProfile,
};
use aws_sdk_transfer::Client as TransferClient;
use log::debug;

use crate::aws::{AwsError, AwsResult};
use crate::finder::{AccessFinder, AccessMutator, FinderError};
use crate::id::AccessId;
use crate::model::{
    AccessRecord, AccessSpec, HomeDirectoryMapping, HomeDirectoryType, PosixProfile,
};

/// Client to call the AWS Transfer Family access APIs
pub struct TransferAccessClient {
    pub(crate) client: TransferClient,
}

/// Impl for AWS Transfer client wrapper
impl TransferAccessClient {
    /// New construct
    pub fn new(client: TransferClient) -> Self {
        Self { client }
    }

    /// Build a client from a loaded SDK configuration
    pub fn from_conf(config: &aws_config::SdkConfig) -> Self {
        Self::new(TransferClient::new(config))
    }

    /// Call ListServers once to confirm the service answers in this region.
    pub async fn probe(&self) -> AwsResult<()> {
        self.client
            .list_servers()
            .max_results(1)
            .send()
            .await
            .map_err(|e| {
                AwsError::TransferError(format!(
                    "Failed to call list-servers in Transfer Family: {}",
                    DisplayErrorContext(&e)
                ))
            })?;
        Ok(())
    }
}

#[async_trait]
impl AccessFinder for TransferAccessClient {
    async fn find_access(
        &self,
        server_id: &str,
        external_id: &str,
    ) -> Result<AccessRecord, FinderError> {
        debug!("Describing Transfer Access {server_id}/{external_id}");

        let out = self
            .client
            .describe_access()
            .server_id(server_id)
            .external_id(external_id)
            .send()
            .await;

        described_access(out, server_id, external_id)
    }
}

#[async_trait]
impl AccessMutator for TransferAccessClient {
    async fn create_access(&self, spec: &AccessSpec) -> Result<AccessId, FinderError> {
        debug!("Creating Transfer Access {}", spec.id);

        let out = self
            .client
            .create_access()
            .server_id(spec.id.server_id())
            .external_id(spec.id.external_id())
            .role(&spec.role)
            .set_home_directory(spec.home_directory.clone())
            .set_home_directory_type(spec.home_directory_type.map(to_sdk_home_directory_type))
            .set_home_directory_mappings(to_sdk_mappings(&spec.home_directory_mappings)?)
            .set_policy(spec.policy.clone())
            .set_posix_profile(spec.posix_profile.as_ref().map(to_sdk_posix_profile).transpose()?)
            .send()
            .await
            .map_err(|e| {
                AwsError::TransferError(format!(
                    "Failed to create Transfer Access ({}): {}",
                    spec.id,
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(AccessId::new(out.server_id(), out.external_id())?)
    }

    async fn update_access(&self, spec: &AccessSpec) -> Result<(), FinderError> {
        debug!("Updating Transfer Access {}", spec.id);

        let result = self
            .client
            .update_access()
            .server_id(spec.id.server_id())
            .external_id(spec.id.external_id())
            .role(&spec.role)
            .set_home_directory(spec.home_directory.clone())
            .set_home_directory_type(spec.home_directory_type.map(to_sdk_home_directory_type))
            .set_home_directory_mappings(to_sdk_mappings(&spec.home_directory_mappings)?)
            .set_policy(spec.policy.clone())
            .set_posix_profile(spec.posix_profile.as_ref().map(to_sdk_posix_profile).transpose()?)
            .send()
            .await;

        mutation_outcome(
            result,
            UpdateAccessError::is_resource_not_found_exception,
            "update",
            &spec.id,
        )
        .map(|_| ())
    }

    async fn delete_access(&self, id: &AccessId) -> Result<(), FinderError> {
        debug!("Deleting Transfer Access {id}");

        let result = self
            .client
            .delete_access()
            .server_id(id.server_id())
            .external_id(id.external_id())
            .send()
            .await;

        mutation_outcome(
            result,
            DeleteAccessError::is_resource_not_found_exception,
            "delete",
            id,
        )
        .map(|_| ())
    }
}

/// Map a DescribeAccess outcome to a record.
///
/// `ResourceNotFoundException` and a response without an `Access` payload
/// both mean the mapping is gone.
fn described_access(
    result: Result<DescribeAccessOutput, SdkError<DescribeAccessError>>,
    server_id: &str,
    external_id: &str,
) -> Result<AccessRecord, FinderError> {
    let out = match result {
        Ok(out) => out,
        Err(e)
            if e.as_service_error()
                .is_some_and(DescribeAccessError::is_resource_not_found_exception) =>
        {
            return Err(FinderError::not_found(server_id, external_id));
        }
        Err(e) => {
            return Err(AwsError::TransferError(format!(
                "Failed to describe Transfer Access ({server_id}/{external_id}): {}",
                DisplayErrorContext(&e)
            ))
            .into());
        }
    };

    let Some(access) = out.access() else {
        return Err(FinderError::not_found(server_id, external_id));
    };

    Ok(record_from_described(out.server_id(), external_id, access))
}

/// Map the outcome of a call on an existing mapping; `is_missing` picks out not-found.
fn mutation_outcome<O, E>(
    result: Result<O, SdkError<E>>,
    is_missing: fn(&E) -> bool,
    action: &str,
    id: &AccessId,
) -> Result<O, FinderError>
where
    E: std::error::Error + Send + Sync + 'static,
{
    match result {
        Ok(out) => Ok(out),
        Err(e) if e.as_service_error().is_some_and(is_missing) => {
            Err(FinderError::not_found(id.server_id(), id.external_id()))
        }
        Err(e) => Err(AwsError::TransferError(format!(
            "Failed to {action} Transfer Access ({id}): {}",
            DisplayErrorContext(&e)
        ))
        .into()),
    }
}

fn record_from_described(server_id: &str, external_id: &str, access: &DescribedAccess) -> AccessRecord {
    AccessRecord {
        server_id: server_id.to_string(),
        external_id: access.external_id().unwrap_or(external_id).to_string(),
        home_directory: access.home_directory().map(ToString::to_string),
        home_directory_type: access
            .home_directory_type()
            .and_then(|t| HomeDirectoryType::from_wire(t.as_str())),
        home_directory_mappings: access
            .home_directory_mappings()
            .iter()
            .map(|m| HomeDirectoryMapping {
                entry: m.entry().to_string(),
                target: m.target().to_string(),
            })
            .collect(),
        role: access.role().map(ToString::to_string),
        policy: access.policy().map(ToString::to_string),
        posix_profile: access.posix_profile().map(|p| PosixProfile {
            uid: p.uid(),
            gid: p.gid(),
            secondary_gids: p.secondary_gids().to_vec(),
        }),
    }
}

fn to_sdk_home_directory_type(value: HomeDirectoryType) -> SdkHomeDirectoryType {
    SdkHomeDirectoryType::from(value.as_str())
}

fn to_sdk_mappings(mappings: &[HomeDirectoryMapping]) -> AwsResult<Option<Vec<HomeDirectoryMapEntry>>> {
    if mappings.is_empty() {
        return Ok(None);
    }

    mappings
        .iter()
        .map(|m| {
            HomeDirectoryMapEntry::builder()
                .entry(&m.entry)
                .target(&m.target)
                .build()
                .map_err(|e| AwsError::ConfigError(format!("invalid home directory mapping: {e}")))
        })
        .collect::<AwsResult<Vec<_>>>()
        .map(Some)
}

fn to_sdk_posix_profile(profile: &PosixProfile) -> AwsResult<SdkPosixProfile> {
    let secondary_gids = (!profile.secondary_gids.is_empty()).then(|| profile.secondary_gids.clone());

    SdkPosixProfile::builder()
        .uid(profile.uid)
        .gid(profile.gid)
        .set_secondary_gids(secondary_gids)
        .build()
        .map_err(|e| AwsError::ConfigError(format!("invalid POSIX profile: {e}")))
}
