//! Check functions run against state after a config step.

use std::sync::Arc;

use async_trait::async_trait;
use derive_new::new;
use log::{debug, info};
use tokio::sync::Mutex;

use crate::acctest::state::{ResourceState, State};
use crate::errors::{AccTestError, Result};
use crate::finder::{is_not_found, AccessFinder, AccessMutator};
use crate::id::AccessId;
use crate::model::AccessRecord;

/// Terraform type of the resource under test.
pub const ACCESS_RESOURCE_TYPE: &str = "aws_transfer_access";

/// Slot an `AccessExists` check writes the observed mapping into.
pub type AccessSlot = Arc<Mutex<Option<AccessRecord>>>;

/// Create an empty slot.
#[must_use]
pub fn access_slot() -> AccessSlot {
    Arc::new(Mutex::new(None))
}

/// A check over the state produced by a config step.
#[async_trait]
pub trait StateCheck: Send + Sync {
    async fn check(&self, state: &State) -> Result<()>;
}

fn lookup<'a>(state: &'a State, resource: &str) -> Result<&'a ResourceState> {
    state
        .resource(resource)
        .ok_or_else(|| AccTestError::check_failed(format!("Not found: {resource}")))
}

/// Attribute `key` of `resource` equals `value`.
#[derive(Debug, Clone, new)]
pub struct ResourceAttr {
    resource: String,
    key: String,
    value: String,
}

#[async_trait]
impl StateCheck for ResourceAttr {
    async fn check(&self, state: &State) -> Result<()> {
        let rs = lookup(state, &self.resource)?;
        match rs.primary.attributes.get(&self.key) {
            Some(actual) if *actual == self.value => Ok(()),
            Some(actual) => Err(AccTestError::check_failed(format!(
                "{}: Attribute '{}' expected {:?}, got {:?}",
                self.resource, self.key, self.value, actual
            ))),
            // An unset count attribute matches an expected count of zero.
            None if self.value == "0" && (self.key.ends_with(".#") || self.key.ends_with(".%")) => {
                Ok(())
            }
            None => Err(AccTestError::check_failed(format!(
                "{}: Attribute '{}' not found",
                self.resource, self.key
            ))),
        }
    }
}

/// Attribute `key` of `resource` is present and non-empty.
#[derive(Debug, Clone, new)]
pub struct ResourceAttrSet {
    resource: String,
    key: String,
}

#[async_trait]
impl StateCheck for ResourceAttrSet {
    async fn check(&self, state: &State) -> Result<()> {
        let rs = lookup(state, &self.resource)?;
        match rs.primary.attributes.get(&self.key) {
            Some(value) if !value.is_empty() => Ok(()),
            _ => Err(AccTestError::check_failed(format!(
                "{}: Attribute '{}' expected to be set",
                self.resource, self.key
            ))),
        }
    }
}

/// Decode the stored ID of `resource` the way every access check does.
fn stored_access_id(state: &State, resource: &str) -> Result<AccessId> {
    let rs = lookup(state, resource)?;
    if rs.primary.id.is_empty() {
        return Err(AccTestError::check_failed("No Transfer Access ID is set"));
    }
    Ok(AccessId::parse(&rs.primary.id)?)
}

/// The mapping stored in state exists remotely.
///
/// The observed record is written into `slot`.
pub struct AccessExists {
    resource: String,
    finder: Arc<dyn AccessFinder>,
    slot: AccessSlot,
}

impl AccessExists {
    pub fn new(resource: impl Into<String>, finder: Arc<dyn AccessFinder>, slot: AccessSlot) -> Self {
        Self {
            resource: resource.into(),
            finder,
            slot,
        }
    }
}

#[async_trait]
impl StateCheck for AccessExists {
    async fn check(&self, state: &State) -> Result<()> {
        let id = stored_access_id(state, &self.resource)?;
        let record = self.finder.find_access_by_id(&id).await?;
        debug!("Transfer Access {id} exists");
        *self.slot.lock().await = Some(record);
        Ok(())
    }
}

/// Delete the mapping stored in state out of band.
pub struct AccessDisappears {
    resource: String,
    mutator: Arc<dyn AccessMutator>,
}

impl AccessDisappears {
    pub fn new(resource: impl Into<String>, mutator: Arc<dyn AccessMutator>) -> Self {
        Self {
            resource: resource.into(),
            mutator,
        }
    }
}

#[async_trait]
impl StateCheck for AccessDisappears {
    async fn check(&self, state: &State) -> Result<()> {
        let id = stored_access_id(state, &self.resource)?;
        info!("Deleting Transfer Access {id} outside of Terraform");
        self.mutator.delete_access(&id).await?;
        Ok(())
    }
}

/// Run checks in order, stopping at the first failure.
#[derive(new)]
pub struct Compose {
    checks: Vec<Box<dyn StateCheck>>,
}

#[async_trait]
impl StateCheck for Compose {
    async fn check(&self, state: &State) -> Result<()> {
        let total = self.checks.len();
        for (i, check) in self.checks.iter().enumerate() {
            check
                .check(state)
                .await
                .map_err(|e| AccTestError::ComposedCheck {
                    index: i + 1,
                    total,
                    source: Box::new(e),
                })?;
        }
        Ok(())
    }
}

/// A synchronous check built from a closure.
pub struct StateFn<F>(pub F);

#[async_trait]
impl<F> StateCheck for StateFn<F>
where
    F: Fn(&State) -> Result<()> + Send + Sync,
{
    async fn check(&self, state: &State) -> Result<()> {
        (self.0)(state)
    }
}

/// Destroy check over the pre-destroy state; see `check_access_destroy`.
pub struct AccessDestroyed {
    finder: Arc<dyn AccessFinder>,
}

impl AccessDestroyed {
    pub fn new(finder: Arc<dyn AccessFinder>) -> Self {
        Self { finder }
    }
}

#[async_trait]
impl StateCheck for AccessDestroyed {
    async fn check(&self, state: &State) -> Result<()> {
        check_access_destroy(state, self.finder.as_ref()).await
    }
}

/// Verify every access mapping in `state` is gone remotely.
///
/// `state` is the state as it was before destroy.
pub async fn check_access_destroy(state: &State, finder: &dyn AccessFinder) -> Result<()> {
    for rs in state.resources_of_type(ACCESS_RESOURCE_TYPE) {
        let id = AccessId::parse(&rs.primary.id)?;

        match finder.find_access_by_id(&id).await {
            Err(e) if is_not_found(&e) => continue,
            Err(e) => return Err(e.into()),
            Ok(_) => {
                return Err(AccTestError::StillExists {
                    id: rs.primary.id.clone(),
                })
            }
        }
    }

    Ok(())
}
