//! Runs a test case: pre-checks, ordered steps, destroy, destroy check.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};

use crate::acctest::check::StateCheck;
use crate::acctest::driver::Driver;
use crate::acctest::state::State;
use crate::errors::{AccTestError, Result};

/// A condition that must hold before any step runs.
#[async_trait]
pub trait PreCheck: Send + Sync {
    async fn pre_check(&self) -> Result<()>;
}

/// Rewrites an error before it is reported, e.g. to turn it into a skip.
pub type ErrorCheck = fn(AccTestError) -> AccTestError;

/// One step of a test case.
pub enum TestStep {
    /// Apply a configuration, then run `check` against the resulting state.
    Config {
        config: String,
        check: Option<Box<dyn StateCheck>>,
        /// The follow-up plan is expected to show changes
        expect_non_empty_plan: bool,
    },
    /// Import the resource at `resource` by its current ID.
    Import {
        resource: String,
        /// Compare imported attributes with the applied ones
        verify: bool,
        /// Attribute prefixes excluded from the comparison
        verify_ignore: Vec<String>,
    },
}

impl TestStep {
    /// A config step with a check and an expected empty follow-up plan.
    pub fn config(config: impl Into<String>, check: impl StateCheck + 'static) -> Self {
        Self::Config {
            config: config.into(),
            check: Some(Box::new(check)),
            expect_non_empty_plan: false,
        }
    }

    /// An import step that verifies every attribute not matching `verify_ignore`.
    pub fn import_verify(resource: impl Into<String>, verify_ignore: &[&str]) -> Self {
        Self::Import {
            resource: resource.into(),
            verify: true,
            verify_ignore: verify_ignore.iter().map(ToString::to_string).collect(),
        }
    }
}

/// A full acceptance test case.
#[derive(Default)]
pub struct TestCase {
    pub pre_check: Vec<Arc<dyn PreCheck>>,
    pub error_check: Option<ErrorCheck>,
    pub steps: Vec<TestStep>,
    /// Run against the state captured right before destroy
    pub check_destroy: Option<Box<dyn StateCheck>>,
}

impl TestCase {
    /// Run the case with `driver`.
    ///
    /// Resources are destroyed whenever at least one config step was
    /// attempted, even if a step failed. Skips surface as `AccTestError::Skipped`.
    pub async fn run(self, driver: &mut dyn Driver) -> Result<()> {
        for pre_check in &self.pre_check {
            pre_check.pre_check().await?;
        }

        let mut last_config: Option<String> = None;
        let mut state = State::default();
        let mut outcome = Ok(());

        for (i, step) in self.steps.iter().enumerate() {
            let step_no = i + 1;
            let result = match step {
                TestStep::Config {
                    config,
                    check,
                    expect_non_empty_plan,
                } => {
                    last_config = Some(config.clone());
                    run_config_step(driver, config, check.as_deref(), *expect_non_empty_plan)
                        .await
                        .map(|new_state| state = new_state)
                }
                TestStep::Import {
                    resource,
                    verify,
                    verify_ignore,
                } => match last_config.as_deref() {
                    Some(config) => {
                        run_import_step(driver, config, &state, resource, *verify, verify_ignore)
                            .await
                    }
                    None => Err(AccTestError::configuration(
                        "an import step needs a preceding config step",
                    )),
                },
            };

            if let Err(e) = result {
                outcome = Err(AccTestError::step(step_no, e));
                break;
            }
            info!("Step {step_no}/{} passed", self.steps.len());
        }

        if let Some(config) = last_config {
            let destroyed = destroy(driver, &config, self.check_destroy.as_deref()).await;
            outcome = match (outcome, destroyed) {
                (Err(e), Err(destroy_err)) => {
                    warn!("Destroy after failed step also failed: {destroy_err}");
                    Err(e)
                }
                (outcome, destroyed) => outcome.and(destroyed),
            };
        }

        match (outcome, self.error_check) {
            (Err(e), Some(error_check)) => Err(error_check(e)),
            (outcome, _) => outcome,
        }
    }
}

async fn run_config_step(
    driver: &mut dyn Driver,
    config: &str,
    check: Option<&dyn StateCheck>,
    expect_non_empty_plan: bool,
) -> Result<State> {
    let state = driver.apply(config).await?;

    if let Some(check) = check {
        check.check(&state).await?;
    }

    let plan_empty = driver.plan_is_empty(config).await?;
    match (plan_empty, expect_non_empty_plan) {
        (false, false) => Err(AccTestError::check_failed(
            "After applying this step, the plan was not empty",
        )),
        (true, true) => Err(AccTestError::check_failed(
            "Expected a non-empty plan, but got an empty plan",
        )),
        _ => Ok(state),
    }
}

async fn run_import_step(
    driver: &mut dyn Driver,
    config: &str,
    state: &State,
    resource: &str,
    verify: bool,
    verify_ignore: &[String],
) -> Result<()> {
    let applied = state
        .resource(resource)
        .ok_or_else(|| AccTestError::check_failed(format!("Not found: {resource}")))?;

    let imported_state = driver.import(config, resource, &applied.primary.id).await?;
    let imported = imported_state
        .resources_of_type(&applied.resource_type)
        .find(|r| r.primary.id == applied.primary.id)
        .ok_or_else(|| {
            AccTestError::check_failed(format!(
                "{resource}: no imported resource has ID {}",
                applied.primary.id
            ))
        })?;

    if !verify {
        return Ok(());
    }

    let ignored = |key: &str| verify_ignore.iter().any(|prefix| key.starts_with(prefix.as_str()));
    let keys: BTreeSet<&String> = applied
        .primary
        .attributes
        .keys()
        .chain(imported.primary.attributes.keys())
        .filter(|k| k.as_str() != "id" && !ignored(k.as_str()))
        .collect();

    let diff: Vec<String> = keys
        .into_iter()
        .filter_map(|key| {
            let before = applied.primary.attributes.get(key);
            let after = imported.primary.attributes.get(key);
            (before != after).then(|| format!("  {key}: applied={before:?} imported={after:?}"))
        })
        .collect();

    if diff.is_empty() {
        debug!("Imported {resource} matches applied state");
        Ok(())
    } else {
        Err(AccTestError::ImportVerify {
            resource: resource.to_string(),
            diff: diff.join("\n"),
        })
    }
}

async fn destroy(driver: &mut dyn Driver, config: &str, check_destroy: Option<&dyn StateCheck>) -> Result<()> {
    let pre_destroy = driver.destroy(config).await?;
    if let Some(check) = check_destroy {
        check.check(&pre_destroy).await?;
    }
    Ok(())
}

/// Turn errors that mean "service not offered here" into skips.
pub fn skip_unsupported_service(err: AccTestError) -> AccTestError {
    const MARKERS: [&str; 4] = [
        "UnknownEndpoint",
        "Could not resolve endpoint",
        "is not supported in this region",
        "InvalidAction",
    ];

    let message = err.to_string();
    match MARKERS.iter().find(|m| message.contains(**m)) {
        Some(marker) => {
            warn!("Skipping: Transfer Family unavailable ({marker})");
            AccTestError::skipped(format!("Transfer Family not available: {message}"))
        }
        None => err,
    }
}
