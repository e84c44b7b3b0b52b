//! The lifecycle cases run against a Transfer server with directory-backed access.

use std::sync::Arc;

use crate::acctest::check::{
    AccessDestroyed, AccessDisappears, AccessExists, AccessSlot, Compose, ResourceAttr,
    ResourceAttrSet, StateCheck,
};
use crate::acctest::fixtures::{Fixture, EXTERNAL_ID, RESOURCE_NAME};
use crate::acctest::runner::{skip_unsupported_service, PreCheck, TestCase, TestStep};
use crate::finder::{AccessFinder, AccessMutator};

/// Builds test cases wired to one finder, mutator and pre-check list.
#[derive(Clone)]
pub struct AccessScenarios {
    finder: Arc<dyn AccessFinder>,
    mutator: Arc<dyn AccessMutator>,
    pre_check: Vec<Arc<dyn PreCheck>>,
}

impl AccessScenarios {
    pub fn new(
        finder: Arc<dyn AccessFinder>,
        mutator: Arc<dyn AccessMutator>,
        pre_check: Vec<Arc<dyn PreCheck>>,
    ) -> Self {
        Self {
            finder,
            mutator,
            pre_check,
        }
    }

    fn case(&self, steps: Vec<TestStep>) -> TestCase {
        TestCase {
            pre_check: self.pre_check.clone(),
            error_check: Some(skip_unsupported_service),
            steps,
            check_destroy: Some(Box::new(AccessDestroyed::new(self.finder.clone()))),
        }
    }

    fn exists(&self, slot: &AccessSlot) -> Box<dyn StateCheck> {
        Box::new(AccessExists::new(
            RESOURCE_NAME,
            self.finder.clone(),
            slot.clone(),
        ))
    }

    /// Create on S3, import, then move the home directory.
    pub fn s3_basic(&self, name: &str, slot: &AccessSlot) -> TestCase {
        self.case(vec![
            TestStep::config(
                Fixture::S3Basic.render(name),
                Compose::new(vec![
                    self.exists(slot),
                    attr("external_id", EXTERNAL_ID),
                    attr("home_directory", &format!("/{name}/")),
                    attr("home_directory_type", "PATH"),
                    attr_set("role"),
                ]),
            ),
            TestStep::import_verify(RESOURCE_NAME, &["role"]),
            TestStep::config(
                Fixture::S3Updated.render(name),
                Compose::new(vec![
                    self.exists(slot),
                    attr("external_id", EXTERNAL_ID),
                    attr("home_directory", &format!("/{name}/test")),
                    attr("home_directory_type", "PATH"),
                    attr_set("role"),
                ]),
            ),
        ])
    }

    /// Create on EFS with a POSIX profile, import, then move the home directory.
    pub fn efs_basic(&self, name: &str, slot: &AccessSlot) -> TestCase {
        let checks = |slot: &AccessSlot| {
            Compose::new(vec![
                self.exists(slot),
                attr("external_id", EXTERNAL_ID),
                attr_set("home_directory"),
                attr("home_directory_type", "PATH"),
                attr("posix_profile.#", "1"),
                attr("posix_profile.0.gid", "1000"),
                attr("posix_profile.0.uid", "1000"),
                attr_set("role"),
            ])
        };

        self.case(vec![
            TestStep::config(Fixture::EfsBasic.render(name), checks(slot)),
            TestStep::import_verify(RESOURCE_NAME, &["role"]),
            TestStep::config(Fixture::EfsUpdated.render(name), checks(slot)),
        ])
    }

    /// Delete the mapping behind Terraform's back; the next plan must want to recreate it.
    pub fn disappears(&self, name: &str, slot: &AccessSlot) -> TestCase {
        self.case(vec![TestStep::Config {
            config: Fixture::S3Basic.render(name),
            check: Some(Box::new(Compose::new(vec![
                self.exists(slot),
                Box::new(AccessDisappears::new(RESOURCE_NAME, self.mutator.clone())),
            ]))),
            expect_non_empty_plan: true,
        }])
    }

    /// S3 access with a scope-down session policy.
    pub fn s3_policy(&self, name: &str, slot: &AccessSlot) -> TestCase {
        self.case(vec![TestStep::config(
            Fixture::S3ScopeDownPolicy.render(name),
            Compose::new(vec![self.exists(slot), attr_set("policy")]),
        )])
    }
}

fn attr(key: &str, value: &str) -> Box<dyn StateCheck> {
    Box::new(ResourceAttr::new(
        RESOURCE_NAME.to_string(),
        key.to_string(),
        value.to_string(),
    ))
}

fn attr_set(key: &str) -> Box<dyn StateCheck> {
    Box::new(ResourceAttrSet::new(RESOURCE_NAME.to_string(), key.to_string()))
}
