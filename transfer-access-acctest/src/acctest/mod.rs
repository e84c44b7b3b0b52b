//! Terraform acceptance harness for `aws_transfer_access`.
//!
//! A `TestCase` is a list of steps run through a `Driver`. Config steps
//! apply a configuration and run `StateCheck`s over the resulting state;
//! import steps re-import the resource and compare attributes. Resources
//! are always destroyed at the end and the destroy check then confirms the
//! mappings are gone remotely.

pub mod check;
pub mod config;
pub mod driver;
pub mod fixtures;
pub mod precheck;
pub mod runner;
pub mod scenarios;
pub mod state;

pub use check::{
    access_slot, check_access_destroy, AccessDestroyed, AccessDisappears, AccessExists,
    AccessSlot, Compose, ResourceAttr, ResourceAttrSet, StateCheck, StateFn,
};
pub use config::AccTestConfig;
pub use driver::{Driver, TerraformCli};
pub use fixtures::Fixture;
pub use precheck::live_pre_checks;
pub use runner::{skip_unsupported_service, PreCheck, TestCase, TestStep};
pub use scenarios::AccessScenarios;
pub use state::{InstanceState, ResourceState, State, TerraformShowReader};
