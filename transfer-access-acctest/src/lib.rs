//! This crate provides the pieces needed to manage and test
//! `aws_transfer_access` mappings:
//! - the `SERVER-ID/EXTERNAL-ID` composite ID codec
//! - a finder/mutator over the AWS Transfer Family access APIs
//! - a Terraform acceptance harness with the access lifecycle scenarios
//!

pub mod acctest;
pub mod api;
pub mod aws;
pub mod errors;
pub mod finder;
pub mod id;
pub mod model;

// Re-exports for a small, focused public API
pub use aws::transfer_client::TransferAccessClient;
pub use aws::{load_sdk_config, AwsError};
pub use errors::{AccTestError, Result};
pub use finder::{is_not_found, AccessFinder, AccessMutator, FinderError};
pub use id::{decode, encode, AccessId, IdError, SEPARATOR};
pub use model::{AccessRecord, AccessSpec, HomeDirectoryMapping, HomeDirectoryType, PosixProfile};
