//! Transfer Access operator API used by the CLI

mod access_id;
mod check_destroy;
mod describe_access;
mod get_terraform_state;

pub use access_id::{format_access_id, parse_access_id};
pub use check_destroy::{check_destroy, verify_destroyed};
pub use describe_access::describe_access;
pub use get_terraform_state::get_terraform_state;
