use anyhow::{Context, Result};
use std::path::Path;

use crate::acctest::state::{State, TerraformShowReader};

/// Get the state of an initialized terraform working directory.
pub async fn get_terraform_state(terraform_bin: &str, terraform_dir: &Path) -> Result<State> {
    TerraformShowReader::retrieve_terraform_state(terraform_bin, terraform_dir)
        .await
        .and_then(TerraformShowReader::into_state)
        .with_context(|| format!("Failed to read terraform state in {}", terraform_dir.display()))
}
