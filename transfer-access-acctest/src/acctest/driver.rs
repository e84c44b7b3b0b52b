//! Drives Terraform for a test case.

use std::path::{Path, PathBuf};
use std::process::Output;

use async_trait::async_trait;
use log::{debug, info, trace, warn};
use tempfile::TempDir;
use tokio::process::Command;

use crate::acctest::config::AccTestConfig;
use crate::acctest::state::{State, TerraformShowReader};
use crate::errors::{AccTestError, Result};

/// Applies configurations and reports the resulting state.
#[async_trait]
pub trait Driver: Send {
    /// Apply `config` and return the new state.
    async fn apply(&mut self, config: &str) -> Result<State>;

    /// Returns true when planning `config` against current state shows no changes.
    async fn plan_is_empty(&mut self, config: &str) -> Result<bool>;

    /// Import `id` as `address` into a fresh state and return that state.
    async fn import(&mut self, config: &str, address: &str, id: &str) -> Result<State>;

    /// Destroy everything in `config`; returns the state as it was before destroy.
    async fn destroy(&mut self, config: &str) -> Result<State>;
}

/// `Driver` backed by the terraform CLI, one temporary working directory per case.
pub struct TerraformCli {
    terraform_bin: String,
    region: Option<String>,
    keep_workdir: bool,
    workdir: Option<TempDir>,
    initialized: bool,
}

impl TerraformCli {
    /// Create a driver with its own working directory.
    pub fn new(config: &AccTestConfig) -> Result<Self> {
        Ok(Self {
            terraform_bin: config.terraform_bin.clone(),
            region: config.region.clone(),
            keep_workdir: config.keep_workdir,
            workdir: Some(new_workdir()?),
            initialized: false,
        })
    }

    /// Path of the working directory.
    #[must_use]
    pub fn workdir(&self) -> Option<&Path> {
        self.workdir.as_ref().map(TempDir::path)
    }

    fn dir(&self) -> Result<PathBuf> {
        self.workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| AccTestError::configuration("terraform working directory already released"))
    }

    fn command(&self, dir: &Path, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.terraform_bin);
        cmd.args(args)
            .current_dir(dir)
            .env("TF_IN_AUTOMATION", "1")
            .kill_on_drop(true);
        if let Some(region) = &self.region {
            cmd.env("AWS_DEFAULT_REGION", region);
        }
        cmd
    }

    fn command_str(&self, args: &[&str]) -> String {
        format!("{} {}", self.terraform_bin, args.join(" "))
    }

    async fn output(&self, dir: &Path, args: &[&str]) -> Result<Output> {
        debug!("Running `{}` in {:?}", self.command_str(args), dir);
        self.command(dir, args)
            .output()
            .await
            .map_err(|e| AccTestError::terraform_command(self.command_str(args), e.to_string()))
    }

    /// Run a command that must exit zero.
    async fn run(&self, dir: &Path, args: &[&str]) -> Result<()> {
        let output = self.output(dir, args).await?;
        trace!("stdout: {}", String::from_utf8_lossy(&output.stdout));
        if output.status.success() {
            Ok(())
        } else {
            Err(AccTestError::terraform_command(
                self.command_str(args),
                String::from_utf8_lossy(&output.stderr).to_string(),
            ))
        }
    }

    async fn write_config(&self, dir: &Path, config: &str) -> Result<()> {
        let path = dir.join("main.tf");
        tokio::fs::write(&path, config)
            .await
            .map_err(|e| AccTestError::file_system("write", &path, e))
    }

    async fn init(&self, dir: &Path) -> Result<()> {
        self.run(dir, &["init", "-input=false", "-no-color"]).await
    }

    async fn prepare(&mut self, config: &str) -> Result<PathBuf> {
        let dir = self.dir()?;
        self.write_config(&dir, config).await?;
        if !self.initialized {
            self.init(&dir).await?;
            self.initialized = true;
        }
        Ok(dir)
    }

    async fn show(&self, dir: &Path) -> Result<State> {
        TerraformShowReader::retrieve_terraform_state(&self.terraform_bin, dir)
            .await?
            .into_state()
    }
}

fn new_workdir() -> Result<TempDir> {
    tempfile::Builder::new()
        .prefix("tf-acc-")
        .tempdir()
        .map_err(|e| AccTestError::file_system("create directory", std::env::temp_dir(), e))
}

#[async_trait]
impl Driver for TerraformCli {
    async fn apply(&mut self, config: &str) -> Result<State> {
        let dir = self.prepare(config).await?;
        info!("Applying configuration in {:?}", dir);
        self.run(&dir, &["apply", "-auto-approve", "-input=false", "-no-color"])
            .await?;
        self.show(&dir).await
    }

    async fn plan_is_empty(&mut self, config: &str) -> Result<bool> {
        let dir = self.prepare(config).await?;
        let args = ["plan", "-detailed-exitcode", "-input=false", "-no-color"];
        let output = self.output(&dir, &args).await?;

        // -detailed-exitcode: 0 = no changes, 2 = changes present
        match output.status.code() {
            Some(0) => Ok(true),
            Some(2) => {
                debug!("Plan not empty:\n{}", String::from_utf8_lossy(&output.stdout));
                Ok(false)
            }
            _ => Err(AccTestError::terraform_command(
                self.command_str(&args),
                String::from_utf8_lossy(&output.stderr).to_string(),
            )),
        }
    }

    async fn import(&mut self, config: &str, address: &str, id: &str) -> Result<State> {
        let import_dir = new_workdir()?;
        let dir = import_dir.path().to_path_buf();
        info!("Importing {address} ({id}) in {:?}", dir);

        self.write_config(&dir, config).await?;
        self.init(&dir).await?;
        self.run(&dir, &["import", "-input=false", "-no-color", address, id])
            .await?;
        self.show(&dir).await
    }

    async fn destroy(&mut self, config: &str) -> Result<State> {
        let dir = self.prepare(config).await?;
        let state = self.show(&dir).await?;
        info!("Destroying {} resources in {:?}", state.resources().count(), dir);
        self.run(&dir, &["destroy", "-auto-approve", "-input=false", "-no-color"])
            .await?;
        Ok(state)
    }
}

impl Drop for TerraformCli {
    fn drop(&mut self) {
        if self.keep_workdir {
            if let Some(dir) = self.workdir.take() {
                let path = dir.keep();
                warn!("Keeping terraform working directory {:?}", path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_workdir_is_removed() {
        let cli = TerraformCli::new(&AccTestConfig::default()).unwrap();
        let path = cli.workdir().unwrap().to_path_buf();
        assert!(path.exists());
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("tf-acc-"));

        drop(cli);
        assert!(!path.exists());
    }

    #[test]
    fn test_driver_workdir_is_kept() {
        let config = AccTestConfig {
            keep_workdir: true,
            ..AccTestConfig::default()
        };
        let cli = TerraformCli::new(&config).unwrap();
        let path = cli.workdir().unwrap().to_path_buf();

        drop(cli);
        assert!(path.exists());
        std::fs::remove_dir_all(&path).unwrap();
    }

    #[tokio::test]
    async fn test_missing_binary_is_command_error() {
        let config = AccTestConfig {
            terraform_bin: "/nonexistent/terraform".to_string(),
            ..AccTestConfig::default()
        };
        let mut cli = TerraformCli::new(&config).unwrap();

        let err = cli.apply("").await.unwrap_err();
        assert!(matches!(err, AccTestError::TerraformCommandError { .. }));
        assert!(err.to_string().contains("/nonexistent/terraform init"));
    }
}
