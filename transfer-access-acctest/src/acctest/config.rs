//! Acceptance test settings read from the environment.

use std::env;

use log::debug;

use crate::errors::{AccTestError, Result};

/// Gate for acceptance tests; nothing touches AWS unless it is set.
pub const ENV_TF_ACC: &str = "TF_ACC";
/// Terraform binary to drive.
pub const ENV_TERRAFORM_PATH: &str = "TF_ACC_TERRAFORM_PATH";
/// Keep temporary working directories after a test case.
pub const ENV_KEEP_WORKDIR: &str = "TF_ACC_KEEP_WORKDIR";

const REGION_VARS: [&str; 2] = ["AWS_REGION", "AWS_DEFAULT_REGION"];

/// Settings shared by every acceptance test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccTestConfig {
    /// `TF_ACC` was set to a non-empty value
    pub enabled: bool,
    /// Path or name of the terraform binary
    pub terraform_bin: String,
    /// Region override, if any
    pub region: Option<String>,
    /// Leave working directories in place for debugging
    pub keep_workdir: bool,
}

impl Default for AccTestConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            terraform_bin: "terraform".to_string(),
            region: None,
            keep_workdir: false,
        }
    }
}

impl AccTestConfig {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`, which returns the value of a variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let terraform_bin = match lookup(ENV_TERRAFORM_PATH) {
            Some(path) if path.trim().is_empty() => {
                return Err(AccTestError::configuration(format!(
                    "{ENV_TERRAFORM_PATH} is set but empty"
                )))
            }
            Some(path) => path,
            None => "terraform".to_string(),
        };

        let config = Self {
            enabled: non_empty(ENV_TF_ACC).is_some(),
            terraform_bin,
            region: REGION_VARS.iter().find_map(|key| non_empty(key)),
            keep_workdir: non_empty(ENV_KEEP_WORKDIR).is_some_and(|v| v != "0" && v != "false"),
        };

        debug!("Acceptance test configuration: {config:?}");
        Ok(config)
    }

    /// Fail with a skip unless acceptance tests are enabled.
    pub fn require_enabled(&self) -> Result<()> {
        if self.enabled {
            Ok(())
        } else {
            Err(AccTestError::skipped(format!(
                "Acceptance tests skipped unless env '{ENV_TF_ACC}' set"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AccTestConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, AccTestConfig::default());
        assert!(config.require_enabled().unwrap_err().is_skip());
    }

    #[test]
    fn test_all_settings() {
        let config = AccTestConfig::from_lookup(lookup_from(&[
            ("TF_ACC", "1"),
            ("TF_ACC_TERRAFORM_PATH", "/opt/terraform/bin/terraform"),
            ("AWS_DEFAULT_REGION", "us-west-2"),
            ("TF_ACC_KEEP_WORKDIR", "true"),
        ]))
        .unwrap();

        assert!(config.enabled);
        assert_eq!(config.terraform_bin, "/opt/terraform/bin/terraform");
        assert_eq!(config.region.as_deref(), Some("us-west-2"));
        assert!(config.keep_workdir);
        config.require_enabled().unwrap();
    }

    #[test]
    fn test_aws_region_wins_over_default_region() {
        let config = AccTestConfig::from_lookup(lookup_from(&[
            ("AWS_REGION", "eu-west-1"),
            ("AWS_DEFAULT_REGION", "us-west-2"),
            ("TF_ACC_KEEP_WORKDIR", "0"),
        ]))
        .unwrap();
        assert_eq!(config.region.as_deref(), Some("eu-west-1"));
        assert!(!config.keep_workdir);
    }

    #[test]
    fn test_empty_terraform_path_rejected() {
        let err = AccTestConfig::from_lookup(lookup_from(&[("TF_ACC_TERRAFORM_PATH", " ")]))
            .unwrap_err();
        assert!(matches!(err, AccTestError::Configuration { .. }));
    }

    #[test]
    #[serial_test::serial]
    fn test_from_env_reads_tf_acc() {
        env::set_var(ENV_TF_ACC, "1");
        let config = AccTestConfig::from_env().unwrap();
        env::remove_var(ENV_TF_ACC);
        assert!(config.enabled);
    }
}
