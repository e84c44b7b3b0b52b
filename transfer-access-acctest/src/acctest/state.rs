//! Terraform state as seen by check functions.
//!
//! State is read from `terraform show -json` and flattened into the
//! string-keyed attribute form Terraform providers use (`posix_profile.#`,
//! `posix_profile.0.uid`, ...), so checks can address nested values by key.

use std::collections::BTreeMap;
use std::path::Path;

use log::{debug, trace};
use serde_json::Value as JsonValue;
use tokio::process::Command;

use crate::errors::{AccTestError, Result};

/// Primary instance of a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceState {
    /// Resource ID (`values.id`)
    pub id: String,
    /// Flattened attributes, including `id`
    pub attributes: BTreeMap<String, String>,
}

/// A single managed resource in state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceState {
    /// Full address, e.g. `aws_transfer_access.test`
    pub address: String,
    /// Resource type, e.g. `aws_transfer_access`
    pub resource_type: String,
    /// Resource name, e.g. `test`
    pub name: String,
    /// Primary instance
    pub primary: InstanceState,
}

/// Managed resources keyed by address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct State {
    resources: BTreeMap<String, ResourceState>,
}

impl State {
    /// Build a state from resources, keyed by their addresses.
    pub fn from_resources(resources: impl IntoIterator<Item = ResourceState>) -> Self {
        Self {
            resources: resources
                .into_iter()
                .map(|r| (r.address.clone(), r))
                .collect(),
        }
    }

    /// Look a resource up by address.
    #[must_use]
    pub fn resource(&self, address: &str) -> Option<&ResourceState> {
        self.resources.get(address)
    }

    /// All resources in address order.
    pub fn resources(&self) -> impl Iterator<Item = &ResourceState> {
        self.resources.values()
    }

    /// Resources of one type in address order.
    pub fn resources_of_type<'a>(&'a self, resource_type: &'a str) -> impl Iterator<Item = &'a ResourceState> {
        self.resources
            .values()
            .filter(move |r| r.resource_type == resource_type)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Parse the output of `terraform show -json`.
    ///
    /// Data sources are skipped. An empty state (no `values` key) yields an
    /// empty `State`.
    pub fn from_show_json(terraform_output: &JsonValue) -> Result<Self> {
        let parse_err = |message: &str| {
            AccTestError::terraform_state_parse(message, JsonValue::to_string(terraform_output))
        };

        let map = terraform_output
            .as_object()
            .ok_or_else(|| parse_err("Terraform show object is not a map"))?;

        let Some(values_map) = map.get("values") else {
            debug!("Terraform show output has no values, treating state as empty");
            return Ok(Self::default());
        };

        let root_module = values_map
            .get("root_module")
            .ok_or_else(|| parse_err("Terraform show object does not have values.root_module field"))?;

        let mut resources = Vec::new();
        collect_module(root_module, &mut resources).map_err(|message| parse_err(&message))?;

        Ok(Self::from_resources(resources))
    }

    /// Parse `terraform show -json` output given as text.
    pub fn from_show_str(json: &str) -> Result<Self> {
        let value: JsonValue =
            serde_json::from_str(json).map_err(|e| AccTestError::json("terraform show output", e))?;
        Self::from_show_json(&value)
    }
}

fn collect_module(module: &JsonValue, out: &mut Vec<ResourceState>) -> std::result::Result<(), String> {
    if let Some(resources) = module.get("resources") {
        let resource_arr = resources
            .as_array()
            .ok_or_else(|| "Terraform resources object is not an array".to_string())?;

        for resource in resource_arr {
            if resource.get("mode").and_then(JsonValue::as_str) == Some("data") {
                continue;
            }
            out.push(resource_from_json(resource)?);
        }
    }

    if let Some(children) = module.get("child_modules").and_then(JsonValue::as_array) {
        for child in children {
            collect_module(child, out)?;
        }
    }

    Ok(())
}

fn resource_from_json(resource: &JsonValue) -> std::result::Result<ResourceState, String> {
    let field = |name: &str| {
        resource
            .get(name)
            .and_then(JsonValue::as_str)
            .map(ToString::to_string)
            .ok_or_else(|| format!("Terraform resource is missing the {name} field"))
    };

    let address = field("address")?;
    let resource_type = field("type")?;
    let name = field("name")?;

    let mut attributes = BTreeMap::new();
    if let Some(values) = resource.get("values").and_then(JsonValue::as_object) {
        for (key, value) in values {
            flatten_into(key, value, &mut attributes);
        }
    }

    let id = attributes.get("id").cloned().unwrap_or_default();
    trace!("Read {address} (id={id:?}, {} attributes)", attributes.len());

    Ok(ResourceState {
        address,
        resource_type,
        name,
        primary: InstanceState { id, attributes },
    })
}

/// Flatten one JSON value into Terraform's flatmap form.
pub(crate) fn flatten_into(prefix: &str, value: &JsonValue, out: &mut BTreeMap<String, String>) {
    match value {
        JsonValue::Null => {}
        JsonValue::Bool(b) => {
            out.insert(prefix.to_string(), b.to_string());
        }
        JsonValue::Number(n) => {
            out.insert(prefix.to_string(), n.to_string());
        }
        JsonValue::String(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
        JsonValue::Array(items) => {
            out.insert(format!("{prefix}.#"), items.len().to_string());
            for (i, item) in items.iter().enumerate() {
                flatten_into(&format!("{prefix}.{i}"), item, out);
            }
        }
        JsonValue::Object(map) => {
            out.insert(format!("{prefix}.%"), map.len().to_string());
            for (k, v) in map {
                flatten_into(&format!("{prefix}.{k}"), v, out);
            }
        }
    }
}

/// Runs `terraform show -json` in a working directory.
pub struct TerraformShowReader {
    terraform_output: JsonValue,
}

impl TerraformShowReader {
    /// Run `terraform show -json` in `terraform_dir`.
    pub async fn retrieve_terraform_state(terraform_bin: &str, terraform_dir: &Path) -> Result<Self> {
        debug!("Retrieving terraform state from {:?}", terraform_dir);

        let mut cmd = Command::new(terraform_bin);
        cmd.arg("show").arg("-json").current_dir(terraform_dir);

        let cmd_str = format!("{terraform_bin} show -json");
        let output = cmd
            .output()
            .await
            .map_err(|e| AccTestError::terraform_command(&cmd_str, e.to_string()))?;

        if !output.status.success() {
            return Err(AccTestError::terraform_command(
                cmd_str,
                String::from_utf8_lossy(&output.stderr).to_string(),
            ));
        }

        let json = String::from_utf8_lossy(&output.stdout);
        trace!("Terraform show output: {json}");
        Ok(Self {
            terraform_output: serde_json::from_str(&json)
                .map_err(|e| AccTestError::json("terraform show output", e))?,
        })
    }

    /// Convert the captured output into a `State`.
    pub fn into_state(self) -> Result<State> {
        State::from_show_json(&self.terraform_output)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) fn access_show_json(id: &str) -> JsonValue {
        json!({
            "format_version": "1.0",
            "values": {
                "root_module": {
                    "resources": [
                        {
                            "address": "data.aws_partition.current",
                            "mode": "data",
                            "type": "aws_partition",
                            "name": "current",
                            "values": { "partition": "aws" }
                        },
                        {
                            "address": "aws_transfer_access.test",
                            "mode": "managed",
                            "type": "aws_transfer_access",
                            "name": "test",
                            "values": {
                                "id": id,
                                "external_id": "S-1-1-12-1234567890-123456789-1234567890-1234",
                                "server_id": "s-0123456789abcdef0",
                                "home_directory": "/tf-acc-test-1/",
                                "home_directory_type": "PATH",
                                "home_directory_mappings": [],
                                "policy": null,
                                "posix_profile": [ { "uid": 1000, "gid": 1000, "secondary_gids": null } ],
                                "role": "arn:aws:iam::123456789012:role/tf-acc-test-1"
                            }
                        }
                    ],
                    "child_modules": [
                        {
                            "resources": [
                                {
                                    "address": "module.net.aws_vpc.test",
                                    "mode": "managed",
                                    "type": "aws_vpc",
                                    "name": "test",
                                    "values": { "id": "vpc-1", "tags": { "Name": "tf-acc-test-1" } }
                                }
                            ]
                        }
                    ]
                }
            }
        })
    }

    #[test]
    fn test_parse_show_output() {
        let state =
            State::from_show_json(&access_show_json("s-0123456789abcdef0/S-1-1-12-1234567890-123456789-1234567890-1234"))
                .unwrap();

        assert!(state.resource("data.aws_partition.current").is_none());

        let access = state.resource("aws_transfer_access.test").unwrap();
        assert_eq!(access.resource_type, "aws_transfer_access");
        assert_eq!(
            access.primary.id,
            "s-0123456789abcdef0/S-1-1-12-1234567890-123456789-1234567890-1234"
        );
        let attrs = &access.primary.attributes;
        assert_eq!(attrs["home_directory_type"], "PATH");
        assert_eq!(attrs["posix_profile.#"], "1");
        assert_eq!(attrs["posix_profile.0.uid"], "1000");
        assert_eq!(attrs["home_directory_mappings.#"], "0");
        assert!(!attrs.contains_key("policy"));
        assert!(!attrs.contains_key("posix_profile.0.secondary_gids"));

        let vpc = state.resource("module.net.aws_vpc.test").unwrap();
        assert_eq!(vpc.primary.attributes["tags.%"], "1");
        assert_eq!(vpc.primary.attributes["tags.Name"], "tf-acc-test-1");

        assert_eq!(state.resources_of_type("aws_transfer_access").count(), 1);
    }

    #[test]
    fn test_empty_state() {
        let state = State::from_show_str(r#"{"format_version":"1.0"}"#).unwrap();
        assert!(state.is_empty());
    }

    #[test]
    fn test_parse_errors() {
        let err = State::from_show_str("[]").unwrap_err();
        assert!(matches!(err, AccTestError::TerraformStateParseError { .. }));

        let err = State::from_show_str(r#"{"values":{}}"#).unwrap_err();
        assert!(err.to_string().contains("values.root_module"));

        let err = State::from_show_str(r#"{"values":{"root_module":{"resources":[{"type":"x"}]}}}"#)
            .unwrap_err();
        assert!(err.to_string().contains("address"));

        let err = State::from_show_str("not json").unwrap_err();
        assert!(matches!(err, AccTestError::JsonParsing { .. }));
    }
}
