//! Observed and desired state of a Transfer Family access mapping.

use serde::{Deserialize, Serialize};

use crate::id::AccessId;

/// How the home directory of an access mapping is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HomeDirectoryType {
    /// `home_directory` is an S3 or EFS path
    Path,
    /// `home_directory_mappings` provide a virtual layout
    Logical,
}

impl HomeDirectoryType {
    /// Wire value used by the Transfer API and by Terraform state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Path => "PATH",
            Self::Logical => "LOGICAL",
        }
    }

    /// Parse the wire value; unknown values yield `None`.
    #[must_use]
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "PATH" => Some(Self::Path),
            "LOGICAL" => Some(Self::Logical),
            _ => None,
        }
    }
}

/// One entry of a logical home directory layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeDirectoryMapping {
    /// Path visible to the user
    pub entry: String,
    /// Backing S3 or EFS path
    pub target: String,
}

/// POSIX identity used for EFS-backed servers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosixProfile {
    pub uid: i64,
    pub gid: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secondary_gids: Vec<i64>,
}

/// An access mapping as returned by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRecord {
    pub server_id: String,
    pub external_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_directory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_directory_type: Option<HomeDirectoryType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub home_directory_mappings: Vec<HomeDirectoryMapping>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posix_profile: Option<PosixProfile>,
}

/// Desired state handed to create and update calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessSpec {
    pub id: AccessId,
    pub role: String,
    pub home_directory: Option<String>,
    pub home_directory_type: Option<HomeDirectoryType>,
    pub home_directory_mappings: Vec<HomeDirectoryMapping>,
    pub policy: Option<String>,
    pub posix_profile: Option<PosixProfile>,
}

impl AccessSpec {
    /// A `PATH`-type mapping rooted at `home_directory`.
    #[must_use]
    pub fn with_path(id: AccessId, role: impl Into<String>, home_directory: impl Into<String>) -> Self {
        Self {
            id,
            role: role.into(),
            home_directory: Some(home_directory.into()),
            home_directory_type: Some(HomeDirectoryType::Path),
            home_directory_mappings: Vec::new(),
            policy: None,
            posix_profile: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_directory_type_wire_values() {
        assert_eq!(HomeDirectoryType::Path.as_str(), "PATH");
        assert_eq!(HomeDirectoryType::from_wire("LOGICAL"), Some(HomeDirectoryType::Logical));
        assert_eq!(HomeDirectoryType::from_wire("path"), None);
    }

    #[test]
    fn test_access_record_json_omits_empty_fields() {
        let record = AccessRecord {
            server_id: "s-0123456789abcdef0".to_string(),
            external_id: "S-1-1-12-1234567890-123456789-1234567890-1234".to_string(),
            home_directory: Some("/bucket/".to_string()),
            home_directory_type: Some(HomeDirectoryType::Path),
            home_directory_mappings: vec![],
            role: None,
            policy: None,
            posix_profile: None,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["home_directory_type"], "PATH");
        assert!(json.get("role").is_none());
        assert!(json.get("home_directory_mappings").is_none());
    }
}
