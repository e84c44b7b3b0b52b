//! Lookup and mutation of remote access mappings.
//!
//! Check functions only depend on these traits, so they can run against the
//! live Transfer API or an in-memory fake.

use async_trait::async_trait;
use thiserror::Error;

use crate::aws::AwsError;
use crate::id::{AccessId, IdError};
use crate::model::{AccessRecord, AccessSpec};

/// Errors from the remote access collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FinderError {
    /// The mapping does not exist (or the service returned no payload)
    #[error("Transfer Access ({server_id}/{external_id}) not found")]
    NotFound {
        server_id: String,
        external_id: String,
    },

    /// Any other failure reported by AWS
    #[error(transparent)]
    Aws(#[from] AwsError),

    /// The service handed back parts that do not form a valid ID
    #[error(transparent)]
    Id(#[from] IdError),
}

impl FinderError {
    pub(crate) fn not_found(server_id: &str, external_id: &str) -> Self {
        Self::NotFound {
            server_id: server_id.to_string(),
            external_id: external_id.to_string(),
        }
    }
}

/// Returns true when the error means the remote mapping is gone.
pub fn is_not_found(err: &FinderError) -> bool {
    matches!(err, FinderError::NotFound { .. })
}

/// Reads access mappings.
#[async_trait]
pub trait AccessFinder: Send + Sync {
    /// Fetch the mapping addressed by `server_id` and `external_id`.
    async fn find_access(&self, server_id: &str, external_id: &str) -> Result<AccessRecord, FinderError>;

    /// Fetch the mapping addressed by an already decoded ID.
    async fn find_access_by_id(&self, id: &AccessId) -> Result<AccessRecord, FinderError> {
        self.find_access(id.server_id(), id.external_id()).await
    }
}

/// Creates, updates, and deletes access mappings.
#[async_trait]
pub trait AccessMutator: Send + Sync {
    /// Create the mapping and return the ID the service assigned.
    async fn create_access(&self, spec: &AccessSpec) -> Result<AccessId, FinderError>;

    /// Update the non-identifying attributes of an existing mapping.
    async fn update_access(&self, spec: &AccessSpec) -> Result<(), FinderError>;

    /// Delete the mapping; a missing mapping yields `FinderError::NotFound`.
    async fn delete_access(&self, id: &AccessId) -> Result<(), FinderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_not_found() {
        assert!(is_not_found(&FinderError::not_found("s-1", "S-1-1")));
        assert!(!is_not_found(&FinderError::Aws(AwsError::SdkError(
            "throttled".to_string()
        ))));
    }

    #[test]
    fn test_not_found_message_names_both_parts() {
        let err = FinderError::not_found("s-0123456789abcdef0", "S-1-1-12");
        assert_eq!(
            err.to_string(),
            "Transfer Access (s-0123456789abcdef0/S-1-1-12) not found"
        );
    }
}
