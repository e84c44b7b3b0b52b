use anyhow::{Context, Result};
use log::debug;

use crate::id::{encode, AccessId};

/// Parse an operator-supplied `SERVER-ID/EXTERNAL-ID`.
pub fn parse_access_id(id: &str) -> Result<AccessId> {
    let parsed = AccessId::parse(id).context("error parsing Transfer Access ID")?;
    debug!(
        "Parsed {id} into server_id={} external_id={}",
        parsed.server_id(),
        parsed.external_id()
    );
    Ok(parsed)
}

/// Join a server ID and an external ID.
pub fn format_access_id(server_id: &str, external_id: &str) -> Result<String> {
    encode(server_id, external_id).context("cannot build a Transfer Access ID")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_access_id_context() {
        let err = parse_access_id("s-0123456789abcdef0").unwrap_err();
        let chain = format!("{err:#}");
        assert!(chain.starts_with("error parsing Transfer Access ID: "));
        assert!(chain.contains("expected SERVER-ID/EXTERNAL-ID"));
    }

    #[test]
    fn test_format_access_id() {
        assert_eq!(format_access_id("s-1", "S-1-2").unwrap(), "s-1/S-1-2");
        assert!(format_access_id("s-1", "a/b").is_err());
    }
}
