//! Composite identifier for Transfer Family access mappings.
//!
//! An access mapping is addressed by the pair of the Transfer server it belongs
//! to and the external (directory) identifier it grants access to. The pair is
//! stored as a single opaque token of the form `SERVER-ID/EXTERNAL-ID`.
//!
//! Decoding is strict: the token must split into exactly two non-empty parts.
//! Encoding refuses parts that would make the token ambiguous.

use std::fmt;
use std::str::FromStr;

use log::trace;
use thiserror::Error;

/// Separator between the server ID and the external ID.
pub const SEPARATOR: char = '/';

/// Errors produced while encoding or decoding an access identifier.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The token does not split into exactly two non-empty parts.
    #[error("unexpected format for ID ({id}), expected SERVER-ID/EXTERNAL-ID")]
    MalformedIdentifier {
        /// The offending token, verbatim
        id: String,
    },

    /// One of the parts handed to the encoder is empty or contains the separator.
    #[error("invalid {part} ({value}): must be non-empty and must not contain '/'")]
    InvalidPart {
        /// Which part was rejected
        part: &'static str,
        /// The rejected value
        value: String,
    },
}

impl IdError {
    /// Returns true if this error was raised while decoding a token.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedIdentifier { .. })
    }

    fn malformed(id: &str) -> Self {
        Self::MalformedIdentifier { id: id.to_string() }
    }
}

/// Join a server ID and an external ID into an access token.
pub fn encode(server_id: &str, external_id: &str) -> Result<String, IdError> {
    validate_part("server ID", server_id)?;
    validate_part("external ID", external_id)?;
    Ok(format!("{server_id}{SEPARATOR}{external_id}"))
}

/// Split an access token into `(server_id, external_id)`.
pub fn decode(id: &str) -> Result<(String, String), IdError> {
    let mut parts = id.splitn(3, SEPARATOR);
    let (Some(server_id), Some(external_id), None) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(IdError::malformed(id));
    };

    if server_id.is_empty() || external_id.is_empty() {
        return Err(IdError::malformed(id));
    }

    trace!("Decoded access ID {id:?} into server={server_id:?} external={external_id:?}");
    Ok((server_id.to_string(), external_id.to_string()))
}

fn validate_part(part: &'static str, value: &str) -> Result<(), IdError> {
    if value.is_empty() || value.contains(SEPARATOR) {
        return Err(IdError::InvalidPart {
            part,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Structured form of an access identifier.
///
/// Holds the two parts once a token has been validated, so callers never
/// re-split the string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccessId {
    server_id: String,
    external_id: String,
}

impl AccessId {
    /// Build an ID from its parts, rejecting parts that would not decode back.
    pub fn new(server_id: impl Into<String>, external_id: impl Into<String>) -> Result<Self, IdError> {
        let server_id = server_id.into();
        let external_id = external_id.into();
        validate_part("server ID", &server_id)?;
        validate_part("external ID", &external_id)?;
        Ok(Self {
            server_id,
            external_id,
        })
    }

    /// Parse an ID from its `SERVER-ID/EXTERNAL-ID` token.
    pub fn parse(id: &str) -> Result<Self, IdError> {
        let (server_id, external_id) = decode(id)?;
        Ok(Self {
            server_id,
            external_id,
        })
    }

    /// The Transfer server ID, e.g. `s-0123456789abcdef0`.
    #[must_use]
    pub fn server_id(&self) -> &str {
        &self.server_id
    }

    /// The external identity, e.g. a directory SID.
    #[must_use]
    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    /// Consume the ID and return its parts.
    #[must_use]
    pub fn into_parts(self) -> (String, String) {
        (self.server_id, self.external_id)
    }
}

impl fmt::Display for AccessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.server_id, self.external_id)
    }
}

impl FromStr for AccessId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl serde::Serialize for AccessId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for AccessId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SERVER_ID: &str = "s-0123456789abcdef0";
    const EXTERNAL_ID: &str = "S-1-1-12-1234567890-123456789-1234567890-1234";

    #[test]
    fn test_encode_known_pair() {
        let token = encode(SERVER_ID, EXTERNAL_ID).unwrap();
        assert_eq!(
            token,
            "s-0123456789abcdef0/S-1-1-12-1234567890-123456789-1234567890-1234"
        );

        let (server_id, external_id) = decode(&token).unwrap();
        assert_eq!(server_id, SERVER_ID);
        assert_eq!(external_id, EXTERNAL_ID);
    }

    #[test]
    fn test_encode_is_deterministic() {
        let first = encode("s-123", EXTERNAL_ID).unwrap();
        let second = encode("s-123", EXTERNAL_ID).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_decode_missing_separator() {
        let err = decode("noSeparatorHere").unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("noSeparatorHere"));
        assert!(err.to_string().contains("SERVER-ID/EXTERNAL-ID"));
    }

    #[test]
    fn test_decode_too_many_parts() {
        let err = decode("a/b/c").unwrap_err();
        assert_eq!(
            err,
            IdError::MalformedIdentifier {
                id: "a/b/c".to_string()
            }
        );
    }

    #[test]
    fn test_decode_empty_parts() {
        assert!(decode("/external").unwrap_err().is_malformed());
        assert!(decode("server/").unwrap_err().is_malformed());
        assert!(decode("/").unwrap_err().is_malformed());
        assert!(decode("").unwrap_err().is_malformed());
    }

    #[test]
    fn test_encode_rejects_separator_in_part() {
        let err = encode("s-1/2", EXTERNAL_ID).unwrap_err();
        assert!(matches!(err, IdError::InvalidPart { part: "server ID", .. }));

        let err = encode(SERVER_ID, "").unwrap_err();
        assert!(matches!(err, IdError::InvalidPart { part: "external ID", .. }));
    }

    #[test]
    fn test_access_id_display_and_parse() {
        let id = AccessId::new(SERVER_ID, EXTERNAL_ID).unwrap();
        let parsed: AccessId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert_eq!(parsed.server_id(), SERVER_ID);
        assert_eq!(parsed.external_id(), EXTERNAL_ID);
    }

    #[test]
    fn test_access_id_json_is_token() {
        let id = AccessId::new(SERVER_ID, EXTERNAL_ID).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{SERVER_ID}/{EXTERNAL_ID}\""));

        let bad: Result<AccessId, _> = serde_json::from_str("\"only-one-part\"");
        assert!(bad.is_err());
    }

    proptest! {
        #[test]
        fn prop_roundtrip(server_id in "[a-zA-Z0-9-]{1,24}", external_id in "[^/]{1,48}") {
            let token = encode(&server_id, &external_id).unwrap();
            prop_assert_eq!(decode(&token).unwrap(), (server_id, external_id));
        }
    }
}
