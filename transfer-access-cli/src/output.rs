use anyhow::{Context, Result};
use log::debug;
use serde::Serialize;
use std::io::{self, Write};

pub(crate) fn note(msg: &str) {
    let _ = writeln!(io::stderr(), "transfer-access: {}", msg);
}

pub(crate) fn warn(msg: &str) {
    let _ = writeln!(io::stderr(), "transfer-access (warning): {}", msg);
}

/// The two parts of a composite ID, as printed by `id parse`
#[derive(Debug, Clone, Serialize)]
pub(crate) struct IdParts<'a> {
    pub(crate) server_id: &'a str,
    pub(crate) external_id: &'a str,
}

/// Write `value` as JSON to stdout
pub(crate) fn output_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    debug!("Formatting output as JSON (pretty: {})", pretty);

    let json_output = if pretty {
        serde_json::to_string_pretty(value).context("Failed to serialize output to pretty JSON")?
    } else {
        serde_json::to_string(value).context("Failed to serialize output to JSON")?
    };

    let stdout = io::stdout();
    let mut w = stdout.lock();
    writeln!(w, "{}", json_output).context("Failed to write to stdout")?;
    Ok(())
}

/// Write a plain line to stdout
pub(crate) fn output_line(line: &str) -> Result<()> {
    writeln!(io::stdout(), "{}", line).context("Failed to write to stdout")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_parts_json_shape() {
        let parts = IdParts {
            server_id: "s-0123456789abcdef0",
            external_id: "S-1-1-12-1234567890-123456789-1234567890-1234",
        };
        assert_eq!(
            serde_json::to_string(&parts).unwrap(),
            r#"{"server_id":"s-0123456789abcdef0","external_id":"S-1-1-12-1234567890-123456789-1234567890-1234"}"#
        );
    }
}
