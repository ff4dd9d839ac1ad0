use tracing::debug;

use crate::error::ParseError;
use crate::types::{truncate_bounded, MAX_BOUNDARY_LEN};

const BOUNDARY_PARAM: &str = "boundary=";

/// Per-request parse context: the canonical `--`-prefixed delimiter
/// extracted from the `Content-Type` header value. Built once, then shared
/// read-only across all part extractions for that request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundary {
    delim: String,
}

impl Boundary {
    /// Extract the boundary token from a raw `Content-Type` header value
    /// of the form `multipart/form-data; boundary=<token>`.
    ///
    /// The token ends at the next `;` or at the end of the value, with
    /// surrounding whitespace stripped; a double-quoted token is unquoted.
    /// The resulting delimiter is capped at [`MAX_BOUNDARY_LEN`] bytes,
    /// silently.
    pub fn from_content_type(header: &str) -> Result<Boundary, ParseError> {
        let idx = header.find(BOUNDARY_PARAM).ok_or(ParseError::BoundaryNotFound)?;
        let after = &header[idx + BOUNDARY_PARAM.len()..];

        let token = if let Some(quoted) = after.strip_prefix('"') {
            let end = quoted.find('"').ok_or(ParseError::BoundaryNotFound)?;
            &quoted[..end]
        } else {
            let end = after.find(';').unwrap_or(after.len());
            after[..end].trim()
        };

        if token.is_empty() {
            debug!(header, "boundary parameter present but empty");
            return Err(ParseError::BoundaryNotFound);
        }

        // The delimiter MUST carry the two-hyphen prefix.
        let mut delim = format!("--{token}");
        truncate_bounded(&mut delim, MAX_BOUNDARY_LEN);

        Ok(Boundary { delim })
    }

    /// Boundary token as given, used when the caller already isolated it.
    pub fn from_token(token: &str) -> Result<Boundary, ParseError> {
        if token.is_empty() {
            return Err(ParseError::BoundaryNotFound);
        }
        let mut delim = format!("--{token}");
        truncate_bounded(&mut delim, MAX_BOUNDARY_LEN);
        Ok(Boundary { delim })
    }

    pub fn delimiter(&self) -> &[u8] {
        self.delim.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.delim.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delim.is_empty()
    }
}
