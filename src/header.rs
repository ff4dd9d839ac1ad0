use std::sync::LazyLock;

use memchr::memmem;
use tracing::debug;

use crate::error::ParseError;
use crate::types::{bounded_string, MAX_CONTENT_TYPE_LEN, MAX_FILENAME_LEN, MAX_NAME_LEN};

static CRLF: LazyLock<memmem::Finder<'static>> = LazyLock::new(|| memmem::Finder::new(b"\r\n"));

const CONTENT_DISPOSITION: &[u8] = b"Content-Disposition";
const CONTENT_TYPE: &[u8] = b"Content-Type";
// The colon is part of the marker: the disposition value must start with
// ` form-data` and carry a quoted name parameter.
const FORMDATA_NAME_MARKER: &[u8] = b": form-data; name=\"";
const FILENAME_MARKER: &[u8] = b"; filename=\"";

/// Effect of one header line on the part being assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderLine {
    /// `Content-Disposition: form-data; name="..."`, optionally with a
    /// `filename="..."` parameter (empty when absent).
    ContentDisposition { name: String, filename: String },
    ContentType(String),
    /// Unknown header, tolerated and ignored.
    Other,
}

/// Parse one header line of a part, CRLF terminator included.
///
/// Splits at the first `:`; only `Content-Disposition` and `Content-Type`
/// (exact match) are interpreted, anything else is [`HeaderLine::Other`].
/// Extracted values are silently truncated to their bounded lengths.
pub fn parse_header_line(line: &[u8]) -> Result<HeaderLine, ParseError> {
    let colon = memchr::memchr(b':', line).ok_or(ParseError::InvalidHeaderField)?;
    if colon == 0 {
        return Err(ParseError::InvalidHeaderField);
    }

    let field = &line[..colon];
    if field == CONTENT_DISPOSITION {
        parse_content_disposition(&line[colon..])
    } else if field == CONTENT_TYPE {
        parse_content_type(&line[colon + 1..])
    } else {
        debug!(field = %String::from_utf8_lossy(field), "ignoring header");
        Ok(HeaderLine::Other)
    }
}

/// `rest` starts at the `:` separator.
fn parse_content_disposition(rest: &[u8]) -> Result<HeaderLine, ParseError> {
    // The disposition MUST be form-data and MUST carry a name parameter.
    let marker = memmem::find(rest, FORMDATA_NAME_MARKER)
        .ok_or(ParseError::InvalidContentDisposition)?;
    let rest = &rest[marker + FORMDATA_NAME_MARKER.len()..];

    // Name parameter ends at the closing quote.
    let quote = memchr::memchr(b'"', rest).ok_or(ParseError::InvalidContentDisposition)?;
    let name = bounded_string(&rest[..quote], MAX_NAME_LEN);
    let rest = &rest[quote + 1..];

    // If the part is a file, the filename parameter SHOULD be present;
    // its absence is not an error.
    let filename = match memmem::find(rest, FILENAME_MARKER) {
        Some(pos) => {
            let rest = &rest[pos + FILENAME_MARKER.len()..];
            let quote =
                memchr::memchr(b'"', rest).ok_or(ParseError::InvalidContentDisposition)?;
            bounded_string(&rest[..quote], MAX_FILENAME_LEN)
        }
        None => String::new(),
    };

    Ok(HeaderLine::ContentDisposition { name, filename })
}

/// `rest` starts just after the `:` separator; the value runs to the CRLF.
fn parse_content_type(rest: &[u8]) -> Result<HeaderLine, ParseError> {
    let end = CRLF.find(rest).ok_or(ParseError::InvalidContentTypeField)?;
    let value = trim_leading(&rest[..end]);
    Ok(HeaderLine::ContentType(bounded_string(
        value,
        MAX_CONTENT_TYPE_LEN,
    )))
}

fn trim_leading(b: &[u8]) -> &[u8] {
    let start = b
        .iter()
        .position(|&c| c != b' ' && c != b'\t')
        .unwrap_or(b.len());
    &b[start..]
}
