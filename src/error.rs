use std::fmt;

/// Terminal parse failures. Every structural violation aborts the current
/// part; there is no partial Part and no recovery within a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// No `boundary=` parameter in the header, or no delimiter occurrence
    /// in the body region being scanned.
    BoundaryNotFound,
    /// A delimiter occurrence is not followed by CRLF (or, at the end of a
    /// part, by neither CRLF nor the terminal `--`).
    MalformedBoundaryLine,
    /// A header line without a `:` separator, or a header block that is
    /// never closed by an empty line.
    InvalidHeaderField,
    /// A `Content-Disposition` line without the mandatory
    /// `form-data; name="..."` structure.
    InvalidContentDisposition,
    /// A `Content-Type` line without a terminating CRLF.
    InvalidContentTypeField,
    /// The part's header block has no `Content-Disposition` line at all.
    MissingContentDisposition,
    /// The payload is not closed by CRLF immediately before the next
    /// delimiter occurrence.
    MissingDataTerminator,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::BoundaryNotFound => f.write_str("boundary not found"),
            ParseError::MalformedBoundaryLine => {
                f.write_str("boundary line not terminated by CRLF")
            }
            ParseError::InvalidHeaderField => f.write_str("invalid header field"),
            ParseError::InvalidContentDisposition => {
                f.write_str("invalid content disposition field")
            }
            ParseError::InvalidContentTypeField => f.write_str("invalid content type field"),
            ParseError::MissingContentDisposition => {
                f.write_str("content disposition is missing")
            }
            ParseError::MissingDataTerminator => {
                f.write_str("missing CRLF before closing boundary")
            }
        }
    }
}

impl std::error::Error for ParseError {}
