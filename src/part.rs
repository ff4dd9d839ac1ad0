use std::sync::LazyLock;

use memchr::memmem;
use tracing::trace;

use crate::boundary::Boundary;
use crate::error::ParseError;
use crate::header::{parse_header_line, HeaderLine};
use crate::types::Part;

static CRLF: LazyLock<memmem::Finder<'static>> = LazyLock::new(|| memmem::Finder::new(b"\r\n"));

/// Parse one part of a fully buffered `multipart/form-data` body, scanning
/// from `from`.
///
/// Returns the part and the offset the next part's boundary line starts at,
/// or `None` when the located delimiter was the terminal one (`--` suffix).
/// The returned part borrows its payload from `body`.
pub fn parse_part<'a>(
    boundary: &Boundary,
    body: &'a [u8],
    from: usize,
) -> Result<(Part<'a>, Option<usize>), ParseError> {
    let delim = boundary.delimiter();
    let tail = body.get(from..).ok_or(ParseError::BoundaryNotFound)?;

    // Locate this part's boundary line.
    let found = memmem::find(tail, delim).ok_or(ParseError::BoundaryNotFound)?;
    let mut cur = from + found + delim.len();

    // Boundary line MUST end with CRLF.
    if !body[cur..].starts_with(b"\r\n") {
        return Err(ParseError::MalformedBoundaryLine);
    }
    cur += 2;

    // Header block: one line per iteration, terminated by an empty line.
    let mut name = String::new();
    let mut filename = String::new();
    let mut content_type = String::new();
    let mut has_disposition = false;

    loop {
        let line_len = CRLF.find(&body[cur..]).ok_or(ParseError::InvalidHeaderField)?;
        if line_len == 0 {
            // Empty line: headers done, payload starts after its CRLF.
            cur += 2;
            break;
        }
        match parse_header_line(&body[cur..cur + line_len + 2])? {
            HeaderLine::ContentDisposition {
                name: n,
                filename: f,
            } => {
                name = n;
                filename = f;
                has_disposition = true;
            }
            HeaderLine::ContentType(ct) => content_type = ct,
            HeaderLine::Other => {}
        }
        cur += line_len + 2;
    }

    // The content disposition field MUST be included.
    if !has_disposition {
        return Err(ParseError::MissingContentDisposition);
    }

    // Payload runs up to CRLF followed by the next delimiter occurrence.
    let closing = memmem::find(&body[cur..], delim).ok_or(ParseError::BoundaryNotFound)?;
    if closing < 2 || &body[cur + closing - 2..cur + closing] != b"\r\n" {
        return Err(ParseError::MissingDataTerminator);
    }
    let data = &body[cur..cur + closing - 2];

    // After the delimiter: `--` closes the stream, CRLF opens the next
    // part's boundary line, anything else (including a body ending flush
    // with the delimiter) is malformed.
    let after = cur + closing + delim.len();
    let next = if body[after..].starts_with(b"--") {
        None
    } else if body[after..].starts_with(b"\r\n") {
        Some(cur + closing - 2)
    } else {
        return Err(ParseError::MalformedBoundaryLine);
    };

    trace!(
        name = %name,
        bytes = data.len(),
        terminal = next.is_none(),
        "framed part"
    );

    Ok((
        Part {
            name,
            filename,
            content_type,
            data,
        },
        next,
    ))
}

/// Lazy iteration over all parts of a body, front to back.
///
/// Threads the continuation offset between [`parse_part`] calls; fuses
/// after the terminal boundary or the first error.
pub struct PartIterator<'a> {
    boundary: &'a Boundary,
    body: &'a [u8],
    offset: Option<usize>,
}

impl<'a> PartIterator<'a> {
    pub fn new(boundary: &'a Boundary, body: &'a [u8]) -> Self {
        PartIterator {
            boundary,
            body,
            offset: Some(0),
        }
    }
}

impl<'a> Iterator for PartIterator<'a> {
    type Item = Result<Part<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        let from = self.offset?;
        match parse_part(self.boundary, self.body, from) {
            Ok((part, next)) => {
                self.offset = next;
                Some(Ok(part))
            }
            Err(e) => {
                self.offset = None;
                Some(Err(e))
            }
        }
    }
}
