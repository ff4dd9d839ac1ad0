use std::fmt;

/// Max boundary is 70 chars (RFC 2046), counted on the full `--`-prefixed
/// delimiter.
pub const MAX_BOUNDARY_LEN: usize = 70;
pub const MAX_NAME_LEN: usize = 32;
pub const MAX_FILENAME_LEN: usize = 32;
pub const MAX_CONTENT_TYPE_LEN: usize = 64;

/// One part of a `multipart/form-data` body.
///
/// `name`, `filename` and `content_type` are bounded-length strings; values
/// longer than their cap are silently truncated. An empty `filename` means
/// the part is a plain form field, an empty `content_type` means the part
/// carried no `Content-Type` header. `data` borrows from the body buffer
/// the part was parsed out of; nothing is copied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part<'a> {
    pub name: String,
    pub filename: String,
    pub content_type: String,
    pub data: &'a [u8],
}

impl Part<'_> {
    pub fn is_file(&self) -> bool {
        !self.filename.is_empty()
    }
}

impl fmt::Display for Part<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "name={:?}", self.name)?;
        if !self.filename.is_empty() {
            write!(f, " filename={:?}", self.filename)?;
        }
        if !self.content_type.is_empty() {
            write!(f, " content-type={}", self.content_type)?;
        }
        write!(f, " ({} bytes)", self.data.len())
    }
}

/// Lossy-decode `bytes` and cap the result at `max` bytes, backing up to a
/// char boundary so multi-byte sequences are never split.
pub(crate) fn bounded_string(bytes: &[u8], max: usize) -> String {
    let mut s = String::from_utf8_lossy(bytes).into_owned();
    truncate_bounded(&mut s, max);
    s
}

pub(crate) fn truncate_bounded(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}
