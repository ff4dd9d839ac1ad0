pub mod boundary;
pub mod error;
pub mod header;
pub mod part;
pub mod types;

pub use boundary::Boundary;
pub use error::ParseError;
pub use header::HeaderLine;
pub use part::{parse_part, PartIterator};
pub use types::*;
