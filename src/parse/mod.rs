mod error;
mod grammar;
mod path;

pub use error::PathError;
pub use path::{Path, Segment};

/// Parse a dotted/indexed path string into a [`Path`].
///
/// # Errors
///
/// Returns [`PathError`] if the input is not a valid path.
pub fn parse(input: &str) -> Result<Path, PathError> {
    use winnow::Parser;
    grammar::parse_path
        .parse(input)
        .map_err(|e| PathError::new(input, e.to_string()))
}
