use std::fmt;

/// Errors produced when parsing a value-tree path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathError {
    input: String,
    message: String,
}

impl PathError {
    pub(crate) fn new(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            message: message.into(),
        }
    }

    /// The path text that failed to parse.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid path '{}': {}", self.input, self.message)
    }
}

impl std::error::Error for PathError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = PathError::new("a..b", "expected path segment");
        assert_eq!(err.to_string(), "invalid path 'a..b': expected path segment");
        assert_eq!(err.input(), "a..b");
    }
}
