use std::fmt::Display;

use pest::error::Error;

use super::Rule;

/// Struct representing an error which happened while parsing the code.
#[derive(Clone, Debug)]
pub struct ParseError {
    /// Error message of this parse error
    pub message: String,
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to parse program: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

impl From<Error<Rule>> for ParseError {
    fn from(error: Error<Rule>) -> Self {
        ParseError {
            message: error.variant.message().into_owned(),
        }
    }
}
