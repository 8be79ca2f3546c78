use pest::{iterators::Pairs, Parser};

use super::ParseError;

#[derive(Parser)]
#[grammar = "marklar.pest"]
pub struct MarklarParser;

impl MarklarParser {
    /// Parse a complete program, yielding the top-level function pairs.
    pub fn parse_program(program: &str) -> Result<Pairs<'_, Rule>, ParseError> {
        Self::parse(Rule::program, program).map_err(ParseError::from)
    }
}
