use pest::iterators::Pair;

use super::Rule;

/// A leaf of an expression: either an identifier or an unsigned decimal
/// integer literal. Which one it is gets decided downstream by
/// [`Atom::is_number`]; the parser keeps the raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atom {
    pub text: String,
}

impl Atom {
    pub fn new(text: impl ToString) -> Atom {
        Atom {
            text: text.to_string(),
        }
    }

    pub fn from_pair(pair: Pair<Rule>) -> Atom {
        assert!(matches!(pair.as_rule(), Rule::ident | Rule::intLiteral));

        Atom {
            text: pair.as_str().to_owned(),
        }
    }

    /// Whether this atom consists entirely of digits, i.e., is an integer
    /// literal rather than an identifier.
    pub fn is_number(&self) -> bool {
        !self.text.is_empty() && self.text.chars().all(|c| c.is_ascii_digit())
    }
}
