use pest::iterators::Pair;

use super::{Atom, BinaryExpr, Call, Rule};

/// An expression producing a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    Atom(Atom),
    Binary(BinaryExpr),
    Call(Call),
}

impl Expression {
    pub fn from_pair(pair: Pair<Rule>) -> Expression {
        match pair.as_rule() {
            Rule::ident | Rule::intLiteral => Expression::Atom(Atom::from_pair(pair)),
            Rule::opExpr => Expression::Binary(BinaryExpr::from_pair(pair)),
            Rule::call => Expression::Call(Call::from_pair(pair)),
            rule => unreachable!("unexpected expression '{rule:?}'"),
        }
    }
}
