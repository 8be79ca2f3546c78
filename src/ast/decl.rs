use pest::iterators::Pair;

use super::{Expression, Rule};

/// A variable declaration, optionally with an initializer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decl {
    pub name: String,
    pub init: Option<Expression>,
}

impl Decl {
    pub fn from_pair(pair: Pair<Rule>) -> Decl {
        assert_eq!(pair.as_rule(), Rule::decl);

        let mut inner = pair
            .into_inner()
            .filter(|pair| pair.as_rule() != Rule::marklarKw);

        let name = inner.next().unwrap().as_str().to_owned();
        let init = inner.next().map(Expression::from_pair);

        Decl { name, init }
    }
}
