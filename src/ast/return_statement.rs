use pest::iterators::Pair;

use super::{Expression, Rule};

/// A return statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Return {
    pub value: Expression,
}

impl Return {
    pub fn from_pair(pair: Pair<Rule>) -> Return {
        assert_eq!(pair.as_rule(), Rule::returnStmt);

        let value = pair
            .into_inner()
            .find(|pair| pair.as_rule() != Rule::returnKw)
            .map(Expression::from_pair)
            .unwrap();

        Return { value }
    }
}
