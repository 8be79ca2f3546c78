use pest::iterators::Pair;

use super::{Expression, Rule};

/// Assignment to a previously declared variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub name: String,
    pub value: Expression,
}

impl Assignment {
    pub fn from_pair(pair: Pair<Rule>) -> Assignment {
        assert_eq!(pair.as_rule(), Rule::assignment);

        let mut inner = pair.into_inner();

        let name = inner.next().unwrap().as_str().to_owned();
        let value = Expression::from_pair(inner.next().unwrap());

        Assignment { name, value }
    }
}
