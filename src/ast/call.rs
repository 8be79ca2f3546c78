use pest::iterators::Pair;

use super::{Expression, Rule};

/// A call of a top-level function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub callee: String,
    pub args: Vec<Expression>,
}

impl Call {
    pub fn from_pair(pair: Pair<Rule>) -> Call {
        assert_eq!(pair.as_rule(), Rule::call);

        let mut inner = pair.into_inner();

        let callee = inner.next().unwrap().as_str().to_owned();
        let args = inner.map(Expression::from_pair).collect();

        Call { callee, args }
    }
}
