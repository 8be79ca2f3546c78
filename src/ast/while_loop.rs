use pest::iterators::Pair;

use super::{BinaryExpr, Rule, Statement};

/// A while loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhileLoop {
    pub condition: BinaryExpr,
    pub body: Vec<Statement>,
}

impl WhileLoop {
    pub fn from_pair(pair: Pair<Rule>) -> WhileLoop {
        assert_eq!(pair.as_rule(), Rule::whileStmt);

        let mut inner = pair
            .into_inner()
            .filter(|pair| pair.as_rule() != Rule::whileKw);

        let condition = BinaryExpr::from_pair(inner.next().unwrap());
        let body = inner.map(Statement::from_pair).collect();

        WhileLoop { condition, body }
    }
}
