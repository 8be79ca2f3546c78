use pest::iterators::Pair;

use super::{BinaryExpr, Rule, Statement};

/// A conditional statement with an optional else branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct If {
    pub condition: BinaryExpr,
    pub then_body: Vec<Statement>,
    pub else_body: Vec<Statement>,
}

impl If {
    pub fn from_pair(pair: Pair<Rule>) -> If {
        assert_eq!(pair.as_rule(), Rule::ifStmt);

        let mut inner = pair.into_inner();

        // The condition is the first pair after the keyword.
        let condition = loop {
            let pair = inner.next().unwrap();
            if pair.as_rule() == Rule::opExpr {
                break BinaryExpr::from_pair(pair);
            }
        };

        let mut then_body = vec![];
        let mut else_body = vec![];
        let mut in_else = false;

        for pair in inner {
            if pair.as_rule() == Rule::elseKw {
                in_else = true;
            } else if in_else {
                else_body.push(Statement::from_pair(pair));
            } else {
                then_body.push(Statement::from_pair(pair));
            }
        }

        If {
            condition,
            then_body,
            else_body,
        }
    }
}
