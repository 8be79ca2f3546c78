use pest::iterators::Pair;

use super::{BinaryOp, Expression, Rule};

/// A chained operator expression: a left-hand side followed by an ordered
/// list of operator/right-hand-side pairs.
///
/// There is no precedence; the chain is folded strictly left to right, so
/// `a + b * c` means `((a + b) * c)`. An empty chain degenerates to the
/// left-hand side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryExpr {
    pub lhs: Box<Expression>,
    pub ops: Vec<Operation>,
}

/// One link of an operator chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub op: BinaryOp,
    pub rhs: Expression,
}

impl BinaryExpr {
    pub fn from_pair(pair: Pair<Rule>) -> BinaryExpr {
        assert_eq!(pair.as_rule(), Rule::opExpr);

        let mut inner = pair.into_inner();

        let lhs = Expression::from_pair(inner.next().unwrap());

        let mut ops = vec![];
        while let Some(op_pair) = inner.next() {
            let op = BinaryOp::from_pair(&op_pair);
            let rhs = Expression::from_pair(inner.next().unwrap());
            ops.push(Operation { op, rhs });
        }

        BinaryExpr {
            lhs: Box::new(lhs),
            ops,
        }
    }
}
