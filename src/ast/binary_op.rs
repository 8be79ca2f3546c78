use std::fmt::Display;

use pest::iterators::Pair;

use super::Rule;

/// Binary operators of the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Plus,
    Minus,
    Times,
    DividedBy,
    Modulo,
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
    Equal,
    NotEqual,
    BitwiseAnd,
    LogicalAnd,
    LogicalOr,
    ShiftLeft,
    ShiftRight,
}

impl BinaryOp {
    pub fn from_pair(pair: &Pair<Rule>) -> BinaryOp {
        assert_eq!(pair.as_rule(), Rule::op);

        match pair.as_str() {
            "+" => BinaryOp::Plus,
            "-" => BinaryOp::Minus,
            "*" => BinaryOp::Times,
            "/" => BinaryOp::DividedBy,
            "%" => BinaryOp::Modulo,
            "<" => BinaryOp::LessThan,
            "<=" => BinaryOp::LessOrEqual,
            ">" => BinaryOp::GreaterThan,
            ">=" => BinaryOp::GreaterOrEqual,
            "==" => BinaryOp::Equal,
            "!=" => BinaryOp::NotEqual,
            "&" => BinaryOp::BitwiseAnd,
            "&&" => BinaryOp::LogicalAnd,
            "||" => BinaryOp::LogicalOr,
            "<<" => BinaryOp::ShiftLeft,
            ">>" => BinaryOp::ShiftRight,
            op => unreachable!("unexpected binary operator '{op}'"),
        }
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let op = match self {
            BinaryOp::Plus => "+",
            BinaryOp::Minus => "-",
            BinaryOp::Times => "*",
            BinaryOp::DividedBy => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::LessThan => "<",
            BinaryOp::LessOrEqual => "<=",
            BinaryOp::GreaterThan => ">",
            BinaryOp::GreaterOrEqual => ">=",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::BitwiseAnd => "&",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::LogicalOr => "||",
            BinaryOp::ShiftLeft => "<<",
            BinaryOp::ShiftRight => ">>",
        };
        f.write_str(op)
    }
}
