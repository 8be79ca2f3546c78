use pest::iterators::Pair;

use super::{Assignment, Call, Decl, If, Return, Rule, WhileLoop};

/// A single statement within a function body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Decl(Decl),
    Assign(Assignment),
    If(If),
    While(WhileLoop),
    Return(Return),
    Call(Call),
}

impl Statement {
    pub fn from_pair(pair: Pair<Rule>) -> Statement {
        match pair.as_rule() {
            Rule::decl => Statement::Decl(Decl::from_pair(pair)),
            Rule::assignment => Statement::Assign(Assignment::from_pair(pair)),
            Rule::ifStmt => Statement::If(If::from_pair(pair)),
            Rule::whileStmt => Statement::While(WhileLoop::from_pair(pair)),
            Rule::returnStmt => Statement::Return(Return::from_pair(pair)),
            Rule::call => Statement::Call(Call::from_pair(pair)),
            rule => unreachable!("unexpected statement '{rule:?}'"),
        }
    }
}
