use pest::iterators::Pair;

use super::{Decl, Rule, Statement};

/// A single top-level function definition.
///
/// Leading variable declarations are kept apart from the executable body;
/// declarations appearing after the first non-declaration statement stay in
/// the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub params: Vec<String>,
    pub decls: Vec<Decl>,
    pub body: Vec<Statement>,
}

impl Function {
    pub fn from_pair(pair: Pair<Rule>) -> Function {
        assert_eq!(pair.as_rule(), Rule::function);

        let mut name = String::new();
        let mut params = vec![];
        let mut decls = vec![];
        let mut body = vec![];

        for pair in pair.into_inner() {
            match pair.as_rule() {
                Rule::marklarKw => {}
                Rule::ident => name = pair.as_str().to_owned(),
                Rule::param => params.push(Self::param_name(pair)),
                Rule::decl if body.is_empty() => decls.push(Decl::from_pair(pair)),
                _ => body.push(Statement::from_pair(pair)),
            }
        }

        Function {
            name,
            params,
            decls,
            body,
        }
    }

    fn param_name(pair: Pair<Rule>) -> String {
        assert_eq!(pair.as_rule(), Rule::param);

        pair.into_inner()
            .find(|inner| inner.as_rule() == Rule::ident)
            .map(|ident| ident.as_str().to_owned())
            .unwrap_or_default()
    }
}
