//! Module for parsing Marklar programs.
//!
//! It contains all structs for the internal representation of Marklar (i.e.,
//! the AST).
mod assignment;
mod atom;
mod binary_expr;
mod binary_op;
mod call;
mod decl;
mod expression;
mod function;
mod if_statement;
mod parse_error;
mod parser;
mod return_statement;
mod statement;
mod while_loop;

pub use self::assignment::*;
pub use self::atom::*;
pub use self::binary_expr::*;
pub use self::binary_op::*;
pub use self::call::*;
pub use self::decl::*;
pub use self::expression::*;
pub use self::function::*;
pub use self::if_statement::*;
pub use self::parse_error::*;
pub use self::parser::*;
pub use self::return_statement::*;
pub use self::statement::*;
pub use self::while_loop::*;

pub use self::parser::Rule;

/// AST representing a single Marklar program.
///
/// The root of a parse; its children are the top-level function definitions
/// in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    functions: Vec<Function>,
}

impl Program {
    /// Parse source text into a program AST.
    ///
    /// The entire input must be consumed; trailing text beyond the last
    /// function is a parse failure.
    pub fn parse(source: &str) -> Result<Program, ParseError> {
        let mut functions = vec![];

        for pair in MarklarParser::parse_program(source)? {
            if pair.as_rule() != Rule::EOI {
                functions.push(Function::from_pair(pair));
            }
        }

        Ok(Program { functions })
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }
}

#[cfg(test)]
mod tests {
    use super::{Atom, BinaryOp, Expression, Program, Statement};

    #[test]
    fn parse_empty_function() {
        let program = Program::parse("marklar main(){}").unwrap();

        assert_eq!(1, program.functions().len());

        let function = &program.functions()[0];
        assert_eq!("main", function.name);
        assert!(function.params.is_empty());
        assert!(function.decls.is_empty());
        assert!(function.body.is_empty());
    }

    #[test]
    fn parse_decls_in_order() {
        let program = Program::parse(
            "marklar main(){ marklar i = 1+2; marklar j = i+2; marklar k = i+j; }",
        )
        .unwrap();

        let function = &program.functions()[0];
        assert_eq!(
            vec!["i", "j", "k"],
            function
                .decls
                .iter()
                .map(|decl| decl.name.as_str())
                .collect::<Vec<_>>()
        );
        assert!(function.body.is_empty());

        let Some(Expression::Binary(init)) = &function.decls[0].init else {
            panic!("expected binary initializer");
        };
        assert_eq!(Expression::Atom(Atom::new("1")), *init.lhs);
        assert_eq!(1, init.ops.len());
        assert_eq!(BinaryOp::Plus, init.ops[0].op);
        assert_eq!(Expression::Atom(Atom::new("2")), init.ops[0].rhs);

        let Some(Expression::Binary(init)) = &function.decls[2].init else {
            panic!("expected binary initializer");
        };
        assert_eq!(Expression::Atom(Atom::new("i")), *init.lhs);
        assert_eq!(Expression::Atom(Atom::new("j")), init.ops[0].rhs);
    }

    #[test]
    fn parse_if_condition_shape() {
        let program = Program::parse("marklar main(){ if (i < 4) {} return 0; }").unwrap();

        let function = &program.functions()[0];
        let Statement::If(if_statement) = &function.body[0] else {
            panic!("expected if statement");
        };

        let condition = &if_statement.condition;
        assert_eq!(Expression::Atom(Atom::new("i")), *condition.lhs);
        assert_eq!(1, condition.ops.len());
        assert_eq!(BinaryOp::LessThan, condition.ops[0].op);
        assert_eq!(Expression::Atom(Atom::new("4")), condition.ops[0].rhs);
        assert!(if_statement.then_body.is_empty());
        assert!(if_statement.else_body.is_empty());
    }

    #[test]
    fn parse_flat_left_associative_chain() {
        // No precedence: a + b * c parses as ((a + b) * c).
        let program = Program::parse("marklar main(){ return a + b * c; }").unwrap();

        let function = &program.functions()[0];
        let Statement::Return(ret) = &function.body[0] else {
            panic!("expected return statement");
        };
        let Expression::Binary(binary) = &ret.value else {
            panic!("expected binary expression");
        };

        assert_eq!(Expression::Atom(Atom::new("a")), *binary.lhs);
        assert_eq!(
            vec![BinaryOp::Plus, BinaryOp::Times],
            binary
                .ops
                .iter()
                .map(|operation| operation.op)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn parse_decl_after_statement_lands_in_body() {
        let program =
            Program::parse("marklar main(){ marklar i = 0; i = 1; marklar j = 2; return j; }")
                .unwrap();

        let function = &program.functions()[0];
        assert_eq!(1, function.decls.len());
        assert_eq!(3, function.body.len());
        assert!(matches!(function.body[1], Statement::Decl(_)));
    }

    #[test]
    fn parse_call_arguments() {
        let program =
            Program::parse("marklar main(){ foo(); bar(1); baz(1, x, 2+3); return 0; }").unwrap();

        let function = &program.functions()[0];
        let args: Vec<usize> = function.body[..3]
            .iter()
            .map(|statement| match statement {
                Statement::Call(call) => call.args.len(),
                statement => panic!("expected call statement, got {statement:?}"),
            })
            .collect();
        assert_eq!(vec![0, 1, 3], args);
    }
}
