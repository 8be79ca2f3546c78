//! Code generator for Marklar.
//!
//! Walks a parsed [`Program`] and emits IR through a [`Builder`]. Symbol
//! errors (unknown identifiers, unknown callees, arity mismatches) are
//! reported and emission keeps going with a null handle; such modules are
//! rejected later by verification.
mod symbol;

pub use self::symbol::{mangle, SymbolTable, RETVAL, RETVAL_BLOCK};

use log::{debug, error};

use crate::{
    ast::{
        Assignment, Atom, BinaryExpr, BinaryOp, Call, Decl, Expression, Function, If, Program,
        Return, Statement, WhileLoop,
    },
    ir::{verify_function, BinOp, BlockId, Builder, FuncId, Value},
};

/// Tree-walking code generator.
///
/// Lexical scoping works by copying the generator at scope entry: a child
/// generator emits through the same builder but owns a snapshot of the
/// symbol table, so bindings made inside a nested block do not leak out.
pub struct CodeGenerator<'build> {
    builder: &'build mut Builder,
    symbols: SymbolTable,
    current: Option<FuncId>,
}

impl<'build> CodeGenerator<'build> {
    pub fn new(builder: &'build mut Builder) -> CodeGenerator<'build> {
        CodeGenerator {
            builder,
            symbols: SymbolTable::default(),
            current: None,
        }
    }

    /// Emit every function of a program into the module.
    pub fn gen_program(&mut self, program: &Program) {
        for function in program.functions() {
            self.gen_function(function);
        }
    }

    fn child(&mut self) -> CodeGenerator<'_> {
        CodeGenerator {
            builder: &mut *self.builder,
            symbols: self.symbols.clone(),
            current: self.current,
        }
    }

    fn function(&self) -> FuncId {
        self.current.expect("statement outside of a function")
    }

    fn mangled(&self, ident: &str) -> String {
        let func = self.function();
        mangle(&self.builder.module().function(func).name, ident)
    }

    pub fn gen_function(&mut self, function: &Function) {
        let func = match self.symbols.get(&function.name).copied() {
            Some(Value::Func(func)) => func,
            _ => {
                let func = self
                    .builder
                    .declare_function(&function.name, function.params.len());
                self.symbols.insert(function.name.clone(), Value::Func(func));
                func
            }
        };
        self.current = Some(func);

        let entry = self.builder.entry_block(func);
        self.builder.set_insert_point(entry);

        // The return slot defaults to zero, so a body that never reaches an
        // explicit return still yields a defined value.
        let retval = self.builder.alloca_i64(func, RETVAL);
        let zero = self.builder.const_i64(0);
        self.builder.store_i64(zero, retval);
        self.symbols.insert(RETVAL.to_owned(), retval);

        // Created now, appended last: the unique return block.
        let return_block = self.builder.new_block(func, "return");
        self.symbols
            .insert(RETVAL_BLOCK.to_owned(), Value::Block(return_block));

        // Parameters bind directly to their argument values; no alloca.
        for (index, param) in function.params.iter().enumerate() {
            let mangled = mangle(&function.name, param);
            self.builder.set_param_name(func, index, &mangled);
            self.symbols.insert(mangled, Value::Arg(func, index));
        }

        {
            let mut scope = self.child();

            for decl in &function.decls {
                scope.gen_decl(decl);
            }

            for statement in &function.body {
                match scope.gen_statement(statement) {
                    // All paths of the statement branched away; anything
                    // after it is unreachable.
                    None => break,
                    // A failed statement stops emission; the block stays
                    // unterminated and verification rejects the module.
                    Some(Value::Null) => break,
                    Some(value) if scope.builder.is_terminator(value) => break,
                    Some(_) => {}
                }
            }
        }

        self.builder.append_block(return_block);
        self.builder.set_insert_point(return_block);
        let loaded = self.builder.load_i64(retval);
        self.builder.ret(loaded);

        if let Err(error) = verify_function(self.builder.module(), func) {
            debug!("function '{}' failed verification: {error}", function.name);
        }
    }

    fn gen_statement(&mut self, statement: &Statement) -> Option<Value> {
        match statement {
            Statement::Decl(decl) => Some(self.gen_decl(decl)),
            Statement::Assign(assignment) => Some(self.gen_assignment(assignment)),
            Statement::If(if_statement) => self.gen_if(if_statement),
            Statement::While(while_loop) => Some(self.gen_while(while_loop)),
            Statement::Return(ret) => Some(self.gen_return(ret)),
            Statement::Call(call) => Some(self.gen_call(call)),
        }
    }

    fn gen_expression(&mut self, expression: &Expression) -> Value {
        match expression {
            Expression::Atom(atom) => self.gen_atom(atom),
            Expression::Binary(binary) => self.gen_binary(binary),
            Expression::Call(call) => self.gen_call(call),
        }
    }

    fn gen_decl(&mut self, decl: &Decl) -> Value {
        let mangled = self.mangled(&decl.name);

        let slot = match self.symbols.get(&mangled).copied() {
            Some(value) => value,
            None => {
                let func = self.function();
                let slot = self.builder.alloca_i64(func, &mangled);
                self.symbols.insert(mangled, slot);
                slot
            }
        };

        let Some(init) = &decl.init else {
            return slot;
        };

        let value = self.gen_expression(init);
        if value == Value::Null {
            // The failed initializer already reported; leave the slot alone.
            return slot;
        }

        let value = if self.builder.is_pointer(value) {
            self.builder.load_i64(value)
        } else {
            value
        };
        self.builder.store_i64(value, slot);

        slot
    }

    fn gen_atom(&mut self, atom: &Atom) -> Value {
        let mangled = self.mangled(&atom.text);

        if let Some(value) = self.symbols.get(&mangled).copied() {
            // Only stack slots need a load; parameters and other handles are
            // used as-is.
            return if self.builder.is_pointer(value) {
                self.builder.load_i64(value)
            } else {
                value
            };
        }

        if atom.is_number() {
            return match atom.text.parse::<i64>() {
                Ok(number) => self.builder.const_i64(number),
                Err(_) => {
                    error!("Integer literal '{}' does not fit into 64 bits", atom.text);
                    Value::Null
                }
            };
        }

        error!("Could not find symbol '{}'", atom.text);
        debug!("Symbol table has {} entries", self.symbols.len());
        Value::Null
    }

    fn gen_binary(&mut self, binary: &BinaryExpr) -> Value {
        let mut lhs = self.gen_expression(&binary.lhs);

        // The chain folds strictly left to right: for "1 + 3 + i", lhs is
        // built up once per operation.
        for operation in &binary.ops {
            let rhs = self.gen_expression(&operation.rhs);
            lhs = self.builder.bin(bin_op(operation.op), lhs, rhs);
        }

        lhs
    }

    fn gen_if(&mut self, if_statement: &If) -> Option<Value> {
        let func = self.function();
        let cond = self.gen_binary(&if_statement.condition);

        let then_block = self.builder.new_block(func, "if.then");
        self.builder.append_block(then_block);
        let else_block = self.builder.new_block(func, "if.else");
        let merge_block = self.builder.new_block(func, "if.end");

        self.builder.cond_br(cond, then_block, else_block);

        self.builder.set_insert_point(then_block);
        let then_terminated = self.gen_scoped_body(&if_statement.then_body, merge_block);

        self.builder.append_block(else_block);
        self.builder.set_insert_point(else_block);
        let else_terminated = self.gen_scoped_body(&if_statement.else_body, merge_block);

        // When both branches terminated there is no fall-through; the merge
        // block stays detached and the caller stops emitting siblings.
        if then_terminated && else_terminated {
            return None;
        }

        self.builder.append_block(merge_block);
        self.builder.set_insert_point(merge_block);
        Some(Value::Block(merge_block))
    }

    fn gen_while(&mut self, while_loop: &WhileLoop) -> Value {
        let func = self.function();

        let body_block = self.builder.new_block(func, "while.body");
        let after_block = self.builder.new_block(func, "while.end");
        let cond_block = self.builder.new_block(func, "while.cond");
        self.builder.append_block(cond_block);

        self.builder.br(cond_block);
        self.builder.set_insert_point(cond_block);
        let cond = self.gen_binary(&while_loop.condition);
        self.builder.cond_br(cond, body_block, after_block);

        self.builder.append_block(body_block);
        self.builder.set_insert_point(body_block);
        self.gen_scoped_body(&while_loop.body, cond_block);

        self.builder.append_block(after_block);
        self.builder.set_insert_point(after_block);
        Value::Block(after_block)
    }

    /// Emit a nested block body through a child generator. Returns whether
    /// the body produced a terminator; if it did not, a branch to `next`
    /// closes the current block.
    fn gen_scoped_body(&mut self, body: &[Statement], next: BlockId) -> bool {
        let mut terminated = false;

        {
            let mut scope = self.child();
            for statement in body {
                match scope.gen_statement(statement) {
                    None => {
                        terminated = true;
                        break;
                    }
                    // A failed statement also leaves the block open; no
                    // branch gets emitted and verification rejects it.
                    Some(Value::Null) => {
                        terminated = true;
                        break;
                    }
                    Some(value) if scope.builder.is_terminator(value) => {
                        terminated = true;
                        break;
                    }
                    Some(_) => {}
                }
            }
        }

        if !terminated {
            self.builder.br(next);
        }
        terminated
    }

    fn gen_return(&mut self, ret: &Return) -> Value {
        // A return may sit inside an if or loop body where an inline `ret`
        // would be a second terminator; it lowers to a store into the return
        // slot plus a branch to the unique return block instead.
        let value = self.gen_expression(&ret.value);

        let Some(slot) = self.symbols.get(RETVAL).copied() else {
            unreachable!("return outside of a function");
        };
        self.builder.store_i64(value, slot);

        let Some(Value::Block(return_block)) = self.symbols.get(RETVAL_BLOCK).copied() else {
            unreachable!("return outside of a function");
        };
        self.builder.br(return_block)
    }

    fn gen_call(&mut self, call: &Call) -> Value {
        // Callees resolve by bare name in the module, not in the mangled
        // symbol table.
        let Some(callee) = self.builder.get_function(&call.callee) else {
            error!(
                "Could not find function definition for '{}'",
                call.callee
            );
            return Value::Null;
        };

        let expected = self.builder.param_count(callee);
        if expected != call.args.len() {
            error!(
                "Function '{}' expected {expected} arguments, but got {}",
                call.callee,
                call.args.len()
            );
            return Value::Null;
        }

        let mut args = vec![];
        for arg in &call.args {
            args.push(self.gen_expression(arg));
        }

        self.builder.call(callee, args)
    }

    fn gen_assignment(&mut self, assignment: &Assignment) -> Value {
        let value = self.gen_expression(&assignment.value);

        let mangled = self.mangled(&assignment.name);
        let Some(slot) = self.symbols.get(&mangled).copied() else {
            error!("Unknown variable assignment '{}'", assignment.name);
            return Value::Null;
        };

        let value = if self.builder.is_pointer(value) {
            self.builder.load_i64(value)
        } else {
            value
        };
        self.builder.store_i64(value, slot)
    }
}

// `&&` and `||` are deliberately bitwise, not short-circuiting; both
// operands are always evaluated.
fn bin_op(op: BinaryOp) -> BinOp {
    match op {
        BinaryOp::Plus => BinOp::Add,
        BinaryOp::Minus => BinOp::Sub,
        BinaryOp::Times => BinOp::Mul,
        BinaryOp::DividedBy => BinOp::SDiv,
        BinaryOp::Modulo => BinOp::SRem,
        BinaryOp::LessThan => BinOp::Slt,
        BinaryOp::LessOrEqual => BinOp::Sle,
        BinaryOp::GreaterThan => BinOp::Sgt,
        BinaryOp::GreaterOrEqual => BinOp::Sge,
        BinaryOp::Equal => BinOp::Eq,
        BinaryOp::NotEqual => BinOp::Ne,
        BinaryOp::BitwiseAnd | BinaryOp::LogicalAnd => BinOp::And,
        BinaryOp::LogicalOr => BinOp::Or,
        BinaryOp::ShiftLeft => BinOp::Shl,
        BinaryOp::ShiftRight => BinOp::LShr,
    }
}
