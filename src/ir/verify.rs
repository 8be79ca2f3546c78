//! Structural and type checks over a built module.
//!
//! Codegen symbol errors leave null handles behind instead of aborting;
//! verification is where such modules, and any malformed control flow, get
//! rejected before anything reaches the external backend.
use std::fmt::Display;

use super::{BlockId, FuncId, Inst, Module, Ty, Value};

/// Error describing why a module failed verification. The message carries
/// one line per problem found.
#[derive(Debug, Clone)]
pub struct VerifyError {
    pub message: String,
}

impl Display for VerifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for VerifyError {}

/// Verify every function of a module.
pub fn verify_module(module: &Module) -> Result<(), VerifyError> {
    let mut problems = vec![];

    for func in module.function_ids() {
        check_function(module, func, &mut problems);
    }

    collect(problems)
}

/// Verify a single function.
pub fn verify_function(module: &Module, func: FuncId) -> Result<(), VerifyError> {
    let mut problems = vec![];
    check_function(module, func, &mut problems);
    collect(problems)
}

fn collect(problems: Vec<String>) -> Result<(), VerifyError> {
    if problems.is_empty() {
        Ok(())
    } else {
        Err(VerifyError {
            message: problems.join("\n"),
        })
    }
}

fn check_function(module: &Module, func: FuncId, problems: &mut Vec<String>) {
    let function = module.function(func);

    // A function without blocks is an external declaration.
    for &block_id in function.blocks() {
        let block = module.block(block_id);
        let context = format!("block '{}' in function '{}'", block.label, function.name);

        match block.insts().split_last() {
            None => problems.push(format!("{context} is empty")),
            Some((&last, body)) => {
                if !module.inst(last).is_terminator() {
                    problems.push(format!("{context} has no terminator"));
                }
                if body.iter().any(|&id| module.inst(id).is_terminator()) {
                    problems.push(format!("{context} has more than one terminator"));
                }
            }
        }

        for &id in block.insts() {
            check_inst(module, func, &context, module.inst(id), problems);
        }
    }
}

fn check_inst(
    module: &Module,
    func: FuncId,
    context: &str,
    inst: &Inst,
    problems: &mut Vec<String>,
) {
    match inst {
        Inst::Load { ptr } => {
            check_operand(module, *ptr, Ty::Ptr, "load pointer", context, problems);
        }
        Inst::Store { value, ptr } => {
            check_operand(module, *value, Ty::I64, "stored value", context, problems);
            check_operand(module, *ptr, Ty::Ptr, "store pointer", context, problems);
        }
        Inst::Bin { op, lhs, rhs } => {
            let lhs_ty = module.value_type(*lhs);
            let rhs_ty = module.value_type(*rhs);
            if lhs_ty.is_none() || rhs_ty.is_none() {
                problems.push(format!("{context}: '{op:?}' uses a null operand"));
            } else if lhs_ty != rhs_ty {
                problems.push(format!(
                    "{context}: '{op:?}' operand types differ ({} vs {})",
                    lhs_ty.unwrap(),
                    rhs_ty.unwrap()
                ));
            } else if lhs_ty == Some(Ty::Ptr) {
                problems.push(format!("{context}: '{op:?}' expects integer operands"));
            }
        }
        Inst::Call { callee, args } => {
            let callee = module.function(*callee);
            if callee.param_count() != args.len() {
                problems.push(format!(
                    "{context}: call of '{}' expects {} arguments, but got {}",
                    callee.name,
                    callee.param_count(),
                    args.len()
                ));
            }
            for arg in args {
                check_operand(module, *arg, Ty::I64, "call argument", context, problems);
            }
        }
        Inst::Br { dest } => {
            check_target(module, func, *dest, context, problems);
        }
        Inst::CondBr {
            cond,
            then_dest,
            else_dest,
        } => {
            check_operand(module, *cond, Ty::I1, "branch condition", context, problems);
            check_target(module, func, *then_dest, context, problems);
            check_target(module, func, *else_dest, context, problems);
        }
        Inst::Ret { value } => {
            check_operand(module, *value, Ty::I64, "return value", context, problems);
        }
    }
}

fn check_operand(
    module: &Module,
    value: Value,
    expected: Ty,
    what: &str,
    context: &str,
    problems: &mut Vec<String>,
) {
    match module.value_type(value) {
        None => problems.push(format!("{context}: {what} is a null operand")),
        Some(ty) if ty != expected => {
            problems.push(format!("{context}: {what} has type {ty}, expected {expected}"))
        }
        Some(_) => {}
    }
}

fn check_target(
    module: &Module,
    func: FuncId,
    dest: BlockId,
    context: &str,
    problems: &mut Vec<String>,
) {
    if !module.function(func).blocks().contains(&dest) {
        problems.push(format!(
            "{context}: branch to block '{}' which is not attached to the function",
            module.block(dest).label
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::super::{BinOp, Builder, Value};
    use super::verify_module;

    #[test]
    fn valid_function_passes() {
        let mut builder = Builder::new("");
        let func = builder.declare_function("main", 0);
        let entry = builder.entry_block(func);
        builder.set_insert_point(entry);
        let zero = builder.const_i64(0);
        builder.ret(zero);

        assert!(verify_module(builder.module()).is_ok());
    }

    #[test]
    fn missing_terminator_is_rejected() {
        let mut builder = Builder::new("");
        let func = builder.declare_function("main", 0);
        let entry = builder.entry_block(func);
        builder.set_insert_point(entry);
        let slot = builder.alloca_i64(func, "main_i");
        let zero = builder.const_i64(0);
        builder.store_i64(zero, slot);

        let error = verify_module(builder.module()).unwrap_err();
        assert!(error.message.contains("has no terminator"));
    }

    #[test]
    fn two_terminators_are_rejected() {
        let mut builder = Builder::new("");
        let func = builder.declare_function("main", 0);
        let entry = builder.entry_block(func);
        builder.set_insert_point(entry);
        let zero = builder.const_i64(0);
        builder.ret(zero);
        builder.ret(zero);

        let error = verify_module(builder.module()).unwrap_err();
        assert!(error.message.contains("more than one terminator"));
    }

    #[test]
    fn null_operand_is_rejected() {
        let mut builder = Builder::new("");
        let func = builder.declare_function("main", 0);
        let entry = builder.entry_block(func);
        builder.set_insert_point(entry);
        builder.ret(Value::Null);

        let error = verify_module(builder.module()).unwrap_err();
        assert!(error.message.contains("null operand"));
    }

    #[test]
    fn integer_condition_is_rejected() {
        let mut builder = Builder::new("");
        let func = builder.declare_function("main", 0);
        let entry = builder.entry_block(func);
        let then_block = builder.new_block(func, "if.then");
        let else_block = builder.new_block(func, "if.else");
        builder.append_block(then_block);
        builder.append_block(else_block);

        builder.set_insert_point(entry);
        let lhs = builder.const_i64(1);
        let rhs = builder.const_i64(2);
        let sum = builder.bin(BinOp::Add, lhs, rhs);
        builder.cond_br(sum, then_block, else_block);

        let zero = builder.const_i64(0);
        builder.set_insert_point(then_block);
        builder.ret(zero);
        builder.set_insert_point(else_block);
        builder.ret(zero);

        let error = verify_module(builder.module()).unwrap_err();
        assert!(error.message.contains("branch condition has type i64"));
    }

    #[test]
    fn empty_block_is_rejected() {
        let mut builder = Builder::new("");
        let func = builder.declare_function("main", 0);
        let entry = builder.entry_block(func);
        builder.set_insert_point(entry);
        let zero = builder.const_i64(0);
        builder.ret(zero);

        let dangling = builder.new_block(func, "while.end");
        builder.append_block(dangling);

        let error = verify_module(builder.module()).unwrap_err();
        assert!(error.message.contains("is empty"));
    }
}
