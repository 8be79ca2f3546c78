//! In-memory intermediate representation handed to the external backend.
//!
//! The code generator only ever touches opaque handles ([`FuncId`],
//! [`BlockId`], [`Value`]) through a [`Builder`]; the module itself renders
//! as textual LLVM IR, which `opt` accepts in place of bitcode.
mod builder;
mod verify;

pub use self::builder::Builder;
pub use self::verify::{verify_function, verify_module, VerifyError};

use std::fmt::Display;
use std::io;
use std::path::Path;

/// Handle of a function within a [`Module`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FuncId(usize);

/// Handle of a basic block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(usize);

/// Handle of a stack slot created by `alloca`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(usize);

/// Handle of an emitted instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstId(usize);

/// An IR value handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    /// The null handle. Emission keeps going with it after a symbol error;
    /// any instruction using it is rejected by verification.
    Null,
    Const(i64),
    /// Parameter `usize` of a function.
    Arg(FuncId, usize),
    /// Pointer to a stack slot.
    Slot(SlotId),
    /// Result of an instruction.
    Inst(InstId),
    Func(FuncId),
    Block(BlockId),
}

/// Types a [`Value`] can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ty {
    I1,
    I64,
    Ptr,
}

impl Display for Ty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Ty::I1 => f.write_str("i1"),
            Ty::I64 => f.write_str("i64"),
            Ty::Ptr => f.write_str("ptr"),
        }
    }
}

/// Binary operations. Arithmetic and shifts are signed where it matters;
/// comparisons produce an `i1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    SDiv,
    SRem,
    Shl,
    LShr,
    And,
    Or,
    Slt,
    Sle,
    Sgt,
    Sge,
    Eq,
    Ne,
}

impl BinOp {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinOp::Slt | BinOp::Sle | BinOp::Sgt | BinOp::Sge | BinOp::Eq | BinOp::Ne
        )
    }

    fn mnemonic(self) -> &'static str {
        match self {
            BinOp::Add => "add",
            BinOp::Sub => "sub",
            BinOp::Mul => "mul",
            BinOp::SDiv => "sdiv",
            BinOp::SRem => "srem",
            BinOp::Shl => "shl",
            BinOp::LShr => "lshr",
            BinOp::And => "and",
            BinOp::Or => "or",
            BinOp::Slt => "icmp slt",
            BinOp::Sle => "icmp sle",
            BinOp::Sgt => "icmp sgt",
            BinOp::Sge => "icmp sge",
            BinOp::Eq => "icmp eq",
            BinOp::Ne => "icmp ne",
        }
    }
}

/// A single instruction.
#[derive(Debug, Clone)]
pub enum Inst {
    Load {
        ptr: Value,
    },
    Store {
        value: Value,
        ptr: Value,
    },
    Bin {
        op: BinOp,
        lhs: Value,
        rhs: Value,
    },
    Call {
        callee: FuncId,
        args: Vec<Value>,
    },
    Br {
        dest: BlockId,
    },
    CondBr {
        cond: Value,
        then_dest: BlockId,
        else_dest: BlockId,
    },
    Ret {
        value: Value,
    },
}

impl Inst {
    /// Whether this instruction ends a basic block.
    pub fn is_terminator(&self) -> bool {
        matches!(self, Inst::Br { .. } | Inst::CondBr { .. } | Inst::Ret { .. })
    }

    fn has_result(&self) -> bool {
        matches!(self, Inst::Load { .. } | Inst::Bin { .. } | Inst::Call { .. })
    }
}

/// A function: `i64` parameters, `i64` return type, stack slots, and blocks
/// in append order. A function without blocks is an external declaration.
#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    param_names: Vec<String>,
    blocks: Vec<BlockId>,
    slots: Vec<SlotId>,
}

impl Function {
    pub fn param_count(&self) -> usize {
        self.param_names.len()
    }

    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }

    pub fn slots(&self) -> &[SlotId] {
        &self.slots
    }
}

/// A straight-line instruction sequence; well-formed blocks end in exactly
/// one terminator.
#[derive(Debug, Clone)]
pub struct Block {
    pub label: String,
    func: FuncId,
    insts: Vec<InstId>,
}

impl Block {
    pub fn insts(&self) -> &[InstId] {
        &self.insts
    }
}

/// An `i64` stack slot living at the head of its function's entry block.
#[derive(Debug, Clone)]
pub struct Slot {
    pub name: String,
    func: FuncId,
}

/// An IR module owning all functions, blocks, slots, and instructions of a
/// single compilation.
#[derive(Debug, Clone, Default)]
pub struct Module {
    name: String,
    functions: Vec<Function>,
    blocks: Vec<Block>,
    slots: Vec<Slot>,
    insts: Vec<Inst>,
}

impl Module {
    pub fn new(name: impl ToString) -> Module {
        Module {
            name: name.to_string(),
            ..Module::default()
        }
    }

    pub fn get_function(&self, name: &str) -> Option<FuncId> {
        self.functions
            .iter()
            .position(|function| function.name == name)
            .map(FuncId)
    }

    pub fn function(&self, func: FuncId) -> &Function {
        &self.functions[func.0]
    }

    pub fn function_ids(&self) -> impl Iterator<Item = FuncId> {
        (0..self.functions.len()).map(FuncId)
    }

    pub fn block(&self, block: BlockId) -> &Block {
        &self.blocks[block.0]
    }

    pub fn slot(&self, slot: SlotId) -> &Slot {
        &self.slots[slot.0]
    }

    pub fn inst(&self, inst: InstId) -> &Inst {
        &self.insts[inst.0]
    }

    /// Type of a value, or `None` for the null handle and other values that
    /// have no first-class type.
    pub fn value_type(&self, value: Value) -> Option<Ty> {
        match value {
            Value::Null => None,
            Value::Const(_) => Some(Ty::I64),
            Value::Arg(..) => Some(Ty::I64),
            Value::Slot(_) => Some(Ty::Ptr),
            Value::Func(_) => Some(Ty::Ptr),
            Value::Block(_) => None,
            Value::Inst(id) => match self.inst(id) {
                Inst::Load { .. } => Some(Ty::I64),
                Inst::Call { .. } => Some(Ty::I64),
                Inst::Bin { op, .. } if op.is_comparison() => Some(Ty::I1),
                Inst::Bin { lhs, rhs, .. } => {
                    self.value_type(*lhs).or_else(|| self.value_type(*rhs))
                }
                _ => None,
            },
        }
    }

    pub fn is_terminator(&self, value: Value) -> bool {
        match value {
            Value::Inst(id) => self.inst(id).is_terminator(),
            _ => false,
        }
    }

    /// Whether a value is a pointer that must be dereferenced before use as
    /// an integer, i.e., a stack slot.
    pub fn is_pointer(&self, value: Value) -> bool {
        matches!(value, Value::Slot(_))
    }

    /// Write the rendered module to a file for the external backend.
    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        std::fs::write(path, self.to_string())
    }

    fn add_function(&mut self, name: &str, param_count: usize) -> FuncId {
        self.functions.push(Function {
            name: name.to_owned(),
            param_names: (0..param_count).map(|index| format!("arg{index}")).collect(),
            blocks: vec![],
            slots: vec![],
        });
        FuncId(self.functions.len() - 1)
    }

    fn set_param_name(&mut self, func: FuncId, index: usize, name: &str) {
        self.functions[func.0].param_names[index] = name.to_owned();
    }

    fn add_block(&mut self, func: FuncId, label: &str) -> BlockId {
        let taken: Vec<&str> = self
            .blocks
            .iter()
            .filter(|block| block.func == func)
            .map(|block| block.label.as_str())
            .collect();
        let label = unique_name(label, &taken);

        self.blocks.push(Block {
            label,
            func,
            insts: vec![],
        });
        BlockId(self.blocks.len() - 1)
    }

    fn append_block(&mut self, block: BlockId) {
        let func = self.blocks[block.0].func;
        self.functions[func.0].blocks.push(block);
    }

    fn add_slot(&mut self, func: FuncId, name: &str) -> SlotId {
        let taken: Vec<&str> = self
            .slots
            .iter()
            .filter(|slot| slot.func == func)
            .map(|slot| slot.name.as_str())
            .collect();
        let name = unique_name(name, &taken);

        self.slots.push(Slot { name, func });
        let slot = SlotId(self.slots.len() - 1);
        self.functions[func.0].slots.push(slot);
        slot
    }

    fn push_inst(&mut self, block: BlockId, inst: Inst) -> InstId {
        self.insts.push(inst);
        let id = InstId(self.insts.len() - 1);
        self.blocks[block.0].insts.push(id);
        id
    }

    fn render_value(&self, value: Value) -> String {
        match value {
            Value::Null => "<null>".to_owned(),
            Value::Const(n) => n.to_string(),
            Value::Arg(func, index) => format!("%{}", self.function(func).param_names[index]),
            Value::Slot(slot) => format!("%{}", self.slot(slot).name),
            Value::Inst(id) => format!("%t{}", id.0),
            Value::Func(func) => format!("@{}", self.function(func).name),
            Value::Block(block) => format!("%{}", self.block(block).label),
        }
    }

    fn render_typed(&self, value: Value) -> String {
        match self.value_type(value) {
            Some(ty) => format!("{ty} {}", self.render_value(value)),
            None => format!("i64 {}", self.render_value(value)),
        }
    }

    fn render_inst(&self, id: InstId) -> String {
        let inst = self.inst(id);
        let result = if inst.has_result() {
            format!("%t{} = ", id.0)
        } else {
            String::new()
        };

        let body = match inst {
            Inst::Load { ptr } => format!("load i64, ptr {}", self.render_value(*ptr)),
            Inst::Store { value, ptr } => format!(
                "store {}, ptr {}",
                self.render_typed(*value),
                self.render_value(*ptr)
            ),
            Inst::Bin { op, lhs, rhs } => {
                let ty = self
                    .value_type(*lhs)
                    .or_else(|| self.value_type(*rhs))
                    .unwrap_or(Ty::I64);
                format!(
                    "{} {ty} {}, {}",
                    op.mnemonic(),
                    self.render_value(*lhs),
                    self.render_value(*rhs)
                )
            }
            Inst::Call { callee, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.render_typed(*arg))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("call i64 @{}({args})", self.function(*callee).name)
            }
            Inst::Br { dest } => format!("br label %{}", self.block(*dest).label),
            Inst::CondBr {
                cond,
                then_dest,
                else_dest,
            } => format!(
                "br i1 {}, label %{}, label %{}",
                self.render_value(*cond),
                self.block(*then_dest).label,
                self.block(*else_dest).label
            ),
            Inst::Ret { value } => format!("ret i64 {}", self.render_value(*value)),
        };

        format!("{result}{body}")
    }
}

// Names within a function must be unique; later takers of a taken name get a
// numeric suffix, like LLVM does.
fn unique_name(base: &str, taken: &[&str]) -> String {
    if !taken.contains(&base) {
        return base.to_owned();
    }
    let mut n = 1;
    loop {
        let candidate = format!("{base}.{n}");
        if !taken.contains(&candidate.as_str()) {
            return candidate;
        }
        n += 1;
    }
}

impl Display for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "; ModuleID = '{}'", self.name)?;

        for function in &self.functions {
            let params = function
                .param_names
                .iter()
                .map(|name| format!("i64 %{name}"))
                .collect::<Vec<_>>()
                .join(", ");

            if function.blocks.is_empty() {
                let params = vec!["i64"; function.param_count()].join(", ");
                writeln!(f, "\ndeclare i64 @{}({params})", function.name)?;
                continue;
            }

            writeln!(f, "\ndefine i64 @{}({params}) {{", function.name)?;

            for (index, &block_id) in function.blocks.iter().enumerate() {
                let block = self.block(block_id);
                writeln!(f, "{}:", block.label)?;

                // Allocas live at the head of the entry block.
                if index == 0 {
                    for &slot in &function.slots {
                        writeln!(f, "  %{} = alloca i64", self.slot(slot).name)?;
                    }
                }

                for &inst in &block.insts {
                    writeln!(f, "  {}", self.render_inst(inst))?;
                }
            }

            writeln!(f, "}}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{BinOp, Builder};

    #[test]
    fn render_simple_function() {
        let mut builder = Builder::new("demo");
        let func = builder.declare_function("answer", 0);
        let entry = builder.entry_block(func);
        builder.set_insert_point(entry);

        let slot = builder.alloca_i64(func, "answer_x");
        let forty_two = builder.const_i64(42);
        builder.store_i64(forty_two, slot);
        let loaded = builder.load_i64(slot);
        builder.ret(loaded);

        let rendered = builder.finish().to_string();

        assert!(rendered.contains("define i64 @answer() {"));
        assert!(rendered.contains("entry:"));
        assert!(rendered.contains("%answer_x = alloca i64"));
        assert!(rendered.contains("store i64 42, ptr %answer_x"));
        assert!(rendered.contains("load i64, ptr %answer_x"));
        assert!(rendered.contains("ret i64"));
    }

    #[test]
    fn render_declaration_without_body() {
        let mut builder = Builder::new("demo");
        builder.declare_function("external", 2);

        let rendered = builder.finish().to_string();
        assert!(rendered.contains("declare i64 @external(i64, i64)"));
    }

    #[test]
    fn comparison_produces_i1() {
        let mut builder = Builder::new("demo");
        let func = builder.declare_function("main", 0);
        let entry = builder.entry_block(func);
        builder.set_insert_point(entry);

        let lhs = builder.const_i64(3);
        let rhs = builder.const_i64(4);
        let cmp = builder.bin(BinOp::Slt, lhs, rhs);

        assert_eq!(
            Some(super::Ty::I1),
            builder.module().value_type(cmp)
        );

        let rendered = builder.finish().to_string();
        assert!(rendered.contains("icmp slt i64 3, 4"));
    }

    #[test]
    fn block_labels_are_uniqued() {
        let mut builder = Builder::new("demo");
        let func = builder.declare_function("main", 0);
        builder.entry_block(func);

        let first = builder.new_block(func, "if.then");
        let second = builder.new_block(func, "if.then");
        builder.append_block(first);
        builder.append_block(second);

        let module = builder.finish();
        assert_eq!("if.then", module.block(first).label);
        assert_eq!("if.then.1", module.block(second).label);
    }
}
