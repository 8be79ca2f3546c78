use super::{BinOp, BlockId, FuncId, Inst, Module, Value};

/// Emission interface over a [`Module`].
///
/// The builder owns the module under construction and a mutable insertion
/// point; all instructions go to the end of the block the insertion point
/// names. Blocks may be filled before they are appended to their function.
#[derive(Debug)]
pub struct Builder {
    module: Module,
    insert_point: Option<BlockId>,
}

impl Builder {
    pub fn new(module_name: impl ToString) -> Builder {
        Builder {
            module: Module::new(module_name),
            insert_point: None,
        }
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    /// Hand the finished module back out.
    pub fn finish(self) -> Module {
        self.module
    }

    /// Declare a function with `param_count` i64 parameters and an i64
    /// return type. Redeclaring an existing name returns the existing
    /// handle.
    pub fn declare_function(&mut self, name: &str, param_count: usize) -> FuncId {
        match self.module.get_function(name) {
            Some(existing) => existing,
            None => self.module.add_function(name, param_count),
        }
    }

    pub fn get_function(&self, name: &str) -> Option<FuncId> {
        self.module.get_function(name)
    }

    pub fn param_count(&self, func: FuncId) -> usize {
        self.module.function(func).param_count()
    }

    pub fn set_param_name(&mut self, func: FuncId, index: usize, name: &str) {
        self.module.set_param_name(func, index, name);
    }

    /// Create and append the entry block of a function.
    pub fn entry_block(&mut self, func: FuncId) -> BlockId {
        let block = self.new_block(func, "entry");
        self.append_block(block);
        block
    }

    /// Create a detached block. It becomes part of the function's layout
    /// only once [`Builder::append_block`] runs.
    pub fn new_block(&mut self, func: FuncId, label: &str) -> BlockId {
        self.module.add_block(func, label)
    }

    /// Attach a block to the end of its function's block list.
    pub fn append_block(&mut self, block: BlockId) {
        self.module.append_block(block);
    }

    pub fn set_insert_point(&mut self, block: BlockId) {
        self.insert_point = Some(block);
    }

    /// Allocate an i64 stack slot at the head of the function's entry block,
    /// independent of the current insertion point.
    pub fn alloca_i64(&mut self, func: FuncId, name: &str) -> Value {
        Value::Slot(self.module.add_slot(func, name))
    }

    pub fn const_i64(&self, value: i64) -> Value {
        Value::Const(value)
    }

    pub fn load_i64(&mut self, ptr: Value) -> Value {
        self.push(Inst::Load { ptr })
    }

    pub fn store_i64(&mut self, value: Value, ptr: Value) -> Value {
        self.push(Inst::Store { value, ptr })
    }

    pub fn bin(&mut self, op: BinOp, lhs: Value, rhs: Value) -> Value {
        self.push(Inst::Bin { op, lhs, rhs })
    }

    pub fn br(&mut self, dest: BlockId) -> Value {
        self.push(Inst::Br { dest })
    }

    pub fn cond_br(&mut self, cond: Value, then_dest: BlockId, else_dest: BlockId) -> Value {
        self.push(Inst::CondBr {
            cond,
            then_dest,
            else_dest,
        })
    }

    pub fn ret(&mut self, value: Value) -> Value {
        self.push(Inst::Ret { value })
    }

    pub fn call(&mut self, callee: FuncId, args: Vec<Value>) -> Value {
        self.push(Inst::Call { callee, args })
    }

    pub fn is_terminator(&self, value: Value) -> bool {
        self.module.is_terminator(value)
    }

    pub fn is_pointer(&self, value: Value) -> bool {
        self.module.is_pointer(value)
    }

    fn push(&mut self, inst: Inst) -> Value {
        let block = self.insert_point.expect("no insertion point set");
        Value::Inst(self.module.push_inst(block, inst))
    }
}
