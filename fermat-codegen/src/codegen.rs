//! LLVM IR lowering for fermat ASTs.
//!
//! A [`Codegen`] lowers one compile unit (a definition or an anonymous
//! top-level wrapper) into the driver's current module. Locals are
//! entry-block allocas; loop targets for `break`/`continue` are a stack in
//! the per-function state. All function parameters and returns lower as
//! 64-bit floats; declared types are parsed but not enforced on signatures.
//! Struct field types are honored.

use std::collections::HashMap;

use inkwell::basic_block::BasicBlock;
use inkwell::builder::{Builder, BuilderError};
use inkwell::context::Context;
use inkwell::module::{Linkage, Module};
use inkwell::types::{BasicMetadataTypeEnum, BasicTypeEnum, StructType};
use inkwell::values::{
    BasicMetadataValueEnum, BasicValueEnum, FunctionValue, IntValue, PointerValue,
};
use inkwell::{AddressSpace, FloatPredicate, IntPredicate};
use thiserror::Error;

use fermat_core::ast::{
    mangle, BinOp, Expr, Function, GlobalVar, Prototype, StructDef, TypeInfo, UnaryOp,
};

#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("Unknown variable name '{0}'")]
    UnknownVariable(String),

    #[error("Unknown function referenced: {0}")]
    UnknownFunction(String),

    #[error("Incorrect # arguments passed to '{0}'")]
    ArityMismatch(String),

    #[error("Unknown struct type '{0}'")]
    UnknownStruct(String),

    #[error("Unknown field name '{0}'")]
    UnknownField(String),

    #[error("Attempted member access on non-struct type")]
    MemberOfNonStruct,

    #[error("{0} used outside of loop")]
    OutsideLoop(&'static str),

    #[error("invalid operands to binary operator")]
    InvalidOperands,

    #[error("unary '-' requires a float operand")]
    InvalidUnaryOperand,

    #[error("codegen error: {0}")]
    Internal(&'static str),

    #[error(transparent)]
    Builder(#[from] BuilderError),
}

pub type Result<T> = std::result::Result<T, CodegenError>;

pub type ProtoMap = HashMap<String, Prototype>;
pub type StructMap = HashMap<String, StructDef>;
pub type StructTypeMap<'ctx> = HashMap<String, StructType<'ctx>>;
pub type GlobalMap = HashMap<String, TypeInfo>;

/// Lowers a type descriptor to its LLVM type. Unknown and void fall back to
/// 64-bit float, the language's default value representation.
pub fn llvm_type<'ctx>(
    context: &'ctx Context,
    struct_types: &StructTypeMap<'ctx>,
    ty: &TypeInfo,
) -> Result<BasicTypeEnum<'ctx>> {
    Ok(match ty {
        TypeInfo::Int => context.i64_type().into(),
        TypeInfo::Bool => context.bool_type().into(),
        TypeInfo::String => context.i8_type().ptr_type(AddressSpace::default()).into(),
        TypeInfo::Struct(name) => struct_types
            .get(name)
            .copied()
            .ok_or_else(|| CodegenError::UnknownStruct(name.clone()))?
            .into(),
        TypeInfo::Float | TypeInfo::Unknown | TypeInfo::Void => context.f64_type().into(),
    })
}

/// Creates the named LLVM struct type for a struct definition.
pub fn define_struct_type<'ctx>(
    context: &'ctx Context,
    struct_types: &StructTypeMap<'ctx>,
    def: &StructDef,
) -> Result<StructType<'ctx>> {
    let mut field_types = Vec::with_capacity(def.fields.len());
    for field in &def.fields {
        field_types.push(llvm_type(context, struct_types, &field.ty)?);
    }
    let struct_type = context.opaque_struct_type(&def.name);
    struct_type.set_body(&field_types, false);
    Ok(struct_type)
}

/// Declares a prototype in `module` with every parameter and the return as
/// 64-bit float. Returns the existing function if it is already present.
pub fn declare_prototype_in<'ctx>(
    context: &'ctx Context,
    module: &Module<'ctx>,
    proto: &Prototype,
) -> FunctionValue<'ctx> {
    if let Some(existing) = module.get_function(proto.registered_name()) {
        return existing;
    }
    let f64_type = context.f64_type();
    let params: Vec<BasicMetadataTypeEnum> = vec![f64_type.into(); proto.args.len()];
    let fn_type = f64_type.fn_type(&params, false);
    let function = module.add_function(proto.registered_name(), fn_type, Some(Linkage::External));
    for (value, arg) in function.get_param_iter().zip(&proto.args) {
        value.into_float_value().set_name(&arg.name);
    }
    function
}

#[derive(Clone, Copy)]
struct Slot<'ctx> {
    ptr: PointerValue<'ctx>,
    ty: BasicTypeEnum<'ctx>,
}

#[derive(Clone, Copy)]
struct LoopFrame<'ctx> {
    cond: BasicBlock<'ctx>,
    after: BasicBlock<'ctx>,
}

pub struct Codegen<'a, 'ctx> {
    context: &'ctx Context,
    module: &'a Module<'ctx>,
    builder: Builder<'ctx>,
    protos: &'a ProtoMap,
    structs: &'a StructMap,
    struct_types: &'a StructTypeMap<'ctx>,
    globals: &'a GlobalMap,
    /// Per-function symbol table: variable name to entry-block alloca.
    locals: HashMap<String, Slot<'ctx>>,
    loops: Vec<LoopFrame<'ctx>>,
}

impl<'a, 'ctx> Codegen<'a, 'ctx> {
    pub fn new(
        context: &'ctx Context,
        module: &'a Module<'ctx>,
        protos: &'a ProtoMap,
        structs: &'a StructMap,
        struct_types: &'a StructTypeMap<'ctx>,
        globals: &'a GlobalMap,
    ) -> Self {
        Self {
            context,
            module,
            builder: context.create_builder(),
            protos,
            structs,
            struct_types,
            globals,
            locals: HashMap::new(),
            loops: Vec::new(),
        }
    }

    /// Looks a function up in the current module, falling back to the
    /// prototype registry and re-declaring it here. This is how calls
    /// resolve across committed modules.
    fn get_function(&self, name: &str) -> Option<FunctionValue<'ctx>> {
        if let Some(function) = self.module.get_function(name) {
            return Some(function);
        }
        self.protos
            .get(name)
            .map(|proto| declare_prototype_in(self.context, self.module, proto))
    }

    fn current_function(&self) -> Result<FunctionValue<'ctx>> {
        self.builder
            .get_insert_block()
            .and_then(|block| block.get_parent())
            .ok_or(CodegenError::Internal("no active function"))
    }

    /// Every local gets its alloca at the head of the entry block so that
    /// mem2reg-style passes and PHI placement stay simple.
    fn entry_alloca(
        &self,
        function: FunctionValue<'ctx>,
        name: &str,
        ty: BasicTypeEnum<'ctx>,
    ) -> Result<PointerValue<'ctx>> {
        let entry = function
            .get_first_basic_block()
            .ok_or(CodegenError::Internal("function has no entry block"))?;
        let tmp = self.context.create_builder();
        match entry.get_first_instruction() {
            Some(first) => tmp.position_before(&first),
            None => tmp.position_at_end(entry),
        }
        Ok(tmp.build_alloca(ty, name)?)
    }

    /// Coerces a value to an i1 condition: floats compare not-equal to 0.0,
    /// wider integers compare not-equal to 0, i1 passes through.
    fn coerce_bool(&self, value: BasicValueEnum<'ctx>, name: &str) -> Result<IntValue<'ctx>> {
        if value.is_float_value() {
            let zero = self.context.f64_type().const_float(0.0);
            Ok(self.builder.build_float_compare(
                FloatPredicate::ONE,
                value.into_float_value(),
                zero,
                name,
            )?)
        } else if value.is_int_value() {
            let int = value.into_int_value();
            if int.get_type().get_bit_width() == 1 {
                Ok(int)
            } else {
                let zero = int.get_type().const_zero();
                Ok(self
                    .builder
                    .build_int_compare(IntPredicate::NE, int, zero, name)?)
            }
        } else {
            Err(CodegenError::InvalidOperands)
        }
    }

    pub fn compile_expr(&mut self, expr: &Expr) -> Result<BasicValueEnum<'ctx>> {
        match expr {
            Expr::Number { value, is_int } => Ok(if *is_int {
                self.context
                    .i64_type()
                    .const_int(*value as i64 as u64, true)
                    .into()
            } else {
                self.context.f64_type().const_float(*value).into()
            }),

            Expr::StringLit(value) => {
                let global = self.builder.build_global_string_ptr(value, "str")?;
                Ok(global.as_pointer_value().into())
            }

            Expr::Variable(name) => self.compile_variable(name),

            Expr::Unary {
                op: UnaryOp::Neg,
                operand,
            } => {
                let value = self.compile_expr(operand)?;
                if !value.is_float_value() {
                    return Err(CodegenError::InvalidUnaryOperand);
                }
                Ok(self
                    .builder
                    .build_float_neg(value.into_float_value(), "negtmp")?
                    .into())
            }

            Expr::Binary { op, lhs, rhs } => self.compile_binary(*op, lhs, rhs),

            Expr::Call { callee, args } => self.compile_call(callee, args),

            Expr::Let {
                name, init, body, ..
            } => self.compile_let(name, init, body.as_deref()),

            Expr::Assign { name, value } => self.compile_assign(name, value),

            Expr::If {
                cond,
                then_body,
                else_body,
            } => self.compile_if(cond, then_body, else_body.as_deref()),

            Expr::For {
                var,
                start,
                end,
                step,
                body,
            } => self.compile_for(var, start, end, step.as_deref(), body),

            Expr::While { cond, body } => self.compile_while(cond, body),

            Expr::Break => {
                let frame = *self
                    .loops
                    .last()
                    .ok_or(CodegenError::OutsideLoop("break"))?;
                self.branch_and_resume(frame.after, "afterbreak")
            }

            Expr::Continue => {
                let frame = *self
                    .loops
                    .last()
                    .ok_or(CodegenError::OutsideLoop("continue"))?;
                self.branch_and_resume(frame.cond, "aftercontinue")
            }

            Expr::StructLit { name, fields } => self.compile_struct_lit(name, fields),

            Expr::Member { object, field } => self.compile_member(object, field),
        }
    }

    fn compile_variable(&mut self, name: &str) -> Result<BasicValueEnum<'ctx>> {
        if let Some(slot) = self.locals.get(name) {
            let slot = *slot;
            return Ok(self.builder.build_load(slot.ptr, name)?);
        }

        // Statics: find the definition in this module, or re-declare one
        // committed earlier so the JIT links it by name.
        if let Some(ty_info) = self.globals.get(name) {
            let ty = llvm_type(self.context, self.struct_types, ty_info)?;
            let global = match self.module.get_global(name) {
                Some(global) => global,
                None => {
                    let global = self.module.add_global(ty, None, name);
                    global.set_linkage(Linkage::External);
                    global
                }
            };
            return Ok(self.builder.build_load(global.as_pointer_value(), name)?);
        }

        Err(CodegenError::UnknownVariable(name.to_string()))
    }

    /// Integer operands take the signed integer path; float operands the
    /// float path. Comparisons produce i1 and widen back to the operand
    /// family: zext to i64, or unsigned-to-float so the result is 1.0/0.0.
    fn compile_binary(&mut self, op: BinOp, lhs: &Expr, rhs: &Expr) -> Result<BasicValueEnum<'ctx>> {
        let l = self.compile_expr(lhs)?;
        let r = self.compile_expr(rhs)?;

        if op == BinOp::Seq {
            // Both sides evaluated for effect; the sequence yields the right.
            return Ok(r);
        }

        if l.is_int_value() && r.is_int_value() {
            let (l, r) = (l.into_int_value(), r.into_int_value());
            let i64_type = self.context.i64_type();
            let int_cmp = |pred| -> Result<BasicValueEnum<'ctx>> {
                let flag = self.builder.build_int_compare(pred, l, r, "cmptmp")?;
                Ok(self
                    .builder
                    .build_int_z_extend(flag, i64_type, "booltmp")?
                    .into())
            };
            return match op {
                BinOp::Add => Ok(self.builder.build_int_add(l, r, "addtmp")?.into()),
                BinOp::Sub => Ok(self.builder.build_int_sub(l, r, "subtmp")?.into()),
                BinOp::Mul => Ok(self.builder.build_int_mul(l, r, "multmp")?.into()),
                BinOp::Div => Ok(self.builder.build_int_signed_div(l, r, "divtmp")?.into()),
                BinOp::Lt => int_cmp(IntPredicate::SLT),
                BinOp::Gt => int_cmp(IntPredicate::SGT),
                BinOp::Eq => int_cmp(IntPredicate::EQ),
                BinOp::Ne => int_cmp(IntPredicate::NE),
                BinOp::Seq => unreachable!("handled above"),
            };
        }

        if l.is_float_value() && r.is_float_value() {
            let (l, r) = (l.into_float_value(), r.into_float_value());
            let f64_type = self.context.f64_type();
            let float_cmp = |pred| -> Result<BasicValueEnum<'ctx>> {
                let flag = self.builder.build_float_compare(pred, l, r, "cmptmp")?;
                Ok(self
                    .builder
                    .build_unsigned_int_to_float(flag, f64_type, "booltmp")?
                    .into())
            };
            return match op {
                BinOp::Add => Ok(self.builder.build_float_add(l, r, "addtmp")?.into()),
                BinOp::Sub => Ok(self.builder.build_float_sub(l, r, "subtmp")?.into()),
                BinOp::Mul => Ok(self.builder.build_float_mul(l, r, "multmp")?.into()),
                BinOp::Div => Ok(self.builder.build_float_div(l, r, "divtmp")?.into()),
                BinOp::Lt => float_cmp(FloatPredicate::ULT),
                BinOp::Gt => float_cmp(FloatPredicate::UGT),
                BinOp::Eq => float_cmp(FloatPredicate::OEQ),
                BinOp::Ne => float_cmp(FloatPredicate::ONE),
                BinOp::Seq => unreachable!("handled above"),
            };
        }

        Err(CodegenError::InvalidOperands)
    }

    /// Calls resolve by the arity-mangled name first, then the bare name for
    /// externs. Arity mismatch against the resolved signature is a hard
    /// error.
    fn compile_call(&mut self, callee: &str, args: &[Expr]) -> Result<BasicValueEnum<'ctx>> {
        let mangled = mangle(callee, args.len());
        let function = self
            .get_function(&mangled)
            .or_else(|| self.get_function(callee))
            .ok_or_else(|| CodegenError::UnknownFunction(callee.to_string()))?;

        if function.count_params() as usize != args.len() {
            return Err(CodegenError::ArityMismatch(callee.to_string()));
        }

        let mut compiled: Vec<BasicMetadataValueEnum> = Vec::with_capacity(args.len());
        for arg in args {
            compiled.push(self.compile_expr(arg)?.into());
        }

        let call = self.builder.build_call(function, &compiled, "calltmp")?;
        call.try_as_basic_value()
            .left()
            .ok_or(CodegenError::Internal("call yielded no value"))
    }

    fn compile_let(
        &mut self,
        name: &str,
        init: &Expr,
        body: Option<&Expr>,
    ) -> Result<BasicValueEnum<'ctx>> {
        let function = self.current_function()?;
        let init_value = self.compile_expr(init)?;
        let ty = init_value.get_type();
        let ptr = self.entry_alloca(function, name, ty)?;
        self.builder.build_store(ptr, init_value)?;
        self.locals.insert(name.to_string(), Slot { ptr, ty });

        match body {
            Some(body) => self.compile_expr(body),
            None => Ok(init_value),
        }
    }

    fn compile_assign(&mut self, name: &str, value: &Expr) -> Result<BasicValueEnum<'ctx>> {
        let slot = *self
            .locals
            .get(name)
            .ok_or_else(|| CodegenError::UnknownVariable(name.to_string()))?;
        let value = self.compile_expr(value)?;
        self.builder.build_store(slot.ptr, value)?;
        Ok(value)
    }

    fn compile_if(
        &mut self,
        cond: &Expr,
        then_body: &Expr,
        else_body: Option<&Expr>,
    ) -> Result<BasicValueEnum<'ctx>> {
        let cond_value = self.compile_expr(cond)?;
        let cond_bool = self.coerce_bool(cond_value, "ifcond")?;
        let function = self.current_function()?;

        let then_block = self.context.append_basic_block(function, "then");
        let else_block = self.context.append_basic_block(function, "else");
        let merge_block = self.context.append_basic_block(function, "ifcont");
        self.builder
            .build_conditional_branch(cond_bool, then_block, else_block)?;

        self.builder.position_at_end(then_block);
        let then_value = self.compile_expr(then_body)?;
        self.builder.build_unconditional_branch(merge_block)?;
        let then_end = self
            .builder
            .get_insert_block()
            .ok_or(CodegenError::Internal("lost insertion point"))?;

        self.builder.position_at_end(else_block);
        let else_value = match else_body {
            Some(else_body) => self.compile_expr(else_body)?,
            // An if without else yields 0.0 from the implicit arm.
            None => self.context.f64_type().const_float(0.0).into(),
        };
        self.builder.build_unconditional_branch(merge_block)?;
        let else_end = self
            .builder
            .get_insert_block()
            .ok_or(CodegenError::Internal("lost insertion point"))?;

        self.builder.position_at_end(merge_block);
        let phi = self.builder.build_phi(then_value.get_type(), "iftmp")?;
        phi.add_incoming(&[(&then_value, then_end), (&else_value, else_end)]);
        Ok(phi.as_basic_value())
    }

    /// `[start, end)` with a float induction variable. The end expression is
    /// re-evaluated each iteration in the cond block. A shadowed prior
    /// binding of the loop variable is reinstated on exit.
    fn compile_for(
        &mut self,
        var: &str,
        start: &Expr,
        end: &Expr,
        step: Option<&Expr>,
        body: &Expr,
    ) -> Result<BasicValueEnum<'ctx>> {
        let function = self.current_function()?;
        let f64_type = self.context.f64_type();

        let ptr = self.entry_alloca(function, var, f64_type.into())?;
        let start_value = self.compile_expr(start)?;
        self.builder.build_store(ptr, start_value)?;

        let cond_block = self.context.append_basic_block(function, "forcond");
        let body_block = self.context.append_basic_block(function, "forbody");
        let after_block = self.context.append_basic_block(function, "afterfor");
        self.loops.push(LoopFrame {
            cond: cond_block,
            after: after_block,
        });

        self.builder.build_unconditional_branch(cond_block)?;
        self.builder.position_at_end(cond_block);
        let end_value = self.compile_expr(end)?;
        if !end_value.is_float_value() {
            return Err(CodegenError::InvalidOperands);
        }
        let current = self
            .builder
            .build_load(ptr, var)?
            .into_float_value();
        let keep_going = self.builder.build_float_compare(
            FloatPredicate::OLT,
            current,
            end_value.into_float_value(),
            "forcond",
        )?;
        self.builder
            .build_conditional_branch(keep_going, body_block, after_block)?;

        self.builder.position_at_end(body_block);
        let shadowed = self.locals.insert(
            var.to_string(),
            Slot {
                ptr,
                ty: f64_type.into(),
            },
        );
        self.compile_expr(body)?;

        let step_value = match step {
            Some(step) => self.compile_expr(step)?,
            None => f64_type.const_float(1.0).into(),
        };
        if !step_value.is_float_value() {
            return Err(CodegenError::InvalidOperands);
        }
        let current = self
            .builder
            .build_load(ptr, var)?
            .into_float_value();
        let next = self
            .builder
            .build_float_add(current, step_value.into_float_value(), "nextvar")?;
        self.builder.build_store(ptr, next)?;
        self.builder.build_unconditional_branch(cond_block)?;

        self.builder.position_at_end(after_block);
        self.loops.pop();
        match shadowed {
            Some(slot) => {
                self.locals.insert(var.to_string(), slot);
            }
            None => {
                self.locals.remove(var);
            }
        }

        Ok(f64_type.const_float(0.0).into())
    }

    fn compile_while(&mut self, cond: &Expr, body: &Expr) -> Result<BasicValueEnum<'ctx>> {
        let function = self.current_function()?;

        let cond_block = self.context.append_basic_block(function, "whilecond");
        let body_block = self.context.append_basic_block(function, "whilebody");
        let after_block = self.context.append_basic_block(function, "afterwhile");
        self.loops.push(LoopFrame {
            cond: cond_block,
            after: after_block,
        });

        self.builder.build_unconditional_branch(cond_block)?;
        self.builder.position_at_end(cond_block);
        let cond_value = self.compile_expr(cond)?;
        let cond_bool = self.coerce_bool(cond_value, "whilecond")?;
        self.builder
            .build_conditional_branch(cond_bool, body_block, after_block)?;

        self.builder.position_at_end(body_block);
        self.compile_expr(body)?;
        self.builder.build_unconditional_branch(cond_block)?;

        self.builder.position_at_end(after_block);
        self.loops.pop();

        Ok(self.context.f64_type().const_float(0.0).into())
    }

    /// Branches to a loop target and parks the builder in a fresh
    /// unreachable block so whatever follows the jump still lowers validly.
    fn branch_and_resume(
        &mut self,
        target: BasicBlock<'ctx>,
        resume_label: &str,
    ) -> Result<BasicValueEnum<'ctx>> {
        self.builder.build_unconditional_branch(target)?;
        let function = self.current_function()?;
        let dead = self.context.append_basic_block(function, resume_label);
        self.builder.position_at_end(dead);
        Ok(self.context.f64_type().const_float(0.0).into())
    }

    fn compile_struct_lit(
        &mut self,
        name: &str,
        fields: &[(String, Expr)],
    ) -> Result<BasicValueEnum<'ctx>> {
        let def = self
            .structs
            .get(name)
            .ok_or_else(|| CodegenError::UnknownStruct(name.to_string()))?;
        let struct_type = *self
            .struct_types
            .get(name)
            .ok_or_else(|| CodegenError::UnknownStruct(name.to_string()))?;

        let function = self.current_function()?;
        let ptr = self.entry_alloca(function, "structtmp", struct_type.into())?;

        for (field_name, field_expr) in fields {
            let Some(index) = def.field_index(field_name) else {
                eprintln!("Unknown field: {}", field_name);
                continue;
            };
            let value = self.compile_expr(field_expr)?;
            let field_ptr =
                self.builder
                    .build_struct_gep(ptr, index as u32, "fieldptr")?;
            self.builder.build_store(field_ptr, value)?;
        }

        Ok(self.builder.build_load(ptr, "structval")?)
    }

    fn compile_member(&mut self, object: &Expr, field: &str) -> Result<BasicValueEnum<'ctx>> {
        let value = self.compile_expr(object)?;
        if !value.is_struct_value() {
            return Err(CodegenError::MemberOfNonStruct);
        }
        let struct_value = value.into_struct_value();
        let name = struct_value
            .get_type()
            .get_name()
            .and_then(|name| name.to_str().ok())
            .map(str::to_owned)
            .ok_or(CodegenError::MemberOfNonStruct)?;

        let def = self
            .structs
            .get(&name)
            .ok_or_else(|| CodegenError::UnknownStruct(name.clone()))?;
        let index = def
            .field_index(field)
            .ok_or_else(|| CodegenError::UnknownField(field.to_string()))?;

        Ok(self
            .builder
            .build_extract_value(struct_value, index as u32, "membertmp")?)
    }

    /// Materializes a function: declare, alloca the parameters, lower the
    /// body, return its value. On a lowering error the half-built function
    /// is erased from the module so the driver can keep going.
    pub fn compile_function(&mut self, function_ast: &Function) -> Result<FunctionValue<'ctx>> {
        let function = declare_prototype_in(self.context, self.module, &function_ast.proto);

        let entry = self.context.append_basic_block(function, "entry");
        self.builder.position_at_end(entry);

        self.locals.clear();
        for (value, arg) in function.get_param_iter().zip(&function_ast.proto.args) {
            let ty: BasicTypeEnum = self.context.f64_type().into();
            let ptr = self.entry_alloca(function, &arg.name, ty)?;
            self.builder.build_store(ptr, value)?;
            self.locals.insert(arg.name.clone(), Slot { ptr, ty });
        }

        match self.compile_expr(&function_ast.body) {
            Ok(ret) => {
                self.builder.build_return(Some(&ret))?;
                function.verify(true);
                Ok(function)
            }
            Err(err) => {
                unsafe {
                    function.delete();
                }
                Err(err)
            }
        }
    }

    /// Lowers a `static` declaration. A literal-number initializer becomes
    /// the global's constant initializer; anything else is diagnosed and the
    /// global is zero-initialized.
    pub fn compile_global(&mut self, var: &GlobalVar) -> Result<()> {
        let ty = llvm_type(self.context, self.struct_types, &var.ty)?;
        let global = self.module.add_global(ty, None, &var.name);
        global.set_linkage(Linkage::External);

        let init: BasicValueEnum = match &var.init {
            Expr::Number { value, .. } => match ty {
                BasicTypeEnum::IntType(int) => int.const_int(*value as i64 as u64, true).into(),
                BasicTypeEnum::FloatType(float) => float.const_float(*value).into(),
                other => other.const_zero(),
            },
            _ => {
                eprintln!(
                    "Error: static initializer for '{}' must be a constant expression",
                    var.name
                );
                ty.const_zero()
            }
        };
        global.set_initializer(&init);
        Ok(())
    }
}
