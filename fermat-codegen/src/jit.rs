//! JIT execution engine for committed modules.
//!
//! One engine per process. Each committed definition arrives as its own
//! module via `add_module`; the engine owns all committed code for its
//! lifetime, so the modules are kept here. Cross-module calls resolve by
//! name, with runtime helpers bound to their host addresses on every
//! commit.

use inkwell::context::Context;
use inkwell::execution_engine::ExecutionEngine;
use inkwell::module::Module;
use inkwell::targets::{InitializationConfig, Target};
use inkwell::OptimizationLevel;
use thiserror::Error;

use crate::runtime;

#[derive(Error, Debug)]
pub enum JitError {
    #[error("failed to initialize native target: {0}")]
    TargetInit(String),

    #[error("failed to create JIT engine: {0}")]
    Create(String),

    #[error("failed to add module to JIT engine")]
    AddModule,

    #[error("JIT symbol not found: {0}")]
    SymbolNotFound(String),
}

type EvalFn = unsafe extern "C" fn() -> f64;

pub struct FermatJit<'ctx> {
    engine: ExecutionEngine<'ctx>,
    /// Committed modules, owned for the engine's lifetime.
    modules: Vec<Module<'ctx>>,
}

impl<'ctx> FermatJit<'ctx> {
    pub fn new(context: &'ctx Context) -> Result<Self, JitError> {
        Target::initialize_native(&InitializationConfig::default())
            .map_err(JitError::TargetInit)?;

        let bootstrap = context.create_module("fermat_runtime");
        let engine = bootstrap
            .create_jit_execution_engine(OptimizationLevel::None)
            .map_err(|err| JitError::Create(err.to_string()))?;
        runtime::install(context, &engine, &bootstrap);

        Ok(Self {
            engine,
            modules: vec![bootstrap],
        })
    }

    /// Hands a finished module to the engine. The module stays alive here;
    /// its symbols are visible to everything committed later.
    pub fn commit(&mut self, module: Module<'ctx>) -> Result<(), JitError> {
        self.engine
            .add_module(&module)
            .map_err(|_| JitError::AddModule)?;
        runtime::bind(&self.engine, &module);
        self.modules.push(module);
        Ok(())
    }

    /// Invokes a committed nullary function returning a 64-bit float.
    pub fn invoke(&self, symbol: &str) -> Result<f64, JitError> {
        let function = unsafe { self.engine.get_function::<EvalFn>(symbol) }
            .map_err(|_| JitError::SymbolNotFound(symbol.to_string()))?;
        Ok(unsafe { function.call() })
    }

    /// Whether the engine can resolve `symbol` to executable code.
    pub fn resolves(&self, symbol: &str) -> bool {
        self.engine.get_function_address(symbol).is_ok()
    }
}
