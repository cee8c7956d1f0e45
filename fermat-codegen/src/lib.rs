//! Fermat back-end
//!
//! LLVM lowering, the JIT session, the REPL/batch driver, the module
//! loader, and the runtime helper table.

pub mod codegen;
pub mod driver;
pub mod jit;
pub mod loader;
pub mod runtime;

pub use codegen::{Codegen, CodegenError};
pub use driver::Driver;
pub use jit::{FermatJit, JitError};
