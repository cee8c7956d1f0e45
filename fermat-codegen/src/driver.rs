//! The REPL/batch driver.
//!
//! Dispatches on the lead token of each compile unit, gates lowering on
//! accumulated borrow errors, commits a fresh module to the JIT per
//! definition, and invokes anonymous wrappers for top-level expressions.

use std::collections::HashSet;
use std::path::PathBuf;

use inkwell::context::Context;
use inkwell::module::Module;

use fermat_core::lexer::{Source, Token};
use fermat_core::parser::Parser;
use fermat_core::ParseError;

use crate::codegen::{
    declare_prototype_in, define_struct_type, Codegen, GlobalMap, ProtoMap, StructMap,
    StructTypeMap,
};
use crate::jit::{FermatJit, JitError};
use crate::runtime;

/// JIT failures are not recoverable: report and abort, reversing nothing.
fn exit_on_err<T>(result: Result<T, JitError>) -> T {
    result.unwrap_or_else(|err| {
        eprintln!("fermat: fatal JIT error: {}", err);
        std::process::exit(1);
    })
}

pub struct Driver<'ctx> {
    pub(crate) context: &'ctx Context,
    pub(crate) jit: FermatJit<'ctx>,
    pub(crate) parser: Parser,
    /// The module definitions accumulate into until the next commit.
    pub(crate) module: Module<'ctx>,
    pub(crate) protos: ProtoMap,
    pub(crate) structs: StructMap,
    pub(crate) struct_types: StructTypeMap<'ctx>,
    pub(crate) globals: GlobalMap,
    pub(crate) imported: HashSet<PathBuf>,
    /// Print "Parsed ..." confirmations (terminal sessions only).
    pub(crate) interactive: bool,
    /// Echo top-level values (reading stdin, interactive or piped).
    pub(crate) echo_values: bool,
    results: Vec<f64>,
}

impl<'ctx> Driver<'ctx> {
    pub fn new(
        context: &'ctx Context,
        source: Source,
        interactive: bool,
        echo_values: bool,
    ) -> Result<Self, JitError> {
        Ok(Self {
            context,
            jit: FermatJit::new(context)?,
            parser: Parser::new(source),
            module: context.create_module("fermat_jit"),
            protos: ProtoMap::new(),
            structs: StructMap::new(),
            struct_types: StructTypeMap::new(),
            globals: GlobalMap::new(),
            imported: HashSet::new(),
            interactive,
            echo_values,
            results: Vec::new(),
        })
    }

    /// Top-level evaluation results, in order.
    pub fn results(&self) -> &[f64] {
        &self.results
    }

    pub fn jit(&self) -> &FermatJit<'ctx> {
        &self.jit
    }

    pub fn run(&mut self) {
        self.parser.advance();
        loop {
            match self.parser.current() {
                Token::Eof => return,
                Token::Char(b';') => {
                    self.parser.advance();
                }
                Token::Def => self.handle_definition(),
                Token::Export => self.handle_export(),
                Token::Import => self.handle_import(),
                Token::Extern => self.handle_extern(),
                Token::Type | Token::Abstract => self.handle_struct_def(),
                Token::Static => self.handle_static(),
                _ => self.handle_top_level_expression(),
            }
        }
    }

    /// Reports accumulated borrow errors and clears them. A unit with
    /// errors is discarded before lowering.
    fn check_borrow_errors(&mut self) -> bool {
        if !self.parser.checker.has_errors() {
            return false;
        }
        for err in self.parser.checker.take_errors() {
            eprintln!("error: {}", err);
        }
        true
    }

    /// Parse-error recovery: report, skip one token, resume.
    fn report_parse_error(&mut self, err: ParseError) {
        eprintln!("Error: {}", err);
        self.parser.advance();
    }

    fn codegen(&self) -> Codegen<'_, 'ctx> {
        Codegen::new(
            self.context,
            &self.module,
            &self.protos,
            &self.structs,
            &self.struct_types,
            &self.globals,
        )
    }

    /// Moves the filled module into the JIT and installs a fresh one.
    fn commit(&mut self) {
        let module = std::mem::replace(&mut self.module, self.context.create_module("fermat_jit"));
        exit_on_err(self.jit.commit(module));
    }

    pub(crate) fn handle_definition(&mut self) {
        let function = match self.parser.parse_definition() {
            Ok(function) => function,
            Err(err) => return self.report_parse_error(err),
        };
        if self.check_borrow_errors() {
            return;
        }

        // Register the prototype first so recursion and later re-declaration
        // resolve through the registry.
        self.protos.insert(
            function.proto.registered_name().to_string(),
            function.proto.clone(),
        );

        let compiled = {
            let mut codegen = self.codegen();
            codegen.compile_function(&function).map(|_| ())
        };
        match compiled {
            Ok(()) => {
                if self.interactive {
                    eprintln!("Parsed function definition.");
                }
                self.commit();
            }
            Err(err) => eprintln!("Error: {}", err),
        }
    }

    fn handle_top_level_expression(&mut self) {
        let function = match self.parser.parse_top_level_expr() {
            Ok(function) => function,
            Err(err) => return self.report_parse_error(err),
        };
        if self.check_borrow_errors() {
            return;
        }

        let symbol = function.proto.mangled_name().to_string();
        self.protos.insert(symbol.clone(), function.proto.clone());

        let compiled = {
            let mut codegen = self.codegen();
            codegen.compile_function(&function).map(|_| ())
        };
        match compiled {
            Ok(()) => {
                self.commit();
                let value = exit_on_err(self.jit.invoke(&symbol));
                self.results.push(value);
                if self.echo_values {
                    println!("{}", runtime::format_g10(value));
                }
            }
            Err(err) => eprintln!("Error: {}", err),
        }
    }

    pub(crate) fn handle_extern(&mut self) {
        match self.parser.parse_extern() {
            Ok(proto) => {
                declare_prototype_in(self.context, &self.module, &proto);
                if self.interactive {
                    eprintln!("Parsed an extern");
                }
                self.protos
                    .insert(proto.registered_name().to_string(), proto);
            }
            Err(err) => self.report_parse_error(err),
        }
    }

    pub(crate) fn handle_static(&mut self) {
        let var = match self.parser.parse_static() {
            Ok(var) => var,
            Err(err) => return self.report_parse_error(err),
        };
        if self.check_borrow_errors() {
            return;
        }

        let compiled = {
            let mut codegen = self.codegen();
            codegen.compile_global(&var)
        };
        match compiled {
            Ok(()) => {
                self.globals.insert(var.name.clone(), var.ty.clone());
                if self.interactive {
                    eprintln!("Parsed static variable.");
                }
            }
            Err(err) => eprintln!("Error: {}", err),
        }
    }

    pub(crate) fn handle_struct_def(&mut self) {
        let def = match self.parser.parse_struct_def() {
            Ok(def) => def,
            Err(err) => return self.report_parse_error(err),
        };

        match define_struct_type(self.context, &self.struct_types, &def) {
            Ok(struct_type) => {
                self.struct_types.insert(def.name.clone(), struct_type);
                if self.interactive {
                    if def.is_abstract {
                        eprintln!("Parsed abstract struct definition.");
                    } else {
                        eprintln!("Parsed struct definition.");
                    }
                }
                self.structs.insert(def.name.clone(), def);
            }
            Err(err) => eprintln!("Error: {}", err),
        }
    }

    pub(crate) fn handle_export(&mut self) {
        // `export` is syntactic: the module namespace is global anyway.
        self.parser.advance();
        match self.parser.current() {
            Token::Def => self.handle_definition(),
            Token::Type | Token::Struct | Token::Abstract => self.handle_struct_def(),
            _ => {
                eprintln!("Error: Expected 'def', 'type', or 'struct' after 'export'");
                self.parser.advance();
            }
        }
    }

    pub(crate) fn handle_import(&mut self) {
        match self.parser.parse_import() {
            Ok(path) => {
                self.load_module(&path);
            }
            Err(err) => self.report_parse_error(err),
        }
    }
}
