//! Recursive-descent parser with Pratt operator precedence.
//!
//! The parser owns the lexer and the borrow checker: identifiers are
//! use-checked as they are consumed, `let` and parameters declare bindings,
//! and assignments are checked for mutability during parsing. The driver
//! inspects the accumulated borrow errors before lowering each unit.

use std::path::Path;

use crate::ast::{
    BinOp, Expr, Function, GlobalVar, Prototype, StructDef, StructField, TypeInfo, TypedArg,
};
use crate::borrow::BorrowChecker;
use crate::error::{ParseError, ParseResult};
use crate::lexer::{Lexer, LexerState, Source, Token};

fn binop_of(token: &Token) -> Option<BinOp> {
    match token {
        Token::Char(b'+') => Some(BinOp::Add),
        Token::Char(b'-') => Some(BinOp::Sub),
        Token::Char(b'*') => Some(BinOp::Mul),
        Token::Char(b'/') => Some(BinOp::Div),
        Token::Char(b'<') => Some(BinOp::Lt),
        Token::Char(b'>') => Some(BinOp::Gt),
        Token::Char(b';') => Some(BinOp::Seq),
        Token::Eq => Some(BinOp::Eq),
        Token::Ne => Some(BinOp::Ne),
        _ => None,
    }
}

/// Tokens that may legally follow a trailing `;`, ending the sequence
/// instead of demanding another operand.
fn terminates_sequence(token: &Token) -> bool {
    matches!(
        token,
        Token::Eof
            | Token::Def
            | Token::Extern
            | Token::Import
            | Token::Export
            | Token::Static
            | Token::Type
            | Token::Struct
            | Token::Abstract
            | Token::End
            | Token::Else
            | Token::Char(b';')
    )
}

/// Tokens that end a bodiless `let` at statement position.
fn ends_statement(token: &Token) -> bool {
    matches!(
        token,
        Token::Char(b';') | Token::Eof | Token::Def | Token::End | Token::Else
    )
}

pub struct Parser {
    lexer: Lexer,
    pub checker: BorrowChecker,
    anon_counter: u32,
}

impl Parser {
    pub fn new(source: Source) -> Self {
        Self {
            lexer: Lexer::new(source),
            checker: BorrowChecker::new(),
            anon_counter: 0,
        }
    }

    pub fn current(&self) -> &Token {
        self.lexer.current()
    }

    pub fn advance(&mut self) -> &Token {
        self.lexer.advance()
    }

    pub fn source_path(&self) -> &Path {
        self.lexer.path()
    }

    /// Swaps the lexer onto an imported file and primes its first token.
    /// The returned state must be handed back to [`Parser::end_import`].
    pub fn begin_import(&mut self, source: Source) -> LexerState {
        let saved = self.lexer.swap_source(source);
        self.lexer.advance();
        saved
    }

    pub fn end_import(&mut self, saved: LexerState) {
        self.lexer.restore(saved);
    }

    fn expect(&mut self, token: Token, expected: &'static str) -> ParseResult<()> {
        if self.current() == &token {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::Expected {
                expected,
                found: self.current().to_string(),
            })
        }
    }

    fn expect_ident(&mut self, expected: &'static str) -> ParseResult<String> {
        match self.current() {
            Token::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            other => Err(ParseError::Expected {
                expected,
                found: other.to_string(),
            }),
        }
    }

    /// Type annotation: `int`, `float`, `string`, `bool`, or a struct name.
    /// Anything else consumes nothing and yields `Unknown`.
    fn parse_type(&mut self) -> TypeInfo {
        let ty = match self.current() {
            Token::Int => TypeInfo::Int,
            Token::Float => TypeInfo::Float,
            Token::String => TypeInfo::String,
            Token::Bool => TypeInfo::Bool,
            Token::Ident(name) => TypeInfo::Struct(name.clone()),
            _ => return TypeInfo::Unknown,
        };
        self.advance();
        ty
    }

    pub fn parse_expression(&mut self) -> ParseResult<Expr> {
        let lhs = self.parse_primary()?;
        self.parse_binop_rhs(0, lhs)
    }

    /// Parses an expression that binds tighter than the sequence operator.
    /// Initializers use this so a bodiless `let` ends at the statement
    /// boundary instead of swallowing the rest of the sequence.
    fn parse_init_expression(&mut self) -> ParseResult<Expr> {
        let lhs = self.parse_primary()?;
        self.parse_binop_rhs(BinOp::Seq.precedence() + 1, lhs)
    }

    fn parse_binop_rhs(&mut self, expr_prec: i32, mut lhs: Expr) -> ParseResult<Expr> {
        loop {
            let op = match binop_of(self.current()) {
                Some(op) if op.precedence() >= expr_prec => op,
                _ => return Ok(lhs),
            };
            self.advance();

            if op == BinOp::Seq && terminates_sequence(self.current()) {
                return Ok(lhs);
            }

            let mut rhs = self.parse_primary()?;
            if let Some(next) = binop_of(self.current()) {
                if op.precedence() < next.precedence() {
                    rhs = self.parse_binop_rhs(op.precedence() + 1, rhs)?;
                }
            }
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        match self.current().clone() {
            Token::Ident(name) => {
                self.advance();
                self.parse_identifier_expr(name)
            }
            Token::Number(value) => {
                self.advance();
                // All literals are float by default; annotations opt into int.
                Ok(Expr::Number {
                    value,
                    is_int: false,
                })
            }
            Token::Str(value) => {
                self.advance();
                Ok(Expr::StringLit(value))
            }
            Token::Let => self.parse_let(),
            Token::If => self.parse_if(),
            Token::For => self.parse_for(),
            Token::While => self.parse_while(),
            Token::Break => {
                self.advance();
                Ok(Expr::Break)
            }
            Token::Continue => {
                self.advance();
                Ok(Expr::Continue)
            }
            Token::Char(b'(') => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(Token::Char(b')'), "')'")?;
                Ok(inner)
            }
            other => Err(ParseError::ExpectedExpression(other.to_string())),
        }
    }

    /// An identifier begins a struct literal, an assignment, a member chain,
    /// a call, or a plain variable reference, decided by the next token.
    fn parse_identifier_expr(&mut self, name: String) -> ParseResult<Expr> {
        self.checker.check_use(&name);

        match self.current() {
            Token::Char(b'{') => self.parse_struct_literal(name),
            Token::Char(b'=') => {
                self.advance();
                self.checker.check_assign(&name);
                let value = self.parse_expression()?;
                Ok(Expr::Assign {
                    name,
                    value: Box::new(value),
                })
            }
            Token::Char(b'.') => {
                let mut object = Expr::Variable(name);
                while self.current() == &Token::Char(b'.') {
                    self.advance();
                    let field = self.expect_ident("field name after '.'")?;
                    object = Expr::Member {
                        object: Box::new(object),
                        field,
                    };
                }
                Ok(object)
            }
            Token::Char(b'(') => {
                self.advance();
                let mut args = Vec::new();
                if self.current() != &Token::Char(b')') {
                    loop {
                        args.push(self.parse_expression()?);
                        match self.current() {
                            Token::Char(b')') => break,
                            Token::Char(b',') => {
                                self.advance();
                            }
                            other => {
                                return Err(ParseError::Expected {
                                    expected: "')' or ',' in argument list",
                                    found: other.to_string(),
                                })
                            }
                        }
                    }
                }
                self.advance();
                Ok(Expr::Call { callee: name, args })
            }
            _ => Ok(Expr::Variable(name)),
        }
    }

    fn parse_struct_literal(&mut self, name: String) -> ParseResult<Expr> {
        self.advance();
        let mut fields = Vec::new();
        if self.current() != &Token::Char(b'}') {
            loop {
                let field = self.expect_ident("field name in struct literal")?;
                self.expect(Token::Colon, "':' after field name")?;
                let value = self.parse_expression()?;
                fields.push((field, value));
                match self.current() {
                    Token::Char(b'}') => break,
                    Token::Char(b',') => {
                        self.advance();
                    }
                    other => {
                        return Err(ParseError::Expected {
                            expected: "',' or '}' in struct literal",
                            found: other.to_string(),
                        })
                    }
                }
            }
        }
        self.advance();
        Ok(Expr::StructLit { name, fields })
    }

    /// `let [mut] name[: type] = init [body]`. The binding is declared only
    /// after the initializer has been parsed, so the initializer cannot
    /// refer to the variable being declared.
    fn parse_let(&mut self) -> ParseResult<Expr> {
        self.advance();

        let mutable = if self.current() == &Token::Mut {
            self.advance();
            true
        } else {
            false
        };

        let name = self.expect_ident("identifier after 'let'")?;

        let ty = if self.current() == &Token::Colon {
            self.advance();
            self.parse_type()
        } else {
            TypeInfo::Unknown
        };

        self.expect(Token::Char(b'='), "'=' in let expression")?;
        let init = self.parse_init_expression()?;

        self.checker.declare(&name, mutable);

        let body = if ends_statement(self.current()) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };

        Ok(Expr::Let {
            name,
            mutable,
            ty,
            init: Box::new(init),
            body,
        })
    }

    /// `if COND then THEN [else ELSE] [end]`. A trailing `end` is consumed
    /// only when no `else` branch follows.
    fn parse_if(&mut self) -> ParseResult<Expr> {
        self.advance();

        let cond = self.parse_expression()?;
        self.expect(Token::Then, "'then' after if condition")?;
        let then_body = self.parse_expression()?;

        let else_body = if self.current() == &Token::Else {
            self.advance();
            Some(Box::new(self.parse_expression()?))
        } else {
            if self.current() == &Token::End {
                self.advance();
            }
            None
        };

        Ok(Expr::If {
            cond: Box::new(cond),
            then_body: Box::new(then_body),
            else_body,
        })
    }

    /// `for ID = START, END[, STEP] do BODY end`. The loop variable lives in
    /// its own scope and is mutable.
    fn parse_for(&mut self) -> ParseResult<Expr> {
        self.advance();

        let var = self.expect_ident("identifier after 'for'")?;
        self.expect(Token::Char(b'='), "'=' after for loop variable")?;
        let start = self.parse_expression()?;
        self.expect(Token::Char(b','), "',' after for start value")?;
        let end = self.parse_expression()?;

        let step = if self.current() == &Token::Char(b',') {
            self.advance();
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };

        self.expect(Token::Do, "'do' after for loop header")?;

        self.checker.enter_scope();
        self.checker.declare(&var, true);
        let body = self.parse_expression();
        self.checker.exit_scope();
        let body = body?;

        self.expect(Token::End, "'end' after for loop body")?;

        Ok(Expr::For {
            var,
            start: Box::new(start),
            end: Box::new(end),
            step,
            body: Box::new(body),
        })
    }

    fn parse_while(&mut self) -> ParseResult<Expr> {
        self.advance();

        let cond = self.parse_expression()?;
        self.expect(Token::Do, "'do' after while condition")?;

        self.checker.enter_scope();
        let body = self.parse_expression();
        self.checker.exit_scope();
        let body = body?;

        self.expect(Token::End, "'end' after while loop body")?;

        Ok(Expr::While {
            cond: Box::new(cond),
            body: Box::new(body),
        })
    }

    /// `name ( arg[: type] [, arg[: type]]* ) [-> type]`. Untyped arguments
    /// and a missing return type default to float.
    pub fn parse_prototype(&mut self) -> ParseResult<Prototype> {
        let name = self.expect_ident("function name in prototype")?;
        self.expect(Token::Char(b'('), "'(' in prototype")?;

        let mut args = Vec::new();
        loop {
            let arg = match self.current() {
                Token::Ident(arg) => arg.clone(),
                _ => break,
            };
            self.advance();

            let ty = if self.current() == &Token::Colon {
                self.advance();
                self.parse_type()
            } else {
                TypeInfo::Float
            };
            args.push(TypedArg { name: arg, ty });

            match self.current() {
                Token::Char(b')') => break,
                Token::Char(b',') => {
                    self.advance();
                }
                _ => {}
            }
        }

        self.expect(Token::Char(b')'), "')' in prototype")?;

        let return_type = if self.current() == &Token::Arrow {
            self.advance();
            self.parse_type()
        } else {
            TypeInfo::Float
        };

        Ok(Prototype::new(name, args, return_type))
    }

    /// `def PROTOTYPE EXPR`. Parameters are declared immutable in a fresh
    /// scope around the body.
    pub fn parse_definition(&mut self) -> ParseResult<Function> {
        self.advance();
        let proto = self.parse_prototype()?;

        self.checker.enter_scope();
        for arg in &proto.args {
            self.checker.declare(&arg.name, false);
        }
        let body = self.parse_expression();
        self.checker.exit_scope();

        Ok(Function { proto, body: body? })
    }

    /// `extern PROTOTYPE`; externs link under the bare, unmangled name.
    pub fn parse_extern(&mut self) -> ParseResult<Prototype> {
        self.advance();
        let mut proto = self.parse_prototype()?;
        proto.is_extern = true;
        Ok(proto)
    }

    /// `static ID[: TYPE] [= INIT]`; a missing initializer defaults to 0.
    pub fn parse_static(&mut self) -> ParseResult<GlobalVar> {
        self.advance();
        let name = self.expect_ident("identifier after 'static'")?;

        let ty = if self.current() == &Token::Colon {
            self.advance();
            self.parse_type()
        } else {
            TypeInfo::Float
        };

        let init = if self.current() == &Token::Char(b'=') {
            self.advance();
            self.parse_init_expression()?
        } else {
            Expr::Number {
                value: 0.0,
                is_int: false,
            }
        };

        Ok(GlobalVar { name, ty, init })
    }

    /// `[abstract] type NAME struct FIELDS end` with `name: type` fields.
    pub fn parse_struct_def(&mut self) -> ParseResult<StructDef> {
        let is_abstract = if self.current() == &Token::Abstract {
            self.advance();
            true
        } else {
            false
        };

        self.expect(Token::Type, "'type'")?;
        let name = self.expect_ident("struct name after 'type'")?;
        self.expect(Token::Struct, "'struct' after type name")?;

        let mut fields = Vec::new();
        loop {
            let field = match self.current() {
                Token::Ident(field) => field.clone(),
                _ => break,
            };
            self.advance();
            self.expect(Token::Colon, "':' after field name")?;
            let ty = self.parse_type();
            fields.push(StructField { name: field, ty });
        }

        if self.current() == &Token::End {
            self.advance();
        }

        Ok(StructDef {
            name,
            fields,
            is_abstract,
        })
    }

    /// `import "PATH"`; the driver hands the path to the module loader.
    pub fn parse_import(&mut self) -> ParseResult<String> {
        self.advance();
        match self.current() {
            Token::Str(path) => {
                let path = path.clone();
                self.advance();
                Ok(path)
            }
            other => Err(ParseError::Expected {
                expected: "string after 'import'",
                found: other.to_string(),
            }),
        }
    }

    /// Wraps a top-level statement in an anonymous nullary function
    /// `anon_expr_<n>`, mangled `anon_expr_<n>$0`.
    ///
    /// A unit that begins with a bodiless `let` keeps absorbing the
    /// following `;`-separated statements into the sequence, since locals
    /// are per-function and the bindings would otherwise be unreachable.
    /// Any other statement ends at `;`, so consecutive expressions evaluate
    /// (and echo) one by one.
    pub fn parse_top_level_expr(&mut self) -> ParseResult<Function> {
        let mut body = self.parse_init_expression()?;

        if matches!(body, Expr::Let { body: None, .. }) {
            while self.current() == &Token::Char(b';') {
                self.advance();
                if terminates_sequence(self.current()) {
                    break;
                }
                let rhs = self.parse_init_expression()?;
                body = Expr::Binary {
                    op: BinOp::Seq,
                    lhs: Box::new(body),
                    rhs: Box::new(rhs),
                };
            }
        }

        let name = format!("anon_expr_{}", self.anon_counter);
        self.anon_counter += 1;
        Ok(Function {
            proto: Prototype::new(name, Vec::new(), TypeInfo::Float),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::mangle;

    fn parser(input: &str) -> Parser {
        let mut parser = Parser::new(Source::from_str(input, "<test>"));
        parser.advance();
        parser
    }

    fn parse_expr(input: &str) -> Expr {
        let mut parser = parser(input);
        match parser.parse_expression() {
            Ok(expr) => expr,
            Err(err) => panic!("parse failed for {:?}: {}", input, err),
        }
    }

    #[test]
    fn test_number_is_float_by_default() {
        assert_eq!(
            parse_expr("42"),
            Expr::Number {
                value: 42.0,
                is_int: false
            }
        );
    }

    #[test]
    fn test_precedence_shapes_the_tree() {
        // 1 + 2 * 3 parses as 1 + (2 * 3).
        let expr = parse_expr("1 + 2 * 3");
        match expr {
            Expr::Binary {
                op: BinOp::Add,
                rhs,
                ..
            } => assert!(matches!(*rhs, Expr::Binary { op: BinOp::Mul, .. })),
            other => panic!("expected add at the root, got {:?}", other),
        }
    }

    #[test]
    fn test_comparison_binds_looser_than_arithmetic() {
        let expr = parse_expr("n < 2 + 1");
        assert!(matches!(expr, Expr::Binary { op: BinOp::Lt, .. }));
    }

    #[test]
    fn test_sequence_operator() {
        let expr = parse_expr("1; 2");
        assert!(matches!(expr, Expr::Binary { op: BinOp::Seq, .. }));
    }

    #[test]
    fn test_trailing_semicolon_ends_the_sequence() {
        assert_eq!(
            parse_expr("1;"),
            Expr::Number {
                value: 1.0,
                is_int: false
            }
        );
    }

    #[test]
    fn test_call_mangling_matches_arity() {
        let expr = parse_expr("f(1, 2, 3)");
        match expr {
            Expr::Call { callee, args } => {
                assert_eq!(mangle(&callee, args.len()), "f$3");
            }
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_member_chain_is_left_associative() {
        let expr = parse_expr("a.b.c");
        match expr {
            Expr::Member { object, field } => {
                assert_eq!(field, "c");
                assert!(matches!(*object, Expr::Member { .. }));
            }
            other => panic!("expected member chain, got {:?}", other),
        }
    }

    #[test]
    fn test_struct_literal() {
        let expr = parse_expr("Point{x: 3.0, y: 4.0}");
        match expr {
            Expr::StructLit { name, fields } => {
                assert_eq!(name, "Point");
                assert_eq!(fields.len(), 2);
                assert_eq!(fields[0].0, "x");
                assert_eq!(fields[1].0, "y");
            }
            other => panic!("expected struct literal, got {:?}", other),
        }
    }

    #[test]
    fn test_let_without_body_at_statement_position() {
        let expr = parse_expr("let x = 1;");
        match expr {
            Expr::Let { name, body, .. } => {
                assert_eq!(name, "x");
                assert!(body.is_none());
            }
            other => panic!("expected let, got {:?}", other),
        }
    }

    #[test]
    fn test_let_with_body() {
        let expr = parse_expr("let x = 1 x + x");
        match expr {
            Expr::Let { body, .. } => assert!(body.is_some()),
            other => panic!("expected let, got {:?}", other),
        }
    }

    #[test]
    fn test_assign_to_immutable_is_a_borrow_error() {
        let mut parser = parser("let x = 1; x = 2");
        parser.parse_expression().expect("parses fine");
        assert!(parser
            .checker
            .errors()
            .contains(&crate::borrow::BorrowError::AssignImmutable("x".to_string())));
    }

    #[test]
    fn test_assign_to_mut_is_clean() {
        let mut parser = parser("let mut x = 1; x = 2");
        parser.parse_expression().expect("parses fine");
        assert!(!parser.checker.has_errors());
    }

    #[test]
    fn test_if_then_else() {
        let expr = parse_expr("if c then 1 else 2");
        match expr {
            Expr::If { else_body, .. } => assert!(else_body.is_some()),
            other => panic!("expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_if_without_else_consumes_end() {
        let mut parser = parser("if c then 1 end 99");
        let expr = parser.parse_expression().expect("parses fine");
        match expr {
            Expr::If { else_body, .. } => assert!(else_body.is_none()),
            other => panic!("expected if, got {:?}", other),
        }
        // `end` was eaten; the next token is the 99.
        assert_eq!(parser.current(), &Token::Number(99.0));
    }

    #[test]
    fn test_for_loop_with_default_step() {
        let expr = parse_expr("for i = 1, 10 do i end");
        match expr {
            Expr::For { var, step, .. } => {
                assert_eq!(var, "i");
                assert!(step.is_none());
            }
            other => panic!("expected for, got {:?}", other),
        }
    }

    #[test]
    fn test_for_loop_variable_scope_closes() {
        let mut parser = parser("for i = 1, 10 do i end");
        parser.parse_expression().expect("parses fine");
        assert!(parser.checker.state("i").is_none());
    }

    #[test]
    fn test_while_loop() {
        let expr = parse_expr("while x < 3 do x = x + 1 end");
        assert!(matches!(expr, Expr::While { .. }));
    }

    #[test]
    fn test_prototype_defaults_to_float() {
        let mut parser = parser("f(a, b: int) -> bool");
        let proto = parser.parse_prototype().expect("parses fine");
        assert_eq!(proto.args[0].ty, TypeInfo::Float);
        assert_eq!(proto.args[1].ty, TypeInfo::Int);
        assert_eq!(proto.return_type, TypeInfo::Bool);
        assert_eq!(proto.registered_name(), "f$2");

        let mut parser2 = self::parser("g()");
        let proto = parser2.parse_prototype().expect("parses fine");
        assert_eq!(proto.return_type, TypeInfo::Float);
        assert_eq!(proto.registered_name(), "g$0");
    }

    #[test]
    fn test_definition_declares_params_in_scope() {
        let mut parser = parser("def f(a, b) a + b");
        let func = parser.parse_definition().expect("parses fine");
        assert_eq!(func.proto.registered_name(), "f$2");
        assert!(!parser.checker.has_errors());
        // The parameter scope is gone once the body ends.
        assert!(parser.checker.state("a").is_none());
    }

    #[test]
    fn test_extern_keeps_bare_name() {
        let mut parser = parser("extern fermat_println(v)");
        let proto = parser.parse_extern().expect("parses fine");
        assert!(proto.is_extern);
        assert_eq!(proto.registered_name(), "fermat_println");
    }

    #[test]
    fn test_static_with_and_without_initializer() {
        let mut parser = parser("static counter: int = 3");
        let var = parser.parse_static().expect("parses fine");
        assert_eq!(var.ty, TypeInfo::Int);
        assert_eq!(
            var.init,
            Expr::Number {
                value: 3.0,
                is_int: false
            }
        );

        let mut parser2 = self::parser("static zeroed");
        let var = parser2.parse_static().expect("parses fine");
        assert_eq!(var.ty, TypeInfo::Float);
        assert_eq!(
            var.init,
            Expr::Number {
                value: 0.0,
                is_int: false
            }
        );
    }

    #[test]
    fn test_struct_def() {
        let mut parser = parser("type Point struct x: float y: float end");
        let def = parser.parse_struct_def().expect("parses fine");
        assert_eq!(def.name, "Point");
        assert_eq!(def.fields.len(), 2);
        assert!(!def.is_abstract);
    }

    #[test]
    fn test_abstract_struct_def() {
        let mut parser = parser("abstract type Shape struct kind: float end");
        let def = parser.parse_struct_def().expect("parses fine");
        assert!(def.is_abstract);
    }

    #[test]
    fn test_import_path() {
        let mut parser = parser("import \"lib/math.fm\"");
        assert_eq!(
            parser.parse_import().expect("parses fine"),
            "lib/math.fm".to_string()
        );
    }

    #[test]
    fn test_import_requires_string() {
        let mut parser = parser("import math");
        assert!(parser.parse_import().is_err());
    }

    #[test]
    fn test_top_level_let_glues_following_statements() {
        let mut parser = parser("let x = 1; x + 1;");
        let unit = parser.parse_top_level_expr().expect("parses fine");
        assert!(matches!(
            unit.body,
            Expr::Binary {
                op: BinOp::Seq,
                ..
            }
        ));
        assert_eq!(parser.current(), &Token::Eof);
    }

    #[test]
    fn test_top_level_call_ends_at_semicolon() {
        let mut parser = parser("f(5); f(6);");
        let first = parser.parse_top_level_expr().expect("parses fine");
        assert!(matches!(first.body, Expr::Call { .. }));
        // The separating ';' is left for the driver to skip.
        assert_eq!(parser.current(), &Token::Char(b';'));
    }

    #[test]
    fn test_anon_wrapper_names_are_monotonic() {
        let mut parser = parser("1 2 3");
        let first = parser.parse_top_level_expr().expect("parses fine");
        let second = parser.parse_top_level_expr().expect("parses fine");
        assert_eq!(first.proto.mangled_name(), "anon_expr_0$0");
        assert_eq!(second.proto.mangled_name(), "anon_expr_1$0");
    }

    #[test]
    fn test_paren_expression_requires_close() {
        let mut parser = parser("(1 + 2");
        assert!(parser.parse_expression().is_err());
    }

    #[test]
    fn test_unknown_token_reports_an_error() {
        let mut parser = parser("then");
        assert!(matches!(
            parser.parse_expression(),
            Err(ParseError::ExpectedExpression(_))
        ));
    }
}
