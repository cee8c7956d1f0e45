//! AST nodes for fermat: expressions, declarations, and type descriptors.

use std::fmt;

/// Type descriptor. `Unknown` is the pre-inference placeholder; `Float` is
/// the default for literals and unannotated parameters and returns.
/// Equality is structural on (kind, struct name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeInfo {
    Unknown,
    Int,
    Float,
    String,
    Bool,
    Void,
    Struct(String),
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeInfo::Unknown => write!(f, "unknown"),
            TypeInfo::Int => write!(f, "int"),
            TypeInfo::Float => write!(f, "float"),
            TypeInfo::String => write!(f, "string"),
            TypeInfo::Bool => write!(f, "bool"),
            TypeInfo::Void => write!(f, "void"),
            TypeInfo::Struct(name) => write!(f, "{}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructField {
    pub name: String,
    pub ty: TypeInfo,
}

/// A named struct: ordered fields, optionally declared `abstract` (a parsed
/// flag with no runtime effect).
#[derive(Debug, Clone, PartialEq)]
pub struct StructDef {
    pub name: String,
    pub fields: Vec<StructField>,
    pub is_abstract: bool,
}

impl StructDef {
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Gt,
    Eq,
    Ne,
    /// The sequence operator `;`: evaluates both sides, yields the right.
    Seq,
}

impl BinOp {
    pub fn precedence(self) -> i32 {
        match self {
            BinOp::Seq => 1,
            BinOp::Lt | BinOp::Gt | BinOp::Eq | BinOp::Ne => 10,
            BinOp::Add | BinOp::Sub => 20,
            BinOp::Mul | BinOp::Div => 40,
        }
    }
}

/// Expression nodes. Parents own their children exclusively.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number {
        value: f64,
        is_int: bool,
    },
    StringLit(String),
    Variable(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// Resolved at lowering time by the arity-mangled name `callee$N`.
    Call {
        callee: String,
        args: Vec<Expr>,
    },
    /// A let with no body is legal only at statement position and yields
    /// the initializer's value.
    Let {
        name: String,
        mutable: bool,
        ty: TypeInfo,
        init: Box<Expr>,
        body: Option<Box<Expr>>,
    },
    Assign {
        name: String,
        value: Box<Expr>,
    },
    If {
        cond: Box<Expr>,
        then_body: Box<Expr>,
        else_body: Option<Box<Expr>>,
    },
    /// Half-open iteration over `[start, end)`; step defaults to 1.0.
    For {
        var: String,
        start: Box<Expr>,
        end: Box<Expr>,
        step: Option<Box<Expr>>,
        body: Box<Expr>,
    },
    While {
        cond: Box<Expr>,
        body: Box<Expr>,
    },
    Break,
    Continue,
    StructLit {
        name: String,
        fields: Vec<(String, Expr)>,
    },
    Member {
        object: Box<Expr>,
        field: String,
    },
}

impl Expr {
    /// Best-effort pre-inference type of this expression.
    pub fn type_of(&self) -> TypeInfo {
        match self {
            Expr::Number { is_int: true, .. } => TypeInfo::Int,
            Expr::StringLit(_) => TypeInfo::String,
            Expr::StructLit { name, .. } => TypeInfo::Struct(name.clone()),
            _ => TypeInfo::Float,
        }
    }
}

/// The canonical registration key for a function of `arity` parameters.
pub fn mangle(name: &str, arity: usize) -> String {
    format!("{}${}", name, arity)
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedArg {
    pub name: String,
    pub ty: TypeInfo,
}

/// A function signature. Carries both the source name and the arity-mangled
/// name; externs register and link under the bare source name.
#[derive(Debug, Clone, PartialEq)]
pub struct Prototype {
    pub name: String,
    pub args: Vec<TypedArg>,
    pub return_type: TypeInfo,
    pub is_extern: bool,
    mangled: String,
}

impl Prototype {
    pub fn new(name: String, args: Vec<TypedArg>, return_type: TypeInfo) -> Self {
        let mangled = mangle(&name, args.len());
        Self {
            name,
            args,
            return_type,
            is_extern: false,
            mangled,
        }
    }

    pub fn mangled_name(&self) -> &str {
        &self.mangled
    }

    /// The name the function is registered and looked up under.
    pub fn registered_name(&self) -> &str {
        if self.is_extern {
            &self.name
        } else {
            &self.mangled
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub proto: Prototype,
    pub body: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GlobalVar {
    pub name: String,
    pub ty: TypeInfo,
    pub init: Expr,
}
