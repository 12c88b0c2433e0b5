//! Compact Java syntax model produced by the tree-sitter loader.
//!
//! Only what call-graph resolution needs survives lowering: type headers,
//! member signatures, and for each method body a flat pre-order list of call
//! sites, each pointing into an arena of lexical scopes.

use serde::Serialize;

use super::primitives::Primitive;

// ─── Identifiers ─────────────────────────────────────────────────────

/// Index of a type declaration inside a [`JavaIndex`](super::JavaIndex).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(pub u32);

/// Index of a compilation unit (one `.java` file).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct UnitId(pub u32);

/// A method declaration: owning type plus position in its `methods` list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MethodRef {
    pub type_id: TypeId,
    pub index: u32,
}

/// Index into [`Body::scopes`]. Scope 0 is always the method's own block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScopeId(pub u32);

// ─── Files and types ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Dotted name without the trailing `.*`
    pub name: String,
    pub is_static: bool,
    pub is_asterisk: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CompilationUnit {
    pub path: String,
    pub package: Option<String>,
    pub imports: Vec<Import>,
    pub module: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

#[derive(Debug, Clone)]
pub struct TypeParam {
    pub name: String,
    pub bounds: Vec<TypeRef>,
}

#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeRef,
    pub is_static: bool,
    pub is_final: bool,
    pub annotations: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub ty: TypeRef,
    pub varargs: bool,
}

#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub name: String,
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub return_type: TypeRef,
    pub modifiers: Vec<String>,
    pub annotations: Vec<String>,
    pub body: Option<Body>,
    pub line_start: u32,
    pub line_end: u32,
    /// Accessor generated from a `@Data`/`@Getter`/`@Setter` annotation
    pub synthetic: bool,
}

impl MethodDecl {
    pub fn is_static(&self) -> bool {
        self.modifiers.iter().any(|m| m == "static")
    }

    pub fn is_varargs(&self) -> bool {
        self.params.last().is_some_and(|p| p.varargs)
    }
}

#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub name: String,
    /// `pkg.Outer$Inner`
    pub qualified_name: String,
    pub kind: TypeKind,
    pub unit: UnitId,
    pub outer: Option<TypeId>,
    pub type_params: Vec<TypeParam>,
    /// `extends` clause: at most one entry for classes, any number for interfaces
    pub extends: Vec<TypeRef>,
    pub implements: Vec<TypeRef>,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<MethodDecl>,
    pub enum_constants: Vec<String>,
    pub annotations: Vec<String>,
    pub modifiers: Vec<String>,
    pub line: u32,
}

impl TypeDecl {
    pub fn is_interface(&self) -> bool {
        matches!(self.kind, TypeKind::Interface | TypeKind::Annotation)
    }
}

// ─── Type references (unresolved, as written) ────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Void,
    /// `var` in a local declaration
    Inferred,
    Primitive(Primitive),
    /// `Foo`, `java.util.List<String>`, `Map.Entry<K, V>`
    Named { name: String, args: Vec<TypeRef> },
    Array(Box<TypeRef>),
    /// `?`, `? extends T`, `? super T`; only appears inside type arguments
    Wildcard(Option<Box<TypeRef>>),
}

impl TypeRef {
    pub fn named(name: &str) -> Self {
        TypeRef::Named { name: name.to_string(), args: Vec::new() }
    }

    pub fn array_of(component: TypeRef) -> Self {
        TypeRef::Array(Box::new(component))
    }
}

// ─── Method bodies ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeKind {
    Method,
    Block,
    Lambda,
    /// Body of an anonymous class; `this` is an instance of the written supertype
    Anonymous(TypeRef),
}

#[derive(Debug, Clone)]
pub struct LocalVar {
    pub name: String,
    pub ty: TypeRef,
    pub init: Option<Expr>,
    /// Set for the variable of an enhanced `for`: the iterated expression
    pub iterable: Option<Expr>,
}

#[derive(Debug, Clone)]
pub struct LambdaParam {
    pub name: String,
    /// `None` when the lambda parameter's type is implicit
    pub ty: Option<TypeRef>,
}

#[derive(Debug, Clone)]
pub struct LexicalScope {
    pub parent: Option<ScopeId>,
    pub kind: ScopeKind,
    pub locals: Vec<LocalVar>,
    pub lambda_params: Vec<LambdaParam>,
}

#[derive(Debug, Clone)]
pub struct CallSite {
    pub call: MethodCall,
    pub scope: ScopeId,
    pub line: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Body {
    pub scopes: Vec<LexicalScope>,
    /// Pre-order: an outer call precedes the calls nested inside it
    pub calls: Vec<CallSite>,
}

impl Body {
    pub fn scope(&self, id: ScopeId) -> Option<&LexicalScope> {
        self.scopes.get(id.0 as usize)
    }

    /// Walks from `id` to the method scope, innermost first.
    /// Supertype of the innermost anonymous class enclosing `id`, if any.
    pub fn anonymous_base(&self, id: ScopeId) -> Option<&TypeRef> {
        self.scope_chain(id).find_map(|s| match &s.kind {
            ScopeKind::Anonymous(base) => Some(base),
            _ => None,
        })
    }

    pub fn scope_chain(&self, id: ScopeId) -> impl Iterator<Item = &LexicalScope> {
        let mut next = self.scope(id);
        std::iter::from_fn(move || {
            let current = next?;
            next = current.parent.and_then(|p| self.scope(p));
            Some(current)
        })
    }
}

// ─── Expressions ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MethodCall {
    /// `None` for an unqualified call such as `foo(x)`
    pub receiver: Option<Box<Expr>>,
    pub name: String,
    pub args: Vec<Expr>,
}

impl MethodCall {
    /// Simple name of the receiver when it is a bare identifier (`logger.info`).
    pub fn receiver_name(&self) -> Option<&str> {
        match self.receiver.as_deref() {
            Some(Expr::Name(name)) => Some(name),
            Some(Expr::FieldAccess { name, .. }) => Some(name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literal {
    Int,
    Long,
    Float,
    Double,
    Char,
    Boolean,
    String,
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    UShr,
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl BinaryOp {
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Rem,
            "&" => BinaryOp::BitAnd,
            "|" => BinaryOp::BitOr,
            "^" => BinaryOp::BitXor,
            "<<" => BinaryOp::Shl,
            ">>" => BinaryOp::Shr,
            ">>>" => BinaryOp::UShr,
            "&&" => BinaryOp::And,
            "||" => BinaryOp::Or,
            "==" => BinaryOp::Eq,
            "!=" => BinaryOp::Ne,
            "<" => BinaryOp::Lt,
            ">" => BinaryOp::Gt,
            "<=" => BinaryOp::Le,
            ">=" => BinaryOp::Ge,
            _ => return None,
        })
    }

    /// Comparison and logical operators always produce `boolean`.
    pub fn is_boolean(self) -> bool {
        matches!(
            self,
            BinaryOp::And
                | BinaryOp::Or
                | BinaryOp::Eq
                | BinaryOp::Ne
                | BinaryOp::Lt
                | BinaryOp::Gt
                | BinaryOp::Le
                | BinaryOp::Ge
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    Plus,
    BitNot,
    Increment,
    Decrement,
}

/// Closed set of expression shapes. Anything the loader does not model
/// becomes [`Expr::Unsupported`] carrying the tree-sitter node kind.
#[derive(Debug, Clone)]
pub enum Expr {
    Literal(Literal),
    Name(String),
    FieldAccess { receiver: Box<Expr>, name: String },
    Call(MethodCall),
    New { ty: TypeRef, args: Vec<Expr> },
    NewArray(TypeRef),
    ArrayAccess(Box<Expr>),
    Binary { op: BinaryOp, left: Box<Expr>, right: Box<Expr> },
    Unary { op: UnaryOp, operand: Box<Expr> },
    Conditional { then: Box<Expr>, otherwise: Box<Expr> },
    Cast { ty: TypeRef, expr: Box<Expr> },
    InstanceOf(Box<Expr>),
    Assign { target: Box<Expr>, value: Box<Expr> },
    This,
    Super,
    ClassLiteral(TypeRef),
    Lambda,
    MethodReference,
    Unsupported(String),
}

impl Expr {
    pub fn is_string_literal(&self) -> bool {
        matches!(self, Expr::Literal(Literal::String))
    }
}
