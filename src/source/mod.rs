//! Source Index: the symbol oracle the call-graph engine queries.
//!
//! [`SourceIndex`] is the seam between the engine and whatever produced the
//! syntax model. [`JavaIndex`] is the tree-sitter backed implementation.

pub mod ast;
mod accessors;
mod compiled;
mod index;
mod modules;
mod parser_java;
pub mod primitives;
mod primary;

pub use ast::*;
pub use compiled::{CompiledCatalog, CompiledField, CompiledMethod, CompiledType, CompiledTypes};
pub use index::{IndexBuilder, IndexOptions, JavaIndex};
pub use modules::{discover_modules, ModuleRoot};

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use primitives::{Primitive, OBJECT};

// ─── Resolved types ──────────────────────────────────────────────────

/// Where a resolved type's information comes from.
#[derive(Debug, Clone)]
pub enum TypeOrigin {
    Source(TypeId),
    Compiled(Arc<CompiledType>),
    Primitive(Primitive),
    Array(Box<TypeInfo>),
    /// A type variable with its (qualified) upper bounds
    Variable(Vec<TypeInfo>),
    /// Only the name is known: an external type missing from every catalog
    Unresolved,
}

/// A type name tagged with the declaration or compiled handle behind it.
#[derive(Debug, Clone)]
pub struct TypeInfo {
    pub name: String,
    pub origin: TypeOrigin,
}

impl TypeInfo {
    pub fn unresolved(name: impl Into<String>) -> Self {
        TypeInfo { name: name.into(), origin: TypeOrigin::Unresolved }
    }

    pub fn primitive(p: Primitive) -> Self {
        TypeInfo { name: p.name().to_string(), origin: TypeOrigin::Primitive(p) }
    }

    pub fn array(component: TypeInfo) -> Self {
        TypeInfo { name: format!("{}[]", component.name), origin: TypeOrigin::Array(Box::new(component)) }
    }

    pub fn void() -> Self {
        TypeInfo::unresolved("void")
    }

    pub fn source_id(&self) -> Option<TypeId> {
        match self.origin {
            TypeOrigin::Source(id) => Some(id),
            _ => None,
        }
    }

    pub fn compiled(&self) -> Option<&CompiledType> {
        match &self.origin {
            TypeOrigin::Compiled(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_primitive(&self) -> Option<Primitive> {
        match self.origin {
            TypeOrigin::Primitive(p) => Some(p),
            _ => None,
        }
    }

    pub fn component(&self) -> Option<&TypeInfo> {
        match &self.origin {
            TypeOrigin::Array(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self.origin, TypeOrigin::Variable(_))
    }

    pub fn is_void(&self) -> bool {
        self.name == "void"
    }

    /// Declared in analyzed source or described by compiled metadata.
    pub fn is_known(&self) -> bool {
        matches!(
            self.origin,
            TypeOrigin::Source(_) | TypeOrigin::Compiled(_) | TypeOrigin::Primitive(_)
        ) || self.component().is_some_and(TypeInfo::is_known)
    }

    /// A type variable stands for its first bound (or `Object`) when members are looked up.
    pub fn erased<'a, I: SourceIndex + ?Sized>(&'a self, index: &I) -> std::borrow::Cow<'a, TypeInfo> {
        match &self.origin {
            TypeOrigin::Variable(bounds) => match bounds.first() {
                Some(b) => std::borrow::Cow::Borrowed(b),
                None => std::borrow::Cow::Owned(index.type_info(OBJECT)),
            },
            _ => std::borrow::Cow::Borrowed(self),
        }
    }
}

/// Context for qualifying a written type: the enclosing type plus any method type parameters.
#[derive(Debug, Clone, Copy)]
pub struct TypeScope<'a> {
    pub type_id: TypeId,
    pub type_params: &'a [TypeParam],
}

// ─── Expression context ──────────────────────────────────────────────

/// Where an expression sits: which method body and which lexical scope.
#[derive(Debug, Clone, Copy)]
pub struct ExprContext<'a> {
    pub method: MethodRef,
    pub decl: &'a MethodDecl,
    pub scope: ScopeId,
}

/// What a simple name refers to inside a method body.
#[derive(Debug, Clone, Copy)]
pub enum Binding<'a> {
    Local(&'a LocalVar),
    LambdaParam(&'a LambdaParam),
    Param(&'a Param),
}

impl<'a> ExprContext<'a> {
    pub fn new(method: MethodRef, decl: &'a MethodDecl, scope: ScopeId) -> Self {
        ExprContext { method, decl, scope }
    }

    pub fn type_id(&self) -> TypeId {
        self.method.type_id
    }

    pub fn type_scope(&self) -> TypeScope<'a> {
        TypeScope { type_id: self.method.type_id, type_params: &self.decl.type_params }
    }

    /// Supertype written at the innermost enclosing anonymous class, if any.
    pub fn anonymous_base(&self) -> Option<&'a TypeRef> {
        self.decl.body.as_ref()?.anonymous_base(self.scope)
    }

    /// Innermost lambda parameters and locals first, then the method's parameters.
    pub fn binding(&self, name: &str) -> Option<Binding<'a>> {
        if let Some(body) = &self.decl.body {
            for scope in body.scope_chain(self.scope) {
                if let Some(p) = scope.lambda_params.iter().find(|p| p.name == name) {
                    return Some(Binding::LambdaParam(p));
                }
                if let Some(v) = scope.locals.iter().find(|v| v.name == name) {
                    return Some(Binding::Local(v));
                }
            }
        }
        self.decl.params.iter().find(|p| p.name == name).map(Binding::Param)
    }
}

/// A call the primary resolver pinned to one declaration.
#[derive(Debug, Clone)]
pub struct ResolvedCall {
    pub declaring_type: TypeInfo,
    pub name: String,
    /// Canonical parameter type names of the selected declaration
    pub param_types: Vec<String>,
    /// Present when the callee is declared in analyzed source
    pub declaration: Option<MethodRef>,
    pub return_type: Option<TypeInfo>,
}

// ─── The oracle ──────────────────────────────────────────────────────

/// Symbol information consumed by the call-graph engine.
///
/// Implementors supply lookup, qualification and the primary resolver; the
/// hierarchy queries (`ancestors_of`, `is_assignable`, ...) are derived.
pub trait SourceIndex: Send + Sync {
    /// Source declaration for a canonical (`$`-nested) type name.
    fn resolve_type(&self, qualified_name: &str) -> Option<TypeId>;

    fn type_decl(&self, id: TypeId) -> &TypeDecl;

    fn type_count(&self) -> usize;

    fn unit(&self, id: UnitId) -> &CompilationUnit;

    fn compiled(&self) -> &dyn CompiledTypes;

    /// Type information for a canonical name: source, compiled, primitive,
    /// array, or an unresolved placeholder.
    fn type_info(&self, name: &str) -> TypeInfo;

    /// Qualifies a written type in the given declaration context.
    fn qualify(&self, ty: &TypeRef, scope: TypeScope<'_>) -> TypeInfo;

    /// Looks a simple or dotted type name up from inside `context`, the way
    /// the compiler would (nested, imports, package, `java.lang`).
    fn lookup_type_name(&self, name: &str, context: TypeId) -> Option<TypeInfo>;

    /// Owners of statically imported members named `member` visible in `context`.
    fn static_import_owners(&self, context: TypeId, member: &str) -> Vec<TypeInfo>;

    fn module_of(&self, qualified_name: &str) -> Option<&str>;

    /// Direct subtypes only, in declaration order.
    fn direct_subtypes(&self, id: TypeId) -> &[TypeId];

    /// Primary expression typing. May fail for any expression.
    fn resolve_expression_type(&self, expr: &Expr, ctx: &ExprContext<'_>) -> Option<TypeInfo>;

    /// Primary call resolution. May fail for any call.
    fn resolve_call(&self, call: &MethodCall, ctx: &ExprContext<'_>) -> Option<ResolvedCall>;

    // ─── Provided ───────────────────────────────────────────────────

    fn method_decl(&self, m: MethodRef) -> &MethodDecl {
        &self.type_decl(m.type_id).methods[m.index as usize]
    }

    fn method_scope(&self, m: MethodRef) -> TypeScope<'_> {
        TypeScope { type_id: m.type_id, type_params: &self.method_decl(m).type_params }
    }

    fn source_type(&self, id: TypeId) -> TypeInfo {
        TypeInfo { name: self.type_decl(id).qualified_name.clone(), origin: TypeOrigin::Source(id) }
    }

    /// Type of `this` at `ctx`: the written supertype inside an anonymous class body.
    fn this_type(&self, ctx: &ExprContext<'_>) -> TypeInfo {
        match ctx.anonymous_base() {
            Some(base) => self.qualify(base, ctx.type_scope()),
            None => self.source_type(ctx.type_id()),
        }
    }

    /// Target of a `super.` receiver at `ctx`.
    fn super_type(&self, ctx: &ExprContext<'_>) -> Option<TypeInfo> {
        match ctx.anonymous_base() {
            Some(base) => Some(self.qualify(base, ctx.type_scope())),
            None => self.superclass_of(&self.source_type(ctx.type_id())),
        }
    }

    /// Every method of a source type, as [`MethodRef`]s.
    fn methods_of(&self, id: TypeId) -> Vec<MethodRef> {
        (0..self.type_decl(id).methods.len() as u32)
            .map(|index| MethodRef { type_id: id, index })
            .collect()
    }

    /// Declared parameter types of a source method, qualified.
    fn param_types(&self, m: MethodRef) -> Vec<TypeInfo> {
        let scope = self.method_scope(m);
        self.method_decl(m)
            .params
            .iter()
            .map(|p| {
                let ty = self.qualify(&p.ty, scope);
                if p.varargs { TypeInfo::array(ty) } else { ty }
            })
            .collect()
    }

    fn superclass_of(&self, ty: &TypeInfo) -> Option<TypeInfo> {
        match &ty.origin {
            TypeOrigin::Source(id) => {
                let decl = self.type_decl(*id);
                let scope = TypeScope { type_id: *id, type_params: &decl.type_params };
                match decl.kind {
                    TypeKind::Interface | TypeKind::Annotation => None,
                    TypeKind::Enum => Some(self.type_info("java.lang.Enum")),
                    TypeKind::Record => Some(self.type_info("java.lang.Record")),
                    TypeKind::Class => Some(match decl.extends.first() {
                        Some(parent) => self.qualify(parent, scope),
                        None => self.type_info(OBJECT),
                    }),
                }
            }
            TypeOrigin::Compiled(c) => c.superclass_name().map(|name| self.type_info(name)),
            TypeOrigin::Array(_) => Some(self.type_info(OBJECT)),
            TypeOrigin::Variable(_) => Some(ty.erased(self).into_owned()),
            TypeOrigin::Primitive(_) | TypeOrigin::Unresolved => None,
        }
    }

    fn interfaces_of(&self, ty: &TypeInfo) -> Vec<TypeInfo> {
        match &ty.origin {
            TypeOrigin::Source(id) => {
                let decl = self.type_decl(*id);
                let scope = TypeScope { type_id: *id, type_params: &decl.type_params };
                let written = if decl.is_interface() { &decl.extends } else { &decl.implements };
                written.iter().map(|t| self.qualify(t, scope)).collect()
            }
            TypeOrigin::Compiled(c) => c.interfaces.iter().map(|name| self.type_info(name)).collect(),
            _ => Vec::new(),
        }
    }

    /// Every reachable supertype: the class chain first, then interfaces
    /// breadth-first. Unresolved types are included by name and not expanded.
    fn ancestors_of(&self, ty: &TypeInfo) -> Vec<TypeInfo> {
        let mut seen: HashSet<String> = HashSet::new();
        seen.insert(ty.name.clone());
        let mut chain = Vec::new();
        let mut current = self.superclass_of(ty);
        while let Some(parent) = current {
            if !seen.insert(parent.name.clone()) {
                break;
            }
            current = self.superclass_of(&parent);
            chain.push(parent);
        }

        let mut result = chain.clone();
        let mut queue: VecDeque<TypeInfo> = std::iter::once(ty.clone()).chain(chain).collect();
        while let Some(next) = queue.pop_front() {
            for iface in self.interfaces_of(&next) {
                if seen.insert(iface.name.clone()) {
                    result.push(iface.clone());
                    queue.push_back(iface);
                }
            }
        }
        result
    }

    /// True when a value of type `sub_type_name` can be assigned to `super_type`.
    fn is_assignable(&self, super_type: &TypeInfo, sub_type_name: &str) -> bool {
        if super_type.name == sub_type_name {
            return true;
        }
        match &super_type.origin {
            TypeOrigin::Variable(bounds) => bounds.iter().all(|b| self.is_assignable(b, sub_type_name)),
            TypeOrigin::Primitive(_) => false,
            TypeOrigin::Array(component) => sub_type_name
                .strip_suffix("[]")
                .is_some_and(|sub| self.is_assignable(component, sub)),
            _ => {
                if primitives::is_primitive_name(sub_type_name) {
                    return false;
                }
                if super_type.name == OBJECT {
                    return true;
                }
                let sub = self.type_info(sub_type_name);
                self.ancestors_of(&sub).iter().any(|a| a.name == super_type.name)
            }
        }
    }

    /// Method-invocation conversion: identity, widening, boxing, unboxing, subtyping.
    fn accepts(&self, param: &TypeInfo, arg: &TypeInfo) -> bool {
        match (&param.origin, &arg.origin) {
            (TypeOrigin::Primitive(p), TypeOrigin::Primitive(a)) => p.accepts(*a),
            (TypeOrigin::Primitive(p), _) => Primitive::from_wrapper(&arg.name).is_some_and(|a| p.accepts(a)),
            (TypeOrigin::Variable(_), TypeOrigin::Primitive(_)) => true,
            (_, TypeOrigin::Primitive(a)) => self.is_assignable(param, a.wrapper()),
            _ => self.is_assignable(param, &arg.name),
        }
    }

    /// Field (or enum constant) `name` visible on `owner`, walking inheritance.
    fn field_type(&self, owner: &TypeInfo, name: &str) -> Option<TypeInfo> {
        if owner.component().is_some() {
            return (name == "length").then(|| TypeInfo::primitive(Primitive::Int));
        }
        let owner = owner.erased(self).into_owned();
        std::iter::once(owner.clone())
            .chain(self.ancestors_of(&owner))
            .find_map(|ty| self.declared_field_type(&ty, name))
    }

    fn declared_field_type(&self, ty: &TypeInfo, name: &str) -> Option<TypeInfo> {
        match &ty.origin {
            TypeOrigin::Source(id) => {
                let decl = self.type_decl(*id);
                if decl.enum_constants.iter().any(|c| c == name) {
                    return Some(ty.clone());
                }
                let field = decl.fields.iter().find(|f| f.name == name)?;
                Some(self.qualify(&field.ty, TypeScope { type_id: *id, type_params: &decl.type_params }))
            }
            TypeOrigin::Compiled(c) => c.field(name).map(|f| self.type_info(&f.ty)),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "source_tests.rs"]
mod tests;
