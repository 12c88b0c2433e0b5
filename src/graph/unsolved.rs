//! Heuristic inference for calls the primary resolver could not pin down.
//!
//! Each step returns `Option` and the steps are chained with `or_else`; the
//! first step that knows the answer wins and a `None` at the end drops the call.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::source::ast::{BinaryOp, Expr, Literal, MethodCall, TypeRef, UnaryOp};
use crate::source::primitives::{self, Primitive, CLASS, OBJECT, STRING};
use crate::source::{Binding, CompiledMethod, CompiledType, ExprContext, MethodRef, SourceIndex, TypeId, TypeInfo, TypeOrigin};

use super::types::MethodId;

/// Best guess at a callee: its identity and the type it was found on.
#[derive(Debug, Clone)]
pub(crate) struct InferredCall {
    pub id: MethodId,
    pub declaring_type: TypeInfo,
}

/// A compiled method together with the compiled type that declares it.
#[derive(Debug, Clone)]
struct CompiledCandidate {
    owner: Arc<CompiledType>,
    method: CompiledMethod,
}

pub(crate) struct Inferencer<'a, I: SourceIndex + ?Sized> {
    index: &'a I,
    excluded_receivers: &'a HashSet<String>,
}

impl<'a, I: SourceIndex + ?Sized> Inferencer<'a, I> {
    pub fn new(index: &'a I, excluded_receivers: &'a HashSet<String>) -> Self {
        Inferencer { index, excluded_receivers }
    }

    // ─── Calls ──────────────────────────────────────────────────────

    pub fn infer_call(&self, call: &MethodCall, ctx: &ExprContext<'_>) -> Option<InferredCall> {
        if let Some(receiver) = call.receiver_name() {
            if self.excluded_receivers.contains(receiver) {
                debug!(receiver, method = %call.name, "Skipping excluded receiver");
                return None;
            }
        }

        let mut args = Vec::with_capacity(call.args.len());
        for (position, arg) in call.args.iter().enumerate() {
            match self.type_of(arg, ctx) {
                Some(ty) => args.push(Some(ty)),
                None => {
                    debug!(method = %call.name, position, "Argument type unresolvable, dropping call");
                    return None;
                }
            }
        }

        let declaring = self.declaring_type(call, &args, ctx)?;
        let arg_names = || args.iter().flatten().map(|a| a.name.clone()).collect::<Vec<_>>();

        let by_args = |declaring: TypeInfo| (MethodId::new(declaring.name.clone(), call.name.clone(), arg_names()), declaring);
        let (id, declaring) = if declaring.compiled().is_some() {
            match self.select_compiled(&declaring, &call.name, &args) {
                Some(c) => {
                    let owner = TypeInfo { name: c.owner.name.clone(), origin: TypeOrigin::Compiled(c.owner) };
                    (MethodId::new(owner.name.clone(), call.name.clone(), c.method.params), owner)
                }
                None => by_args(declaring),
            }
        } else if let Some(type_id) = declaring.source_id() {
            match self.source_candidates(type_id, &call.name, &args).as_slice() {
                [single] => (MethodId::of(self.index, *single), declaring),
                _ => by_args(declaring),
            }
        } else {
            by_args(declaring)
        };
        debug!(method = %id, "Inferred unsolved call");
        Some(InferredCall { id, declaring_type: declaring })
    }

    fn declaring_type(&self, call: &MethodCall, args: &[Option<TypeInfo>], ctx: &ExprContext<'_>) -> Option<TypeInfo> {
        let receiver = match call.receiver.as_deref() {
            None => {
                return self
                    .lookup_unqualified(ctx, &call.name, args)
                    .or_else(|| {
                        debug!(method = %call.name, "No declaring type for unqualified call");
                        None
                    });
            }
            Some(Expr::Super) => self.index.super_type(ctx)?,
            Some(expr) => self.type_of(expr, ctx)?.erased(self.index).into_owned(),
        };
        let found = std::iter::once(receiver.clone())
            .chain(self.index.ancestors_of(&receiver))
            .find(|t| self.method_exists_in(t, &call.name, args));
        Some(found.unwrap_or(receiver))
    }

    /// Anonymous class supertype, then own type and enclosing types, each with
    /// its ancestors, then static imports.
    fn lookup_unqualified(&self, ctx: &ExprContext<'_>, name: &str, args: &[Option<TypeInfo>]) -> Option<TypeInfo> {
        let own = ctx.type_id();
        let anonymous = ctx.anonymous_base().map(|base| self.index.qualify(base, ctx.type_scope()));
        anonymous
            .into_iter()
            .chain(self.enclosing_types(own).into_iter().map(|t| self.index.source_type(t)))
            .flat_map(|ty| {
                let ancestors = self.index.ancestors_of(&ty);
                std::iter::once(ty).chain(ancestors)
            })
            .find(|t| self.method_exists_in(t, name, args))
            .or_else(|| {
                self.index
                    .static_import_owners(own, name)
                    .into_iter()
                    .find(|t| self.method_exists_in(t, name, args))
            })
    }

    fn enclosing_types(&self, id: TypeId) -> Vec<TypeId> {
        let mut chain = vec![id];
        while let Some(outer) = chain.last().and_then(|t| self.index.type_decl(*t).outer) {
            chain.push(outer);
        }
        chain
    }

    /// Whether `ty` itself declares an applicable `name` for these arguments.
    fn method_exists_in(&self, ty: &TypeInfo, name: &str, args: &[Option<TypeInfo>]) -> bool {
        match &ty.origin {
            TypeOrigin::Source(id) => !self.source_candidates(*id, name, args).is_empty(),
            TypeOrigin::Compiled(c) => c.declared_methods(name).any(|m| self.compiled_applicable(m, args)),
            _ => false,
        }
    }

    fn source_candidates(&self, id: TypeId, name: &str, args: &[Option<TypeInfo>]) -> Vec<MethodRef> {
        self.index
            .methods_of(id)
            .into_iter()
            .filter(|m| {
                let decl = self.index.method_decl(*m);
                decl.name == name && self.applicable(&self.index.param_types(*m), decl.is_varargs(), args)
            })
            .collect()
    }

    fn compiled_applicable(&self, method: &CompiledMethod, args: &[Option<TypeInfo>]) -> bool {
        let params: Vec<TypeInfo> = method.params.iter().map(|p| self.index.type_info(p)).collect();
        self.applicable(&params, method.varargs, args)
    }

    /// Arity (with varargs expansion) and per-argument acceptance. An unknown argument matches anything.
    fn applicable(&self, params: &[TypeInfo], varargs: bool, args: &[Option<TypeInfo>]) -> bool {
        let fixed = if varargs { params.len().saturating_sub(1) } else { params.len() };
        if (!varargs && args.len() != params.len()) || (varargs && args.len() < fixed) {
            return false;
        }
        args.iter().enumerate().all(|(i, arg)| {
            let Some(arg) = arg else { return true };
            if i < fixed {
                return self.index.accepts(&params[i], arg);
            }
            let Some(array) = params.last() else { return false };
            (args.len() == params.len() && self.index.accepts(array, arg))
                || array.component().is_some_and(|c| self.index.accepts(c, arg))
        })
    }

    fn param_at<'p>(params: &'p [TypeInfo], varargs: bool, i: usize, arity: usize) -> Option<&'p TypeInfo> {
        let last = params.len().checked_sub(1)?;
        if varargs && i >= last && !(arity == params.len() && i == last) {
            return params[last].component();
        }
        params.get(i)
    }

    // ─── Compiled overloads ─────────────────────────────────────────

    /// Picks one compiled overload of `name`, searching `start` and its compiled ancestors.
    fn select_compiled(&self, start: &TypeInfo, name: &str, args: &[Option<TypeInfo>]) -> Option<CompiledCandidate> {
        let mut seen: HashSet<Vec<String>> = HashSet::new();
        let mut candidates = Vec::new();
        for ty in std::iter::once(start.clone()).chain(self.index.ancestors_of(start)) {
            let TypeOrigin::Compiled(compiled) = &ty.origin else { continue };
            for m in compiled.declared_methods(name) {
                if seen.insert(m.params.clone()) {
                    candidates.push(CompiledCandidate { owner: Arc::clone(compiled), method: m.clone() });
                }
            }
        }
        if candidates.len() <= 1 {
            return candidates.pop();
        }

        let mut applicable: Vec<CompiledCandidate> = candidates
            .into_iter()
            .filter(|c| self.compiled_applicable(&c.method, args))
            .collect();
        if applicable.len() <= 1 {
            return applicable.pop();
        }
        if args.iter().any(Option::is_none) {
            debug!(owner = %start.name, method = name, candidates = applicable.len(), "Ambiguous overload with unknown arguments");
            return None;
        }

        let params: Vec<Vec<TypeInfo>> = applicable
            .iter()
            .map(|c| c.method.params.iter().map(|p| self.index.type_info(p)).collect())
            .collect();
        let winners: Vec<usize> = (0..applicable.len())
            .filter(|&i| {
                (0..applicable.len()).all(|j| {
                    i == j || !self.more_specific(&params[j], applicable[j].method.varargs, &params[i], applicable[i].method.varargs, args)
                })
            })
            .collect();
        match winners.as_slice() {
            [single] => Some(applicable.swap_remove(*single)),
            _ => {
                debug!(owner = %start.name, method = name, candidates = applicable.len(), "Ambiguous overload");
                None
            }
        }
    }

    /// `a` is strictly more specific than `b`: never worse at any position, better at one.
    fn more_specific(&self, a: &[TypeInfo], a_varargs: bool, b: &[TypeInfo], b_varargs: bool, args: &[Option<TypeInfo>]) -> bool {
        let mut better = false;
        for (i, arg) in args.iter().enumerate() {
            let (Some(pa), Some(pb), Some(arg)) = (
                Self::param_at(a, a_varargs, i, args.len()),
                Self::param_at(b, b_varargs, i, args.len()),
                arg.as_ref(),
            ) else {
                continue;
            };
            match self.prefer(pa, pb, arg) {
                std::cmp::Ordering::Less => better = true,
                std::cmp::Ordering::Greater => return false,
                std::cmp::Ordering::Equal => {}
            }
        }
        better
    }

    /// `Less` when `a` fits `arg` more specifically than `b`.
    fn prefer(&self, a: &TypeInfo, b: &TypeInfo, arg: &TypeInfo) -> std::cmp::Ordering {
        use std::cmp::Ordering::*;
        if a.name == b.name {
            return Equal;
        }
        if a.name == arg.name {
            return Less;
        }
        if b.name == arg.name {
            return Greater;
        }
        match (a.as_primitive(), b.as_primitive()) {
            (Some(pa), Some(pb)) if arg.as_primitive().is_some() => {
                return if pb.accepts(pa) { Less } else if pa.accepts(pb) { Greater } else { Equal };
            }
            (Some(_), None) => return if arg.as_primitive().is_some() { Less } else { Greater },
            (None, Some(_)) => return if arg.as_primitive().is_some() { Greater } else { Less },
            _ => {}
        }
        match (self.is_interface(a), self.is_interface(b)) {
            (false, true) => return Less,
            (true, false) => return Greater,
            _ => {}
        }
        if self.index.is_assignable(b, &a.name) {
            Less
        } else if self.index.is_assignable(a, &b.name) {
            Greater
        } else {
            Equal
        }
    }

    fn is_interface(&self, ty: &TypeInfo) -> bool {
        match &ty.origin {
            TypeOrigin::Source(id) => self.index.type_decl(*id).is_interface(),
            TypeOrigin::Compiled(c) => c.interface,
            _ => false,
        }
    }

    // ─── Expression typing ──────────────────────────────────────────

    /// Primary typing first, then the structural walk.
    pub fn type_of(&self, expr: &Expr, ctx: &ExprContext<'_>) -> Option<TypeInfo> {
        self.index
            .resolve_expression_type(expr, ctx)
            .or_else(|| self.structural_type(expr, ctx))
    }

    fn structural_type(&self, expr: &Expr, ctx: &ExprContext<'_>) -> Option<TypeInfo> {
        let index = self.index;
        let scope = ctx.type_scope();
        match expr {
            Expr::Literal(lit) => literal_type(index, *lit),
            Expr::Name(name) => self.name_type(name, ctx),
            Expr::FieldAccess { receiver, name } => self
                .type_of(receiver, ctx)
                .and_then(|owner| index.field_type(&owner, name))
                .or_else(|| dotted_name(expr).and_then(|dotted| index.lookup_type_name(&dotted, ctx.type_id()))),
            Expr::Call(call) => self.call_return_type(call, ctx),
            Expr::New { ty, .. } | Expr::NewArray(ty) | Expr::Cast { ty, .. } => Some(index.qualify(ty, scope)),
            Expr::ArrayAccess(array) => self.type_of(array, ctx)?.component().cloned(),
            Expr::Binary { op, left, right } => self.binary_type(*op, left, right, ctx),
            Expr::Unary { op: UnaryOp::Not, .. } | Expr::InstanceOf(_) => Some(TypeInfo::primitive(Primitive::Boolean)),
            Expr::Unary { operand, .. } => self.type_of(operand, ctx),
            Expr::Conditional { then, otherwise } => self.conditional_type(then, otherwise, ctx),
            Expr::Assign { target, .. } => self.type_of(target, ctx),
            Expr::This => Some(index.this_type(ctx)),
            Expr::Super => index.super_type(ctx),
            Expr::ClassLiteral(_) => Some(index.type_info(CLASS)),
            Expr::Lambda | Expr::MethodReference | Expr::Unsupported(_) => None,
        }
    }

    /// Lexical bindings, then fields of the own and enclosing types, then type
    /// names, then statically imported fields.
    fn name_type(&self, name: &str, ctx: &ExprContext<'_>) -> Option<TypeInfo> {
        let index = self.index;
        let scope = ctx.type_scope();
        match ctx.binding(name) {
            Some(Binding::Local(local)) => {
                return match (&local.ty, &local.init, &local.iterable) {
                    (TypeRef::Inferred, Some(init), _) => self.type_of(init, ctx),
                    (TypeRef::Inferred, None, Some(iterable)) => self.type_of(iterable, ctx)?.component().cloned(),
                    (TypeRef::Inferred, None, None) => None,
                    (ty, _, _) => Some(index.qualify(ty, scope)),
                };
            }
            Some(Binding::LambdaParam(param)) => return param.ty.as_ref().map(|t| index.qualify(t, scope)),
            Some(Binding::Param(param)) => {
                let ty = index.qualify(&param.ty, scope);
                return Some(if param.varargs { TypeInfo::array(ty) } else { ty });
            }
            None => {}
        }

        self.enclosing_types(ctx.type_id())
            .into_iter()
            .find_map(|t| index.field_type(&index.source_type(t), name))
            .or_else(|| index.lookup_type_name(name, ctx.type_id()))
            .or_else(|| {
                index
                    .static_import_owners(ctx.type_id(), name)
                    .iter()
                    .find_map(|owner| index.field_type(owner, name))
            })
    }

    fn call_return_type(&self, call: &MethodCall, ctx: &ExprContext<'_>) -> Option<TypeInfo> {
        if let Some(ret) = self.index.resolve_call(call, ctx).and_then(|r| r.return_type) {
            return Some(ret);
        }
        let args: Vec<Option<TypeInfo>> = call.args.iter().map(|a| self.type_of(a, ctx)).collect();
        let receiver = match call.receiver.as_deref() {
            None => self.lookup_unqualified(ctx, &call.name, &args)?,
            Some(Expr::Super) => self.index.super_type(ctx)?,
            Some(expr) => self.type_of(expr, ctx)?.erased(self.index).into_owned(),
        };

        for ty in std::iter::once(receiver.clone()).chain(self.index.ancestors_of(&receiver)) {
            match &ty.origin {
                TypeOrigin::Source(id) => {
                    if let Some(m) = self.source_candidates(*id, &call.name, &args).first() {
                        let decl = self.index.method_decl(*m);
                        if decl.return_type == TypeRef::Void {
                            return None;
                        }
                        return Some(self.index.qualify(&decl.return_type, self.index.method_scope(*m)));
                    }
                }
                TypeOrigin::Compiled(_) => {
                    let selected = self.select_compiled(&ty, &call.name, &args)?;
                    return (selected.method.returns != "void").then(|| self.index.type_info(&selected.method.returns));
                }
                _ => {}
            }
        }
        None
    }

    fn binary_type(&self, op: BinaryOp, left: &Expr, right: &Expr, ctx: &ExprContext<'_>) -> Option<TypeInfo> {
        let index = self.index;
        if op.is_boolean() {
            return Some(TypeInfo::primitive(Primitive::Boolean));
        }
        if op == BinaryOp::Add && (left.is_string_literal() || right.is_string_literal()) {
            return Some(index.type_info(STRING));
        }
        let (l, r) = (self.type_of(left, ctx)?, self.type_of(right, ctx)?);
        let boolean = |t: &TypeInfo| t.name == "boolean" || t.name == "java.lang.Boolean";
        if matches!(op, BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor) && boolean(&l) && boolean(&r) {
            return Some(TypeInfo::primitive(Primitive::Boolean));
        }
        let promoted = if matches!(op, BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr) {
            primitives::promote(&l.name, &l.name)
        } else {
            primitives::promote(&l.name, &r.name)
        };
        if let Some(p) = promoted {
            return Some(TypeInfo::primitive(p));
        }
        (op == BinaryOp::Add && (l.name == STRING || r.name == STRING)).then(|| index.type_info(STRING))
    }

    /// Assignable branch, else the nearest shared class below `Object`, else a
    /// single shared interface, else `Object`.
    fn conditional_type(&self, then: &Expr, otherwise: &Expr, ctx: &ExprContext<'_>) -> Option<TypeInfo> {
        let index = self.index;
        let (a, b) = match (self.type_of(then, ctx), self.type_of(otherwise, ctx)) {
            (Some(a), Some(b)) => (a, b),
            (Some(one), None) | (None, Some(one)) => return Some(one),
            (None, None) => return None,
        };
        if index.accepts(&a, &b) {
            return Some(a);
        }
        if index.accepts(&b, &a) {
            return Some(b);
        }
        if let Some(p) = primitives::promote(&a.name, &b.name) {
            return Some(TypeInfo::primitive(p));
        }

        let mut chain = Vec::new();
        let mut seen: HashSet<String> = HashSet::from([a.name.clone()]);
        let mut current = index.superclass_of(&a);
        while let Some(parent) = current {
            if parent.name == OBJECT || !seen.insert(parent.name.clone()) {
                break;
            }
            current = index.superclass_of(&parent);
            chain.push(parent);
        }
        if let Some(shared) = chain.into_iter().find(|c| index.is_assignable(c, &b.name)) {
            return Some(shared);
        }

        let b_ancestors = index.ancestors_of(&b);
        let shared: Vec<TypeInfo> = index
            .ancestors_of(&a)
            .into_iter()
            .filter(|t| self.is_interface(t) && b_ancestors.iter().any(|o| o.name == t.name))
            .collect();
        match <[TypeInfo; 1]>::try_from(shared) {
            Ok([single]) => Some(single),
            Err(_) => Some(index.type_info(OBJECT)),
        }
    }
}

fn literal_type<I: SourceIndex + ?Sized>(index: &I, lit: Literal) -> Option<TypeInfo> {
    let p = match lit {
        Literal::Int => Primitive::Int,
        Literal::Long => Primitive::Long,
        Literal::Float => Primitive::Float,
        Literal::Double => Primitive::Double,
        Literal::Char => Primitive::Char,
        Literal::Boolean => Primitive::Boolean,
        Literal::String => return Some(index.type_info(STRING)),
        Literal::Null => return None,
    };
    Some(TypeInfo::primitive(p))
}

/// `a.b.C` for a chain of names and field accesses.
fn dotted_name(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Name(name) => Some(name.clone()),
        Expr::FieldAccess { receiver, name } => Some(format!("{}.{}", dotted_name(receiver)?, name)),
        _ => None,
    }
}
