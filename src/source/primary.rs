//! Primary resolver: types only what is certain from declarations.
//!
//! Anything that needs inference (`var`, implicit lambda parameters, generic
//! returns, outer-class calls, ambiguous overloads) returns `None` and is left
//! to the heuristic inferencer. Inside an anonymous class, `this` is the
//! instantiated supertype.

use std::collections::HashSet;

use super::ast::{Expr, Literal, MethodCall, MethodRef, TypeRef};
use super::primitives::{Primitive, STRING};
use super::{Binding, ExprContext, ResolvedCall, SourceIndex, TypeInfo, TypeOrigin, TypeScope};

pub(crate) fn expression_type<I: SourceIndex + ?Sized>(index: &I, expr: &Expr, ctx: &ExprContext<'_>) -> Option<TypeInfo> {
    match expr {
        Expr::Literal(lit) => literal_type(index, *lit),
        Expr::This => Some(index.this_type(ctx)),
        Expr::Name(name) => name_type(index, name, ctx),
        Expr::New { ty, .. } | Expr::Cast { ty, .. } => {
            let ty = index.qualify(ty, ctx.type_scope());
            ty.is_known().then_some(ty)
        }
        Expr::FieldAccess { receiver, name } => {
            let owner = receiver_type(index, receiver, ctx)?;
            index.field_type(&owner, name).filter(TypeInfo::is_known)
        }
        Expr::Call(call) => resolve_call(index, call, ctx)?.return_type.filter(TypeInfo::is_known),
        _ => None,
    }
}

pub(crate) fn literal_type<I: SourceIndex + ?Sized>(index: &I, lit: Literal) -> Option<TypeInfo> {
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

/// Explicitly typed locals, parameters, and fields declared on the type itself.
fn name_type<I: SourceIndex + ?Sized>(index: &I, name: &str, ctx: &ExprContext<'_>) -> Option<TypeInfo> {
    let scope = ctx.type_scope();
    match ctx.binding(name) {
        Some(Binding::Local(local)) if local.ty != TypeRef::Inferred => Some(index.qualify(&local.ty, scope)),
        Some(Binding::LambdaParam(param)) => param.ty.as_ref().map(|t| index.qualify(t, scope)),
        Some(Binding::Param(param)) => {
            let ty = index.qualify(&param.ty, scope);
            Some(if param.varargs { TypeInfo::array(ty) } else { ty })
        }
        Some(Binding::Local(_)) => None,
        None => {
            let decl = index.type_decl(ctx.type_id());
            let field = decl.fields.iter().find(|f| f.name == name)?;
            Some(index.qualify(&field.ty, TypeScope { type_id: ctx.type_id(), type_params: &decl.type_params }))
        }
    }
}

/// A bare name that is neither a variable nor an own field is a static type reference.
fn receiver_type<I: SourceIndex + ?Sized>(index: &I, receiver: &Expr, ctx: &ExprContext<'_>) -> Option<TypeInfo> {
    let ty = match receiver {
        Expr::Super => index.super_type(ctx)?,
        Expr::Name(name) if ctx.binding(name).is_none() && !has_own_field(index, ctx, name) => {
            index.lookup_type_name(name, ctx.type_id())?
        }
        other => expression_type(index, other, ctx)?,
    };
    ty.is_known().then_some(ty)
}

fn has_own_field<I: SourceIndex + ?Sized>(index: &I, ctx: &ExprContext<'_>, name: &str) -> bool {
    index.type_decl(ctx.type_id()).fields.iter().any(|f| f.name == name)
}

struct Candidate {
    declaring: TypeInfo,
    params: Vec<TypeInfo>,
    declaration: Option<MethodRef>,
    return_type: Option<TypeInfo>,
}

pub(crate) fn resolve_call<I: SourceIndex + ?Sized>(index: &I, call: &MethodCall, ctx: &ExprContext<'_>) -> Option<ResolvedCall> {
    let receiver = match call.receiver.as_deref() {
        None | Some(Expr::This) => index.this_type(ctx),
        Some(expr) => receiver_type(index, expr, ctx)?,
    };
    let args: Vec<TypeInfo> = call
        .args
        .iter()
        .map(|a| expression_type(index, a, ctx))
        .collect::<Option<_>>()?;

    let mut seen: HashSet<Vec<String>> = HashSet::new();
    let mut candidates = Vec::new();
    for owner in std::iter::once(receiver.clone()).chain(index.ancestors_of(&receiver)) {
        for candidate in declared_candidates(index, &owner, &call.name, args.len()) {
            let signature: Vec<String> = candidate.params.iter().map(|p| p.name.clone()).collect();
            let applicable = candidate.params.iter().zip(&args).all(|(p, a)| index.accepts(p, a));
            if applicable && seen.insert(signature) {
                candidates.push(candidate);
            }
        }
    }

    let chosen = match candidates.len() {
        0 => return None,
        1 => candidates.pop()?,
        _ => {
            let mut exact: Vec<Candidate> = candidates
                .into_iter()
                .filter(|c| c.params.iter().zip(&args).all(|(p, a)| p.name == a.name))
                .collect();
            if exact.len() != 1 {
                return None;
            }
            exact.pop()?
        }
    };

    Some(ResolvedCall {
        name: call.name.clone(),
        param_types: chosen.params.iter().map(|p| p.name.clone()).collect(),
        declaring_type: chosen.declaring,
        declaration: chosen.declaration,
        return_type: chosen.return_type,
    })
}

fn declared_candidates<I: SourceIndex + ?Sized>(index: &I, owner: &TypeInfo, name: &str, arity: usize) -> Vec<Candidate> {
    match &owner.origin {
        TypeOrigin::Source(id) => index
            .methods_of(*id)
            .into_iter()
            .filter(|m| {
                let decl = index.method_decl(*m);
                decl.name == name && decl.params.len() == arity
            })
            .map(|m| {
                let decl = index.method_decl(m);
                Candidate {
                    declaring: owner.clone(),
                    params: index.param_types(m),
                    declaration: Some(m),
                    return_type: (decl.return_type != TypeRef::Void)
                        .then(|| index.qualify(&decl.return_type, index.method_scope(m))),
                }
            })
            .collect(),
        TypeOrigin::Compiled(compiled) => compiled
            .declared_methods(name)
            .filter(|m| m.params.len() == arity && !m.varargs)
            .map(|m| Candidate {
                declaring: owner.clone(),
                params: m.params.iter().map(|p| index.type_info(p)).collect(),
                declaration: None,
                return_type: (m.returns != "void").then(|| index.type_info(&m.returns)),
            })
            .collect(),
        _ => Vec::new(),
    }
}
