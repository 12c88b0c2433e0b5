//! Inheritance linking: which ancestor declarations a method overrides or implements.

use std::collections::HashSet;

use crate::source::{MethodRef, SourceIndex, TypeInfo, TypeOrigin};

use super::types::MethodId;

/// A declaration with the signature-compatible declarations above it.
#[derive(Debug, Clone)]
pub struct LinkedMethod {
    pub current: MethodRef,
    /// Along the superclass chain, nearest first
    pub from_extend: Vec<MethodRef>,
    /// From every transitively implemented interface
    pub from_impl: Vec<MethodRef>,
}

pub fn link<I: SourceIndex + ?Sized>(index: &I, method: MethodRef) -> LinkedMethod {
    let owner = index.source_type(method.type_id);

    let mut from_extend = Vec::new();
    let mut seen: HashSet<String> = HashSet::from([owner.name.clone()]);
    let mut current = index.superclass_of(&owner);
    while let Some(parent) = current {
        // The chain stops at the first type that is not analyzed source, or at a cycle
        let Some(parent_id) = parent.source_id() else { break };
        if !seen.insert(parent.name.clone()) {
            break;
        }
        from_extend.extend(compatible_in(index, parent_id, method));
        current = index.superclass_of(&parent);
    }

    let from_impl = index
        .ancestors_of(&owner)
        .iter()
        .filter_map(|a| a.source_id())
        .filter(|id| index.type_decl(*id).is_interface())
        .flat_map(|id| compatible_in(index, id, method))
        .collect();

    LinkedMethod { current: method, from_extend, from_impl }
}

/// Methods of `ancestor` that `method` can override: same name and arity,
/// every ancestor parameter accepting the corresponding parameter of `method`.
fn compatible_in<I: SourceIndex + ?Sized>(index: &I, ancestor: crate::source::TypeId, method: MethodRef) -> Vec<MethodRef> {
    let decl = index.method_decl(method);
    let own_params = index.param_types(method);
    index
        .methods_of(ancestor)
        .into_iter()
        .filter(|m| {
            let candidate = index.method_decl(*m);
            candidate.name == decl.name && candidate.params.len() == decl.params.len()
        })
        .filter(|m| {
            index
                .param_types(*m)
                .iter()
                .zip(&own_params)
                .all(|(up, own)| index.accepts(up, &own.erased(index)))
        })
        .collect()
}

impl LinkedMethod {
    pub fn all(&self) -> impl Iterator<Item = MethodRef> + '_ {
        std::iter::once(self.current)
            .chain(self.from_extend.iter().copied())
            .chain(self.from_impl.iter().copied())
    }

    /// True when some declaration in the link matches `id` at every parameter position.
    pub fn is_compatible_method<I: SourceIndex + ?Sized>(&self, index: &I, id: &MethodId) -> bool {
        let decl = index.method_decl(self.current);
        if decl.name != id.name() || decl.params.len() != id.param_types().len() {
            return false;
        }
        let linked: Vec<Vec<TypeInfo>> = self.all().map(|m| index.param_types(m)).collect();
        id.param_types()
            .iter()
            .enumerate()
            .all(|(i, expected)| linked.iter().any(|params| params.get(i).is_some_and(|p| is_type_of(index, p, expected))))
    }
}

/// Whether a value named `expected` fits the declared parameter type.
pub fn is_type_of<I: SourceIndex + ?Sized>(index: &I, declared: &TypeInfo, expected: &str) -> bool {
    if declared.name == expected {
        return true;
    }
    match &declared.origin {
        TypeOrigin::Variable(_) => true,
        TypeOrigin::Primitive(_) => false,
        TypeOrigin::Array(component) => expected
            .strip_suffix("[]")
            .is_some_and(|inner| is_type_of(index, component, inner)),
        _ => match crate::source::primitives::Primitive::from_name(expected) {
            Some(p) => index.is_assignable(declared, p.wrapper()),
            None => index.is_assignable(declared, expected),
        },
    }
}
