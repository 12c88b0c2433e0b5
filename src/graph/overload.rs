//! Overload resolution among same-named source declarations.

use std::cmp::Ordering;
use std::collections::{HashSet, VecDeque};

use crate::source::{MethodRef, SourceIndex, TypeInfo};

/// Hops from `ty` up to `ancestor` through superclasses and interfaces.
///
/// A primitive reaches its wrapper in one hop; `None` when `ancestor` is unreachable.
pub fn inheritance_distance<I: SourceIndex + ?Sized>(index: &I, ty: &TypeInfo, ancestor: &str) -> Option<usize> {
    if ty.name == ancestor {
        return Some(0);
    }
    if let Some(p) = ty.as_primitive() {
        return inheritance_distance(index, &index.type_info(p.wrapper()), ancestor).map(|d| d + 1);
    }

    let mut seen: HashSet<String> = HashSet::new();
    seen.insert(ty.name.clone());
    let mut queue: VecDeque<(TypeInfo, usize)> = VecDeque::new();
    queue.push_back((ty.clone(), 0));
    while let Some((current, depth)) = queue.pop_front() {
        let parents = index.superclass_of(&current).into_iter().chain(index.interfaces_of(&current));
        for parent in parents {
            if parent.name == ancestor {
                return Some(depth + 1);
            }
            if seen.insert(parent.name.clone()) {
                queue.push_back((parent, depth + 1));
            }
        }
    }
    None
}

/// Orders candidates best first for the expected parameter names and returns the first.
///
/// Per position: an exact name match wins, a type variable loses to a concrete
/// type, then the smaller inheritance distance wins. The sort is stable, so
/// full ties keep candidate order.
pub fn pick_best<I: SourceIndex + ?Sized>(index: &I, candidates: &[MethodRef], expected: &[String]) -> Option<MethodRef> {
    let expected_types: Vec<TypeInfo> = expected.iter().map(|e| index.type_info(e)).collect();
    let mut ranked: Vec<(MethodRef, Vec<TypeInfo>)> =
        candidates.iter().map(|m| (*m, index.param_types(*m))).collect();

    ranked.sort_by(|(_, a), (_, b)| {
        expected_types
            .iter()
            .enumerate()
            .map(|(i, exp)| match (a.get(i), b.get(i)) {
                (Some(pa), Some(pb)) => compare_position(index, pa, pb, exp),
                _ => Ordering::Equal,
            })
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
    ranked.first().map(|(m, _)| *m)
}

fn compare_position<I: SourceIndex + ?Sized>(index: &I, a: &TypeInfo, b: &TypeInfo, expected: &TypeInfo) -> Ordering {
    let (a_exact, b_exact) = (a.name == expected.name, b.name == expected.name);
    if a_exact != b_exact {
        return if a_exact { Ordering::Less } else { Ordering::Greater };
    }
    if a.is_variable() != b.is_variable() {
        return if a.is_variable() { Ordering::Greater } else { Ordering::Less };
    }
    let da = inheritance_distance(index, expected, &a.name).unwrap_or(usize::MAX);
    let db = inheritance_distance(index, expected, &b.name).unwrap_or(usize::MAX);
    da.cmp(&db)
}
