//! Call classification by the structural relation between caller and callee.

use crate::source::{SourceIndex, TypeInfo};

use super::types::CallingType;

pub const STDLIB_PREFIXES: [&str; 4] = ["java.", "javax.", "jdk.", "sun."];

pub fn is_stdlib(type_name: &str) -> bool {
    STDLIB_PREFIXES.iter().any(|p| type_name.starts_with(p))
}

/// First match wins: STDLIB, SELF, SUPER, then BROTHER/OUT when both modules
/// are known, else LIBRARY.
pub fn classify<I: SourceIndex + ?Sized>(index: &I, callee: &TypeInfo, caller: &TypeInfo) -> CallingType {
    if is_stdlib(&callee.name) {
        return CallingType::Stdlib;
    }
    if callee.name == caller.name {
        return CallingType::SelfCall;
    }
    if index.is_assignable(callee, &caller.name) {
        return CallingType::Super;
    }
    match (index.module_of(&callee.name), index.module_of(&caller.name)) {
        (Some(a), Some(b)) if a == b => CallingType::Brother,
        (Some(_), Some(_)) => CallingType::Out,
        _ => CallingType::Library,
    }
}

/// Same decision order when only the callee's type name is known.
pub fn classify_by_name<I: SourceIndex + ?Sized>(index: &I, callee_type: &str, caller: &TypeInfo) -> CallingType {
    classify(index, &index.type_info(callee_type), caller)
}
