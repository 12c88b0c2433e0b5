//! Call-graph resolution engine.
//!
//! [`MethodGraph`] drives everything: it finds declarations through the
//! inheritance linker and overload resolver, resolves calls (primary resolver
//! first, then the inferencer), classifies edges, walks subtypes for overrides
//! and memoizes finished methods.

mod builder;
pub mod classify;
mod config;
mod inherit;
mod overload;
mod types;
mod unsolved;
mod view;

pub use builder::{MethodGraph, ResolutionContext};
pub use classify::{classify, classify_by_name, is_stdlib};
pub use config::{CallingFilter, GraphConfig, MethodFilter, SubtypeStrategy, DEFAULT_EXCLUDED_RECEIVERS};
pub use inherit::{is_type_of, link, LinkedMethod};
pub use overload::{inheritance_distance, pick_best};
pub use types::{Callee, CallingType, MethodCalling, MethodId, MethodInfo};
pub use view::{ArgumentView, EdgeView, GraphView, MethodView};

#[cfg(test)]
#[path = "graph_tests.rs"]
mod tests;
