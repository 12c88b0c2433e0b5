//! Session configuration for [`MethodGraph`](super::MethodGraph).

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use super::classify::is_stdlib;
use super::types::{MethodCalling, MethodId};
use crate::source::{SourceIndex, TypeInfo};

/// Decides whether a callee is expanded. Rejected callees stay in the graph as identity-only nodes.
pub type MethodFilter = Arc<dyn Fn(&MethodId, &TypeInfo) -> bool + Send + Sync>;

/// Decides whether a resolved edge is kept at all.
pub type CallingFilter = Arc<dyn Fn(&MethodCalling, &dyn SourceIndex) -> bool + Send + Sync>;

/// Which subtypes are searched for overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubtypeStrategy {
    #[default]
    All,
    /// Only when the type has exactly one direct subtype
    SingleOnly,
}

#[derive(Clone)]
pub struct GraphConfig {
    pub method_filter: MethodFilter,
    pub calling_filter: CallingFilter,
    pub subtype_strategy: SubtypeStrategy,
    pub enable_heuristic_fallback: bool,
    /// Receivers skipped by the inferencer, matched by simple name
    pub excluded_receiver_names: HashSet<String>,
}

pub const DEFAULT_EXCLUDED_RECEIVERS: [&str; 3] = ["log", "LOGGER", "logger"];

impl Default for GraphConfig {
    fn default() -> Self {
        GraphConfig {
            method_filter: Arc::new(|_: &MethodId, ty: &TypeInfo| !is_stdlib(&ty.name)),
            calling_filter: Arc::new(|_: &MethodCalling, _: &dyn SourceIndex| true),
            subtype_strategy: SubtypeStrategy::All,
            enable_heuristic_fallback: true,
            excluded_receiver_names: DEFAULT_EXCLUDED_RECEIVERS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl GraphConfig {
    pub fn with_method_filter(mut self, filter: impl Fn(&MethodId, &TypeInfo) -> bool + Send + Sync + 'static) -> Self {
        self.method_filter = Arc::new(filter);
        self
    }

    pub fn with_calling_filter(
        mut self,
        filter: impl Fn(&MethodCalling, &dyn SourceIndex) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.calling_filter = Arc::new(filter);
        self
    }

    /// Expands standard-library callees too.
    pub fn with_stdlib(self) -> Self {
        self.with_method_filter(|_, _| true)
    }

    pub fn with_subtype_strategy(mut self, strategy: SubtypeStrategy) -> Self {
        self.subtype_strategy = strategy;
        self
    }

    pub fn with_heuristic_fallback(mut self, enabled: bool) -> Self {
        self.enable_heuristic_fallback = enabled;
        self
    }

    /// Adds receiver names to the exclusion set.
    pub fn with_excluded_receivers<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.excluded_receiver_names.extend(names.into_iter().map(Into::into));
        self
    }
}

impl fmt::Debug for GraphConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut excluded: Vec<_> = self.excluded_receiver_names.iter().collect();
        excluded.sort();
        f.debug_struct("GraphConfig")
            .field("subtype_strategy", &self.subtype_strategy)
            .field("enable_heuristic_fallback", &self.enable_heuristic_fallback)
            .field("excluded_receiver_names", &excluded)
            .finish_non_exhaustive()
    }
}
