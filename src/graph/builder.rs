//! `MethodGraph`: resolves a root method into its dependency and override graph.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info};

use crate::source::{ExprContext, MethodCall, MethodRef, SourceIndex, TypeId, TypeInfo};
use crate::GraphError;

use super::classify::{classify, classify_by_name};
use super::config::{GraphConfig, SubtypeStrategy};
use super::inherit::link;
use super::overload::pick_best;
use super::types::{MethodCalling, MethodId, MethodInfo};
use super::unsolved::Inferencer;

/// Methods currently being resolved by one request, in entry order.
#[derive(Debug, Default)]
pub struct ResolutionContext {
    stack: Vec<MethodId>,
    in_flight: HashSet<String>,
}

impl ResolutionContext {
    fn enter(&mut self, id: MethodId) {
        self.in_flight.insert(id.as_str().to_string());
        self.stack.push(id);
    }

    fn leave(&mut self, id: &MethodId) {
        self.in_flight.remove(id.as_str());
        if let Some(pos) = self.stack.iter().rposition(|m| m == id) {
            self.stack.remove(pos);
        }
    }

    pub fn is_in_flight(&self, id: &MethodId) -> bool {
        self.in_flight.contains(id.as_str())
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// The in-flight chain, outermost first.
    pub fn path(&self) -> &[MethodId] {
        &self.stack
    }
}

/// Where a call lands: identity, the type it is declared on, and the source declaration if any.
struct CallTarget {
    id: MethodId,
    declaring_type: TypeInfo,
    declaration: Option<MethodRef>,
}

/// A resolution session: one source index, one configuration, one cache.
///
/// Shareable across threads; every request gets its own [`ResolutionContext`].
pub struct MethodGraph<I: SourceIndex> {
    index: I,
    config: GraphConfig,
    cache: DashMap<String, Arc<MethodInfo>>,
}

impl<I: SourceIndex> MethodGraph<I> {
    pub fn new(index: I, config: GraphConfig) -> Self {
        MethodGraph { index, config, cache: DashMap::new() }
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Number of cache entries (canonical ids plus requested aliases).
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    pub fn cached(&self, id: &str) -> Option<Arc<MethodInfo>> {
        self.cache.get(id).map(|entry| Arc::clone(entry.value()))
    }

    // ─── Entry points ───────────────────────────────────────────────

    /// Resolves `method_id` (e.g. `demo.Shop#checkout(java.lang.String)`) and
    /// everything reachable from it.
    pub fn resolve_method(&self, method_id: &str) -> Result<Arc<MethodInfo>, GraphError> {
        if let Some(hit) = self.cached(method_id) {
            return Ok(hit);
        }
        let id = MethodId::parse(method_id)?;
        if let Some(hit) = self.cached(id.as_str()) {
            return Ok(hit);
        }
        let declaration = self
            .find_declaration(&id)
            .ok_or_else(|| GraphError::MethodNotFound(id.to_string()))?;

        let mut ctx = ResolutionContext::default();
        let info = self.build(declaration, &mut ctx);
        Ok(Arc::clone(self.cache.entry(method_id.to_string()).or_insert(info).value()))
    }

    /// Locates the declaration for `id` on its type, then on each ancestor in order.
    pub fn find_declaration(&self, id: &MethodId) -> Option<MethodRef> {
        let type_id = self.index.resolve_type(id.declaring_type())?;
        self.find_in_type(type_id, id).or_else(|| {
            self.index
                .ancestors_of(&self.index.source_type(type_id))
                .iter()
                .filter_map(TypeInfo::source_id)
                .find_map(|ancestor| self.find_in_type(ancestor, id))
        })
    }

    /// A compatible declaration on `type_id` itself; overloads go through [`pick_best`].
    fn find_in_type(&self, type_id: TypeId, id: &MethodId) -> Option<MethodRef> {
        let candidates: Vec<MethodRef> = self
            .index
            .methods_of(type_id)
            .into_iter()
            .filter(|m| self.index.method_decl(*m).name == id.name())
            .filter(|m| link(&self.index, *m).is_compatible_method(&self.index, id))
            .collect();
        match candidates.as_slice() {
            [] => None,
            [single] => Some(*single),
            _ => pick_best(&self.index, &candidates, id.param_types()),
        }
    }

    // ─── Resolution ─────────────────────────────────────────────────

    fn build(&self, method: MethodRef, ctx: &mut ResolutionContext) -> Arc<MethodInfo> {
        let id = MethodId::of(&self.index, method);
        if let Some(hit) = self.cached(id.as_str()) {
            return hit;
        }
        info!(method = %id, depth = ctx.depth(), "Resolving method");

        ctx.enter(id.clone());
        let dependencies = self.resolve_dependencies(method, &id, ctx);
        let overrides = self.resolve_overrides(method, &id, ctx);
        ctx.leave(&id);

        let info = Arc::new(MethodInfo { id: id.clone(), declaration: Some(method), dependencies, overrides });
        Arc::clone(self.cache.entry(id.to_string()).or_insert(info).value())
    }

    fn resolve_dependencies(&self, method: MethodRef, caller_id: &MethodId, ctx: &mut ResolutionContext) -> Vec<MethodCalling> {
        let decl = self.index.method_decl(method);
        let Some(body) = &decl.body else { return Vec::new() };
        let caller_type = self.index.source_type(method.type_id);

        let mut seen: HashSet<String> = HashSet::new();
        let mut dependencies = Vec::new();
        for site in &body.calls {
            let expr_ctx = ExprContext::new(method, decl, site.scope);
            let Some(target) = self.resolve_target(&site.call, &expr_ctx) else {
                debug!(caller = %caller_id, call = %site.call.name, line = site.line, "Unresolved call omitted");
                continue;
            };
            if !seen.insert(target.id.as_str().to_string()) {
                continue;
            }

            let calling = if ctx.is_in_flight(&target.id) {
                debug!(caller = %caller_id, callee = %target.id, "Recursive call");
                let calling_type = classify(&self.index, &target.declaring_type, &caller_type);
                MethodCalling::recursive(target.id, calling_type)
            } else {
                match target.declaration {
                    Some(callee) if (self.config.method_filter)(&target.id, &target.declaring_type) => {
                        let calling_type = classify(&self.index, &target.declaring_type, &caller_type);
                        MethodCalling::new(self.build(callee, ctx), calling_type)
                    }
                    Some(_) => {
                        let calling_type = classify(&self.index, &target.declaring_type, &caller_type);
                        MethodCalling::new(Arc::new(MethodInfo::reference(target.id)), calling_type)
                    }
                    None => {
                        let calling_type = classify_by_name(&self.index, &target.declaring_type.name, &caller_type);
                        MethodCalling::new(Arc::new(MethodInfo::reference(target.id)), calling_type)
                    }
                }
            };

            if (self.config.calling_filter)(&calling, &self.index) {
                dependencies.push(calling);
            }
        }
        dependencies
    }

    /// Primary resolution, then the inferencer re-anchored on a source declaration when one matches.
    fn resolve_target(&self, call: &MethodCall, ctx: &ExprContext<'_>) -> Option<CallTarget> {
        if let Some(resolved) = self.index.resolve_call(call, ctx) {
            return Some(CallTarget {
                id: MethodId::new(resolved.declaring_type.name.clone(), resolved.name, resolved.param_types),
                declaring_type: resolved.declaring_type,
                declaration: resolved.declaration,
            });
        }
        if !self.config.enable_heuristic_fallback {
            return None;
        }

        let inferred = Inferencer::new(&self.index, &self.config.excluded_receiver_names).infer_call(call, ctx)?;
        match self.find_declaration(&inferred.id) {
            Some(declaration) => Some(CallTarget {
                id: MethodId::of(&self.index, declaration),
                declaring_type: self.index.source_type(declaration.type_id),
                declaration: Some(declaration),
            }),
            None => Some(CallTarget { id: inferred.id, declaring_type: inferred.declaring_type, declaration: None }),
        }
    }

    /// Overriding declarations in subtypes. A subtype that does not redeclare
    /// the method is searched through its own subtypes.
    fn resolve_overrides(&self, method: MethodRef, id: &MethodId, ctx: &mut ResolutionContext) -> Vec<Arc<MethodInfo>> {
        let mut overrides = Vec::new();
        let mut visited: HashSet<TypeId> = HashSet::from([method.type_id]);
        let mut pending: Vec<TypeId> = self.subtypes_for(method.type_id).iter().rev().copied().collect();

        while let Some(sub) = pending.pop() {
            if !visited.insert(sub) {
                continue;
            }
            let Some(found) = self.find_in_type(sub, id) else {
                pending.extend(self.subtypes_for(sub).iter().rev().copied());
                continue;
            };
            let found_id = MethodId::of(&self.index, found);
            if ctx.is_in_flight(&found_id) {
                debug!(method = %id, override_id = %found_id, "Override already in flight");
                overrides.push(Arc::new(MethodInfo::reference(found_id)));
            } else {
                overrides.push(self.build(found, ctx));
            }
        }
        overrides
    }

    fn subtypes_for(&self, type_id: TypeId) -> &[TypeId] {
        let subtypes = self.index.direct_subtypes(type_id);
        match self.config.subtype_strategy {
            SubtypeStrategy::All => subtypes,
            SubtypeStrategy::SingleOnly if subtypes.len() == 1 => subtypes,
            SubtypeStrategy::SingleOnly => &[],
        }
    }
}
