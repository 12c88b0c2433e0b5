//! `JavaIndex`: the tree-sitter backed [`SourceIndex`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use ignore::WalkBuilder;
use tracing::{debug, info, warn};

use super::accessors;
use super::ast::*;
use super::compiled::{CompiledCatalog, CompiledTypes};
use super::modules::{discover_modules, module_for_path};
use super::parser_java::{new_java_parser, parse_java_file, ParsedFile};
use super::primary;
use super::primitives::{Primitive, OBJECT};
use super::{ExprContext, ResolvedCall, SourceIndex, TypeInfo, TypeOrigin, TypeScope};
use crate::{clean_path, read_file_lossy, GraphError};

/// Type parameters nested deeper than this are treated as unbounded.
const MAX_BOUND_DEPTH: u8 = 4;

#[derive(Debug, Clone)]
pub struct IndexOptions {
    /// Generate Lombok and record accessors
    pub synthesize_accessors: bool,
    pub extensions: Vec<String>,
    /// Parser threads; 0 means one per available core
    pub threads: usize,
}

impl Default for IndexOptions {
    fn default() -> Self {
        IndexOptions { synthesize_accessors: true, extensions: vec!["java".to_string()], threads: 0 }
    }
}

/// All type declarations of the analyzed source plus the compiled catalog.
#[derive(Debug)]
pub struct JavaIndex {
    units: Vec<CompilationUnit>,
    types: Vec<TypeDecl>,
    by_name: HashMap<String, TypeId>,
    subtypes: Vec<Vec<TypeId>>,
    compiled: CompiledCatalog,
}

struct PendingUnit {
    path: String,
    text: String,
    module: Option<String>,
}

// ─── Construction ───────────────────────────────────────────────────

/// Collects sources before a single parallel parse.
pub struct IndexBuilder {
    pending: Vec<PendingUnit>,
    compiled: CompiledCatalog,
    options: IndexOptions,
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexBuilder {
    /// Starts with the bundled JDK catalog and default options.
    pub fn new() -> Self {
        IndexBuilder { pending: Vec::new(), compiled: CompiledCatalog::jdk(), options: IndexOptions::default() }
    }

    /// A file outside any module.
    pub fn source(self, path: &str, text: &str) -> Self {
        self.push(path, text, None)
    }

    pub fn module_source(self, module: &str, path: &str, text: &str) -> Self {
        self.push(path, text, Some(module.to_string()))
    }

    pub fn compiled(mut self, catalog: CompiledCatalog) -> Self {
        self.compiled = catalog;
        self
    }

    pub fn options(mut self, options: IndexOptions) -> Self {
        self.options = options;
        self
    }

    fn push(mut self, path: &str, text: &str, module: Option<String>) -> Self {
        self.pending.push(PendingUnit { path: path.to_string(), text: text.to_string(), module });
        self
    }

    pub fn build(self) -> Result<JavaIndex, GraphError> {
        let start = Instant::now();
        let parsed = parse_all(&self.pending, self.options.threads)?;
        let index = JavaIndex::assemble(self.pending, parsed, self.compiled, &self.options);
        info!(
            files = index.units.len(),
            types = index.types.len(),
            compiled = index.compiled.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Source index built"
        );
        Ok(index)
    }
}

impl JavaIndex {
    /// In-memory construction: `(path, text)` pairs, no modules.
    pub fn from_sources(sources: &[(&str, &str)]) -> Result<Self, GraphError> {
        sources
            .iter()
            .fold(IndexBuilder::new(), |b, (path, text)| b.source(path, text))
            .build()
    }

    /// Walks every directory (honoring `.gitignore`), assigns files to
    /// modules and parses them.
    pub fn build(dirs: &[PathBuf], options: &IndexOptions, compiled: CompiledCatalog) -> Result<Self, GraphError> {
        let mut builder = IndexBuilder::new().compiled(compiled).options(options.clone());
        for dir in dirs {
            if !dir.is_dir() {
                return Err(GraphError::DirNotFound(dir.display().to_string()));
            }
            let modules = discover_modules(dir);
            let files = collect_files(dir, &options.extensions);
            debug!(dir = %dir.display(), files = files.len(), modules = modules.len(), "Collected source files");
            for path in files {
                let (text, was_lossy) = read_file_lossy(Path::new(&path))?;
                if was_lossy {
                    warn!(path = %path, "File contains non-UTF8 bytes (lossy conversion applied)");
                }
                let module = module_for_path(&modules, &path).map(|m| m.name.clone());
                builder = builder.push(&path, &text, module);
            }
        }
        builder.build()
    }

    fn assemble(pending: Vec<PendingUnit>, parsed: Vec<ParsedFile>, compiled: CompiledCatalog, options: &IndexOptions) -> Self {
        let mut index = JavaIndex {
            units: Vec::with_capacity(pending.len()),
            types: Vec::new(),
            by_name: HashMap::new(),
            subtypes: Vec::new(),
            compiled,
        };

        for (unit_input, file) in pending.into_iter().zip(parsed) {
            let unit = UnitId(index.units.len() as u32);
            let base = index.types.len() as u32;
            for mut decl in file.types {
                decl.unit = unit;
                decl.outer = decl.outer.map(|o| TypeId(base + o.0));
                if options.synthesize_accessors {
                    accessors::synthesize(&mut decl);
                }
                let id = TypeId(index.types.len() as u32);
                if index.by_name.contains_key(&decl.qualified_name) {
                    warn!(name = %decl.qualified_name, path = %unit_input.path, "Duplicate type declaration ignored for lookup");
                } else {
                    index.by_name.insert(decl.qualified_name.clone(), id);
                }
                index.types.push(decl);
            }
            index.units.push(CompilationUnit {
                path: unit_input.path,
                package: file.package,
                imports: file.imports,
                module: unit_input.module,
            });
        }

        let mut subtypes = vec![Vec::new(); index.types.len()];
        for raw in 0..index.types.len() as u32 {
            let ty = index.source_type(TypeId(raw));
            let parents = index.superclass_of(&ty).into_iter().chain(index.interfaces_of(&ty));
            for parent in parents {
                if let Some(pid) = parent.source_id() {
                    subtypes[pid.0 as usize].push(TypeId(raw));
                }
            }
        }
        index.subtypes = subtypes;
        index
    }

    // ─── Inspection ──────────────────────────────────────────────────

    pub fn type_ids(&self) -> impl Iterator<Item = TypeId> + '_ {
        (0..self.types.len() as u32).map(TypeId)
    }

    pub fn units(&self) -> &[CompilationUnit] {
        &self.units
    }

    pub fn catalog(&self) -> &CompiledCatalog {
        &self.compiled
    }

    pub fn package_of(&self, id: TypeId) -> Option<&str> {
        self.units[self.types[id.0 as usize].unit.0 as usize].package.as_deref()
    }

    fn imports_of(&self, id: TypeId) -> &[Import] {
        &self.units[self.types[id.0 as usize].unit.0 as usize].imports
    }

    /// The type and its enclosing types, innermost first.
    fn enclosing_chain(&self, id: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        let mut next = Some(id);
        std::iter::from_fn(move || {
            let current = next?;
            next = self.types[current.0 as usize].outer;
            Some(current)
        })
    }

    fn known(&self, name: &str) -> Option<TypeInfo> {
        if let Some(id) = self.by_name.get(name) {
            return Some(self.source_type(*id));
        }
        self.compiled
            .lookup_compiled_type(name)
            .map(|c| TypeInfo { name: c.name.clone(), origin: TypeOrigin::Compiled(c) })
    }

    /// `a.b.Outer.Inner` may name `a.b.Outer$Inner`: tries each split from the right.
    fn known_dotted(&self, name: &str) -> Option<TypeInfo> {
        if let Some(found) = self.known(name) {
            return Some(found);
        }
        let mut candidate = name.to_string();
        while let Some(pos) = candidate.rfind('.') {
            candidate.replace_range(pos..pos + 1, "$");
            if let Some(found) = self.known(&candidate) {
                return Some(found);
            }
        }
        None
    }

    fn qualify_in(&self, ty: &TypeRef, scope: TypeScope<'_>, depth: u8) -> TypeInfo {
        match ty {
            TypeRef::Void => TypeInfo::void(),
            TypeRef::Inferred | TypeRef::Wildcard(None) => self.type_info(OBJECT),
            TypeRef::Wildcard(Some(bound)) => self.qualify_in(bound, scope, depth),
            TypeRef::Primitive(p) => TypeInfo::primitive(*p),
            TypeRef::Array(component) => TypeInfo::array(self.qualify_in(component, scope, depth)),
            TypeRef::Named { name, .. } => {
                if let Some(var) = self.type_variable(name, scope, depth) {
                    return var;
                }
                if let Some(found) = self.lookup_type_name(name, scope.type_id) {
                    return found;
                }
                if name.contains('.') {
                    return TypeInfo::unresolved(name.clone());
                }
                match self.package_of(scope.type_id) {
                    Some(pkg) => TypeInfo::unresolved(format!("{}.{}", pkg, name)),
                    None => TypeInfo::unresolved(name.clone()),
                }
            }
        }
    }

    /// Method type parameters shadow those of the enclosing types.
    fn type_variable(&self, name: &str, scope: TypeScope<'_>, depth: u8) -> Option<TypeInfo> {
        if name.contains('.') {
            return None;
        }
        let param = scope
            .type_params
            .iter()
            .find(|p| p.name == name)
            .or_else(|| {
                self.enclosing_chain(scope.type_id)
                    .find_map(|t| self.types[t.0 as usize].type_params.iter().find(|p| p.name == name))
            })?;
        let bounds = if depth >= MAX_BOUND_DEPTH {
            Vec::new()
        } else {
            param.bounds.iter().map(|b| self.qualify_in(b, scope, depth + 1)).collect()
        };
        Some(TypeInfo { name: param.name.clone(), origin: TypeOrigin::Variable(bounds) })
    }
}

// ─── SourceIndex ────────────────────────────────────────────────────

impl SourceIndex for JavaIndex {
    fn resolve_type(&self, qualified_name: &str) -> Option<TypeId> {
        self.by_name.get(qualified_name).copied()
    }

    fn type_decl(&self, id: TypeId) -> &TypeDecl {
        &self.types[id.0 as usize]
    }

    fn type_count(&self) -> usize {
        self.types.len()
    }

    fn unit(&self, id: UnitId) -> &CompilationUnit {
        &self.units[id.0 as usize]
    }

    fn compiled(&self) -> &dyn CompiledTypes {
        &self.compiled
    }

    fn type_info(&self, name: &str) -> TypeInfo {
        if let Some(p) = Primitive::from_name(name) {
            return TypeInfo::primitive(p);
        }
        if let Some(component) = name.strip_suffix("[]") {
            return TypeInfo::array(self.type_info(component));
        }
        self.known(name).unwrap_or_else(|| TypeInfo::unresolved(name))
    }

    fn qualify(&self, ty: &TypeRef, scope: TypeScope<'_>) -> TypeInfo {
        self.qualify_in(ty, scope, 0)
    }

    fn lookup_type_name(&self, name: &str, context: TypeId) -> Option<TypeInfo> {
        if let Some((first, rest)) = name.split_once('.') {
            if let Some(found) = self.known_dotted(name) {
                return Some(found);
            }
            let outer = self.lookup_type_name(first, context)?;
            return self.known(&format!("{}${}", outer.name, rest.replace('.', "$")));
        }

        for t in self.enclosing_chain(context) {
            let decl = &self.types[t.0 as usize];
            if let Some(found) = self.known(&format!("{}${}", decl.qualified_name, name)) {
                return Some(found);
            }
            if decl.name == name {
                return Some(self.source_type(t));
            }
        }

        let imports = self.imports_of(context);
        for import in imports.iter().filter(|i| !i.is_static && !i.is_asterisk) {
            if import.name.rsplit('.').next() == Some(name) {
                return Some(self.known_dotted(&import.name).unwrap_or_else(|| TypeInfo::unresolved(import.name.clone())));
            }
        }

        let same_package = match self.package_of(context) {
            Some(pkg) => format!("{}.{}", pkg, name),
            None => name.to_string(),
        };
        if let Some(found) = self.known(&same_package) {
            return Some(found);
        }

        for import in imports.iter().filter(|i| !i.is_static && i.is_asterisk) {
            let candidate = format!("{}.{}", import.name, name);
            if let Some(found) = self.known_dotted(&candidate) {
                return Some(found);
            }
        }

        self.known(&format!("java.lang.{}", name))
    }

    fn static_import_owners(&self, context: TypeId, member: &str) -> Vec<TypeInfo> {
        self.imports_of(context)
            .iter()
            .filter(|i| i.is_static)
            .filter_map(|import| {
                if import.is_asterisk {
                    return self.known_dotted(&import.name);
                }
                let (owner, imported) = import.name.rsplit_once('.')?;
                if imported == member { self.known_dotted(owner) } else { None }
            })
            .collect()
    }

    fn module_of(&self, qualified_name: &str) -> Option<&str> {
        let id = self.resolve_type(qualified_name)?;
        self.unit(self.type_decl(id).unit).module.as_deref()
    }

    fn direct_subtypes(&self, id: TypeId) -> &[TypeId] {
        self.subtypes.get(id.0 as usize).map(Vec::as_slice).unwrap_or(&[])
    }

    fn resolve_expression_type(&self, expr: &Expr, ctx: &ExprContext<'_>) -> Option<TypeInfo> {
        primary::expression_type(self, expr, ctx)
    }

    fn resolve_call(&self, call: &MethodCall, ctx: &ExprContext<'_>) -> Option<ResolvedCall> {
        primary::resolve_call(self, call, ctx)
    }
}

// ─── File collection and parallel parsing ──────────────────────────

fn collect_files(dir: &Path, extensions: &[String]) -> Vec<String> {
    let files: std::sync::Mutex<Vec<String>> = std::sync::Mutex::new(Vec::new());
    let mut walker = WalkBuilder::new(dir);
    walker.hidden(false).git_ignore(true);

    walker.build_parallel().run(|| {
        Box::new(|entry| {
            let entry = match entry {
                Ok(e) => e,
                Err(_) => return ignore::WalkState::Continue,
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                return ignore::WalkState::Continue;
            }
            let path = entry.path();
            let ext_match = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)));
            if ext_match {
                let clean = clean_path(&path.to_string_lossy());
                files.lock().unwrap_or_else(|e| e.into_inner()).push(clean);
            }
            ignore::WalkState::Continue
        })
    });

    let mut files = files.into_inner().unwrap_or_else(|e| e.into_inner());
    // Walk order is nondeterministic; type ids must not be.
    files.sort();
    files
}

fn parse_all(pending: &[PendingUnit], threads: usize) -> Result<Vec<ParsedFile>, GraphError> {
    if pending.is_empty() {
        return Ok(Vec::new());
    }
    let num_threads = if threads > 0 {
        threads
    } else {
        std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4)
    };
    let chunk_size = pending.len().div_ceil(num_threads).max(1);
    debug!(threads = pending.len().div_ceil(chunk_size), chunk_size, "Parsing sources");

    let results: Vec<Result<Vec<ParsedFile>, GraphError>> = std::thread::scope(|s| {
        let handles: Vec<_> = pending
            .chunks(chunk_size)
            .map(|chunk| s.spawn(move || parse_chunk(chunk)))
            .collect();
        handles
            .into_iter()
            .map(|h| {
                h.join().unwrap_or_else(|_| {
                    Err(GraphError::Parse { path: String::new(), message: "parser thread panicked".to_string() })
                })
            })
            .collect()
    });

    let mut parsed = Vec::with_capacity(pending.len());
    for chunk in results {
        parsed.extend(chunk?);
    }
    Ok(parsed)
}

fn parse_chunk(chunk: &[PendingUnit]) -> Result<Vec<ParsedFile>, GraphError> {
    let mut parser = new_java_parser().map_err(|e| GraphError::Parse {
        path: String::new(),
        message: format!("cannot load Java grammar: {}", e),
    })?;
    chunk
        .iter()
        .map(|unit| {
            parse_java_file(&mut parser, &unit.text).ok_or_else(|| GraphError::Parse {
                path: unit.path.clone(),
                message: "tree-sitter produced no tree".to_string(),
            })
        })
        .collect()
}
