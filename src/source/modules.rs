//! Module discovery: build units laid out as `<module>/src/main/java`.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::clean_path;

const SOURCE_ROOT: &str = "src/main/java";

/// A build unit: its name and the directory holding its sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRoot {
    pub name: String,
    /// Normalized (`/`-separated) path of `<module>/src/main/java`
    pub source_root: String,
}

/// Every directory under `root` that contains `src/main/java`, named after
/// that directory. Sorted longest root first so prefix lookup picks the
/// innermost module.
pub fn discover_modules(root: &Path) -> Vec<ModuleRoot> {
    let mut modules = Vec::new();
    let mut walker = WalkBuilder::new(root);
    walker.hidden(false).git_ignore(true);
    for entry in walker.build().flatten() {
        if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
            continue;
        }
        let candidate = entry.path().join(SOURCE_ROOT);
        if !candidate.is_dir() {
            continue;
        }
        let name = module_name(entry.path());
        modules.push(ModuleRoot { name, source_root: normalize(&candidate) });
    }
    modules.sort_by(|a, b| b.source_root.len().cmp(&a.source_root.len()).then_with(|| a.name.cmp(&b.name)));
    modules.dedup_by(|a, b| a.source_root == b.source_root);
    tracing::debug!(count = modules.len(), root = %root.display(), "Discovered modules");
    modules
}

/// Module owning `path`: the longest source root that prefixes it.
pub(crate) fn module_for_path<'a>(modules: &'a [ModuleRoot], path: &str) -> Option<&'a ModuleRoot> {
    let path = normalize(Path::new(path));
    modules
        .iter()
        .filter(|m| path.starts_with(&m.source_root) && path[m.source_root.len()..].starts_with('/'))
        .max_by_key(|m| m.source_root.len())
}

/// `dir`'s own name; the walk root `.` is named after its canonical path.
fn module_name(dir: &Path) -> String {
    std::fs::canonicalize(dir)
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .or_else(|| dir.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| ".".to_string())
}

fn normalize(path: &Path) -> String {
    let absolute: PathBuf = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    clean_path(&absolute.to_string_lossy()).replace('\\', "/")
}
