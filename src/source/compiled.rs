//! Compiled-type metadata: types known only from the classpath, never from source.
//!
//! The engine only talks to [`CompiledTypes`]. [`CompiledCatalog`] is the
//! shipped implementation: a built-in slice of the JDK plus any number of JSON
//! metadata files describing third-party jars.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::GraphError;

/// Reflection-style view of one compiled class or interface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompiledType {
    pub name: String,
    #[serde(default)]
    pub interface: bool,
    #[serde(default)]
    pub superclass: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub methods: Vec<CompiledMethod>,
    #[serde(default)]
    pub fields: Vec<CompiledField>,
}

/// Parameter and return types are erased qualified names (`java.lang.Object`
/// for a type variable), primitives as written, arrays suffixed with `[]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompiledMethod {
    pub name: String,
    #[serde(default)]
    pub params: Vec<String>,
    #[serde(default = "void_type")]
    pub returns: String,
    #[serde(default)]
    pub varargs: bool,
    #[serde(default, rename = "static")]
    pub is_static: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompiledField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, rename = "static")]
    pub is_static: bool,
}

fn void_type() -> String {
    "void".to_string()
}

impl CompiledType {
    pub fn declared_methods<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a CompiledMethod> + 'a {
        self.methods.iter().filter(move |m| m.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&CompiledField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Declared superclass, defaulting to `java.lang.Object` for classes.
    pub fn superclass_name(&self) -> Option<&str> {
        if self.interface || self.name == super::primitives::OBJECT {
            return None;
        }
        Some(self.superclass.as_deref().unwrap_or(super::primitives::OBJECT))
    }
}

/// Capability to look up compiled metadata by qualified (`$`-nested) name.
pub trait CompiledTypes: Send + Sync {
    fn lookup_compiled_type(&self, name: &str) -> Option<Arc<CompiledType>>;
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    types: Vec<CompiledType>,
}

/// In-memory compiled-type table.
#[derive(Debug, Default, Clone)]
pub struct CompiledCatalog {
    types: HashMap<String, Arc<CompiledType>>,
}

const JDK_CATALOG: &str = include_str!("jdk.json");

impl CompiledCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The bundled subset of `java.lang`, `java.util` and `java.io`.
    pub fn jdk() -> Self {
        let mut catalog = Self::empty();
        match catalog.merge_json(JDK_CATALOG) {
            Ok(count) => tracing::debug!(types = count, "Loaded bundled JDK catalog"),
            Err(e) => tracing::warn!(error = %e, "Bundled JDK catalog is malformed"),
        }
        catalog
    }

    /// Adds every type from a JSON document shaped `{"types": [...]}`.
    /// Later definitions replace earlier ones with the same name.
    pub fn merge_json(&mut self, json: &str) -> Result<usize, GraphError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        let count = file.types.len();
        for ty in file.types {
            self.types.insert(ty.name.clone(), Arc::new(ty));
        }
        Ok(count)
    }

    pub fn load_file(&mut self, path: &Path) -> Result<usize, GraphError> {
        let text = std::fs::read_to_string(path)?;
        let count = self.merge_json(&text)?;
        info!(path = %path.display(), types = count, "Loaded classpath metadata");
        Ok(count)
    }

    pub fn insert(&mut self, ty: CompiledType) {
        self.types.insert(ty.name.clone(), Arc::new(ty));
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl CompiledTypes for CompiledCatalog {
    fn lookup_compiled_type(&self, name: &str) -> Option<Arc<CompiledType>> {
        self.types.get(name).cloned()
    }
}
