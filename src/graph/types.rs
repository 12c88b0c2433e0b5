//! Graph data model: method identities, resolved methods and call edges.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::source::{MethodRef, SourceIndex};
use crate::GraphError;

// ─── MethodId ───────────────────────────────────────────────────────

/// `pkg.Outer$Inner#name(T1,T2)`. Equality and hashing use the canonical string.
#[derive(Debug, Clone)]
pub struct MethodId {
    declaring_type: String,
    name: String,
    param_types: Vec<String>,
    canonical: String,
}

impl MethodId {
    pub fn new(declaring_type: impl Into<String>, name: impl Into<String>, param_types: Vec<String>) -> Self {
        let declaring_type = declaring_type.into();
        let name = name.into();
        let canonical = format!("{}#{}({})", declaring_type, name, param_types.join(","));
        MethodId { declaring_type, name, param_types, canonical }
    }

    /// Splits on `#`, `(`, `,` and `)`; blank pieces and surrounding whitespace are ignored.
    pub fn parse(text: &str) -> Result<Self, GraphError> {
        let mut pieces = text
            .split(['#', '(', ',', ')'])
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);
        match (pieces.next(), pieces.next()) {
            (Some(declaring_type), Some(name)) => Ok(MethodId::new(declaring_type, name, pieces.collect())),
            _ => Err(GraphError::InvalidMethodId(text.to_string())),
        }
    }

    /// Identity of a source declaration: owner's qualified name plus erased parameter types.
    pub fn of<I: SourceIndex + ?Sized>(index: &I, method: MethodRef) -> Self {
        let owner = &index.type_decl(method.type_id).qualified_name;
        let params = index.param_types(method).into_iter().map(|t| t.name).collect();
        MethodId::new(owner.clone(), index.method_decl(method).name.clone(), params)
    }

    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn param_types(&self) -> &[String] {
        &self.param_types
    }

    pub fn as_str(&self) -> &str {
        &self.canonical
    }
}

impl PartialEq for MethodId {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for MethodId {}

impl Hash for MethodId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl PartialOrd for MethodId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MethodId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.canonical.cmp(&other.canonical)
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl FromStr for MethodId {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MethodId::parse(s)
    }
}

impl Serialize for MethodId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.canonical)
    }
}

// ─── CallingType ────────────────────────────────────────────────────

/// Structural relationship between a caller and its callee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CallingType {
    /// Same declaring type
    #[serde(rename = "SELF")]
    SelfCall,
    /// Callee is declared on a supertype of the caller
    Super,
    /// Different type, same module
    Brother,
    /// Different type, different module
    Out,
    /// `java.`, `javax.`, `jdk.` or `sun.`
    Stdlib,
    Library,
}

impl CallingType {
    pub fn as_str(self) -> &'static str {
        match self {
            CallingType::SelfCall => "SELF",
            CallingType::Super => "SUPER",
            CallingType::Brother => "BROTHER",
            CallingType::Out => "OUT",
            CallingType::Stdlib => "STDLIB",
            CallingType::Library => "LIBRARY",
        }
    }
}

impl fmt::Display for CallingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── MethodInfo / MethodCalling ─────────────────────────────────────

/// A resolved method. Built once per identity, shared and immutable afterwards.
#[derive(Debug, Serialize)]
pub struct MethodInfo {
    pub id: MethodId,
    /// Absent for methods that only exist outside the analyzed source
    #[serde(skip)]
    pub declaration: Option<MethodRef>,
    pub dependencies: Vec<MethodCalling>,
    pub overrides: Vec<Arc<MethodInfo>>,
}

impl MethodInfo {
    /// A node that carries only its identity: filtered, external, or an in-flight override.
    pub fn reference(id: MethodId) -> Self {
        MethodInfo { id, declaration: None, dependencies: Vec::new(), overrides: Vec::new() }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Callee {
    Method(Arc<MethodInfo>),
    /// Back-reference to a method that was still being resolved
    RecursiveAt(MethodId),
}

/// One dependency edge.
#[derive(Debug, Clone, Serialize)]
pub struct MethodCalling {
    #[serde(flatten)]
    pub callee: Callee,
    #[serde(rename = "callingType")]
    pub calling_type: CallingType,
}

impl MethodCalling {
    pub fn new(method: Arc<MethodInfo>, calling_type: CallingType) -> Self {
        MethodCalling { callee: Callee::Method(method), calling_type }
    }

    pub fn recursive(at: MethodId, calling_type: CallingType) -> Self {
        MethodCalling { callee: Callee::RecursiveAt(at), calling_type }
    }

    pub fn callee_id(&self) -> &MethodId {
        match &self.callee {
            Callee::Method(m) => &m.id,
            Callee::RecursiveAt(id) => id,
        }
    }

    pub fn method(&self) -> Option<&Arc<MethodInfo>> {
        match &self.callee {
            Callee::Method(m) => Some(m),
            Callee::RecursiveAt(_) => None,
        }
    }

    pub fn is_recursive(&self) -> bool {
        matches!(self.callee, Callee::RecursiveAt(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical_form() {
        let id = MethodId::parse("demo.Outer$Inner#run(int,java.lang.String)").unwrap();
        assert_eq!(id.declaring_type(), "demo.Outer$Inner");
        assert_eq!(id.name(), "run");
        assert_eq!(id.param_types(), ["int", "java.lang.String"]);
        assert_eq!(id.to_string(), "demo.Outer$Inner#run(int,java.lang.String)");
    }

    #[test]
    fn test_parse_tolerates_whitespace_and_blanks() {
        let id = MethodId::parse("  demo.A # go ( int ,  long[] , ) ").unwrap();
        assert_eq!(id.as_str(), "demo.A#go(int,long[])");
        let no_args = MethodId::parse("demo.A#go()").unwrap();
        assert!(no_args.param_types().is_empty());
        assert_eq!(no_args, MethodId::new("demo.A", "go", Vec::new()));
    }

    #[test]
    fn test_parse_rejects_incomplete() {
        assert!(matches!(MethodId::parse("demo.A"), Err(GraphError::InvalidMethodId(_))));
        assert!(MethodId::parse("   ").is_err());
        assert!("#()".parse::<MethodId>().is_err());
    }

    #[test]
    fn test_equality_uses_canonical_string() {
        use std::collections::HashSet;
        let a = MethodId::parse("demo.A#go(int)").unwrap();
        let b = MethodId::new("demo.A", "go", vec!["int".to_string()]);
        let mut set = HashSet::new();
        set.insert(a.clone());
        assert!(set.contains(&b));
        assert_ne!(a, MethodId::parse("demo.A#go(long)").unwrap());
    }

    #[test]
    fn test_calling_type_serializes_upper_case() {
        let json = serde_json::to_string(&[CallingType::SelfCall, CallingType::Brother, CallingType::Stdlib]).unwrap();
        assert_eq!(json, r#"["SELF","BROTHER","STDLIB"]"#);
        assert_eq!(CallingType::Library.to_string(), "LIBRARY");
    }

    #[test]
    fn test_method_calling_json_shape() {
        let leaf = Arc::new(MethodInfo::reference(MethodId::parse("demo.B#b()").unwrap()));
        let edge = MethodCalling::new(leaf, CallingType::Brother);
        let json = serde_json::to_value(&edge).unwrap();
        assert_eq!(json["callingType"], "BROTHER");
        assert_eq!(json["method"]["id"], "demo.B#b()");

        let back = MethodCalling::recursive(MethodId::parse("demo.A#a()").unwrap(), CallingType::SelfCall);
        let json = serde_json::to_value(&back).unwrap();
        assert_eq!(json["recursiveAt"], "demo.A#a()");
        assert!(back.is_recursive());
        assert_eq!(back.callee_id().as_str(), "demo.A#a()");
    }
}
