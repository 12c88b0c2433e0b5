//! Flat node/edge rendering of a resolved graph for JSON output.

use std::collections::{BTreeMap, HashSet, VecDeque};

use serde::Serialize;

use crate::source::SourceIndex;

use super::types::{Callee, CallingType, MethodInfo};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgumentView {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodView {
    pub id: String,
    pub name: String,
    pub declaring_class: String,
    pub arguments: Vec<ArgumentView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeView {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub calling_type: CallingType,
}

/// Every method reachable from the root, each listed once.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphView {
    pub root_method_id: String,
    pub methods: BTreeMap<String, MethodView>,
    pub callings: Vec<EdgeView>,
    pub recursions: Vec<EdgeView>,
    pub overrides: BTreeMap<String, Vec<String>>,
}

impl GraphView {
    /// Breadth-first from `root`; edges appear in visiting order.
    pub fn from_root(root: &MethodInfo, index: &dyn SourceIndex) -> Self {
        let mut view = GraphView {
            root_method_id: root.id.to_string(),
            methods: BTreeMap::new(),
            callings: Vec::new(),
            recursions: Vec::new(),
            overrides: BTreeMap::new(),
        };
        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&MethodInfo> = VecDeque::new();
        visited.insert(root.id.as_str());
        queue.push_back(root);

        while let Some(node) = queue.pop_front() {
            let from = node.id.to_string();
            view.methods.insert(from.clone(), method_view(node, index));

            for calling in &node.dependencies {
                match &calling.callee {
                    Callee::Method(callee) => {
                        view.callings.push(EdgeView {
                            from: from.clone(),
                            to: callee.id.to_string(),
                            calling_type: calling.calling_type,
                        });
                        if visited.insert(callee.id.as_str()) {
                            queue.push_back(callee);
                        }
                    }
                    Callee::RecursiveAt(target) => view.recursions.push(EdgeView {
                        from: from.clone(),
                        to: target.to_string(),
                        calling_type: calling.calling_type,
                    }),
                }
            }

            if !node.overrides.is_empty() {
                let ids = view.overrides.entry(from.clone()).or_default();
                for over in &node.overrides {
                    ids.push(over.id.to_string());
                    if visited.insert(over.id.as_str()) {
                        queue.push_back(over);
                    }
                }
            }
        }
        view
    }
}

fn method_view(node: &MethodInfo, index: &dyn SourceIndex) -> MethodView {
    let arguments = match node.declaration {
        Some(m) => index
            .method_decl(m)
            .params
            .iter()
            .zip(index.param_types(m))
            .map(|(p, ty)| ArgumentView { name: p.name.clone(), ty: ty.name })
            .collect(),
        None => node
            .id
            .param_types()
            .iter()
            .enumerate()
            .map(|(i, ty)| ArgumentView { name: format!("arg{}", i), ty: ty.clone() })
            .collect(),
    };
    MethodView {
        id: node.id.to_string(),
        name: node.id.name().to_string(),
        declaring_class: node.id.declaring_type().to_string(),
        arguments,
    }
}
