//! Java AST parser using tree-sitter: lowers a file into the compact syntax model.

use super::ast::*;
use super::primitives::Primitive;

/// Result of lowering one file. `outer` links in `types` are file-local
/// positions; the index rebases them when the file is merged.
#[derive(Debug, Default)]
pub(crate) struct ParsedFile {
    pub package: Option<String>,
    pub imports: Vec<Import>,
    pub types: Vec<TypeDecl>,
}

// ─── Main entry point ───────────────────────────────────────────────

pub(crate) fn new_java_parser() -> Result<tree_sitter::Parser, tree_sitter::LanguageError> {
    let mut parser = tree_sitter::Parser::new();
    parser.set_language(&tree_sitter_java::LANGUAGE.into())?;
    Ok(parser)
}

pub(crate) fn parse_java_file(parser: &mut tree_sitter::Parser, source: &str) -> Option<ParsedFile> {
    let tree = parser.parse(source, None)?;
    let root = tree.root_node();
    let src = source.as_bytes();

    let mut file = ParsedFile::default();
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        match child.kind() {
            "package_declaration" => {
                file.package = named_children(child)
                    .into_iter()
                    .find(|n| matches!(n.kind(), "scoped_identifier" | "identifier"))
                    .map(|n| node_text(n, src).to_string());
            }
            "import_declaration" => {
                if let Some(import) = lower_import(child, src) {
                    file.imports.push(import);
                }
            }
            kind if is_type_declaration(kind) => {
                let package = file.package.clone();
                collect_type(child, src, package.as_deref(), None, &mut file.types);
            }
            _ => {}
        }
    }
    Some(file)
}

fn is_type_declaration(kind: &str) -> bool {
    matches!(
        kind,
        "class_declaration"
            | "interface_declaration"
            | "enum_declaration"
            | "record_declaration"
            | "annotation_type_declaration"
    )
}

fn lower_import(node: tree_sitter::Node, src: &[u8]) -> Option<Import> {
    let mut name = None;
    let mut is_static = false;
    let mut is_asterisk = false;
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "static" => is_static = true,
            "asterisk" => is_asterisk = true,
            "scoped_identifier" | "identifier" => name = Some(node_text(child, src).to_string()),
            _ => {}
        }
    }
    Some(Import { name: name?, is_static, is_asterisk })
}

// ─── Type declarations ──────────────────────────────────────────────

fn collect_type(
    node: tree_sitter::Node,
    src: &[u8],
    package: Option<&str>,
    outer: Option<usize>,
    out: &mut Vec<TypeDecl>,
) {
    let Some(name_node) = find_child_by_field(node, "name") else { return };
    let name = node_text(name_node, src).to_string();
    let qualified_name = match outer {
        Some(o) => format!("{}${}", out[o].qualified_name, name),
        None => match package {
            Some(p) => format!("{}.{}", p, name),
            None => name.clone(),
        },
    };
    let kind = match node.kind() {
        "interface_declaration" => TypeKind::Interface,
        "enum_declaration" => TypeKind::Enum,
        "record_declaration" => TypeKind::Record,
        "annotation_type_declaration" => TypeKind::Annotation,
        _ => TypeKind::Class,
    };
    let (modifiers, annotations) = extract_modifiers(node, src);

    let mut extends = Vec::new();
    let mut implements = Vec::new();
    if let Some(superclass) = find_child_by_field(node, "superclass") {
        extends.extend(named_children(superclass).into_iter().filter(|n| is_type_node(n.kind())).map(|n| lower_type(n, src)));
    }
    if let Some(interfaces) = find_child_by_field(node, "interfaces") {
        implements.extend(type_list(interfaces, src));
    }
    if let Some(ext) = find_child_by_kind(node, "extends_interfaces") {
        extends.extend(type_list(ext, src));
    }

    let idx = out.len();
    out.push(TypeDecl {
        name,
        qualified_name,
        kind,
        unit: UnitId(0),
        outer: outer.map(|o| TypeId(o as u32)),
        type_params: find_child_by_field(node, "type_parameters")
            .map(|n| lower_type_params(n, src))
            .unwrap_or_default(),
        extends,
        implements,
        fields: Vec::new(),
        methods: Vec::new(),
        enum_constants: Vec::new(),
        annotations,
        modifiers,
        line: node.start_position().row as u32 + 1,
    });

    if kind == TypeKind::Record {
        if let Some(params) = find_child_by_field(node, "parameters") {
            for (param_name, ty, _) in lower_formal_params(params, src) {
                out[idx].fields.push(FieldDecl {
                    name: param_name,
                    ty,
                    is_static: false,
                    is_final: true,
                    annotations: Vec::new(),
                });
            }
        }
    }

    if let Some(body) = find_child_by_field(node, "body") {
        collect_members(body, src, package, idx, out);
    }
}

fn collect_members(body: tree_sitter::Node, src: &[u8], package: Option<&str>, owner: usize, out: &mut Vec<TypeDecl>) {
    for member in named_children(body) {
        match member.kind() {
            "field_declaration" | "constant_declaration" => {
                let (modifiers, annotations) = extract_modifiers(member, src);
                let is_interface = out[owner].is_interface();
                let Some(type_node) = find_child_by_field(member, "type") else { continue };
                let base = lower_type(type_node, src);
                for declarator in named_children(member).into_iter().filter(|n| n.kind() == "variable_declarator") {
                    let Some(name_node) = find_child_by_field(declarator, "name") else { continue };
                    out[owner].fields.push(FieldDecl {
                        name: node_text(name_node, src).to_string(),
                        ty: with_dimensions(base.clone(), find_child_by_field(declarator, "dimensions"), src),
                        is_static: is_interface || modifiers.iter().any(|m| m == "static"),
                        is_final: is_interface || modifiers.iter().any(|m| m == "final"),
                        annotations: annotations.clone(),
                    });
                }
            }
            "method_declaration" | "annotation_type_element_declaration" => {
                if let Some(method) = lower_method(member, src) {
                    out[owner].methods.push(method);
                }
            }
            "enum_constant" => {
                if let Some(name_node) = find_child_by_field(member, "name") {
                    out[owner].enum_constants.push(node_text(name_node, src).to_string());
                }
            }
            "enum_body_declarations" => collect_members(member, src, package, owner, out),
            kind if is_type_declaration(kind) => collect_type(member, src, package, Some(owner), out),
            _ => {}
        }
    }
}

fn lower_method(node: tree_sitter::Node, src: &[u8]) -> Option<MethodDecl> {
    let name = node_text(find_child_by_field(node, "name")?, src).to_string();
    let (modifiers, annotations) = extract_modifiers(node, src);
    let return_type = find_child_by_field(node, "type")
        .map(|t| with_dimensions(lower_type(t, src), find_child_by_field(node, "dimensions"), src))
        .unwrap_or(TypeRef::Void);
    let params = find_child_by_field(node, "parameters")
        .map(|p| lower_formal_params(p, src))
        .unwrap_or_default()
        .into_iter()
        .map(|(name, ty, varargs)| Param { name, ty, varargs })
        .collect();
    let body = find_child_by_field(node, "body").map(|b| lower_body(b, src));

    Some(MethodDecl {
        name,
        type_params: find_child_by_field(node, "type_parameters")
            .map(|n| lower_type_params(n, src))
            .unwrap_or_default(),
        params,
        return_type,
        modifiers,
        annotations,
        body,
        line_start: node.start_position().row as u32 + 1,
        line_end: node.end_position().row as u32 + 1,
        synthetic: false,
    })
}

/// `(name, type, varargs)` for every declared parameter; receiver parameters are skipped.
fn lower_formal_params(node: tree_sitter::Node, src: &[u8]) -> Vec<(String, TypeRef, bool)> {
    let mut params = Vec::new();
    for param in named_children(node) {
        match param.kind() {
            "formal_parameter" => {
                let (Some(type_node), Some(name_node)) =
                    (find_child_by_field(param, "type"), find_child_by_field(param, "name"))
                else {
                    continue;
                };
                let ty = with_dimensions(lower_type(type_node, src), find_child_by_field(param, "dimensions"), src);
                params.push((node_text(name_node, src).to_string(), ty, false));
            }
            "spread_parameter" => {
                let children = named_children(param);
                let Some(type_node) = children.iter().find(|n| is_type_node(n.kind())) else { continue };
                let name = children
                    .iter()
                    .find(|n| n.kind() == "variable_declarator")
                    .and_then(|d| find_child_by_field(*d, "name"))
                    .map(|n| node_text(n, src).to_string())
                    .unwrap_or_default();
                params.push((name, lower_type(*type_node, src), true));
            }
            _ => {}
        }
    }
    params
}

fn lower_type_params(node: tree_sitter::Node, src: &[u8]) -> Vec<TypeParam> {
    named_children(node)
        .into_iter()
        .filter(|n| n.kind() == "type_parameter")
        .filter_map(|param| {
            let children = named_children(param);
            let name = children
                .iter()
                .find(|n| matches!(n.kind(), "type_identifier" | "identifier"))
                .map(|n| node_text(*n, src).to_string())?;
            let bounds = children
                .iter()
                .find(|n| n.kind() == "type_bound")
                .map(|b| named_children(*b).into_iter().filter(|n| is_type_node(n.kind())).map(|n| lower_type(n, src)).collect())
                .unwrap_or_default();
            Some(TypeParam { name, bounds })
        })
        .collect()
}

// ─── Types ──────────────────────────────────────────────────────────

fn is_type_node(kind: &str) -> bool {
    matches!(
        kind,
        "type_identifier"
            | "scoped_type_identifier"
            | "generic_type"
            | "array_type"
            | "integral_type"
            | "floating_point_type"
            | "boolean_type"
            | "void_type"
            | "annotated_type"
    )
}

fn type_list(node: tree_sitter::Node, src: &[u8]) -> Vec<TypeRef> {
    let list = if node.kind() == "type_list" { Some(node) } else { find_child_by_kind(node, "type_list") };
    list.map(|l| named_children(l).into_iter().filter(|n| is_type_node(n.kind())).map(|n| lower_type(n, src)).collect())
        .unwrap_or_default()
}

pub(crate) fn lower_type(node: tree_sitter::Node, src: &[u8]) -> TypeRef {
    match node.kind() {
        "void_type" => TypeRef::Void,
        "integral_type" | "floating_point_type" | "boolean_type" => Primitive::from_name(node_text(node, src).trim())
            .map(TypeRef::Primitive)
            .unwrap_or_else(|| TypeRef::named(node_text(node, src))),
        "type_identifier" => match node_text(node, src) {
            "var" => TypeRef::Inferred,
            name => TypeRef::named(name),
        },
        "generic_type" => {
            let children = named_children(node);
            let name = children
                .iter()
                .find(|n| matches!(n.kind(), "type_identifier" | "scoped_type_identifier"))
                .map(|n| erase_generics(node_text(*n, src)))
                .unwrap_or_default();
            let args = children
                .iter()
                .find(|n| n.kind() == "type_arguments")
                .map(|a| named_children(*a).into_iter().map(|t| lower_type(t, src)).collect())
                .unwrap_or_default();
            TypeRef::Named { name, args }
        }
        "array_type" => {
            let element = find_child_by_field(node, "element").map(|e| lower_type(e, src)).unwrap_or(TypeRef::Void);
            with_dimensions(element, find_child_by_field(node, "dimensions"), src)
        }
        "annotated_type" => named_children(node)
            .into_iter()
            .rev()
            .find(|n| is_type_node(n.kind()))
            .map(|n| lower_type(n, src))
            .unwrap_or_else(|| TypeRef::named(node_text(node, src))),
        "wildcard" => TypeRef::Wildcard(
            named_children(node)
                .into_iter()
                .find(|n| is_type_node(n.kind()))
                .map(|n| Box::new(lower_type(n, src))),
        ),
        _ => TypeRef::named(&erase_generics(node_text(node, src))),
    }
}

fn with_dimensions(mut ty: TypeRef, dims: Option<tree_sitter::Node>, src: &[u8]) -> TypeRef {
    if let Some(d) = dims {
        for _ in 0..node_text(d, src).matches('[').count() {
            ty = TypeRef::array_of(ty);
        }
    }
    ty
}

/// `Outer<String>.Inner` -> `Outer.Inner`; also drops annotations and whitespace.
fn erase_generics(text: &str) -> String {
    let mut depth = 0usize;
    let mut out = String::with_capacity(text.len());
    for token in text.split_whitespace().filter(|t| !t.starts_with('@')) {
        for ch in token.chars() {
            match ch {
                '<' => depth += 1,
                '>' => depth = depth.saturating_sub(1),
                _ if depth == 0 => out.push(ch),
                _ => {}
            }
        }
    }
    out
}

// ─── Method bodies ──────────────────────────────────────────────────

struct BodyBuilder<'s> {
    src: &'s [u8],
    body: Body,
}

impl BodyBuilder<'_> {
    fn push_scope(&mut self, parent: ScopeId, kind: ScopeKind) -> ScopeId {
        let id = ScopeId(self.body.scopes.len() as u32);
        self.body.scopes.push(LexicalScope { parent: Some(parent), kind, locals: Vec::new(), lambda_params: Vec::new() });
        id
    }

    fn add_local(&mut self, scope: ScopeId, local: LocalVar) {
        if let Some(s) = self.body.scopes.get_mut(scope.0 as usize) {
            s.locals.push(local);
        }
    }

    fn walk_children(&mut self, node: tree_sitter::Node, scope: ScopeId) {
        for child in named_children(node) {
            self.walk(child, scope);
        }
    }

    fn walk(&mut self, node: tree_sitter::Node, scope: ScopeId) {
        let src = self.src;
        match node.kind() {
            "block" | "switch_block" => {
                let inner = self.push_scope(scope, ScopeKind::Block);
                self.walk_children(node, inner);
            }
            "local_variable_declaration" => {
                let Some(type_node) = find_child_by_field(node, "type") else { return };
                let base = lower_type(type_node, src);
                for declarator in named_children(node).into_iter().filter(|n| n.kind() == "variable_declarator") {
                    let Some(name_node) = find_child_by_field(declarator, "name") else { continue };
                    let value = find_child_by_field(declarator, "value");
                    self.add_local(scope, LocalVar {
                        name: node_text(name_node, src).to_string(),
                        ty: with_dimensions(base.clone(), find_child_by_field(declarator, "dimensions"), src),
                        init: value.map(|v| lower_expr(v, src)),
                        iterable: None,
                    });
                    if let Some(v) = value {
                        self.walk(v, scope);
                    }
                }
            }
            "enhanced_for_statement" => {
                let value = find_child_by_field(node, "value");
                if let Some(v) = value {
                    self.walk(v, scope);
                }
                let inner = self.push_scope(scope, ScopeKind::Block);
                if let (Some(type_node), Some(name_node)) =
                    (find_child_by_field(node, "type"), find_child_by_field(node, "name"))
                {
                    self.add_local(inner, LocalVar {
                        name: node_text(name_node, src).to_string(),
                        ty: lower_type(type_node, src),
                        init: None,
                        iterable: value.map(|v| lower_expr(v, src)),
                    });
                }
                if let Some(body) = find_child_by_field(node, "body") {
                    self.walk(body, inner);
                }
            }
            "for_statement" | "try_with_resources_statement" => {
                let inner = self.push_scope(scope, ScopeKind::Block);
                self.walk_children(node, inner);
            }
            "resource" => {
                if let (Some(type_node), Some(name_node)) =
                    (find_child_by_field(node, "type"), find_child_by_field(node, "name"))
                {
                    let value = find_child_by_field(node, "value");
                    self.add_local(scope, LocalVar {
                        name: node_text(name_node, src).to_string(),
                        ty: lower_type(type_node, src),
                        init: value.map(|v| lower_expr(v, src)),
                        iterable: None,
                    });
                }
                self.walk_children(node, scope);
            }
            "catch_clause" => {
                let inner = self.push_scope(scope, ScopeKind::Block);
                if let Some(param) = find_child_by_kind(node, "catch_formal_parameter") {
                    let ty = find_child_by_kind(param, "catch_type")
                        .and_then(|c| named_children(c).into_iter().find(|n| is_type_node(n.kind())))
                        .map(|t| lower_type(t, src));
                    if let (Some(ty), Some(name_node)) = (ty, find_child_by_field(param, "name")) {
                        self.add_local(inner, LocalVar { name: node_text(name_node, src).to_string(), ty, init: None, iterable: None });
                    }
                }
                if let Some(body) = find_child_by_field(node, "body") {
                    self.walk_children(body, inner);
                }
            }
            "lambda_expression" => {
                let inner = self.push_scope(scope, ScopeKind::Lambda);
                if let Some(params) = find_child_by_field(node, "parameters") {
                    let lambda_params = lower_lambda_params(params, src);
                    if let Some(s) = self.body.scopes.get_mut(inner.0 as usize) {
                        s.lambda_params = lambda_params;
                    }
                }
                if let Some(body) = find_child_by_field(node, "body") {
                    if body.kind() == "block" {
                        self.walk_children(body, inner);
                    } else {
                        self.walk(body, inner);
                    }
                }
            }
            "instanceof_expression" => {
                if let (Some(ty), Some(name_node)) = (find_child_by_field(node, "right"), find_child_by_field(node, "name")) {
                    self.add_local(scope, LocalVar {
                        name: node_text(name_node, src).to_string(),
                        ty: lower_type(ty, src),
                        init: None,
                        iterable: None,
                    });
                }
                self.walk_children(node, scope);
            }
            "method_invocation" => {
                if let Some(call) = lower_call(node, src) {
                    self.body.calls.push(CallSite { call, scope, line: node.start_position().row as u32 + 1 });
                }
                // Receivers and arguments may hold further invocations: a.b().c(d())
                self.walk_children(node, scope);
            }
            "object_creation_expression" => {
                self.walk_children(node, scope);
                if let Some(class_body) = find_child_by_kind(node, "class_body") {
                    let base = find_child_by_field(node, "type").map(|t| lower_type(t, src)).unwrap_or(TypeRef::Void);
                    let inner = self.push_scope(scope, ScopeKind::Anonymous(base));
                    self.walk_anonymous_body(class_body, inner);
                }
            }
            // Local classes and anonymous bodies reached any other way are not part of this method
            "class_body" | "class_declaration" | "interface_declaration" | "enum_declaration" | "record_declaration" => {}
            _ => self.walk_children(node, scope),
        }
    }

    /// Members of an anonymous class: fields become locals of its scope, and each
    /// method or initializer gets a child scope holding its parameters.
    fn walk_anonymous_body(&mut self, class_body: tree_sitter::Node, scope: ScopeId) {
        let src = self.src;
        for member in named_children(class_body) {
            match member.kind() {
                "field_declaration" => {
                    let Some(type_node) = find_child_by_field(member, "type") else { continue };
                    let base = lower_type(type_node, src);
                    for declarator in named_children(member).into_iter().filter(|n| n.kind() == "variable_declarator") {
                        let Some(name_node) = find_child_by_field(declarator, "name") else { continue };
                        let value = find_child_by_field(declarator, "value");
                        self.add_local(scope, LocalVar {
                            name: node_text(name_node, src).to_string(),
                            ty: with_dimensions(base.clone(), find_child_by_field(declarator, "dimensions"), src),
                            init: value.map(|v| lower_expr(v, src)),
                            iterable: None,
                        });
                        if let Some(v) = value {
                            self.walk(v, scope);
                        }
                    }
                }
                "method_declaration" => {
                    let inner = self.push_scope(scope, ScopeKind::Block);
                    if let Some(params) = find_child_by_field(member, "parameters") {
                        for (name, ty, varargs) in lower_formal_params(params, src) {
                            let ty = if varargs { TypeRef::array_of(ty) } else { ty };
                            self.add_local(inner, LocalVar { name, ty, init: None, iterable: None });
                        }
                    }
                    if let Some(body) = find_child_by_field(member, "body") {
                        self.walk_children(body, inner);
                    }
                }
                "block" => self.walk(member, scope),
                _ => {}
            }
        }
    }
}

fn lower_body(node: tree_sitter::Node, src: &[u8]) -> Body {
    let mut builder = BodyBuilder {
        src,
        body: Body {
            scopes: vec![LexicalScope { parent: None, kind: ScopeKind::Method, locals: Vec::new(), lambda_params: Vec::new() }],
            calls: Vec::new(),
        },
    };
    builder.walk_children(node, ScopeId(0));
    builder.body
}

fn lower_lambda_params(node: tree_sitter::Node, src: &[u8]) -> Vec<LambdaParam> {
    match node.kind() {
        "identifier" => vec![LambdaParam { name: node_text(node, src).to_string(), ty: None }],
        "inferred_parameters" => named_children(node)
            .into_iter()
            .filter(|n| n.kind() == "identifier")
            .map(|n| LambdaParam { name: node_text(n, src).to_string(), ty: None })
            .collect(),
        "formal_parameters" => lower_formal_params(node, src)
            .into_iter()
            .map(|(name, ty, _)| LambdaParam { name, ty: (ty != TypeRef::Inferred).then_some(ty) })
            .collect(),
        _ => Vec::new(),
    }
}

// ─── Expressions ────────────────────────────────────────────────────

fn lower_call(node: tree_sitter::Node, src: &[u8]) -> Option<MethodCall> {
    let name = node_text(find_child_by_field(node, "name")?, src).to_string();
    let receiver = find_child_by_field(node, "object").map(|o| Box::new(lower_expr(o, src)));
    let args = find_child_by_field(node, "arguments")
        .map(|a| named_children(a).into_iter().map(|n| lower_expr(n, src)).collect())
        .unwrap_or_default();
    Some(MethodCall { receiver, name, args })
}

fn boxed(node: Option<tree_sitter::Node>, src: &[u8]) -> Box<Expr> {
    Box::new(node.map(|n| lower_expr(n, src)).unwrap_or(Expr::Unsupported("missing".to_string())))
}

pub(crate) fn lower_expr(node: tree_sitter::Node, src: &[u8]) -> Expr {
    let text = node_text(node, src);
    match node.kind() {
        "decimal_integer_literal" | "hex_integer_literal" | "octal_integer_literal" | "binary_integer_literal" => {
            if text.ends_with(['l', 'L']) { Expr::Literal(Literal::Long) } else { Expr::Literal(Literal::Int) }
        }
        "decimal_floating_point_literal" | "hex_floating_point_literal" => {
            if text.ends_with(['f', 'F']) { Expr::Literal(Literal::Float) } else { Expr::Literal(Literal::Double) }
        }
        "character_literal" => Expr::Literal(Literal::Char),
        "string_literal" | "text_block" => Expr::Literal(Literal::String),
        "true" | "false" => Expr::Literal(Literal::Boolean),
        "null_literal" => Expr::Literal(Literal::Null),
        "identifier" => Expr::Name(text.to_string()),
        "this" => Expr::This,
        "super" => Expr::Super,
        "field_access" => {
            let name = find_child_by_field(node, "field").map(|f| node_text(f, src).to_string()).unwrap_or_default();
            Expr::FieldAccess { receiver: boxed(find_child_by_field(node, "object"), src), name }
        }
        "method_invocation" => match lower_call(node, src) {
            Some(call) => Expr::Call(call),
            None => Expr::Unsupported(node.kind().to_string()),
        },
        "object_creation_expression" => Expr::New {
            ty: find_child_by_field(node, "type").map(|t| lower_type(t, src)).unwrap_or(TypeRef::Void),
            args: find_child_by_field(node, "arguments")
                .map(|a| named_children(a).into_iter().map(|n| lower_expr(n, src)).collect())
                .unwrap_or_default(),
        },
        "array_creation_expression" => {
            let element = find_child_by_field(node, "type").map(|t| lower_type(t, src)).unwrap_or(TypeRef::Void);
            let mut depth = 0;
            for child in named_children(node) {
                match child.kind() {
                    "dimensions_expr" => depth += 1,
                    "dimensions" => depth += node_text(child, src).matches('[').count(),
                    _ => {}
                }
            }
            let mut ty = element;
            for _ in 0..depth.max(1) {
                ty = TypeRef::array_of(ty);
            }
            Expr::NewArray(ty)
        }
        "array_access" => Expr::ArrayAccess(boxed(find_child_by_field(node, "array"), src)),
        "binary_expression" => {
            let op = find_child_by_field(node, "operator").and_then(|o| BinaryOp::from_token(node_text(o, src)));
            match op {
                Some(op) => Expr::Binary {
                    op,
                    left: boxed(find_child_by_field(node, "left"), src),
                    right: boxed(find_child_by_field(node, "right"), src),
                },
                None => Expr::Unsupported(node.kind().to_string()),
            }
        }
        "unary_expression" => {
            let op = match find_child_by_field(node, "operator").map(|o| node_text(o, src)) {
                Some("!") => UnaryOp::Not,
                Some("-") => UnaryOp::Neg,
                Some("~") => UnaryOp::BitNot,
                _ => UnaryOp::Plus,
            };
            Expr::Unary { op, operand: boxed(find_child_by_field(node, "operand"), src) }
        }
        "update_expression" => {
            let op = if text.contains("++") { UnaryOp::Increment } else { UnaryOp::Decrement };
            Expr::Unary { op, operand: boxed(named_children(node).into_iter().next(), src) }
        }
        "ternary_expression" => Expr::Conditional {
            then: boxed(find_child_by_field(node, "consequence"), src),
            otherwise: boxed(find_child_by_field(node, "alternative"), src),
        },
        "cast_expression" => Expr::Cast {
            ty: find_child_by_field(node, "type").map(|t| lower_type(t, src)).unwrap_or(TypeRef::Void),
            expr: boxed(find_child_by_field(node, "value"), src),
        },
        "instanceof_expression" => Expr::InstanceOf(boxed(find_child_by_field(node, "left"), src)),
        "assignment_expression" => Expr::Assign {
            target: boxed(find_child_by_field(node, "left"), src),
            value: boxed(find_child_by_field(node, "right"), src),
        },
        "parenthesized_expression" => match named_children(node).into_iter().next() {
            Some(inner) => lower_expr(inner, src),
            None => Expr::Unsupported(node.kind().to_string()),
        },
        "class_literal" => match named_children(node).into_iter().next() {
            Some(t) => Expr::ClassLiteral(lower_type(t, src)),
            None => Expr::Unsupported(node.kind().to_string()),
        },
        "lambda_expression" => Expr::Lambda,
        "method_reference" => Expr::MethodReference,
        kind => Expr::Unsupported(kind.to_string()),
    }
}

// ─── Helpers ────────────────────────────────────────────────────────

fn node_text<'a>(node: tree_sitter::Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

/// Named children without comments.
fn named_children(node: tree_sitter::Node) -> Vec<tree_sitter::Node> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|n| !n.kind().ends_with("comment"))
        .collect()
}

fn find_child_by_kind<'a>(node: tree_sitter::Node<'a>, kind: &str) -> Option<tree_sitter::Node<'a>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|c| c.kind() == kind);
    found
}

fn find_child_by_field<'a>(node: tree_sitter::Node<'a>, field: &str) -> Option<tree_sitter::Node<'a>> {
    node.child_by_field_name(field)
}

/// Keyword modifiers and simple annotation names (`lombok.Data` -> `Data`).
fn extract_modifiers(node: tree_sitter::Node, src: &[u8]) -> (Vec<String>, Vec<String>) {
    let mut modifiers = Vec::new();
    let mut annotations = Vec::new();
    let Some(mods) = find_child_by_kind(node, "modifiers") else { return (modifiers, annotations) };
    let mut cursor = mods.walk();
    for child in mods.children(&mut cursor) {
        match child.kind() {
            "marker_annotation" | "annotation" => {
                if let Some(name) = find_child_by_field(child, "name") {
                    let full = node_text(name, src);
                    annotations.push(full.rsplit('.').next().unwrap_or(full).to_string());
                }
            }
            kind if !kind.ends_with("comment") => modifiers.push(node_text(child, src).to_string()),
            _ => {}
        }
    }
    (modifiers, annotations)
}
