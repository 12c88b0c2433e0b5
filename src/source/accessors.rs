//! Synthesized accessors: Lombok `@Data`/`@Getter`/`@Setter` and record components.

use super::ast::{FieldDecl, MethodDecl, Param, TypeDecl, TypeKind, TypeRef};
use super::primitives::Primitive;

const DATA: &str = "Data";
const GETTER: &str = "Getter";
const SETTER: &str = "Setter";

/// Adds the accessor methods a compiler plugin or the language itself would
/// generate. Existing methods with the same name always win.
pub(crate) fn synthesize(ty: &mut TypeDecl) {
    let mut generated = Vec::new();

    if ty.kind == TypeKind::Record {
        for field in ty.fields.iter().filter(|f| !f.is_static) {
            generated.push(accessor(&field.name, Vec::new(), field.ty.clone(), ty.line));
        }
    } else {
        let type_getters = has(&ty.annotations, DATA) || has(&ty.annotations, GETTER);
        let type_setters = has(&ty.annotations, DATA) || has(&ty.annotations, SETTER);
        for field in ty.fields.iter().filter(|f| !f.is_static) {
            if type_getters || has(&field.annotations, GETTER) {
                generated.push(accessor(&getter_name(field), Vec::new(), field.ty.clone(), ty.line));
            }
            if !field.is_final && (type_setters || has(&field.annotations, SETTER)) {
                let param = Param { name: field.name.clone(), ty: field.ty.clone(), varargs: false };
                generated.push(accessor(&format!("set{}", capitalize(&field.name)), vec![param], TypeRef::Void, ty.line));
            }
        }
    }

    for method in generated {
        if !ty.methods.iter().any(|m| m.name == method.name) {
            ty.methods.push(method);
        }
    }
}

fn has(annotations: &[String], name: &str) -> bool {
    annotations.iter().any(|a| a == name)
}

fn getter_name(field: &FieldDecl) -> String {
    let prefix = if field.ty == TypeRef::Primitive(Primitive::Boolean) { "is" } else { "get" };
    format!("{}{}", prefix, capitalize(&field.name))
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn accessor(name: &str, params: Vec<Param>, return_type: TypeRef, line: u32) -> MethodDecl {
    MethodDecl {
        name: name.to_string(),
        type_params: Vec::new(),
        params,
        return_type,
        modifiers: vec!["public".to_string()],
        annotations: Vec::new(),
        body: None,
        line_start: line,
        line_end: line,
        synthetic: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ast::UnitId;

    fn field(name: &str, ty: TypeRef, annotations: &[&str]) -> FieldDecl {
        FieldDecl {
            name: name.to_string(),
            ty,
            is_static: false,
            is_final: false,
            annotations: annotations.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn type_decl(kind: TypeKind, annotations: &[&str], fields: Vec<FieldDecl>) -> TypeDecl {
        TypeDecl {
            name: "Person".into(),
            qualified_name: "demo.Person".into(),
            kind,
            unit: UnitId(0),
            outer: None,
            type_params: Vec::new(),
            extends: Vec::new(),
            implements: Vec::new(),
            fields,
            methods: Vec::new(),
            enum_constants: Vec::new(),
            annotations: annotations.iter().map(|a| a.to_string()).collect(),
            modifiers: Vec::new(),
            line: 1,
        }
    }

    fn names(ty: &TypeDecl) -> Vec<&str> {
        ty.methods.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn test_data_generates_getters_and_setters() {
        let mut ty = type_decl(TypeKind::Class, &["Data"], vec![
            field("name", TypeRef::named("String"), &[]),
            field("active", TypeRef::Primitive(Primitive::Boolean), &[]),
        ]);
        synthesize(&mut ty);
        assert_eq!(names(&ty), vec!["getName", "setName", "isActive", "setActive"]);
        assert!(ty.methods.iter().all(|m| m.synthetic));
        assert_eq!(ty.methods[1].params.len(), 1);
    }

    #[test]
    fn test_field_level_getter_only() {
        let mut ty = type_decl(TypeKind::Class, &[], vec![
            field("id", TypeRef::Primitive(Primitive::Long), &["Getter"]),
            field("hidden", TypeRef::named("String"), &[]),
        ]);
        synthesize(&mut ty);
        assert_eq!(names(&ty), vec!["getId"]);
    }

    #[test]
    fn test_final_field_has_no_setter() {
        let mut f = field("id", TypeRef::named("String"), &[]);
        f.is_final = true;
        let mut ty = type_decl(TypeKind::Class, &["Data"], vec![f]);
        synthesize(&mut ty);
        assert_eq!(names(&ty), vec!["getId"]);
    }

    #[test]
    fn test_explicit_method_wins() {
        let mut ty = type_decl(TypeKind::Class, &["Getter"], vec![field("name", TypeRef::named("String"), &[])]);
        ty.methods.push(accessor("getName", Vec::new(), TypeRef::named("Object"), 3));
        ty.methods[0].synthetic = false;
        synthesize(&mut ty);
        assert_eq!(ty.methods.len(), 1);
        assert!(!ty.methods[0].synthetic);
    }

    #[test]
    fn test_record_components_become_accessors() {
        let mut ty = type_decl(TypeKind::Record, &[], vec![
            field("x", TypeRef::Primitive(Primitive::Int), &[]),
            field("label", TypeRef::named("String"), &[]),
        ]);
        synthesize(&mut ty);
        assert_eq!(names(&ty), vec!["x", "label"]);
    }
}
