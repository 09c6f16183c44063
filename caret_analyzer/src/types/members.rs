//! Member lookup along a type's hierarchy

use crate::types::info::{IndexerInfo, MethodInfo, TypeRef};
use crate::types::registry::TypeRegistry;

/// Whether members are reached through an instance or through the type name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Instance,
    Static,
}

impl Binding {
    fn admits(self, is_static: bool) -> bool {
        match self {
            Binding::Instance => !is_static,
            Binding::Static => is_static,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Field,
    Property,
}

/// A field or property found by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueMember {
    pub name: String,
    pub kind: MemberKind,
    pub type_name: String,
    pub declaring_type: String,
}

fn names_match(declared: &str, requested: &str, case_insensitive: bool) -> bool {
    if case_insensitive {
        declared.eq_ignore_ascii_case(requested)
    } else {
        declared == requested
    }
}

/// Find a field or property, nearest declaration first
pub fn find_value_member(
    registry: &TypeRegistry,
    ty: &TypeRef,
    name: &str,
    binding: Binding,
    case_insensitive: bool,
) -> Option<ValueMember> {
    for declaring in registry.lookup_chain(ty) {
        let field = declaring
            .fields
            .iter()
            .find(|f| binding.admits(f.is_static) && names_match(&f.name, name, case_insensitive))
            .map(|f| (f.name.clone(), MemberKind::Field, f.type_name.clone()));
        let property = || {
            declaring
                .properties
                .iter()
                .find(|p| binding.admits(p.is_static) && names_match(&p.name, name, case_insensitive))
                .map(|p| (p.name.clone(), MemberKind::Property, p.type_name.clone()))
        };

        if let Some((name, kind, type_name)) = field.or_else(property) {
            return Some(ValueMember {
                name,
                kind,
                type_name,
                declaring_type: declaring.full_name(),
            });
        }
    }
    None
}

/// Overloads named `name`; a derived declaration hides a base one with the same parameters
pub fn find_methods(
    registry: &TypeRegistry,
    ty: &TypeRef,
    name: &str,
    binding: Binding,
    case_insensitive: bool,
) -> Vec<MethodInfo> {
    let mut methods: Vec<MethodInfo> = Vec::new();
    for declaring in registry.lookup_chain(ty) {
        for method in &declaring.methods {
            if !binding.admits(method.is_static) || !names_match(&method.name, name, case_insensitive) {
                continue;
            }
            let hidden = methods.iter().any(|m| {
                m.parameters.len() == method.parameters.len()
                    && m.parameters
                        .iter()
                        .zip(&method.parameters)
                        .all(|(a, b)| a.type_name == b.type_name)
            });
            if !hidden {
                methods.push(method.clone());
            }
        }
    }
    methods
}

/// Indexers of the nearest type declaring any
pub fn find_indexers(registry: &TypeRegistry, ty: &TypeRef) -> Vec<IndexerInfo> {
    registry
        .lookup_chain(ty)
        .iter()
        .find(|t| !t.indexers.is_empty())
        .map(|t| t.indexers.clone())
        .unwrap_or_default()
}

/// Member names grouped the way a completion list shows them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberNames {
    pub fields: Vec<String>,
    pub properties: Vec<String>,
    pub methods: Vec<String>,
}

/// Distinct member names reachable with `binding`
///
/// Static members are listed for the type itself only; instance members
/// include inherited ones when `include_inherited` is set.
pub fn member_names(
    registry: &TypeRegistry,
    ty: &TypeRef,
    binding: Binding,
    include_inherited: bool,
) -> MemberNames {
    let types = if binding == Binding::Instance && include_inherited {
        registry.lookup_chain(ty)
    } else {
        vec![ty.clone()]
    };

    let mut names = MemberNames::default();
    for declaring in &types {
        for field in declaring.fields.iter().filter(|f| binding.admits(f.is_static)) {
            push_distinct(&mut names.fields, &field.name);
        }
        for property in declaring.properties.iter().filter(|p| binding.admits(p.is_static)) {
            push_distinct(&mut names.properties, &property.name);
        }
        for method in declaring.methods.iter().filter(|m| binding.admits(m.is_static)) {
            push_distinct(&mut names.methods, &method.name);
        }
    }
    names
}

fn push_distinct(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|n| n == name) {
        names.push(name.to_string());
    }
}
