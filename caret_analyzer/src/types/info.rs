//! Type descriptions
//!
//! A `TypeInfo` is a plain, serde-friendly record. Member types are stored
//! as full type names and resolved through the registry, so recursive
//! shapes (a `String` method returning `String`) need no reference cycles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Shared handle to a type description
pub type TypeRef = Arc<TypeInfo>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    #[default]
    Class,
    Struct,
    Enum,
    /// Only static members; cannot be instantiated
    Static,
    Interface,
    Array,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub is_static: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub is_static: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterInfo {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodInfo {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<ParameterInfo>,
    #[serde(rename = "returns")]
    pub return_type: String,
    #[serde(default)]
    pub is_static: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexerInfo {
    pub parameters: Vec<ParameterInfo>,
    #[serde(rename = "type")]
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConstructorInfo {
    #[serde(default)]
    pub parameters: Vec<ParameterInfo>,
}

/// Description of one type. Identity is the full name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeInfo {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub kind: TypeKind,
    /// Full name of the base type; `None` means `System.Object` for
    /// everything except `System.Object` itself and interfaces
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    /// Full name of the element type for sequences
    #[serde(default)]
    pub element_type: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldInfo>,
    #[serde(default)]
    pub properties: Vec<PropertyInfo>,
    #[serde(default)]
    pub methods: Vec<MethodInfo>,
    #[serde(default)]
    pub indexers: Vec<IndexerInfo>,
    #[serde(default)]
    pub constructors: Vec<ConstructorInfo>,
}

impl TypeInfo {
    /// `Namespace.Name`, or just `Name` outside a namespace
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    pub fn is_enum(&self) -> bool {
        self.kind == TypeKind::Enum
    }

    pub fn is_array(&self) -> bool {
        self.kind == TypeKind::Array
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    /// Value types cannot hold `null`
    pub fn is_value_type(&self) -> bool {
        matches!(self.kind, TypeKind::Struct | TypeKind::Enum)
    }

    /// Every type name this description refers to, for model validation
    pub fn referenced_type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        names.extend(self.base.as_deref());
        names.extend(self.interfaces.iter().map(String::as_str));
        names.extend(self.element_type.as_deref());
        names.extend(self.fields.iter().map(|f| f.type_name.as_str()));
        names.extend(self.properties.iter().map(|p| p.type_name.as_str()));
        for method in &self.methods {
            names.push(&method.return_type);
            names.extend(method.parameters.iter().map(|p| p.type_name.as_str()));
        }
        for indexer in &self.indexers {
            names.push(&indexer.type_name);
            names.extend(indexer.parameters.iter().map(|p| p.type_name.as_str()));
        }
        for constructor in &self.constructors {
            names.extend(constructor.parameters.iter().map(|p| p.type_name.as_str()));
        }
        names
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.namespace == other.namespace && self.name == other.name
    }
}

impl Eq for TypeInfo {}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.namespace.hash(state);
        self.name.hash(state);
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// ============================================================================
// BUILDER
// ============================================================================

fn parameters(types: &[&str]) -> Vec<ParameterInfo> {
    types
        .iter()
        .enumerate()
        .map(|(i, ty)| ParameterInfo {
            name: format!("arg{}", i),
            type_name: ty.to_string(),
        })
        .collect()
}

/// Fluent construction of `TypeInfo` values
#[derive(Debug, Clone)]
pub struct TypeBuilder {
    info: TypeInfo,
}

impl TypeBuilder {
    pub fn new(namespace: &str, name: &str, kind: TypeKind) -> Self {
        Self {
            info: TypeInfo {
                name: name.to_string(),
                namespace: namespace.to_string(),
                kind,
                base: None,
                interfaces: Vec::new(),
                element_type: None,
                fields: Vec::new(),
                properties: Vec::new(),
                methods: Vec::new(),
                indexers: Vec::new(),
                constructors: Vec::new(),
            },
        }
    }

    pub fn class(namespace: &str, name: &str) -> Self {
        Self::new(namespace, name, TypeKind::Class)
    }

    pub fn structure(namespace: &str, name: &str) -> Self {
        Self::new(namespace, name, TypeKind::Struct)
    }

    pub fn enumeration(namespace: &str, name: &str, values: &[&str]) -> Self {
        let full_name = format!("{}.{}", namespace, name);
        let mut builder = Self::new(namespace, name, TypeKind::Enum);
        for value in values {
            builder = builder.static_field(value, &full_name);
        }
        builder
    }

    pub fn static_class(namespace: &str, name: &str) -> Self {
        Self::new(namespace, name, TypeKind::Static)
    }

    pub fn interface(namespace: &str, name: &str) -> Self {
        Self::new(namespace, name, TypeKind::Interface)
    }

    pub fn base(mut self, full_name: &str) -> Self {
        self.info.base = Some(full_name.to_string());
        self
    }

    pub fn implements(mut self, full_name: &str) -> Self {
        self.info.interfaces.push(full_name.to_string());
        self
    }

    pub fn element_type(mut self, full_name: &str) -> Self {
        self.info.element_type = Some(full_name.to_string());
        self
    }

    pub fn field(mut self, name: &str, type_name: &str) -> Self {
        self.info.fields.push(FieldInfo {
            name: name.to_string(),
            type_name: type_name.to_string(),
            is_static: false,
        });
        self
    }

    pub fn static_field(mut self, name: &str, type_name: &str) -> Self {
        self.info.fields.push(FieldInfo {
            name: name.to_string(),
            type_name: type_name.to_string(),
            is_static: true,
        });
        self
    }

    pub fn property(mut self, name: &str, type_name: &str) -> Self {
        self.info.properties.push(PropertyInfo {
            name: name.to_string(),
            type_name: type_name.to_string(),
            is_static: false,
        });
        self
    }

    pub fn static_property(mut self, name: &str, type_name: &str) -> Self {
        self.info.properties.push(PropertyInfo {
            name: name.to_string(),
            type_name: type_name.to_string(),
            is_static: true,
        });
        self
    }

    pub fn method(mut self, name: &str, parameter_types: &[&str], returns: &str) -> Self {
        self.info.methods.push(MethodInfo {
            name: name.to_string(),
            parameters: parameters(parameter_types),
            return_type: returns.to_string(),
            is_static: false,
        });
        self
    }

    pub fn static_method(mut self, name: &str, parameter_types: &[&str], returns: &str) -> Self {
        self.info.methods.push(MethodInfo {
            name: name.to_string(),
            parameters: parameters(parameter_types),
            return_type: returns.to_string(),
            is_static: true,
        });
        self
    }

    pub fn indexer(mut self, parameter_types: &[&str], type_name: &str) -> Self {
        self.info.indexers.push(IndexerInfo {
            parameters: parameters(parameter_types),
            type_name: type_name.to_string(),
        });
        self
    }

    pub fn constructor(mut self, parameter_types: &[&str]) -> Self {
        self.info.constructors.push(ConstructorInfo {
            parameters: parameters(parameter_types),
        });
        self
    }

    pub fn build(self) -> TypeInfo {
        self.info
    }

    pub fn build_ref(self) -> TypeRef {
        Arc::new(self.info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_identity() {
        let customer = TypeBuilder::class("Shop", "Customer")
            .property("Name", "System.String")
            .method("Rename", &["System.String"], "Shop.Customer")
            .build();

        assert_eq!(customer.full_name(), "Shop.Customer");
        assert_eq!(customer.methods[0].parameters[0].name, "arg0");

        // identity ignores members
        let bare = TypeBuilder::class("Shop", "Customer").build();
        assert_eq!(customer, bare);
        assert_ne!(customer, TypeBuilder::class("Crm", "Customer").build());
    }

    #[test]
    fn test_enumeration_values_are_static_fields() {
        let color = TypeBuilder::enumeration("Paint", "Color", &["Red", "Green"]).build();
        assert!(color.is_enum());
        assert!(color.is_value_type());
        assert!(color.fields.iter().all(|f| f.is_static && f.type_name == "Paint.Color"));
    }

    #[test]
    fn test_referenced_type_names() {
        let info = TypeBuilder::class("", "Node")
            .base("Tree")
            .property("Parent", "Node")
            .method("Find", &["System.Int32"], "Node")
            .build();

        assert_eq!(info.full_name(), "Node");
        let names = info.referenced_type_names();
        assert!(names.contains(&"Tree"));
        assert!(names.contains(&"System.Int32"));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let info: TypeInfo = serde_json::from_str(
            r#"{
                "name": "Order",
                "namespace": "Shop",
                "properties": [{ "name": "Total", "type": "System.Decimal" }],
                "methods": [{ "name": "Ship", "returns": "System.Boolean" }]
            }"#,
        )
        .unwrap();

        assert_eq!(info.kind, TypeKind::Class);
        assert!(!info.properties[0].is_static);
        assert!(info.methods[0].parameters.is_empty());
    }
}
