//! Type registry: name resolution and hierarchy queries
//!
//! The registry owns every known type by full name. Which custom types an
//! expression may name is decided per call: predefined types, types
//! exposed explicitly, and the interfaces and base chain of the context type.

use crate::config::compile_time::compilation::MAX_INHERITANCE_DEPTH;
use crate::types::builtin::{self, alias_full_name, builtin_types};
use crate::types::info::{TypeBuilder, TypeInfo, TypeKind, TypeRef};
use crate::types::model::ModelError;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
pub struct TypeRegistry {
    types: HashMap<String, TypeRef>,
    custom: Vec<TypeRef>,
    exposed: Vec<TypeRef>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Registry holding only the predefined types
    pub fn new() -> Self {
        let types = builtin_types()
            .iter()
            .map(|t| (t.full_name(), t.clone()))
            .collect();
        Self {
            types,
            custom: Vec::new(),
            exposed: Vec::new(),
        }
    }

    /// Add a custom type; full names must be unique
    pub fn register(&mut self, info: TypeInfo) -> Result<TypeRef, ModelError> {
        let name = info.full_name();
        if self.types.contains_key(&name) || name.ends_with("[]") {
            return Err(ModelError::DuplicateType(name));
        }
        let ty = TypeRef::new(info);
        self.types.insert(name, ty.clone());
        self.custom.push(ty.clone());
        Ok(ty)
    }

    /// Make a registered type nameable from every expression
    pub fn expose(&mut self, full_name: &str) -> Result<TypeRef, ModelError> {
        let ty = self
            .get(full_name)
            .ok_or_else(|| ModelError::UnknownType(full_name.to_string()))?;
        if !self.exposed.contains(&ty) {
            self.exposed.push(ty.clone());
        }
        Ok(ty)
    }

    /// Check that every type name used by a custom type resolves
    pub fn validate(&self) -> Result<(), ModelError> {
        for ty in &self.custom {
            for referenced in ty.referenced_type_names() {
                if self.get(referenced).is_none() {
                    return Err(ModelError::UnresolvedReference {
                        owner: ty.full_name(),
                        referenced: referenced.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Look up a full name, a keyword alias, or `T[]` for any known `T`
    pub fn get(&self, name: &str) -> Option<TypeRef> {
        if let Some(element) = name.strip_suffix("[]") {
            return self.get(element).map(|e| array_of(&e));
        }
        self.types
            .get(name)
            .or_else(|| alias_full_name(name).and_then(|full| self.types.get(full)))
            .cloned()
    }

    pub fn predefined(&self) -> &'static [TypeRef] {
        builtin_types()
    }

    pub fn is_predefined(&self, ty: &TypeInfo) -> bool {
        builtin_types().iter().any(|t| **t == *ty)
    }

    pub fn custom_types(&self) -> &[TypeRef] {
        &self.custom
    }

    pub fn exposed(&self) -> &[TypeRef] {
        &self.exposed
    }

    /// Declared base type, or `System.Object` for classes, structs and arrays
    pub fn base_type(&self, ty: &TypeInfo) -> Option<TypeRef> {
        match &ty.base {
            Some(base) => self.get(base),
            None if ty.is_interface() || ty.full_name() == builtin::OBJECT => None,
            None => self.get(builtin::OBJECT),
        }
    }

    /// `ty` followed by its base types, most derived first
    pub fn base_chain(&self, ty: &TypeRef) -> Vec<TypeRef> {
        let mut chain = vec![ty.clone()];
        let mut current = ty.clone();
        while chain.len() < MAX_INHERITANCE_DEPTH {
            match self.base_type(&current) {
                Some(base) if !chain.contains(&base) => {
                    chain.push(base.clone());
                    current = base;
                }
                _ => break,
            }
        }
        chain
    }

    /// All interfaces implemented by `ty` or any of its bases
    pub fn interfaces(&self, ty: &TypeRef) -> Vec<TypeRef> {
        let mut found: Vec<TypeRef> = Vec::new();
        let mut pending: Vec<TypeRef> = self.base_chain(ty);
        let mut seen: HashSet<String> = HashSet::new();

        while let Some(current) = pending.pop() {
            for name in &current.interfaces {
                if !seen.insert(name.clone()) || found.len() >= MAX_INHERITANCE_DEPTH {
                    continue;
                }
                if let Some(interface) = self.get(name) {
                    found.push(interface.clone());
                    pending.push(interface);
                }
            }
        }
        found
    }

    /// Interfaces, then the base chain; the custom types a context exposes
    pub fn hierarchy(&self, ty: &TypeRef) -> Vec<TypeRef> {
        let mut types = self.interfaces(ty);
        types.extend(self.base_chain(ty));
        types
    }

    /// Types searched for members of `ty`, nearest first
    pub fn lookup_chain(&self, ty: &TypeRef) -> Vec<TypeRef> {
        let mut chain = self.base_chain(ty);
        for interface in self.interfaces(ty) {
            if !chain.contains(&interface) {
                chain.push(interface);
            }
        }
        if let Some(object) = self.get(builtin::OBJECT) {
            if !chain.contains(&object) {
                chain.push(object);
            }
        }
        chain
    }

    /// Element type of a sequence, searching bases and interfaces
    pub fn element_type(&self, ty: &TypeRef) -> Option<TypeRef> {
        self.lookup_chain(ty)
            .iter()
            .find_map(|t| t.element_type.as_deref())
            .and_then(|name| self.get(name))
    }

    /// Reference conversion from `from` to `to`
    pub fn is_assignable(&self, from: &TypeRef, to: &TypeRef) -> bool {
        from == to || to.full_name() == builtin::OBJECT || self.lookup_chain(from).contains(to)
    }

    /// Resolve a type name as written in an expression
    ///
    /// Matches full names and simple names (case-sensitive) among the
    /// predefined types, exposed types and the context's hierarchy.
    pub fn find_accessible(&self, name: &str, context: Option<&TypeRef>) -> Option<TypeRef> {
        let hierarchy = context.map(|c| self.hierarchy(c)).unwrap_or_default();
        builtin_types()
            .iter()
            .chain(self.exposed.iter())
            .chain(hierarchy.iter())
            .find(|t| t.name == name || t.full_name() == name)
            .cloned()
    }

    /// Whether `prefix` starts the namespace of some accessible type
    pub fn is_namespace_prefix(&self, prefix: &str, context: Option<&TypeRef>) -> bool {
        let hierarchy = context.map(|c| self.hierarchy(c)).unwrap_or_default();
        builtin_types()
            .iter()
            .chain(self.exposed.iter())
            .chain(hierarchy.iter())
            .any(|t| {
                t.namespace == prefix
                    || t.namespace
                        .strip_prefix(prefix)
                        .is_some_and(|rest| rest.starts_with('.'))
            })
    }
}

/// Synthesized single-dimension array of `element`
pub fn array_of(element: &TypeRef) -> TypeRef {
    let element_name = element.full_name();
    TypeBuilder::new(
        &element.namespace,
        &format!("{}[]", element.name),
        TypeKind::Array,
    )
    .element_type(&element_name)
    .property("Length", builtin::INT32)
    .property("LongLength", builtin::INT64)
    .indexer(&[builtin::INT32], &element_name)
    .build_ref()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn shop_registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry
            .register(
                TypeBuilder::interface("Shop", "IPriced")
                    .property("Price", builtin::DECIMAL)
                    .build(),
            )
            .unwrap();
        registry
            .register(
                TypeBuilder::class("Shop", "Entity")
                    .property("Id", builtin::INT32)
                    .build(),
            )
            .unwrap();
        registry
            .register(
                TypeBuilder::class("Shop", "Product")
                    .base("Shop.Entity")
                    .implements("Shop.IPriced")
                    .property("Name", builtin::STRING)
                    .build(),
            )
            .unwrap();
        registry
            .register(TypeBuilder::class("Shop", "Catalog").element_type("Shop.Product").build())
            .unwrap();
        registry
    }

    #[test]
    fn test_get_by_full_name_alias_and_array() {
        let registry = TypeRegistry::new();
        assert_eq!(registry.get("System.String").unwrap().name, "String");
        assert_eq!(registry.get("int").unwrap().full_name(), builtin::INT32);
        assert!(registry.get("Int32").is_none());

        let array = registry.get("System.Int32[]").unwrap();
        assert!(array.is_array());
        assert_eq!(array.full_name(), "System.Int32[]");
        assert_eq!(registry.element_type(&array).unwrap().full_name(), builtin::INT32);
        assert!(registry.get("Missing[]").is_none());
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = TypeRegistry::new();
        let result = registry.register(TypeBuilder::structure("System", "Int32").build());
        assert_matches!(result, Err(ModelError::DuplicateType(name)) if name == "System.Int32");
    }

    #[test]
    fn test_base_chain_and_hierarchy() {
        let registry = shop_registry();
        let product = registry.get("Shop.Product").unwrap();

        let chain: Vec<String> = registry.base_chain(&product).iter().map(|t| t.full_name()).collect();
        assert_eq!(chain, vec!["Shop.Product", "Shop.Entity", "System.Object"]);

        let hierarchy: Vec<String> = registry.hierarchy(&product).iter().map(|t| t.name.clone()).collect();
        assert_eq!(hierarchy, vec!["IPriced", "Product", "Entity", "Object"]);
    }

    #[test]
    fn test_cyclic_bases_terminate() {
        let mut registry = TypeRegistry::new();
        registry.register(TypeBuilder::class("", "A").base("B").build()).unwrap();
        registry.register(TypeBuilder::class("", "B").base("A").build()).unwrap();
        let a = registry.get("A").unwrap();
        assert_eq!(registry.base_chain(&a).len(), 2);
    }

    #[test]
    fn test_accessible_types_follow_context() {
        let mut registry = shop_registry();
        let product = registry.get("Shop.Product").unwrap();

        assert!(registry.find_accessible("DateTime", None).is_some());
        assert!(registry.find_accessible("Entity", None).is_none());
        assert!(registry.find_accessible("Entity", Some(&product)).is_some());
        assert!(registry.find_accessible("Shop.IPriced", Some(&product)).is_some());
        assert!(registry.find_accessible("Catalog", Some(&product)).is_none());

        registry.expose("Shop.Catalog").unwrap();
        assert!(registry.find_accessible("Catalog", None).is_some());
        assert!(registry.is_namespace_prefix("Shop", None));
        assert!(!registry.is_namespace_prefix("Sh", None));
        assert_matches!(registry.expose("Shop.Missing"), Err(ModelError::UnknownType(_)));
    }

    #[test]
    fn test_assignability_and_element_types() {
        let registry = shop_registry();
        let product = registry.get("Shop.Product").unwrap();
        let entity = registry.get("Shop.Entity").unwrap();
        let priced = registry.get("Shop.IPriced").unwrap();
        let object = registry.get("object").unwrap();

        assert!(registry.is_assignable(&product, &entity));
        assert!(registry.is_assignable(&product, &priced));
        assert!(registry.is_assignable(&entity, &object));
        assert!(!registry.is_assignable(&entity, &product));

        let catalog = registry.get("Shop.Catalog").unwrap();
        assert_eq!(registry.element_type(&catalog).unwrap(), product);
        let string = registry.get("string").unwrap();
        assert_eq!(registry.element_type(&string).unwrap().full_name(), builtin::CHAR);
    }

    #[test]
    fn test_validate_reports_missing_reference() {
        let mut registry = TypeRegistry::new();
        registry
            .register(TypeBuilder::class("", "Order").property("Lines", "Line[]").build())
            .unwrap();
        assert_matches!(
            registry.validate(),
            Err(ModelError::UnresolvedReference { referenced, .. }) if referenced == "Line[]"
        );
    }
}
