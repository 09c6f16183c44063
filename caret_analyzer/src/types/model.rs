//! Type model files
//!
//! A model file declares the custom types an expression may reach and names
//! the context type bound to `it`. TOML and JSON are both accepted, picked by
//! file extension.
//!
//! ```toml
//! context = "Shop.Order"
//!
//! [[types]]
//! namespace = "Shop"
//! name = "Order"
//! properties = [{ name = "Total", type = "System.Decimal" }]
//! ```

use crate::logging::{codes, Code};
use crate::log_success;
use crate::types::info::{TypeInfo, TypeRef};
use crate::types::registry::TypeRegistry;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Failures while loading or validating a type model
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Failed to read type model '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML type model: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid JSON type model: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported type model format '{}' (expected .toml or .json)", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("Type '{0}' is registered twice")]
    DuplicateType(String),

    #[error("Unknown type '{0}'")]
    UnknownType(String),

    #[error("Type '{referenced}' used by '{owner}' is not registered")]
    UnresolvedReference { owner: String, referenced: String },
}

impl ModelError {
    pub fn error_code(&self) -> Code {
        match self {
            ModelError::Read { .. } => codes::config::MODEL_READ_FAILED,
            ModelError::Toml(_) | ModelError::Json(_) | ModelError::UnsupportedFormat { .. } => {
                codes::config::MODEL_PARSE_FAILED
            }
            ModelError::DuplicateType(_)
            | ModelError::UnknownType(_)
            | ModelError::UnresolvedReference { .. } => codes::config::MODEL_INVALID,
        }
    }
}

/// On-disk description of custom types
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeModel {
    /// Full name of the type bound to `it`
    #[serde(default)]
    pub context: Option<String>,

    /// Custom types reachable by name from any expression
    #[serde(default)]
    pub expose: Vec<String>,

    #[serde(default)]
    pub types: Vec<TypeInfo>,
}

/// A validated registry plus the resolved context type
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub registry: TypeRegistry,
    pub context: Option<TypeRef>,
}

impl TypeModel {
    pub fn from_toml_str(source: &str) -> Result<Self, ModelError> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_json_str(source: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Read a `.toml` or `.json` model file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let source = std::fs::read_to_string(path).map_err(|source| ModelError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        match extension.as_deref() {
            Some("toml") => Self::from_toml_str(&source),
            Some("json") => Self::from_json_str(&source),
            _ => Err(ModelError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Register every type, check references and resolve the context type
    pub fn into_registry(self) -> Result<LoadedModel, ModelError> {
        let mut registry = TypeRegistry::new();
        let count = self.types.len();
        for info in self.types {
            registry.register(info)?;
        }
        registry.validate()?;

        for name in &self.expose {
            registry.expose(name)?;
        }

        let context = match &self.context {
            Some(name) => Some(
                registry
                    .get(name)
                    .ok_or_else(|| ModelError::UnknownType(name.clone()))?,
            ),
            None => None,
        };

        log_success!(
            codes::success::TYPE_MODEL_LOADED,
            "Type model loaded",
            "types" => count,
            "context" => self.context.as_deref().unwrap_or("<none>")
        );

        Ok(LoadedModel { registry, context })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    const SHOP: &str = r#"
        context = "Shop.Order"

        [[types]]
        namespace = "Shop"
        name = "Order"
        properties = [
            { name = "Total", type = "System.Decimal" },
            { name = "Customer", type = "Shop.Customer" },
            { name = "Lines", type = "Shop.Line[]" },
        ]

        [[types]]
        namespace = "Shop"
        name = "Customer"
        properties = [{ name = "Name", type = "System.String" }]

        [[types]]
        namespace = "Shop"
        name = "Line"
        properties = [{ name = "Quantity", type = "System.Int32" }]
    "#;

    #[test]
    fn test_toml_model_builds_registry() {
        let loaded = TypeModel::from_toml_str(SHOP).unwrap().into_registry().unwrap();
        let context = loaded.context.unwrap();
        assert_eq!(context.full_name(), "Shop.Order");
        assert!(loaded.registry.get("Shop.Customer").is_some());
    }

    #[test]
    fn test_json_model() {
        let model = TypeModel::from_json_str(
            r#"{ "types": [{ "name": "Point", "kind": "struct",
                 "fields": [{ "name": "X", "type": "System.Int32" }] }] }"#,
        )
        .unwrap();
        let loaded = model.into_registry().unwrap();
        assert!(loaded.context.is_none());
        assert!(loaded.registry.get("Point").unwrap().is_value_type());
    }

    #[test]
    fn test_unresolved_reference_is_rejected() {
        let model = TypeModel::from_toml_str(
            r#"
            [[types]]
            name = "Order"
            properties = [{ name = "Customer", type = "Shop.Customer" }]
            "#,
        )
        .unwrap();
        let error = model.into_registry().unwrap_err();
        assert_matches!(
            &error,
            ModelError::UnresolvedReference { owner, referenced }
                if owner == "Order" && referenced == "Shop.Customer"
        );
        assert_eq!(error.error_code(), codes::config::MODEL_INVALID);
    }

    #[test]
    fn test_unknown_context_is_rejected() {
        let model = TypeModel {
            context: Some("Missing".to_string()),
            ..TypeModel::default()
        };
        assert_matches!(model.into_registry(), Err(ModelError::UnknownType(name)) if name == "Missing");
    }

    #[test]
    fn test_load_picks_format_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(SHOP.as_bytes()).unwrap();
        let model = TypeModel::load(file.path()).unwrap();
        assert_eq!(model.types.len(), 3);

        let mut yaml = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        yaml.write_all(b"types: []").unwrap();
        assert_matches!(
            TypeModel::load(yaml.path()),
            Err(ModelError::UnsupportedFormat { .. })
        );

        assert_matches!(
            TypeModel::load("/nonexistent/model.toml"),
            Err(ModelError::Read { .. })
        );
    }
}
