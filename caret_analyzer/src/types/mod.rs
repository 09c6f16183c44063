//! In-memory type model
//!
//! - **[`TypeInfo`]** - one type: kind, base, interfaces, members
//! - **[`TypeRegistry`]** - types by full name, hierarchy and accessibility queries
//! - **[`members`]** - field, property, method and indexer lookup
//! - **[`TypeModel`]** - TOML/JSON model files

pub mod builtin;
pub mod info;
pub mod members;
pub mod model;
pub mod registry;

pub use info::{
    ConstructorInfo, FieldInfo, IndexerInfo, MethodInfo, ParameterInfo, PropertyInfo, TypeBuilder,
    TypeInfo, TypeKind, TypeRef,
};
pub use members::{Binding, MemberKind, MemberNames, ValueMember};
pub use model::{LoadedModel, ModelError, TypeModel};
pub use registry::{array_of, TypeRegistry};
