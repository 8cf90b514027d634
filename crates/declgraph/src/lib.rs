//! # declgraph
//!
//! An arena-backed, queryable model of the declarations found in one C++
//! source unit: namespaces, classes, enums, free functions and type aliases.
//!
//! ## Ownership
//!
//! Every record lives in exactly one [`EntityStore`] owned by an
//! [`EntityModel`]. Cross links (nested classes, overload sets, resolved base
//! classes, child namespaces) are typed indices into that store, so the graph
//! may look cyclic without any shared ownership.
//!
//! ```text
//! EntityModel
//!   ├── global NamespaceInfo ──► namespaces / classes / enums / functions / aliases
//!   ├── namespace index (qualified name → NamespaceId)
//!   ├── class index     (qualified name → ClassId)
//!   └── EntityStore     (owns every record)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use declgraph::{ClassInfo, ClassMember, EntityModel};
//!
//! let mut model = EntityModel::new("example.hpp");
//! let global = model.global_id();
//!
//! let class = ClassInfo::new("Point")
//!     .with_members(vec![ClassMember::new("x", "int"), ClassMember::new("y", "int")]);
//! let id = model.add_class(global, class);
//!
//! assert_eq!(model.find_class("Point"), Some(id));
//! assert_eq!(model[id].members.len(), 2);
//! ```

#![deny(unsafe_code)]

pub mod entities;
pub mod error;
pub mod export;
pub mod model;
pub mod store;
pub mod walk;

// Re-export main types
pub use entities::{
    Access, Attribute, ClassBase, ClassConstructor, ClassDestructor, ClassInfo, ClassMember,
    ClassMethod, ConstructorKind, EntityKind, EnumInfo, EnumValue, FunctionInfo, NamespaceInfo,
    TemplateParam, TypeAliasInfo,
};
pub use error::{ModelError, Result};
pub use model::{EntityModel, ModelStats};
pub use store::{
    AliasId, ClassId, ConstructorId, DestructorId, EntityStore, EnumId, FunctionId, MethodId,
    NamespaceId, RecordId, StoredRecord,
};
pub use walk::ModelVisitor;
