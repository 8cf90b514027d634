//! The per-unit entity model.

use crate::entities::{ClassInfo, EnumInfo, FunctionInfo, NamespaceInfo, TypeAliasInfo};
use crate::error::{ModelError, Result};
use crate::store::{
    AliasId, ClassId, ConstructorId, DestructorId, EntityStore, EnumId, FunctionId, MethodId,
    NamespaceId, RecordId, StoredRecord,
};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::{Index, IndexMut};
use std::path::{Path, PathBuf};

/// Every declaration extracted from one source unit.
///
/// The model owns an [`EntityStore`] plus two flat indices keyed by fully
/// qualified name: one for namespaces (so reopened namespace blocks merge into
/// a single record) and one for classes (so base classes and specializations
/// resolve by spelling).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityModel {
    source: PathBuf,
    store: EntityStore,
    global: NamespaceId,
    namespaces: HashMap<String, NamespaceId>,
    classes: HashMap<String, ClassId>,
}

/// Record counts of a model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelStats {
    /// Namespaces, the global one included
    pub namespaces: usize,
    /// Classes, nested classes and specializations included
    pub classes: usize,
    /// Enumerations
    pub enums: usize,
    /// Free functions
    pub functions: usize,
    /// Type aliases
    pub aliases: usize,
    /// Constructors, destructors and methods
    pub class_functions: usize,
}

impl EntityModel {
    /// Create a model containing only the global namespace.
    pub fn new(source: impl Into<PathBuf>) -> Self {
        let mut store = EntityStore::new();
        let global = store.alloc(NamespaceInfo::new(""));
        let mut namespaces = HashMap::new();
        namespaces.insert(String::new(), global);

        Self {
            source: source.into(),
            store,
            global,
            namespaces,
            classes: HashMap::new(),
        }
    }

    /// Path of the unit this model was extracted from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Id of the global namespace.
    pub fn global_id(&self) -> NamespaceId {
        self.global
    }

    /// The global namespace.
    pub fn global(&self) -> &NamespaceInfo {
        &self.store[self.global]
    }

    /// The owning arena.
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Move a record that is not linked into a namespace (constructors,
    /// methods, nested classes before linking) into the arena.
    pub fn alloc<R: StoredRecord>(&mut self, record: R) -> R::Id {
        self.store.alloc(record)
    }

    /// Checked lookup of any record.
    pub fn get<I: RecordId>(&self, id: I) -> Result<&I::Record> {
        self.store.get(id)
    }

    /// Look a namespace up by fully qualified name (`""` is global).
    pub fn find_namespace(&self, qualified: &str) -> Option<NamespaceId> {
        self.namespaces.get(qualified).copied()
    }

    /// Look a class up by fully qualified name, specializations included.
    pub fn find_class(&self, qualified: &str) -> Option<ClassId> {
        self.classes.get(qualified).copied()
    }

    /// Look a class up by name and return the record.
    pub fn class_by_name(&self, qualified: &str) -> Option<&ClassInfo> {
        self.find_class(qualified).map(|id| &self.store[id])
    }

    /// Look a namespace up by name and return the record.
    pub fn namespace_by_name(&self, qualified: &str) -> Option<&NamespaceInfo> {
        self.find_namespace(qualified).map(|id| &self.store[id])
    }

    /// Create a child namespace of `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DuplicateNamespace`] when the qualified name is
    /// already registered; reopened namespaces must be found with
    /// [`find_namespace`](Self::find_namespace) and reused instead.
    pub fn create_namespace(&mut self, parent: NamespaceId, name: &str) -> Result<NamespaceId> {
        let qualified = self.store.get(parent)?.qualify(name);
        if self.namespaces.contains_key(&qualified) {
            return Err(ModelError::DuplicateNamespace { name: qualified });
        }

        debug!("Creating namespace '{qualified}'");
        let id = self.store.alloc(NamespaceInfo::new(qualified.clone()));
        self.store[parent].namespaces.insert(qualified.clone(), id);
        self.namespaces.insert(qualified, id);
        Ok(id)
    }

    /// Store a class and link it into `ns` and the class index.
    pub fn add_class(&mut self, ns: NamespaceId, class: ClassInfo) -> ClassId {
        let name = class.name.clone();
        let id = self.register_class(class);
        self.store[ns].classes.insert(name, id);
        id
    }

    /// Store a class and enter it in the class index only (nested classes
    /// and specializations linked elsewhere).
    pub fn register_class(&mut self, class: ClassInfo) -> ClassId {
        let name = class.name.clone();
        trace!("Registering class '{name}'");
        let id = self.store.alloc(class);
        self.classes.insert(name, id);
        id
    }

    /// Store an enumeration and link it into `ns`.
    pub fn add_enum(&mut self, ns: NamespaceId, info: EnumInfo) -> EnumId {
        let name = info.name.clone();
        let id = self.store.alloc(info);
        self.store[ns].enums.insert(name, id);
        id
    }

    /// Store a type alias and link it into `ns`.
    pub fn add_alias(&mut self, ns: NamespaceId, info: TypeAliasInfo) -> AliasId {
        let name = info.name.clone();
        let id = self.store.alloc(info);
        self.store[ns].aliases.insert(name, id);
        id
    }

    /// Store a free function and append it to its overload set in `ns`.
    ///
    /// A redeclaration with the same parameter types folds into the existing
    /// entry, whose id is returned.
    pub fn add_function(&mut self, ns: NamespaceId, info: FunctionInfo) -> FunctionId {
        if let Some(overloads) = self.store[ns].functions.get(&info.name) {
            if let Some(&existing) = overloads
                .iter()
                .find(|&&id| self.store[id].same_signature(&info))
            {
                trace!("Folding redeclaration of '{}'", info.name);
                return existing;
            }
        }

        let name = info.name.clone();
        let id = self.store.alloc(info);
        self.store[ns].functions.entry(name).or_default().push(id);
        id
    }

    /// Record counts.
    pub fn stats(&self) -> ModelStats {
        ModelStats {
            namespaces: self.store.count::<NamespaceInfo>(),
            classes: self.store.count::<ClassInfo>(),
            enums: self.store.count::<EnumInfo>(),
            functions: self.store.count::<FunctionInfo>(),
            aliases: self.store.count::<TypeAliasInfo>(),
            class_functions: self.store.count::<crate::ClassConstructor>()
                + self.store.count::<crate::ClassDestructor>()
                + self.store.count::<crate::ClassMethod>(),
        }
    }
}

macro_rules! index_model {
    ($($id:ty => $record:ty),* $(,)?) => {
        $(
            impl Index<$id> for EntityModel {
                type Output = $record;

                fn index(&self, id: $id) -> &$record {
                    &self.store[id]
                }
            }

            impl IndexMut<$id> for EntityModel {
                fn index_mut(&mut self, id: $id) -> &mut $record {
                    &mut self.store[id]
                }
            }
        )*
    };
}

index_model! {
    NamespaceId => NamespaceInfo,
    ClassId => ClassInfo,
    EnumId => EnumInfo,
    FunctionId => FunctionInfo,
    AliasId => TypeAliasInfo,
    ConstructorId => crate::ClassConstructor,
    DestructorId => crate::ClassDestructor,
    MethodId => crate::ClassMethod,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_model_has_global_namespace() {
        let model = EntityModel::new("unit.hpp");
        assert!(model.global().is_global());
        assert!(model.global().is_empty());
        assert_eq!(model.find_namespace(""), Some(model.global_id()));
        assert_eq!(model.source(), Path::new("unit.hpp"));
    }

    #[test]
    fn test_create_namespace_rejects_duplicates() {
        let mut model = EntityModel::new("unit.hpp");
        let global = model.global_id();
        let a = model.create_namespace(global, "a").unwrap();
        let b = model.create_namespace(a, "b").unwrap();

        assert_eq!(model[b].name, "a::b");
        assert_eq!(model.find_namespace("a::b"), Some(b));
        assert_eq!(model[a].namespaces.get("a::b"), Some(&b));

        let err = model.create_namespace(global, "a").unwrap_err();
        assert_eq!(
            err,
            ModelError::DuplicateNamespace {
                name: "a".to_string()
            }
        );
    }

    #[test]
    fn test_add_function_folds_redeclarations() {
        let mut model = EntityModel::new("unit.hpp");
        let global = model.global_id();

        let first = model.add_function(global, FunctionInfo::new("f", "int").with_param("x", "int"));
        let again = model.add_function(global, FunctionInfo::new("f", "int").with_param("y", "int"));
        let overload =
            model.add_function(global, FunctionInfo::new("f", "int").with_param("x", "float"));

        assert_eq!(first, again);
        assert_ne!(first, overload);
        assert_eq!(model.global().functions["f"].len(), 2);
    }

    #[test]
    fn test_register_class_is_indexed_but_not_linked() {
        let mut model = EntityModel::new("unit.hpp");
        let id = model.register_class(ClassInfo::new("Box<int>"));

        assert_eq!(model.find_class("Box<int>"), Some(id));
        assert!(model.global().classes.is_empty());
        assert_eq!(model.stats().classes, 1);
    }
}
