//! The entity arena.
//!
//! [`EntityStore`] owns every record produced for one source unit. Records are
//! appended and never removed; the typed ids handed out stay valid for the
//! lifetime of the store.

use crate::entities::{
    ClassConstructor, ClassDestructor, ClassInfo, ClassMethod, EnumInfo, FunctionInfo,
    NamespaceInfo, TypeAliasInfo,
};
use crate::error::{ModelError, Result};
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

macro_rules! entity_ids {
    ($($(#[$meta:meta])* $id:ident => $record:ty, $field:ident, $label:literal;)*) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
            #[serde(transparent)]
            pub struct $id(u32);

            impl $id {
                /// Position of the record in its arena.
                pub fn index(self) -> usize {
                    self.0 as usize
                }
            }

            impl std::fmt::Display for $id {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{}#{}", $label, self.0)
                }
            }

            impl Index<$id> for EntityStore {
                type Output = $record;

                /// Panics when the id was not produced by this store.
                fn index(&self, id: $id) -> &$record {
                    &self.$field[id.index()]
                }
            }

            impl IndexMut<$id> for EntityStore {
                fn index_mut(&mut self, id: $id) -> &mut $record {
                    &mut self.$field[id.index()]
                }
            }

            impl RecordId for $id {
                type Record = $record;
            }

            impl StoredRecord for $record {
                type Id = $id;

                fn insert(store: &mut EntityStore, record: Self) -> $id {
                    let id = $id(store.$field.len() as u32);
                    store.$field.push(record);
                    id
                }

                fn lookup(store: &EntityStore, id: $id) -> Result<&Self> {
                    store
                        .$field
                        .get(id.index())
                        .ok_or_else(|| ModelError::unknown($label, id.index()))
                }

                fn count(store: &EntityStore) -> usize {
                    store.$field.len()
                }
            }
        )*
    };
}

/// A record type that can live in the [`EntityStore`].
pub trait StoredRecord: Sized {
    /// Typed id handed out for this record type
    type Id: Copy;

    /// Append a record and return its id.
    fn insert(store: &mut EntityStore, record: Self) -> Self::Id;

    /// Checked lookup.
    fn lookup(store: &EntityStore, id: Self::Id) -> Result<&Self>;

    /// Number of records of this type.
    fn count(store: &EntityStore) -> usize;
}

/// A typed id that knows which record it points to.
pub trait RecordId: Copy {
    /// Record type behind the id
    type Record: StoredRecord<Id = Self>;
}

entity_ids! {
    /// Id of a [`NamespaceInfo`]
    NamespaceId => NamespaceInfo, namespaces, "namespace";
    /// Id of a [`ClassInfo`]
    ClassId => ClassInfo, classes, "class";
    /// Id of an [`EnumInfo`]
    EnumId => EnumInfo, enums, "enum";
    /// Id of a [`FunctionInfo`]
    FunctionId => FunctionInfo, functions, "function";
    /// Id of a [`TypeAliasInfo`]
    AliasId => TypeAliasInfo, aliases, "alias";
    /// Id of a [`ClassConstructor`]
    ConstructorId => ClassConstructor, ctors, "constructor";
    /// Id of a [`ClassDestructor`]
    DestructorId => ClassDestructor, dtors, "destructor";
    /// Id of a [`ClassMethod`]
    MethodId => ClassMethod, methods, "method";
}

/// Owning storage for every record of one source unit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityStore {
    namespaces: Vec<NamespaceInfo>,
    classes: Vec<ClassInfo>,
    enums: Vec<EnumInfo>,
    functions: Vec<FunctionInfo>,
    aliases: Vec<TypeAliasInfo>,
    ctors: Vec<ClassConstructor>,
    dtors: Vec<ClassDestructor>,
    methods: Vec<ClassMethod>,
}

impl EntityStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move a record into the store.
    pub fn alloc<R: StoredRecord>(&mut self, record: R) -> R::Id {
        R::insert(self, record)
    }

    /// Checked lookup of any record type.
    pub fn get<I: RecordId>(&self, id: I) -> Result<&I::Record> {
        <I::Record as StoredRecord>::lookup(self, id)
    }

    /// Number of stored records of type `R`.
    pub fn count<R: StoredRecord>(&self) -> usize {
        R::count(self)
    }

    /// Iterate all classes with their ids, in allocation order.
    pub fn classes(&self) -> impl Iterator<Item = (ClassId, &ClassInfo)> + '_ {
        self.classes
            .iter()
            .enumerate()
            .map(|(i, c)| (ClassId(i as u32), c))
    }

    /// Iterate all namespaces with their ids, in allocation order.
    pub fn namespaces(&self) -> impl Iterator<Item = (NamespaceId, &NamespaceInfo)> + '_ {
        self.namespaces
            .iter()
            .enumerate()
            .map(|(i, n)| (NamespaceId(i as u32), n))
    }

    /// Total number of records of all kinds.
    pub fn len(&self) -> usize {
        self.namespaces.len()
            + self.classes.len()
            + self.enums.len()
            + self.functions.len()
            + self.aliases.len()
            + self.ctors.len()
            + self.dtors.len()
            + self.methods.len()
    }

    /// True when nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
