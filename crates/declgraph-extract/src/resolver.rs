//! Recursive descent over a translation unit.
//!
//! The [`Resolver`] owns the [`EntityModel`] under construction. It walks the
//! children of the root cursor, dispatches every main-file cursor to the
//! classifier for its kind and links the produced records into the
//! namespace they were declared in.

use crate::classify;
use declgraph::{EntityModel, NamespaceId};
use declgraph_frontend_api::{Cursor, CursorKind, TranslationUnit};
use log::{debug, trace, warn};
use std::collections::HashSet;
use std::path::Path;

/// Build the entity model of a unit.
pub fn resolve(unit: &TranslationUnit) -> EntityModel {
    Resolver::new(unit).resolve()
}

/// Walk state for one unit
pub struct Resolver<'tu> {
    pub(crate) unit: &'tu TranslationUnit,
    pub(crate) model: EntityModel,
    /// Specializations currently being instantiated, to cut cycles
    pub(crate) instantiating: HashSet<String>,
}

impl<'tu> Resolver<'tu> {
    pub fn new(unit: &'tu TranslationUnit) -> Self {
        Self {
            unit,
            model: EntityModel::new(unit.path()),
            instantiating: HashSet::new(),
        }
    }

    pub(crate) fn path(&self) -> &'tu Path {
        self.unit.path()
    }

    /// Walk the whole unit and hand over the model.
    pub fn resolve(mut self) -> EntityModel {
        let global = self.model.global_id();
        self.visit_children(self.unit.root(), global);

        let stats = self.model.stats();
        debug!(
            "{}: {} namespaces, {} classes, {} enums, {} functions, {} aliases",
            self.path().display(),
            stats.namespaces,
            stats.classes,
            stats.enums,
            stats.functions,
            stats.aliases
        );
        self.model
    }

    fn visit_children(&mut self, scope: Cursor<'tu>, ns: NamespaceId) {
        for child in scope.children() {
            self.visit(child, ns);
        }
    }

    /// Classify one cursor at namespace scope.
    ///
    /// Precedence: function, class, enum, namespace, type alias. Cursors
    /// from other files and kinds without a classifier are skipped.
    fn visit(&mut self, c: Cursor<'tu>, ns: NamespaceId) {
        if !c.is_from_main_file() {
            trace!("skipping '{}' from an included file", c.spelling());
            return;
        }

        match c.kind() {
            CursorKind::FunctionDecl => {
                if let Some(function) = classify::function::classify_function(self.path(), c) {
                    self.model.add_function(ns, function);
                }
            }
            kind if kind.is_record() => {
                if let Some(class) = self.classify_class(c) {
                    self.model.add_class(ns, class);
                }
            }
            CursorKind::EnumDecl => {
                if let Some(info) = classify::enumeration::classify_enum(self.path(), c) {
                    self.model.add_enum(ns, info);
                }
            }
            CursorKind::Namespace => self.visit_namespace(c, ns),
            CursorKind::TypeAliasDecl | CursorKind::TypedefDecl => {
                if let Some(alias) = classify::alias::classify_alias(c) {
                    self.model.add_alias(ns, alias);
                }
            }
            CursorKind::LinkageSpec => self.visit_children(c, ns),
            kind => trace!("skipping {:?} '{}'", kind, c.spelling()),
        }
    }

    /// Reopened namespaces fold into the record created for the first block.
    fn visit_namespace(&mut self, c: Cursor<'tu>, parent: NamespaceId) {
        let name = c.spelling();
        if name.is_empty() {
            // Anonymous namespace: members belong to the enclosing scope
            self.visit_children(c, parent);
            return;
        }

        let qualified = self.model[parent].qualify(name);
        let ns = match self.model.find_namespace(&qualified) {
            Some(existing) => {
                trace!("merging reopened namespace '{qualified}'");
                existing
            }
            None => match self.model.create_namespace(parent, name) {
                Ok(id) => id,
                Err(err) => {
                    warn!("{}: {}", self.path().display(), err);
                    return;
                }
            },
        };
        self.visit_children(c, ns);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use declgraph_frontend_api::{
        Access, CursorData, FileId, SourceLocation, TranslationUnitBuilder, TypeRef,
    };

    fn public_field(name: &str, ty: &str) -> CursorData {
        CursorData::new(CursorKind::FieldDecl, name)
            .with_access(Access::Public)
            .with_type(TypeRef::builtin(ty))
    }

    #[test]
    fn test_reopened_namespace_merges() {
        let mut b = TranslationUnitBuilder::new("ns.hpp");
        let root = b.root();
        for (i, class) in ["A", "B", "C"].iter().enumerate() {
            let ns = b.push(root, CursorData::new(CursorKind::Namespace, "n"));
            b.push(ns, CursorData::new(CursorKind::StructDecl, *class));
            if i == 1 {
                let inner = b.push(ns, CursorData::new(CursorKind::Namespace, "inner"));
                b.push(inner, CursorData::new(CursorKind::EnumDecl, "E"));
            }
        }
        let unit = b.build();
        let model = resolve(&unit);

        assert_eq!(model.stats().namespaces, 3);
        let n = model.namespace_by_name("n").unwrap();
        let names: Vec<&String> = n.classes.keys().collect();
        assert_eq!(names, vec!["n::A", "n::B", "n::C"]);
        assert_eq!(n.namespaces.len(), 1);
        assert!(model.namespace_by_name("n::inner").unwrap().enums.contains_key("n::inner::E"));
    }

    #[test]
    fn test_included_declarations_are_skipped() {
        let mut b = TranslationUnitBuilder::new("main.cpp");
        let header = b.add_file("include/lib.hpp");
        let root = b.root();
        b.push(
            root,
            CursorData::new(CursorKind::InclusionDirective, "lib.hpp"),
        );
        let ns = b.push(
            root,
            CursorData::new(CursorKind::Namespace, "lib").at(SourceLocation::new(header, 0, 1, 1)),
        );
        b.push(
            ns,
            CursorData::new(CursorKind::ClassDecl, "Thing").at(SourceLocation::new(header, 20, 2, 1)),
        );
        b.push(
            root,
            CursorData::new(CursorKind::FunctionDecl, "helper")
                .at(SourceLocation::new(FileId(1), 40, 3, 1))
                .with_result(TypeRef::builtin("void")),
        );
        let unit = b.build();
        let model = resolve(&unit);

        assert!(model.global().is_empty());
        assert_eq!(model.stats().classes, 0);
    }

    #[test]
    fn test_linkage_spec_is_transparent() {
        let mut b = TranslationUnitBuilder::new("c.hpp");
        let root = b.root();
        let link = b.push(root, CursorData::new(CursorKind::LinkageSpec, ""));
        b.push(
            link,
            CursorData::new(CursorKind::FunctionDecl, "c_api").with_result(TypeRef::builtin("int")),
        );
        let unit = b.build();
        let model = resolve(&unit);

        assert!(model.global().functions.contains_key("c_api"));
    }

    #[test]
    fn test_anonymous_namespace_folds_into_parent() {
        let mut b = TranslationUnitBuilder::new("anon.hpp");
        let root = b.root();
        let anon = b.push(root, CursorData::new(CursorKind::Namespace, ""));
        let s = b.push(anon, CursorData::new(CursorKind::StructDecl, "Hidden"));
        b.push(s, public_field("x", "int"));
        let unit = b.build();
        let model = resolve(&unit);

        assert_eq!(model.stats().namespaces, 1);
        assert_eq!(model.class_by_name("Hidden").unwrap().members.len(), 1);
    }
}
