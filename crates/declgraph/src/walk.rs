//! Depth-first traversal of a model.
//!
//! The walk starts at the global namespace and, for every namespace, visits
//! functions, then enumerations, then classes (nested classes right after
//! their enclosing class), then aliases, then child namespaces. Map-backed
//! collections are visited in name order, so the traversal is deterministic.

use crate::entities::{ClassInfo, EnumInfo, FunctionInfo, NamespaceInfo, TypeAliasInfo};
use crate::model::EntityModel;
use crate::store::ClassId;

/// Callbacks for [`EntityModel::walk`]. Every method defaults to a no-op.
pub trait ModelVisitor {
    /// Called before the contents of a namespace.
    fn enter_namespace(&mut self, _model: &EntityModel, _ns: &NamespaceInfo) {}

    /// Called after the contents of a namespace.
    fn leave_namespace(&mut self, _model: &EntityModel, _ns: &NamespaceInfo) {}

    /// Called for every free function of every overload set.
    fn visit_function(&mut self, _model: &EntityModel, _function: &FunctionInfo) {}

    /// Called for every enumeration.
    fn visit_enum(&mut self, _model: &EntityModel, _info: &EnumInfo) {}

    /// Called before the nested classes of a class.
    fn enter_class(&mut self, _model: &EntityModel, _class: &ClassInfo) {}

    /// Called after the nested classes of a class.
    fn leave_class(&mut self, _model: &EntityModel, _class: &ClassInfo) {}

    /// Called for every type alias.
    fn visit_alias(&mut self, _model: &EntityModel, _alias: &TypeAliasInfo) {}
}

impl EntityModel {
    /// Walk the model depth-first from the global namespace.
    pub fn walk<V: ModelVisitor + ?Sized>(&self, visitor: &mut V) {
        self.walk_namespace(self.global(), visitor);
    }

    fn walk_namespace<V: ModelVisitor + ?Sized>(&self, ns: &NamespaceInfo, visitor: &mut V) {
        visitor.enter_namespace(self, ns);

        for overloads in ns.functions.values() {
            for &id in overloads {
                visitor.visit_function(self, &self[id]);
            }
        }
        for &id in ns.enums.values() {
            visitor.visit_enum(self, &self[id]);
        }
        for &id in ns.classes.values() {
            self.walk_class(id, visitor);
        }
        for &id in ns.aliases.values() {
            visitor.visit_alias(self, &self[id]);
        }
        for &id in ns.namespaces.values() {
            self.walk_namespace(&self[id], visitor);
        }

        visitor.leave_namespace(self, ns);
    }

    fn walk_class<V: ModelVisitor + ?Sized>(&self, id: ClassId, visitor: &mut V) {
        let class = &self[id];
        visitor.enter_class(self, class);
        for &nested in class.classes.values() {
            self.walk_class(nested, visitor);
        }
        visitor.leave_class(self, class);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl ModelVisitor for Recorder {
        fn enter_namespace(&mut self, _: &EntityModel, ns: &NamespaceInfo) {
            self.events.push(format!("ns {}", ns.name));
        }
        fn visit_function(&mut self, _: &EntityModel, f: &FunctionInfo) {
            self.events.push(format!("fn {}", f.name));
        }
        fn visit_enum(&mut self, _: &EntityModel, e: &EnumInfo) {
            self.events.push(format!("enum {}", e.name));
        }
        fn enter_class(&mut self, _: &EntityModel, c: &ClassInfo) {
            self.events.push(format!("class {}", c.name));
        }
        fn visit_alias(&mut self, _: &EntityModel, a: &TypeAliasInfo) {
            self.events.push(format!("alias {}", a.name));
        }
    }

    #[test]
    fn test_walk_order() {
        let mut model = EntityModel::new("walk.hpp");
        let global = model.global_id();
        let ns = model.create_namespace(global, "a").unwrap();

        let inner = model.register_class(ClassInfo::new("a::Outer::Inner"));
        let mut outer = ClassInfo::new("a::Outer");
        outer.classes.insert("a::Outer::Inner".to_string(), inner);
        model.add_class(ns, outer);
        model.add_enum(ns, EnumInfo::new("a::Color"));
        model.add_alias(global, TypeAliasInfo::new("Int", "int"));
        model.add_function(global, FunctionInfo::new("main", "int"));

        let mut recorder = Recorder::default();
        model.walk(&mut recorder);

        assert_eq!(
            recorder.events,
            vec![
                "ns ",
                "fn main",
                "alias Int",
                "ns a",
                "enum a::Color",
                "class a::Outer",
                "class a::Outer::Inner",
            ]
        );
    }
}
