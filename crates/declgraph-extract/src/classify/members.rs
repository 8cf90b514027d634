//! Classifiers for the members of a class: constructors, the destructor,
//! methods and data members. Everything that is not public is dropped, as
//! are deleted functions.

use super::{declaration_attributes, is_public, parameters, TypeStyle};
use crate::qualify::qualify_type;
use crate::text::SelfType;
use declgraph::{ClassConstructor, ClassDestructor, ClassMember, ClassMethod, ConstructorKind};
use declgraph_frontend_api::{Cursor, CursorKind, DeclTraits};
use std::path::Path;

/// First matching kind in the order move, copy, default, converting.
pub fn constructor_kind(traits: &DeclTraits) -> ConstructorKind {
    if traits.is_move_constructor {
        ConstructorKind::Move
    } else if traits.is_copy_constructor {
        ConstructorKind::Copy
    } else if traits.is_default_constructor {
        ConstructorKind::Default
    } else if traits.is_converting_constructor {
        ConstructorKind::Converting
    } else {
        ConstructorKind::Generic
    }
}

pub fn classify_constructor(
    path: &Path,
    c: Cursor<'_>,
    self_type: Option<&SelfType>,
) -> Option<ClassConstructor> {
    let traits = c.traits();
    if c.kind() != CursorKind::Constructor || !is_public(c) || traits.is_deleted {
        return None;
    }

    let style = TypeStyle {
        typename_typedefs: false,
        self_type,
    };
    let mut ctor = ClassConstructor::new(constructor_kind(&traits));
    (ctor.param_names, ctor.param_types) = parameters(c, style);
    ctor.is_noexcept = traits.is_noexcept;
    ctor.attributes = declaration_attributes(path, c);
    Some(ctor)
}

pub fn classify_destructor(path: &Path, c: Cursor<'_>) -> Option<ClassDestructor> {
    if c.kind() != CursorKind::Destructor || !is_public(c) {
        return None;
    }
    let traits = c.traits();
    Some(ClassDestructor {
        is_virtual: traits.is_virtual,
        is_noexcept: traits.is_noexcept,
        attributes: declaration_attributes(path, c),
    })
}

/// Typedef-typed result and parameter types are spelled with a leading
/// `typename `; bare uses of a template's own name get its argument list.
pub fn classify_method(
    path: &Path,
    c: Cursor<'_>,
    self_type: Option<&SelfType>,
) -> Option<ClassMethod> {
    let traits = c.traits();
    if c.kind() != CursorKind::CXXMethod || !is_public(c) || traits.is_deleted {
        return None;
    }

    let style = TypeStyle {
        typename_typedefs: true,
        self_type,
    };
    let mut method = ClassMethod::new(c.spelling(), style.spell(c.result_type()));
    method.is_static = traits.is_static;
    method.is_const = traits.is_const;
    method.is_virtual = traits.is_virtual;
    method.is_pure_virtual = traits.is_pure_virtual;
    method.is_defaulted = traits.is_defaulted;
    method.is_noexcept = traits.is_noexcept;
    (method.param_names, method.param_types) = parameters(c, style);
    method.attributes = declaration_attributes(path, c);
    Some(method)
}

pub fn classify_member(path: &Path, c: Cursor<'_>) -> Option<ClassMember> {
    if c.kind() != CursorKind::FieldDecl || !is_public(c) {
        return None;
    }
    let type_name = c.ty().map(|ty| qualify_type(c, ty)).unwrap_or_default();
    Some(ClassMember::new(c.spelling(), type_name).with_attributes(declaration_attributes(path, c)))
}
