//! Cursors: handles to the nodes of a translation unit.

use crate::location::{SourceLocation, SourceRange};
use crate::token::Token;
use crate::types::TypeRef;
use crate::unit::TranslationUnit;
use serde::{Deserialize, Serialize};

/// Index of a cursor in its translation unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CursorId(pub u32);

impl CursorId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Kind of the node a cursor points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CursorKind {
    TranslationUnit,
    Namespace,
    /// `extern "C" { ... }`
    LinkageSpec,
    ClassDecl,
    StructDecl,
    UnionDecl,
    ClassTemplate,
    ClassTemplatePartialSpecialization,
    EnumDecl,
    EnumConstantDecl,
    FieldDecl,
    VarDecl,
    FunctionDecl,
    FunctionTemplate,
    CXXMethod,
    Constructor,
    Destructor,
    ParmDecl,
    TypeAliasDecl,
    TypedefDecl,
    TypeAliasTemplateDecl,
    TemplateTypeParameter,
    NonTypeTemplateParameter,
    TemplateTemplateParameter,
    BaseSpecifier,
    AccessSpecifier,
    FriendDecl,
    UsingDirective,
    InclusionDirective,
    Unexposed,
}

impl CursorKind {
    /// Class-like declarations, templates and specializations included.
    pub fn is_record(self) -> bool {
        matches!(
            self,
            CursorKind::ClassDecl
                | CursorKind::StructDecl
                | CursorKind::UnionDecl
                | CursorKind::ClassTemplate
                | CursorKind::ClassTemplatePartialSpecialization
        )
    }

    /// Anything with a parameter list.
    pub fn is_function_like(self) -> bool {
        matches!(
            self,
            CursorKind::FunctionDecl
                | CursorKind::FunctionTemplate
                | CursorKind::CXXMethod
                | CursorKind::Constructor
                | CursorKind::Destructor
        )
    }

    /// Kinds that open a named scope for qualified names.
    pub fn is_scope(self) -> bool {
        self == CursorKind::Namespace || self.is_record()
    }
}

/// Access specifier of a class member or base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Access {
    /// Not a class member
    #[default]
    Invalid,
    Public,
    Protected,
    Private,
}

/// Boolean facts about a declaration.
///
/// Which flags are meaningful depends on the cursor kind; the rest stay false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DeclTraits {
    pub is_static: bool,
    pub is_const: bool,
    pub is_virtual: bool,
    pub is_pure_virtual: bool,
    pub is_defaulted: bool,
    pub is_deleted: bool,
    pub is_noexcept: bool,
    pub is_abstract: bool,
    pub is_scoped: bool,
    pub is_explicit: bool,
    pub is_move_constructor: bool,
    pub is_copy_constructor: bool,
    pub is_default_constructor: bool,
    pub is_converting_constructor: bool,
    /// Parameter pack (`typename... Ts`)
    pub is_variadic: bool,
}

/// Everything the unit stores for one cursor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursorData {
    pub kind: CursorKind,
    pub spelling: String,
    pub location: SourceLocation,
    pub extent: SourceRange,
    pub access: Access,
    /// Declared type (fields, parameters, aliases, records)
    pub ty: Option<TypeRef>,
    /// Result type of function-like cursors
    pub result_type: Option<TypeRef>,
    pub children: Vec<CursorId>,
    /// Enclosing declaration, `None` only for the root
    pub semantic_parent: Option<CursorId>,
    /// Parameters of function-like cursors, in order
    pub arguments: Vec<CursorId>,
    pub traits: DeclTraits,
    /// Value of an enumerator
    pub enum_value: Option<i64>,
    /// The defining declaration, when this one is only a declaration
    pub definition: Option<CursorId>,
}

impl CursorData {
    pub fn new(kind: CursorKind, spelling: impl Into<String>) -> Self {
        Self {
            kind,
            spelling: spelling.into(),
            location: SourceLocation::default(),
            extent: SourceRange::default(),
            access: Access::Invalid,
            ty: None,
            result_type: None,
            children: Vec::new(),
            semantic_parent: None,
            arguments: Vec::new(),
            traits: DeclTraits::default(),
            enum_value: None,
            definition: None,
        }
    }

    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }

    pub fn with_extent(mut self, extent: SourceRange) -> Self {
        self.extent = extent;
        self
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn with_type(mut self, ty: TypeRef) -> Self {
        self.ty = Some(ty);
        self
    }

    pub fn with_result(mut self, ty: TypeRef) -> Self {
        self.result_type = Some(ty);
        self
    }

    pub fn with_traits(mut self, traits: DeclTraits) -> Self {
        self.traits = traits;
        self
    }

    pub fn with_value(mut self, value: i64) -> Self {
        self.enum_value = Some(value);
        self
    }
}

/// A copyable handle to one node of a [`TranslationUnit`]
#[derive(Clone, Copy)]
pub struct Cursor<'tu> {
    unit: &'tu TranslationUnit,
    id: CursorId,
}

impl<'tu> Cursor<'tu> {
    pub(crate) fn new(unit: &'tu TranslationUnit, id: CursorId) -> Self {
        Self { unit, id }
    }

    fn data(&self) -> &'tu CursorData {
        self.unit.data(self.id)
    }

    pub fn id(&self) -> CursorId {
        self.id
    }

    pub fn unit(&self) -> &'tu TranslationUnit {
        self.unit
    }

    pub fn kind(&self) -> CursorKind {
        self.data().kind
    }

    pub fn spelling(&self) -> &'tu str {
        &self.data().spelling
    }

    pub fn ty(&self) -> Option<&'tu TypeRef> {
        self.data().ty.as_ref()
    }

    pub fn result_type(&self) -> Option<&'tu TypeRef> {
        self.data().result_type.as_ref()
    }

    pub fn children(&self) -> impl Iterator<Item = Cursor<'tu>> + 'tu {
        let unit = self.unit;
        self.data().children.iter().map(move |&id| Cursor::new(unit, id))
    }

    /// Parameters of a function-like cursor.
    pub fn arguments(&self) -> impl Iterator<Item = Cursor<'tu>> + 'tu {
        let unit = self.unit;
        self.data().arguments.iter().map(move |&id| Cursor::new(unit, id))
    }

    pub fn num_arguments(&self) -> usize {
        self.data().arguments.len()
    }

    pub fn semantic_parent(&self) -> Option<Cursor<'tu>> {
        self.data()
            .semantic_parent
            .map(|id| Cursor::new(self.unit, id))
    }

    pub fn access_specifier(&self) -> Access {
        self.data().access
    }

    pub fn location(&self) -> SourceLocation {
        self.data().location
    }

    pub fn extent(&self) -> SourceRange {
        self.data().extent
    }

    pub fn is_from_main_file(&self) -> bool {
        self.data().location.file.is_main()
    }

    pub fn traits(&self) -> DeclTraits {
        self.data().traits
    }

    /// Signed enumerator value.
    pub fn enum_value(&self) -> Option<i64> {
        self.data().enum_value
    }

    /// Enumerator value reinterpreted as unsigned 64-bit.
    pub fn enum_unsigned_value(&self) -> Option<u64> {
        self.data().enum_value.map(|v| v as u64)
    }

    pub fn definition(&self) -> Option<Cursor<'tu>> {
        self.data().definition.map(|id| Cursor::new(self.unit, id))
    }

    /// Declaration of a type, when the front end resolved one.
    pub fn type_declaration(&self, ty: &TypeRef) -> Option<Cursor<'tu>> {
        ty.declaration.map(|id| Cursor::new(self.unit, id))
    }

    /// Tokens covered by the extent. Empty for cursors outside the main file.
    pub fn tokens(&self) -> &'tu [Token] {
        if !self.is_from_main_file() {
            return &[];
        }
        let range = self.unit.token_range(self.extent());
        &self.unit.tokens()[range]
    }
}

impl PartialEq for Cursor<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.unit, other.unit) && self.id == other.id
    }
}

impl Eq for Cursor<'_> {}

impl std::fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .field("spelling", &self.spelling())
            .finish()
    }
}
