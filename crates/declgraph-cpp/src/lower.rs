//! Lowering of a tree-sitter C++ syntax tree into translation-unit cursors.
//!
//! [`Lowering`] walks the tree once, top-down, keeping the lexical state a
//! compiler would: open namespaces and classes, the current access level
//! of each class body, and the template parameters in scope. Every
//! declaration becomes one cursor pushed under its enclosing scope; types
//! are spelled and looked up through [`TypeContext`].
//!
//! Facts that tree-sitter does not expose as nodes (`static`, `virtual`,
//! `= 0`, `= default`, bare `noexcept`, ...) are read from the main-file
//! tokens around the declarator.

use crate::eval::eval;
use crate::lexer::Lexed;
use crate::options::ParseOptions;
use crate::types::{spell, Declared, ScopeTable, Symbol, TypeContext};
use declgraph_frontend_api::{
    Access, CursorData, CursorId, CursorKind, DeclTraits, SourceLocation, SourceRange, Token,
    TranslationUnitBuilder, TypeKind, TypeRef,
};
use log::{debug, trace};
use std::collections::HashMap;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tree_sitter::Node;

/// A `template<...>` header around the node being lowered
#[derive(Clone, Copy)]
struct Template<'t> {
    node: Node<'t>,
    params: Option<Node<'t>>,
}

impl Template<'_> {
    /// `template<>`
    fn is_explicit(&self) -> bool {
        self.params.map_or(true, |p| p.named_child_count() == 0)
    }
}

/// The class whose body is being lowered
struct RecordFrame {
    cursor: CursorId,
    /// Unqualified name, without template arguments
    name: String,
    access: Access,
    has_pure: bool,
}

/// Identity of an entity across its declarations
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum DeclKey {
    Tag(String),
    Function(String, Vec<String>),
}

#[derive(Default)]
struct Definitions {
    defined: HashMap<DeclKey, CursorId>,
    declared: Vec<(DeclKey, CursorId)>,
}

impl Definitions {
    fn add(&mut self, key: DeclKey, cursor: CursorId, is_definition: bool) {
        if is_definition {
            self.defined.entry(key).or_insert(cursor);
        } else {
            self.declared.push((key, cursor));
        }
    }
}

/// Specifier keywords in front of a declarator
#[derive(Debug, Default)]
struct Specifiers {
    is_static: bool,
    is_virtual: bool,
    is_explicit: bool,
}

/// What follows a function's parameter list
#[derive(Debug, Default)]
struct Tail {
    is_const: bool,
    is_noexcept: bool,
    is_override: bool,
    is_pure: bool,
    is_defaulted: bool,
    is_deleted: bool,
}

/// One function parameter
struct Param<'t> {
    name: String,
    name_node: Option<Node<'t>>,
    node: Node<'t>,
    ty: TypeRef,
    has_default: bool,
    is_pack: bool,
    /// The parameter's type names the enclosing class
    names_class: bool,
}

const TAG_KINDS: [&str; 4] = ["class_specifier", "struct_specifier", "union_specifier", "enum_specifier"];

/// Declarator name nodes that make a function declarator a function
const FUNCTION_NAMES: [&str; 8] = [
    "identifier",
    "field_identifier",
    "destructor_name",
    "operator_name",
    "qualified_identifier",
    "template_function",
    "template_method",
    "operator_cast",
];

fn extent(node: Node<'_>) -> SourceRange {
    SourceRange::new(node.start_byte(), node.end_byte())
}

fn parse_access(text: &str) -> Option<Access> {
    match text.trim().trim_end_matches(':').trim() {
        "public" => Some(Access::Public),
        "protected" => Some(Access::Protected),
        "private" => Some(Access::Private),
        _ => None,
    }
}

/// Innermost name of a qualified identifier.
fn unqualified(node: Node<'_>) -> Node<'_> {
    let mut current = node;
    while current.kind() == "qualified_identifier" {
        match current.child_by_field_name("name") {
            Some(name) => current = name,
            None => break,
        }
    }
    current
}

/// The identifier a (possibly nested) declarator declares.
fn declarator_name(declarator: Node<'_>) -> Option<Node<'_>> {
    let mut current = declarator;
    loop {
        match current.kind() {
            "identifier" | "field_identifier" | "type_identifier" => return Some(current),
            _ => {
                current = current
                    .child_by_field_name("declarator")
                    .or_else(|| current.named_child(0))?;
            }
        }
    }
}

pub(crate) struct Lowering<'s> {
    path: &'s Path,
    /// Parsed text, attribute blocks blanked out
    src: &'s str,
    tokens: Vec<Token>,
    attribute_blocks: Vec<Range<usize>>,
    options: &'s ParseOptions,
    builder: TranslationUnitBuilder,
    scopes: ScopeTable,
    records: Vec<RecordFrame>,
    definitions: Definitions,
}

impl<'s> Lowering<'s> {
    pub fn new(path: &'s Path, src: &'s str, lexed: Lexed, options: &'s ParseOptions) -> Self {
        Self {
            path,
            src,
            tokens: lexed.tokens,
            attribute_blocks: lexed.attribute_blocks,
            options,
            builder: TranslationUnitBuilder::new(path),
            scopes: ScopeTable::default(),
            records: Vec::new(),
            definitions: Definitions::default(),
        }
    }

    /// Lower the whole tree and hand over the unit under construction.
    pub fn lower(mut self, root: Node<'_>) -> TranslationUnitBuilder {
        let unit = self.builder.root();
        self.visit_items(unit, root);
        self.link_definitions();

        let tokens = std::mem::take(&mut self.tokens);
        self.builder.set_tokens(tokens);
        self.builder
    }

    fn text(&self, node: Node<'_>) -> &'s str {
        node.utf8_text(self.src.as_bytes()).unwrap_or("")
    }

    fn types(&self) -> TypeContext<'_> {
        TypeContext::new(self.src, &self.scopes)
    }

    fn location(&self, node: Node<'_>) -> SourceLocation {
        let pos = node.start_position();
        SourceLocation::main(node.start_byte(), pos.row as u32 + 1, pos.column as u32 + 1)
    }

    /// The record frame whose body `parent` is.
    fn frame(&self, parent: CursorId) -> Option<&RecordFrame> {
        self.records.last().filter(|f| f.cursor == parent)
    }

    fn access_in(&self, parent: CursorId) -> Access {
        self.frame(parent).map_or(Access::Invalid, |f| f.access)
    }

    fn tokens_in(&self, start: usize, end: usize) -> &[Token] {
        let lo = self.tokens.partition_point(|t| t.offset < start);
        let hi = self.tokens.partition_point(|t| t.offset < end).max(lo);
        &self.tokens[lo..hi]
    }

    fn visit_items(&mut self, parent: CursorId, node: Node<'_>) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.visit_item(parent, child);
        }
    }

    /// Lower one item of a namespace, linkage block or class body.
    fn visit_item(&mut self, parent: CursorId, node: Node<'_>) {
        match node.kind() {
            "namespace_definition" => self.lower_namespace(parent, node),
            "linkage_specification" => self.lower_linkage(parent, node),
            "class_specifier" | "struct_specifier" | "union_specifier" => {
                self.lower_record(parent, node, None, None);
            }
            "enum_specifier" => {
                self.lower_enum(parent, node, None);
            }
            "declaration" | "field_declaration" => self.lower_declaration(parent, node, None),
            "function_definition" => self.lower_function(parent, node, None),
            "template_declaration" => self.lower_template(parent, node),
            "alias_declaration" => self.lower_alias(parent, node, None),
            "type_definition" => self.lower_typedef(parent, node),
            "using_declaration" => self.lower_using(parent, node),
            "friend_declaration" => self.lower_friend(parent, node),
            "preproc_include" => self.lower_include(parent, node),
            "preproc_if" | "preproc_ifdef" | "preproc_else" | "preproc_elif" | "preproc_elifdef" => {
                self.visit_items(parent, node)
            }
            "access_specifier" => {
                let access = parse_access(self.text(node));
                if let (Some(frame), Some(access)) = (self.records.last_mut(), access) {
                    if frame.cursor == parent {
                        frame.access = access;
                    }
                }
            }
            kind => trace!("{}: skipping {}", self.path.display(), kind),
        }
    }

    fn lower_namespace(&mut self, parent: CursorId, node: Node<'_>) {
        let name_node = node.child_by_field_name("name");
        let names: Vec<String> = match name_node {
            Some(name) => spell(self.text(name))
                .split("::")
                .map(|n| n.strip_prefix("inline ").unwrap_or(n).to_string())
                .collect(),
            None => vec![String::new()],
        };

        let location = self.location(name_node.unwrap_or(node));
        let mut scope = parent;
        for name in &names {
            let data = CursorData::new(CursorKind::Namespace, name.clone())
                .at(location)
                .with_extent(extent(node));
            scope = self.builder.push(scope, data);
            self.scopes.declare(name, Symbol::Namespace);
            self.scopes.enter(name);
        }

        if let Some(body) = node.child_by_field_name("body") {
            self.visit_items(scope, body);
        }
        for _ in &names {
            self.scopes.leave();
        }
    }

    fn lower_linkage(&mut self, parent: CursorId, node: Node<'_>) {
        let data = CursorData::new(CursorKind::LinkageSpec, "")
            .at(self.location(node))
            .with_extent(extent(node));
        let link = self.builder.push(parent, data);
        match node.child_by_field_name("body") {
            Some(body) if body.kind() == "declaration_list" => self.visit_items(link, body),
            Some(body) => self.visit_item(link, body),
            None => {}
        }
    }

    fn lower_template(&mut self, parent: CursorId, node: Node<'_>) {
        let tpl = Template {
            node,
            params: node.child_by_field_name("parameters"),
        };

        self.scopes.push_template_frame();
        let mut cursor = node.walk();
        let items: Vec<Node<'_>> = node
            .named_children(&mut cursor)
            .filter(|c| !matches!(c.kind(), "template_parameter_list" | "requires_clause" | "comment"))
            .collect();
        for item in items {
            match item.kind() {
                "class_specifier" | "struct_specifier" | "union_specifier" => {
                    self.lower_record(parent, item, Some(tpl), None);
                }
                "declaration" | "field_declaration" => self.lower_declaration(parent, item, Some(tpl)),
                "function_definition" => self.lower_function(parent, item, Some(tpl)),
                "alias_declaration" => self.lower_alias(parent, item, Some(tpl)),
                "template_declaration" => self.lower_template(parent, item),
                "friend_declaration" => self.lower_friend(parent, item),
                kind => trace!("{}: skipping templated {}", self.path.display(), kind),
            }
        }
        self.scopes.pop_template_frame();
    }

    /// Lower the parameters of a template header as the first children of
    /// `owner`, bringing them into scope.
    fn lower_template_params(&mut self, owner: CursorId, params: Option<Node<'_>>) {
        let Some(list) = params else {
            return;
        };
        let mut cursor = list.walk();
        let params: Vec<Node<'_>> = list.named_children(&mut cursor).collect();

        for param in params {
            let (kind, name, ty, is_variadic) = match param.kind() {
                "type_parameter_declaration"
                | "variadic_type_parameter_declaration"
                | "optional_type_parameter_declaration" => (
                    CursorKind::TemplateTypeParameter,
                    type_parameter_name(param),
                    None,
                    param.kind() == "variadic_type_parameter_declaration",
                ),
                "template_template_parameter_declaration" => {
                    let mut c = param.walk();
                    let inner = param
                        .named_children(&mut c)
                        .filter(|n| n.kind().ends_with("type_parameter_declaration"))
                        .last();
                    (
                        CursorKind::TemplateTemplateParameter,
                        inner.and_then(type_parameter_name),
                        None,
                        false,
                    )
                }
                "parameter_declaration" | "optional_parameter_declaration" | "variadic_parameter_declaration" => {
                    let declared = self.object(param, param.child_by_field_name("declarator"));
                    let variadic = declared.is_pack || param.kind() == "variadic_parameter_declaration";
                    (
                        CursorKind::NonTypeTemplateParameter,
                        declared.name,
                        Some(declared.ty),
                        variadic,
                    )
                }
                _ => continue,
            };

            let spelling = name.map(|n| spell(self.text(n))).unwrap_or_default();
            let mut data = CursorData::new(kind, spelling.clone())
                .at(self.location(name.unwrap_or(param)))
                .with_extent(extent(param))
                .with_traits(DeclTraits {
                    is_variadic,
                    ..Default::default()
                });
            if let Some(ty) = ty {
                data = data.with_type(ty);
            }
            let id = self.builder.push(owner, data);
            self.scopes
                .add_template_param(&spelling, id, kind == CursorKind::TemplateTypeParameter);
        }
    }

    /// Lower a class, struct or union. `hint` names an anonymous record
    /// after the typedef that declares it.
    fn lower_record(
        &mut self,
        parent: CursorId,
        node: Node<'_>,
        tpl: Option<Template<'_>>,
        hint: Option<&str>,
    ) -> CursorId {
        let (keyword_kind, default_access) = match node.kind() {
            "class_specifier" => (CursorKind::ClassDecl, Access::Private),
            "struct_specifier" => (CursorKind::StructDecl, Access::Public),
            _ => (CursorKind::UnionDecl, Access::Public),
        };
        let name_node = node.child_by_field_name("name");
        let is_specialization = name_node.is_some_and(|n| unqualified(n).kind() == "template_type");
        let spelling = match name_node {
            Some(name) => self.types().base_name(name),
            None => hint.unwrap_or_default().to_string(),
        };

        let kind = match tpl {
            Some(t) if !t.is_explicit() && is_specialization => {
                CursorKind::ClassTemplatePartialSpecialization
            }
            Some(t) if !t.is_explicit() => CursorKind::ClassTemplate,
            _ => keyword_kind,
        };
        let start = tpl.map_or(node.start_byte(), |t| t.node.start_byte());
        let data = CursorData::new(kind, spelling.clone())
            .at(self.location(name_node.unwrap_or(node)))
            .with_extent(SourceRange::new(start, node.end_byte()))
            .with_access(self.access_in(parent));
        let cursor = self.builder.push(parent, data);

        if let Some(t) = tpl.filter(|t| !t.is_explicit()) {
            self.lower_template_params(cursor, t.params);
        }

        let ty = match name_node {
            Some(name) if is_specialization => {
                let mut ty = self.types().with_placeholders().named(name);
                ty.kind = TypeKind::Record;
                ty.declaration = Some(cursor);
                ty
            }
            _ => TypeRef::new(spelling.clone(), TypeKind::Record).with_declaration(cursor),
        };
        self.builder.data_mut(cursor).ty = Some(ty);

        if !is_specialization {
            self.scopes.declare(&spelling, Symbol::Record(cursor));
        }

        let body = node.child_by_field_name("body");
        if !spelling.is_empty() {
            let name_text = name_node.map_or_else(|| spelling.clone(), |n| spell(self.text(n)));
            let key = DeclKey::Tag(self.scopes.qualify(&name_text));
            self.definitions.add(key, cursor, body.is_some());
        }
        let Some(body) = body else {
            return cursor;
        };

        self.scopes.enter(&spelling);
        self.records.push(RecordFrame {
            cursor,
            name: spelling,
            access: default_access,
            has_pure: false,
        });
        self.lower_bases(cursor, node, default_access);
        self.visit_items(cursor, body);
        let frame = self.records.pop();
        self.scopes.leave();

        if frame.is_some_and(|f| f.has_pure) {
            self.builder.data_mut(cursor).traits.is_abstract = true;
        }
        cursor
    }

    fn lower_bases(&mut self, record: CursorId, node: Node<'_>, default_access: Access) {
        let mut cursor = node.walk();
        let Some(clause) = node.children(&mut cursor).find(|c| c.kind() == "base_class_clause") else {
            return;
        };
        let mut clause_cursor = clause.walk();
        let children: Vec<Node<'_>> = clause.children(&mut clause_cursor).collect();

        let mut access = None;
        let mut start = None;
        for (i, child) in children.iter().enumerate() {
            match child.kind() {
                ":" | "," => {
                    access = None;
                    start = None;
                }
                "access_specifier" => {
                    access = parse_access(self.text(*child));
                    start.get_or_insert(child.start_byte());
                }
                "virtual" => {
                    start.get_or_insert(child.start_byte());
                }
                "type_identifier" | "qualified_identifier" | "template_type" => {
                    let pack = children.get(i + 1).filter(|n| n.kind() == "...");
                    let end = pack.map_or(child.end_byte(), |p| p.end_byte());
                    let ty = self.types().named(*child);
                    let spelling = match pack {
                        Some(_) => format!("{}...", ty.spelling),
                        None => ty.spelling.clone(),
                    };
                    let data = CursorData::new(CursorKind::BaseSpecifier, spelling)
                        .at(self.location(*child))
                        .with_extent(SourceRange::new(start.unwrap_or(child.start_byte()), end))
                        .with_access(access.unwrap_or(default_access))
                        .with_type(ty);
                    self.builder.push(record, data);
                }
                _ => {}
            }
        }
    }

    fn lower_enum(&mut self, parent: CursorId, node: Node<'_>, hint: Option<&str>) -> CursorId {
        let name_node = node.child_by_field_name("name");
        let spelling = match name_node {
            Some(name) => spell(self.text(name)),
            None => hint.unwrap_or_default().to_string(),
        };
        let mut c = node.walk();
        let is_scoped = node.children(&mut c).any(|n| matches!(n.kind(), "class" | "struct"));

        let data = CursorData::new(CursorKind::EnumDecl, spelling.clone())
            .at(self.location(name_node.unwrap_or(node)))
            .with_extent(extent(node))
            .with_access(self.access_in(parent))
            .with_traits(DeclTraits {
                is_scoped,
                ..Default::default()
            });
        let cursor = self.builder.push(parent, data);
        self.builder.data_mut(cursor).ty =
            Some(TypeRef::new(spelling.clone(), TypeKind::Enum).with_declaration(cursor));
        self.scopes.declare(&spelling, Symbol::Enum(cursor));

        let body = node.child_by_field_name("body");
        if !spelling.is_empty() {
            let key = DeclKey::Tag(self.scopes.qualify(&spelling));
            self.definitions.add(key, cursor, body.is_some());
        }
        let Some(body) = body else {
            return cursor;
        };

        let mut known = HashMap::new();
        let mut next = 0i64;
        let mut body_cursor = body.walk();
        let enumerators: Vec<Node<'_>> = body
            .named_children(&mut body_cursor)
            .filter(|n| n.kind() == "enumerator")
            .collect();
        for enumerator in enumerators {
            let Some(name_node) = enumerator.child_by_field_name("name") else {
                continue;
            };
            let name = spell(self.text(name_node));
            let value = match enumerator.child_by_field_name("value") {
                Some(expr) => eval(expr, self.src, &known).unwrap_or_else(|| {
                    debug!(
                        "{}: cannot evaluate '{}' for '{}', using {}",
                        self.path.display(),
                        self.text(expr),
                        name,
                        next
                    );
                    next
                }),
                None => next,
            };
            known.insert(name.clone(), value);
            next = value.wrapping_add(1);

            let data = CursorData::new(CursorKind::EnumConstantDecl, name)
                .at(self.location(name_node))
                .with_extent(extent(enumerator))
                .with_value(value);
            self.builder.push(cursor, data);
        }
        cursor
    }

    /// Lower a tag specifier that defines a type.
    fn lower_tag(&mut self, parent: CursorId, spec: Node<'_>, tpl: Option<Template<'_>>, hint: Option<&str>) -> CursorId {
        match spec.kind() {
            "enum_specifier" => self.lower_enum(parent, spec, hint),
            _ => self.lower_record(parent, spec, tpl, hint),
        }
    }

    fn lower_alias(&mut self, parent: CursorId, node: Node<'_>, tpl: Option<Template<'_>>) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let name = spell(self.text(name_node));
        let location = self.location(name_node);
        let access = self.access_in(parent);

        match tpl.filter(|t| !t.is_explicit()) {
            Some(t) => {
                let data = CursorData::new(CursorKind::TypeAliasTemplateDecl, name.clone())
                    .at(location)
                    .with_extent(SourceRange::new(t.node.start_byte(), node.end_byte()))
                    .with_access(access);
                let outer = self.builder.push(parent, data);
                self.lower_template_params(outer, t.params);

                let ty = self.aliased(node);
                let data = CursorData::new(CursorKind::TypeAliasDecl, name.clone())
                    .at(location)
                    .with_extent(extent(node))
                    .with_type(ty);
                self.builder.push(outer, data);
                self.scopes.declare(&name, Symbol::AliasTemplate(outer));
            }
            None => {
                let ty = self.aliased(node);
                let data = CursorData::new(CursorKind::TypeAliasDecl, name.clone())
                    .at(location)
                    .with_extent(extent(node))
                    .with_access(access)
                    .with_type(ty);
                let id = self.builder.push(parent, data);
                self.scopes.declare(&name, Symbol::Alias(id));
            }
        }
    }

    fn aliased(&self, node: Node<'_>) -> TypeRef {
        match node.child_by_field_name("type") {
            Some(ty) => self.types().descriptor(ty),
            None => TypeRef::unexposed(""),
        }
    }

    fn lower_typedef(&mut self, parent: CursorId, node: Node<'_>) {
        let mut cursor = node.walk();
        let declarators: Vec<Node<'_>> = node.children_by_field_name("declarator", &mut cursor).collect();

        let mut tag = None;
        if let Some(spec) = node.child_by_field_name("type") {
            if TAG_KINDS.contains(&spec.kind()) && spec.child_by_field_name("body").is_some() {
                let hint = match spec.child_by_field_name("name") {
                    Some(_) => None,
                    None => declarators
                        .first()
                        .and_then(|d| declarator_name(*d))
                        .map(|n| spell(self.text(n))),
                };
                let id = self.lower_tag(parent, spec, None, hint.as_deref());
                tag = hint.map(|name| (name, id, spec.kind()));
            }
        }

        for declarator in declarators {
            let mut declared = self.object(node, Some(declarator));
            let Some(name_node) = declared.name else {
                continue;
            };
            if let Some((name, id, kind)) = &tag {
                // typedef struct { ... } name;
                if declared.ty.spelling.starts_with("(anonymous") {
                    let kind = if *kind == "enum_specifier" {
                        TypeKind::Enum
                    } else {
                        TypeKind::Record
                    };
                    declared.ty = TypeRef::new(name.clone(), kind).with_declaration(*id);
                }
            }

            let name = spell(self.text(name_node));
            let data = CursorData::new(CursorKind::TypedefDecl, name.clone())
                .at(self.location(name_node))
                .with_extent(extent(node))
                .with_access(self.access_in(parent))
                .with_type(declared.ty);
            let id = self.builder.push(parent, data);
            self.scopes.declare(&name, Symbol::Alias(id));
        }
    }

    fn lower_using(&mut self, parent: CursorId, node: Node<'_>) {
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
        if !children.iter().any(|c| c.kind() == "namespace") {
            trace!("{}: skipping using-declaration", self.path.display());
            return;
        }
        let Some(target) = children.iter().rev().find(|c| c.is_named() && c.kind() != "comment") else {
            return;
        };

        let name = spell(self.text(*target));
        self.scopes.add_directive(&name);
        let data = CursorData::new(CursorKind::UsingDirective, name)
            .at(self.location(*target))
            .with_extent(extent(node));
        self.builder.push(parent, data);
    }

    fn lower_friend(&mut self, parent: CursorId, node: Node<'_>) {
        let text = self.text(node).trim_start();
        let declared = text.strip_prefix("friend").unwrap_or(text);
        let declared = declared.split('{').next().unwrap_or_default();
        let spelling = spell(declared.trim().trim_end_matches(';'));

        let data = CursorData::new(CursorKind::FriendDecl, spelling)
            .at(self.location(node))
            .with_extent(extent(node))
            .with_access(self.access_in(parent));
        self.builder.push(parent, data);
    }

    fn lower_include(&mut self, parent: CursorId, node: Node<'_>) {
        let Some(path_node) = node.child_by_field_name("path") else {
            return;
        };
        let raw = self.text(path_node).trim();
        let quoted = raw.starts_with('"');
        let target = raw.trim_matches(|c| matches!(c, '"' | '<' | '>'));

        match self.find_include(target, quoted) {
            Some(found) => {
                trace!("{}: '{}' resolves to {}", self.path.display(), target, found.display());
                self.builder.add_file(found);
            }
            None => trace!("{}: include '{}' not found", self.path.display(), target),
        }

        let data = CursorData::new(CursorKind::InclusionDirective, target)
            .at(self.location(node))
            .with_extent(SourceRange::new(node.start_byte(), path_node.end_byte()));
        self.builder.push(parent, data);
    }

    /// Quoted includes are looked up next to the main file first, then in
    /// the `-I` directories.
    fn find_include(&self, target: &str, quoted: bool) -> Option<PathBuf> {
        let local = quoted
            .then(|| self.path.parent().map(|dir| dir.join(target)))
            .flatten();
        local
            .into_iter()
            .chain(self.options.include_dirs.iter().map(|dir| dir.join(target)))
            .find(|candidate| candidate.is_file())
    }

    /// Lower a `declaration` or `field_declaration`: any type it defines,
    /// then one cursor per declarator.
    fn lower_declaration(&mut self, parent: CursorId, node: Node<'_>, tpl: Option<Template<'_>>) {
        let mut cursor = node.walk();
        let declarators: Vec<Node<'_>> = node.children_by_field_name("declarator", &mut cursor).collect();

        if let Some(spec) = node.child_by_field_name("type") {
            let defines = spec.child_by_field_name("body").is_some() || declarators.is_empty();
            if TAG_KINDS.contains(&spec.kind()) && defines {
                let tag_tpl = if declarators.is_empty() { tpl } else { None };
                self.lower_tag(parent, spec, tag_tpl, None);
            }
        }

        for declarator in declarators {
            let shape = self.types().declared(TypeRef::builtin(""), Some(declarator));
            match (shape.function, shape.name) {
                (Some(_), Some(name)) if FUNCTION_NAMES.contains(&name.kind()) => {
                    self.lower_callable(parent, node, declarator, tpl)
                }
                _ => self.lower_variable(parent, node, declarator),
            }
        }
    }

    fn lower_function(&mut self, parent: CursorId, node: Node<'_>, tpl: Option<Template<'_>>) {
        match node.child_by_field_name("declarator") {
            Some(declarator) => self.lower_callable(parent, node, declarator, tpl),
            None => trace!("{}: function definition without declarator", self.path.display()),
        }
    }

    /// Declared type and name of an object or parameter. Pointers to
    /// functions are spelled whole, as `void (*)(int)`.
    fn object<'t>(&self, decl: Node<'t>, declarator: Option<Node<'t>>) -> Declared<'t> {
        let types = self.types();
        let base = types.specifier(decl);
        let declared = types.declared(base.clone(), declarator);
        let Some(declarator) = declarator.filter(|_| declared.function.is_some()) else {
            return declared;
        };

        let declarator = match declarator.kind() {
            "init_declarator" => declarator.child_by_field_name("declarator").unwrap_or(declarator),
            _ => declarator,
        };
        let name = declarator_name(declarator);
        let mut text = spell(self.text(declarator));
        if let Some(name) = name {
            text = text.replacen(&spell(self.text(name)), "", 1);
        }
        Declared {
            ty: TypeRef::unexposed(format!("{} {}", base.spelling, text)),
            name,
            function: None,
            is_pack: declared.is_pack,
        }
    }

    fn lower_variable(&mut self, parent: CursorId, node: Node<'_>, declarator: Node<'_>) {
        let declared = self.object(node, Some(declarator));
        let Some(name) = declared.name else {
            return;
        };
        let is_static = self.specifiers(node.start_byte(), name.start_byte()).is_static;
        let kind = if self.frame(parent).is_some() && !is_static {
            CursorKind::FieldDecl
        } else {
            CursorKind::VarDecl
        };

        let data = CursorData::new(kind, spell(self.text(name)))
            .at(self.location(name))
            .with_extent(extent(node))
            .with_access(self.access_in(parent))
            .with_type(declared.ty)
            .with_traits(DeclTraits {
                is_static,
                ..Default::default()
            });
        self.builder.push(parent, data);
    }

    /// Lower a function, method, constructor, destructor or function
    /// template declared by `declarator` within `node`.
    fn lower_callable(
        &mut self,
        parent: CursorId,
        node: Node<'_>,
        declarator: Node<'_>,
        tpl: Option<Template<'_>>,
    ) {
        let shape = self.types().declared(TypeRef::builtin(""), Some(declarator));
        let (Some(name), Some(function)) = (shape.name, shape.function) else {
            trace!("{}: no function declarator", self.path.display());
            return;
        };

        let class_name = self.frame(parent).map(|f| f.name.clone());
        let templated = tpl.is_some_and(|t| !t.is_explicit());
        let spelling = match name.kind() {
            "operator_cast" => {
                let target = name
                    .child_by_field_name("type")
                    .map(|t| self.types().named(t).spelling)
                    .unwrap_or_default();
                format!("operator {target}")
            }
            _ => spell(self.text(unqualified(name))),
        };

        let kind = if templated {
            CursorKind::FunctionTemplate
        } else if name.kind() == "qualified_identifier" && class_name.is_none() {
            let qualified = spell(self.text(name));
            let scope = qualified
                .rsplit_once("::")
                .map(|(scope, _)| scope.split('<').next().unwrap_or(scope))
                .unwrap_or_default();
            if !matches!(self.scopes.lookup(scope), Some(Symbol::Record(_))) {
                trace!("{}: skipping out-of-line '{}'", self.path.display(), qualified);
                return;
            }
            CursorKind::CXXMethod
        } else if class_name.is_some() {
            if name.kind() == "destructor_name" {
                CursorKind::Destructor
            } else if node.child_by_field_name("type").is_none() && class_name.as_deref() == Some(spelling.as_str()) {
                CursorKind::Constructor
            } else {
                CursorKind::CXXMethod
            }
        } else {
            CursorKind::FunctionDecl
        };

        let start = match tpl {
            Some(t) => t.node.start_byte(),
            None if kind == CursorKind::FunctionDecl => self.leading_attributes(node.start_byte()),
            None => node.start_byte(),
        };
        let data = CursorData::new(kind, spelling.clone())
            .at(self.location(name))
            .with_extent(SourceRange::new(start, node.end_byte()))
            .with_access(self.access_in(parent));
        let cursor = self.builder.push(parent, data);

        if let Some(t) = tpl.filter(|_| templated) {
            self.lower_template_params(cursor, t.params);
        }

        // Types are spelled once the template parameters are in scope
        let result = match kind {
            CursorKind::Constructor | CursorKind::Destructor => TypeRef::builtin("void"),
            _ => self.result_type(node, declarator, name, function),
        };
        let params = self.parameters(function, class_name.as_deref());

        let specifiers = self.specifiers(node.start_byte(), name.start_byte());
        let tail = match function.child_by_field_name("parameters") {
            Some(list) => self.tail(list.end_byte(), node.end_byte()),
            None => Tail::default(),
        };
        let mut traits = DeclTraits {
            is_static: specifiers.is_static,
            is_const: tail.is_const,
            is_virtual: specifiers.is_virtual || tail.is_override,
            is_pure_virtual: tail.is_pure,
            is_defaulted: tail.is_defaulted,
            is_deleted: tail.is_deleted,
            is_noexcept: tail.is_noexcept,
            is_explicit: specifiers.is_explicit,
            ..Default::default()
        };
        if kind == CursorKind::Constructor {
            constructor_traits(&params, &mut traits);
        }
        if tail.is_pure {
            if let Some(frame) = self.records.last_mut().filter(|f| f.cursor == parent) {
                frame.has_pure = true;
            }
        }

        if kind == CursorKind::FunctionDecl {
            let signature = params.iter().map(|p| p.ty.spelling.clone()).collect();
            let key = DeclKey::Function(self.scopes.qualify(&spelling), signature);
            self.definitions
                .add(key, cursor, node.kind() == "function_definition");
        }

        for param in params {
            let data = CursorData::new(CursorKind::ParmDecl, param.name)
                .at(self.location(param.name_node.unwrap_or(param.node)))
                .with_extent(extent(param.node))
                .with_type(param.ty);
            self.builder.push_argument(cursor, data);
        }
        let data = self.builder.data_mut(cursor);
        data.result_type = Some(result);
        data.traits = traits;
    }

    fn result_type(&self, node: Node<'_>, declarator: Node<'_>, name: Node<'_>, function: Node<'_>) -> TypeRef {
        let types = self.types();
        if name.kind() == "operator_cast" {
            return name
                .child_by_field_name("type")
                .map(|t| types.named(t))
                .unwrap_or_else(|| TypeRef::unexposed(""));
        }

        let mut cursor = function.walk();
        let trailing = function
            .children(&mut cursor)
            .find(|c| c.kind() == "trailing_return_type")
            .and_then(|t| t.named_child(0));
        match trailing {
            Some(descriptor) => types.descriptor(descriptor),
            None => types.declared(types.specifier(node), Some(declarator)).ty,
        }
    }

    fn parameters<'t>(&self, function: Node<'t>, class_name: Option<&str>) -> Vec<Param<'t>> {
        let Some(list) = function.child_by_field_name("parameters") else {
            return Vec::new();
        };
        let mut cursor = list.walk();
        let nodes: Vec<Node<'t>> = list.named_children(&mut cursor).collect();

        let mut params = Vec::new();
        for node in nodes {
            let has_default = match node.kind() {
                "parameter_declaration" | "variadic_parameter_declaration" => false,
                "optional_parameter_declaration" => true,
                _ => continue,
            };
            let declarator = node.child_by_field_name("declarator");
            let mut declared = self.object(node, declarator);
            if declarator.is_none() && declared.ty.spelling == "void" {
                continue;
            }

            let is_pack = declared.is_pack || node.kind() == "variadic_parameter_declaration";
            if is_pack {
                declared.ty.spelling.push_str("...");
            }
            let names_class = match (class_name, node.child_by_field_name("type")) {
                (Some(class), Some(ty)) => self.types().base_name(ty) == class,
                _ => false,
            };
            params.push(Param {
                name: declared.name.map(|n| spell(self.text(n))).unwrap_or_default(),
                name_node: declared.name,
                node,
                ty: declared.ty,
                has_default,
                is_pack,
                names_class,
            });
        }
        params
    }

    fn specifiers(&self, start: usize, end: usize) -> Specifiers {
        let mut specifiers = Specifiers::default();
        for token in self.tokens_in(start, end) {
            match token.spelling.as_str() {
                "static" => specifiers.is_static = true,
                "virtual" => specifiers.is_virtual = true,
                "explicit" => specifiers.is_explicit = true,
                _ => {}
            }
        }
        specifiers
    }

    /// Scan the qualifiers, exception specification, virt-specifiers and
    /// `= 0 | default | delete` after a parameter list. Stops at the body
    /// or the constructor initializer list.
    fn tail(&self, start: usize, end: usize) -> Tail {
        let tokens = self.tokens_in(start, end);
        let mut tail = Tail::default();
        let mut depth = 0i32;
        let mut leading = true;

        for (i, token) in tokens.iter().enumerate() {
            let spelling = token.spelling.as_str();
            match spelling {
                "(" | "[" => depth += 1,
                ")" | "]" => depth -= 1,
                _ if depth > 0 => {}
                "{" | ";" | ":" => break,
                "const" if leading => tail.is_const = true,
                "volatile" | "&" | "&&" if leading => {}
                "noexcept" => {
                    tail.is_noexcept = !tokens.get(i + 1).is_some_and(|t| t.is("("));
                    leading = false;
                }
                "override" | "final" => {
                    tail.is_override = true;
                    leading = false;
                }
                "=" => {
                    match tokens.get(i + 1).map(|t| t.spelling.as_str()) {
                        Some("0") => tail.is_pure = true,
                        Some("default") => tail.is_defaulted = true,
                        Some("delete") => tail.is_deleted = true,
                        _ => {}
                    }
                    break;
                }
                _ => leading = false,
            }
        }
        tail
    }

    /// Start of the attribute blocks directly in front of `start`.
    fn leading_attributes(&self, start: usize) -> usize {
        let mut start = start;
        loop {
            let i = self.attribute_blocks.partition_point(|b| b.end <= start);
            let Some(block) = i.checked_sub(1).and_then(|i| self.attribute_blocks.get(i)) else {
                break;
            };
            let adjacent = self
                .src
                .get(block.end..start)
                .is_some_and(|gap| gap.trim().is_empty());
            if !adjacent || block.start >= start {
                break;
            }
            start = block.start;
        }
        start
    }

    /// Point declarations at the definition of the same entity.
    fn link_definitions(&mut self) {
        let declared = std::mem::take(&mut self.definitions.declared);
        for (key, decl) in declared {
            if let Some(&def) = self.definitions.defined.get(&key) {
                if def != decl {
                    trace!("{:?}: definition {:?} of {:?}", key, def, decl);
                    self.builder.data_mut(decl).definition = Some(def);
                }
            }
        }
    }
}

/// Name of a type template parameter: the identifier before any `=`.
fn type_parameter_name(param: Node<'_>) -> Option<Node<'_>> {
    if let Some(name) = param.child_by_field_name("name") {
        return Some(name);
    }
    let mut cursor = param.walk();
    let children: Vec<Node<'_>> = param.children(&mut cursor).collect();
    children
        .into_iter()
        .take_while(|c| c.kind() != "=")
        .find(|c| c.kind() == "type_identifier")
}

/// Default, copy, move and converting constructor predicates.
fn constructor_traits(params: &[Param<'_>], traits: &mut DeclTraits) {
    let rest_defaulted = |from: usize| params.iter().skip(from).all(|p| p.has_default);

    traits.is_default_constructor = rest_defaulted(0);
    if let Some(first) = params.first().filter(|p| p.names_class && rest_defaulted(1)) {
        match first.ty.kind {
            TypeKind::LValueReference => traits.is_copy_constructor = true,
            TypeKind::RValueReference => traits.is_move_constructor = true,
            _ => {}
        }
    }
    traits.is_converting_constructor = !traits.is_explicit
        && match params {
            [] => false,
            [_] => true,
            [_, second, ..] => second.has_default || second.is_pack,
        };
}
