//! Name lookup and type spelling.
//!
//! Types are spelled the way a compiler prints them (`const std::string &`,
//! `std::tuple<int, float>`, `T *`). Named types are looked up in the
//! [`ScopeTable`] of declarations seen so far, innermost scope first, so
//! the extractor can follow them to their declaration.

use crate::lexer::lex;
use declgraph_frontend_api::{placeholder, CursorId, Token, TypeKind, TypeRef};
use std::collections::HashMap;
use tree_sitter::Node;

/// What a qualified name in the scope table refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Symbol {
    Namespace,
    Record(CursorId),
    Enum(CursorId),
    Alias(CursorId),
    AliasTemplate(CursorId),
}

#[derive(Debug, Clone)]
struct TemplateParamSymbol {
    name: String,
    depth: u32,
    index: u32,
    cursor: CursorId,
    is_type: bool,
}

/// Declarations visible so far, the open scopes and the template
/// parameters in scope.
#[derive(Debug, Default)]
pub(crate) struct ScopeTable {
    symbols: HashMap<String, Symbol>,
    /// Qualified names of the open scopes, outermost first
    open: Vec<String>,
    /// Namespaces nominated by `using namespace`, per scope
    directives: HashMap<String, Vec<String>>,
    templates: Vec<Vec<TemplateParamSymbol>>,
}

fn join(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{scope}::{name}")
    }
}

impl ScopeTable {
    pub fn current(&self) -> &str {
        self.open.last().map_or("", String::as_str)
    }

    /// `name` qualified with the current scope.
    pub fn qualify(&self, name: &str) -> String {
        join(self.current(), name)
    }

    /// Open a namespace or class scope. Anonymous scopes add nothing to
    /// qualified names.
    pub fn enter(&mut self, name: &str) {
        let scope = if name.is_empty() {
            self.current().to_string()
        } else {
            self.qualify(name)
        };
        self.open.push(scope);
    }

    pub fn leave(&mut self) {
        self.open.pop();
    }

    /// Declare `name` in the current scope. The first declaration wins.
    pub fn declare(&mut self, name: &str, symbol: Symbol) {
        if name.is_empty() {
            return;
        }
        self.symbols.entry(self.qualify(name)).or_insert(symbol);
    }

    pub fn add_directive(&mut self, namespace: &str) {
        let target = self.resolve_namespace(namespace);
        self.directives
            .entry(self.current().to_string())
            .or_default()
            .push(target);
    }

    fn resolve_namespace(&self, name: &str) -> String {
        if let Some(global) = name.strip_prefix("::") {
            return global.to_string();
        }
        self.scopes()
            .map(|scope| join(scope, name))
            .find(|candidate| self.symbols.get(candidate) == Some(&Symbol::Namespace))
            .unwrap_or_else(|| name.to_string())
    }

    /// Open scopes, innermost first, ending with the global scope.
    fn scopes(&self) -> impl Iterator<Item = &str> + '_ {
        self.open
            .iter()
            .rev()
            .map(String::as_str)
            .chain(std::iter::once(""))
    }

    /// Look a possibly qualified name up from the current scope outward,
    /// following using-directives.
    pub fn lookup(&self, name: &str) -> Option<Symbol> {
        if let Some(global) = name.strip_prefix("::") {
            return self.symbols.get(global).copied();
        }
        for scope in self.scopes() {
            if let Some(symbol) = self.symbols.get(&join(scope, name)) {
                return Some(*symbol);
            }
            let nominated = self.directives.get(scope).into_iter().flatten();
            for ns in nominated {
                if let Some(symbol) = self.symbols.get(&join(ns, name)) {
                    return Some(*symbol);
                }
            }
        }
        None
    }

    pub fn push_template_frame(&mut self) {
        self.templates.push(Vec::new());
    }

    pub fn pop_template_frame(&mut self) {
        self.templates.pop();
    }

    /// Add a parameter to the innermost template frame, returning its
    /// depth and index. Empty parameter lists (`template<>`) do not count
    /// towards the depth.
    pub fn add_template_param(&mut self, name: &str, cursor: CursorId, is_type: bool) -> (u32, u32) {
        let Some((frame, outer)) = self.templates.split_last_mut() else {
            return (0, 0);
        };
        let depth = outer.iter().filter(|f| !f.is_empty()).count() as u32;
        let index = frame.len() as u32;
        frame.push(TemplateParamSymbol {
            name: name.to_string(),
            depth,
            index,
            cursor,
            is_type,
        });
        (depth, index)
    }

    fn template_param(&self, name: &str) -> Option<&TemplateParamSymbol> {
        self.templates
            .iter()
            .rev()
            .flat_map(|frame| frame.iter().rev())
            .find(|p| p.is_type && p.name == name)
    }
}

/// The result of applying a declarator to a base type
#[derive(Debug, Clone)]
pub(crate) struct Declared<'t> {
    pub ty: TypeRef,
    /// The declared name, when there is one
    pub name: Option<Node<'t>>,
    /// The function declarator, for functions
    pub function: Option<Node<'t>>,
    /// `...` in a parameter declarator
    pub is_pack: bool,
}

/// Spells the types of one unit against its scope table.
#[derive(Clone, Copy)]
pub(crate) struct TypeContext<'a> {
    src: &'a str,
    scopes: &'a ScopeTable,
    /// Spell template parameters as `type-parameter-<depth>-<index>`
    placeholders: bool,
}

impl<'a> TypeContext<'a> {
    pub fn new(src: &'a str, scopes: &'a ScopeTable) -> Self {
        Self {
            src,
            scopes,
            placeholders: false,
        }
    }

    pub fn with_placeholders(mut self) -> Self {
        self.placeholders = true;
        self
    }

    fn text(&self, node: Node<'_>) -> &'a str {
        node.utf8_text(self.src.as_bytes()).unwrap_or("")
    }

    /// Base type of a declaration: its `type` specifier with the
    /// declaration's `const`/`volatile` qualifiers.
    pub fn specifier(&self, decl: Node<'_>) -> TypeRef {
        let base = match decl.child_by_field_name("type") {
            Some(spec) => self.named(spec),
            None => TypeRef::builtin("void"),
        };

        let mut cursor = decl.walk();
        let qualifiers: Vec<&str> = decl
            .children(&mut cursor)
            .filter(|c| c.kind() == "type_qualifier")
            .map(|c| self.text(c).trim())
            .filter(|q| matches!(*q, "const" | "volatile"))
            .collect();
        qualified(base, &qualifiers)
    }

    /// A type specifier node.
    pub fn named(&self, node: Node<'_>) -> TypeRef {
        match node.kind() {
            "primitive_type" | "sized_type_specifier" => TypeRef::builtin(spell(self.text(node))),
            "type_identifier" => self.resolve(&spell(self.text(node))),
            "qualified_identifier" => self.qualified_name(node),
            "template_type" => self.template_type(node, ""),
            "dependent_type" => {
                let inner = self.text(node).trim_start();
                let inner = inner.strip_prefix("typename").unwrap_or(inner);
                TypeRef::unexposed(format!("typename {}", spell(inner)))
            }
            "class_specifier" | "struct_specifier" | "union_specifier" | "enum_specifier" => {
                match node.child_by_field_name("name") {
                    Some(name) => self.named(name),
                    None => {
                        let keyword = node.kind().trim_end_matches("_specifier");
                        TypeRef::unexposed(format!("(anonymous {keyword})"))
                    }
                }
            }
            _ => TypeRef::unexposed(spell(self.text(node))),
        }
    }

    /// A (possibly qualified) type name without template arguments.
    fn resolve(&self, name: &str) -> TypeRef {
        if !name.contains("::") {
            if let Some(param) = self.scopes.template_param(name) {
                let spelling = if self.placeholders {
                    placeholder(param.depth, param.index)
                } else {
                    name.to_string()
                };
                let kind = TypeKind::TemplateParam {
                    depth: param.depth,
                    index: param.index,
                };
                return TypeRef::new(spelling, kind).with_declaration(param.cursor);
            }
        }

        match self.scopes.lookup(name) {
            Some(Symbol::Record(id)) => TypeRef::new(name, TypeKind::Record).with_declaration(id),
            Some(Symbol::Enum(id)) => TypeRef::new(name, TypeKind::Enum).with_declaration(id),
            Some(Symbol::Alias(id)) => TypeRef::new(name, TypeKind::Typedef).with_declaration(id),
            Some(Symbol::AliasTemplate(id)) => TypeRef::unexposed(name).with_declaration(id),
            Some(Symbol::Namespace) | None => TypeRef::unexposed(name),
        }
    }

    /// `a::b::Name` or `a::b::Name<Args>`.
    fn qualified_name(&self, node: Node<'_>) -> TypeRef {
        let mut prefix = Vec::new();
        let mut current = node;
        while current.kind() == "qualified_identifier" {
            if let Some(scope) = current.child_by_field_name("scope") {
                prefix.push(spell(self.text(scope)));
            }
            match current.child_by_field_name("name") {
                Some(name) => current = name,
                None => return TypeRef::unexposed(spell(self.text(node))),
            }
        }

        let text = self.text(node).trim_start();
        let scope = if text.starts_with("::") {
            format!("::{}", prefix.join("::"))
        } else {
            prefix.join("::")
        };

        match current.kind() {
            "template_type" => self.template_type(current, &scope),
            "type_identifier" | "identifier" | "namespace_identifier" => {
                let name = spell(self.text(current));
                let full = if scope.is_empty() {
                    name
                } else {
                    format!("{scope}::{name}")
                };
                let mut ty = self.resolve(&full);
                ty.spelling = full.trim_start_matches("::").to_string();
                ty
            }
            _ => TypeRef::unexposed(spell(self.text(node))),
        }
    }

    /// `Name<Args>`, with `scope` prefixed to the name.
    fn template_type(&self, node: Node<'_>, scope: &str) -> TypeRef {
        let name = node
            .child_by_field_name("name")
            .map(|n| spell(self.text(n)))
            .unwrap_or_default();
        let full = if scope.is_empty() {
            name
        } else {
            format!("{scope}::{name}")
        };

        let args: Vec<TypeRef> = match node.child_by_field_name("arguments") {
            Some(list) => {
                let mut cursor = list.walk();
                let args: Vec<Node<'_>> = list.named_children(&mut cursor).collect();
                args.into_iter()
                    .filter(|a| a.kind() != "comment")
                    .map(|a| self.argument(a))
                    .collect()
            }
            None => Vec::new(),
        };
        let spelled: Vec<&str> = args.iter().map(|a| a.spelling.as_str()).collect();
        let spelling = format!(
            "{}<{}>",
            full.trim_start_matches("::"),
            spelled.join(", ")
        );

        let declaration = match self.scopes.lookup(&full) {
            Some(Symbol::Record(id)) => Some((id, TypeKind::Record)),
            Some(Symbol::AliasTemplate(id)) => Some((id, TypeKind::Unexposed)),
            _ => None,
        };
        let ty = match declaration {
            Some((id, kind)) => TypeRef::new(spelling, kind).with_declaration(id),
            None => TypeRef::unexposed(spelling),
        };
        ty.with_template_args(args)
    }

    /// One template argument: a type, a pack expansion or an expression.
    pub fn argument(&self, node: Node<'_>) -> TypeRef {
        match node.kind() {
            "type_descriptor" => self.descriptor(node),
            "parameter_pack_expansion" => {
                let pattern = node
                    .child_by_field_name("pattern")
                    .or_else(|| node.named_child(0));
                match pattern {
                    Some(pattern) => {
                        let mut ty = self.argument(pattern);
                        ty.spelling.push_str("...");
                        ty
                    }
                    None => TypeRef::unexposed(spell(self.text(node))),
                }
            }
            "identifier" | "type_identifier" => {
                let ty = self.resolve(&spell(self.text(node)));
                if ty.declaration.is_some() {
                    ty
                } else {
                    TypeRef::unexposed(ty.spelling)
                }
            }
            _ => TypeRef::unexposed(spell(self.text(node))),
        }
    }

    /// A `type_descriptor`: specifier, qualifiers and abstract declarator.
    pub fn descriptor(&self, node: Node<'_>) -> TypeRef {
        let base = self.specifier(node);
        self.declared(base, node.child_by_field_name("declarator")).ty
    }

    /// Apply a declarator to `base`, outermost operator first.
    pub fn declared<'t>(&self, base: TypeRef, declarator: Option<Node<'t>>) -> Declared<'t> {
        let mut out = Declared {
            ty: base,
            name: None,
            function: None,
            is_pack: false,
        };
        let mut current = declarator;

        while let Some(node) = current {
            match node.kind() {
                "pointer_declarator" | "abstract_pointer_declarator" => {
                    let mut cursor = node.walk();
                    let is_const = node
                        .children(&mut cursor)
                        .any(|c| c.kind() == "type_qualifier" && self.text(c).trim() == "const");
                    out.ty = indirection(out.ty, "*", TypeKind::Pointer);
                    if is_const {
                        out.ty.spelling.push_str("const");
                    }
                    current = node.child_by_field_name("declarator");
                }
                "reference_declarator" | "abstract_reference_declarator" => {
                    let mut cursor = node.walk();
                    let rvalue = node.children(&mut cursor).any(|c| c.kind() == "&&");
                    out.ty = if rvalue {
                        indirection(out.ty, "&&", TypeKind::RValueReference)
                    } else {
                        indirection(out.ty, "&", TypeKind::LValueReference)
                    };
                    current = node
                        .child_by_field_name("declarator")
                        .or_else(|| node.named_child(0));
                }
                "array_declarator" | "abstract_array_declarator" => {
                    let size = node
                        .child_by_field_name("size")
                        .map(|s| spell(self.text(s)))
                        .unwrap_or_default();
                    out.ty = TypeRef::unexposed(format!("{}[{}]", out.ty.spelling, size));
                    current = node.child_by_field_name("declarator");
                }
                "function_declarator" | "abstract_function_declarator" => {
                    out.name = node.child_by_field_name("declarator");
                    out.function = Some(node);
                    return out;
                }
                "operator_cast" => {
                    out.name = Some(node);
                    out.function = node.child_by_field_name("declarator");
                    return out;
                }
                "variadic_declarator" => {
                    out.is_pack = true;
                    current = node.named_child(0);
                }
                "init_declarator" => current = node.child_by_field_name("declarator"),
                "parenthesized_declarator" | "attributed_declarator" => current = node.named_child(0),
                _ => {
                    out.name = Some(node);
                    return out;
                }
            }
        }
        out
    }

    /// Unqualified name of the type a specifier names, without arguments.
    pub fn base_name(&self, node: Node<'_>) -> String {
        match node.kind() {
            "template_type" => node
                .child_by_field_name("name")
                .map(|n| spell(self.text(n)))
                .unwrap_or_default(),
            "qualified_identifier" => match node.child_by_field_name("name") {
                Some(name) => self.base_name(name),
                None => String::new(),
            },
            _ => spell(self.text(node)),
        }
    }
}

/// Prefix `const`/`volatile`. Qualified named types no longer point at
/// their declaration.
fn qualified(base: TypeRef, qualifiers: &[&str]) -> TypeRef {
    if qualifiers.is_empty() {
        return base;
    }
    let mut spelling = String::new();
    for q in ["const", "volatile"] {
        if qualifiers.contains(&q) {
            spelling.push_str(q);
            spelling.push(' ');
        }
    }
    spelling.push_str(&base.spelling);

    match base.kind {
        TypeKind::Builtin | TypeKind::TemplateParam { .. } => TypeRef {
            spelling,
            ..base
        },
        _ => TypeRef::unexposed(spelling),
    }
}

fn indirection(base: TypeRef, op: &str, kind: TypeKind) -> TypeRef {
    let mut spelling = base.spelling;
    if !(spelling.ends_with('*') || spelling.ends_with('&')) {
        spelling.push(' ');
    }
    spelling.push_str(op);
    TypeRef::new(spelling, kind)
}

/// Re-spell source text with compiler spacing: words are separated by one
/// space, commas are followed by one, `*` and `&` are preceded by one.
pub(crate) fn spell(text: &str) -> String {
    let tokens = lex(text).tokens;
    let mut out = String::with_capacity(text.len());
    let mut prev: Option<&Token> = None;
    for tok in &tokens {
        if let Some(p) = prev {
            if needs_space(p, tok) {
                out.push(' ');
            }
        }
        out.push_str(&tok.spelling);
        prev = Some(tok);
    }
    out
}

fn needs_space(prev: &Token, next: &Token) -> bool {
    let indirection = matches!(next.spelling.as_str(), "*" | "&" | "&&");
    (prev.is_word() && next.is_word())
        || prev.is(",")
        || (indirection && (prev.is_word() || prev.is(">") || prev.is(">>")))
}
