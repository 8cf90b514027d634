//! Class, struct and class template classification.
//!
//! Classes are classified in two passes over their children. The first
//! pass consumes the template preamble: template parameters come first
//! among the children of a class template, and the first child of any other
//! kind ends it. The second pass dispatches the remaining children:
//!
//! | child              | record                                   |
//! |--------------------|------------------------------------------|
//! | base specifier     | [`ClassBase`], instantiating templates   |
//! | class / struct     | nested [`ClassInfo`], registered         |
//! | constructor        | [`ClassConstructor`](declgraph::ClassConstructor) |
//! | destructor         | [`ClassDestructor`](declgraph::ClassDestructor)   |
//! | method             | [`ClassMethod`](declgraph::ClassMethod), by overload set |
//! | field              | [`ClassMember`](declgraph::ClassMember)  |

use super::members::{classify_constructor, classify_destructor, classify_member, classify_method};
use super::{is_public, is_redeclaration, is_visible};
use crate::attributes::parse_attributes;
use crate::qualify::{qualified_name, qualify_type};
use crate::resolver::Resolver;
use crate::specialization::DependentText;
use crate::text::SelfType;
use crate::tokens::TokenSpan;
use declgraph::{Access, ClassBase, ClassInfo, TemplateParam};
use declgraph_frontend_api::{Cursor, CursorKind};
use log::{trace, warn};

const CLASS_KEYWORDS: [&str; 3] = ["class", "struct", "union"];

impl<'tu> Resolver<'tu> {
    /// Classify a record declaration, allocating its constructors, methods
    /// and nested classes in the model.
    ///
    /// Returns `None` for non-records, non-public nested records, anonymous
    /// records and declarations whose definition appears elsewhere in the
    /// unit.
    pub(crate) fn classify_class(&mut self, c: Cursor<'tu>) -> Option<ClassInfo> {
        if !c.kind().is_record() || !is_visible(c) || is_redeclaration(c) {
            return None;
        }
        if c.spelling().is_empty() {
            trace!("skipping anonymous {:?}", c.kind());
            return None;
        }

        let is_template = matches!(
            c.kind(),
            CursorKind::ClassTemplate | CursorKind::ClassTemplatePartialSpecialization
        );

        let mut info = ClassInfo::new(qualified_name(c));
        info.is_template = is_template;
        info.is_abstract = c.traits().is_abstract;
        info.attributes = match TokenSpan::of(c).after_keyword(&CLASS_KEYWORDS) {
            Some(span) => parse_attributes(self.path(), span),
            None => Vec::new(),
        };

        // Template preamble
        let mut in_preamble = is_template;
        let mut body = Vec::new();
        for child in c.children() {
            if in_preamble {
                match child.kind() {
                    CursorKind::TemplateTypeParameter => {
                        info.template_params.push(type_parameter(child));
                        continue;
                    }
                    CursorKind::NonTypeTemplateParameter => {
                        let declarator = child.ty().map(|t| t.spelling.clone()).unwrap_or_default();
                        info.template_params
                            .push(TemplateParam::new(child.spelling(), declarator));
                        continue;
                    }
                    CursorKind::TemplateTemplateParameter => {
                        warn!(
                            "{}: template template parameter '{}' for '{}'; not currently supported",
                            self.path().display(),
                            child.spelling(),
                            info.name
                        );
                        continue;
                    }
                    _ => in_preamble = false,
                }
            }
            body.push(child);
        }

        self.name_specialization(c, &mut info);
        let self_type = SelfType::of(&info);

        for child in body {
            match child.kind() {
                CursorKind::BaseSpecifier => {
                    if let Some(base) = self.classify_base(child, &info) {
                        info.bases.push(base);
                    }
                }
                kind if kind.is_record() => {
                    if let Some(nested) = self.classify_class(child) {
                        let name = nested.name.clone();
                        let id = match self.model.find_class(&name) {
                            Some(existing) => existing,
                            None => self.model.register_class(nested),
                        };
                        info.classes.insert(name, id);
                    }
                }
                CursorKind::Constructor => {
                    if let Some(ctor) = classify_constructor(self.path(), child, self_type.as_ref()) {
                        let id = self.model.alloc(ctor);
                        info.ctors.push(id);
                    }
                }
                CursorKind::Destructor => {
                    if let Some(dtor) = classify_destructor(self.path(), child) {
                        info.dtor = Some(self.model.alloc(dtor));
                    }
                }
                CursorKind::CXXMethod => {
                    if let Some(method) = classify_method(self.path(), child, self_type.as_ref()) {
                        let name = method.name.clone();
                        let id = self.model.alloc(method);
                        info.methods.entry(name).or_default().push(id);
                    }
                }
                CursorKind::FieldDecl => {
                    if let Some(member) = classify_member(self.path(), child) {
                        info.members.push(member);
                    }
                }
                kind => trace!("{}: ignoring {:?} '{}'", info.name, kind, child.spelling()),
            }
        }

        Some(info)
    }

    /// Mark partial and explicit specializations and append their resolved
    /// argument list to the name.
    fn name_specialization(&self, c: Cursor<'tu>, info: &mut ClassInfo) {
        let args = match c.ty().and_then(|ty| ty.template_args.as_ref()) {
            Some(args) if c.kind() != CursorKind::ClassTemplate => args,
            _ => return,
        };

        info.is_specialization = true;
        info.template_args = args
            .iter()
            .map(|arg| DependentText::parse(&qualify_type(c, arg)).substitute(&info.template_params))
            .collect();
        info.name = format!("{}<{}>", info.name, info.template_args.join(", "));
    }

    /// Classify a public base specifier of `derived`.
    ///
    /// A base naming a class template with arguments is instantiated into a
    /// concrete class. Argument scanning stops at the first argument that
    /// expands a parameter pack of `derived`.
    pub(crate) fn classify_base(&mut self, c: Cursor<'tu>, derived: &ClassInfo) -> Option<ClassBase> {
        if c.kind() != CursorKind::BaseSpecifier || !is_public(c) {
            return None;
        }
        let ty = c.ty()?;

        let Some(decl) = c.type_declaration(ty) else {
            warn!(
                "{}: failed to get base class declaration for '{}' of '{}'",
                self.path().display(),
                c.spelling(),
                derived.name
            );
            return Some(ClassBase::new(ty.spelling.clone(), Access::Public));
        };

        if matches!(
            decl.kind(),
            CursorKind::TypeAliasDecl | CursorKind::TypeAliasTemplateDecl | CursorKind::TypedefDecl
        ) {
            return Some(ClassBase::new(c.spelling(), Access::Public));
        }

        let mut base = ClassBase::new(qualified_name(decl), Access::Public);
        let mut args = Vec::new();
        if let Some(template_args) = ty.template_args.as_ref() {
            for arg in template_args {
                let text = qualify_type(c, arg);
                let pack = derived
                    .template_params
                    .iter()
                    .find(|p| p.is_variadic && p.name == text.trim_end_matches("...").trim_end());
                if let Some(pack) = pack {
                    base.is_variadic = true;
                    args.push(format!("{}...", pack.name));
                    break;
                }
                args.push(text);
            }
            base.type_name = format!("{}<{}>", base.type_name, args.join(", "));
        }

        base.class = match decl.kind() {
            CursorKind::ClassTemplate if !args.is_empty() && !base.is_variadic => {
                self.instantiate(decl, &base.type_name, &args)
            }
            kind if kind.is_record() => self.model.find_class(&base.type_name),
            _ => None,
        };
        Some(base)
    }
}

/// `typename T`, `class T` or `typename... Ts`.
fn type_parameter(c: Cursor<'_>) -> TemplateParam {
    let tokens = TokenSpan::of(c);
    let toks = tokens.tokens();
    let declarator = toks
        .first()
        .map(|t| t.spelling.clone())
        .unwrap_or_else(|| "typename".to_string());
    let mut param = TemplateParam::new(c.spelling(), declarator);
    if c.traits().is_variadic || toks.get(1).is_some_and(|t| t.is("...")) {
        param = param.variadic();
    }
    param
}

#[cfg(test)]
mod tests {
    use crate::resolver::resolve;
    use crate::testing::SourceUnit;
    use declgraph::ConstructorKind;
    use declgraph_frontend_api::{
        Access, CursorData, CursorKind, DeclTraits, TypeKind, TypeRef,
    };

    #[test]
    fn test_class_with_attributes_and_members() {
        let text = r#"class [[my::attrib(1, "2", 3.0)]] example {
public:
    example() = default;
    example(const example &other);
    ~example();
    int get() const;
    int get(int i);
    [[my::field]] int value;
private:
    int secret;
};"#;
        let mut src = SourceUnit::new(text);
        let class = src.push_root(CursorKind::ClassDecl, "example", &text[..text.len() - 1]);
        src.push_member(
            class,
            CursorData::new(CursorKind::Constructor, "example").with_traits(DeclTraits {
                is_default_constructor: true,
                is_defaulted: true,
                ..Default::default()
            }),
            "example",
            "example() = default",
        );
        let copy = src.push_member(
            class,
            CursorData::new(CursorKind::Constructor, "example").with_traits(DeclTraits {
                is_copy_constructor: true,
                is_converting_constructor: true,
                ..Default::default()
            }),
            "example",
            "example(const example &other)",
        );
        src.push_argument(copy, "other", "const example &");
        src.push_member(
            class,
            CursorData::new(CursorKind::Destructor, "~example"),
            "~",
            "~example()",
        );
        src.push_member(
            class,
            CursorData::new(CursorKind::CXXMethod, "get")
                .with_result(TypeRef::builtin("int"))
                .with_traits(DeclTraits {
                    is_const: true,
                    ..Default::default()
                }),
            "get",
            "int get() const",
        );
        let overload = src.push_member(
            class,
            CursorData::new(CursorKind::CXXMethod, "get").with_result(TypeRef::builtin("int")),
            "get",
            "int get(int i)",
        );
        src.push_argument(overload, "i", "int");
        src.push_member(
            class,
            CursorData::new(CursorKind::FieldDecl, "value").with_type(TypeRef::builtin("int")),
            "value",
            "int value",
        );
        src.push(
            class,
            CursorData::new(CursorKind::FieldDecl, "secret")
                .with_access(Access::Private)
                .with_type(TypeRef::builtin("int")),
            "secret",
            "int secret",
        );
        let unit = src.build();
        let model = resolve(&unit);

        let class = model.class_by_name("example").unwrap();
        assert_eq!(class.attributes.len(), 1);
        assert_eq!(class.attributes[0].scope, "my");
        assert_eq!(class.attributes[0].name, "attrib");
        assert_eq!(class.attributes[0].args, vec!["1", "\"2\"", "3.0"]);

        let kinds: Vec<ConstructorKind> =
            class.ctors.iter().map(|&id| model[id].constructor_kind).collect();
        assert_eq!(kinds, vec![ConstructorKind::Default, ConstructorKind::Copy]);
        assert!(class.dtor.is_some());
        assert_eq!(class.methods["get"].len(), 2);
        assert!(model[class.methods["get"][0]].is_const);
        assert_eq!(model[class.methods["get"][1]].param_names, vec!["i"]);

        assert_eq!(class.members.len(), 1);
        assert_eq!(class.members[0].name, "value");
        assert_eq!(class.members[0].attributes[0].to_string(), "my::field");
    }

    #[test]
    fn test_template_preamble() {
        let text = "template <typename T, class... Us, int N> struct Tuple { T head; };";
        let mut src = SourceUnit::new(text);
        let class = src.push_root(CursorKind::ClassTemplate, "Tuple", &text[..text.len() - 1]);
        src.push(class, CursorData::new(CursorKind::TemplateTypeParameter, "T"), "T", "typename T");
        src.push(
            class,
            CursorData::new(CursorKind::TemplateTypeParameter, "Us"),
            "Us",
            "class... Us",
        );
        src.push(
            class,
            CursorData::new(CursorKind::NonTypeTemplateParameter, "N").with_type(TypeRef::builtin("int")),
            "N",
            "int N",
        );
        src.push_member(
            class,
            CursorData::new(CursorKind::FieldDecl, "head")
                .with_type(TypeRef::new("T", TypeKind::TemplateParam { depth: 0, index: 0 })),
            "head",
            "T head",
        );
        let unit = src.build();
        let model = resolve(&unit);

        let class = model.class_by_name("Tuple").unwrap();
        assert!(class.is_template);
        assert!(!class.is_specialization);
        let params: Vec<(&str, &str, bool)> = class
            .template_params
            .iter()
            .map(|p| (p.name.as_str(), p.declarator.as_str(), p.is_variadic))
            .collect();
        assert_eq!(
            params,
            vec![("T", "typename", false), ("Us", "class", true), ("N", "int", false)]
        );
        assert_eq!(class.member("head").unwrap().type_name, "T");
    }

    #[test]
    fn test_partial_specialization_name() {
        let text = "template <typename T> struct Box<T *> { };";
        let mut src = SourceUnit::new(text);
        let root = src.builder().root();
        let primary = src.builder().push(root, CursorData::new(CursorKind::ClassTemplate, "Box"));
        let ty = TypeRef::new("Box<type-parameter-0-0 *>", TypeKind::Record)
            .with_declaration(primary)
            .with_template_args(vec![TypeRef::new("type-parameter-0-0 *", TypeKind::Pointer)]);
        let spec = src.push(
            root,
            CursorData::new(CursorKind::ClassTemplatePartialSpecialization, "Box").with_type(ty),
            "Box",
            &text[..text.len() - 1],
        );
        src.push(spec, CursorData::new(CursorKind::TemplateTypeParameter, "T"), "T", "typename T");
        let unit = src.build();
        let model = resolve(&unit);

        let spec = model.class_by_name("Box<T *>").unwrap();
        assert!(spec.is_template);
        assert!(spec.is_specialization);
        assert_eq!(spec.template_args, vec!["T *"]);
        assert!(model.global().classes.contains_key("Box"));
    }

    #[test]
    fn test_nested_public_classes() {
        let text = "struct Outer { struct Inner { int x; }; private: struct Hidden { }; };";
        let mut src = SourceUnit::new(text);
        let outer = src.push_root(CursorKind::StructDecl, "Outer", &text[..text.len() - 1]);
        let inner = src.push_member(
            outer,
            CursorData::new(CursorKind::StructDecl, "Inner"),
            "Inner",
            "struct Inner { int x; }",
        );
        src.push_member(
            inner,
            CursorData::new(CursorKind::FieldDecl, "x").with_type(TypeRef::builtin("int")),
            "x",
            "int x",
        );
        src.push(
            outer,
            CursorData::new(CursorKind::StructDecl, "Hidden").with_access(Access::Private),
            "Hidden",
            "struct Hidden { }",
        );
        let unit = src.build();
        let model = resolve(&unit);

        let outer = model.class_by_name("Outer").unwrap();
        let nested: Vec<&String> = outer.classes.keys().collect();
        assert_eq!(nested, vec!["Outer::Inner"]);
        assert_eq!(model.class_by_name("Outer::Inner").unwrap().members.len(), 1);
        assert!(!model.global().classes.contains_key("Outer::Inner"));
    }

    #[test]
    fn test_template_template_parameter_is_skipped() {
        let text = "template <template <typename> class C, typename T> struct Wrap { };";
        let mut src = SourceUnit::new(text);
        let class = src.push_root(CursorKind::ClassTemplate, "Wrap", &text[..text.len() - 1]);
        src.push(
            class,
            CursorData::new(CursorKind::TemplateTemplateParameter, "C"),
            "C",
            "template <typename> class C",
        );
        src.push(class, CursorData::new(CursorKind::TemplateTypeParameter, "T"), "T", "typename T");
        let unit = src.build();
        let model = resolve(&unit);

        let class = model.class_by_name("Wrap").unwrap();
        assert_eq!(class.template_params.len(), 1);
        assert_eq!(class.template_params[0].name, "T");
    }
}
