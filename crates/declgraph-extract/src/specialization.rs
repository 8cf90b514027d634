//! Instantiation of class templates named by base specifiers.
//!
//! `struct Derived : Box<int>` makes the resolver classify the primary
//! template `Box<T>` again, bind `T = int` and register the result as the
//! concrete class `Box<int>`. Later bases spelled the same way reuse it.
//!
//! Template parameters can reach the model in two spellings: by name
//! (`const T &`) and, for arguments of partial specializations, as front-end
//! placeholders (`type-parameter-0-0 *`). Placeholders are handled
//! structurally by [`DependentText`]; names are substituted on identifier
//! boundaries only, so `T` never matches inside `TT` or `ns::T`.

use crate::qualify::scope_name;
use crate::resolver::Resolver;
use crate::text::rewrite_identifiers;
use declgraph::{ClassId, ClassInfo, TemplateParam};
use declgraph_frontend_api::{placeholder, Cursor};
use log::{debug, trace};
use std::collections::HashMap;

const PLACEHOLDER_PREFIX: &str = "type-parameter-";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Text(String),
    Param { depth: u32, index: u32 },
}

/// Type text with its unresolved template parameters split out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependentText {
    pieces: Vec<Piece>,
}

impl DependentText {
    pub fn parse(text: &str) -> Self {
        let mut pieces = Vec::new();
        let mut literal = String::new();
        let mut rest = text;

        while let Some(pos) = rest.find(PLACEHOLDER_PREFIX) {
            let boundary = !rest[..pos]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
            let after = &rest[pos + PLACEHOLDER_PREFIX.len()..];

            match boundary.then(|| parse_indices(after)).flatten() {
                Some((depth, index, used)) => {
                    literal.push_str(&rest[..pos]);
                    if !literal.is_empty() {
                        pieces.push(Piece::Text(std::mem::take(&mut literal)));
                    }
                    pieces.push(Piece::Param { depth, index });
                    rest = &after[used..];
                }
                None => {
                    let skip = pos + PLACEHOLDER_PREFIX.len();
                    literal.push_str(&rest[..skip]);
                    rest = &rest[skip..];
                }
            }
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            pieces.push(Piece::Text(literal));
        }
        Self { pieces }
    }

    /// Does the text mention any unresolved parameter?
    pub fn is_dependent(&self) -> bool {
        self.pieces.iter().any(|p| matches!(p, Piece::Param { .. }))
    }

    /// Replace outermost-level placeholders with the names of `params`.
    /// Placeholders without a matching parameter are kept.
    pub fn substitute(&self, params: &[TemplateParam]) -> String {
        self.pieces
            .iter()
            .map(|piece| match piece {
                Piece::Text(text) => text.clone(),
                Piece::Param { depth: 0, index } => params
                    .get(*index as usize)
                    .map_or_else(|| placeholder(0, *index), |p| p.name.clone()),
                Piece::Param { depth, index } => placeholder(*depth, *index),
            })
            .collect()
    }
}

/// `D-I` at the start of `text`, followed by a non-identifier character.
fn parse_indices(text: &str) -> Option<(u32, u32, usize)> {
    let digits = |s: &str| s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());

    let depth_len = digits(text);
    let depth = text[..depth_len].parse().ok()?;
    let rest = text[depth_len..].strip_prefix('-')?;
    let index_len = digits(rest);
    let index = rest[..index_len].parse().ok()?;

    let used = depth_len + 1 + index_len;
    if text[used..].starts_with(|c: char| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    Some((depth, index, used))
}

/// Template parameter bindings of one instantiation.
#[derive(Debug, Default)]
pub(crate) struct Bindings {
    by_name: HashMap<String, Binding>,
}

#[derive(Debug)]
struct Binding {
    text: String,
    is_pack: bool,
}

impl Bindings {
    /// Bind `args` to `params` by position. A parameter pack takes every
    /// remaining argument; parameters without an argument stay unbound.
    pub(crate) fn new(params: &[TemplateParam], args: &[String]) -> Self {
        let mut by_name = HashMap::new();
        for (i, param) in params.iter().enumerate() {
            let binding = if param.is_variadic {
                Binding {
                    text: args.get(i..).unwrap_or_default().join(", "),
                    is_pack: true,
                }
            } else {
                match args.get(i) {
                    Some(arg) => Binding {
                        text: arg.clone(),
                        is_pack: false,
                    },
                    None => continue,
                }
            };
            by_name.insert(param.name.clone(), binding);
            if param.is_variadic {
                break;
            }
        }
        Self { by_name }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Replace bound parameter names in `text`. A pack expansion `Ts...` is
    /// replaced together with its ellipsis.
    pub(crate) fn apply(&self, text: &str) -> String {
        rewrite_identifiers(text, |ident, qualified, after| {
            if qualified {
                return None;
            }
            let binding = self.by_name.get(ident)?;
            let swallow = if binding.is_pack && after.starts_with("...") {
                3
            } else {
                0
            };
            Some((binding.text.clone(), swallow))
        })
    }

    fn apply_all(&self, texts: &mut [String]) {
        for text in texts {
            *text = self.apply(text);
        }
    }
}

impl<'tu> Resolver<'tu> {
    /// Instantiate `template` with `args`, registering the concrete class
    /// under `spelled`.
    ///
    /// An already registered class of that name is reused. Returns `None`
    /// when the template cannot be classified or is already being
    /// instantiated further up the stack.
    pub(crate) fn instantiate(
        &mut self,
        template: Cursor<'tu>,
        spelled: &str,
        args: &[String],
    ) -> Option<ClassId> {
        if let Some(existing) = self.model.find_class(spelled) {
            trace!("reusing instantiation '{spelled}'");
            return Some(existing);
        }
        let template = template.definition().unwrap_or(template);

        if !self.instantiating.insert(spelled.to_string()) {
            debug!("recursive instantiation of '{spelled}', leaving the base unresolved");
            return None;
        }
        let classified = self.classify_class(template);
        self.instantiating.remove(spelled);

        let mut class = classified?;
        let bindings = Bindings::new(&class.template_params, args);
        self.concretize(&mut class, spelled, args, &bindings);

        debug!("instantiated '{spelled}' from '{}'", template.spelling());
        let id = self.model.register_class(class);
        if let Some(ns) = self.model.find_namespace(&scope_name(template)) {
            self.model[ns].classes.insert(spelled.to_string(), id);
        }
        Some(id)
    }

    /// Turn a classified template into the concrete class `name`.
    fn concretize(&mut self, class: &mut ClassInfo, name: &str, args: &[String], bindings: &Bindings) {
        class.name = name.to_string();
        class.is_template = false;
        class.is_specialization = true;
        class.template_params.clear();
        class.template_args = args.to_vec();

        if bindings.is_empty() {
            return;
        }

        for member in &mut class.members {
            member.type_name = bindings.apply(&member.type_name);
        }
        for base in &mut class.bases {
            base.type_name = bindings.apply(&base.type_name);
        }
        for &id in &class.ctors {
            bindings.apply_all(&mut self.model[id].param_types);
        }
        for &id in class.methods.values().flatten() {
            let method = &mut self.model[id];
            method.result_type = bindings.apply(&method.result_type);
            bindings.apply_all(&mut method.param_types);
        }
    }
}
