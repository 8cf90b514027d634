//! Identifier-aware rewriting of type spellings.

use declgraph::{ClassInfo, TemplateParam};

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Rewrite whole identifiers of `text`.
///
/// `replace` is called with the identifier, whether it is qualified by a
/// preceding `::`, and the text that follows it. It returns the replacement
/// and how many bytes of the following text the replacement swallows.
pub(crate) fn rewrite_identifiers<F>(text: &str, mut replace: F) -> String
where
    F: FnMut(&str, bool, &str) -> Option<(String, usize)>,
{
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find(|c: char| is_ident_char(c)) {
        let len = rest[start..]
            .find(|c: char| !is_ident_char(c))
            .unwrap_or(rest.len() - start);
        let ident = &rest[start..start + len];
        let before = &rest[..start];
        let after = &rest[start + len..];

        out.push_str(before);

        let qualified = before.ends_with("::");
        let starts_with_digit = ident.starts_with(|c: char| c.is_ascii_digit());

        match (!starts_with_digit)
            .then(|| replace(ident, qualified, after))
            .flatten()
        {
            Some((replacement, swallow)) => {
                out.push_str(&replacement);
                rest = &after[swallow.min(after.len())..];
            }
            None => {
                out.push_str(ident);
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// The spelled self type of a class template (`Foo<T, Us...>`), used to
/// expand bare references to the injected class name.
#[derive(Debug, Clone)]
pub(crate) struct SelfType {
    short: String,
    full: String,
}

impl SelfType {
    /// `None` for classes that are neither templates nor specializations.
    pub(crate) fn of(class: &ClassInfo) -> Option<Self> {
        if class.is_specialization {
            let short = class.short_name();
            let base = short.split('<').next().unwrap_or(short).to_string();
            return Some(Self {
                short: base,
                full: short.to_string(),
            });
        }
        if class.template_params.is_empty() {
            return None;
        }

        let short = class.short_name().to_string();
        let params: Vec<String> = class.template_params.iter().map(param_use).collect();
        let full = format!("{}<{}>", short, params.join(", "));
        Some(Self { short, full })
    }

    /// Replace bare uses of the class name that carry no argument list.
    pub(crate) fn rewrite(&self, text: &str) -> String {
        rewrite_identifiers(text, |ident, _, after| {
            (ident == self.short && !after.trim_start().starts_with('<'))
                .then(|| (self.full.clone(), 0))
        })
    }
}

fn param_use(param: &TemplateParam) -> String {
    if param.is_variadic {
        format!("{}...", param.name)
    } else {
        param.name.clone()
    }
}

/// Rewrite with an optional self type.
pub(crate) fn rewrite_self(self_type: Option<&SelfType>, text: &str) -> String {
    match self_type {
        Some(st) => st.rewrite(text),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_respects_boundaries() {
        let out = rewrite_identifiers("const T &, TT, T2, ns::T, T...", |ident, qualified, _| {
            (ident == "T" && !qualified).then(|| ("int".to_string(), 0))
        });
        assert_eq!(out, "const int &, TT, T2, ns::T, int...");
    }

    #[test]
    fn test_rewrite_can_swallow_suffix() {
        let out = rewrite_identifiers("tuple<Ts...>", |ident, _, after| {
            (ident == "Ts" && after.starts_with("...")).then(|| ("int, float".to_string(), 3))
        });
        assert_eq!(out, "tuple<int, float>");
    }

    #[test]
    fn test_self_type_expansion() {
        let class = ClassInfo::new("ns::Foo").template(vec![
            TemplateParam::new("T", "typename"),
            TemplateParam::new("Us", "typename").variadic(),
        ]);
        let st = SelfType::of(&class).unwrap();
        assert_eq!(st.rewrite("const Foo &"), "const Foo<T, Us...> &");
        assert_eq!(st.rewrite("Foo<int>"), "Foo<int>");
        assert_eq!(st.rewrite("FooBar"), "FooBar");
        assert!(SelfType::of(&ClassInfo::new("Plain")).is_none());
    }
}
