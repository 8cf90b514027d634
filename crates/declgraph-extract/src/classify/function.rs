use super::{declaration_attributes, parameters, TypeStyle};
use crate::qualify::qualified_name;
use declgraph::FunctionInfo;
use declgraph_frontend_api::{Cursor, CursorKind};
use std::path::Path;

/// Classify a free function. When the unit also defines the function, the
/// definition is used.
pub fn classify_function(path: &Path, c: Cursor<'_>) -> Option<FunctionInfo> {
    if c.kind() != CursorKind::FunctionDecl {
        return None;
    }
    let c = c.definition().unwrap_or(c);

    let style = TypeStyle::default();
    let mut info = FunctionInfo::new(qualified_name(c), style.spell(c.result_type()));
    (info.param_names, info.param_types) = parameters(c, style);
    info.attributes = declaration_attributes(path, c);
    Some(info)
}
