//! The tree-sitter [`FrontEnd`] implementation.

use crate::lexer::{lex, mask_attributes};
use crate::lower::Lowering;
use crate::options::ParseOptions;
use declgraph_frontend_api::{
    Diagnostic, FrontEnd, FrontEndError, FrontEndResult, Severity, TranslationUnit,
};
use log::debug;
use std::path::Path;
use tree_sitter::{Node, Parser};

/// C++ front end backed by tree-sitter-cpp.
///
/// The source is not preprocessed: both branches of conditional blocks are
/// lowered and macros are not expanded. `[[...]]` attribute blocks are
/// blanked out before parsing, so declarations carrying them parse
/// cleanly; the attributes stay available through the unit's tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeSitterFrontEnd;

impl TreeSitterFrontEnd {
    pub fn new() -> Self {
        Self
    }
}

impl FrontEnd for TreeSitterFrontEnd {
    fn name(&self) -> &str {
        "tree-sitter"
    }

    fn parse_source(
        &self,
        source: &str,
        path: &Path,
        flags: &[String],
    ) -> FrontEndResult<TranslationUnit> {
        let options = ParseOptions::from_flags(flags)
            .map_err(|e| FrontEndError::InvalidArguments(path.to_path_buf(), e.to_string()))?;
        debug!(
            "{}: {:?}, {} define(s), {} include dir(s)",
            path.display(),
            options.standard,
            options.defines.len(),
            options.include_dirs.len()
        );

        let lexed = lex(source);
        let masked = mask_attributes(source, &lexed.attribute_blocks);

        let mut parser = Parser::new();
        let language = tree_sitter_cpp::language();
        parser
            .set_language(&language)
            .map_err(|e| FrontEndError::Crashed(path.to_path_buf(), e.to_string()))?;

        let tree = parser.parse(&masked, None).ok_or_else(|| {
            FrontEndError::Crashed(path.to_path_buf(), "Failed to parse".to_string())
        })?;
        let root_node = tree.root_node();

        let mut builder = Lowering::new(path, &masked, lexed, &options).lower(root_node);
        for diagnostic in syntax_diagnostics(path, root_node) {
            builder.add_diagnostic(diagnostic);
        }
        builder.set_flags(flags.to_vec());
        Ok(builder.build())
    }
}

/// One error diagnostic per syntax error or missing token.
fn syntax_diagnostics(path: &Path, root: Node<'_>) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    if root.has_error() {
        collect_errors(path, root, &mut out);
    }
    out
}

fn collect_errors(path: &Path, node: Node<'_>, out: &mut Vec<Diagnostic>) {
    if node.is_error() || node.is_missing() {
        let pos = node.start_position();
        let message = if node.is_missing() {
            format!("expected '{}'", node.kind())
        } else {
            "syntax error".to_string()
        };
        out.push(Diagnostic::new(
            Severity::Error,
            message,
            path,
            pos.row as u32 + 1,
            pos.column as u32 + 1,
        ));
        return;
    }
    if !node.has_error() {
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_errors(path, child, out);
    }
}
