//! declgraph front-end API
//!
//! The boundary between a C++ compiler front end and the declaration
//! extractor. A front end parses one file into a [`TranslationUnit`]; the
//! extractor only ever reads the unit through [`Cursor`] handles.
//!
//! - **FrontEnd trait**: parse a file with compile flags
//! - **Cursors**: kind, spelling, access, children, arguments, tokens
//! - **Types**: spelling, declaration, template arguments
//! - **Diagnostics**: severity-tagged messages with file context
//! - **TranslationUnitBuilder**: the only way to assemble a unit, used by
//!   backends and by tests that need synthetic units

#![deny(unsafe_code)]

pub mod cursor;
pub mod diagnostic;
pub mod errors;
pub mod frontend;
pub mod location;
pub mod token;
pub mod types;
pub mod unit;

pub use cursor::{Access, Cursor, CursorData, CursorId, CursorKind, DeclTraits};
pub use diagnostic::{Diagnostic, Severity};
pub use errors::{FrontEndError, FrontEndResult};
pub use frontend::FrontEnd;
pub use location::{FileId, SourceLocation, SourceRange};
pub use token::{Token, TokenKind};
pub use types::{placeholder, TypeKind, TypeRef};
pub use unit::{TranslationUnit, TranslationUnitBuilder};
