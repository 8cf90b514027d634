//! declgraph extractor
//!
//! Walks a front-end [`TranslationUnit`](declgraph_frontend_api::TranslationUnit)
//! and builds the [`EntityModel`](declgraph::EntityModel) of its main file.
//!
//! - **Tokens**: declaration token windows with corrected extents
//! - **Attributes**: `[[scope::name(args)]]` lists
//! - **Classifiers**: one per declaration kind, with access filtering
//! - **Resolver**: namespace merging, nested classes, base instantiation
//! - **Session**: compile flags, diagnostics, caching and parallel runs
//!
//! # Example
//!
//! ```rust
//! use declgraph_extract::resolve;
//! use declgraph_frontend_api::{Access, CursorData, CursorKind, TranslationUnitBuilder, TypeRef};
//!
//! let mut unit = TranslationUnitBuilder::new("point.hpp");
//! let root = unit.root();
//! let ns = unit.push(root, CursorData::new(CursorKind::Namespace, "geo"));
//! let point = unit.push(ns, CursorData::new(CursorKind::StructDecl, "Point"));
//! unit.push(
//!     point,
//!     CursorData::new(CursorKind::FieldDecl, "x")
//!         .with_access(Access::Public)
//!         .with_type(TypeRef::builtin("int")),
//! );
//! let unit = unit.build();
//!
//! let model = resolve(&unit);
//! let point = model.class_by_name("geo::Point").unwrap();
//! assert_eq!(point.members[0].type_name, "int");
//! ```

#![deny(unsafe_code)]

pub mod attributes;
pub mod classify;
pub mod compile_db;
pub mod config;
pub mod errors;
pub mod flags;
pub mod qualify;
pub mod resolver;
pub mod session;
pub mod specialization;
pub(crate) mod text;
pub mod tokens;

#[cfg(test)]
mod testing;

pub use attributes::{parse_attributes, scan_attributes};
pub use compile_db::CompileDatabase;
pub use config::ExtractConfig;
pub use errors::{AttributeError, ExtractError, ExtractResult};
pub use flags::normalize_flags;
pub use resolver::{resolve, Resolver};
pub use session::{ProjectExtraction, Session};
pub use tokens::{TokenSpan, TokenWalker};
