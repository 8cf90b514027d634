//! C++ front end for declgraph
//!
//! Parses C++ headers with tree-sitter-cpp and lowers the syntax tree into
//! a front-end [`TranslationUnit`](declgraph_frontend_api::TranslationUnit):
//! namespaces, classes and templates, members, enums with their values,
//! aliases and free functions, with access levels, declaration traits and
//! spelled types. [`CppExtractor`] runs the unit through the extractor to
//! get an [`EntityModel`](declgraph::EntityModel).
//!
//! # Example
//!
//! ```rust
//! use declgraph_cpp::CppExtractor;
//! use std::path::Path;
//!
//! let source = r#"
//!     namespace geo {
//!     struct [[reflect::name("point")]] Point {
//!         double x;
//!         double y;
//!     };
//!     }
//! "#;
//!
//! let extractor = CppExtractor::new();
//! let model = extractor.extract_source(source, Path::new("point.hpp")).unwrap();
//! let point = model.class_by_name("geo::Point").unwrap();
//! assert_eq!(point.members.len(), 2);
//! assert_eq!(point.attributes[0].to_string(), "reflect::name(\"point\")");
//! ```

#![deny(unsafe_code)]

mod eval;
mod extractor;
mod frontend;
mod lexer;
mod lower;
mod options;
mod types;

pub use extractor::CppExtractor;
pub use frontend::TreeSitterFrontEnd;
pub use options::{FlagError, LanguageStandard, ParseOptions};
