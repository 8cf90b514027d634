//! Export of a model for downstream code generators.
//!
//! - **JSON**: a nested, id-free document rooted at the global namespace

pub mod json;

pub use json::{export_json, model_to_json};

use crate::error::Result;
use crate::model::EntityModel;

impl EntityModel {
    /// Export the model as pretty-printed JSON.
    pub fn export_json(&self) -> Result<String> {
        export_json(self)
    }
}
