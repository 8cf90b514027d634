//! Nested JSON export for code generators.
//!
//! Ids are resolved, so the document is self-contained: every namespace
//! carries its classes (with constructors, destructor, methods, members and
//! nested classes inlined), enums, functions, aliases and child namespaces.

use crate::entities::{ClassInfo, NamespaceInfo};
use crate::error::Result;
use crate::model::EntityModel;
use crate::store::ClassId;
use serde_json::{json, Value};

/// Export the model rooted at the global namespace.
pub fn export_json(model: &EntityModel) -> Result<String> {
    let doc = model_to_json(model);
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Build the JSON value without serializing it.
pub fn model_to_json(model: &EntityModel) -> Value {
    json!({
        "source": model.source().display().to_string(),
        "global": namespace_to_json(model, model.global()),
    })
}

fn namespace_to_json(model: &EntityModel, ns: &NamespaceInfo) -> Value {
    let functions: Vec<Value> = ns
        .functions
        .values()
        .flatten()
        .map(|&id| json!(model[id]))
        .collect();
    let enums: Vec<Value> = ns.enums.values().map(|&id| json!(model[id])).collect();
    let aliases: Vec<Value> = ns.aliases.values().map(|&id| json!(model[id])).collect();
    let classes: Vec<Value> = ns
        .classes
        .values()
        .map(|&id| class_to_json(model, id))
        .collect();
    let namespaces: Vec<Value> = ns
        .namespaces
        .values()
        .map(|&id| namespace_to_json(model, &model[id]))
        .collect();

    json!({
        "name": ns.name,
        "functions": functions,
        "enums": enums,
        "aliases": aliases,
        "classes": classes,
        "namespaces": namespaces,
    })
}

fn class_to_json(model: &EntityModel, id: ClassId) -> Value {
    let class: &ClassInfo = &model[id];

    let ctors: Vec<Value> = class.ctors.iter().map(|&c| json!(model[c])).collect();
    let dtor = class.dtor.map(|d| json!(model[d]));
    let methods: Vec<Value> = class
        .methods
        .values()
        .flatten()
        .map(|&m| json!(model[m]))
        .collect();
    let bases: Vec<Value> = class
        .bases
        .iter()
        .map(|base| {
            json!({
                "type_name": base.type_name,
                "access": base.access,
                "is_variadic": base.is_variadic,
                "resolved": base.class.map(|c| model[c].name.clone()),
            })
        })
        .collect();
    let nested: Vec<Value> = class
        .classes
        .values()
        .map(|&c| class_to_json(model, c))
        .collect();

    json!({
        "name": class.name,
        "is_abstract": class.is_abstract,
        "is_template": class.is_template,
        "is_specialization": class.is_specialization,
        "template_params": class.template_params,
        "template_args": class.template_args,
        "attributes": class.attributes,
        "bases": bases,
        "ctors": ctors,
        "dtor": dtor,
        "methods": methods,
        "members": class.members,
        "classes": nested,
    })
}
