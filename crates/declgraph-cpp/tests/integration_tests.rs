//! Integration tests for the C++ extractor

use declgraph::{Access, ConstructorKind, EntityModel};
use declgraph_cpp::{CppExtractor, TreeSitterFrontEnd};
use declgraph_extract::{ExtractConfig, ExtractError};
use declgraph_frontend_api::FrontEnd;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const EXAMPLE_HPP: &str = include_str!("fixtures/example.hpp");
const TEST_HPP: &str = include_str!("fixtures/test.hpp");
const CLASSES_HPP: &str = include_str!("fixtures/classes.hpp");

fn extract(source: &str, name: &str) -> EntityModel {
    let extractor = CppExtractor::with_config(ExtractConfig::sequential());
    let result = extractor.extract_source(source, Path::new(name));
    assert!(result.is_ok(), "Failed to extract {}: {:?}", name, result.err());
    result.unwrap()
}

fn method_overloads<'m>(model: &'m EntityModel, class: &str, method: &str) -> Vec<&'m declgraph::ClassMethod> {
    let class = model.class_by_name(class).unwrap();
    class
        .methods
        .get(method)
        .map(|ids| ids.iter().map(|&id| &model[id]).collect())
        .unwrap_or_default()
}

#[test]
fn test_example_class() {
    let model = extract(EXAMPLE_HPP, "example.hpp");
    let class = model.class_by_name("example").unwrap();

    assert_eq!(class.attributes.len(), 1);
    assert_eq!(class.attributes[0].to_string(), "my::attrib(1, \"2\", 3.0)");
    assert!(!class.is_template);
    assert!(!class.is_abstract);

    let method1 = method_overloads(&model, "example", "method1");
    assert_eq!(method1.len(), 2);
    assert_eq!(method1[0].param_types, vec!["std::string_view"]);
    assert!(method1[0].is_const);
    assert!(method1[0].is_noexcept);
    assert_eq!(method1[1].param_types, vec!["const std::string &"]);
    assert!(!method1[1].is_const);

    let method2 = method_overloads(&model, "example", "method2");
    assert_eq!(method2[0].result_type, "std::tuple<int, float, char>");
    assert!(method2[0].param_types.is_empty());

    let test_val = method_overloads(&model, "example", "testVal");
    assert!(test_val[0].is_static);
    assert!(test_val[0].is_noexcept);
    assert_eq!(test_val[0].result_type, "float");
}

#[test]
fn test_example_members_use_qualified_types() {
    let model = extract(EXAMPLE_HPP, "example.hpp");
    let class = model.class_by_name("example").unwrap();

    assert_eq!(class.members.len(), 2);
    assert_eq!(class.member("member1").unwrap().type_name, "std::string_view");
    assert_eq!(class.member("member2").unwrap().type_name, "ns::Vector<std::string>");
}

#[test]
fn test_example_enum_and_function() {
    let model = extract(EXAMPLE_HPP, "example.hpp");
    let global = model.global();

    let id = global.enums["example_enum"];
    let info = &model[id];
    assert!(info.is_scoped);
    let values: Vec<u64> = info.values.iter().map(|v| v.value).collect();
    assert_eq!(values, vec![69, 420, 1337]);

    let functions = &global.functions["example_fn"];
    assert_eq!(functions.len(), 1);
    assert_eq!(model[functions[0]].result_type, "example_enum");

    assert!(model.namespace_by_name("ns").is_some());
}

#[test]
fn test_aliases_resolve_through_using_directives() {
    let model = extract(TEST_HPP, "test.hpp");
    let global = model.global();

    assert_eq!(model[global.aliases["Using"]].aliased, "test::ClassNS");
    assert_eq!(model[global.aliases["Typedef"]].aliased, "test::ClassNS");
}

#[test]
fn test_enum_values_continue_after_initializers() {
    let model = extract(TEST_HPP, "test.hpp");
    let info = &model[model.global().enums["TestEnum"]];

    assert!(info.is_scoped);
    assert_eq!(info.attributes[0].to_string(), "special_enum");
    let values: Vec<(&str, u64)> = info.values.iter().map(|v| (v.name.as_str(), v.value)).collect();
    assert_eq!(
        values,
        vec![("_0", 0), ("_1", 420), ("_2", 421), ("a", 422), ("b", 69), ("c", 70), ("count", 71)]
    );
}

#[test]
fn test_namespaced_class() {
    let model = extract(TEST_HPP, "test.hpp");
    let class = model.class_by_name("test::ClassNS").unwrap();

    assert_eq!(class.ctors.len(), 1);
    let ctor = &model[class.ctors[0]];
    assert_eq!(ctor.constructor_kind, ConstructorKind::Converting);
    assert_eq!(ctor.param_types, vec!["std::string_view"]);

    let member2 = method_overloads(&model, "test::ClassNS", "member2");
    assert_eq!(member2[0].param_names, vec!["a", "b"]);
    assert_eq!(member2[0].param_types, vec!["float", "float"]);
}

#[test]
fn test_public_bases_only() {
    let model = extract(TEST_HPP, "test.hpp");
    let derived = model.class_by_name("Derived").unwrap();

    assert_eq!(derived.bases.len(), 1);
    assert_eq!(derived.bases[0].type_name, "Base");
    assert_eq!(derived.bases[0].access, Access::Public);
    assert_eq!(derived.bases[0].class, model.find_class("Base"));

    let base = model.class_by_name("Base").unwrap();
    let dtor = &model[base.dtor.unwrap()];
    assert!(dtor.is_virtual);
}

#[test]
fn test_class_template() {
    let model = extract(TEST_HPP, "test.hpp");
    let class = model.class_by_name("TemplateClass").unwrap();

    assert!(class.is_template);
    assert!(!class.is_specialization);
    assert_eq!(class.template_params.len(), 1);
    assert_eq!(class.template_params[0].name, "T");

    // The constructor template and the deleted assignment are not recorded
    assert_eq!(class.ctors.len(), 1);
    assert_eq!(model[class.ctors[0]].constructor_kind, ConstructorKind::Default);
    assert!(!class.methods.contains_key("operator="));
    assert!(!class.methods.contains_key("set_value"));
    assert!(class.members.is_empty());

    let value = method_overloads(&model, "TemplateClass", "value");
    assert_eq!(value[0].result_type, "const T &");
    assert!(value[0].is_const);

    let ptr = method_overloads(&model, "TemplateClass", "ptr");
    assert_eq!(ptr[0].result_type, "typename pointer");
}

#[test]
fn test_variadic_base_is_not_instantiated() {
    let model = extract(TEST_HPP, "test.hpp");
    let helper = model.class_by_name("detail::DerivedTemplateHelper").unwrap();

    assert!(helper.is_template);
    assert!(helper.template_params[0].is_variadic);
    assert_eq!(helper.bases.len(), 1);
    assert!(helper.bases[0].is_variadic);
    assert!(helper.bases[0].class.is_none());
}

#[test]
fn test_base_template_is_instantiated() {
    let model = extract(TEST_HPP, "test.hpp");
    let derived = model.class_by_name("test::DerivedTemplate").unwrap();

    assert_eq!(derived.bases.len(), 1);
    assert_eq!(derived.bases[0].type_name, "TemplateClass<std::string_view>");
    let instance_id = derived.bases[0].class.unwrap();
    assert_eq!(model.find_class("TemplateClass<std::string_view>"), Some(instance_id));

    let instance = &model[instance_id];
    assert!(instance.is_specialization);
    assert!(!instance.is_template);
    assert_eq!(instance.template_args, vec!["std::string_view"]);
    let value = method_overloads(&model, "TemplateClass<std::string_view>", "value");
    assert_eq!(value[0].result_type, "const std::string_view &");
}

#[test]
fn test_attributes_on_classes_and_functions() {
    let model = extract(TEST_HPP, "test.hpp");

    let attrib = model.class_by_name("ClassAttrib").unwrap();
    assert!(attrib.has_attribute("test", "attrib"));
    assert_eq!(attrib.ctors.len(), 1);
    assert!(model[attrib.ctors[0]].is_noexcept);
    assert!(attrib.dtor.is_some());

    // The definition wins over the forward declaration
    let predefined = model.class_by_name("Predefined").unwrap();
    assert!(predefined.has_attribute("test", "predefined"));

    let free_fn = &model[model.global().functions["freeFn"][0]];
    assert_eq!(free_fn.attributes[0].to_string(), "other::attrib(with, \"args\")");
    assert_eq!(free_fn.param_names, vec!["a", "b"]);
    assert_eq!(free_fn.param_types, vec!["int", "Plain"]);
    assert_eq!(free_fn.result_type, "void");
}

#[test]
fn test_operator_function() {
    let model = extract(TEST_HPP, "test.hpp");
    let overloads = &model.global().functions["operator>"];

    assert_eq!(overloads.len(), 1);
    let op = &model[overloads[0]];
    assert_eq!(op.result_type, "bool");
    assert_eq!(op.param_types, vec!["TemplateClass<int>", "TemplateClass<int>"]);
}

#[test]
fn test_plain_members_and_methods() {
    let model = extract(TEST_HPP, "test.hpp");
    let plain = model.class_by_name("Plain").unwrap();

    let members: Vec<(&str, &str)> = plain
        .members
        .iter()
        .map(|m| (m.name.as_str(), m.type_name.as_str()))
        .collect();
    assert_eq!(members, vec![("m_0", "int"), ("m_1", "float")]);

    let f_0 = method_overloads(&model, "Plain", "f_0");
    assert_eq!(f_0[0].result_type, "std::string_view");
    assert_eq!(f_0[0].param_types, vec!["std::string &"]);
    assert!(f_0[0].is_const);
    assert!(f_0[0].is_noexcept);
}

#[test]
fn test_constructor_kinds() {
    let model = extract(CLASSES_HPP, "classes.hpp");
    let widget = model.class_by_name("geometry::shapes::Widget").unwrap();

    let kinds: Vec<ConstructorKind> = widget
        .ctors
        .iter()
        .map(|&id| model[id].constructor_kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            ConstructorKind::Default,
            ConstructorKind::Copy,
            ConstructorKind::Move,
            ConstructorKind::Generic,
            ConstructorKind::Converting,
            ConstructorKind::Generic,
        ]
    );
    assert!(model[widget.ctors[2]].is_noexcept);
    assert_eq!(model[widget.ctors[1]].param_types, vec!["const Widget &"]);

    let assign = method_overloads(&model, "geometry::shapes::Widget", "operator=");
    assert_eq!(assign.len(), 1);
    assert!(assign[0].is_defaulted);
}

#[test]
fn test_abstract_class() {
    let model = extract(CLASSES_HPP, "classes.hpp");
    let shape = model.class_by_name("geometry::shapes::Shape").unwrap();

    assert!(shape.is_abstract);
    let area = method_overloads(&model, "geometry::shapes::Shape", "area");
    assert!(area[0].is_pure_virtual);
    assert!(area[0].is_virtual);
    assert!(area[0].is_const);
    assert_eq!(area[0].result_type, "double");

    let dtor = &model[shape.dtor.unwrap()];
    assert!(dtor.is_virtual);
    assert!(dtor.is_noexcept);
}

#[test]
fn test_only_public_instance_members() {
    let model = extract(CLASSES_HPP, "classes.hpp");
    let counter = model.class_by_name("geometry::shapes::Counter").unwrap();

    let names: Vec<&str> = counter.members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["value"]);
}

#[test]
fn test_nested_class() {
    let model = extract(CLASSES_HPP, "classes.hpp");
    let outer = model.class_by_name("geometry::shapes::Outer").unwrap();

    assert!(outer.classes.contains_key("geometry::shapes::Outer::Inner"));
    assert_eq!(
        outer.member("inner").unwrap().type_name,
        "geometry::shapes::Outer::Inner"
    );
    let inner = model.class_by_name("geometry::shapes::Outer::Inner").unwrap();
    assert_eq!(inner.members.len(), 1);
}

#[test]
fn test_nested_namespace_definition() {
    let model = extract(CLASSES_HPP, "classes.hpp");

    assert!(model.namespace_by_name("geometry").is_some());
    let shapes = model.namespace_by_name("geometry::shapes").unwrap();
    assert!(shapes.classes.contains_key("geometry::shapes::Shape"));
}

#[test]
fn test_anonymous_namespace_and_linkage_blocks_are_transparent() {
    let model = extract(CLASSES_HPP, "classes.hpp");
    let global = model.global();

    assert!(global.classes.contains_key("Hidden"));
    assert_eq!(model[global.functions["c_api"][0]].param_types, vec!["int"]);
}

#[test]
fn test_free_functions() {
    let model = extract(CLASSES_HPP, "classes.hpp");
    let global = model.global();

    // Declaration and definition fold into one entry
    assert_eq!(global.functions["add"].len(), 1);
    assert_eq!(model[global.functions["twice"][0]].result_type, "long");
}

#[test]
fn test_typedef_of_anonymous_struct() {
    let model = extract(CLASSES_HPP, "classes.hpp");
    let anon = model.class_by_name("Anon").unwrap();

    assert_eq!(anon.members.len(), 1);
    assert_eq!(anon.members[0].name, "x");
}

#[test]
fn test_unscoped_enums() {
    let model = extract(CLASSES_HPP, "classes.hpp");
    let global = model.global();

    let flags = &model[global.enums["Flags"]];
    assert!(!flags.is_scoped);
    assert_eq!(flags.value_of("Read"), Some(1));
    assert_eq!(flags.value_of("Write"), Some(2));
    assert_eq!(flags.value_of("All"), Some(3));

    let negative = &model[global.enums["Negative"]];
    assert_eq!(negative.value_of("Minus"), Some(u64::MAX));

    let unnamed = global
        .enums
        .iter()
        .find(|(name, _)| name.starts_with("(anonymous enum at "))
        .map(|(_, &id)| &model[id])
        .unwrap();
    assert_eq!(unnamed.value_of("Unnamed2"), Some(1));
}

#[test]
fn test_specializations() {
    let model = extract(CLASSES_HPP, "classes.hpp");

    let primary = model.class_by_name("Box").unwrap();
    assert!(primary.is_template);
    assert!(!primary.is_specialization);

    let explicit = model.class_by_name("Box<int>").unwrap();
    assert!(explicit.is_specialization);
    assert!(!explicit.is_template);
    assert_eq!(explicit.members[0].name, "raw");

    let partial: Vec<_> = model
        .global()
        .classes
        .values()
        .map(|&id| &model[id])
        .filter(|c| c.is_template && c.is_specialization)
        .collect();
    assert_eq!(partial.len(), 1);
    assert_eq!(partial[0].members[0].name, "ptr");

    assert_eq!(model[model.global().aliases["IntBox"]].aliased, "Box<int>");
}

#[test]
fn test_export_json() {
    let model = extract(EXAMPLE_HPP, "example.hpp");
    let json = model.export_json().unwrap();

    assert!(json.contains("example_enum"));
    assert!(json.contains("method2"));
}

#[test]
fn test_syntax_errors_fail_extraction() {
    let extractor = CppExtractor::with_config(ExtractConfig::sequential());
    let err = extractor
        .extract_source("namespace broken { class X { int a }", Path::new("broken.hpp"))
        .unwrap_err();

    match err {
        ExtractError::CompileErrors { diagnostics, .. } => assert!(!diagnostics.is_empty()),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_extract_all_collects_failures() {
    let dir = TempDir::new().unwrap();
    let good = dir.path().join("good.hpp");
    let bad = dir.path().join("bad.hpp");
    fs::write(&good, EXAMPLE_HPP).unwrap();
    fs::write(&bad, "struct Bad {").unwrap();

    let extractor = CppExtractor::new();
    let project = extractor
        .extract_all(&[good.clone(), bad.clone(), good.clone()])
        .unwrap();

    assert_eq!(project.files.len(), 1);
    assert_eq!(project.failed_files.len(), 1);
    assert!(!project.is_success());
    assert!(project.files[0].1.class_by_name("example").is_some());
}

#[test]
fn test_build_dir_flags() {
    let dir = TempDir::new().unwrap();
    let include = dir.path().join("include");
    fs::create_dir(&include).unwrap();
    fs::write(include.join("dep.hpp"), "struct Dep {};").unwrap();
    let header = dir.path().join("main.hpp");
    fs::write(&header, "#include <dep.hpp>\nstruct Main { int id; };").unwrap();

    let commands = serde_json::json!([{
        "directory": dir.path(),
        "file": "main.cpp",
        "arguments": [
            "c++",
            "-std=c++20",
            format!("-I{}", include.display()),
            "-DWITH_DEP",
            "-c",
            "main.cpp"
        ]
    }]);
    fs::write(dir.path().join("compile_commands.json"), commands.to_string()).unwrap();

    let extractor = CppExtractor::new().open_build_dir(dir.path()).unwrap();
    let flags = extractor.session().flags_for(&header);
    assert!(flags.contains(&format!("-I{}", include.display())));

    let model = extractor.extract(&header).unwrap();
    assert_eq!(model.class_by_name("Main").unwrap().members.len(), 1);
}

#[test]
fn test_front_end_resolves_includes() {
    let dir = TempDir::new().unwrap();
    let include = dir.path().join("include");
    fs::create_dir(&include).unwrap();
    fs::write(dir.path().join("local.hpp"), "").unwrap();
    fs::write(include.join("system.hpp"), "").unwrap();

    let main = dir.path().join("main.hpp");
    let source = "#include \"local.hpp\"\n#include <system.hpp>\n#include <missing.hpp>\n";
    let flags = vec![format!("-I{}", include.display())];
    let unit = TreeSitterFrontEnd::new()
        .parse_source(source, &main, &flags)
        .unwrap();

    assert_eq!(unit.files().len(), 3);
    assert_eq!(unit.files()[1], dir.path().join("local.hpp"));
    assert_eq!(unit.files()[2], include.join("system.hpp"));
    assert_eq!(unit.root().children().count(), 3);
}
