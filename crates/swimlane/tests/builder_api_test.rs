//! Integration tests for the DiagramBuilder API
//!
//! These tests drive the TOML front door: parse, resolve, render, serialize.

use swimlane::{DiagramBuilder, SwimlaneError, config::AppConfig, positioned::PositionedModel};

const ORDER_PROCESS: &str = r#"
[[pool]]
id = "shop"
name = "Shop"
lanes = ["sales", "warehouse"]

[[lane]]
id = "sales"
pool = "shop"
name = "Sales"

[[lane]]
id = "warehouse"
pool = "shop"
name = "Warehouse"

[[node]]
id = "received"
kind = "start_event"
lane = "sales"

[[node]]
id = "check_stock"
kind = "task"
lane = "warehouse"

[[node]]
id = "in_stock"
kind = "exclusive_gateway"
lane = "warehouse"

[[node]]
id = "ship"
kind = "task"
lane = "warehouse"

[[node]]
id = "done"
kind = "end_event"
lane = "sales"

[[edge]]
id = "f1"
source = "received"
target = "check_stock"

[[edge]]
id = "f2"
source = "check_stock"
target = "in_stock"

[[edge]]
id = "f3"
source = "in_stock"
target = "ship"

[[edge]]
id = "f4"
source = "ship"
target = "done"
"#;

#[test]
fn test_parse_simple_model() {
    let builder = DiagramBuilder::new(AppConfig::default());

    let model = builder.parse(ORDER_PROCESS);

    let model = model.expect("Should parse valid model");
    assert_eq!(model.pools().len(), 1);
    assert_eq!(model.lanes().len(), 2);
    assert_eq!(model.nodes().len(), 5);
    assert_eq!(model.edges().len(), 4);
}

#[test]
fn test_render_simple_model() {
    let builder = DiagramBuilder::default();
    let model = builder.parse(ORDER_PROCESS).unwrap();
    let positioned = builder.resolve(&model).unwrap();

    let svg = builder.render_svg(&positioned).expect("Failed to render");

    assert!(svg.contains("<svg"), "Output should contain SVG tag");
    assert!(svg.contains("</svg>"), "Output should be complete SVG");
    assert!(svg.contains("Warehouse"));
}

#[test]
fn test_positioned_toml_round_trips() {
    let builder = DiagramBuilder::default();
    let model = builder.parse(ORDER_PROCESS).unwrap();
    let positioned = builder.resolve(&model).unwrap();

    let output = builder.to_toml(&positioned).expect("Failed to serialize");
    let reparsed: PositionedModel = toml::from_str(&output).expect("Failed to read back");

    assert!(output.contains("crosses_boundary"));
    assert_eq!(reparsed, positioned);
}

#[test]
fn test_parse_invalid_syntax_returns_error() {
    let builder = DiagramBuilder::default();

    let result = builder.parse("[[node]]\nid = ");

    assert!(matches!(result, Err(SwimlaneError::Input { .. })));
}

#[test]
fn test_unknown_node_kind_returns_error() {
    let builder = DiagramBuilder::default();

    let result = builder.parse("[[node]]\nid = \"a\"\nkind = \"rocket\"\n");

    match result {
        Err(SwimlaneError::Input { err, src }) => {
            assert!(err.span().is_some());
            assert!(src.contains("rocket"));
        }
        other => panic!("expected an input error, got {other:?}"),
    }
}

#[test]
fn test_resolve_reports_malformed_graph() {
    let builder = DiagramBuilder::default();
    let model = builder
        .parse("[[lane]]\nid = \"orphan\"\npool = \"missing\"\n")
        .unwrap();

    let result = builder.resolve(&model);

    assert!(matches!(
        result,
        Err(SwimlaneError::MalformedGraph { id, .. }) if id == "orphan"
    ));
}

#[test]
fn test_builder_with_sugiyama_engine() {
    let config: AppConfig = toml::from_str("[layout]\nengine = \"sugiyama\"\n").unwrap();
    let builder = DiagramBuilder::new(config);
    let model = builder.parse(ORDER_PROCESS).unwrap();

    let positioned = builder.resolve(&model).unwrap();

    let received = positioned.node("received".into()).unwrap();
    let done = positioned.node("done".into()).unwrap();
    assert!(received.bounds.max_x() < done.bounds.min_x());
    assert_eq!(positioned.node("done".into()).unwrap().rank, 4);
}

#[test]
fn test_declined_sugiyama_layout_is_not_a_warning() {
    let config: AppConfig = toml::from_str("[layout]\nengine = \"sugiyama\"\n").unwrap();
    let builder = DiagramBuilder::new(config);
    // Only message flows: the layered layout has nothing to rank and declines.
    let model = builder
        .parse(
            r#"
[[pool]]
id = "a"

[[pool]]
id = "b"

[[node]]
id = "ask"
kind = "task"
pool = "a"

[[node]]
id = "answer"
kind = "task"
pool = "b"

[[edge]]
id = "m1"
source = "ask"
target = "answer"
kind = "message_flow"
"#,
        )
        .unwrap();

    let positioned = builder.resolve(&model).unwrap();

    assert!(positioned.warnings().is_empty());
    assert!(positioned.nodes().iter().all(|node| !node.needs_review));
}
