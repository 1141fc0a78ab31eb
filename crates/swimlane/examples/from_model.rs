//! Example: Resolving positions for a model built in code
//!
//! This example demonstrates the basic workflow of:
//! 1. Building a ModelGraph with the builder API
//! 2. Resolving it with a DiagramBuilder using default configuration
//! 3. Inspecting the positioned model and rendering it to SVG

use swimlane::{
    DiagramBuilder,
    identifier::Id,
    model::{Edge, EdgeKind, Lane, ModelGraph, Node, NodeKind, Pool},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Two pools: a customer with one lane, a bakery with two
    let model = ModelGraph::new()
        .with_pool(Pool::new("customer").with_name("Customer"))
        .with_pool(
            Pool::new("bakery")
                .with_name("Bakery")
                .with_lanes([Id::new("counter"), Id::new("oven")]),
        )
        .with_lane(Lane::new("counter", "bakery").with_name("Counter"))
        .with_lane(Lane::new("oven", "bakery").with_name("Oven"))
        .with_node(Node::new("hungry", NodeKind::StartEvent).with_pool("customer"))
        .with_node(Node::new("order", NodeKind::Task).with_pool("customer"))
        .with_node(Node::new("take_order", NodeKind::StartEvent).with_lane("counter"))
        .with_node(Node::new("bake", NodeKind::Task).with_lane("oven"))
        .with_node(Node::new("burnt", NodeKind::BoundaryEvent).with_attached_host("bake"))
        .with_node(Node::new("serve", NodeKind::Task).with_lane("counter"))
        .with_node(Node::new("served", NodeKind::EndEvent).with_lane("counter"))
        .with_edge(Edge::new("c1", "hungry", "order"))
        .with_edge(Edge::new("m1", "order", "take_order").with_kind(EdgeKind::MessageFlow))
        .with_edge(Edge::new("b1", "take_order", "bake"))
        .with_edge(Edge::new("b2", "bake", "serve"))
        .with_edge(Edge::new("b3", "burnt", "serve"))
        .with_edge(Edge::new("b4", "serve", "served"));

    let builder = DiagramBuilder::default();

    println!("Resolving positions...");
    let positioned = builder.resolve(&model)?;

    for node in positioned.nodes() {
        println!(
            "{:<12} rank {} at ({:.0}, {:.0})",
            node.id.to_string(),
            node.rank,
            node.bounds.min_x(),
            node.bounds.min_y()
        );
    }
    for warning in positioned.warnings() {
        println!("warning: {warning}");
    }

    println!("\nRendering to SVG...");
    let svg = builder.render_svg(&positioned)?;
    println!("SVG length: {} bytes", svg.len());

    let output_path = "from_model_output.svg";
    std::fs::write(output_path, &svg)?;
    println!("SVG written to: {}", output_path);

    Ok(())
}
