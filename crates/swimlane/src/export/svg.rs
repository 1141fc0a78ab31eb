//! SVG preview of a positioned model.
//!
//! The preview draws pools and lanes as bands, activities as rounded
//! rectangles, events as circles and gateways as diamonds. Edges are drawn
//! as polylines through their waypoints. Nodes flagged for review get a
//! dashed outline in the review color.

use std::io::Write;

use log::{debug, error, info};
use svg::{Document, node::element as svg_element};

use swimlane_core::{
    geometry::{Bounds, Point, Size},
    identifier::Id,
    model::{EdgeKind, NodeKind},
    positioned::{PositionedEdge, PositionedModel, PositionedNode},
};

use crate::{config::StyleConfig, export};

const MARGIN: f32 = 50.0;
const SEQUENCE_MARKER: &str = "sequence-arrow";
const MESSAGE_MARKER: &str = "message-arrow";
const FONT_SIZE: f32 = 12.0;

/// Builder for [`Svg`] exporters.
pub struct SvgBuilder<W> {
    writer: W,
    style: StyleConfig,
}

impl<W: Write> SvgBuilder<W> {
    /// Creates a builder whose exporter writes into `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            style: StyleConfig::default(),
        }
    }

    pub fn with_style(mut self, style: &StyleConfig) -> Self {
        self.style = style.clone();
        self
    }

    pub fn build(self) -> Svg<W> {
        Svg {
            writer: self.writer,
            style: self.style,
        }
    }
}

/// SVG exporter writing one document per exported model.
pub struct Svg<W> {
    writer: W,
    style: StyleConfig,
}

impl<W: Write> Svg<W> {
    /// Renders `model` into an SVG document sized to its content.
    pub fn render_positioned_model(&self, model: &PositionedModel) -> Document {
        let content_bounds = model.diagram_bounds().unwrap_or_default();
        let svg_size = self.calculate_svg_dimensions(content_bounds.to_size());

        let mut doc = Document::new()
            .set(
                "viewBox",
                format!("0 0 {} {}", svg_size.width(), svg_size.height()),
            )
            .set("width", svg_size.width())
            .set("height", svg_size.height());

        if let Some(color) = self.style.background_color() {
            doc = doc.add(
                svg_element::Rectangle::new()
                    .set("width", "100%")
                    .set("height", "100%")
                    .set("fill", color),
            );
        }
        doc = doc.add(self.marker_definitions());

        let mut main_group = svg_element::Group::new().set(
            "transform",
            format!(
                "translate({}, {})",
                MARGIN - content_bounds.min_x(),
                MARGIN - content_bounds.min_y()
            ),
        );

        for pool in model.pools() {
            let header = pool
                .lanes
                .iter()
                .filter_map(|lane| model.lane(*lane))
                .map(|lane| lane.bounds.min_x())
                .fold(pool.bounds.max_x(), f32::min);
            main_group = main_group.add(self.render_pool(pool.bounds, header, pool.id, pool.name.as_deref()));
        }
        for lane in model.lanes() {
            main_group = main_group.add(self.render_lane(lane.bounds, lane.id, lane.name.as_deref()));
        }

        // Containers first so their interiors are drawn on top.
        let (containers, others): (Vec<&PositionedNode>, Vec<&PositionedNode>) = model
            .nodes()
            .iter()
            .partition(|node| node.kind.is_container());
        for node in containers.into_iter().chain(others) {
            main_group = main_group.add(self.render_node(node));
        }

        for edge in model.edges() {
            if let Some(line) = self.render_edge(edge) {
                main_group = main_group.add(line);
            }
        }

        doc.add(main_group)
    }

    /// Consumes the exporter and returns its writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Adds a margin on every side of `content_size`.
    fn calculate_svg_dimensions(&self, content_size: Size) -> Size {
        let width = MARGIN.mul_add(2.0, content_size.width());
        let height = MARGIN.mul_add(2.0, content_size.height());

        debug!("Final SVG dimensions: {width}x{height}");

        Size::new(width, height)
    }

    fn write_document(&mut self, doc: &Document) -> Result<(), export::Error> {
        info!("Writing SVG document");
        if let Err(err) = write!(self.writer, "{doc}") {
            error!(err:err; "Failed to write SVG content");
            return Err(export::Error::Io(err));
        }
        Ok(())
    }

    fn marker_definitions(&self) -> svg_element::Definitions {
        let marker = |id: &str, fill: &str| {
            svg_element::Marker::new()
                .set("id", id)
                .set("viewBox", "0 0 10 10")
                .set("refX", 9)
                .set("refY", 5)
                .set("markerWidth", 6)
                .set("markerHeight", 6)
                .set("orient", "auto")
                .add(
                    svg_element::Path::new()
                        .set("d", "M 0 0 L 10 5 L 0 10 z")
                        .set("fill", fill)
                        .set("stroke", self.style.stroke_color()),
                )
        };

        svg_element::Definitions::new()
            .add(marker(SEQUENCE_MARKER, self.style.stroke_color()))
            .add(marker(MESSAGE_MARKER, "white"))
    }

    fn render_pool(&self, bounds: Bounds, header: f32, id: Id, name: Option<&str>) -> svg_element::Group {
        let mut group = svg_element::Group::new()
            .set("class", "pool")
            .add(self.outline(bounds).set("fill", "none"))
            .add(
                svg_element::Line::new()
                    .set("x1", header)
                    .set("y1", bounds.min_y())
                    .set("x2", header)
                    .set("y2", bounds.max_y())
                    .set("stroke", self.style.stroke_color()),
            );

        if let Some(text) = display_name(id, name) {
            let center = Point::new((bounds.min_x() + header) / 2.0, bounds.center().y());
            group = group.add(label(&text, center).set(
                "transform",
                format!("rotate(-90, {}, {})", center.x(), center.y()),
            ));
        }
        group
    }

    fn render_lane(&self, bounds: Bounds, id: Id, name: Option<&str>) -> svg_element::Group {
        let mut group = svg_element::Group::new()
            .set("class", "lane")
            .add(self.outline(bounds).set("fill", "none"));

        if let Some(text) = display_name(id, name) {
            group = group.add(
                svg_element::Text::new(text)
                    .set("x", bounds.min_x() + 6.0)
                    .set("y", bounds.min_y() + FONT_SIZE + 4.0)
                    .set("font-size", FONT_SIZE)
                    .set("font-family", "sans-serif"),
            );
        }
        group
    }

    fn render_node(&self, node: &PositionedNode) -> svg_element::Group {
        let bounds = node.bounds;
        let center = bounds.center();
        let stroke = self.style.stroke_color();
        let mut group = svg_element::Group::new().set("id", node.id.to_string());

        match node.kind {
            kind if kind.is_event() => {
                let radius = bounds.width().min(bounds.height()) / 2.0;
                let width = if kind == NodeKind::EndEvent { 3 } else { 1 };
                group = group.add(
                    circle(center, radius)
                        .set("fill", "white")
                        .set("stroke", stroke)
                        .set("stroke-width", width),
                );
                if matches!(kind, NodeKind::IntermediateEvent | NodeKind::BoundaryEvent) {
                    group = group.add(
                        circle(center, (radius - 3.0).max(0.0))
                            .set("fill", "none")
                            .set("stroke", stroke),
                    );
                }
            }
            kind if kind.is_gateway() => {
                let points = [
                    bounds.top_center(),
                    bounds.right_center(),
                    bounds.bottom_center(),
                    bounds.left_center(),
                ];
                group = group.add(
                    svg_element::Polygon::new()
                        .set("points", points_attribute(&points))
                        .set("fill", "white")
                        .set("stroke", stroke),
                );
                if let Some(symbol) = gateway_symbol(kind) {
                    group = group.add(label(symbol, center).set("font-size", FONT_SIZE * 1.5));
                }
            }
            NodeKind::SubProcess => {
                group = group
                    .add(self.outline(bounds).set("rx", 10).set("fill", "none"))
                    .add(label(
                        &node.id.to_string(),
                        Point::new(center.x(), bounds.min_y() + FONT_SIZE + 4.0),
                    ));
            }
            NodeKind::DataObject => {
                let fold = bounds.width().min(bounds.height()) / 4.0;
                let data = format!(
                    "M {} {} L {} {} L {} {} L {} {} L {} {} Z",
                    bounds.min_x(),
                    bounds.min_y(),
                    bounds.max_x() - fold,
                    bounds.min_y(),
                    bounds.max_x(),
                    bounds.min_y() + fold,
                    bounds.max_x(),
                    bounds.max_y(),
                    bounds.min_x(),
                    bounds.max_y(),
                );
                group = group.add(
                    svg_element::Path::new()
                        .set("d", data)
                        .set("fill", "white")
                        .set("stroke", stroke),
                );
            }
            NodeKind::TextAnnotation => {
                let data = format!(
                    "M {} {} L {} {} L {} {} L {} {}",
                    bounds.min_x() + 10.0,
                    bounds.min_y(),
                    bounds.min_x(),
                    bounds.min_y(),
                    bounds.min_x(),
                    bounds.max_y(),
                    bounds.min_x() + 10.0,
                    bounds.max_y(),
                );
                group = group
                    .add(
                        svg_element::Path::new()
                            .set("d", data)
                            .set("fill", "none")
                            .set("stroke", stroke),
                    )
                    .add(label(&node.id.to_string(), center));
            }
            _ => {
                group = group
                    .add(self.outline(bounds).set("rx", 8).set("fill", "white"))
                    .add(label(&node.id.to_string(), center));
            }
        }

        if node.needs_review {
            let padded = Bounds::new_from_center(
                center,
                Size::new(bounds.width() + 8.0, bounds.height() + 8.0),
            );
            group = group.add(
                svg_element::Rectangle::new()
                    .set("x", padded.min_x())
                    .set("y", padded.min_y())
                    .set("width", padded.width())
                    .set("height", padded.height())
                    .set("fill", "none")
                    .set("stroke", self.style.review_color())
                    .set("stroke-dasharray", "6 3"),
            );
        }

        group
    }

    fn render_edge(&self, edge: &PositionedEdge) -> Option<svg_element::Polyline> {
        if edge.waypoints.len() < 2 {
            return None;
        }

        let line = svg_element::Polyline::new()
            .set("id", edge.id.to_string())
            .set("points", points_attribute(&edge.waypoints))
            .set("fill", "none")
            .set("stroke", self.style.stroke_color());

        Some(match edge.kind {
            EdgeKind::SequenceFlow => line.set("marker-end", format!("url(#{SEQUENCE_MARKER})")),
            EdgeKind::MessageFlow => line
                .set("stroke-dasharray", "8 4")
                .set("marker-end", format!("url(#{MESSAGE_MARKER})")),
            EdgeKind::Association => line.set("stroke-dasharray", "2 4"),
        })
    }

    fn outline(&self, bounds: Bounds) -> svg_element::Rectangle {
        svg_element::Rectangle::new()
            .set("x", bounds.min_x())
            .set("y", bounds.min_y())
            .set("width", bounds.width())
            .set("height", bounds.height())
            .set("stroke", self.style.stroke_color())
    }
}

impl<W: Write> export::Exporter for Svg<W> {
    fn export_positioned_model(&mut self, model: &PositionedModel) -> Result<(), export::Error> {
        let doc = self.render_positioned_model(model);
        debug!(
            nodes = model.nodes().len(),
            edges = model.edges().len();
            "SVG document rendered"
        );
        self.write_document(&doc)
    }
}

/// Label for a pool or lane; generated ids are not shown.
fn display_name(id: Id, name: Option<&str>) -> Option<String> {
    match name {
        Some(name) => Some(name.to_string()),
        None if id.is_synthetic() => None,
        None => Some(id.to_string()),
    }
}

fn gateway_symbol(kind: NodeKind) -> Option<&'static str> {
    match kind {
        NodeKind::ExclusiveGateway => Some("×"),
        NodeKind::ParallelGateway => Some("+"),
        NodeKind::InclusiveGateway => Some("○"),
        _ => None,
    }
}

fn circle(center: Point, radius: f32) -> svg_element::Circle {
    svg_element::Circle::new()
        .set("cx", center.x())
        .set("cy", center.y())
        .set("r", radius)
}

fn label(text: &str, center: Point) -> svg_element::Text {
    svg_element::Text::new(text)
        .set("x", center.x())
        .set("y", center.y())
        .set("text-anchor", "middle")
        .set("dominant-baseline", "middle")
        .set("font-size", FONT_SIZE)
        .set("font-family", "sans-serif")
}

fn points_attribute(points: &[Point]) -> String {
    points
        .iter()
        .map(|point| format!("{},{}", point.x(), point.y()))
        .collect::<Vec<_>>()
        .join(" ")
}
