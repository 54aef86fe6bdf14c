//! SVG preview of a laid-out process.

use log::{debug, info};
use svg::{
    Document,
    node::element::{self as svg_element, Definitions, Marker, Path},
};

use laneflow_core::{
    color::Color,
    geometry::{Bounds, Point},
    semantic::{Node, ShapeKind},
};

use crate::{config::StyleConfig, structure::ProcessDiagram};

use super::{Error, Exporter};

const ARROW_MARKER_ID: &str = "sequence-arrow";
const FONT_FAMILY: &str = "sans-serif";
const FONT_SIZE: u16 = 12;
const TASK_CORNER_RADIUS: f32 = 10.0;

/// Resolved colors of the preview.
#[derive(Debug, Clone)]
struct Palette {
    background: Color,
    lane: Color,
    shape_fill: Color,
    stroke: Color,
    text: Color,
}

impl Palette {
    fn from_style(style: &StyleConfig) -> Result<Self, String> {
        Ok(Self {
            background: or_default(style.background_color()?, "white")?,
            lane: or_default(style.lane_color()?, "#f4f6fa")?,
            shape_fill: or_default(style.shape_fill_color()?, "white")?,
            stroke: or_default(style.stroke_color()?, "#222222")?,
            text: or_default(style.text_color()?, "black")?,
        })
    }
}

fn or_default(color: Option<Color>, fallback: &str) -> Result<Color, String> {
    match color {
        Some(color) => Ok(color),
        None => Color::new(fallback),
    }
}

/// Renders lane bands, flow nodes and sequence flows to SVG.
///
/// Events are circles (end events with a heavier stroke), gateways are
/// diamonds and tasks are rounded boxes. Sequence flows are polylines that
/// end in an arrow marker.
#[derive(Debug, Clone)]
pub struct SvgExporter {
    palette: Palette,
}

impl SvgExporter {
    /// Creates an exporter using the colors of `style`.
    ///
    /// # Errors
    ///
    /// Returns a message when a configured color cannot be parsed.
    pub fn new(style: &StyleConfig) -> Result<Self, String> {
        Ok(Self {
            palette: Palette::from_style(style)?,
        })
    }

    fn marker_definitions(&self) -> Definitions {
        let arrow = Marker::new()
            .set("id", ARROW_MARKER_ID)
            .set("viewBox", "0 0 10 10")
            .set("refX", 9)
            .set("refY", 5)
            .set("markerWidth", 6)
            .set("markerHeight", 6)
            .set("orient", "auto")
            .add(
                Path::new()
                    .set("d", "M 0 0 L 10 5 L 0 10 z")
                    .set("fill", &self.palette.stroke),
            );
        Definitions::new().add(arrow)
    }

    fn render_container(&self, container: Bounds, header_width: f32, name: Option<&str>) -> svg_element::Group {
        let frame = svg_element::Rectangle::new()
            .set("x", container.min_x())
            .set("y", container.min_y())
            .set("width", container.width())
            .set("height", container.height())
            .set("fill", "none")
            .set("stroke", &self.palette.stroke)
            .set("stroke-opacity", self.palette.stroke.alpha());

        let mut group = svg_element::Group::new().add(frame);
        if let Some(name) = name {
            let center = Point::new(container.min_x() + header_width / 2.0, container.center().y());
            group = group.add(self.vertical_label(name, center));
        }
        group
    }

    fn render_lane(&self, bounds: Bounds, name: &str) -> svg_element::Group {
        let band = svg_element::Rectangle::new()
            .set("x", bounds.min_x())
            .set("y", bounds.min_y())
            .set("width", bounds.width())
            .set("height", bounds.height())
            .set("fill", &self.palette.lane)
            .set("fill-opacity", self.palette.lane.alpha())
            .set("stroke", &self.palette.stroke)
            .set("stroke-opacity", self.palette.stroke.alpha());

        let label_center = Point::new(bounds.min_x() + FONT_SIZE as f32, bounds.center().y());
        svg_element::Group::new()
            .add(band)
            .add(self.vertical_label(name, label_center))
    }

    fn render_node(&self, node: &Node, bounds: Bounds) -> svg_element::Group {
        let center = bounds.center();
        let group = svg_element::Group::new().set("id", format!("node-{}", node.id()));

        match node.kind().shape() {
            ShapeKind::StartEvent | ShapeKind::EndEvent => {
                let stroke_width = if node.kind().shape() == ShapeKind::EndEvent {
                    3.0
                } else {
                    1.5
                };
                let circle = svg_element::Circle::new()
                    .set("cx", center.x())
                    .set("cy", center.y())
                    .set("r", bounds.width() / 2.0)
                    .set("stroke-width", stroke_width);
                group
                    .add(self.paint_shape(circle))
                    .add(self.label(node.name(), center.with_y(bounds.max_y() + FONT_SIZE as f32)))
            }
            ShapeKind::ExclusiveGateway => {
                let points = format!(
                    "{},{} {},{} {},{} {},{}",
                    center.x(),
                    bounds.min_y(),
                    bounds.max_x(),
                    center.y(),
                    center.x(),
                    bounds.max_y(),
                    bounds.min_x(),
                    center.y(),
                );
                let diamond = svg_element::Polygon::new()
                    .set("points", points)
                    .set("stroke-width", 1.5);
                group
                    .add(self.paint_shape(diamond))
                    .add(self.label(node.name(), center.with_y(bounds.max_y() + FONT_SIZE as f32)))
            }
            ShapeKind::ServiceTask | ShapeKind::UserTask | ShapeKind::ScriptTask | ShapeKind::Task => {
                let rect = svg_element::Rectangle::new()
                    .set("x", bounds.min_x())
                    .set("y", bounds.min_y())
                    .set("width", bounds.width())
                    .set("height", bounds.height())
                    .set("rx", TASK_CORNER_RADIUS)
                    .set("stroke-width", 1.5);
                group.add(self.paint_shape(rect)).add(self.label(node.name(), center))
            }
        }
    }

    fn paint_shape<T>(&self, shape: T) -> T
    where
        T: svg::Node,
    {
        let mut shape = shape;
        shape.assign("fill", &self.palette.shape_fill);
        shape.assign("fill-opacity", self.palette.shape_fill.alpha());
        shape.assign("stroke", &self.palette.stroke);
        shape.assign("stroke-opacity", self.palette.stroke.alpha());
        shape
    }

    fn render_edge(&self, waypoints: &[Point]) -> svg_element::Polyline {
        let points = waypoints
            .iter()
            .map(|point| format!("{},{}", point.x(), point.y()))
            .collect::<Vec<_>>()
            .join(" ");

        svg_element::Polyline::new()
            .set("points", points)
            .set("fill", "none")
            .set("stroke", &self.palette.stroke)
            .set("stroke-opacity", self.palette.stroke.alpha())
            .set("stroke-width", 1.5)
            .set("marker-end", format!("url(#{ARROW_MARKER_ID})"))
    }

    fn label(&self, text: &str, center: Point) -> svg_element::Text {
        svg_element::Text::new(text)
            .set("x", center.x())
            .set("y", center.y())
            .set("text-anchor", "middle")
            .set("dominant-baseline", "central")
            .set("font-family", FONT_FAMILY)
            .set("font-size", FONT_SIZE)
            .set("fill", &self.palette.text)
            .set("fill-opacity", self.palette.text.alpha())
    }

    fn vertical_label(&self, text: &str, center: Point) -> svg_element::Text {
        self.label(text, center).set(
            "transform",
            format!("rotate(-90, {}, {})", center.x(), center.y()),
        )
    }
}

impl Exporter for SvgExporter {
    fn export(&self, diagram: &ProcessDiagram<'_>) -> Result<String, Error> {
        let graph = diagram.graph();
        let geometry = diagram.geometry();
        let container = geometry.container();

        // Mirror the top-left margin on the bottom-right.
        let width = container.max_x() + container.min_x().max(0.0);
        let height = container.max_y() + container.min_y().max(0.0);
        if !(width.is_finite() && height.is_finite()) {
            return Err(Error::Render(format!("invalid canvas size {width}x{height}")));
        }
        debug!(width = width, height = height; "SVG canvas sized");

        let background = svg_element::Rectangle::new()
            .set("x", 0)
            .set("y", 0)
            .set("width", width)
            .set("height", height)
            .set("fill", &self.palette.background)
            .set("fill-opacity", self.palette.background.alpha());

        let header_width = geometry
            .lane_bands()
            .first()
            .map_or(0.0, |band| band.bounds().min_x() - container.min_x());

        let mut doc = Document::new()
            .set("viewBox", format!("0 0 {width} {height}"))
            .set("width", width)
            .set("height", height)
            .add(background)
            .add(self.marker_definitions());

        for (lane, band) in graph.lanes().iter().zip(geometry.lane_bands()) {
            doc = doc.add(self.render_lane(band.bounds(), lane.name()));
        }
        doc = doc.add(self.render_container(container, header_width, graph.name()));

        for waypoints in geometry.edge_waypoints().values() {
            doc = doc.add(self.render_edge(waypoints));
        }

        for (id, bounds) in geometry.node_bounds() {
            if let Some(node) = graph.node(*id) {
                doc = doc.add(self.render_node(node, *bounds));
            }
        }

        let document = doc.to_string();
        info!(bytes = document.len(); "SVG document written");
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use laneflow_core::{
        identifier::Id,
        semantic::{Blueprint, Lane, NodeKind, Successors},
    };

    use super::*;
    use crate::{config::LayoutConfig, structure::GraphBuilder};

    fn blueprint() -> Blueprint {
        let lane = Id::new("1");
        Blueprint::new(
            Some(vec![
                Node::new(Id::new("1"), NodeKind::Start, "Begin", lane, Successors::Single(Id::new("2"))),
                Node::new(Id::new("2"), NodeKind::UserTask, "Review <draft>", lane, Successors::Single(Id::new("99"))),
                Node::new(Id::new("99"), NodeKind::Finish, "Done", lane, Successors::None),
            ]),
            Some(vec![Lane::new(lane, "Editors")]),
        )
        .with_name("publishing")
    }

    #[test]
    fn test_render_preview() {
        let blueprint = blueprint();
        let layout = LayoutConfig::default();
        let diagram = GraphBuilder::new(&layout).build(&blueprint).unwrap();
        let exporter = SvgExporter::new(&StyleConfig::default()).unwrap();

        let svg = exporter.export(&diagram).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("id=\"sequence-arrow\""));
        assert_eq!(svg.matches("<circle").count(), 2);
        assert_eq!(svg.matches("<polyline").count(), 2);
        assert!(svg.contains("Editors"));
        assert!(svg.contains("publishing"));
    }
}
