//! BPMN 2.0 XML with diagram interchange.
//!
//! The document holds three root elements: the process with its lane set,
//! flow nodes and sequence flows; a collaboration with a single participant;
//! and the diagram plane with a shape or edge for every placed element.

use log::{debug, info};
use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};

use laneflow_core::{
    geometry::{Bounds, Point},
    identifier::Id,
    semantic::{Node, NodeKind},
};

use crate::structure::{ProcessDiagram, SequenceEdge};

use super::{Error, Exporter};

const PROCESS_ID: &str = "Global_Process";
const LANE_SET_ID: &str = "Global_LaneSet";
const COLLABORATION_ID: &str = "Global_Colab";
const PARTICIPANT_ID: &str = "Global_Actor";
const DIAGRAM_ID: &str = "Global_Diagram";
const PLANE_ID: &str = "Global_Plane";
const DEFINITIONS_ID: &str = "Global_Definitions";

const NAMESPACES: [(&str, &str); 6] = [
    ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
    ("xmlns:bpmn", "http://www.omg.org/spec/BPMN/20100524/MODEL"),
    ("xmlns:bpmndi", "http://www.omg.org/spec/BPMN/20100524/DI"),
    ("xmlns:dc", "http://www.omg.org/spec/DD/20100524/DC"),
    ("xmlns:di", "http://www.omg.org/spec/DD/20100524/DI"),
    ("targetNamespace", "http://bpmn.io/schema/bpmn"),
];

/// XML id of a flow node.
pub fn node_element_id(id: Id) -> String {
    format!("Node_{id}")
}

/// XML id of a lane.
pub fn lane_element_id(id: Id) -> String {
    format!("Lane_{id}")
}

/// XML id of a sequence flow.
pub fn flow_element_id(edge: SequenceEdge) -> String {
    format!("Flow_{}_{}", edge.source(), edge.target())
}

/// Node names become XML-friendly by replacing spaces with underscores.
fn element_name(name: &str) -> String {
    name.replace(' ', "_")
}

/// Writes BPMN XML.
///
/// The participant is named after the blueprint, or after the name given
/// through [`BpmnExporter::with_participant_name`].
#[derive(Debug, Default, Clone)]
pub struct BpmnExporter {
    participant_name: Option<String>,
}

impl BpmnExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_participant_name(mut self, name: impl Into<String>) -> Self {
        self.participant_name = Some(name.into());
        self
    }
}

impl Exporter for BpmnExporter {
    fn export(&self, diagram: &ProcessDiagram<'_>) -> Result<String, Error> {
        let participant = self.participant_name.as_deref().or(diagram.graph().name());

        let mut xml = XmlWriter::new();
        xml.declaration()?;

        let mut definitions = BytesStart::new("bpmn:definitions");
        definitions.push_attribute(("id", DEFINITIONS_ID));
        for attribute in NAMESPACES {
            definitions.push_attribute(attribute);
        }
        xml.write(Event::Start(definitions))?;

        write_process(&mut xml, diagram)?;
        write_collaboration(&mut xml, participant)?;
        write_diagram(&mut xml, diagram)?;

        xml.end("bpmn:definitions")?;

        let document = xml.finish()?;
        info!(bytes = document.len(); "BPMN document written");
        Ok(document)
    }
}

fn write_process(xml: &mut XmlWriter, diagram: &ProcessDiagram<'_>) -> Result<(), Error> {
    let graph = diagram.graph();
    xml.start("bpmn:process", &[("id", PROCESS_ID), ("isExecutable", "true")])?;

    xml.start("bpmn:laneSet", &[("id", LANE_SET_ID)])?;
    for lane in graph.lanes() {
        let id = lane_element_id(lane.id());
        xml.start("bpmn:lane", &[("id", id.as_str()), ("name", lane.name())])?;
        for member in graph.lane_members(lane.id()) {
            xml.text_element("bpmn:flowNodeRef", &node_element_id(*member))?;
        }
        xml.end("bpmn:lane")?;
    }
    xml.end("bpmn:laneSet")?;

    for node in graph.nodes() {
        let incoming: Vec<String> = if node.kind().has_incoming() {
            graph.incoming(node.id()).map(flow_element_id).collect()
        } else {
            Vec::new()
        };
        let outgoing: Vec<String> = if node.kind().has_outgoing() {
            graph.outgoing(node.id()).map(flow_element_id).collect()
        } else {
            Vec::new()
        };
        write_flow_node(xml, node, &incoming, &outgoing)?;
    }

    for edge in graph.edges() {
        let id = flow_element_id(edge);
        let source = node_element_id(edge.source());
        let target = node_element_id(edge.target());
        xml.empty(
            "bpmn:sequenceFlow",
            &[("id", id.as_str()), ("sourceRef", source.as_str()), ("targetRef", target.as_str())],
        )?;
    }

    xml.end("bpmn:process")
}

fn write_flow_node(xml: &mut XmlWriter, node: &Node, incoming: &[String], outgoing: &[String]) -> Result<(), Error> {
    let tag = format!("bpmn:{}", node.kind().shape().element_name());
    let id = node_element_id(node.id());
    let name = element_name(node.name());

    xml.start(&tag, &[("id", id.as_str()), ("name", name.as_str())])?;
    for flow in incoming {
        xml.text_element("bpmn:incoming", flow)?;
    }
    for flow in outgoing {
        xml.text_element("bpmn:outgoing", flow)?;
    }
    xml.end(&tag)
}

fn write_collaboration(xml: &mut XmlWriter, participant: Option<&str>) -> Result<(), Error> {
    xml.start("bpmn:collaboration", &[("id", COLLABORATION_ID)])?;
    let mut attributes = vec![("id", PARTICIPANT_ID), ("processRef", PROCESS_ID)];
    if let Some(name) = participant {
        attributes.push(("name", name));
    }
    xml.empty("bpmn:participant", &attributes)?;
    xml.end("bpmn:collaboration")
}

fn write_diagram(xml: &mut XmlWriter, diagram: &ProcessDiagram<'_>) -> Result<(), Error> {
    let geometry = diagram.geometry();

    xml.start("bpmndi:BPMNDiagram", &[("id", DIAGRAM_ID)])?;
    xml.start(
        "bpmndi:BPMNPlane",
        &[("id", PLANE_ID), ("bpmnElement", COLLABORATION_ID)],
    )?;

    for (id, bounds) in geometry.node_bounds() {
        let element = node_element_id(*id);
        let is_gateway = diagram.graph().node(*id).is_some_and(|node| node.kind() == NodeKind::Flow);
        write_shape(xml, &element, *bounds, is_gateway.then_some(("isMarkerVisible", "true")))?;
    }

    for (edge, waypoints) in geometry.edge_waypoints() {
        write_edge(xml, &flow_element_id(*edge), waypoints)?;
    }

    for band in geometry.lane_bands() {
        write_shape(
            xml,
            &lane_element_id(band.lane()),
            band.bounds(),
            Some(("isHorizontal", "true")),
        )?;
    }
    write_shape(xml, PARTICIPANT_ID, geometry.container(), Some(("isHorizontal", "true")))?;

    debug!(
        shapes = geometry.node_bounds().len() + geometry.lane_bands().len() + 1,
        edges = geometry.edge_waypoints().len();
        "Diagram plane written"
    );

    xml.end("bpmndi:BPMNPlane")?;
    xml.end("bpmndi:BPMNDiagram")
}

fn write_shape(
    xml: &mut XmlWriter,
    element: &str,
    bounds: Bounds,
    extra: Option<(&str, &str)>,
) -> Result<(), Error> {
    let id = format!("{element}_di");
    let mut attributes = vec![("id", id.as_str()), ("bpmnElement", element)];
    attributes.extend(extra);

    xml.start("bpmndi:BPMNShape", &attributes)?;
    let x = bounds.min_x().to_string();
    let y = bounds.min_y().to_string();
    let width = bounds.width().to_string();
    let height = bounds.height().to_string();
    xml.empty(
        "dc:Bounds",
        &[("x", x.as_str()), ("y", y.as_str()), ("width", width.as_str()), ("height", height.as_str())],
    )?;
    xml.end("bpmndi:BPMNShape")
}

fn write_edge(xml: &mut XmlWriter, element: &str, waypoints: &[Point]) -> Result<(), Error> {
    let id = format!("{element}_di");
    xml.start("bpmndi:BPMNEdge", &[("id", id.as_str()), ("bpmnElement", element)])?;
    for point in waypoints {
        let x = point.x().to_string();
        let y = point.y().to_string();
        xml.empty("di:waypoint", &[("x", x.as_str()), ("y", y.as_str())])?;
    }
    xml.end("bpmndi:BPMNEdge")
}

/// Thin wrapper over an indenting [`quick_xml::Writer`] into memory.
struct XmlWriter {
    writer: Writer<Vec<u8>>,
}

impl XmlWriter {
    fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    fn write(&mut self, event: Event<'_>) -> Result<(), Error> {
        self.writer
            .write_event(event)
            .map_err(|err| Error::Render(format!("failed to write BPMN XML: {err}")))
    }

    fn declaration(&mut self) -> Result<(), Error> {
        self.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
    }

    fn start(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), Error> {
        let mut element = BytesStart::new(name);
        for attribute in attributes {
            element.push_attribute(*attribute);
        }
        self.write(Event::Start(element))
    }

    fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), Error> {
        let mut element = BytesStart::new(name);
        for attribute in attributes {
            element.push_attribute(*attribute);
        }
        self.write(Event::Empty(element))
    }

    fn end(&mut self, name: &str) -> Result<(), Error> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    /// Writes `<name>text</name>` on a single line.
    fn text_element(&mut self, name: &str, text: &str) -> Result<(), Error> {
        self.writer
            .create_element(name)
            .write_text_content(BytesText::new(text))
            .map(|_| ())
            .map_err(|err| Error::Render(format!("failed to write BPMN XML: {err}")))
    }

    fn finish(self) -> Result<String, Error> {
        String::from_utf8(self.writer.into_inner())
            .map_err(|err| Error::Render(format!("BPMN XML is not valid UTF-8: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use laneflow_core::semantic::{Blueprint, Branch, Lane, Successors};

    use super::*;
    use crate::{config::LayoutConfig, structure::GraphBuilder};

    fn approval_blueprint() -> Blueprint {
        let lane = Id::new("1");
        let node = |id: &str, kind, name: &str, next| Node::new(Id::new(id), kind, name, lane, next);
        Blueprint::new(
            Some(vec![
                node("1", NodeKind::Start, "Start node", Successors::Single(Id::new("2"))),
                node(
                    "2",
                    NodeKind::Flow,
                    "Is approved",
                    Successors::Branches(vec![
                        Branch::new("yes", Id::new("3")),
                        Branch::new("no", Id::new("99")),
                    ]),
                ),
                node("3", NodeKind::SystemTask, "Notify", Successors::Single(Id::new("99"))),
                node("99", NodeKind::Finish, "Finish node", Successors::None),
            ]),
            Some(vec![Lane::new(lane, "reviewers")]),
        )
        .with_name("approval")
    }

    fn export(blueprint: &Blueprint, exporter: &BpmnExporter) -> String {
        let layout = LayoutConfig::default();
        let diagram = GraphBuilder::new(&layout).build(blueprint).unwrap();
        exporter.export(&diagram).unwrap()
    }

    #[test]
    fn test_element_ids() {
        assert_eq!(node_element_id(Id::new("7")), "Node_7");
        assert_eq!(lane_element_id(Id::new("a")), "Lane_a");
        assert_eq!(flow_element_id(SequenceEdge::new(Id::new("1"), Id::new("2"))), "Flow_1_2");
        assert_eq!(element_name("Send the mail"), "Send_the_mail");
    }

    #[test]
    fn test_document_skeleton() {
        let xml = export(&approval_blueprint(), &BpmnExporter::new());

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<bpmn:definitions id=\"Global_Definitions\""));
        assert!(xml.contains("xmlns:bpmndi=\"http://www.omg.org/spec/BPMN/20100524/DI\""));
        assert!(xml.contains("<bpmn:process id=\"Global_Process\" isExecutable=\"true\">"));
        assert!(xml.contains("<bpmn:laneSet id=\"Global_LaneSet\">"));
        assert!(xml.contains("<bpmn:lane id=\"Lane_1\" name=\"reviewers\">"));
        assert!(xml.contains("<bpmn:flowNodeRef>Node_99</bpmn:flowNodeRef>"));
        assert!(xml.contains(
            "<bpmn:participant id=\"Global_Actor\" processRef=\"Global_Process\" name=\"approval\"/>"
        ));
        assert!(xml.contains("<bpmndi:BPMNPlane id=\"Global_Plane\" bpmnElement=\"Global_Colab\">"));
        assert!(xml.trim_end().ends_with("</bpmn:definitions>"));

        let process = xml.find("<bpmn:process").unwrap();
        let collaboration = xml.find("<bpmn:collaboration").unwrap();
        let diagram = xml.find("<bpmndi:BPMNDiagram").unwrap();
        assert!(process < collaboration && collaboration < diagram);
    }

    #[test]
    fn test_flow_nodes_and_refs() {
        let xml = export(&approval_blueprint(), &BpmnExporter::new());

        assert!(xml.contains("<bpmn:startEvent id=\"Node_1\" name=\"Start_node\">"));
        assert!(xml.contains("<bpmn:exclusiveGateway id=\"Node_2\" name=\"Is_approved\">"));
        assert!(xml.contains("<bpmn:serviceTask id=\"Node_3\" name=\"Notify\">"));
        assert!(xml.contains("<bpmn:endEvent id=\"Node_99\" name=\"Finish_node\">"));

        assert!(xml.contains("<bpmn:outgoing>Flow_2_3</bpmn:outgoing>"));
        assert!(xml.contains("<bpmn:outgoing>Flow_2_99</bpmn:outgoing>"));
        assert!(xml.contains("<bpmn:incoming>Flow_3_99</bpmn:incoming>"));
        assert!(xml.contains(
            "<bpmn:sequenceFlow id=\"Flow_2_99\" sourceRef=\"Node_2\" targetRef=\"Node_99\"/>"
        ));

        let start = xml.find("<bpmn:startEvent").unwrap();
        let start_end = xml[start..].find("</bpmn:startEvent>").unwrap() + start;
        assert!(!xml[start..start_end].contains("bpmn:incoming"));
    }

    #[test]
    fn test_diagram_elements() {
        let xml = export(&approval_blueprint(), &BpmnExporter::new());

        assert!(xml.contains("<bpmndi:BPMNShape id=\"Node_1_di\" bpmnElement=\"Node_1\">"));
        assert!(xml.contains("<dc:Bounds x=\"114\" y=\"72\" width=\"36\" height=\"36\"/>"));
        assert!(xml.contains(
            "<bpmndi:BPMNShape id=\"Node_2_di\" bpmnElement=\"Node_2\" isMarkerVisible=\"true\">"
        ));
        assert!(xml.contains("<bpmndi:BPMNEdge id=\"Flow_1_2_di\" bpmnElement=\"Flow_1_2\">"));
        assert!(xml.contains("<di:waypoint x=\"150\" y=\"90\"/>"));
        assert!(xml.contains(
            "<bpmndi:BPMNShape id=\"Lane_1_di\" bpmnElement=\"Lane_1\" isHorizontal=\"true\">"
        ));
        assert!(xml.contains(
            "<bpmndi:BPMNShape id=\"Global_Actor_di\" bpmnElement=\"Global_Actor\" isHorizontal=\"true\">"
        ));
        assert_eq!(xml.matches("<bpmndi:BPMNEdge ").count(), 4);
    }

    #[test]
    fn test_participant_name_override_and_escaping() {
        let exporter = BpmnExporter::new().with_participant_name("R&D <review>");
        let xml = export(&approval_blueprint(), &exporter);

        assert!(xml.contains("name=\"R&amp;D &lt;review&gt;\""));
        assert!(!xml.contains("name=\"approval\""));
    }

    #[test]
    fn test_unnamed_participant() {
        let lane = Id::new("1");
        let blueprint = Blueprint::new(
            Some(vec![Node::new(Id::new("1"), NodeKind::Start, "only", lane, Successors::None)]),
            Some(vec![Lane::new(lane, "solo")]),
        );
        let xml = export(&blueprint, &BpmnExporter::new());

        assert!(xml.contains("<bpmn:participant id=\"Global_Actor\" processRef=\"Global_Process\"/>"));
    }
}
