//! Graph descriptions handed to a diagram renderer.
//!
//! A [`GraphDescription`] is a flat, self-contained snapshot of a laid-out
//! trace: every [`Node`] keyed by its [`NodeId`], every [`Link`] keyed by its
//! [`LinkId`], plus the canvas offset and the (empty) selection and hover
//! state the renderer expects. Field names and nesting follow the renderer's
//! JSON shape exactly.
//!
//! # Architecture
//!
//! - [`Node`]: identity, display [`NodeProperties`], [`Position`] and [`Port`]s
//! - [`Link`]: a directed connection between two [`Endpoint`]s
//! - [`GraphDescription`]: id-keyed collections of both, in insertion order

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    identifier::{LinkId, NodeId, PortId},
    trace::{ResponseCode, TraceRecord},
};

/// An integer pixel position on the canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    x: i64,
    y: i64,
}

impl Position {
    /// Creates a new position with the specified coordinates
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the position
    pub fn x(self) -> i64 {
        self.x
    }

    /// Returns the y-coordinate of the position
    pub fn y(self) -> i64 {
        self.y
    }

    /// Returns a new position moved by the given deltas
    ///
    /// Coordinates saturate at the bounds of `i64`.
    pub fn translate(self, dx: i64, dy: i64) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// Checks if both coordinates are zero
    pub fn is_zero(self) -> bool {
        self.x == 0 && self.y == 0
    }
}

/// Direction of a [`Port`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortKind {
    Input,
    Output,
}

/// A named attachment point on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    id: PortId,
    #[serde(rename = "type")]
    kind: PortKind,
}

impl Port {
    /// Creates the port for `id`, deriving its kind from the identifier.
    pub fn new(id: PortId) -> Self {
        let kind = if id.is_input() {
            PortKind::Input
        } else {
            PortKind::Output
        };
        Self { id, kind }
    }

    pub fn id(&self) -> PortId {
        self.id
    }

    pub fn kind(&self) -> PortKind {
        self.kind
    }
}

/// Display fields copied from a [`TraceRecord`].
///
/// Fields missing from the record are left out of the serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeProperties {
    name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    body: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    upstream_address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    ip_addresses: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    duration: Option<String>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    response: Option<ResponseCode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    uri: Option<String>,
}

impl NodeProperties {
    /// Copies the display fields of `record`.
    ///
    /// `upstream_address` is the key the record was stored under in its
    /// parent's upstream mapping, if any.
    pub fn from_record(record: &TraceRecord, upstream_address: Option<&str>) -> Self {
        Self {
            name: record.name().to_string(),
            body: record.body().cloned(),
            upstream_address: upstream_address.map(str::to_string),
            ip_addresses: record.ip_addresses().map(<[String]>::to_vec),
            duration: record.duration().map(str::to_string),
            kind: record.kind().map(str::to_string),
            response: record.response_code().cloned(),
            uri: record.uri().map(str::to_string),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn upstream_address(&self) -> Option<&str> {
        self.upstream_address.as_deref()
    }

    pub fn ip_addresses(&self) -> Option<&[String]> {
        self.ip_addresses.as_deref()
    }

    pub fn duration(&self) -> Option<&str> {
        self.duration.as_deref()
    }

    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn response(&self) -> Option<&ResponseCode> {
        self.response.as_ref()
    }

    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }
}

/// A positioned node of the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    properties: NodeProperties,
    position: Position,
    ports: IndexMap<PortId, Port>,
}

impl Node {
    /// Creates a node without ports.
    pub fn new(id: NodeId, properties: NodeProperties, position: Position) -> Self {
        Self {
            id,
            properties,
            position,
            ports: IndexMap::new(),
        }
    }

    /// Adds a port, replacing any port with the same identifier.
    pub fn add_port(&mut self, port: Port) {
        self.ports.insert(port.id(), port);
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn properties(&self) -> &NodeProperties {
        &self.properties
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn ports(&self) -> &IndexMap<PortId, Port> {
        &self.ports
    }

    /// Returns the port with the given identifier.
    pub fn port(&self, id: PortId) -> Option<&Port> {
        self.ports.get(&id)
    }

    /// Returns an iterator over the input ports.
    pub fn input_ports(&self) -> impl Iterator<Item = &Port> {
        self.ports
            .values()
            .filter(|port| port.id().is_input())
    }

    /// Returns an iterator over the output ports.
    pub fn output_ports(&self) -> impl Iterator<Item = &Port> {
        self.ports
            .values()
            .filter(|port| port.id().is_output())
    }
}

/// One end of a [`Link`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    node_id: NodeId,
    port_id: PortId,
}

impl Endpoint {
    pub fn new(node_id: NodeId, port_id: PortId) -> Self {
        Self { node_id, port_id }
    }

    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    pub fn port_id(&self) -> PortId {
        self.port_id
    }
}

/// A directed connection from an output port to an input port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    id: LinkId,
    from: Endpoint,
    to: Endpoint,
}

impl Link {
    pub fn new(id: LinkId, from: Endpoint, to: Endpoint) -> Self {
        Self { id, from, to }
    }

    pub fn id(&self) -> &LinkId {
        &self.id
    }

    pub fn from(&self) -> &Endpoint {
        &self.from
    }

    pub fn to(&self) -> &Endpoint {
        &self.to
    }
}

/// Selection and hover state of the renderer; always empty when produced here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {}

/// A complete node/link description of a laid-out trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDescription {
    offset: Position,
    nodes: IndexMap<NodeId, Node>,
    links: IndexMap<LinkId, Link>,
    selected: Selection,
    hovered: Selection,
}

impl Default for GraphDescription {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphDescription {
    /// Creates an empty graph with a zero offset.
    pub fn new() -> Self {
        Self {
            offset: Position::default(),
            nodes: IndexMap::new(),
            links: IndexMap::new(),
            selected: Selection::default(),
            hovered: Selection::default(),
        }
    }

    /// Adds a node, replacing any node with the same identifier.
    pub fn add_node(&mut self, node: Node) {
        self.nodes.insert(node.id().clone(), node);
    }

    /// Adds a link, replacing any link with the same identifier.
    pub fn add_link(&mut self, link: Link) {
        self.links.insert(link.id().clone(), link);
    }

    pub fn offset(&self) -> Position {
        self.offset
    }

    pub fn nodes(&self) -> &IndexMap<NodeId, Node> {
        &self.nodes
    }

    pub fn links(&self) -> &IndexMap<LinkId, Link> {
        &self.links
    }

    pub fn selected(&self) -> &Selection {
        &self.selected
    }

    pub fn hovered(&self) -> &Selection {
        &self.hovered
    }

    /// Returns the node with the given identifier, if it exists.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Returns the link with the given identifier, if it exists.
    pub fn link(&self, id: &str) -> Option<&Link> {
        self.links.get(id)
    }

    /// Checks if a node with the given identifier exists.
    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Returns the total number of nodes in the graph.
    pub fn nodes_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the total number of links in the graph.
    pub fn links_count(&self) -> usize {
        self.links.len()
    }

    /// Returns the root node: the first node without an input port.
    pub fn root(&self) -> Option<&Node> {
        self.nodes
            .values()
            .find(|node| node.input_ports().next().is_none())
    }

    /// Returns the nodes that links leaving `id` point at, in output port order.
    pub fn children_of(&self, id: &str) -> Vec<&Node> {
        let mut outgoing: Vec<&Link> = self
            .links
            .values()
            .filter(|link| link.from().node_id() == id)
            .collect();
        outgoing.sort_by_key(|link| link.from().port_id().index());

        outgoing
            .into_iter()
            .filter_map(|link| self.node(link.to().node_id().as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample_graph() -> GraphDescription {
        let root_id = NodeId::new("web", 0, 0);
        let child_id = NodeId::new("api", 1, 0);

        let mut root = Node::new(
            root_id.clone(),
            NodeProperties::from_record(&TraceRecord::new("web").with_kind("HTTP"), None),
            Position::new(100, 100),
        );
        root.add_port(Port::new(PortId::Output(0)));

        let mut child = Node::new(
            child_id.clone(),
            NodeProperties::from_record(&TraceRecord::new("api"), Some("http://api:9090")),
            Position::new(100, 400),
        );
        child.add_port(Port::new(PortId::INPUT));

        let mut graph = GraphDescription::new();
        graph.add_node(root);
        graph.add_node(child);
        graph.add_link(Link::new(
            LinkId::new(&root_id, 0),
            Endpoint::new(root_id, PortId::Output(0)),
            Endpoint::new(child_id, PortId::INPUT),
        ));
        graph
    }

    #[test]
    fn test_empty_graph_shape() {
        let value = serde_json::to_value(GraphDescription::new()).unwrap();
        assert_eq!(
            value,
            json!({
                "offset": {"x": 0, "y": 0},
                "nodes": {},
                "links": {},
                "selected": {},
                "hovered": {}
            })
        );
    }

    #[test]
    fn test_wire_shape() {
        let value = serde_json::to_value(sample_graph()).unwrap();

        assert_eq!(
            value["nodes"]["web_0_0"],
            json!({
                "id": "web_0_0",
                "properties": {"name": "web", "type": "HTTP"},
                "position": {"x": 100, "y": 100},
                "ports": {"output0": {"id": "output0", "type": "output"}}
            })
        );
        assert_eq!(
            value["nodes"]["api_1_0"]["properties"],
            json!({"name": "api", "upstream_address": "http://api:9090"})
        );
        assert_eq!(
            value["links"]["web_0_0_0"],
            json!({
                "id": "web_0_0_0",
                "from": {"nodeId": "web_0_0", "portId": "output0"},
                "to": {"nodeId": "api_1_0", "portId": "input0"}
            })
        );
    }

    #[test]
    fn test_deserializes_own_output() {
        let graph = sample_graph();
        let json = serde_json::to_string(&graph).unwrap();
        let parsed: GraphDescription = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, graph);
    }

    #[test]
    fn test_root_and_children() {
        let graph = sample_graph();

        assert_eq!(graph.root().map(|n| n.id().as_str()), Some("web_0_0"));
        let children: Vec<_> = graph
            .children_of("web_0_0")
            .into_iter()
            .map(|n| n.id().as_str())
            .collect();
        assert_eq!(children, vec!["api_1_0"]);
        assert!(graph.children_of("api_1_0").is_empty());
    }

    #[test]
    fn test_port_kind_follows_identifier() {
        assert_eq!(Port::new(PortId::INPUT).kind(), PortKind::Input);
        assert_eq!(Port::new(PortId::Output(4)).kind(), PortKind::Output);
    }

    #[test]
    fn test_node_port_queries() {
        let graph = sample_graph();
        let child = graph.node("api_1_0").unwrap();

        assert_eq!(child.input_ports().count(), 1);
        assert_eq!(child.output_ports().count(), 0);
        assert!(child.port(PortId::INPUT).is_some());
    }

    #[test]
    fn test_position_translate() {
        let position = Position::new(100, 100).translate(600, 300);
        assert_eq!((position.x(), position.y()), (700, 400));
        assert!(Position::default().is_zero());
    }

    #[test]
    fn test_position_translate_saturates() {
        let position = Position::new(i64::MAX - 10, i64::MIN + 10).translate(300, -300);
        assert_eq!((position.x(), position.y()), (i64::MAX, i64::MIN));
    }
}
