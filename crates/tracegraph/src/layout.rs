//! Trace layout engine
//!
//! This module turns a [`TraceRecord`] tree into a [`GraphDescription`]
//! using a simple, deterministic depth-first walk.
//!
//! Every record becomes one node whose identifier is derived from its name,
//! its depth (`level`) and its position among its siblings (`index`). The
//! root sits at a fixed anchor; children are placed one vertical pitch
//! below their parent and fan out to the right by one horizontal pitch per
//! sibling. Subtrees of different parents are placed independently and may
//! overlap.

use log::{debug, trace, warn};

use tracegraph_core::{
    graph::{Endpoint, GraphDescription, Link, Node, NodeProperties, Port, Position},
    identifier::{LinkId, NodeId, PortId},
    trace::TraceRecord,
};

use crate::config::LayoutConfig;

/// Where a record lands in the tree walk.
#[derive(Debug, Clone, Copy)]
struct Placement<'a> {
    level: usize,
    index: usize,
    position: Position,
    has_parent: bool,
    upstream_address: Option<&'a str>,
}

/// Trace layout engine
#[derive(Debug, Clone)]
pub struct Engine {
    anchor: Position,
    horizontal_spacing: i64,
    vertical_spacing: i64,
}

impl Default for Engine {
    fn default() -> Self {
        Self::from_config(&LayoutConfig::default())
    }
}

impl Engine {
    /// Create a new layout engine with the default anchor and spacing
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a layout engine from layout settings
    pub fn from_config(config: &LayoutConfig) -> Self {
        Self {
            anchor: Position::new(config.start_x(), config.start_y()),
            horizontal_spacing: config.incr_x(),
            vertical_spacing: config.incr_y(),
        }
    }

    /// Set the position of the root node
    pub fn with_anchor(mut self, anchor: Position) -> Self {
        self.anchor = anchor;
        self
    }

    /// Set the horizontal distance between siblings
    pub fn with_horizontal_spacing(mut self, spacing: i64) -> Self {
        self.horizontal_spacing = spacing;
        self
    }

    /// Set the vertical distance between a parent and its children
    pub fn with_vertical_spacing(mut self, spacing: i64) -> Self {
        self.vertical_spacing = spacing;
        self
    }

    /// Calculate the graph description of a trace.
    ///
    /// The input is only read; the returned graph shares nothing with it.
    pub fn calculate_layout(&self, root: &TraceRecord) -> GraphDescription {
        let mut graph = GraphDescription::new();

        let placement = Placement {
            level: 0,
            index: 0,
            position: self.anchor,
            has_parent: false,
            upstream_address: None,
        };
        self.place_record(root, placement, &mut graph);

        debug!(
            nodes_count = graph.nodes_count(),
            links_count = graph.links_count();
            "Layout calculated"
        );

        graph
    }

    /// Place `record` and its subtree into `graph`, returning the record's node id.
    fn place_record(
        &self,
        record: &TraceRecord,
        placement: Placement<'_>,
        graph: &mut GraphDescription,
    ) -> NodeId {
        let id = self.unique_node_id(record, &placement, graph);
        trace!(
            node_id = id.as_str(),
            x = placement.position.x(),
            y = placement.position.y();
            "Placing node"
        );

        let properties = NodeProperties::from_record(record, placement.upstream_address);
        let mut node = Node::new(id.clone(), properties, placement.position);
        if placement.has_parent {
            node.add_port(Port::new(PortId::INPUT));
        }
        for index in 0..record.upstreams().len() {
            node.add_port(Port::new(PortId::Output(index)));
        }
        graph.add_node(node);

        let child_level = placement.level + 1;
        for (index, upstream) in record.upstreams().enumerate() {
            let offset = i64::try_from(index).unwrap_or(i64::MAX);
            let child = Placement {
                level: child_level,
                index,
                position: placement.position.translate(
                    offset.saturating_mul(self.horizontal_spacing),
                    self.vertical_spacing,
                ),
                has_parent: true,
                upstream_address: upstream.address(),
            };
            let child_id = self.place_record(upstream.record(), child, graph);

            graph.add_link(Link::new(
                LinkId::new(&id, index),
                Endpoint::new(id.clone(), PortId::Output(index)),
                Endpoint::new(child_id, PortId::INPUT),
            ));
        }

        id
    }

    /// Derive the node id of a record, falling back to an occurrence suffix
    /// when a cousin with the same name already took the plain id.
    fn unique_node_id(
        &self,
        record: &TraceRecord,
        placement: &Placement<'_>,
        graph: &GraphDescription,
    ) -> NodeId {
        let id = NodeId::new(record.name(), placement.level, placement.index);
        if !graph.contains_node(id.as_str()) {
            return id;
        }

        let mut occurrence = 1;
        loop {
            let candidate = id.with_occurrence(occurrence);
            if !graph.contains_node(candidate.as_str()) {
                warn!(
                    node_id = id.as_str(),
                    assigned_id = candidate.as_str();
                    "Node id already taken by another branch"
                );
                return candidate;
            }
            occurrence += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::{prelude::*, test_runner::TestCaseError};
    use serde_json::json;

    use tracegraph_core::{graph::PortKind, trace::UpstreamCalls};

    use super::*;
    use crate::config::{AppConfig, OutputConfig};

    const START_X: i64 = 100;
    const START_Y: i64 = 100;
    const INCR_X: i64 = 300;
    const INCR_Y: i64 = 300;

    fn record(value: serde_json::Value) -> TraceRecord {
        serde_json::from_value(value).unwrap()
    }

    fn position_of(graph: &GraphDescription, id: &str) -> (i64, i64) {
        let position = graph.node(id).unwrap().position();
        (position.x(), position.y())
    }

    #[test]
    fn test_leaf_only() {
        let graph = Engine::new().calculate_layout(&record(json!({
            "name": "Service",
            "type": "HTTP",
            "duration": "70.219µs"
        })));

        assert_eq!(graph.nodes_count(), 1);
        assert_eq!(graph.links_count(), 0);

        let node = graph.node("Service_0_0").unwrap();
        assert_eq!(position_of(&graph, "Service_0_0"), (START_X, START_Y));
        assert!(node.ports().is_empty());
        assert_eq!(node.properties().name(), "Service");
        assert_eq!(node.properties().kind(), Some("HTTP"));
        assert_eq!(node.properties().duration(), Some("70.219µs"));
        assert_eq!(node.properties().response(), None);
    }

    #[test]
    fn test_sequence_children() {
        let graph = Engine::new().calculate_layout(&record(json!({
            "name": "Service",
            "upstream_calls": [{"name": "Upstream"}, {"name": "Upstream3"}]
        })));

        let ids: Vec<_> = graph.nodes().keys().map(NodeId::as_str).collect();
        assert_eq!(ids, vec!["Service_0_0", "Upstream_1_0", "Upstream3_1_1"]);

        assert_eq!(
            position_of(&graph, "Upstream_1_0"),
            (START_X, START_Y + INCR_Y)
        );
        assert_eq!(
            position_of(&graph, "Upstream3_1_1"),
            (START_X + INCR_X, START_Y + INCR_Y)
        );

        assert_eq!(graph.links_count(), 2);
        for (link_id, port, target) in [
            ("Service_0_0_0", PortId::Output(0), "Upstream_1_0"),
            ("Service_0_0_1", PortId::Output(1), "Upstream3_1_1"),
        ] {
            let link = graph.link(link_id).unwrap();
            assert_eq!(link.from().node_id(), "Service_0_0");
            assert_eq!(link.from().port_id(), port);
            assert_eq!(link.to().node_id(), target);
            assert_eq!(link.to().port_id(), PortId::INPUT);
        }

        let root = graph.node("Service_0_0").unwrap();
        assert!(root.port(PortId::INPUT).is_none());
        assert_eq!(root.port(PortId::Output(1)).unwrap().kind(), PortKind::Output);
        assert_eq!(
            graph.node("Upstream_1_0").unwrap().properties().upstream_address(),
            None
        );
    }

    #[test]
    fn test_mapping_children_carry_address() {
        let graph = Engine::new().calculate_layout(&record(json!({
            "name": "Service",
            "upstream_calls": {"UpstreamAddr": {"name": "Upstream"}}
        })));

        let child = graph.node("Upstream_1_0").unwrap();
        assert_eq!(child.properties().upstream_address(), Some("UpstreamAddr"));
        assert_eq!(child.properties().name(), "Upstream");
    }

    #[test]
    fn test_nested_depth() {
        let graph = Engine::new().calculate_layout(&record(json!({
            "name": "root",
            "upstream_calls": [{
                "name": "child",
                "upstream_calls": [{"name": "grandchild"}]
            }]
        })));

        assert!(graph.contains_node("root_0_0"));
        assert!(graph.contains_node("child_1_0"));
        assert!(graph.contains_node("grandchild_2_0"));
        assert_eq!(
            position_of(&graph, "grandchild_2_0"),
            (START_X, START_Y + 2 * INCR_Y)
        );
        assert!(graph.link("child_1_0_0").is_some());
    }

    #[test]
    fn test_repeated_names_at_different_positions() {
        let graph = Engine::new().calculate_layout(&record(json!({
            "name": "api",
            "upstream_calls": [
                {"name": "api", "upstream_calls": [{"name": "api"}]},
                {"name": "api"}
            ]
        })));

        assert_eq!(graph.nodes_count(), 4);
        for id in ["api_0_0", "api_1_0", "api_1_1", "api_2_0"] {
            assert!(graph.contains_node(id), "missing {id}");
        }
    }

    #[test]
    fn test_cousins_with_same_name_get_distinct_ids() {
        let graph = Engine::new().calculate_layout(&record(json!({
            "name": "web",
            "upstream_calls": [
                {"name": "a", "upstream_calls": [{"name": "db"}]},
                {"name": "b", "upstream_calls": [{"name": "db"}]}
            ]
        })));

        assert_eq!(graph.nodes_count(), 5);
        assert!(graph.contains_node("db_2_0"));
        assert!(graph.contains_node("db_2_0#1"));

        let link = graph.link("b_1_1_0").unwrap();
        assert_eq!(link.to().node_id(), "db_2_0#1");
        // Overlapping placement across branches is kept as is.
        assert_eq!(position_of(&graph, "db_2_0"), (START_X, START_Y + 2 * INCR_Y));
        assert_eq!(
            position_of(&graph, "db_2_0#1"),
            (START_X + INCR_X, START_Y + 2 * INCR_Y)
        );
    }

    #[test]
    fn test_empty_upstreams_behave_like_absent() {
        let absent = Engine::new().calculate_layout(&record(json!({"name": "x"})));
        let empty_list =
            Engine::new().calculate_layout(&record(json!({"name": "x", "upstream_calls": []})));
        let empty_map =
            Engine::new().calculate_layout(&record(json!({"name": "x", "upstream_calls": {}})));

        assert_eq!(absent, empty_list);
        assert_eq!(absent, empty_map);
    }

    #[test]
    fn test_custom_spacing() {
        let engine = Engine::from_config(&LayoutConfig::new(0, 10, 50, 20));
        let graph = engine.calculate_layout(&record(json!({
            "name": "root",
            "upstream_calls": [{"name": "a"}, {"name": "b"}, {"name": "c"}]
        })));

        assert_eq!(position_of(&graph, "root_0_0"), (0, 10));
        assert_eq!(position_of(&graph, "c_1_2"), (100, 30));
    }

    #[test]
    fn test_extreme_anchor_clamps_positions() {
        let config = LayoutConfig::new(0, i64::MAX - 10, i64::MAX, 300);
        let app_config = AppConfig::new(config.clone(), OutputConfig::default());
        assert!(app_config.validate().is_ok());

        let graph = Engine::from_config(&config).calculate_layout(&record(json!({
            "name": "a",
            "upstream_calls": [{"name": "b"}, {"name": "c"}, {"name": "d"}]
        })));

        assert_eq!(position_of(&graph, "b_1_0"), (0, i64::MAX));
        assert_eq!(position_of(&graph, "c_1_1"), (i64::MAX, i64::MAX));
        assert_eq!(position_of(&graph, "d_1_2"), (i64::MAX, i64::MAX));
        assert_eq!(graph.nodes_count(), 4);
    }

    #[test]
    fn test_builder_setters() {
        let engine = Engine::new()
            .with_anchor(Position::new(5, 5))
            .with_horizontal_spacing(10)
            .with_vertical_spacing(15);
        let graph = engine.calculate_layout(&record(json!({
            "name": "root",
            "upstream_calls": [{"name": "a"}, {"name": "b"}]
        })));

        assert_eq!(position_of(&graph, "b_1_1"), (15, 20));
    }

    #[test]
    fn test_properties_are_copied() {
        let graph = Engine::new().calculate_layout(&record(json!({
            "name": "web",
            "uri": "http://localhost:9090",
            "type": "HTTP",
            "ip_addresses": ["10.5.0.3", "10.5.0.4"],
            "duration": "1.2ms",
            "body": "<b>ok</b>",
            "code": 200
        })));

        let value = serde_json::to_value(graph.node("web_0_0").unwrap().properties()).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "web",
                "body": "<b>ok</b>",
                "ip_addresses": ["10.5.0.3", "10.5.0.4"],
                "duration": "1.2ms",
                "type": "HTTP",
                "response": 200,
                "uri": "http://localhost:9090"
            })
        );
    }

    #[test]
    fn test_offset_is_zero() {
        let graph = Engine::new()
            .with_anchor(Position::new(999, 999))
            .calculate_layout(&TraceRecord::new("x"));
        assert!(graph.offset().is_zero());
    }

    // ===================
    // Property Tests
    // ===================

    fn trace_strategy() -> impl Strategy<Value = TraceRecord> {
        // A small alphabet forces repeated names across the tree.
        let name = prop::sample::select(vec!["api", "db", "cache", "web"]);
        let leaf = name.prop_map(TraceRecord::new);

        leaf.prop_recursive(4, 48, 4, |inner| {
            let name = prop::sample::select(vec!["api", "db", "cache", "web"]);
            (
                name,
                prop::collection::vec(inner, 0..4),
                any::<bool>(),
            )
                .prop_map(|(name, children, as_mapping)| {
                    let calls = if as_mapping {
                        UpstreamCalls::Mapping(
                            children
                                .into_iter()
                                .enumerate()
                                .map(|(i, child)| (format!("addr-{i}"), child))
                                .collect(),
                        )
                    } else {
                        UpstreamCalls::Sequence(children)
                    };
                    TraceRecord::new(name).with_upstream_calls(calls)
                })
        })
    }

    fn check_deterministic(root: &TraceRecord) -> Result<(), TestCaseError> {
        let engine = Engine::new();
        prop_assert_eq!(engine.calculate_layout(root), engine.calculate_layout(root));
        Ok(())
    }

    fn check_node_count(root: &TraceRecord) -> Result<(), TestCaseError> {
        let graph = Engine::new().calculate_layout(root);
        prop_assert_eq!(graph.nodes_count(), root.records_count());
        prop_assert_eq!(graph.links_count(), root.records_count() - 1);
        Ok(())
    }

    fn check_unique_ids(root: &TraceRecord) -> Result<(), TestCaseError> {
        let graph = Engine::new().calculate_layout(root);
        let ids: HashSet<_> = graph.nodes().values().map(|n| n.id().clone()).collect();
        prop_assert_eq!(ids.len(), root.records_count());
        for (key, node) in graph.nodes() {
            prop_assert_eq!(key, node.id());
        }
        Ok(())
    }

    fn check_ports_match_links(root: &TraceRecord) -> Result<(), TestCaseError> {
        let graph = Engine::new().calculate_layout(root);

        let roots: Vec<_> = graph
            .nodes()
            .values()
            .filter(|node| node.input_ports().count() == 0)
            .collect();
        prop_assert_eq!(roots.len(), 1);

        for node in graph.nodes().values() {
            let inputs: Vec<_> = node.input_ports().map(|p| p.id()).collect();
            prop_assert!(inputs.is_empty() || inputs == vec![PortId::INPUT]);

            let outgoing: Vec<_> = graph
                .links()
                .values()
                .filter(|link| link.from().node_id() == node.id())
                .collect();
            prop_assert_eq!(node.output_ports().count(), outgoing.len());

            for link in outgoing {
                prop_assert!(node.port(link.from().port_id()).is_some());
                let target = graph.node(link.to().node_id().as_str());
                prop_assert!(target.is_some());
                prop_assert!(target.and_then(|t| t.port(PortId::INPUT)).is_some());
            }
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn layout_is_deterministic(root in trace_strategy()) {
            check_deterministic(&root)?;
        }

        #[test]
        fn layout_has_one_node_per_record(root in trace_strategy()) {
            check_node_count(&root)?;
        }

        #[test]
        fn layout_node_ids_are_unique(root in trace_strategy()) {
            check_unique_ids(&root)?;
        }

        #[test]
        fn layout_ports_match_links(root in trace_strategy()) {
            check_ports_match_links(&root)?;
        }
    }
}
