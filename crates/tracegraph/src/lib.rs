//! Tracegraph - Lays out service request traces as node/link graphs.
//!
//! A trace document describes one request as a tree of service calls. This
//! crate decodes such documents and lays them out as a flat
//! [`GraphDescription`] that a diagram renderer can draw directly.

pub mod config;

mod error;
mod layout;

pub use tracegraph_core::{graph, identifier, trace};

pub use error::TracegraphError;
pub use layout::Engine;

use log::{debug, info, trace};
use serde::Deserialize;
use serde_json::Value;

use config::AppConfig;
use graph::GraphDescription;
use trace::TraceRecord;

/// Builder for decoding traces and laying them out as graph descriptions.
///
/// # Examples
///
/// ```rust
/// use tracegraph::{GraphBuilder, config::AppConfig};
///
/// let source = r#"{"name": "web", "upstream_calls": [{"name": "api"}]}"#;
///
/// let builder = GraphBuilder::new(AppConfig::default());
///
/// // Decode the trace document
/// let record = builder.parse(source)
///     .expect("Failed to parse");
///
/// // Lay it out
/// let graph = builder.transform(&record);
/// assert_eq!(graph.nodes_count(), 2);
///
/// // Encode it for the renderer
/// let json = builder.render_json(&graph)
///     .expect("Failed to render");
/// assert!(json.contains("\"web_0_0\""));
/// ```
#[derive(Debug, Default)]
pub struct GraphBuilder {
    config: AppConfig,
}

impl GraphBuilder {
    /// Create a new graph builder with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration including layout and output settings
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration this builder was created with.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse a JSON trace document into a trace record.
    ///
    /// # Errors
    ///
    /// Returns [`TracegraphError::Parse`] when the document is not valid
    /// JSON, is not an object, or lacks a `name`.
    pub fn parse(&self, source: &str) -> Result<TraceRecord, TracegraphError> {
        info!("Parsing trace");

        let record: TraceRecord = serde_json::from_str(source)
            .map_err(|err| TracegraphError::new_parse_error(err, source))?;

        debug!(
            root = record.name(),
            records_count = record.records_count();
            "Trace parsed successfully"
        );
        trace!(record:?; "Parsed trace");

        Ok(record)
    }

    /// Lay out a trace record as a graph description.
    ///
    /// This never fails: missing optional fields are simply left out of the
    /// resulting node properties.
    pub fn transform(&self, record: &TraceRecord) -> GraphDescription {
        info!(root = record.name(); "Laying out trace");
        let engine = Engine::from_config(self.config.layout());
        engine.calculate_layout(record)
    }

    /// Lay out an already decoded JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`TracegraphError::Trace`] when the value is not a trace record.
    pub fn transform_value(&self, value: &Value) -> Result<GraphDescription, TracegraphError> {
        let record = TraceRecord::deserialize(value).map_err(TracegraphError::Trace)?;
        Ok(self.transform(&record))
    }

    /// Encode a graph description as JSON.
    ///
    /// Indentation follows the `output.pretty` setting.
    ///
    /// # Errors
    ///
    /// Returns [`TracegraphError::Serialize`] if encoding fails.
    pub fn render_json(&self, graph: &GraphDescription) -> Result<String, TracegraphError> {
        let json = if self.config.output().pretty() {
            serde_json::to_string_pretty(graph)
        } else {
            serde_json::to_string(graph)
        }
        .map_err(TracegraphError::Serialize)?;

        info!(
            nodes_count = graph.nodes_count(),
            links_count = graph.links_count();
            "Graph rendered successfully"
        );
        Ok(json)
    }
}
