//! Configuration types for Tracegraph layouts.
//!
//! This module provides configuration structures that control where trace
//! nodes are placed and how the resulting graph is encoded. All types
//! implement [`serde::Deserialize`] for flexible loading from external
//! sources.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level application configuration combining layout and output settings.
//! - [`LayoutConfig`] - Anchor of the root node and the spacing between nodes.
//! - [`OutputConfig`] - Controls how the graph description is serialized.
//!
//! # Example
//!
//! ```
//! # use tracegraph::config::AppConfig;
//! // Use default configuration
//! let config = AppConfig::default();
//! assert_eq!(config.layout().start_x(), 100);
//! assert!(config.validate().is_ok());
//! ```

use serde::Deserialize;

/// Top-level application configuration combining layout and output settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Output configuration section.
    #[serde(default)]
    output: OutputConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified layout and output configurations.
    ///
    /// # Arguments
    ///
    /// * `layout` - Node placement settings.
    /// * `output` - Serialization settings.
    pub fn new(layout: LayoutConfig, output: OutputConfig) -> Self {
        Self { layout, output }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the output configuration.
    pub fn output(&self) -> &OutputConfig {
        &self.output
    }

    /// Checks the configuration for values the layout cannot use.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first offending setting.
    pub fn validate(&self) -> Result<(), String> {
        self.layout.validate()
    }
}

/// Node placement configuration.
///
/// The root node is placed at (`start_x`, `start_y`). Each child sits
/// `incr_y` pixels below its parent and `incr_x` pixels to the right of
/// its previous sibling.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    start_x: i64,
    start_y: i64,
    incr_x: i64,
    incr_y: i64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            start_x: 100,
            start_y: 100,
            incr_x: 300,
            incr_y: 300,
        }
    }
}

impl LayoutConfig {
    /// Creates a new [`LayoutConfig`].
    ///
    /// # Arguments
    ///
    /// * `start_x`, `start_y` - Position of the root node.
    /// * `incr_x` - Horizontal pitch between siblings.
    /// * `incr_y` - Vertical pitch between a parent and its children.
    pub fn new(start_x: i64, start_y: i64, incr_x: i64, incr_y: i64) -> Self {
        Self {
            start_x,
            start_y,
            incr_x,
            incr_y,
        }
    }

    pub fn start_x(&self) -> i64 {
        self.start_x
    }

    pub fn start_y(&self) -> i64 {
        self.start_y
    }

    pub fn incr_x(&self) -> i64 {
        self.incr_x
    }

    pub fn incr_y(&self) -> i64 {
        self.incr_y
    }

    fn validate(&self) -> Result<(), String> {
        if self.incr_x < 0 {
            return Err(format!(
                "layout.incr_x must not be negative, got {}",
                self.incr_x
            ));
        }
        if self.incr_y < 0 {
            return Err(format!(
                "layout.incr_y must not be negative, got {}",
                self.incr_y
            ));
        }
        Ok(())
    }
}

/// Serialization settings for graph descriptions.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct OutputConfig {
    /// Emit indented JSON instead of a single line.
    #[serde(default)]
    pretty: bool,
}

impl OutputConfig {
    /// Creates a new [`OutputConfig`].
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Returns `true` when the JSON output should be indented.
    pub fn pretty(&self) -> bool {
        self.pretty
    }
}
