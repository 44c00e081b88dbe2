//! Identifiers for graph nodes, links, and ports
//!
//! This module provides [`NodeId`], [`LinkId`], and [`PortId`]. Node and link
//! identifiers are derived from a record's position in the trace tree, so the
//! same trace always yields the same identifiers.

use std::{borrow::Borrow, fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Identifier of a node in a graph description.
///
/// Formatted as `name_level_index`, where `level` is the depth of the record
/// in the trace tree and `index` is its position among its siblings.
///
/// # Examples
///
/// ```
/// use tracegraph_core::identifier::NodeId;
///
/// let id = NodeId::new("payments", 1, 2);
/// assert_eq!(id, "payments_1_2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Creates the identifier of the record `name` found at `level` and
    /// sibling position `index`.
    pub fn new(name: &str, level: usize, index: usize) -> Self {
        Self(format!("{name}_{level}_{index}"))
    }

    /// Creates the `occurrence`-th alternative of this identifier.
    ///
    /// Alternatives end in `#occurrence` and can never be produced by
    /// [`NodeId::new`], whose identifiers always end in a decimal index.
    pub fn with_occurrence(&self, occurrence: usize) -> Self {
        Self(format!("{}#{occurrence}", self.0))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Identifier of a link in a graph description.
///
/// Formatted as the source node identifier followed by `_` and the sibling
/// index of the target node.
///
/// # Examples
///
/// ```
/// use tracegraph_core::identifier::{LinkId, NodeId};
///
/// let source = NodeId::new("frontend", 0, 0);
/// assert_eq!(LinkId::new(&source, 1), "frontend_0_0_1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(String);

impl LinkId {
    /// Creates the identifier of the link leaving `source` towards its
    /// `index`-th child.
    pub fn new(source: &NodeId, index: usize) -> Self {
        Self(format!("{source}_{index}"))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for LinkId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for LinkId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for LinkId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Identifier of a port on a node.
///
/// Serialized as `input<N>` or `output<N>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortId {
    Input(usize),
    Output(usize),
}

impl PortId {
    /// The single input port carried by every non-root node.
    pub const INPUT: PortId = PortId::Input(0);

    /// Returns `true` for input ports.
    pub fn is_input(self) -> bool {
        matches!(self, PortId::Input(_))
    }

    /// Returns `true` for output ports.
    pub fn is_output(self) -> bool {
        matches!(self, PortId::Output(_))
    }

    /// Returns the numeric suffix of the port.
    pub fn index(self) -> usize {
        match self {
            PortId::Input(index) | PortId::Output(index) => index,
        }
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortId::Input(index) => write!(f, "input{index}"),
            PortId::Output(index) => write!(f, "output{index}"),
        }
    }
}

/// Error returned when a string is not a valid [`PortId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid port identifier: {0:?}")]
pub struct ParsePortIdError(String);

impl FromStr for PortId {
    type Err = ParsePortIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_index = |digits: &str| {
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ParsePortIdError(s.to_string()));
            }
            digits
                .parse::<usize>()
                .map_err(|_| ParsePortIdError(s.to_string()))
        };

        if let Some(digits) = s.strip_prefix("input") {
            parse_index(digits).map(PortId::Input)
        } else if let Some(digits) = s.strip_prefix("output") {
            parse_index(digits).map(PortId::Output)
        } else {
            Err(ParsePortIdError(s.to_string()))
        }
    }
}

impl Serialize for PortId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PortId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
