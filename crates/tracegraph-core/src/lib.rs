//! Tracegraph Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Tracegraph
//! layout engine and its consumers. It includes:
//!
//! - **Identifiers**: Node, link, and port identifiers ([`identifier`] module)
//! - **Trace**: The input call tree of a service request ([`trace`] module)
//! - **Graph**: The node/link description handed to a diagram renderer ([`graph`] module)

pub mod graph;
pub mod identifier;
pub mod trace;
