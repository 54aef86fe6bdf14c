//! Laneflow Core Types and Definitions
//!
//! This crate provides the foundational types shared by the laneflow
//! blueprint parser, layout engine, and exporters. It includes:
//!
//! - **Identifiers**: String-interned node and lane identifiers ([`identifier::Id`])
//! - **Colors**: Color handling with CSS color support ([`color::Color`])
//! - **Geometry**: Points, sizes, and bounding boxes ([`geometry`] module)
//! - **Semantic**: The process blueprint model ([`semantic`] module)

pub mod color;
pub mod geometry;
pub mod identifier;
pub mod semantic;
