//! Swimlane Core Types
//!
//! This crate provides the foundational types shared by the swimlane layout
//! engine and its collaborators:
//!
//! - **Identifiers**: String-interned element identifiers ([`identifier::Id`])
//! - **Geometry**: Points, sizes and bounding boxes ([`geometry`] module)
//! - **Model**: The parsed process graph consumed by layout ([`model`] module)
//! - **Positioned**: The resolved diagram handed to writers ([`positioned`] module)

pub mod geometry;
pub mod identifier;
pub mod model;
pub mod positioned;
