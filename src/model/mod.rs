//! Document model types.
//!
//! This module defines the in-memory form of a document object model as
//! produced by an upstream layout-extraction engine: elements stored in
//! per-kind collections, linked into a tree by [`Handle`]s, each carrying a
//! label and page geometry.

mod document;
mod element;
mod geometry;
mod handle;

pub use document::Document;
pub use element::{Element, Label, Payload};
pub use geometry::{BoundingBox, CoordOrigin, ProvenanceItem};
pub use handle::{Collection, Handle, Location, Target};
