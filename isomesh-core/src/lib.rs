//! Core data structures and traits for isomesh
//!
//! This crate provides the data model shared by the isosurface extractors:
//! grid descriptors, scalar field views, extracted surfaces, a compact
//! triangle mesh for export and inspection, and the writer trait the
//! triangulator emits into.

pub mod point;
pub mod grid;
pub mod field;
pub mod surface;
pub mod mesh;
pub mod buffer;
pub mod traits;
pub mod error;

pub use point::*;
pub use grid::*;
pub use field::*;
pub use surface::*;
pub use mesh::*;
pub use buffer::*;
pub use traits::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3};
