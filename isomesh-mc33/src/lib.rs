//! # isomesh MC33
//!
//! Marching Cubes 33 isosurface extraction over regular scalar grids.
//!
//! MC33 resolves the face and interior ambiguities of classic Marching
//! Cubes, so neighbouring cells always agree on how the surface crosses
//! their shared face and the output is free of cracks.
//!
//! ```no_run
//! use isomesh_core::{sphere_field, GridDescriptor, Point3d, Vector3d};
//! use isomesh_mc33::extract_isosurface;
//!
//! let grid = GridDescriptor::new([32, 32, 32], Point3d::new(-1.0, -1.0, -1.0), Vector3d::new(1.0 / 16.0, 1.0 / 16.0, 1.0 / 16.0))?;
//! let field = sphere_field(&grid, Point3d::origin(), 0.8);
//! let surface = extract_isosurface(&grid, 0.0, &field)?;
//! println!("{} triangles", surface.triangle_count());
//! # Ok::<(), isomesh_core::Error>(())
//! ```

pub mod tables;
pub mod sampler;
pub mod gradient;
pub mod classify;
pub mod pattern;
pub mod cache;
pub mod triangulate;
pub mod weld;
pub mod extract;
pub mod parallel;

// Re-export commonly used items
pub use sampler::*;
pub use gradient::*;
pub use classify::*;
pub use pattern::*;
pub use extract::*;
pub use weld::weld_coincident_vertices;
pub use parallel::{current_config, init_thread_pool, ThreadPoolConfig};
