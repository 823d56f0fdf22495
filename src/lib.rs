//! Internal-edge contact reduction for convex-vs-trimesh narrow-phase output.
//!
//! After per-triangle narrow-phase collision detection produces independent
//! convex contact manifolds between a convex shape and the triangles of a
//! triangle-mesh collider, [`pipeline::reduce_trimesh_contacts`] analyzes
//! those manifolds jointly and corrects or suppresses the ones whose normal
//! would create a non-physical bump at a shared triangle edge — the classic
//! internal-edge problem in mesh collision.
//!
//! This crate only covers that reduction step. Narrow-phase manifold
//! generation, the broad-phase, the constraint solver and its thread
//! dispatch all live upstream or downstream of it.

extern crate nalgebra as na;

pub mod geometry;
pub mod math;
pub mod params;
pub mod pipeline;
pub mod utils;

pub use params::ReductionParams;
pub use pipeline::{reduce_trimesh_contacts, ChildRange, ReductionError};
pub use utils::ScratchPool;
