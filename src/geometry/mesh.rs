use parry3d::bounding_volume::Aabb;

use super::Triangle;

/// Abstraction over the collider the kernel fetches neighbor geometry from.
///
/// The upstream engine's mesh handle is a concrete triangle-array type today,
/// but nothing in this kernel depends on that: it only needs a bounding
/// volume query and an index -> triangle lookup, so non-triangle-array mesh
/// representations (height-fields, procedural meshes) can plug in by
/// implementing this trait.
pub trait TriMeshBvh {
    /// Invokes `visitor` once for every child index whose stored AABB
    /// overlaps `aabb`. The kernel always continues (never asks the visitor
    /// to stop early), but the `bool` return keeps the same shape as the
    /// upstream BVH traversal visitor so a real BVH's early-exit machinery
    /// keeps working for other callers of the same traversal.
    fn query_overlaps(&self, aabb: &Aabb, visitor: &mut dyn FnMut(u32) -> bool);

    /// Returns the mesh-local triangle for `index`, post-scale. The mesh may
    /// apply scaling or indirection internally, so callers must go through
    /// this accessor rather than reading triangle storage directly.
    fn local_child(&self, index: u32) -> Triangle;

    /// Total number of triangles the mesh exposes. Used only to validate
    /// caller-supplied `ChildIndexB` values in debug builds.
    fn num_triangles(&self) -> u32;
}
