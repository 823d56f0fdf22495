//! Type aliases shared by every module, mirroring how the rest of the pack's
//! physics crates centralize their scalar/vector choice in one place instead
//! of spelling out `nalgebra` types everywhere.

/// The scalar type used throughout the kernel. Always single precision: the
/// contact data this crate consumes comes from a narrow-phase stage that
/// already committed to `f32`.
pub type Real = f32;

/// A point in mesh-local or world space.
pub type Point = na::Point3<Real>;

/// A displacement / direction in mesh-local or world space.
pub type Vector = na::Vector3<Real>;

/// A 4-lane packed vector, used for the SIMD-friendly layout of the
/// per-triangle anchors and plane normals in [`TestTriangle`](crate::geometry::TestTriangle).
pub type Vector4 = na::Vector4<Real>;

/// The mesh's world orientation, and its inverse (used to rotate manifold
/// data into mesh-local space and back).
pub type Rotation = na::UnitQuaternion<Real>;

/// Maximum number of contact points carried by a single manifold.
pub const MAX_MANIFOLD_POINTS: usize = 4;
