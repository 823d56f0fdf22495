use crate::math::Real;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// The kernel's numerical knobs, gathered in one struct instead of being
/// scattered as inline literals through the dispatcher and predicate. The
/// [`Default`] values are the bit-exact constants this crate's behavior is
/// specified against; callers embedding this kernel in a full engine may
/// retune them (e.g. the dense/sparse switch for a target platform) without
/// touching kernel code.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ReductionParams {
    /// Source-child count at or above which the sparse (BVH-query) path is
    /// used instead of the dense quadratic scan.
    pub dense_sparse_switch: usize,
    /// Strict infringement threshold for the edge-case test: an edge normal
    /// dot-product strictly greater than this counts as "infringed".
    pub strict_infringement_epsilon: Real,
    /// Lenient near-parallel infringement threshold: every *touched* edge
    /// must clear at least this (looser) bound, or the contact escapes
    /// blocking.
    pub lenient_infringement_epsilon: Real,
    /// Coefficient applied to `DistanceThreshold` to get the negative
    /// tolerance used when deciding whether an edge plane was "touched".
    pub edge_presence_coefficient: Real,
    /// Coefficient applied to the query AABB's maximum extent to get the
    /// sparse path's neighbor-query expansion.
    pub bvh_expansion_coefficient: Real,
    /// Leading coefficient of the scale-aware `DistanceThreshold` formula.
    pub distance_threshold_coefficient: Real,
    /// Sub-coefficient applied to `|A|^2` inside the `DistanceThreshold` max.
    pub distance_threshold_vertex_coefficient: Real,
}

impl Default for ReductionParams {
    fn default() -> Self {
        Self {
            dense_sparse_switch: 16,
            strict_infringement_epsilon: 1.0e-6,
            lenient_infringement_epsilon: -1.0e-2,
            edge_presence_coefficient: -1.0e-2,
            bvh_expansion_coefficient: 1.0e-4,
            distance_threshold_coefficient: 1.0e-3,
            distance_threshold_vertex_coefficient: 1.0e-4,
        }
    }
}
