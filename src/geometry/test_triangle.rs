use crate::math::{Point, Real, Vector, Vector4};
use crate::params::ReductionParams;

use super::Triangle;

/// Per-triangle precomputation consumed by [`TestTriangle::should_block_normal`].
///
/// The four lanes pack the triangle's face plane and its three edge planes
/// into parallel 4-component vectors (lane 0: face, lane 1: AB, lane 2: BC,
/// lane 3: CA) so the infringement predicate is four scalar plane tests
/// expressed as a handful of `Vector4` ops rather than four separate structs.
#[derive(Copy, Clone, Debug)]
pub struct TestTriangle {
    anchor_x: Vector4,
    anchor_y: Vector4,
    anchor_z: Vector4,
    normal_x: Vector4,
    normal_y: Vector4,
    normal_z: Vector4,
    /// Scale-aware epsilon; see `ReductionParams::distance_threshold_coefficient`.
    pub distance_threshold: Real,
    /// Which source-child slot this triangle belongs to, or `-1` if it was
    /// materialized only as a neighbor/blocker.
    pub child_index: i32,
    /// Set once this triangle's own manifold has been found infringing on
    /// some other triangle.
    pub blocked: bool,
    /// Starts `true`; cleared the moment this triangle is consumed as a
    /// *blocker* by another manifold's infringement check, regardless of
    /// what that check decided for its own source.
    pub force_deletion_on_block: bool,
    /// The face normal of the first triangle found to infringe this source.
    /// Only meaningful when `blocked` is set.
    pub corrected_normal: Vector,
}

impl TestTriangle {
    pub fn new(triangle: &Triangle, child_index: i32, params: &ReductionParams) -> Self {
        let a = triangle.a.coords;
        let b = triangle.b.coords;
        let c = triangle.c.coords;

        let ab = b - a;
        let bc = c - b;
        let ca = a - c;

        let face_normal = ab.cross(&ca);
        let edge_normals = [
            face_normal.cross(&ab),
            face_normal.cross(&bc),
            face_normal.cross(&ca),
        ];

        let anchor_x = Vector4::new(a.x, a.x, b.x, c.x);
        let anchor_y = Vector4::new(a.y, a.y, b.y, c.y);
        let anchor_z = Vector4::new(a.z, a.z, b.z, c.z);

        let mut normal_x = Vector4::new(
            face_normal.x,
            edge_normals[0].x,
            edge_normals[1].x,
            edge_normals[2].x,
        );
        let mut normal_y = Vector4::new(
            face_normal.y,
            edge_normals[0].y,
            edge_normals[1].y,
            edge_normals[2].y,
        );
        let mut normal_z = Vector4::new(
            face_normal.z,
            edge_normals[0].z,
            edge_normals[1].z,
            edge_normals[2].z,
        );

        // Each lane is unit-normalized independently: divide by its own
        // length, not a shared one. Degenerate (zero-area) triangles produce
        // non-finite lanes here; that is tolerated, see `Triangle`'s doc.
        let len_sq = normal_x.component_mul(&normal_x)
            + normal_y.component_mul(&normal_y)
            + normal_z.component_mul(&normal_z);
        let inv_len = len_sq.map(|v| 1.0 / v.sqrt());
        normal_x.component_mul_assign(&inv_len);
        normal_y.component_mul_assign(&inv_len);
        normal_z.component_mul_assign(&inv_len);

        let distance_threshold = params.distance_threshold_coefficient
            * (params.distance_threshold_vertex_coefficient * a.norm_squared())
                .max(ab.norm_squared())
                .max(ca.norm_squared())
                .sqrt();

        Self {
            anchor_x,
            anchor_y,
            anchor_z,
            normal_x,
            normal_y,
            normal_z,
            distance_threshold,
            child_index,
            blocked: false,
            force_deletion_on_block: true,
            corrected_normal: Vector::zeros(),
        }
    }

    /// The face normal (lane 0), i.e. the value written into a blocked
    /// source's `corrected_normal`.
    pub fn face_normal(&self) -> Vector {
        Vector::new(self.normal_x[0], self.normal_y[0], self.normal_z[0])
    }

    /// `ShouldBlockNormal`: does a mesh-space contact at `p` with normal `m`
    /// infringe this triangle's face?
    pub fn should_block_normal(&self, p: Point, m: Vector, params: &ReductionParams) -> bool {
        let px = Vector4::repeat(p.x) - self.anchor_x;
        let py = Vector4::repeat(p.y) - self.anchor_y;
        let pz = Vector4::repeat(p.z) - self.anchor_z;

        let d = px.component_mul(&self.normal_x)
            + py.component_mul(&self.normal_y)
            + pz.component_mul(&self.normal_z);

        // Written as "all lanes within threshold" rather than "any lane
        // exceeds it": a degenerate (zero-area) triangle normalizes its
        // lanes to NaN, and `NaN > threshold` is `false`, so the negated
        // form would let every degenerate triangle fall through as if it
        // were always in proximity. Comparing with `<=` makes NaN fail the
        // gate instead, which is what keeps degenerate triangles from ever
        // blocking a contact.
        let in_proximity = d[0] <= self.distance_threshold
            && d[1] <= self.distance_threshold
            && d[2] <= self.distance_threshold
            && d[3] <= self.distance_threshold;
        if !in_proximity {
            return false;
        }

        // `edge_presence_coefficient` is already the signed -1e-2 factor, so
        // this is `-DistanceThreshold * 1e-2`.
        let neg_threshold = self.distance_threshold * params.edge_presence_coefficient;

        let on_ab = d[1] >= neg_threshold;
        let on_bc = d[2] >= neg_threshold;
        let on_ca = d[3] >= neg_threshold;

        if !(on_ab || on_bc || on_ca) {
            // Strictly interior: always a corrective target.
            return true;
        }

        let nd = self.normal_x * m.x + self.normal_y * m.y + self.normal_z * m.z;

        let eps1 = params.strict_infringement_epsilon;
        let eps2 = params.lenient_infringement_epsilon;

        let strictly_infringed = (on_ab && nd[1] > eps1)
            || (on_bc && nd[2] > eps1)
            || (on_ca && nd[3] > eps1);
        let all_near_infringed =
            (!on_ab || nd[1] > eps2) && (!on_bc || nd[2] > eps2) && (!on_ca || nd[3] > eps2);

        strictly_infringed && all_near_infringed
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::math::Vector;

    fn triangle(a: Point, b: Point, c: Point) -> Triangle {
        Triangle::new(a, b, c)
    }

    #[test]
    fn interior_contact_always_blocks_regardless_of_normal() {
        let params = ReductionParams::default();
        let t = TestTriangle::new(
            &triangle(
                Point::new(0.0, 0.0, 0.0),
                Point::new(1.0, 0.0, 0.0),
                Point::new(0.0, 0.0, 1.0),
            ),
            0,
            &params,
        );
        // Well inside the face, far from every edge relative to the tiny
        // scale-aware threshold: the edge-presence test never engages.
        let p = Point::new(0.3, 0.0, 0.3);
        assert!(t.should_block_normal(p, Vector::new(0.0, 1.0, 0.0), &params));
    }

    #[test]
    fn far_contact_never_blocks() {
        let params = ReductionParams::default();
        let t = TestTriangle::new(
            &triangle(
                Point::new(0.0, 0.0, 0.0),
                Point::new(1.0, 0.0, 0.0),
                Point::new(0.0, 0.0, 1.0),
            ),
            0,
            &params,
        );
        let p = Point::new(100.0, 100.0, 100.0);
        assert!(!t.should_block_normal(p, Vector::new(0.0, 1.0, 0.0), &params));
    }

    #[test]
    fn edge_contact_blocks_when_normal_points_past_the_edge() {
        let params = ReductionParams::default();
        // Shares edge A-B (the x axis between x=0 and x=1) with a triangle
        // extending into positive z; a contact on that edge whose normal
        // leans toward +z reads as infringing this triangle's AB edge.
        let t = TestTriangle::new(
            &triangle(
                Point::new(1.0, 0.0, 0.0),
                Point::new(0.0, 0.0, 0.0),
                Point::new(0.0, 0.0, -1.0),
            ),
            0,
            &params,
        );
        let p = Point::new(0.5, 0.0, 0.0);
        assert!(t.should_block_normal(p, Vector::new(0.0, 0.707, 0.707), &params));
    }

    #[test]
    fn edge_contact_does_not_block_when_normal_leans_the_other_way() {
        let params = ReductionParams::default();
        let t = TestTriangle::new(
            &triangle(
                Point::new(1.0, 0.0, 0.0),
                Point::new(0.0, 0.0, 0.0),
                Point::new(0.0, 0.0, -1.0),
            ),
            0,
            &params,
        );
        let p = Point::new(0.5, 0.0, 0.0);
        assert!(!t.should_block_normal(p, Vector::new(0.0, 0.707, -0.707), &params));
    }

    #[test]
    fn face_normal_matches_winding() {
        let params = ReductionParams::default();
        let t = TestTriangle::new(
            &triangle(
                Point::new(0.0, 0.0, 0.0),
                Point::new(1.0, 0.0, 0.0),
                Point::new(0.0, 0.0, 1.0),
            ),
            0,
            &params,
        );
        assert_relative_eq!(t.face_normal(), Vector::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn degenerate_triangle_never_blocks() {
        let params = ReductionParams::default();
        // Zero-area: b - a and a - c are parallel, so the face normal (and
        // every edge normal derived from it) is the zero vector, which
        // normalizes to NaN in every lane.
        let t = TestTriangle::new(
            &triangle(
                Point::new(0.0, 0.0, 0.0),
                Point::new(1.0, 0.0, 0.0),
                Point::new(2.0, 0.0, 0.0),
            ),
            0,
            &params,
        );
        assert!(!t.should_block_normal(
            Point::new(0.5, 0.0, 0.0),
            Vector::new(0.0, 1.0, 0.0),
            &params
        ));
        assert!(!t.should_block_normal(
            Point::new(100.0, 100.0, 100.0),
            Vector::new(0.0, 1.0, 0.0),
            &params
        ));
    }
}
