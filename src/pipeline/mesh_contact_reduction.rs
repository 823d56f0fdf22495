use parry3d::bounding_volume::Aabb;
#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

use crate::geometry::{ConvexContactManifold, NonconvexReductionChild, TestTriangle, Triangle, TriMeshBvh};
use crate::math::{Point, Rotation, Vector};
use crate::params::ReductionParams;
use crate::utils::ScratchPool;

/// A batch of children (and their matching triangles) one reduction call
/// operates on: a start/count pair into arrays that may be larger than the
/// batch itself, mirroring how the upstream narrow-phase keeps one scratch
/// allocation per step and reduces several (convex, mesh) pairs out of
/// sub-ranges of it.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ChildRange {
    pub start: usize,
    pub count: usize,
}

impl ChildRange {
    pub fn new(start: usize, count: usize) -> Self {
        Self { start, count }
    }

    fn end(&self) -> usize {
        self.start + self.count
    }
}

/// The one entry precondition cheap enough to check unconditionally. Every
/// other precondition (finite triangle data, valid `ChildIndexB`) is a
/// caller contract enforced by `debug_assert!` inside
/// [`reduce_trimesh_contacts`], not threaded through this `Result` —
/// checking them in release builds would tax a kernel called thousands of
/// times per physics step for conditions the producing stage already
/// guarantees.
#[derive(thiserror::Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ReductionError {
    #[error(
        "child range [{start}, {end}) does not fit the triangle array (len {triangles_len}) \
         or the children array (len {children_len})"
    )]
    RangeOutOfBounds {
        start: usize,
        end: usize,
        triangles_len: usize,
        children_len: usize,
    },
}

/// Reduces the internal-edge false positives out of a batch of per-triangle
/// convex contact manifolds produced against one mesh: manifolds whose
/// normal would create a non-physical bump at a shared triangle edge are
/// either deleted or have their normal corrected to the blocking triangle's
/// face normal.
///
/// `triangles` and `children` are indexed by `range.start + i` for `i` in
/// `0..range.count`. `mesh` is only consulted by the sparse path, to fetch
/// neighbor triangles that fall outside the original child set.
#[allow(clippy::too_many_arguments)]
pub fn reduce_trimesh_contacts(
    triangles: &[Triangle],
    children: &mut [NonconvexReductionChild],
    range: ChildRange,
    flip: bool,
    query_bounds: &Aabb,
    mesh_orientation: Rotation,
    mesh: &dyn TriMeshBvh,
    pool: &mut ScratchPool,
    params: &ReductionParams,
) -> Result<(), ReductionError> {
    if range.end() > triangles.len() || range.end() > children.len() {
        return Err(ReductionError::RangeOutOfBounds {
            start: range.start,
            end: range.end(),
            triangles_len: triangles.len(),
            children_len: children.len(),
        });
    }

    debug_assert!(
        triangles[range.start..range.end()].iter().all(Triangle::is_finite),
        "reduce_trimesh_contacts: non-finite triangle vertex in the given range"
    );
    debug_assert!(
        children[range.start..range.end()]
            .iter()
            .all(|child| child.child_index_b < mesh.num_triangles()),
        "reduce_trimesh_contacts: ChildIndexB out of bounds for the given mesh"
    );

    let inv_orientation = mesh_orientation.inverse();

    if range.count < params.dense_sparse_switch {
        log::trace!(
            "reduce_trimesh_contacts: {} children, dense path",
            range.count
        );
        run_dense_path(
            triangles,
            children,
            range,
            flip,
            mesh_orientation,
            inv_orientation,
            pool,
            params,
        );
    } else {
        log::trace!(
            "reduce_trimesh_contacts: {} children, sparse path",
            range.count
        );
        run_sparse_path(
            triangles,
            children,
            range,
            flip,
            query_bounds,
            mesh_orientation,
            inv_orientation,
            mesh,
            pool,
            params,
        );
    }

    let (deleted, corrected) = summarize(children, range);
    log::debug!(
        "reduce_trimesh_contacts: {} deleted, {} normal-corrected out of {} children",
        deleted,
        corrected,
        range.count
    );

    Ok(())
}

fn summarize(children: &[NonconvexReductionChild], range: ChildRange) -> (usize, usize) {
    // Purely diagnostic: distinguishing "deleted" from "corrected" exactly
    // would require remembering pre-reduction counts, which isn't worth
    // threading through just for a log line. A manifold with count 0 here
    // may also have started empty; that's fine for a summary metric.
    let mut deleted = 0;
    let mut corrected = 0;
    for i in 0..range.count {
        let manifold = &children[range.start + i].manifold;
        if manifold.is_empty() {
            deleted += 1;
        } else if manifold.normal != Vector::zeros() {
            corrected += 1;
        }
    }
    (deleted, corrected)
}

/// Outcome of preparing one source manifold for the infringement scan: it
/// may turn out to need no scan at all.
enum Prepared {
    /// Manifold was empty, or had its face-collision flag cleared and needs
    /// no further work.
    Done,
    /// Run the predicate against this mesh-space (position, normal) pair.
    Query(Point, Vector),
}

/// Steps 1-2 of the dense/sparse path, shared verbatim: skip empty
/// manifolds, let face-collision contacts through untouched (after clearing
/// their flag bit), and otherwise transform the deepest contact into
/// mesh-local space.
fn prepare_source(
    manifold: &mut ConvexContactManifold,
    inv_orientation: &Rotation,
    flip: bool,
) -> Prepared {
    if manifold.is_empty() {
        return Prepared::Done;
    }

    if manifold.contacts[0].is_face_collision() {
        for contact in manifold.contacts.iter_mut() {
            contact.clear_face_collision_flag();
        }
        return Prepared::Done;
    }

    let deepest = manifold
        .deepest_contact_index()
        .expect("non-empty manifold has a deepest contact");
    let contact = manifold.contacts[deepest];

    let (local_point, local_normal) = if flip {
        (contact.offset - manifold.offset_b, -manifold.normal)
    } else {
        (contact.offset, manifold.normal)
    };

    let p = Point::from(inv_orientation * local_point);
    let m = inv_orientation * local_normal;
    Prepared::Query(p, m)
}

#[allow(clippy::too_many_arguments)]
fn run_dense_path(
    triangles: &[Triangle],
    children: &mut [NonconvexReductionChild],
    range: ChildRange,
    flip: bool,
    mesh_orientation: Rotation,
    inv_orientation: Rotation,
    pool: &mut ScratchPool,
    params: &ReductionParams,
) {
    let mut test_triangles = pool.test_triangles.checkout();
    test_triangles.reserve(range.count);
    for i in 0..range.count {
        test_triangles.push(TestTriangle::new(&triangles[range.start + i], i as i32, params));
    }

    for i in 0..range.count {
        let prepared = prepare_source(&mut children[range.start + i].manifold, &inv_orientation, flip);
        let (p, m) = match prepared {
            Prepared::Done => continue,
            Prepared::Query(p, m) => (p, m),
        };

        // Scans `j` from 0, including `j == i` (the self-test): see the
        // design notes on why that case must not be optimized away.
        for j in 0..range.count {
            if test_triangles[j].should_block_normal(p, m, params) {
                let corrected = test_triangles[j].face_normal();
                test_triangles[i].blocked = true;
                test_triangles[i].corrected_normal = corrected;
                test_triangles[j].force_deletion_on_block = false;
                break;
            }
        }
    }

    resolve_blocks(&test_triangles, children, range.start, mesh_orientation, flip);
}

#[allow(clippy::too_many_arguments)]
fn run_sparse_path(
    triangles: &[Triangle],
    children: &mut [NonconvexReductionChild],
    range: ChildRange,
    flip: bool,
    query_bounds: &Aabb,
    mesh_orientation: Rotation,
    inv_orientation: Rotation,
    mesh: &dyn TriMeshBvh,
    pool: &mut ScratchPool,
    params: &ReductionParams,
) {
    let initial_capacity = 2 * range.count;

    let mut map = pool.neighbor_maps.checkout();
    map.reserve(initial_capacity);
    let mut neighbor_indices = pool.neighbor_indices.checkout();
    neighbor_indices.reserve(initial_capacity);

    // Pre-populate with every source triangle, keyed by its ChildIndexB, so
    // the first `count` map slots align 1:1 with `children[range.start..]`.
    for i in 0..range.count {
        let key = children[range.start + i].child_index_b;
        let triangle = TestTriangle::new(&triangles[range.start + i], i as i32, params);
        map.insert_new(key, triangle);
    }

    let extents = query_bounds.extents();
    let max_span = extents.x.max(extents.y).max(extents.z);
    let expansion = Vector::repeat(max_span * params.bvh_expansion_coefficient);

    for i in 0..range.count {
        let prepared = prepare_source(&mut children[range.start + i].manifold, &inv_orientation, flip);
        let (p, m) = match prepared {
            Prepared::Done => continue,
            Prepared::Query(p, m) => (p, m),
        };

        neighbor_indices.clear();
        let query_aabb = Aabb::new(p - expansion, p + expansion);
        mesh.query_overlaps(&query_aabb, &mut |index| {
            neighbor_indices.push(index);
            true
        });

        map.reserve(neighbor_indices.len());

        for &neighbor in neighbor_indices.iter() {
            let position = map.find_or_insert_with(neighbor, || {
                TestTriangle::new(&mesh.local_child(neighbor), -1, params)
            });

            if map.get(position).should_block_normal(p, m, params) {
                let corrected = map.get(position).face_normal();
                map.get_mut(i).blocked = true;
                map.get_mut(i).corrected_normal = corrected;
                map.get_mut(position).force_deletion_on_block = false;
                break;
            }
        }
    }

    if map.len() > initial_capacity {
        log::trace!(
            "reduce_trimesh_contacts: neighbor map grew to {} entries (initial capacity {})",
            map.len(),
            initial_capacity
        );
    }

    // Only the first `count` slots are sources; the rest are neighbor-only
    // (`child_index == -1`) and must not be resolved.
    resolve_blocks(
        &map.values()[..range.count],
        children,
        range.start,
        mesh_orientation,
        flip,
    );
}

fn resolve_blocks(
    test_triangles: &[TestTriangle],
    children: &mut [NonconvexReductionChild],
    start: usize,
    mesh_orientation: Rotation,
    flip: bool,
) {
    for test_triangle in test_triangles {
        if test_triangle.child_index < 0 {
            continue;
        }
        let manifold = &mut children[start + test_triangle.child_index as usize].manifold;
        try_apply_block_to_triangle(test_triangle, manifold, mesh_orientation, flip);
    }
}

/// `TryApplyBlockToTriangle`: the second pass that turns a blocked source
/// into either a deletion or a normal correction.
fn try_apply_block_to_triangle(
    test_triangle: &TestTriangle,
    manifold: &mut ConvexContactManifold,
    mesh_orientation: Rotation,
    flip: bool,
) {
    if !test_triangle.blocked {
        return;
    }

    if test_triangle.force_deletion_on_block {
        manifold.clear();
        return;
    }

    let has_positive_depth = manifold.contacts.iter().any(|c| c.depth > 0.0);
    if !has_positive_depth {
        manifold.clear();
        return;
    }

    let corrected = if flip {
        test_triangle.corrected_normal
    } else {
        -test_triangle.corrected_normal
    };
    manifold.normal = mesh_orientation * corrected;
}
