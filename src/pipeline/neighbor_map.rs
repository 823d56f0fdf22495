use std::collections::HashMap;

use crate::geometry::TestTriangle;
use crate::utils::Resettable;

/// Maps mesh triangle index -> [`TestTriangle`], preserving insertion order
/// so the first `count` entries (the pre-populated sources) can be scanned
/// by position without touching the hash map. Neighbor triangles discovered
/// by BVH queries are deduplicated here: a triangle shared by several
/// sources' neighbor lists only gets its `TestTriangle` built once.
///
/// `TestTriangle` is `Copy`, so growing `triangles` never invalidates an
/// index previously handed out by [`NeighborMap::find_or_insert_with`] — only
/// raw references would need the capacity-reservation dance the spec
/// describes for a non-`Copy` payload.
#[derive(Default)]
pub struct NeighborMap {
    index_of: HashMap<u32, usize>,
    triangles: Vec<TestTriangle>,
}

impl NeighborMap {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            index_of: HashMap::with_capacity(capacity),
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn reserve(&mut self, additional: usize) {
        self.index_of.reserve(additional);
        self.triangles.reserve(additional);
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn contains_key(&self, key: u32) -> bool {
        self.index_of.contains_key(&key)
    }

    /// Inserts `value` under `key`, which must not already be present. Used
    /// for the pre-population step: every source triangle gets its
    /// `TestTriangle` built unconditionally by the caller.
    pub fn insert_new(&mut self, key: u32, value: TestTriangle) -> usize {
        debug_assert!(
            !self.index_of.contains_key(&key),
            "insert_new called with a key already present in the map"
        );
        let position = self.triangles.len();
        self.triangles.push(value);
        self.index_of.insert(key, position);
        position
    }

    /// Returns the position of `key`'s slot, building it with `make` if this
    /// is the first time `key` has been seen.
    pub fn find_or_insert_with(&mut self, key: u32, make: impl FnOnce() -> TestTriangle) -> usize {
        if let Some(&position) = self.index_of.get(&key) {
            return position;
        }
        let position = self.triangles.len();
        self.triangles.push(make());
        self.index_of.insert(key, position);
        position
    }

    pub fn get(&self, position: usize) -> &TestTriangle {
        &self.triangles[position]
    }

    pub fn get_mut(&mut self, position: usize) -> &mut TestTriangle {
        &mut self.triangles[position]
    }

    /// All slots as a flat slice, in insertion order. The first `count`
    /// entries (for a sparse-path call that pre-populated `count` sources)
    /// are exactly the source triangles, in source order.
    pub fn values(&self) -> &[TestTriangle] {
        &self.triangles
    }

    pub fn values_mut(&mut self) -> &mut [TestTriangle] {
        &mut self.triangles
    }
}

impl Resettable for NeighborMap {
    fn reset(&mut self) {
        self.index_of.clear();
        self.triangles.clear();
    }
}
