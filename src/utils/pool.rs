use std::ops::{Deref, DerefMut};

/// Something an [`ObjectPool`] can recycle: cheap to reset, no heap frees on
/// reuse.
pub trait Resettable: Default {
    fn reset(&mut self);
}

impl<T> Resettable for Vec<T> {
    fn reset(&mut self) {
        self.clear();
    }
}

/// A free-list of reusable buffers, borrowed for the scratch allocations one
/// reduction call needs and handed back automatically via [`Pooled`]'s
/// `Drop` impl. This is the crate's version of the upstream engine's
/// workspace-reuse pattern (e.g. `ContactPair`'s cached narrow-phase
/// workspace): avoid reallocating per-step scratch storage across calls.
#[derive(Default)]
pub struct ObjectPool<T> {
    free: Vec<T>,
}

impl<T: Resettable> ObjectPool<T> {
    pub fn new() -> Self {
        Self { free: Vec::new() }
    }

    /// Checks out a recycled (or freshly allocated) `T`, already reset.
    pub fn checkout(&mut self) -> Pooled<'_, T> {
        let mut value = self.free.pop().unwrap_or_default();
        value.reset();
        Pooled {
            value: Some(value),
            free: &mut self.free,
        }
    }
}

/// An RAII guard over a pooled value. Returns the value to its pool on drop,
/// so "every scratch allocation obtained from the pool is returned before
/// the kernel exits" holds even across early-return paths.
pub struct Pooled<'a, T> {
    value: Option<T>,
    free: &'a mut Vec<T>,
}

impl<'a, T> Deref for Pooled<'a, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.value.as_ref().expect("Pooled value taken before drop")
    }
}

impl<'a, T> DerefMut for Pooled<'a, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.value.as_mut().expect("Pooled value taken before drop")
    }
}

impl<'a, T> Drop for Pooled<'a, T> {
    fn drop(&mut self) {
        if let Some(value) = self.value.take() {
            self.free.push(value);
        }
    }
}

/// The scratch storage a single reduction call borrows from: one buffer pool
/// per scratch structure used by the dense and sparse paths. Dense and
/// sparse never run in the same call, but keeping them as separate fields
/// means checking one out never blocks checking out the other.
#[derive(Default)]
pub struct ScratchPool {
    pub(crate) test_triangles: ObjectPool<Vec<crate::geometry::TestTriangle>>,
    pub(crate) neighbor_indices: ObjectPool<Vec<u32>>,
    pub(crate) neighbor_maps: ObjectPool<crate::pipeline::NeighborMap>,
}

impl ScratchPool {
    pub fn new() -> Self {
        Self::default()
    }
}
