use arrayvec::ArrayVec;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

use crate::math::{Real, Vector, MAX_MANIFOLD_POINTS};

/// Bit 15 of a contact's feature id. When set, the contact was generated
/// against the interior of a triangle's face rather than one of its edges
/// or vertices.
pub const FACE_COLLISION_FLAG: u32 = 1 << 15;

/// Dot-product threshold used upstream (by the per-triangle narrow-phase
/// test, not by this crate) to decide whether a contact qualifies as a face
/// collision. Kept here only because it is one of the bit-exact constants
/// this kernel's contract is specified against.
pub const MINIMUM_DOT_FOR_FACE_COLLISION: Real = 0.999_999;

/// A single contact between the convex shape and one mesh triangle.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Contact {
    /// Contact position, expressed as an offset relative to the convex shape.
    pub offset: Vector,
    /// Signed penetration depth; positive means the shapes interpenetrate.
    pub depth: Real,
    /// Opaque feature id from the narrow-phase; bit 15 is
    /// [`FACE_COLLISION_FLAG`], the rest is preserved verbatim.
    pub feature_id: u32,
}

impl Contact {
    pub fn new(offset: Vector, depth: Real, feature_id: u32) -> Self {
        Self {
            offset,
            depth,
            feature_id,
        }
    }

    #[inline]
    pub fn is_face_collision(&self) -> bool {
        self.feature_id & FACE_COLLISION_FLAG != 0
    }

    #[inline]
    pub fn clear_face_collision_flag(&mut self) {
        self.feature_id &= !FACE_COLLISION_FLAG;
    }
}

/// Up to four contacts between one convex shape and one mesh triangle,
/// sharing a single normal.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ConvexContactManifold {
    pub contacts: ArrayVec<Contact, MAX_MANIFOLD_POINTS>,
    /// Points convex -> mesh in the un-flipped case.
    pub normal: Vector,
    /// Only meaningful when the manifold is flipped.
    pub offset_b: Vector,
}

impl ConvexContactManifold {
    pub fn new(contacts: ArrayVec<Contact, MAX_MANIFOLD_POINTS>, normal: Vector) -> Self {
        Self {
            contacts,
            normal,
            offset_b: Vector::zeros(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// Index of the contact with maximum depth, ties broken by first
    /// occurrence (i.e. the lowest index).
    ///
    /// Returns `None` for an empty manifold. `Iterator::max_by` keeps the
    /// *last* of equally-maximum elements, which is the wrong tie-break here,
    /// so this scans by hand instead.
    pub fn deepest_contact_index(&self) -> Option<usize> {
        let mut best: Option<(usize, Real)> = None;
        for (i, contact) in self.contacts.iter().enumerate() {
            match best {
                Some((_, best_depth)) if contact.depth <= best_depth => {}
                _ => best = Some((i, contact.depth)),
            }
        }
        best.map(|(i, _)| i)
    }

    /// Deletes every contact, leaving the normal untouched (it is dead data
    /// once the count is zero, matching the upstream engine's behavior of
    /// never reading a manifold's normal after its count hits zero).
    pub fn clear(&mut self) {
        self.contacts.clear();
    }
}

/// A manifold paired with the index of the mesh triangle it was generated
/// against.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct NonconvexReductionChild {
    pub manifold: ConvexContactManifold,
    pub child_index_b: u32,
}

impl NonconvexReductionChild {
    pub fn new(manifold: ConvexContactManifold, child_index_b: u32) -> Self {
        Self {
            manifold,
            child_index_b,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(depth: Real, feature_id: u32) -> Contact {
        Contact::new(Vector::zeros(), depth, feature_id)
    }

    #[test]
    fn deepest_contact_breaks_ties_toward_first_occurrence() {
        let mut contacts = ArrayVec::new();
        contacts.push(contact(0.5, 0));
        contacts.push(contact(0.9, 1));
        contacts.push(contact(0.9, 2));
        contacts.push(contact(0.3, 3));
        let manifold = ConvexContactManifold::new(contacts, Vector::zeros());
        assert_eq!(manifold.deepest_contact_index(), Some(1));
    }

    #[test]
    fn deepest_contact_of_empty_manifold_is_none() {
        let manifold = ConvexContactManifold::new(ArrayVec::new(), Vector::zeros());
        assert_eq!(manifold.deepest_contact_index(), None);
    }

    #[test]
    fn face_collision_flag_round_trips() {
        let mut c = contact(0.1, FACE_COLLISION_FLAG | 7);
        assert!(c.is_face_collision());
        c.clear_face_collision_flag();
        assert!(!c.is_face_collision());
        assert_eq!(c.feature_id, 7);
    }

    #[test]
    fn clear_empties_contacts_but_keeps_normal() {
        let mut contacts = ArrayVec::new();
        contacts.push(contact(0.1, 0));
        let mut manifold = ConvexContactManifold::new(contacts, Vector::new(0.0, 1.0, 0.0));
        manifold.clear();
        assert!(manifold.is_empty());
        assert_eq!(manifold.normal, Vector::new(0.0, 1.0, 0.0));
    }
}
