use crate::math::Point;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Three mesh-local vertices of a triangle-mesh child. Immutable for the
/// lifetime of one reduction call.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Triangle {
    pub a: Point,
    pub b: Point,
    pub c: Point,
}

impl Triangle {
    pub fn new(a: Point, b: Point, c: Point) -> Self {
        Self { a, b, c }
    }

    /// Unnormalized face normal, `(b - a) x (a - c)`. The cross-product order
    /// is significant: it fixes which side of the triangle is "outward" for
    /// every consumer of this type.
    pub fn raw_normal(&self) -> crate::math::Vector {
        (self.b - self.a).cross(&(self.a - self.c))
    }

    /// Whether every vertex coordinate is finite. Zero-area triangles are not
    /// checked here (they are tolerated downstream); this only catches NaN or
    /// infinite input, which is a caller bug.
    pub fn is_finite(&self) -> bool {
        self.a.coords.iter().all(|c| c.is_finite())
            && self.b.coords.iter().all(|c| c.is_finite())
            && self.c.coords.iter().all(|c| c.is_finite())
    }
}
