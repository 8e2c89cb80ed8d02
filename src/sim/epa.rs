//! Expanding Polytope Algorithm
//!
//! Given a GJK simplex known to enclose the origin, EPA repeatedly expands
//! it toward the Minkowski-difference hull until the closest polytope edge
//! to the origin stops moving. That edge's distance and outward normal are
//! the penetration depth and minimum-translation axis.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::gjk::{self, Simplex, Winding, minkowski_support};
use super::hitbox::Convex;

/// Expansion is cut off after this many edge insertions; axis-aligned
/// rectangles converge in one or two.
const MAX_ITERATIONS: usize = 100;

/// Penetration depth and minimum-translation normal for an overlapping
/// pair. Moving the second shape of the contact by `depth * normal`
/// resolves the overlap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Penetration {
    pub depth: f32,
    /// Unit vector along the minimum-translation axis
    pub normal: Vec2,
    /// False when the expansion loop hit its iteration bound and the
    /// depth/normal pair is a best-effort approximation
    pub converged: bool,
}

struct ClosestEdge {
    distance: f32,
    normal: Vec2,
    /// Index of the edge's second vertex; new support points are inserted
    /// here to expand the polytope across this edge.
    index: usize,
}

/// Scan every polytope edge for the one closest to the origin. The edge
/// normal is the edge vector rotated 90 degrees, with the rotation sign
/// picked by the fixed winding so it always points outward.
fn closest_edge(simplex: &[Vec2], winding: Winding) -> ClosestEdge {
    let mut closest = ClosestEdge {
        distance: f32::MAX,
        normal: Vec2::ZERO,
        index: 0,
    };

    for (i, &start) in simplex.iter().enumerate() {
        let j = (i + 1) % simplex.len();
        let edge = simplex[j] - start;

        let normal = match winding {
            Winding::Clockwise => gjk::perp(edge),
            Winding::CounterClockwise => -gjk::perp(edge),
        }
        .normalize_or_zero();

        let distance = start.dot(normal).abs();
        if distance < closest.distance {
            closest = ClosestEdge {
                distance,
                normal,
                index: j,
            };
        }
    }

    closest
}

/// Expand the origin-enclosing `simplex` into the Minkowski-difference
/// polytope of `a` and `b` and report the penetration.
///
/// Non-convergence is a soft failure: after the iteration bound the last
/// computed normal and projection are returned with `converged: false`.
pub fn penetration(mut simplex: Simplex, a: &impl Convex, b: &impl Convex) -> Penetration {
    let winding = gjk::simplex_winding(&simplex);
    let epsilon = f32::EPSILON.sqrt();

    let mut best = (0.0f32, Vec2::ZERO);
    for _ in 0..MAX_ITERATIONS {
        let edge = closest_edge(&simplex, winding);
        let point = minkowski_support(a, b, edge.normal);
        let projection = point.dot(edge.normal);

        if projection - edge.distance < epsilon {
            return Penetration {
                depth: projection,
                normal: edge.normal,
                converged: true,
            };
        }

        best = (projection, edge.normal);
        simplex.insert(edge.index, point);
    }

    log::warn!(
        "epa: penetration search hit the iteration bound, returning best-effort result"
    );
    Penetration {
        depth: best.0,
        normal: best.1,
        converged: false,
    }
}
