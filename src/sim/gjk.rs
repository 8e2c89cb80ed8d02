//! GJK overlap testing in Minkowski-difference space
//!
//! Two convex shapes overlap iff their Minkowski difference contains the
//! origin. GJK searches for an origin-enclosing simplex by walking support
//! points; when it finds one, the simplex seeds EPA for penetration depth
//! and normal.

use glam::Vec2;

use super::epa::{self, Penetration};
use super::hitbox::Convex;

/// An ordered point set in Minkowski-difference space. Holds at most 3
/// points during the GJK search; EPA grows it into a full polytope.
pub type Simplex = Vec<Vec2>;

/// Safety bound on the simplex search loop. 2D simplices converge in a
/// handful of iterations; anything longer is numerical pathology.
const MAX_ITERATIONS: usize = 100;

/// Polygon winding order, determined once before EPA expansion and held
/// fixed while the polytope grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winding {
    Clockwise,
    CounterClockwise,
}

/// Vector triple product expanded for 2D: `v2 * (v1 . v3) - v1 * (v2 . v3)`.
/// Yields a vector perpendicular to `v1`-ish input edges, pointing toward
/// whatever `v2` leans at.
#[inline]
pub(crate) fn triple_product(v1: Vec2, v2: Vec2, v3: Vec2) -> Vec2 {
    v2 * v1.dot(v3) - v1 * v2.dot(v3)
}

/// Counter-clockwise perpendicular: `(-y, x)`.
#[inline]
pub(crate) fn perp(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// Minkowski-difference support point: the farthest point of `a` along
/// `direction` minus the farthest point of `b` along `-direction`.
pub fn minkowski_support(a: &impl Convex, b: &impl Convex, direction: Vec2) -> Vec2 {
    a.farthest_point(direction) - b.farthest_point(-direction)
}

/// Determine the winding of a simplex polygon from the sign of the first
/// non-zero cross product of consecutive vertices. A perfectly degenerate
/// polygon is treated as counter-clockwise.
pub fn simplex_winding(simplex: &[Vec2]) -> Winding {
    for (i, &a) in simplex.iter().enumerate() {
        let b = simplex[(i + 1) % simplex.len()];
        let cross = a.perp_dot(b);
        if cross > 0.0 {
            return Winding::CounterClockwise;
        } else if cross < 0.0 {
            return Winding::Clockwise;
        }
    }
    Winding::CounterClockwise
}

/// One step of the simplex-contains-origin test. Returns true when the
/// 3-point simplex encloses the origin; otherwise trims the simplex and
/// redirects the search.
///
/// The last-added point is the reference vertex `A`; `ao` points from it
/// back at the origin.
fn simplex_check(simplex: &mut Simplex, direction: &mut Vec2) -> bool {
    let a = *simplex.last().unwrap_or(&Vec2::ZERO);
    let ao = -a;

    if simplex.len() == 3 {
        let ab = simplex[1] - a;
        let ac = simplex[0] - a;

        let ab_perp = triple_product(ac, ab, ab);
        let ac_perp = triple_product(ab, ac, ac);

        if ac_perp.dot(ao) >= 0.0 {
            // Origin beyond edge AC: drop the middle point, search along
            // AC's outward normal.
            simplex.remove(1);
            *direction = ac_perp;
        } else if ab_perp.dot(ao) < 0.0 {
            // Origin inside both edge regions: enclosed.
            return true;
        } else {
            simplex.remove(0);
            *direction = ab_perp;
        }
    } else {
        // Line case: search perpendicular to AB, toward the origin. The
        // triple product degenerates when the origin sits on the edge;
        // fall back to the rotated edge normal.
        let ab = simplex[0] - a;
        *direction = triple_product(ab, ao, ab);
        if direction.abs().max_element() < f32::EPSILON {
            *direction = -perp(ab);
        }
    }

    false
}

/// Run the GJK support search. Returns the origin-enclosing simplex on
/// overlap, or `None` when a separating axis exists.
fn search(a: &impl Convex, b: &impl Convex) -> Option<Simplex> {
    let mut direction = b.center() - a.center();
    if direction == Vec2::ZERO {
        direction = Vec2::X;
    }

    let mut simplex: Simplex = Vec::with_capacity(3);
    let support = minkowski_support(a, b, direction);
    simplex.push(support);

    // The first support point not reaching past the origin is already a
    // separating-axis proof.
    if support.dot(direction) <= 0.0 {
        return None;
    }

    direction = -direction;
    for _ in 0..MAX_ITERATIONS {
        let support = minkowski_support(a, b, direction);
        simplex.push(support);

        if support.dot(direction) <= 0.0 {
            return None;
        }
        if simplex_check(&mut simplex, &mut direction) {
            return Some(simplex);
        }
    }

    log::debug!("gjk: simplex search hit the iteration bound, treating as separated");
    None
}

/// Do two convex shapes overlap?
pub fn intersects(a: &impl Convex, b: &impl Convex) -> bool {
    search(a, b).is_some()
}

/// Overlap test with penetration details.
///
/// Returns `None` when the shapes do not overlap. On overlap the
/// [`Penetration`] normal is the minimum-translation direction for `b`:
/// moving `b` by `depth * normal` resolves the contact.
pub fn contact(a: &impl Convex, b: &impl Convex) -> Option<Penetration> {
    search(a, b).map(|simplex| epa::penetration(simplex, a, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::hitbox::Hitbox;
    use proptest::prelude::*;

    #[test]
    fn test_disjoint_rects_do_not_intersect() {
        let a = Hitbox::new(0.0, 0.0, 10.0, 10.0);
        let b = Hitbox::new(20.0, 20.0, 10.0, 10.0);
        assert!(!intersects(&a, &b));
        assert!(contact(&a, &b).is_none());
    }

    #[test]
    fn test_touching_edges_do_not_intersect() {
        // Shared edge at x=10: the early-out dot is exactly zero.
        let a = Hitbox::new(0.0, 0.0, 10.0, 10.0);
        let b = Hitbox::new(10.0, 0.0, 10.0, 10.0);
        assert!(!intersects(&a, &b));
    }

    #[test]
    fn test_overlapping_rects_intersect() {
        let a = Hitbox::new(0.0, 0.0, 10.0, 10.0);
        let b = Hitbox::new(5.0, 5.0, 10.0, 10.0);
        assert!(intersects(&a, &b));

        let pen = contact(&a, &b).unwrap();
        assert!(pen.depth > 0.0);
        assert!((pen.normal.length() - 1.0).abs() < 1e-4);
        assert!(pen.converged);
    }

    #[test]
    fn test_coincident_centers_still_detected() {
        // Zero initial direction falls back to (1, 0).
        let a = Hitbox::new(0.0, 0.0, 10.0, 10.0);
        let b = Hitbox::new(2.0, 2.0, 6.0, 6.0);
        assert!(intersects(&a, &b));
    }

    #[test]
    fn test_containment_is_overlap() {
        let outer = Hitbox::new(0.0, 0.0, 100.0, 100.0);
        let inner = Hitbox::new(40.0, 40.0, 10.0, 10.0);
        assert!(intersects(&outer, &inner));
        assert!(intersects(&inner, &outer));
    }

    #[test]
    fn test_winding_of_known_triangles() {
        let ccw = vec![Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0), Vec2::new(-1.0, -1.0)];
        assert_eq!(simplex_winding(&ccw), Winding::CounterClockwise);

        let cw: Vec<Vec2> = ccw.iter().rev().copied().collect();
        assert_eq!(simplex_winding(&cw), Winding::Clockwise);

        // Degenerate (collinear) defaults to counter-clockwise.
        let line = vec![Vec2::new(1.0, 1.0), Vec2::new(2.0, 2.0), Vec2::new(3.0, 3.0)];
        assert_eq!(simplex_winding(&line), Winding::CounterClockwise);
    }

    #[test]
    fn test_resolving_spec_case_separates() {
        let a = Hitbox::new(0.0, 0.0, 10.0, 10.0);
        let mut b = Hitbox::new(5.0, 5.0, 10.0, 10.0);

        let pen = contact(&a, &b).unwrap();
        b.translate(pen.depth * pen.normal);
        assert!(!intersects(&a, &b));
    }

    proptest! {
        /// Resolution idempotence: pushing the second shape out along the
        /// reported normal must separate the pair.
        #[test]
        fn prop_resolving_contact_separates(
            ax in -100.0f32..100.0, ay in -100.0f32..100.0,
            aw in 5.0f32..80.0, ah in 5.0f32..80.0,
            bx in -100.0f32..100.0, by in -100.0f32..100.0,
            bw in 5.0f32..80.0, bh in 5.0f32..80.0,
        ) {
            let a = Hitbox::new(ax, ay, aw, ah);
            let mut b = Hitbox::new(bx, by, bw, bh);

            if let Some(pen) = contact(&a, &b) {
                prop_assert!(pen.depth >= 0.0);
                prop_assert!((pen.normal.length() - 1.0).abs() < 1e-3);
                // Tiny slack absorbs one-ulp rounding in the translation.
                b.translate(pen.normal * (pen.depth + 1e-3));
                prop_assert!(!intersects(&a, &b));
            }
        }

        /// GJK agrees with the closed-form AABB overlap test.
        #[test]
        fn prop_matches_aabb_overlap(
            ax in -100.0f32..100.0, ay in -100.0f32..100.0,
            aw in 5.0f32..80.0, ah in 5.0f32..80.0,
            bx in -100.0f32..100.0, by in -100.0f32..100.0,
            bw in 5.0f32..80.0, bh in 5.0f32..80.0,
        ) {
            let a = Hitbox::new(ax, ay, aw, ah);
            let b = Hitbox::new(bx, by, bw, bh);

            let strict_overlap = ax < bx + bw && bx < ax + aw
                && ay < by + bh && by < ay + ah;
            // Boundary-touching pairs are reported as separated, so only
            // check the unambiguous cases.
            let gap = ax + aw < bx || bx + bw < ax || ay + ah < by || by + bh < ay;
            if gap {
                prop_assert!(!intersects(&a, &b));
            } else if strict_overlap {
                prop_assert!(intersects(&a, &b));
            }
        }
    }
}
