//! Geometric helpers for 3D collision detection on the pallet.
//!
//! Boxes are placed by abutting faces, so the collision test tolerates
//! contact and sub-tolerance penetration. Only real volume overlap counts.

use crate::model::PlacedBox;
use crate::types::BoundingBox;

/// Overlap (in mm) two cuboids may share on an axis without colliding.
pub const COLLISION_TOLERANCE: f64 = 0.1;

/// Checks whether two cuboids overlap by more than `tolerance` on every axis.
///
/// Uses axis-aligned bounding box (AABB) intervals: on each of X, Y and Z the
/// condition `a.min < b.max - ε && a.max > b.min + ε` must hold.
///
/// # Examples
/// ```
/// use pallet_planner::geometry::{COLLISION_TOLERANCE, collides};
/// use pallet_planner::types::{BoundingBox, Vec3};
///
/// let a = BoundingBox::from_position_and_dims(Vec3::zero(), Vec3::new(400.0, 300.0, 200.0));
/// let b = BoundingBox::from_position_and_dims(Vec3::new(400.0, 0.0, 0.0), Vec3::new(400.0, 300.0, 200.0));
/// assert!(!collides(&a, &b, COLLISION_TOLERANCE));
/// ```
#[inline]
pub fn collides(a: &BoundingBox, b: &BoundingBox, tolerance: f64) -> bool {
    a.intersects_with_tolerance(b, tolerance)
}

/// Checks a candidate cuboid against every placed box.
pub fn collides_with_any(candidate: &BoundingBox, placed: &[PlacedBox], tolerance: f64) -> bool {
    placed
        .iter()
        .any(|p| collides(candidate, &p.bounding_box(), tolerance))
}

/// Length of the overlap of two 1D intervals, at least 0.0.
///
/// # Examples
/// ```
/// use pallet_planner::geometry::overlap_1d;
///
/// assert_eq!(overlap_1d(0.0, 5.0, 3.0, 8.0), 2.0);
/// assert_eq!(overlap_1d(0.0, 5.0, 6.0, 8.0), 0.0);
/// ```
#[inline]
pub fn overlap_1d(a1: f64, a2: f64, b1: f64, b2: f64) -> f64 {
    (a2.min(b2) - a1.max(b1)).max(0.0)
}

/// Footprint overlap of a cuboid with a placed box in the XY plane.
#[inline]
pub fn overlap_area_xy(a: &BoundingBox, b: &PlacedBox) -> f64 {
    a.overlap_area_xy(&b.bounding_box())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Dimensions, Position};
    use crate::types::Vec3;

    fn placed(pos: (f64, f64, f64), dims: (f64, f64, f64)) -> PlacedBox {
        PlacedBox {
            box_type_id: "T".to_string(),
            position: Position {
                x: pos.0,
                y: pos.1,
                z: pos.2,
            },
            dimensions: Dimensions {
                l: dims.0,
                w: dims.1,
                h: dims.2,
            },
            rotation_id: 0,
            color: "#000000".to_string(),
            weight: 1.0,
        }
    }

    fn cuboid(pos: (f64, f64, f64), dims: (f64, f64, f64)) -> BoundingBox {
        BoundingBox::from_position_and_dims(
            Vec3::new(pos.0, pos.1, pos.2),
            Vec3::new(dims.0, dims.1, dims.2),
        )
    }

    #[test]
    fn overlapping_cuboids_collide() {
        let a = cuboid((0.0, 0.0, 0.0), (100.0, 100.0, 100.0));
        let b = cuboid((50.0, 50.0, 50.0), (100.0, 100.0, 100.0));
        assert!(collides(&a, &b, COLLISION_TOLERANCE));
        assert!(collides(&b, &a, COLLISION_TOLERANCE));
    }

    #[test]
    fn face_contact_is_not_a_collision() {
        let base = cuboid((0.0, 0.0, 0.0), (100.0, 100.0, 100.0));
        for other in [
            cuboid((100.0, 0.0, 0.0), (100.0, 100.0, 100.0)),
            cuboid((0.0, 100.0, 0.0), (100.0, 100.0, 100.0)),
            cuboid((0.0, 0.0, 100.0), (100.0, 100.0, 100.0)),
        ] {
            assert!(!collides(&base, &other, COLLISION_TOLERANCE));
        }
    }

    #[test]
    fn separation_on_a_single_axis_suffices() {
        let a = cuboid((0.0, 0.0, 0.0), (100.0, 100.0, 100.0));
        let b = cuboid((10.0, 10.0, 150.0), (50.0, 50.0, 50.0));
        assert!(!collides(&a, &b, COLLISION_TOLERANCE));
    }

    #[test]
    fn tolerance_absorbs_rounding_noise() {
        let a = cuboid((0.0, 0.0, 0.0), (100.0, 100.0, 100.0));
        let b = cuboid((99.95, 0.0, 0.0), (100.0, 100.0, 100.0));
        assert!(!collides(&a, &b, COLLISION_TOLERANCE));
        assert!(collides(&a, &b, 0.0));
    }

    #[test]
    fn collides_with_any_scans_all_boxes() {
        let boxes = vec![
            placed((0.0, 0.0, 0.0), (100.0, 100.0, 100.0)),
            placed((300.0, 0.0, 0.0), (100.0, 100.0, 100.0)),
        ];
        let free = cuboid((100.0, 0.0, 0.0), (200.0, 100.0, 100.0));
        let blocked = cuboid((250.0, 0.0, 0.0), (100.0, 100.0, 100.0));
        assert!(!collides_with_any(&free, &boxes, COLLISION_TOLERANCE));
        assert!(collides_with_any(&blocked, &boxes, COLLISION_TOLERANCE));
    }

    #[test]
    fn footprint_overlap_area() {
        let lower = placed((0.0, 0.0, 0.0), (100.0, 100.0, 50.0));
        let upper = cuboid((50.0, 0.0, 50.0), (100.0, 100.0, 50.0));
        assert!((overlap_area_xy(&upper, &lower) - 5000.0).abs() < 1e-9);
        assert_eq!(overlap_1d(0.0, 5.0, 3.0, 8.0), 2.0);
    }
}
