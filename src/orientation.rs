//! Enumeration of the orientations a box type may be placed in.
//!
//! The generation order is part of the determinism contract of the packing
//! engine: orientations are tried in exactly the order returned here.

use crate::model::{BoxType, Orientation, RotationPolicy};
use crate::types::Vec3;

/// Returns the distinct orientations allowed by the box type's rotation policy.
///
/// - `Fixed`: `(l, w, h)` only, id 0.
/// - `Layered`: `(l, w, h)` id 0 and, if `l != w`, `(w, l, h)` id 1.
/// - `Full`: `(l,w,h) (l,h,w) (w,l,h) (w,h,l) (h,l,w) (h,w,l)` with ids 0–5,
///   skipping permutations equal to one already produced.
///
/// # Examples
/// ```
/// use pallet_planner::model::{BoxType, RotationPolicy};
/// use pallet_planner::orientation::orientations;
///
/// let cube = BoxType::new("C", (300.0, 300.0, 300.0), 1.0, 1, RotationPolicy::Full).unwrap();
/// assert_eq!(orientations(&cube).len(), 1);
/// ```
pub fn orientations(box_type: &BoxType) -> Vec<Orientation> {
    let (l, w, h) = (box_type.length, box_type.width, box_type.height);

    match box_type.can_rotate {
        RotationPolicy::Fixed => vec![orientation(l, w, h, 0)],
        RotationPolicy::Layered => {
            let mut result = vec![orientation(l, w, h, 0)];
            if l != w {
                result.push(orientation(w, l, h, 1));
            }
            result
        }
        RotationPolicy::Full => {
            let permutations = [
                (l, w, h),
                (l, h, w),
                (w, l, h),
                (w, h, l),
                (h, l, w),
                (h, w, l),
            ];

            let mut result: Vec<Orientation> = Vec::with_capacity(permutations.len());
            for (id, (a, b, c)) in permutations.into_iter().enumerate() {
                let dims = Vec3::new(a, b, c);
                if result.iter().any(|o| o.dims == dims) {
                    continue;
                }
                result.push(Orientation {
                    dims,
                    rotation_id: id as u8,
                });
            }
            result
        }
    }
}

#[inline]
fn orientation(l: f64, w: f64, h: f64, rotation_id: u8) -> Orientation {
    Orientation {
        dims: Vec3::new(l, w, h),
        rotation_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn box_type(dims: (f64, f64, f64), can_rotate: RotationPolicy) -> BoxType {
        BoxType::new("T", dims, 1.0, 1, can_rotate).unwrap()
    }

    fn ids(list: &[Orientation]) -> Vec<u8> {
        list.iter().map(|o| o.rotation_id).collect()
    }

    #[test]
    fn fixed_yields_catalogue_orientation_only() {
        let list = orientations(&box_type((400.0, 300.0, 200.0), RotationPolicy::Fixed));
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].dims, Vec3::new(400.0, 300.0, 200.0));
        assert_eq!(list[0].rotation_id, 0);
    }

    #[test]
    fn layered_swaps_length_and_width_only() {
        let list = orientations(&box_type((400.0, 300.0, 200.0), RotationPolicy::Layered));
        assert_eq!(ids(&list), vec![0, 1]);
        assert_eq!(list[1].dims, Vec3::new(300.0, 400.0, 200.0));
        assert!(list.iter().all(|o| o.dims.z == 200.0));
    }

    #[test]
    fn layered_square_footprint_has_single_orientation() {
        let list = orientations(&box_type((300.0, 300.0, 200.0), RotationPolicy::Layered));
        assert_eq!(ids(&list), vec![0]);
    }

    #[test]
    fn full_asymmetric_box_has_six_orientations_in_fixed_order() {
        let list = orientations(&box_type((1.0, 2.0, 3.0), RotationPolicy::Full));
        assert_eq!(ids(&list), vec![0, 1, 2, 3, 4, 5]);
        let dims: Vec<Vec3> = list.iter().map(|o| o.dims).collect();
        assert_eq!(
            dims,
            vec![
                Vec3::new(1.0, 2.0, 3.0),
                Vec3::new(1.0, 3.0, 2.0),
                Vec3::new(2.0, 1.0, 3.0),
                Vec3::new(2.0, 3.0, 1.0),
                Vec3::new(3.0, 1.0, 2.0),
                Vec3::new(3.0, 2.0, 1.0),
            ]
        );
    }

    #[test]
    fn full_with_repeated_dimension_keeps_first_seen_ids() {
        // (l,w,h) = (2,2,5): (2,2,5)#0 (2,5,2)#1 (2,2,5)dup (2,5,2)dup (5,2,2)#4 (5,2,2)dup
        let list = orientations(&box_type((2.0, 2.0, 5.0), RotationPolicy::Full));
        assert_eq!(ids(&list), vec![0, 1, 4]);

        // (l,w,h) = (2,5,5): (2,5,5)#0 (2,5,5)dup (5,2,5)#2 (5,5,2)#3 (5,2,5)dup (5,5,2)dup
        let list = orientations(&box_type((2.0, 5.0, 5.0), RotationPolicy::Full));
        assert_eq!(ids(&list), vec![0, 2, 3]);
    }

    #[test]
    fn full_cube_collapses_to_one() {
        let list = orientations(&box_type((4.0, 4.0, 4.0), RotationPolicy::Full));
        assert_eq!(ids(&list), vec![0]);
    }
}
