//! Support-area stability model.
//!
//! A box resting on the deck is always stable. A box above the deck needs a
//! minimum fraction of its base resting on the top faces of boxes directly
//! below it.

use crate::geometry::overlap_area_xy;
use crate::model::PlacedBox;
use crate::types::{BoundingBox, EPSILON_GENERAL};

/// Minimum supported fraction of a box's base area.
pub const MIN_SUPPORT_RATIO: f64 = 0.8;

/// Max gap (mm) between a supporting top face and the supported base.
pub const SUPPORT_HEIGHT_TOLERANCE: f64 = 1.0;

/// Fraction of the candidate's base lying on top faces within `height_tolerance`.
///
/// Overlap areas of all supporting boxes are summed. Returns 1.0 for boxes on
/// the deck and 0.0 for a degenerate (zero-area) base.
pub fn support_ratio(candidate: &BoundingBox, placed: &[PlacedBox], height_tolerance: f64) -> f64 {
    let base_z = candidate.min.z;
    if base_z <= EPSILON_GENERAL {
        return 1.0;
    }

    let base_area = candidate.dimensions().base_area();
    if base_area <= EPSILON_GENERAL {
        return 0.0;
    }

    let support_area: f64 = placed
        .iter()
        .filter(|p| (p.top_z() - base_z).abs() <= height_tolerance)
        .map(|p| overlap_area_xy(candidate, p))
        .sum();

    support_area / base_area
}

/// Checks whether a candidate cuboid is sufficiently supported.
pub fn is_stable(
    candidate: &BoundingBox,
    placed: &[PlacedBox],
    min_ratio: f64,
    height_tolerance: f64,
) -> bool {
    if candidate.min.z <= EPSILON_GENERAL {
        return true;
    }
    support_ratio(candidate, placed, height_tolerance) >= min_ratio
}
