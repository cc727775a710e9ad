//! Bottom-Left-Fill candidate search.
//!
//! Candidate points are the origin plus, for every placed box, the point past
//! its right face, the point past its far face and the point on its top. They
//! are tried lowest first, then left-most, then front-most; the first point
//! that is in bounds, collision-free and supported wins.

use std::cmp::Ordering;

use crate::geometry::collides_with_any;
use crate::model::{Orientation, Pallet, PlacedBox};
use crate::optimizer::PackingConfig;
use crate::stability::is_stable;
use crate::types::{BoundingBox, EPSILON_GENERAL, Vec3};

/// Builds the ordered, de-duplicated candidate list for the current load.
///
/// Order is `(z, x, y)` ascending. Changing it changes every packing result.
pub fn candidate_points(placed: &[PlacedBox]) -> Vec<Vec3> {
    let mut points = Vec::with_capacity(1 + placed.len() * 3);
    points.push(Vec3::zero());

    for p in placed {
        let (x, y, z) = (p.position.x, p.position.y, p.position.z);
        let d = p.dimensions;
        points.push(Vec3::new(x + d.l, y, z));
        points.push(Vec3::new(x, y + d.w, z));
        points.push(Vec3::new(x, y, z + d.h));
    }

    points.sort_by(compare_bottom_left);
    points.dedup();
    points
}

fn compare_bottom_left(a: &Vec3, b: &Vec3) -> Ordering {
    a.z.total_cmp(&b.z)
        .then_with(|| a.x.total_cmp(&b.x))
        .then_with(|| a.y.total_cmp(&b.y))
}

/// Work allowance for candidate searches.
///
/// One unit is one placed box visited. Building the candidate list and trying
/// one candidate each cost one unit plus one per placed box, so total work
/// tracks real runtime rather than the number of searches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchBudget {
    limit: usize,
    spent: usize,
}

impl SearchBudget {
    pub fn new(limit: usize) -> Self {
        Self { limit, spent: 0 }
    }

    pub fn unlimited() -> Self {
        Self::new(usize::MAX)
    }

    pub fn spent(&self) -> usize {
        self.spent
    }

    pub fn is_exhausted(&self) -> bool {
        self.spent >= self.limit
    }

    /// Takes `units` from the allowance. On shortfall the allowance is drained
    /// and `false` is returned.
    fn charge(&mut self, units: usize) -> bool {
        match self.spent.checked_add(units) {
            Some(total) if total <= self.limit => {
                self.spent = total;
                true
            }
            _ => {
                self.spent = self.limit;
                false
            }
        }
    }
}

/// Outcome of one candidate search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Search {
    Found(Vec3),
    NotFound,
    Exhausted,
}

impl Search {
    pub fn position(self) -> Option<Vec3> {
        match self {
            Search::Found(point) => Some(point),
            Search::NotFound | Search::Exhausted => None,
        }
    }
}

/// Finds the first valid position for one orientation.
pub fn find_position(
    orientation: &Orientation,
    placed: &[PlacedBox],
    pallet: &Pallet,
    config: &PackingConfig,
    budget: &mut SearchBudget,
) -> Search {
    let cost = placed.len() + 1;
    if !budget.charge(cost) {
        return Search::Exhausted;
    }

    let bounds = pallet.bounds();
    for point in candidate_points(placed) {
        if !budget.charge(cost) {
            return Search::Exhausted;
        }

        let candidate = BoundingBox::from_position_and_dims(point, orientation.dims);
        if !candidate.max.fits_within(&bounds, EPSILON_GENERAL) {
            continue;
        }
        if collides_with_any(&candidate, placed, config.collision_tolerance) {
            continue;
        }
        if is_stable(
            &candidate,
            placed,
            config.min_support_ratio,
            config.support_height_tolerance,
        ) {
            return Search::Found(point);
        }
    }
    Search::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Dimensions, FALLBACK_FOOTPRINT, Position};

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

    fn orientation(dims: (f64, f64, f64)) -> Orientation {
        Orientation {
            dims: Vec3::new(dims.0, dims.1, dims.2),
            rotation_id: 0,
        }
    }

    fn eur_pallet() -> Pallet {
        Pallet::new(FALLBACK_FOOTPRINT, 1500.0, 1200.0)
    }

    #[test]
    fn empty_pallet_offers_origin_only() {
        assert_eq!(candidate_points(&[]), vec![Vec3::zero()]);
    }

    #[test]
    fn candidates_are_sorted_bottom_left_and_deduplicated() {
        let boxes = vec![
            placed((0.0, 0.0, 0.0), (400.0, 300.0, 200.0)),
            placed((400.0, 0.0, 0.0), (400.0, 300.0, 200.0)),
        ];
        let points = candidate_points(&boxes);
        assert_eq!(
            points,
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.0, 300.0, 0.0),
                Vec3::new(400.0, 0.0, 0.0),
                Vec3::new(400.0, 300.0, 0.0),
                Vec3::new(800.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 200.0),
                Vec3::new(400.0, 0.0, 200.0),
            ]
        );
    }

    #[test]
    fn first_box_goes_to_origin() {
        let pos = find_position(
            &orientation((400.0, 300.0, 200.0)),
            &[],
            &eur_pallet(),
            &PackingConfig::default(),
            &mut SearchBudget::unlimited(),
        )
        .position();
        assert_eq!(pos, Some(Vec3::zero()));
    }

    #[test]
    fn floor_is_filled_left_before_back() {
        let boxes = vec![placed((0.0, 0.0, 0.0), (400.0, 300.0, 200.0))];
        let pos = find_position(
            &orientation((400.0, 300.0, 200.0)),
            &boxes,
            &eur_pallet(),
            &PackingConfig::default(),
            &mut SearchBudget::unlimited(),
        )
        .position();
        // (0,300,0) sorts before (400,0,0): x ascends before y.
        assert_eq!(pos, Some(Vec3::new(0.0, 300.0, 0.0)));
    }

    #[test]
    fn stacks_when_floor_is_full() {
        let boxes = vec![placed((0.0, 0.0, 0.0), (1200.0, 800.0, 200.0))];
        let pos = find_position(
            &orientation((400.0, 300.0, 200.0)),
            &boxes,
            &eur_pallet(),
            &PackingConfig::default(),
            &mut SearchBudget::unlimited(),
        )
        .position();
        assert_eq!(pos, Some(Vec3::new(0.0, 0.0, 200.0)));
    }

    #[test]
    fn respects_height_ceiling() {
        let boxes = vec![placed((0.0, 0.0, 0.0), (1200.0, 800.0, 1400.0))];
        let pos = find_position(
            &orientation((400.0, 300.0, 200.0)),
            &boxes,
            &eur_pallet(),
            &PackingConfig::default(),
            &mut SearchBudget::unlimited(),
        )
        .position();
        assert_eq!(pos, None);
    }

    #[test]
    fn oversized_orientation_has_no_position() {
        let pos = find_position(
            &orientation((1300.0, 300.0, 200.0)),
            &[],
            &eur_pallet(),
            &PackingConfig::default(),
            &mut SearchBudget::unlimited(),
        )
        .position();
        assert_eq!(pos, None);
    }

    #[test]
    fn stacking_requires_support_ratio() {
        let pallet = Pallet::new(
            crate::model::Footprint {
                length: 500.0,
                width: 300.0,
            },
            1500.0,
            1200.0,
        );
        let config = PackingConfig::default();
        let upper = orientation((400.0, 300.0, 100.0));

        // 300 of 400 mm rest on the tall box: 75 % support.
        let short_base = vec![
            placed((0.0, 0.0, 0.0), (300.0, 300.0, 200.0)),
            placed((300.0, 0.0, 0.0), (200.0, 300.0, 100.0)),
        ];
        assert_eq!(
            find_position(&upper, &short_base, &pallet, &config, &mut SearchBudget::unlimited()),
            Search::NotFound
        );

        // 320 of 400 mm: exactly 80 %.
        let wide_base = vec![
            placed((0.0, 0.0, 0.0), (320.0, 300.0, 200.0)),
            placed((320.0, 0.0, 0.0), (180.0, 300.0, 100.0)),
        ];
        assert_eq!(
            find_position(&upper, &wide_base, &pallet, &config, &mut SearchBudget::unlimited()),
            Search::Found(Vec3::new(0.0, 0.0, 200.0))
        );
    }

    #[test]
    fn search_charges_per_candidate_and_placed_box() {
        let boxes = vec![placed((0.0, 0.0, 0.0), (400.0, 300.0, 200.0))];
        let mut budget = SearchBudget::unlimited();
        let found = find_position(
            &orientation((400.0, 300.0, 200.0)),
            &boxes,
            &eur_pallet(),
            &PackingConfig::default(),
            &mut budget,
        );
        // List build (2), origin rejected (2), (0,300,0) accepted (2).
        assert_eq!(found, Search::Found(Vec3::new(0.0, 300.0, 0.0)));
        assert_eq!(budget.spent(), 6);
    }

    #[test]
    fn search_stops_when_allowance_runs_out() {
        let boxes = vec![placed((0.0, 0.0, 0.0), (400.0, 300.0, 200.0))];
        let mut budget = SearchBudget::new(5);
        let result = find_position(
            &orientation((400.0, 300.0, 200.0)),
            &boxes,
            &eur_pallet(),
            &PackingConfig::default(),
            &mut budget,
        );
        assert_eq!(result, Search::Exhausted);
        assert!(budget.is_exhausted());
        assert_eq!(budget.spent(), 5);
    }
}
