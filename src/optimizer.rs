//! First-Fit-Decreasing packing engine.
//!
//! Box types are ranked once by volume, largest first. Each pass walks that
//! ranking and places the first instance for which any orientation has a
//! valid Bottom-Left-Fill position. A successful placement ends the pass, so
//! the next pass starts again from the largest type with the updated
//! candidate landscape. Packing stops after a pass that places nothing.
//!
//! Every placement attempt rescans the full placed list (candidate building,
//! collision and support checks), so cost grows roughly quadratically with the
//! number of placed boxes. `PackingConfig::placement_budget` bounds the search
//! work of a run (see `SearchBudget`); an exhausted budget yields a partial
//! load.

use serde::Serialize;
use utoipa::ToSchema;

use crate::geometry::COLLISION_TOLERANCE;
use crate::model::{BoxType, Dimensions, Orientation, Pallet, PlacedBox, Position};
use crate::orientation::orientations;
use crate::placement::{Search, SearchBudget, find_position};
use crate::stability::{MIN_SUPPORT_RATIO, SUPPORT_HEIGHT_TOLERANCE};
use crate::types::{Dimensional, EPSILON_GENERAL};

/// Tunables of the packing run.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PackingConfig {
    /// Overlap (mm) tolerated between touching boxes
    pub collision_tolerance: f64,
    /// Minimum supported fraction of a stacked box's base (0.0 to 1.0)
    pub min_support_ratio: f64,
    /// Max gap (mm) between a supporting top face and the base above it
    pub support_height_tolerance: f64,
    /// Max search work per run, in placed boxes visited during candidate scans
    pub placement_budget: usize,
}

impl PackingConfig {
    pub const DEFAULT_COLLISION_TOLERANCE: f64 = COLLISION_TOLERANCE;
    pub const DEFAULT_MIN_SUPPORT_RATIO: f64 = MIN_SUPPORT_RATIO;
    pub const DEFAULT_SUPPORT_HEIGHT_TOLERANCE: f64 = SUPPORT_HEIGHT_TOLERANCE;
    pub const DEFAULT_PLACEMENT_BUDGET: usize = 1_000_000_000;

    pub fn builder() -> PackingConfigBuilder {
        PackingConfigBuilder::default()
    }
}

impl Default for PackingConfig {
    fn default() -> Self {
        Self {
            collision_tolerance: Self::DEFAULT_COLLISION_TOLERANCE,
            min_support_ratio: Self::DEFAULT_MIN_SUPPORT_RATIO,
            support_height_tolerance: Self::DEFAULT_SUPPORT_HEIGHT_TOLERANCE,
            placement_budget: Self::DEFAULT_PLACEMENT_BUDGET,
        }
    }
}

/// Builder for `PackingConfig`.
#[derive(Clone, Debug, Default)]
pub struct PackingConfigBuilder {
    config: PackingConfig,
}

impl PackingConfigBuilder {
    pub fn collision_tolerance(mut self, tolerance: f64) -> Self {
        self.config.collision_tolerance = tolerance;
        self
    }

    pub fn min_support_ratio(mut self, ratio: f64) -> Self {
        self.config.min_support_ratio = ratio;
        self
    }

    pub fn support_height_tolerance(mut self, tolerance: f64) -> Self {
        self.config.support_height_tolerance = tolerance;
        self
    }

    pub fn placement_budget(mut self, budget: usize) -> Self {
        self.config.placement_budget = budget;
        self
    }

    pub fn build(self) -> PackingConfig {
        self.config
    }
}

/// Why instances of a box type were left off the pallet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnplacedReason {
    DimensionsExceedPallet,
    PayloadExceeded,
    BudgetExhausted,
    NoStablePosition,
}

impl UnplacedReason {
    pub fn code(&self) -> &'static str {
        match self {
            UnplacedReason::DimensionsExceedPallet => "dimensions_exceed_pallet",
            UnplacedReason::PayloadExceeded => "payload_exceeded",
            UnplacedReason::BudgetExhausted => "budget_exhausted",
            UnplacedReason::NoStablePosition => "no_stable_position",
        }
    }
}

impl std::fmt::Display for UnplacedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnplacedReason::DimensionsExceedPallet => {
                write!(f, "No orientation of the box fits inside the pallet envelope")
            }
            UnplacedReason::PayloadExceeded => {
                write!(f, "Placing another box would exceed the maximum payload")
            }
            UnplacedReason::BudgetExhausted => {
                write!(f, "The placement search budget was exhausted")
            }
            UnplacedReason::NoStablePosition => {
                write!(f, "No collision-free, supported position found")
            }
        }
    }
}

/// Remaining instances of one box type after packing.
#[derive(Clone, Debug, PartialEq)]
pub struct UnplacedBoxes {
    pub box_type_id: String,
    pub count: u32,
    pub reason: UnplacedReason,
}

/// Result of one packing run.
#[derive(Clone, Debug, Default)]
pub struct PackingOutcome {
    pub placed: Vec<PlacedBox>,
    pub unplaced: Vec<UnplacedBoxes>,
    pub total_weight: f64,
    pub budget_exhausted: bool,
    pub search_work: usize,
}

impl PackingOutcome {
    pub fn unplaced_count(&self) -> u32 {
        self.unplaced.iter().map(|u| u.count).sum()
    }
}

/// Events emitted while planning, for live visualisation.
#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(tag = "type")]
pub enum PackEvent {
    /// The pallet envelope has been resolved.
    #[serde(rename_all = "camelCase")]
    PalletResolved {
        length: f64,
        width: f64,
        height: f64,
        max_payload: f64,
    },
    /// A box was placed.
    #[serde(rename_all = "camelCase")]
    BoxPlaced {
        index: usize,
        box_type_id: String,
        position: Position,
        dimensions: Dimensions,
        rotation_id: u8,
        total_weight: f64,
    },
    /// Instances of a box type remain unplaced.
    #[serde(rename_all = "camelCase")]
    TypeExhausted {
        box_type_id: String,
        remaining: u32,
        reason_code: String,
    },
    /// Planning finished.
    #[serde(rename_all = "camelCase")]
    Finished { placed: usize, unplaced: u32 },
}

/// Outcome of a single scan over the ranked box types.
enum PassOutcome {
    Placed { type_index: usize, placed: PlacedBox },
    NoProgress,
    BudgetExhausted,
}

/// Mutable state of one packing run; discarded when the run ends.
struct PackingRun<'a> {
    box_types: &'a [BoxType],
    orientation_sets: Vec<Vec<Orientation>>,
    ranking: Vec<usize>,
    remaining: Vec<u32>,
    placed: Vec<PlacedBox>,
    total_weight: f64,
    budget: SearchBudget,
    pallet: &'a Pallet,
    config: &'a PackingConfig,
}

impl<'a> PackingRun<'a> {
    fn new(box_types: &'a [BoxType], pallet: &'a Pallet, config: &'a PackingConfig) -> Self {
        // Stable sort: equal volumes keep input order.
        let mut ranking: Vec<usize> = (0..box_types.len()).collect();
        ranking.sort_by(|&a, &b| box_types[b].volume().total_cmp(&box_types[a].volume()));

        Self {
            box_types,
            orientation_sets: box_types.iter().map(orientations).collect(),
            ranking,
            remaining: box_types.iter().map(|t| t.quantity).collect(),
            placed: Vec::new(),
            total_weight: 0.0,
            budget: SearchBudget::new(config.placement_budget),
            pallet,
            config,
        }
    }

    fn fits_payload(&self, box_type: &BoxType) -> bool {
        self.total_weight + box_type.weight <= self.pallet.max_payload
    }

    /// Places at most one box, scanning types largest first.
    fn next_pass(&mut self) -> PassOutcome {
        for &type_index in &self.ranking {
            if self.remaining[type_index] == 0 {
                continue;
            }
            let box_type = &self.box_types[type_index];
            if !self.fits_payload(box_type) {
                continue;
            }

            for orientation in &self.orientation_sets[type_index] {
                let search = find_position(
                    orientation,
                    &self.placed,
                    self.pallet,
                    self.config,
                    &mut self.budget,
                );
                let position = match search {
                    Search::Found(position) => position,
                    Search::NotFound => continue,
                    Search::Exhausted => return PassOutcome::BudgetExhausted,
                };

                let placed = PlacedBox {
                    box_type_id: box_type.id.clone(),
                    position: position.into(),
                    dimensions: orientation.dims.into(),
                    rotation_id: orientation.rotation_id,
                    color: box_type.color.clone().unwrap_or_default(),
                    weight: box_type.weight,
                };
                return PassOutcome::Placed { type_index, placed };
            }
        }
        PassOutcome::NoProgress
    }

    fn unplaced_reason(&self, type_index: usize, budget_exhausted: bool) -> UnplacedReason {
        if budget_exhausted {
            return UnplacedReason::BudgetExhausted;
        }
        let bounds = self.pallet.bounds();
        let any_fits = self.orientation_sets[type_index]
            .iter()
            .any(|o| o.dims.fits_within(&bounds, EPSILON_GENERAL));
        if !any_fits {
            UnplacedReason::DimensionsExceedPallet
        } else if !self.fits_payload(&self.box_types[type_index]) {
            UnplacedReason::PayloadExceeded
        } else {
            UnplacedReason::NoStablePosition
        }
    }
}

/// Packs the catalogue with the default progress sink.
pub fn pack_box_types(
    box_types: &[BoxType],
    pallet: &Pallet,
    config: &PackingConfig,
) -> PackingOutcome {
    pack_box_types_with_progress(box_types, pallet, config, |_| {})
}

/// Packs the catalogue onto the pallet, reporting each placement to `on_event`.
///
/// Deterministic: identical input yields an identical placement sequence.
pub fn pack_box_types_with_progress(
    box_types: &[BoxType],
    pallet: &Pallet,
    config: &PackingConfig,
    mut on_event: impl FnMut(&PackEvent),
) -> PackingOutcome {
    let mut run = PackingRun::new(box_types, pallet, config);
    let mut budget_exhausted = false;

    loop {
        match run.next_pass() {
            PassOutcome::Placed { type_index, placed } => {
                run.remaining[type_index] -= 1;
                run.total_weight += placed.weight;
                log::debug!(
                    "placed '{}' #{} at ({}, {}, {}) rotation {}",
                    placed.box_type_id,
                    run.placed.len(),
                    placed.position.x,
                    placed.position.y,
                    placed.position.z,
                    placed.rotation_id
                );
                on_event(&PackEvent::BoxPlaced {
                    index: run.placed.len(),
                    box_type_id: placed.box_type_id.clone(),
                    position: placed.position,
                    dimensions: placed.dimensions,
                    rotation_id: placed.rotation_id,
                    total_weight: run.total_weight,
                });
                run.placed.push(placed);
            }
            PassOutcome::NoProgress => break,
            PassOutcome::BudgetExhausted => {
                log::warn!(
                    "placement budget of {} work units exhausted after {} boxes",
                    config.placement_budget,
                    run.placed.len()
                );
                budget_exhausted = true;
                break;
            }
        }
    }

    let mut unplaced = Vec::new();
    for (type_index, box_type) in box_types.iter().enumerate() {
        let remaining = run.remaining[type_index];
        if remaining == 0 {
            continue;
        }
        let reason = run.unplaced_reason(type_index, budget_exhausted);
        on_event(&PackEvent::TypeExhausted {
            box_type_id: box_type.id.clone(),
            remaining,
            reason_code: reason.code().to_string(),
        });
        unplaced.push(UnplacedBoxes {
            box_type_id: box_type.id.clone(),
            count: remaining,
            reason,
        });
    }

    PackingOutcome {
        placed: run.placed,
        unplaced,
        total_weight: run.total_weight,
        budget_exhausted,
        search_work: run.budget.spent(),
    }
}
