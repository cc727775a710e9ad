//! Utilization, layering and load-balance figures for a finished load.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::{Pallet, PlacedBox};
use crate::types::{CenterOfMassCalculator, Dimensional, EPSILON_GENERAL, EPSILON_HEIGHT};

/// Fraction of each axis (around the deck center) the center of gravity may
/// deviate by while the load still counts as balanced: ±25 % = central 50 %.
pub const BALANCE_LIMIT_RATIO: f64 = 0.25;

/// Utilization in percent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Utilization {
    pub volume_percent: f64,
    pub weight_percent: f64,
    /// Sum of ground-box footprints over deck area. Coinciding footprints are
    /// not deduplicated.
    pub floor_percent: f64,
}

/// Weighted centroid of the load and balance verdict.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CenterOfGravity {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub is_balanced: bool,
}

/// One distinct z-level of the load.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LayerSummary {
    pub z: f64,
    pub box_count: usize,
    pub weight: f64,
}

/// Aggregate figures of the load.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoadMetrics {
    pub total_weight: f64,
    pub total_boxes: usize,
    pub total_layers: usize,
    pub max_height: f64,
    pub wasted_volume: f64,
    pub layers: Vec<LayerSummary>,
}

/// `numerator / denominator × 100`, or 0 when the ratio is undefined.
fn percent(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let value = numerator / denominator * 100.0;
    if value.is_finite() { value } else { 0.0 }
}

fn used_volume(placed: &[PlacedBox]) -> f64 {
    placed.iter().map(|p| p.volume()).sum()
}

fn total_weight(placed: &[PlacedBox]) -> f64 {
    placed.iter().map(|p| p.weight).sum()
}

pub fn utilization(placed: &[PlacedBox], pallet: &Pallet) -> Utilization {
    let ground_area: f64 = placed
        .iter()
        .filter(|p| p.position.z <= EPSILON_GENERAL)
        .map(|p| p.base_area())
        .sum();

    Utilization {
        volume_percent: percent(used_volume(placed), pallet.volume()),
        weight_percent: percent(total_weight(placed), pallet.max_payload),
        floor_percent: percent(ground_area, pallet.floor_area()),
    }
}

/// Groups boxes by base z-level, ascending. Levels closer than
/// `EPSILON_HEIGHT` are merged.
pub fn layers(placed: &[PlacedBox]) -> Vec<LayerSummary> {
    let mut levels: Vec<f64> = placed.iter().map(|p| p.position.z).collect();
    levels.sort_by(|a, b| a.total_cmp(b));
    levels.dedup_by(|a, b| (*a - *b).abs() < EPSILON_HEIGHT);

    levels
        .into_iter()
        .map(|z| {
            let members = placed
                .iter()
                .filter(|p| (p.position.z - z).abs() < EPSILON_HEIGHT);
            let (box_count, weight) =
                members.fold((0, 0.0), |(count, weight), p| (count + 1, weight + p.weight));
            LayerSummary {
                z,
                box_count,
                weight,
            }
        })
        .collect()
}

pub fn load_metrics(placed: &[PlacedBox], pallet: &Pallet) -> LoadMetrics {
    let layers = layers(placed);
    let max_height = placed.iter().map(|p| p.top_z()).fold(0.0, f64::max);

    LoadMetrics {
        total_weight: total_weight(placed),
        total_boxes: placed.len(),
        total_layers: layers.len(),
        max_height,
        wasted_volume: pallet.volume() - used_volume(placed),
        layers,
    }
}

/// Weighted 3D centroid of the load.
///
/// An empty (or weightless) load reports the deck center at z = 0 and counts
/// as balanced.
pub fn center_of_gravity(placed: &[PlacedBox], pallet: &Pallet) -> CenterOfGravity {
    let (center_x, center_y) = pallet.center_xy();

    let mut calc = CenterOfMassCalculator::new();
    for p in placed {
        calc.add_point(p.center(), p.weight);
    }

    match calc.compute() {
        Some(cg) => CenterOfGravity {
            x: cg.x,
            y: cg.y,
            z: cg.z,
            is_balanced: (cg.x - center_x).abs() <= BALANCE_LIMIT_RATIO * pallet.length
                && (cg.y - center_y).abs() <= BALANCE_LIMIT_RATIO * pallet.width,
        },
        None => CenterOfGravity {
            x: center_x,
            y: center_y,
            z: 0.0,
            is_balanced: true,
        },
    }
}
