//! Pallet planning entry point.
//!
//! Validates and defaults a request, resolves the pallet, runs the packing
//! engine and assembles metrics, center of gravity and warnings. Planning never
//! fails: malformed catalogue entries are dropped and reported as warnings.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToSchema;

use crate::metrics::{
    CenterOfGravity, LoadMetrics, Utilization, center_of_gravity, load_metrics, utilization,
};
use crate::model::{BoxType, Pallet, PalletStandard, PlacedBox, ValidationError};
use crate::optimizer::{PackEvent, PackingConfig, pack_box_types_with_progress};

/// Height ceiling used when the request sets none (mm).
pub const DEFAULT_MAX_STACK_HEIGHT: f64 = 1500.0;
/// Payload ceiling used when the request sets none (kg).
pub const DEFAULT_MAX_PAYLOAD: f64 = 1200.0;
/// Number of box types honored per request.
pub const MAX_BOX_TYPES: usize = 5;
/// Share of the payload above which a near-capacity warning is raised.
pub const NEAR_CAPACITY_RATIO: f64 = 0.9;
/// Colors assigned, by catalogue position, to box types without one.
pub const DEFAULT_COLORS: [&str; 5] = ["#3b82f6", "#ef4444", "#10b981", "#f59e0b", "#8b5cf6"];

/// Planner settings: request defaults plus the packing tunables.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlannerConfig {
    pub default_stack_height: f64,
    pub default_payload: f64,
    pub max_box_types: usize,
    pub packing: PackingConfig,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            default_stack_height: DEFAULT_MAX_STACK_HEIGHT,
            default_payload: DEFAULT_MAX_PAYLOAD,
            max_box_types: MAX_BOX_TYPES,
            packing: PackingConfig::default(),
        }
    }
}

/// Request for one pallet load.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "palletStandard": "eur",
    "maxStackHeight": 1500.0,
    "maxPayload": 1200.0,
    "boxes": [
        {
            "id": "A",
            "length": 400.0,
            "width": 300.0,
            "height": 200.0,
            "weight": 10.0,
            "quantity": 10,
            "canRotate": "layered"
        }
    ]
}))]
pub struct PalletRequest {
    #[serde(default)]
    pub pallet_standard: PalletStandard,
    #[serde(default)]
    #[schema(nullable = true)]
    pub custom_length: Option<f64>,
    #[serde(default)]
    #[schema(nullable = true)]
    pub custom_width: Option<f64>,
    #[serde(default)]
    #[schema(nullable = true)]
    pub max_stack_height: Option<f64>,
    #[serde(default)]
    #[schema(nullable = true)]
    pub max_payload: Option<f64>,
    #[serde(default)]
    pub boxes: Vec<BoxType>,
}

impl PalletRequest {
    /// Strict validation used by the HTTP layer before planning.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let positive = |value: Option<f64>, name: &str| match value {
            Some(v) if v <= 0.0 || !v.is_finite() => Err(ValidationError::InvalidConfiguration(
                format!("{} must be positive, got: {}", name, v),
            )),
            _ => Ok(()),
        };
        positive(self.custom_length, "customLength")?;
        positive(self.custom_width, "customWidth")?;
        positive(self.max_stack_height, "maxStackHeight")?;
        positive(self.max_payload, "maxPayload")?;

        for box_type in &self.boxes {
            box_type.validate()?;
        }
        Ok(())
    }
}

/// Boxes of one type left off the pallet.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnplacedEntry {
    pub box_type_id: String,
    pub count: u32,
    pub reason_code: String,
    pub reason: String,
}

/// Resolved pallet envelope.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, ToSchema)]
pub struct PalletDimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

/// Complete planning result.
#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PalletPlan {
    pub placed: Vec<PlacedBox>,
    pub unplaced: Vec<UnplacedEntry>,
    pub utilization: Utilization,
    pub center_of_gravity: CenterOfGravity,
    pub metrics: LoadMetrics,
    pub pallet_dimensions: PalletDimensions,
    pub warnings: Vec<String>,
}

impl PalletPlan {
    pub fn is_complete(&self) -> bool {
        self.unplaced.is_empty()
    }

    pub fn unplaced_count(&self) -> u32 {
        self.unplaced.iter().map(|u| u.count).sum()
    }

    fn empty(pallet: &Pallet, warnings: Vec<String>) -> Self {
        Self {
            placed: Vec::new(),
            unplaced: Vec::new(),
            utilization: Utilization::default(),
            center_of_gravity: center_of_gravity(&[], pallet),
            metrics: load_metrics(&[], pallet),
            pallet_dimensions: pallet_dimensions(pallet),
            warnings,
        }
    }
}

fn pallet_dimensions(pallet: &Pallet) -> PalletDimensions {
    PalletDimensions {
        length: pallet.length,
        width: pallet.width,
        height: pallet.max_height,
    }
}

/// Resolves the pallet envelope of a request, applying defaults.
pub fn resolve_pallet(request: &PalletRequest, config: &PlannerConfig) -> Pallet {
    let footprint = request
        .pallet_standard
        .resolve_footprint(request.custom_length, request.custom_width);
    Pallet::new(
        footprint,
        request.max_stack_height.unwrap_or(config.default_stack_height),
        request.max_payload.unwrap_or(config.default_payload),
    )
}

/// Plans a pallet load.
///
/// # Examples
/// ```
/// use pallet_planner::model::{BoxType, RotationPolicy};
/// use pallet_planner::planner::{PalletRequest, PlannerConfig, plan_pallet};
///
/// let request = PalletRequest {
///     boxes: vec![BoxType::new("A", (400.0, 300.0, 200.0), 10.0, 4, RotationPolicy::Layered).unwrap()],
///     ..Default::default()
/// };
/// let plan = plan_pallet(&request, &PlannerConfig::default());
/// assert_eq!(plan.placed.len(), 4);
/// ```
pub fn plan_pallet(request: &PalletRequest, config: &PlannerConfig) -> PalletPlan {
    plan_pallet_with_progress(request, config, |_| {})
}

/// Plans a pallet load, reporting progress events to `on_event`.
pub fn plan_pallet_with_progress(
    request: &PalletRequest,
    config: &PlannerConfig,
    mut on_event: impl FnMut(&PackEvent),
) -> PalletPlan {
    let pallet = resolve_pallet(request, config);
    on_event(&PackEvent::PalletResolved {
        length: pallet.length,
        width: pallet.width,
        height: pallet.max_height,
        max_payload: pallet.max_payload,
    });

    if request.boxes.is_empty() {
        on_event(&PackEvent::Finished {
            placed: 0,
            unplaced: 0,
        });
        return PalletPlan::empty(&pallet, vec!["No boxes supplied; nothing to plan".to_string()]);
    }

    let mut warnings = Vec::new();
    let box_types = prepare_box_types(&request.boxes, config.max_box_types, &mut warnings);

    let outcome =
        pack_box_types_with_progress(&box_types, &pallet, &config.packing, &mut on_event);

    let unplaced_count = outcome.unplaced_count();
    let utilization = utilization(&outcome.placed, &pallet);
    let center_of_gravity = center_of_gravity(&outcome.placed, &pallet);
    let metrics = load_metrics(&outcome.placed, &pallet);

    if unplaced_count > 0 {
        warnings.push(format!("{} boxes could not be placed", unplaced_count));
    }
    if outcome.budget_exhausted {
        warnings.push("Placement search budget exhausted; the result is partial".to_string());
    }
    if !center_of_gravity.is_balanced {
        warnings.push(
            "Load is unbalanced: center of gravity lies outside the central 50% of the pallet"
                .to_string(),
        );
    }
    if metrics.total_weight > NEAR_CAPACITY_RATIO * pallet.max_payload {
        warnings.push(format!(
            "Load is near payload capacity: {:.1} of {:.1} kg",
            metrics.total_weight, pallet.max_payload
        ));
    }

    log::info!(
        "planned {} boxes ({} unplaced) on {}x{} pallet, {:.1}% volume",
        outcome.placed.len(),
        unplaced_count,
        pallet.length,
        pallet.width,
        utilization.volume_percent
    );
    on_event(&PackEvent::Finished {
        placed: outcome.placed.len(),
        unplaced: unplaced_count,
    });

    PalletPlan {
        unplaced: outcome
            .unplaced
            .into_iter()
            .map(|u| UnplacedEntry {
                box_type_id: u.box_type_id,
                count: u.count,
                reason_code: u.reason.code().to_string(),
                reason: u.reason.to_string(),
            })
            .collect(),
        placed: outcome.placed,
        utilization,
        center_of_gravity,
        metrics,
        pallet_dimensions: pallet_dimensions(&pallet),
        warnings,
    }
}

/// Truncates the catalogue, assigns default colors and drops invalid entries.
fn prepare_box_types(
    boxes: &[BoxType],
    max_box_types: usize,
    warnings: &mut Vec<String>,
) -> Vec<BoxType> {
    if boxes.len() > max_box_types {
        warnings.push(format!(
            "Only the first {} box types are used; {} additional types were ignored",
            max_box_types,
            boxes.len() - max_box_types
        ));
    }

    let mut seen_ids = HashSet::new();
    let mut prepared = Vec::with_capacity(boxes.len().min(max_box_types));
    for (index, box_type) in boxes.iter().take(max_box_types).enumerate() {
        if let Err(err) = box_type.validate() {
            warnings.push(format!("Box type '{}' ignored: {}", box_type.id, err));
            continue;
        }
        if !seen_ids.insert(box_type.id.as_str()) {
            let err = ValidationError::InvalidIdentifier(format!(
                "duplicate id '{}'",
                box_type.id
            ));
            warnings.push(format!("Box type '{}' ignored: {}", box_type.id, err));
            continue;
        }

        let mut box_type = box_type.clone();
        if box_type.color.is_none() {
            box_type.color = Some(DEFAULT_COLORS[index % DEFAULT_COLORS.len()].to_string());
        }
        prepared.push(box_type);
    }
    prepared
}
