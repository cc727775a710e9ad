//! Data models for pallet loading.
//!
//! This module defines the fundamental data structures of the pallet planner:
//! - `BoxType`: a catalogue entry with dimensions, weight, quantity and rotation policy
//! - `Orientation`: one concrete axis permutation of a box type
//! - `PlacedBox`: a box instance fixed at a position on the pallet
//! - `Pallet`: the loading envelope (footprint, height ceiling, payload ceiling)
//!
//! All structures implement the traits from the `types` module.

use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;

use crate::types::{BoundingBox, Dimensional, Positioned, Vec3, Weighted};

/// Validation error for catalogue and pallet data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),
    #[error("Invalid weight: {0}")]
    InvalidWeight(String),
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

fn validate_dimension(value: f64, name: &str) -> Result<(), ValidationError> {
    if value <= 0.0 || !value.is_finite() {
        return Err(ValidationError::InvalidDimension(format!(
            "{} must be positive, got: {}",
            name, value
        )));
    }
    Ok(())
}

fn validate_weight_value(value: f64, name: &str) -> Result<(), ValidationError> {
    if value < 0.0 || !value.is_finite() {
        return Err(ValidationError::InvalidWeight(format!(
            "{} must not be negative, got: {}",
            name, value
        )));
    }
    Ok(())
}

/// Named pallet footprints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PalletStandard {
    /// EUR / EPAL 1200 × 800
    #[default]
    Eur,
    /// North American GMA 48" × 40"
    Us,
    /// Chinese 1100 × 1100
    Cn,
    /// Japanese T11 1100 × 1100
    Jp,
    /// Caller-supplied footprint
    Custom,
}

/// Footprint table of the named standards, in mm.
pub const PALLET_STANDARDS: [(PalletStandard, f64, f64); 4] = [
    (PalletStandard::Eur, 1200.0, 800.0),
    (PalletStandard::Us, 1219.0, 1016.0),
    (PalletStandard::Cn, 1100.0, 1100.0),
    (PalletStandard::Jp, 1100.0, 1100.0),
];

/// Footprint used when a custom pallet is missing one of its dimensions.
pub const FALLBACK_FOOTPRINT: Footprint = Footprint {
    length: 1200.0,
    width: 800.0,
};

/// Length × width of a pallet deck in mm.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Footprint {
    pub length: f64,
    pub width: f64,
}

impl PalletStandard {
    /// Resolves the deck footprint for this standard.
    ///
    /// For `Custom` the supplied values are used; if either is absent (or not a
    /// positive finite number) the EUR footprint is used instead. Never fails.
    ///
    /// # Examples
    /// ```
    /// use pallet_planner::model::PalletStandard;
    ///
    /// let us = PalletStandard::Us.resolve_footprint(None, None);
    /// assert_eq!((us.length, us.width), (1219.0, 1016.0));
    ///
    /// let custom = PalletStandard::Custom.resolve_footprint(Some(1000.0), None);
    /// assert_eq!((custom.length, custom.width), (1200.0, 800.0));
    /// ```
    pub fn resolve_footprint(
        self,
        custom_length: Option<f64>,
        custom_width: Option<f64>,
    ) -> Footprint {
        if self == PalletStandard::Custom {
            let usable = |v: Option<f64>| v.filter(|v| *v > 0.0 && v.is_finite());
            return match (usable(custom_length), usable(custom_width)) {
                (Some(length), Some(width)) => Footprint { length, width },
                _ => FALLBACK_FOOTPRINT,
            };
        }

        PALLET_STANDARDS
            .iter()
            .find(|(standard, _, _)| *standard == self)
            .map(|&(_, length, width)| Footprint { length, width })
            .unwrap_or(FALLBACK_FOOTPRINT)
    }
}

/// Which axis permutations a box type may be placed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    /// Only the catalogue orientation.
    Fixed,
    /// Length and width may swap, "up" stays up.
    Layered,
    /// Any of the six axis permutations.
    Full,
}

/// A catalogue entry describing one kind of box to load.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "id": "A",
    "length": 400.0,
    "width": 300.0,
    "height": 200.0,
    "weight": 10.0,
    "quantity": 10,
    "canRotate": "layered"
}))]
pub struct BoxType {
    pub id: String,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub weight: f64,
    pub quantity: u32,
    pub can_rotate: RotationPolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(nullable = true)]
    pub color: Option<String>,
}

impl BoxType {
    /// Creates a validated box type without a color.
    ///
    /// # Examples
    /// ```
    /// use pallet_planner::model::{BoxType, RotationPolicy};
    ///
    /// let ok = BoxType::new("A", (400.0, 300.0, 200.0), 10.0, 4, RotationPolicy::Layered);
    /// assert!(ok.is_ok());
    ///
    /// let flat = BoxType::new("B", (400.0, 0.0, 200.0), 10.0, 4, RotationPolicy::Fixed);
    /// assert!(flat.is_err());
    /// ```
    pub fn new(
        id: impl Into<String>,
        dims: (f64, f64, f64),
        weight: f64,
        quantity: u32,
        can_rotate: RotationPolicy,
    ) -> Result<Self, ValidationError> {
        let box_type = Self {
            id: id.into(),
            length: dims.0,
            width: dims.1,
            height: dims.2,
            weight,
            quantity,
            can_rotate,
            color: None,
        };
        box_type.validate()?;
        Ok(box_type)
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::InvalidIdentifier(
                "Box type id must not be empty".to_string(),
            ));
        }
        validate_dimension(self.length, "Length")?;
        validate_dimension(self.width, "Width")?;
        validate_dimension(self.height, "Height")?;
        validate_weight_value(self.weight, "Weight")?;
        Ok(())
    }

    #[inline]
    pub fn dims(&self) -> Vec3 {
        Vec3::new(self.length, self.width, self.height)
    }
}

impl Dimensional for BoxType {
    fn dimensions(&self) -> Vec3 {
        self.dims()
    }
}

impl Weighted for BoxType {
    fn weight(&self) -> f64 {
        self.weight
    }
}

/// One concrete placement orientation of a box type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Orientation {
    /// Extent along X, Y, Z once rotated.
    pub dims: Vec3,
    /// Index of the axis permutation (0–5).
    pub rotation_id: u8,
}

/// Min corner of a placed box in mm.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<Vec3> for Position {
    fn from(v: Vec3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

impl From<Position> for Vec3 {
    fn from(p: Position) -> Self {
        Vec3::new(p.x, p.y, p.z)
    }
}

/// Extent of a placed box along X (l), Y (w) and Z (h) in mm.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Dimensions {
    pub l: f64,
    pub w: f64,
    pub h: f64,
}

impl From<Vec3> for Dimensions {
    fn from(v: Vec3) -> Self {
        Self {
            l: v.x,
            w: v.y,
            h: v.z,
        }
    }
}

impl From<Dimensions> for Vec3 {
    fn from(d: Dimensions) -> Self {
        Vec3::new(d.l, d.w, d.h)
    }
}

/// A box instance fixed on the pallet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlacedBox {
    pub box_type_id: String,
    pub position: Position,
    pub dimensions: Dimensions,
    pub rotation_id: u8,
    pub color: String,
    pub weight: f64,
}

impl PlacedBox {
    #[inline]
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_position_and_dims(self.position.into(), self.dimensions.into())
    }

    /// Z position + height.
    #[inline]
    pub fn top_z(&self) -> f64 {
        self.position.z + self.dimensions.h
    }

    /// Geometric center of the box.
    #[inline]
    pub fn center(&self) -> Vec3 {
        self.bounding_box().center()
    }
}

impl Positioned for PlacedBox {
    fn position(&self) -> Vec3 {
        self.position.into()
    }
}

impl Dimensional for PlacedBox {
    fn dimensions(&self) -> Vec3 {
        self.dimensions.into()
    }
}

impl Weighted for PlacedBox {
    fn weight(&self) -> f64 {
        self.weight
    }
}

/// The loading envelope for one planning run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pallet {
    pub length: f64,
    pub width: f64,
    /// Height ceiling of the load above the deck.
    pub max_height: f64,
    /// Payload ceiling in kg.
    pub max_payload: f64,
}

impl Pallet {
    pub fn new(footprint: Footprint, max_height: f64, max_payload: f64) -> Self {
        Self {
            length: footprint.length,
            width: footprint.width,
            max_height,
            max_payload,
        }
    }

    /// Envelope extent (length, width, max height).
    #[inline]
    pub fn bounds(&self) -> Vec3 {
        Vec3::new(self.length, self.width, self.max_height)
    }

    #[inline]
    pub fn floor_area(&self) -> f64 {
        self.length * self.width
    }

    #[inline]
    pub fn volume(&self) -> f64 {
        self.bounds().volume()
    }

    /// Geometric center of the deck.
    #[inline]
    pub fn center_xy(&self) -> (f64, f64) {
        (self.length / 2.0, self.width / 2.0)
    }
}

impl Dimensional for Pallet {
    fn dimensions(&self) -> Vec3 {
        self.bounds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_footprints_match_table() {
        let cases = [
            (PalletStandard::Eur, 1200.0, 800.0),
            (PalletStandard::Us, 1219.0, 1016.0),
            (PalletStandard::Cn, 1100.0, 1100.0),
            (PalletStandard::Jp, 1100.0, 1100.0),
        ];
        for (standard, length, width) in cases {
            let fp = standard.resolve_footprint(Some(500.0), Some(500.0));
            assert_eq!((fp.length, fp.width), (length, width), "{:?}", standard);
        }
    }

    #[test]
    fn custom_footprint_uses_supplied_values() {
        let fp = PalletStandard::Custom.resolve_footprint(Some(1000.0), Some(600.0));
        assert_eq!((fp.length, fp.width), (1000.0, 600.0));
    }

    #[test]
    fn custom_footprint_falls_back_when_incomplete() {
        assert_eq!(
            PalletStandard::Custom.resolve_footprint(None, Some(600.0)),
            FALLBACK_FOOTPRINT
        );
        assert_eq!(
            PalletStandard::Custom.resolve_footprint(Some(1000.0), None),
            FALLBACK_FOOTPRINT
        );
        assert_eq!(
            PalletStandard::Custom.resolve_footprint(Some(-5.0), Some(600.0)),
            FALLBACK_FOOTPRINT
        );
    }

    #[test]
    fn box_type_validation() {
        assert!(BoxType::new("A", (1.0, 1.0, 1.0), 0.0, 1, RotationPolicy::Full).is_ok());
        assert!(matches!(
            BoxType::new("", (1.0, 1.0, 1.0), 1.0, 1, RotationPolicy::Full),
            Err(ValidationError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            BoxType::new("A", (1.0, -1.0, 1.0), 1.0, 1, RotationPolicy::Full),
            Err(ValidationError::InvalidDimension(_))
        ));
        assert!(matches!(
            BoxType::new("A", (1.0, 1.0, f64::NAN), 1.0, 1, RotationPolicy::Full),
            Err(ValidationError::InvalidDimension(_))
        ));
        assert!(matches!(
            BoxType::new("A", (1.0, 1.0, 1.0), -0.5, 1, RotationPolicy::Full),
            Err(ValidationError::InvalidWeight(_))
        ));
    }

    #[test]
    fn box_type_parses_camel_case_json() {
        let json = r##"{
            "id": "crate",
            "length": 400, "width": 300, "height": 200,
            "weight": 12.5, "quantity": 3,
            "canRotate": "full",
            "color": "#ff0000"
        }"##;
        let parsed: BoxType = serde_json::from_str(json).expect("valid box type");
        assert_eq!(parsed.can_rotate, RotationPolicy::Full);
        assert_eq!(parsed.quantity, 3);
        assert_eq!(parsed.color.as_deref(), Some("#ff0000"));
        assert!((parsed.volume() - 24_000_000.0).abs() < 1e-6);
    }

    #[test]
    fn placed_box_serializes_with_camel_case_names() {
        let placed = PlacedBox {
            box_type_id: "A".to_string(),
            position: Position {
                x: 0.0,
                y: 300.0,
                z: 0.0,
            },
            dimensions: Dimensions {
                l: 400.0,
                w: 300.0,
                h: 200.0,
            },
            rotation_id: 1,
            color: "#3b82f6".to_string(),
            weight: 10.0,
        };
        let value = serde_json::to_value(&placed).unwrap();
        assert_eq!(value["boxTypeId"], "A");
        assert_eq!(value["rotationId"], 1);
        assert_eq!(value["position"]["y"], 300.0);
        assert_eq!(value["dimensions"]["h"], 200.0);
        assert!((placed.top_z() - 200.0).abs() < 1e-9);
        assert_eq!(placed.center(), Vec3::new(200.0, 450.0, 100.0));
    }

    #[test]
    fn pallet_geometry_helpers() {
        let pallet = Pallet::new(FALLBACK_FOOTPRINT, 1500.0, 1200.0);
        assert!((pallet.floor_area() - 960_000.0).abs() < 1e-6);
        assert!((pallet.volume() - 1_440_000_000.0).abs() < 1e-3);
        assert_eq!(pallet.center_xy(), (600.0, 400.0));
    }
}
