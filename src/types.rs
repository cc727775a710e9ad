//! Common types and traits for pallet geometry.
//!
//! Positions and extents are expressed in millimetres, weights in kilograms.
//! The pallet frame has its origin at the front-left corner of the deck:
//! X runs along the pallet length, Y along its width and Z upwards.

use std::ops::{Add, Mul, Sub};

/// Numerical tolerance for bound and weight comparisons.
pub const EPSILON_GENERAL: f64 = 1e-6;

/// Tolerance used when grouping z-levels into layers.
pub const EPSILON_HEIGHT: f64 = 1e-3;

/// A point or extent in pallet space.
///
/// # Examples
/// ```
/// use pallet_planner::types::Vec3;
///
/// let origin = Vec3::new(100.0, 0.0, 0.0);
/// let extent = Vec3::new(400.0, 300.0, 200.0);
/// let center = origin + extent * 0.5;
/// assert_eq!(center, Vec3::new(300.0, 150.0, 100.0));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Product of all components, i.e. the volume of an extent.
    #[inline]
    pub fn volume(&self) -> f64 {
        self.x * self.y * self.z
    }

    /// X × Y product, i.e. the footprint of an extent.
    #[inline]
    pub fn base_area(&self) -> f64 {
        self.x * self.y
    }

    /// Checks if all components are strictly positive and finite.
    #[inline]
    pub fn is_valid_dimension(&self) -> bool {
        [self.x, self.y, self.z]
            .iter()
            .all(|v| *v > 0.0 && v.is_finite())
    }

    /// Component-wise `<=` with tolerance.
    #[inline]
    pub fn fits_within(&self, container: &Self, tolerance: f64) -> bool {
        self.x <= container.x + tolerance
            && self.y <= container.y + tolerance
            && self.z <= container.z + tolerance
    }
}

impl Add for Vec3 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: f64) -> Self::Output {
        Self::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

/// Objects with a spatial extent.
pub trait Dimensional {
    fn dimensions(&self) -> Vec3;

    fn volume(&self) -> f64 {
        self.dimensions().volume()
    }

    fn base_area(&self) -> f64 {
        self.dimensions().base_area()
    }
}

/// Objects anchored at a position (their min corner).
pub trait Positioned {
    fn position(&self) -> Vec3;
}

/// Objects with a mass in kg.
pub trait Weighted {
    fn weight(&self) -> f64;
}

/// Axis-aligned bounding box (AABB).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    /// Minimum corner (position)
    pub min: Vec3,
    /// Maximum corner (position + dimensions)
    pub max: Vec3,
}

impl BoundingBox {
    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn from_position_and_dims(position: Vec3, dims: Vec3) -> Self {
        Self {
            min: position,
            max: position + dims,
        }
    }

    /// Checks whether two boxes overlap by more than `tolerance` on every axis.
    ///
    /// Boxes that only share a face (or penetrate each other by less than the
    /// tolerance) are not reported as intersecting.
    #[inline]
    pub fn intersects_with_tolerance(&self, other: &Self, tolerance: f64) -> bool {
        Self::axis_overlaps(self.min.x, self.max.x, other.min.x, other.max.x, tolerance)
            && Self::axis_overlaps(self.min.y, self.max.y, other.min.y, other.max.y, tolerance)
            && Self::axis_overlaps(self.min.z, self.max.z, other.min.z, other.max.z, tolerance)
    }

    #[inline]
    fn axis_overlaps(a_min: f64, a_max: f64, b_min: f64, b_max: f64, tolerance: f64) -> bool {
        a_min < b_max - tolerance && a_max > b_min + tolerance
    }

    #[inline]
    fn overlap_1d(a_min: f64, a_max: f64, b_min: f64, b_max: f64) -> f64 {
        (a_max.min(b_max) - a_min.max(b_min)).max(0.0)
    }

    /// Overlap area of the two footprints in the XY plane.
    #[inline]
    pub fn overlap_area_xy(&self, other: &Self) -> f64 {
        let overlap_x = Self::overlap_1d(self.min.x, self.max.x, other.min.x, other.max.x);
        let overlap_y = Self::overlap_1d(self.min.y, self.max.y, other.min.y, other.max.y);
        overlap_x * overlap_y
    }

    /// Returns the top (Z maximum).
    #[inline]
    pub fn top_z(&self) -> f64 {
        self.max.z
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        Vec3::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
            (self.min.z + self.max.z) / 2.0,
        )
    }

    #[inline]
    pub fn dimensions(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Accumulates weighted points for a 3D center of mass.
#[derive(Clone, Debug)]
pub struct CenterOfMassCalculator {
    weighted: Vec3,
    total_weight: f64,
}

impl CenterOfMassCalculator {
    pub fn new() -> Self {
        Self {
            weighted: Vec3::zero(),
            total_weight: 0.0,
        }
    }

    pub fn add_point(&mut self, point: Vec3, weight: f64) {
        self.weighted = self.weighted + point * weight;
        self.total_weight += weight;
    }

    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Returns `None` while no positive weight has been added.
    pub fn compute(&self) -> Option<Vec3> {
        if self.total_weight <= 0.0 {
            None
        } else {
            Some(self.weighted * (1.0 / self.total_weight))
        }
    }
}

impl Default for CenterOfMassCalculator {
    fn default() -> Self {
        Self::new()
    }
}
