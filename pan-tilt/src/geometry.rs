use crate::{GeometryError, Links};
use std::f64::consts::PI;

/// Mounting geometry of the linkage.
///
/// All angles are stored in radians. Link lengths are great-circle arcs on
/// the unit sphere, so they are angles as well.
///
/// # Parameters
///
/// + Actuator inclination from the pole `motor_alpha`
/// + Actuator half separation around the pole `motor_beta`
/// + Inner link angle at actuator position zero `motor_zero`
/// + Inner link `inner_link`
/// + Outer link `outer_link`
///
/// With the `serde` feature, this type is (de)serialized in degrees through
/// [`GeometryDeg`].
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "GeometryDeg", into = "GeometryDeg")
)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Geometry {
    motor_alpha: f64,
    motor_beta: f64,
    motor_zero: f64,
    inner_link: f64,
    outer_link: f64,
}

impl Geometry {
    /// Create with angles in radians.
    pub fn new(
        motor_alpha: f64,
        motor_beta: f64,
        motor_zero: f64,
        inner_link: f64,
        outer_link: f64,
    ) -> Result<Self, GeometryError> {
        let geo = Self { motor_alpha, motor_beta, motor_zero, inner_link, outer_link };
        geo.check()?;
        Ok(geo)
    }

    /// Create with angles in degrees.
    pub fn new_degrees(
        motor_alpha: f64,
        motor_beta: f64,
        motor_zero: f64,
        inner_link: f64,
        outer_link: f64,
    ) -> Result<Self, GeometryError> {
        GeometryDeg { motor_alpha, motor_beta, motor_zero, inner_link, outer_link }.try_into()
    }

    /// Create from an actuator placement and derived link lengths, with the
    /// actuator zero at zero.
    pub fn from_links(motor_alpha: f64, motor_beta: f64, links: Links) -> Result<Self, GeometryError> {
        let Links { inner, outer } = links;
        Self::new(motor_alpha, motor_beta, 0., inner, outer)
    }

    /// Replace the actuator zero angle (radians).
    pub fn with_zero(self, motor_zero: f64) -> Result<Self, GeometryError> {
        Self::new(self.motor_alpha, self.motor_beta, motor_zero, self.inner_link, self.outer_link)
    }

    fn check(&self) -> Result<(), GeometryError> {
        let fields = [
            ("motor_alpha", self.motor_alpha),
            ("motor_beta", self.motor_beta),
            ("motor_zero", self.motor_zero),
            ("inner_link", self.inner_link),
            ("outer_link", self.outer_link),
        ];
        if let Some(&(name, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(GeometryError::NonFinite(name));
        }
        for (name, len) in [("inner_link", self.inner_link), ("outer_link", self.outer_link)] {
            if len <= 0. || len >= PI {
                return Err(GeometryError::LinkLength(name, len));
            }
        }
        Ok(())
    }

    /// Actuator inclination from the pole.
    pub fn motor_alpha(&self) -> f64 {
        self.motor_alpha
    }

    /// Actuator half separation around the pole.
    pub fn motor_beta(&self) -> f64 {
        self.motor_beta
    }

    /// Inner link angle at actuator position zero.
    pub fn motor_zero(&self) -> f64 {
        self.motor_zero
    }

    /// Length of the inner link.
    pub fn inner_link(&self) -> f64 {
        self.inner_link
    }

    /// Length of the outer link.
    pub fn outer_link(&self) -> f64 {
        self.outer_link
    }

    /// Reach envelope of each actuator.
    pub fn reach(&self) -> Reach {
        Reach::new(self.inner_link, self.outer_link)
    }

    /// Convert to degrees.
    pub fn to_degrees(self) -> GeometryDeg {
        self.into()
    }
}

/// [`Geometry`] in degrees, without validation.
///
/// This is the boundary format for files and command lines.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeometryDeg {
    /// Actuator inclination from the pole
    pub motor_alpha: f64,
    /// Actuator half separation around the pole
    pub motor_beta: f64,
    /// Inner link angle at actuator position zero
    pub motor_zero: f64,
    /// Length of the inner link
    pub inner_link: f64,
    /// Length of the outer link
    pub outer_link: f64,
}

impl TryFrom<GeometryDeg> for Geometry {
    type Error = GeometryError;

    fn try_from(geo: GeometryDeg) -> Result<Self, Self::Error> {
        let GeometryDeg { motor_alpha, motor_beta, motor_zero, inner_link, outer_link } = geo;
        let [motor_alpha, motor_beta, motor_zero, inner_link, outer_link] =
            [motor_alpha, motor_beta, motor_zero, inner_link, outer_link].map(f64::to_radians);
        Self::new(motor_alpha, motor_beta, motor_zero, inner_link, outer_link)
    }
}

impl From<Geometry> for GeometryDeg {
    fn from(geo: Geometry) -> Self {
        let Geometry { motor_alpha, motor_beta, motor_zero, inner_link, outer_link } = geo;
        let [motor_alpha, motor_beta, motor_zero, inner_link, outer_link] =
            [motor_alpha, motor_beta, motor_zero, inner_link, outer_link].map(f64::to_degrees);
        Self { motor_alpha, motor_beta, motor_zero, inner_link, outer_link }
    }
}

/// Feasible range of the target distance τ from an actuator pivot, in
/// radians.
///
/// `[|outer - inner|, inner + outer]`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reach {
    /// Closest reachable distance
    pub min: f64,
    /// Farthest reachable distance
    pub max: f64,
}

impl Reach {
    /// Create from the link lengths.
    pub fn new(inner: f64, outer: f64) -> Self {
        Self { min: (outer - inner).abs(), max: inner + outer }
    }

    /// Check the distance τ.
    pub fn contains(&self, tau: f64) -> bool {
        self.min <= tau && tau <= self.max
    }

    /// The envelope as bounds of cos(τ), `[lower, upper]`.
    ///
    /// Arcs wrap at π, so a maximum reach past π has no lower bound.
    pub fn cos_bound(&self) -> [f64; 2] {
        let lower = if self.max < PI { self.max.cos() } else { -1. };
        [lower, self.min.cos()]
    }

    /// Check the distance τ by its cosine.
    ///
    /// This is the check [`Linkage`](crate::Linkage) applies, and it is exact
    /// at the boundaries returned by [`Reach::cos_bound()`].
    pub fn contains_cos(&self, cos_tau: f64) -> bool {
        let [lower, upper] = self.cos_bound();
        lower <= cos_tau && cos_tau <= upper
    }
}
