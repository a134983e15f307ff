use crate::Infeasible;
use std::f64::consts::{FRAC_PI_4, PI};

/// Link lengths in radians.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Links {
    /// Inner link, attached to the actuator
    pub inner: f64,
    /// Outer link, attached to the end effector
    pub outer: f64,
}

impl Links {
    /// `[inner, outer]` in degrees.
    pub fn to_degrees(self) -> [f64; 2] {
        [self.inner.to_degrees(), self.outer.to_degrees()]
    }
}

/// Working cone around the pole that the end effector must cover, in
/// radians.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cone {
    /// Largest inclination to reach
    pub max_theta: f64,
    /// Extra inclination budget beyond `max_theta`
    pub margin: f64,
}

impl Default for Cone {
    fn default() -> Self {
        Self::new()
    }
}

impl Cone {
    /// Constant default value. (45° with a 2.5° margin)
    pub const fn new() -> Self {
        Self { max_theta: FRAC_PI_4, margin: PI / 72. }
    }

    impl_builders! {
        /// Largest inclination to reach
        fn max_theta(f64)
        /// Extra inclination budget
        fn margin(f64)
    }

    /// Half angle of the cone, margin included.
    pub fn half_angle(&self) -> f64 {
        self.max_theta + self.margin
    }

    /// Derive the link lengths for an actuator at inclination `alpha` and
    /// half separation `beta` (radians), so that the cone edge is just
    /// reachable on both the far and the near side of the actuator.
    pub fn link_lengths(&self, alpha: f64, beta: f64) -> Result<Links, Infeasible> {
        let max_theta = self.half_angle();
        if alpha < max_theta {
            return Err(Infeasible::AlphaBelowCone { alpha, max_theta });
        }
        // Extents of the cone seen from the actuator
        let across = alpha + max_theta;
        let beside = alpha - max_theta;
        let (sin_across, cos_across) = across.sin_cos();
        let (sin_beta, cos_beta) = beta.sin_cos();
        // Intersection of two spherical circles
        let outer = (cos_beta * beside.cos() - cos_across).atan2(sin_across - sin_beta);
        let inner = if outer <= alpha {
            across - outer
        } else if outer >= max_theta {
            beside + outer
        } else {
            return Err(Infeasible::NoInnerLength { outer });
        };
        let valid = |x: f64| x > 0. && x < PI;
        if valid(inner) && valid(outer) {
            Ok(Links { inner, outer })
        } else {
            Err(Infeasible::LinkOutOfRange { inner, outer })
        }
    }
}

/// Derive the link lengths with the default [`Cone`].
///
/// See [`Cone::link_lengths()`].
pub fn link_lengths(alpha: f64, beta: f64) -> Result<Links, Infeasible> {
    Cone::new().link_lengths(alpha, beta)
}
