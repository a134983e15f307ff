use crate::{Geometry, Pose, Reach, Unreachable};
use std::f64::consts::PI;

/// One of the two mirrored actuators.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// The actuator at azimuth `+motor_beta` side of the formula (`s = +1`)
    A,
    /// The mirrored actuator (`s = -1`)
    B,
}

impl Side {
    /// Both sides in output order.
    pub const BOTH: [Self; 2] = [Self::A, Self::B];

    /// Sign `s` used by the shared formula.
    pub const fn sign(self) -> f64 {
        match self {
            Self::A => 1.,
            Self::B => -1.,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
        }
    }
}

// Sign function which is zero at zero
fn sign(x: f64) -> f64 {
    if x > 0. {
        1.
    } else if x < 0. {
        -1.
    } else {
        0.
    }
}

// Trigonometry of the fixed geometry
#[derive(Clone, Debug, PartialEq)]
struct Trig {
    cos_alpha: f64,
    sin_alpha: f64,
    cos_inner: f64,
    sin_inner: f64,
    cos_outer: f64,
    cos_bound: [f64; 2],
}

impl Trig {
    fn new(geo: &Geometry) -> Self {
        Self {
            cos_alpha: geo.motor_alpha().cos(),
            sin_alpha: geo.motor_alpha().sin(),
            cos_inner: geo.inner_link().cos(),
            sin_inner: geo.inner_link().sin(),
            cos_outer: geo.outer_link().cos(),
            cos_bound: geo.reach().cos_bound(),
        }
    }
}

/// A calibrated spherical pan/tilt linkage.
///
/// The calibration offsets are the raw inverse kinematics of the neutral pose
/// `(0, 0)`, computed once on creation. Every result has them subtracted, so
/// the neutral pose maps to `[0, 0]` exactly.
#[derive(Clone, Debug, PartialEq)]
pub struct Linkage {
    geo: Geometry,
    trig: Trig,
    offsets: [f64; 2],
}

impl Linkage {
    /// Create and calibrate a linkage.
    ///
    /// Fails if the neutral pose itself is out of reach.
    pub fn new(geo: Geometry) -> Result<Self, Unreachable> {
        let trig = Trig::new(&geo);
        let mut linkage = Self { geo, trig, offsets: [0.; 2] };
        linkage.offsets = linkage.solve(0., 0.)?;
        Ok(linkage)
    }

    /// The geometry of this linkage.
    pub fn geometry(&self) -> &Geometry {
        &self.geo
    }

    /// Reach envelope of each actuator.
    pub fn reach(&self) -> Reach {
        self.geo.reach()
    }

    /// Calibration offsets in degrees, `[A, B]`.
    pub fn offsets(&self) -> [f64; 2] {
        self.offsets
    }

    /// Actuator angles `[A, B]` in degrees for a target inclination `theta`
    /// and azimuth `phi`, both in degrees.
    pub fn ik(&self, theta: f64, phi: f64) -> Result<[f64; 2], Unreachable> {
        self.solve(theta.to_radians(), phi.to_radians())
    }

    /// Actuator angles `[A, B]` in degrees for a target pose.
    pub fn ik_pose(&self, pose: Pose) -> Result<[f64; 2], Unreachable> {
        self.solve(pose.inclination, pose.azimuth)
    }

    /// Actuator angles `[A, B]` in degrees for a target inclination `theta`
    /// and azimuth `phi`, both in radians.
    pub fn solve(&self, theta: f64, phi: f64) -> Result<[f64; 2], Unreachable> {
        let (sin_theta, cos_theta) = theta.sin_cos();
        let a = self.motor(Side::A, cos_theta, sin_theta, phi)?;
        let b = self.motor(Side::B, cos_theta, sin_theta, phi)?;
        let [oa, ob] = self.offsets;
        Ok([a.to_degrees() - oa, b.to_degrees() - ob])
    }

    // Raw rotation (radians) of one actuator
    fn motor(&self, side: Side, cos_theta: f64, sin_theta: f64, phi: f64) -> Result<f64, Unreachable> {
        let Trig { cos_alpha, sin_alpha, cos_inner, sin_inner, cos_outer, cos_bound } = self.trig;
        let s = side.sign();
        // Target relative to the actuator, viewed from the pole
        let psi = PI - phi + s * self.geo.motor_beta();
        let cos_psi = psi.cos();
        let sin_psi = (1. - cos_psi * cos_psi).sqrt();
        // Distance of the target from the actuator
        let cos_tau = cos_theta * cos_alpha + sin_theta * sin_alpha * cos_psi;
        let [lower, upper] = cos_bound;
        if !(lower <= cos_tau && cos_tau <= upper) {
            return Err(Unreachable { side, tau: cos_tau.acos() });
        }
        let sin_tau = (1. - cos_tau * cos_tau).sqrt();
        // Pole to target, viewed from the actuator
        // NOTE: zero at `phi == 0` even if `theta > 0`
        // NOTE: the ratio is clamped like cos(E), so a boundary pose where
        // rounding exceeds 1 gives ±90° instead of NaN
        let t = (sin_psi * sin_theta / sin_tau).clamp(-1., 1.).asin() * sign(phi) * -1.;
        // Target to elbow, viewed from the actuator
        let cos_e = (cos_outer - cos_inner * cos_tau) / (sin_inner * sin_tau);
        let e = cos_e.clamp(-1., 1.).acos() * s * -1.;
        Ok(t + e + s * self.geo.motor_zero())
    }
}
