/// Target pointing direction, in radians.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pose {
    /// Angular distance from the pole (θ)
    pub inclination: f64,
    /// Angular position around the pole (φ)
    pub azimuth: f64,
}

impl Pose {
    /// The neutral pose, pointing at the pole.
    pub const NEUTRAL: Self = Self::new(0., 0.);

    /// Create with angles in radians.
    pub const fn new(inclination: f64, azimuth: f64) -> Self {
        Self { inclination, azimuth }
    }

    /// Create with angles in degrees.
    pub fn from_degrees(inclination: f64, azimuth: f64) -> Self {
        Self::new(inclination.to_radians(), azimuth.to_radians())
    }

    /// `[inclination, azimuth]` in degrees.
    pub fn to_degrees(self) -> [f64; 2] {
        [self.inclination.to_degrees(), self.azimuth.to_degrees()]
    }
}

/// Translate 2-D pointer input on a circular picker into a [`Pose`].
///
/// The picker center is the pole. The distance from the center maps linearly
/// onto the inclination, and the pointer direction is the azimuth.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Picker {
    /// Radius of the picker, in pointer units
    pub radius: f64,
    /// Inclination at the picker rim, in degrees
    pub max_inclination: f64,
}

impl Default for Picker {
    fn default() -> Self {
        Self::new()
    }
}

impl Picker {
    /// Constant default value. (200 units, 45°)
    pub const fn new() -> Self {
        Self { radius: 200., max_inclination: 45. }
    }

    impl_builders! {
        /// Radius of the picker
        fn radius(f64)
        /// Inclination at the picker rim, in degrees
        fn max_inclination(f64)
    }

    /// Pick from an offset `(x, y)` relative to the picker center.
    ///
    /// Return `None` if the point is outside the picker.
    pub fn pick(&self, x: f64, y: f64) -> Option<Pose> {
        self.pick_polar(x.hypot(y), x.atan2(y).to_degrees())
    }

    /// Pick from a distance `r` and an angle in degrees.
    ///
    /// Return `None` if the point is outside the picker.
    pub fn pick_polar(&self, r: f64, angle: f64) -> Option<Pose> {
        (r.is_finite() && angle.is_finite() && (0. ..=self.radius).contains(&r))
            .then(|| Pose::from_degrees(r * self.max_inclination / self.radius, angle))
    }
}
