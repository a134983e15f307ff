use crate::Side;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// No consistent pair of link lengths exists for an actuator placement.
///
/// All angles are in radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Infeasible {
    /// The actuator sits inside the working cone and cannot reach its edge.
    AlphaBelowCone {
        /// Actuator inclination
        alpha: f64,
        /// Half angle of the working cone, margin included
        max_theta: f64,
    },
    /// The outer link lands between the cone edge and the actuator
    /// inclination, so no inner link closes the loop.
    NoInnerLength {
        /// Derived outer link length
        outer: f64,
    },
    /// A derived link length is outside the open interval (0, π).
    LinkOutOfRange {
        /// Derived inner link length
        inner: f64,
        /// Derived outer link length
        outer: f64,
    },
}

impl Display for Infeasible {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match *self {
            Self::AlphaBelowCone { alpha, max_theta } => write!(
                f,
                "infeasible: α ({:.2}°) < maxθ ({:.2}°)",
                alpha.to_degrees(),
                max_theta.to_degrees()
            ),
            Self::NoInnerLength { outer } => write!(
                f,
                "infeasible: no inner link for outer link {:.2}°",
                outer.to_degrees()
            ),
            Self::LinkOutOfRange { inner, outer } => write!(
                f,
                "infeasible: link lengths ({:.2}°, {:.2}°) out of range",
                inner.to_degrees(),
                outer.to_degrees()
            ),
        }
    }
}

impl std::error::Error for Infeasible {}

/// The target is out of the reach envelope of one actuator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Unreachable {
    /// The actuator that cannot reach
    pub side: Side,
    /// Angular distance between the target and the actuator pivot, in radians
    pub tau: f64,
}

impl Display for Unreachable {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        let Self { side, tau } = self;
        write!(f, "unreachable: τ = {:.2}° on actuator {side}", tau.to_degrees())
    }
}

impl std::error::Error for Unreachable {}

/// Invalid geometry configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GeometryError {
    /// The named field is NaN or infinite.
    NonFinite(&'static str),
    /// The named link length (radians) is not in the open interval (0, π).
    LinkLength(&'static str, f64),
}

impl Display for GeometryError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::NonFinite(name) => write!(f, "invalid geometry: {name} is not finite"),
            Self::LinkLength(name, v) => write!(
                f,
                "invalid geometry: {name} ({:.2}°) must be in (0°, 180°)",
                v.to_degrees()
            ),
        }
    }
}

impl std::error::Error for GeometryError {}

/// Invalid sweep configuration.
#[derive(Clone, Debug, PartialEq)]
pub enum RangeError {
    /// The named value is NaN or infinite.
    NonFinite(&'static str),
    /// The step of the named range is not positive.
    Step(&'static str),
    /// The named range starts after it stops.
    Reversed(&'static str),
    /// The named range has more than [`MAX_COUNT`](crate::MAX_COUNT) values.
    TooLarge(&'static str),
    /// No inclination to test.
    NoTheta,
    /// Text cannot be parsed as `start,stop,step`.
    Parse(String),
}

impl Display for RangeError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::NonFinite(name) => write!(f, "invalid sweep: {name} is not finite"),
            Self::Step(name) => write!(f, "invalid sweep: {name} step must be positive"),
            Self::Reversed(name) => write!(f, "invalid sweep: {name} starts after it stops"),
            Self::TooLarge(name) => write!(f, "invalid sweep: too many {name} values"),
            Self::NoTheta => write!(f, "invalid sweep: no inclination to test"),
            Self::Parse(s) => write!(f, "invalid range \"{s}\", expect \"start,stop,step\""),
        }
    }
}

impl std::error::Error for RangeError {}

/// Any error of this crate.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// See [`Infeasible`].
    Infeasible(Infeasible),
    /// See [`Unreachable`].
    Unreachable(Unreachable),
    /// See [`GeometryError`].
    Geometry(GeometryError),
    /// See [`RangeError`].
    Range(RangeError),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::Infeasible(e) => e.fmt(f),
            Self::Unreachable(e) => e.fmt(f),
            Self::Geometry(e) => e.fmt(f),
            Self::Range(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Infeasible(e) => Some(e),
            Self::Unreachable(e) => Some(e),
            Self::Geometry(e) => Some(e),
            Self::Range(e) => Some(e),
        }
    }
}

macro_rules! impl_from {
    ($($ty:ident => $variant:ident),+ $(,)?) => {$(
        impl From<$ty> for Error {
            fn from(e: $ty) -> Self {
                Self::$variant(e)
            }
        }
    )+};
}

impl_from!(
    Infeasible => Infeasible,
    Unreachable => Unreachable,
    GeometryError => Geometry,
    RangeError => Range,
);
