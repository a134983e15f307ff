//! Design-space search over actuator placements.
use crate::{Cone, Error, Geometry, Linkage, RangeError, Unreachable};
use std::{f64::consts::PI, str::FromStr};

/// Largest number of values of a range, and of placements of a sweep.
pub const MAX_COUNT: usize = 1 << 20;

/// Inclusive range of degrees, `start..=stop` by `step`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Range {
    /// First value
    pub start: f64,
    /// Last value (inclusive)
    pub stop: f64,
    /// Increment
    pub step: f64,
}

impl Range {
    /// Create a new range.
    pub const fn new(start: f64, stop: f64, step: f64) -> Self {
        Self { start, stop, step }
    }

    /// A range with only one value.
    pub const fn single(v: f64) -> Self {
        Self::new(v, v, 1.)
    }

    /// Check the range, `name` is used in the error.
    pub fn check(&self, name: &'static str) -> Result<(), RangeError> {
        if ![self.start, self.stop, self.step].iter().all(|x| x.is_finite()) {
            Err(RangeError::NonFinite(name))
        } else if self.step <= 0. {
            Err(RangeError::Step(name))
        } else if self.start > self.stop {
            Err(RangeError::Reversed(name))
        } else if self.count() > MAX_COUNT as f64 {
            Err(RangeError::TooLarge(name))
        } else {
            Ok(())
        }
    }

    // Number of values before the cast
    fn count(&self) -> f64 {
        // Absorb rounding of fractional steps
        ((self.stop - self.start) / self.step + 1e-9).floor() + 1.
    }

    /// Number of values. Zero if the range is invalid.
    pub fn len(&self) -> usize {
        match self.check("") {
            Ok(()) => self.count() as usize,
            Err(_) => 0,
        }
    }

    /// Return true if there is no value.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate the values.
    ///
    /// Values are generated by index, so the error does not accumulate.
    pub fn iter(self) -> impl ExactSizeIterator<Item = f64> + Clone {
        (0..self.len()).map(move |i| self.start + i as f64 * self.step)
    }
}

impl FromStr for Range {
    type Err = RangeError;

    /// Parse `start,stop,step` or a single value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || RangeError::Parse(s.to_string());
        let v = s
            .split(',')
            .map(|x| x.trim().parse::<f64>().map_err(|_| err()))
            .collect::<Result<Vec<_>, _>>()?;
        match v[..] {
            [v] => Ok(Self::single(v)),
            [start, stop, step] => Ok(Self::new(start, stop, step)),
            _ => Err(err()),
        }
    }
}

impl std::fmt::Display for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{},{},{}", self.start, self.stop, self.step)
    }
}

/// Sweep configuration.
///
/// All angles are in degrees, including the finite difference step
/// `epsilon`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq)]
pub struct SweepCfg {
    /// Actuator inclinations (outer loop)
    pub alpha: Range,
    /// Actuator half separations (inner loop)
    pub beta: Range,
    /// Target inclinations to test
    pub thetas: Vec<f64>,
    /// Azimuth increment over `[0°, 360°)`
    pub azimuth_step: f64,
    /// Finite difference step of the advantage proxy
    pub epsilon: f64,
    /// Working cone for the link length derivation
    pub cone: Cone,
}

impl Default for SweepCfg {
    fn default() -> Self {
        Self::new()
    }
}

impl SweepCfg {
    /// Default value.
    pub fn new() -> Self {
        Self {
            alpha: Range::new(45., 90., 1.),
            beta: Range::new(0., 90., 1.),
            thetas: vec![45.],
            azimuth_step: 1.,
            epsilon: PI / 48.,
            cone: Cone::new(),
        }
    }

    impl_builders! {
        /// Actuator inclinations
        fn alpha(Range)
        /// Actuator half separations
        fn beta(Range)
        /// Target inclinations to test
        fn thetas(Vec<f64>)
        /// Azimuth increment
        fn azimuth_step(f64)
        /// Finite difference step
        fn epsilon(f64)
        /// Working cone
        fn cone(Cone)
    }

    /// Check the configuration.
    pub fn check(&self) -> Result<(), RangeError> {
        self.alpha.check("alpha")?;
        self.beta.check("beta")?;
        if self.thetas.is_empty() {
            return Err(RangeError::NoTheta);
        }
        if !self.thetas.iter().all(|x| x.is_finite()) {
            return Err(RangeError::NonFinite("theta"));
        }
        for (name, v) in [("azimuth", self.azimuth_step), ("epsilon", self.epsilon)] {
            if !v.is_finite() {
                return Err(RangeError::NonFinite(name));
            } else if v <= 0. {
                return Err(RangeError::Step(name));
            }
        }
        if self.azimuth_count() > MAX_COUNT as f64 {
            return Err(RangeError::TooLarge("azimuth"));
        }
        match self.alpha.len().checked_mul(self.beta.len()) {
            Some(n) if n <= MAX_COUNT => (),
            _ => return Err(RangeError::TooLarge("placements")),
        }
        let Cone { max_theta, margin } = self.cone;
        if !(max_theta.is_finite() && margin.is_finite()) {
            return Err(RangeError::NonFinite("cone"));
        }
        Ok(())
    }

    fn azimuth_count(&self) -> f64 {
        (360. / self.azimuth_step - 1e-9).ceil().max(1.)
    }

    /// Azimuths over `[0°, 360°)` in degrees.
    ///
    /// Empty if the azimuth step is invalid.
    pub fn azimuths(&self) -> impl ExactSizeIterator<Item = f64> + Clone {
        let step = self.azimuth_step;
        let valid = step > 0. && step.is_finite() && self.azimuth_count() <= MAX_COUNT as f64;
        let n = if valid { self.azimuth_count() as usize } else { 0 };
        (0..n).map(move |i| i as f64 * step)
    }

    /// Actuator placements `(alpha, beta)` in degrees, alpha in the outer
    /// loop.
    pub fn grid(&self) -> impl Iterator<Item = (f64, f64)> + Clone {
        let beta = self.beta;
        self.alpha.iter().flat_map(move |a| beta.iter().map(move |b| (a, b)))
    }
}

/// Evaluation result of an actuator placement.
///
/// Angles are in degrees, advantages are ratios of actuator angle change to
/// target angle change.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct DesignRecord {
    /// Actuator inclination
    pub alpha: f64,
    /// Actuator half separation
    pub beta: f64,
    /// Derived inner link length
    pub inner_link: f64,
    /// Derived outer link length
    pub outer_link: f64,
    /// Center of the observed actuator A range
    pub motor_zero: f64,
    /// Width of the observed actuator A range
    pub rotation_range: f64,
    /// Lowest advantage proxy
    pub min_advantage: f64,
    /// Mean advantage proxy
    pub avg_advantage: f64,
}

impl DesignRecord {
    /// Geometry of this design, with the observed range center as zero.
    pub fn geometry(&self) -> Result<Geometry, Error> {
        let geo = Geometry::new_degrees(
            self.alpha,
            self.beta,
            self.motor_zero,
            self.inner_link,
            self.outer_link,
        )?;
        Ok(geo)
    }
}

/// A skipped actuator placement.
#[derive(Clone, Debug, PartialEq)]
pub struct Skip {
    /// Actuator inclination in degrees
    pub alpha: f64,
    /// Actuator half separation in degrees
    pub beta: f64,
    /// Why it is skipped
    pub reason: Error,
}

impl std::fmt::Display for Skip {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let Self { alpha, beta, reason } = self;
        write!(f, "skipping {alpha}, {beta}: {reason}")
    }
}

impl std::error::Error for Skip {}

// Running statistics of one placement
pub(crate) struct Tally {
    pub(crate) min_rot: f64,
    pub(crate) max_rot: f64,
    pub(crate) min_adv: f64,
    pub(crate) sum_adv: f64,
    pub(crate) terms: usize,
}

impl Tally {
    fn new() -> Self {
        Self {
            min_rot: f64::INFINITY,
            max_rot: f64::NEG_INFINITY,
            min_adv: f64::INFINITY,
            sum_adv: 0.,
            terms: 0,
        }
    }

    fn rotation(&mut self, rot: f64) {
        self.min_rot = self.min_rot.min(rot);
        self.max_rot = self.max_rot.max(rot);
    }

    fn advantage(&mut self, adv: f64) {
        self.terms += 1;
        self.min_adv = self.min_adv.min(adv);
        self.sum_adv += adv;
    }
}

/// A validated sweep over actuator placements.
///
/// ```
/// use pan_tilt::{Range, Sweep, SweepCfg};
///
/// let cfg = SweepCfg::new()
///     .alpha(Range::new(40., 60., 10.))
///     .beta(Range::single(15.))
///     .azimuth_step(30.);
/// let sweep = Sweep::new(cfg).unwrap();
/// let (ok, skipped): (Vec<_>, Vec<_>) = sweep.iter().partition(Result::is_ok);
/// assert_eq!(ok.len(), 2);
/// assert_eq!(skipped.len(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct Sweep {
    cfg: SweepCfg,
    // Radians
    thetas: Vec<f64>,
    phis: Vec<f64>,
}

impl Sweep {
    /// Validate the configuration and create the sweep.
    pub fn new(cfg: SweepCfg) -> Result<Self, RangeError> {
        cfg.check()?;
        let thetas = cfg.thetas.iter().map(|x| x.to_radians()).collect();
        let phis = cfg.azimuths().map(f64::to_radians).collect();
        Ok(Self { cfg, thetas, phis })
    }

    /// The configuration.
    pub fn cfg(&self) -> &SweepCfg {
        &self.cfg
    }

    /// Number of placements.
    pub fn len(&self) -> usize {
        self.cfg.alpha.len().saturating_mul(self.cfg.beta.len())
    }

    /// Return true if there is no placement.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Evaluate all placements in order, alpha in the outer loop.
    pub fn iter(&self) -> impl Iterator<Item = Result<DesignRecord, Skip>> + '_ {
        self.cfg.grid().map(|(alpha, beta)| self.evaluate(alpha, beta))
    }

    /// Evaluate all placements in parallel.
    ///
    /// The order is the same as [`Sweep::iter()`].
    #[cfg(feature = "rayon")]
    #[cfg_attr(doc_cfg, doc(cfg(feature = "rayon")))]
    pub fn par_run(&self) -> Vec<Result<DesignRecord, Skip>> {
        self.par_run_with(|_| ())
    }

    /// Evaluate all placements in parallel, with a callback receiving the
    /// number of finished placements.
    #[cfg(feature = "rayon")]
    #[cfg_attr(doc_cfg, doc(cfg(feature = "rayon")))]
    pub fn par_run_with<CB>(&self, callback: CB) -> Vec<Result<DesignRecord, Skip>>
    where
        CB: Fn(usize) + Sync + Send,
    {
        use rayon::prelude::*;
        use std::sync::atomic::{AtomicUsize, Ordering};
        let done = AtomicUsize::new(0);
        let grid = self.cfg.grid().collect::<Vec<_>>();
        grid.into_par_iter()
            .map(|(alpha, beta)| {
                let res = self.evaluate(alpha, beta);
                callback(done.fetch_add(1, Ordering::Relaxed) + 1);
                res
            })
            .collect()
    }

    /// Evaluate one placement, angles in degrees.
    ///
    /// The placement is skipped if any sample, perturbed or not, is out of
    /// reach.
    pub fn evaluate(&self, alpha: f64, beta: f64) -> Result<DesignRecord, Skip> {
        let skip = |reason: Error| Skip { alpha, beta, reason };
        let (alpha_rad, beta_rad) = (alpha.to_radians(), beta.to_radians());
        let links = self
            .cfg
            .cone
            .link_lengths(alpha_rad, beta_rad)
            .map_err(|e| skip(e.into()))?;
        let linkage = Geometry::from_links(alpha_rad, beta_rad, links)
            .map_err(Error::from)
            .and_then(|geo| Linkage::new(geo).map_err(Error::from))
            .map_err(skip)?;
        let tally = self.tally(&linkage).map_err(|e| {
            tracing::debug!(alpha, beta, "{e}");
            skip(e.into())
        })?;
        let [inner_link, outer_link] = links.to_degrees();
        Ok(DesignRecord {
            alpha,
            beta,
            inner_link,
            outer_link,
            motor_zero: (tally.min_rot + tally.max_rot) / 2.,
            rotation_range: tally.max_rot - tally.min_rot,
            min_advantage: tally.min_adv,
            avg_advantage: tally.sum_adv / tally.terms as f64,
        })
    }

    // Sample every target pose and its two perturbations
    pub(crate) fn tally(&self, linkage: &Linkage) -> Result<Tally, Unreachable> {
        // Step in degrees, applied to the pose in radians
        let eps = self.cfg.epsilon;
        let eps_rad = eps.to_radians();
        let mut tally = Tally::new();
        for &theta in &self.thetas {
            for &phi in &self.phis {
                let [a, b] = linkage.solve(theta, phi)?;
                tally.rotation(a);
                let probes = [
                    linkage.solve(theta + eps_rad, phi)?,
                    linkage.solve(theta, phi + eps_rad)?,
                ];
                for [pa, pb] in probes {
                    tally.advantage(((pa - a) / eps).abs() + ((pb - b) / eps).abs());
                }
            }
        }
        Ok(tally)
    }
}
