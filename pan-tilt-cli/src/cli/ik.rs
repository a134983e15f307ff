use super::AnyResult;
use pan_tilt::{Actuator, Driver, Geometry, GeometryDeg, Linkage, Picker};
use std::{io::Write as _, path::PathBuf, str::FromStr};

#[derive(clap::Args)]
pub(super) struct GeometryArgs {
    /// Load the geometry from a RON file, angles in degrees
    #[clap(short, long, conflicts_with_all = ["alpha", "beta", "zero", "inner", "outer"])]
    geometry: Option<PathBuf>,
    /// Actuator inclination in degrees
    #[clap(long, default_value_t = 45.)]
    alpha: f64,
    /// Actuator half separation in degrees
    #[clap(long, default_value_t = 9.)]
    beta: f64,
    /// Actuator zero direction in degrees
    #[clap(long, default_value_t = 90.)]
    zero: f64,
    /// Inner link length in degrees
    #[clap(long, default_value_t = 51.265)]
    inner: f64,
    /// Outer link length in degrees
    #[clap(long, default_value_t = 68.735)]
    outer: f64,
}

impl GeometryArgs {
    pub(super) fn linkage(&self) -> AnyResult<Linkage> {
        let geo = match &self.geometry {
            Some(path) => ron::from_str::<Geometry>(&std::fs::read_to_string(path)?)?,
            None => Geometry::try_from(GeometryDeg {
                motor_alpha: self.alpha,
                motor_beta: self.beta,
                motor_zero: self.zero,
                inner_link: self.inner,
                outer_link: self.outer,
            })?,
        };
        let linkage = Linkage::new(geo)?;
        let [a, b] = linkage.offsets();
        tracing::debug!(a, b, "calibrated offsets");
        Ok(linkage)
    }
}

#[derive(clap::Args)]
pub(super) struct IkArgs {
    #[clap(flatten)]
    pub(super) geo: GeometryArgs,
    /// Target inclination in degrees
    #[clap(allow_negative_numbers = true)]
    pub(super) theta: f64,
    /// Target azimuth in degrees
    #[clap(allow_negative_numbers = true)]
    pub(super) phi: f64,
}

pub(super) fn ik(args: IkArgs) -> AnyResult {
    let linkage = args.geo.linkage()?;
    let [a, b] = linkage.ik(args.theta, args.phi)?;
    println!("{a:.4},{b:.4}");
    Ok(())
}

/// Picker input "radius,angle", the angle is in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct Polar(pub(super) [f64; 2]);

impl FromStr for Polar {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || format!("expect \"radius,angle\", got {s:?}");
        let (r, angle) = s.split_once(',').ok_or_else(err)?;
        let r = r.trim().parse().map_err(|_| err())?;
        let angle = angle.trim().parse().map_err(|_| err())?;
        Ok(Self([r, angle]))
    }
}

#[derive(clap::Args)]
pub(super) struct PointArgs {
    #[clap(flatten)]
    geo: GeometryArgs,
    /// Picker inputs "radius,angle"
    #[clap(required = true)]
    pub(super) points: Vec<Polar>,
    /// Picker radius
    #[clap(long, default_value_t = Picker::new().radius)]
    picker_radius: f64,
    /// Inclination at the picker rim in degrees
    #[clap(long, default_value_t = Picker::new().max_inclination)]
    max_inclination: f64,
    /// Channel of actuator A
    #[clap(long, default_value_t = 12)]
    pub(super) channel_a: u8,
    /// Channel of actuator B
    #[clap(long, default_value_t = 13)]
    pub(super) channel_b: u8,
    /// Actuator angle limit in degrees
    #[clap(long, default_value_t = 60.)]
    limit: f64,
    /// Disable the actuator angle limit
    #[clap(long)]
    no_limit: bool,
}

/// Write the commands to stdout as "channel,angle".
struct Print;

impl Actuator for Print {
    type Error = std::io::Error;

    fn move_to(&mut self, channel: u8, angle: f64) -> Result<(), Self::Error> {
        writeln!(std::io::stdout(), "{channel},{angle:.4}")
    }
}

pub(super) fn point(args: PointArgs) -> AnyResult {
    let linkage = args.geo.linkage()?;
    let picker = Picker::new()
        .radius(args.picker_radius)
        .max_inclination(args.max_inclination);
    let limit = (!args.no_limit).then_some(args.limit);
    let mut driver = Driver::new(linkage, [args.channel_a, args.channel_b], Print).limit(limit);
    for Polar([r, angle]) in args.points {
        let Some(pose) = picker.pick_polar(r, angle) else {
            tracing::warn!(r, angle, "outside of the picker");
            continue;
        };
        let [theta, phi] = pose.to_degrees();
        tracing::info!(theta, phi, "pointing");
        driver.point(pose)?;
    }
    Ok(())
}
