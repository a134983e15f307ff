use crate::*;
use approx::assert_abs_diff_eq;

fn reference() -> Linkage {
    let geo = Geometry::new_degrees(45., 9., 90., 51.265, 68.735).unwrap();
    Linkage::new(geo).unwrap()
}

fn derived(alpha: f64, beta: f64) -> Linkage {
    let (alpha, beta) = (alpha.to_radians(), beta.to_radians());
    let links = link_lengths(alpha, beta).unwrap();
    Linkage::new(Geometry::from_links(alpha, beta, links).unwrap()).unwrap()
}

// Step to the next representable value away from zero
fn ulp_away(x: f64) -> f64 {
    f64::from_bits(x.to_bits() + 1)
}

#[test]
fn neutral_pose() {
    assert_eq!(reference().ik(0., 0.).unwrap(), [0., 0.]);
    assert_eq!(derived(60., 15.).ik(0., 0.).unwrap(), [0., 0.]);
    assert_eq!(derived(75., 40.).ik_pose(Pose::NEUTRAL).unwrap(), [0., 0.]);
}

#[test]
fn reference_geometry() {
    let linkage = reference();
    let [oa, ob] = linkage.offsets();
    assert_abs_diff_eq!(oa, -8.31518952636334, epsilon = 1e-9);
    assert_abs_diff_eq!(ob, 8.31518952636334, epsilon = 1e-9);
    let [a, b] = linkage.ik(45., 0.).unwrap();
    assert!(a.is_finite() && b.is_finite());
    assert_abs_diff_eq!(a, 35.70351920335963, epsilon = 1e-9);
    assert_abs_diff_eq!(b, -35.70351920335962, epsilon = 1e-9);
    let [a, b] = linkage.ik(45., 90.).unwrap();
    assert_abs_diff_eq!(a, -34.035774894214796, epsilon = 1e-9);
    assert_abs_diff_eq!(b, -67.2655656778307, epsilon = 1e-9);
}

#[test]
fn degrees_and_radians_agree() {
    let linkage = reference();
    let by_deg = linkage.ik(30., 120.).unwrap();
    let by_pose = linkage.ik_pose(Pose::from_degrees(30., 120.)).unwrap();
    let by_rad = linkage.solve(30f64.to_radians(), 120f64.to_radians()).unwrap();
    assert_eq!(by_deg, by_pose);
    assert_eq!(by_deg, by_rad);
}

#[test]
fn mirror_symmetry() {
    let linkage = derived(60., 15.);
    for phi in [15., 90., 135., 200.] {
        let [a, b] = linkage.ik(45., phi).unwrap();
        let [ma, mb] = linkage.ik(45., -phi).unwrap();
        assert_abs_diff_eq!(ma, -b, epsilon = 1e-9);
        assert_abs_diff_eq!(mb, -a, epsilon = 1e-9);
    }
}

#[test]
fn unreachable_target() {
    let linkage = reference();
    let e = linkage.ik(45., 180.).unwrap_err();
    assert!(!linkage.reach().contains(e.tau));
    assert!(e.to_string().starts_with("unreachable"));
}

#[test]
fn reach_envelope() {
    let reach = Reach::new(51.265f64.to_radians(), 68.735f64.to_radians());
    assert_abs_diff_eq!(reach.min.to_degrees(), 17.47, epsilon = 1e-9);
    assert_abs_diff_eq!(reach.max.to_degrees(), 120., epsilon = 1e-9);
    let [lower, upper] = reach.cos_bound();
    assert_eq!(lower, reach.max.cos());
    assert_eq!(upper, reach.min.cos());
    // Lower bound is negative, upper bound is positive
    assert!(reach.contains_cos(lower));
    assert!(!reach.contains_cos(ulp_away(lower)));
    assert!(reach.contains_cos(upper));
    assert!(!reach.contains_cos(ulp_away(upper)));
    assert!(!reach.contains_cos(f64::NAN));
    // Longer than a half circle
    let reach = Reach::new(100f64.to_radians(), 120f64.to_radians());
    assert!(reach.contains_cos(-1.));
}

#[test]
fn reach_boundary() {
    // At the neutral pose, cos(τ) is exactly cos(motor_alpha)
    fn linkage(alpha: f64, inner: f64, outer: f64) -> Result<Linkage, Unreachable> {
        Linkage::new(Geometry::new(alpha, 0.1, 0., inner, outer).unwrap())
    }
    // Step the argument one bit at a time until its cosine moves
    fn next_cos(x: f64, up: bool) -> f64 {
        let cos = x.cos();
        let mut x = x;
        while x.cos() == cos {
            x = f64::from_bits(if up { x.to_bits() + 1 } else { x.to_bits() - 1 });
        }
        x
    }
    // Upper bound of cos(τ), the closest reach
    let (inner, outer) = (0.5, 0.7);
    let [_, upper] = Reach::new(inner, outer).cos_bound();
    let alpha = Reach::new(inner, outer).min;
    let at = linkage(alpha, inner, outer).unwrap();
    assert_eq!(at.solve(0., 0.).unwrap(), [0., 0.]);
    let beyond = next_cos(alpha, false);
    assert_eq!(beyond.cos(), ulp_away(upper));
    let e = linkage(beyond, inner, outer).unwrap_err();
    assert_eq!(e.side, Side::A);
    // Lower bound of cos(τ), the farthest reach
    let (inner, outer) = (1.5, 1.6);
    let [lower, _] = Reach::new(inner, outer).cos_bound();
    let alpha = Reach::new(inner, outer).max;
    let at = linkage(alpha, inner, outer).unwrap();
    assert_eq!(at.ik(0., 0.).unwrap(), [0., 0.]);
    let beyond = next_cos(alpha, true);
    assert_eq!(beyond.cos(), ulp_away(lower));
    let e = linkage(beyond, inner, outer).unwrap_err();
    assert_eq!(e.side, Side::A);
}

#[test]
fn link_lengths_infeasible() {
    for alpha in (0..=47).map(f64::from) {
        for beta in [0f64, 15., 45., 90.] {
            let e = link_lengths(alpha.to_radians(), beta.to_radians()).unwrap_err();
            assert!(matches!(e, Infeasible::AlphaBelowCone { .. }));
        }
    }
    let e = link_lengths(40f64.to_radians(), 0.).unwrap_err();
    assert_eq!(e.to_string(), "infeasible: α (40.00°) < maxθ (47.50°)");
    // A smaller cone admits the placement
    let cone = Cone::new().max_theta(30f64.to_radians());
    assert!(cone.link_lengths(40f64.to_radians(), 0.).is_ok());
}

#[test]
fn link_lengths_reference() {
    let links = link_lengths(60f64.to_radians(), 15f64.to_radians()).unwrap();
    assert!(links.inner > 0. && links.outer > 0.);
    let [inner, outer] = links.to_degrees();
    assert_abs_diff_eq!(inner, 73.30710093481483, epsilon = 1e-9);
    assert_abs_diff_eq!(outer, 60.807100934814834, epsilon = 1e-9);
    let [inner, outer] = link_lengths(90f64.to_radians(), 90f64.to_radians())
        .unwrap()
        .to_degrees();
    assert_abs_diff_eq!(inner, 156.25, epsilon = 1e-9);
    assert_abs_diff_eq!(outer, 113.75, epsilon = 1e-9);
}

#[test]
fn derived_geometry_covers_cone() {
    let linkage = derived(60., 15.);
    for phi in (0..360).map(f64::from) {
        assert!(linkage.ik(45., phi).is_ok(), "unreachable at φ = {phi}");
    }
}

#[test]
fn geometry_validation() {
    use GeometryError::*;
    let e = Geometry::new_degrees(45., 9., 90., 0., 68.735).unwrap_err();
    assert!(matches!(e, LinkLength("inner_link", _)));
    let e = Geometry::new_degrees(45., 9., 90., 51.265, 180.).unwrap_err();
    assert!(matches!(e, LinkLength("outer_link", _)));
    let e = Geometry::new(f64::NAN, 0., 0., 1., 1.).unwrap_err();
    assert_eq!(e, NonFinite("motor_alpha"));
    let geo = Geometry::new_degrees(45., 9., 90., 51.265, 68.735).unwrap();
    let deg = geo.to_degrees();
    assert_abs_diff_eq!(deg.inner_link, 51.265, epsilon = 1e-12);
    assert_abs_diff_eq!(geo.with_zero(0.).unwrap().motor_zero(), 0.);
}

#[test]
fn range() {
    let r = "45, 90, 1".parse::<Range>().unwrap();
    assert_eq!(r, Range::new(45., 90., 1.));
    assert_eq!(r.len(), 46);
    assert_eq!(r.iter().last(), Some(90.));
    let r = "0.1,0.3,0.1".parse::<Range>().unwrap();
    assert_eq!(r.len(), 3);
    assert_eq!("7".parse::<Range>().unwrap().iter().collect::<Vec<_>>(), [7.]);
    assert!("1,2".parse::<Range>().is_err());
    assert!("a,b,c".parse::<Range>().is_err());
    assert_eq!(Range::new(1., 0., 1.).check("alpha"), Err(RangeError::Reversed("alpha")));
    assert_eq!(Range::new(0., 1., 0.).check("beta"), Err(RangeError::Step("beta")));
    assert!(Range::new(0., 1., 0.).is_empty());
    let r = Range::new(0., 90., 1e-300);
    assert_eq!(r.check("alpha"), Err(RangeError::TooLarge("alpha")));
    assert!(r.is_empty());
}

#[test]
fn sweep_cfg() {
    let cfg = SweepCfg::new();
    assert_eq!(cfg.check(), Ok(()));
    assert_eq!(cfg.azimuths().len(), 360);
    assert_eq!(cfg.grid().count(), 46 * 91);
    let azimuths = cfg.clone().azimuth_step(7.).azimuths().collect::<Vec<_>>();
    assert_eq!(azimuths.len(), 52);
    assert_eq!(azimuths.last(), Some(&357.));
    assert_eq!(cfg.clone().thetas(Vec::new()).check(), Err(RangeError::NoTheta));
    assert_eq!(cfg.clone().azimuth_step(0.).check(), Err(RangeError::Step("azimuth")));
    assert_eq!(cfg.clone().epsilon(f64::NAN).check(), Err(RangeError::NonFinite("epsilon")));
    assert_eq!(cfg.clone().azimuth_step(1e20).azimuths().len(), 1);
    let tiny = cfg.clone().azimuth_step(1e-300);
    assert_eq!(tiny.check(), Err(RangeError::TooLarge("azimuth")));
    assert_eq!(tiny.azimuths().len(), 0);
    let dense = cfg.clone().alpha(Range::new(0., 1e4, 0.01)).beta(Range::new(0., 1e4, 0.01));
    assert_eq!(dense.alpha.check("alpha"), Ok(()));
    assert_eq!(dense.check(), Err(RangeError::TooLarge("placements")));
    assert!(Sweep::new(cfg.alpha(Range::new(1., 0., 1.))).is_err());
}

#[test]
fn sweep_record() {
    let cfg = SweepCfg::new()
        .alpha(Range::single(60.))
        .beta(Range::single(15.));
    let sweep = Sweep::new(cfg).unwrap();
    assert_eq!(sweep.len(), 1);
    let records = sweep.iter().collect::<Result<Vec<_>, _>>().unwrap();
    let record = &records[0];
    assert_eq!([record.alpha, record.beta], [60., 15.]);
    assert_abs_diff_eq!(record.inner_link, 73.30710093481483, epsilon = 1e-9);
    assert_abs_diff_eq!(record.outer_link, 60.807100934814834, epsilon = 1e-9);
    assert_abs_diff_eq!(record.motor_zero, -10.546821208039908, epsilon = 1e-9);
    assert_abs_diff_eq!(record.rotation_range, 88.12268461595916, epsilon = 1e-9);
    assert!(record.min_advantage > 0.);
    assert!(record.min_advantage <= record.avg_advantage);
    assert!(record.avg_advantage.is_finite());
    // Every sampled angle is inside the observed range
    let linkage = derived(60., 15.);
    let half = record.rotation_range / 2.;
    let (min, max) = (record.motor_zero - half, record.motor_zero + half);
    for phi in (0..360).map(f64::from) {
        let [a, _] = linkage.ik(45., phi).unwrap();
        assert!(min - 1e-9 <= a && a <= max + 1e-9);
    }
    // The record can be turned back into a geometry
    let geo = record.geometry().unwrap();
    assert_eq!(Linkage::new(geo).unwrap().ik(0., 0.).unwrap(), [0., 0.]);
}

#[test]
fn sweep_advantage_terms() {
    let sweep = Sweep::new(SweepCfg::new()).unwrap();
    let terms = 2 * 360 * sweep.cfg().thetas.len();
    for (alpha, beta) in [(48., 0.), (60., 15.), (90., 90.)] {
        let tally = sweep.tally(&derived(alpha, beta)).unwrap();
        assert_eq!(tally.terms, terms);
        let record = sweep.evaluate(alpha, beta).unwrap();
        assert_eq!(record.avg_advantage, tally.sum_adv / terms as f64);
        assert_eq!(record.min_advantage, tally.min_adv);
    }
}

#[test]
fn sweep_unreachable_skip() {
    let cfg = SweepCfg::new()
        .alpha(Range::single(60.))
        .beta(Range::single(15.))
        .thetas(vec![80.]);
    let sweep = Sweep::new(cfg).unwrap();
    assert!(sweep.tally(&derived(60., 15.)).is_err());
    let skip = sweep.evaluate(60., 15.).unwrap_err();
    assert!(matches!(skip.reason, Error::Unreachable(_)));
    assert!(skip.to_string().starts_with("skipping 60, 15: unreachable"));
}

#[test]
fn sweep_order_and_skip() {
    let cfg = SweepCfg::new()
        .alpha(Range::new(40., 60., 10.))
        .beta(Range::new(0., 30., 15.))
        .thetas(vec![20., 45.])
        .azimuth_step(10.);
    let sweep = Sweep::new(cfg).unwrap();
    let results = sweep.iter().collect::<Vec<_>>();
    assert_eq!(results.len(), 9);
    let order = results
        .iter()
        .map(|res| match res {
            Ok(r) => (r.alpha, r.beta),
            Err(s) => (s.alpha, s.beta),
        })
        .collect::<Vec<_>>();
    let expect = [40., 50., 60.]
        .into_iter()
        .flat_map(|a| [0., 15., 30.].map(|b| (a, b)))
        .collect::<Vec<_>>();
    assert_eq!(order, expect);
    for res in &results[..3] {
        let skip = res.as_ref().unwrap_err();
        assert!(matches!(skip.reason, Error::Infeasible(Infeasible::AlphaBelowCone { .. })));
        assert!(skip.to_string().starts_with("skipping 40, "));
    }
    for res in &results[3..] {
        let r = res.as_ref().unwrap();
        assert!(r.rotation_range >= 0.);
    }
}

#[cfg(feature = "rayon")]
#[test]
fn parallel_sweep() {
    let cfg = SweepCfg::new()
        .alpha(Range::new(44., 64., 4.))
        .beta(Range::new(0., 40., 20.))
        .azimuth_step(15.);
    let sweep = Sweep::new(cfg).unwrap();
    let counter = std::sync::atomic::AtomicUsize::new(0);
    let par = sweep.par_run_with(|_| {
        counter.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
    });
    assert_eq!(counter.into_inner(), sweep.len());
    assert_eq!(par, sweep.iter().collect::<Vec<_>>());
}

#[derive(Default)]
struct Recorder {
    moves: Vec<(u8, f64)>,
}

impl Actuator for Recorder {
    type Error = std::convert::Infallible;

    fn move_to(&mut self, channel: u8, angle: f64) -> Result<(), Self::Error> {
        self.moves.push((channel, angle));
        Ok(())
    }
}

#[test]
fn driver() {
    let mut recorder = Recorder::default();
    let mut driver = Driver::new(reference(), [12, 13], &mut recorder);
    let pose = Pose::from_degrees(20., 30.);
    let [a, b] = driver.point(pose).unwrap().unwrap();
    // Unreachable, no command
    assert_eq!(driver.point(Pose::from_degrees(45., 180.)).unwrap(), None);
    assert_eq!(recorder.moves, [(12, a), (13, b)]);
    // Out of the angle limit, no command
    let mut driver = Driver::new(reference(), [12, 13], Recorder::default()).limit(Some(1.));
    assert_eq!(driver.point(pose).unwrap(), None);
    assert!(driver.into_actuator().moves.is_empty());
}

#[test]
fn picker() {
    let picker = Picker::new();
    let [theta, phi] = picker.pick(0., 200.).unwrap().to_degrees();
    assert_abs_diff_eq!(theta, 45., epsilon = 1e-12);
    assert_abs_diff_eq!(phi, 0., epsilon = 1e-12);
    let [theta, phi] = picker.pick(100., 0.).unwrap().to_degrees();
    assert_abs_diff_eq!(theta, 22.5, epsilon = 1e-12);
    assert_abs_diff_eq!(phi, 90., epsilon = 1e-12);
    assert_eq!(picker.pick(150., 150.), None);
    assert_eq!(picker.pick_polar(f64::NAN, 0.), None);
    let picker = picker.radius(1.).max_inclination(30.);
    let [theta, _] = picker.pick_polar(0.5, -45.).unwrap().to_degrees();
    assert_abs_diff_eq!(theta, 15., epsilon = 1e-12);
}

#[cfg(feature = "serde")]
#[test]
fn geometry_in_degrees() {
    let geo = Geometry::new_degrees(45., 9., 90., 51.265, 68.735).unwrap();
    let s = ron::to_string(&geo).unwrap();
    let back = ron::from_str::<Geometry>(&s).unwrap();
    assert_abs_diff_eq!(back.inner_link(), geo.inner_link(), epsilon = 1e-12);
    let s = "(motor_alpha: 45.0, motor_beta: 9.0, motor_zero: 90.0, inner_link: 51.265, outer_link: 68.735)";
    let geo = ron::from_str::<Geometry>(s).unwrap();
    assert_abs_diff_eq!(geo.motor_alpha(), std::f64::consts::FRAC_PI_4, epsilon = 1e-12);
    let s = "(motor_alpha: 45.0, motor_beta: 9.0, motor_zero: 90.0, inner_link: 0.0, outer_link: 68.735)";
    assert!(ron::from_str::<Geometry>(s).is_err());
}

#[cfg(feature = "csv")]
#[test]
fn records_csv() {
    let cfg = SweepCfg::new()
        .alpha(Range::new(50., 60., 10.))
        .beta(Range::single(15.))
        .azimuth_step(30.);
    let records = Sweep::new(cfg).unwrap().iter().collect::<Result<Vec<_>, _>>().unwrap();
    let s = crate::csv::dump_csv(&records).unwrap();
    assert!(s.starts_with(
        "alpha,beta,inner_link,outer_link,motor_zero,rotation_range,min_advantage,avg_advantage\n"
    ));
    let back = crate::csv::parse_csv::<DesignRecord, _>(s.as_bytes()).unwrap();
    assert_eq!(back.len(), 2);
    assert_abs_diff_eq!(back[1].rotation_range, records[1].rotation_range, epsilon = 1e-9);
}
