use super::AnyResult;
use pan_tilt::{Cone, DesignRecord, Range, Skip, Sweep, SweepCfg};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
    time::Instant,
};

#[derive(clap::Args)]
pub(super) struct SweepArgs {
    /// Actuator inclinations "start,stop,step" in degrees
    #[clap(long, default_value_t = SweepCfg::new().alpha)]
    alpha: Range,
    /// Actuator half separations "start,stop,step" in degrees
    #[clap(long, default_value_t = SweepCfg::new().beta)]
    beta: Range,
    /// Target inclination in degrees, can be repeated
    #[clap(long = "theta", default_values_t = SweepCfg::new().thetas)]
    thetas: Vec<f64>,
    /// Azimuth increment in degrees
    #[clap(long, default_value_t = SweepCfg::new().azimuth_step)]
    azimuth_step: f64,
    /// Finite difference step in degrees
    #[clap(long, default_value_t = SweepCfg::new().epsilon)]
    epsilon: f64,
    /// Largest target inclination of the working cone in degrees
    #[clap(long, default_value_t = Cone::new().max_theta.to_degrees())]
    max_theta: f64,
    /// Safety margin of the working cone in degrees
    #[clap(long, default_value_t = Cone::new().margin.to_degrees())]
    margin: f64,
    /// Output CSV path, default to stdout
    #[clap(short, long)]
    output: Option<PathBuf>,
    /// Write the skipped placements and their reasons to a CSV file
    #[clap(long)]
    skipped: Option<PathBuf>,
    /// Disable parallel computing, rows are written as soon as evaluated
    #[clap(long)]
    no_parallel: bool,
}

impl SweepArgs {
    pub(super) fn cfg(&self) -> SweepCfg {
        let cone = Cone::new()
            .max_theta(self.max_theta.to_radians())
            .margin(self.margin.to_radians());
        SweepCfg::new()
            .alpha(self.alpha)
            .beta(self.beta)
            .thetas(self.thetas.clone())
            .azimuth_step(self.azimuth_step)
            .epsilon(self.epsilon)
            .cone(cone)
    }
}

#[derive(serde::Serialize)]
struct SkipRow {
    alpha: f64,
    beta: f64,
    reason: String,
}

impl From<Skip> for SkipRow {
    fn from(Skip { alpha, beta, reason }: Skip) -> Self {
        Self { alpha, beta, reason: reason.to_string() }
    }
}

struct Sink<W: Write> {
    rows: csv::Writer<W>,
    skipped: Vec<SkipRow>,
    pb: indicatif::ProgressBar,
    n_rows: usize,
}

impl<W: Write> Sink<W> {
    fn emit(&mut self, res: Result<DesignRecord, Skip>) -> AnyResult {
        match res {
            Ok(rec) => {
                self.rows.serialize(rec)?;
                self.n_rows += 1;
            }
            Err(skip) => {
                self.pb.suspend(|| tracing::warn!("{skip}"));
                self.skipped.push(skip.into());
            }
        }
        Ok(())
    }
}

pub(super) fn sweep(args: SweepArgs) -> AnyResult {
    let sweep = Sweep::new(args.cfg())?;
    let cfg = sweep.cfg();
    tracing::info!(
        alpha = %cfg.alpha,
        beta = %cfg.beta,
        thetas = ?cfg.thetas,
        azimuth_step = cfg.azimuth_step,
        epsilon = cfg.epsilon,
        "sweep {} placements",
        sweep.len()
    );
    let out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(std::io::stdout().lock()),
    };
    const STYLE: &str = "{eta} {wide_bar} {pos}/{len}";
    let pb = indicatif::ProgressBar::new(sweep.len() as u64);
    pb.set_style(indicatif::ProgressStyle::with_template(STYLE)?);
    let mut sink = Sink {
        rows: csv::Writer::from_writer(out),
        skipped: Vec::new(),
        pb: pb.clone(),
        n_rows: 0,
    };
    let t0 = Instant::now();
    if args.no_parallel {
        for res in sweep.iter() {
            sink.emit(res)?;
            pb.inc(1);
        }
    } else {
        let results = sweep.par_run_with(|n| pb.set_position(n as u64));
        results.into_iter().try_for_each(|res| sink.emit(res))?;
    }
    pb.finish_and_clear();
    sink.rows.flush()?;
    let Sink { skipped, n_rows, .. } = sink;
    tracing::info!(
        records = n_rows,
        skipped = skipped.len(),
        "finished in {:.2?}",
        t0.elapsed()
    );
    if let Some(path) = &args.skipped {
        pan_tilt::csv::write_csv(File::create(path)?, skipped)?;
        tracing::info!("skipped placements written to {}", path.display());
    }
    Ok(())
}
