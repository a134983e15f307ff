mod ik;
mod sweep;

type AnyResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

const APP_NAME: &str = env!("CARGO_BIN_NAME");

#[derive(clap::Parser)]
#[clap(name = APP_NAME, version, about)]
pub(crate) struct Entry {
    /// Log filter such as "debug", default to `RUST_LOG` or "info"
    #[clap(long, global = true)]
    log: Option<String>,
    #[clap(subcommand)]
    cmd: Cmd,
}

#[derive(clap::Subcommand)]
enum Cmd {
    /// Sweep actuator placements and write design records as CSV
    Sweep(sweep::SweepArgs),
    /// Solve the actuator angles of a target pose
    Ik(ik::IkArgs),
    /// Translate picker input into actuator commands
    Point(ik::PointArgs),
}

impl Entry {
    pub(crate) fn main() {
        let entry = <Self as clap::Parser>::parse_from(wild::args());
        init_logger(entry.log.as_deref());
        register_panic_hook();
        let res = match entry.cmd {
            Cmd::Sweep(args) => sweep::sweep(args),
            Cmd::Ik(args) => ik::ik(args),
            Cmd::Point(args) => ik::point(args),
        };
        if let Err(e) = res {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    }
}

fn init_logger(filter: Option<&str>) {
    use tracing_subscriber::EnvFilter;
    let filter = match filter {
        Some(s) => EnvFilter::new(s),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    // Stdout is reserved for results
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn register_panic_hook() {
    // Print panic messages without stack trace
    std::panic::set_hook(Box::new(|info| {
        match info.payload().downcast_ref::<&str>() {
            Some(s) => eprintln!("{s}"),
            None => eprintln!("{info}"),
        }
        std::process::exit(1);
    }));
}
