//! Pan/tilt command line: inverse kinematics and geometry sweep.
mod cli;

fn main() {
    cli::Entry::main();
}
