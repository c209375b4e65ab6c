//! Command-line argument parsing and logging setup (spec.md §6 "CLI").

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "motion-dsl",
    version,
    about = "Interpreter for a small DSL describing time-sequenced 2D animations"
)]
pub struct Cli {
    /// Input program path. Defaults to the bundled demo program.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output animation document path.
    #[arg(short, long, default_value = "out.svg")]
    pub output: PathBuf,

    /// Print the static analyzer's per-object summary before interpreting.
    #[arg(long)]
    pub print_type: bool,

    /// Increase log verbosity; repeatable (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(level).init();
}
