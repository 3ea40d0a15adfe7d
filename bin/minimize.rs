use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
    process::ExitCode,
};

use automata_minimize::prelude::*;

use tracing::{debug, info, trace};
use tracing_subscriber::{filter, prelude::*};

use clap::{value_parser, Arg, ArgMatches, Command};

fn cli() -> clap::Command {
    Command::new("minimize")
        .about("Removes unreachable states from a Mealy or Moore machine and minimizes it")
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbosity")
                .num_args(0..=1)
                .require_equals(true)
                .value_parser(["info", "debug", "trace"])
                .default_missing_value("info"),
        )
        .arg(
            Arg::new("kind")
                .required(true)
                .value_parser(["mealy", "moore"])
                .help("kind of machine described by the input table"),
        )
        .arg(
            Arg::new("input")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("table to read the machine from"),
        )
        .arg(
            Arg::new("output")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("table to write the minimized machine to"),
        )
}

fn setup_logging(matches: &ArgMatches) {
    let Ok(Some(verbosity)) = matches.try_get_one::<String>("verbosity") else {
        return;
    };

    let level = match verbosity.as_str() {
        "trace" => filter::LevelFilter::TRACE,
        "debug" => filter::LevelFilter::DEBUG,
        "info" => filter::LevelFilter::INFO,
        _ => unreachable!(),
    };

    let stderr_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(stderr_log.with_filter(level))
        .init();

    trace!("setup {level} logging");
}

fn create(output: &Path) -> Result<BufWriter<File>, TableError> {
    Ok(BufWriter::new(File::create(output)?))
}

fn run(kind: &str, input: &Path, output: &Path) -> Result<(), TableError> {
    debug!("reading {kind} machine from {}", input.display());
    let source = File::open(input)?;

    let start = std::time::Instant::now();
    match kind {
        "mealy" => {
            let mealy = table::read_mealy(source)?;
            let minimal = mealy.minimize()?;
            info!(
                "minimized Mealy machine from {} to {} states in {}µs",
                mealy.size(),
                minimal.size(),
                start.elapsed().as_micros()
            );
            table::write_mealy(&minimal, create(output)?)
        }
        "moore" => {
            let moore = table::read_moore(source)?;
            let minimal = moore.minimize()?;
            info!(
                "minimized Moore machine from {} to {} states in {}µs",
                moore.size(),
                minimal.size(),
                start.elapsed().as_micros()
            );
            table::write_moore(&minimal, create(output)?)
        }
        _ => unreachable!(),
    }
}

fn main() -> ExitCode {
    let matches = cli().get_matches();

    setup_logging(&matches);

    let (Some(kind), Some(input), Some(output)) = (
        matches.get_one::<String>("kind"),
        matches.get_one::<PathBuf>("input"),
        matches.get_one::<PathBuf>("output"),
    ) else {
        unreachable!("clap enforces required arguments");
    };

    match run(kind, input, output) {
        Ok(()) => {
            debug!("wrote minimized machine to {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("minimize: {e}");
            ExitCode::FAILURE
        }
    }
}
