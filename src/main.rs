use castbench::{BenchConfig, Error, Harness};
use log::{error, LevelFilter};
use simple_logger::SimpleLogger;
use std::io;
use std::io::Write;
use std::process;

fn main() {
    // Create a simple logger. `RUST_LOG` overrides the level.
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .env()
        .init()
        .expect("the logger is initialized once");

    if let Err(err) = run() {
        error!("{}", err);
        process::exit(1);
    }
}

fn run() -> Result<(), Error> {
    let mut harness = Harness::new(BenchConfig::default())?;
    let stdout = io::stdout();
    let mut out = harness.run(stdout.lock())?;
    out.flush()?;
    Ok(())
}
