use std::io;

use color_eyre::eyre::{bail, Result, WrapErr};
use log::LevelFilter;
use simple_logger::SimpleLogger;

use ls8::memory::StdMem;
use ls8::processor::Processor;

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling
    SimpleLogger::new()
        .with_level(LevelFilter::Warn)
        .env()
        .init()?; // logging, overridable with RUST_LOG

    let path = match std::env::args().nth(1) {
        Some(path) => path,
        None => bail!("please add a program to run: ls8 <program.ls8>"),
    };

    let mem = StdMem::from_file(&path).wrap_err_with(|| format!("Failed to load `{}`", path))?;
    mem.dump();

    let mut cpu = Processor::new(mem);
    let stdout = io::stdout();
    cpu.run(&mut stdout.lock())
        .wrap_err_with(|| format!("Execution of `{}` failed", path))?;

    Ok(())
}
