// Print both square roots of 0, 1, …, 9 and their difference.

use std::{error::Error, io::{self, BufWriter}};
use newtsqrt::{write_report, COUNT};

fn main() -> Result<(), Box<dyn Error + Send + Sync + 'static>> {
    let stdout = io::stdout();
    write_report(BufWriter::new(stdout.lock()), COUNT)?;
    Ok(())
}
