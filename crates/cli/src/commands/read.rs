//! `workbench read` — Print a workspace file or a line range of it.

use workbench_core::error::Result;
use workbench_core::fs::LineRange;
use workbench_tools::FileReader;

use super::Context;

pub fn run(ctx: &Context, path: &str, start: Option<usize>, end: Option<usize>) -> Result<()> {
    let range = LineRange::from_bounds(start, end)?;
    let resolved = ctx.resolver.resolve(path, false)?;
    let output = FileReader::read(&resolved, range)?;

    print!("{}", output.content);
    if !output.content.is_empty() && !output.content.ends_with('\n') {
        println!();
    }
    match output.range {
        Some(range) => eprintln!("-- {resolved}: lines {range} of {}", output.total_lines),
        None => eprintln!("-- {resolved}: {} lines", output.total_lines),
    }
    Ok(())
}
