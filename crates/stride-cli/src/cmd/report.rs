use crate::root;
use anyhow::Context;
use std::path::Path;
use stride_core::report::render_week;

pub fn run(data_dir: &Path, week: Option<u32>, out: Option<&Path>) -> anyhow::Result<()> {
    let (tracker, _) = root::open(data_dir)?;
    let n = root::week_or_current(&tracker, week)?;
    let resolved = tracker.resolved_week(n)?;
    let grid = tracker.daily(n)?;
    let notes = tracker.notes(n)?;
    let markdown = render_week(&resolved, Some(&grid), &notes);

    match out {
        Some(path) => {
            stride_core::io::atomic_write(path, markdown.as_bytes())
                .with_context(|| format!("writing {}", path.display()))?;
            println!("Wrote week {n} report to {}", path.display());
        }
        None => print!("{markdown}"),
    }
    Ok(())
}
