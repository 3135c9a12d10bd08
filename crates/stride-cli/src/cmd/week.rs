use crate::output::{print_json, print_table, progress_bar};
use crate::root;
use stride_core::progress::task_days_done;
use stride_core::types::{Category, Day};
use std::path::Path;

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

pub fn show(data_dir: &Path, week: Option<u32>, json: bool) -> anyhow::Result<()> {
    let (tracker, _) = root::open(data_dir)?;
    let n = root::week_or_current(&tracker, week)?;
    let resolved = tracker.resolved_week(n)?;
    let grid = tracker.daily(n)?;
    let progress = tracker.week_progress(n)?;

    if json {
        return print_json(&serde_json::json!({
            "week": resolved,
            "daily": grid,
            "progress": progress,
        }));
    }

    println!(
        "Week {} of {}: {}",
        resolved.week_number,
        tracker.total_weeks(),
        resolved.focus
    );
    println!("{} - {} {}", resolved.start_date, resolved.end_date, resolved.year);
    println!("Phase: {}", resolved.phase);
    if let Some(ref milestone) = resolved.milestone {
        println!("Milestone: {milestone}");
    }
    println!(
        "Progress: {}{}",
        progress_bar(progress.percent, 20),
        if progress.is_completed { "  (complete)" } else { "" }
    );

    let mut headers = vec!["ID", "Task"];
    headers.extend(Day::all().iter().map(|d| d.short()));
    headers.push("Done");

    for category in Category::all() {
        let tasks = resolved.tasks(*category);
        if tasks.is_empty() {
            continue;
        }
        println!();
        println!("{}", category.label());
        let rows = tasks
            .iter()
            .map(|task| {
                let cells = grid.get(&task.id);
                let mut row = vec![task.id.clone(), task_label(task)];
                row.extend(Day::all().iter().map(|d| {
                    let done = cells.map(|c| c[d.index()]).unwrap_or(false);
                    let mark = if done { "x" } else { "." };
                    mark.to_string()
                }));
                row.push(format!("{}/7", task_days_done(Some(&grid), &task.id)));
                row
            })
            .collect();
        print_table(&headers, rows);
    }
    Ok(())
}

fn task_label(task: &stride_core::types::Task) -> String {
    match task.schedule {
        Some(ref s) => format!("{} ({s})", task.text),
        None => task.text.clone(),
    }
}

// ---------------------------------------------------------------------------
// navigation
// ---------------------------------------------------------------------------

pub fn goto(data_dir: &Path, week: u32, json: bool) -> anyhow::Result<()> {
    let (tracker, _) = root::open(data_dir)?;
    let selected = tracker.set_current_week(week)?;
    print_selected(&tracker, selected, json)
}

/// Move one week forward (`delta > 0`) or back.
pub fn step(data_dir: &Path, delta: i32, json: bool) -> anyhow::Result<()> {
    let (tracker, _) = root::open(data_dir)?;
    let selected = if delta > 0 {
        tracker.next_week()?
    } else {
        tracker.previous_week()?
    };
    print_selected(&tracker, selected, json)
}

fn print_selected(tracker: &stride_core::Tracker, week: u32, json: bool) -> anyhow::Result<()> {
    let base = tracker.base_week(week)?;
    if json {
        print_json(&serde_json::json!({
            "week": week,
            "total_weeks": tracker.total_weeks(),
            "focus": base.focus,
        }))?;
    } else {
        println!(
            "Week {week} of {}: {} ({} - {})",
            tracker.total_weeks(),
            base.focus,
            base.start_date,
            base.end_date
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// toggle
// ---------------------------------------------------------------------------

pub fn toggle(
    data_dir: &Path,
    task_id: &str,
    day: &str,
    week: Option<u32>,
    json: bool,
) -> anyhow::Result<()> {
    let day: Day = day.parse()?;
    let (tracker, _) = root::open(data_dir)?;
    let n = root::week_or_current(&tracker, week)?;
    let outcome = tracker.toggle(n, task_id, day)?;

    if json {
        print_json(&outcome)?;
    } else {
        let mark = if outcome.checked { "Checked" } else { "Unchecked" };
        println!(
            "{mark} {} on {} (week {})",
            outcome.task_id,
            outcome.day.full_name(),
            outcome.week
        );
        if outcome.checked {
            println!("Streak: {} day(s)", outcome.streak);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// search
// ---------------------------------------------------------------------------

pub fn search(data_dir: &Path, query: &str, json: bool) -> anyhow::Result<()> {
    let (tracker, _) = root::open(data_dir)?;
    let groups = tracker.search(query);

    if json {
        return print_json(&groups);
    }
    if groups.is_empty() {
        println!("No weeks match '{query}'.");
        return Ok(());
    }
    for (i, group) in groups.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("{}", group.phase);
        let rows = group
            .weeks
            .iter()
            .map(|w| {
                vec![
                    w.week_number.to_string(),
                    format!("{} {}", w.month, w.year),
                    w.focus.clone(),
                ]
            })
            .collect();
        print_table(&["WEEK", "MONTH", "FOCUS"], rows);
    }
    Ok(())
}
